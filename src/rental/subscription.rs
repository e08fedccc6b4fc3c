//! Live per-user rental lists
//!
//! A [`RentalSubscription`] redelivers the user's full rental list, newest
//! first, every time one of their rentals is created, updated or deleted.
//! It is a `Stream`; dropping it (or calling [`RentalSubscription::cancel`])
//! stops the background watch task.
//!
//! ```rust,ignore
//! let mut live = ledger.subscribe_to_user_rentals("uid-1");
//! while let Some(snapshot) = live.next().await {
//!     render(snapshot?);
//! }
//! ```

use crate::core::document::Document;
use crate::core::error::Result;
use crate::core::events::ChangeEvent;
use crate::core::query::{Query, SortDirection};
use crate::core::store::DocumentStore;
use crate::rental::ledger::newest_first;
use crate::rental::model::Rental;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

const SNAPSHOT_BUFFER: usize = 16;

/// Stream of rental snapshots for one user
pub struct RentalSubscription {
    user_id: String,
    receiver: mpsc::Receiver<Result<Vec<Rental>>>,
    task: JoinHandle<()>,
}

impl RentalSubscription {
    /// Start watching `user_id`'s rentals.
    ///
    /// The change feed is subscribed before the initial query runs, so no
    /// write committed after this call returns can be missed.
    pub(crate) fn spawn(store: Arc<dyn DocumentStore<Rental>>, user_id: String) -> Self {
        let changes = store.watch();
        let (sender, receiver) = mpsc::channel(SNAPSHOT_BUFFER);
        let task = tokio::spawn(watch_loop(store, user_id.clone(), changes, sender));
        tracing::debug!(user_id = %user_id, "rental subscription started");

        Self {
            user_id,
            receiver,
            task,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Whether the watch task is still running
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop receiving updates and release the watch
    pub fn cancel(mut self) {
        self.receiver.close();
        self.task.abort();
    }
}

impl Stream for RentalSubscription {
    type Item = Result<Vec<Rental>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl Drop for RentalSubscription {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(user_id = %self.user_id, "rental subscription released");
    }
}

/// Disposer for a callback registered with
/// [`RentalLedger::watch_user_rentals`](crate::rental::RentalLedger::watch_user_rentals)
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub(crate) fn forward<F>(subscription: RentalSubscription, mut callback: F) -> Self
    where
        F: FnMut(Vec<Rental>) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut subscription = subscription;
            while let Some(snapshot) = subscription.next().await {
                match snapshot {
                    Ok(rentals) => callback(rentals),
                    Err(e) => tracing::warn!(
                        user_id = %subscription.user_id(),
                        error = %e,
                        "rental snapshot failed, waiting for next change"
                    ),
                }
            }
        });
        Self { task }
    }

    /// Stop invoking the callback
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn user_query(user_id: &str) -> Query {
    Query::new()
        .filter_eq("userId", user_id)
        .order_by("createdAt", SortDirection::Descending)
}

fn affects(event: &ChangeEvent, user_id: &str, current: &HashSet<Uuid>) -> bool {
    event.collection == Rental::collection()
        && (event.data_str("userId") == Some(user_id) || current.contains(&event.document_id))
}

async fn watch_loop(
    store: Arc<dyn DocumentStore<Rental>>,
    user_id: String,
    mut changes: broadcast::Receiver<crate::core::events::EventEnvelope>,
    sender: mpsc::Sender<Result<Vec<Rental>>>,
) {
    let query = user_query(&user_id);
    let mut current: HashSet<Uuid> = HashSet::new();

    loop {
        let snapshot = newest_first(store.as_ref(), &query).await.map_err(Into::into);
        if let Ok(rentals) = &snapshot {
            current = rentals.iter().map(|r| r.id).collect();
        }
        if sender.send(snapshot).await.is_err() {
            break;
        }

        // Wait for the next change that touches this user's result set
        let relevant = loop {
            tokio::select! {
                _ = sender.closed() => break false,
                received = changes.recv() => match received {
                    Ok(envelope) if affects(&envelope.event, &user_id, &current) => break true,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(user_id = %user_id, skipped, "rental subscription lagged, re-querying");
                        break true;
                    }
                    Err(broadcast::error::RecvError::Closed) => break false,
                },
            }
        };

        if !relevant {
            break;
        }
    }

    tracing::debug!(user_id = %user_id, "rental subscription stopped");
}
