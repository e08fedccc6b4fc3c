//! In-memory implementation of DocumentStore for testing and development

use crate::core::document::Document;
use crate::core::events::{ChangeEvent, EventBus, EventEnvelope};
use crate::core::query::Query;
use crate::core::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

/// In-memory document store for one collection
///
/// Uses an `RwLock` for thread-safe access. Change events are published while
/// the write lock is held, so watchers observe them in commit order.
///
/// By default any field can be used in `order_by`. [`with_sort_indexes`]
/// restricts ordering to the listed fields; other orderings then fail with
/// [`StoreError::FailedPrecondition`], the way a hosted document database
/// rejects a query whose composite index has not been built.
///
/// [`with_sort_indexes`]: InMemoryDocumentStore::with_sort_indexes
#[derive(Clone)]
pub struct InMemoryDocumentStore<T: Document> {
    docs: Arc<RwLock<HashMap<Uuid, T>>>,
    events: EventBus,
    sort_indexes: Option<Arc<HashSet<String>>>,
}

impl<T: Document> InMemoryDocumentStore<T> {
    /// Create an empty store with its own event bus
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::default())
    }

    /// Create an empty store publishing on the given bus
    pub fn with_event_bus(events: EventBus) -> Self {
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
            events,
            sort_indexes: None,
        }
    }

    /// Only allow `order_by` on the listed fields
    pub fn with_sort_indexes(mut self, fields: &[&str]) -> Self {
        self.sort_indexes = Some(Arc::new(fields.iter().map(|f| f.to_string()).collect()));
        self
    }

    /// The bus change events are published on
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, T>>, StoreError> {
        self.docs
            .read()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, T>>, StoreError> {
        self.docs
            .write()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn not_found(id: &Uuid) -> StoreError {
        StoreError::NotFound {
            collection: T::collection().to_string(),
            id: *id,
        }
    }

    fn check_sortable(&self, query: &Query) -> Result<(), StoreError> {
        let (Some(order), Some(indexes)) = (&query.order_by, &self.sort_indexes) else {
            return Ok(());
        };

        if indexes.contains(&order.field) {
            Ok(())
        } else {
            Err(StoreError::FailedPrecondition(format!(
                "The query requires an index on {}.{}",
                T::collection(),
                order.field
            )))
        }
    }

    fn insert_locked(&self, docs: &mut HashMap<Uuid, T>, mut doc: T) -> T {
        let id = Uuid::new_v4();
        doc.assign_id(id);
        docs.insert(id, doc.clone());
        self.events
            .publish(ChangeEvent::created(T::collection(), id, doc.to_json()));
        doc
    }

    fn replace_locked(&self, docs: &mut HashMap<Uuid, T>, id: &Uuid, mut doc: T) -> T {
        doc.assign_id(*id);
        docs.insert(*id, doc.clone());
        self.events
            .publish(ChangeEvent::updated(T::collection(), *id, doc.to_json()));
        doc
    }
}

impl<T: Document> Default for InMemoryDocumentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for InMemoryDocumentStore<T> {
    async fn insert(&self, doc: T) -> Result<T, StoreError> {
        let mut docs = self.write()?;
        Ok(self.insert_locked(&mut docs, doc))
    }

    async fn insert_unless(&self, doc: T, guards: &[Query]) -> Result<T, StoreError> {
        let mut docs = self.write()?;

        for (index, guard) in guards.iter().enumerate() {
            if let Some(existing) = docs.values().find(|d| guard.matches(*d)) {
                return Err(StoreError::GuardMatched {
                    collection: T::collection().to_string(),
                    guard: index,
                    existing: existing.id(),
                });
            }
        }

        Ok(self.insert_locked(&mut docs, doc))
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.check_sortable(query)?;
        let docs = self.read()?;
        Ok(query.apply(docs.values().cloned()))
    }

    async fn replace(&self, id: &Uuid, doc: T) -> Result<T, StoreError> {
        let mut docs = self.write()?;
        if !docs.contains_key(id) {
            return Err(Self::not_found(id));
        }
        Ok(self.replace_locked(&mut docs, id, doc))
    }

    async fn replace_if(&self, id: &Uuid, doc: T, precondition: &Query) -> Result<T, StoreError> {
        let mut docs = self.write()?;
        let current = docs.get(id).ok_or_else(|| Self::not_found(id))?;

        if !precondition.matches(current) {
            return Err(StoreError::Conflict {
                collection: T::collection().to_string(),
                message: format!("document {} changed since it was read", id),
            });
        }

        Ok(self.replace_locked(&mut docs, id, doc))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let mut docs = self.write()?;
        docs.remove(id).ok_or_else(|| Self::not_found(id))?;
        self.events
            .publish(ChangeEvent::deleted(T::collection(), *id));
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }
}
