//! Document store trait: the boundary to the external backend

use crate::core::document::Document;
use crate::core::events::EventEnvelope;
use crate::core::query::Query;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Failures reported by a document store
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// No document with this id exists in the collection
    #[error("{collection} document '{id}' not found")]
    NotFound { collection: String, id: Uuid },

    /// A guard or precondition of a conditional write did not hold
    #[error("conditional write on {collection} rejected: {message}")]
    Conflict { collection: String, message: String },

    /// An insert guard matched an existing document
    #[error("insert into {collection} blocked by guard {guard}: document {existing} matches")]
    GuardMatched {
        collection: String,
        /// Position of the matching guard in the slice passed to `insert_unless`
        guard: usize,
        existing: Uuid,
    },

    /// The store cannot serve the query as asked (e.g. missing index for an ordering)
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// The caller is not allowed to read or write this collection
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The backend is unreachable or returned a retryable failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Serialization or other internal failure
    #[error("store internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Async document store for one collection
///
/// Implementations provide CRUD, filtered queries, conditional writes and a
/// change feed. The rental ledger is agnostic to the backend behind it.
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    /// Insert a new document, assigning it a fresh id
    async fn insert(&self, doc: T) -> Result<T, StoreError>;

    /// Insert a new document only if no existing document matches any of
    /// `guards`.
    ///
    /// Every guard is checked in the same atomic step as the write. Fails with
    /// [`StoreError::GuardMatched`] naming the first guard that matched.
    async fn insert_unless(&self, doc: T, guards: &[Query]) -> Result<T, StoreError>;

    /// Get a document by id
    async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError>;

    /// Run a query
    ///
    /// A store may refuse an `order_by` it cannot serve with
    /// [`StoreError::FailedPrecondition`]; callers are expected to fall back
    /// to an unordered query.
    async fn query(&self, query: &Query) -> Result<Vec<T>, StoreError>;

    /// Replace an existing document
    async fn replace(&self, id: &Uuid, doc: T) -> Result<T, StoreError>;

    /// Replace an existing document only if its current version matches
    /// `precondition` (compare-and-swap).
    async fn replace_if(&self, id: &Uuid, doc: T, precondition: &Query) -> Result<T, StoreError>;

    /// Delete a document. Deleting a missing id is a `NotFound` error.
    async fn delete(&self, id: &Uuid) -> Result<(), StoreError>;

    /// Subscribe to the change feed of this collection
    fn watch(&self) -> broadcast::Receiver<EventEnvelope>;

    /// List every document in the collection
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.query(&Query::new()).await
    }
}
