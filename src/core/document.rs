//! Document trait defining how records are stored and queried

use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Base trait for every record kept in a document store.
///
/// All documents have:
/// - id: Unique identifier, assigned by the store on insert
/// - collection: The collection (table) the document lives in
/// - created_at / updated_at: Timestamps maintained by the owning service
///
/// Stores stay agnostic of the concrete record type; they filter and sort
/// through [`Document::field_value`], which exposes fields by their persisted
/// (camelCase) name.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the collection holding this document type (e.g. "rentals")
    fn collection() -> &'static str;

    /// Get the unique identifier for this document
    fn id(&self) -> Uuid;

    /// Set the identifier. Called by stores when assigning a fresh key.
    fn assign_id(&mut self, id: Uuid);

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Get the value of a field by its persisted name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Serialize the document into its persisted JSON shape
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
