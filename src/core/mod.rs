//! Core module containing the document abstraction, queries, events and errors

pub mod document;
pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod session;
pub mod store;

pub use document::Document;
pub use error::{ErrorKind, FieldError, VelocityError};
pub use events::{ChangeAction, ChangeEvent, EventBus, EventEnvelope};
pub use field::{FieldFormat, FieldValue};
pub use query::{Filter, OrderBy, Query, SortDirection};
pub use session::{AdminSession, CustomerSession, HeaderSessionProvider, SessionProvider};
pub use store::{DocumentStore, StoreError};
