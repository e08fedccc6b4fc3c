//! Query descriptions understood by every document store
//!
//! A [`Query`] is a conjunction of filters plus an optional sort clause. Stores
//! that can evaluate it natively may do so; the helpers here (`matches`,
//! `sort`) are the reference semantics and are what the in-memory store uses.
//!
//! ```rust,ignore
//! let open = Query::new()
//!     .filter_eq("vehicleId", vehicle_id)
//!     .filter_in("status", ["pending", "active"]);
//!
//! let mine = Query::new()
//!     .filter_eq("userId", "user-42")
//!     .order_by("createdAt", SortDirection::Descending);
//! ```

use crate::core::document::Document;
use crate::core::field::FieldValue;
use std::cmp::Ordering;

/// Sort direction for an `order_by` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A single filter clause
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value
    Eq { field: String, value: FieldValue },
    /// Field equals any of the values
    In {
        field: String,
        values: Vec<FieldValue>,
    },
}

impl Filter {
    /// Name of the field this filter reads
    pub fn field(&self) -> &str {
        match self {
            Filter::Eq { field, .. } | Filter::In { field, .. } => field,
        }
    }

    /// Evaluate the filter against a document
    ///
    /// A document without the field never matches.
    pub fn matches<T: Document>(&self, doc: &T) -> bool {
        let Some(actual) = doc.field_value(self.field()) else {
            return false;
        };

        match self {
            Filter::Eq { value, .. } => value == &actual,
            Filter::In { values, .. } => values.contains(&actual),
        }
    }
}

/// Sort clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Filters (AND-ed together) and an optional ordering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// An empty query matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn filter_eq(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    /// Add a membership filter
    pub fn filter_in<V, I>(mut self, field: &str, values: I) -> Self
    where
        V: Into<FieldValue>,
        I: IntoIterator<Item = V>,
    {
        self.filters.push(Filter::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Request results ordered by a field
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// The same filters without the ordering clause
    pub fn unordered(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order_by: None,
        }
    }

    /// Check whether every filter matches the document
    pub fn matches<T: Document>(&self, doc: &T) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Sort documents according to `order`.
    ///
    /// Documents missing the field, or whose value cannot be compared, sort
    /// after all comparable ones regardless of direction.
    pub fn sort<T: Document>(mut docs: Vec<T>, order: &OrderBy) -> Vec<T> {
        docs.sort_by(|a, b| {
            let left = a.field_value(&order.field).filter(|v| !v.is_null());
            let right = b.field_value(&order.field).filter(|v| !v.is_null());

            match (left, right) {
                (Some(l), Some(r)) => {
                    let ordering = l.compare(&r).unwrap_or(Ordering::Equal);
                    match order.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        docs
    }

    /// Filter and sort a collection in memory
    pub fn apply<T: Document>(&self, docs: impl IntoIterator<Item = T>) -> Vec<T> {
        let matched: Vec<T> = docs.into_iter().filter(|d| self.matches(d)).collect();
        match &self.order_by {
            Some(order) => Self::sort(matched, order),
            None => matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Item {
        id: Uuid,
        owner: String,
        state: String,
        created_at: DateTime<Utc>,
    }

    impl Document for Item {
        fn collection() -> &'static str {
            "items"
        }
        fn id(&self) -> Uuid {
            self.id
        }
        fn assign_id(&mut self, id: Uuid) {
            self.id = id;
        }
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn updated_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "owner" => Some(self.owner.clone().into()),
                "state" => Some(self.state.clone().into()),
                "createdAt" => Some(self.created_at.into()),
                _ => None,
            }
        }
    }

    fn item(owner: &str, state: &str, offset_secs: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            state: state.to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let query = Query::new()
            .filter_eq("owner", "ana")
            .filter_in("state", ["pending", "active"]);

        assert!(query.matches(&item("ana", "active", 0)));
        assert!(!query.matches(&item("ana", "completed", 0)));
        assert!(!query.matches(&item("ben", "pending", 0)));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let query = Query::new().filter_eq("color", "red");
        assert!(!query.matches(&item("ana", "active", 0)));
    }

    #[test]
    fn test_apply_sorts_descending() {
        let query = Query::new()
            .filter_eq("owner", "ana")
            .order_by("createdAt", SortDirection::Descending);

        let docs = vec![
            item("ana", "active", 0),
            item("ana", "active", 20),
            item("ben", "active", 30),
            item("ana", "active", 10),
        ];

        let result = query.apply(docs);
        assert_eq!(result.len(), 3);
        assert!(result[0].created_at > result[1].created_at);
        assert!(result[1].created_at > result[2].created_at);
    }

    #[test]
    fn test_unordered_keeps_filters() {
        let query = Query::new()
            .filter_eq("owner", "ana")
            .order_by("createdAt", SortDirection::Ascending);

        let plain = query.unordered();
        assert_eq!(plain.filters, query.filters);
        assert!(plain.order_by.is_none());
    }
}
