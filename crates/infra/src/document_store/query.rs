//! Backend-neutral collection queries (filters, ordering, limit).

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value as JsonValue;

use super::r#trait::StoredDocument;

/// Hard cap on rows returned by one query.
pub const MAX_QUERY_LIMIT: usize = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Equality filter on a (dot-separated) field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// `Query(collection, filters, order, limit)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    /// Keyset cursor: only documents whose id sorts after this one.
    pub after_id: Option<String>,
}

impl Query {
    /// Every document of the collection.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.min(MAX_QUERY_LIMIT));
        self
    }

    pub fn after_id(mut self, id: impl Into<String>) -> Self {
        self.after_id = Some(id.into());
        self
    }

    pub fn matches(&self, data: &JsonValue) -> bool {
        self.filters
            .iter()
            .all(|f| field(data, &f.field) == Some(&f.value))
    }

    /// Filter, order and truncate an unordered set of documents.
    ///
    /// Ties (and unordered queries) fall back to document id order so results
    /// are deterministic.
    pub fn apply(&self, docs: impl IntoIterator<Item = StoredDocument>) -> Vec<StoredDocument> {
        let mut out: Vec<StoredDocument> = docs
            .into_iter()
            .filter(|d| self.after_id.as_deref().is_none_or(|after| d.id.as_str() > after))
            .filter(|d| self.matches(&d.data))
            .collect();

        out.sort_by(|a, b| {
            let primary = match &self.order_by {
                Some(order) => {
                    let ord = compare_values(field(&a.data, &order.field), field(&b.data, &order.field));
                    match order.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                }
                None => Ordering::Equal,
            };
            primary.then_with(|| match &self.order_by {
                Some(OrderBy { direction: SortDirection::Descending, .. }) => b.id.cmp(&a.id),
                _ => a.id.cmp(&b.id),
            })
        });

        out.truncate(self.limit.unwrap_or(MAX_QUERY_LIMIT));
        out
    }
}

fn field<'a>(data: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(data, |cur, key| cur.get(key))
}

fn as_timestamp(v: &JsonValue) -> Option<DateTime<FixedOffset>> {
    v.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Total order over JSON scalars: missing < null < bool < number < string.
///
/// RFC 3339 strings compare chronologically, since serialized timestamps may
/// carry different numbers of fractional digits.
fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    fn rank(v: Option<&JsonValue>) -> u8 {
        match v {
            None => 0,
            Some(JsonValue::Null) => 1,
            Some(JsonValue::Bool(_)) => 2,
            Some(JsonValue::Number(_)) => 3,
            Some(JsonValue::String(_)) => 4,
            Some(JsonValue::Array(_)) => 5,
            Some(JsonValue::Object(_)) => 6,
        }
    }

    match (a, b) {
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x @ JsonValue::String(sx)), Some(y @ JsonValue::String(sy))) => {
            match (as_timestamp(x), as_timestamp(y)) {
                (Some(tx), Some(ty)) => tx.cmp(&ty),
                _ => sx.cmp(sy),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
