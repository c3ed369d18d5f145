//! Boundary to the external datastore.
//!
//! Rows travel as JSON objects. Callers build a [`Query`] and get back plain
//! rows or typed records; the backend is either Supabase (PostgREST) or a JSON
//! file on disk.

mod local;
mod supabase;

pub use local::{LocalStore, Tables};
pub use supabase::SupabaseClient;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("datastore returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("table {0} does not exist")]
    MissingTable(String),
    #[error("{0}")]
    NotFound(String),
    #[error("failed to decode rows: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn matches(&self, row: &Value) -> bool {
        let Some(actual) = row.get(&self.column) else {
            return false;
        };
        let Some(actual) = scalar_text(actual) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == self.value,
            FilterOp::Gte => compare_text(&actual, &self.value) != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, column: &str, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gte(self, column: &str, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn newest_first(mut self) -> Self {
        self.order = Some(Order {
            column: "created_at".to_string(),
            descending: true,
        });
        self
    }

    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// PostgREST query-string pairs, e.g. `status=eq.pending&order=created_at.desc`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column.clone(), format!("{}.{}", f.op.as_str(), f.value)))
            .collect();
        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Applies the query to rows already in memory.
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut selected: Vec<Value> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Orders timestamps chronologically and numbers numerically, falling back to text.
fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (a.parse::<DateTime<Utc>>(), b.parse::<DateTime<Utc>>()) {
        return a.cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(scalar_text), b.and_then(scalar_text)) {
        (Some(a), Some(b)) => compare_text(&a, &b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Clone)]
pub enum Datastore {
    Local(LocalStore),
    Supabase(SupabaseClient),
}

impl Datastore {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Datastore::Local(_) => "local",
            Datastore::Supabase(_) => "supabase",
        }
    }

    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        match self {
            Datastore::Local(store) => store.select(table, query).await,
            Datastore::Supabase(client) => client.select(table, query).await,
        }
    }

    pub async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        match self {
            Datastore::Local(store) => store.insert(table, record).await,
            Datastore::Supabase(client) => client.insert(table, record).await,
        }
    }

    pub async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, StoreError> {
        match self {
            Datastore::Local(store) => store.update(table, id, patch).await,
            Datastore::Supabase(client) => client.update(table, id, patch).await,
        }
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        let rows = self.select(table, query).await?;
        Ok(serde_json::from_value(Value::Array(rows))?)
    }

    /// Like [`Datastore::fetch`], but a table that does not exist yields no rows.
    pub async fn fetch_or_empty<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        match self.fetch(table, query).await {
            Err(StoreError::MissingTable(name)) => {
                warn!("table {name} is missing, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    pub async fn create<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        record: &T,
    ) -> Result<R, StoreError> {
        let stored = self.insert(table, serde_json::to_value(record)?).await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn patch<R: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: Value,
    ) -> Result<R, StoreError> {
        let stored = self.update(table, id, patch).await?;
        Ok(serde_json::from_value(stored)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_encodes_postgrest_params() {
        let query = Query::new()
            .eq("status", "pending")
            .gte("created_at", "2026-01-01T00:00:00Z")
            .newest_first()
            .limit(50);
        assert_eq!(
            query.to_params(),
            vec![
                ("status".to_string(), "eq.pending".to_string()),
                ("created_at".to_string(), "gte.2026-01-01T00:00:00Z".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn apply_filters_orders_and_limits() {
        let rows = vec![
            json!({"id": "a", "status": "pending", "created_at": "2026-01-03T00:00:00Z"}),
            json!({"id": "b", "status": "approved", "created_at": "2026-01-04T00:00:00Z"}),
            json!({"id": "c", "status": "pending", "created_at": "2026-01-05T09:30:00+00:00"}),
            json!({"id": "d", "status": "pending", "created_at": "2025-12-30T00:00:00Z"}),
        ];
        let query = Query::new()
            .eq("status", "pending")
            .gte("created_at", "2026-01-01T00:00:00Z")
            .newest_first()
            .limit(5);

        let ids: Vec<_> = query
            .apply(rows)
            .iter()
            .map(|row| row["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn numeric_columns_compare_as_numbers() {
        let rows = vec![json!({"id": "a", "page_views": 9}), json!({"id": "b", "page_views": 10})];
        let kept = Query::new().gte("page_views", "10").apply(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["id"], "b");
    }

    #[test]
    fn missing_column_never_matches() {
        let filter = Filter {
            column: "country".to_string(),
            op: FilterOp::Eq,
            value: "US".to_string(),
        };
        assert!(!filter.matches(&json!({"id": "x"})));
        assert!(!filter.matches(&json!({"id": "x", "country": null})));
    }
}
