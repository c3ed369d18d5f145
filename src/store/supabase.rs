//! Supabase client speaking PostgREST over `/rest/v1`.
//!
//! Authentication uses the project's anon key, sent both as `apikey` and as a
//! bearer token. Table access is governed by row-level security on the
//! Supabase side.

use super::{Query, StoreError};
use crate::config::SupabaseConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// PostgREST error codes meaning the relation is not there.
const MISSING_TABLE_CODES: &[&str] = &["PGRST205", "42P01"];

#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseInner>,
}

struct SupabaseInner {
    http: reqwest::Client,
    rest_url: String,
}

#[derive(Debug, Deserialize, Default)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| StoreError::InvalidRecord(format!("invalid anon key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|e| StoreError::InvalidRecord(format!("invalid anon key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseInner {
                http,
                rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            }),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.inner.rest_url)
    }

    #[instrument(skip(self, query))]
    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let response = self
            .inner
            .http
            .get(self.table_url(table))
            .query(&query.to_params())
            .send()
            .await?;
        let rows: Vec<Value> = handle_response(table, response).await?;
        debug!(rows = rows.len(), "selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, record))]
    pub async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let response = self
            .inner
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;
        let rows: Vec<Value> = handle_response(table, response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Api {
                status: 200,
                message: format!("insert into {table} returned no row"),
            })
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, StoreError> {
        let response = self
            .inner
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = handle_response(table, response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{table} row {id}")))
    }
}

async fn handle_response(
    table: &str,
    response: reqwest::Response,
) -> Result<Vec<Value>, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_error(table, status.as_u16(), &body))
}

fn classify_error(table: &str, status: u16, body: &str) -> StoreError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let missing = parsed
        .code
        .as_deref()
        .is_some_and(|code| MISSING_TABLE_CODES.contains(&code));
    if missing || status == 404 {
        return StoreError::MissingTable(table.to_string());
    }

    let message = parsed.message.unwrap_or_else(|| body.trim().to_string());
    StoreError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_joins_rest_prefix() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "https://demo.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.table_url("waitlist_signups"),
            "https://demo.supabase.co/rest/v1/waitlist_signups"
        );
    }

    #[test]
    fn missing_relation_codes_map_to_missing_table() {
        let body = r#"{"code":"PGRST205","message":"Could not find the table"}"#;
        assert!(matches!(
            classify_error("analytics_events", 400, body),
            StoreError::MissingTable(t) if t == "analytics_events"
        ));
        let body = r#"{"code":"42P01","message":"relation does not exist"}"#;
        assert!(matches!(classify_error("x", 400, body), StoreError::MissingTable(_)));
        assert!(matches!(classify_error("x", 404, ""), StoreError::MissingTable(_)));
    }

    #[test]
    fn other_failures_keep_status_and_message() {
        let body = r#"{"code":"23505","message":"duplicate key"}"#;
        match classify_error("waitlist_signups", 409, body) {
            StoreError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
            }
            other => panic!("unexpected {other:?}"),
        }
        match classify_error("x", 500, "boom") {
            StoreError::Api { message, .. } => assert_eq!(message, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
