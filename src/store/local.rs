use super::{Query, StoreError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tables {
    pub tables: BTreeMap<String, Vec<Value>>,
}

/// Table rows kept in a JSON file, rewritten after every change.
#[derive(Clone)]
pub struct LocalStore {
    path: PathBuf,
    data: Arc<Mutex<Tables>>,
}

impl LocalStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = load_tables(&path).await;
        Ok(Self::with_tables(path, data))
    }

    pub fn with_tables(path: PathBuf, data: Tables) -> Self {
        Self {
            path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let data = self.data.lock().await;
        let rows = data.tables.get(table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }

    pub async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let Value::Object(mut row) = record else {
            return Err(StoreError::InvalidRecord(format!("{table} rows must be JSON objects")));
        };
        if !row.get("id").is_some_and(|id| !id.is_null()) {
            row.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        if !row.get("created_at").is_some_and(|ts| !ts.is_null()) {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
            row.insert("created_at".to_string(), Value::String(now));
        }
        let row = Value::Object(row);

        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.tables.entry(table.to_string()).or_default().push(row.clone());
        persist_tables(&self.path, &next).await?;
        *data = next;
        debug!(table, "inserted row");

        Ok(row)
    }

    pub async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidRecord("patch must be a JSON object".to_string()));
        };

        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let updated = {
            let row = next
                .tables
                .get_mut(table)
                .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id)))
                .ok_or_else(|| StoreError::NotFound(format!("{table} row {id}")))?;
            if let Value::Object(fields) = row {
                for (key, value) in patch {
                    if key != "id" {
                        fields.insert(key, value);
                    }
                }
            }
            row.clone()
        };

        persist_tables(&self.path, &next).await?;
        *data = next;
        Ok(updated)
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

pub async fn load_tables(path: &Path) -> Tables {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Tables::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Tables::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Tables::default()
        }
    }
}

async fn persist_tables(path: &Path, data: &Tables) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("bookwell_local_{tag}_{}_{nanos}.json", std::process::id()))
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp_and_persists() {
        let path = temp_path("insert");
        let store = LocalStore::open(&path).await.unwrap();

        let row = store
            .insert("waitlist_signups", json!({"name": "Ana", "email": "ana@example.com"}))
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(row["created_at"].as_str().is_some());

        let reopened = LocalStore::open(&path).await.unwrap();
        let rows = reopened.select("waitlist_signups", &Query::new()).await.unwrap();
        assert_eq!(rows, vec![row]);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn update_merges_patch_and_keeps_id() {
        let path = temp_path("update");
        let store = LocalStore::open(&path).await.unwrap();
        store
            .insert("partnership_requests", json!({"id": "p1", "name": "Spa", "status": "pending"}))
            .await
            .unwrap();

        let updated = store
            .update("partnership_requests", "p1", json!({"status": "approved", "id": "other"}))
            .await
            .unwrap();
        assert_eq!(updated["status"], "approved");
        assert_eq!(updated["id"], "p1");
        assert_eq!(updated["name"], "Spa");

        let err = store
            .update("partnership_requests", "missing", json!({"status": "approved"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_write_leaves_tables_untouched() {
        let dir = temp_path("dir");
        std::fs::create_dir_all(&dir).unwrap();
        let mut seeded = Tables::default();
        seeded.tables.insert(
            "partnership_requests".to_string(),
            vec![json!({"id": "p1", "status": "pending"})],
        );
        let store = LocalStore::with_tables(dir.clone(), seeded);

        let record = json!({"name": "Ana", "email": "ana@example.com"});
        assert!(store.insert("waitlist_signups", record.clone()).await.is_err());
        assert!(store.insert("waitlist_signups", record).await.is_err());
        let rows = store.select("waitlist_signups", &Query::new()).await.unwrap();
        assert!(rows.is_empty());

        assert!(store
            .update("partnership_requests", "p1", json!({"status": "approved"}))
            .await
            .is_err());
        let rows = store.select("partnership_requests", &Query::new()).await.unwrap();
        assert_eq!(rows[0]["status"], "pending");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn unknown_table_selects_nothing() {
        let store = LocalStore::with_tables(temp_path("empty"), Tables::default());
        let rows = store.select("analytics_events", &Query::new()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"{not json").unwrap();
        let data = load_tables(&path).await;
        assert!(data.tables.is_empty());
        let _ = std::fs::remove_file(path);
    }
}
