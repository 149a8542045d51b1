use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Database, VersionedDocument, WriteResult, set_path};

/// Process-local document store, used when no Redis URL is configured and in tests.
#[derive(Default)]
pub struct InMemoryDatabase {
    documents: RwLock<HashMap<String, VersionedDocument>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn get_document(&self, key: &str) -> Result<Option<VersionedDocument>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put_document(
        &self,
        key: &str,
        data: &JsonValue,
        expected_version: Option<u64>,
    ) -> Result<WriteResult> {
        let mut documents = self.documents.write().await;
        let current_version = documents.get(key).map(|doc| doc.version);
        if current_version != expected_version {
            return Ok(WriteResult::Conflict { current_version });
        }

        let version = current_version.unwrap_or(0) + 1;
        documents.insert(
            key.to_string(),
            VersionedDocument {
                version,
                data: data.clone(),
            },
        );
        Ok(WriteResult::Written { version })
    }

    async fn merge_fields(&self, key: &str, fields: &Map<String, JsonValue>) -> Result<u64> {
        let mut documents = self.documents.write().await;
        let doc = documents.entry(key.to_string()).or_insert_with(|| VersionedDocument {
            version: 0,
            data: JsonValue::Object(Map::new()),
        });
        for (path, value) in fields {
            set_path(&mut doc.data, path, value.clone());
        }
        doc.version += 1;
        Ok(doc.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_requires_matching_version() -> Result<()> {
        let db = InMemoryDatabase::new();

        let first = db.put_document("doc", &json!({ "n": 1 }), None).await?;
        assert_eq!(first, WriteResult::Written { version: 1 });

        // creating again must fail now that it exists
        let again = db.put_document("doc", &json!({ "n": 2 }), None).await?;
        assert_eq!(again, WriteResult::Conflict { current_version: Some(1) });

        let stale = db.put_document("doc", &json!({ "n": 2 }), Some(7)).await?;
        assert_eq!(stale, WriteResult::Conflict { current_version: Some(1) });

        let second = db.put_document("doc", &json!({ "n": 2 }), Some(1)).await?;
        assert_eq!(second, WriteResult::Written { version: 2 });

        let stored = db.get_document("doc").await?.expect("document should exist");
        assert_eq!(stored.version, 2);
        assert_eq!(stored.data, json!({ "n": 2 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_of_missing_document_conflicts() -> Result<()> {
        let db = InMemoryDatabase::new();
        let result = db.put_document("missing", &json!({}), Some(1)).await?;
        assert_eq!(result, WriteResult::Conflict { current_version: None });
        assert!(db.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_fields_keeps_siblings() -> Result<()> {
        let db = InMemoryDatabase::new();
        db.put_document("user", &json!({ "playerName": "Ada", "games": { "a": 1 } }), None)
            .await?;

        let mut fields = Map::new();
        fields.insert("games.b".to_string(), json!(2));
        let version = db.merge_fields("user", &fields).await?;
        assert_eq!(version, 2);

        let stored = db.get_document("user").await?.expect("document should exist");
        assert_eq!(stored.data, json!({ "playerName": "Ada", "games": { "a": 1, "b": 2 } }));

        // merging into a missing key creates it
        let version = db.merge_fields("fresh", &fields).await?;
        assert_eq!(version, 1);
        assert_eq!(db.len().await, 2);
        Ok(())
    }
}
