// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore, Filter, StoreError, merge, upsert_seed};

/// Process-local document store.
///
/// Every primitive runs under a single lock, so compound operations such as
/// [`DocumentStore::upsert`] are atomic. Used when no database is configured
/// and throughout the test suite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    collections: HashMap<Collection, Vec<Document>>,
}

impl Inner {
    fn docs(&self, collection: Collection) -> &[Document] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn first(&self, collection: Collection, filter: &Filter) -> Option<&Document> {
        self.docs(collection)
            .iter()
            .find(|doc| filter.matches(doc.id, &doc.data))
    }

    fn first_mut(&mut self, collection: Collection, filter: &Filter) -> Option<&mut Document> {
        self.collections
            .get_mut(&collection)?
            .iter_mut()
            .find(|doc| filter.matches(doc.id, &doc.data))
    }

    fn check_unique(&self, collection: Collection, data: &Value) -> Result<(), StoreError> {
        let Some(key) = collection.unique_key() else {
            return Ok(());
        };
        if key.iter().any(|field| data.get(field).is_none()) {
            return Ok(());
        }
        let taken = self
            .docs(collection)
            .iter()
            .any(|doc| key.iter().all(|field| doc.data.get(field) == data.get(field)));
        if taken {
            return Err(StoreError::Conflict(format!(
                "duplicate key ({}) in {}",
                key.join(", "),
                collection
            )));
        }
        Ok(())
    }

    fn insert(&mut self, collection: Collection, data: Value) -> Result<Document, StoreError> {
        if !data.is_object() {
            return Err(StoreError::Unavailable(format!(
                "refusing to store a non-object document in {}",
                collection
            )));
        }
        self.check_unique(collection, &data)?;
        self.last_id += 1;
        let doc = Document::new(self.last_id, data);
        self.collections
            .entry(collection)
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.first(collection, filter).cloned())
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .docs(collection)
            .iter()
            .filter(|doc| filter.matches(doc.id, &doc.data))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: Collection, doc: Value) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.insert(collection, doc)?.id)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.first_mut(collection, filter) {
            Some(doc) => {
                merge(&mut doc.data, patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        let n = inner
            .docs(collection)
            .iter()
            .filter(|doc| filter.matches(doc.id, &doc.data))
            .count();
        Ok(n as u64)
    }

    async fn upsert(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        set_on_insert: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(doc) = inner.first_mut(collection, filter) {
            merge(&mut doc.data, set);
            return Ok(doc.clone());
        }
        inner.insert(collection, upsert_seed(filter, set, set_on_insert))
    }

    async fn find_or_insert(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Value,
    ) -> Result<(Document, bool), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(doc) = inner.first(collection, filter) {
            return Ok((doc.clone(), false));
        }
        Ok((inner.insert(collection, doc)?, true))
    }
}
