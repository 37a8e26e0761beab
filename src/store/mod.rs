// src/store/mod.rs

//! Persistence boundary.
//!
//! The service only ever talks to a [`DocumentStore`]: a collection-scoped
//! document store whose primitives are each atomic on a single document.
//! Nothing here offers multi-document transactions.

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

pub use error::StoreError;
pub use filter::Filter;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Handle shared by every request handler.
pub type SharedStore = Arc<dyn DocumentStore>;

/// Named groups of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Quizzes,
    Answers,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Quizzes => "quizzes",
            Collection::Answers => "answers",
        }
    }

    /// Fields that together must be unique within the collection, if any.
    pub const fn unique_key(self) -> Option<&'static [&'static str]> {
        match self {
            Collection::Users => Some(&["userId"]),
            Collection::Quizzes => None,
            Collection::Answers => Some(&["userId", "quizId"]),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored JSON object together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub data: Value,
}

impl Document {
    pub fn new(id: i64, data: Value) -> Self {
        Self { id, data }
    }

    /// Deserializes the document into a model, exposing the store id as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        match &mut data {
            Value::Object(fields) => {
                fields.insert("id".to_string(), Value::from(self.id));
            }
            _ => {
                return Err(StoreError::Unavailable(format!(
                    "document {} is not a JSON object",
                    self.id
                )));
            }
        }
        serde_json::from_value(data).map_err(|e| {
            StoreError::Unavailable(format!("malformed document {}: {}", self.id, e))
        })
    }
}

/// Collection-scoped document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the first document (in insertion order) matching `filter`.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns every matching document in insertion order.
    async fn find(&self, collection: Collection, filter: &Filter)
    -> Result<Vec<Document>, StoreError>;

    /// Stores a new document and returns its id.
    ///
    /// Fails with [`StoreError::Conflict`] when the collection's unique key
    /// is already taken.
    async fn insert(&self, collection: Collection, doc: Value) -> Result<i64, StoreError>;

    /// Shallow-merges `patch` into the first matching document.
    ///
    /// Returns the number of documents touched, 0 or 1.
    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Map<String, Value>,
    ) -> Result<u64, StoreError>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    /// Atomically merges `set` into the matching document, or inserts a new
    /// document built from the filter fields, `set_on_insert` and `set`.
    async fn upsert(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        set_on_insert: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Atomically returns the matching document, inserting `doc` first when
    /// there is none. The flag is `true` when the document was created.
    async fn find_or_insert(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Value,
    ) -> Result<(Document, bool), StoreError>;
}

/// Serializes a model into a storable JSON object.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Unavailable(e.to_string()))
}

/// Merges the top-level fields of `patch` into `target`.
pub(crate) fn merge(target: &mut Value, patch: Map<String, Value>) {
    if let Value::Object(fields) = target {
        fields.extend(patch);
    } else {
        *target = Value::Object(patch);
    }
}

/// Builds the document an upsert inserts when nothing matches.
pub(crate) fn upsert_seed(
    filter: &Filter,
    set: Map<String, Value>,
    set_on_insert: Map<String, Value>,
) -> Value {
    let mut doc = filter.fields().clone();
    doc.extend(set_on_insert);
    doc.extend(set);
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        id: i64,
        name: String,
    }

    #[test]
    fn decode_exposes_store_id() {
        let sample: Sample = Document::new(7, json!({"name": "x"})).decode().unwrap();
        assert_eq!(sample.id, 7);
        assert_eq!(sample.name, "x");
    }

    #[test]
    fn decode_rejects_non_objects() {
        let err = Document::new(1, json!([1, 2])).decode::<Sample>().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn upsert_seed_lets_set_win() {
        let filter = Filter::new().eq("userId", "u1");
        let mut set = Map::new();
        set.insert("answers".into(), json!(["a"]));
        let mut on_insert = Map::new();
        on_insert.insert("answers".into(), json!([]));
        on_insert.insert("createdAt".into(), json!("now"));

        let doc = upsert_seed(&filter, set, on_insert);
        assert_eq!(doc, json!({"userId": "u1", "answers": ["a"], "createdAt": "now"}));
    }
}
