// src/store/filter.rs

use serde_json::{Map, Value};

/// Equality filter over a document id and top-level fields.
///
/// An empty filter matches every document in a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    id: Option<i64>,
    fields: Map<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: i64) -> Self {
        Self::new().id(id)
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Requires `field` to equal `value` exactly, JSON type included.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn id_constraint(&self) -> Option<i64> {
        self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn matches(&self, id: i64, data: &Value) -> bool {
        if self.id.is_some_and(|wanted| wanted != id) {
            return false;
        }
        self.fields
            .iter()
            .all(|(field, value)| data.get(field) == Some(value))
    }

    /// Stable textual form, used to serialize concurrent writers on one key.
    pub fn lock_key(&self, collection: &str) -> String {
        format!(
            "{}:{}:{}",
            collection,
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            Value::Object(self.fields.clone())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::new().matches(3, &json!({"a": 1})));
    }

    #[test]
    fn id_and_fields_must_all_match() {
        let filter = Filter::by_id(4).eq("userId", "u1");
        assert!(filter.matches(4, &json!({"userId": "u1", "title": "t"})));
        assert!(!filter.matches(5, &json!({"userId": "u1"})));
        assert!(!filter.matches(4, &json!({"userId": "u2"})));
        assert!(!filter.matches(4, &json!({})));
    }

    #[test]
    fn equality_is_type_strict() {
        let filter = Filter::new().eq("quizId", 12);
        assert!(filter.matches(1, &json!({"quizId": 12})));
        assert!(!filter.matches(1, &json!({"quizId": "12"})));
    }
}
