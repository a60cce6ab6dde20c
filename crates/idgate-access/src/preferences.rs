//! Preference documents and layered merging.

use idgate_core::error::IdgateResult;
use idgate_core::models::preferences::UserPreferences;
use idgate_core::repository::PreferencesRepository;
use serde_json::Value;
use uuid::Uuid;

/// Deep-merge ordered layers into one document, left to right.
///
/// For each field present in a later layer: a null value is skipped (it
/// neither overwrites nor creates the field), two nested objects merge
/// recursively, and anything else (scalars and arrays alike) replaces
/// the earlier value wholesale. Returns `None` for empty input.
///
/// The merge is associative across layer concatenation:
/// `merge([A, B, C]) == merge([merge([A, B]), C])`.
pub fn merge(layers: impl IntoIterator<Item = Value>) -> Option<Value> {
    let mut layers = layers.into_iter();
    let mut base = layers.next()?;
    for layer in layers {
        merge_value(&mut base, layer);
    }
    Some(base)
}

fn merge_value(base: &mut Value, incoming: Value) {
    if incoming.is_null() {
        return;
    }
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

fn empty_document() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Preference service — one opaque document per (user, namespace).
pub struct PreferenceService<P: PreferencesRepository> {
    preferences: P,
}

impl<P: PreferencesRepository> PreferenceService<P> {
    pub fn new(preferences: P) -> Self {
        Self { preferences }
    }

    /// The stored document for (user, namespace), or `{}` when nothing is
    /// stored — absence means "all defaults", not an error.
    pub async fn get(&self, user_id: Uuid, namespace: &str) -> IdgateResult<Value> {
        Ok(self
            .preferences
            .find(user_id, namespace)
            .await?
            .map(|record| record.data)
            .unwrap_or_else(empty_document))
    }

    /// Overwrite the document stored under (user, namespace).
    pub async fn put(
        &self,
        user_id: Uuid,
        namespace: &str,
        data: Value,
    ) -> IdgateResult<UserPreferences> {
        self.preferences
            .upsert(user_id, namespace.to_string(), data)
            .await
    }

    /// Effective preferences: the given base layers (defaults, org, …)
    /// merged in order, with the user's stored document applied last.
    pub async fn effective(
        &self,
        user_id: Uuid,
        namespace: &str,
        base_layers: Vec<Value>,
    ) -> IdgateResult<Value> {
        let mut layers = base_layers;
        if let Some(record) = self.preferences.find(user_id, namespace).await? {
            layers.push(record.data);
        }
        Ok(merge(layers).unwrap_or_else(empty_document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_layers_win() {
        let merged = merge([json!({"a": 1, "b": 2}), json!({"b": 9})]).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": 9}));
    }

    #[test]
    fn null_fields_are_skipped() {
        let merged = merge([json!({"a": 1, "b": 2}), json!({"b": null, "c": 3})]).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn null_never_creates_a_field() {
        let merged = merge([json!({"a": 1}), json!({"b": null})]).unwrap();
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let merged = merge([
            json!({"ui": {"theme": "dark", "density": "compact"}}),
            json!({"ui": {"theme": "light"}}),
        ])
        .unwrap();
        assert_eq!(
            merged,
            json!({"ui": {"theme": "light", "density": "compact"}})
        );
    }

    #[test]
    fn arrays_replace_wholesale() {
        let merged = merge([json!({"tags": [1, 2, 3]}), json!({"tags": [4]})]).unwrap();
        assert_eq!(merged, json!({"tags": [4]}));
    }

    #[test]
    fn scalar_replaces_object() {
        let merged = merge([json!({"x": {"deep": true}}), json!({"x": 5})]).unwrap();
        assert_eq!(merged, json!({"x": 5}));
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(merge([]).is_none());
    }

    #[test]
    fn merge_is_associative_across_concatenation() {
        let a = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        let b = json!({"b": 2, "nested": {"y": 3, "z": null}});
        let c = json!({"a": null, "nested": {"x": 4}});

        let all_at_once = merge([a.clone(), b.clone(), c.clone()]).unwrap();
        let staged = merge([merge([a, b]).unwrap(), c]).unwrap();
        assert_eq!(all_at_once, staged);
    }
}
