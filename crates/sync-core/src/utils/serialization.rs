//! JSON helpers. `deep_merge_json_objects` backs the IntegrationConfig PATCH
//! semantics (§4.6): a config update merges into the persisted document
//! rather than replacing it wholesale.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{SyncError, SyncResult};

pub fn to_json_value<T>(value: &T) -> SyncResult<serde_json::Value>
where
    T: Serialize,
{
    serde_json::to_value(value).map_err(SyncError::from)
}

pub fn from_json_value<T>(value: serde_json::Value) -> SyncResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(SyncError::from)
}

/// Recursively merges `other` into `base`. Nested objects are merged key by
/// key; any other value (including arrays) is replaced wholesale by `other`'s
/// value. Used to apply a partial `IntegrationConfig` update without
/// clobbering fields the caller didn't mention.
pub fn deep_merge_json_objects(base: &mut serde_json::Value, other: serde_json::Value) {
    match (base, other) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(other_map)) => {
            for (key, value) in other_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge_json_objects(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, other) => {
            *base_slot = other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_preserves_untouched_siblings() {
        let mut base = serde_json::json!({
            "enabledPhoneIds": ["a", "b"],
            "quoMessageWebhooks": { "id": "w1", "resourceIds": ["a"] }
        });
        let patch = serde_json::json!({
            "quoMessageWebhooks": { "resourceIds": ["a", "b"] }
        });
        deep_merge_json_objects(&mut base, patch);
        assert_eq!(base["quoMessageWebhooks"]["id"], "w1");
        assert_eq!(base["quoMessageWebhooks"]["resourceIds"], serde_json::json!(["a", "b"]));
        assert_eq!(base["enabledPhoneIds"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn deep_merge_replaces_non_object_values() {
        let mut base = serde_json::json!({ "count": 1 });
        deep_merge_json_objects(&mut base, serde_json::json!({ "count": 2 }));
        assert_eq!(base["count"], 2);
    }
}
