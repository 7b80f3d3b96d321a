//! Partial attribute maps used by the style editor and update commands.
//!
//! A patch is a JSON object merged key-wise into an element's serialized form,
//! so nested values such as `position` or `style` can be updated one field at a time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A partial set of element attributes.
pub type Attrs = Map<String, Value>;

/// Keys a patch may never touch.
const PROTECTED_KEYS: &[&str] = &["id", "type"];

/// Build an attribute map from a JSON value. Non-object values yield an empty map.
pub fn attrs(value: Value) -> Attrs {
    match value {
        Value::Object(map) => map,
        _ => Attrs::new(),
    }
}

/// Recursively merge `patch` into `target`. Objects merge key-wise, everything else replaces.
pub fn merge_value(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Produce a copy of `item` with `patch` merged into it.
pub fn patched<T>(item: &T, patch: &Attrs) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(item)?;
    if let Value::Object(fields) = &mut value {
        for (key, patch_value) in patch {
            if PROTECTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            match fields.get_mut(key) {
                Some(existing) => merge_value(existing, patch_value),
                None => {
                    fields.insert(key.clone(), patch_value.clone());
                }
            }
        }
    }
    serde_json::from_value(value)
}

/// Capture the current top-level values of `item` for each key in `keys`.
/// Keys the item does not have are skipped.
pub fn snapshot_attrs<'a, T, I>(item: &T, keys: I) -> Attrs
where
    T: Serialize,
    I: IntoIterator<Item = &'a String>,
{
    let Ok(Value::Object(fields)) = serde_json::to_value(item) else {
        return Attrs::new();
    };
    keys.into_iter()
        .filter_map(|key| fields.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u32,
        name: String,
        position: Pos,
        #[serde(default)]
        note: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Pos {
        x: f64,
        y: f64,
    }

    fn sample() -> Sample {
        Sample {
            id: 7,
            name: "a".to_string(),
            position: Pos { x: 1.0, y: 2.0 },
            note: None,
        }
    }

    #[test]
    fn test_nested_merge() {
        let next = patched(&sample(), &attrs(json!({ "position": { "x": 10.0 } }))).unwrap();
        assert!((next.position.x - 10.0).abs() < f64::EPSILON);
        assert!((next.position.y - 2.0).abs() < f64::EPSILON);
        assert_eq!(next.name, "a");
    }

    #[test]
    fn test_id_is_protected() {
        let next = patched(&sample(), &attrs(json!({ "id": 99, "name": "b" }))).unwrap();
        assert_eq!(next.id, 7);
        assert_eq!(next.name, "b");
    }

    #[test]
    fn test_invalid_patch_is_error() {
        assert!(patched(&sample(), &attrs(json!({ "name": 5 }))).is_err());
    }

    #[test]
    fn test_patch_is_idempotent() {
        let patch = attrs(json!({ "note": "hi", "position": { "y": 4.0 } }));
        let once = patched(&sample(), &patch).unwrap();
        let twice = patched(&once, &patch).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_snapshot_attrs() {
        let patch = attrs(json!({ "position": { "x": 3.0 }, "missing": 1 }));
        let snap = snapshot_attrs(&sample(), patch.keys());
        assert_eq!(snap.len(), 1);
        assert_eq!(snap["position"], json!({ "x": 1.0, "y": 2.0 }));
    }

    #[test]
    fn test_attrs_from_non_object() {
        assert!(attrs(json!([1, 2])).is_empty());
    }
}
