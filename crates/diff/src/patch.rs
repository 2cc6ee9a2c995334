//! The patch model and its JSON wire form.
//!
//! Wire encoding matches the collaboration protocol's frames: `Remove` is
//! JSON `null`, `Update` is an object of nested patches, `Replace` is the
//! raw replacement value. On decode every JSON object parses as `Update`;
//! a `Replace` of a record therefore comes back as an `Update`, which is
//! apply-equivalent (a non-record base merges against the empty record).

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::doc::Doc;

/// Ordered keyed record of sub-patches.
pub type PatchMap = IndexMap<String, Patch>;

/// The minimal-edit description transforming one document into another.
///
/// "Nothing changed" is not representable here; [`crate::diff`] returns
/// `Option<Patch>` and `None` is the no-op.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    /// The field is removed (or the whole document becomes null).
    Remove,
    /// The field takes this value wholesale.
    Replace(Doc),
    /// The field is a record whose listed keys change; absent keys are
    /// carried forward unchanged.
    Update(PatchMap),
}

impl Patch {
    /// Decodes a patch from its JSON wire form.
    pub fn from_value(value: Value) -> Patch {
        match value {
            Value::Null => Patch::Remove,
            Value::Object(map) => Patch::Update(
                map.into_iter()
                    .map(|(k, v)| (k, Patch::from_value(v)))
                    .collect(),
            ),
            other => Patch::Replace(Doc::from(other)),
        }
    }

    /// Encodes a patch into its JSON wire form.
    pub fn to_value(&self) -> Value {
        match self {
            Patch::Remove => Value::Null,
            Patch::Replace(doc) => Value::from(doc.clone()),
            Patch::Update(map) => Value::Object(
                map.iter()
                    .map(|(k, p)| (k.clone(), p.to_value()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Remove => serializer.serialize_unit(),
            Patch::Replace(doc) => doc.serialize(serializer),
            Patch::Update(map) => {
                let mut rec = serializer.serialize_map(Some(map.len()))?;
                for (k, p) in map {
                    rec.serialize_entry(k, p)?;
                }
                rec.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Patch, D::Error> {
        Value::deserialize(deserializer).map(Patch::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply_patch;
    use serde_json::json;

    #[test]
    fn remove_encodes_as_null() {
        assert_eq!(Patch::Remove.to_value(), Value::Null);
        assert_eq!(Patch::from_value(Value::Null), Patch::Remove);
    }

    #[test]
    fn update_wire_round_trip() {
        let patch = Patch::from_value(json!({"x": 5, "gone": null, "sub": {"y": true}}));
        assert_eq!(Patch::from_value(patch.to_value()), patch);
    }

    #[test]
    fn replace_record_decodes_as_equivalent_update() {
        // Replace(record) loses its tag on the wire but not its meaning:
        // applied to the scalar it replaced, the decoded Update produces
        // the same document.
        let base = Doc::from(json!(7));
        let replace = Patch::Replace(Doc::from(json!({"a": 1})));
        let decoded = Patch::from_value(replace.to_value());
        assert!(matches!(decoded, Patch::Update(_)));
        assert_eq!(apply_patch(&base, &decoded), apply_patch(&base, &replace));
    }
}
