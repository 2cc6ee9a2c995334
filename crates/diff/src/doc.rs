//! The document model: a closed tagged variant for tree-shaped values.
//!
//! A [`Doc`] is a scalar, `null`, an ordered list, or a keyed record.
//! Records preserve insertion order (`IndexMap`), which matters when an
//! id-keyed element map is flattened back into an element list.

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

/// Ordered keyed record of sub-documents.
pub type DocMap = IndexMap<String, Doc>;

/// A primitive document leaf.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Num(Number),
    Str(String),
}

/// Any tree-shaped value subject to diffing. No cycles by construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Doc {
    #[default]
    Null,
    Scalar(Scalar),
    List(Vec<Doc>),
    Record(DocMap),
}

impl Doc {
    /// Empty-record constructor, the apply-time stand-in for an absent base.
    pub fn empty_record() -> Doc {
        Doc::Record(DocMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Doc::Null)
    }

    pub fn as_record(&self) -> Option<&DocMap> {
        match self {
            Doc::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Doc]> {
        match self {
            Doc::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Doc::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key on a record document; `None` for non-records.
    pub fn get(&self, key: &str) -> Option<&Doc> {
        self.as_record().and_then(|map| map.get(key))
    }
}

impl From<&str> for Doc {
    fn from(s: &str) -> Doc {
        Doc::Scalar(Scalar::Str(s.to_owned()))
    }
}

// ── JSON interop ──────────────────────────────────────────────────────────

impl From<Value> for Doc {
    fn from(value: Value) -> Doc {
        match value {
            Value::Null => Doc::Null,
            Value::Bool(b) => Doc::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Doc::Scalar(Scalar::Num(n)),
            Value::String(s) => Doc::Scalar(Scalar::Str(s)),
            Value::Array(items) => Doc::List(items.into_iter().map(Doc::from).collect()),
            Value::Object(map) => {
                Doc::Record(map.into_iter().map(|(k, v)| (k, Doc::from(v))).collect())
            }
        }
    }
}

impl From<Doc> for Value {
    fn from(doc: Doc) -> Value {
        match doc {
            Doc::Null => Value::Null,
            Doc::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Doc::Scalar(Scalar::Num(n)) => Value::Number(n),
            Doc::Scalar(Scalar::Str(s)) => Value::String(s),
            Doc::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Doc::Record(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Doc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Doc::Null => serializer.serialize_unit(),
            Doc::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Doc::Scalar(Scalar::Num(n)) => n.serialize(serializer),
            Doc::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
            Doc::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Doc::Record(map) => {
                let mut rec = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    rec.serialize_entry(k, v)?;
                }
                rec.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Doc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Doc, D::Error> {
        Value::deserialize(deserializer).map(Doc::from)
    }
}
