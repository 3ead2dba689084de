//! Typed output of a decode call.
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::descriptor::RecordDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Identifier(Uuid),
    List(Vec<Decoded>),
    /// Entries in raw key order.
    Map(Vec<(Decoded, Decoded)>),
    Enum(EnumValue),
    Record(RecordValue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub enumeration: String,
    pub label: String,
}

/// How a record was read from its raw mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One raw key per field.
    Keyed,
    /// Every field decoded from the whole mapping.
    Joint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValue {
    pub def: Arc<RecordDef>,
    pub layout: Layout,
    /// Positional, in `def.fields` order.
    pub values: Vec<Decoded>,
}

impl RecordValue {
    pub fn name(&self) -> &str { &self.def.name }

    pub fn get(&self, field: &str) -> Option<&Decoded> {
        self.def.position(field).and_then(|i| self.values.get(i))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Decoded)> {
        self.def
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }
}

impl Decoded {
    pub fn is_null(&self) -> bool { matches!(self, Decoded::Null) }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Decoded::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Decoded]> {
        match self {
            Decoded::List(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Decoded::Str(s) => Some(s),
            Decoded::Enum(e) => Some(&e.label),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Decoded::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Field lookup on a record value; `None` for anything else.
    pub fn get(&self, field: &str) -> Option<&Decoded> {
        self.as_record().and_then(|r| r.get(field))
    }

    /// Encode back into raw JSON using the record layouts.
    ///
    /// Joint records are flattened: the object parts of their fields are merged
    /// into one mapping, earlier parts winning on key clashes.
    pub fn to_json(&self) -> Value {
        match self {
            Decoded::Null => Value::Null,
            Decoded::Bool(b) => Value::Bool(*b),
            Decoded::Int(i) => Value::from(*i),
            Decoded::Str(s) => Value::String(s.clone()),
            Decoded::Identifier(id) => Value::String(id.hyphenated().to_string()),
            Decoded::List(xs) => Value::Array(xs.iter().map(Decoded::to_json).collect()),
            Decoded::Map(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k.to_key(), v.to_json());
                }
                Value::Object(map)
            }
            Decoded::Enum(e) => Value::String(e.label.clone()),
            Decoded::Record(r) => match r.layout {
                Layout::Keyed => {
                    let mut map = Map::new();
                    for (name, value) in r.fields() {
                        map.insert(name.to_string(), value.to_json());
                    }
                    Value::Object(map)
                }
                Layout::Joint => {
                    let mut map = Map::new();
                    for (_, part) in r.fields() {
                        if let Value::Object(part) = part.to_json() {
                            for (k, v) in part {
                                map.entry(k).or_insert(v);
                            }
                        }
                    }
                    Value::Object(map)
                }
            },
        }
    }

    fn to_key(&self) -> String {
        match self.to_json() {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;
    use serde_json::json;

    #[test]
    fn keyed_record_encodes_every_field() {
        let def = Arc::new(
            RecordDef::new("Point")
                .field("x", Descriptor::int())
                .field("tag", Descriptor::nullable(Descriptor::string())),
        );
        let point = Decoded::Record(RecordValue {
            def,
            layout: Layout::Keyed,
            values: vec![Decoded::Int(3), Decoded::Null],
        });
        assert_eq!(point.to_json(), json!({"x": 3, "tag": null}));
        assert_eq!(point.get("x"), Some(&Decoded::Int(3)));
        assert_eq!(point.get("y"), None);
    }

    #[test]
    fn joint_record_flattens_parts() {
        let sub = Arc::new(RecordDef::new("Sub").field("type", Descriptor::string()));
        let ext = Arc::new(RecordDef::new("Ext").field("minimum", Descriptor::string()));
        let both = Arc::new(
            RecordDef::new("Both")
                .field("sub", Descriptor::Record(sub.clone()))
                .field("ext", Descriptor::Record(ext.clone())),
        );
        let value = Decoded::Record(RecordValue {
            def: both,
            layout: Layout::Joint,
            values: vec![
                Decoded::Record(RecordValue { def: sub, layout: Layout::Keyed, values: vec![Decoded::Str("integer".into())] }),
                Decoded::Record(RecordValue { def: ext, layout: Layout::Keyed, values: vec![Decoded::Str("0".into())] }),
            ],
        });
        assert_eq!(value.to_json(), json!({"type": "integer", "minimum": "0"}));
    }
}
