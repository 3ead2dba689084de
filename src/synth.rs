//! Per-variant decode closures.
//!
//! A closure never holds a dependency's decoder. It reaches dependencies
//! through the `Deps` view it is handed at call time, which reads the owning
//! node's slot list. That is what makes synthesis order irrelevant.
use serde_json::Value;
use uuid::Uuid;

use crate::descriptor::AtomKind;
use crate::error::{DecodeError, DecodeErrorKind, Expected, Segment};
use crate::ir::Ty;
use crate::registry::Deps;
use crate::value::{Decoded, EnumValue, Layout, RecordValue};

pub(crate) type DecodeFn =
    Box<dyn Fn(Deps<'_>, Option<&Value>) -> Result<Decoded, DecodeError> + Send + Sync>;

// pins the higher-ranked signature for closure inference
fn decoder<F>(f: F) -> DecodeFn
where
    F: Fn(Deps<'_>, Option<&Value>) -> Result<Decoded, DecodeError> + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) fn synthesize(ty: &Ty) -> DecodeFn {
    let name = ty.to_string();
    match ty {
        Ty::Atomic(kind) => atomic(name, *kind),

        Ty::Null => decoder(move |_, raw| match raw {
            None | Some(Value::Null) => Ok(Decoded::Null),
            Some(other) => Err(mismatch(&name, Expected::Null, other)),
        }),

        Ty::Identifier => decoder(move |_, raw| {
            let text = match require(&name, raw)? {
                Value::String(s) => s,
                other => return Err(mismatch(&name, Expected::String, other)),
            };
            Uuid::parse_str(text).map(Decoded::Identifier).map_err(|e| {
                DecodeError::new(&name, DecodeErrorKind::MalformedIdentifier {
                    value: text.clone(),
                    reason: e.to_string(),
                })
            })
        }),

        Ty::Sequence(_) => decoder(move |deps, raw| {
            let items = match require(&name, raw)? {
                Value::Array(xs) => xs,
                other => return Err(mismatch(&name, Expected::Array, other)),
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| deps.call(0, Some(item)).map_err(|e| e.within(Segment::Index(i))))
                .collect::<Result<Vec<_>, _>>()
                .map(Decoded::List)
        }),

        Ty::Mapping(..) => decoder(move |deps, raw| {
            let map = match require(&name, raw)? {
                Value::Object(m) => m,
                other => return Err(mismatch(&name, Expected::Object, other)),
            };
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                let key = deps
                    .call(0, Some(&Value::String(k.clone())))
                    .map_err(|e| e.within(Segment::Key(k.clone())))?;
                let value = deps
                    .call(1, Some(v))
                    .map_err(|e| e.within(Segment::Key(k.clone())))?;
                entries.push((key, value));
            }
            Ok(Decoded::Map(entries))
        }),

        Ty::Enumeration(def) => {
            let def = def.clone();
            decoder(move |_, raw| {
                let label = match require(&name, raw)? {
                    Value::String(s) => s,
                    other => return Err(mismatch(&name, Expected::String, other)),
                };
                if !def.contains(label) {
                    return Err(DecodeError::new(&name, DecodeErrorKind::UnknownLabel { label: label.clone() }));
                }
                Ok(Decoded::Enum(EnumValue {
                    enumeration: def.name.clone(),
                    label: label.clone(),
                }))
            })
        }

        Ty::Record(def) => {
            let def = def.clone();
            decoder(move |deps, raw| {
                let map = match require(&name, raw)? {
                    Value::Object(m) => m,
                    other => return Err(mismatch(&name, Expected::Object, other)),
                };
                let mut values = Vec::with_capacity(def.fields.len());
                for (i, field) in def.fields.iter().enumerate() {
                    let value = deps
                        .call(i, map.get(&field.name))
                        .map_err(|e| e.within(Segment::Field(field.name.clone())))?;
                    values.push(value);
                }
                // assembly
                if let Some(field) = def.fields.iter().find(|f| f.required && !map.contains_key(&f.name)) {
                    return Err(DecodeError::new(&name, DecodeErrorKind::MissingRequired {
                        field: field.name.clone(),
                    }));
                }
                Ok(Decoded::Record(RecordValue { def: def.clone(), layout: Layout::Keyed, values }))
            })
        }

        Ty::Nullable(_) => decoder(move |deps, raw| match raw {
            None | Some(Value::Null) => Ok(Decoded::Null),
            Some(value) => deps.call(0, Some(value)),
        }),

        Ty::Joint(def) => {
            let def = def.clone();
            decoder(move |deps, raw| {
                let mut values = Vec::with_capacity(def.fields.len());
                for (i, field) in def.fields.iter().enumerate() {
                    // same raw value for every part
                    let value = deps
                        .call(i, raw)
                        .map_err(|e| e.within(Segment::Part(i, field.name.clone())))?;
                    values.push(value);
                }
                Ok(Decoded::Record(RecordValue { def: def.clone(), layout: Layout::Joint, values }))
            })
        }
    }
}

fn atomic(name: String, kind: AtomKind) -> DecodeFn {
    decoder(move |_, raw| {
        let value = require(&name, raw)?;
        let out = match (kind, value) {
            (AtomKind::Integer, Value::Number(n)) => n.as_i64().map(Decoded::Int),
            (AtomKind::String, Value::String(s)) => Some(Decoded::Str(s.clone())),
            (AtomKind::Boolean, Value::Bool(b)) => Some(Decoded::Bool(*b)),
            _ => None,
        };
        out.ok_or_else(|| mismatch(&name, Expected::Atom(kind), value))
    })
}

// -------------------- helpers --------------------

fn require<'v>(name: &str, raw: Option<&'v Value>) -> Result<&'v Value, DecodeError> {
    raw.ok_or_else(|| DecodeError::new(name, DecodeErrorKind::Missing))
}

fn mismatch(name: &str, expected: Expected, found: &Value) -> DecodeError {
    DecodeError::new(name, DecodeErrorKind::KindMismatch { expected, found: kind_name(found) })
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "integer",
        // only reachable for values above i64::MAX
        Value::Number(n) if n.is_u64() => "out-of-range integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
