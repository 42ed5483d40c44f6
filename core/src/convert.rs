//! Conversion between `Value` and JSON.
//!
//! # Design
//! `unstructure` is purely structural: records become objects in field
//! order, `Omitted` fields are dropped, tuples and lists both become arrays,
//! datetimes become RFC 3339 strings.
//!
//! `structure` is driven by a `TypeDesc`. Hooks registered for an exact type
//! take precedence over the built-in rules, which is the only way to
//! structure a `TypeDesc::Named` type.
//!
//! `to_typed` / `from_typed` bridge to ordinary serde types by going through
//! the JSON form.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value as Json};

use crate::error::ConvertError;
use crate::types::{Primitive, RecordType, TypeDesc};
use crate::value::{Record, Value};

type StructureFn = dyn Fn(&Json) -> Result<Value, ConvertError> + Send + Sync;

#[derive(Clone, Default)]
pub struct Converter {
    structure_hooks: HashMap<TypeDesc, Arc<StructureFn>>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("structure_hooks", &self.structure_hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `hook` whenever JSON is structured into exactly `ty`.
    pub fn register_structure_hook<F>(&mut self, ty: TypeDesc, hook: F)
    where
        F: Fn(&Json) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        if self.structure_hooks.insert(ty.clone(), Arc::new(hook)).is_some() {
            tracing::warn!(%ty, "structure hook already registered, overriding");
        }
    }

    pub fn unstructure(&self, value: &Value) -> Json {
        match value {
            Value::Null | Value::Omitted => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::DateTime(dt) => Json::String(dt.to_rfc3339()),
            Value::List(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(|v| self.unstructure(v)).collect())
            }
            Value::Record(record) => {
                let object: Map<String, Json> = record
                    .fields()
                    .filter(|(_, v)| !v.is_omitted())
                    .map(|(k, v)| (k.to_string(), self.unstructure(v)))
                    .collect();
                Json::Object(object)
            }
        }
    }

    pub fn structure(&self, json: &Json, ty: &TypeDesc) -> Result<Value, ConvertError> {
        if let Some(hook) = self.structure_hooks.get(ty) {
            return hook(json);
        }
        match ty {
            TypeDesc::Null => match json {
                Json::Null => Ok(Value::Null),
                other => Err(mismatch(ty, other)),
            },
            TypeDesc::Primitive(p) => structure_primitive(*p, json, ty),
            TypeDesc::Named(_) => Err(ConvertError::Unsupported(ty.clone())),
            TypeDesc::Record(record) => self.structure_record(json, record, ty),
            TypeDesc::Union(alts) => {
                if alts.is_empty() {
                    return Err(ConvertError::Unsupported(ty.clone()));
                }
                alts.iter()
                    .find_map(|alt| self.structure(json, alt).ok())
                    .ok_or_else(|| ConvertError::NoAlternative(ty.clone()))
            }
            // Elements past the declared arguments reuse the last one.
            TypeDesc::Tuple(items) => {
                let Some(last) = items.last() else {
                    return Err(ConvertError::Unsupported(ty.clone()));
                };
                let array = json.as_array().ok_or_else(|| mismatch(ty, json))?;
                let values = array
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.structure(item, items.get(i).unwrap_or(last)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(values))
            }
            TypeDesc::Sequence(element) => {
                let array = json.as_array().ok_or_else(|| mismatch(ty, json))?;
                let values = array
                    .iter()
                    .map(|item| self.structure(item, element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(values))
            }
        }
    }

    fn structure_record(&self, json: &Json, record: &RecordType, ty: &TypeDesc) -> Result<Value, ConvertError> {
        let object = json.as_object().ok_or_else(|| mismatch(ty, json))?;
        let mut fields = Vec::with_capacity(record.fields().len());
        for field in record.fields() {
            let value = match (object.get(&field.name), &field.default) {
                (Some(item), _) => self.structure(item, &field.ty)?,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    let mut expected: Vec<String> = record.fields().iter().map(|f| f.name.clone()).collect();
                    let mut actual: Vec<String> = object.keys().cloned().collect();
                    expected.sort();
                    actual.sort();
                    return Err(ConvertError::MismatchedFields {
                        record: record.name().to_string(),
                        expected,
                        actual,
                        missing: field.name.clone(),
                    });
                }
            };
            fields.push((field.name.clone(), value));
        }
        Ok(Value::Record(Record::new(record.name(), fields)))
    }

    /// Deserialize a generated value into a serde type.
    pub fn to_typed<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ConvertError> {
        Ok(serde_json::from_value(self.unstructure(value))?)
    }

    /// Serialize a serde type and structure it as `ty`.
    pub fn from_typed<T: Serialize>(&self, value: &T, ty: &TypeDesc) -> Result<Value, ConvertError> {
        let json = serde_json::to_value(value)?;
        self.structure(&json, ty)
    }
}

fn structure_primitive(p: Primitive, json: &Json, ty: &TypeDesc) -> Result<Value, ConvertError> {
    match (p, json) {
        (Primitive::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (Primitive::Int, Json::Number(n)) if n.is_i64() || n.is_u64() => {
            n.as_i64().map(Value::Int).ok_or_else(|| mismatch(ty, json))
        }
        (Primitive::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(|| mismatch(ty, json)),
        (Primitive::Str, Json::String(s)) => Ok(Value::Str(s.clone())),
        (Primitive::DateTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(Value::DateTime)
            .map_err(|_| ConvertError::TypeMismatch {
                expected: "RFC 3339 datetime".to_string(),
                actual: format!("{s:?}"),
            }),
        // Anything that is not a string has no datetime reading.
        (Primitive::DateTime, _) => Ok(Value::Null),
        _ => Err(mismatch(ty, json)),
    }
}

fn mismatch(ty: &TypeDesc, json: &Json) -> ConvertError {
    ConvertError::TypeMismatch {
        expected: ty.to_string(),
        actual: json_kind(json).to_string(),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
