//! Validation and conversion for every codec shape.
//!
//! | Codec        | Validate                                  | Convert / reverse           |
//! |--------------|-------------------------------------------|-----------------------------|
//! | primitive    | JSON representation check                 | identity                    |
//! | any          | always                                    | identity                    |
//! | none         | absent slot only                          | identity                    |
//! | literal      | deep-equal, numbers compared numerically  | identity                    |
//! | list         | every element, tagged `in list`           | element-wise                |
//! | tuple        | exact arity and every position, one error | positional                  |
//! | object       | declared keys, tagged `in object.<key>`   | declared keys only          |
//! | record       | every value, tagged `in record`           | value-wise                  |
//! | union        | any alternative, last declared first      | last matching alternative   |
//! | intersection | every operand                             | shallow merge, later wins   |
//! | derive       | base, then derivation on converted value  | composed with the base      |
//!
//! An absent slot converts to an absent slot for every codec.

use jc_types::schema::Primitive;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::codec::{Codec, CodecKind};
use crate::error::{CodecError, ConvertError, ValidateError};

type Slot = Option<Value>;

impl Codec {
    // ── Validation ────────────────────────────────────────────────────────────

    /// Validate a present wire value.
    pub fn validate(&self, value: &Value) -> Result<(), ValidateError> {
        self.validate_slot(Some(value))
    }

    /// Validate a wire slot that may be absent.
    pub fn validate_slot(&self, slot: Option<&Value>) -> Result<(), ValidateError> {
        let reject = || Err(ValidateError::expected(self.description()));

        let value = match (self.kind(), slot) {
            (CodecKind::Any, _) => return Ok(()),
            (CodecKind::None, None) => return Ok(()),
            (CodecKind::None, Some(_)) => return reject(),
            (CodecKind::Union(alternatives), _) => {
                return if alternatives.iter().rev().any(|a| a.validate_slot(slot).is_ok()) {
                    Ok(())
                } else {
                    reject()
                };
            }
            (CodecKind::Intersection(operands), _) => {
                return operands.iter().try_for_each(|op| op.validate_slot(slot));
            }
            (CodecKind::Derive(derive), _) => {
                derive.from.validate_slot(slot)?;
                let Ok(base) = derive.from.convert_slot(slot.cloned()) else {
                    return reject();
                };
                return match base {
                    Some(value) if !derive.derivation.validate(&value) => reject(),
                    _ => Ok(()),
                };
            }
            (CodecKind::Reference(lazy), _) => {
                return match lazy.get() {
                    Some(target) => target.validate_slot(slot),
                    None => reject(),
                };
            }
            (_, None) => return reject(),
            (_, Some(value)) => value,
        };

        match self.kind() {
            CodecKind::Primitive(primitive) => {
                let ok = matches!(
                    (primitive, value),
                    (Primitive::Number, Value::Number(_))
                        | (Primitive::String, Value::String(_))
                        | (Primitive::Boolean, Value::Bool(_))
                        | (Primitive::Null, Value::Null)
                );
                if ok {
                    Ok(())
                } else {
                    reject()
                }
            }
            CodecKind::Literal(expected) => {
                if json_eq(expected, value) {
                    Ok(())
                } else {
                    reject()
                }
            }
            CodecKind::List(item) => {
                let Value::Array(elements) = value else {
                    return reject();
                };
                elements
                    .iter()
                    .try_for_each(|e| item.validate(e).map_err(|err| err.in_context("list")))
            }
            CodecKind::Tuple(items) => match value {
                Value::Array(elements)
                    if elements.len() == items.len()
                        && items.iter().zip(elements).all(|(c, e)| c.validate(e).is_ok()) =>
                {
                    Ok(())
                }
                _ => reject(),
            },
            CodecKind::Object(fields) => {
                let Value::Object(map) = value else {
                    return reject();
                };
                fields.iter().try_for_each(|field| {
                    field
                        .codec
                        .validate_slot(map.get(&field.name))
                        .map_err(|err| err.in_context(format!("object.{}", field.name)))
                })
            }
            CodecKind::Record(item) => {
                let Value::Object(map) = value else {
                    return reject();
                };
                map.values()
                    .try_for_each(|v| item.validate(v).map_err(|err| err.in_context("record")))
            }
            CodecKind::Any
            | CodecKind::None
            | CodecKind::Union(_)
            | CodecKind::Intersection(_)
            | CodecKind::Derive(_)
            | CodecKind::Reference(_) => Ok(()),
        }
    }

    // ── Conversion ────────────────────────────────────────────────────────────

    /// Convert a validated wire value to its domain value.
    pub fn convert(&self, value: Value) -> Result<Value, ConvertError> {
        Ok(self.convert_slot(Some(value))?.unwrap_or(Value::Null))
    }

    /// Convert a validated wire slot to a domain slot.
    pub fn convert_slot(&self, slot: Slot) -> Result<Slot, ConvertError> {
        let Some(value) = slot else {
            return Ok(None);
        };
        let converted = match self.kind() {
            CodecKind::Primitive(_) | CodecKind::Any | CodecKind::None | CodecKind::Literal(_) => value,
            CodecKind::List(item) => Value::Array(
                self.elements(value)?
                    .into_iter()
                    .map(|e| item.convert(e))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Tuple(items) => Value::Array(
                self.positions(items.len(), value)?
                    .into_iter()
                    .zip(items)
                    .map(|(e, c)| c.convert(e))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Object(fields) => {
                let mut map = self.entries(value)?;
                let mut out = Map::new();
                for field in fields {
                    if let Some(v) = field.codec.convert_slot(map.remove(&field.name))? {
                        out.insert(field.name.clone(), v);
                    }
                }
                Value::Object(out)
            }
            CodecKind::Record(item) => Value::Object(
                self.entries(value)?
                    .into_iter()
                    .map(|(k, v)| item.convert(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Union(alternatives) => {
                let (index, chosen) = alternatives
                    .iter()
                    .enumerate()
                    .rev()
                    .find(|(_, a)| a.validate(&value).is_ok())
                    .ok_or_else(|| ConvertError::new(self.tag(), "no alternative accepts the value"))?;
                trace!(codec = %self, alternative = index, "union alternative chosen");
                chosen.convert(value)?
            }
            CodecKind::Intersection(operands) => {
                let results = operands
                    .iter()
                    .map(|op| op.convert_slot(Some(value.clone())))
                    .collect::<Result<Vec<_>, _>>()?;
                merge(results).unwrap_or(Value::Null)
            }
            CodecKind::Derive(derive) => {
                let base = derive.from.convert(value)?;
                derive
                    .derivation
                    .convert(base)
                    .map_err(|cause| ConvertError::new(self.tag(), cause))?
            }
            CodecKind::Reference(lazy) => self.target(lazy.get())?.convert(value)?,
        };
        Ok(Some(converted))
    }

    /// Convert a domain value back to its wire value.
    pub fn reverse_convert(&self, value: Value) -> Result<Value, ConvertError> {
        Ok(self.reverse_convert_slot(Some(value))?.unwrap_or(Value::Null))
    }

    /// Convert a domain slot back to a wire slot.
    pub fn reverse_convert_slot(&self, slot: Slot) -> Result<Slot, ConvertError> {
        let Some(value) = slot else {
            return Ok(None);
        };
        let converted = match self.kind() {
            CodecKind::Primitive(_) | CodecKind::Any | CodecKind::None | CodecKind::Literal(_) => value,
            CodecKind::List(item) => Value::Array(
                self.elements(value)?
                    .into_iter()
                    .map(|e| item.reverse_convert(e))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Tuple(items) => Value::Array(
                self.positions(items.len(), value)?
                    .into_iter()
                    .zip(items)
                    .map(|(e, c)| c.reverse_convert(e))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Object(fields) => {
                let mut map = self.entries(value)?;
                let mut out = Map::new();
                for field in fields {
                    if let Some(v) = field.codec.reverse_convert_slot(map.remove(&field.name))? {
                        out.insert(field.name.clone(), v);
                    }
                }
                Value::Object(out)
            }
            CodecKind::Record(item) => Value::Object(
                self.entries(value)?
                    .into_iter()
                    .map(|(k, v)| item.reverse_convert(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            CodecKind::Union(alternatives) => alternatives
                .iter()
                .rev()
                .find_map(|a| {
                    let wire = a.reverse_convert(value.clone()).ok()?;
                    a.validate(&wire).is_ok().then_some(wire)
                })
                .ok_or_else(|| ConvertError::new(self.tag(), "no alternative accepts the value"))?,
            CodecKind::Intersection(operands) => {
                let results = operands
                    .iter()
                    .map(|op| op.reverse_convert_slot(Some(value.clone())))
                    .collect::<Result<Vec<_>, _>>()?;
                merge(results).unwrap_or(Value::Null)
            }
            CodecKind::Derive(derive) => {
                let base = derive
                    .derivation
                    .reverse_convert(value)
                    .map_err(|cause| ConvertError::new(self.tag(), cause))?;
                derive.from.reverse_convert(base)?
            }
            CodecKind::Reference(lazy) => self.target(lazy.get())?.reverse_convert(value)?,
        };
        Ok(Some(converted))
    }

    // ── Typed facade ──────────────────────────────────────────────────────────

    /// Validate and convert a wire value, then deserialize the domain value.
    pub fn decode<T: DeserializeOwned>(&self, wire: &Value) -> Result<T, CodecError> {
        self.validate(wire)?;
        let domain = self.convert(wire.clone())?;
        Ok(serde_json::from_value(domain)?)
    }

    /// Serialize a domain value, reverse-convert it and validate the result.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, CodecError> {
        let domain = serde_json::to_value(value)?;
        let wire = self.reverse_convert(domain)?;
        self.validate(&wire)?;
        Ok(wire)
    }

    // ── Shape helpers ─────────────────────────────────────────────────────────

    fn elements(&self, value: Value) -> Result<Vec<Value>, ConvertError> {
        match value {
            Value::Array(elements) => Ok(elements),
            other => Err(self.mismatch(&other)),
        }
    }

    fn positions(&self, arity: usize, value: Value) -> Result<Vec<Value>, ConvertError> {
        match value {
            Value::Array(elements) if elements.len() == arity => Ok(elements),
            other => Err(self.mismatch(&other)),
        }
    }

    fn entries(&self, value: Value) -> Result<Map<String, Value>, ConvertError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(self.mismatch(&other)),
        }
    }

    fn mismatch(&self, value: &Value) -> ConvertError {
        ConvertError::new(self.tag(), format!("{value} is not {}", self.description()))
    }

    fn target<'c>(&self, target: Option<&'c Codec>) -> Result<&'c Codec, ConvertError> {
        target.ok_or_else(|| {
            ConvertError::new(self.tag(), format!("'{}' is not resolved yet", self.description()))
        })
    }
}

/// Shallow-merge object results left to right; later keys overwrite. A
/// non-object result replaces everything before it.
fn merge(results: Vec<Slot>) -> Slot {
    let mut merged: Slot = None;
    for next in results.into_iter().flatten() {
        merged = match (merged, next) {
            (Some(Value::Object(mut acc)), Value::Object(fields)) => {
                acc.extend(fields);
                Some(Value::Object(acc))
            }
            (_, next) => Some(next),
        };
    }
    merged
}

/// Deep equality with numbers compared by value, so `1` equals `1.0`.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}
