//! Derivations: host-supplied behaviour for `derive` definitions.
//!
//! A derive codec first lets its base codec judge the wire value, then
//! applies the derivation's own check to the base-converted value:
//!
//! ```text
//! validate(x)        = from.validate(x) && derivation.validate(from.convert(x))
//! convert(x)         = derivation.convert(from.convert(x))
//! reverse_convert(y) = from.reverse_convert(derivation.reverse_convert(y))
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

type CheckFn = dyn Fn(&Value) -> bool + Send + Sync;
type MapFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;

/// The validate/convert/reverse-convert triple of a derived type.
#[derive(Clone)]
pub struct Derivation {
    validate: Arc<CheckFn>,
    convert: Arc<MapFn>,
    reverse_convert: Arc<MapFn>,
}

impl Derivation {
    pub fn new<V, C, R>(validate: V, convert: C, reverse_convert: R) -> Self
    where
        V: Fn(&Value) -> bool + Send + Sync + 'static,
        C: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
        R: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            validate: Arc::new(validate),
            convert: Arc::new(convert),
            reverse_convert: Arc::new(reverse_convert),
        }
    }

    /// A derivation that only narrows: values pass through unchanged.
    pub fn refine<V>(validate: V) -> Self
    where
        V: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(validate, Ok::<Value, String>, Ok::<Value, String>)
    }

    pub fn validate(&self, value: &Value) -> bool {
        (self.validate)(value)
    }

    pub fn convert(&self, value: Value) -> Result<Value, String> {
        (self.convert)(value)
    }

    pub fn reverse_convert(&self, value: Value) -> Result<Value, String> {
        (self.reverse_convert)(value)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derivation")
    }
}

/// Derivations by derive-definition name, handed to the codec registry.
#[derive(Debug, Clone, Default)]
pub struct Derivations {
    by_name: HashMap<String, Derivation>,
}

impl Derivations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a derivation, builder style.
    pub fn with(mut self, name: impl Into<String>, derivation: Derivation) -> Self {
        self.insert(name, derivation);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, derivation: Derivation) {
        self.by_name.insert(name.into(), derivation);
    }

    pub fn get(&self, name: &str) -> Option<&Derivation> {
        self.by_name.get(name)
    }
}

/// Ready-made number derivations.
pub mod derivations {
    use serde_json::Value;

    use super::Derivation;

    fn integral(value: &Value) -> Option<i64> {
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        let n = value.as_f64()?;
        (n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64).then_some(n as i64)
    }

    /// Whole numbers. `2.0` on the wire converts to the integer `2`.
    pub fn integer() -> Derivation {
        Derivation::new(
            |v| integral(v).is_some(),
            |v| {
                integral(&v)
                    .map(Value::from)
                    .ok_or_else(|| format!("{v} is not an integer"))
            },
            |v| {
                integral(&v)
                    .map(Value::from)
                    .ok_or_else(|| format!("{v} is not an integer"))
            },
        )
    }

    /// Numbers within `min..=max`.
    pub fn bounded(min: f64, max: f64) -> Derivation {
        Derivation::refine(move |v| v.as_f64().is_some_and(|n| n >= min && n <= max))
    }
}
