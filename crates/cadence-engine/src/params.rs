//! The [`ParameterStore`]: named scalar and text parameters.

use cadence_core::{Value, ValueSource};
use indexmap::IndexMap;

use crate::config::ConfigError;

/// Default timestep in seconds.
pub const DEFAULT_DT: f64 = 1200.0;

/// Closed set of run parameters with their defaults.
///
/// Only names present in the store can be assigned; the set is fixed when
/// the store is created. Numeric parameters accept any single-element
/// value; text parameters accept only text.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterStore {
    values: IndexMap<String, Value>,
}

impl ParameterStore {
    /// The standard parameter set.
    pub fn standard() -> Self {
        let numeric = [
            ("dt", DEFAULT_DT),
            ("calday", 0.0),
            ("daysperyear", 365.0),
            ("lod", 86400.0),
            ("scon", 1367.0),
            ("eccen", 0.016_715),
            ("obliq", 23.441),
            ("prece", 102.7),
            ("g", 9.80665),
            ("Cpd", 1004.64),
            ("Rd", 287.04),
            ("Lv", 2.501e6),
            ("stebol", 5.67e-8),
        ];
        let mut values: IndexMap<String, Value> = numeric
            .iter()
            .map(|&(k, v)| (k.to_string(), Value::Scalar(v)))
            .collect();
        values.insert("title".to_string(), Value::from("Cadence run"));
        Self { values }
    }

    /// Build a store from an explicit set of defaults.
    pub fn from_defaults(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Look up a numeric parameter.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_scalar)
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.scalar("dt").unwrap_or(DEFAULT_DT)
    }

    /// Whether `name` is a parameter.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Assign a parameter.
    ///
    /// Returns `Ok(false)` if `name` is not a parameter. A non-positive or
    /// non-finite `dt` is rejected and leaves the store unchanged.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<bool, ConfigError> {
        let Some(slot) = self.values.get_mut(name) else {
            return Ok(false);
        };
        let stored = match (&*slot, value) {
            (Value::Text(_), Value::Text(s)) => Value::Text(s.clone()),
            (Value::Text(_), _) => {
                return Err(ConfigError::InvalidParameter {
                    name: name.to_string(),
                    reason: "expected text".to_string(),
                })
            }
            (_, v) => Value::Scalar(v.as_scalar().ok_or_else(|| {
                ConfigError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("expected a single number, got shape {:?}", v.shape()),
                }
            })?),
        };
        if name == "dt" {
            if let Value::Scalar(dt) = stored {
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(ConfigError::InvalidTimestep { value: dt });
                }
            }
        }
        *slot = stored;
        Ok(true)
    }

    /// Set a numeric parameter that is known to exist.
    pub(crate) fn set_scalar(&mut self, name: &str, value: f64) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = Value::Scalar(value);
        }
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The full name-to-value map.
    pub fn as_map(&self) -> &IndexMap<String, Value> {
        &self.values
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::standard()
    }
}

impl ValueSource for ParameterStore {
    fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_defaults() {
        let p = ParameterStore::standard();
        assert_eq!(p.dt(), 1200.0);
        assert_eq!(p.scalar("daysperyear"), Some(365.0));
        assert_eq!(p.get("title").and_then(Value::as_text), Some("Cadence run"));
    }

    #[test]
    fn set_numeric_accepts_single_element() {
        let mut p = ParameterStore::standard();
        assert!(p.set("dt", &Value::from(vec![600.0])).unwrap());
        assert_eq!(p.dt(), 600.0);
    }

    #[test]
    fn set_rejects_type_mismatch() {
        let mut p = ParameterStore::standard();
        assert!(matches!(
            p.set("dt", &Value::from("fast")),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert!(matches!(
            p.set("title", &Value::Scalar(1.0)),
            Err(ConfigError::InvalidParameter { .. })
        ));
        assert!(matches!(
            p.set("lod", &Value::from(vec![1.0, 2.0])),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn set_rejects_non_positive_dt() {
        let mut p = ParameterStore::standard();
        for bad in [0.0, -600.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                p.set("dt", &Value::Scalar(bad)),
                Err(ConfigError::InvalidTimestep { .. })
            ));
        }
        assert_eq!(p.dt(), 1200.0);
    }

    #[test]
    fn unknown_name_not_handled() {
        let mut p = ParameterStore::standard();
        assert_eq!(p.set("T", &Value::Scalar(1.0)), Ok(false));
        assert!(!p.contains("T"));
    }
}
