//! Flat data records
//!
//! A [`Record`] maps field names to string values. A field can be present
//! with a value, present but absent (`None`, the equivalent of a null), or
//! missing entirely; rules treat the last two the same way.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use crate::errors::{RuleError, RuleResult};

/// Field name to raw value mapping validated by a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Option<String>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a value (builder style)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field to a value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), Some(value.into()));
    }

    /// Declare a field without a value
    pub fn insert_absent(&mut self, field: impl Into<String>) {
        self.values.insert(field.into(), None);
    }

    /// Set or clear a field
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        self.values.insert(field.into(), value);
    }

    /// Current value of a field; `None` when absent or missing
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.remove(field).flatten()
    }

    /// Whether the field is declared (with or without a value)
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field is declared
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over declared fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

// ============================================================================
// JSON Support
// ============================================================================

#[cfg(feature = "serde")]
impl Record {
    /// Build a record from a JSON object, coercing scalars to strings
    ///
    /// Numbers keep their decimal text (`0` becomes `"0"`), booleans become
    /// `"true"`/`"false"` and `null` marks the field absent. Arrays and
    /// objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> RuleResult<Self> {
        let mut record = Record::new();
        let Some(object) = value.as_object() else {
            return Err(RuleError::UnsupportedValue {
                field: String::new(),
            });
        };

        for (field, value) in object {
            record.set(field.clone(), coerce_json(field, value)?);
        }
        Ok(record)
    }

    /// Convert into a JSON object (absent fields become `null`)
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .values
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Some(s) => serde_json::Value::String(s.clone()),
                    None => serde_json::Value::Null,
                };
                (k.clone(), value)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

#[cfg(feature = "serde")]
fn coerce_json(field: &str, value: &serde_json::Value) -> RuleResult<Option<String>> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(RuleError::UnsupportedValue {
            field: field.to_string(),
        }),
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Record {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Record::from_json(&value).map_err(serde::de::Error::custom)
    }
}
