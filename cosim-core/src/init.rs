use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single initialization parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for InitValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for InitValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for InitValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for InitValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for InitValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The immutable parameter mapping a node receives once at construction.
///
/// Values are supplied by the orchestrator (start timestamp, connection
/// parameters, network identifier, data paths). The mapping exposes only
/// shared accessors, so it cannot change after initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitValues(BTreeMap<String, InitValue>);

impl<K, V> FromIterator<(K, V)> for InitValues
where
    K: Into<String>,
    V: Into<InitValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl InitValues {
    /// Parses parameters from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a JSON object of
    /// booleans, numbers, and strings.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the raw value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InitValue> {
        self.0.get(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over all parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InitValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns a required text parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is missing or not text.
    pub fn require_text(&self, key: &str) -> Result<&str, ConfigError> {
        self.optional_text(key)?.ok_or_else(|| missing(key))
    }

    /// Returns a required numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is missing, not a number, or not finite.
    pub fn require_number(&self, key: &str) -> Result<f64, ConfigError> {
        self.optional_number(key)?.ok_or_else(|| missing(key))
    }

    /// Returns a required identifier, accepting text or an integral number.
    ///
    /// Identifiers such as a network id are often supplied as numbers by
    /// orchestrators; both forms are rendered to the same string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is missing or holds neither text
    /// nor an integral number.
    pub fn require_id(&self, key: &str) -> Result<String, ConfigError> {
        match self.get(key) {
            None => Err(missing(key)),
            Some(InitValue::Text(text)) if !text.is_empty() => Ok(text.clone()),
            #[allow(clippy::cast_possible_truncation)]
            Some(InitValue::Number(number)) if number.is_finite() && number.fract() == 0.0 => {
                Ok(format!("{}", *number as i64))
            }
            Some(_) => Err(invalid(key, "expected a non-empty string or an integer")),
        }
    }

    /// Returns an optional text parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is present but not text.
    pub fn optional_text(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(InitValue::Text(text)) => Ok(Some(text)),
            Some(_) => Err(invalid(key, "expected a string")),
        }
    }

    /// Returns an optional numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is present but not a finite number.
    pub fn optional_number(&self, key: &str) -> Result<Option<f64>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(InitValue::Number(number)) if number.is_finite() => Ok(Some(*number)),
            Some(_) => Err(invalid(key, "expected a finite number")),
        }
    }

    /// Returns an optional non-negative integral parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is present but not a non-negative integer.
    pub fn optional_count(&self, key: &str) -> Result<Option<usize>, ConfigError> {
        match self.optional_number(key)? {
            None => Ok(None),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(number) if number >= 0.0 && number.fract() == 0.0 => Ok(Some(number as usize)),
            Some(_) => Err(invalid(key, "expected a non-negative integer")),
        }
    }
}

fn missing(key: &str) -> ConfigError {
    ConfigError::MissingParameter {
        key: key.to_owned(),
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        key: key.to_owned(),
        reason: reason.to_owned(),
    }
}
