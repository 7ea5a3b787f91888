//! Typed URL parameters bound from match captures.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::matcher::MatchResult;

/// A resolved URL parameter value.
///
/// A capture made only of ASCII decimal digits becomes an
/// [`Integer`](Self::Integer); anything else, including a digit run too long
/// for `i64`, stays a [`String`](Self::String).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A digits-only capture.
    Integer(i64),
    /// Any other capture.
    String(String),
}

impl ParameterValue {
    /// Converts a raw capture into a typed value.
    pub fn from_capture(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return Self::Integer(n);
            }
        }
        Self::String(raw.to_string())
    }

    /// Returns the integer value, if this is one.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::String(_) => None,
        }
    }

    /// Returns the string value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Integer(_) => None,
            Self::String(s) => Some(s),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Resolved URL parameters in template order.
///
/// Parameters absent from the match (an unmatched `:name?`) have no entry at
/// all. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, ParameterValue)>,
}

impl Parameters {
    /// Creates an empty parameter list.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Looks up a parameter by position among the present parameters.
    pub fn get_index(&self, index: usize) -> Option<(&str, &ParameterValue)> {
        self.entries.get(index).map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if a parameter with `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of present parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Pairs parameter names with the captures of a match, in order.
///
/// Absent captures are skipped, and a fast-path match (no captures) binds
/// nothing.
pub fn bind(names: &[String], result: &MatchResult) -> Parameters {
    let mut parameters = Parameters::new();
    for (name, capture) in names.iter().zip(result.captures()) {
        if let Some(raw) = capture {
            parameters.insert(name.as_str(), ParameterValue::from_capture(raw));
        }
    }
    parameters
}
