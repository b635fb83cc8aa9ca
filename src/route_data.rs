//! Extracted route parameters for one matched request.
//!
//! A [`RouteData`] is populated exactly once by a successful pattern match
//! and never mutated afterwards. Typed accessors are fail-soft: they return
//! `Some` only when the parameter is present **and** its string value parses
//! as the requested type, otherwise `None`. The `_or` variants substitute a
//! caller-supplied default under the same rule.

use std::collections::HashMap;

use crate::router::ParamVec;

/// Parameter name → raw string value mapping produced by a route match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    values: HashMap<String, String>,
}

impl RouteData {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_params(params: ParamVec) -> Self {
        Self {
            values: params.into_iter().collect(),
        }
    }

    /// Raw string value for `name`, if the parameter was extracted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Integer value of `name`; `None` if absent or not an integer.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.parse().ok()
    }

    pub fn int_or(&self, name: &str, default: i64) -> i64 {
        self.int(name).unwrap_or(default)
    }

    /// Boolean value of `name`; `None` if absent or not `true`/`false`.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.parse().ok()
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.bool(name).unwrap_or(default)
    }

    /// Float value of `name`; `None` if absent or not a number.
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name)?.parse().ok()
    }

    pub fn float_or(&self, name: &str, default: f64) -> f64 {
        self.float(name).unwrap_or(default)
    }

    /// String value of `name`; `None` if absent.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name)
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }
}

impl FromIterator<(String, String)> for RouteData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
