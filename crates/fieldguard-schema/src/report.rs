use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-field error messages produced by one check.
///
/// Serializes as `{ "field": ["message", ...] }`. Fields are kept in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorReport {
    fields: BTreeMap<String, Vec<String>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was recorded for `field` with `errors`.
    pub fn record(&mut self, field: impl Into<String>, errors: Vec<String>) {
        self.fields.insert(field.into(), errors);
    }

    /// Append `errors` after whatever was recorded for `field`.
    pub fn append(&mut self, field: impl Into<String>, errors: Vec<String>) {
        self.fields.entry(field.into()).or_default().extend(errors);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Failing field names, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, errors)| (field.as_str(), errors.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, errors)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field} {}", errors.join(", "))?;
        }
        Ok(())
    }
}
