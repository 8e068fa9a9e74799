use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::validator::Validator;

/// Key naming a field at registration time.
///
/// Only `Name` keys can be validated; instances are inspected through their
/// named object entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name(String),
    /// Positional field of a tuple struct.
    Index(usize),
}

impl FieldKey {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// Field name to ordered validators, for one type.
///
/// The registry hands schemas out as `Arc<Schema>` snapshots; cloning a
/// `Schema` itself copies the field map but shares the validators.
#[derive(Clone, Default)]
pub struct Schema {
    fields: HashMap<String, Vec<Arc<dyn Validator>>>,
}

impl Schema {
    /// Validators registered on `field`, in declaration order.
    pub fn validators(&self, field: &str) -> Option<&[Arc<dyn Validator>]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Field names with at least one validator, sorted.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with validators.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn push(&mut self, field: &str, validator: Arc<dyn Validator>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(validator);
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for field in self.fields() {
            let names: Vec<&str> = self.fields[field].iter().map(|v| v.name()).collect();
            map.entry(&field, &names);
        }
        map.finish()
    }
}
