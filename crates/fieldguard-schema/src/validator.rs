use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::report::ErrorReport;
use crate::schema::Schema;

/// Result of running one validator against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    /// The value was rejected. An empty message list is treated as `Valid`
    /// by the check pipeline.
    Invalid(Vec<String>),
}

impl Outcome {
    /// A failure with a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(vec![message.into()])
    }

    /// `Valid` when `errors` is empty, `Invalid(errors)` otherwise.
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }
}

/// A named, reusable constraint on a single field value.
///
/// One validator instance is shared by every instance of the type it is
/// registered on, so implementations must not keep per-call state.
///
/// Invalid input values are reported as `Ok(Outcome::Invalid(..))`. An
/// `Err` is reserved for validators whose own configuration is unusable
/// (see [`SchemaError::Configuration`](crate::SchemaError::Configuration)),
/// and aborts the whole check.
pub trait Validator: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Validate one field value. `null` stands for an absent value.
    fn validate(&self, value: &Value) -> Result<Outcome>;
}

/// Run a schema's validators against the fields of `instance`.
///
/// Only the instance's own object entries are visited; fields without
/// validators are skipped. A non-object instance has no fields. A field
/// left out of the serialized object (`skip_serializing_if`) never reaches
/// its validators, so not even a misconfigured validator fires for it;
/// `None` fields that serialize as `null` are still validated.
pub(crate) fn collect_errors(
    schema: &Schema,
    instance: &Value,
    accumulate: bool,
) -> Result<ErrorReport> {
    let mut report = ErrorReport::new();
    let Value::Object(fields) = instance else {
        return Ok(report);
    };

    for (field, value) in fields {
        let Some(validators) = schema.validators(field) else {
            continue;
        };

        for validator in validators {
            // A later success does not clear an earlier failure.
            // An `Invalid` without messages counts as a pass.
            let outcome = match validator.validate(value)? {
                Outcome::Invalid(errors) => Outcome::from_errors(errors),
                Outcome::Valid => Outcome::Valid,
            };
            if let Outcome::Invalid(errors) = outcome {
                if accumulate {
                    report.append(field.as_str(), errors);
                } else {
                    report.record(field.as_str(), errors);
                }
            }
        }
    }

    Ok(report)
}
