use fieldguard_schema::{Outcome, Result, SchemaError, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Length bounds for [`IsString`], counted in Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringOptions {
    /// Minimum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl StringOptions {
    /// Fails when both bounds are set and `max_length < min_length`.
    pub fn check(&self) -> Result<()> {
        match (self.min_length, self.max_length) {
            (Some(min), Some(max)) if max < min => Err(SchemaError::configuration(
                IsString::NAME,
                format!("max length ({max}) cannot be less than min length ({min})"),
            )),
            _ => Ok(()),
        }
    }
}

/// Accepts strings, optionally bounded in length.
///
/// Bounds are checked on every call before the value is looked at, so a
/// misconfigured validator fails every check, whatever the field holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsString {
    options: StringOptions,
}

impl IsString {
    pub const NAME: &'static str = "isString";

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from options without checking them.
    pub fn with_options(options: StringOptions) -> Self {
        Self { options }
    }

    /// Build from options, rejecting inconsistent bounds up front.
    pub fn try_new(options: StringOptions) -> Result<Self> {
        options.check()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.options.min_length = Some(min);
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.options.max_length = Some(max);
        self
    }

    pub fn options(&self) -> &StringOptions {
        &self.options
    }
}

/// Shorthand for [`IsString::new`].
pub fn is_string() -> IsString {
    IsString::new()
}

impl Validator for IsString {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, value: &Value) -> Result<Outcome> {
        self.options.check()?;

        let Some(text) = value.as_str() else {
            return Ok(Outcome::invalid("is not a valid string"));
        };

        let length = text.chars().count();
        let mut errors = Vec::new();
        if let Some(max) = self.options.max_length {
            if length > max {
                errors.push(format!("is longer than {max}"));
            }
        }
        if let Some(min) = self.options.min_length {
            if length < min {
                errors.push(format!("is shorter than {min}"));
            }
        }

        trace!(length, failed = !errors.is_empty(), "string length checked");
        Ok(Outcome::from_errors(errors))
    }
}
