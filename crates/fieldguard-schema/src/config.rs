/// Controls how a registry checks instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, checking a type without a schema returns `SchemaError::NoSchema`.
    /// When false, such instances pass through unchanged.
    pub fail_on_missing_schema: bool,
    /// When true, every failing validator on a field contributes its messages.
    /// When false, the last failing validator's messages replace earlier ones.
    pub accumulate_field_errors: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fail_on_missing_schema: true,
            accumulate_field_errors: false,
        }
    }
}
