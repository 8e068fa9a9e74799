//! Declarative per-field validation for serde types.
//!
//! Declare the constraints of a type once, at startup, then call [`check`]
//! on every instance that comes from outside before trusting it.
//!
//! ```rust,ignore
//! use fieldguard::validators::is_string;
//!
//! #[derive(serde::Serialize)]
//! struct Signup {
//!     name: String,
//! }
//!
//! fieldguard::register_fields!(Signup {
//!     name => [is_string().min_length(3).max_length(6)],
//! })?;
//!
//! let signup = fieldguard::check(Signup { name: "abcd".into() })?;
//! ```
//!
//! # Crate Structure
//!
//! - [`schema`] — Validator contract, type-keyed registry and check pipeline
//! - [`validators`] — Bundled validators (behind `validators` feature)
//! - [`logging`] — `tracing-subscriber` setup (behind `logging` feature)

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Re-export schema types.
pub mod schema {
    pub use fieldguard_schema::*;
}

/// Re-export bundled validators (requires `validators` feature).
#[cfg(feature = "validators")]
pub mod validators {
    pub use fieldguard_validators::*;
}

#[cfg(feature = "logging")]
pub mod logging;

pub use fieldguard_schema::{
    ErrorReport, FieldKey, Outcome, RegistryConfig, Result, SchemaError, SchemaRegistry,
    TypeIdentity, Validator,
};

/// Register `validator` on field `field` of `T` in the global registry.
pub fn register_field<T: ?Sized + 'static>(
    field: impl Into<FieldKey>,
    validator: impl Validator + 'static,
) -> Result<()> {
    SchemaRegistry::global().register_field::<T>(field, validator)
}

/// Register a shared validator in the global registry.
pub fn register_shared<T: ?Sized + 'static>(
    field: impl Into<FieldKey>,
    validator: Arc<dyn Validator>,
) -> Result<()> {
    SchemaRegistry::global().register_field_for(TypeIdentity::of::<T>(), field, validator)
}

/// Check `instance` against the global registry.
pub fn check<T: Serialize + 'static>(instance: T) -> Result<T> {
    SchemaRegistry::global().check(instance)
}

/// Check `instance` by reference against the global registry.
pub fn validate<T: Serialize + ?Sized + 'static>(instance: &T) -> Result<()> {
    SchemaRegistry::global().validate(instance)
}

/// Deserialize `json` into `T` and check it against the global registry.
pub fn parse_str<T>(json: &str) -> Result<T>
where
    T: DeserializeOwned + Serialize + 'static,
{
    SchemaRegistry::global().parse_str(json)
}

/// Register validators for the fields of a type.
///
/// Validators are registered in the order written. The field key is the
/// identifier as written, so it must match the serialized field name.
/// Evaluates to `Result<(), SchemaError>` and stops at the first failure.
///
/// ```rust,ignore
/// register_fields!(User {
///     name => [is_string().min_length(3)],
///     email => [is_string(), is_string().max_length(254)],
/// })?;
///
/// // Against an explicit registry:
/// register_fields!(registry, User { name => [is_string()] })?;
/// ```
#[macro_export]
macro_rules! register_fields {
    ($ty:ty { $($body:tt)* }) => {
        $crate::register_fields!($crate::SchemaRegistry::global(), $ty { $($body)* })
    };
    ($registry:expr, $ty:ty { $($field:ident => [$($validator:expr),* $(,)?]),* $(,)? }) => {{
        let registry: &$crate::SchemaRegistry = &$registry;
        (|| -> $crate::Result<()> {
            $($(
                registry.register_field::<$ty>(::core::stringify!($field), $validator)?;
            )*)*
            ::core::result::Result::Ok(())
        })()
    }};
}
