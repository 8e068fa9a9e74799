//! Bundled field validators.
//!
//! Each validator implements [`fieldguard_schema::Validator`] and can be
//! registered on any string-named field.

pub mod string;

pub use string::{is_string, IsString, StringOptions};
