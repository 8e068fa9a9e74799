use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::identity::TypeIdentity;
use crate::schema::{FieldKey, Schema};
use crate::validator::{collect_errors, Validator};

/// Type-keyed registry of field validators.
///
/// Schemas are created on first registration for a type and only ever grow.
/// Checks take a shared snapshot of the schema and run validators without
/// holding the lock; a registration that races a check copies the schema
/// instead of mutating the snapshot.
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeIdentity, Arc<Schema>>>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Process-wide registry with default config.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Return the schema for `identity`, creating an empty one if needed.
    pub fn get_or_create_schema(&self, identity: TypeIdentity) -> Arc<Schema> {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(schema_entry(&mut schemas, identity))
    }

    /// Append `validator` to the list for `field` on `identity`.
    pub fn append_validator(
        &self,
        identity: TypeIdentity,
        field: &str,
        validator: Arc<dyn Validator>,
    ) {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        let schema = schema_entry(&mut schemas, identity);
        debug!(
            type_name = identity.name(),
            field,
            validator = validator.name(),
            "registering field validator"
        );
        Arc::make_mut(schema).push(field, validator);
    }

    /// Look up the schema for `identity` without creating one.
    pub fn get_schema(&self, identity: TypeIdentity) -> Option<Arc<Schema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&identity)
            .cloned()
    }

    /// Register `validator` on field `field` of type `T`.
    pub fn register_field<T: ?Sized + 'static>(
        &self,
        field: impl Into<FieldKey>,
        validator: impl Validator + 'static,
    ) -> Result<()> {
        self.register_field_for(TypeIdentity::of::<T>(), field, Arc::new(validator))
    }

    /// Register a shared validator on a field of the type named by `identity`.
    ///
    /// Fails with `SchemaError::UnsupportedFieldKey` when the key is not a
    /// string name; nothing is registered in that case.
    pub fn register_field_for(
        &self,
        identity: TypeIdentity,
        field: impl Into<FieldKey>,
        validator: Arc<dyn Validator>,
    ) -> Result<()> {
        let field = field.into();
        let Some(name) = field.as_name() else {
            return Err(SchemaError::UnsupportedFieldKey(format!(
                "{field} on {identity}"
            )));
        };
        self.append_validator(identity, name, validator);
        Ok(())
    }

    /// Check `instance` against its type's schema and hand it back unchanged.
    pub fn check<T: Serialize + 'static>(&self, instance: T) -> Result<T> {
        self.validate(&instance)?;
        Ok(instance)
    }

    /// Check `instance` against its type's schema.
    pub fn validate<T: Serialize + ?Sized + 'static>(&self, instance: &T) -> Result<()> {
        let identity = TypeIdentity::of::<T>();
        let Some(schema) = self.resolve(identity)? else {
            return Ok(());
        };
        let value = serde_json::to_value(instance)?;
        self.run(identity, &schema, &value)
    }

    /// Check an already-projected instance of the type named by `identity`.
    pub fn validate_value(&self, identity: TypeIdentity, value: &Value) -> Result<()> {
        match self.resolve(identity)? {
            Some(schema) => self.run(identity, &schema, value),
            None => Ok(()),
        }
    }

    /// Deserialize a JSON payload into `T`, then check it.
    pub fn parse_str<T>(&self, json: &str) -> Result<T>
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        let instance: T = serde_json::from_str(json)?;
        self.check(instance)
    }

    /// Check if a type has a registered schema.
    pub fn has_schema(&self, identity: TypeIdentity) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&identity)
    }

    /// Names of the types that have registered schemas, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&'static str> = schemas.keys().map(TypeIdentity::name).collect();
        names.sort_unstable();
        names
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn resolve(&self, identity: TypeIdentity) -> Result<Option<Arc<Schema>>> {
        match self.get_schema(identity) {
            Some(schema) => Ok(Some(schema)),
            None if self.config.fail_on_missing_schema => {
                Err(SchemaError::NoSchema(identity.name().to_string()))
            }
            None => {
                trace!(type_name = identity.name(), "no schema, passing through");
                Ok(None)
            }
        }
    }

    fn run(&self, identity: TypeIdentity, schema: &Schema, value: &Value) -> Result<()> {
        trace!(
            type_name = identity.name(),
            fields = schema.len(),
            "checking instance"
        );

        let report = collect_errors(schema, value, self.config.accumulate_field_errors)
            .inspect_err(|err| {
                warn!(type_name = identity.name(), error = %err, "check aborted");
            })?;

        if report.is_empty() {
            return Ok(());
        }

        debug!(
            type_name = identity.name(),
            failed_fields = report.len(),
            "validation failed"
        );
        Err(SchemaError::ValidationFailed {
            type_name: identity.name().to_string(),
            report,
        })
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_entry(
    schemas: &mut HashMap<TypeIdentity, Arc<Schema>>,
    identity: TypeIdentity,
) -> &mut Arc<Schema> {
    schemas.entry(identity).or_insert_with(|| {
        debug!(type_name = identity.name(), "creating schema");
        Arc::new(Schema::default())
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::validator::Outcome;

    /// Requires a string of at least `min` chars.
    #[derive(Debug)]
    struct MinChars(usize);

    impl Validator for MinChars {
        fn name(&self) -> &str {
            "minChars"
        }

        fn validate(&self, value: &Value) -> Result<Outcome> {
            match value.as_str() {
                Some(s) if s.chars().count() >= self.0 => Ok(Outcome::Valid),
                Some(_) => Ok(Outcome::invalid(format!("is shorter than {}", self.0))),
                None => Ok(Outcome::invalid("is not a valid string")),
            }
        }
    }

    #[derive(Debug)]
    struct AlwaysMisconfigured;

    impl Validator for AlwaysMisconfigured {
        fn name(&self) -> &str {
            "misconfigured"
        }

        fn validate(&self, _value: &Value) -> Result<Outcome> {
            Err(SchemaError::configuration(
                "misconfigured",
                "max (3) cannot be less than min (6)",
            ))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        nickname: Option<String>,
        age: u32,
    }

    #[derive(Debug, Serialize)]
    struct Unregistered {
        name: String,
    }

    fn user(name: &str) -> User {
        User {
            name: name.to_string(),
            nickname: None,
            age: 30,
        }
    }

    fn user_registry() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry.register_field::<User>("name", MinChars(3)).unwrap();
        registry
    }

    #[test]
    fn register_and_check() {
        let registry = user_registry();

        let checked = registry.check(user("alice")).unwrap();
        assert_eq!(checked, user("alice"));

        let err = registry.check(user("al")).unwrap_err();
        let report = err.report().unwrap();
        assert_eq!(report.get("name").unwrap(), &["is shorter than 3".to_string()]);
        assert!(!report.contains("age"));
    }

    #[test]
    fn missing_schema_fails_by_default() {
        let registry = user_registry();
        let instance = Unregistered {
            name: "x".to_string(),
        };
        assert!(matches!(
            registry.check(instance),
            Err(SchemaError::NoSchema(name)) if name.ends_with("Unregistered")
        ));
    }

    #[test]
    fn missing_schema_permissive_passes() {
        let registry = SchemaRegistry::with_config(RegistryConfig {
            fail_on_missing_schema: false,
            ..RegistryConfig::default()
        });
        let instance = Unregistered {
            name: "x".to_string(),
        };
        assert!(registry.check(instance).is_ok());
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let registry = SchemaRegistry::new();
        let identity = TypeIdentity::of::<User>();

        assert!(registry.get_schema(identity).is_none());
        assert!(!registry.has_schema(identity));

        assert!(registry.get_or_create_schema(identity).is_empty());
        assert!(registry.get_or_create_schema(identity).is_empty());
        assert!(registry.has_schema(identity));
        assert_eq!(registry.type_names().len(), 1);
    }

    #[test]
    fn snapshots_are_shared_until_registration() {
        let registry = user_registry();
        let identity = TypeIdentity::of::<User>();

        let first = registry.get_schema(identity).unwrap();
        let second = registry.get_schema(identity).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        registry.register_field::<User>("name", MinChars(5)).unwrap();
        assert_eq!(first.validators("name").unwrap().len(), 1);
        let after = registry.get_schema(identity).unwrap();
        assert_eq!(after.validators("name").unwrap().len(), 2);
    }

    #[test]
    fn get_schema_does_not_create() {
        let registry = SchemaRegistry::new();
        let _ = registry.get_schema(TypeIdentity::of::<User>());
        assert!(registry.type_names().is_empty());
    }

    #[test]
    fn registration_preserves_declaration_order() {
        let registry = SchemaRegistry::new();
        registry.register_field::<User>("name", MinChars(1)).unwrap();
        registry
            .register_field::<User>("name", AlwaysMisconfigured)
            .unwrap();
        registry.register_field::<User>("nickname", MinChars(2)).unwrap();

        let schema = registry.get_schema(TypeIdentity::of::<User>()).unwrap();
        let names: Vec<&str> = schema
            .validators("name")
            .unwrap()
            .iter()
            .map(|validator| validator.name())
            .collect();
        assert_eq!(names, vec!["minChars", "misconfigured"]);
        assert_eq!(schema.fields(), vec!["name", "nickname"]);
    }

    #[test]
    fn index_keys_are_rejected() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register_field::<(String, String)>(0usize, MinChars(1)),
            Err(SchemaError::UnsupportedFieldKey(_))
        ));
        assert!(!registry.has_schema(TypeIdentity::of::<(String, String)>()));
    }

    #[test]
    fn types_are_independent() {
        let registry = user_registry();
        registry
            .register_field::<Unregistered>("name", MinChars(10))
            .unwrap();

        assert!(registry.check(user("abc")).is_ok());
        assert!(registry
            .check(Unregistered {
                name: "abc".to_string()
            })
            .is_err());
        assert_eq!(registry.type_names().len(), 2);
    }

    #[test]
    fn null_field_reaches_validators() {
        let registry = SchemaRegistry::new();
        registry.register_field::<User>("nickname", MinChars(2)).unwrap();

        let err = registry.check(user("alice")).unwrap_err();
        assert_eq!(
            err.report().unwrap().get("nickname").unwrap(),
            &["is not a valid string".to_string()]
        );
    }

    #[test]
    fn configuration_error_is_distinct_from_validation_failure() {
        let registry = SchemaRegistry::new();
        registry
            .register_field::<User>("nickname", AlwaysMisconfigured)
            .unwrap();

        assert!(matches!(
            registry.check(user("alice")),
            Err(SchemaError::Configuration { .. })
        ));
    }

    #[test]
    fn accumulate_config_merges_field_errors() {
        let registry = SchemaRegistry::with_config(RegistryConfig {
            accumulate_field_errors: true,
            ..RegistryConfig::default()
        });
        registry.register_field::<User>("name", MinChars(3)).unwrap();
        registry.register_field::<User>("name", MinChars(5)).unwrap();

        let err = registry.check(user("ab")).unwrap_err();
        assert_eq!(
            err.report().unwrap().get("name").unwrap(),
            &["is shorter than 3".to_string(), "is shorter than 5".to_string()]
        );
    }

    #[test]
    fn validate_value_checks_raw_json() {
        let registry = user_registry();
        let identity = TypeIdentity::of::<User>();

        assert!(registry
            .validate_value(identity, &serde_json::json!({ "name": "alice" }))
            .is_ok());
        assert!(matches!(
            registry.validate_value(identity, &serde_json::json!({ "name": 7 })),
            Err(SchemaError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn parse_str_deserializes_then_checks() {
        let registry = user_registry();

        let parsed: User = registry
            .parse_str(r#"{"name":"alice","nickname":null,"age":3}"#)
            .unwrap();
        assert_eq!(parsed.name, "alice");

        assert!(matches!(
            registry.parse_str::<User>(r#"{"name":"al","nickname":null,"age":3}"#),
            Err(SchemaError::ValidationFailed { .. })
        ));
        assert!(matches!(
            registry.parse_str::<User>("not-json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn concurrent_registration_creates_one_schema() {
        let registry = SchemaRegistry::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    registry.register_field::<User>("name", MinChars(1)).unwrap();
                });
            }
        });

        assert_eq!(registry.type_names().len(), 1);
        let schema = registry.get_schema(TypeIdentity::of::<User>()).unwrap();
        assert_eq!(schema.validators("name").unwrap().len(), 8);
    }

    #[test]
    fn config_access() {
        let config = RegistryConfig {
            fail_on_missing_schema: false,
            accumulate_field_errors: true,
        };
        let registry = SchemaRegistry::with_config(config);
        assert_eq!(registry.config(), &config);
        assert_eq!(SchemaRegistry::default().config(), &RegistryConfig::default());
    }
}
