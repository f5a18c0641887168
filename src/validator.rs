//! JSON Schema checks for endpoint descriptors.
//!
//! Schema semantics are delegated to the `jsonschema` crate; this module
//! only compiles the schemas a descriptor carries and checks the response
//! body against its schema.

use serde_json::Value;

use crate::descriptor::EndpointDescriptor;
use crate::error::{ConfigError, SchemaError};

/// Parse and compile a schema string.
fn compile_schema(field: &str, schema: &str) -> Result<jsonschema::Validator, ConfigError> {
    let schema: Value = serde_json::from_str(schema).map_err(|e| ConfigError::InvalidSchema {
        field: field.to_string(),
        message: e.to_string(),
    })?;
    jsonschema::validator_for(&schema).map_err(|e| ConfigError::InvalidSchema {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Validate `instance` against `schema`, collecting every violation.
///
/// # Errors
///
/// Returns `ConfigError::InvalidSchema` if the schema doesn't compile, or
/// `ConfigError::SchemaMismatch` listing all violations.
pub fn validate_against_schema(schema: &str, instance: &Value) -> Result<(), ConfigError> {
    let validator = compile_schema("schema", schema)?;
    collect_violations(&validator, instance)
}

fn collect_violations(validator: &jsonschema::Validator, instance: &Value) -> Result<(), ConfigError> {
    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::SchemaMismatch { errors })
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Check the schemas carried by a descriptor before it is sent.
///
/// Both schemas must compile. For JSON responses the body is validated
/// against `responseBodySchema`; a body that is not JSON is checked as a
/// plain string.
pub fn check_descriptor(descriptor: &EndpointDescriptor) -> Result<(), ConfigError> {
    if let Some(schema) = &descriptor.request_body_schema {
        compile_schema("requestBodySchema", schema)?;
    }

    let Some(schema) = &descriptor.response_body_schema else {
        return Ok(());
    };
    let validator = compile_schema("responseBodySchema", schema)?;

    if !is_json_content_type(&descriptor.response_content_type) {
        return Ok(());
    }

    let body = serde_json::from_str::<Value>(&descriptor.response_body)
        .unwrap_or_else(|_| Value::String(descriptor.response_body.clone()));
    collect_violations(&validator, &body)
}
