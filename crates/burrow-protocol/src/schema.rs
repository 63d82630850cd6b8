//! JSON Schema helpers for MCP tool input validation.
//!
//! Covers the subset the built-in tools declare: an object with
//! `required` names and primitive `type`s on `properties`.

use serde_json::Value;
use thiserror::Error;

/// Schema validation errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The input does not match the expected schema.
    #[error("schema validation failed: {message}")]
    ValidationFailed { message: String },
    /// The schema itself is malformed.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

/// Checks `input` against the `required` list and property types of `schema`.
///
/// Properties absent from the input are not type-checked; unknown
/// properties are allowed.
///
/// # Errors
///
/// Returns `SchemaError::ValidationFailed` naming the first offending field.
pub fn validate_arguments(schema: &Value, input: &Value) -> Result<(), SchemaError> {
    validate_required_fields(schema, input)?;

    let (Some(Value::Object(properties)), Some(input_obj)) =
        (schema.get("properties"), input.as_object())
    else {
        return Ok(());
    };

    for (name, prop) in properties {
        let (Some(expected), Some(actual)) =
            (prop.get("type").and_then(Value::as_str), input_obj.get(name))
        else {
            continue;
        };
        if !matches_type(expected, actual) {
            return Err(SchemaError::ValidationFailed {
                message: format!("field '{name}' must be of type {expected}"),
            });
        }
    }

    Ok(())
}

/// Checks that a JSON value contains required properties from a schema.
///
/// # Errors
///
/// Returns `SchemaError::ValidationFailed` when the input is not an object
/// or lacks a required field.
pub fn validate_required_fields(schema: &Value, input: &Value) -> Result<(), SchemaError> {
    let required = match schema.get("required") {
        Some(Value::Array(arr)) => arr,
        _ => return Ok(()),
    };

    let input_obj = input
        .as_object()
        .ok_or_else(|| SchemaError::ValidationFailed {
            message: "input must be an object".to_string(),
        })?;

    for field in required {
        let field_name = field.as_str().ok_or_else(|| SchemaError::InvalidSchema {
            message: "required field names must be strings".to_string(),
        })?;
        if !input_obj.contains_key(field_name) {
            return Err(SchemaError::ValidationFailed {
                message: format!("missing required field: {field_name}"),
            });
        }
    }

    Ok(())
}

fn matches_type(expected: &str, actual: &Value) -> bool {
    match expected {
        "string" => actual.is_string(),
        "integer" => actual.is_i64() || actual.is_u64(),
        "number" => actual.is_number(),
        "boolean" => actual.is_boolean(),
        "object" => actual.is_object(),
        "array" => actual.is_array(),
        "null" => actual.is_null(),
        _ => true,
    }
}
