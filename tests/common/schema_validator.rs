use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Compile a published option schema
pub fn compile_option_schema(schema: &Value) -> JSONSchema {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .expect("Failed to compile option schema")
}

/// Validate a JSON value against a schema
pub fn validate_against_schema(data: &Value, schema: &JSONSchema) -> Result<(), Vec<String>> {
    match schema.validate(data) {
        Ok(_) => Ok(()),
        Err(errors) => {
            let error_messages: Vec<String> = errors
                .map(|e| format!("{} at {}", e, e.instance_path))
                .collect();
            Err(error_messages)
        }
    }
}
