//! Jobs endpoint response parser.
//!
//! A successful response is either `{"error": "<message>"}` or a JSON
//! array of [`JobRecord`]s. [`parse_status_body`] tells the two apart
//! and rejects anything else.

use crate::error::CoreError;
use crate::job::JobRecord;

/// A decoded 2xx response from the jobs endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusPayload {
    /// The server reported an application-level error.
    Error(String),
    /// Current state of the requested jobs.
    Records(Vec<JobRecord>),
}

/// Parse the body of a 2xx response.
pub fn parse_status_body(body: &str) -> Result<StatusPayload, CoreError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if let Some(error) = value.as_object().and_then(|map| map.get("error")) {
        return match error {
            serde_json::Value::String(message) if !message.is_empty() => {
                Ok(StatusPayload::Error(message.clone()))
            }
            other => Err(CoreError::UnexpectedPayload(format!(
                "error field is not a message: {other}"
            ))),
        };
    }

    if !value.is_array() {
        return Err(CoreError::UnexpectedPayload(format!(
            "expected an array of job records, got {}",
            kind_of(&value)
        )));
    }

    Ok(StatusPayload::Records(serde_json::from_value(value)?))
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
