//! Collection page envelope: `{"data": [...], "paging": {"next": url}}`

use super::error::GraphError;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub data: Vec<Value>,
    pub next: Option<String>,
}

/// Raise `RemoteApi` if the body carries a non-empty `error` field.
pub fn check_error(body: &Value, request: &str) -> Result<(), GraphError> {
    let error = match body.get("error") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::String(s)) if s.is_empty() => return Ok(()),
        Some(Value::Object(map)) if map.is_empty() => return Ok(()),
        Some(error) => error,
    };

    let message = match error {
        Value::String(s) => s.clone(),
        _ => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    };

    Err(GraphError::RemoteApi {
        request: request.to_string(),
        message,
        code: error.get("code").and_then(Value::as_i64),
    })
}

/// Split a response body into its records and continuation link.
pub fn parse_envelope(body: Value, request: &str) -> Result<Envelope, GraphError> {
    check_error(&body, request)?;

    let next = body
        .get("paging")
        .and_then(|p| p.get("next"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let data = match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(GraphError::MalformedResponse {
                    request: request.to_string(),
                    detail: format!("`data` is not an array: {}", other),
                })
            }
            None => {
                return Err(GraphError::MalformedResponse {
                    request: request.to_string(),
                    detail: "missing `data` array".to_string(),
                })
            }
        },
        _ => {
            return Err(GraphError::MalformedResponse {
                request: request.to_string(),
                detail: "response body is not an object".to_string(),
            })
        }
    };

    Ok(Envelope { data, next })
}

/// Decode every raw record of a page into `T`.
pub fn decode_records<T: DeserializeOwned>(data: Vec<Value>, request: &str) -> Result<Vec<T>, GraphError> {
    data.into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| GraphError::MalformedResponse {
                request: request.to_string(),
                detail: format!("undecodable record: {}", e),
            })
        })
        .collect()
}
