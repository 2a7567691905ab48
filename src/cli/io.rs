//! JSON I/O handling for the single-invocation adapter
//!
//! - Input: one JSON request envelope via stdin
//! - Output: one JSON response envelope via stdout
//! - UTF-8 only

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// One inbound request, however the hosting runtime delivered it
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationRequest {
    /// HTTP method, e.g. "GET" or "POST"
    pub method: String,
    /// Request path, e.g. "/admin/analytics"
    pub path: String,
    /// Query parameters (unencoded keys and values)
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON body, if any
    #[serde(default)]
    pub body: Option<Value>,
}

/// One outbound response
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Read a JSON request envelope from stdin
pub fn read_request() -> CliResult<InvocationRequest> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::invalid_request("Empty input"));
    }

    let request: InvocationRequest = serde_json::from_str(&input)?;
    Ok(request)
}

/// Write a JSON response envelope to stdout
pub fn write_response(response: &InvocationResponse) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope_defaults() {
        let request: InvocationRequest =
            serde_json::from_str(r#"{"method":"GET","path":"/reviews"}"#).unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.query.is_empty());
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = InvocationResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: serde_json::json!({"success": true}),
        };
        let encoded = serde_json::to_string(&response).unwrap();
        assert!(encoded.contains("\"status\":200"));
        assert!(encoded.contains("\"success\":true"));
    }
}
