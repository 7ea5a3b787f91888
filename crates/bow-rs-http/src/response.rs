//! The value produced by handlers and short-circuiting middleware.

use http::StatusCode;
use serde::Serialize;

use bow_rs_core::{BowError, BowResult};

/// A response returned through the middleware chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

impl Response {
    /// Creates a response with the given status and body.
    pub fn with_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    /// Creates a `404 Not Found` response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, body)
    }

    /// Creates a `200 OK` JSON response from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> BowResult<Self> {
        let body = serde_json::to_string(value)
            .map_err(|e| BowError::SerializationError(e.to_string()))?;
        Ok(Self::ok(body).header("content-type", "application/json"))
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns all headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header with the given name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the body.
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_and_not_found() {
        assert_eq!(Response::ok("hi").status(), StatusCode::OK);
        assert_eq!(Response::ok("hi").body(), "hi");
        assert_eq!(Response::not_found("gone").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_json_sets_content_type() {
        let resp = Response::json(&serde_json::json!({"id": 5})).unwrap();
        assert_eq!(resp.body(), r#"{"id":5}"#);
        assert_eq!(resp.header_value("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_headers_keep_order() {
        let resp = Response::ok("").header("x-a", "1").header("x-b", "2");
        assert_eq!(resp.headers()[0].0, "x-a");
        assert_eq!(resp.headers()[1].0, "x-b");
        assert!(resp.header_value("x-c").is_none());
    }
}
