//! Core error types for the bow-rs router.
//!
//! [`BowError`] covers everything that can go wrong around routing: requests
//! that resolve to nothing, configuration problems found at startup, route
//! patterns that fail to compile, and errors raised by handlers. Route
//! compilation failures are described in detail by [`PatternCompileError`].
//!
//! A path that simply does not match a route is *not* an error anywhere in the
//! framework; matching reports that as a normal outcome.

use thiserror::Error;

/// A route template could not be turned into a match primitive.
///
/// Raised while the route table is being built, never while serving requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternCompileError {
    /// A constraint names a parameter that the template does not declare.
    #[error("constraint references unknown parameter '{name}' in route '{template}'")]
    UnknownParameter {
        /// The route template.
        template: String,
        /// The parameter named by the constraint.
        name: String,
    },

    /// A constraint sub-pattern is not a valid regular expression.
    #[error("invalid constraint for parameter '{name}' ('{pattern}'): {reason}")]
    InvalidConstraint {
        /// The constrained parameter.
        name: String,
        /// The rejected sub-pattern.
        pattern: String,
        /// Why the sub-pattern was rejected.
        reason: String,
    },

    /// The same parameter name appears twice in one template.
    #[error("duplicate parameter '{name}' in route '{template}'")]
    DuplicateParameter {
        /// The route template.
        template: String,
        /// The repeated parameter name.
        name: String,
    },

    /// The template produced a match primitive that could not be compiled.
    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate {
        /// The route template.
        template: String,
        /// Why compilation failed.
        reason: String,
    },
}

/// The primary error type for the bow-rs router.
///
/// Each variant maps to an HTTP status code via [`BowError::status_code`].
#[derive(Error, Debug)]
pub enum BowError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Routing ──────────────────────────────────────────────────────

    /// A route pattern failed to compile.
    #[error("Route pattern error: {0}")]
    PatternCompile(#[from] PatternCompileError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The router is improperly configured (unresolved handler or middleware,
    /// duplicate route names, ...).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BowError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::InternalServerError(_)
            | Self::PatternCompile(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::SerializationError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, BowError>`.
pub type BowResult<T> = Result<T, BowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bow_error_status_codes() {
        assert_eq!(BowError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(BowError::NotFound("x".into()).status_code(), 404);
        assert_eq!(BowError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(BowError::InternalServerError("x".into()).status_code(), 500);
        assert_eq!(BowError::ImproperlyConfigured("x".into()).status_code(), 500);
        assert_eq!(BowError::ConfigurationError("x".into()).status_code(), 500);
        assert_eq!(BowError::SerializationError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_bow_error_display() {
        let err = BowError::NotFound("page".into());
        assert_eq!(err.to_string(), "Not found: page");
    }

    #[test]
    fn test_pattern_compile_error_conversion() {
        let err: BowError = PatternCompileError::UnknownParameter {
            template: "/user/:id".into(),
            name: "slug".into(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("unknown parameter 'slug'"));
        assert!(err.to_string().contains("/user/:id"));
    }

    #[test]
    fn test_invalid_constraint_display() {
        let err = PatternCompileError::InvalidConstraint {
            name: "id".into(),
            pattern: "[0-9".into(),
            reason: "unclosed class".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid constraint for parameter 'id' ('[0-9'): unclosed class"
        );
    }

    #[test]
    fn test_method_not_allowed_display() {
        let err = BowError::MethodNotAllowed("GET, PUT".into());
        assert_eq!(err.to_string(), "Method not allowed: GET, PUT");
    }
}
