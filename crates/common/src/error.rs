//! Common error types shared across crates.

use thiserror::Error;

/// Errors produced inside the envelope codec.
///
/// Only [`crate::crypto::encrypt`] surfaces these to callers. The decrypt
/// path collapses every variant into a single `None` outcome so that a caller
/// cannot tell a wrong password from a corrupted envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The envelope does not split into `salt:iv:ciphertext`, a part is not
    /// valid base64, or a decoded part has the wrong length.
    #[error("malformed envelope")]
    Format,

    /// GCM tag verification failed. Covers the wrong-password case.
    #[error("authentication failed")]
    Authentication,

    /// The decrypted bytes are not valid UTF-8 JSON of the expected shape.
    #[error("decrypted payload is not valid JSON")]
    Parse,

    /// The payload could not be serialised to JSON before encryption.
    #[error("payload serialisation failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An empty password was supplied to `encrypt`.
    #[error("password must not be empty")]
    EmptyPassword,

    /// The OS random source or the AEAD primitive is unusable.
    #[error("cryptographic primitive unavailable: {0}")]
    CryptoUnavailable(String),
}

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::IncorrectPassword`] → 401
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Conflict`] → 409
/// - [`ServiceError::Internal`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed, e.g. an oversized envelope.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The envelope could not be opened. Deliberately carries no detail.
    #[error("Incorrect password")]
    IncorrectPassword,

    /// The referenced session does not exist or has expired.
    #[error("not found: {0}")]
    NotFound(String),

    /// Another unlock attempt on the same session is still running.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The service is at capacity (sessions or concurrent decrypts).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::IncorrectPassword => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Internal(_) => 500,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code placed in the error response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::IncorrectPassword => "incorrect_password",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Internal(_) => "internal_error",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }

    /// Message safe to expose to callers. Internal details are withheld.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "internal error".into(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::IncorrectPassword.http_status(), 401);
        assert_eq!(ServiceError::NotFound("x".into()).http_status(), 404);
        assert_eq!(ServiceError::Conflict("x".into()).http_status(), 409);
        assert_eq!(ServiceError::Unavailable("x".into()).http_status(), 503);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn incorrect_password_message_is_generic() {
        let e = ServiceError::IncorrectPassword;
        assert_eq!(e.public_message(), "Incorrect password");
        assert_eq!(e.code(), "incorrect_password");
    }

    #[test]
    fn internal_detail_is_withheld() {
        let e = ServiceError::Internal("worker panicked at codec.rs".into());
        assert!(e.to_string().contains("worker panicked"));
        assert_eq!(e.public_message(), "internal error");
    }

    #[test]
    fn codec_errors_do_not_echo_input() {
        assert_eq!(CodecError::Format.to_string(), "malformed envelope");
        assert_eq!(CodecError::Authentication.to_string(), "authentication failed");
    }
}
