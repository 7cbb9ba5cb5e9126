//! Error types and handling for the Meteosat skill webhook

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the Meteosat skill
#[derive(Error, Debug)]
pub enum MeteosatError {
    /// Body could not be decoded or a required header is absent
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// Chain URL, certificate chain or body signature rejected
    #[error("Invalid signature: {message}")]
    SignatureInvalid { message: String },

    /// Request timestamp outside the accepted window
    #[error("Stale request timestamp: {skew_seconds}s from now")]
    TimestampStale { skew_seconds: i64 },

    /// The certificate chain could not be retrieved
    #[error("Certificate fetch failed: {message}")]
    CertificateFetch { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl MeteosatError {
    /// Create a new malformed request error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Create a new signature error
    pub fn signature<S: Into<String>>(message: S) -> Self {
        Self::SignatureInvalid {
            message: message.into(),
        }
    }

    /// Create a new certificate fetch error
    pub fn certificate_fetch<S: Into<String>>(message: S) -> Self {
        Self::CertificateFetch {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller rather than by this service.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            MeteosatError::MalformedRequest { .. }
                | MeteosatError::SignatureInvalid { .. }
                | MeteosatError::TimestampStale { .. }
                | MeteosatError::CertificateFetch { .. }
        )
    }
}

impl IntoResponse for MeteosatError {
    fn into_response(self) -> Response {
        // Rejections carry no body so a forger cannot tell which check tripped.
        if self.is_rejection() {
            StatusCode::BAD_REQUEST.into_response()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
