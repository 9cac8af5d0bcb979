//! Error types
//!
//! Library-level failures. Binaries wrap these in `anyhow` with context.

use thiserror::Error;

/// Missing or unusable process configuration. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} is required.")]
    MissingEnvVar(&'static str),
}

/// Failure to complete a request/response exchange with the API.
///
/// Provider rejections (non-2xx with a structured error body) are not
/// transport errors; they arrive as an [`crate::cloudflare::ApiReply`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("could not encode request body: {0}")]
    Encode(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// A descriptor whose identity key cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid descriptor: ttl {0} must be 1 (auto) or between 30 and 86400")]
    InvalidTtl(u32),

    #[error("invalid descriptor: record type {0} is not managed by this tool")]
    UnmanagedType(String),
}
