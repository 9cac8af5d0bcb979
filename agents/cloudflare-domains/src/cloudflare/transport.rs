//! Request/response seam between the reconciler and the HTTP client
//!
//! Everything above this trait sees a status code and a decoded (or raw)
//! body. Tests swap in an in-memory implementation.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::ApiMessage;
use crate::error::TransportError;

/// Statuses the provider uses for accepted requests.
const SUCCESS_STATUSES: [u16; 3] = [200, 201, 202];

/// Transport for Cloudflare API calls
#[async_trait]
pub trait CloudflareTransport: Send + Sync {
    /// Send one request. `path` is relative to the API base and may carry a
    /// query string.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiReply, TransportError>;
}

/// Response body as received
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    /// Body that was not valid JSON
    Raw(String),
}

/// One API response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl ApiReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
        }
    }

    pub fn from_text(status: u16, text: String) -> Self {
        let body = match serde_json::from_str(&text) {
            Ok(value) => ReplyBody::Json(value),
            Err(_) => ReplyBody::Raw(text),
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status)
    }

    /// Entries of the envelope's `errors` array
    pub fn errors(&self) -> Vec<ApiMessage> {
        match &self.body {
            ReplyBody::Json(value) => value
                .get("errors")
                .cloned()
                .and_then(|errors| serde_json::from_value(errors).ok())
                .unwrap_or_default(),
            ReplyBody::Raw(_) => Vec::new(),
        }
    }

    pub fn has_error_code(&self, code: i64) -> bool {
        self.errors().iter().any(|e| e.code == code)
    }

    pub fn has_error_message(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.errors()
            .iter()
            .any(|e| e.message.to_lowercase().contains(&needle))
    }

    /// Decode the envelope's `result`. A null or absent result decodes as
    /// `T::default()`.
    pub fn result<T>(&self) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Default,
    {
        match &self.body {
            ReplyBody::Json(value) => match value.get("result") {
                None | Some(Value::Null) => Ok(T::default()),
                Some(result) => serde_json::from_value(result.clone())
                    .map_err(|e| TransportError::Decode(e.to_string())),
            },
            ReplyBody::Raw(text) => Err(TransportError::Decode(text.clone())),
        }
    }

    /// Decode a single-object `result`
    pub fn result_object<T>(&self) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        match &self.body {
            ReplyBody::Json(value) => {
                let result = value.get("result").cloned().unwrap_or(Value::Null);
                serde_json::from_value(result).map_err(|e| TransportError::Decode(e.to_string()))
            }
            ReplyBody::Raw(text) => Err(TransportError::Decode(text.clone())),
        }
    }

    /// Human-readable account of a rejected request: the provider's error
    /// list when there is one, otherwise the raw body.
    pub fn reason(&self) -> String {
        let errors = self.errors();
        if !errors.is_empty() {
            let joined: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            return format!("HTTP {} ({})", self.status, joined.join(", "));
        }

        match &self.body {
            ReplyBody::Json(value) => format!("HTTP {} {}", self.status, value),
            ReplyBody::Raw(text) => format!("HTTP {} {}", self.status, text),
        }
    }
}
