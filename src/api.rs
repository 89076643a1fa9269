//! Request/response envelopes.
//!
//! Each operation exposed to remote callers answers with a status code and
//! a `{message, data, errors, success}` body. Absent fields are omitted from
//! the JSON. Clients tell "try again later" (408) from forbidden (403) and
//! fatal (500) by status alone.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::account::AccountCredentials;
use crate::error::MoonError;
use crate::resolver::MoonResolver;
use crate::service::MoonService;

/// Response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub success: bool,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            errors: None,
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            errors: Some(errors),
            success: false,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Status code plus body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiReply {
    pub status: u16,
    pub body: ApiResponse,
}

impl ApiReply {
    pub fn new(status: u16, body: ApiResponse) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.message.clone())
    }
}

impl From<&MoonError> for ApiReply {
    fn from(err: &MoonError) -> Self {
        let body = match err {
            MoonError::TimedOut { elapsed, .. } => ApiResponse::failed(
                format!(
                    "timed out while trying to download the image ({:.2} s)",
                    elapsed.as_secs_f64()
                ),
                vec![err.to_string()],
            ),
            MoonError::Forbidden => ApiResponse::failed("forbidden", vec!["wrong key".to_string()]),
            MoonError::AccountUpdate { errors, .. } if !errors.is_empty() => {
                ApiResponse::failed("there's an error", errors.clone())
            }
            _ => ApiResponse::failed("there's an error", vec![err.to_string()]),
        };
        Self::new(err.status_code(), body)
    }
}

/// Liveness check.
pub fn ping() -> ApiReply {
    ApiReply::new(200, ApiResponse::ok("pong"))
}

/// Resolve the current frame and set it as the caller's profile picture.
pub fn picture(service: &MoonService, credentials: &AccountCredentials) -> ApiReply {
    match service.update_picture(credentials) {
        Ok(update) => ApiReply::new(
            200,
            ApiResponse::ok(update.message).with_data(json!({
                "moon_id": update.moon_id.to_string(),
            })),
        ),
        Err(err) => {
            error!("error while trying to update the profile picture: {}", err);
            ApiReply::from(&err)
        }
    }
}

/// Resolve the current frame ahead of time. Guarded by a shared secret;
/// with no secret configured every key is rejected.
pub fn download(resolver: &MoonResolver, key: &str, expected: Option<&str>) -> ApiReply {
    if expected != Some(key) {
        return ApiReply::from(&MoonError::Forbidden);
    }
    match resolver.resolve() {
        Ok(_) => ApiReply::new(200, ApiResponse::ok("image downloaded")),
        Err(err) => {
            error!("error while trying to download the image: {}", err);
            ApiReply::from(&err)
        }
    }
}
