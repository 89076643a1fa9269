//! Account service collaborator.
//!
//! Uploading the resolved frame as a profile picture, or changing the
//! display name, is delegated to an [`AccountUpdater`]. Failures reported
//! by the service are passed through with their original status and error
//! list in [`MoonError::AccountUpdate`].

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::AccountConfig;
use crate::error::{MoonError, Result};

/// Per-user access credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub access_token: String,
    pub access_token_secret: String,
}

impl AccountCredentials {
    pub fn new(access_token: impl Into<String>, access_token_secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"***")
            .finish()
    }
}

/// Applies profile changes to a user's account.
pub trait AccountUpdater: Send + Sync {
    /// Replace the profile picture with the image at `image`.
    fn update_profile_image(&self, credentials: &AccountCredentials, image: &Path) -> Result<()>;

    /// Replace the display name.
    fn update_display_name(&self, credentials: &AccountCredentials, name: &str) -> Result<()>;
}

pub const PROFILE_IMAGE_PATH: &str = "/account/update_profile_image";
pub const PROFILE_PATH: &str = "/account/update_profile";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`AccountUpdater`] speaking plain HTTP to an account API.
///
/// Application and user credentials travel in `X-Consumer-Key`,
/// `X-Consumer-Secret`, `X-Access-Token` and `X-Access-Token-Secret`
/// headers.
pub struct HttpAccountUpdater {
    endpoint: String,
    consumer_key: String,
    consumer_secret: String,
    client: Client,
}

impl HttpAccountUpdater {
    pub fn new(
        endpoint: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("moonframe/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| MoonError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            client,
        })
    }

    /// Build from configuration. Every field is required.
    pub fn from_config(config: &AccountConfig) -> Result<Self> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MoonError::ConfigValidationError {
                    message: format!("account.{} is required to update the account", name),
                })
        };
        Self::new(
            require(&config.endpoint, "endpoint")?,
            require(&config.consumer_key, "consumer_key")?,
            require(&config.consumer_secret, "consumer_secret")?,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, path: &str, credentials: &AccountCredentials) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.endpoint, path))
            .header("X-Consumer-Key", &self.consumer_key)
            .header("X-Consumer-Secret", &self.consumer_secret)
            .header("X-Access-Token", &credentials.access_token)
            .header("X-Access-Token-Secret", &credentials.access_token_secret)
    }

    fn send(&self, request: RequestBuilder, path: &str) -> Result<()> {
        let url = format!("{}{}", self.endpoint, path);
        let response = request.send().map_err(|e| MoonError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let status = response.status();
        debug!("POST {} -> {}", url, status);
        if status.is_success() {
            return Ok(());
        }
        Err(MoonError::AccountUpdate {
            status: status.as_u16(),
            errors: error_messages(response),
        })
    }
}

impl AccountUpdater for HttpAccountUpdater {
    fn update_profile_image(&self, credentials: &AccountCredentials, image: &Path) -> Result<()> {
        let bytes = std::fs::read(image)?;
        let request = self
            .post(PROFILE_IMAGE_PATH, credentials)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(bytes);
        self.send(request, PROFILE_IMAGE_PATH)
    }

    fn update_display_name(&self, credentials: &AccountCredentials, name: &str) -> Result<()> {
        let request = self
            .post(PROFILE_PATH, credentials)
            .json(&json!({ "name": name }));
        self.send(request, PROFILE_PATH)
    }
}

/// Errors reported by the service: the `errors` array of a JSON body
/// (strings or objects with a `message`), else the raw body, else the
/// status line.
fn error_messages(response: Response) -> Vec<String> {
    let status = response.status();
    let body = response.text().unwrap_or_default();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
        if let Some(Value::Array(items)) = map.get("errors") {
            let errors: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    Value::Object(o) => o
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string()),
                    other => other.to_string(),
                })
                .collect();
            if !errors.is_empty() {
                return errors;
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        vec![status.to_string()]
    } else {
        vec![body.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn creds() -> AccountCredentials {
        AccountCredentials::new("token", "token-secret")
    }

    fn updater(server: &MockServer) -> HttpAccountUpdater {
        HttpAccountUpdater::new(server.base_url(), "ck", "cs").unwrap()
    }

    #[test]
    fn uploads_image_with_credentials() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("moon_0001.jpg");
        std::fs::write(&image, b"jpeg-bytes").unwrap();

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(PROFILE_IMAGE_PATH)
                .header("x-consumer-key", "ck")
                .header("x-consumer-secret", "cs")
                .header("x-access-token", "token")
                .header("x-access-token-secret", "token-secret")
                .header("content-type", "image/jpeg")
                .body("jpeg-bytes");
            then.status(200);
        });

        updater(&server).update_profile_image(&creds(), &image).unwrap();

        mock.assert();
    }

    #[test]
    fn sends_display_name_as_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(PROFILE_PATH)
                .json_body(json!({ "name": "moon 🌕" }));
            then.status(200);
        });

        updater(&server)
            .update_display_name(&creds(), "moon 🌕")
            .unwrap();

        mock.assert();
    }

    #[test]
    fn passes_service_errors_through() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PROFILE_PATH);
            then.status(429).json_body(json!({
                "errors": [{ "code": 88, "message": "Rate limit exceeded" }, "try later"]
            }));
        });

        let err = updater(&server)
            .update_display_name(&creds(), "x")
            .unwrap_err();

        match err {
            MoonError::AccountUpdate { status, errors } => {
                assert_eq!(status, 429);
                assert_eq!(errors, vec!["Rate limit exceeded", "try later"]);
            }
            other => panic!("expected AccountUpdate, got {:?}", other),
        }
    }

    #[test]
    fn plain_body_becomes_single_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(PROFILE_PATH);
            then.status(401).body("bad token\n");
        });

        let err = updater(&server)
            .update_display_name(&creds(), "x")
            .unwrap_err();

        assert!(matches!(
            err,
            MoonError::AccountUpdate { status: 401, ref errors } if errors == &vec!["bad token".to_string()]
        ));
    }

    #[test]
    fn missing_image_is_io_error() {
        let server = MockServer::start();
        let err = updater(&server)
            .update_profile_image(&creds(), Path::new("/nonexistent/moon.jpg"))
            .unwrap_err();

        assert!(matches!(err, MoonError::Io(_)));
    }

    #[test]
    fn from_config_requires_every_field() {
        let mut config = AccountConfig {
            endpoint: Some("http://localhost".to_string()),
            consumer_key: Some("ck".to_string()),
            consumer_secret: None,
        };
        assert!(HttpAccountUpdater::from_config(&config).is_err());

        config.consumer_secret = Some("cs".to_string());
        let updater = HttpAccountUpdater::from_config(&config).unwrap();
        assert_eq!(updater.endpoint(), "http://localhost");
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("token-secret"));
    }
}
