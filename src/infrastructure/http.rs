//! Thin JSON transport over `reqwest`.
//!
//! Attaches the bearer token and maps every non-success answer onto
//! [`ApiError`] through the backend's error envelope.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use crate::domain::errors::ErrorMessage;
use crate::domain::{ApiError, ErrorBody};

const USER_AGENT: &str = concat!("backoffice/", env!("CARGO_PKG_VERSION"));

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.has_token())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("API_URL inválida '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// `path` is relative to the API base and may omit the leading slash.
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).query(query);
        self.send(builder).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.send(builder).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, path).json(body);
        self.send(builder).await
    }

    /// POST without a request body, e.g. workflow transitions.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path);
        self.send(builder).await
    }

    /// DELETE; whatever the backend answers on success is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, path);
        self.send::<serde_json::Value>(builder).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Request failed: {}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let error = error_from_body(status.as_u16(), &text);
            tracing::warn!("API answered {}: {}", status, error);
            return Err(error);
        }

        // Some endpoints answer 200/204 with no body at all
        let raw = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(raw).map_err(|e| {
            tracing::error!("Unexpected response shape ({}): {}", e, truncate(&text, 200));
            ApiError::Decode(e.to_string())
        })
    }
}

fn error_from_body(status: u16, text: &str) -> ApiError {
    let body = match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => body,
        Err(_) if !text.trim().is_empty() => ErrorBody {
            message: Some(ErrorMessage::One(truncate(text, 200).to_string())),
            ..ErrorBody::default()
        },
        Err(_) => ErrorBody::default(),
    };
    body.into_error(status)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_under_the_api_prefix() {
        let client = ApiClient::new("http://localhost:3000/api/v1", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("/locales/3").as_str(),
            "http://localhost:3000/api/v1/locales/3"
        );
        assert_eq!(
            client.url("auth/login").as_str(),
            "http://localhost:3000/api/v1/auth/login"
        );

        let trailing = ApiClient::new("http://localhost:3000/api/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            trailing.url("/roles").as_str(),
            "http://localhost:3000/api/v1/roles"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn token_slot() {
        let client = ApiClient::new("http://localhost", Duration::from_secs(1)).unwrap();
        assert!(!client.has_token());
        client.set_token("abc");
        assert_eq!(client.token().as_deref(), Some("abc"));
        client.clear_token();
        assert_eq!(client.token(), None);
    }

    #[test]
    fn plain_text_error_bodies_are_kept() {
        let err = error_from_body(500, "Internal Server Error");
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "Internal Server Error".into()
            }
        );
        assert_eq!(error_from_body(401, ""), ApiError::SessionExpired);
    }
}
