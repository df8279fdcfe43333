pub mod admin;
pub mod auth;
pub mod employer;
pub mod error;
pub mod internships;
pub mod student;

pub use auth::{LoginFieldErrors, LoginOutcome, PasswordChange};
pub use error::ApiError;

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// One HTTP client for the whole application. Decorates every outgoing
/// request with the stored bearer token and reacts to the one response the
/// client interprets itself: a 401 on an authenticated request, which means
/// the server no longer honours the token.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url().to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub(crate) async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::GET, path);
        self.dispatch(builder, authorized).await
    }

    pub(crate) async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::POST, path);
        self.dispatch(builder.json(body), authorized).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::POST, path);
        self.dispatch(builder, authorized).await
    }

    pub(crate) async fn put_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::PUT, path);
        self.dispatch(builder.json(body), authorized).await
    }

    // Multipart bodies never take a caller-set content type: reqwest has to
    // compute the boundary itself, so the form is handed over untouched.
    pub(crate) async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::POST, path);
        self.dispatch(builder.multipart(form), authorized).await
    }

    pub(crate) async fn put_multipart(&self, path: &str, form: Form) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::PUT, path);
        self.dispatch(builder.multipart(form), authorized).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let (builder, authorized) = self.request(Method::DELETE, path);
        self.dispatch(builder, authorized).await
    }

    /// Build a request against the configured base, attaching the bearer
    /// token when the session store holds one. The flag records whether the
    /// request went out authenticated.
    fn request(&self, method: Method, path: &str) -> (RequestBuilder, bool) {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match self.session.token() {
            Some(token) => (builder.bearer_auth(token), true),
            None => (builder, false),
        }
    }

    /// One-shot send: no retry, no backoff, no cancellation. Non-2xx
    /// responses become typed errors carrying the server's message when the
    /// body is JSON.
    async fn dispatch(&self, builder: RequestBuilder, authorized: bool) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(ApiError::Decode);
        }

        let message = extract_message(&text);
        debug!(status = status.as_u16(), ?message, "request failed");

        match status {
            StatusCode::UNAUTHORIZED => {
                // Only a rejected bearer token invalidates the session.
                // Anonymous 401s (e.g. a failed login) are the caller's
                // problem.
                if authorized {
                    warn!("bearer token rejected by server, clearing session");
                    self.session.clear();
                }
                Err(ApiError::Unauthorized { message })
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound { message }),
            other => Err(ApiError::Status {
                status: other.as_u16(),
                message,
            }),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A file destined for a multipart request (CV, profile image, company
/// logo). The name is sanitised before it is put on the wire.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: sanitize_filename::sanitize(filename.into()),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Load a file from disk, deriving the content type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("unable to derive filename from {:?}", path))?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read upload from {:?}", path))?;
        Ok(Self::new(filename.to_string(), guess_mime(path), bytes))
    }

    pub(crate) fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&self.content_type)
            .map_err(|err| ApiError::InvalidUpload(err.to_string()))
    }
}

fn guess_mime(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mime = match extension.as_str() {
        "pdf" => mime::APPLICATION_PDF,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        _ => mime::APPLICATION_OCTET_STREAM,
    };
    mime.to_string()
}
