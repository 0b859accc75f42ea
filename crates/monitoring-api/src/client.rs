//! HTTP client shared by all request functions.
//!
//! Each endpoint module adds its functions to [`ApiClient`] in its own
//! `impl` block. Every request carries `Authorization: Bearer <token>` when
//! the session holds a token; a non-success status becomes an [`ApiError`]
//! carrying the server's message when it sent one.

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let body = self.send(self.request(Method::GET, path).query(query)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET a single string. Accepts a JSON string or a plain text body.
    pub(crate) async fn get_text<Q>(&self, path: &str, query: &Q) -> Result<String>
    where
        Q: Serialize + ?Sized,
    {
        let body = self.send(self.request(Method::GET, path).query(query)).await?;
        match serde_json::from_slice::<String>(&body) {
            Ok(text) => Ok(text),
            Err(_) => Ok(String::from_utf8_lossy(&body).into_owned()),
        }
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let reply = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(serde_json::from_slice(&reply)?)
    }

    /// POST without a body, ignoring whatever comes back.
    pub(crate) async fn post_empty<Q>(&self, path: &str, query: &Q) -> Result<()>
    where
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).query(query)).await?;
        Ok(())
    }

    /// POST a JSON body and return the raw response bytes.
    pub(crate) async fn post_bytes<B>(&self, path: &str, body: &B) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Bytes> {
        let resp = builder.send().await?;
        let status = resp.status();
        let url = resp.url().path().to_string();
        let body = resp.bytes().await?;

        if status.is_success() {
            debug!(path = %url, status = status.as_u16(), len = body.len(), "Request succeeded");
            return Ok(body);
        }

        let message = server_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!(path = %url, status = status.as_u16(), message = %message, "Request failed");

        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// The error text a backend put in a failed response, if any.
fn server_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::String(text)) => Some(text),
        Ok(Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
    }
}
