//! reqwest-backed [`HttpClient`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::ServiceError;
use crate::services::{ApiResponse, HttpClient, SessionStore};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Talks to the REST backend, attaching the current session's bearer token.
pub struct ReqwestClient {
    client: Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
}

impl ReqwestClient {
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            sessions,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ServiceError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(session) = self.sessions.load().await? {
            request = request.bearer_auth(&session.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?.error_for_status()?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ApiResponse::default());
        }

        // Bodies without an envelope are treated as the data itself
        let payload: Value = serde_json::from_str(&text)?;
        let data = match payload {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Ok(ApiResponse { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemorySessionStore, Session};
    use axum::{http::HeaderMap, routing::get, Json, Router};
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::json;

    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({ "data": { "auth": auth } }))
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/api/me", get(echo_auth))
            .route("/api/raw", get(|| async { Json(json!([1, 2, 3])) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    #[test]
    fn test_url_join() {
        let client = ReqwestClient::new(
            "http://localhost:8000/api/",
            Arc::new(MemorySessionStore::new()),
        )
        .unwrap();
        assert_eq!(client.url("/users/1"), "http://localhost:8000/api/users/1");
        assert_eq!(client.url("users"), "http://localhost:8000/api/users");
    }

    #[tokio::test]
    async fn test_bearer_token_from_session() {
        let sessions = Arc::new(MemorySessionStore::new());
        sessions
            .save(&Session {
                token: "secret".to_string(),
                user_id: "u1".to_string(),
                role: "admin".to_string(),
                expires_at: Utc::now() + ChronoDuration::hours(1),
            })
            .await
            .unwrap();
        let client = ReqwestClient::new(serve().await, sessions).unwrap();

        let response = client.get("me").await.unwrap();
        assert_eq!(response.data["auth"], "Bearer secret");
    }

    #[tokio::test]
    async fn test_unwrapped_body_is_data() {
        let client = ReqwestClient::new(serve().await, Arc::new(MemorySessionStore::new())).unwrap();

        let response = client.get("raw").await.unwrap();
        assert_eq!(response.data, json!([1, 2, 3]));

        let anonymous = client.get("me").await.unwrap();
        assert_eq!(anonymous.data["auth"], "");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let client = ReqwestClient::new(serve().await, Arc::new(MemorySessionStore::new())).unwrap();
        let err = client.get("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
    }
}
