// src/api/http.rs - reqwest implementation of the Kubo backend contract
//
// Every request shares one cookie jar so the session cookie set by
// login/register rides along on later calls. Non-2xx bodies are parsed as
// JSON (best effort) and the message comes from `detail` or `message`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    AuthMode, Booking, BookingPayload, ChatCompletion, ChatMessage, ChatRequest, Credentials, Pod,
    PodId, SessionUser,
};
use super::KuboBackend;
use crate::infra::config::ApiConfig;
use crate::infra::errors::KuboError;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, KuboError> {
        Self::build(base_url.into(), None)
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, KuboError> {
        Self::build(config.base_url.clone(), config.timeout())
    }

    fn build(base_url: String, timeout: Option<std::time::Duration>) -> Result<Self, KuboError> {
        url::Url::parse(&base_url)
            .map_err(|e| KuboError::Config(format!("invalid base url '{base_url}': {e}")))?;
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the request. `None` means 204 No Content.
    async fn execute(&self, request: RequestBuilder) -> Result<Option<String>, KuboError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload: Value =
                serde_json::from_str(&body).unwrap_or_else(|_| Value::Object(Default::default()));
            return Err(KuboError::Api {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &payload),
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, KuboError> {
        match self.execute(request).await? {
            Some(body) => decode(&body),
            None => Err(KuboError::Decode("empty response".into())),
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, KuboError> {
        match self.execute(request).await? {
            Some(body) if !body.trim().is_empty() => decode(&body),
            _ => Ok(Vec::new()),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, KuboError> {
    serde_json::from_str(body).map_err(|e| KuboError::Decode(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// `detail` wins over `message`. Non-string details (validation error lists)
/// are rendered as JSON. Anything else falls back to `Request failed: <status>`.
pub fn error_message(status: u16, payload: &Value) -> String {
    for key in ["detail", "message"] {
        match payload.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Null) | None => continue,
            Some(other) => return other.to_string(),
        }
    }
    format!("Request failed: {status}")
}

#[async_trait]
impl KuboBackend for HttpBackend {
    async fn current_user(&self) -> Result<SessionUser, KuboError> {
        self.fetch_json(self.client.get(self.url("/auth/me"))).await
    }

    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: Credentials,
    ) -> Result<SessionUser, KuboError> {
        tracing::debug!(path = mode.path(), "authenticating");
        self.fetch_json(self.client.post(self.url(mode.path())).json(&credentials))
            .await
    }

    async fn logout(&self) -> Result<(), KuboError> {
        self.execute(self.client.post(self.url("/auth/logout")))
            .await
            .map(|_| ())
    }

    async fn list_pods(&self) -> Result<Vec<Pod>, KuboError> {
        self.fetch_list(self.client.get(self.url("/kubo/pods"))).await
    }

    async fn get_pod(&self, pod_id: PodId) -> Result<Pod, KuboError> {
        self.fetch_json(self.client.get(self.url(&format!("/kubo/pods/{pod_id}"))))
            .await
    }

    async fn create_booking(&self, payload: BookingPayload) -> Result<Option<Booking>, KuboError> {
        let body = self
            .execute(self.client.post(self.url("/kubo/bookings")).json(&payload))
            .await?;

        // The store does not depend on the echo; tolerate shapes we can't read.
        Ok(body
            .filter(|b| !b.trim().is_empty())
            .and_then(|b| match serde_json::from_str::<Booking>(&b) {
                Ok(booking) => Some(booking),
                Err(e) => {
                    tracing::debug!("unrecognized booking response: {e}");
                    None
                }
            }))
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>, KuboError> {
        self.fetch_list(self.client.get(self.url("/kubo/my/bookings")))
            .await
    }

    async fn chat_history(&self) -> Result<Vec<ChatMessage>, KuboError> {
        self.fetch_list(self.client.get(self.url("/ai/history"))).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion, KuboError> {
        match self
            .execute(self.client.post(self.url("/ai/chat/auto")).json(&request))
            .await?
        {
            Some(body) if !body.trim().is_empty() => decode(&body),
            _ => Ok(ChatCompletion::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_detail() {
        let payload = json!({"detail": "Invalid credentials", "message": "ignored"});
        assert_eq!(error_message(401, &payload), "Invalid credentials");
    }

    #[test]
    fn test_error_message_falls_back_to_message() {
        let payload = json!({"message": "Pod is inactive"});
        assert_eq!(error_message(400, &payload), "Pod is inactive");
    }

    #[test]
    fn test_error_message_null_detail_falls_through() {
        let payload = json!({"detail": null, "message": "from message"});
        assert_eq!(error_message(400, &payload), "from message");
    }

    #[test]
    fn test_error_message_default() {
        assert_eq!(error_message(502, &json!({})), "Request failed: 502");
    }

    #[test]
    fn test_error_message_structured_detail() {
        let payload = json!({"detail": [{"loc": ["body", "email"], "msg": "field required"}]});
        let msg = error_message(422, &payload);
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/auth/me"), "http://localhost:8000/auth/me");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let err = HttpBackend::new("not a url").unwrap_err();
        assert!(matches!(err, KuboError::Config(_)));
    }
}
