// src/api/mod.rs - Backend seam: every network call the store makes goes through here

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::infra::errors::KuboError;
pub use http::HttpBackend;
use types::{
    AuthMode, Booking, BookingPayload, ChatCompletion, ChatMessage, ChatRequest, Credentials, Pod,
    PodId, SessionUser,
};

/// The Kubo REST contract. `HttpBackend` talks to the real service; tests
/// substitute their own implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KuboBackend: Send + Sync {
    /// `GET /auth/me`
    async fn current_user(&self) -> Result<SessionUser, KuboError>;

    /// `POST /auth/login` or `POST /auth/register`, depending on `mode`.
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: Credentials,
    ) -> Result<SessionUser, KuboError>;

    /// `POST /auth/logout`
    async fn logout(&self) -> Result<(), KuboError>;

    /// `GET /kubo/pods`
    async fn list_pods(&self) -> Result<Vec<Pod>, KuboError>;

    /// `GET /kubo/pods/{id}`
    async fn get_pod(&self, pod_id: PodId) -> Result<Pod, KuboError>;

    /// `POST /kubo/bookings`. The created booking, when the backend echoes one.
    async fn create_booking(&self, payload: BookingPayload) -> Result<Option<Booking>, KuboError>;

    /// `GET /kubo/my/bookings`
    async fn my_bookings(&self) -> Result<Vec<Booking>, KuboError>;

    /// `GET /ai/history`
    async fn chat_history(&self) -> Result<Vec<ChatMessage>, KuboError>;

    /// `POST /ai/chat/auto`
    async fn chat(&self, request: ChatRequest) -> Result<ChatCompletion, KuboError>;
}
