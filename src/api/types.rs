// src/api/types.rs - Wire types shared with the Kubo backend

use serde::{Deserialize, Deserializer, Serialize};

pub type UserId = i64;
pub type PodId = i64;
pub type BookingId = i64;

/// The authenticated identity, as returned by `/auth/me`, `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    /// Backend route for this mode.
    pub fn path(self) -> &'static str {
        match self {
            AuthMode::Login => "/auth/login",
            AuthMode::Signup => "/auth/register",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub id: PodId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub capacity: i32,
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /kubo/bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingPayload {
    pub user_id: UserId,
    pub pod_id: PodId,
    pub start_time: String,
    pub end_time: String,
    pub total_price_cents: i64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub pod_id: PodId,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub total_price_cents: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One transcript entry. Outgoing ids are generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "new_message_id", deserialize_with = "deserialize_message_id")]
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// History rows may carry numeric or string ids, or none at all.
fn deserialize_message_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Number(n)) => n.to_string(),
        None => new_message_id(),
    })
}

/// A conversation turn replayed to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /ai/chat/auto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

/// Response of `POST /ai/chat/auto`. Only `text` is consumed by the store.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub conversation: Vec<serde_json::Value>,
    #[serde(default)]
    pub tool_calls_executed: Option<u32>,
}
