// src/store/chat.rs - Concierge transcript

use super::AppStore;
use crate::api::types::{ChatMessage, ChatRequest, ChatTurn, Role};

/// Reply used when the completion carries no text.
pub const EMPTY_REPLY: &str = "Got it!";

/// Appended in place of a reply when the concierge can't be reached.
pub const CONCIERGE_UNAVAILABLE: &str = "We couldn't reach the concierge. Try again shortly.";

/// The turns replayed to the completion endpoint. Tool output stays local.
pub fn conversation(messages: &[ChatMessage]) -> Vec<ChatTurn> {
    messages
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant))
        .map(|m| ChatTurn {
            role: m.role,
            content: m.content.clone(),
        })
        .collect()
}

impl AppStore {
    pub fn set_chat_input(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|s| s.chat_input = value);
    }

    pub fn clear_chat_messages(&self) {
        self.update(|s| s.chat_messages.clear());
    }

    pub fn can_send(&self) -> bool {
        self.read(|s| s.can_send())
    }

    /// Replace the transcript with the stored history. On failure the current
    /// transcript is kept.
    pub async fn load_chat_history(&self) {
        let Some(epoch) = self.session_epoch() else {
            return;
        };

        match self.backend.chat_history().await {
            Ok(history) => self.update(|s| {
                if s.epoch == epoch {
                    s.chat_messages = history;
                }
            }),
            Err(e) => tracing::warn!("chat history not available: {e}"),
        }
    }

    /// Send the pending input to the concierge.
    ///
    /// The user message is appended and the input cleared before the request
    /// goes out. Exactly one assistant message follows: the reply, or an
    /// apology if the request failed. Returns that message, or `None` when
    /// there was nothing to send or a send was already running.
    pub async fn send_chat_message(&self) -> Option<ChatMessage> {
        let (epoch, messages) = self.update(|s| {
            if s.is_chat_sending {
                return None;
            }
            let trimmed = s.chat_input.trim();
            if trimmed.is_empty() {
                return None;
            }
            let outgoing = ChatMessage::user(trimmed);
            s.chat_messages.push(outgoing);
            s.chat_input.clear();
            s.is_chat_sending = true;
            Some((s.epoch, conversation(&s.chat_messages)))
        })?;
        let _sending = self.release_on_drop(|s| s.is_chat_sending = false);

        tracing::debug!(turns = messages.len(), "sending chat");
        let reply = match self.backend.chat(ChatRequest { messages }).await {
            Ok(completion) => ChatMessage::assistant(
                completion
                    .text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY.to_string()),
            ),
            Err(e) => {
                tracing::warn!("concierge request failed: {e}");
                ChatMessage::assistant(CONCIERGE_UNAVAILABLE)
            }
        };

        let appended = self.update(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.chat_messages.push(reply.clone());
            true
        });
        appended.then_some(reply)
    }
}
