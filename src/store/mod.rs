// src/store/mod.rs - Client-side session, booking and chat store
//
// One `AppStore` owns all application state. Callers read snapshots and
// mutate only through the action methods defined in the submodules. The
// state lock is never held across an `.await`.

pub mod bookings;
pub mod chat;
pub mod draft;
pub mod pods;
pub mod session;
pub mod status;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

use crate::api::types::{AuthMode, Booking, ChatMessage, Pod, PodId, SessionUser};
use crate::api::KuboBackend;
use crate::infra::config::BookingConfig;
pub use draft::{BookingDraft, DraftPatch, DraftWindow};
pub use status::{StatusKind, StatusMessage};

/// Everything the UI renders from.
#[derive(Clone, Default)]
pub struct AppState {
    pub auth_mode: AuthMode,
    pub user: Option<SessionUser>,
    pub email: String,
    pub password: String,
    pub auth_error: Option<String>,
    pub is_auth_submitting: bool,

    pub pods: Vec<Pod>,
    pub booking_drafts: HashMap<PodId, BookingDraft>,
    pub pods_status: Option<StatusMessage>,
    pub booking_in_flight: HashSet<PodId>,

    pub bookings: Vec<Booking>,
    pub is_loading_bookings: bool,

    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub is_chat_sending: bool,

    /// Bumped on every session change. Responses started under an older
    /// epoch are discarded.
    epoch: u64,
}

impl AppState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Input has non-whitespace text and no send is in flight.
    pub fn can_send(&self) -> bool {
        !self.chat_input.trim().is_empty() && !self.is_chat_sending
    }

    /// Start a session for `user`. Confirming the user already signed in
    /// keeps the epoch so in-flight work still lands. Switching to another
    /// user drops the previous user's data first.
    fn begin_session(&mut self, user: SessionUser) {
        match &self.user {
            Some(current) if current.id == user.id => {
                self.user = Some(user);
                return;
            }
            Some(_) => self.end_session(),
            None => {}
        }
        self.user = Some(user);
        self.epoch += 1;
    }

    /// Drop the session and every piece of per-user data.
    fn end_session(&mut self) {
        self.user = None;
        self.pods.clear();
        self.booking_drafts.clear();
        self.pods_status = None;
        self.bookings.clear();
        self.is_loading_bookings = false;
        self.chat_messages.clear();
        self.epoch += 1;
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth_mode", &self.auth_mode)
            .field("user", &self.user)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("auth_error", &self.auth_error)
            .field("pods", &self.pods.len())
            .field("pods_status", &self.pods_status)
            .field("bookings", &self.bookings.len())
            .field("chat_messages", &self.chat_messages.len())
            .field("is_chat_sending", &self.is_chat_sending)
            .field("epoch", &self.epoch)
            .finish()
    }
}

pub struct AppStore {
    backend: Arc<dyn KuboBackend>,
    state: Arc<Mutex<AppState>>,
    draft_window: DraftWindow,
    status_clear_after: Duration,
    status_timer: Mutex<Option<AbortHandle>>,
}

impl AppStore {
    pub fn new(backend: Arc<dyn KuboBackend>) -> Self {
        Self::with_config(backend, &BookingConfig::default())
    }

    pub fn with_config(backend: Arc<dyn KuboBackend>, config: &BookingConfig) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(AppState::default())),
            draft_window: DraftWindow::from_config(config),
            status_clear_after: Duration::from_secs(config.status_clear_secs),
            status_timer: Mutex::new(None),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> AppState {
        lock_state(&self.state).clone()
    }

    /// Read a projection of the state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&lock_state(&self.state))
    }

    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        f(&mut lock_state(&self.state))
    }

    /// Epoch of the active session, or `None` when anonymous.
    fn session_epoch(&self) -> Option<u64> {
        self.read(|s| s.user.as_ref().map(|_| s.epoch))
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.read(|s| s.epoch == epoch)
    }

    /// Run `release` against the state when the returned guard drops, even
    /// if the owning future is cancelled.
    fn release_on_drop<F: FnOnce(&mut AppState)>(&self, release: F) -> ReleaseGuard<'_, F> {
        ReleaseGuard {
            state: self.state.as_ref(),
            release: Some(release),
        }
    }

    fn cancel_status_timer(&self) {
        let handle = self
            .status_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for AppStore {
    fn drop(&mut self) {
        self.cancel_status_timer();
    }
}

fn lock_state(state: &Mutex<AppState>) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ReleaseGuard<'a, F: FnOnce(&mut AppState)> {
    state: &'a Mutex<AppState>,
    release: Option<F>,
}

impl<F: FnOnce(&mut AppState)> Drop for ReleaseGuard<'_, F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&mut lock_state(self.state));
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::api::MockKuboBackend;

    pub fn user() -> SessionUser {
        SessionUser {
            id: 1,
            email: "a@b.com".into(),
        }
    }

    pub fn pod(id: PodId, name: &str) -> Pod {
        Pod {
            id,
            name: name.into(),
            description: Some(format!("{name} description")),
            capacity: 4,
            price_cents: 2500,
            is_active: true,
            created_at: "2026-10-01T09:00:00".into(),
            updated_at: "2026-10-01T09:00:00".into(),
        }
    }

    pub fn store(mock: MockKuboBackend) -> AppStore {
        AppStore::new(Arc::new(mock))
    }

    /// A store that already holds a session, without touching the backend.
    pub fn signed_in(mock: MockKuboBackend) -> AppStore {
        let store = store(mock);
        store.update(|s| s.begin_session(user()));
        store
    }
}
