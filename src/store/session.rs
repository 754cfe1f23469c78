// src/store/session.rs - Authentication and session lifecycle

use super::AppStore;
use crate::api::types::{AuthMode, Credentials, SessionUser};
use crate::infra::errors::KuboError;

impl AppStore {
    pub fn set_auth_mode(&self, mode: AuthMode) {
        self.update(|s| s.auth_mode = mode);
    }

    pub fn set_email(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|s| s.email = value);
    }

    pub fn set_password(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|s| s.password = value);
    }

    /// Probe the backend session. A failure means "not logged in" and is not
    /// reported anywhere.
    pub async fn fetch_current_user(&self) -> Option<SessionUser> {
        let epoch = self.read(|s| s.epoch);

        match self.backend.current_user().await {
            Ok(user) => {
                let applied = self.update(|s| {
                    if s.epoch != epoch {
                        return false;
                    }
                    s.begin_session(user.clone());
                    true
                });
                if !applied {
                    tracing::debug!("session probe superseded, discarding result");
                    return None;
                }
                tracing::info!(user_id = user.id, "session restored");
                self.load_session_data().await;
                Some(user)
            }
            Err(e) => {
                tracing::debug!("no active session: {e}");
                self.update(|s| {
                    if s.epoch == epoch && s.user.is_some() {
                        s.end_session();
                    }
                });
                None
            }
        }
    }

    /// Log in or sign up with the pending credentials, depending on the auth mode.
    ///
    /// The error is recorded in `auth_error` and also returned so the caller
    /// can react. Credentials are kept on failure.
    pub async fn authenticate(&self) -> Result<SessionUser, KuboError> {
        let Some((mode, credentials)) = self.update(|s| {
            if s.is_auth_submitting {
                return None;
            }
            s.is_auth_submitting = true;
            s.auth_error = None;
            Some((
                s.auth_mode,
                Credentials {
                    email: s.email.clone(),
                    password: s.password.clone(),
                },
            ))
        }) else {
            return Err(KuboError::AuthInFlight);
        };
        let _submitting = self.release_on_drop(|s| s.is_auth_submitting = false);

        match self.backend.authenticate(mode, credentials).await {
            Ok(user) => {
                self.update(|s| {
                    s.begin_session(user.clone());
                    s.email.clear();
                    s.password.clear();
                    s.auth_error = None;
                    s.is_auth_submitting = false;
                });
                tracing::info!(user_id = user.id, ?mode, "authenticated");
                self.load_session_data().await;
                Ok(user)
            }
            Err(e) => {
                let message = e.user_message("Authentication failed");
                tracing::warn!("authentication failed: {message}");
                self.update(|s| {
                    s.auth_error = Some(message);
                    s.is_auth_submitting = false;
                });
                Err(e)
            }
        }
    }

    /// Best-effort logout. Local per-user state is always cleared, whatever
    /// the backend says.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            tracing::warn!("logout request failed: {e}");
        }
        self.cancel_status_timer();
        self.update(|s| s.end_session());
        tracing::info!("logged out");
    }

    /// Pods and chat history load concurrently after any session change.
    async fn load_session_data(&self) {
        tokio::join!(self.load_pods(), self.load_chat_history());
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::api::types::{ChatMessage, Pod};
    use crate::api::MockKuboBackend;
    use crate::infra::errors::KuboError;
    use crate::api::types::AuthMode;
    use crate::store::DraftPatch;
    use pretty_assertions::assert_eq;

    fn unauthorized() -> KuboError {
        KuboError::Api {
            status: 401,
            message: "Not authenticated".into(),
        }
    }

    #[tokio::test]
    async fn test_probe_failure_leaves_session_absent_and_loads_nothing() {
        let mut mock = MockKuboBackend::new();
        mock.expect_current_user().times(1).returning(|| Err(unauthorized()));
        mock.expect_list_pods().never();
        mock.expect_chat_history().never();

        let store = store(mock);
        assert!(store.fetch_current_user().await.is_none());
        assert!(store.snapshot().user.is_none());
    }

    #[tokio::test]
    async fn test_probe_success_fans_out_loads() {
        let mut mock = MockKuboBackend::new();
        mock.expect_current_user().times(1).returning(|| Ok(user()));
        mock.expect_list_pods()
            .times(1)
            .returning(|| Ok(vec![pod(1, "Alpha")]));
        mock.expect_chat_history()
            .times(1)
            .returning(|| Ok(vec![ChatMessage::assistant("Welcome back")]));

        let store = store(mock);
        assert_eq!(store.fetch_current_user().await, Some(user()));
        let state = store.snapshot();
        assert_eq!(state.user, Some(user()));
        assert_eq!(state.pods.len(), 1);
        assert_eq!(state.chat_messages.len(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_clears_existing_session() {
        let mut mock = MockKuboBackend::new();
        mock.expect_current_user().returning(|| Err(unauthorized()));
        let store = signed_in(mock);
        store.fetch_current_user().await;
        assert!(store.snapshot().user.is_none());
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut mock = MockKuboBackend::new();
        mock.expect_authenticate()
            .withf(|mode, creds| {
                *mode == AuthMode::Login && creds.email == "a@b.com" && creds.password == "x"
            })
            .times(1)
            .returning(|_, _| Ok(user()));
        mock.expect_list_pods().times(1).returning(|| Ok(Vec::<Pod>::new()));
        mock.expect_chat_history().times(1).returning(|| Ok(Vec::new()));

        let store = store(mock);
        store.update(|s| s.auth_error = Some("Invalid credentials".into()));
        store.set_email("a@b.com");
        store.set_password("x");
        let result = store.authenticate().await;

        assert_eq!(result.unwrap(), user());
        let state = store.snapshot();
        assert_eq!(state.user, Some(user()));
        assert_eq!(state.email, "");
        assert_eq!(state.password, "");
        assert!(state.auth_error.is_none());
        assert!(!state.is_auth_submitting);
    }

    #[tokio::test]
    async fn test_signup_uses_signup_mode() {
        let mut mock = MockKuboBackend::new();
        mock.expect_authenticate()
            .withf(|mode, _| *mode == AuthMode::Signup)
            .times(1)
            .returning(|_, _| Ok(user()));
        mock.expect_list_pods().returning(|| Ok(Vec::new()));
        mock.expect_chat_history().returning(|| Ok(Vec::new()));

        let store = store(mock);
        store.set_auth_mode(AuthMode::Signup);
        store.set_email("a@b.com");
        store.set_password("x");
        assert!(store.authenticate().await.is_ok());
    }

    #[tokio::test]
    async fn test_login_failure_records_error_and_keeps_credentials() {
        let mut mock = MockKuboBackend::new();
        mock.expect_authenticate().returning(|_, _| {
            Err(KuboError::Api {
                status: 401,
                message: "Invalid credentials".into(),
            })
        });
        mock.expect_list_pods().never();

        let store = store(mock);
        store.set_email("a@b.com");
        store.set_password("wrong");
        let err = store.authenticate().await.unwrap_err();

        assert!(err.is_unauthorized());
        let state = store.snapshot();
        assert!(state.user.is_none());
        assert_eq!(state.auth_error.as_deref(), Some("Invalid credentials"));
        assert_eq!(state.email, "a@b.com");
        assert_eq!(state.password, "wrong");
        assert!(!state.is_auth_submitting);
    }

    #[tokio::test]
    async fn test_authenticate_rejected_while_submitting() {
        let mut mock = MockKuboBackend::new();
        mock.expect_authenticate().never();
        let store = store(mock);
        store.update(|s| s.is_auth_submitting = true);
        assert!(matches!(
            store.authenticate().await,
            Err(KuboError::AuthInFlight)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_everything_even_when_request_fails() {
        let mut mock = MockKuboBackend::new();
        mock.expect_logout().times(1).returning(|| {
            Err(KuboError::Api {
                status: 500,
                message: "boom".into(),
            })
        });

        let store = signed_in(mock);
        store.update(|s| {
            s.pods.push(pod(1, "Alpha"));
            s.chat_messages.push(ChatMessage::user("hi"));
        });
        store.set_booking_draft(1, DraftPatch::start("2026-10-20T08:00"));

        store.logout().await;

        let state = store.snapshot();
        assert!(state.user.is_none());
        assert!(state.pods.is_empty());
        assert!(state.booking_drafts.is_empty());
        assert!(state.bookings.is_empty());
        assert!(state.chat_messages.is_empty());
    }

    #[tokio::test]
    async fn test_probe_for_signed_in_user_keeps_in_flight_work() {
        let mut mock = MockKuboBackend::new();
        mock.expect_current_user().times(1).returning(|| Ok(user()));
        mock.expect_list_pods().returning(|| Ok(Vec::new()));
        mock.expect_chat_history().returning(|| Ok(Vec::new()));
        let store = signed_in(mock);
        let epoch = store.read(|s| s.epoch);

        assert_eq!(store.fetch_current_user().await, Some(user()));
        assert!(store.is_current(epoch));
    }
}
