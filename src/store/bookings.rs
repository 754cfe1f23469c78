// src/store/bookings.rs - Booking history

use super::AppStore;

impl AppStore {
    /// Fetch the signed-in user's bookings. Failures degrade to an empty list.
    pub async fn load_my_bookings(&self) {
        let Some(epoch) = self.session_epoch() else {
            return;
        };

        self.update(|s| s.is_loading_bookings = true);
        let result = self.backend.my_bookings().await;

        self.update(|s| {
            s.is_loading_bookings = false;
            if s.epoch != epoch {
                return;
            }
            match result {
                Ok(bookings) => {
                    tracing::debug!(count = bookings.len(), "bookings loaded");
                    s.bookings = bookings;
                }
                Err(e) => {
                    tracing::warn!("failed to load bookings: {e}");
                    s.bookings.clear();
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::api::types::{Booking, BookingStatus};
    use crate::api::MockKuboBackend;
    use crate::infra::errors::KuboError;

    fn booking(id: i64) -> Booking {
        Booking {
            id,
            user_id: 1,
            pod_id: 1,
            start_time: "2026-10-20T08:00:00".into(),
            end_time: "2026-10-20T09:00:00".into(),
            status: BookingStatus::Confirmed,
            total_price_cents: 2500,
            created_at: "2026-10-18T08:00:00".into(),
            updated_at: "2026-10-18T08:00:00".into(),
        }
    }

    #[tokio::test]
    async fn test_noop_without_session() {
        let mut mock = MockKuboBackend::new();
        mock.expect_my_bookings().never();
        let store = store(mock);
        store.load_my_bookings().await;
        assert!(!store.snapshot().is_loading_bookings);
    }

    #[tokio::test]
    async fn test_loads_bookings() {
        let mut mock = MockKuboBackend::new();
        mock.expect_my_bookings()
            .times(1)
            .returning(|| Ok(vec![booking(1), booking(2)]));
        let store = signed_in(mock);

        store.load_my_bookings().await;

        let state = store.snapshot();
        assert_eq!(state.bookings.len(), 2);
        assert!(!state.is_loading_bookings);
    }

    #[tokio::test]
    async fn test_failure_resets_to_empty() {
        let mut mock = MockKuboBackend::new();
        mock.expect_my_bookings().returning(|| {
            Err(KuboError::Api {
                status: 500,
                message: "Request failed: 500".into(),
            })
        });
        let store = signed_in(mock);
        store.update(|s| s.bookings.push(booking(9)));

        store.load_my_bookings().await;

        let state = store.snapshot();
        assert!(state.bookings.is_empty());
        assert!(!state.is_loading_bookings);
        assert!(state.pods_status.is_none());
    }
}
