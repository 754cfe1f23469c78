// src/store/pods.rs - Pod inventory, booking drafts and booking submission

use std::sync::{Arc, PoisonError};

use super::{lock_state, AppStore, BookingDraft, DraftPatch, StatusKind, StatusMessage};
use crate::api::types::{Booking, BookingPayload, BookingStatus, Pod, PodId};
use crate::infra::errors::BookingError;

impl AppStore {
    /// Replace the pod list with the backend's. On failure the stale list
    /// stays and the error goes to the status line.
    pub async fn load_pods(&self) {
        let Some(epoch) = self.session_epoch() else {
            return;
        };

        match self.backend.list_pods().await {
            Ok(pods) => {
                tracing::debug!(count = pods.len(), "pods loaded");
                self.update(|s| {
                    if s.epoch != epoch {
                        return;
                    }
                    s.pods = pods;
                    if s.pods_status.as_ref().is_some_and(StatusMessage::is_error) {
                        s.pods_status = None;
                    }
                });
            }
            Err(e) => {
                let message = e.user_message("Unable to load pods");
                tracing::warn!("failed to load pods: {message}");
                if self.is_current(epoch) {
                    self.set_status(StatusMessage::error(message));
                }
            }
        }
    }

    /// Fetch a single pod and upsert it into the loaded inventory.
    pub async fn fetch_pod(&self, pod_id: PodId) -> Option<Pod> {
        let epoch = self.session_epoch()?;

        match self.backend.get_pod(pod_id).await {
            Ok(pod) => {
                self.update(|s| {
                    if s.epoch != epoch {
                        return;
                    }
                    match s.pods.iter_mut().find(|p| p.id == pod.id) {
                        Some(existing) => *existing = pod.clone(),
                        None => s.pods.push(pod.clone()),
                    }
                });
                Some(pod)
            }
            Err(e) => {
                tracing::warn!(pod_id, "failed to fetch pod: {e}");
                None
            }
        }
    }

    /// A pod from the loaded inventory.
    pub fn pod(&self, pod_id: PodId) -> Option<Pod> {
        self.read(|s| s.pods.iter().find(|p| p.id == pod_id).cloned())
    }

    /// Display name for a booking row, even when the pod is not loaded.
    pub fn pod_name_for(&self, pod_id: PodId) -> String {
        self.read(|s| {
            s.pods
                .iter()
                .find(|p| p.id == pod_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Pod #{pod_id}"))
        })
    }

    /// The draft for `pod_id`, created with the default window on first read.
    pub fn booking_draft(&self, pod_id: PodId) -> BookingDraft {
        let default = self.draft_window.default_draft();
        self.update(|s| s.booking_drafts.entry(pod_id).or_insert(default).clone())
    }

    /// Merge `patch` into the draft for `pod_id`. Local only.
    pub fn set_booking_draft(&self, pod_id: PodId, patch: DraftPatch) -> BookingDraft {
        let default = self.draft_window.default_draft();
        self.update(|s| {
            let merged = patch.merge(s.booking_drafts.get(&pod_id), &default);
            s.booking_drafts.insert(pod_id, merged.clone());
            merged
        })
    }

    /// Submit the draft for `pod` as a confirmed booking.
    ///
    /// Validation failures never reach the network. The draft is kept after
    /// success so the same window can be resubmitted.
    pub async fn book_pod(&self, pod: &Pod) -> Result<Option<Booking>, BookingError> {
        let (user, draft, epoch) =
            self.read(|s| (s.user.clone(), s.booking_drafts.get(&pod.id).cloned(), s.epoch));

        let Some(user) = user else {
            return Err(self.reject(BookingError::LoginRequired));
        };

        let draft = draft.unwrap_or_else(|| self.draft_window.default_draft());
        if !draft.is_complete() {
            return Err(self.reject(BookingError::MissingWindow));
        }

        let pod_id = pod.id;
        if !self.update(|s| s.booking_in_flight.insert(pod_id)) {
            tracing::debug!(pod_id, "booking already in flight");
            return Err(BookingError::InFlight);
        }
        let _in_flight = self.release_on_drop(move |s| {
            s.booking_in_flight.remove(&pod_id);
        });

        self.set_status(StatusMessage::pending("Booking pod..."));
        let payload = BookingPayload {
            user_id: user.id,
            pod_id,
            start_time: draft.start,
            end_time: draft.end,
            total_price_cents: pod.price_cents,
            status: BookingStatus::Confirmed,
        };

        match self.backend.create_booking(payload).await {
            Ok(created) => {
                tracing::info!(pod_id, "pod booked");
                if self.is_current(epoch) {
                    self.set_status(StatusMessage::success(format!(
                        "Pod \"{}\" booked successfully!",
                        pod.name
                    )));
                    self.schedule_status_clear(epoch);
                } else {
                    self.clear_stale_pending(pod_id);
                }
                Ok(created)
            }
            Err(e) => {
                let message = e.user_message("Booking failed");
                tracing::warn!(pod_id, "booking failed: {message}");
                if self.is_current(epoch) {
                    self.set_status(StatusMessage::error(message.clone()));
                } else {
                    self.clear_stale_pending(pod_id);
                }
                Err(BookingError::Backend(message))
            }
        }
    }

    /// A booking that outlived its session drops its pending line, unless
    /// another booking in flight now owns it.
    fn clear_stale_pending(&self, pod_id: PodId) {
        self.update(|s| {
            let only_ours = s.booking_in_flight.len() == 1 && s.booking_in_flight.contains(&pod_id);
            let pending = s
                .pods_status
                .as_ref()
                .is_some_and(|m| m.kind == StatusKind::Pending);
            if only_ours && pending {
                s.pods_status = None;
            }
        });
    }

    fn reject(&self, err: BookingError) -> BookingError {
        self.set_status(StatusMessage::from(&err));
        err
    }

    /// Replace the status line. Any pending auto-clear is cancelled.
    fn set_status(&self, status: StatusMessage) {
        self.cancel_status_timer();
        self.update(|s| s.pods_status = Some(status));
    }

    /// Clear the current success status after the configured delay, unless
    /// the session changes or another status replaces it first.
    fn schedule_status_clear(&self, epoch: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.status_clear_after;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut s = lock_state(&state);
            let is_success = s
                .pods_status
                .as_ref()
                .is_some_and(|m| m.kind == StatusKind::Success);
            if s.epoch == epoch && is_success {
                s.pods_status = None;
            }
        });

        let previous = self
            .status_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}
