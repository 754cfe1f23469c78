// src/store/draft.rs - Pending booking windows

use chrono::{DateTime, Duration, Utc};

use crate::infra::config::{BookingConfig, MAX_OFFSET_MINUTES};

/// Draft timestamps use the `datetime-local` shape: minutes precision, UTC.
pub const DRAFT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// An unsubmitted reservation window for one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub start: String,
    pub end: String,
}

impl BookingDraft {
    /// Both ends are filled in. Ordering and overlap are left to the backend.
    pub fn is_complete(&self) -> bool {
        !self.start.trim().is_empty() && !self.end.trim().is_empty()
    }
}

/// A partial edit: `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DraftPatch {
    pub fn start(value: impl Into<String>) -> Self {
        Self {
            start: Some(value.into()),
            end: None,
        }
    }

    pub fn end(value: impl Into<String>) -> Self {
        Self {
            start: None,
            end: Some(value.into()),
        }
    }

    pub fn window(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Apply on top of `existing`, falling back to `default` field by field.
    pub fn merge(self, existing: Option<&BookingDraft>, default: &BookingDraft) -> BookingDraft {
        BookingDraft {
            start: self
                .start
                .or_else(|| existing.map(|d| d.start.clone()))
                .unwrap_or_else(|| default.start.clone()),
            end: self
                .end
                .or_else(|| existing.map(|d| d.end.clone()))
                .unwrap_or_else(|| default.end.clone()),
        }
    }
}

/// Offsets used for a pod's first draft.
#[derive(Debug, Clone)]
pub struct DraftWindow {
    start_offset: Duration,
    end_offset: Duration,
}

impl Default for DraftWindow {
    fn default() -> Self {
        Self::from_config(&BookingConfig::default())
    }
}

impl DraftWindow {
    pub fn new(start_offset: Duration, end_offset: Duration) -> Self {
        Self {
            start_offset,
            end_offset,
        }
    }

    /// Offsets are clamped to `MAX_OFFSET_MINUTES` so unvalidated config
    /// can't overflow the window arithmetic.
    pub fn from_config(config: &BookingConfig) -> Self {
        let clamp = |m: i64| Duration::minutes(m.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES));
        Self::new(
            clamp(config.start_offset_minutes),
            clamp(config.end_offset_minutes),
        )
    }

    pub fn draft_at(&self, now: DateTime<Utc>) -> BookingDraft {
        BookingDraft {
            start: (now + self.start_offset)
                .format(DRAFT_TIME_FORMAT)
                .to_string(),
            end: (now + self.end_offset).format(DRAFT_TIME_FORMAT).to_string(),
        }
    }

    pub fn default_draft(&self) -> BookingDraft {
        self.draft_at(Utc::now())
    }
}
