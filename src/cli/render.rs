// src/cli/render.rs - Plain-text rendering of store state

use crate::api::types::{Booking, ChatMessage, Pod, Role};
use crate::store::{BookingDraft, StatusKind, StatusMessage};
use crate::util::{format_price_cents, format_timestamp, truncate_str};

pub fn pod_line(pod: &Pod) -> String {
    let availability = if pod.is_active { "available" } else { "unavailable" };
    format!(
        "  #{:<4} {:<24} {:>3} seats  {:>10}  {}",
        pod.id,
        truncate_str(&pod.name, 24),
        pod.capacity,
        format_price_cents(pod.price_cents),
        availability
    )
}

pub fn pod_detail(pod: &Pod, draft: &BookingDraft) -> String {
    let description = pod
        .description
        .as_deref()
        .unwrap_or("Reserve this immersive workspace pod");
    format!(
        "  {} (#{})\n  {}\n  Capacity: {} people | Price: {} | {}\n  Draft: {} -> {}",
        pod.name,
        pod.id,
        description,
        pod.capacity,
        format_price_cents(pod.price_cents),
        if pod.is_active { "Available" } else { "Unavailable" },
        draft.start,
        draft.end,
    )
}

pub fn booking_line(booking: &Booking, pod_name: &str) -> String {
    format!(
        "  #{:<4} {:<24} {} -> {}  {:>10}  [{}]",
        booking.id,
        truncate_str(pod_name, 24),
        format_timestamp(&booking.start_time),
        format_timestamp(&booking.end_time),
        format_price_cents(booking.total_price_cents),
        booking.status
    )
}

pub fn status_line(status: &StatusMessage) -> String {
    let tag = match status.kind {
        StatusKind::Pending => "..",
        StatusKind::Success => "ok",
        StatusKind::Error => "error",
    };
    format!("  [{tag}] {}", status.text)
}

pub fn message_line(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "concierge",
        Role::Tool => "tool",
    };
    format!("{who}: {}", message.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BookingStatus;

    fn pod() -> Pod {
        Pod {
            id: 7,
            name: "Quiet Nook".into(),
            description: None,
            capacity: 2,
            price_cents: 1250,
            is_active: false,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_pod_line() {
        let line = pod_line(&pod());
        assert!(line.contains("#7"));
        assert!(line.contains("Quiet Nook"));
        assert!(line.contains("$12.50"));
        assert!(line.contains("unavailable"));
    }

    #[test]
    fn test_pod_detail_uses_fallback_description() {
        let draft = BookingDraft {
            start: "2026-10-20T08:00".into(),
            end: "2026-10-20T09:00".into(),
        };
        let text = pod_detail(&pod(), &draft);
        assert!(text.contains("Reserve this immersive workspace pod"));
        assert!(text.contains("2026-10-20T08:00 -> 2026-10-20T09:00"));
    }

    #[test]
    fn test_booking_line() {
        let booking = Booking {
            id: 3,
            user_id: 1,
            pod_id: 7,
            start_time: "2026-10-20T08:00:00".into(),
            end_time: "2026-10-20T09:00:00".into(),
            status: BookingStatus::Pending,
            total_price_cents: 1250,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let line = booking_line(&booking, "Pod #7");
        assert!(line.contains("Oct 20, 2026, 08:00 AM"));
        assert!(line.contains("[pending]"));
    }

    #[test]
    fn test_status_tag_follows_kind() {
        assert_eq!(
            status_line(&StatusMessage::error("Pod already booked")),
            "  [error] Pod already booked"
        );
        assert_eq!(status_line(&StatusMessage::success("done")), "  [ok] done");
    }

    #[test]
    fn test_message_line() {
        assert_eq!(message_line(&ChatMessage::user("hi")), "you: hi");
    }
}
