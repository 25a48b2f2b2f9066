//! Offline mode.
//!
//! An in-process service seeded with a few accounts and events, so every
//! command can be tried without a running backend. Nothing persists between
//! invocations.

use chrono::NaiveDate;
use rollcall_client::MemoryBackend;
use rollcall_core::{Event, EventId};

/// Accounts every simulated service knows, as `(name, email, password)`.
pub const ACCOUNTS: [(&str, &str, &str); 2] = [
    ("Alice", "alice@example.com", "alice"),
    ("Bob", "bob@example.com", "bob"),
];

/// Service with [`ACCOUNTS`] registered and three upcoming events.
pub fn seeded_service() -> MemoryBackend {
    let service = MemoryBackend::new();
    for (name, email, password) in ACCOUNTS {
        service.add_account(name, email, password);
    }

    let seeds = [
        ("1", "Five-a-side futsal", (2024, 11, 5), "18:00", "Sports hall", "Sports", false, vec!["Bob"]),
        ("2", "Pottery for beginners", (2024, 11, 12), "10:30", "Studio B", "Arts", false, vec![]),
        ("3", "Members' quiz night", (2024, 11, 20), "19:30", "Clubhouse", "Social", true, vec!["Alice", "Bob"]),
    ];

    for (id, title, (y, m, d), time, location, category, restricted, attendees) in seeds {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            continue;
        };
        let event = Event {
            id: EventId::new(id),
            title: title.to_owned(),
            description: String::new(),
            date,
            time: time.to_owned(),
            location: location.to_owned(),
            category: category.to_owned(),
            creator_name: "Alice".to_owned(),
            image_url: None,
            is_for_logged_in_only: restricted,
        };
        service.insert_event(event, attendees);
    }

    service
}

#[cfg(test)]
mod tests {
    use rollcall_client::Backend;

    use super::*;

    #[tokio::test]
    async fn guests_see_only_public_seed_events() {
        let service = seeded_service();
        let viewer = service.connect_viewer();
        viewer.login(rollcall_core::GUEST_EMAIL, rollcall_core::GUEST_PASSWORD).await.unwrap();

        let events = viewer.list_events().await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(service.attendee_count(&EventId::new("3")), 2);
    }
}
