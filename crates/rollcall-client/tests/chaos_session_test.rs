//! Sessions under injected faults
//!
//! Runs seeded operation sequences through a [`ChaoticBackend`] and checks
//! that whatever fails, the engine never holds an impossible state.

use chrono::NaiveDate;
use rollcall_client::{ChaoticBackend, ClientConfig, MemoryBackend, Operation, ViewingSession};
use rollcall_core::{Event, EventId, SyncError};

const SEEDS: u64 = 32;
const STEPS: usize = 40;

fn seeded_service() -> MemoryBackend {
    let service = MemoryBackend::new();
    service.add_account("Dana", "dana@example.com", "pw");
    for i in 1..=4 {
        let event = Event {
            id: EventId::new(i.to_string()),
            title: format!("Meetup {i}"),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, i).unwrap(),
            time: "19:00".into(),
            location: "Library".into(),
            category: "Books".into(),
            creator_name: "Dana".into(),
            image_url: None,
            is_for_logged_in_only: i == 4,
        };
        service.insert_event(event, (0..i).map(|n| format!("reader{n}")));
    }
    service
}

/// Next value of a small LCG, so every seed replays the same operations.
fn step(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    *state >> 33
}

#[tokio::test]
async fn faults_never_break_joined_count() {
    for seed in 0..SEEDS {
        let service = seeded_service();
        let backend = ChaoticBackend::with_seed(service.connect_viewer(), 0.3, seed);
        let mut session = ViewingSession::new(backend.clone(), &ClientConfig::default());
        let mut ops = seed;

        for _ in 0..STEPS {
            let target = EventId::new((step(&mut ops) % 5 + 1).to_string());
            let outcome = match step(&mut ops) % 6 {
                0 => session.activate().await,
                1 => session.reload().await,
                2 => session.join(&target).await.map(|_| ()),
                3 => session.open_event(&target).await.map(|_| ()),
                4 => session.login("dana@example.com", "pw").await.map(|_| ()),
                _ => session.logout().await,
            };
            if let Err(err) = outcome {
                assert!(
                    matches!(
                        err,
                        SyncError::Unreachable(_)
                            | SyncError::ApplicationRejected(_)
                            | SyncError::NotAuthenticated(_)
                            | SyncError::NotFound(_)
                    ),
                    "seed {seed}: unexpected {err:?}"
                );
            }

            for (event, state) in session.engine().events() {
                assert!(
                    !state.viewer_has_joined || state.attendee_count >= 1,
                    "seed {seed}: event {} joined with zero attendees",
                    event.id
                );
            }
        }

        // Every count the engine holds was, at some point, the service's own.
        for (event, state) in session.engine().events() {
            assert!(state.attendee_count <= service.attendee_count(&event.id).max(1));
        }
    }
}

#[tokio::test]
async fn failed_join_leaves_no_trace() {
    let service = seeded_service();
    let flaky = ChaoticBackend::with_seed(service.connect_viewer(), 1.0, 7)
        .only([Operation::Join]);
    let mut session = ViewingSession::new(flaky.clone(), &ClientConfig::default());
    session.login("dana@example.com", "pw").await.unwrap();
    session.activate().await.unwrap();
    let before: Vec<_> = session.engine().events().map(|(e, s)| (e.id.clone(), s)).collect();

    let result = session.join(&EventId::new("2")).await;

    assert!(matches!(result, Err(SyncError::Unreachable(_))));
    assert_eq!(flaky.injected_failures(), 1);
    let after: Vec<_> = session.engine().events().map(|(e, s)| (e.id.clone(), s)).collect();
    assert_eq!(before, after);
    assert_eq!(service.attendee_count(&EventId::new("2")), 2);
}
