//! Push delta admission.
//!
//! Push frames carry no ordering information, so the engine applies them in
//! delivery order: whichever frame for an event is delivered last wins, even
//! if it was generated first. A stale delta delivered after a fresher snapshot
//! will overwrite the fresher count. That bound is accepted; it is not
//! reordered away without extra wire information.
//!
//! [`DeliveryPolicy`] is where that information plugs in once the transport
//! provides it. [`LastDeliveredWins`] is the default and admits everything;
//! [`MonotonicSequence`] drops frames whose `seq` is not newer than the last
//! one admitted for the same event.

use std::collections::HashMap;

use rollcall_proto::EventId;

/// Decides whether a push delta may be written.
pub trait DeliveryPolicy {
    /// Whether to apply a delta for `event_id` carrying `seq`.
    ///
    /// Called once per delivered delta, in delivery order. Returning `true`
    /// commits the policy to having seen the frame.
    fn admit(&mut self, event_id: &EventId, seq: Option<u64>) -> bool;

    /// Forget all per-event history. Called when a full snapshot replaces
    /// the map.
    fn reset(&mut self) {}
}

/// Apply every delta in delivery order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastDeliveredWins;

impl DeliveryPolicy for LastDeliveredWins {
    fn admit(&mut self, _event_id: &EventId, _seq: Option<u64>) -> bool {
        true
    }
}

/// Drop deltas whose sequence number is not newer than the last admitted one
/// for that event. Deltas without a sequence number are always admitted.
#[derive(Debug, Clone, Default)]
pub struct MonotonicSequence {
    last_seen: HashMap<EventId, u64>,
}

impl MonotonicSequence {
    /// Policy with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest sequence number admitted for `event_id`.
    pub fn last_seen(&self, event_id: &EventId) -> Option<u64> {
        self.last_seen.get(event_id).copied()
    }
}

impl DeliveryPolicy for MonotonicSequence {
    fn admit(&mut self, event_id: &EventId, seq: Option<u64>) -> bool {
        let Some(seq) = seq else {
            return true;
        };

        match self.last_seen.get(event_id) {
            Some(&last) if last >= seq => false,
            _ => {
                self.last_seen.insert(event_id.clone(), seq);
                true
            },
        }
    }

    fn reset(&mut self) {
        self.last_seen.clear();
    }
}
