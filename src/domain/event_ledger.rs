//! Record of processed webhook event ids
//!
//! The provider redelivers webhooks it considers unacknowledged, so every id
//! must be processed at most once. Ids are kept for a retention window that
//! covers the provider's redelivery period, and the ledger never grows past
//! its capacity; the oldest ids go first.

use crate::domain::shared::value_objects::EventId;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct EventLedger {
    capacity: usize,
    retention: Duration,
    seen: HashMap<EventId, DateTime<Utc>>,
    order: VecDeque<(EventId, DateTime<Utc>)>,
}

impl EventLedger {
    pub fn new(capacity: usize, retention: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            retention,
            seen: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Record `id` as processed now.
    ///
    /// Returns `false` if the id was already recorded within the retention window.
    pub fn record(&mut self, id: &EventId) -> bool {
        self.record_at(id, Utc::now())
    }

    pub fn record_at(&mut self, id: &EventId, now: DateTime<Utc>) -> bool {
        self.evict_expired(now);

        if self.seen.contains_key(id) {
            return false;
        }

        self.seen.insert(id.clone(), now);
        self.order.push_back((id.clone(), now));

        while self.order.len() > self.capacity {
            if let Some((oldest, _)) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        true
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.seen.contains_key(id)
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        while let Some((_, recorded_at)) = self.order.front() {
            if *recorded_at > cutoff {
                break;
            }
            if let Some((expired, _)) = self.order.pop_front() {
                self.seen.remove(&expired);
            }
        }
    }
}
