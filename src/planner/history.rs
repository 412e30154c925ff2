//! Live-traffic history ring buffer.
//!
//! Keeps the last few live-traffic summaries of one session so reconciliation
//! can fall back to the previous observation when the newest one belongs to
//! a route that ended up as the sub-optimal pick.

use super::LiveTrafficSummary;
use std::collections::VecDeque;

/// Default number of summaries kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Fixed-capacity FIFO owned by a single session.
#[derive(Debug, Clone)]
pub struct LiveTrafficHistory {
    entries: VecDeque<LiveTrafficSummary>,
    capacity: usize,
}

impl LiveTrafficHistory {
    /// Creates an empty history; capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a summary, evicting the oldest if at capacity.
    pub fn push(&mut self, summary: LiveTrafficSummary) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(summary);
    }

    /// Drops every summary recorded for `route`.
    pub fn purge_route(&mut self, route: &str) {
        self.entries.retain(|entry| entry.route != route);
    }

    /// Second-to-last entry, or the only entry when there is just one.
    pub fn previous(&self) -> Option<&LiveTrafficSummary> {
        match self.entries.len() {
            0 => None,
            1 => self.entries.front(),
            n => self.entries.get(n - 2),
        }
    }

    pub fn latest(&self) -> Option<&LiveTrafficSummary> {
        self.entries.back()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LiveTrafficSummary> {
        self.entries.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<LiveTrafficSummary> for LiveTrafficHistory {
    /// Pushes in order, so only the newest `capacity` entries survive.
    fn extend<I: IntoIterator<Item = LiveTrafficSummary>>(&mut self, iter: I) {
        for summary in iter {
            self.push(summary);
        }
    }
}

impl Default for LiveTrafficHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
