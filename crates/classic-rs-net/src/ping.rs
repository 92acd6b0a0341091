//! Round-trip tracking for TwoWayPing probes.

use std::time::Instant;

use crate::constants::PING_SLOTS;

#[derive(Debug, Clone, Copy, Default)]
struct PingEntry {
    sent: Option<Instant>,
    received: Option<Instant>,
    data: u16,
}

/// The last [`PING_SLOTS`] probes sent to the server.
///
/// Slots fill front to back. Once full, the oldest probe is dropped and the
/// rest shift down so the newest always sits in the last slot.
#[derive(Debug, Clone, Default)]
pub struct PingList {
    entries: [PingEntry; PING_SLOTS],
}

impl PingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot for a probe sent at `now` and return its tag.
    pub fn next_ping_data(&mut self, now: Instant) -> u16 {
        if let Some(i) = self.entries.iter().position(|e| e.sent.is_none()) {
            let prev = if i == 0 { 0 } else { self.entries[i - 1].data };
            return self.set(i, prev.wrapping_add(1), now);
        }

        self.entries.rotate_left(1);
        let last = PING_SLOTS - 1;
        // after the rotation the previous newest probe sits one slot down
        let prev = self.entries[last - 1].data;
        self.set(last, prev.wrapping_add(1), now)
    }

    fn set(&mut self, i: usize, data: u16, now: Instant) -> u16 {
        self.entries[i] = PingEntry {
            sent: Some(now),
            received: None,
            data,
        };
        data
    }

    /// Record the server's echo of `data`. Unknown tags are ignored.
    pub fn update(&mut self, data: u16, now: Instant) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.sent.is_some() && e.data == data)
        {
            entry.received = Some(now);
        }
    }

    /// Mean one-way latency in milliseconds over answered probes, or 0.
    pub fn average_ms(&self) -> u32 {
        let (total, count) = self
            .entries
            .iter()
            .filter_map(|e| match (e.sent, e.received) {
                (Some(sent), Some(recv)) => Some(recv.saturating_duration_since(sent)),
                _ => None,
            })
            .fold((0.0f64, 0u32), |(sum, n), rtt| {
                (sum + rtt.as_secs_f64() * 1000.0 * 0.5, n + 1)
            });

        if count == 0 {
            0
        } else {
            (total / count as f64) as u32
        }
    }

    /// Tags of the tracked probes, oldest first.
    pub fn tracked(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries
            .iter()
            .filter(|e| e.sent.is_some())
            .map(|e| e.data)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
