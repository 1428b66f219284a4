use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of miner output lines kept in memory.
pub const MAX_LOGS: usize = 250;

/// A single line of miner output and the moment it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub line: String,
}

/// Fixed-capacity circular buffer of log entries.
///
/// `cursor` is the slot the next write lands in, `count` saturates at the capacity.
/// Slots are filled in order until the buffer is full, after which the oldest entry
/// (the one under the cursor) is overwritten. Locking is left to the owner.
#[derive(Debug, Clone)]
pub struct LogRing {
    slots: Vec<LogEntry>,
    capacity: usize,
    cursor: usize,
    count: usize,
}

impl LogRing {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOGS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append an entry, overwriting the oldest one when full.
    pub fn record(&mut self, line: impl Into<String>, time: DateTime<Utc>) {
        let entry = LogEntry {
            time,
            line: line.into(),
        };
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
        } else {
            self.slots[self.cursor] = entry;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        }
    }

    /// The most recent `min(n, len)` entries, oldest first.
    pub fn snapshot(&self, n: usize) -> Vec<LogEntry> {
        let take = n.min(self.count);
        if take == 0 {
            return Vec::new();
        }

        // While filling, cursor == count, so this is `count - take`.
        // Once full, it walks back `take` slots from the cursor with wraparound.
        let start = (self.cursor + self.capacity - take) % self.capacity;
        (0..take)
            .map(|offset| self.slots[(start + offset) % self.capacity].clone())
            .collect()
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new()
    }
}
