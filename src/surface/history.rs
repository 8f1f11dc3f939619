use crate::surface::frame::Frame;

/// Hard ceiling on retained frames.
pub const MAX_HISTORY: usize = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub retained_frames: usize,
    pub retained_bytes: usize,
    pub alloc_frames: u64,
    pub resets: u64,
}

/// Bounded ring of recent frames with buffer reuse.
///
/// Slots are allocated once per size; pushing into a full ring overwrites the oldest slot in
/// place. A size change drops the history (older frames are useless at a different size).
#[derive(Debug, Default)]
pub struct FrameHistory {
    capacity: usize,
    slots: Vec<Vec<u8>>,
    // Index of the next slot to write.
    head: usize,
    len: usize,
    size: (u32, u32),
    stats: HistoryStats,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, MAX_HISTORY),
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stats(&self) -> HistoryStats {
        self.stats.clone()
    }

    /// Change capacity; keeps the newest frames that still fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.clamp(1, MAX_HISTORY);
        if capacity == self.capacity {
            return;
        }
        let newest: Vec<Vec<u8>> = self
            .iter_newest_first()
            .take(capacity)
            .map(<[u8]>::to_vec)
            .collect();
        self.capacity = capacity;
        self.slots.clear();
        self.head = 0;
        self.len = 0;
        for buf in newest.into_iter().rev() {
            self.push_bytes(&buf);
        }
        self.refresh_stats();
    }

    pub fn push(&mut self, frame: &Frame) {
        if self.size != (frame.width, frame.height) {
            if self.len > 0 {
                self.stats.resets += 1;
            }
            self.slots.clear();
            self.head = 0;
            self.len = 0;
            self.size = (frame.width, frame.height);
        }
        self.push_bytes(&frame.data);
        self.refresh_stats();
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        if self.slots.len() < self.capacity {
            self.slots.push(bytes.to_vec());
            self.stats.alloc_frames += 1;
            self.head = self.slots.len() % self.capacity;
        } else {
            self.slots[self.head].copy_from_slice(bytes);
            self.head = (self.head + 1) % self.capacity;
        }
        self.len = (self.len + 1).min(self.capacity);
    }

    /// Frames from newest to oldest.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let n = self.slots.len();
        (0..self.len).map(move |k| {
            let idx = (self.head + n - 1 - k) % n;
            self.slots[idx].as_slice()
        })
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.refresh_stats();
    }

    /// Drop every buffer. Idempotent.
    pub fn release(&mut self) {
        self.slots = Vec::new();
        self.head = 0;
        self.len = 0;
        self.size = (0, 0);
        self.refresh_stats();
    }

    fn refresh_stats(&mut self) {
        self.stats.retained_frames = self.slots.len();
        self.stats.retained_bytes = self.slots.iter().map(Vec::len).sum();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/history.rs"]
mod tests;
