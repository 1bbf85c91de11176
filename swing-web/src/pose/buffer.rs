//! Rolling pose buffer
//!
//! Keeps the most recent frames in chronological order (~10s at 30fps by
//! default) so a just-finished swing can be sliced back out of it.

use std::collections::VecDeque;

use super::frame::PoseFrame;

/// Default number of frames held
pub const DEFAULT_CAPACITY: usize = 300;

/// Bounded FIFO of pose frames, oldest evicted first
pub struct PoseBuffer {
    frames: VecDeque<PoseFrame>,
    capacity: usize,
}

impl PoseBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new frame, evicting the oldest when full
    pub fn push(&mut self, frame: PoseFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PoseFrame> {
        self.frames.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseFrame> {
        self.frames.iter()
    }

    /// Frames captured at or after `start`, oldest first
    pub fn since(&self, start: f64) -> Vec<PoseFrame> {
        self.frames
            .iter()
            .filter(|f| f.timestamp >= start)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
