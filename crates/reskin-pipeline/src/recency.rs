//! Bounded FIFO of recently chosen replacements.

use std::collections::VecDeque;

/// The most recent selections, oldest first.
///
/// Entries are category-qualified names (`"square/deadpool-1.jpg"`). The
/// window only biases selection: callers fall back to the full category
/// when every candidate is recent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyWindow {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RecencyWindow {
    pub const DEFAULT_CAPACITY: usize = 3;

    /// An empty window holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append `name`, evicting the oldest entry once over capacity.
    pub fn push(&mut self, name: String) {
        self.entries.push_back(name);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Whether `name` is in the window.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Current entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
