//! Snapshot-based linear undo.
//!
//! Entry 0 is the state right after initialization and is never evicted. Each completed gesture
//! pushes one full-bitmap snapshot and drops any entries after the pointer; there is no redo.

use std::sync::Arc;

use crate::foundation::core::Bitmap;

/// Default cap on retained snapshots, floor included.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// Linear history of full-bitmap snapshots.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    entries: Vec<Arc<Bitmap>>,
    pointer: usize,
    max_entries: usize,
}

impl HistoryStack {
    /// History whose floor is `initial`.
    ///
    /// `max_entries` below 2 is raised to 2 so at least one gesture stays undoable.
    pub fn new(initial: Bitmap, max_entries: usize) -> Self {
        Self {
            entries: vec![Arc::new(initial)],
            pointer: 0,
            max_entries: max_entries.max(2),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the floor entry exists from construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Snapshot at the pointer.
    pub fn current(&self) -> &Bitmap {
        &self.entries[self.pointer]
    }

    /// Snapshot at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Bitmap> {
        self.entries.get(index).map(|e| e.as_ref())
    }

    /// The undo floor.
    pub fn floor(&self) -> &Bitmap {
        &self.entries[0]
    }

    /// Whether `undo` would change anything.
    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    /// Append a snapshot after the pointer, discarding the redo tail, and move the pointer to it.
    ///
    /// When over capacity the oldest non-floor entry is evicted.
    pub fn push(&mut self, snapshot: Bitmap) {
        self.entries.truncate(self.pointer + 1);
        self.entries.push(Arc::new(snapshot));
        while self.entries.len() > self.max_entries {
            self.entries.remove(1);
        }
        self.pointer = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the restored snapshot, or `None` at the floor.
    pub fn undo(&mut self) -> Option<&Bitmap> {
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        Some(self.current())
    }

    /// Drop everything and start over from a new floor.
    pub fn reset(&mut self, initial: Bitmap) {
        self.entries.clear();
        self.entries.push(Arc::new(initial));
        self.pointer = 0;
    }
}

#[cfg(test)]
#[path = "../tests/unit/history.rs"]
mod tests;
