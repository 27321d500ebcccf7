//! Linear undo/redo history over diagram snapshots.

use crate::diagram::DiagramSnapshot;
use std::collections::VecDeque;

/// Default number of snapshots kept, including the initial state.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Snapshot list with a cursor.
///
/// The entry under the cursor always mirrors the live diagram. Committing
/// after an undo discards everything past the cursor. When the list is full
/// the oldest snapshot is dropped.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<DiagramSnapshot>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: DiagramSnapshot, capacity: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new state, truncating any redo future.
    pub fn commit(&mut self, snapshot: DiagramSnapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&DiagramSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&DiagramSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    /// The snapshot under the cursor (the last committed state).
    pub fn current(&self) -> Option<&DiagramSnapshot> {
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
