//! Undo/Redo history for box edits.
//!
//! History is snapshot based: before every user edit the full box list is
//! copied onto the undo stack. Snapshots are owned `Vec`s of `Copy` boxes,
//! so a stored snapshot can never alias the live list.

use std::collections::VecDeque;

use crate::annotation::BoundingBox;
use crate::constants::HISTORY_CAPACITY;

/// An immutable copy of an image's box list.
pub type Snapshot = Vec<BoundingBox>;

/// Configuration for the history stacks.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept on each stack
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
        }
    }
}

/// Bounded undo/redo stacks of box snapshots.
///
/// - `undo_stack`: states to return to (most recent at the back)
/// - `redo_stack`: states undone since the last edit (most recent at the back)
///
/// Both stacks evict their oldest entry when full. Recording a new snapshot
/// clears the redo stack. History never spans images: call
/// [`HistoryManager::clear`] whenever a new image is loaded.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    config: HistoryConfig,
}

impl HistoryManager {
    /// Create a new history with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state before an edit. Clears the redo stack.
    pub fn record_snapshot(&mut self, boxes: &[BoundingBox]) {
        push_bounded(&mut self.undo_stack, boxes.to_vec(), self.config.capacity);
        self.redo_stack.clear();
        log::debug!(
            "📝 History: recorded {} boxes ({} undo steps)",
            boxes.len(),
            self.undo_stack.len()
        );
    }

    /// Step back. `current` is saved for redo; returns the previous state.
    pub fn undo(&mut self, current: &[BoundingBox]) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current.to_vec(), self.config.capacity);
        log::debug!("⏪ Undo: restoring {} boxes", previous.len());
        Some(previous)
    }

    /// Step forward. `current` is saved for undo; returns the next state.
    pub fn redo(&mut self, current: &[BoundingBox]) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current.to_vec(), self.config.capacity);
        log::debug!("⏩ Redo: restoring {} boxes", next.len());
        Some(next)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ History cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    if capacity == 0 {
        return;
    }
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

// ============================================================================
// Tests
// ============================================================================
