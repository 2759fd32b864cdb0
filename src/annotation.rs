//! Annotation data model and management.
//!
//! This module provides the core types for box annotations:
//! - [`BoundingBox`]: a classified rectangle in normalized image coordinates
//! - [`AnnotationStore`]: the ordered box collection of one image plus its selection

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BOX_CONFIDENCE;
use crate::geometry::{Edges, NormRect};
use crate::model::ClassNames;

// ============================================================================
// Bounding Box
// ============================================================================

/// A classified, axis-aligned box in normalized image coordinates.
///
/// Boxes have no identity beyond their position in the owning store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Class index into the class-name table.
    pub class_id: u32,
    /// Normalized center and size.
    pub rect: NormRect,
    /// Detector confidence in `[0, 1]`; never persisted.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    DEFAULT_BOX_CONFIDENCE
}

impl BoundingBox {
    /// Create a box with full confidence.
    pub fn new(class_id: u32, center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            class_id,
            rect: NormRect::new(center_x, center_y, width, height),
            confidence: DEFAULT_BOX_CONFIDENCE,
        }
    }

    /// Create a box from an existing rectangle.
    pub fn from_rect(class_id: u32, rect: NormRect) -> Self {
        Self {
            class_id,
            rect,
            confidence: DEFAULT_BOX_CONFIDENCE,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn edges(&self) -> Edges {
        self.rect.edges()
    }

    /// Replace the geometry, keeping class and confidence.
    pub fn set_edges(&mut self, edges: Edges) {
        self.rect = edges.to_rect();
    }
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Ordered box collection for a single image.
///
/// Insertion order is the natural (storage) order; later boxes are drawn on
/// top. An x-ascending order is computed on demand and only replaces the
/// storage order through [`AnnotationStore::sort_by_x`].
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    boxes: Vec<BoundingBox>,
    selected: Option<usize>,
}

/// One row of the box list shown next to the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    /// Storage index of the box this row describes.
    pub index: usize,
    /// Display label, e.g. `"1. A  (0.93)"`.
    pub label: String,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all boxes.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.selected = None;
    }

    /// Replace all boxes. Selection is reset.
    pub fn set_all(&mut self, boxes: Vec<BoundingBox>) {
        self.boxes = boxes;
        self.selected = None;
    }

    /// Append a box and return its index.
    pub fn add(&mut self, bbox: BoundingBox) -> usize {
        self.boxes.push(bbox);
        self.boxes.len() - 1
    }

    /// Delete the box at `index`. Selection is reset on success.
    pub fn delete_at(&mut self, index: usize) -> bool {
        if index >= self.boxes.len() {
            return false;
        }
        self.boxes.remove(index);
        self.selected = None;
        true
    }

    /// Change the class of the box at `index`.
    pub fn set_class(&mut self, index: usize, class_id: u32) -> bool {
        match self.boxes.get_mut(index) {
            Some(b) => {
                b.class_id = class_id;
                true
            }
            None => false,
        }
    }

    /// Replace the geometry of the box at `index`.
    pub fn set_edges(&mut self, index: usize, edges: Edges) -> bool {
        match self.boxes.get_mut(index) {
            Some(b) => {
                b.set_edges(edges);
                true
            }
            None => false,
        }
    }

    /// Select a box. Out-of-range indices deselect.
    pub fn select(&mut self, index: usize) {
        self.selected = (index < self.boxes.len()).then_some(index);
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Get the selected box index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Get the selected box.
    pub fn selected_box(&self) -> Option<&BoundingBox> {
        self.selected.and_then(|i| self.boxes.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index)
    }

    /// All boxes in storage order.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Stable-sort storage by `center_x`. Selection is reset.
    pub fn sort_by_x(&mut self) {
        self.boxes.sort_by(cmp_center_x);
        self.selected = None;
    }

    /// Storage indices ordered by ascending `center_x`, without reordering storage.
    pub fn ordered_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.boxes.len()).collect();
        indices.sort_by(|&a, &b| cmp_center_x(&self.boxes[a], &self.boxes[b]));
        indices
    }

    /// Class names of all boxes read left to right, joined by single spaces.
    pub fn plate_reading(&self, class_names: &ClassNames) -> String {
        self.ordered_indices()
            .into_iter()
            .map(|i| class_names.name(self.boxes[i].class_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Copy every box whose confidence is at least `threshold`.
    ///
    /// Boxes without a detector score carry confidence 1.0 and always pass.
    pub fn filter_by_confidence(source: &[BoundingBox], threshold: f32) -> Vec<BoundingBox> {
        source
            .iter()
            .filter(|b| b.confidence >= threshold)
            .copied()
            .collect()
    }

    /// Display rows in left-to-right order.
    pub fn list_entries(&self, class_names: &ClassNames) -> Vec<ListEntry> {
        self.ordered_indices()
            .into_iter()
            .enumerate()
            .map(|(pos, index)| {
                let b = &self.boxes[index];
                ListEntry {
                    index,
                    label: format!(
                        "{}. {}  ({:.2})",
                        pos + 1,
                        class_names.name(b.class_id),
                        b.confidence
                    ),
                }
            })
            .collect()
    }
}

fn cmp_center_x(a: &BoundingBox, b: &BoundingBox) -> Ordering {
    a.rect.center_x.total_cmp(&b.rect.center_x)
}

// ============================================================================
// Tests
// ============================================================================
