//! Occlusion masks.
//!
//! Masks are unclassified rectangles marking image regions to redact when
//! the annotations are saved. They are not covered by undo/redo.

use crate::geometry::NormRect;

/// A rectangular region to redact, in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask {
    pub rect: NormRect,
}

impl Mask {
    pub fn new(rect: NormRect) -> Self {
        Self { rect }
    }
}

/// Ordered mask collection for a single image, with its own selection.
#[derive(Debug, Clone, Default)]
pub struct MaskStore {
    masks: Vec<Mask>,
    selected: Option<usize>,
}

impl MaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.masks.clear();
        self.selected = None;
    }

    /// Append a mask and return its index.
    pub fn add(&mut self, mask: Mask) -> usize {
        self.masks.push(mask);
        self.masks.len() - 1
    }

    /// Delete the mask at `index`. Selection is reset on success.
    pub fn delete_at(&mut self, index: usize) -> bool {
        if index >= self.masks.len() {
            return false;
        }
        self.masks.remove(index);
        self.selected = None;
        true
    }

    /// Select a mask. Out-of-range indices deselect.
    pub fn select(&mut self, index: usize) {
        self.selected = (index < self.masks.len()).then_some(index);
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(cx: f32) -> Mask {
        Mask::new(NormRect::new(cx, 0.5, 0.1, 0.1))
    }

    #[test]
    fn test_mask_store_crud() {
        let mut store = MaskStore::new();
        assert_eq!(store.add(mask(0.2)), 0);
        assert_eq!(store.add(mask(0.4)), 1);

        store.select(1);
        assert_eq!(store.selected(), Some(1));
        assert!(store.delete_at(0));
        assert_eq!(store.selected(), None);
        assert_eq!(store.masks()[0], mask(0.4));

        assert!(!store.delete_at(3));
        store.select(9);
        assert_eq!(store.selected(), None);

        store.clear();
        assert!(store.is_empty());
    }
}
