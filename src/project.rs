//! Image folder state.
//!
//! A project is a flat folder of images. Each image's boxes live next to it
//! in a `.txt` file with the same stem; an image counts as annotated once
//! that file exists, even if it is empty.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::IMAGE_EXTENSIONS;
use crate::format::FormatError;

/// Errors from opening, loading, or saving project files.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No image files found in {folder:?}")]
    NoImages { folder: PathBuf },

    #[error("{path:?} failed to load; refusing to save over it")]
    NotLoaded { path: PathBuf },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Check if a path has a supported image extension (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Annotation file belonging to `image`.
pub fn annotation_path(image: &Path) -> PathBuf {
    image.with_extension("txt")
}

/// State for an opened image folder.
#[derive(Clone, Debug)]
pub struct ProjectState {
    /// Path to the project folder
    pub folder: PathBuf,
    /// Image files in the folder, sorted by name
    images: Vec<PathBuf>,
    /// Current image index
    current_index: usize,
}

impl ProjectState {
    /// Discover image files in a folder, non-recursively.
    pub fn from_folder(folder: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let folder = folder.into();
        let mut images: Vec<PathBuf> = std::fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();

        if images.is_empty() {
            return Err(ProjectError::NoImages { folder });
        }

        // Sort by filename for consistent ordering
        images.sort();
        log::info!("📁 Opened {:?}: {} images", folder, images.len());

        Ok(Self {
            folder,
            images,
            current_index: 0,
        })
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get the current image path.
    pub fn current_image(&self) -> Option<&Path> {
        self.images.get(self.current_index).map(PathBuf::as_path)
    }

    /// Get the current image filename for display.
    pub fn current_name(&self) -> String {
        self.current_image()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| "No images".to_string())
    }

    pub fn is_annotated(&self, index: usize) -> bool {
        self.images
            .get(index)
            .is_some_and(|image| annotation_path(image).exists())
    }

    /// Number of images with an annotation file.
    pub fn annotated_count(&self) -> usize {
        (0..self.images.len())
            .filter(|&i| self.is_annotated(i))
            .count()
    }

    pub fn first_unannotated(&self) -> Option<usize> {
        (0..self.images.len()).find(|&i| !self.is_annotated(i))
    }

    /// First unannotated image after `from`, wrapping around (checking `from` last).
    pub fn next_unannotated(&self, from: usize) -> Option<usize> {
        let len = self.images.len();
        (1..=len)
            .map(|offset| (from + offset) % len)
            .find(|&i| !self.is_annotated(i))
    }

    /// Move to the next image. Returns false at the end of the list.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.images.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous image. Returns false at the start of the list.
    pub fn prev(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_index(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    /// Drop the current image from the list, keeping the index in bounds.
    pub fn remove_current(&mut self) -> Option<PathBuf> {
        if self.images.is_empty() {
            return None;
        }
        let removed = self.images.remove(self.current_index);
        if self.current_index >= self.images.len() {
            self.current_index = self.images.len().saturating_sub(1);
        }
        Some(removed)
    }

    /// Annotation progress like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.annotated_count(), self.images.len())
    }
}
