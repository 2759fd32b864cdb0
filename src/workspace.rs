//! Editing session over an image folder.
//!
//! [`Workspace`] drives the [`InteractionController`] across the images of a
//! [`ProjectState`]: it loads boxes from disk or from the detector, writes
//! them back, burns masks into images, and carries out navigation actions.

use std::path::Path;

use crate::annotation::{AnnotationStore, BoundingBox, ListEntry};
use crate::config::EditorConfig;
use crate::detector::{InferenceProvider, detect_boxes};
use crate::format::{annotations, classes};
use crate::geometry::ImageSize;
use crate::interaction::{InputEvent, InteractionController};
use crate::keybindings::EditorAction;
use crate::model::ClassNames;
use crate::project::{ProjectError, ProjectState, annotation_path};
use crate::redact::redact_file;
use crate::render::{ImageSource, Renderer};
use crate::viewport::{DisplayTransform, ViewportSize};

/// An opened image folder with its editor.
pub struct Workspace {
    project: ProjectState,
    config: EditorConfig,
    class_names: ClassNames,
    provider: Box<dyn InferenceProvider>,
    controller: InteractionController,
    viewport_size: ViewportSize,
    image_size: ImageSize,
    /// Unfiltered detections for the current image, kept for re-filtering
    raw_detections: Vec<BoundingBox>,
    /// False after a failed load; the session then belongs to no image
    loaded: bool,
}

/// An image read from disk, not yet shown in the editor.
struct LoadedImage {
    size: ImageSize,
    boxes: Vec<BoundingBox>,
    raw_detections: Vec<BoundingBox>,
}

impl Workspace {
    /// Open `folder` at its first unannotated image (or the first image).
    pub fn open(
        folder: impl AsRef<Path>,
        config: EditorConfig,
        provider: Box<dyn InferenceProvider>,
    ) -> Result<Self, ProjectError> {
        let mut project = ProjectState::from_folder(folder.as_ref())?;
        project.set_index(project.first_unannotated().unwrap_or(0));

        let class_names = provider.class_names();
        let controller = InteractionController::new(&config);
        let mut workspace = Self {
            project,
            config,
            class_names,
            provider,
            controller,
            viewport_size: ViewportSize::default(),
            image_size: ImageSize::default(),
            raw_detections: Vec::new(),
            loaded: false,
        };
        workspace.load_current()?;
        Ok(workspace)
    }

    pub fn project(&self) -> &ProjectState {
        &self.project
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    pub fn raw_detections(&self) -> &[BoundingBox] {
        &self.raw_detections
    }

    // ========================================================================
    // Class Names
    // ========================================================================

    pub fn load_class_names(&mut self, path: &Path) -> Result<(), ProjectError> {
        self.class_names = classes::load(path)?;
        Ok(())
    }

    pub fn save_class_names(&self, path: &Path) -> Result<(), ProjectError> {
        classes::save(path, &self.class_names)?;
        Ok(())
    }

    /// Register a new class and return its id, or `None` when ids are exhausted.
    pub fn add_class(&mut self, name: impl Into<String>) -> Option<u32> {
        self.class_names.add(name)
    }

    /// Class names of the current boxes read left to right.
    pub fn plate_reading(&self) -> String {
        self.controller.annotations().plate_reading(&self.class_names)
    }

    pub fn list_entries(&self) -> Vec<ListEntry> {
        self.controller.annotations().list_entries(&self.class_names)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Update the view size and refit the current image.
    pub fn set_viewport_size(&mut self, size: ViewportSize) {
        self.viewport_size = size;
        self.controller
            .set_display(self.image_size.display_scale(size));
    }

    /// Read an image's size and boxes, from its annotation file if present,
    /// otherwise from the detector. Leaves the session untouched.
    fn read_image(&self, path: &Path) -> Result<LoadedImage, ProjectError> {
        let (width, height) = image::image_dimensions(path)?;
        let txt_path = annotation_path(path);
        let (boxes, raw_detections) = if txt_path.exists() {
            (annotations::load(&txt_path)?, Vec::new())
        } else {
            let threshold = self.config.confidence_threshold;
            let raw = detect_boxes(self.provider.as_ref(), path, threshold);
            (AnnotationStore::filter_by_confidence(&raw, threshold), raw)
        };
        Ok(LoadedImage {
            size: ImageSize::new(width, height),
            boxes,
            raw_detections,
        })
    }

    fn begin(&mut self, loaded: LoadedImage) {
        log::info!(
            "🖼️ Loaded {} ({}x{}): {} boxes",
            self.project.current_name(),
            loaded.size.width,
            loaded.size.height,
            loaded.boxes.len()
        );
        self.image_size = loaded.size;
        self.raw_detections = loaded.raw_detections;
        let display = self.image_size.display_scale(self.viewport_size);
        self.controller.begin_image(self.image_size, display, loaded.boxes);
        self.loaded = true;
    }

    /// Empty session that refuses to save.
    fn begin_unloaded(&mut self) {
        self.image_size = ImageSize::default();
        self.raw_detections.clear();
        self.controller
            .begin_image(self.image_size, DisplayTransform::default(), Vec::new());
        self.loaded = false;
    }

    /// Load the current image into the editor.
    ///
    /// On failure the editor is left empty and [`Workspace::save`] refuses
    /// to write until another image loads.
    pub fn load_current(&mut self) -> Result<(), ProjectError> {
        let Some(path) = self.project.current_image().map(Path::to_path_buf) else {
            self.begin_unloaded();
            return Ok(());
        };
        match self.read_image(&path) {
            Ok(loaded) => {
                self.begin(loaded);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {:?}: {}", path, e);
                self.begin_unloaded();
                Err(e)
            }
        }
    }

    /// Switch to `index` only once its image has loaded. Returns false when
    /// `index` is out of range.
    fn goto_index(&mut self, index: usize) -> Result<bool, ProjectError> {
        let Some(path) = self.project.images().get(index).cloned() else {
            return Ok(false);
        };
        let loaded = self.read_image(&path)?;
        self.project.set_index(index);
        self.begin(loaded);
        Ok(true)
    }

    /// Whether the current image loaded and may be saved.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Change the detection threshold and re-filter fresh detections.
    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        let threshold = threshold.clamp(0.0, 1.0);
        self.config.confidence_threshold = threshold;
        if !self.raw_detections.is_empty() {
            self.controller
                .apply_confidence_filter(&self.raw_detections, threshold);
        }
    }

    // ========================================================================
    // Saving and Navigation
    // ========================================================================

    /// Write the current boxes and burn in any masks.
    ///
    /// Mask redaction rewrites the image file and cannot be undone.
    pub fn save(&mut self, go_next: bool) -> Result<(), ProjectError> {
        let Some(path) = self.project.current_image().map(Path::to_path_buf) else {
            return Ok(());
        };
        if !self.loaded {
            return Err(ProjectError::NotLoaded { path });
        }

        annotations::save(&annotation_path(&path), self.controller.annotations().boxes())?;

        let masks = self.controller.masks().masks().to_vec();
        if !masks.is_empty() {
            redact_file(&path, &masks)?;
            self.controller.clear_masks();
        }

        if go_next {
            self.goto_index(self.project.current_index() + 1)?;
        }
        Ok(())
    }

    /// Save, then advance.
    pub fn next_image(&mut self) -> Result<(), ProjectError> {
        self.save(true)
    }

    pub fn prev_image(&mut self) -> Result<bool, ProjectError> {
        match self.project.current_index().checked_sub(1) {
            Some(index) => self.goto_index(index),
            None => Ok(false),
        }
    }

    /// Advance without saving.
    pub fn skip_image(&mut self) -> Result<bool, ProjectError> {
        self.goto_index(self.project.current_index() + 1)
    }

    /// Jump to the next image without an annotation file. Returns false when
    /// every image is annotated.
    pub fn goto_next_unannotated(&mut self) -> Result<bool, ProjectError> {
        let Some(index) = self.project.next_unannotated(self.project.current_index()) else {
            log::info!("All images are annotated");
            return Ok(false);
        };
        self.goto_index(index)
    }

    /// Delete the current image and its annotation file from disk.
    pub fn delete_current_image(&mut self) -> Result<(), ProjectError> {
        let Some(path) = self.project.current_image().map(Path::to_path_buf) else {
            return Ok(());
        };

        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let txt_path = annotation_path(&path);
        if txt_path.exists() {
            std::fs::remove_file(&txt_path)?;
        }
        self.project.remove_current();
        log::info!("🗑️ Deleted {:?} ({} images left)", path, self.project.len());

        self.load_current()
    }

    /// Carry out a host-level action; anything else goes to the controller.
    ///
    /// Returns true when the editor changed and a new frame is due. Save
    /// advances to the next image, like next-image.
    pub fn handle_action(&mut self, action: EditorAction) -> Result<bool, ProjectError> {
        match action {
            EditorAction::Save | EditorAction::NextImage => self.next_image().map(|_| true),
            EditorAction::PrevImage => self.prev_image(),
            EditorAction::SkipImage => self.skip_image(),
            EditorAction::NextUnannotated => self.goto_next_unannotated(),
            EditorAction::DeleteImage => self.delete_current_image().map(|_| true),
            other => {
                let outcome = self.controller.apply_action(other);
                log::debug!("{:?}: changed={}", other, outcome.changed);
                Ok(outcome.changed)
            }
        }
    }

    /// Feed an input event through the editor, handling any resulting
    /// host action and presenting a frame after it.
    pub fn process(
        &mut self,
        event: InputEvent,
        renderer: &mut dyn Renderer,
    ) -> Result<(), ProjectError> {
        if let Some(action) = self.controller.process(event, renderer) {
            if self.handle_action(action)? {
                renderer.present(&self.controller.frame());
            }
        }
        Ok(())
    }
}
