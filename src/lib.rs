//! bbox-editor - Bounding Box Annotation Editor
//!
//! The editing core of an interactive bounding-box annotator: normalized box
//! geometry, per-image box and mask stores, snapshot undo/redo, zoom and pan,
//! and the pointer/keyboard state machine that ties them together. Painting
//! and model inference are left to the host through the [`render::Renderer`]
//! and [`detector::InferenceProvider`] traits.

pub mod annotation;
pub mod config;
pub mod constants;
pub mod detector;
pub mod format;
pub mod geometry;
pub mod interaction;
pub mod keybindings;
pub mod mask;
pub mod model;
pub mod project;
pub mod redact;
pub mod render;
pub mod undo;
pub mod viewport;
pub mod workspace;

pub use annotation::{AnnotationStore, BoundingBox};
pub use config::EditorConfig;
pub use interaction::{InputEvent, InteractionController};
pub use project::{ProjectError, ProjectState};
pub use workspace::Workspace;
