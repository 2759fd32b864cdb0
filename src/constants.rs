//! Global constants for the box editor

/// Minimum box width/height as a fraction of the image size.
pub const MIN_BOX_SIZE: f32 = 0.01;

/// Size of resize handles in viewport pixels (also the hit-test margin).
pub const HANDLE_SIZE: f32 = 10.0;

/// Freehand box draws spanning fewer pixels than this are treated as clicks.
pub const MIN_DRAW_PX: f32 = 5.0;

/// Mask draws spanning fewer pixels than this are treated as clicks.
pub const MIN_MASK_PX: f32 = 10.0;

/// Number of snapshots kept on each of the undo and redo stacks.
pub const HISTORY_CAPACITY: usize = 50;

/// Multiplicative zoom change per wheel notch.
pub const ZOOM_STEP: f32 = 1.15;

/// Lower zoom bound.
pub const MIN_ZOOM: f32 = 0.5;

/// Upper zoom bound.
pub const MAX_ZOOM: f32 = 5.0;

/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

/// Confidence assigned to boxes that carry none (hand-drawn or loaded from disk).
pub const DEFAULT_BOX_CONFIDENCE: f32 = 1.0;

/// Image extensions picked up when opening a folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Gray value used to redact masked regions.
pub const REDACTION_GRAY: u8 = 128;
