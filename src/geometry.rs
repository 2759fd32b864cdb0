//! Coordinate spaces and box geometry.
//!
//! Four coordinate spaces are involved while editing:
//! - [`ScreenPoint`]: pointer position in viewport pixels (widget top-left origin)
//! - [`PixelPoint`] / [`PixelRect`]: pixels relative to the top-left corner of the
//!   displayed (scaled and zoomed) image
//! - [`ImagePoint`]: pixels of the original image
//! - [`NormRect`] / [`Edges`]: normalized `[0, 1]` coordinates relative to the image size
//!
//! Each space has its own type so a value from one can't be passed where
//! another is expected. The functions in this module are pure.

use serde::{Deserialize, Serialize};

use crate::constants::MIN_BOX_SIZE;

// ============================================================================
// Coordinate Types
// ============================================================================

/// A pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset from `origin` to this point.
    pub fn delta_from(&self, origin: ScreenPoint) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// A position relative to the displayed image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position in original image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImagePoint {
    pub x: f32,
    pub y: f32,
}

impl ImagePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is unknown.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Effective display scale: fit-to-viewport scale multiplied by the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn uniform(s: f32) -> Self {
        Self { x: s, y: s }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// A rectangle in displayed-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, p: PixelPoint) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// A normalized rectangle in center/size form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormRect {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormRect {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// The four edges of this rectangle.
    pub fn edges(&self) -> Edges {
        Edges {
            left: self.center_x - self.width / 2.0,
            right: self.center_x + self.width / 2.0,
            top: self.center_y - self.height / 2.0,
            bottom: self.center_y + self.height / 2.0,
        }
    }
}

/// Normalized edge coordinates of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Edges {
    /// Clamp all four edges to the image bounds `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(0.0, 1.0),
            right: self.right.clamp(0.0, 1.0),
            top: self.top.clamp(0.0, 1.0),
            bottom: self.bottom.clamp(0.0, 1.0),
        }
    }

    /// Convert back to center/size form.
    pub fn to_rect(self) -> NormRect {
        NormRect {
            center_x: (self.left + self.right) / 2.0,
            center_y: (self.top + self.bottom) / 2.0,
            width: self.right - self.left,
            height: self.bottom - self.top,
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// A draggable hotspot on the selected box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// Box interior; drags translate the whole box.
    Move,
}

impl Handle {
    /// Corner handles, in hit-test priority order.
    pub const CORNERS: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    /// Edge handles, in hit-test priority order.
    pub const EDGES: [Handle; 4] = [Handle::Top, Handle::Bottom, Handle::Left, Handle::Right];

    pub fn is_corner(&self) -> bool {
        Self::CORNERS.contains(self)
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Project a normalized rectangle onto displayed-image pixels.
///
/// Returns `None` while the image size is unknown. `scale` is the effective
/// scale (display fit times zoom), so this function knows nothing about zoom.
pub fn to_pixel_rect(rect: &NormRect, image: ImageSize, scale: Scale) -> Option<PixelRect> {
    if image.is_empty() {
        return None;
    }

    let img_w = image.width as f32;
    let img_h = image.height as f32;

    let w_px = rect.width * img_w * scale.x;
    let h_px = rect.height * img_h * scale.y;
    let x_px = rect.center_x * img_w * scale.x - w_px / 2.0;
    let y_px = rect.center_y * img_h * scale.y - h_px / 2.0;

    Some(PixelRect::new(x_px, y_px, w_px, h_px))
}

/// Find which handle of `rect` lies under `point`.
///
/// Corners are tested first, then edges, then the interior, so a point near
/// both a corner and an edge resolves to the corner.
pub fn hit_test(point: PixelPoint, rect: &PixelRect, handle_size: f32) -> Option<Handle> {
    let near = |a: f32, b: f32| (a - b).abs() <= handle_size;
    let (x, y) = (point.x, point.y);
    let within_x = x >= rect.left() && x <= rect.right();
    let within_y = y >= rect.top() && y <= rect.bottom();

    let hit = |handle: Handle| match handle {
        Handle::TopLeft => near(x, rect.left()) && near(y, rect.top()),
        Handle::TopRight => near(x, rect.right()) && near(y, rect.top()),
        Handle::BottomLeft => near(x, rect.left()) && near(y, rect.bottom()),
        Handle::BottomRight => near(x, rect.right()) && near(y, rect.bottom()),
        Handle::Top => within_x && near(y, rect.top()),
        Handle::Bottom => within_x && near(y, rect.bottom()),
        Handle::Left => within_y && near(x, rect.left()),
        Handle::Right => within_y && near(x, rect.right()),
        Handle::Move => rect.contains(point),
    };

    Handle::CORNERS
        .into_iter()
        .chain(Handle::EDGES)
        .chain([Handle::Move])
        .find(|h| hit(*h))
}

/// Compute new edges for a handle drag.
///
/// `dx`/`dy` is the total pointer delta since the drag started, already in
/// normalized units. Moved edges can't cross their fixed counterpart closer
/// than [`MIN_BOX_SIZE`]; the result is then clamped to `[0, 1]`.
pub fn apply_drag(handle: Handle, original: Edges, dx: f32, dy: f32) -> Edges {
    let Edges {
        left,
        right,
        top,
        bottom,
    } = original;

    let drag_left = || (left + dx).min(right - MIN_BOX_SIZE);
    let drag_right = || (right + dx).max(left + MIN_BOX_SIZE);
    let drag_top = || (top + dy).min(bottom - MIN_BOX_SIZE);
    let drag_bottom = || (bottom + dy).max(top + MIN_BOX_SIZE);

    let moved = match handle {
        Handle::Move => {
            // Shift rather than squash when pushed against the image border
            let dx = dx.clamp(-left.max(0.0), (1.0 - right).max(0.0));
            let dy = dy.clamp(-top.max(0.0), (1.0 - bottom).max(0.0));
            Edges {
                left: left + dx,
                right: right + dx,
                top: top + dy,
                bottom: bottom + dy,
            }
        }
        Handle::TopLeft => Edges {
            left: drag_left(),
            top: drag_top(),
            ..original
        },
        Handle::TopRight => Edges {
            right: drag_right(),
            top: drag_top(),
            ..original
        },
        Handle::BottomLeft => Edges {
            left: drag_left(),
            bottom: drag_bottom(),
            ..original
        },
        Handle::BottomRight => Edges {
            right: drag_right(),
            bottom: drag_bottom(),
            ..original
        },
        Handle::Top => Edges {
            top: drag_top(),
            ..original
        },
        Handle::Bottom => Edges {
            bottom: drag_bottom(),
            ..original
        },
        Handle::Left => Edges {
            left: drag_left(),
            ..original
        },
        Handle::Right => Edges {
            right: drag_right(),
            ..original
        },
    };

    moved.clamped()
}

/// Build a normalized rectangle from two image-pixel corners.
///
/// Callers must pass `p1` as the min corner and `p2` as the max corner.
/// Size is clamped to `[MIN_BOX_SIZE, 1]` and the center to `[0, 1]`.
pub fn normalize_from_corners(p1: ImagePoint, p2: ImagePoint, image: ImageSize) -> NormRect {
    let img_w = image.width.max(1) as f32;
    let img_h = image.height.max(1) as f32;

    let width = ((p2.x - p1.x) / img_w).clamp(MIN_BOX_SIZE, 1.0);
    let height = ((p2.y - p1.y) / img_h).clamp(MIN_BOX_SIZE, 1.0);
    let center_x = ((p1.x + (p2.x - p1.x) / 2.0) / img_w).clamp(0.0, 1.0);
    let center_y = ((p1.y + (p2.y - p1.y) / 2.0) / img_h).clamp(0.0, 1.0);

    NormRect::new(center_x, center_y, width, height)
}
