//! Zoom and pan state of the image view.
//!
//! The displayed image is centered in the viewport; zoom scales it about that
//! center and pan shifts it. Positions are therefore expressed relative to the
//! unzoomed image center when zooming around a cursor.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::geometry::{ImagePoint, ImageSize, PixelPoint, Scale, ScreenPoint};

/// Zoom bounds and wheel step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub step: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: ZOOM_STEP,
            min: MIN_ZOOM,
            max: MAX_ZOOM,
        }
    }
}

/// Zoom level and pan offset for one open image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    limits: ZoomLimits,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl Viewport {
    /// Create an identity viewport (zoom=1, no pan).
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            limits,
        }
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Zoom in one step. See [`Viewport::zoom_to`].
    pub fn zoom_in(&mut self, anchor: Option<(f32, f32)>) -> bool {
        self.zoom_to(self.zoom * self.limits.step, anchor)
    }

    /// Zoom out one step. See [`Viewport::zoom_to`].
    pub fn zoom_out(&mut self, anchor: Option<(f32, f32)>) -> bool {
        self.zoom_to(self.zoom / self.limits.step, anchor)
    }

    /// Set the zoom level, clamped to the limits.
    ///
    /// `anchor` is a point relative to the unzoomed image center; when given,
    /// pan is adjusted so the image point under it stays fixed. Returns false
    /// (and changes nothing) when the clamp absorbs the whole change.
    pub fn zoom_to(&mut self, new_zoom: f32, anchor: Option<(f32, f32)>) -> bool {
        let new_zoom = new_zoom.clamp(self.limits.min, self.limits.max);
        if new_zoom == self.zoom {
            return false;
        }

        if let Some((ax, ay)) = anchor {
            // Image-space point under the anchor (before zoom)
            let img_x = (ax - self.pan_x) / self.zoom;
            let img_y = (ay - self.pan_y) / self.zoom;
            self.pan_x = ax - img_x * new_zoom;
            self.pan_y = ay - img_y * new_zoom;
        }

        log::trace!("Zoom {:.3} -> {:.3}", self.zoom, new_zoom);
        self.zoom = new_zoom;
        true
    }

    /// Apply a pan delta. Panning is unbounded.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set an absolute pan offset.
    pub fn set_pan(&mut self, pan_x: f32, pan_y: f32) {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
    }

    pub fn pan(&self) -> (f32, f32) {
        (self.pan_x, self.pan_y)
    }

    /// Restore zoom=1 and no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    pub fn is_identity(&self) -> bool {
        self.zoom == 1.0 && self.pan_x == 0.0 && self.pan_y == 0.0
    }
}

// ============================================================================
// Display Layout
// ============================================================================

/// Fit-to-viewport placement of the image at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl DisplayTransform {
    /// Aspect-preserving fit of `image` into `viewport`, centered (letterboxed).
    pub fn fit(image: ImageSize, viewport: ViewportSize) -> Self {
        if image.is_empty() || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Self::default();
        }
        let img_w = image.width as f32;
        let img_h = image.height as f32;
        let scale = (viewport.width / img_w).min(viewport.height / img_h);
        Self {
            scale_x: scale,
            scale_y: scale,
            offset_x: (viewport.width - img_w * scale) / 2.0,
            offset_y: (viewport.height - img_h * scale) / 2.0,
        }
    }
}

/// Everything needed to move between screen, displayed-pixel and image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub image: ImageSize,
    pub display: DisplayTransform,
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl ViewTransform {
    pub fn new(image: ImageSize, display: DisplayTransform, viewport: &Viewport) -> Self {
        Self {
            image,
            display,
            zoom: viewport.zoom,
            pan_x: viewport.pan_x,
            pan_y: viewport.pan_y,
        }
    }

    /// Display scale multiplied by zoom.
    pub fn effective_scale(&self) -> Scale {
        Scale::new(self.display.scale_x * self.zoom, self.display.scale_y * self.zoom)
    }

    /// Screen position of the image center at zoom 1 with no pan.
    pub fn image_center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.display.offset_x + self.image.width as f32 * self.display.scale_x / 2.0,
            self.display.offset_y + self.image.height as f32 * self.display.scale_y / 2.0,
        )
    }

    /// Screen position of the displayed image's top-left corner.
    pub fn origin(&self) -> ScreenPoint {
        let center = self.image_center();
        let scale = self.effective_scale();
        ScreenPoint::new(
            center.x - self.image.width as f32 * scale.x / 2.0 + self.pan_x,
            center.y - self.image.height as f32 * scale.y / 2.0 + self.pan_y,
        )
    }

    pub fn screen_to_pixel(&self, p: ScreenPoint) -> PixelPoint {
        let origin = self.origin();
        PixelPoint::new(p.x - origin.x, p.y - origin.y)
    }

    pub fn pixel_to_screen(&self, p: PixelPoint) -> ScreenPoint {
        let origin = self.origin();
        ScreenPoint::new(p.x + origin.x, p.y + origin.y)
    }

    pub fn pixel_to_image(&self, p: PixelPoint) -> ImagePoint {
        let scale = self.effective_scale();
        ImagePoint::new(p.x / scale.x, p.y / scale.y)
    }

    /// Convert a screen-space delta into normalized units.
    pub fn screen_delta_to_normalized(&self, dx: f32, dy: f32) -> (f32, f32) {
        if self.image.is_empty() {
            return (0.0, 0.0);
        }
        let scale = self.effective_scale();
        (
            dx / scale.x / self.image.width as f32,
            dy / scale.y / self.image.height as f32,
        )
    }

    /// Offset of `p` from the unzoomed image center, the anchor form used by zoom.
    pub fn zoom_anchor(&self, p: ScreenPoint) -> (f32, f32) {
        p.delta_from(self.image_center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_viewport() {
        let v = Viewport::default();
        assert_eq!(v.zoom, 1.0);
        assert_eq!(v.pan(), (0.0, 0.0));
        assert!(v.is_identity());
    }

    #[test]
    fn test_zoom_in_out_step() {
        let mut v = Viewport::default();
        assert!(v.zoom_in(None));
        assert!(approx_eq(v.zoom, 1.15));
        assert!(v.zoom_out(None));
        assert!(approx_eq(v.zoom, 1.0));
    }

    #[test]
    fn test_zoom_clamped_noop() {
        let mut v = Viewport::default();
        while v.zoom_in(None) {}
        assert_eq!(v.zoom, MAX_ZOOM);
        assert!(!v.zoom_in(None), "clamp absorbs the change");

        while v.zoom_out(None) {}
        assert_eq!(v.zoom, MIN_ZOOM);
        assert!(!v.zoom_out(None));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_point() {
        let mut v = Viewport::default();
        v.set_pan(50.0, 30.0);
        let anchor = (50.0, 20.0);
        let img_before = ((anchor.0 - v.pan_x) / v.zoom, (anchor.1 - v.pan_y) / v.zoom);

        v.zoom_to(2.0, Some(anchor));

        let img_after = ((anchor.0 - v.pan_x) / v.zoom, (anchor.1 - v.pan_y) / v.zoom);
        assert!(approx_eq(img_before.0, img_after.0));
        assert!(approx_eq(img_before.1, img_after.1));
    }

    #[test]
    fn test_pan_and_reset() {
        let mut v = Viewport::default();
        v.zoom_to(2.5, None);
        v.pan_by(5.0, -10.0);
        v.pan_by(1000.0, 0.0);
        assert_eq!(v.pan(), (1005.0, -10.0));
        assert_eq!(v.zoom, 2.5);

        v.reset();
        assert!(v.is_identity());
    }

    #[test]
    fn test_fit_letterbox() {
        let t = DisplayTransform::fit(ImageSize::new(200, 100), ViewportSize::new(400.0, 400.0));
        assert!(approx_eq(t.scale_x, 2.0));
        assert!(approx_eq(t.offset_x, 0.0));
        assert!(approx_eq(t.offset_y, 100.0));
    }

    #[test]
    fn test_view_transform_origin() {
        let image = ImageSize::new(200, 100);
        let display = DisplayTransform::fit(image, ViewportSize::new(400.0, 400.0));
        let mut viewport = Viewport::default();

        let t = ViewTransform::new(image, display, &viewport);
        let origin = t.origin();
        assert!(approx_eq(origin.x, 0.0));
        assert!(approx_eq(origin.y, 100.0));

        viewport.zoom_to(2.0, None);
        viewport.set_pan(10.0, 0.0);
        let t = ViewTransform::new(image, display, &viewport);
        // Image center stays at (200, 200); zoomed size is 800x400
        let origin = t.origin();
        assert!(approx_eq(origin.x, 200.0 - 400.0 + 10.0));
        assert!(approx_eq(origin.y, 200.0 - 200.0));

        let p = t.screen_to_pixel(ScreenPoint::new(0.0, 100.0));
        let back = t.pixel_to_screen(p);
        assert!(approx_eq(back.x, 0.0) && approx_eq(back.y, 100.0));
    }

    #[test]
    fn test_screen_delta_to_normalized() {
        let image = ImageSize::new(1000, 500);
        let t = ViewTransform::new(image, DisplayTransform::default(), &Viewport::default());
        let (dx, dy) = t.screen_delta_to_normalized(100.0, 50.0);
        assert!(approx_eq(dx, 0.1));
        assert!(approx_eq(dy, 0.1));
    }
}
