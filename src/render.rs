//! Rendering and layout interfaces.
//!
//! Painting happens outside this crate. The editor describes what to draw in a
//! [`RenderFrame`] and hands it to a [`Renderer`] after every state change.

use crate::annotation::AnnotationStore;
use crate::geometry::{ImageSize, PixelRect};
use crate::mask::MaskStore;
use crate::viewport::{DisplayTransform, Viewport, ViewportSize};

/// In-progress shape shown while the pointer is held down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    /// Freehand box being drawn.
    Box(PixelRect),
    /// Mask rectangle being drawn.
    Mask(PixelRect),
}

/// Everything a renderer needs to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub annotations: &'a AnnotationStore,
    pub masks: &'a MaskStore,
    pub viewport: &'a Viewport,
    pub preview: Option<Preview>,
}

/// Receives a frame after each change. Delivery is one-way.
pub trait Renderer {
    fn present(&mut self, frame: &RenderFrame<'_>);
}

/// Renderer that discards frames, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _frame: &RenderFrame<'_>) {}
}

/// Source of the currently displayed image's size and placement.
pub trait ImageSource {
    /// Pixel size of the loaded image.
    fn dimensions(&self) -> ImageSize;

    /// Fit-to-viewport scale and letterbox offsets.
    fn display_scale(&self, viewport: ViewportSize) -> DisplayTransform {
        DisplayTransform::fit(self.dimensions(), viewport)
    }
}

impl ImageSource for ImageSize {
    fn dimensions(&self) -> ImageSize {
        *self
    }
}
