//! Pointer and keyboard interaction.
//!
//! [`InteractionController`] owns the [`EditSession`] of the open image and
//! turns input events into edits:
//! - primary drag on the selected box's handles resizes or moves it
//! - primary drag in draw mode creates a box, in mask mode a mask
//! - primary click elsewhere selects the topmost box (or mask) under the pointer
//! - tertiary drag pans, the wheel zooms
//!
//! Every direct box edit records a history snapshot first. Events are handled
//! one at a time to completion.

use crate::annotation::{AnnotationStore, BoundingBox};
use crate::config::EditorConfig;
use crate::geometry::{
    Handle, ImageSize, NormRect, PixelRect, ScreenPoint, apply_drag, hit_test,
    normalize_from_corners, to_pixel_rect,
};
use crate::keybindings::{EditorAction, Key, KeyBindings, Modifiers};
use crate::mask::{Mask, MaskStore};
use crate::render::{Preview, RenderFrame, Renderer};
use crate::undo::{HistoryConfig, HistoryManager};
use crate::viewport::{DisplayTransform, ViewTransform, Viewport, ZoomLimits};

// ============================================================================
// Input Types
// ============================================================================

/// Pointer buttons, named by role rather than position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Usually the middle button.
    Tertiary,
}

/// Input events delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        button: PointerButton,
        position: ScreenPoint,
    },
    PointerMove {
        position: ScreenPoint,
    },
    PointerUp {
        button: PointerButton,
        position: ScreenPoint,
    },
    /// Wheel notches; positive zooms in.
    Wheel {
        delta: f32,
        position: ScreenPoint,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
    },
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// Something visible changed and a frame should be presented.
    pub changed: bool,
    /// An action the host must carry out (navigation, saving).
    pub host_action: Option<EditorAction>,
}

impl Outcome {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            host_action: None,
        }
    }

    fn host(action: EditorAction) -> Self {
        Self {
            changed: false,
            host_action: Some(action),
        }
    }
}

/// Pointer cursor a host should show at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    /// Top-left / bottom-right resize.
    ResizeDiagonal,
    /// Top-right / bottom-left resize.
    ResizeAntiDiagonal,
    ResizeVertical,
    ResizeHorizontal,
    Move,
    Grabbing,
}

impl From<Handle> for CursorHint {
    fn from(handle: Handle) -> Self {
        match handle {
            Handle::TopLeft | Handle::BottomRight => CursorHint::ResizeDiagonal,
            Handle::TopRight | Handle::BottomLeft => CursorHint::ResizeAntiDiagonal,
            Handle::Top | Handle::Bottom => CursorHint::ResizeVertical,
            Handle::Left | Handle::Right => CursorHint::ResizeHorizontal,
            Handle::Move => CursorHint::Move,
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// The single active pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Freehand box being drawn.
    Drawing {
        start: ScreenPoint,
        current: ScreenPoint,
    },
    /// Selected box being resized or moved.
    DraggingHandle {
        index: usize,
        handle: Handle,
        original: BoundingBox,
        anchor: ScreenPoint,
    },
    /// View being panned.
    Panning {
        anchor: ScreenPoint,
        original_pan: (f32, f32),
    },
    /// Mask rectangle being drawn.
    DrawingMask {
        start: ScreenPoint,
        current: ScreenPoint,
    },
}

/// Editing state of the open image.
///
/// Created fresh for every image; nothing here is shared across images.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    pub annotations: AnnotationStore,
    pub masks: MaskStore,
    pub history: HistoryManager,
    pub viewport: Viewport,
    pub image: ImageSize,
    pub display: DisplayTransform,
    pub draw_mode: bool,
    pub mask_mode: bool,
    /// Class assigned to newly drawn boxes.
    pub default_class: u32,
}

impl EditSession {
    /// Coordinate transform for the current layout and view.
    pub fn view(&self) -> ViewTransform {
        ViewTransform::new(self.image, self.display, &self.viewport)
    }

    /// Project a normalized rectangle into displayed-image pixels.
    pub fn pixel_rect(&self, rect: &NormRect) -> Option<PixelRect> {
        let view = self.view();
        to_pixel_rect(rect, view.image, view.effective_scale())
    }

    fn select_box(&mut self, index: usize) {
        self.annotations.select(index);
        self.masks.deselect();
    }

    fn select_mask(&mut self, index: usize) {
        self.masks.select(index);
        self.annotations.deselect();
    }

    fn deselect_all(&mut self) {
        self.annotations.deselect();
        self.masks.deselect();
    }
}

/// Tunables for pointer handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub handle_size: f32,
    pub min_draw_px: f32,
    pub min_mask_px: f32,
    pub history_capacity: usize,
    pub zoom: ZoomLimits,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ControllerSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            min_draw_px: config.min_draw_px,
            min_mask_px: config.min_mask_px,
            history_capacity: config.history_capacity,
            zoom: config.zoom_limits(),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Input-driven state machine over one [`EditSession`].
#[derive(Debug, Clone)]
pub struct InteractionController {
    session: EditSession,
    state: InteractionState,
    settings: ControllerSettings,
    keybindings: KeyBindings,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &EditorConfig) -> Self {
        let settings = ControllerSettings::from(config);
        let session = EditSession {
            history: HistoryManager::with_config(HistoryConfig {
                capacity: settings.history_capacity,
            }),
            viewport: Viewport::new(settings.zoom),
            default_class: config.default_class,
            ..Default::default()
        };
        Self {
            session,
            state: InteractionState::Idle,
            settings,
            keybindings: config.keybindings.clone(),
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.session.annotations
    }

    pub fn masks(&self) -> &MaskStore {
        &self.session.masks
    }

    pub fn history(&self) -> &HistoryManager {
        &self.session.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.session.viewport
    }

    pub fn draw_mode(&self) -> bool {
        self.session.draw_mode
    }

    pub fn mask_mode(&self) -> bool {
        self.session.mask_mode
    }

    pub fn set_default_class(&mut self, class_id: u32) {
        self.session.default_class = class_id;
    }

    /// Start editing a freshly loaded image.
    ///
    /// History, masks, selection, and view are reset; modes are kept.
    pub fn begin_image(
        &mut self,
        image: ImageSize,
        display: DisplayTransform,
        boxes: Vec<BoundingBox>,
    ) {
        self.session.history.clear();
        self.session.masks.clear();
        self.session.annotations.set_all(boxes);
        self.session.viewport.reset();
        self.session.image = image;
        self.session.display = display;
        self.state = InteractionState::Idle;
        log::debug!(
            "Editing {}x{} image with {} boxes",
            image.width,
            image.height,
            self.session.annotations.len()
        );
    }

    /// Update the fit-to-viewport placement, e.g. after a window resize.
    pub fn set_display(&mut self, display: DisplayTransform) {
        self.session.display = display;
    }

    /// Replace the boxes with the detections passing `threshold`.
    ///
    /// The previous list is recorded so a single undo reverts the change.
    pub fn apply_confidence_filter(&mut self, raw: &[BoundingBox], threshold: f32) {
        self.session
            .history
            .record_snapshot(self.session.annotations.boxes());
        let filtered = AnnotationStore::filter_by_confidence(raw, threshold);
        log::info!(
            "Confidence {:.2}: kept {} of {} detections",
            threshold,
            filtered.len(),
            raw.len()
        );
        self.session.annotations.set_all(filtered);
        self.state = InteractionState::Idle;
    }

    /// Remove all masks, e.g. after they were burned into the image.
    pub fn clear_masks(&mut self) {
        self.session.masks.clear();
    }

    // ========================================================================
    // Event Dispatch
    // ========================================================================

    /// Handle an event and present a frame if anything changed.
    ///
    /// Returns the action the host should carry out, if any.
    pub fn process(
        &mut self,
        event: InputEvent,
        renderer: &mut dyn Renderer,
    ) -> Option<EditorAction> {
        let outcome = self.handle_event(event);
        if outcome.changed {
            renderer.present(&self.frame());
        }
        outcome.host_action
    }

    /// Handle one input event.
    pub fn handle_event(&mut self, event: InputEvent) -> Outcome {
        match event {
            InputEvent::PointerDown { button, position } => {
                Outcome::changed(self.pointer_down(button, position))
            }
            InputEvent::PointerMove { position } => Outcome::changed(self.pointer_move(position)),
            InputEvent::PointerUp { button, position } => {
                Outcome::changed(self.pointer_up(button, position))
            }
            InputEvent::Wheel { delta, position } => Outcome::changed(self.wheel(delta, position)),
            InputEvent::Key { key, modifiers } => match self.keybindings.action_for(key, modifiers)
            {
                Some(action) => self.apply_action(action),
                None => Outcome::default(),
            },
        }
    }

    /// Carry out an action. Host-level actions are handed back untouched.
    pub fn apply_action(&mut self, action: EditorAction) -> Outcome {
        if action.is_host_action() {
            return Outcome::host(action);
        }
        let changed = match action {
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::ToggleDrawMode => {
                self.toggle_draw_mode();
                true
            }
            EditorAction::ToggleMaskMode => {
                self.toggle_mask_mode();
                true
            }
            EditorAction::Cancel => {
                self.cancel();
                true
            }
            EditorAction::DeleteSelected => self.delete_selected(),
            EditorAction::SortByX => self.sort_by_x(),
            EditorAction::ResetView => {
                let changed = !self.session.viewport.is_identity();
                self.session.viewport.reset();
                changed
            }
            EditorAction::ZoomIn => self.session.viewport.zoom_in(None),
            EditorAction::ZoomOut => self.session.viewport.zoom_out(None),
            EditorAction::SetClass(class_id) => self.set_selected_class(class_id),
            EditorAction::Save
            | EditorAction::NextImage
            | EditorAction::PrevImage
            | EditorAction::SkipImage
            | EditorAction::NextUnannotated
            | EditorAction::DeleteImage => false,
        };
        Outcome::changed(changed)
    }

    // ========================================================================
    // Pointer Handling
    // ========================================================================

    fn pointer_down(&mut self, button: PointerButton, position: ScreenPoint) -> bool {
        if self.state != InteractionState::Idle || self.session.image.is_empty() {
            return false;
        }

        match button {
            PointerButton::Primary => self.primary_down(position),
            PointerButton::Tertiary => {
                self.state = InteractionState::Panning {
                    anchor: position,
                    original_pan: self.session.viewport.pan(),
                };
                false
            }
            PointerButton::Secondary => false,
        }
    }

    fn primary_down(&mut self, position: ScreenPoint) -> bool {
        // A handle of the selected box wins over the drawing modes
        if let Some((index, handle)) = self.handle_under(position) {
            self.start_drag(index, handle, position);
            return true;
        }

        if self.session.draw_mode {
            self.state = InteractionState::Drawing {
                start: position,
                current: position,
            };
            log::debug!("Drawing: started at ({:.1}, {:.1})", position.x, position.y);
            return true;
        }
        if self.session.mask_mode {
            self.state = InteractionState::DrawingMask {
                start: position,
                current: position,
            };
            log::debug!("Mask: started at ({:.1}, {:.1})", position.x, position.y);
            return true;
        }

        self.select_at(position);
        if let Some((index, handle)) = self.handle_under(position) {
            self.start_drag(index, handle, position);
        }
        true
    }

    fn pointer_move(&mut self, position: ScreenPoint) -> bool {
        match self.state {
            InteractionState::Idle => false,
            InteractionState::Drawing { ref mut current, .. }
            | InteractionState::DrawingMask { ref mut current, .. } => {
                *current = position;
                true
            }
            InteractionState::DraggingHandle {
                index,
                handle,
                original,
                anchor,
            } => {
                // Delta from the original down-point, not incremental, to avoid drift
                let (dx, dy) = position.delta_from(anchor);
                let (ndx, ndy) = self.session.view().screen_delta_to_normalized(dx, dy);
                let edges = apply_drag(handle, original.edges(), ndx, ndy);
                log::trace!("Drag {:?} by ({:.4}, {:.4}) -> {:?}", handle, ndx, ndy, edges);
                self.session.annotations.set_edges(index, edges)
            }
            InteractionState::Panning {
                anchor,
                original_pan,
            } => {
                let (dx, dy) = position.delta_from(anchor);
                self.session
                    .viewport
                    .set_pan(original_pan.0 + dx, original_pan.1 + dy);
                true
            }
        }
    }

    fn pointer_up(&mut self, button: PointerButton, position: ScreenPoint) -> bool {
        match (button, self.state) {
            (PointerButton::Primary, InteractionState::Drawing { start, .. }) => {
                self.state = InteractionState::Idle;
                self.finish_box(start, position);
                true
            }
            (PointerButton::Primary, InteractionState::DrawingMask { start, .. }) => {
                self.state = InteractionState::Idle;
                self.finish_mask(start, position);
                true
            }
            (PointerButton::Primary, InteractionState::DraggingHandle { index, .. }) => {
                self.state = InteractionState::Idle;
                log::info!("Finished editing box {}", index);
                true
            }
            (PointerButton::Tertiary, InteractionState::Panning { .. }) => {
                self.state = InteractionState::Idle;
                false
            }
            _ => false,
        }
    }

    fn wheel(&mut self, delta: f32, position: ScreenPoint) -> bool {
        let anchor = Some(self.session.view().zoom_anchor(position));
        let zoomed = if delta > 0.0 {
            self.session.viewport.zoom_in(anchor)
        } else if delta < 0.0 {
            self.session.viewport.zoom_out(anchor)
        } else {
            false
        };
        // A pan in progress continues from the zoomed pan
        if zoomed && matches!(self.state, InteractionState::Panning { .. }) {
            self.state = InteractionState::Panning {
                anchor: position,
                original_pan: self.session.viewport.pan(),
            };
        }
        zoomed
    }

    /// Handle of the selected box under `position`.
    fn handle_under(&self, position: ScreenPoint) -> Option<(usize, Handle)> {
        let index = self.session.annotations.selected()?;
        let rect = self
            .session
            .pixel_rect(&self.session.annotations.get(index)?.rect)?;
        let point = self.session.view().screen_to_pixel(position);
        hit_test(point, &rect, self.settings.handle_size).map(|handle| (index, handle))
    }

    /// Select the topmost box under `position`, else the topmost mask, else nothing.
    fn select_at(&mut self, position: ScreenPoint) {
        let point = self.session.view().screen_to_pixel(position);
        let session = &self.session;
        let hit_box = session
            .annotations
            .boxes()
            .iter()
            .rposition(|b| session.pixel_rect(&b.rect).is_some_and(|r| r.contains(point)));
        let hit_mask = session
            .masks
            .masks()
            .iter()
            .rposition(|m| session.pixel_rect(&m.rect).is_some_and(|r| r.contains(point)));

        match (hit_box, hit_mask) {
            (Some(index), _) => {
                self.session.select_box(index);
                log::debug!("Selected box {}", index);
            }
            (None, Some(index)) => {
                self.session.select_mask(index);
                log::debug!("Selected mask {}", index);
            }
            (None, None) => self.session.deselect_all(),
        }
    }

    fn start_drag(&mut self, index: usize, handle: Handle, anchor: ScreenPoint) {
        let Some(original) = self.session.annotations.get(index).copied() else {
            return;
        };
        self.session
            .history
            .record_snapshot(self.session.annotations.boxes());
        log::debug!("Starting {:?} drag on box {}", handle, index);
        self.state = InteractionState::DraggingHandle {
            index,
            handle,
            original,
            anchor,
        };
    }

    /// Image-space normalized rectangle for a drag from `a` to `b`, if large enough.
    fn drawn_rect(&self, a: ScreenPoint, b: ScreenPoint, min_px: f32) -> Option<NormRect> {
        let (dx, dy) = b.delta_from(a);
        if dx.abs() < min_px || dy.abs() < min_px {
            return None;
        }
        let view = self.session.view();
        let p1 = view.pixel_to_image(view.screen_to_pixel(ScreenPoint::new(a.x.min(b.x), a.y.min(b.y))));
        let p2 = view.pixel_to_image(view.screen_to_pixel(ScreenPoint::new(a.x.max(b.x), a.y.max(b.y))));
        Some(normalize_from_corners(p1, p2, view.image))
    }

    fn finish_box(&mut self, start: ScreenPoint, end: ScreenPoint) {
        let Some(rect) = self.drawn_rect(start, end, self.settings.min_draw_px) else {
            log::debug!("Drawing: too small, ignored");
            return;
        };
        self.session
            .history
            .record_snapshot(self.session.annotations.boxes());
        let index = self
            .session
            .annotations
            .add(BoundingBox::from_rect(self.session.default_class, rect));
        self.session.select_box(index);
        log::info!(
            "Created box {} (class {}, total: {})",
            index,
            self.session.default_class,
            self.session.annotations.len()
        );
    }

    fn finish_mask(&mut self, start: ScreenPoint, end: ScreenPoint) {
        let Some(rect) = self.drawn_rect(start, end, self.settings.min_mask_px) else {
            log::debug!("Mask: too small, ignored");
            return;
        };
        self.session.masks.add(Mask::new(rect));
        log::info!("Created mask (total: {})", self.session.masks.len());
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.session.history.undo(self.session.annotations.boxes()) else {
            return false;
        };
        self.session.annotations.set_all(previous);
        self.state = InteractionState::Idle;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.session.history.redo(self.session.annotations.boxes()) else {
            return false;
        };
        self.session.annotations.set_all(next);
        self.state = InteractionState::Idle;
        true
    }

    /// Toggle draw mode; turning it on turns mask mode off.
    pub fn toggle_draw_mode(&mut self) {
        self.session.draw_mode = !self.session.draw_mode;
        if self.session.draw_mode {
            self.session.mask_mode = false;
        }
        self.abort_drawing();
        log::info!("Draw mode: {}", self.session.draw_mode);
    }

    /// Toggle mask mode; turning it on turns draw mode off.
    pub fn toggle_mask_mode(&mut self) {
        self.session.mask_mode = !self.session.mask_mode;
        if self.session.mask_mode {
            self.session.draw_mode = false;
        }
        self.abort_drawing();
        log::info!("Mask mode: {}", self.session.mask_mode);
    }

    /// Leave both modes, drop any selection, and return to idle.
    pub fn cancel(&mut self) {
        self.session.draw_mode = false;
        self.session.mask_mode = false;
        self.session.deselect_all();
        self.state = InteractionState::Idle;
    }

    fn abort_drawing(&mut self) {
        if matches!(
            self.state,
            InteractionState::Drawing { .. } | InteractionState::DrawingMask { .. }
        ) {
            self.state = InteractionState::Idle;
        }
    }

    /// Delete the selected box, or the selected mask when no box is selected.
    pub fn delete_selected(&mut self) -> bool {
        if let Some(index) = self.session.annotations.selected() {
            self.session
                .history
                .record_snapshot(self.session.annotations.boxes());
            self.session.annotations.delete_at(index);
            self.state = InteractionState::Idle;
            log::info!("Deleted box {}", index);
            return true;
        }
        if let Some(index) = self.session.masks.selected() {
            self.session.masks.delete_at(index);
            log::info!("Deleted mask {}", index);
            return true;
        }
        false
    }

    /// Reorder boxes left to right.
    pub fn sort_by_x(&mut self) -> bool {
        if self.session.annotations.is_empty() {
            return false;
        }
        self.session
            .history
            .record_snapshot(self.session.annotations.boxes());
        self.session.annotations.sort_by_x();
        self.state = InteractionState::Idle;
        true
    }

    /// Change the class of the selected box.
    pub fn set_selected_class(&mut self, class_id: u32) -> bool {
        let Some(index) = self.session.annotations.selected() else {
            return false;
        };
        self.session
            .history
            .record_snapshot(self.session.annotations.boxes());
        self.session.annotations.set_class(index, class_id)
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Shape being drawn, in displayed-image pixels.
    pub fn preview(&self) -> Option<Preview> {
        let view = self.session.view();
        match self.state {
            InteractionState::Drawing { start, current } => Some(Preview::Box(
                PixelRect::from_corners(view.screen_to_pixel(start), view.screen_to_pixel(current)),
            )),
            InteractionState::DrawingMask { start, current } => Some(Preview::Mask(
                PixelRect::from_corners(view.screen_to_pixel(start), view.screen_to_pixel(current)),
            )),
            _ => None,
        }
    }

    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            annotations: &self.session.annotations,
            masks: &self.session.masks,
            viewport: &self.session.viewport,
            preview: self.preview(),
        }
    }

    /// Cursor to show when hovering at `position`.
    pub fn cursor_at(&self, position: ScreenPoint) -> CursorHint {
        match self.state {
            InteractionState::Panning { .. } => CursorHint::Grabbing,
            InteractionState::DraggingHandle { handle, .. } => handle.into(),
            InteractionState::Drawing { .. } | InteractionState::DrawingMask { .. } => {
                CursorHint::Crosshair
            }
            InteractionState::Idle => match self.handle_under(position) {
                Some((_, handle)) => handle.into(),
                None if self.session.draw_mode || self.session.mask_mode => CursorHint::Crosshair,
                None => CursorHint::Default,
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    /// 1000x1000 image displayed at scale 1 with no letterbox.
    fn controller_with(boxes: Vec<BoundingBox>) -> InteractionController {
        let mut c = InteractionController::default();
        c.begin_image(ImageSize::new(1000, 1000), DisplayTransform::default(), boxes);
        c
    }

    fn down(c: &mut InteractionController, button: PointerButton, x: f32, y: f32) -> Outcome {
        c.handle_event(InputEvent::PointerDown {
            button,
            position: ScreenPoint::new(x, y),
        })
    }

    fn move_to(c: &mut InteractionController, x: f32, y: f32) -> Outcome {
        c.handle_event(InputEvent::PointerMove {
            position: ScreenPoint::new(x, y),
        })
    }

    fn up(c: &mut InteractionController, button: PointerButton, x: f32, y: f32) -> Outcome {
        c.handle_event(InputEvent::PointerUp {
            button,
            position: ScreenPoint::new(x, y),
        })
    }

    fn drag(c: &mut InteractionController, from: (f32, f32), to: (f32, f32)) {
        down(c, PointerButton::Primary, from.0, from.1);
        move_to(c, to.0, to.1);
        up(c, PointerButton::Primary, to.0, to.1);
    }

    fn key(c: &mut InteractionController, ch: char, modifiers: Modifiers) -> Outcome {
        c.handle_event(InputEvent::Key {
            key: Key::Char(ch),
            modifiers,
        })
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_preview: Option<Preview>,
    }

    impl Renderer for CountingRenderer {
        fn present(&mut self, frame: &RenderFrame<'_>) {
            self.frames += 1;
            self.last_preview = frame.preview;
        }
    }

    #[test]
    fn test_draw_box() {
        let mut c = controller_with(Vec::new());
        c.toggle_draw_mode();
        drag(&mut c, (100.0, 100.0), (300.0, 200.0));

        assert_eq!(c.annotations().len(), 1);
        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.center_x, 0.2));
        assert!(approx_eq(b.rect.center_y, 0.15));
        assert!(approx_eq(b.rect.width, 0.2));
        assert!(approx_eq(b.rect.height, 0.1));
        assert_eq!(b.class_id, 0);
        assert_eq!(c.annotations().selected(), Some(0));
        assert!(c.history().can_undo());
        assert_eq!(*c.state(), InteractionState::Idle);
    }

    #[test]
    fn test_draw_reversed_corners() {
        let mut c = controller_with(Vec::new());
        c.set_default_class(3);
        c.toggle_draw_mode();
        drag(&mut c, (300.0, 200.0), (100.0, 100.0));
        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.center_x, 0.2));
        assert!(approx_eq(b.rect.width, 0.2));
        assert_eq!(b.class_id, 3);
    }

    #[test]
    fn test_selected_handle_beats_draw_mode() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        c.toggle_draw_mode();

        drag(&mut c, (600.0, 500.0), (650.0, 520.0));
        assert_eq!(c.annotations().len(), 1);
        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.width, 0.25));
        assert!(approx_eq(b.rect.height, 0.2));

        // Away from the box the draw mode applies
        drag(&mut c, (100.0, 100.0), (200.0, 200.0));
        assert_eq!(c.annotations().len(), 2);
    }

    #[test]
    fn test_tiny_draw_is_discarded() {
        let mut c = controller_with(Vec::new());
        c.toggle_draw_mode();
        drag(&mut c, (100.0, 100.0), (104.0, 104.0));
        assert!(c.annotations().is_empty());
        assert!(!c.history().can_undo());
    }

    #[test]
    fn test_drag_bottom_right_handle() {
        let original = BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2);
        let mut c = controller_with(vec![original]);

        // Clicking the corner selects the box and grabs the handle in one go
        down(&mut c, PointerButton::Primary, 600.0, 600.0);
        assert!(matches!(
            c.state(),
            InteractionState::DraggingHandle {
                handle: Handle::BottomRight,
                ..
            }
        ));
        move_to(&mut c, 650.0, 650.0);
        move_to(&mut c, 700.0, 700.0);
        up(&mut c, PointerButton::Primary, 700.0, 700.0);

        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.center_x, 0.55));
        assert!(approx_eq(b.rect.center_y, 0.55));
        assert!(approx_eq(b.rect.width, 0.3));
        assert!(approx_eq(b.rect.height, 0.3));

        assert!(c.undo());
        assert_eq!(c.annotations().boxes(), &[original]);
    }

    #[test]
    fn test_move_respects_zoom() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        c.apply_action(EditorAction::ZoomIn);
        let zoom = c.viewport().zoom;

        // Box center stays at the image center (500, 500) when zooming about it
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        move_to(&mut c, 500.0 + 100.0 * zoom, 500.0);
        up(&mut c, PointerButton::Primary, 500.0 + 100.0 * zoom, 500.0);

        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.center_x, 0.6));
        assert!(approx_eq(b.rect.width, 0.2));
    }

    #[test]
    fn test_selection_topmost_wins() {
        let mut c = controller_with(vec![
            BoundingBox::new(0, 0.5, 0.5, 0.4, 0.4),
            BoundingBox::new(1, 0.5, 0.5, 0.2, 0.2),
        ]);
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        assert_eq!(c.annotations().selected(), Some(1));

        // Empty space clears the selection
        down(&mut c, PointerButton::Primary, 50.0, 50.0);
        up(&mut c, PointerButton::Primary, 50.0, 50.0);
        assert_eq!(c.annotations().selected(), None);
    }

    #[test]
    fn test_click_without_move_records_one_snapshot() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        assert_eq!(c.history().undo_count(), 1);
        assert_eq!(c.annotations().get(0).unwrap().rect.center_x, 0.5);
    }

    #[test]
    fn test_mask_draw_and_selection_exclusivity() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.2, 0.2, 0.1, 0.1)]);
        c.toggle_mask_mode();
        drag(&mut c, (100.0, 100.0), (108.0, 300.0));
        assert!(c.masks().is_empty(), "below the mask threshold");

        drag(&mut c, (600.0, 600.0), (800.0, 800.0));
        assert_eq!(c.masks().len(), 1);
        assert!(!c.history().can_undo(), "masks are not versioned");

        c.toggle_mask_mode();
        // Select the mask
        down(&mut c, PointerButton::Primary, 700.0, 700.0);
        up(&mut c, PointerButton::Primary, 700.0, 700.0);
        assert_eq!(c.masks().selected(), Some(0));
        assert_eq!(c.annotations().selected(), None);

        // Selecting the box clears the mask selection
        down(&mut c, PointerButton::Primary, 200.0, 200.0);
        up(&mut c, PointerButton::Primary, 200.0, 200.0);
        assert_eq!(c.annotations().selected(), Some(0));
        assert_eq!(c.masks().selected(), None);
    }

    #[test]
    fn test_modes_are_exclusive_and_cancel_clears() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        c.toggle_draw_mode();
        c.toggle_mask_mode();
        assert!(c.mask_mode());
        assert!(!c.draw_mode());
        c.toggle_draw_mode();
        assert!(c.draw_mode());
        assert!(!c.mask_mode());

        c.cancel();
        assert!(!c.draw_mode() && !c.mask_mode());

        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        assert!(c.annotations().selected().is_some());
        c.handle_event(InputEvent::Key {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(c.annotations().selected(), None);
    }

    fn escape(c: &mut InteractionController) -> Outcome {
        c.handle_event(InputEvent::Key {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
        })
    }

    #[test]
    fn test_escape_aborts_drawing() {
        let mut c = controller_with(Vec::new());
        c.toggle_draw_mode();
        down(&mut c, PointerButton::Primary, 100.0, 100.0);
        move_to(&mut c, 200.0, 200.0);
        assert!(matches!(c.state(), InteractionState::Drawing { .. }));

        escape(&mut c);
        assert_eq!(*c.state(), InteractionState::Idle);
        assert!(!c.draw_mode());
        up(&mut c, PointerButton::Primary, 200.0, 200.0);
        assert!(c.annotations().is_empty());
        assert!(!c.history().can_undo());
    }

    #[test]
    fn test_mode_switch_aborts_mask_drawing() {
        let mut c = controller_with(Vec::new());
        c.toggle_mask_mode();
        down(&mut c, PointerButton::Primary, 100.0, 100.0);
        move_to(&mut c, 300.0, 300.0);
        assert!(matches!(c.state(), InteractionState::DrawingMask { .. }));

        c.toggle_draw_mode();
        assert_eq!(*c.state(), InteractionState::Idle);
        assert!(c.draw_mode() && !c.mask_mode());
        up(&mut c, PointerButton::Primary, 300.0, 300.0);
        assert!(c.masks().is_empty());
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn test_mode_switch_aborts_box_drawing() {
        let mut c = controller_with(Vec::new());
        c.toggle_draw_mode();
        down(&mut c, PointerButton::Primary, 100.0, 100.0);
        move_to(&mut c, 300.0, 300.0);

        c.toggle_mask_mode();
        assert_eq!(*c.state(), InteractionState::Idle);
        up(&mut c, PointerButton::Primary, 300.0, 300.0);
        assert!(c.annotations().is_empty());
        assert!(c.masks().is_empty());
    }

    #[test]
    fn test_escape_during_drag_keeps_applied_edit() {
        let original = BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2);
        let mut c = controller_with(vec![original]);
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);

        down(&mut c, PointerButton::Primary, 600.0, 500.0);
        move_to(&mut c, 650.0, 500.0);
        assert!(matches!(c.state(), InteractionState::DraggingHandle { .. }));

        escape(&mut c);
        assert_eq!(*c.state(), InteractionState::Idle);
        assert_eq!(c.annotations().selected(), None);

        // Further pointer motion no longer edits the box
        move_to(&mut c, 700.0, 500.0);
        up(&mut c, PointerButton::Primary, 700.0, 500.0);
        let b = c.annotations().get(0).unwrap();
        assert!(approx_eq(b.rect.width, 0.25));

        assert!(c.undo());
        assert_eq!(c.annotations().boxes(), &[original]);
    }

    #[test]
    fn test_escape_stops_panning() {
        let mut c = controller_with(Vec::new());
        down(&mut c, PointerButton::Tertiary, 10.0, 10.0);
        move_to(&mut c, 30.0, 50.0);
        assert_eq!(c.viewport().pan(), (20.0, 40.0));

        escape(&mut c);
        assert_eq!(*c.state(), InteractionState::Idle);
        move_to(&mut c, 100.0, 100.0);
        up(&mut c, PointerButton::Tertiary, 100.0, 100.0);
        assert_eq!(c.viewport().pan(), (20.0, 40.0));
    }

    #[test]
    fn test_wheel_during_pan_continues_smoothly() {
        let mut c = controller_with(Vec::new());
        down(&mut c, PointerButton::Tertiary, 10.0, 10.0);
        move_to(&mut c, 30.0, 50.0);
        c.handle_event(InputEvent::Wheel {
            delta: 1.0,
            position: ScreenPoint::new(30.0, 50.0),
        });
        let (zx, zy) = c.viewport().pan();

        move_to(&mut c, 40.0, 60.0);
        let (px, py) = c.viewport().pan();
        assert!(approx_eq(px, zx + 10.0));
        assert!(approx_eq(py, zy + 10.0));
        assert!(matches!(c.state(), InteractionState::Panning { .. }));
    }

    #[test]
    fn test_pan_uses_total_delta() {
        let mut c = controller_with(Vec::new());
        c.toggle_draw_mode();
        down(&mut c, PointerButton::Tertiary, 10.0, 10.0);
        move_to(&mut c, 30.0, 50.0);
        assert_eq!(c.viewport().pan(), (20.0, 40.0));
        move_to(&mut c, 40.0, 40.0);
        assert_eq!(c.viewport().pan(), (30.0, 30.0));
        up(&mut c, PointerButton::Tertiary, 40.0, 40.0);
        assert_eq!(*c.state(), InteractionState::Idle);
        assert!(c.annotations().is_empty());
    }

    #[test]
    fn test_wheel_zoom_and_clamp() {
        let mut c = controller_with(Vec::new());
        let wheel = |c: &mut InteractionController, delta: f32| {
            c.handle_event(InputEvent::Wheel {
                delta,
                position: ScreenPoint::new(500.0, 500.0),
            })
        };
        assert!(wheel(&mut c, 1.0).changed);
        assert!(approx_eq(c.viewport().zoom, 1.15));
        for _ in 0..30 {
            wheel(&mut c, 1.0);
        }
        assert!(!wheel(&mut c, 1.0).changed);
        assert!(!wheel(&mut c, 0.0).changed);
        assert!(wheel(&mut c, -1.0).changed);
    }

    #[test]
    fn test_delete_sort_and_class_are_undoable() {
        let mut c = controller_with(vec![
            BoundingBox::new(0, 0.8, 0.5, 0.1, 0.1),
            BoundingBox::new(1, 0.1, 0.5, 0.1, 0.1),
            BoundingBox::new(2, 0.5, 0.5, 0.1, 0.1),
        ]);
        let original = c.annotations().boxes().to_vec();

        assert!(c.sort_by_x());
        let xs: Vec<f32> = c.annotations().boxes().iter().map(|b| b.rect.center_x).collect();
        assert_eq!(xs, vec![0.1, 0.5, 0.8]);

        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        key(&mut c, '5', Modifiers::NONE);
        assert_eq!(c.annotations().get(1).unwrap().class_id, 4);

        c.apply_action(EditorAction::DeleteSelected);
        assert_eq!(c.annotations().len(), 2);
        assert_eq!(c.annotations().selected(), None);

        while c.undo() {}
        assert_eq!(c.annotations().boxes(), original.as_slice());
        while c.redo() {}
        assert_eq!(c.annotations().len(), 2);
    }

    #[test]
    fn test_host_actions_are_returned() {
        let mut c = controller_with(Vec::new());
        let outcome = key(&mut c, 'd', Modifiers::NONE);
        assert_eq!(outcome.host_action, Some(EditorAction::NextImage));
        assert!(!outcome.changed);
        let outcome = key(&mut c, 's', Modifiers::CTRL);
        assert_eq!(outcome.host_action, Some(EditorAction::Save));
    }

    #[test]
    fn test_confidence_filter_single_undo() {
        let raw = vec![
            BoundingBox::new(0, 0.1, 0.1, 0.1, 0.1).with_confidence(0.3),
            BoundingBox::new(0, 0.2, 0.2, 0.1, 0.1).with_confidence(0.8),
        ];
        let mut c = controller_with(AnnotationStore::filter_by_confidence(&raw, 0.25));
        c.apply_confidence_filter(&raw, 0.5);
        assert_eq!(c.annotations().len(), 1);
        assert!(c.undo());
        assert_eq!(c.annotations().len(), 2);
    }

    #[test]
    fn test_renderer_only_on_change() {
        let mut c = controller_with(Vec::new());
        let mut renderer = CountingRenderer::default();

        c.process(
            InputEvent::PointerMove {
                position: ScreenPoint::new(10.0, 10.0),
            },
            &mut renderer,
        );
        assert_eq!(renderer.frames, 0);

        c.toggle_draw_mode();
        c.process(
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                position: ScreenPoint::new(10.0, 10.0),
            },
            &mut renderer,
        );
        c.process(
            InputEvent::PointerMove {
                position: ScreenPoint::new(60.0, 40.0),
            },
            &mut renderer,
        );
        assert_eq!(renderer.frames, 2);
        assert_eq!(
            renderer.last_preview,
            Some(Preview::Box(PixelRect::new(10.0, 10.0, 50.0, 30.0)))
        );
    }

    #[test]
    fn test_no_image_ignores_pointer() {
        let mut c = InteractionController::default();
        c.toggle_draw_mode();
        assert!(!down(&mut c, PointerButton::Primary, 10.0, 10.0).changed);
        assert_eq!(*c.state(), InteractionState::Idle);
    }

    #[test]
    fn test_cursor_hints() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        assert_eq!(c.cursor_at(ScreenPoint::new(500.0, 500.0)), CursorHint::Default);
        down(&mut c, PointerButton::Primary, 500.0, 500.0);
        up(&mut c, PointerButton::Primary, 500.0, 500.0);
        assert_eq!(c.cursor_at(ScreenPoint::new(500.0, 500.0)), CursorHint::Move);
        assert_eq!(c.cursor_at(ScreenPoint::new(400.0, 600.0)), CursorHint::ResizeAntiDiagonal);
        assert_eq!(c.cursor_at(ScreenPoint::new(600.0, 500.0)), CursorHint::ResizeHorizontal);
        c.toggle_draw_mode();
        assert_eq!(c.cursor_at(ScreenPoint::new(0.0, 0.0)), CursorHint::Crosshair);
    }

    #[test]
    fn test_begin_image_resets_session() {
        let mut c = controller_with(vec![BoundingBox::new(0, 0.5, 0.5, 0.2, 0.2)]);
        c.toggle_mask_mode();
        drag(&mut c, (100.0, 100.0), (300.0, 300.0));
        c.apply_action(EditorAction::ZoomIn);
        c.set_selected_class(2);
        c.sort_by_x();

        c.begin_image(ImageSize::new(640, 480), DisplayTransform::default(), Vec::new());
        assert!(c.masks().is_empty());
        assert!(!c.history().can_undo());
        assert!(c.viewport().is_identity());
        assert!(c.mask_mode(), "modes survive navigation");
    }
}
