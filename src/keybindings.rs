//! Customizable keybindings for the editor.
//!
//! This module defines the editor actions and the keys that trigger them.
//! Bindings are part of [`crate::config::EditorConfig`] and persist with it.

use serde::{Deserialize, Serialize};

/// Maximum number of classes that can have hotkeys (0-9 keys).
pub const MAX_CLASS_HOTKEYS: usize = 10;

/// Keyboard keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Escape,
    Delete,
    Backspace,
    Enter,
    Space,
    Left,
    Right,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

/// A key plus the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub const fn plain(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: Modifiers::NONE,
        }
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: Modifiers::CTRL,
        }
    }

    pub const fn key(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        let normalize = |k: Key| match k {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        normalize(self.key) == normalize(key)
            && self.modifiers.ctrl == modifiers.ctrl
            && self.modifiers.alt == modifiers.alt
    }
}

/// Everything a key press can ask the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    Save,
    NextImage,
    PrevImage,
    SkipImage,
    NextUnannotated,
    DeleteImage,
    ToggleDrawMode,
    ToggleMaskMode,
    /// Leave draw/mask mode and clear any selection.
    Cancel,
    DeleteSelected,
    SortByX,
    ResetView,
    ZoomIn,
    ZoomOut,
    /// Assign a class to the selected box.
    SetClass(u32),
}

impl EditorAction {
    /// Actions the host application handles (navigation and file operations).
    pub fn is_host_action(&self) -> bool {
        matches!(
            self,
            EditorAction::Save
                | EditorAction::NextImage
                | EditorAction::PrevImage
                | EditorAction::SkipImage
                | EditorAction::NextUnannotated
                | EditorAction::DeleteImage
        )
    }
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub undo: KeyChord,
    pub redo: KeyChord,
    /// Save; the ctrl variant of the same key is also accepted.
    pub save: KeyChord,
    pub next_image: KeyChord,
    pub prev_image: KeyChord,
    pub skip_image: KeyChord,
    pub next_unannotated: KeyChord,
    pub delete_image: KeyChord,
    pub toggle_draw: KeyChord,
    pub toggle_mask: KeyChord,
    pub cancel: KeyChord,
    pub delete_selected: KeyChord,
    pub sort_by_x: KeyChord,
    pub reset_view: KeyChord,
    pub zoom_in: KeyChord,
    pub zoom_out: KeyChord,

    /// Hotkeys for class assignment (index i assigns class i)
    pub class_hotkeys: Vec<Option<KeyChord>>,
}

fn default_class_hotkeys() -> Vec<Option<KeyChord>> {
    // 1-9 assign classes 0-8, 0 assigns class 9
    ['1', '2', '3', '4', '5', '6', '7', '8', '9', '0']
        .into_iter()
        .map(|c| Some(KeyChord::plain(c)))
        .collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: KeyChord::ctrl('z'),
            redo: KeyChord::ctrl('y'),
            save: KeyChord::plain('s'),
            next_image: KeyChord::plain('d'),
            prev_image: KeyChord::plain('a'),
            skip_image: KeyChord::plain('q'),
            next_unannotated: KeyChord::plain('n'),
            delete_image: KeyChord::plain('x'),
            toggle_draw: KeyChord::plain('w'),
            toggle_mask: KeyChord::plain('m'),
            cancel: KeyChord::key(Key::Escape),
            delete_selected: KeyChord::key(Key::Delete),
            sort_by_x: KeyChord::plain('o'),
            reset_view: KeyChord::plain('r'),
            zoom_in: KeyChord::plain('+'),
            zoom_out: KeyChord::plain('-'),
            class_hotkeys: default_class_hotkeys(),
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<EditorAction> {
        let save_ctrl = KeyChord {
            modifiers: Modifiers::CTRL,
            ..self.save
        };
        let table = [
            (self.undo, EditorAction::Undo),
            (self.redo, EditorAction::Redo),
            (self.save, EditorAction::Save),
            (save_ctrl, EditorAction::Save),
            (self.next_image, EditorAction::NextImage),
            (self.prev_image, EditorAction::PrevImage),
            (self.skip_image, EditorAction::SkipImage),
            (self.next_unannotated, EditorAction::NextUnannotated),
            (self.delete_image, EditorAction::DeleteImage),
            (self.toggle_draw, EditorAction::ToggleDrawMode),
            (self.toggle_mask, EditorAction::ToggleMaskMode),
            (self.cancel, EditorAction::Cancel),
            (self.delete_selected, EditorAction::DeleteSelected),
            (self.sort_by_x, EditorAction::SortByX),
            (self.reset_view, EditorAction::ResetView),
            (self.zoom_in, EditorAction::ZoomIn),
            (self.zoom_out, EditorAction::ZoomOut),
        ];

        if let Some((_, action)) = table.iter().find(|(chord, _)| chord.matches(key, modifiers)) {
            return Some(*action);
        }

        self.class_index_for(key, modifiers)
            .map(|i| EditorAction::SetClass(i as u32))
    }

    /// Get the class index that corresponds to a key press, if any.
    pub fn class_index_for(&self, key: Key, modifiers: Modifiers) -> Option<usize> {
        self.class_hotkeys
            .iter()
            .take(MAX_CLASS_HOTKEYS)
            .position(|hotkey| hotkey.is_some_and(|chord| chord.matches(key, modifiers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::default();
        assert_eq!(
            kb.action_for(Key::Char('z'), Modifiers::CTRL),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            kb.action_for(Key::Char('Y'), Modifiers::CTRL),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            kb.action_for(Key::Char('s'), Modifiers::CTRL),
            Some(EditorAction::Save)
        );
        assert_eq!(
            kb.action_for(Key::Char('s'), Modifiers::NONE),
            Some(EditorAction::Save)
        );
        assert_eq!(
            kb.action_for(Key::Escape, Modifiers::NONE),
            Some(EditorAction::Cancel)
        );
        assert_eq!(kb.action_for(Key::Char('z'), Modifiers::NONE), None);
    }

    #[test]
    fn test_class_hotkeys() {
        let kb = KeyBindings::default();
        assert_eq!(
            kb.action_for(Key::Char('1'), Modifiers::NONE),
            Some(EditorAction::SetClass(0))
        );
        assert_eq!(
            kb.action_for(Key::Char('9'), Modifiers::NONE),
            Some(EditorAction::SetClass(8))
        );
        assert_eq!(
            kb.action_for(Key::Char('0'), Modifiers::NONE),
            Some(EditorAction::SetClass(9))
        );
    }

    #[test]
    fn test_host_actions() {
        assert!(EditorAction::NextImage.is_host_action());
        assert!(EditorAction::Save.is_host_action());
        assert!(!EditorAction::Undo.is_host_action());
        assert!(!EditorAction::SetClass(2).is_host_action());
    }
}
