//! Keyboard shortcut mapping.
//!
//! Maps `KeyboardEvent.key` plus modifiers to a [`ShortcutAction`]. Bare
//! letters switch tools; anything held with Ctrl/⌘ is left to the browser.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ToolSelect,
    ToolAddNode,
    ToolAddEdge,
    ToolAddText,
    ToolDelete,
    /// Delete the selected element.
    DeleteSelection,
    /// Back to select mode, dropping a pending source or inline edit.
    Cancel,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if unbound.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() || modifiers.alt {
            return None;
        }
        match key {
            "Escape" => Some(ShortcutAction::Cancel),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelection),
            _ if modifiers.shift => None,
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "s" | "S" => Some(ShortcutAction::ToolAddNode),
            "t" | "T" => Some(ShortcutAction::ToolAddEdge),
            "x" | "X" => Some(ShortcutAction::ToolAddText),
            "d" | "D" => Some(ShortcutAction::ToolDelete),
            _ => None,
        }
    }
}
