//! Keyboard shortcut registry.
//!
//! Shortcuts map key combinations onto [`EditorAction`]s, the same operations the
//! toolbar triggers, so everything the editor does is reachable without a pointer.

use crate::elements::ShapeKind;
use crate::input::Modifiers;
use crate::tools::{PenMode, Placement, ToolKind};
use serde::{Deserialize, Serialize};

/// An editor operation that can be triggered from the keyboard or a toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    SetTool { tool: ToolKind },
    Undo,
    Redo,
    DeleteSelection,
    SelectAll,
    ZoomIn,
    ZoomOut,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    /// Abandon the gesture in progress and clear the selection.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub key: &'static str,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
    pub action: EditorAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: EditorAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Letters match either case; other keys match exactly.
    fn matches(&self, key: &str, modifiers: &Modifiers) -> bool {
        self.ctrl == modifiers.command()
            && self.shift == modifiers.shift
            && self.key.eq_ignore_ascii_case(key)
    }
}

const fn tool(tool: ToolKind) -> EditorAction {
    EditorAction::SetTool { tool }
}

/// Registry of keyboard shortcuts.
#[derive(Debug, Clone)]
pub struct ShortcutMap {
    shortcuts: Vec<Shortcut>,
}

impl Default for ShortcutMap {
    fn default() -> Self {
        use EditorAction::*;
        let shortcuts = vec![
            Shortcut::new("V", false, false, tool(ToolKind::Select), "Select tool"),
            Shortcut::new("P", false, false, tool(ToolKind::Pen(PenMode::Brush)), "Pen"),
            Shortcut::new("E", false, false, tool(ToolKind::Pen(PenMode::Eraser)), "Eraser"),
            Shortcut::new("C", false, false, tool(ToolKind::Connect), "Connector tool"),
            Shortcut::new(
                "R",
                false,
                false,
                tool(ToolKind::Place(Placement::Shape(ShapeKind::Rectangle))),
                "Add rectangle",
            ),
            Shortcut::new(
                "O",
                false,
                false,
                tool(ToolKind::Place(Placement::Shape(ShapeKind::Circle))),
                "Add circle",
            ),
            Shortcut::new("T", false, false, tool(ToolKind::Place(Placement::Text)), "Add text"),
            Shortcut::new(
                "N",
                false,
                false,
                tool(ToolKind::Place(Placement::StickyNote)),
                "Add sticky note",
            ),
            Shortcut::new("F", false, false, tool(ToolKind::Place(Placement::Frame)), "Add frame"),
            Shortcut::new("Z", true, false, Undo, "Undo"),
            Shortcut::new("Z", true, true, Redo, "Redo"),
            Shortcut::new("Y", true, false, Redo, "Redo"),
            Shortcut::new("Delete", false, false, DeleteSelection, "Delete selection"),
            Shortcut::new("Backspace", false, false, DeleteSelection, "Delete selection"),
            Shortcut::new("A", true, false, SelectAll, "Select all"),
            Shortcut::new("+", false, false, ZoomIn, "Zoom in"),
            Shortcut::new("+", false, true, ZoomIn, "Zoom in"),
            Shortcut::new("=", false, false, ZoomIn, "Zoom in"),
            Shortcut::new("-", false, false, ZoomOut, "Zoom out"),
            Shortcut::new("]", false, false, BringForward, "Bring forward"),
            Shortcut::new("[", false, false, SendBackward, "Send backward"),
            Shortcut::new("]", true, false, BringToFront, "Bring to front"),
            Shortcut::new("[", true, false, SendToBack, "Send to back"),
            Shortcut::new("Escape", false, false, Cancel, "Cancel current action"),
        ];
        Self { shortcuts }
    }
}

impl ShortcutMap {
    /// A map with no bindings.
    pub fn empty() -> Self {
        Self {
            shortcuts: Vec::new(),
        }
    }

    /// Get all registered shortcuts.
    pub fn all(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Add a binding. An existing binding for the same combination is replaced.
    pub fn bind(&mut self, shortcut: Shortcut) {
        self.shortcuts.retain(|s| {
            !(s.key.eq_ignore_ascii_case(shortcut.key)
                && s.ctrl == shortcut.ctrl
                && s.shift == shortcut.shift)
        });
        self.shortcuts.push(shortcut);
    }

    /// Action bound to `key` with the given modifiers held.
    pub fn lookup(&self, key: &str, modifiers: &Modifiers) -> Option<EditorAction> {
        self.shortcuts
            .iter()
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
    }

    #[test]
    fn test_tool_keys() {
        let map = ShortcutMap::default();
        let none = Modifiers::default();
        assert_eq!(map.lookup("v", &none), Some(tool(ToolKind::Select)));
        assert_eq!(
            map.lookup("E", &none),
            Some(tool(ToolKind::Pen(PenMode::Eraser)))
        );
        assert_eq!(map.lookup("Q", &none), None);
    }

    #[test]
    fn test_modifiers_distinguish_bindings() {
        let map = ShortcutMap::default();
        assert_eq!(map.lookup("z", &ctrl()), Some(EditorAction::Undo));
        let ctrl_shift = Modifiers {
            shift: true,
            ..ctrl()
        };
        assert_eq!(map.lookup("Z", &ctrl_shift), Some(EditorAction::Redo));
        assert_eq!(map.lookup("z", &Modifiers::default()), None);
        assert_eq!(map.lookup("]", &ctrl()), Some(EditorAction::BringToFront));
        assert_eq!(
            map.lookup("]", &Modifiers::default()),
            Some(EditorAction::BringForward)
        );
    }

    #[test]
    fn test_meta_counts_as_ctrl() {
        let map = ShortcutMap::default();
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert_eq!(map.lookup("a", &cmd), Some(EditorAction::SelectAll));
    }

    #[test]
    fn test_bind_replaces() {
        let mut map = ShortcutMap::default();
        map.bind(Shortcut::new("Z", true, false, EditorAction::Cancel, "Custom"));
        assert_eq!(map.lookup("Z", &ctrl()), Some(EditorAction::Cancel));
        assert_eq!(
            map.all().iter().filter(|s| s.format() == "Ctrl+Z").count(),
            1
        );
    }
}
