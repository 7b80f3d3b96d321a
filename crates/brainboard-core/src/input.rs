//! Pointer and keyboard input for one editing session.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event in screen coordinates.
///
/// `position` is `None` when the host could not resolve coordinates for the
/// event (for example before the drawing surface is mounted). `time_ms` is a
/// monotonically increasing timestamp used for throttling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Option<Point>, time_ms: f64 },
    Move { position: Option<Point>, time_ms: f64 },
    Up { position: Option<Point>, time_ms: f64 },
    /// Wheel or trackpad zoom. Negative `delta_y` zooms in.
    Wheel {
        position: Option<Point>,
        delta_y: f64,
        time_ms: f64,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Wheel { position, .. } => position,
        }
    }

    pub fn time_ms(&self) -> f64 {
        match *self {
            PointerEvent::Down { time_ms, .. }
            | PointerEvent::Move { time_ms, .. }
            | PointerEvent::Up { time_ms, .. }
            | PointerEvent::Wheel { time_ms, .. } => time_ms,
        }
    }
}

/// Drops events that arrive within `interval_ms` of the last accepted one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    pub interval_ms: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last: None,
        }
    }

    /// Accept the event at `now` if the interval has elapsed, recording it.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.interval_ms => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Keys held during the session plus the text-editing focus flag.
///
/// Created once per editor session and owned by the board; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pressed_keys: HashSet<String>,
    pub modifiers: Modifiers,
    text_editing: bool,
}

fn modifier_slot<'a>(modifiers: &'a mut Modifiers, key: &str) -> Option<&'a mut bool> {
    match key {
        "Shift" => Some(&mut modifiers.shift),
        "Control" | "Ctrl" => Some(&mut modifiers.ctrl),
        "Alt" => Some(&mut modifiers.alt),
        "Meta" | "Cmd" | "Super" => Some(&mut modifiers.meta),
        _ => None,
    }
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Ignored while a text field has focus; returns whether
    /// the key was accepted.
    pub fn key_down(&mut self, key: &str) -> bool {
        if self.text_editing {
            return false;
        }
        if let Some(slot) = modifier_slot(&mut self.modifiers, key) {
            *slot = true;
        }
        self.pressed_keys.insert(key.to_string());
        true
    }

    /// Record a key release. Always honoured so keys never stick.
    pub fn key_up(&mut self, key: &str) -> bool {
        if let Some(slot) = modifier_slot(&mut self.modifiers, key) {
            *slot = false;
        }
        self.pressed_keys.remove(key)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn set_text_editing(&mut self, editing: bool) {
        self.text_editing = editing;
    }

    pub fn is_text_editing(&self) -> bool {
        self.text_editing
    }

    /// Forget every held key (e.g. when the window loses focus).
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.modifiers = Modifiers::default();
    }
}
