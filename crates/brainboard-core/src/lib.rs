//! Brainboard Core Library
//!
//! Platform-agnostic canvas diagramming engine for the Brainboard whiteboard:
//! the element model, undo/redo command log, pointer-driven tool state machine
//! and orthogonal connector routing. Rendering is left to the host.

pub mod attrs;
pub mod board;
pub mod camera;
pub mod config;
pub mod elements;
pub mod history;
pub mod input;
pub mod layering;
pub mod routing;
pub mod shortcuts;
pub mod storage;
pub mod store;
pub mod tools;

pub use attrs::Attrs;
pub use board::{Board, BoardEvent};
pub use camera::{Camera, Viewport};
pub use config::{ConfigError, EditorConfig};
pub use elements::{Element, ElementId, ElementKind, ElementTrait};
pub use history::{Command, History};
pub use input::{InputContext, Modifiers, PointerEvent, Throttle};
pub use routing::Side;
pub use shortcuts::{EditorAction, Shortcut, ShortcutMap};
pub use storage::{BoardSnapshot, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{AnchorHit, ElementStore, Removed};
pub use tools::{Effects, PenMode, Placement, ToolController, ToolKind, ToolState};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
