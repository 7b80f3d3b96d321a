//! Tool state machine.
//!
//! The active [`ToolKind`] decides what a pointer-down starts; once a gesture is
//! under way its [`ToolState`] decides how moves and the final pointer-up are
//! handled. Gesture state is always reset on pointer-up, so only one gesture
//! can be in flight at a time.

mod connect;
mod pen;
mod select;

pub use connect::ConnectDrag;

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::elements::{
    Element, ElementId, ElementTrait, Frame, Shape, ShapeKind, Stroke, TextElement,
};
use crate::history::History;
use crate::input::{InputContext, PointerEvent, Throttle};
use crate::store::ElementStore;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Frames are placed larger than the default shape size by this factor.
const FRAME_SCALE: f64 = 4.0;

/// Pen sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenMode {
    #[default]
    Brush,
    Eraser,
}

/// Elements created by the placement pseudo-tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Shape(ShapeKind),
    Text,
    StickyNote,
    Frame,
}

impl Placement {
    /// Build the element centred on `center`.
    pub fn create(self, center: Point, config: &EditorConfig) -> Element {
        let size = config.default_shape_size;
        let top_left = center - Vec2::new(size.width / 2.0, size.height / 2.0);
        match self {
            Placement::Shape(ShapeKind::Circle) => {
                Shape::circle(center, size.width.min(size.height) / 2.0).into()
            }
            Placement::Shape(kind) => Shape::new(kind, top_left, size.width, size.height).into(),
            Placement::Text => TextElement::text(top_left, "Text").into(),
            Placement::StickyNote => {
                let note = TextElement::sticky_note(Point::ZERO, "");
                let half = note.bounds().size() / 2.0;
                TextElement {
                    position: center - half.to_vec2(),
                    ..note
                }
                .into()
            }
            Placement::Frame => {
                let frame_size = size * FRAME_SCALE;
                Frame::new(
                    center - (frame_size / 2.0).to_vec2(),
                    frame_size.width,
                    frame_size.height,
                    "Frame",
                )
                .into()
            }
        }
    }
}

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Pen(PenMode),
    Connect,
    /// Creates an element immediately and reverts to `Select`.
    Place(Placement),
}

/// State of the gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// Momentary pan; `last` is the last processed screen position.
    Panning { last: Point },
    /// Marquee corners in world coordinates.
    Marquee { start: Point, current: Point },
    Drawing { stroke: Stroke },
    /// `trail` is only drawn while erasing; `erased_at` maps stroke ids to the
    /// time they were last erased in this gesture.
    Erasing {
        trail: Stroke,
        erased_at: HashMap<ElementId, f64>,
    },
    Connecting(ConnectDrag),
}

/// What a handled event changed, so the board can notify the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub content: bool,
    pub selection: bool,
    pub viewport: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn content() -> Self {
        Self {
            content: true,
            ..Self::default()
        }
    }

    pub fn selection() -> Self {
        Self {
            selection: true,
            ..Self::default()
        }
    }

    pub fn viewport() -> Self {
        Self {
            viewport: true,
            ..Self::default()
        }
    }

    pub fn merge(self, other: Effects) -> Self {
        Self {
            content: self.content || other.content,
            selection: self.selection || other.selection,
            viewport: self.viewport || other.viewport,
        }
    }

    pub fn any(&self) -> bool {
        self.content || self.selection || self.viewport
    }
}

/// Everything a tool handler may read or mutate.
pub struct ToolContext<'a> {
    pub store: &'a mut ElementStore,
    pub history: &'a mut History,
    pub camera: &'a mut Camera,
    pub input: &'a InputContext,
    pub config: &'a EditorConfig,
}

impl ToolContext<'_> {
    fn pan_held(&self) -> bool {
        !self.input.is_text_editing() && self.input.is_key_pressed(&self.config.pan_key)
    }

    /// Convert a screen-space radius to world units at the current zoom.
    fn world_radius(&self, screen_radius: f64) -> f64 {
        screen_radius / self.camera.zoom
    }
}

/// Owns the active tool, the gesture state and the hot-path throttles.
#[derive(Debug, Clone)]
pub struct ToolController {
    tool: ToolKind,
    state: ToolState,
    brush_throttle: Throttle,
    connect_throttle: Throttle,
    pan_throttle: Throttle,
    wheel_throttle: Throttle,
    /// Last world position seen during the gesture, used when pointer-up has no position.
    last_world: Option<Point>,
}

impl ToolController {
    pub fn new(throttle_ms: f64) -> Self {
        Self {
            tool: ToolKind::default(),
            state: ToolState::Idle,
            brush_throttle: Throttle::new(throttle_ms),
            connect_throttle: Throttle::new(throttle_ms),
            pan_throttle: Throttle::new(throttle_ms),
            wheel_throttle: Throttle::new(throttle_ms),
            last_world: None,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ToolState::Idle)
    }

    /// Switch tools, abandoning any gesture in progress. Returns the previous tool.
    pub fn set_tool(&mut self, tool: ToolKind) -> ToolKind {
        let previous = self.tool;
        if previous != tool {
            log::debug!("Tool changed: {previous:?} -> {tool:?}");
        }
        self.tool = tool;
        self.cancel();
        previous
    }

    /// Drop transient gesture state without recording anything.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.last_world = None;
    }

    /// Whether selected elements may be dragged by the render layer.
    pub fn drag_enabled(&self, input: &InputContext, config: &EditorConfig) -> bool {
        let pan_held = !input.is_text_editing() && input.is_key_pressed(&config.pan_key);
        self.tool == ToolKind::Select && !pan_held
    }

    /// Called when the pan key is released mid-gesture.
    pub fn end_pan(&mut self) {
        if matches!(self.state, ToolState::Panning { .. }) {
            self.cancel();
        }
    }

    /// Marquee rectangle in world coordinates while selecting.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.state {
            ToolState::Marquee { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    /// Stroke being drawn or eraser trail, for live preview.
    pub fn preview_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            ToolState::Drawing { stroke } => Some(stroke),
            ToolState::Erasing { trail, .. } => Some(trail),
            _ => None,
        }
    }

    pub fn connect_drag(&self) -> Option<&ConnectDrag> {
        match &self.state {
            ToolState::Connecting(drag) => Some(drag),
            _ => None,
        }
    }

    /// Route one pointer event through the state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent, ctx: &mut ToolContext<'_>) -> Effects {
        let time = event.time_ms();
        match event {
            PointerEvent::Wheel {
                position: Some(screen),
                delta_y,
                ..
            } => self.wheel(screen, delta_y, time, ctx),
            PointerEvent::Down {
                position: Some(screen),
                ..
            } => self.pointer_down(screen, time, ctx),
            PointerEvent::Move {
                position: Some(screen),
                ..
            } => self.pointer_move(screen, time, ctx),
            // Pointer-up always ends the gesture, falling back to the last known position.
            PointerEvent::Up { position, .. } => self.pointer_up(position, ctx),
            _ => Effects::none(),
        }
    }

    fn pointer_down(&mut self, screen: Point, time: f64, ctx: &mut ToolContext<'_>) -> Effects {
        if !self.is_idle() {
            // A down without a matching up: the previous gesture is abandoned.
            self.cancel();
        }
        if ctx.pan_held() {
            self.pan_throttle.reset();
            self.state = ToolState::Panning { last: screen };
            return Effects::none();
        }
        let world = ctx.camera.screen_to_world(screen);
        self.last_world = Some(world);
        match self.tool {
            ToolKind::Select => self.select_down(world, screen, ctx),
            ToolKind::Pen(PenMode::Brush) => self.brush_down(world, time, ctx),
            ToolKind::Pen(PenMode::Eraser) => self.eraser_down(world, time, ctx),
            ToolKind::Connect => self.connect_down(world, screen, ctx),
            ToolKind::Place(_) => Effects::none(),
        }
    }

    fn pointer_move(&mut self, screen: Point, time: f64, ctx: &mut ToolContext<'_>) -> Effects {
        let world = ctx.camera.screen_to_world(screen);
        match &mut self.state {
            ToolState::Idle => return Effects::none(),
            ToolState::Panning { last } => {
                if !self.pan_throttle.ready(time) {
                    return Effects::none();
                }
                let delta = screen - *last;
                *last = screen;
                ctx.camera.pan(delta);
                return Effects::viewport();
            }
            ToolState::Marquee { current, .. } => *current = world,
            _ => {}
        }
        self.last_world = Some(world);
        match self.state {
            ToolState::Drawing { .. } => self.brush_move(world, time),
            ToolState::Erasing { .. } => self.eraser_move(world, time, ctx),
            ToolState::Connecting(_) => self.connect_move(world, screen, time, ctx),
            _ => Effects::none(),
        }
    }

    fn pointer_up(&mut self, screen: Option<Point>, ctx: &mut ToolContext<'_>) -> Effects {
        let world = screen
            .map(|s| ctx.camera.screen_to_world(s))
            .or(self.last_world);
        let state = std::mem::take(&mut self.state);
        self.last_world = None;
        let Some(world) = world else {
            return Effects::none();
        };
        match state {
            // The eraser trail is visual only; erasing already happened on down/move.
            ToolState::Idle | ToolState::Panning { .. } | ToolState::Erasing { .. } => {
                Effects::none()
            }
            ToolState::Marquee { start, .. } => self.select_up(start, world, ctx),
            ToolState::Drawing { stroke } => self.brush_up(stroke, world, screen.is_some(), ctx),
            ToolState::Connecting(drag) => self.connect_up(drag, world, screen.is_some(), ctx),
        }
    }

    fn wheel(
        &mut self,
        screen: Point,
        delta_y: f64,
        time: f64,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        if delta_y == 0.0 || !self.wheel_throttle.ready(time) {
            return Effects::none();
        }
        let step = ctx.config.wheel_zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        if ctx.camera.zoom_at(screen, factor) {
            Effects::viewport()
        } else {
            Effects::none()
        }
    }
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(EditorConfig::default().throttle_ms)
    }
}
