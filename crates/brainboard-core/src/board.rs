//! Editor session: the element store, command log, camera, tools and input
//! owned together, plus the operations the UI and shortcut layer call.

use crate::attrs::{self, Attrs};
use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::elements::{ConnectorEnd, ElementId, Endpoint};
use crate::history::{Command, History};
use crate::input::{InputContext, PointerEvent};
use crate::layering;
use crate::shortcuts::{EditorAction, ShortcutMap};
use crate::storage::{BoardSnapshot, Storage, StorageResult};
use crate::store::ElementStore;
use crate::tools::{Effects, ToolContext, ToolController, ToolKind};
use kurbo::{Size, Vec2};
use serde_json::Value;
use std::collections::HashSet;

/// Change notifications for the rendering adapter, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// The selection set changed; highlights need a refresh.
    SelectionChanged,
    ContentChanged,
    ViewportChanged,
    ToolChanged(ToolKind),
}

type LayerFn = fn(&[ElementId], &HashSet<ElementId>) -> Option<Vec<ElementId>>;

/// One editing session over a board.
pub struct Board {
    store: ElementStore,
    history: History,
    camera: Camera,
    tools: ToolController,
    input: InputContext,
    config: EditorConfig,
    shortcuts: ShortcutMap,
    /// Size of the drawing surface; `None` until it is mounted.
    viewport: Option<Size>,
    events: Vec<BoardEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let config = config.validate();
        Self {
            store: ElementStore::new(),
            history: History::new(),
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            tools: ToolController::new(config.throttle_ms),
            input: InputContext::new(),
            shortcuts: ShortcutMap::default(),
            viewport: None,
            events: Vec::new(),
            config,
        }
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn input(&self) -> &InputContext {
        &self.input
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutMap {
        &mut self.shortcuts
    }

    pub fn viewport_size(&self) -> Option<Size> {
        self.viewport
    }

    /// Mount, resize or unmount (`None`) the drawing surface.
    pub fn set_viewport_size(&mut self, size: Option<Size>) {
        self.viewport = size;
        if size.is_none() {
            self.tools.cancel();
        }
    }

    /// Take the pending change notifications.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: BoardEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    fn emit_effects(&mut self, effects: Effects) {
        if effects.content {
            self.emit(BoardEvent::ContentChanged);
        }
        if effects.selection {
            self.emit(BoardEvent::SelectionChanged);
        }
        if effects.viewport {
            self.emit(BoardEvent::ViewportChanged);
        }
    }

    fn refresh_drag(&mut self) {
        let enabled = self.tools.drag_enabled(&self.input, &self.config);
        self.store.set_drag_enabled(enabled);
    }

    // --- Tools -------------------------------------------------------------

    pub fn tool(&self) -> ToolKind {
        self.tools.tool()
    }

    /// Activate a tool. Placement tools create their element at the viewport
    /// centre, select it and fall back to `Select`.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let previous = self.tools.tool();
        if let ToolKind::Place(placement) = tool {
            self.tools.set_tool(ToolKind::Select);
            match self.viewport.map(|size| self.camera.visible_rect(size).center()) {
                Some(center) => {
                    let id = self.store.add_element(placement.create(center, &self.config));
                    if let Some(element) = self.store.get(id) {
                        self.history.record(Command::AddElement {
                            element,
                            select: true,
                        });
                    }
                    self.store.select([id]);
                    self.emit(BoardEvent::ContentChanged);
                    self.emit(BoardEvent::SelectionChanged);
                }
                None => log::debug!("Ignoring {placement:?} placement: surface not mounted"),
            }
        } else {
            self.tools.set_tool(tool);
        }
        let current = self.tools.tool();
        if current != previous {
            self.emit(BoardEvent::ToolChanged(current));
        }
        self.refresh_drag();
    }

    // --- Input -------------------------------------------------------------

    /// Route a pointer event to the active tool. A no-op until the surface is mounted.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Effects {
        if self.viewport.is_none() {
            return Effects::none();
        }
        let mut ctx = ToolContext {
            store: &mut self.store,
            history: &mut self.history,
            camera: &mut self.camera,
            input: &self.input,
            config: &self.config,
        };
        let effects = self.tools.handle_pointer(event, &mut ctx);
        self.emit_effects(effects);
        effects
    }

    /// Record a key press and run its shortcut, if any. Returns the action run.
    pub fn key_down(&mut self, key: &str) -> Option<EditorAction> {
        if !self.input.key_down(key) {
            return None;
        }
        if key == self.config.pan_key {
            self.refresh_drag();
            return None;
        }
        let action = self.shortcuts.lookup(key, &self.input.modifiers)?;
        self.apply_action(action);
        Some(action)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
        if key == self.config.pan_key {
            self.tools.end_pan();
            self.refresh_drag();
        }
    }

    /// Text editing focus suppresses keyboard shortcuts and the pan key.
    pub fn set_text_editing(&mut self, editing: bool) {
        self.input.set_text_editing(editing);
        self.refresh_drag();
    }

    /// Forget held keys, e.g. when the window loses focus.
    pub fn release_keys(&mut self) {
        self.input.release_all();
        self.tools.end_pan();
        self.refresh_drag();
    }

    /// Run an editor operation. Returns whether anything changed.
    pub fn apply_action(&mut self, action: EditorAction) -> bool {
        log::debug!("Action {action:?}");
        match action {
            EditorAction::SetTool { tool } => {
                let before = (self.tools.tool(), self.history.entries().len());
                self.set_tool(tool);
                before != (self.tools.tool(), self.history.entries().len())
            }
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::DeleteSelection => self.delete_selected() > 0,
            EditorAction::SelectAll => self.select_all(),
            EditorAction::ZoomIn => self.zoom_in(),
            EditorAction::ZoomOut => self.zoom_out(),
            EditorAction::BringToFront => self.bring_to_front(self.selected()),
            EditorAction::SendToBack => self.send_to_back(self.selected()),
            EditorAction::BringForward => self.bring_forward(self.selected()),
            EditorAction::SendBackward => self.send_backward(self.selected()),
            EditorAction::Cancel => {
                let was_busy = !self.tools.is_idle();
                self.tools.cancel();
                self.clear_selection() || was_busy
            }
        }
    }

    // --- History -----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.step(|history, store| history.undo(store))
    }

    pub fn redo(&mut self) -> bool {
        self.step(|history, store| history.redo(store))
    }

    fn step(&mut self, f: impl FnOnce(&mut History, &mut ElementStore) -> bool) -> bool {
        self.tools.cancel();
        let selection = self.store.selection().clone();
        if !f(&mut self.history, &mut self.store) {
            return false;
        }
        self.emit(BoardEvent::ContentChanged);
        if *self.store.selection() != selection {
            self.emit(BoardEvent::SelectionChanged);
        }
        true
    }

    // --- Edits -------------------------------------------------------------

    /// Merge `attrs` into an element and record the change as one undo step.
    pub fn update_element(&mut self, id: ElementId, attrs: &Attrs) -> bool {
        let attrs = &self.store.resolve_patch(id, attrs);
        let Some(prev) = self.store.snapshot_attrs(id, attrs) else {
            log::debug!("update_element: no element {id}");
            return false;
        };
        if !self.store.update_element(id, attrs) {
            return false;
        }
        let next = self.store.snapshot_attrs(id, attrs).unwrap_or_default();
        self.history
            .record(Command::UpdateElement { id, prev, next });
        self.emit(BoardEvent::ContentChanged);
        true
    }

    /// Commit a finished drag of `ids` by `delta`. Only draggable elements move;
    /// the whole drag is one undo step.
    pub fn commit_move(&mut self, ids: &[ElementId], delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        let keys = attrs::attrs(serde_json::json!({ "position": Value::Null }));
        let mut commands = Vec::new();
        for &id in ids {
            if !self.store.is_draggable(id) {
                continue;
            }
            let Some(prev) = self.store.snapshot_attrs(id, &keys) else {
                continue;
            };
            if self.store.translate_element(id, delta) {
                let next = self.store.snapshot_attrs(id, &keys).unwrap_or_default();
                commands.push(Command::UpdateElement { id, prev, next });
            }
        }
        if commands.is_empty() {
            return false;
        }
        self.history.record(Command::Batch { commands });
        self.emit(BoardEvent::ContentChanged);
        true
    }

    /// Point one end of a connector somewhere else.
    pub fn rebind_connector(&mut self, id: ElementId, end: ConnectorEnd, endpoint: Endpoint) -> bool {
        let Some(prev) = self.store.connector(id).cloned() else {
            log::debug!("rebind_connector: no connector {id}");
            return false;
        };
        let mut next = prev.clone();
        *next.endpoint_mut(end) = endpoint;
        self.store.set_connector(next);
        let Some(next) = self.store.connector(id).cloned() else {
            return false;
        };
        if next == prev {
            return false;
        }
        self.history.record(Command::UpdateConnector { prev, next });
        self.emit(BoardEvent::ContentChanged);
        true
    }

    /// Delete one element of any kind, including ink strokes.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let was_selected = self.store.is_selected(id);
        let Some(removed) = self.store.delete_element(id) else {
            return false;
        };
        self.history.record(Command::deleted(removed));
        self.emit(BoardEvent::ContentChanged);
        if was_selected {
            self.emit(BoardEvent::SelectionChanged);
        }
        true
    }

    /// Delete the selection as one undo step. Returns how many elements were removed.
    pub fn delete_selected(&mut self) -> usize {
        let commands: Vec<Command> = self
            .store
            .selected_ordered()
            .into_iter()
            .filter_map(|id| self.store.delete_element(id))
            .map(Command::deleted)
            .collect();
        let count = commands.len();
        if count > 0 {
            self.history.record(Command::Batch { commands });
            self.emit(BoardEvent::ContentChanged);
            self.emit(BoardEvent::SelectionChanged);
        }
        count
    }

    // --- Selection ---------------------------------------------------------

    fn selected(&self) -> Vec<ElementId> {
        self.store.selected_ordered()
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = ElementId>) -> bool {
        let changed = self.store.select(ids);
        if changed {
            self.emit(BoardEvent::SelectionChanged);
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.store.clear_selection();
        if changed {
            self.emit(BoardEvent::SelectionChanged);
        }
        changed
    }

    /// Select every layered element.
    pub fn select_all(&mut self) -> bool {
        let ids = self.store.ordered_ids();
        self.select(ids)
    }

    // --- Layering ----------------------------------------------------------

    fn relayer(&mut self, ids: Vec<ElementId>, op: LayerFn) -> bool {
        let ids: HashSet<ElementId> = ids.into_iter().collect();
        let prev = self.store.ordered_ids();
        let Some(next) = op(&prev, &ids) else {
            return false;
        };
        if !self.store.reorder(&next) {
            return false;
        }
        self.history.record(Command::Reorder { prev, next });
        self.emit(BoardEvent::ContentChanged);
        true
    }

    pub fn bring_to_front(&mut self, ids: Vec<ElementId>) -> bool {
        self.relayer(ids, layering::bring_to_front)
    }

    pub fn send_to_back(&mut self, ids: Vec<ElementId>) -> bool {
        self.relayer(ids, layering::send_to_back)
    }

    pub fn bring_forward(&mut self, ids: Vec<ElementId>) -> bool {
        self.relayer(ids, layering::bring_forward)
    }

    pub fn send_backward(&mut self, ids: Vec<ElementId>) -> bool {
        self.relayer(ids, layering::send_backward)
    }

    // --- Viewport ----------------------------------------------------------

    /// Zoom in by the button step, keeping the pan offset.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.config.button_zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(1.0 / self.config.button_zoom_step)
    }

    fn zoom_by(&mut self, factor: f64) -> bool {
        let changed = self.camera.zoom_by(factor);
        if changed {
            self.emit(BoardEvent::ViewportChanged);
        }
        changed
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.emit(BoardEvent::ViewportChanged);
    }

    // --- Persistence -------------------------------------------------------

    pub fn snapshot(&self) -> BoardSnapshot {
        self.store.snapshot(self.camera.viewport())
    }

    /// Replace the board contents. The history starts over.
    pub fn load_snapshot(&mut self, snapshot: &BoardSnapshot) {
        self.store = ElementStore::from_snapshot(snapshot);
        self.camera.set_viewport(snapshot.viewport);
        self.history.clear();
        self.tools.cancel();
        self.refresh_drag();
        self.emit(BoardEvent::ContentChanged);
        self.emit(BoardEvent::SelectionChanged);
        self.emit(BoardEvent::ViewportChanged);
    }

    pub async fn save_to<S: Storage + ?Sized>(&self, storage: &S, board_id: &str) -> StorageResult<()> {
        let snapshot = self.snapshot();
        storage.save(board_id, &snapshot).await?;
        log::info!("Saved board {board_id} ({} elements)", snapshot.elements.len());
        Ok(())
    }

    /// Load a board from storage. On failure the current board is left untouched.
    pub async fn load_from<S: Storage + ?Sized>(&mut self, storage: &S, board_id: &str) -> StorageResult<()> {
        let snapshot = storage.load(board_id).await?;
        self.load_snapshot(&snapshot);
        log::info!("Loaded board {board_id} ({} elements)", snapshot.elements.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::attrs;
    use crate::elements::{Element, ElementTrait, Shape, ShapeKind};
    use crate::storage::{MemoryStorage, StorageError, block_on};
    use crate::tools::{PenMode, Placement};
    use kurbo::Point;
    use serde_json::json;

    fn mounted() -> Board {
        let mut board = Board::new();
        board.set_viewport_size(Some(Size::new(800.0, 600.0)));
        board
    }

    fn rect(board: &mut Board, x: f64, y: f64) -> ElementId {
        board
            .store
            .add_element(Shape::rectangle(Point::new(x, y), 100.0, 50.0).into())
    }

    fn down(x: f64, y: f64, t: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Some(Point::new(x, y)),
            time_ms: t,
        }
    }

    fn up(x: f64, y: f64, t: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Some(Point::new(x, y)),
            time_ms: t,
        }
    }

    #[test]
    fn test_placement_creates_at_centre_and_reverts() {
        let mut board = mounted();
        board.set_tool(ToolKind::Place(Placement::Shape(ShapeKind::Rectangle)));
        assert_eq!(board.tool(), ToolKind::Select);
        assert_eq!(board.store().shapes().len(), 1);
        let shape = &board.store().shapes()[0];
        let id = shape.id();
        assert_eq!(shape.bounds().center(), Point::new(400.0, 300.0));
        assert!(board.store().is_selected(id));
        assert!(matches!(board.history().entries(), [Command::AddElement { .. }]));
        assert!(board.undo());
        assert!(board.store().is_empty());
        assert!(board.store().selection().is_empty());
        // Redo brings the selection back with the element.
        assert!(board.redo());
        assert!(board.store().is_selected(id));
        assert_eq!(board.store().selection().len(), 1);
    }

    #[test]
    fn test_placement_needs_mounted_surface() {
        let mut board = Board::new();
        board.set_tool(ToolKind::Place(Placement::StickyNote));
        assert!(board.store().is_empty());
        assert_eq!(board.tool(), ToolKind::Select);
    }

    #[test]
    fn test_unmounted_surface_ignores_pointer() {
        let mut board = Board::new();
        board.set_tool(ToolKind::Pen(PenMode::Brush));
        board.handle_pointer(down(0.0, 0.0, 0.0));
        board.handle_pointer(up(50.0, 0.0, 30.0));
        assert!(board.store().strokes().is_empty());
        assert!(board.tools().is_idle());
    }

    #[test]
    fn test_shortcuts() {
        let mut board = mounted();
        assert_eq!(
            board.key_down("p"),
            Some(EditorAction::SetTool {
                tool: ToolKind::Pen(PenMode::Brush)
            })
        );
        board.key_up("p");
        assert_eq!(board.tool(), ToolKind::Pen(PenMode::Brush));
        assert!(board.drain_events().contains(&BoardEvent::ToolChanged(ToolKind::Pen(
            PenMode::Brush
        ))));

        board.set_text_editing(true);
        assert_eq!(board.key_down("v"), None);
        assert_eq!(board.tool(), ToolKind::Pen(PenMode::Brush));
        board.set_text_editing(false);
        board.key_down("v");
        assert_eq!(board.tool(), ToolKind::Select);
    }

    #[test]
    fn test_ctrl_z_undoes() {
        let mut board = mounted();
        board.set_tool(ToolKind::Place(Placement::Frame));
        assert_eq!(board.store().frames().len(), 1);
        board.key_down("Control");
        assert_eq!(board.key_down("z"), Some(EditorAction::Undo));
        assert!(board.store().frames().is_empty());
        board.key_up("z");
        board.key_down("y");
        assert_eq!(board.store().frames().len(), 1);
    }

    #[test]
    fn test_pan_key_disables_drag() {
        let mut board = mounted();
        let id = rect(&mut board, 0.0, 0.0);
        board.select([id]);
        assert!(board.store().is_draggable(id));
        board.key_down("Space");
        assert!(!board.store().is_draggable(id));
        board.key_up("Space");
        assert!(board.store().is_draggable(id));
        board.set_tool(ToolKind::Connect);
        assert!(!board.store().is_draggable(id));
    }

    #[test]
    fn test_update_element_records_snapshots() {
        let mut board = mounted();
        let id = rect(&mut board, 0.0, 0.0);
        let patch = attrs(json!({ "style": { "stroke_width": 5.0 } }));
        assert!(board.update_element(id, &patch));
        // Same patch again changes nothing and records nothing.
        assert!(!board.update_element(id, &patch));
        assert_eq!(board.history().entries().len(), 1);
        assert!((board.store().shapes()[0].style.stroke_width - 5.0).abs() < f64::EPSILON);
        board.undo();
        assert!((board.store().shapes()[0].style.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!(!board.update_element(ElementId::new_v4(), &patch));
    }

    #[test]
    fn test_commit_move_moves_bound_connectors() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        let b = rect(&mut board, 300.0, 0.0);
        board.select([a]);
        board.set_tool(ToolKind::Connect);
        board.handle_pointer(down(100.0, 25.0, 0.0));
        board.handle_pointer(PointerEvent::Move {
            position: Some(Point::new(305.0, 25.0)),
            time_ms: 20.0,
        });
        board.handle_pointer(up(305.0, 25.0, 40.0));
        assert_eq!(board.store().connectors().len(), 1);
        board.set_tool(ToolKind::Select);

        // `b` is not selected, so only `a` moves.
        assert!(board.commit_move(&[a, b], Vec2::new(0.0, 40.0)));
        let connector = &board.store().connectors()[0];
        assert_eq!(connector.from.point(), Point::new(100.0, 65.0));
        assert_eq!(connector.to.point(), Point::new(300.0, 25.0));
        board.undo();
        assert_eq!(board.store().connectors()[0].from.point(), Point::new(100.0, 25.0));
    }

    #[test]
    fn test_delete_selected_is_one_step() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        let b = rect(&mut board, 200.0, 0.0);
        let c = rect(&mut board, 400.0, 0.0);
        board.select([a, c]);
        assert_eq!(board.delete_selected(), 2);
        assert_eq!(board.store().ordered_ids(), vec![b]);
        assert!(board.store().selection().is_empty());
        board.undo();
        assert_eq!(board.store().ordered_ids(), vec![a, b, c]);
        board.redo();
        assert_eq!(board.store().ordered_ids(), vec![b]);
    }

    #[test]
    fn test_deleted_connector_restores_from_snapshot() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        let b = rect(&mut board, 300.0, 0.0);
        let c = rect(&mut board, 600.0, 0.0);
        let id = board.store.add_connector(crate::elements::Connector::new(
            Endpoint::Bound {
                element: a,
                side: crate::routing::Side::Right,
                point: Point::ZERO,
            },
            Endpoint::Bound {
                element: b,
                side: crate::routing::Side::Left,
                point: Point::ZERO,
            },
        ));
        board.store.reorder(&[a, id, b, c]);
        let snapshot = board.store().connector(id).cloned().unwrap();
        assert_eq!(board.store().z_index(id), Some(1));

        assert!(board.delete_element(id));
        assert!(board.store().connector(id).is_none());
        assert!(matches!(
            board.history().entries(),
            [Command::DeleteConnector { z_index: 1, .. }]
        ));

        // A host move in between, undone again before the delete is undone.
        board.select([a]);
        board.set_tool(ToolKind::Select);
        assert!(board.commit_move(&[a], Vec2::new(0.0, 40.0)));
        assert!(board.undo());

        assert!(board.undo());
        let restored = board.store().connector(id).cloned().unwrap();
        assert_eq!(restored, snapshot);
        assert!(restored.from.is_bound_to(a));
        assert!(restored.to.is_bound_to(b));
        assert_eq!(board.store().z_index(id), Some(1));

        assert!(board.redo());
        assert!(board.store().connector(id).is_none());
        assert_eq!(board.store().ordered_ids(), vec![a, b, c]);
    }

    #[test]
    fn test_circle_shrinks_through_one_key() {
        let mut board = mounted();
        let id = board
            .store
            .add_element(Shape::circle(Point::new(25.0, 25.0), 25.0).into());

        assert!(board.update_element(id, &attrs(json!({ "width": 20.0 }))));
        let shape = &board.store().shapes()[0];
        assert!((shape.width - 20.0).abs() < f64::EPSILON);
        assert!((shape.height - 20.0).abs() < f64::EPSILON);

        assert!(board.undo());
        let shape = &board.store().shapes()[0];
        assert!((shape.width - 50.0).abs() < f64::EPSILON);
        assert!((shape.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rebind_connector() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        let id = board.store.add_connector(crate::elements::Connector::new(
            Endpoint::Free {
                point: Point::new(-50.0, 0.0),
            },
            Endpoint::Free {
                point: Point::new(-50.0, 100.0),
            },
        ));
        let bound = Endpoint::Bound {
            element: a,
            side: crate::routing::Side::Top,
            point: Point::ZERO,
        };
        assert!(board.rebind_connector(id, ConnectorEnd::To, bound));
        let to = board.store().connector(id).unwrap().to;
        assert_eq!(to.point(), Point::new(50.0, 0.0));
        board.undo();
        assert!(!board.store().connector(id).unwrap().to.is_bound());
    }

    #[test]
    fn test_layering_actions_are_undoable() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        let b = rect(&mut board, 10.0, 0.0);
        let c = rect(&mut board, 20.0, 0.0);
        board.select([a]);
        assert!(board.apply_action(EditorAction::BringToFront));
        assert_eq!(board.store().ordered_ids(), vec![b, c, a]);
        assert!(!board.apply_action(EditorAction::BringForward));
        assert!(board.apply_action(EditorAction::SendBackward));
        assert_eq!(board.store().ordered_ids(), vec![b, a, c]);
        board.undo();
        board.undo();
        assert_eq!(board.store().ordered_ids(), vec![a, b, c]);
    }

    #[test]
    fn test_zoom_actions() {
        let mut board = mounted();
        assert!(board.apply_action(EditorAction::ZoomIn));
        assert!((board.camera().zoom - 1.2).abs() < 1e-12);
        assert!(board.apply_action(EditorAction::ZoomOut));
        assert!((board.camera().zoom - 1.0).abs() < 1e-12);
        assert_eq!(board.camera().offset, Vec2::ZERO);
        assert!(board.drain_events().contains(&BoardEvent::ViewportChanged));
        assert!(board.drain_events().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        board.apply_action(EditorAction::ZoomIn);
        block_on(board.save_to(&storage, "board")).unwrap();

        let mut other = mounted();
        rect(&mut other, 500.0, 500.0);
        other.set_tool(ToolKind::Place(Placement::Text));
        block_on(other.load_from(&storage, "board")).unwrap();
        assert_eq!(other.store().ordered_ids(), vec![a]);
        assert!((other.camera().zoom - 1.2).abs() < 1e-12);
        assert!(!other.history().can_undo());

        let missing = block_on(other.load_from(&storage, "missing"));
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
        assert_eq!(other.store().len(), 1);
    }

    #[test]
    fn test_cancel_clears_selection() {
        let mut board = mounted();
        let a = rect(&mut board, 0.0, 0.0);
        board.select([a]);
        assert_eq!(board.key_down("Escape"), Some(EditorAction::Cancel));
        assert!(board.store().selection().is_empty());
        assert!(matches!(
            board.store().get(a),
            Some(Element::Shape(_))
        ));
    }
}
