//! The element store: typed collections, a single global z-order and the selection.
//!
//! Elements live in kind-specific collections so persistence and rendering can
//! dispatch by kind. One `z_order` list over every layered element is the source of
//! truth for stacking; each collection is kept sorted by it, so reading the
//! collections in z rank is a projection rather than separate state.

use crate::attrs::{self, Attrs};
use crate::camera::Viewport;
use crate::elements::{
    Connector, Element, ElementId, ElementKind, ElementTrait, Endpoint, Frame, ImageElement,
    Shape, ShapeKind, Stroke, TextElement, rects_intersect,
};
use crate::routing::{self, Side};
use crate::storage::BoardSnapshot;
use kurbo::{Point, Rect, Vec2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Everything needed to put a deleted element back exactly where it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removed {
    pub element: Element,
    /// Position in the global z-order (stroke index for ink strokes).
    pub z_index: usize,
    /// Connectors that were bound to the element, as they were before being severed.
    #[serde(default)]
    pub severed: Vec<Connector>,
}

/// A side anchor found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorHit {
    pub element: ElementId,
    pub side: Side,
    pub point: Point,
}

/// Authoritative in-memory board contents.
#[derive(Debug, Clone)]
pub struct ElementStore {
    shapes: Vec<Shape>,
    texts: Vec<TextElement>,
    images: Vec<ImageElement>,
    frames: Vec<Frame>,
    connectors: Vec<Connector>,
    strokes: Vec<Stroke>,
    /// Global stacking order of every non-stroke element, back to front.
    z_order: Vec<ElementId>,
    kinds: HashMap<ElementId, ElementKind>,
    selection: HashSet<ElementId>,
    drag_enabled: bool,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge `attrs` into the element with `id`, returning whether it changed.
fn patch_in<T>(items: &mut [T], id: ElementId, attrs: &Attrs) -> bool
where
    T: ElementTrait + Serialize + DeserializeOwned + PartialEq,
{
    let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
        return false;
    };
    match attrs::patched(item, attrs) {
        Ok(mut next) => {
            next.normalize();
            if next == *item {
                false
            } else {
                *item = next;
                true
            }
        }
        Err(err) => {
            log::warn!("Rejected attribute patch for {id}: {err}");
            false
        }
    }
}

fn find<T: ElementTrait>(items: &[T], id: ElementId) -> Option<&T> {
    items.iter().find(|item| item.id() == id)
}

fn find_mut<T: ElementTrait>(items: &mut [T], id: ElementId) -> Option<&mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

fn take<T: ElementTrait>(items: &mut Vec<T>, id: ElementId) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}

fn sort_by_rank<T: ElementTrait>(items: &mut [T], rank: &HashMap<ElementId, usize>) {
    items.sort_by_key(|item| rank.get(&item.id()).copied().unwrap_or(usize::MAX));
}

impl ElementStore {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            texts: Vec::new(),
            images: Vec::new(),
            frames: Vec::new(),
            connectors: Vec::new(),
            strokes: Vec::new(),
            z_order: Vec::new(),
            kinds: HashMap::new(),
            selection: HashSet::new(),
            drag_enabled: true,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn texts(&self) -> &[TextElement] {
        &self.texts
    }

    pub fn images(&self) -> &[ImageElement] {
        &self.images
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Total number of elements across every collection.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.kinds.contains_key(&id)
    }

    pub fn kind_of(&self, id: ElementId) -> Option<ElementKind> {
        self.kinds.get(&id).copied()
    }

    /// Global order of layered elements, back to front.
    pub fn ordered_ids(&self) -> Vec<ElementId> {
        self.z_order.clone()
    }

    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        self.z_order.iter().position(|&z| z == id)
    }

    /// Look up any element through the common trait.
    pub fn element(&self, id: ElementId) -> Option<&dyn ElementTrait> {
        Some(match self.kinds.get(&id)? {
            ElementKind::Shape => find(&self.shapes, id)? as &dyn ElementTrait,
            ElementKind::Text => find(&self.texts, id)? as &dyn ElementTrait,
            ElementKind::Image => find(&self.images, id)? as &dyn ElementTrait,
            ElementKind::Frame => find(&self.frames, id)? as &dyn ElementTrait,
            ElementKind::Connector => find(&self.connectors, id)? as &dyn ElementTrait,
            ElementKind::Stroke => find(&self.strokes, id)? as &dyn ElementTrait,
        })
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut dyn ElementTrait> {
        Some(match self.kinds.get(&id)? {
            ElementKind::Shape => find_mut(&mut self.shapes, id)? as &mut dyn ElementTrait,
            ElementKind::Text => find_mut(&mut self.texts, id)? as &mut dyn ElementTrait,
            ElementKind::Image => find_mut(&mut self.images, id)? as &mut dyn ElementTrait,
            ElementKind::Frame => find_mut(&mut self.frames, id)? as &mut dyn ElementTrait,
            ElementKind::Connector => find_mut(&mut self.connectors, id)? as &mut dyn ElementTrait,
            ElementKind::Stroke => find_mut(&mut self.strokes, id)? as &mut dyn ElementTrait,
        })
    }

    /// Owned copy of an element.
    pub fn get(&self, id: ElementId) -> Option<Element> {
        Some(match self.kinds.get(&id)? {
            ElementKind::Shape => find(&self.shapes, id)?.clone().into(),
            ElementKind::Text => find(&self.texts, id)?.clone().into(),
            ElementKind::Image => find(&self.images, id)?.clone().into(),
            ElementKind::Frame => find(&self.frames, id)?.clone().into(),
            ElementKind::Connector => find(&self.connectors, id)?.clone().into(),
            ElementKind::Stroke => find(&self.strokes, id)?.clone().into(),
        })
    }

    pub fn connector(&self, id: ElementId) -> Option<&Connector> {
        find(&self.connectors, id)
    }

    /// Bounding box of a connector host.
    pub fn host_bounds(&self, id: ElementId) -> Option<Rect> {
        let kind = self.kind_of(id)?;
        if !kind.is_hostable() {
            return None;
        }
        self.element(id).map(|e| e.bounds())
    }

    /// Layered elements in z order, back to front.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &dyn ElementTrait> + '_ {
        self.z_order.iter().filter_map(|&id| self.element(id))
    }

    /// Every element as owned records: layered elements in z order, then strokes.
    pub fn elements(&self) -> Vec<Element> {
        self.z_order
            .iter()
            .filter_map(|&id| self.get(id))
            .chain(self.strokes.iter().cloned().map(Element::Stroke))
            .collect()
    }

    /// Rebuild a store from a flat record list, partitioning by kind.
    /// Record order defines z-order and stroke order.
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut store = Self::new();
        for mut element in elements {
            if store.kinds.contains_key(&element.id()) {
                log::warn!("Duplicate element id {} in records, regenerating", element.id());
                element.regenerate_id();
            }
            element.normalize();
            if let Element::Stroke(stroke) = element {
                store.kinds.insert(stroke.id(), ElementKind::Stroke);
                store.strokes.push(stroke);
            } else {
                let at = store.z_order.len();
                store.insert_layered(element, at);
            }
        }
        let ids: Vec<ElementId> = store.connectors.iter().map(|c| c.id()).collect();
        for id in ids {
            store.refresh_connector(id);
        }
        store
    }

    /// Capture every element plus the given viewport for persistence.
    pub fn snapshot(&self, viewport: Viewport) -> BoardSnapshot {
        BoardSnapshot {
            elements: self.elements(),
            viewport,
        }
    }

    /// Rebuild a store from persisted records. The selection starts empty.
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        Self::from_elements(snapshot.elements.iter().cloned())
    }

    // --- Creation ----------------------------------------------------------

    /// Insert an element on top of the z-order (strokes go to the ink layer).
    /// The id is regenerated if it collides with an existing element.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        if self.kinds.contains_key(&element.id()) {
            element.regenerate_id();
        }
        element.normalize();
        let id = element.id();
        match element {
            Element::Stroke(stroke) => {
                self.add_stroke(stroke);
            }
            Element::Connector(connector) => {
                self.add_connector(connector);
            }
            element => {
                let at = self.z_order.len();
                self.insert_layered(element, at);
            }
        }
        id
    }

    /// Insert a connector on top of the z-order. Endpoints bound to a missing
    /// host become free; bound points are snapped to the host's current anchor.
    pub fn add_connector(&mut self, mut connector: Connector) -> ElementId {
        if self.kinds.contains_key(&connector.id()) {
            connector.id = uuid::Uuid::new_v4();
        }
        connector.from = self.resolve_endpoint(connector.from);
        connector.to = self.resolve_endpoint(connector.to);
        let id = connector.id();
        let at = self.z_order.len();
        self.insert_layered(Element::Connector(connector), at);
        id
    }

    /// Append a finished brush stroke to the ink layer and return its index.
    /// Eraser trails are never stored.
    pub fn add_stroke(&mut self, mut stroke: Stroke) -> Option<usize> {
        if !stroke.is_brush() {
            log::debug!("Ignoring eraser trail {}", stroke.id());
            return None;
        }
        if self.kinds.contains_key(&stroke.id()) {
            stroke.id = uuid::Uuid::new_v4();
        }
        self.kinds.insert(stroke.id(), ElementKind::Stroke);
        self.strokes.push(stroke);
        Some(self.strokes.len() - 1)
    }

    /// Reinsert a stroke at `index` (clamped to the current length).
    pub fn insert_stroke(&mut self, index: usize, stroke: Stroke) {
        if self.kinds.contains_key(&stroke.id()) {
            log::debug!("Stroke {} already present", stroke.id());
            return;
        }
        let index = index.min(self.strokes.len());
        self.kinds.insert(stroke.id(), ElementKind::Stroke);
        self.strokes.insert(index, stroke);
    }

    pub fn remove_stroke(&mut self, index: usize) -> Option<Stroke> {
        if index >= self.strokes.len() {
            log::debug!("No stroke at index {index}");
            return None;
        }
        let stroke = self.strokes.remove(index);
        self.kinds.remove(&stroke.id());
        Some(stroke)
    }

    pub fn stroke_index(&self, id: ElementId) -> Option<usize> {
        self.strokes.iter().position(|s| s.id() == id)
    }

    fn insert_layered(&mut self, element: Element, z_index: usize) {
        let id = element.id();
        self.kinds.insert(id, element.kind());
        match element {
            Element::Shape(e) => self.shapes.push(e),
            Element::Text(e) => self.texts.push(e),
            Element::Image(e) => self.images.push(e),
            Element::Frame(e) => self.frames.push(e),
            Element::Connector(e) => self.connectors.push(e),
            Element::Stroke(e) => {
                self.strokes.push(e);
                return;
            }
        }
        let at = z_index.min(self.z_order.len());
        self.z_order.insert(at, id);
        self.resort();
    }

    /// Re-sort every collection by global z rank.
    fn resort(&mut self) {
        let rank: HashMap<ElementId, usize> =
            self.z_order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        sort_by_rank(&mut self.shapes, &rank);
        sort_by_rank(&mut self.texts, &rank);
        sort_by_rank(&mut self.images, &rank);
        sort_by_rank(&mut self.frames, &rank);
        sort_by_rank(&mut self.connectors, &rank);
    }

    // --- Mutation ----------------------------------------------------------

    /// Merge `attrs` into the element with `id`. Missing ids and patches that do not
    /// fit the element's type are no-ops. Returns true if the element changed.
    pub fn update_element(&mut self, id: ElementId, attrs: &Attrs) -> bool {
        let Some(kind) = self.kind_of(id) else {
            log::debug!("update_element: no element {id}");
            return false;
        };
        let resolved = self.resolve_patch(id, attrs);
        let attrs = &resolved;
        let changed = match kind {
            ElementKind::Shape => patch_in(&mut self.shapes, id, attrs),
            ElementKind::Text => patch_in(&mut self.texts, id, attrs),
            ElementKind::Image => patch_in(&mut self.images, id, attrs),
            ElementKind::Frame => patch_in(&mut self.frames, id, attrs),
            ElementKind::Connector => patch_in(&mut self.connectors, id, attrs),
            ElementKind::Stroke => patch_in(&mut self.strokes, id, attrs),
        };
        if changed {
            self.after_change(id, kind);
        }
        changed
    }

    /// The patch as it will actually be applied. A circle has a single diameter, so
    /// a patch setting only `width` or only `height` sets both.
    pub fn resolve_patch(&self, id: ElementId, attrs: &Attrs) -> Attrs {
        let is_circle = find(&self.shapes, id).is_some_and(|shape| shape.kind == ShapeKind::Circle);
        let diameter = match (attrs.get("width"), attrs.get("height")) {
            (Some(value), None) | (None, Some(value)) if is_circle => value.clone(),
            _ => return attrs.clone(),
        };
        let mut resolved = attrs.clone();
        resolved.insert("width".to_string(), diameter.clone());
        resolved.insert("height".to_string(), diameter);
        resolved
    }

    /// Current values of the keys in `attrs` for the element with `id`.
    pub fn snapshot_attrs(&self, id: ElementId, attrs: &Attrs) -> Option<Attrs> {
        let keys = attrs.keys();
        Some(match self.kind_of(id)? {
            ElementKind::Shape => attrs::snapshot_attrs(find(&self.shapes, id)?, keys),
            ElementKind::Text => attrs::snapshot_attrs(find(&self.texts, id)?, keys),
            ElementKind::Image => attrs::snapshot_attrs(find(&self.images, id)?, keys),
            ElementKind::Frame => attrs::snapshot_attrs(find(&self.frames, id)?, keys),
            ElementKind::Connector => attrs::snapshot_attrs(find(&self.connectors, id)?, keys),
            ElementKind::Stroke => attrs::snapshot_attrs(find(&self.strokes, id)?, keys),
        })
    }

    /// Move an element by `delta`. Bound connector endpoints follow hosts.
    pub fn translate_element(&mut self, id: ElementId, delta: Vec2) -> bool {
        let Some(kind) = self.kind_of(id) else {
            return false;
        };
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        element.translate(delta);
        self.after_change(id, kind);
        true
    }

    /// Replace a connector wholesale (used for endpoint rebinding).
    pub fn set_connector(&mut self, connector: Connector) -> bool {
        let id = connector.id();
        let Some(slot) = find_mut(&mut self.connectors, id) else {
            log::debug!("set_connector: no connector {id}");
            return false;
        };
        *slot = connector;
        self.refresh_connector(id);
        true
    }

    fn after_change(&mut self, id: ElementId, kind: ElementKind) {
        if kind.is_hostable() {
            self.sync_bound_endpoints(id);
        } else if kind == ElementKind::Connector {
            self.refresh_connector(id);
        }
    }

    /// Snap every endpoint bound to `host` to the host's current anchors.
    fn sync_bound_endpoints(&mut self, host: ElementId) {
        let Some(rect) = self.host_bounds(host) else {
            return;
        };
        for connector in &mut self.connectors {
            for end in [&mut connector.from, &mut connector.to] {
                if let Endpoint::Bound {
                    element,
                    side,
                    point,
                } = end
                {
                    if *element == host {
                        *point = routing::anchor_point(rect, *side);
                    }
                }
            }
        }
    }

    fn resolve_endpoint(&self, endpoint: Endpoint) -> Endpoint {
        match endpoint {
            Endpoint::Bound { element, side, .. } => match self.host_bounds(element) {
                Some(rect) => Endpoint::Bound {
                    element,
                    side,
                    point: routing::anchor_point(rect, side),
                },
                None => endpoint.freed(),
            },
            free => free,
        }
    }

    fn refresh_connector(&mut self, id: ElementId) {
        let Some(connector) = self.connector(id) else {
            return;
        };
        let from = self.resolve_endpoint(connector.from);
        let to = self.resolve_endpoint(connector.to);
        if let Some(connector) = find_mut(&mut self.connectors, id) {
            connector.from = from;
            connector.to = to;
        }
    }

    /// Remove an element. Connector endpoints bound to it become free at their
    /// last anchor position; the connectors themselves are kept.
    pub fn delete_element(&mut self, id: ElementId) -> Option<Removed> {
        let Some(kind) = self.kind_of(id) else {
            log::debug!("delete_element: no element {id}");
            return None;
        };
        if kind == ElementKind::Stroke {
            let index = self.stroke_index(id)?;
            let stroke = self.remove_stroke(index)?;
            return Some(Removed {
                element: Element::Stroke(stroke),
                z_index: index,
                severed: Vec::new(),
            });
        }

        let z_index = self.z_index(id)?;
        let element: Element = match kind {
            ElementKind::Shape => take(&mut self.shapes, id)?.into(),
            ElementKind::Text => take(&mut self.texts, id)?.into(),
            ElementKind::Image => take(&mut self.images, id)?.into(),
            ElementKind::Frame => take(&mut self.frames, id)?.into(),
            ElementKind::Connector => take(&mut self.connectors, id)?.into(),
            ElementKind::Stroke => return None,
        };
        self.z_order.remove(z_index);
        self.kinds.remove(&id);
        self.selection.remove(&id);

        let mut severed = Vec::new();
        for connector in &mut self.connectors {
            if connector.references(id) {
                severed.push(connector.clone());
                connector.sever(id);
            }
        }
        Some(Removed {
            element,
            z_index,
            severed,
        })
    }

    /// Undo a deletion: reinsert the element at its z-index and restore the
    /// bindings of connectors it was severed from.
    pub fn restore(&mut self, removed: Removed) {
        let Removed {
            element,
            z_index,
            severed,
        } = removed;
        if self.contains(element.id()) {
            log::debug!("restore: {} already present", element.id());
            return;
        }
        let (id, kind) = (element.id(), element.kind());
        match element {
            Element::Stroke(stroke) => self.insert_stroke(z_index, stroke),
            element => self.insert_layered(element, z_index),
        }
        if kind == ElementKind::Connector {
            self.refresh_connector(id);
        }
        for connector in severed {
            self.set_connector(connector);
        }
    }

    // --- Ordering ----------------------------------------------------------

    /// Redistribute all collections to follow `ids`. Unknown ids are ignored;
    /// layered elements missing from `ids` keep their relative order at the top.
    pub fn reorder(&mut self, ids: &[ElementId]) -> bool {
        let mut seen = HashSet::with_capacity(self.z_order.len());
        let mut next: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| self.kind_of(*id).is_some_and(ElementKind::is_layered))
            .filter(|id| seen.insert(*id))
            .collect();
        next.extend(self.z_order.iter().copied().filter(|id| !seen.contains(id)));
        if next == self.z_order {
            return false;
        }
        self.z_order = next;
        self.resort();
        true
    }

    // --- Selection ---------------------------------------------------------

    pub fn selection(&self) -> &HashSet<ElementId> {
        &self.selection
    }

    /// Selected ids in z order.
    pub fn selected_ordered(&self) -> Vec<ElementId> {
        self.z_order
            .iter()
            .copied()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Unknown ids and ink strokes are dropped.
    /// Returns true if the selection changed.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ElementId>) -> bool {
        let next: HashSet<ElementId> = ids
            .into_iter()
            .filter(|id| self.kind_of(*id).is_some_and(ElementKind::is_layered))
            .collect();
        if next == self.selection {
            return false;
        }
        self.selection = next;
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        true
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    /// Only selected, movable elements can be dragged, and only while dragging is enabled.
    pub fn is_draggable(&self, id: ElementId) -> bool {
        self.drag_enabled
            && self.selection.contains(&id)
            && self.kind_of(id).is_some_and(ElementKind::is_hostable)
    }

    // --- Queries -----------------------------------------------------------

    /// Topmost layered element hit at `point`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.z_order.iter().rev().copied().find(|&id| {
            self.element(id)
                .is_some_and(|e| e.hit_test(point, tolerance))
        })
    }

    /// Topmost connector host whose bounding box contains `point`, skipping `skip`.
    pub fn host_at(&self, point: Point, skip: Option<ElementId>) -> Option<ElementId> {
        self.z_order.iter().rev().copied().find(|&id| {
            Some(id) != skip && self.host_bounds(id).is_some_and(|rect| rect.contains(point))
        })
    }

    /// Connector hosts whose bounding boxes touch or overlap `rect`, in z order.
    pub fn intersecting(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.z_order
            .iter()
            .copied()
            .filter(|&id| {
                self.host_bounds(id)
                    .is_some_and(|bounds| rects_intersect(bounds, rect))
            })
            .collect()
    }

    /// Side anchor within `radius` of `point`, searching front to back.
    /// With `selected_only`, only anchors of selected elements are considered.
    pub fn anchor_at(&self, point: Point, radius: f64, selected_only: bool) -> Option<AnchorHit> {
        let radius_sq = radius * radius;
        self.z_order
            .iter()
            .rev()
            .copied()
            .filter(|id| !selected_only || self.selection.contains(id))
            .find_map(|id| {
                let rect = self.host_bounds(id)?;
                routing::anchor_points(rect)
                    .into_iter()
                    .find(|(_, anchor)| (*anchor - point).hypot2() <= radius_sq)
                    .map(|(side, anchor)| AnchorHit {
                        element: id,
                        side,
                        point: anchor,
                    })
            })
    }

    /// Connectors with at least one end bound to `host`.
    pub fn connectors_bound_to(&self, host: ElementId) -> impl Iterator<Item = &Connector> + '_ {
        self.connectors.iter().filter(move |c| c.references(host))
    }

    /// Index of every brush stroke passing within `threshold` of `point`.
    pub fn strokes_near(&self, point: Point, threshold: f64) -> Vec<usize> {
        self.strokes
            .iter()
            .enumerate()
            .filter(|(_, stroke)| stroke.is_brush() && stroke.distance_to(point) <= threshold)
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::attrs;
    use crate::elements::{SerializableColor, StrokeTool};
    use serde_json::json;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Shape::rectangle(Point::new(x, y), w, h).into()
    }

    fn bound_connector(store: &ElementStore, a: ElementId, b: ElementId) -> Connector {
        let from_rect = store.host_bounds(a).unwrap();
        let to_rect = store.host_bounds(b).unwrap();
        Connector::new(
            Endpoint::Bound {
                element: a,
                side: Side::Right,
                point: routing::anchor_point(from_rect, Side::Right),
            },
            Endpoint::Bound {
                element: b,
                side: Side::Left,
                point: routing::anchor_point(to_rect, Side::Left),
            },
        )
    }

    #[test]
    fn test_add_and_lookup() {
        let mut store = ElementStore::new();
        let id = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        assert!(store.contains(id));
        assert_eq!(store.kind_of(id), Some(ElementKind::Shape));
        assert_eq!(store.shapes().len(), 1);
        assert_eq!(store.ordered_ids(), vec![id]);
    }

    #[test]
    fn test_colliding_id_is_regenerated() {
        let mut store = ElementStore::new();
        let element = rect(0.0, 0.0, 10.0, 10.0);
        let first = store.add_element(element.clone());
        let second = store.add_element(element);
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_merges_and_is_idempotent() {
        let mut store = ElementStore::new();
        let id = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        let patch = attrs(json!({ "position": { "x": 25.0 }, "corner_radius": 2.0 }));
        assert!(store.update_element(id, &patch));
        let after_first = store.get(id);
        assert!(!store.update_element(id, &patch));
        assert_eq!(store.get(id), after_first);
        let bounds = store.element(id).unwrap().bounds();
        assert!((bounds.x0 - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_missing_or_invalid_is_noop() {
        let mut store = ElementStore::new();
        assert!(!store.update_element(uuid::Uuid::new_v4(), &attrs(json!({ "width": 5.0 }))));
        let id = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        assert!(!store.update_element(id, &attrs(json!({ "width": "wide" }))));
    }

    #[test]
    fn test_update_clamps_degenerate_size() {
        let mut store = ElementStore::new();
        let id = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        store.update_element(id, &attrs(json!({ "width": 0.0 })));
        let bounds = store.element(id).unwrap().bounds();
        assert!((bounds.width() - crate::elements::MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_resizes_from_one_axis() {
        let mut store = ElementStore::new();
        let id = store.add_element(Shape::circle(Point::new(25.0, 25.0), 25.0).into());

        assert!(store.update_element(id, &attrs(json!({ "width": 20.0 }))));
        let bounds = store.element(id).unwrap().bounds();
        assert!((bounds.width() - 20.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 20.0).abs() < f64::EPSILON);

        assert!(store.update_element(id, &attrs(json!({ "height": 80.0 }))));
        let bounds = store.element(id).unwrap().bounds();
        assert!((bounds.width() - 80.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_moving_host_moves_bound_endpoints() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 100.0, 50.0));
        let b = store.add_element(rect(300.0, 0.0, 100.0, 50.0));
        let connector = bound_connector(&store, a, b);
        let cid = store.add_connector(connector);
        store.translate_element(a, Vec2::new(10.0, 20.0));
        let connector = store.connector(cid).unwrap();
        assert_eq!(connector.from.point(), Point::new(110.0, 45.0));
        assert_eq!(connector.to.point(), Point::new(300.0, 25.0));
    }

    #[test]
    fn test_restored_connector_follows_moved_host() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 100.0, 50.0));
        let b = store.add_element(rect(300.0, 0.0, 100.0, 50.0));
        let cid = store.add_connector(bound_connector(&store, a, b));
        let removed = store.delete_element(cid).unwrap();
        store.translate_element(a, Vec2::new(0.0, 40.0));

        store.restore(removed);
        let connector = store.connector(cid).unwrap();
        assert!(connector.from.is_bound_to(a));
        assert_eq!(connector.from.point(), Point::new(100.0, 65.0));
        assert_eq!(connector.to.point(), Point::new(300.0, 25.0));
    }

    #[test]
    fn test_add_connector_unbinds_missing_host() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 100.0, 50.0));
        let ghost = uuid::Uuid::new_v4();
        let cid = store.add_connector(Connector::new(
            Endpoint::Bound {
                element: a,
                side: Side::Bottom,
                point: Point::ZERO,
            },
            Endpoint::Bound {
                element: ghost,
                side: Side::Top,
                point: Point::new(5.0, 5.0),
            },
        ));
        let connector = store.connector(cid).unwrap();
        assert_eq!(connector.from.point(), Point::new(50.0, 50.0));
        assert_eq!(
            connector.to,
            Endpoint::Free {
                point: Point::new(5.0, 5.0)
            }
        );
    }

    #[test]
    fn test_delete_severs_and_restore_rebinds() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 100.0, 50.0));
        let b = store.add_element(rect(300.0, 0.0, 100.0, 50.0));
        let cid = store.add_connector(bound_connector(&store, a, b));
        store.select([a, b]);

        let removed = store.delete_element(a).unwrap();
        assert_eq!(removed.z_index, 0);
        assert_eq!(removed.severed.len(), 1);
        assert!(!store.is_selected(a));
        let connector = store.connector(cid).unwrap();
        assert_eq!(
            connector.from,
            Endpoint::Free {
                point: Point::new(100.0, 25.0)
            }
        );
        assert!(connector.to.is_bound());

        store.restore(removed);
        assert_eq!(store.ordered_ids()[0], a);
        assert!(store.connector(cid).unwrap().from.is_bound_to(a));
    }

    #[test]
    fn test_delete_missing_is_none() {
        let mut store = ElementStore::new();
        assert!(store.delete_element(uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_reorder_sorts_collections() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        let t = store.add_element(TextElement::text(Point::ZERO, "t").into());
        let b = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        assert!(store.reorder(&[b, t, a]));
        assert_eq!(store.ordered_ids(), vec![b, t, a]);
        assert_eq!(store.shapes()[0].id(), b);
        // Unknown ids ignored, missing ids kept on top.
        assert!(store.reorder(&[uuid::Uuid::new_v4(), a]));
        assert_eq!(store.ordered_ids(), vec![a, b, t]);
        assert!(!store.reorder(&[a, b, t]));
    }

    #[test]
    fn test_selection_and_draggable() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 10.0, 10.0));
        let b = store.add_element(rect(20.0, 0.0, 10.0, 10.0));
        assert!(store.select([a, uuid::Uuid::new_v4()]));
        assert_eq!(store.selection().len(), 1);
        assert!(store.is_draggable(a));
        assert!(!store.is_draggable(b));
        store.set_drag_enabled(false);
        assert!(!store.is_draggable(a));
        assert!(store.clear_selection());
        assert!(!store.clear_selection());
    }

    #[test]
    fn test_strokes() {
        let mut store = ElementStore::new();
        let stroke = Stroke::from_points(
            StrokeTool::Draw,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            SerializableColor::black(),
            2.0,
        );
        assert_eq!(store.add_stroke(stroke.clone()), Some(0));
        assert_eq!(store.strokes_near(Point::new(50.0, 5.0), 10.0), vec![0]);
        assert!(store.strokes_near(Point::new(50.0, 20.0), 10.0).is_empty());
        let removed = store.remove_stroke(0).unwrap();
        assert!(store.strokes().is_empty());
        store.insert_stroke(5, removed);
        assert_eq!(store.strokes().len(), 1);
        let eraser = Stroke::new(StrokeTool::Erase, Point::ZERO, SerializableColor::black(), 8.0);
        assert_eq!(store.add_stroke(eraser), None);
    }

    #[test]
    fn test_anchor_at() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(10.0, 20.0, 100.0, 50.0));
        let hit = store.anchor_at(Point::new(108.0, 46.0), 5.0, false).unwrap();
        assert_eq!(hit.element, a);
        assert_eq!(hit.side, Side::Right);
        assert!(store.anchor_at(Point::new(108.0, 46.0), 5.0, true).is_none());
    }

    #[test]
    fn test_elements_roundtrip() {
        let mut store = ElementStore::new();
        let a = store.add_element(rect(0.0, 0.0, 100.0, 50.0));
        let b = store.add_element(Frame::new(Point::new(300.0, 0.0), 100.0, 50.0, "F").into());
        store.add_connector(bound_connector(&store, a, b));
        store.add_stroke(Stroke::new(
            StrokeTool::Draw,
            Point::ZERO,
            SerializableColor::black(),
            2.0,
        ));
        let records = store.elements();
        let rebuilt = ElementStore::from_elements(records.clone());
        assert_eq!(rebuilt.elements(), records);
        assert_eq!(rebuilt.frames().len(), 1);
        assert_eq!(rebuilt.strokes().len(), 1);
    }
}
