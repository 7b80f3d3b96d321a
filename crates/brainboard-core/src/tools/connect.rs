//! Connector drags from element anchors, and the anchor-click sibling shortcut.

use super::{Effects, ToolContext, ToolController, ToolState};
use crate::elements::{Connector, Element, ElementId, Endpoint};
use crate::history::Command;
use crate::routing::{self, Side};
use crate::store::{AnchorHit, ElementStore};
use kurbo::Point;

/// A connector drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectDrag {
    source: ElementId,
    side: Side,
    origin: Point,
    start_screen: Point,
    moved: bool,
    candidate: Endpoint,
}

impl ConnectDrag {
    fn new(hit: AnchorHit, screen: Point) -> Self {
        Self {
            source: hit.element,
            side: hit.side,
            origin: hit.point,
            start_screen: screen,
            moved: false,
            candidate: Endpoint::Free { point: hit.point },
        }
    }

    pub fn source(&self) -> ElementId {
        self.source
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Anchor point the drag started from.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Current target: snapped to a host anchor or following the pointer.
    pub fn candidate(&self) -> &Endpoint {
        &self.candidate
    }

    /// Whether the pointer has travelled far enough to count as a drag.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    fn from_endpoint(&self) -> Endpoint {
        Endpoint::Bound {
            element: self.source,
            side: self.side,
            point: self.origin,
        }
    }

    /// Path the connector would take if released now.
    pub fn preview_route(&self, padding: f64) -> Vec<Point> {
        routing::route_between(
            self.origin,
            Some(self.side),
            self.candidate.point(),
            self.candidate.side(),
            padding,
        )
    }
}

/// Snap `world` to the nearest anchor of the first host under it, skipping the source.
fn resolve_candidate(store: &ElementStore, source: ElementId, world: Point) -> Endpoint {
    store
        .host_at(world, Some(source))
        .and_then(|id| store.host_bounds(id).map(|rect| (id, rect)))
        .map(|(element, rect)| {
            let (side, point) = routing::nearest_anchor(rect, world);
            Endpoint::Bound {
                element,
                side,
                point,
            }
        })
        .unwrap_or(Endpoint::Free { point: world })
}

impl ToolController {
    pub(super) fn begin_connect(&mut self, hit: AnchorHit, screen: Point) -> Effects {
        log::debug!("Connector drag from {} ({:?})", hit.element, hit.side);
        self.connect_throttle.reset();
        self.state = ToolState::Connecting(ConnectDrag::new(hit, screen));
        Effects::none()
    }

    /// Under the connect tool a press is inert unless it lands on an anchor.
    pub(super) fn connect_down(
        &mut self,
        world: Point,
        screen: Point,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let radius = ctx.world_radius(ctx.config.anchor_hit_radius);
        match ctx.store.anchor_at(world, radius, false) {
            Some(hit) => self.begin_connect(hit, screen),
            None => Effects::none(),
        }
    }

    pub(super) fn connect_move(
        &mut self,
        world: Point,
        screen: Point,
        time: f64,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let ToolState::Connecting(drag) = &mut self.state else {
            return Effects::none();
        };
        if !drag.moved && (screen - drag.start_screen).hypot() > ctx.config.click_slop {
            drag.moved = true;
        }
        if drag.moved && self.connect_throttle.ready(time) {
            drag.candidate = resolve_candidate(ctx.store, drag.source, world);
        }
        Effects::none()
    }

    /// Finish the drag. A click synthesizes a connected sibling; a drag creates a
    /// connector only when released over a host.
    pub(super) fn connect_up(
        &mut self,
        drag: ConnectDrag,
        world: Point,
        resolved: bool,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        if !drag.moved {
            return grow_sibling(&drag, ctx);
        }
        let candidate = if resolved {
            resolve_candidate(ctx.store, drag.source, world)
        } else {
            drag.candidate
        };
        if !candidate.is_bound() {
            log::debug!("Connector drag released over empty canvas, discarded");
            return Effects::none();
        }
        let id = ctx
            .store
            .add_connector(Connector::new(drag.from_endpoint(), candidate));
        match ctx.store.connector(id).cloned() {
            Some(connector) => {
                ctx.history.record(Command::AddConnector { connector });
                Effects::content()
            }
            None => Effects::none(),
        }
    }
}

/// Clone the source next to itself along the anchor direction and connect the two.
fn grow_sibling(drag: &ConnectDrag, ctx: &mut ToolContext<'_>) -> Effects {
    let Some(mut sibling) = ctx.store.get(drag.source) else {
        return Effects::none();
    };
    let bounds = sibling.bounds();
    let extent = if drag.side.is_horizontal() {
        bounds.width()
    } else {
        bounds.height()
    };
    sibling.regenerate_id();
    sibling.translate(drag.side.direction() * (extent + ctx.config.sibling_gap));
    if let Element::Text(text) = &mut sibling {
        text.content.clear();
    }

    let sibling_id = ctx.store.add_element(sibling);
    let Some(sibling_bounds) = ctx.store.host_bounds(sibling_id) else {
        return Effects::content();
    };
    let target_side = drag.side.opposite();
    let to = Endpoint::Bound {
        element: sibling_id,
        side: target_side,
        point: routing::anchor_point(sibling_bounds, target_side),
    };
    let connector_id = ctx
        .store
        .add_connector(Connector::new(drag.from_endpoint(), to));

    let commands: Vec<Command> = [
        ctx.store
            .get(sibling_id)
            .map(|element| Command::AddElement {
                element,
                select: true,
            }),
        ctx.store
            .connector(connector_id)
            .cloned()
            .map(|connector| Command::AddConnector { connector }),
    ]
    .into_iter()
    .flatten()
    .collect();
    ctx.history.record(Command::Batch { commands });
    ctx.store.select([sibling_id]);
    log::debug!("Grew sibling {sibling_id} from {} ({:?})", drag.source, drag.side);
    Effects::content().merge(Effects::selection())
}
