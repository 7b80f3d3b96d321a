//! Select tool: marquee selection and anchor drags from selected elements.

use super::{Effects, ToolContext, ToolController, ToolState};
use kurbo::{Point, Rect};

impl ToolController {
    /// Pointer-down under the select tool.
    ///
    /// An anchor of a selected element starts a connector drag. A press on an
    /// element is left to the render layer, which selects and drags it. Anything
    /// else starts a marquee.
    pub(super) fn select_down(
        &mut self,
        world: Point,
        screen: Point,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let radius = ctx.world_radius(ctx.config.anchor_hit_radius);
        if let Some(hit) = ctx.store.anchor_at(world, radius, true) {
            return self.begin_connect(hit, screen);
        }
        if ctx.store.hit_test(world, 0.0).is_some() {
            return Effects::none();
        }
        self.state = ToolState::Marquee {
            start: world,
            current: world,
        };
        Effects::none()
    }

    /// Finish a marquee: select every element whose bounds touch it.
    pub(super) fn select_up(
        &mut self,
        start: Point,
        end: Point,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let rect = Rect::from_points(start, end);
        let hits = ctx.store.intersecting(rect);
        log::debug!("Marquee {rect:?} selected {} elements", hits.len());
        if ctx.store.select(hits) {
            Effects::selection()
        } else {
            Effects::none()
        }
    }
}
