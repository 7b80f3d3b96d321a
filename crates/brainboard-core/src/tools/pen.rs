//! Pen tool: freehand brush strokes and the stroke eraser.

use super::{Effects, ToolContext, ToolController, ToolState};
use crate::elements::{ElementId, ElementTrait, Stroke, StrokeTool};
use crate::history::Command;
use kurbo::Point;
use std::collections::HashMap;

impl ToolController {
    pub(super) fn brush_down(&mut self, world: Point, time: f64, ctx: &ToolContext<'_>) -> Effects {
        self.brush_throttle.reset();
        self.brush_throttle.ready(time);
        self.state = ToolState::Drawing {
            stroke: Stroke::new(
                StrokeTool::Draw,
                world,
                ctx.config.brush_color,
                ctx.config.brush_width,
            ),
        };
        Effects::none()
    }

    /// Append a sample unless it falls inside the throttle window.
    pub(super) fn brush_move(&mut self, world: Point, time: f64) -> Effects {
        let ToolState::Drawing { stroke } = &mut self.state else {
            return Effects::none();
        };
        if self.brush_throttle.ready(time) {
            stroke.push_point(world);
        }
        Effects::none()
    }

    /// Commit the stroke, always including the release point.
    pub(super) fn brush_up(
        &mut self,
        mut stroke: Stroke,
        world: Point,
        resolved: bool,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        if resolved && stroke.points.last() != Some(&world) {
            stroke.push_point(world);
        }
        match ctx.store.add_stroke(stroke.clone()) {
            Some(_) => {
                ctx.history.record(Command::AddStroke { stroke });
                Effects::content()
            }
            None => Effects::none(),
        }
    }

    pub(super) fn eraser_down(
        &mut self,
        world: Point,
        time: f64,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let width = ctx.config.eraser_radius * 2.0 / ctx.camera.zoom;
        let mut erased_at = HashMap::new();
        let effects = erase_at(world, time, &mut erased_at, ctx);
        self.state = ToolState::Erasing {
            trail: Stroke::new(StrokeTool::Erase, world, ctx.config.brush_color, width),
            erased_at,
        };
        effects
    }

    pub(super) fn eraser_move(
        &mut self,
        world: Point,
        time: f64,
        ctx: &mut ToolContext<'_>,
    ) -> Effects {
        let ToolState::Erasing { trail, erased_at } = &mut self.state else {
            return Effects::none();
        };
        trail.push_point(world);
        erase_at(world, time, erased_at, ctx)
    }
}

/// Remove every brush stroke within the eraser threshold of `world`, recording
/// one delete command per stroke. Strokes erased less than the cool-down ago in
/// this gesture are skipped; one can reappear mid-gesture when an undo lands
/// while the eraser is still held.
fn erase_at(
    world: Point,
    time: f64,
    erased_at: &mut HashMap<ElementId, f64>,
    ctx: &mut ToolContext<'_>,
) -> Effects {
    let threshold = ctx.world_radius(ctx.config.eraser_radius);
    let cooldown = ctx.config.eraser_cooldown_ms;
    let mut hits = ctx.store.strokes_near(world, threshold);
    hits.retain(|&index| {
        let id = ctx.store.strokes()[index].id();
        erased_at
            .get(&id)
            .is_none_or(|&erased| time - erased >= cooldown)
    });
    if hits.is_empty() {
        return Effects::none();
    }
    // Highest index first so earlier indices stay valid.
    for &index in hits.iter().rev() {
        if let Some(stroke) = ctx.store.remove_stroke(index) {
            log::debug!("Erased stroke {} at index {index}", stroke.id());
            erased_at.insert(stroke.id(), time);
            ctx.history.record(Command::DeleteStroke { index, stroke });
        }
    }
    Effects::content()
}
