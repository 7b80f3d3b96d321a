//! Connector geometry: side anchors and orthogonal routing.
//!
//! Everything here is a pure function over kurbo primitives. Anchors are the
//! single source of truth for both live connector endpoints and the anchor-click
//! affordances drawn around selected elements.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default distance a route travels straight out of an anchor before turning.
pub const DEFAULT_PADDING: f64 = 20.0;

/// Consecutive points closer than this are merged.
const DUPLICATE_TOLERANCE: f64 = 1.0;

/// Maximum deviation of a middle point from its chord for the run to count as straight.
const COLLINEAR_TOLERANCE: f64 = 0.5;

/// One of the four sides of an element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Unit vector pointing away from the element.
    pub fn direction(self) -> Vec2 {
        match self {
            Side::Top => Vec2::new(0.0, -1.0),
            Side::Right => Vec2::new(1.0, 0.0),
            Side::Bottom => Vec2::new(0.0, 1.0),
            Side::Left => Vec2::new(-1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// True for left/right anchors, whose stubs travel along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Side facing from `from` towards `to` along the dominant axis.
    pub fn facing(from: Point, to: Point) -> Side {
        let d = to - from;
        if d.x.abs() >= d.y.abs() {
            if d.x >= 0.0 { Side::Right } else { Side::Left }
        } else if d.y >= 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }
}

/// Midpoint of the given side of `rect`.
pub fn anchor_point(rect: Rect, side: Side) -> Point {
    let center = rect.center();
    match side {
        Side::Top => Point::new(center.x, rect.y0),
        Side::Right => Point::new(rect.x1, center.y),
        Side::Bottom => Point::new(center.x, rect.y1),
        Side::Left => Point::new(rect.x0, center.y),
    }
}

/// All four anchors in `Side::ALL` order.
pub fn anchor_points(rect: Rect) -> [(Side, Point); 4] {
    Side::ALL.map(|side| (side, anchor_point(rect, side)))
}

/// Anchor of `rect` closest to `point`, compared by squared distance.
pub fn nearest_anchor(rect: Rect, point: Point) -> (Side, Point) {
    let mut best = (Side::Top, anchor_point(rect, Side::Top));
    let mut best_dist = f64::INFINITY;
    for (side, anchor) in anchor_points(rect) {
        let dist = (anchor - point).hypot2();
        if dist < best_dist {
            best_dist = dist;
            best = (side, anchor);
        }
    }
    best
}

/// Point `padding` away from `point` in the direction the side faces.
pub fn stub_point(point: Point, side: Side, padding: f64) -> Point {
    point + side.direction() * padding
}

/// Orthogonal path from an anchor on `from_side` to an anchor on `to_side`.
///
/// The returned polyline starts at `from`, ends at `to`, and every segment is
/// axis-aligned. The first and last segments are perpendicular to their host edges.
pub fn orthogonal_route(
    from: Point,
    from_side: Side,
    to: Point,
    to_side: Side,
    padding: f64,
) -> Vec<Point> {
    let s1 = stub_point(from, from_side, padding);
    let s2 = stub_point(to, to_side, padding);

    let mut points = vec![from, s1];
    match (from_side.is_horizontal(), to_side.is_horizontal()) {
        (true, true) => {
            if from_side == to_side {
                // U: both leave in the same direction, wrap around the outermost stub.
                let x = if from_side == Side::Right {
                    s1.x.max(s2.x)
                } else {
                    s1.x.min(s2.x)
                };
                points.push(Point::new(x, s1.y));
                points.push(Point::new(x, s2.y));
            } else {
                let mid_x = (s1.x + s2.x) / 2.0;
                points.push(Point::new(mid_x, s1.y));
                points.push(Point::new(mid_x, s2.y));
            }
        }
        (false, false) => {
            if from_side == to_side {
                let y = if from_side == Side::Bottom {
                    s1.y.max(s2.y)
                } else {
                    s1.y.min(s2.y)
                };
                points.push(Point::new(s1.x, y));
                points.push(Point::new(s2.x, y));
            } else {
                let mid_y = (s1.y + s2.y) / 2.0;
                points.push(Point::new(s1.x, mid_y));
                points.push(Point::new(s2.x, mid_y));
            }
        }
        (true, false) => points.push(Point::new(s2.x, s1.y)),
        (false, true) => points.push(Point::new(s1.x, s2.y)),
    }
    points.push(s2);
    points.push(to);

    simplify_path(&points)
}

/// Route between two endpoints where either side may be unknown (a free endpoint).
/// A missing side is inferred from the dominant axis towards the other endpoint.
pub fn route_between(
    from: Point,
    from_side: Option<Side>,
    to: Point,
    to_side: Option<Side>,
    padding: f64,
) -> Vec<Point> {
    let from_side = from_side.unwrap_or_else(|| Side::facing(from, to));
    let to_side = to_side.unwrap_or_else(|| Side::facing(to, from));
    orthogonal_route(from, from_side, to, to_side, padding)
}

fn is_near(a: Point, b: Point) -> bool {
    (b - a).hypot() < DUPLICATE_TOLERANCE
}

/// Whether `b` lies on the chord `a`→`c` within tolerance. A point outside the
/// chord's span (a spike that doubles back) is never collinear.
fn is_collinear(a: Point, b: Point, c: Point) -> bool {
    let chord = c - a;
    let len = chord.hypot();
    if len < DUPLICATE_TOLERANCE {
        return false;
    }
    let offset = b - a;
    let along = offset.dot(chord) / len;
    if along < -COLLINEAR_TOLERANCE || along > len + COLLINEAR_TOLERANCE {
        return false;
    }
    chord.cross(offset).abs() / len <= COLLINEAR_TOLERANCE
}

/// Drop near-duplicate consecutive points and collapse near-collinear runs.
///
/// Both endpoints are kept exactly. Running the simplifier on its own output is a no-op.
pub fn simplify_path(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for (i, &p) in points.iter().enumerate() {
        let is_last = i + 1 == points.len();
        if !is_last && out.last().is_some_and(|&last| is_near(last, p)) {
            continue;
        }
        loop {
            let n = out.len();
            if n >= 2 && is_collinear(out[n - 2], out[n - 1], p) {
                out.pop();
            } else if is_last && n >= 2 && is_near(out[n - 1], p) {
                out.pop();
            } else {
                break;
            }
        }
        if !is_last && out.last().is_some_and(|&last| is_near(last, p)) {
            continue;
        }
        out.push(p);
    }
    out
}

/// Total length of a polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).hypot()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < f64::EPSILON && (p.y - y).abs() < f64::EPSILON,
            "expected ({x}, {y}), got {p:?}"
        );
    }

    fn assert_orthogonal(points: &[Point]) {
        for w in points.windows(2) {
            let d = w[1] - w[0];
            assert!(
                d.x.abs() < 1e-9 || d.y.abs() < 1e-9,
                "segment {:?} -> {:?} is not axis-aligned",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn test_anchor_points() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_point(anchor_point(rect, Side::Top), 60.0, 20.0);
        assert_point(anchor_point(rect, Side::Right), 110.0, 45.0);
        assert_point(anchor_point(rect, Side::Bottom), 60.0, 70.0);
        assert_point(anchor_point(rect, Side::Left), 10.0, 45.0);
    }

    #[test]
    fn test_nearest_anchor() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(nearest_anchor(rect, Point::new(95.0, 40.0)).0, Side::Right);
        assert_eq!(nearest_anchor(rect, Point::new(50.0, 2.0)).0, Side::Top);
        assert_eq!(nearest_anchor(rect, Point::new(3.0, 60.0)).0, Side::Left);
        assert_eq!(nearest_anchor(rect, Point::new(45.0, 99.0)).0, Side::Bottom);
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert!(Side::Left.is_horizontal());
        assert!(!Side::Bottom.is_horizontal());
        assert_eq!(Side::facing(Point::ZERO, Point::new(10.0, 3.0)), Side::Right);
        assert_eq!(Side::facing(Point::ZERO, Point::new(1.0, -30.0)), Side::Top);
    }

    #[test]
    fn test_z_route() {
        let path = orthogonal_route(
            Point::new(0.0, 0.0),
            Side::Right,
            Point::new(200.0, 100.0),
            Side::Left,
            20.0,
        );
        assert_orthogonal(&path);
        assert_eq!(path.len(), 4);
        assert_point(path[0], 0.0, 0.0);
        assert_point(path[1], 100.0, 0.0);
        assert_point(path[2], 100.0, 100.0);
        assert_point(path[3], 200.0, 100.0);
    }

    #[test]
    fn test_straight_route_collapses() {
        let path = orthogonal_route(
            Point::new(0.0, 50.0),
            Side::Right,
            Point::new(200.0, 50.0),
            Side::Left,
            20.0,
        );
        assert_eq!(path.len(), 2);
        assert_point(path[1], 200.0, 50.0);
    }

    #[test]
    fn test_l_route() {
        let path = orthogonal_route(
            Point::new(0.0, 0.0),
            Side::Right,
            Point::new(200.0, 200.0),
            Side::Top,
            20.0,
        );
        assert_orthogonal(&path);
        assert_eq!(path.len(), 3);
        assert_point(path[1], 200.0, 0.0);
    }

    #[test]
    fn test_u_route() {
        let path = orthogonal_route(
            Point::new(0.0, 0.0),
            Side::Top,
            Point::new(100.0, 50.0),
            Side::Top,
            20.0,
        );
        assert_orthogonal(&path);
        // Both stubs leave upwards; the path wraps above the higher one.
        assert!(path.iter().any(|p| (p.y - -20.0).abs() < f64::EPSILON));
        assert_point(*path.last().unwrap(), 100.0, 50.0);
    }

    #[test]
    fn test_route_starts_perpendicular() {
        let path = orthogonal_route(
            Point::new(50.0, 0.0),
            Side::Top,
            Point::new(300.0, 120.0),
            Side::Left,
            20.0,
        );
        assert_orthogonal(&path);
        let first = path[1] - path[0];
        assert!(first.x.abs() < 1e-9 && first.y < 0.0);
        let n = path.len();
        let last = path[n - 1] - path[n - 2];
        assert!(last.y.abs() < 1e-9 && last.x > 0.0);
    }

    #[test]
    fn test_simplify_drops_duplicates_and_collinear() {
        let raw = vec![
            Point::new(0.0, 0.0),
            Point::new(0.3, 0.0),
            Point::new(50.0, 0.2),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let simplified = simplify_path(&raw);
        assert_eq!(simplified.len(), 3);
        assert_point(simplified[1], 100.0, 0.0);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let raw = vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 0.0000001),
            Point::new(60.0, 0.3),
            Point::new(60.0, 80.0),
            Point::new(60.4, 120.0),
            Point::new(140.0, 120.0),
            Point::new(139.5, 120.2),
            Point::new(200.0, 120.0),
        ];
        let once = simplify_path(&raw);
        let twice = simplify_path(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_route_between_infers_free_sides() {
        let path = route_between(
            Point::new(0.0, 0.0),
            Some(Side::Right),
            Point::new(300.0, 10.0),
            None,
            20.0,
        );
        assert_orthogonal(&path);
        assert_point(*path.last().unwrap(), 300.0, 10.0);
    }

    #[test]
    fn test_path_length() {
        let points = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)];
        assert!((path_length(&points) - 7.0).abs() < f64::EPSILON);
    }
}
