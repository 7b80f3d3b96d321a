//! Connectors: orthogonal lines whose geometry derives from their endpoints.

use super::{ElementId, ElementKind, ElementStyle, ElementTrait, point_to_polyline_dist};
use crate::routing::{self, Side};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Endpoint {
    /// Attached to the anchor of a host element. `point` mirrors the host's
    /// current anchor position and is refreshed whenever the host changes.
    Bound {
        element: ElementId,
        side: Side,
        point: Point,
    },
    /// A literal world position.
    Free { point: Point },
}

impl Endpoint {
    pub fn point(&self) -> Point {
        match *self {
            Endpoint::Bound { point, .. } | Endpoint::Free { point } => point,
        }
    }

    /// Host element, if bound.
    pub fn element(&self) -> Option<ElementId> {
        match *self {
            Endpoint::Bound { element, .. } => Some(element),
            Endpoint::Free { .. } => None,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match *self {
            Endpoint::Bound { side, .. } => Some(side),
            Endpoint::Free { .. } => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Endpoint::Bound { .. })
    }

    pub fn is_bound_to(&self, host: ElementId) -> bool {
        self.element() == Some(host)
    }

    /// Convert to a free endpoint frozen at the current point.
    pub fn freed(&self) -> Endpoint {
        Endpoint::Free {
            point: self.point(),
        }
    }
}

/// Which end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorEnd {
    From,
    To,
}

/// A connector between two endpoints. Never independently draggable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub(crate) id: ElementId,
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(default)]
    pub style: ElementStyle,
}

impl Connector {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            style: ElementStyle::default(),
        }
    }

    pub fn endpoint(&self, end: ConnectorEnd) -> &Endpoint {
        match end {
            ConnectorEnd::From => &self.from,
            ConnectorEnd::To => &self.to,
        }
    }

    pub fn endpoint_mut(&mut self, end: ConnectorEnd) -> &mut Endpoint {
        match end {
            ConnectorEnd::From => &mut self.from,
            ConnectorEnd::To => &mut self.to,
        }
    }

    /// Whether either end is bound to `host`.
    pub fn references(&self, host: ElementId) -> bool {
        self.from.is_bound_to(host) || self.to.is_bound_to(host)
    }

    /// Free every endpoint bound to `host`. Returns true if anything changed.
    pub fn sever(&mut self, host: ElementId) -> bool {
        let mut changed = false;
        for end in [&mut self.from, &mut self.to] {
            if end.is_bound_to(host) {
                *end = end.freed();
                changed = true;
            }
        }
        changed
    }

    /// Orthogonal path between the endpoints.
    pub fn route(&self, padding: f64) -> Vec<Point> {
        routing::route_between(
            self.from.point(),
            self.from.side(),
            self.to.point(),
            self.to.side(),
            padding,
        )
    }
}

impl ElementTrait for Connector {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Connector
    }

    fn bounds(&self) -> Rect {
        self.route(routing::DEFAULT_PADDING)
            .iter()
            .fold(None, |acc: Option<Rect>, &p| {
                Some(match acc {
                    Some(rect) => rect.union_pt(p),
                    None => Rect::from_points(p, p),
                })
            })
            .unwrap_or(Rect::ZERO)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let route = self.route(routing::DEFAULT_PADDING);
        point_to_polyline_dist(point, &route) <= tolerance + self.style.stroke_width / 2.0
    }

    /// Only free endpoints move; bound ends follow their hosts.
    fn translate(&mut self, delta: Vec2) {
        for end in [&mut self.from, &mut self.to] {
            if let Endpoint::Free { point } = end {
                *point += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(host: ElementId, side: Side, x: f64, y: f64) -> Endpoint {
        Endpoint::Bound {
            element: host,
            side,
            point: Point::new(x, y),
        }
    }

    #[test]
    fn test_sever() {
        let host = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut connector = Connector::new(
            bound(host, Side::Right, 100.0, 50.0),
            bound(other, Side::Left, 300.0, 50.0),
        );
        assert!(connector.references(host));
        assert!(connector.sever(host));
        assert_eq!(
            connector.from,
            Endpoint::Free {
                point: Point::new(100.0, 50.0)
            }
        );
        assert!(connector.to.is_bound());
        assert!(!connector.sever(host));
    }

    #[test]
    fn test_translate_moves_only_free_ends() {
        let host = Uuid::new_v4();
        let mut connector = Connector::new(
            bound(host, Side::Right, 0.0, 0.0),
            Endpoint::Free {
                point: Point::new(100.0, 0.0),
            },
        );
        connector.translate(Vec2::new(10.0, 10.0));
        assert_eq!(connector.from.point(), Point::new(0.0, 0.0));
        assert_eq!(connector.to.point(), Point::new(110.0, 10.0));
    }

    #[test]
    fn test_hit_test_on_route() {
        let connector = Connector::new(
            Endpoint::Free {
                point: Point::new(0.0, 0.0),
            },
            Endpoint::Free {
                point: Point::new(200.0, 0.0),
            },
        );
        assert!(connector.hit_test(Point::new(100.0, 2.0), 1.0));
        assert!(!connector.hit_test(Point::new(100.0, 20.0), 1.0));
        let bounds = connector.bounds();
        assert!((bounds.x1 - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_endpoint_serde_tag() {
        let json = serde_json::to_value(Endpoint::Free {
            point: Point::new(1.0, 2.0),
        })
        .unwrap();
        assert_eq!(json["type"], "free");
        assert_eq!(json["point"]["x"], 1.0);
    }
}
