use crate::geometry::{self, Point};
use crate::slots::Slots;
use crate::MAX_DEFECTS;

/// Deepest deviation of the contour from its hull between two hull vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvexityDefect {
    pub start: Point,
    pub end: Point,
    pub depth_point: Point,
    // in px
    pub depth: f32,
}

impl ConvexityDefect {
    #[inline]
    pub fn new(start: Point, end: Point, depth_point: Point, depth: f32) -> Self {
        Self {
            start,
            end,
            depth_point,
            depth,
        }
    }
}

/// Palm estimate derived from the defect depth points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandShape {
    pub center: Point,
    pub radius: i32,
}

/// Centroid of the depth points and mean truncated distance to it.
///
/// Every raw defect contributes to the centroid and the radius, but only the
/// first `MAX_DEFECTS` depth points are kept in `points`. An empty `defects`
/// list leaves `points` untouched and returns `None`: there is nothing to
/// refresh and the caller must keep treating its previous estimate as stale.
pub fn aggregate(
    defects: &[ConvexityDefect],
    points: &mut Slots<Point, MAX_DEFECTS>,
) -> Option<HandShape> {
    if defects.is_empty() {
        return None;
    }

    let n = defects.len() as i64;

    points.reset();
    for defect in defects.iter().take(MAX_DEFECTS) {
        // cannot fail, `take` keeps us within capacity
        let _ = points.push(defect.depth_point);
    }

    let (sx, sy) = defects.iter().fold((0i64, 0i64), |(sx, sy), d| {
        (sx + d.depth_point.x as i64, sy + d.depth_point.y as i64)
    });
    let center = Point::new((sx / n) as i32, (sy / n) as i32);

    let dist: i64 = defects
        .iter()
        .map(|d| geometry::truncating_sqrt(geometry::squared_distance(center, d.depth_point)) as i64)
        .sum();

    Some(HandShape {
        center,
        radius: (dist / n) as i32,
    })
}
