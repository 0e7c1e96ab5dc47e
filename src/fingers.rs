use crate::geometry::{self, Point};
use crate::slots::Slots;
use crate::MAX_FINGERS;

pub const DEFAULT_BOTTOM_MARGIN: i32 = 10;

/// Fingertips are the contour points locally farthest from the palm center.
///
/// The scan walks the contour once, front to back, with a two sample lookback
/// over the squared distance to the center. It does not wrap around, so a peak
/// sitting on the last contour point is never reported while the very first
/// point can be.
#[derive(Debug, Clone, Copy)]
pub struct FingertipDetector {
    /// Candidates closer than this to the bottom edge belong to the wrist.
    pub bottom_margin: i32,
}

impl Default for FingertipDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BOTTOM_MARGIN)
    }
}

impl FingertipDetector {
    pub fn new(bottom_margin: i32) -> Self {
        Self { bottom_margin }
    }

    /// Fills `fingers` with the accepted candidates and returns their count.
    pub fn detect(
        &self,
        contour: &[Point],
        center: Point,
        frame_height: i32,
        fingers: &mut Slots<Point, MAX_FINGERS>,
    ) -> usize {
        let floor = frame_height - self.bottom_margin;

        let mut dist_prev = 0;
        let mut dist_prev2 = 0;
        let mut candidate = Point::origin();

        fingers.reset();

        for &p in contour {
            let dist_now = geometry::squared_distance(center, p);

            if dist_now < dist_prev
                && dist_prev > dist_prev2
                && !geometry::is_origin(candidate)
                && candidate.y < floor
            {
                let _ = fingers.push(candidate);

                if fingers.is_full() {
                    break;
                }
            }

            dist_prev2 = dist_prev;
            dist_prev = dist_now;
            candidate = p;
        }

        fingers.len()
    }
}
