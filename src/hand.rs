use serde_derive::{Deserialize, Serialize};

use crate::defect::{self, ConvexityDefect};
use crate::fingers::FingertipDetector;
use crate::geometry::Point;
use crate::slots::Slots;
use crate::{MAX_DEFECTS, MAX_FINGERS, NUM_FINGERS};

/// Per-frame hand estimate.
///
/// Storage is reused from frame to frame. Center and radius are only
/// refreshed when the frame produced at least one convexity defect, otherwise
/// they keep the last computed value and `is_fresh` reports `false`.
#[derive(Debug, Clone)]
pub struct HandModel {
    center: Point,
    radius: i32,
    fingers: Slots<Point, MAX_FINGERS>,
    defects: Slots<Point, MAX_DEFECTS>,
    fresh: bool,
}

impl Default for HandModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HandModel {
    pub fn new() -> Self {
        Self {
            center: Point::origin(),
            radius: 0,
            fingers: Slots::new(Point::origin()),
            defects: Slots::new(Point::origin()),
            fresh: false,
        }
    }

    /// Starts a new frame: nothing found yet, nothing refreshed.
    ///
    /// Center and radius stay as they were, only the counts are dropped.
    pub fn begin_frame(&mut self) {
        self.fingers.reset();
        self.fresh = false;
    }

    /// Refreshes center, radius and defect points. Returns `false` and keeps
    /// the previous values when `defects` is empty.
    pub fn update_from_defects(&mut self, defects: &[ConvexityDefect]) -> bool {
        match defect::aggregate(defects, &mut self.defects) {
            Some(shape) => {
                self.center = shape.center;
                self.radius = shape.radius;
                self.fresh = true;
                true
            }
            None => false,
        }
    }

    pub fn update_fingers(
        &mut self,
        detector: &FingertipDetector,
        contour: &[Point],
        frame_height: i32,
    ) -> usize {
        detector.detect(contour, self.center, frame_height, &mut self.fingers)
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[inline]
    pub fn fingers(&self) -> &[Point] {
        self.fingers.as_slice()
    }

    #[inline]
    pub fn num_fingers(&self) -> usize {
        self.fingers.len()
    }

    #[inline]
    pub fn defects(&self) -> &[Point] {
        self.defects.as_slice()
    }

    #[inline]
    pub fn num_defects(&self) -> usize {
        self.defects.len()
    }

    /// Whether center and radius were computed from this frame's defects.
    #[inline]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Overlay gate: exactly one finger per slot of an open hand.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.fingers.len() == NUM_FINGERS
    }

    pub fn report(&self, frame: u64) -> HandReport {
        let xy = |p: &Point| [p.x, p.y];

        HandReport {
            frame,
            center: self.fresh.then(|| xy(&self.center)),
            radius: self.fresh.then(|| self.radius),
            fingers: self.fingers.iter().map(xy).collect(),
            defects: if self.fresh {
                self.defects.iter().map(xy).collect()
            } else {
                Vec::new()
            },
            complete: self.is_complete(),
        }
    }
}

/// Serializable snapshot of one processed frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandReport {
    pub frame: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub center: Option<[i32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub radius: Option<i32>,
    pub fingers: Vec<[i32; 2]>,
    pub defects: Vec<[i32; 2]>,
    pub complete: bool,
}
