use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::defect::ConvexityDefect;
use crate::error::Error;
use crate::geometry::Point;
use crate::hand::HandModel;

/// Image processing primitives the hand model is derived from.
///
/// Output buffers are handed in by the caller and reused across frames, an
/// implementation must clear them before writing.
pub trait Vision {
    type Image;
    type Mask;

    /// (width, height) in px
    fn frame_size(&self, image: &Self::Image) -> (i32, i32);

    /// Binary skin mask of `image`.
    fn segment(&mut self, image: &Self::Image) -> Result<Self::Mask, Error>;

    /// Largest-area external contour of `mask`, simplified to a polyline.
    /// Returns `false` when the mask holds no contour at all.
    fn largest_contour(&mut self, mask: &Self::Mask, contour: &mut Vec<Point>)
        -> Result<bool, Error>;

    /// Clockwise hull of `contour` as indices into it.
    fn convex_hull(&mut self, contour: &[Point], hull: &mut Vec<usize>) -> Result<(), Error>;

    fn convexity_defects(
        &mut self,
        contour: &[Point],
        hull: &[usize],
        defects: &mut Vec<ConvexityDefect>,
    ) -> Result<(), Error>;
}

pub trait FrameSource {
    type Image;

    /// Blocks until the next frame is available. `Ok(None)` ends the stream.
    fn next_frame(&mut self) -> Result<Option<Self::Image>, Error>;
}

/// Display and recording of processed frames.
pub trait FrameSink {
    type Image;
    type Mask;

    /// Called once per frame. `hand` is only set when the overlay should be
    /// drawn onto `image`.
    fn emit(
        &mut self,
        image: &mut Self::Image,
        mask: &Self::Mask,
        hand: Option<&HandModel>,
    ) -> Result<(), Error>;
}

/// Cooperative cancellation, polled once per frame.
pub trait StopSignal {
    fn should_stop(&mut self) -> bool;
}

impl<F: FnMut() -> bool> StopSignal for F {
    #[inline]
    fn should_stop(&mut self) -> bool {
        self()
    }
}

/// Shareable flag, e.g. flipped from a signal handler or another thread.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl StopSignal for StopFlag {
    #[inline]
    fn should_stop(&mut self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
