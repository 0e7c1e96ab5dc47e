//! Single hand tracking from a skin-colored contour.
//!
//! Each frame is segmented into a skin mask, the largest contour of the mask
//! is reduced to its convex hull and convexity defects, and a [`HandModel`] is
//! derived from that geometry: the palm center and radius from the defect
//! depth points, the fingertips from local maxima of the distance to the palm
//! center along the contour.
//!
//! Image processing itself sits behind the [`Vision`] trait. An OpenCV
//! implementation is available with the `opencv` feature.

pub mod config;
pub mod defect;
pub mod error;
pub mod fingers;
pub mod geometry;
pub mod hand;
pub mod pipeline;
pub mod report;
pub mod vision;

#[cfg(feature = "opencv")]
pub mod backend;

mod slots;

pub use config::TrackerConfig;
pub use defect::{ConvexityDefect, HandShape};
pub use error::Error;
pub use fingers::FingertipDetector;
pub use geometry::Point;
pub use hand::{HandModel, HandReport};
pub use pipeline::{Pipeline, RunStats};
pub use report::ReportWriter;
pub use slots::Slots;
pub use vision::{FrameSink, FrameSource, StopFlag, StopSignal, Vision};

/// Fingers of an open hand, the overlay is only drawn for exactly this many.
pub const NUM_FINGERS: usize = 5;

/// Fingertip storage, one spare slot so that six candidates can be told
/// apart from five.
pub const MAX_FINGERS: usize = NUM_FINGERS + 1;

/// Defect depth points kept per frame.
pub const MAX_DEFECTS: usize = 8;
