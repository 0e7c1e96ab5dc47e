use serde_derive::Serialize;
use std::io::Write;

use crate::config::TrackerConfig;
use crate::defect::ConvexityDefect;
use crate::error::Error;
use crate::fingers::FingertipDetector;
use crate::geometry::Point;
use crate::hand::HandModel;
use crate::report::ReportWriter;
use crate::vision::{FrameSink, FrameSource, StopSignal, Vision};

/// Contours with fewer points than this cannot describe a hand.
pub const MIN_CONTOUR_POINTS: usize = 3;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    /// frames that passed the overlay gate
    pub complete: u64,
}

/// Drives one frame at a time through segmentation, geometry and detection.
///
/// Scratch buffers live as long as the pipeline and are never shrunk.
pub struct Pipeline<V: Vision> {
    vision: V,
    detector: FingertipDetector,
    contour: Vec<Point>,
    hull: Vec<usize>,
    defects: Vec<ConvexityDefect>,
    hand: HandModel,
    reports: Option<ReportWriter<Box<dyn Write>>>,
    stats: RunStats,
}

impl<V: Vision> Pipeline<V> {
    pub fn new(vision: V, detector: FingertipDetector) -> Self {
        Self {
            vision,
            detector,
            contour: Vec::new(),
            hull: Vec::new(),
            defects: Vec::new(),
            hand: HandModel::new(),
            reports: None,
            stats: RunStats::default(),
        }
    }

    pub fn from_config(vision: V, config: &TrackerConfig) -> Self {
        Self::new(vision, FingertipDetector::new(config.bottom_margin))
    }

    pub fn with_reports<W: Write + 'static>(mut self, out: W) -> Self {
        self.reports = Some(ReportWriter::new(Box::new(out)));
        self
    }

    #[inline]
    pub fn hand(&self) -> &HandModel {
        &self.hand
    }

    #[inline]
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    #[inline]
    pub fn vision(&self) -> &V {
        &self.vision
    }

    /// The hand when this frame passed the overlay gate.
    #[inline]
    pub fn overlay(&self) -> Option<&HandModel> {
        if self.hand.is_complete() {
            Some(&self.hand)
        } else {
            None
        }
    }

    /// Runs detection on a single frame and returns its skin mask.
    ///
    /// A frame without a usable contour, or without defects, is a regular
    /// outcome: the hand model simply reports no fingers for it.
    pub fn process(&mut self, image: &V::Image) -> Result<V::Mask, Error> {
        let (_, height) = self.vision.frame_size(image);

        self.hand.begin_frame();
        let mask = self.vision.segment(image)?;

        let found = self.vision.largest_contour(&mask, &mut self.contour)?;
        if !found || self.contour.len() < MIN_CONTOUR_POINTS {
            tracing::trace!(points = self.contour.len(), "no usable contour");
            self.finish_frame()?;
            return Ok(mask);
        }

        self.vision.convex_hull(&self.contour, &mut self.hull)?;
        if self.hull.is_empty() {
            tracing::trace!("empty convex hull");
            self.finish_frame()?;
            return Ok(mask);
        }

        self.vision
            .convexity_defects(&self.contour, &self.hull, &mut self.defects)?;

        if self.hand.update_from_defects(&self.defects) {
            self.hand
                .update_fingers(&self.detector, &self.contour, height);
        }

        tracing::debug!(
            frame = self.stats.frames,
            contour = self.contour.len(),
            hull = self.hull.len(),
            defects = self.defects.len(),
            fingers = self.hand.num_fingers(),
            "frame processed"
        );

        self.finish_frame()?;

        Ok(mask)
    }

    fn finish_frame(&mut self) -> Result<(), Error> {
        if let Some(reports) = self.reports.as_mut() {
            reports.write(&self.hand.report(self.stats.frames))?;
        }

        self.stats.frames += 1;
        if self.hand.is_complete() {
            self.stats.complete += 1;
        }

        Ok(())
    }

    /// Processes frames until the source runs dry or `stop` fires.
    ///
    /// `stop` is polled once per frame, after the frame has been emitted.
    pub fn run<S, K, Q>(&mut self, source: &mut S, sink: &mut K, stop: &mut Q) -> Result<RunStats, Error>
    where
        S: FrameSource<Image = V::Image>,
        K: FrameSink<Image = V::Image, Mask = V::Mask>,
        Q: StopSignal,
    {
        tracing::info!("hand tracking started");

        loop {
            let mut image = match source.next_frame()? {
                Some(image) => image,
                None => {
                    tracing::info!("end of stream");
                    break;
                }
            };

            let mask = self.process(&image)?;
            sink.emit(&mut image, &mask, self.overlay())?;

            if stop.should_stop() {
                tracing::info!("stop requested");
                break;
            }
        }

        if let Some(reports) = self.reports.as_mut() {
            reports.flush()?;
        }

        tracing::info!(
            frames = self.stats.frames,
            complete = self.stats.complete,
            "hand tracking finished"
        );

        Ok(self.stats)
    }
}
