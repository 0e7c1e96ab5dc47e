use ::opencv::{
    core::{self, Mat, Scalar, Size, Vector},
    highgui, imgproc,
    prelude::*,
    videoio,
};
use std::path::Path;

use crate::config::{SkinRange, TrackerConfig};
use crate::defect::ConvexityDefect;
use crate::error::Error;
use crate::geometry::Point;
use crate::hand::HandModel;
use crate::vision::{FrameSink, FrameSource, StopSignal, Vision};

const OUTPUT_WINDOW: &str = "output";
const MASK_WINDOW: &str = "thresholded";

impl From<::opencv::Error> for Error {
    fn from(err: ::opencv::Error) -> Self {
        Error::Vision(err.to_string())
    }
}

// BGR
const RED: (f64, f64, f64) = (0.0, 0.0, 255.0);
const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);
const YELLOW: (f64, f64, f64) = (0.0, 255.0, 255.0);
const PURPLE: (f64, f64, f64) = (255.0, 0.0, 255.0);
const GREY: (f64, f64, f64) = (200.0, 200.0, 200.0);

#[inline]
fn color(c: (f64, f64, f64)) -> Scalar {
    Scalar::new(c.0, c.1, c.2, 0.0)
}

#[inline]
fn cv_point(p: Point) -> core::Point {
    core::Point::new(p.x, p.y)
}

/// Skin segmentation and contour geometry on top of OpenCV.
pub struct OpenCvVision {
    skin: SkinRange,
    approx_tolerance: f64,
    kernel: Mat,
    blurred: Mat,
    hsv: Mat,
    contours: Vector<Vector<core::Point>>,
}

impl OpenCvVision {
    pub fn new(config: &TrackerConfig) -> Result<Self, Error> {
        let k = config.kernel_size;
        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(k, k),
            core::Point::new(k / 2, k / 2),
        )?;

        Ok(Self {
            skin: config.skin,
            approx_tolerance: config.approx_tolerance,
            kernel,
            blurred: Mat::default(),
            hsv: Mat::default(),
            contours: Vector::new(),
        })
    }
}

impl Vision for OpenCvVision {
    type Image = Mat;
    type Mask = Mat;

    fn frame_size(&self, image: &Mat) -> (i32, i32) {
        (image.cols(), image.rows())
    }

    fn segment(&mut self, image: &Mat) -> Result<Mat, Error> {
        imgproc::gaussian_blur(
            image,
            &mut self.blurred,
            Size::new(11, 11),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;

        // impulsive noise
        let mut smooth = Mat::default();
        imgproc::median_blur(&self.blurred, &mut smooth, 11)?;

        imgproc::cvt_color(&smooth, &mut self.hsv, imgproc::COLOR_BGR2HSV, 0)?;

        let [hl, sl, vl] = self.skin.lower;
        let [hu, su, vu] = self.skin.upper;
        let mut mask = Mat::default();
        core::in_range(
            &self.hsv,
            &Scalar::new(hl, sl, vl, 0.0),
            &Scalar::new(hu, su, vu, 255.0),
            &mut mask,
        )?;

        let mut opened = Mat::default();
        imgproc::morphology_ex(
            &mask,
            &mut opened,
            imgproc::MORPH_OPEN,
            &self.kernel,
            core::Point::new(-1, -1),
            1,
            core::BORDER_CONSTANT,
            imgproc::morphology_default_border_value()?,
        )?;

        imgproc::gaussian_blur(
            &opened,
            &mut mask,
            Size::new(3, 3),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )?;

        Ok(mask)
    }

    fn largest_contour(&mut self, mask: &Mat, contour: &mut Vec<Point>) -> Result<bool, Error> {
        contour.clear();
        self.contours.clear();

        imgproc::find_contours(
            mask,
            &mut self.contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            core::Point::new(0, 0),
        )?;

        let mut best = None;
        let mut max_area = 0.0;

        for (idx, candidate) in self.contours.iter().enumerate() {
            let area = imgproc::contour_area(&candidate, false)?.abs();
            if area > max_area {
                max_area = area;
                best = Some(idx);
            }
        }

        let idx = match best {
            Some(idx) => idx,
            None => return Ok(false),
        };

        let mut approx = Vector::<core::Point>::new();
        imgproc::approx_poly_dp(
            &self.contours.get(idx)?,
            &mut approx,
            self.approx_tolerance,
            true,
        )?;

        contour.extend(approx.iter().map(|p| Point::new(p.x, p.y)));

        Ok(true)
    }

    fn convex_hull(&mut self, contour: &[Point], hull: &mut Vec<usize>) -> Result<(), Error> {
        hull.clear();

        let points: Vector<core::Point> = contour.iter().copied().map(cv_point).collect();
        let mut indices = Vector::<i32>::new();
        imgproc::convex_hull(&points, &mut indices, true, false)?;

        hull.extend(indices.iter().map(|i| i as usize));

        Ok(())
    }

    fn convexity_defects(
        &mut self,
        contour: &[Point],
        hull: &[usize],
        defects: &mut Vec<ConvexityDefect>,
    ) -> Result<(), Error> {
        defects.clear();

        if hull.len() < 3 {
            return Ok(());
        }

        let points: Vector<core::Point> = contour.iter().copied().map(cv_point).collect();
        let indices: Vector<i32> = hull.iter().map(|&i| i as i32).collect();
        let mut raw = Vector::<core::Vec4i>::new();

        // self-intersecting polylines make OpenCV reject the hull, that frame
        // simply has no defects
        if let Err(err) = imgproc::convexity_defects(&points, &indices, &mut raw) {
            tracing::warn!(%err, "convexity defects unavailable");
            return Ok(());
        }

        for d in raw.iter() {
            let [start, end, far, depth] = d.0;
            let at = |i: i32| contour.get(i as usize).copied();

            if let (Some(start), Some(end), Some(far)) = (at(start), at(end), at(far)) {
                defects.push(ConvexityDefect::new(start, end, far, depth as f32 / 256.0));
            }
        }

        Ok(())
    }
}

/// Camera or video file input.
pub struct Camera {
    cam: videoio::VideoCapture,
    from_file: bool,
}

impl Camera {
    pub fn open(config: &TrackerConfig) -> Result<Self, Error> {
        let capture_err = |err: ::opencv::Error| Error::Capture(err.to_string());

        let (cam, from_file) = match &config.input {
            Some(path) => {
                let name = path.to_string_lossy();
                let cam = videoio::VideoCapture::from_file(&name, videoio::CAP_ANY)
                    .map_err(capture_err)?;
                (cam, true)
            }
            None => {
                let cam = videoio::VideoCapture::new(config.camera, videoio::CAP_ANY)
                    .map_err(capture_err)?;
                (cam, false)
            }
        };

        if !cam.is_opened().map_err(capture_err)? {
            return Err(Error::Capture(match &config.input {
                Some(path) => format!("unable to open {}", path.display()),
                None => format!("unable to open camera {}", config.camera),
            }));
        }

        Ok(Self { cam, from_file })
    }

    /// Reported frame rate, `None` when the device does not know it.
    pub fn fps(&mut self) -> Result<Option<f64>, Error> {
        let fps = self.cam.get(videoio::CAP_PROP_FPS)?;

        Ok(if fps > 0.0 { Some(fps) } else { None })
    }

    pub fn size(&mut self) -> Result<(i32, i32), Error> {
        let width = self.cam.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = self.cam.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        Ok((width, height))
    }
}

impl FrameSource for Camera {
    type Image = Mat;

    fn next_frame(&mut self) -> Result<Option<Mat>, Error> {
        let mut frame = Mat::default();
        let grabbed = self
            .cam
            .read(&mut frame)
            .map_err(|err| Error::Capture(err.to_string()))?;

        if grabbed && frame.cols() > 0 && frame.rows() > 0 {
            return Ok(Some(frame));
        }

        if self.from_file {
            Ok(None)
        } else {
            Err(Error::Capture("camera stopped delivering frames".into()))
        }
    }
}

/// Draws the hand overlay, shows the windows and records every frame.
pub struct Display {
    writer: videoio::VideoWriter,
    show_windows: bool,
}

impl Display {
    pub fn open<P: AsRef<Path>>(
        output: P,
        fps: f64,
        size: (i32, i32),
        show_windows: bool,
    ) -> Result<Self, Error> {
        let recording_err = |err: ::opencv::Error| Error::Recording(err.to_string());

        let name = output.as_ref().to_string_lossy();
        let writer = videoio::VideoWriter::new(
            &name,
            videoio::VideoWriter::fourcc(b'M' as _, b'J' as _, b'P' as _, b'G' as _)?,
            fps,
            Size::new(size.0, size.1),
            true,
        )
        .map_err(recording_err)?;

        if !writer.is_opened().map_err(recording_err)? {
            return Err(Error::Recording(format!("unable to write {}", name)));
        }

        if show_windows {
            highgui::named_window(OUTPUT_WINDOW, highgui::WINDOW_AUTOSIZE)?;
            highgui::named_window(MASK_WINDOW, highgui::WINDOW_AUTOSIZE)?;
            highgui::move_window(OUTPUT_WINDOW, 50, 50)?;
            highgui::move_window(MASK_WINDOW, 700, 50)?;
        }

        Ok(Self {
            writer,
            show_windows,
        })
    }

    pub fn release(&mut self) -> Result<(), Error> {
        self.writer.release()?;

        Ok(())
    }
}

fn draw_hand(frame: &mut Mat, hand: &HandModel) -> ::opencv::Result<()> {
    let center = cv_point(hand.center());

    imgproc::circle(frame, center, 5, color(PURPLE), 1, imgproc::LINE_AA, 0)?;
    imgproc::circle(frame, center, hand.radius(), color(RED), 1, imgproc::LINE_AA, 0)?;

    for &tip in hand.fingers() {
        imgproc::circle(frame, cv_point(tip), 10, color(GREEN), 3, imgproc::LINE_AA, 0)?;
        imgproc::line(frame, center, cv_point(tip), color(YELLOW), 1, imgproc::LINE_AA, 0)?;
    }

    for &depth in hand.defects() {
        imgproc::circle(frame, cv_point(depth), 2, color(GREY), 2, imgproc::LINE_AA, 0)?;
    }

    Ok(())
}

impl FrameSink for Display {
    type Image = Mat;
    type Mask = Mat;

    fn emit(&mut self, image: &mut Mat, mask: &Mat, hand: Option<&HandModel>) -> Result<(), Error> {
        if let Some(hand) = hand {
            draw_hand(image, hand)?;
        }

        if self.show_windows {
            highgui::imshow(OUTPUT_WINDOW, &*image)?;
            highgui::imshow(MASK_WINDOW, mask)?;
        }

        self.writer
            .write(&*image)
            .map_err(|err| Error::Recording(err.to_string()))?;

        Ok(())
    }
}

/// Stops when `key` is pressed in one of the windows.
///
/// Also pumps the HighGUI event loop, without it the windows never refresh.
pub struct KeyPress {
    key: char,
    enabled: bool,
}

impl KeyPress {
    pub fn new(key: char, enabled: bool) -> Self {
        Self { key, enabled }
    }
}

impl StopSignal for KeyPress {
    fn should_stop(&mut self) -> bool {
        if !self.enabled {
            return false;
        }

        match highgui::wait_key(1) {
            Ok(code) => code == self.key as i32,
            Err(err) => {
                tracing::warn!(%err, "key polling failed");
                false
            }
        }
    }
}
