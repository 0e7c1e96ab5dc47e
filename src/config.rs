use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::fingers::DEFAULT_BOTTOM_MARGIN;

/// HSV window a pixel must fall into to count as skin. OpenCV ranges:
/// hue in `0..=180`, saturation and value in `0..=255`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SkinRange {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl Default for SkinRange {
    fn default() -> Self {
        Self {
            lower: [0.0, 55.0, 90.0],
            upper: [28.0, 175.0, 230.0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Fingertip candidates this close to the bottom edge are dropped.
    pub bottom_margin: i32,
    /// Polyline approximation tolerance applied to the hand contour, in px.
    pub approx_tolerance: f64,
    pub skin: SkinRange,
    /// Side of the square kernel used for morphological opening.
    pub kernel_size: i32,
    pub camera: i32,
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    /// Recording rate used when the capture device does not report one.
    pub fallback_fps: f64,
    pub show_windows: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
            approx_tolerance: 2.0,
            skin: SkinRange::default(),
            kernel_size: 9,
            camera: 0,
            input: None,
            output: PathBuf::from("video.avi"),
            fallback_fps: 10.0,
            show_windows: true,
        }
    }
}

impl TrackerConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;

        Self::from_toml_str(&src)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.approx_tolerance > 0.0) {
            return Err(Error::Config(format!(
                "approx_tolerance must be positive, got {}",
                self.approx_tolerance
            )));
        }

        if self.kernel_size < 1 {
            return Err(Error::Config(format!(
                "kernel_size must be at least 1, got {}",
                self.kernel_size
            )));
        }

        if self.bottom_margin < 0 {
            return Err(Error::Config(format!(
                "bottom_margin must not be negative, got {}",
                self.bottom_margin
            )));
        }

        if !(self.fallback_fps > 0.0) {
            return Err(Error::Config(format!(
                "fallback_fps must be positive, got {}",
                self.fallback_fps
            )));
        }

        for (i, (lo, hi)) in self.skin.lower.iter().zip(&self.skin.upper).enumerate() {
            if lo > hi {
                return Err(Error::Config(format!(
                    "skin range channel {} is inverted: {} > {}",
                    i, lo, hi
                )));
            }
        }

        Ok(())
    }
}
