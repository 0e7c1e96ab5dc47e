pub mod opencv;

pub use self::opencv::{Camera, Display, KeyPress, OpenCvVision};
