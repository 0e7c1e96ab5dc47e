use nalgebra as na;

/// Pixel coordinate in image space, `y` grows towards the bottom of the frame.
pub type Point = na::Point2<i32>;

#[inline]
pub fn squared_distance(a: Point, b: Point) -> i32 {
    let d = a - b;
    d.dot(&d)
}

/// Integer square root truncated towards zero.
///
/// Radius accumulation relies on truncation, rounding would grow the overlay
/// circle by up to a pixel per sample.
#[inline]
pub fn truncating_sqrt(d: i32) -> i32 {
    if d <= 0 {
        return 0;
    }

    (d as f64).sqrt() as i32
}

#[inline(always)]
pub fn is_origin(p: Point) -> bool {
    p.x == 0 && p.y == 0
}
