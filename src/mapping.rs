//! Coordinate mapping between frame space and the target device's native
//! pixel space.
//!
//! The captured frame is usually a resized or cropped view of the device
//! display, so a point found in frame space must be rescaled before it is
//! sent as an input event. The transform assumes uniform linear scaling with
//! no rotation and no residual crop offset beyond what the capture region
//! already removed; rotated or letterboxed captures are not supported.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rescale a frame-space point into target-space, rounding each axis.
///
/// Pure function with no failure mode; zero-sized source resolutions are a
/// configuration error rejected at startup and never reach here.
pub fn map_point(point: Point, source: Resolution, target: Resolution) -> Point {
    debug_assert!(source.width > 0 && source.height > 0);
    let x = (f64::from(point.x) * f64::from(target.width) / f64::from(source.width)).round();
    let y = (f64::from(point.y) * f64::from(target.height) / f64::from(source.height)).round();
    Point::new(x as u32, y as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_scaling_returns_input_exactly() {
        let res = Resolution::new(1280, 720);
        for point in [Point::new(0, 0), Point::new(17, 693), Point::new(1279, 719)] {
            assert_eq!(map_point(point, res, res), point);
        }
    }

    #[test]
    fn mapping_is_linear_from_the_origin() {
        let source = Resolution::new(640, 360);
        let target = Resolution::new(1280, 720);

        let once = map_point(Point::new(50, 70), source, target);
        let twice = map_point(Point::new(100, 140), source, target);
        assert_eq!((twice.x, twice.y), (once.x * 2, once.y * 2));
    }

    #[test]
    fn downscaled_frame_maps_to_native_coordinates() {
        // 640x360 frame over a 1280x720 device: scale 2x on both axes.
        let mapped = map_point(
            Point::new(125, 115),
            Resolution::new(640, 360),
            Resolution::new(1280, 720),
        );
        assert_eq!(mapped, Point::new(250, 230));
    }

    #[test]
    fn non_integer_scale_rounds_to_nearest() {
        // 545x970 capture window onto a 720x1280 portrait emulator.
        let mapped = map_point(
            Point::new(272, 485),
            Resolution::new(545, 970),
            Resolution::new(720, 1280),
        );
        assert_eq!(mapped, Point::new(359, 640));
    }
}
