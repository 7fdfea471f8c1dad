//! Centered region of interest

use opencv::core::{Point, Rect};

/// Rectangle centered on the frame that candidates must fall inside.
///
/// Bounds are inclusive on both axes. Fractions outside `(0, 1]` are used
/// as given, producing an oversized or degenerate region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOfInterest {
    /// Top-left corner
    pub min: Point,
    /// Bottom-right corner
    pub max: Point,
}

impl RegionOfInterest {
    /// Compute the region for a frame of `width` x `height` pixels
    pub fn centered(width: i32, height: i32, fractions: [f64; 2]) -> Self {
        let center_x = width / 2;
        let center_y = height / 2;
        let shift_x = (width as f64 * fractions[0] / 2.0) as i32;
        let shift_y = (height as f64 * fractions[1] / 2.0) as i32;

        Self {
            min: Point::new(center_x - shift_x, center_y - shift_y),
            max: Point::new(center_x + shift_x, center_y + shift_y),
        }
    }

    /// Check whether `point` lies inside the region on both axes
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Region as an OpenCV rectangle for drawing
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.min.x,
            self.min.y,
            self.max.x - self.min.x,
            self.max.y - self.min.y,
        )
    }
}
