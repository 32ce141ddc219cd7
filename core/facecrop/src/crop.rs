/// A point in some 2D pixel coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp the point into `[0, width] × [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width.max(0.0)),
            y: self.y.clamp(0.0, height.max(0.0)),
        }
    }
}

/// Axis-aligned rectangle in detection, display, or source space.
///
/// Width and height are never negative; a rectangle with zero area means
/// "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Round to whole pixels and convert into a region that can be cut out
    /// of an image. Returns `None` when the rounded region has no area.
    pub fn to_crop_region(&self) -> Option<CropRegion> {
        let width = self.width.round();
        let height = self.height.round();
        if width < 1.0 || height < 1.0 {
            return None;
        }
        Some(CropRegion {
            x: self.x.round().max(0.0) as u32,
            y: self.y.round().max(0.0) as u32,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Per-axis factors mapping one coordinate space onto another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    /// Horizontal factor.
    pub x: f64,
    /// Vertical factor.
    pub y: f64,
}

impl ScaleFactor {
    /// Factors mapping a `from_width × from_height` space onto a
    /// `to_width × to_height` space (`target / source` per axis).
    pub fn between(from_width: f64, from_height: f64, to_width: f64, to_height: f64) -> Self {
        Self {
            x: to_width / from_width,
            y: to_height / from_height,
        }
    }

    /// Factors mapping back the other way.
    pub fn inverse(self) -> Self {
        Self {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
        }
    }
}

/// Crop region within the source image, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width, always at least 1.
    pub width: u32,
    /// Height, always at least 1.
    pub height: u32,
}

/// Rectangle spanned by a drag from `start` to `current`, whichever way
/// the pointer moved.
pub fn compute_selection(start: Point, current: Point) -> Rect {
    Rect {
        x: start.x.min(current.x),
        y: start.y.min(current.y),
        width: (current.x - start.x).abs(),
        height: (current.y - start.y).abs(),
    }
}

/// Scale every coordinate and dimension of `rect` and round to whole pixels.
pub fn map_to_source_space(rect: Rect, scale: ScaleFactor) -> Rect {
    Rect {
        x: (rect.x * scale.x).round(),
        y: (rect.y * scale.y).round(),
        width: (rect.width * scale.x).round(),
        height: (rect.height * scale.y).round(),
    }
}

/// Square of side `max(width, height) × padding_scale` centered on `rect`.
///
/// Face boxes from detectors hug the face; the padding leaves room around it.
pub fn pad_and_center_square(rect: Rect, padding_scale: f64) -> Rect {
    let center = rect.center();
    let side = (rect.width.max(rect.height) * padding_scale).round();
    Rect {
        x: (center.x - side / 2.0).round(),
        y: (center.y - side / 2.0).round(),
        width: side,
        height: side,
    }
}

/// Clamp `rect` into `[0, bounds_width) × [0, bounds_height)`.
///
/// A negative origin is moved to zero and an overflowing extent is shrunk
/// from the far side. The region is not re-centered, so a square near an
/// edge comes out non-square.
pub fn clamp_to_bounds(rect: Rect, bounds_width: f64, bounds_height: f64) -> Rect {
    let x = rect.x.max(0.0);
    let y = rect.y.max(0.0);

    let mut width = rect.width;
    if x + width > bounds_width {
        width = bounds_width - x;
    }
    let mut height = rect.height;
    if y + height > bounds_height {
        height = bounds_height - y;
    }

    Rect {
        x,
        y,
        width: width.max(0.0),
        height: height.max(0.0),
    }
}
