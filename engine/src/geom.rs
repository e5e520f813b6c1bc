//! Points, sizes, and the anchoring math shared by pinch and image resampling.
//!
//! Every helper here is pure: given start state and a new scale or size, it
//! returns where the top-left corner must move so that one chosen point (the
//! pinch centroid, a resample anchor, or the centre) stays visually fixed.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

/// A point in scene or device space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Halfway point between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Component-wise `self - other`.
    #[must_use]
    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    #[must_use]
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

/// Position of a pinched item anchored at the centroid: `P = s·(P0 − C0) + C`.
///
/// `s` is `new_scale / start_scale`; a zero start scale is treated as 1.
#[must_use]
pub fn apply_pinch(start: Point, start_scale: f32, start_centroid: Point, centroid: Point, new_scale: f32) -> Point {
    let base = if start_scale == 0.0 { 1.0 } else { start_scale };
    let s = new_scale / base;
    Point::new(
        s * (start.x - start_centroid.x) + centroid.x,
        s * (start.y - start_centroid.y) + centroid.y,
    )
}

/// New origin after resizing `prev` to `out` so the same UV sits under `anchor`.
///
/// A degenerate previous size leaves the origin where it was.
#[must_use]
pub fn anchor_resample_at_point(origin: Point, prev: Size, out: Size, anchor: Point) -> Point {
    if prev.w <= 0.0 || prev.h <= 0.0 {
        return origin;
    }
    let u = (anchor.x - origin.x) / prev.w;
    let v = (anchor.y - origin.y) / prev.h;
    Point::new(anchor.x - u * out.w, anchor.y - v * out.h)
}

/// New origin after resizing `prev` to `out` around the visual centre.
#[must_use]
pub fn anchor_resample_at_center(origin: Point, prev: Size, out: Size) -> Point {
    let cx = origin.x + prev.w / 2.0;
    let cy = origin.y + prev.h / 2.0;
    Point::new(cx - out.w / 2.0, cy - out.h / 2.0)
}
