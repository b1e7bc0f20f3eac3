//! Geometry primitives shared by the viewport, sprites, and hit testing.
//!
//! Screen space is pixels with the origin at the panel's top-left corner.
//! World space is abstract map units (the playable galaxy rectangle).
//! The two are kept as distinct types so a point can never be fed to the
//! wrong side of a viewport transform.

/// Screen-space point (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another screen point.
    pub fn distance_to(&self, other: ScreenPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// World-space point (map units).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned screen-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the point is inside this rectangle.
    /// Min edges inclusive, max edges exclusive.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldRect {
    /// Build from two opposite corners in any order.
    pub fn from_corners(a: WorldPoint, b: WorldPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn midpoint(&self) -> WorldPoint {
        WorldPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Distance from a point to the closest point on segment `a`-`b`.
/// Degenerate segments (a == b) fall back to point distance.
pub fn point_segment_distance(p: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f32::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_to(ScreenPoint::new(a.x + t * abx, a.y + t * aby))
}
