//! The visible window onto the galaxy map.
//!
//! A [`Viewport`] owns the world-space center, the horizontal/vertical
//! scale (world units visible across the panel), and the panel's pixel
//! size. The horizontal scale is always derived from the vertical one
//! through the panel aspect ratio, so `scale_x / scale_y ==
//! pixel_width / pixel_height` holds after every mutation.
//!
//! Zoom is eased: wheel input and focus requests only move
//! `desired_scale`; a fixed-period [`Viewport::zoom_tick`] multiplies the
//! current scale toward it without overshooting.

use crate::geom::{ScreenPoint, WorldPoint, WorldRect};
use crate::model::ModelQuery;

/// Smallest vertical scale (deepest zoom-in), in world units.
pub const MIN_SCALE: f32 = 2.0;

/// Per-tick multiplicative step for eased zoom.
pub const ZOOM_STEP: f32 = 1.15;

/// Zoom animation stops when current/target is within this ratio of 1.0.
pub const ZOOM_SNAP_RATIO: f32 = 0.01;

pub struct Viewport {
    center: WorldPoint,
    /// World units across the panel width. Derived: `scale_y * aspect`.
    scale_x: f32,
    /// World units across the panel height. The authoritative zoom value.
    scale_y: f32,
    pixel_width: u32,
    pixel_height: u32,
    world_width: f32,
    world_height: f32,
    /// Target for the eased zoom animation.
    desired_scale: f32,
    /// Set whenever scale or center changed; consumed by [`DerivedCache`].
    derived_dirty: bool,
}

impl Viewport {
    /// Create a viewport fitted to the whole world rectangle.
    pub fn new(world_width: f32, world_height: f32, pixel_width: u32, pixel_height: u32) -> Self {
        let mut vp = Self {
            center: WorldPoint::new(world_width / 2.0, world_height / 2.0),
            scale_x: MIN_SCALE,
            scale_y: MIN_SCALE,
            pixel_width,
            pixel_height,
            world_width,
            world_height,
            desired_scale: MIN_SCALE,
            derived_dirty: true,
        };
        vp.set_bounds(WorldRect {
            x: 0.0,
            y: 0.0,
            width: world_width,
            height: world_height,
        });
        vp
    }

    pub fn center(&self) -> WorldPoint {
        self.center
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// Panel aspect ratio, or `None` while the panel has no valid layout
    /// (zero width/height during construction).
    fn aspect(&self) -> Option<f32> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            None
        } else {
            Some(self.pixel_width as f32 / self.pixel_height as f32)
        }
    }

    /// Largest useful vertical scale: the whole world just fits on the
    /// binding axis. Zero-size worlds fall back to [`MIN_SCALE`] so the
    /// clamp range never collapses or divides by zero.
    pub fn max_scale(&self) -> f32 {
        let Some(aspect) = self.aspect() else {
            return MIN_SCALE;
        };
        let from_height = self.world_height;
        let from_width = if aspect > 0.0 {
            self.world_width / aspect
        } else {
            0.0
        };
        from_height.max(from_width).max(MIN_SCALE)
    }

    /// Linear world→screen map. `None` while the viewport is degenerate;
    /// the caller skips and retries on the next valid layout pass.
    pub fn world_to_screen(&self, p: WorldPoint) -> Option<ScreenPoint> {
        if self.aspect().is_none() || self.scale_x <= 0.0 || self.scale_y <= 0.0 {
            return None;
        }
        let pw = self.pixel_width as f32;
        let ph = self.pixel_height as f32;
        Some(ScreenPoint::new(
            (p.x - self.center.x) / self.scale_x * pw + pw / 2.0,
            (p.y - self.center.y) / self.scale_y * ph + ph / 2.0,
        ))
    }

    /// Exact inverse of [`Viewport::world_to_screen`].
    pub fn screen_to_world(&self, p: ScreenPoint) -> Option<WorldPoint> {
        if self.aspect().is_none() || self.scale_x <= 0.0 || self.scale_y <= 0.0 {
            return None;
        }
        let pw = self.pixel_width as f32;
        let ph = self.pixel_height as f32;
        Some(WorldPoint::new(
            (p.x - pw / 2.0) * self.scale_x / pw + self.center.x,
            (p.y - ph / 2.0) * self.scale_y / ph + self.center.y,
        ))
    }

    /// Set the vertical scale, clamped to `[MIN_SCALE, 2 * max_scale()]`.
    /// Re-derives the horizontal scale from the aspect lock. Marks the
    /// derived buffer dirty only when the vertical scale actually changed.
    pub fn set_scale(&mut self, scale: f32) {
        let Some(aspect) = self.aspect() else {
            return;
        };
        let clamped = scale.clamp(MIN_SCALE, 2.0 * self.max_scale());
        if (clamped - self.scale_y).abs() > f32::EPSILON {
            self.scale_y = clamped;
            self.derived_dirty = true;
        }
        self.scale_x = self.scale_y * aspect;
    }

    /// Fit a world rectangle into the panel: pick the larger of the two
    /// axis-derived vertical scales, then center on the rect midpoint.
    /// Cancels any pending eased zoom.
    pub fn set_bounds(&mut self, rect: WorldRect) {
        let Some(aspect) = self.aspect() else {
            return;
        };
        let from_height = rect.height;
        let from_width = if aspect > 0.0 { rect.width / aspect } else { 0.0 };
        self.set_scale(from_height.max(from_width));
        self.center = self.clamp_center(rect.midpoint());
        self.desired_scale = self.scale_y;
        self.derived_dirty = true;
    }

    /// Panel was laid out or resized. Keeps the vertical scale and
    /// re-derives the horizontal one.
    pub fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.pixel_width = width;
        self.pixel_height = height;
        if let Some(aspect) = self.aspect() {
            self.scale_x = self.scale_y * aspect;
            self.derived_dirty = true;
        }
    }

    /// Set the eased-zoom target; ticks will walk the scale toward it.
    pub fn request_zoom(&mut self, target: f32) {
        self.desired_scale = target.clamp(MIN_SCALE, 2.0 * self.max_scale());
    }

    /// Multiply the zoom target (wheel notches, zoom buttons).
    pub fn zoom_by(&mut self, factor: f32) {
        if factor > 0.0 {
            self.request_zoom(self.desired_scale * factor);
        }
    }

    /// One eased-zoom step. Returns true while the animation is still
    /// running. Idempotent at the target: invoking the tick with no zoom
    /// pending mutates nothing and returns false.
    pub fn zoom_tick(&mut self) -> bool {
        if self.aspect().is_none() {
            return false;
        }
        let target = self.desired_scale;
        let current = self.scale_y;
        if current <= 0.0 || target <= 0.0 {
            return false;
        }
        let ratio = target / current;
        if (ratio - 1.0).abs() <= ZOOM_SNAP_RATIO {
            if ratio != 1.0 {
                self.set_scale(target);
                self.desired_scale = self.scale_y;
            }
            return false;
        }
        // Bounded step: never past the target.
        let next = if ratio > 1.0 {
            (current * ZOOM_STEP).min(target)
        } else {
            (current / ZOOM_STEP).max(target)
        };
        self.set_scale(next);
        (self.scale_y - self.desired_scale).abs() > f32::EPSILON
    }

    /// Apply a pointer drag: pixel delta converted through the current
    /// scale into world units.
    pub fn pan_screen(&mut self, dx: f32, dy: f32) {
        if self.aspect().is_none() {
            return;
        }
        let moved = WorldPoint::new(
            self.center.x + dx * self.scale_x / self.pixel_width as f32,
            self.center.y + dy * self.scale_y / self.pixel_height as f32,
        );
        self.center = self.clamp_center(moved);
        self.derived_dirty = true;
    }

    /// Jump-center on a world point (e.g. an overlay focus target).
    pub fn recenter_on(&mut self, p: WorldPoint) {
        self.center = self.clamp_center(p);
        self.derived_dirty = true;
    }

    /// Request a rebuild of any cached derived buffer on the next paint.
    pub fn invalidate_derived(&mut self) {
        self.derived_dirty = true;
    }

    fn take_derived_dirty(&mut self) -> bool {
        std::mem::take(&mut self.derived_dirty)
    }

    fn clamp_center(&self, p: WorldPoint) -> WorldPoint {
        let x = if self.world_width > 0.0 {
            p.x.clamp(0.0, self.world_width)
        } else {
            p.x
        };
        let y = if self.world_height > 0.0 {
            p.y.clamp(0.0, self.world_height)
        } else {
            p.y
        };
        WorldPoint::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// Derived buffer cache
// ---------------------------------------------------------------------------

/// Lazily rebuilt buffer derived from viewport state and the model's
/// ownership set (e.g. a precomputed fuel-range overlay image).
///
/// Invalidation is a dirty flag, not a counter: any number of redundant
/// invalidations between paints cost exactly one rebuild at the next
/// [`DerivedCache::get_or_rebuild`]. The cache also watches the model's
/// ownership stamp, so colonization changes trigger a rebuild without an
/// explicit invalidate call.
#[derive(Default)]
pub struct DerivedCache<T> {
    value: Option<T>,
    ownership_stamp: u64,
}

impl<T> DerivedCache<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            ownership_stamp: 0,
        }
    }

    /// Drop the cached value; the next paint rebuilds it.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Fetch the buffer, rebuilding at most once since the last
    /// invalidation, scale/center change, or ownership change.
    pub fn get_or_rebuild(
        &mut self,
        viewport: &mut Viewport,
        model: &dyn ModelQuery,
        rebuild: impl FnOnce(&Viewport) -> T,
    ) -> &T {
        let stamp = model.ownership_stamp();
        if viewport.take_derived_dirty() || stamp != self.ownership_stamp {
            self.value = None;
        }
        self.ownership_stamp = stamp;
        self.value.get_or_insert_with(|| rebuild(viewport))
    }
}
