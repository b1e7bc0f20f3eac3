//! Interactive sprites: per-frame visual proxies for model entities.
//!
//! A sprite never owns the thing it visualizes — it carries an
//! [`EntityRef`] handle plus a screen-space hit region recomputed by the
//! caller on every draw. Capabilities are data, not trait objects: a
//! sprite with `on_click: None` is hover-only, one with
//! `wheel_reactive: true` intercepts the wheel before map zoom.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::geom::{ScreenPoint, ScreenRect, point_segment_distance};
use crate::model::{ControlTag, EntityRef, FleetId, SystemId};

new_key_type! {
    /// Handle into the sprite arena. Valid only within the frame the
    /// sprite was inserted (transient categories are dropped on
    /// [`SpriteRegistry::begin_frame`]).
    pub struct SpriteId;
}

/// Category tag used only for hit-test ordering. The order of the
/// variants here is not the resolution order; see `hit_test::resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteCategory {
    /// Transient modal affordances ("turn done" prompts). Cleared every
    /// repaint, checked before everything else.
    NextTurnControl,
    /// Persistent map chrome: zoom buttons, filters, legend toggles.
    BaseControl,
    /// Caller-supplied extra UI chrome for the current context.
    ExtraControl,
    Ship,
    StarSystem,
    /// Flight path still being plotted. Always selectable.
    PathInProgress,
    /// Committed flight path attached to a ship.
    FlightPath,
}

impl SpriteCategory {
    pub(crate) const COUNT: usize = 7;

    pub(crate) fn index(self) -> usize {
        match self {
            SpriteCategory::NextTurnControl => 0,
            SpriteCategory::BaseControl => 1,
            SpriteCategory::ExtraControl => 2,
            SpriteCategory::Ship => 3,
            SpriteCategory::StarSystem => 4,
            SpriteCategory::PathInProgress => 5,
            SpriteCategory::FlightPath => 6,
        }
    }

    /// Whether sprites of this category survive a repaint.
    pub fn persistent(self) -> bool {
        matches!(self, SpriteCategory::BaseControl)
    }
}

/// Screen-space hit region, recomputed each frame from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitRegion {
    Rect(ScreenRect),
    Circle { center: ScreenPoint, radius: f32 },
    /// Thickened line segment — flight paths.
    Segment {
        a: ScreenPoint,
        b: ScreenPoint,
        width: f32,
    },
}

impl HitRegion {
    /// Direct hit test.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        match *self {
            HitRegion::Rect(r) => r.contains(p),
            HitRegion::Circle { center, radius } => p.distance_to(center) <= radius,
            HitRegion::Segment { a, b, width } => point_segment_distance(p, a, b) <= width / 2.0,
        }
    }

    /// Selection distance for nearest-match resolution: how far the
    /// pointer is from the region's edge (0.0 when inside).
    pub fn distance_to(&self, p: ScreenPoint) -> f32 {
        match *self {
            HitRegion::Rect(r) => {
                let nearest = ScreenPoint::new(
                    p.x.clamp(r.x, r.x + r.width),
                    p.y.clamp(r.y, r.y + r.height),
                );
                p.distance_to(nearest)
            }
            HitRegion::Circle { center, radius } => (p.distance_to(center) - radius).max(0.0),
            HitRegion::Segment { a, b, width } => {
                (point_segment_distance(p, a, b) - width / 2.0).max(0.0)
            }
        }
    }
}

/// Command a sprite emits when clicked (after the registered consumer's
/// first refusal) or wheeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteCommand {
    SelectSystem(SystemId),
    SelectFleet(FleetId),
    ShowPath(FleetId),
    Control(ControlTag),
}

pub struct Sprite {
    pub category: SpriteCategory,
    pub entity: EntityRef,
    pub region: HitRegion,
    pub hovering: bool,
    pub on_click: Option<SpriteCommand>,
    pub wheel_reactive: bool,
}

impl Sprite {
    pub fn new(category: SpriteCategory, entity: EntityRef, region: HitRegion) -> Self {
        Self {
            category,
            entity,
            region,
            hovering: false,
            on_click: None,
            wheel_reactive: false,
        }
    }

    pub fn with_click(mut self, command: SpriteCommand) -> Self {
        self.on_click = Some(command);
        self
    }

    pub fn wheel_reactive(mut self) -> Self {
        self.wheel_reactive = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The current frame's collection of interactive sprites.
///
/// Arena-backed like the widget tree: ids stay stable across removals
/// within a frame. Per-category lists preserve insertion order, which is
/// the stable enumeration order the hit tester walks.
pub struct SpriteRegistry {
    arena: SlotMap<SpriteId, Sprite>,
    by_category: [SmallVec<[SpriteId; 8]>; SpriteCategory::COUNT],
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self {
            arena: SlotMap::with_key(),
            by_category: std::array::from_fn(|_| SmallVec::new()),
        }
    }

    pub fn insert(&mut self, sprite: Sprite) -> SpriteId {
        let category = sprite.category;
        let id = self.arena.insert(sprite);
        self.by_category[category.index()].push(id);
        id
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.arena.get_mut(id)
    }

    /// Drop all transient sprites. Called at the start of every repaint
    /// and when an overlay takes the map.
    /// Persistent base controls survive.
    pub fn begin_frame(&mut self) {
        for (i, list) in self.by_category.iter_mut().enumerate() {
            if i == SpriteCategory::BaseControl.index() {
                continue;
            }
            for id in list.drain(..) {
                self.arena.remove(id);
            }
        }
    }

    /// Drop everything, base controls included (map panel torn down).
    pub fn clear(&mut self) {
        self.arena.clear();
        for list in &mut self.by_category {
            list.clear();
        }
    }

    /// Sprites of one category in stable insertion order.
    pub fn iter_category(
        &self,
        category: SpriteCategory,
    ) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.by_category[category.index()]
            .iter()
            .filter_map(|&id| self.arena.get(id).map(|s| (id, s)))
    }

    /// Set the hovering flag; returns false when the id is stale.
    pub fn set_hovering(&mut self, id: SpriteId, hovering: bool) -> bool {
        match self.arena.get_mut(id) {
            Some(sprite) => {
                sprite.hovering = hovering;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
