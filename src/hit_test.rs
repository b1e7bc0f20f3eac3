//! Deterministic, priority-ordered hit-test resolution.
//!
//! Each category is fully exhausted before the next is tried. The order
//! privileges time-critical controls over world content, and exact hits
//! over nearest-distance matches for ships, so overlapping units never
//! fight for priority. Resolution never fails loudly: `None` means
//! "hover nothing / deselect".

use crate::geom::ScreenPoint;
use crate::sprite::{SpriteCategory, SpriteId, SpriteRegistry};
use crate::viewport::Viewport;

/// Vertical scale at or below which individual units can be picked.
/// Zoomed out further than this, ships are too dense to select singly.
pub const UNIT_SELECT_SCALE: f32 = 60.0;

/// Selection snap distance (pixels) for nearest-match ship resolution.
pub const SNAP_DISTANCE_PX: f32 = 12.0;

/// Caller policy for the zoom/hover gates of ship resolution.
#[derive(Debug, Clone, Copy)]
pub struct HitPolicy {
    pub unit_select_scale: f32,
    pub snap_distance: f32,
    /// Display policy: whether hovering fleets is allowed at all.
    pub hover_over_fleets: bool,
}

impl Default for HitPolicy {
    fn default() -> Self {
        Self {
            unit_select_scale: UNIT_SELECT_SCALE,
            snap_distance: SNAP_DISTANCE_PX,
            hover_over_fleets: true,
        }
    }
}

/// First sprite of `category` whose region contains the point, in stable
/// insertion order.
fn first_hit(
    sprites: &SpriteRegistry,
    category: SpriteCategory,
    point: ScreenPoint,
) -> Option<SpriteId> {
    sprites
        .iter_category(category)
        .find(|(_, s)| s.region.contains(point))
        .map(|(id, _)| id)
}

/// Resolve a screen point to the single best sprite match.
///
/// `pointer_masked` is whether the active overlay masks the pointer at
/// this location; controls are still reachable above the mask, world
/// content below it is not.
pub fn resolve(
    point: ScreenPoint,
    sprites: &SpriteRegistry,
    viewport: &Viewport,
    policy: &HitPolicy,
    pointer_masked: bool,
) -> Option<SpriteId> {
    // 1-3. Controls: pending next-turn affordances, persistent map
    // chrome, then caller-supplied extras.
    for category in [
        SpriteCategory::NextTurnControl,
        SpriteCategory::BaseControl,
        SpriteCategory::ExtraControl,
    ] {
        if let Some(id) = first_hit(sprites, category, point) {
            return Some(id);
        }
    }

    // 4. A masking overlay stops everything below the chrome layer.
    if pointer_masked {
        return None;
    }

    let units_selectable =
        policy.hover_over_fleets && viewport.scale_y() <= policy.unit_select_scale;

    // 5. Ships: exact hit wins immediately; otherwise the closest ship
    // within the snap distance.
    if units_selectable {
        let mut best: Option<(SpriteId, f32)> = None;
        for (id, sprite) in sprites.iter_category(SpriteCategory::Ship) {
            if sprite.region.contains(point) {
                return Some(id);
            }
            let d = sprite.region.distance_to(point);
            if d < policy.snap_distance && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        if let Some((id, _)) = best {
            return Some(id);
        }
    }

    // 6. Star systems, stable enumeration order.
    if let Some(id) = first_hit(sprites, SpriteCategory::StarSystem, point) {
        return Some(id);
    }

    // 7. In-progress flight paths are always selectable.
    if let Some(id) = first_hit(sprites, SpriteCategory::PathInProgress, point) {
        return Some(id);
    }

    // 8. Committed flight paths, under the same gate as ships.
    if units_selectable
        && let Some(id) = first_hit(sprites, SpriteCategory::FlightPath, point)
    {
        return Some(id);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ControlTag, EntityRef};
    use crate::sprite::{HitRegion, Sprite};
    use crate::testutil::FakeModel;

    fn vp_at_scale(scale: f32) -> Viewport {
        let mut vp = Viewport::new(1000.0, 1000.0, 800, 600);
        vp.set_scale(scale);
        vp
    }

    fn circle_sprite(category: SpriteCategory, entity: EntityRef, x: f32, y: f32, r: f32) -> Sprite {
        Sprite::new(
            category,
            entity,
            HitRegion::Circle {
                center: ScreenPoint::new(x, y),
                radius: r,
            },
        )
    }

    #[test]
    fn control_beats_star_system_at_same_point() {
        let mut model = FakeModel::new();
        let sys = model.add_system(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::StarSystem,
            EntityRef::System(sys),
            100.0,
            100.0,
            20.0,
        ));
        let control = reg.insert(circle_sprite(
            SpriteCategory::NextTurnControl,
            EntityRef::Control(ControlTag::NextTurn),
            100.0,
            100.0,
            20.0,
        ));

        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, Some(control));
    }

    #[test]
    fn mask_blocks_world_content_but_not_controls() {
        let mut model = FakeModel::new();
        let sys = model.add_system(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::StarSystem,
            EntityRef::System(sys),
            100.0,
            100.0,
            20.0,
        ));
        let zoom_btn = reg.insert(circle_sprite(
            SpriteCategory::BaseControl,
            EntityRef::Control(ControlTag::ZoomIn),
            300.0,
            20.0,
            10.0,
        ));

        let vp = vp_at_scale(30.0);
        let policy = HitPolicy::default();
        // Masked: the system under the modal is unreachable.
        assert_eq!(
            resolve(ScreenPoint::new(100.0, 100.0), &reg, &vp, &policy, true),
            None
        );
        // Controls sit above the mask.
        assert_eq!(
            resolve(ScreenPoint::new(300.0, 20.0), &reg, &vp, &policy, true),
            Some(zoom_btn)
        );
    }

    #[test]
    fn exact_ship_hit_beats_nearest_candidate() {
        let mut model = FakeModel::new();
        let a = model.add_fleet(0.0, 0.0);
        let b = model.add_fleet(1.0, 1.0);
        let mut reg = SpriteRegistry::new();
        // `near` is closer to the pointer's ideal center but does not
        // contain it; `direct` does.
        let _near = reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(a),
            104.0,
            100.0,
            2.0,
        ));
        let direct = reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(b),
            95.0,
            100.0,
            6.0,
        ));

        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, Some(direct));
    }

    #[test]
    fn nearest_ship_within_snap_distance() {
        let mut model = FakeModel::new();
        let far = model.add_fleet(0.0, 0.0);
        let near = model.add_fleet(1.0, 1.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(far),
            110.0,
            100.0,
            2.0,
        ));
        let near_id = reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(near),
            105.0,
            100.0,
            2.0,
        ));

        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, Some(near_id));
    }

    #[test]
    fn ships_beyond_snap_fall_through_to_systems() {
        let mut model = FakeModel::new();
        let fleet = model.add_fleet(0.0, 0.0);
        let sys = model.add_system(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(fleet),
            200.0,
            200.0,
            2.0,
        ));
        let sys_id = reg.insert(circle_sprite(
            SpriteCategory::StarSystem,
            EntityRef::System(sys),
            100.0,
            100.0,
            15.0,
        ));

        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, Some(sys_id));
    }

    #[test]
    fn zoom_gate_disables_unit_selection() {
        let mut model = FakeModel::new();
        let fleet = model.add_fleet(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(fleet),
            100.0,
            100.0,
            10.0,
        ));

        // Zoomed far out: individual units cannot be picked.
        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(500.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn hover_policy_disables_fleets_and_their_paths() {
        let mut model = FakeModel::new();
        let fleet = model.add_fleet(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(fleet),
            100.0,
            100.0,
            10.0,
        ));
        reg.insert(Sprite::new(
            SpriteCategory::FlightPath,
            EntityRef::Fleet(fleet),
            HitRegion::Segment {
                a: ScreenPoint::new(100.0, 100.0),
                b: ScreenPoint::new(300.0, 100.0),
                width: 6.0,
            },
        ));

        let policy = HitPolicy {
            hover_over_fleets: false,
            ..HitPolicy::default()
        };
        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &policy,
            false,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn in_progress_path_always_selectable() {
        let mut model = FakeModel::new();
        let fleet = model.add_fleet(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        let path = reg.insert(Sprite::new(
            SpriteCategory::PathInProgress,
            EntityRef::Fleet(fleet),
            HitRegion::Segment {
                a: ScreenPoint::new(0.0, 50.0),
                b: ScreenPoint::new(400.0, 50.0),
                width: 8.0,
            },
        ));

        // Even zoomed all the way out with fleet hovering disabled.
        let policy = HitPolicy {
            hover_over_fleets: false,
            ..HitPolicy::default()
        };
        let hit = resolve(
            ScreenPoint::new(200.0, 50.0),
            &reg,
            &vp_at_scale(900.0),
            &policy,
            false,
        );
        assert_eq!(hit, Some(path));
    }

    #[test]
    fn fleet_beats_its_own_flight_path() {
        let mut model = FakeModel::new();
        let fleet = model.add_fleet(0.0, 0.0);
        let mut reg = SpriteRegistry::new();
        // Path inserted first; category order must still prefer the ship.
        reg.insert(Sprite::new(
            SpriteCategory::FlightPath,
            EntityRef::Fleet(fleet),
            HitRegion::Segment {
                a: ScreenPoint::new(100.0, 100.0),
                b: ScreenPoint::new(300.0, 100.0),
                width: 6.0,
            },
        ));
        let ship = reg.insert(circle_sprite(
            SpriteCategory::Ship,
            EntityRef::Fleet(fleet),
            100.0,
            100.0,
            8.0,
        ));

        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, Some(ship));
    }

    #[test]
    fn empty_registry_resolves_to_none() {
        let reg = SpriteRegistry::new();
        let hit = resolve(
            ScreenPoint::new(100.0, 100.0),
            &reg,
            &vp_at_scale(30.0),
            &HitPolicy::default(),
            false,
        );
        assert_eq!(hit, None);
    }
}
