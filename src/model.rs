//! Opaque surface onto the game model and turn lifecycle.
//!
//! The interaction core never owns simulation state. Sprites and overlays
//! carry slotmap handles into the model; everything the core needs back is
//! a position, a permission bit, or a change stamp, queried through
//! [`ModelQuery`]. The turn processor is visible only as the boolean gate
//! exposed by [`TurnSignal`].

use slotmap::new_key_type;

use crate::geom::WorldPoint;

new_key_type! {
    /// Handle to a star system in the game model.
    pub struct SystemId;
    /// Handle to a fleet (or single ship) in the game model.
    pub struct FleetId;
}

/// UI chrome a control sprite stands for. These have no model counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlTag {
    ZoomIn,
    ZoomOut,
    NextTurn,
    ToggleRanges,
    Legend,
    /// Caller-supplied extra control, identified by an app-defined index.
    Extra(u16),
}

/// Non-owning reference from a sprite or overlay payload item to the model
/// object it visualizes. Two sprites may reference the same entity (a fleet
/// and its flight path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    System(SystemId),
    Fleet(FleetId),
    Control(ControlTag),
}

/// Read-only queries the core makes against the game model.
pub trait ModelQuery {
    /// World position of an entity. `None` for controls and for handles the
    /// model no longer knows (a fleet destroyed since the sprite was built).
    fn position_of(&self, entity: EntityRef) -> Option<WorldPoint>;

    /// Monotonic stamp bumped whenever the ownership/colonization set
    /// changes. Watched by the derived range-overlay cache.
    fn ownership_stamp(&self) -> u64;

    /// Whether the local player may act on this entity right now.
    fn can_act_on(&self, entity: EntityRef) -> bool;
}

/// The turn-lifecycle gate. While a turn is being processed in the
/// background, default map input is refused and cosmetic animation is
/// suspended; only overlay continue/dismiss actions pass through.
pub trait TurnSignal {
    fn turn_in_progress(&self) -> bool;
}
