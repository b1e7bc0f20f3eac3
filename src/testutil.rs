//! Shared fakes for unit tests: an in-memory model and a turn gate.

use slotmap::SlotMap;

use crate::geom::WorldPoint;
use crate::model::{EntityRef, FleetId, ModelQuery, SystemId, TurnSignal};

pub(crate) struct FakeModel {
    pub systems: SlotMap<SystemId, WorldPoint>,
    pub fleets: SlotMap<FleetId, WorldPoint>,
    pub stamp: u64,
    /// Entities the local player may not act on.
    pub blocked: Vec<EntityRef>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            systems: SlotMap::with_key(),
            fleets: SlotMap::with_key(),
            stamp: 0,
            blocked: Vec::new(),
        }
    }

    pub fn add_system(&mut self, x: f32, y: f32) -> SystemId {
        self.systems.insert(WorldPoint::new(x, y))
    }

    pub fn add_fleet(&mut self, x: f32, y: f32) -> FleetId {
        self.fleets.insert(WorldPoint::new(x, y))
    }
}

impl ModelQuery for FakeModel {
    fn position_of(&self, entity: EntityRef) -> Option<WorldPoint> {
        match entity {
            EntityRef::System(id) => self.systems.get(id).copied(),
            EntityRef::Fleet(id) => self.fleets.get(id).copied(),
            EntityRef::Control(_) => None,
        }
    }

    fn ownership_stamp(&self) -> u64 {
        self.stamp
    }

    fn can_act_on(&self, entity: EntityRef) -> bool {
        !self.blocked.contains(&entity)
    }
}

/// Turn gate with interior mutability so tests can flip it mid-scenario.
pub(crate) struct FakeTurn(pub std::cell::Cell<bool>);

impl FakeTurn {
    pub fn idle() -> Self {
        Self(std::cell::Cell::new(false))
    }
}

impl TurnSignal for FakeTurn {
    fn turn_in_progress(&self) -> bool {
        self.0.get()
    }
}
