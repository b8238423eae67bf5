//! Gameplay behaviour hooks

use crate::entity::Entity;
use conduit_core::types::ColliderKind;
use conduit_core::Result;

/// The other party in a collision or trigger event.
#[derive(Debug, Clone)]
pub struct Collider {
    pub kind: ColliderKind,
    pub entity: Entity,
}

/// Script logic attached to an entity.
///
/// Every hook receives the entity the behaviour is attached to and defaults to
/// doing nothing.
#[allow(unused_variables)]
pub trait Behaviour {
    fn on_start(&mut self, entity: &Entity) -> Result<()> {
        Ok(())
    }

    fn on_update(&mut self, entity: &Entity) -> Result<()> {
        Ok(())
    }

    fn on_fixed_update(&mut self, entity: &Entity) -> Result<()> {
        Ok(())
    }

    fn on_destroy(&mut self, entity: &Entity) -> Result<()> {
        Ok(())
    }

    fn on_collision_enter(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }

    fn on_collision_stay(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }

    fn on_collision_leave(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }

    fn on_trigger_enter(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }

    fn on_trigger_stay(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }

    fn on_trigger_leave(&mut self, entity: &Entity, other: &Collider) -> Result<()> {
        Ok(())
    }
}
