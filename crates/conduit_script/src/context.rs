//! The injected boundary handle

use crate::debug::Debug;
use crate::entity::Entity;
use crate::input::Input;
use crate::time::Time;
use crate::transform::DirectionSource;
use conduit_core::{BridgeError, EntityId, NativeApi, Prefab, ResourceKind, Result};
use std::fmt;
use std::rc::Rc;

/// Everything a script needs to reach the native runtime.
///
/// Cloning is cheap; every clone talks to the same native runtime. Entities,
/// proxies and resources each carry one, so nothing reaches for global state.
#[derive(Clone)]
pub struct ScriptContext {
    api: Rc<dyn NativeApi>,
    direction_source: DirectionSource,
}

impl ScriptContext {
    pub fn new(api: Rc<dyn NativeApi>) -> Self {
        Self {
            api,
            direction_source: DirectionSource::default(),
        }
    }

    /// Choose how transforms derive their front/up/right vectors.
    pub fn with_direction_source(mut self, source: DirectionSource) -> Self {
        self.direction_source = source;
        self
    }

    pub fn direction_source(&self) -> DirectionSource {
        self.direction_source
    }

    pub fn api(&self) -> &dyn NativeApi {
        &*self.api
    }

    /// View the entity behind `id`. Fails only for the sentinel ids; whether
    /// the entity is alive is the native side's business.
    pub fn entity(&self, id: EntityId) -> Result<Entity> {
        if id.is_null() {
            return Err(BridgeError::NullEntity);
        }
        Ok(Entity::new(self.clone(), id))
    }

    /// Spawn a copy of `prefab`.
    pub fn instantiate(&self, prefab: &Prefab) -> Result<Entity> {
        let id = self.api.entity_instantiate(prefab.handle());
        if id.is_null() {
            return Err(BridgeError::Exhausted {
                resource: ResourceKind::Entity,
            });
        }
        tracing::debug!("Instantiated {} from {}", id, prefab.handle());
        Ok(Entity::new(self.clone(), id))
    }

    pub fn input(&self) -> Input<'_> {
        Input::new(self.api())
    }

    pub fn time(&self) -> Time<'_> {
        Time::new(self.api())
    }

    pub fn debug(&self) -> Debug<'_> {
        Debug::new(self.api())
    }
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("direction_source", &self.direction_source)
            .finish_non_exhaustive()
    }
}
