//! Entities and structural component operations

use crate::component::ComponentProxy;
use crate::context::ScriptContext;
use crate::transform::Transform;
use conduit_core::{Component, EntityId, Prefab, Result};
use std::fmt;

/// A native game object seen from the script side.
///
/// Holds only the id; copies are free and never own the native object.
#[derive(Clone)]
pub struct Entity {
    ctx: ScriptContext,
    id: EntityId,
}

impl Entity {
    pub(crate) fn new(ctx: ScriptContext, id: EntityId) -> Self {
        Self { ctx, id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn context(&self) -> &ScriptContext {
        &self.ctx
    }

    pub fn has<C: Component>(&self) -> bool {
        self.ctx.api().component_has(self.id, C::KIND.token())
    }

    /// Ensure a `C` is attached and return a view of it.
    ///
    /// An existing component is left untouched; only a missing one is
    /// created, with native defaults.
    pub fn add<C: Component>(&self) -> ComponentProxy<C> {
        if !self.has::<C>() {
            self.ctx.api().component_add(self.id, C::KIND.token());
            tracing::debug!("Added {} to {}", C::KIND, self.id);
        }
        ComponentProxy::new(self.ctx.clone(), self.id)
    }

    /// Detach `C` if present. Proxies of `C` for this entity dangle afterwards.
    pub fn remove<C: Component>(&self) {
        if self.has::<C>() {
            self.ctx.api().component_remove(self.id, C::KIND.token());
            tracing::debug!("Removed {} from {}", C::KIND, self.id);
        }
    }

    pub fn get<C: Component>(&self) -> Option<ComponentProxy<C>> {
        self.has::<C>()
            .then(|| ComponentProxy::new(self.ctx.clone(), self.id))
    }

    /// Ask the native side to destroy this entity. The null entity is left
    /// alone.
    pub fn destroy(self) {
        if self.id.is_null() {
            return;
        }
        self.ctx.api().entity_destroy(self.id);
    }

    pub fn instantiate(&self, prefab: &Prefab) -> Result<Entity> {
        self.ctx.instantiate(prefab)
    }

    pub fn parent(&self) -> Option<Entity> {
        let parent = self.ctx.api().entity_parent(self.id);
        (!parent.is_null()).then(|| Entity::new(self.ctx.clone(), parent))
    }

    /// Re-parent under `parent`, or detach with `None`.
    pub fn set_parent(&self, parent: Option<&Entity>) {
        let parent = parent.map_or(EntityId::NULL, Entity::id);
        self.ctx.api().entity_set_parent(self.id, parent);
    }

    pub fn tag(&self) -> String {
        self.ctx.api().tag_get(self.id)
    }

    pub fn set_tag(&self, tag: &str) {
        self.ctx.api().tag_set(self.id, tag);
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.ctx.clone(), self.id)
    }

    // Hierarchy lookups do not traverse yet: each answers for this entity only.

    pub fn component_in_parent<C: Component>(&self) -> Option<ComponentProxy<C>> {
        self.get::<C>()
    }

    pub fn components_in_parent<C: Component>(&self) -> Vec<ComponentProxy<C>> {
        self.get::<C>().into_iter().collect()
    }

    pub fn component_in_children<C: Component>(&self) -> Option<ComponentProxy<C>> {
        self.get::<C>()
    }

    pub fn components_in_children<C: Component>(&self) -> Vec<ComponentProxy<C>> {
        self.get::<C>().into_iter().collect()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity").field(&self.id).finish()
    }
}
