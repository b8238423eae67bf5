//! The transform mirror
//!
//! Reads always go to the native side: physics can move an entity between any
//! two calls, so a mirror that answered from memory would be stale without
//! anyone noticing. The last fetched snapshot is kept only for `cached()`.

use crate::context::ScriptContext;
use conduit_core::math::euler_directions;
use conduit_core::{Direction, EntityId, TransformData};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Where `front`/`up`/`right` come from.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSource {
    /// Ask the native side for each vector.
    #[default]
    Native,
    /// Fetch the rotation and rotate the canonical axes locally.
    Local,
}

pub struct Transform {
    ctx: ScriptContext,
    entity: EntityId,
    source: DirectionSource,
    snapshot: Cell<Option<TransformData>>,
}

impl Transform {
    pub(crate) fn new(ctx: ScriptContext, entity: EntityId) -> Self {
        let source = ctx.direction_source();
        Self {
            ctx,
            entity,
            source,
            snapshot: Cell::new(None),
        }
    }

    pub fn with_source(mut self, source: DirectionSource) -> Self {
        self.source = source;
        self
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Fetch position, rotation and scale in a single round trip.
    pub fn get(&self) -> TransformData {
        let data = self.ctx.api().transform_get(self.entity);
        self.snapshot.set(Some(data));
        data
    }

    /// The last fetched snapshot, without a native call.
    pub fn cached(&self) -> Option<TransformData> {
        self.snapshot.get()
    }

    pub fn position(&self) -> Vec3 {
        self.get().position
    }

    /// Euler angles in degrees.
    pub fn rotation(&self) -> Vec3 {
        self.get().rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.get().scale
    }

    fn patch(&self, apply: impl FnOnce(&mut TransformData)) {
        if let Some(mut data) = self.snapshot.get() {
            apply(&mut data);
            self.snapshot.set(Some(data));
        }
    }

    pub fn set(&self, data: &TransformData) {
        self.ctx.api().transform_set(self.entity, data);
        self.snapshot.set(Some(*data));
    }

    pub fn set_position(&self, position: Vec3) {
        self.ctx.api().transform_set_position(self.entity, position);
        self.patch(|data| data.position = position);
    }

    pub fn set_rotation(&self, rotation: Vec3) {
        self.ctx.api().transform_set_rotation(self.entity, rotation);
        self.patch(|data| data.rotation = rotation);
    }

    pub fn set_scale(&self, scale: Vec3) {
        self.ctx.api().transform_set_scale(self.entity, scale);
        self.patch(|data| data.scale = scale);
    }

    pub fn translate(&self, delta: Vec3) {
        self.set_position(self.position() + delta);
    }

    /// Add `delta` degrees to each Euler angle.
    pub fn rotate(&self, delta: Vec3) {
        self.set_rotation(self.rotation() + delta);
    }

    /// Turn to face along `front`. The native side picks the rotation.
    pub fn set_front(&self, front: Vec3) {
        self.ctx.api().transform_set_front(self.entity, front);
        self.snapshot.set(None);
    }

    fn direction(&self, direction: Direction) -> Vec3 {
        match self.source {
            DirectionSource::Native => self.ctx.api().transform_direction(self.entity, direction),
            DirectionSource::Local => euler_directions(self.rotation()).get(direction),
        }
    }

    pub fn front(&self) -> Vec3 {
        self.direction(Direction::Front)
    }

    pub fn up(&self) -> Vec3 {
        self.direction(Direction::Up)
    }

    pub fn right(&self) -> Vec3 {
        self.direction(Direction::Right)
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("entity", &self.entity)
            .field("source", &self.source)
            .field("snapshot", &self.snapshot.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_host::HostEngine;
    use std::rc::Rc;

    fn setup() -> (Rc<HostEngine>, Transform) {
        let host = Rc::new(HostEngine::default());
        let id = host.spawn("mover");
        let ctx = ScriptContext::new(host.clone());
        (host, ctx.entity(id).unwrap().transform())
    }

    #[test]
    fn every_read_is_one_round_trip() {
        let (host, transform) = setup();
        transform.position();
        transform.rotation();
        transform.scale();
        assert_eq!(host.call_count("transform_get"), 3);
        assert_eq!(host.total_calls(), 3);
    }

    #[test]
    fn writes_need_no_prior_read() {
        let (host, transform) = setup();
        transform.set_scale(Vec3::splat(2.0));
        assert_eq!(host.call_count("transform_get"), 0);
        assert!(transform.cached().is_none());
        assert_eq!(transform.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn reads_see_native_moves() {
        let (host, transform) = setup();
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        host.place(transform.entity(), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(transform.position(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn cached_tracks_writes_after_a_read() {
        let (_host, transform) = setup();
        transform.get();
        transform.set_position(Vec3::X);
        assert_eq!(transform.cached().unwrap().position, Vec3::X);
    }

    #[test]
    fn both_direction_sources_agree() {
        let (_host, transform) = setup();
        transform.set_rotation(Vec3::new(30.0, 60.0, 15.0));
        let local = Transform::new(transform.ctx.clone(), transform.entity)
            .with_source(DirectionSource::Local);
        assert!(transform.front().abs_diff_eq(local.front(), 1e-5));
        assert!(transform.up().abs_diff_eq(local.up(), 1e-5));
        assert!(transform.right().abs_diff_eq(local.right(), 1e-5));
    }

    #[test]
    fn set_front_faces_the_direction() {
        let (_host, transform) = setup();
        transform.set_front(Vec3::X);
        assert!(transform.front().abs_diff_eq(Vec3::X, 1e-5));
    }
}
