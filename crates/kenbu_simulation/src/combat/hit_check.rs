//! Hit check collaborators: swept-sphere scanner and damage sink.

use bevy::prelude::*;

use super::damage::ApplyDamage;

/// Swept-volume query over actors.
pub trait HitScanner {
    /// Actors whose hurtbox intersects a sphere of `radius` swept from `origin` to `end`.
    fn sweep_for_actors(&self, origin: Vec3, end: Vec3, radius: f32, exclude: Entity) -> Vec<Entity>;
}

/// Health/damage model entry point.
pub trait DamageApplier {
    fn apply_damage(
        &mut self,
        target: Entity,
        amount: u32,
        instigator_controller: Option<Entity>,
        instigator: Entity,
    );
}

/// Shortest distance from `point` to segment `start..end`.
pub fn distance_to_segment(point: Vec3, start: Vec3, end: Vec3) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

/// Sphere hurtboxes snapshotted from the world for one batch of sweeps.
#[derive(Debug, Clone, Default)]
pub struct HurtboxScanner {
    hurtboxes: Vec<(Entity, Vec3, f32)>,
}

impl HurtboxScanner {
    pub fn new(hurtboxes: impl IntoIterator<Item = (Entity, Vec3, f32)>) -> Self {
        Self {
            hurtboxes: hurtboxes.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.hurtboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hurtboxes.is_empty()
    }
}

impl HitScanner for HurtboxScanner {
    fn sweep_for_actors(&self, origin: Vec3, end: Vec3, radius: f32, exclude: Entity) -> Vec<Entity> {
        let mut struck: Vec<Entity> = self
            .hurtboxes
            .iter()
            .filter(|(entity, _, _)| *entity != exclude)
            .filter(|(_, center, hurtbox_radius)| {
                distance_to_segment(*center, origin, end) <= radius + hurtbox_radius
            })
            .map(|(entity, _, _)| *entity)
            .collect();

        struck.sort();
        struck.dedup();
        struck
    }
}

/// `DamageApplier` that queues `ApplyDamage` events for the health model.
#[derive(Debug, Default)]
pub struct DamageQueue {
    pub requests: Vec<ApplyDamage>,
}

impl DamageApplier for DamageQueue {
    fn apply_damage(
        &mut self,
        target: Entity,
        amount: u32,
        instigator_controller: Option<Entity>,
        instigator: Entity,
    ) {
        self.requests.push(ApplyDamage {
            target,
            amount,
            instigator_controller,
            instigator,
        });
    }
}
