//! Spawn helpers для combatants и training dummies

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody};
use std::sync::Arc;

use crate::animation::{ClipId, ClipLibrary, ClipPlayer};
use crate::combat::{ComboDefinition, ComboEngine, EntranceGate};
use crate::components::{Actor, ControlledBy, Health, Invincibility, WeaponSockets};
use crate::config::{validate_combo, CombatConfig};
use crate::logger;

/// Левая рука, чуть впереди корпуса (local space, forward = -Z)
pub const DEFAULT_WEAPON_SOCKET_OFFSET: Vec3 = Vec3::new(-0.35, 1.2, -0.3);

/// Параметры spawn'а combo-capable персонажа
#[derive(Clone, Debug)]
pub struct CombatantSpawn {
    pub position: Vec3,
    /// Направление взгляда (горизонтальное)
    pub facing: Vec3,
    pub max_health: u32,
    pub combo: Arc<ComboDefinition>,
    pub intro_clip: Option<ClipId>,
    pub controller: Option<Entity>,
}

impl CombatantSpawn {
    pub fn new(combo: Arc<ComboDefinition>) -> Self {
        Self {
            position: Vec3::ZERO,
            facing: Vec3::NEG_Z,
            max_health: 100,
            combo,
            intro_clip: None,
            controller: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, direction: Vec3) -> Self {
        self.facing = direction;
        self
    }

    pub fn with_intro(mut self, clip: impl Into<String>) -> Self {
        self.intro_clip = Some(ClipId::new(clip));
        self
    }

    pub fn controlled_by(mut self, controller: Entity) -> Self {
        self.controller = Some(controller);
        self
    }
}

/// Spawn helper для combo-capable персонажа
///
/// Создает entity с полным набором компонентов:
/// - Actor (Required: Health, Invincibility, Hurtbox, CombatTimers)
/// - ComboEngine + ClipPlayer + WeaponSockets
/// - EntranceGate (если задан intro clip)
/// - Rapier: RigidBody + Collider (capsule)
///
/// Невалидный combo не блокирует spawn: warning в лог, атаки деградируют в reset.
pub fn spawn_combatant(
    commands: &mut Commands,
    config: &CombatConfig,
    library: &ClipLibrary,
    spawn: CombatantSpawn,
) -> Entity {
    if let Err(err) = validate_combo(&spawn.combo, library) {
        logger::log_warning(&format!("⚠️ Spawn: {}", err));
    }

    let stage_count = spawn.combo.len();
    let facing = if spawn.facing.length_squared() > f32::EPSILON {
        spawn.facing
    } else {
        Vec3::NEG_Z
    };

    let mut entity = commands.spawn((
        Transform::from_translation(spawn.position).looking_to(facing, Vec3::Y),
        Actor,
        Health::new(spawn.max_health),
        Invincibility::new(config.invincibility_duration),
        ComboEngine::from_config(spawn.combo, config),
        ClipPlayer::default(),
        WeaponSockets::default().with_socket(config.hit_check.socket.clone(), DEFAULT_WEAPON_SOCKET_OFFSET),
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(0.5, 0.4), // Высота 1.0m (0.5 + 0.5), радиус 0.4m
    ));

    if let Some(intro_clip) = spawn.intro_clip {
        entity.insert(EntranceGate::new(Some(intro_clip)));
    }
    if let Some(controller) = spawn.controller {
        entity.insert(ControlledBy(controller));
    }

    let id = entity.id();
    logger::log_info(&format!(
        "Spawn: combatant {:?} at {:?} ({} combo stages)",
        id, spawn.position, stage_count
    ));
    id
}

/// Spawn helper для манекена: hurtbox + health, без combo
pub fn spawn_training_dummy(
    commands: &mut Commands,
    config: &CombatConfig,
    position: Vec3,
    max_health: u32,
) -> Entity {
    let id = commands
        .spawn((
            Transform::from_translation(position),
            Actor,
            Health::new(max_health),
            Invincibility::new(config.invincibility_duration),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4),
        ))
        .id();

    logger::log_info(&format!("Spawn: training dummy {:?} at {:?}", id, position));
    id
}
