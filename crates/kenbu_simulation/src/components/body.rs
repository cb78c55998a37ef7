//! Character body: control/collision/locomotion flags, sockets, controller link.
//!
//! Combat state machines toggle these flags through `CombatActor`;
//! `sync_body_collision` mirrors `collision_enabled` onto the physics layer.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

/// Movement mode requested by combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum LocomotionMode {
    /// Normal ground locomotion
    #[default]
    Walking,
    /// Movement stopped and disabled (attacking, entrance)
    Disabled,
}

/// Player-facing state of a character's body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CharacterBody {
    /// Input accepted (false during entrance)
    pub control_enabled: bool,
    /// Physical collision enabled (false during entrance)
    pub collision_enabled: bool,
    pub locomotion: LocomotionMode,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            control_enabled: true,
            collision_enabled: true,
            locomotion: LocomotionMode::Walking,
        }
    }
}

/// Controller driving this character (damage instigator).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlledBy(pub Entity);

/// Named weapon sockets (local offsets from the character origin).
#[derive(Component, Debug, Clone, Default)]
pub struct WeaponSockets {
    sockets: Vec<(String, Vec3)>,
}

impl WeaponSockets {
    pub fn with_socket(mut self, name: impl Into<String>, local_offset: Vec3) -> Self {
        let name = name.into();
        self.sockets.retain(|(existing, _)| *existing != name);
        self.sockets.push((name, local_offset));
        self
    }

    pub fn local_offset(&self, name: &str) -> Option<Vec3> {
        self.sockets
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, offset)| *offset)
    }
}

/// System: mirror `CharacterBody::collision_enabled` onto rapier's `ColliderDisabled`.
pub fn sync_body_collision(
    bodies: Query<(Entity, &CharacterBody), Changed<CharacterBody>>,
    mut commands: Commands,
) {
    for (entity, body) in bodies.iter() {
        if body.collision_enabled {
            commands.entity(entity).remove::<ColliderDisabled>();
        } else {
            commands.entity(entity).insert(ColliderDisabled);
        }
    }
}
