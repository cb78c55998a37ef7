//! Character context handed to the combat state machines.
//!
//! State machines never query the world themselves: each call gets a
//! `CombatContext` with exactly the collaborators it may touch.

use bevy::prelude::*;

use crate::animation::{AnimationPlayer, ClipLibrary, ClipPlayer, LibraryPlayer};
use crate::components::{CharacterBody, ControlledBy, Health, LocomotionMode, WeaponSockets};
use crate::timer::{CombatTimers, TimerService};

/// Character-state queries and toggles consumed by combat.
pub trait CombatActor {
    fn entity(&self) -> Entity;

    /// Controller credited as damage instigator
    fn controller(&self) -> Option<Entity>;

    fn is_dead(&self) -> bool;

    fn is_control_enabled(&self) -> bool;

    fn set_control_enabled(&mut self, enabled: bool);

    fn set_collision_enabled(&mut self, enabled: bool);

    fn set_locomotion(&mut self, mode: LocomotionMode);

    /// World-space location of a named weapon socket.
    fn socket_location(&self, socket: &str) -> Option<Vec3>;

    /// World-space forward (unit length).
    fn forward(&self) -> Vec3;
}

/// Collaborators available to one state-machine call.
///
/// `animation` is `None` when the character has no player instance.
pub struct CombatContext<'a> {
    pub animation: Option<&'a mut dyn AnimationPlayer>,
    pub timers: &'a mut dyn TimerService,
    pub actor: &'a mut dyn CombatActor,
}

/// `CombatActor` over a character's ECS components.
pub struct CharacterView<'a> {
    pub entity: Entity,
    pub body: Mut<'a, CharacterBody>,
    pub transform: &'a Transform,
    pub health: Option<&'a Health>,
    pub sockets: Option<&'a WeaponSockets>,
    pub controller: Option<Entity>,
}

impl CombatActor for CharacterView<'_> {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn controller(&self) -> Option<Entity> {
        self.controller
    }

    fn is_dead(&self) -> bool {
        self.health.is_some_and(|health| !health.is_alive())
    }

    fn is_control_enabled(&self) -> bool {
        self.body.control_enabled
    }

    // Пишем только при изменении, чтобы не дёргать Changed<CharacterBody>
    fn set_control_enabled(&mut self, enabled: bool) {
        if self.body.control_enabled != enabled {
            self.body.control_enabled = enabled;
        }
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        if self.body.collision_enabled != enabled {
            self.body.collision_enabled = enabled;
        }
    }

    fn set_locomotion(&mut self, mode: LocomotionMode) {
        if self.body.locomotion != mode {
            self.body.locomotion = mode;
        }
    }

    fn socket_location(&self, socket: &str) -> Option<Vec3> {
        let offset = self.sockets?.local_offset(socket)?;
        Some(self.transform.transform_point(offset))
    }

    fn forward(&self) -> Vec3 {
        self.transform.forward().as_vec3()
    }
}

/// Query data shared by every system that drives a combat state machine `T`.
pub type CombatantData<T> = (
    Entity,
    &'static mut T,
    Option<&'static mut ClipPlayer>,
    &'static mut CombatTimers,
    &'static mut CharacterBody,
    &'static Transform,
    Option<&'static Health>,
    Option<&'static WeaponSockets>,
    Option<&'static ControlledBy>,
);

/// Item produced by a `Query<CombatantData<T>>`.
pub type CombatantItem<'a, T> = (
    Entity,
    Mut<'a, T>,
    Option<Mut<'a, ClipPlayer>>,
    Mut<'a, CombatTimers>,
    Mut<'a, CharacterBody>,
    &'a Transform,
    Option<&'a Health>,
    Option<&'a WeaponSockets>,
    Option<&'a ControlledBy>,
);

/// Everything of a combatant except its state machine.
pub struct CombatantParts<'a> {
    pub entity: Entity,
    pub player: Option<Mut<'a, ClipPlayer>>,
    pub timers: Mut<'a, CombatTimers>,
    pub body: Mut<'a, CharacterBody>,
    pub transform: &'a Transform,
    pub health: Option<&'a Health>,
    pub sockets: Option<&'a WeaponSockets>,
    pub controller: Option<Entity>,
}

/// Split a query item into the state machine and its collaborators.
pub fn split_combatant<T>(item: CombatantItem<'_, T>) -> (Mut<'_, T>, CombatantParts<'_>) {
    let (entity, machine, player, timers, body, transform, health, sockets, controller) = item;
    (
        machine,
        CombatantParts {
            entity,
            player,
            timers,
            body,
            transform,
            health,
            sockets,
            controller: controller.map(|controlled| controlled.0),
        },
    )
}

impl CombatantParts<'_> {
    pub fn is_subscribed(&self, listener: crate::animation::CompletionListener) -> bool {
        self.player
            .as_ref()
            .is_some_and(|player| player.is_subscribed(listener))
    }

    /// Build a `CombatContext` over these parts and run `f` with it.
    pub fn run<R>(self, library: &ClipLibrary, f: impl FnOnce(&mut CombatContext<'_>) -> R) -> R {
        let mut animation = self.player.map(|player| LibraryPlayer { library, player });
        let mut timers = self.timers;
        let mut view = CharacterView {
            entity: self.entity,
            body: self.body,
            transform: self.transform,
            health: self.health,
            sockets: self.sockets,
            controller: self.controller,
        };

        let mut ctx = CombatContext {
            animation: animation
                .as_mut()
                .map(|player| player as &mut dyn AnimationPlayer),
            timers: &mut *timers,
            actor: &mut view,
        };

        f(&mut ctx)
    }
}
