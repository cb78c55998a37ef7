//! Combat module: combo engine, entrance gate, hit check, health model.
//!
//! Core (engine-agnostic):
//! - ComboEngine / EntranceGate: state machines над CombatContext
//! - HitScanner / DamageApplier: hit check collaborators
//!
//! ECS ответственность:
//! - Events: AttackPressed, AnimNotifyFired, ClipCompleted, TimerExpired → state machines
//! - Health model: ApplyDamage → DamageDealt / EntityDied
//! - Collision flag → rapier ColliderDisabled

use bevy::prelude::*;

pub mod combo;
pub mod context;
pub mod damage;
pub mod entrance;
pub mod hit_check;
pub mod systems;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod entrance_tests;

// Re-export основных типов
pub use combo::{AttackOutcome, ComboDefinition, ComboEngine, ComboPhase, ComboStage};
pub use context::{
    split_combatant, CharacterView, CombatActor, CombatContext, CombatantData, CombatantItem,
    CombatantParts,
};
pub use damage::{ApplyDamage, DamageDealt, Dead, EntityDied};
pub use entrance::{EntranceGate, EntrancePhase};
pub use hit_check::{distance_to_segment, DamageApplier, DamageQueue, HitScanner, HurtboxScanner};

use crate::animation::{tick_clip_players, AnimNotifyFired, ClipCompleted};
use crate::components::sync_body_collision;
use crate::input::AttackPressed;
use crate::timer::{tick_combat_timers, TimerExpired};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz), одной цепочкой.
///
/// Порядок выполнения:
/// 1. begin_pending_entrances: intro на первом тике после spawn
/// 2. handle_attack_input: AttackPressed → attempt_attack
/// 3. tick_clip_players / tick_combat_timers: время, notifies, completions
/// 4. perform_hit_checks: до window notifies, чтобы contact frame стадии не потерялся при advance
/// 5. dispatch_*: notifies, completions, window timers
/// 6. apply_damage / expire_invincibility / interrupt_attacks_on_death
/// 7. sync_body_collision: CharacterBody → ColliderDisabled
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttackPressed>()
            .add_event::<AnimNotifyFired>()
            .add_event::<ClipCompleted>()
            .add_event::<TimerExpired>()
            .add_event::<ApplyDamage>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Entrance + input
                systems::begin_pending_entrances,
                systems::handle_attack_input,

                // Фаза 2: Animation + timers
                tick_clip_players,
                tick_combat_timers,

                // Фаза 3: Animation-driven transitions
                systems::perform_hit_checks,
                systems::dispatch_combo_notifies,
                systems::dispatch_entrance_notifies,
                systems::dispatch_combo_completions,
                systems::dispatch_entrance_completions,
                systems::dispatch_combo_timers,

                // Фаза 4: Health model
                systems::apply_damage,
                systems::expire_invincibility,
                systems::interrupt_attacks_on_death,

                // Фаза 5: Physics flags
                sync_body_collision,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
