//! Combo systems: input, notifies, hit checks, completions, window timers.
//!
//! Каждая система достаёт combatant, строит CombatContext и зовёт
//! соответствующий метод ComboEngine. Identity checks (playback, handle,
//! subscription) делаются здесь и в самом engine.

use bevy::prelude::*;

use crate::animation::{AnimNotify, AnimNotifyFired, ClipCompleted, ClipLibrary, CompletionListener};
use crate::combat::combo::ComboEngine;
use crate::combat::context::{split_combatant, CharacterView, CombatantData};
use crate::combat::damage::ApplyDamage;
use crate::combat::hit_check::{DamageQueue, HurtboxScanner};
use crate::components::{CharacterBody, ControlledBy, Health, Hurtbox, WeaponSockets};
use crate::input::AttackPressed;
use crate::logger;
use crate::timer::{TimerExpired, TimerPurpose};

/// Система: AttackPressed → ComboEngine::attempt_attack
pub fn handle_attack_input(
    mut presses: EventReader<AttackPressed>,
    library: Res<ClipLibrary>,
    mut combatants: Query<CombatantData<ComboEngine>>,
) {
    for press in presses.read() {
        let Ok(item) = combatants.get_mut(press.actor) else {
            logger::log(&format!("Input: attack press for {:?} without combo ignored", press.actor));
            continue;
        };

        let (mut engine, parts) = split_combatant(item);
        parts.run(&library, |ctx| engine.attempt_attack(ctx));
    }
}

/// Система: ComboWindow notify текущего stage clip → on_window_opened
pub fn dispatch_combo_notifies(
    mut notifies: EventReader<AnimNotifyFired>,
    library: Res<ClipLibrary>,
    mut combatants: Query<CombatantData<ComboEngine>>,
) {
    for event in notifies.read() {
        let AnimNotify::ComboWindow { can_enter } = event.notify else {
            continue;
        };
        let Ok(item) = combatants.get_mut(event.actor) else {
            continue;
        };

        let (mut engine, parts) = split_combatant(item);
        if engine.current_playback() != Some(event.playback) {
            logger::log(&format!(
                "Combo {:?}: window notify from '{}' (playback {}) is not the current stage playback",
                event.actor,
                event.clip,
                event.playback.id()
            ));
            continue;
        }

        parts.run(&library, |ctx| engine.on_window_opened(ctx, can_enter));
    }
}

/// Система: HitCheck notify текущего stage clip → sweep + ApplyDamage
pub fn perform_hit_checks(
    mut notifies: EventReader<AnimNotifyFired>,
    mut attackers: Query<(
        Entity,
        &ComboEngine,
        &mut CharacterBody,
        &Transform,
        Option<&Health>,
        Option<&WeaponSockets>,
        Option<&ControlledBy>,
    )>,
    targets: Query<(Entity, &Transform, &Hurtbox)>,
    mut damage_events: EventWriter<ApplyDamage>,
) {
    let mut scanner: Option<HurtboxScanner> = None;
    let mut queue = DamageQueue::default();

    for event in notifies.read() {
        if event.notify != AnimNotify::HitCheck {
            continue;
        }
        let Ok((entity, engine, body, transform, health, sockets, controller)) =
            attackers.get_mut(event.actor)
        else {
            continue;
        };

        if engine.current_playback() != Some(event.playback) {
            logger::log(&format!(
                "Combo {:?}: hit check from '{}' (playback {}) is not the current stage playback",
                event.actor,
                event.clip,
                event.playback.id()
            ));
            continue;
        }

        // Snapshot hurtboxes один раз на тик
        let scanner = scanner.get_or_insert_with(|| {
            HurtboxScanner::new(
                targets
                    .iter()
                    .map(|(target, transform, hurtbox)| (target, hurtbox.center(transform), hurtbox.radius)),
            )
        });

        let view = CharacterView {
            entity,
            body,
            transform,
            health,
            sockets,
            controller: controller.map(|controlled| controlled.0),
        };
        engine.perform_hit_check(&view, &*scanner, &mut queue);
    }

    for request in queue.requests {
        damage_events.write(request);
    }
}

/// Система: ClipCompleted(Combo) → on_clip_completed
pub fn dispatch_combo_completions(
    mut completions: EventReader<ClipCompleted>,
    library: Res<ClipLibrary>,
    mut combatants: Query<CombatantData<ComboEngine>>,
) {
    for event in completions.read() {
        if event.listener != CompletionListener::Combo {
            continue;
        }
        let Ok(item) = combatants.get_mut(event.actor) else {
            continue;
        };

        let (mut engine, parts) = split_combatant(item);
        if !parts.is_subscribed(CompletionListener::Combo) {
            logger::log(&format!(
                "Combo {:?}: completion of '{}' after unsubscribe ignored",
                event.actor, event.clip
            ));
            continue;
        }

        parts.run(&library, |ctx| engine.on_clip_completed(ctx, event.playback, event.interrupted));
    }
}

/// Система: TimerExpired(ComboWindow) → on_window_timer_expired
pub fn dispatch_combo_timers(
    mut expired: EventReader<TimerExpired>,
    library: Res<ClipLibrary>,
    mut combatants: Query<CombatantData<ComboEngine>>,
) {
    for event in expired.read() {
        if event.purpose != TimerPurpose::ComboWindow {
            continue;
        }
        let Ok(item) = combatants.get_mut(event.actor) else {
            continue;
        };

        let (mut engine, parts) = split_combatant(item);
        parts.run(&library, |ctx| engine.on_window_timer_expired(ctx, event.handle));
    }
}
