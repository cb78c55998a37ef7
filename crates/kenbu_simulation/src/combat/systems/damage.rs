//! Health model systems: damage application, invincibility, death.

use bevy::prelude::*;

use crate::animation::ClipPlayer;
use crate::combat::damage::{ApplyDamage, DamageDealt, Dead, EntityDied};
use crate::components::{Health, Invincibility};
use crate::logger;
use crate::timer::{CombatTimers, TimerExpired, TimerPurpose, TimerService};

/// Система: apply damage от ApplyDamage запросов
///
/// 1. Мертвые и неуязвимые игнорируют урон
/// 2. Применяем damage к Health
/// 3. Летальный удар → Dead + EntityDied, иначе → окно неуязвимости
/// 4. DamageDealt на каждый применённый удар
pub fn apply_damage(
    mut requests: EventReader<ApplyDamage>,
    mut targets: Query<(&mut Health, Option<&mut Invincibility>, Option<&mut CombatTimers>)>,
    mut commands: Commands,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok((mut health, invincibility, timers)) = targets.get_mut(request.target) else {
            logger::log_warning(&format!(
                "⚠️ Damage: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        if !health.is_alive() {
            logger::log(&format!("Damage: {:?} is dead, hit ignored", request.target));
            continue;
        }
        if invincibility.as_ref().is_some_and(|inv| inv.is_active()) {
            logger::log(&format!("Damage: {:?} is invincible, hit ignored", request.target));
            continue;
        }

        health.take_damage(request.amount);
        let target_died = !health.is_alive();

        damage_dealt_events.write(DamageDealt {
            attacker: request.instigator,
            instigator_controller: request.instigator_controller,
            target: request.target,
            damage: request.amount,
            target_died,
        });

        if target_died {
            commands.entity(request.target).insert(Dead);
            entity_died_events.write(EntityDied {
                entity: request.target,
                killer: Some(request.instigator),
            });

            logger::log_info(&format!(
                "💀 Entity {:?} killed by {:?}",
                request.target, request.instigator
            ));
            continue;
        }

        logger::log_info(&format!(
            "Damage: {:?} → {:?} ({} damage, health: {}/{})",
            request.instigator, request.target, request.amount, health.current, health.max
        ));

        if let (Some(mut invincibility), Some(mut timers)) = (invincibility, timers) {
            if invincibility.duration > 0.0 {
                let handle = timers.schedule(invincibility.duration, TimerPurpose::Invincibility);
                invincibility.active = Some(handle);
            }
        }
    }
}

/// Система: конец окна неуязвимости
pub fn expire_invincibility(
    mut expired: EventReader<TimerExpired>,
    mut query: Query<&mut Invincibility>,
) {
    for event in expired.read() {
        if event.purpose != TimerPurpose::Invincibility {
            continue;
        }
        let Ok(mut invincibility) = query.get_mut(event.actor) else {
            continue;
        };

        if invincibility.active == Some(event.handle) {
            invincibility.active = None;
            logger::log(&format!("Damage: {:?} invincibility ended", event.actor));
        }
    }
}

/// Система: смерть прерывает текущий клип (combo получит interrupted completion)
pub fn interrupt_attacks_on_death(
    mut deaths: EventReader<EntityDied>,
    mut players: Query<&mut ClipPlayer>,
) {
    for death in deaths.read() {
        let Ok(mut player) = players.get_mut(death.entity) else {
            continue;
        };

        if player.stop() {
            logger::log(&format!("Anim: {:?} clip interrupted by death", death.entity));
        }
    }
}
