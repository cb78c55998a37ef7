//! Tests for health model systems.

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;

    use super::super::damage::{apply_damage, expire_invincibility, interrupt_attacks_on_death};
    use crate::animation::{ClipPlayer, ClipSpec, CompletionListener, PlaybackSignal};
    use crate::combat::{ApplyDamage, DamageDealt, Dead, EntityDied};
    use crate::components::{Health, Invincibility};
    use crate::timer::{CombatTimers, TimerExpired, TimerPurpose, TimerService};

    fn damage_world() -> World {
        let mut world = World::new();
        world.init_resource::<Events<ApplyDamage>>();
        world.init_resource::<Events<DamageDealt>>();
        world.init_resource::<Events<EntityDied>>();
        world.init_resource::<Events<TimerExpired>>();
        world
    }

    fn hit(target: Entity, instigator: Entity, amount: u32) -> ApplyDamage {
        ApplyDamage {
            target,
            amount,
            instigator_controller: None,
            instigator,
        }
    }

    fn dealt(world: &World) -> Vec<DamageDealt> {
        world
            .resource::<Events<DamageDealt>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    #[test]
    fn test_non_lethal_hit_starts_invincibility() {
        let mut world = damage_world();
        let attacker = world.spawn_empty().id();
        let target = world
            .spawn((Health::new(100), Invincibility::new(0.5), CombatTimers::default()))
            .id();

        // Второй удар в том же тике попадает в окно неуязвимости
        world.send_event(hit(target, attacker, 25));
        world.send_event(hit(target, attacker, 25));
        world.run_system_once(apply_damage).unwrap();

        assert_eq!(world.get::<Health>(target).unwrap().current, 75);
        let invincibility = world.get::<Invincibility>(target).unwrap();
        assert!(invincibility.is_active());
        let handle = invincibility.active.unwrap();
        assert!(world.get::<CombatTimers>(target).unwrap().is_pending(handle));

        let events = dealt(&world);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attacker, attacker);
        assert_eq!(events[0].damage, 25);
        assert!(!events[0].target_died);
    }

    #[test]
    fn test_lethal_hit_marks_dead() {
        let mut world = damage_world();
        let attacker = world.spawn_empty().id();
        let controller = world.spawn_empty().id();
        let target = world
            .spawn((Health::new(20), Invincibility::default(), CombatTimers::default()))
            .id();

        world.send_event(ApplyDamage {
            target,
            amount: 25,
            instigator_controller: Some(controller),
            instigator: attacker,
        });
        world.run_system_once(apply_damage).unwrap();

        assert_eq!(world.get::<Health>(target).unwrap().current, 0);
        assert!(world.get::<Dead>(target).is_some());
        assert!(!world.get::<Invincibility>(target).unwrap().is_active());

        let events = dealt(&world);
        assert_eq!(events.len(), 1);
        assert!(events[0].target_died);
        assert_eq!(events[0].instigator_controller, Some(controller));

        let deaths: Vec<EntityDied> = world
            .resource::<Events<EntityDied>>()
            .iter_current_update_events()
            .cloned()
            .collect();
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].entity, target);
        assert_eq!(deaths[0].killer, Some(attacker));
    }

    #[test]
    fn test_dead_target_ignores_damage() {
        let mut world = damage_world();
        let attacker = world.spawn_empty().id();
        let target = world.spawn(Health { current: 0, max: 100 }).id();

        world.send_event(hit(target, attacker, 10));
        world.run_system_once(apply_damage).unwrap();

        assert!(dealt(&world).is_empty());
        assert_eq!(world.get::<Health>(target).unwrap().current, 0);
    }

    #[test]
    fn test_target_without_health_is_skipped() {
        let mut world = damage_world();
        let attacker = world.spawn_empty().id();
        let target = world.spawn_empty().id();

        world.send_event(hit(target, attacker, 10));
        world.run_system_once(apply_damage).unwrap();

        assert!(dealt(&world).is_empty());
    }

    #[test]
    fn test_invincibility_expires_on_matching_timer() {
        let mut world = damage_world();
        let mut timers = CombatTimers::default();
        let stale = timers.schedule(0.1, TimerPurpose::Invincibility);
        let current = timers.schedule(0.5, TimerPurpose::Invincibility);
        let target = world
            .spawn((
                Invincibility {
                    duration: 0.5,
                    active: Some(current),
                },
                timers,
            ))
            .id();

        world.send_event(TimerExpired {
            actor: target,
            handle: stale,
            purpose: TimerPurpose::Invincibility,
        });
        world.run_system_once(expire_invincibility).unwrap();
        assert!(world.get::<Invincibility>(target).unwrap().is_active());

        world.send_event(TimerExpired {
            actor: target,
            handle: current,
            purpose: TimerPurpose::Invincibility,
        });
        world.run_system_once(expire_invincibility).unwrap();
        assert!(!world.get::<Invincibility>(target).unwrap().is_active());
    }

    #[test]
    fn test_death_interrupts_playing_clip() {
        let mut world = damage_world();
        let mut player = ClipPlayer::default();
        player.subscribe(CompletionListener::Combo);
        player.start(&ClipSpec::new("slash_1", 1.0));
        let playback = player.current_playback().unwrap();
        let victim = world.spawn(player).id();

        world.send_event(EntityDied {
            entity: victim,
            killer: None,
        });
        world.run_system_once(interrupt_attacks_on_death).unwrap();

        let mut player = world.get_mut::<ClipPlayer>(victim).unwrap();
        assert!(!player.is_playing());
        assert_eq!(
            player.drain_signals(),
            vec![PlaybackSignal::Completed {
                playback,
                clip: "slash_1".into(),
                listener: CompletionListener::Combo,
                interrupted: true,
            }]
        );
    }
}
