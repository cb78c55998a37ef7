//! Timer service (one-shot, cancelable) owned per character.
//!
//! Вместо глобальной таблицы таймеров: у каждого актора свой `CombatTimers`,
//! handles выдаются монотонно и никогда не переиспользуются.

use bevy::prelude::*;

/// Opaque handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Which handler an expired timer is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Combo window safety net (see `ComboEngine::on_window_timer_expired`)
    ComboWindow,
    /// End of post-hit invincibility
    Invincibility,
}

/// Timer service capability.
pub trait TimerService {
    /// Schedule a one-shot timer. Non-positive delays fire on the next tick.
    fn schedule(&mut self, delay_secs: f32, purpose: TimerPurpose) -> TimerHandle;

    /// Idempotent: safe on fired, cancelled or unknown handles.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Clone, Debug)]
struct PendingTimer {
    handle: TimerHandle,
    purpose: TimerPurpose,
    remaining: f32,
}

/// Per-character timer table.
#[derive(Component, Clone, Debug, Default)]
pub struct CombatTimers {
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl CombatTimers {
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Remaining time of a pending timer.
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.remaining)
    }

    /// Advance all timers; returns expired ones in scheduling order.
    pub fn tick(&mut self, delta: f32) -> Vec<(TimerHandle, TimerPurpose)> {
        let mut expired = Vec::new();

        self.pending.retain_mut(|timer| {
            timer.remaining -= delta;
            if timer.remaining <= 0.0 {
                expired.push((timer.handle, timer.purpose));
                false
            } else {
                true
            }
        });

        expired
    }
}

impl TimerService for CombatTimers {
    fn schedule(&mut self, delay_secs: f32, purpose: TimerPurpose) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);

        // NaN/negative → fire на следующем тике
        let remaining = if delay_secs > 0.0 { delay_secs } else { 0.0 };

        self.pending.push(PendingTimer {
            handle,
            purpose,
            remaining,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|timer| timer.handle != handle);
    }
}

/// Event: timer fired.
#[derive(Event, Debug, Clone)]
pub struct TimerExpired {
    pub actor: Entity,
    pub handle: TimerHandle,
    pub purpose: TimerPurpose,
}

/// System: tick all character timers.
pub fn tick_combat_timers(
    mut query: Query<(Entity, &mut CombatTimers)>,
    time: Res<Time<Fixed>>,
    mut expired_events: EventWriter<TimerExpired>,
) {
    let delta = time.delta_secs();

    for (actor, mut timers) in query.iter_mut() {
        if timers.pending_count() == 0 {
            continue;
        }

        for (handle, purpose) in timers.tick(delta) {
            expired_events.write(TimerExpired { actor, handle, purpose });
        }
    }
}
