//! Entrance systems: begin on first tick, finish by notify or completion.

use bevy::prelude::*;

use crate::animation::{AnimNotify, AnimNotifyFired, ClipCompleted, ClipLibrary, CompletionListener};
use crate::combat::context::{split_combatant, CombatantData};
use crate::combat::entrance::{EntranceGate, EntrancePhase};

/// Система: gates в Idle начинают intro (первый тик после spawn)
pub fn begin_pending_entrances(
    library: Res<ClipLibrary>,
    mut gates: Query<CombatantData<EntranceGate>>,
) {
    for item in gates.iter_mut() {
        let (mut gate, parts) = split_combatant(item);
        if gate.phase() != EntrancePhase::Idle {
            continue;
        }

        parts.run(&library, |ctx| gate.begin(ctx));
    }
}

/// Система: EntranceFinished notify intro clip → notify_finished
pub fn dispatch_entrance_notifies(
    mut notifies: EventReader<AnimNotifyFired>,
    library: Res<ClipLibrary>,
    mut gates: Query<CombatantData<EntranceGate>>,
) {
    for event in notifies.read() {
        if event.notify != AnimNotify::EntranceFinished {
            continue;
        }
        let Ok(item) = gates.get_mut(event.actor) else {
            continue;
        };

        let (mut gate, parts) = split_combatant(item);
        if gate.playback() != Some(event.playback) {
            continue;
        }

        parts.run(&library, |ctx| gate.notify_finished(ctx));
    }
}

/// Система: ClipCompleted(Entrance) → on_clip_completed (safety net)
pub fn dispatch_entrance_completions(
    mut completions: EventReader<ClipCompleted>,
    library: Res<ClipLibrary>,
    mut gates: Query<CombatantData<EntranceGate>>,
) {
    for event in completions.read() {
        if event.listener != CompletionListener::Entrance {
            continue;
        }
        let Ok(item) = gates.get_mut(event.actor) else {
            continue;
        };

        let (mut gate, parts) = split_combatant(item);
        parts.run(&library, |ctx| gate.on_clip_completed(ctx, event.playback, event.interrupted));
    }
}
