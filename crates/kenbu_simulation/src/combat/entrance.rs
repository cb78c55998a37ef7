//! Entrance Gate: one-shot intro lock.
//!
//! `Idle → Playing → Finished`. Finished is terminal and always leaves
//! control, collision and locomotion enabled.

use bevy::prelude::*;

use super::context::CombatContext;
use crate::animation::{ClipId, CompletionListener, PlaybackId};
use crate::components::{CharacterBody, LocomotionMode};
use crate::logger;
use crate::timer::CombatTimers;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EntrancePhase {
    #[default]
    Idle,
    Playing,
    Finished,
}

/// Intro animation gate, begun on the first tick after spawn.
#[derive(Component, Debug, Clone)]
#[require(CombatTimers, CharacterBody, Transform)]
pub struct EntranceGate {
    intro_clip: Option<ClipId>,
    phase: EntrancePhase,
    playback: Option<PlaybackId>,
}

impl EntranceGate {
    pub fn new(intro_clip: Option<ClipId>) -> Self {
        Self {
            intro_clip,
            phase: EntrancePhase::Idle,
            playback: None,
        }
    }

    /// Start the intro. Without a playable clip the gate finishes at once.
    pub fn begin(&mut self, ctx: &mut CombatContext<'_>) -> EntrancePhase {
        if self.phase != EntrancePhase::Idle {
            logger::log(&format!(
                "Entrance {:?}: begin ignored in {:?}",
                ctx.actor.entity(),
                self.phase
            ));
            return self.phase;
        }

        let entity = ctx.actor.entity();

        let Some(clip) = self.intro_clip.clone() else {
            logger::log_warning(&format!("⚠️ Entrance {:?}: no intro clip configured", entity));
            self.finish(ctx, "no intro clip");
            return self.phase;
        };

        let Some(animation) = ctx.animation.as_deref_mut() else {
            logger::log_warning(&format!("⚠️ Entrance {:?}: no animation player", entity));
            self.finish(ctx, "no animation player");
            return self.phase;
        };

        let duration = animation.play_clip(&clip);
        if !(duration > 0.0) {
            logger::log_warning(&format!(
                "⚠️ Entrance {:?}: failed to play '{}' (duration {})",
                entity, clip, duration
            ));
            self.finish(ctx, "intro clip failed to play");
            return self.phase;
        }

        animation.subscribe_completed(CompletionListener::Entrance);
        self.playback = animation.current_playback();

        ctx.actor.set_control_enabled(false);
        ctx.actor.set_collision_enabled(false);
        ctx.actor.set_locomotion(LocomotionMode::Disabled);
        self.phase = EntrancePhase::Playing;

        logger::log_info(&format!(
            "🎬 Entrance {:?}: playing '{}' ({:.2}s), control locked",
            entity, clip, duration
        ));
        self.phase
    }

    /// In-clip "entrance finished" marker. Idempotent.
    pub fn notify_finished(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        if self.phase != EntrancePhase::Playing {
            logger::log(&format!(
                "Entrance {:?}: finish notify ignored in {:?}",
                ctx.actor.entity(),
                self.phase
            ));
            return false;
        }

        self.finish(ctx, "notify");
        true
    }

    /// Safety net for a missing or broken finish marker.
    pub fn on_clip_completed(
        &mut self,
        ctx: &mut CombatContext<'_>,
        playback: PlaybackId,
        interrupted: bool,
    ) -> bool {
        if self.phase != EntrancePhase::Playing || self.playback != Some(playback) {
            logger::log(&format!(
                "Entrance {:?}: stale completion of playback {} ignored",
                ctx.actor.entity(),
                playback.id()
            ));
            return false;
        }

        let reason = if interrupted {
            "intro interrupted"
        } else {
            "intro ended without finish notify"
        };
        self.finish(ctx, reason);
        true
    }

    fn finish(&mut self, ctx: &mut CombatContext<'_>, reason: &str) {
        if let Some(animation) = ctx.animation.as_deref_mut() {
            animation.unsubscribe_completed(CompletionListener::Entrance);
        }

        ctx.actor.set_control_enabled(true);
        ctx.actor.set_collision_enabled(true);
        ctx.actor.set_locomotion(LocomotionMode::Walking);
        self.phase = EntrancePhase::Finished;
        self.playback = None;

        logger::log_info(&format!(
            "🎬 Entrance {:?}: finished ({}), control enabled",
            ctx.actor.entity(),
            reason
        ));
    }

    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == EntrancePhase::Playing
    }

    pub fn intro_clip(&self) -> Option<&ClipId> {
        self.intro_clip.as_ref()
    }

    /// Intro playback while `Playing`.
    pub fn playback(&self) -> Option<PlaybackId> {
        self.playback
    }
}
