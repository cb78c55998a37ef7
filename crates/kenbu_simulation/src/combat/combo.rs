//! Combo Engine: multi-stage melee combo state machine.
//!
//! ```text
//! Idle ──attack──▶ Attacking{k, closed} ──window(true)──▶ Attacking{k, open}
//!                    │  attack → buffer                     │ attack / buffered → Attacking{k+1, closed}
//!                    │  timer → Idle                        │ last stage attack → Idle (chain broken)
//!                    └──────── stage clip completed ────────┴──▶ Idle
//! ```
//!
//! Единственный путь в Idle это `reset_combo`, он отменяет таймер окна,
//! снимает подписку на completion, останавливает свой stage clip и
//! возвращает locomotion. Completions и notifies принимаются только от
//! playback, который engine запустил сам (`PlaybackId`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::context::{CombatActor, CombatContext};
use super::hit_check::{DamageApplier, HitScanner};
use crate::animation::{ClipId, CompletionListener, PlaybackId};
use crate::components::{CharacterBody, LocomotionMode};
use crate::config::{CombatConfig, ComboTuning, HitCheckConfig};
use crate::logger;
use crate::timer::{CombatTimers, TimerHandle, TimerPurpose};

/// One stage of a combo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboStage {
    pub clip: ClipId,
}

/// Ordered combo stages (shared, read-only).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDefinition {
    pub stages: Vec<ComboStage>,
}

impl ComboDefinition {
    pub fn from_clips<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stages: clips
                .into_iter()
                .map(|clip| ComboStage {
                    clip: ClipId::new(clip),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, index: usize) -> Option<&ComboStage> {
        self.stages.get(index)
    }

    pub fn clip(&self, index: usize) -> Option<&ClipId> {
        self.stage(index).map(|stage| &stage.clip)
    }
}

/// Combo state. `Attacking::window_open` is the "can advance" flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ComboPhase {
    #[default]
    Idle,
    Attacking { stage: usize, window_open: bool },
}

/// What an attack press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Dead or control disabled
    Ignored,
    /// Stage 0 started from Idle
    Started,
    /// Window was open, next stage started
    Advanced,
    /// Window closed, press remembered
    Buffered,
    /// Stage could not be played or chain was broken
    Reset,
}

/// Per-character combo state machine.
#[derive(Component, Debug, Clone)]
#[require(CombatTimers, CharacterBody, Transform)]
pub struct ComboEngine {
    definition: Arc<ComboDefinition>,
    tuning: ComboTuning,
    hit_check: HitCheckConfig,
    phase: ComboPhase,
    buffered_input: bool,
    window_timer: Option<TimerHandle>,
    playback: Option<PlaybackId>,
}

impl ComboEngine {
    pub fn new(definition: Arc<ComboDefinition>, tuning: ComboTuning, hit_check: HitCheckConfig) -> Self {
        Self {
            definition,
            tuning,
            hit_check,
            phase: ComboPhase::Idle,
            buffered_input: false,
            window_timer: None,
            playback: None,
        }
    }

    pub fn from_config(definition: Arc<ComboDefinition>, config: &CombatConfig) -> Self {
        Self::new(definition, config.combo, config.hit_check.clone())
    }

    /// One discrete attack press.
    pub fn attempt_attack(&mut self, ctx: &mut CombatContext<'_>) -> AttackOutcome {
        if ctx.actor.is_dead() || !ctx.actor.is_control_enabled() {
            logger::log(&format!(
                "Combo {:?}: attack ignored (dead or control disabled)",
                ctx.actor.entity()
            ));
            return AttackOutcome::Ignored;
        }

        match self.phase {
            ComboPhase::Idle => {
                if self.play_stage(ctx, 0) {
                    AttackOutcome::Started
                } else {
                    AttackOutcome::Reset
                }
            }
            ComboPhase::Attacking { window_open: true, .. } => {
                let advanced = self.try_advance(ctx);
                self.buffered_input = false;
                if advanced {
                    AttackOutcome::Advanced
                } else {
                    AttackOutcome::Reset
                }
            }
            ComboPhase::Attacking { stage, window_open: false } => {
                self.buffered_input = true;
                logger::log(&format!(
                    "Combo {:?}: input buffered at stage {}",
                    ctx.actor.entity(),
                    stage
                ));
                AttackOutcome::Buffered
            }
        }
    }

    /// Play the clip of `stage`. Any failure resets the combo.
    fn play_stage(&mut self, ctx: &mut CombatContext<'_>, stage: usize) -> bool {
        let entity = ctx.actor.entity();

        let Some(clip) = self.definition.clip(stage).cloned() else {
            logger::log_warning(&format!(
                "⚠️ Combo {:?}: no clip for stage {} ({} stages defined)",
                entity,
                stage,
                self.definition.len()
            ));
            self.reset_combo(ctx, "missing stage clip");
            return false;
        };

        let Some(animation) = ctx.animation.as_deref_mut() else {
            logger::log_warning(&format!("⚠️ Combo {:?}: no animation player", entity));
            self.reset_combo(ctx, "no animation player");
            return false;
        };

        // Прерывание предыдущего клипа не должно дойти до engine
        animation.unsubscribe_completed(CompletionListener::Combo);
        let duration = animation.play_clip(&clip);

        if !(duration > 0.0) {
            logger::log_warning(&format!(
                "⚠️ Combo {:?}: failed to play '{}' for stage {} (duration {})",
                entity, clip, stage, duration
            ));
            self.reset_combo(ctx, "stage clip failed to play");
            return false;
        }

        animation.subscribe_completed(CompletionListener::Combo);
        self.playback = animation.current_playback();
        if self.playback.is_none() {
            logger::log_warning(&format!(
                "⚠️ Combo {:?}: player reports no playback for '{}', completion will not match",
                entity, clip
            ));
        }

        self.phase = ComboPhase::Attacking {
            stage,
            window_open: false,
        };
        ctx.actor.set_locomotion(LocomotionMode::Disabled);

        if let Some(previous) = self.window_timer.take() {
            ctx.timers.cancel(previous);
        }
        let delay = self.tuning.fallback_delay(duration);
        self.window_timer = Some(ctx.timers.schedule(delay, TimerPurpose::ComboWindow));

        logger::log_info(&format!(
            "⚔️ Combo {:?}: stage {} '{}' ({:.2}s, window fallback {:.2}s)",
            entity, stage, clip, duration, delay
        ));
        true
    }

    /// Advance to the next stage if the window is open and one exists.
    fn try_advance(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        match self.phase {
            ComboPhase::Attacking {
                stage,
                window_open: true,
            } if stage + 1 < self.definition.len() => self.play_stage(ctx, stage + 1),
            _ => {
                self.reset_combo(ctx, "combo chain broken");
                false
            }
        }
    }

    /// Back to Idle: timer cancelled, completion unsubscribed, own stage clip
    /// stopped, locomotion restored.
    pub fn reset_combo(&mut self, ctx: &mut CombatContext<'_>, reason: &str) {
        if let Some(timer) = self.window_timer.take() {
            ctx.timers.cancel(timer);
        }

        let playback = self.playback.take();
        if let Some(animation) = ctx.animation.as_deref_mut() {
            animation.unsubscribe_completed(CompletionListener::Combo);
            // Чужой клип не трогаем, только тот что запустил engine
            if playback.is_some() && animation.current_playback() == playback {
                animation.stop_clip();
            }
        }

        let was_attacking = self.is_attacking();
        self.phase = ComboPhase::Idle;
        self.buffered_input = false;
        ctx.actor.set_locomotion(LocomotionMode::Walking);

        if was_attacking {
            logger::log_info(&format!("Combo {:?}: reset ({})", ctx.actor.entity(), reason));
        } else {
            logger::log(&format!("Combo {:?}: reset while idle ({})", ctx.actor.entity(), reason));
        }
    }

    /// In-clip window marker of the current stage.
    pub fn on_window_opened(&mut self, ctx: &mut CombatContext<'_>, can_enter: bool) {
        let ComboPhase::Attacking { stage, .. } = self.phase else {
            logger::log(&format!(
                "Combo {:?}: window notify while idle (stale)",
                ctx.actor.entity()
            ));
            return;
        };

        self.phase = ComboPhase::Attacking {
            stage,
            window_open: can_enter,
        };
        logger::log(&format!(
            "Combo {:?}: window {} at stage {}",
            ctx.actor.entity(),
            if can_enter { "open" } else { "closed" },
            stage
        ));

        if can_enter && self.buffered_input {
            self.buffered_input = false;
            self.try_advance(ctx);
        }
    }

    /// Window fallback timer fired. Returns true if the combo was reset.
    pub fn on_window_timer_expired(&mut self, ctx: &mut CombatContext<'_>, handle: TimerHandle) -> bool {
        if self.window_timer != Some(handle) {
            logger::log(&format!(
                "Combo {:?}: stale window timer {} ignored",
                ctx.actor.entity(),
                handle.id()
            ));
            return false;
        }
        self.window_timer = None;

        match self.phase {
            ComboPhase::Attacking {
                window_open: false, ..
            } => {
                self.reset_combo(ctx, "combo window timed out");
                true
            }
            _ => false,
        }
    }

    /// Completion of a playback (natural or interrupted). Authoritative for the current stage playback.
    pub fn on_clip_completed(
        &mut self,
        ctx: &mut CombatContext<'_>,
        playback: PlaybackId,
        interrupted: bool,
    ) -> bool {
        if !self.is_attacking() || self.playback != Some(playback) {
            logger::log(&format!(
                "Combo {:?}: stale completion of playback {} ignored",
                ctx.actor.entity(),
                playback.id()
            ));
            return false;
        }

        let reason = if interrupted {
            "stage clip interrupted"
        } else {
            "stage clip finished"
        };
        self.reset_combo(ctx, reason);
        true
    }

    /// Contact frame: sweep from the weapon socket along forward, damage every struck actor once.
    pub fn perform_hit_check(
        &self,
        actor: &dyn CombatActor,
        scanner: &dyn HitScanner,
        damage: &mut dyn DamageApplier,
    ) -> Vec<Entity> {
        let attacker = actor.entity();

        let Some(origin) = actor.socket_location(&self.hit_check.socket) else {
            logger::log_warning(&format!(
                "⚠️ Combo {:?}: weapon socket '{}' missing, hit check skipped",
                attacker, self.hit_check.socket
            ));
            return Vec::new();
        };
        let end = origin + actor.forward() * self.hit_check.reach;

        let mut struck = scanner.sweep_for_actors(origin, end, self.hit_check.radius, attacker);
        struck.retain(|target| *target != attacker);
        struck.sort();
        struck.dedup();

        for target in &struck {
            damage.apply_damage(*target, self.hit_check.damage, actor.controller(), attacker);
        }

        logger::log_info(&format!(
            "🗡️ Combo {:?}: hit check struck {} actor(s)",
            attacker,
            struck.len()
        ));
        struck
    }

    pub fn phase(&self) -> ComboPhase {
        self.phase
    }

    /// Current stage index; 0 while idle.
    pub fn current_stage(&self) -> usize {
        match self.phase {
            ComboPhase::Attacking { stage, .. } => stage,
            ComboPhase::Idle => 0,
        }
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, ComboPhase::Attacking { .. })
    }

    pub fn can_advance(&self) -> bool {
        matches!(self.phase, ComboPhase::Attacking { window_open: true, .. })
    }

    pub fn has_buffered_input(&self) -> bool {
        self.buffered_input
    }

    pub fn window_timer(&self) -> Option<TimerHandle> {
        self.window_timer
    }

    /// Clip of the stage being played.
    pub fn current_clip(&self) -> Option<&ClipId> {
        match self.phase {
            ComboPhase::Attacking { stage, .. } => self.definition.clip(stage),
            ComboPhase::Idle => None,
        }
    }

    /// Playback of the stage being played.
    pub fn current_playback(&self) -> Option<PlaybackId> {
        self.playback
    }
}
