//! Test doubles for the combat collaborators.
//!
//! The real `CombatTimers` doubles as the timer service.

use bevy::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;

use super::context::{CombatActor, CombatContext};
use super::hit_check::{DamageApplier, HitScanner};
use crate::animation::{AnimationPlayer, ClipId, CompletionListener, PlaybackId};
use crate::components::LocomotionMode;
use crate::timer::{CombatTimers, TimerHandle};

pub fn entities(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnimCall {
    Play(ClipId),
    Stop,
    Subscribe(CompletionListener),
    Unsubscribe(CompletionListener),
}

/// Animation player with fixed clip durations; unknown clips fail with 0.0.
///
/// Playbacks never end on their own: tests deliver completions by hand.
#[derive(Debug, Default)]
pub struct ScriptedAnimator {
    durations: HashMap<ClipId, f32>,
    listeners: Vec<CompletionListener>,
    playing: Option<PlaybackId>,
    started: u64,
    pub calls: Vec<AnimCall>,
}

impl ScriptedAnimator {
    pub fn played(&self) -> Vec<ClipId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                AnimCall::Play(clip) => Some(clip.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_subscribed(&self, listener: CompletionListener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn playing(&self) -> Option<PlaybackId> {
        self.playing
    }
}

impl AnimationPlayer for ScriptedAnimator {
    fn play_clip(&mut self, clip: &ClipId) -> f32 {
        self.calls.push(AnimCall::Play(clip.clone()));
        let duration = self.durations.get(clip).copied().unwrap_or(0.0);
        if duration > 0.0 {
            self.started += 1;
            self.playing = Some(PlaybackId::new(self.started));
        }
        duration
    }

    fn current_playback(&self) -> Option<PlaybackId> {
        self.playing
    }

    fn stop_clip(&mut self) {
        self.calls.push(AnimCall::Stop);
        self.playing = None;
    }

    fn subscribe_completed(&mut self, listener: CompletionListener) {
        self.calls.push(AnimCall::Subscribe(listener));
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    fn unsubscribe_completed(&mut self, listener: CompletionListener) {
        self.calls.push(AnimCall::Unsubscribe(listener));
        self.listeners.retain(|existing| *existing != listener);
    }
}

#[derive(Debug)]
pub struct TestActor {
    pub entity: Entity,
    pub controller: Option<Entity>,
    pub dead: bool,
    pub control_enabled: bool,
    pub collision_enabled: bool,
    pub locomotion: LocomotionMode,
    pub socket: Option<Vec3>,
    pub forward: Vec3,
}

impl TestActor {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            controller: None,
            dead: false,
            control_enabled: true,
            collision_enabled: true,
            locomotion: LocomotionMode::Walking,
            socket: Some(Vec3::new(0.0, 1.0, 0.0)),
            forward: Vec3::NEG_Z,
        }
    }
}

impl CombatActor for TestActor {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn controller(&self) -> Option<Entity> {
        self.controller
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn is_control_enabled(&self) -> bool {
        self.control_enabled
    }

    fn set_control_enabled(&mut self, enabled: bool) {
        self.control_enabled = enabled;
    }

    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    fn set_locomotion(&mut self, mode: LocomotionMode) {
        self.locomotion = mode;
    }

    fn socket_location(&self, _socket: &str) -> Option<Vec3> {
        self.socket
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }
}

/// Scanner returning a fixed hit list and recording every sweep.
#[derive(Debug, Default)]
pub struct FixedScanner {
    pub hits: Vec<Entity>,
    pub sweeps: RefCell<Vec<(Vec3, Vec3, f32, Entity)>>,
}

impl HitScanner for FixedScanner {
    fn sweep_for_actors(&self, origin: Vec3, end: Vec3, radius: f32, exclude: Entity) -> Vec<Entity> {
        self.sweeps.borrow_mut().push((origin, end, radius, exclude));
        self.hits.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingDamage {
    pub calls: Vec<(Entity, u32, Option<Entity>, Entity)>,
}

impl DamageApplier for RecordingDamage {
    fn apply_damage(
        &mut self,
        target: Entity,
        amount: u32,
        instigator_controller: Option<Entity>,
        instigator: Entity,
    ) {
        self.calls.push((target, amount, instigator_controller, instigator));
    }
}

/// Collaborators of one character, lent out as a `CombatContext`.
pub struct Rig {
    pub animator: ScriptedAnimator,
    pub has_animation: bool,
    pub timers: CombatTimers,
    pub actor: TestActor,
}

impl Rig {
    pub fn with_clips<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let animator = ScriptedAnimator {
            durations: clips
                .into_iter()
                .map(|(clip, duration)| (ClipId::new(clip), duration))
                .collect(),
            ..Default::default()
        };

        Self {
            animator,
            has_animation: true,
            timers: CombatTimers::default(),
            actor: TestActor::new(entities(1)[0]),
        }
    }

    pub fn ctx(&mut self) -> CombatContext<'_> {
        CombatContext {
            animation: if self.has_animation {
                Some(&mut self.animator as &mut dyn AnimationPlayer)
            } else {
                None
            },
            timers: &mut self.timers,
            actor: &mut self.actor,
        }
    }

    /// Fire every pending timer.
    pub fn expire_all_timers(&mut self) -> Vec<TimerHandle> {
        self.timers
            .tick(f32::MAX)
            .into_iter()
            .map(|(handle, _)| handle)
            .collect()
    }
}
