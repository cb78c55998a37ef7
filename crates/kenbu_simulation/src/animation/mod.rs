//! Animation playback (external collaborator boundary).
//!
//! # Architecture
//!
//! **Core (engine-agnostic):**
//! - `AnimationPlayer`: play a clip, get its duration, subscribe to completion
//! - `CompletionListener`: explicit handler identity (no dynamic delegates)
//! - `PlaybackId`: identity of one playback instance. Notifies и completions
//!   сравниваются по нему, не по имени клипа (один клип может играть дважды подряд)
//!
//! **ECS adapter (headless):**
//! - `ClipLibrary` resource: clip id → duration + notify markers
//! - `ClipPlayer` component: per-character playback state
//! - `AnimNotifyFired` / `ClipCompleted` events, delivered on the next tick
//!
//! # Flow
//!
//! ```text
//! ComboEngine::play_stage → AnimationPlayer::play_clip (duration)
//!   ↓
//! tick_clip_players: markers passed → AnimNotifyFired
//!   ↓
//! clip ended / interrupted → ClipCompleted (one per subscribed listener)
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod clip_player;


pub use clip_player::{
    tick_clip_players, ClipLibrary, ClipPlayer, ClipSpec, LibraryPlayer, NotifyMarker,
    PlaybackSignal,
};

/// Stable identifier of an animation clip (montage name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One started playback. Never reused on a character, even for the same clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(u64);

impl PlaybackId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Who is listening for clip completion on a character.
///
/// At most one registration per listener is live at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionListener {
    Combo,
    Entrance,
}

/// In-clip marker placed by animation authors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimNotify {
    /// Combo window opens (`can_enter = true`) or closes (`false`)
    ComboWindow { can_enter: bool },
    /// Contact frame: run the weapon sweep
    HitCheck,
    /// Intro animation reached the point where control comes back
    EntranceFinished,
}

/// Animation player capability consumed by the combat state machines.
pub trait AnimationPlayer {
    /// Start `clip`. Returns its duration in seconds; `<= 0.0` means playback failed
    /// and whatever was playing keeps playing.
    fn play_clip(&mut self, clip: &ClipId) -> f32;

    /// Playback currently running, if any.
    fn current_playback(&self) -> Option<PlaybackId>;

    /// Interrupt the current playback. No-op when nothing plays.
    fn stop_clip(&mut self);

    /// Idempotent: subscribing twice keeps a single registration.
    fn subscribe_completed(&mut self, listener: CompletionListener);

    /// Idempotent: safe when not subscribed.
    fn unsubscribe_completed(&mut self, listener: CompletionListener);
}

/// Event: an in-clip notify marker was passed.
#[derive(Event, Debug, Clone)]
pub struct AnimNotifyFired {
    pub actor: Entity,
    pub playback: PlaybackId,
    pub clip: ClipId,
    pub notify: AnimNotify,
}

/// Event: a clip ended (naturally or interrupted), addressed to one listener.
#[derive(Event, Debug, Clone)]
pub struct ClipCompleted {
    pub actor: Entity,
    pub listener: CompletionListener,
    pub playback: PlaybackId,
    pub clip: ClipId,
    pub interrupted: bool,
}
