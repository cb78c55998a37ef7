//! Headless clip player (ECS adapter for `AnimationPlayer`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    AnimNotify, AnimNotifyFired, AnimationPlayer, ClipCompleted, ClipId, CompletionListener, PlaybackId,
};

/// Authored timing of one clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub id: ClipId,
    /// Playback length (seconds). Non-positive → clip can't be played.
    pub duration: f32,
    #[serde(default)]
    pub notifies: Vec<NotifyMarker>,
}

impl ClipSpec {
    pub fn new(id: impl Into<String>, duration: f32) -> Self {
        Self {
            id: ClipId::new(id),
            duration,
            notifies: Vec::new(),
        }
    }

    /// Add a notify marker at `at` seconds into the clip.
    pub fn with_notify(mut self, at: f32, notify: AnimNotify) -> Self {
        self.notifies.push(NotifyMarker { at, notify });
        self
    }
}

/// Notify placed at a point in clip time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotifyMarker {
    pub at: f32,
    pub notify: AnimNotify,
}

/// All clips known to the simulation (shared, read-only at runtime).
#[derive(Resource, Clone, Debug, Default)]
pub struct ClipLibrary {
    clips: HashMap<ClipId, ClipSpec>,
}

impl ClipLibrary {
    pub fn from_specs(specs: impl IntoIterator<Item = ClipSpec>) -> Self {
        let mut library = Self::default();
        for spec in specs {
            library.insert(spec);
        }
        library
    }

    pub fn insert(&mut self, spec: ClipSpec) {
        self.clips.insert(spec.id.clone(), spec);
    }

    pub fn get(&self, clip: &ClipId) -> Option<&ClipSpec> {
        self.clips.get(clip)
    }

    pub fn contains(&self, clip: &ClipId) -> bool {
        self.clips.contains_key(clip)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Clip currently playing on a character.
#[derive(Clone, Debug)]
struct ActivePlayback {
    id: PlaybackId,
    clip: ClipId,
    elapsed: f32,
    duration: f32,
    markers: Vec<NotifyMarker>,
    next_marker: usize,
}

/// Signal queued by the player, flushed as an event on the next tick.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackSignal {
    Notify {
        playback: PlaybackId,
        clip: ClipId,
        notify: AnimNotify,
    },
    Completed {
        playback: PlaybackId,
        clip: ClipId,
        listener: CompletionListener,
        interrupted: bool,
    },
}

/// Per-character playback state (one montage slot).
///
/// Starting a clip while another plays interrupts the old one. Every
/// successful start gets a fresh `PlaybackId`. Completion is addressed to the listeners subscribed at the moment
/// playback ended; nothing is ever delivered inline.
#[derive(Component, Clone, Debug, Default)]
pub struct ClipPlayer {
    active: Option<ActivePlayback>,
    next_playback: u64,
    listeners: Vec<CompletionListener>,
    outbox: Vec<PlaybackSignal>,
}

impl ClipPlayer {
    /// Start playback of `spec`. Returns duration, or the non-positive
    /// duration unchanged (nothing started) when the clip is unplayable.
    pub fn start(&mut self, spec: &ClipSpec) -> f32 {
        if !(spec.duration > 0.0) {
            return spec.duration.min(0.0);
        }

        self.finish(true);

        let mut markers = spec.notifies.clone();
        markers.sort_by(|a, b| a.at.total_cmp(&b.at));

        self.next_playback += 1;
        self.active = Some(ActivePlayback {
            id: PlaybackId::new(self.next_playback),
            clip: spec.id.clone(),
            elapsed: 0.0,
            duration: spec.duration,
            markers,
            next_marker: 0,
        });

        spec.duration
    }

    /// Interrupt the playing clip (hit reaction, death). Returns false when idle.
    pub fn stop(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.finish(true);
        true
    }

    /// Advance playback time, queueing passed markers and natural completion.
    pub fn advance(&mut self, delta: f32) {
        let Some(playback) = self.active.as_mut() else {
            return;
        };

        playback.elapsed += delta;

        while let Some(marker) = playback.markers.get(playback.next_marker) {
            if marker.at > playback.elapsed {
                break;
            }
            self.outbox.push(PlaybackSignal::Notify {
                playback: playback.id,
                clip: playback.clip.clone(),
                notify: marker.notify.clone(),
            });
            playback.next_marker += 1;
        }

        if playback.elapsed >= playback.duration {
            self.finish(false);
        }
    }

    pub fn drain_signals(&mut self) -> Vec<PlaybackSignal> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_pending_signals(&self) -> bool {
        !self.outbox.is_empty()
    }

    pub fn current_clip(&self) -> Option<&ClipId> {
        self.active.as_ref().map(|playback| &playback.clip)
    }

    pub fn current_playback(&self) -> Option<PlaybackId> {
        self.active.as_ref().map(|playback| playback.id)
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_subscribed(&self, listener: CompletionListener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn subscribe(&mut self, listener: CompletionListener) {
        if !self.is_subscribed(listener) {
            self.listeners.push(listener);
        }
    }

    pub fn unsubscribe(&mut self, listener: CompletionListener) {
        self.listeners.retain(|existing| *existing != listener);
    }

    fn finish(&mut self, interrupted: bool) {
        let Some(playback) = self.active.take() else {
            return;
        };

        for listener in &self.listeners {
            self.outbox.push(PlaybackSignal::Completed {
                playback: playback.id,
                clip: playback.clip.clone(),
                listener: *listener,
                interrupted,
            });
        }
    }
}

/// `AnimationPlayer` over a character's `ClipPlayer` and the shared library.
pub struct LibraryPlayer<'a> {
    pub library: &'a ClipLibrary,
    pub player: Mut<'a, ClipPlayer>,
}

impl AnimationPlayer for LibraryPlayer<'_> {
    fn play_clip(&mut self, clip: &ClipId) -> f32 {
        let Some(spec) = self.library.get(clip) else {
            crate::logger::log_warning(&format!("⚠️ Anim: clip '{}' not found in library", clip));
            return 0.0;
        };
        self.player.start(spec)
    }

    fn current_playback(&self) -> Option<PlaybackId> {
        self.player.current_playback()
    }

    fn stop_clip(&mut self) {
        self.player.stop();
    }

    fn subscribe_completed(&mut self, listener: CompletionListener) {
        self.player.subscribe(listener);
    }

    fn unsubscribe_completed(&mut self, listener: CompletionListener) {
        self.player.unsubscribe(listener);
    }
}

/// System: advance every clip player and flush queued signals as events.
pub fn tick_clip_players(
    mut players: Query<(Entity, &mut ClipPlayer)>,
    time: Res<Time<Fixed>>,
    mut notify_events: EventWriter<AnimNotifyFired>,
    mut completed_events: EventWriter<ClipCompleted>,
) {
    let delta = time.delta_secs();

    for (actor, mut player) in players.iter_mut() {
        if !player.is_playing() && !player.has_pending_signals() {
            continue;
        }

        player.advance(delta);

        for signal in player.drain_signals() {
            match signal {
                PlaybackSignal::Notify { playback, clip, notify } => {
                    notify_events.write(AnimNotifyFired {
                        actor,
                        playback,
                        clip,
                        notify,
                    });
                }
                PlaybackSignal::Completed {
                    playback,
                    clip,
                    listener,
                    interrupted,
                } => {
                    completed_events.write(ClipCompleted {
                        actor,
                        listener,
                        playback,
                        clip,
                        interrupted,
                    });
                }
            }
        }
    }
}
