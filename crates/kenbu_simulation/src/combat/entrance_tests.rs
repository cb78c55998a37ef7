//! Tests for the entrance gate.

#[cfg(test)]
mod tests {
    use crate::animation::{ClipId, CompletionListener, PlaybackId};
    use crate::combat::entrance::{EntranceGate, EntrancePhase};
    use crate::combat::testing::{AnimCall, Rig};
    use crate::components::LocomotionMode;

    fn intro_rig() -> (EntranceGate, Rig) {
        let gate = EntranceGate::new(Some(ClipId::new("intro")));
        let rig = Rig::with_clips([("intro", 2.0)]);
        (gate, rig)
    }

    fn assert_controllable(rig: &Rig) {
        assert!(rig.actor.control_enabled);
        assert!(rig.actor.collision_enabled);
        assert_eq!(rig.actor.locomotion, LocomotionMode::Walking);
    }

    #[test]
    fn test_begin_locks_control() {
        let (mut gate, mut rig) = intro_rig();

        assert_eq!(gate.begin(&mut rig.ctx()), EntrancePhase::Playing);

        assert!(!rig.actor.control_enabled);
        assert!(!rig.actor.collision_enabled);
        assert_eq!(rig.actor.locomotion, LocomotionMode::Disabled);
        assert_eq!(rig.animator.played(), vec![ClipId::new("intro")]);
        assert_eq!(gate.intro_clip(), Some(&ClipId::new("intro")));
        assert_eq!(gate.playback(), rig.animator.playing());
        assert!(rig.animator.is_subscribed(CompletionListener::Entrance));
    }

    #[test]
    fn test_no_intro_clip_finishes_immediately() {
        let mut gate = EntranceGate::new(None);
        let mut rig = Rig::with_clips([("intro", 2.0)]);
        rig.actor.control_enabled = false;

        assert_eq!(gate.begin(&mut rig.ctx()), EntrancePhase::Finished);
        assert_controllable(&rig);
        assert!(rig.animator.played().is_empty());
    }

    #[test]
    fn test_failed_intro_enables_control() {
        let mut gate = EntranceGate::new(Some(ClipId::new("broken")));
        let mut rig = Rig::with_clips([("broken", -1.0)]);

        assert_eq!(gate.begin(&mut rig.ctx()), EntrancePhase::Finished);
        assert_controllable(&rig);
        assert!(!rig.animator.is_subscribed(CompletionListener::Entrance));
    }

    #[test]
    fn test_no_animation_player_enables_control() {
        let (mut gate, mut rig) = intro_rig();
        rig.has_animation = false;

        assert_eq!(gate.begin(&mut rig.ctx()), EntrancePhase::Finished);
        assert_controllable(&rig);
    }

    #[test]
    fn test_notify_finished_is_idempotent() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());

        assert!(gate.notify_finished(&mut rig.ctx()));
        let calls_after_first = rig.animator.calls.len();

        assert!(!gate.notify_finished(&mut rig.ctx()));
        assert_eq!(gate.phase(), EntrancePhase::Finished);
        assert_controllable(&rig);
        // Второй вызов не трогает подписки
        assert_eq!(rig.animator.calls.len(), calls_after_first);
        assert_eq!(
            rig.animator.calls.last(),
            Some(&AnimCall::Unsubscribe(CompletionListener::Entrance))
        );
    }

    #[test]
    fn test_completion_is_safety_net() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());
        let playback = gate.playback().unwrap();

        assert!(gate.on_clip_completed(&mut rig.ctx(), playback, false));
        assert_eq!(gate.phase(), EntrancePhase::Finished);
        assert_eq!(gate.playback(), None);
        assert_controllable(&rig);
        assert!(!rig.animator.is_subscribed(CompletionListener::Entrance));
    }

    #[test]
    fn test_marker_then_completion_transitions_once() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());
        let playback = gate.playback().unwrap();

        assert!(gate.notify_finished(&mut rig.ctx()));
        assert!(!gate.on_clip_completed(&mut rig.ctx(), playback, false));

        let unsubscribes = rig
            .animator
            .calls
            .iter()
            .filter(|call| **call == AnimCall::Unsubscribe(CompletionListener::Entrance))
            .count();
        assert_eq!(unsubscribes, 1);
    }

    #[test]
    fn test_completion_then_marker_transitions_once() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());
        let playback = gate.playback().unwrap();

        assert!(gate.on_clip_completed(&mut rig.ctx(), playback, true));
        assert!(!gate.notify_finished(&mut rig.ctx()));
        assert_controllable(&rig);
    }

    #[test]
    fn test_foreign_playback_completion_ignored() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());
        let foreign = PlaybackId::new(gate.playback().unwrap().id() + 1);

        assert!(!gate.on_clip_completed(&mut rig.ctx(), foreign, false));
        assert!(gate.is_playing());
        assert!(!rig.actor.control_enabled);
    }

    #[test]
    fn test_gate_is_never_reentered() {
        let (mut gate, mut rig) = intro_rig();
        gate.begin(&mut rig.ctx());
        gate.notify_finished(&mut rig.ctx());

        assert_eq!(gate.begin(&mut rig.ctx()), EntrancePhase::Finished);
        assert_eq!(rig.animator.played().len(), 1);
        assert_controllable(&rig);
    }
}
