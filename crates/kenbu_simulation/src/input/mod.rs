//! Input surface: discrete combat intents from the input layer.
//!
//! Хост (клавиатура, AI, replay) шлёт по одному событию на нажатие,
//! не на каждый кадр удержания.

use bevy::prelude::*;

/// Event: attack button pressed for `actor`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPressed {
    pub actor: Entity,
}
