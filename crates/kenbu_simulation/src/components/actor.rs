//! Базовые компоненты акторов: Actor, Health, Invincibility, Hurtbox

use bevy::prelude::*;

use crate::timer::{CombatTimers, TimerHandle};

/// Актор (игрок, враг, манекен): базовый компонент для живых существ
///
/// Автоматически добавляет Health, Invincibility, Hurtbox, CombatTimers через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Invincibility, Hurtbox, CombatTimers, Transform)]
pub struct Actor;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        if !self.is_alive() {
            return; // мертвых не лечим
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Post-hit invulnerability window.
///
/// `active` holds the timer that ends the window; damage is ignored while set.
#[derive(Component, Debug, Clone)]
pub struct Invincibility {
    pub duration: f32,
    pub active: Option<TimerHandle>,
}

impl Default for Invincibility {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Invincibility {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Sphere the weapon sweep tests against (meters).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
    /// Высота центра над Transform (Transform = ступни)
    pub center_height: f32,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self {
            radius: 0.4,
            center_height: 1.0,
        }
    }
}

impl Hurtbox {
    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + Vec3::Y * self.center_height
    }
}
