//! Damage events и Dead marker (health model boundary)

use bevy::prelude::*;

/// Запрос урона от hit check (combo engine → health model)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ApplyDamage {
    pub target: Entity,
    pub amount: u32,
    pub instigator_controller: Option<Entity>,
    pub instigator: Entity,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health.
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub instigator_controller: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health <= 0)
///
/// Деспавн не автоматический, трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;
