//! KENBU Simulation Core
//!
//! ECS-симуляция боевого ядра melee персонажа на Bevy 0.16:
//! combo engine, entrance gate, timed hit check, health model.
//!
//! Архитектура:
//! - Core state machines (ComboEngine, EntranceGate) не знают про World,
//!   работают через CombatContext (AnimationPlayer, TimerService, CombatActor)
//! - ECS adapters: ClipPlayer, CombatTimers, HurtboxScanner, DamageQueue
//! - Внешние стимулы приходят events, системы идут в FixedUpdate одной цепочкой

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

// Публичные модули
pub mod animation;
pub mod combat;
pub mod components;
pub mod config;
pub mod input;
pub mod logger;
pub mod spawn;
pub mod timer;

// Re-export базовых типов для удобства
pub use animation::{
    AnimNotify, AnimNotifyFired, ClipCompleted, ClipId, ClipLibrary, ClipPlayer, ClipSpec, PlaybackId,
};
pub use combat::{
    AttackOutcome, ComboDefinition, ComboEngine, ComboPhase, CombatPlugin, DamageDealt, Dead,
    EntityDied, EntranceGate, EntrancePhase,
};
pub use components::*;
pub use config::{CombatConfig, ConfigError};
pub use input::AttackPressed;
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use spawn::{spawn_combatant, spawn_training_dummy, CombatantSpawn};

/// Частота simulation tick
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<ClipLibrary>()
            .init_resource::<CombatConfig>()
            // Подсистемы
            .add_plugins(CombatPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: один `app.update()` = один fixed tick (после первого update,
/// у которого delta нулевая).
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
/// (упрощённая версия через Debug)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
