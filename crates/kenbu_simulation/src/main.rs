//! Headless симуляция KENBU
//!
//! Прогоняет scripted combo (RON сценарий) против манекена и логирует каждый переход.

use serde::Deserialize;
use std::sync::Arc;

use kenbu_simulation::{
    create_headless_app, log_error, log_info, spawn_combatant, spawn_training_dummy, AttackPressed,
    ClipLibrary, ClipSpec, ComboDefinition, ComboEngine, CombatConfig, CombatantSpawn, ConfigError,
    Health, SimulationPlugin,
};

const SCENARIO: &str = include_str!("../scenarios/three_stage_combo.ron");

#[derive(Debug, Deserialize)]
struct Scenario {
    config: CombatConfig,
    clips: Vec<ClipSpec>,
    combo: ComboDefinition,
    intro_clip: Option<String>,
    dummy_distance: f32,
    dummy_health: u32,
    press_ticks: Vec<u32>,
    ticks: u32,
}

fn load_scenario(source: &str) -> Result<Scenario, ConfigError> {
    let scenario: Scenario = ron::from_str(source)?;
    scenario.config.validate()?;
    Ok(scenario)
}

fn main() {
    let scenario = match load_scenario(SCENARIO) {
        Ok(scenario) => scenario,
        Err(err) => {
            log_error(&format!("Scenario: {}", err));
            std::process::exit(1);
        }
    };

    let mut app = create_headless_app();
    let library = ClipLibrary::from_specs(scenario.clips.iter().cloned());
    app.insert_resource(scenario.config.clone())
        .insert_resource(library.clone())
        .add_plugins(SimulationPlugin);

    let mut spawn = CombatantSpawn::new(Arc::new(scenario.combo.clone()));
    if let Some(intro) = &scenario.intro_clip {
        spawn = spawn.with_intro(intro.clone());
    }

    let world = app.world_mut();
    let hero = spawn_combatant(&mut world.commands(), &scenario.config, &library, spawn);
    let dummy = spawn_training_dummy(
        &mut world.commands(),
        &scenario.config,
        bevy::math::Vec3::new(0.0, 0.0, -scenario.dummy_distance),
        scenario.dummy_health,
    );
    world.flush();

    log_info(&format!(
        "Starting KENBU headless combo ({} ticks, presses at {:?})",
        scenario.ticks, scenario.press_ticks
    ));

    // Первый update: delta нулевая, FixedUpdate не запускается
    app.update();

    for tick in 1..=scenario.ticks {
        if scenario.press_ticks.contains(&tick) {
            log_info(&format!("Tick {}: attack pressed", tick));
            app.world_mut().send_event(AttackPressed { actor: hero });
        }
        app.update();
    }

    let world = app.world();
    let dummy_health = world.get::<Health>(dummy).map(|health| health.current);
    let hero_phase = world.get::<ComboEngine>(hero).map(|engine| engine.phase());

    log_info(&format!(
        "Simulation complete! dummy health: {:?}, hero combo: {:?}",
        dummy_health, hero_phase
    ));
}
