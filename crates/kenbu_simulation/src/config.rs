//! Combat tuning (RON-loadable) + config validation errors.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{ClipId, ClipLibrary};
use crate::combat::ComboDefinition;

/// Configuration errors (reported at load/spawn, never fatal at runtime).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("combo definition has no stages")]
    EmptyCombo,

    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("combo stage {stage} references clip '{clip}' missing from the clip library")]
    MissingClip { stage: usize, clip: ClipId },
}

/// Global combat tuning.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub combo: ComboTuning,
    pub hit_check: HitCheckConfig,
    /// Invulnerability after a non-lethal hit (seconds)
    pub invincibility_duration: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            combo: ComboTuning::default(),
            hit_check: HitCheckConfig::default(),
            invincibility_duration: 0.5,
        }
    }
}

impl CombatConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combo.validate()?;
        self.hit_check.validate()?;
        non_negative("invincibility_duration", self.invincibility_duration)
    }
}

/// Window fallback timer tuning.
///
/// Fallback delay = `duration * window_fallback_scale + window_fallback_padding`.
/// `(0.75, 0.0)` fires at 75% of the stage clip, `(1.0, 0.1)` just after it ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    pub window_fallback_scale: f32,
    pub window_fallback_padding: f32,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            window_fallback_scale: 0.75,
            window_fallback_padding: 0.0,
        }
    }
}

impl ComboTuning {
    pub fn fallback_delay(&self, clip_duration: f32) -> f32 {
        (clip_duration * self.window_fallback_scale + self.window_fallback_padding).max(0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("combo.window_fallback_scale", self.window_fallback_scale)?;
        non_negative("combo.window_fallback_padding", self.window_fallback_padding)
    }
}

/// Weapon sweep parameters (meters).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitCheckConfig {
    /// Weapon socket the sweep starts from
    pub socket: String,
    /// Sweep length along actor forward
    pub reach: f32,
    /// Sphere radius
    pub radius: f32,
    /// Fixed damage per struck actor
    pub damage: u32,
}

impl Default for HitCheckConfig {
    fn default() -> Self {
        Self {
            socket: "weapon_l".into(),
            reach: 1.5,
            radius: 0.7,
            damage: 25,
        }
    }
}

impl HitCheckConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("hit_check.reach", self.reach)?;
        non_negative("hit_check.radius", self.radius)
    }
}

/// Check that every stage clip of `combo` exists in `library`.
pub fn validate_combo(combo: &ComboDefinition, library: &ClipLibrary) -> Result<(), ConfigError> {
    if combo.is_empty() {
        return Err(ConfigError::EmptyCombo);
    }

    for (stage, entry) in combo.stages.iter().enumerate() {
        if !library.contains(&entry.clip) {
            return Err(ConfigError::MissingClip {
                stage,
                clip: entry.clip.clone(),
            });
        }
    }

    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
