//! Load-time tuning values.
//!
//! Defaults come from `constants`. A tuning file may override any subset of
//! fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ParticleTemplate;
use crate::constants::*;
use crate::enums::ParticleKind;

/// Errors raised while loading or validating tuning overrides.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning value `{field}` is invalid: {reason}")]
    Invalid { field: String, reason: &'static str },
}

/// Weapon, enemy and particle tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub enemy_speed: f64,
    pub enemy_spawn_interval: f64,
    pub turret_rotate_speed: f64,
    pub turret_range: f64,
    pub cannon_fire_interval: f64,
    pub railgun_fire_interval: f64,
    /// Gameplay-feel multiplier for ballistic lead; not a true intercept solution.
    pub lead_prediction_factor: f64,
    pub bullet_speed: f64,
    pub bullet_damage: f64,
    /// Health per second.
    pub beam_damage: f64,
    pub beam_duration: f64,
    pub ion_spawn_chance: f64,
    pub particles: ParticleTemplates,
}

/// Shared templates, one per effect archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTemplates {
    pub bullet: ParticleTemplate,
    pub fireball: ParticleTemplate,
    pub smoke: ParticleTemplate,
    pub spark: ParticleTemplate,
    pub ion: ParticleTemplate,
    pub bolt: ParticleTemplate,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_speed: ENEMY_SPEED,
            enemy_spawn_interval: ENEMY_SPAWN_INTERVAL,
            turret_rotate_speed: TURRET_ROTATE_SPEED,
            turret_range: TURRET_RANGE,
            cannon_fire_interval: TURRET_FIRE_INTERVAL,
            railgun_fire_interval: BEAM_FIRE_INTERVAL,
            lead_prediction_factor: LEAD_PREDICTION_FACTOR,
            bullet_speed: BULLET_SPEED,
            bullet_damage: BULLET_DAMAGE,
            beam_damage: BEAM_DAMAGE,
            beam_duration: BEAM_DURATION,
            ion_spawn_chance: ION_SPAWN_CHANCE,
            particles: ParticleTemplates::default(),
        }
    }
}

impl Default for ParticleTemplates {
    fn default() -> Self {
        Self {
            bullet: template(1.0, 1.0, 1.0, BULLET_LIFESPAN),
            fireball: template(FIREBALL_SIZE_DECAY, 1.0, 1.0, FIREBALL_LIFESPAN),
            smoke: template(SMOKE_SIZE_DECAY, SMOKE_COLOR_DECAY, 1.0, SMOKE_LIFESPAN),
            spark: template(SPARK_SIZE_DECAY, 1.0, SPARK_VELOCITY_DECAY, SPARK_LIFESPAN),
            ion: template(ION_DECAY, 1.0, 1.0, ION_LIFESPAN),
            bolt: template(BOLT_SIZE_DECAY, 1.0, 1.0, BOLT_LIFESPAN),
        }
    }
}

fn template(size_decay: f64, color_decay: f64, velocity_decay: f64, lifespan: f64) -> ParticleTemplate {
    ParticleTemplate {
        size_decay,
        color_decay,
        velocity_decay,
        lifespan,
    }
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        template(1.0, 1.0, 1.0, 1.0)
    }
}

impl ParticleTemplates {
    /// Template shared by every instance of `kind`.
    pub fn get(&self, kind: ParticleKind) -> &ParticleTemplate {
        match kind {
            ParticleKind::Bullet => &self.bullet,
            ParticleKind::Fireball => &self.fireball,
            ParticleKind::Smoke => &self.smoke,
            ParticleKind::Spark => &self.spark,
            ParticleKind::Ion => &self.ion,
            ParticleKind::Bolt => &self.bolt,
        }
    }
}

impl Tuning {
    /// Parse overrides from JSON and validate the result.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every value is usable by the systems.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("enemy_speed", self.enemy_speed),
            ("enemy_spawn_interval", self.enemy_spawn_interval),
            ("turret_rotate_speed", self.turret_rotate_speed),
            ("turret_range", self.turret_range),
            ("cannon_fire_interval", self.cannon_fire_interval),
            ("railgun_fire_interval", self.railgun_fire_interval),
            ("bullet_speed", self.bullet_speed),
            ("beam_duration", self.beam_duration),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(field, "must be a positive finite number"));
            }
        }

        let non_negative = [
            ("lead_prediction_factor", self.lead_prediction_factor),
            ("bullet_damage", self.bullet_damage),
            ("beam_damage", self.beam_damage),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(field, "must be a non-negative finite number"));
            }
        }

        if !(0.0..=1.0).contains(&self.ion_spawn_chance) {
            return Err(invalid("ion_spawn_chance", "must be within [0, 1]"));
        }

        for kind in ParticleKind::ALL {
            let t = self.particles.get(kind);
            let rates = [
                ("size_decay", t.size_decay),
                ("color_decay", t.color_decay),
                ("velocity_decay", t.velocity_decay),
            ];
            for (name, rate) in rates {
                if !(rate > 0.0 && rate <= 1.0) {
                    return Err(invalid(
                        &format!("particles.{kind:?}.{name}"),
                        "decay rate must be within (0, 1]",
                    ));
                }
            }
            if !(t.lifespan > 0.0) {
                return Err(invalid(
                    &format!("particles.{kind:?}.lifespan"),
                    "must be positive",
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &'static str) -> TuningError {
    TuningError::Invalid {
        field: field.to_string(),
        reason,
    }
}
