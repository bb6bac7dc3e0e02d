//! Game tuning and configuration
//!
//! Every tunable the simulation reads lives here. Defaults reproduce the
//! classic 400×520 board; a JSON file may override any subset of fields.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration load/validation failure
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config JSON was malformed
    Parse(serde_json::Error),
    /// A value is out of its allowed range
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Board geometry, kinematics and generation odds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    // === Board ===
    pub field_width: f32,
    pub field_height: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// Space reserved under the grid (launcher area); limits `tile_rows`
    pub hud_margin: f32,
    /// Rows kept free of bonus spawns above the bottom edge
    pub safe_zone_rows: u32,
    /// Distance from the bottom edge to the loss boundary
    pub loss_margin: f32,

    // === Projectiles ===
    pub projectile_radius: f32,
    /// Launch speed in pixels per fixed step
    pub normal_speed: f32,
    /// Multiplier applied by a speed-up request
    pub speed_up_factor: f32,
    /// Wall-clock gap between releases within a volley
    pub launch_interval_secs: f32,
    /// Launcher height above the bottom edge
    pub launcher_offset: f32,
    pub initial_shots: u32,

    // === Generation odds ===
    pub row_fill_chance: f64,
    pub durability_double_chance: f64,
    pub bonus_spawn_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 400.0,
            field_height: 520.0,
            tile_width: 50.0,
            tile_height: 30.0,
            hud_margin: 100.0,
            safe_zone_rows: 4,
            loss_margin: 50.0,

            projectile_radius: 6.0,
            normal_speed: 7.0,
            speed_up_factor: 2.0,
            launch_interval_secs: 0.2,
            launcher_offset: 20.0,
            initial_shots: 1,

            row_fill_chance: 0.3,
            durability_double_chance: 0.25,
            bonus_spawn_chance: 0.6,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }
        fn chance(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be a probability in [0, 1]",
                })
            }
        }

        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("tile_width", self.tile_width)?;
        positive("tile_height", self.tile_height)?;
        positive("projectile_radius", self.projectile_radius)?;
        positive("normal_speed", self.normal_speed)?;
        positive("speed_up_factor", self.speed_up_factor)?;

        if self.tile_cols() == 0 {
            return Err(ConfigError::Invalid {
                field: "tile_width",
                reason: "board must fit at least one column",
            });
        }
        if !(self.launch_interval_secs >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "launch_interval_secs",
                reason: "must not be negative",
            });
        }
        if !(self.launcher_offset >= 0.0 && self.launcher_offset < self.field_height) {
            return Err(ConfigError::Invalid {
                field: "launcher_offset",
                reason: "launcher must sit inside the field",
            });
        }
        if !(self.loss_margin >= 0.0 && self.loss_margin < self.field_height) {
            return Err(ConfigError::Invalid {
                field: "loss_margin",
                reason: "loss boundary must sit inside the field",
            });
        }
        if self.initial_shots == 0 {
            return Err(ConfigError::Invalid {
                field: "initial_shots",
                reason: "at least one shot is required",
            });
        }

        chance("row_fill_chance", self.row_fill_chance)?;
        chance("durability_double_chance", self.durability_double_chance)?;
        chance("bonus_spawn_chance", self.bonus_spawn_chance)?;
        Ok(())
    }

    /// Grid columns across the board
    pub fn tile_cols(&self) -> u32 {
        (self.field_width / self.tile_width).floor() as u32
    }

    /// Grid rows above the launcher area
    pub fn tile_rows(&self) -> u32 {
        ((self.field_height - self.hud_margin).max(0.0) / self.tile_height).floor() as u32
    }

    /// Rows eligible for bonus placement (everything above the safe zone)
    pub fn spawn_rows(&self) -> u32 {
        let safe_zone = self.safe_zone_rows as f32 * self.tile_height;
        let above_safe = ((self.field_height - safe_zone).max(0.0) / self.tile_height).floor() as u32;
        above_safe.min(self.tile_rows())
    }

    /// Y coordinate obstacles must not reach
    pub fn loss_boundary(&self) -> f32 {
        self.field_height - self.loss_margin
    }

    /// Launch gate length in fixed steps (at least one)
    pub fn launch_interval_ticks(&self) -> u32 {
        ((self.launch_interval_secs / crate::consts::SIM_DT).round() as u32).max(1)
    }

    /// Speed of a volley after a speed-up request
    pub fn boosted_speed(&self) -> f32 {
        self.normal_speed * self.speed_up_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tile_cols(), 8);
        assert_eq!(config.tile_rows(), 14);
        assert_eq!(config.spawn_rows(), 13);
        assert_eq!(config.loss_boundary(), 470.0);
        assert_eq!(config.launch_interval_ticks(), 12);
        assert_eq!(config.boosted_speed(), 14.0);
    }

    #[test]
    fn test_partial_json_override() {
        let config = GameConfig::from_json(r#"{ "normal_speed": 9.0, "initial_shots": 3 }"#)
            .expect("partial config should parse");
        assert_eq!(config.normal_speed, 9.0);
        assert_eq!(config.initial_shots, 3);
        assert_eq!(config.field_width, 400.0);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = GameConfig::from_json(r#"{ "bonus_spawn_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "bonus_spawn_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "lives": 3 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_board_without_columns() {
        let err = GameConfig::from_json(r#"{ "tile_width": 500.0 }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config `tile_width`: board must fit at least one column"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load("/nonexistent/brick-volley.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
