//! Game tuning and preferences
//!
//! One JSON document holds the tunables of all three games. Missing fields
//! fall back to the defaults, which match the shipped mobile game.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Brick-breaker tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutTuning {
    pub ball_radius: f32,
    /// Velocity assigned on launch and after every miss (px/s)
    pub launch_velocity: Vec2,
    /// Ball rest spot, measured up from the bottom edge
    pub ball_start_offset: f32,

    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Paddle centre line, measured up from the bottom edge
    pub paddle_y_offset: f32,

    /// Grid cell size; each brick fills its cell minus `brick_gap`
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_gap: f32,
    pub brick_rows: u32,
    /// Centre of the first brick row
    pub brick_top_offset: f32,

    /// Largest step one tick may integrate, in milliseconds
    pub max_step_ms: f32,
    /// Reflect the ball off the left, right and top edges
    pub walls: bool,
}

impl Default for BreakoutTuning {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            launch_velocity: Vec2::new(BALL_LAUNCH_VX, BALL_LAUNCH_VY),
            ball_start_offset: BALL_START_OFFSET,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_y_offset: PADDLE_Y_OFFSET,

            brick_width: BRICK_WIDTH,
            brick_height: BRICK_HEIGHT,
            brick_gap: BRICK_GAP,
            brick_rows: BRICK_ROWS,
            brick_top_offset: BRICK_TOP_OFFSET,

            max_step_ms: MAX_STEP_MS,
            walls: true,
        }
    }
}

/// One purchasable clicker building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub name: String,
    pub base_cost: f64,
    /// Cost multiplier applied after each purchase
    pub growth: f64,
}

impl BuildingSpec {
    pub fn new(name: &str, base_cost: f64, growth: f64) -> Self {
        Self {
            name: name.to_string(),
            base_cost,
            growth,
        }
    }
}

/// Derivative Clicker tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickerTuning {
    pub start_money: f64,
    pub money_per_click: f64,
    pub payout_interval_ms: f64,
    pub buildings: Vec<BuildingSpec>,
}

impl Default for ClickerTuning {
    fn default() -> Self {
        Self {
            start_money: CLICKER_START_MONEY,
            money_per_click: CLICKER_MONEY_PER_CLICK,
            payout_interval_ms: CLICKER_PAYOUT_INTERVAL_MS,
            buildings: vec![
                BuildingSpec::new("First Derivative", 10.0, 1.1),
                BuildingSpec::new("Second Derivative", 100.0, 1.15),
                BuildingSpec::new("Third Derivative", 1000.0, 1.2),
            ],
        }
    }
}

/// Countdown reaction game tunables (times in tenths of a second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownTuning {
    pub start_tenths: u32,
    /// Subtracted once per interval; twice real time by default
    pub step_tenths: u32,
    pub interval_ms: f64,
    pub target_tenths: u32,
}

impl Default for CountdownTuning {
    fn default() -> Self {
        Self {
            start_tenths: COUNTDOWN_START_TENTHS,
            step_tenths: COUNTDOWN_STEP_TENTHS,
            interval_ms: COUNTDOWN_INTERVAL_MS,
            target_tenths: COUNTDOWN_TARGET_TENTHS,
        }
    }
}

/// All game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub breakout: BreakoutTuning,
    pub clicker: ClickerTuning,
    pub countdown: CountdownTuning,
}

/// Why settings could not be loaded, saved or accepted
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings i/o: {e}"),
            SettingsError::Parse(e) => write!(f, "settings parse: {e}"),
            SettingsError::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

fn invalid(msg: impl Into<String>) -> SettingsError {
    SettingsError::Invalid(msg.into())
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn try_load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject tunables no game could run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let b = &self.breakout;
        let sizes = [
            ("ball_radius", b.ball_radius),
            ("paddle_width", b.paddle_width),
            ("paddle_height", b.paddle_height),
            ("brick_width", b.brick_width),
            ("brick_height", b.brick_height),
            ("max_step_ms", b.max_step_ms),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("breakout.{name} must be positive, got {value}")));
            }
        }
        let offsets = [
            ("ball_start_offset", b.ball_start_offset),
            ("paddle_y_offset", b.paddle_y_offset),
            ("brick_top_offset", b.brick_top_offset),
        ];
        for (name, value) in offsets {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("breakout.{name} must be non-negative, got {value}")));
            }
        }
        if b.ball_start_offset <= b.ball_radius {
            return Err(invalid("breakout.ball_start_offset must clear the ball radius"));
        }
        if b.brick_rows > MAX_BRICK_ROWS {
            return Err(invalid(format!(
                "breakout.brick_rows must be at most {MAX_BRICK_ROWS}, got {}",
                b.brick_rows
            )));
        }
        if !(b.brick_gap >= 0.0 && b.brick_gap < b.brick_width.min(b.brick_height)) {
            return Err(invalid("breakout.brick_gap must be smaller than a brick"));
        }
        if !b.launch_velocity.is_finite() || b.launch_velocity == Vec2::ZERO {
            return Err(invalid("breakout.launch_velocity must be finite and non-zero"));
        }

        let c = &self.clicker;
        if c.buildings.is_empty() {
            return Err(invalid("clicker.buildings must not be empty"));
        }
        if !(c.payout_interval_ms > 0.0) {
            return Err(invalid("clicker.payout_interval_ms must be positive"));
        }
        for building in &c.buildings {
            if !(building.base_cost > 0.0) || !(building.growth >= 1.0) {
                return Err(invalid(format!(
                    "clicker building '{}' needs a positive cost and growth >= 1",
                    building.name
                )));
            }
        }

        let t = &self.countdown;
        if !(t.interval_ms > 0.0) || t.step_tenths == 0 || t.start_tenths == 0 {
            return Err(invalid("countdown needs a positive start, step and interval"));
        }
        if t.target_tenths >= t.start_tenths {
            return Err(invalid("countdown.target_tenths must be below start_tenths"));
        }
        Ok(())
    }

    /// Check that a brick-breaker field fits at least one brick column and
    /// keeps the ball start spot inside it
    pub fn validate_field(&self, width: f32, height: f32) -> Result<(), SettingsError> {
        if !(width.is_finite() && height.is_finite()) {
            return Err(invalid("field size must be finite"));
        }
        if !(self.breakout.ball_start_offset > 0.0) {
            return Err(invalid("ball start spot must be above the bottom edge"));
        }
        if width < self.breakout.brick_width {
            return Err(invalid(format!(
                "field width {width} is narrower than one brick ({})",
                self.breakout.brick_width
            )));
        }
        if height <= self.breakout.ball_start_offset {
            return Err(invalid(format!("field height {height} leaves no room above the ball")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.breakout.launch_velocity, Vec2::new(180.0, -300.0));
        assert_eq!(settings.clicker.buildings.len(), 3);
        assert_eq!(settings.countdown.target_tenths, 30);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.breakout.paddle_width = 80.0;
        settings.breakout.walls = false;
        settings.save_to(&path).unwrap();

        let loaded = Settings::try_load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "breakout": { "brick_rows": 3 } }"#).unwrap();

        let loaded = Settings::try_load_from(&path).unwrap();
        assert_eq!(loaded.breakout.brick_rows, 3);
        assert_eq!(loaded.breakout.paddle_width, PADDLE_WIDTH);
        assert_eq!(loaded.clicker, ClickerTuning::default());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(Settings::load_from(&missing), Settings::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            Settings::try_load_from(&broken),
            Err(SettingsError::Parse(_))
        ));
        assert_eq!(Settings::load_from(&broken), Settings::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.breakout.max_step_ms = 0.0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::default();
        settings.clicker.buildings[1].growth = 0.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.countdown.target_tenths = 200;
        assert!(settings.validate().is_err());

        let settings = Settings::default();
        assert!(settings.validate_field(400.0, 800.0).is_ok());
        assert!(settings.validate_field(30.0, 800.0).is_err());
        assert!(settings.validate_field(400.0, f32::NAN).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_offsets() {
        let mut settings = Settings::default();
        settings.breakout.ball_start_offset = -20.0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
        assert!(settings.validate_field(400.0, 800.0).is_err());

        // Start spot must hold the whole ball above the bottom edge
        let mut settings = Settings::default();
        settings.breakout.ball_start_offset = settings.breakout.ball_radius;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.breakout.paddle_y_offset = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.breakout.brick_top_offset = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_caps_brick_rows() {
        let mut settings = Settings::default();
        settings.breakout.brick_rows = MAX_BRICK_ROWS;
        assert!(settings.validate().is_ok());
        settings.breakout.brick_rows = u32::MAX;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }
}
