//! Round settings and the store that guards them
//!
//! Settings arrive from the settings form already validated, but the store
//! checks the bounds again and keeps the previous value on a bad one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum spawn interval (ms); roughly one display frame
pub const MIN_FALLING_FREQUENCY: u32 = 16;
/// Longest allowed round (seconds)
pub const MAX_GAME_TIME: u32 = 600;

/// Round configuration, replaced wholesale on change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Pixels an object falls per frame
    pub falling_speed: u32,
    /// Milliseconds between spawns
    pub falling_frequency: u32,
    /// Pixels the paddle moves per input tick
    pub player_speed: u32,
    /// Round length in seconds
    pub game_time: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            falling_speed: 5,
            falling_frequency: 1000,
            player_speed: 10,
            game_time: 60,
        }
    }
}

/// Which field a settings change touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    FallingSpeed,
    FallingFrequency,
    PlayerSpeed,
    GameTime,
}

impl Settings {
    /// Check every field against its bounds
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.falling_speed < 1 {
            return Err(SettingsError::FallingSpeed(self.falling_speed));
        }
        if self.falling_frequency < MIN_FALLING_FREQUENCY {
            return Err(SettingsError::FallingFrequency(self.falling_frequency));
        }
        if self.player_speed < 1 {
            return Err(SettingsError::PlayerSpeed(self.player_speed));
        }
        if !(1..=MAX_GAME_TIME).contains(&self.game_time) {
            return Err(SettingsError::GameTime(self.game_time));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON (camelCase field names)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        // A struct of four integers always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// First field that differs from `prev`, in declaration order
    pub fn changed_field(&self, prev: &Settings) -> Option<SettingsField> {
        if self.falling_speed != prev.falling_speed {
            Some(SettingsField::FallingSpeed)
        } else if self.falling_frequency != prev.falling_frequency {
            Some(SettingsField::FallingFrequency)
        } else if self.player_speed != prev.player_speed {
            Some(SettingsField::PlayerSpeed)
        } else if self.game_time != prev.game_time {
            Some(SettingsField::GameTime)
        } else {
            None
        }
    }
}

//=== SettingsError =======================================================

/// A settings value outside its allowed range, or unparseable input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    FallingSpeed(u32),
    FallingFrequency(u32),
    PlayerSpeed(u32),
    GameTime(u32),
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallingSpeed(v) => write!(f, "falling speed must be at least 1, got {}", v),
            Self::FallingFrequency(v) => write!(
                f,
                "falling frequency must be at least {} ms, got {}",
                MIN_FALLING_FREQUENCY, v
            ),
            Self::PlayerSpeed(v) => write!(f, "player speed must be at least 1, got {}", v),
            Self::GameTime(v) => write!(
                f,
                "game time must be between 1 and {} seconds, got {}",
                MAX_GAME_TIME, v
            ),
            Self::Parse(e) => write!(f, "invalid settings JSON: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

//=== SettingsStore =======================================================

/// Holds the last accepted settings.
///
/// Empty until the first valid value arrives. A rejected value leaves the
/// stored one in place.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    current: Option<Settings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last accepted settings
    pub fn current(&self) -> Option<&Settings> {
        self.current.as_ref()
    }

    /// Validate and replace. Returns the previous value on success.
    pub fn update(&mut self, settings: Settings) -> Result<Option<Settings>, SettingsError> {
        if let Err(e) = settings.validate() {
            log::warn!("Rejected settings {:?}: {}", settings, e);
            return Err(e);
        }
        Ok(self.current.replace(settings))
    }

    /// Spawn period for the current settings; zero when nothing is stored
    pub fn spawn_period_ms(&self) -> u32 {
        self.current.map(|s| s.falling_frequency).unwrap_or(0)
    }
}
