//! Timer modes and the mode registry.
//!
//! A [`Mode`] is an immutable pair of work / break lengths with an accent
//! color. Modes only reach the timer engine through a [`ModeRegistry`],
//! which rejects invalid definitions at registration time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TimerPhase;

// ============================================================================
// ConfigError
// ============================================================================

/// Errors raised while registering modes or loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A mode was defined without a name.
    #[error("mode name must not be empty")]
    EmptyModeName,

    /// A mode has a zero work or break length.
    #[error("mode '{name}' must have positive work and break lengths (got {work_minutes}/{break_minutes} minutes)")]
    NonPositiveDuration {
        name: String,
        work_minutes: u32,
        break_minutes: u32,
    },

    /// A mode has a work or break length longer than a day.
    #[error("mode '{name}' lengths must be at most {max} minutes (got {work_minutes}/{break_minutes} minutes)")]
    DurationTooLong {
        name: String,
        work_minutes: u32,
        break_minutes: u32,
        max: u32,
    },

    /// A mode color is not a `#rgb` / `#rrggbb` hex color.
    #[error("mode '{name}' has an invalid color '{color}'")]
    InvalidColor { name: String, color: String },

    /// A mode with the same name is already registered.
    #[error("mode '{0}' is already registered")]
    DuplicateMode(String),

    /// The configured default mode is not registered.
    #[error("default mode '{0}' is not a registered mode")]
    UnknownDefaultMode(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

// ============================================================================
// Mode
// ============================================================================

/// Longest accepted work or break length, in minutes.
pub const MAX_PHASE_MINUTES: u32 = 24 * 60;

/// A named timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Mode name (e.g. "light")
    pub name: String,
    /// Work phase length in minutes
    pub work_minutes: u32,
    /// Break phase length in minutes
    pub break_minutes: u32,
    /// Accent color used by the render target
    pub color: String,
}

impl Mode {
    /// Creates a new mode. Validation happens on registration.
    pub fn new(
        name: impl Into<String>,
        work_minutes: u32,
        break_minutes: u32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            work_minutes,
            break_minutes,
            color: color.into(),
        }
    }

    /// The 25/5 reference mode.
    pub fn light() -> Self {
        Self::new("light", 25, 5, "#4ecca3")
    }

    /// The 35/7 reference mode.
    pub fn medium() -> Self {
        Self::new("medium", 35, 7, "#f0a500")
    }

    /// The 50/10 reference mode.
    pub fn deep() -> Self {
        Self::new("deep", 50, 10, "#e74c3c")
    }

    /// Work phase length in seconds.
    pub fn work_seconds(&self) -> u32 {
        self.work_minutes.saturating_mul(60)
    }

    /// Break phase length in seconds.
    pub fn break_seconds(&self) -> u32 {
        self.break_minutes.saturating_mul(60)
    }

    /// Length of the given phase in seconds.
    pub fn phase_seconds(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Work => self.work_seconds(),
            TimerPhase::Break => self.break_seconds(),
        }
    }

    /// Validates the mode definition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyModeName);
        }
        if self.work_minutes == 0 || self.break_minutes == 0 {
            return Err(ConfigError::NonPositiveDuration {
                name: self.name.clone(),
                work_minutes: self.work_minutes,
                break_minutes: self.break_minutes,
            });
        }
        if self.work_minutes > MAX_PHASE_MINUTES || self.break_minutes > MAX_PHASE_MINUTES {
            return Err(ConfigError::DurationTooLong {
                name: self.name.clone(),
                work_minutes: self.work_minutes,
                break_minutes: self.break_minutes,
                max: MAX_PHASE_MINUTES,
            });
        }
        if !is_hex_color(&self.color) {
            return Err(ConfigError::InvalidColor {
                name: self.name.clone(),
                color: self.color.clone(),
            });
        }
        Ok(())
    }
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

// ============================================================================
// ModeRegistry
// ============================================================================

/// Ordered set of registered modes.
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    modes: Vec<Mode>,
}

impl ModeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { modes: Vec::new() }
    }

    /// Creates a registry holding the three reference modes.
    pub fn reference() -> Self {
        Self {
            modes: vec![Mode::light(), Mode::medium(), Mode::deep()],
        }
    }

    /// Registers a mode after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode is invalid or its name is taken.
    pub fn register(&mut self, mode: Mode) -> Result<(), ConfigError> {
        mode.validate()?;
        if self.get(&mode.name).is_some() {
            return Err(ConfigError::DuplicateMode(mode.name));
        }
        self.modes.push(mode);
        Ok(())
    }

    /// Looks up a mode by name.
    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    /// Returns the first registered mode, if any.
    pub fn first(&self) -> Option<&Mode> {
        self.modes.first()
    }

    /// Iterates over registered modes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter()
    }

    /// Returns the registered mode names.
    pub fn names(&self) -> Vec<&str> {
        self.modes.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod mode_tests {
        use super::*;

        #[test]
        fn test_reference_modes() {
            assert_eq!(Mode::light().work_minutes, 25);
            assert_eq!(Mode::light().break_minutes, 5);
            assert_eq!(Mode::medium().work_minutes, 35);
            assert_eq!(Mode::medium().break_minutes, 7);
            assert_eq!(Mode::deep().work_minutes, 50);
            assert_eq!(Mode::deep().break_minutes, 10);
        }

        #[test]
        fn test_phase_seconds() {
            let mode = Mode::light();
            assert_eq!(mode.phase_seconds(TimerPhase::Work), 1500);
            assert_eq!(mode.phase_seconds(TimerPhase::Break), 300);
        }

        #[test]
        fn test_validate_rejects_zero_work() {
            let mode = Mode::new("broken", 0, 5, "#ffffff");
            assert!(matches!(
                mode.validate(),
                Err(ConfigError::NonPositiveDuration { .. })
            ));
        }

        #[test]
        fn test_validate_rejects_zero_break() {
            let mode = Mode::new("broken", 25, 0, "#ffffff");
            assert!(mode.validate().is_err());
        }

        #[test]
        fn test_validate_length_limit() {
            assert!(Mode::new("day", MAX_PHASE_MINUTES, 1, "#fff").validate().is_ok());
            assert!(matches!(
                Mode::new("huge", MAX_PHASE_MINUTES + 1, 1, "#fff").validate(),
                Err(ConfigError::DurationTooLong { .. })
            ));
            assert!(matches!(
                Mode::new("huge", 25, 80_000_000, "#fff").validate(),
                Err(ConfigError::DurationTooLong { max: 1440, .. })
            ));
        }

        #[test]
        fn test_seconds_saturate() {
            let mode = Mode::new("huge", u32::MAX, u32::MAX, "#fff");
            assert_eq!(mode.work_seconds(), u32::MAX);
            assert_eq!(mode.break_seconds(), u32::MAX);
        }

        #[test]
        fn test_validate_rejects_blank_name() {
            let mode = Mode::new("  ", 25, 5, "#ffffff");
            assert_eq!(mode.validate(), Err(ConfigError::EmptyModeName));
        }

        #[test]
        fn test_validate_colors() {
            assert!(Mode::new("a", 1, 1, "#abc").validate().is_ok());
            assert!(Mode::new("a", 1, 1, "#A1B2C3").validate().is_ok());
            assert!(Mode::new("a", 1, 1, "red").validate().is_err());
            assert!(Mode::new("a", 1, 1, "#12345").validate().is_err());
            assert!(Mode::new("a", 1, 1, "#ggg").validate().is_err());
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_reference_registry_order() {
            let registry = ModeRegistry::reference();
            assert_eq!(registry.names(), vec!["light", "medium", "deep"]);
            assert_eq!(registry.first().unwrap().name, "light");
        }

        #[test]
        fn test_register_custom_mode() {
            let mut registry = ModeRegistry::reference();
            registry
                .register(Mode::new("sprint", 15, 3, "#3498db"))
                .unwrap();

            assert_eq!(registry.len(), 4);
            assert_eq!(registry.get("sprint").unwrap().work_minutes, 15);
        }

        #[test]
        fn test_register_rejects_invalid_mode() {
            let mut registry = ModeRegistry::new();
            let result = registry.register(Mode::new("zero", 0, 0, "#000"));

            assert!(result.is_err());
            assert!(registry.is_empty());
        }

        #[test]
        fn test_register_rejects_overflowing_mode() {
            let mut registry = ModeRegistry::reference();
            let result = registry.register(Mode::new("huge", 80_000_000, 5, "#000"));

            assert!(matches!(result, Err(ConfigError::DurationTooLong { .. })));
            assert!(registry.get("huge").is_none());
        }

        #[test]
        fn test_register_rejects_duplicate() {
            let mut registry = ModeRegistry::reference();
            let result = registry.register(Mode::new("light", 20, 4, "#000000"));
            assert_eq!(result, Err(ConfigError::DuplicateMode("light".to_string())));
        }

        #[test]
        fn test_get_unknown() {
            let registry = ModeRegistry::reference();
            assert!(registry.get("ultra").is_none());
        }
    }
}
