//! Application configuration.
//!
//! Loaded from `<config dir>/pomodoro-board/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ConfigError, Mode, ModeRegistry};

/// Application directory name under the config and home directories.
pub const APP_DIR: &str = "pomodoro-board";

/// Socket path relative to the home directory.
const SOCKET_RELATIVE_PATH: &str = ".pomodoro-board/pomodoro-board.sock";

fn default_api_base_url() -> String {
    crate::api::DEFAULT_BASE_URL.to_string()
}

fn default_mode_name() -> String {
    "light".to_string()
}

fn default_auto_start_delay_ms() -> u64 {
    2000
}

fn default_sound() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    crate::api::DEFAULT_TIMEOUT_SECS
}

/// Daemon and CLI configuration.
///
/// # Example
///
/// ```
/// use pomodoro_board::config::AppConfig;
///
/// let config: AppConfig = toml::from_str(r#"default_mode = "deep""#).unwrap();
/// assert_eq!(config.default_mode, "deep");
/// assert_eq!(config.auto_start_delay_ms, 2000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the session / task API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Mode selected at daemon start-up.
    #[serde(default = "default_mode_name")]
    pub default_mode: String,

    /// Delay before a break starts after a completed work phase.
    #[serde(default = "default_auto_start_delay_ms")]
    pub auto_start_delay_ms: u64,

    /// Whether to play the completion chime.
    #[serde(default = "default_sound")]
    pub sound: bool,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Override for the daemon socket path.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// Extra modes registered after the reference modes.
    #[serde(default)]
    pub modes: Vec<Mode>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_mode: default_mode_name(),
            auto_start_delay_ms: default_auto_start_delay_ms(),
            sound: default_sound(),
            request_timeout_secs: default_request_timeout_secs(),
            socket_path: None,
            modes: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Returns the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Loads the config file at `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text).map_err(|e| match e {
            ConfigError::Load(msg) => ConfigError::Load(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Loads `path` if given, otherwise the default config file.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parses TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Builds the mode registry: reference modes followed by configured ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured mode is invalid or duplicated, or
    /// if `default_mode` is not registered.
    pub fn build_registry(&self) -> Result<ModeRegistry, ConfigError> {
        let mut registry = ModeRegistry::reference();
        for mode in &self.modes {
            registry.register(mode.clone())?;
        }
        if registry.get(&self.default_mode).is_none() {
            return Err(ConfigError::UnknownDefaultMode(self.default_mode.clone()));
        }
        Ok(registry)
    }

    /// Auto-start delay as a `Duration`.
    pub fn auto_start_delay(&self) -> Duration {
        Duration::from_millis(self.auto_start_delay_ms)
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Socket path: the configured override, else `~/.pomodoro-board/pomodoro-board.sock`.
    pub fn socket_path(&self) -> Option<PathBuf> {
        self.socket_path.clone().or_else(default_socket_path)
    }
}

/// Default daemon socket path under the home directory.
pub fn default_socket_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SOCKET_RELATIVE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.default_mode, "light");
        assert_eq!(config.auto_start_delay(), Duration::from_secs(2));
        assert!(config.sound);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.modes.is_empty());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        assert_eq!(AppConfig::parse("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let text = r##"
            api_base_url = "http://tasks.local"
            default_mode = "sprint"
            auto_start_delay_ms = 500
            sound = false
            socket_path = "/tmp/pb.sock"

            [[modes]]
            name = "sprint"
            work_minutes = 15
            break_minutes = 3
            color = "#3498db"
        "##;
        let config = AppConfig::parse(text).unwrap();

        assert_eq!(config.api_base_url, "http://tasks.local");
        assert!(!config.sound);
        assert_eq!(config.socket_path(), Some(PathBuf::from("/tmp/pb.sock")));

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.names(), vec!["light", "medium", "deep", "sprint"]);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = AppConfig::parse("sound = maybe");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_registry_rejects_zero_length_mode() {
        let text = r##"
            [[modes]]
            name = "broken"
            work_minutes = 0
            break_minutes = 5
            color = "#000000"
        "##;
        let config = AppConfig::parse(text).unwrap();
        assert!(matches!(
            config.build_registry(),
            Err(ConfigError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn test_registry_rejects_overlong_mode() {
        let text = r##"
            [[modes]]
            name = "huge"
            work_minutes = 80000000
            break_minutes = 5
            color = "#000000"
        "##;
        let config = AppConfig::parse(text).unwrap();
        assert!(matches!(
            config.build_registry(),
            Err(ConfigError::DurationTooLong { .. })
        ));
    }

    #[test]
    fn test_registry_rejects_unknown_default_mode() {
        let config = AppConfig {
            default_mode: "ultra".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.build_registry().unwrap_err(),
            ConfigError::UnknownDefaultMode("ultra".to_string())
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_mode = \"medium\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_mode, "medium");
    }

    #[test]
    fn test_load_error_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "modes = 3\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
