//! Configuration loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for overlay and song-name files.
    pub data_dir: PathBuf,
    pub overlay: OverlayConfig,
    pub discovery: DiscoveryConfig,
    pub scenes: SceneConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("UserData/StreamInfo"),
            overlay: OverlayConfig::default(),
            discovery: DiscoveryConfig::default(),
            scenes: SceneConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Render loop refresh interval in milliseconds.
    pub refresh_rate_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate_ms: 100,
        }
    }
}

impl OverlayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_rate_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// How often to re-query the host for missing objects.
    pub poll_interval_ms: u64,
    /// Optional upper bound on the discovery wait. Absent means wait
    /// forever, matching the host's unknown object construction time.
    pub timeout_ms: Option<u64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 150,
            timeout_ms: None,
        }
    }
}

impl DiscoveryConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene names that start a session; any other destination ends one.
    pub gameplay: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gameplay: [
                "GameplayCore",
                "DefaultEnvironment",
                "BigMirrorEnvironment",
                "TriangleEnvironment",
                "NiceEnvironment",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

impl SceneConfig {
    pub fn is_gameplay(&self, scene: &str) -> bool {
        self.gameplay.iter().any(|name| name == scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.overlay.enabled);
        assert_eq!(config.overlay.refresh_interval(), Duration::from_millis(100));
        assert_eq!(
            config.discovery.poll_interval(),
            Duration::from_millis(150)
        );
        assert_eq!(config.discovery.timeout(), None);
        assert!(config.scenes.is_gameplay("GameplayCore"));
        assert!(config.scenes.is_gameplay("NiceEnvironment"));
        assert!(!config.scenes.is_gameplay("Menu"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [overlay]
            refresh_rate_ms = 250

            [discovery]
            timeout_ms = 30000
            "#,
        )
        .unwrap();
        assert!(config.overlay.enabled);
        assert_eq!(config.overlay.refresh_rate_ms, 250);
        assert_eq!(config.discovery.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.discovery.poll_interval_ms, 150);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streaminfo.toml");

        let mut config = Config::default();
        config.overlay.refresh_rate_ms = 42;
        config.scenes.gameplay = vec!["GameplayCore".to_string()];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let overlay = OverlayConfig {
            enabled: true,
            refresh_rate_ms: 0,
        };
        assert_eq!(overlay.refresh_interval(), Duration::from_millis(1));
    }
}
