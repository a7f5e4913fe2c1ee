mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Returns the config directory: <config dir>/pebble-wand/
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("pebble-wand");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the config file path: <config dir>/pebble-wand/config.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from the default location, or return defaults if not found.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load config from `path`, or return defaults if the file does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.detector.validate()?;
        info!(?path, "Loaded config");
        Ok(config)
    } else {
        info!(?path, "No config found, using defaults");
        Ok(AppConfig::default())
    }
}

/// Save config to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pebble-wand-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn defaults_match_watch_protocol() {
        let config = AppConfig::default();
        assert_eq!(config.detector.mode, DetectorMode::Stateless);
        assert_eq!(config.detector.window_samples, 10);
        assert_eq!(config.detector.buffered_samples, 20);
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.stream, "amb-temp");
        assert!(config.link.bridge_addr.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [detector]
            mode = "buffered"

            [telemetry]
            relay_addr = "127.0.0.1:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.mode, DetectorMode::Buffered);
        assert_eq!(config.detector.window_samples, 10);
        assert_eq!(config.telemetry.relay_addr.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(config.telemetry.feed_id, TelemetryConfig::default().feed_id);
    }

    #[test]
    fn save_then_load() {
        let path = scratch_path("roundtrip");
        let mut config = AppConfig::default();
        config.link.bridge_addr = Some("10.0.0.2:7000".into());
        config.telemetry.enabled = false;

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = scratch_path("missing");
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn window_sizes_below_two_are_refused() {
        for (name, body) in [
            ("stateless0", "[detector]\nwindow_samples = 0"),
            ("stateless1", "[detector]\nwindow_samples = 1"),
            ("buffered0", "[detector]\nmode = \"buffered\"\nbuffered_samples = 0"),
            ("buffered1", "[detector]\nmode = \"buffered\"\nbuffered_samples = 1"),
        ] {
            let path = scratch_path(name);
            std::fs::write(&path, body).unwrap();
            let result = load_config_from(&path);
            std::fs::remove_file(&path).ok();
            let err = result.unwrap_err().to_string();
            assert!(err.contains("must be at least 2"), "{name}: {err}");
        }
    }

    #[test]
    fn smallest_valid_window_loads() {
        let path = scratch_path("minimal");
        std::fs::write(&path, "[detector]\nwindow_samples = 2\nbuffered_samples = 2").unwrap();
        let result = load_config_from(&path);
        std::fs::remove_file(&path).ok();
        let config = result.unwrap();
        assert_eq!(config.detector.window_samples, 2);
        assert_eq!(config.detector.buffered_samples, 2);
    }

    #[test]
    fn bad_file_is_an_error() {
        let path = scratch_path("bad");
        std::fs::write(&path, "detector = 5").unwrap();
        let result = load_config_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
