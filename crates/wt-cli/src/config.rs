//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Weekday;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// First day of the week for weekly totals.
    pub week_start: Weekday,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wt.db"),
            week_start: Weekday::Mon,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/wt/config.toml`, `path`, then
    /// `WT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("WT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for wt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}

/// Returns the platform-specific data directory for wt.
///
/// On Linux: `~/.local/share/wt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    #[test]
    fn test_dirs_data_path_ends_with_wt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wt");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("wt.db"));
        assert_eq!(config.week_start, Weekday::Mon);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "wt.toml",
                r#"
                database_path = "/tmp/custom.db"
                week_start = "Sun"
                "#,
            )?;
            let config = Config::load_from(Some(Path::new("wt.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
            assert_eq!(config.week_start, Weekday::Sun);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("wt.toml", r#"database_path = "/tmp/file.db""#)?;
            jail.set_env("WT_DATABASE_PATH", "/tmp/env.db");
            jail.set_env("WT_WEEK_START", "saturday");
            let config = Config::load_from(Some(Path::new("wt.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));
            assert_eq!(config.week_start, Weekday::Sat);
            Ok(())
        });
    }
}
