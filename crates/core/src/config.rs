//! Application configuration handling.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::SortKey;

/// Commented template written on first run.
const DEFAULT_CONFIG: &str = r##"# GameVault launcher configuration.
#
# [theme] colours are hex strings, e.g. "#0ea5e9". Unset values fall back
# to the built-in palette.
[theme]
# accent = "#0ea5e9"
# background = "#0b0f14"
# foreground = "#e6edf3"
# muted = "#5b6572"
# success = "#22c55e"
# danger = "#ef4444"

[library]
# Initial sort key for the library view: "recent", "name" or "playtime".
# default_sort = "recent"
"##;

/// User-tweakable settings loaded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Colour palette overrides.
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Library view defaults.
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Optional hex colour overrides for the TUI palette.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Accent/highlight colour.
    pub accent: Option<String>,
    /// Base background colour.
    pub background: Option<String>,
    /// Base foreground colour.
    pub foreground: Option<String>,
    /// Dimmed text colour.
    pub muted: Option<String>,
    /// Success colour (launch done).
    pub success: Option<String>,
    /// Destructive-action colour.
    pub danger: Option<String>,
}

/// Library view defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Initial sort key: `recent`, `name` or `playtime`.
    pub default_sort: Option<String>,
}

impl AppConfig {
    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gamevault")
            .join("config.toml")
    }

    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .build()
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse {}", path.as_ref().display()))
    }

    /// Initial library sort key.
    pub fn default_sort(&self) -> SortKey {
        self.library
            .default_sort
            .as_deref()
            .map(SortKey::parse)
            .unwrap_or_default()
    }
}

/// Write the commented default config if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(AppConfig::default_path())
}

fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("config.toml"))?;
        assert!(config.theme.accent.is_none());
        assert_eq!(config.default_sort(), SortKey::Recent);
        Ok(())
    }

    #[test]
    fn parses_overrides() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[theme]\naccent = \"#0ea5e9\"\n\n[library]\ndefault_sort = \"playtime\"\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.theme.accent.as_deref(), Some("#0ea5e9"));
        assert_eq!(config.default_sort(), SortKey::Playtime);
        Ok(())
    }

    #[test]
    fn default_template_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        // Template must round-trip through the loader.
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.default_sort(), SortKey::Recent);

        // Second call leaves an existing file alone.
        fs::write(&path, "[library]\ndefault_sort = \"name\"\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(AppConfig::load_from(&path)?.default_sort(), SortKey::Name);
        Ok(())
    }
}
