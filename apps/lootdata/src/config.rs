//! # Configuration
//!
//! Optional `lootdata.toml`:
//!
//! ```toml
//! [source]
//! base_url = "https://wago.tools/db2"
//! timeout_secs = 30
//! # dir = "fixtures/db2"
//!
//! [output]
//! static_path = "Data/StaticData.lua"
//! loot_path = "Data/Compressed.lua"
//!
//! [policy]
//! current_season_tier = 505
//! excluded_tiers = []
//! excluded_difficulties = [18, 19, 20, 232, 205, 216, 220, 236, 241]
//! ```
//!
//! Precedence for the table source: `--source`, then `LOOTDATA_SOURCE`,
//! then the file, then the built-in default.

use crate::fetch::Source;
use lootdata_core::{CompileError, DifficultyId, Policy, TierId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lootdata.toml";

/// Environment variable overriding the table source.
pub const SOURCE_ENV: &str = "LOOTDATA_SOURCE";

pub const DEFAULT_BASE_URL: &str = "https://wago.tools/db2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STATIC_PATH: &str = "Data/StaticData.lua";
pub const DEFAULT_LOOT_PATH: &str = "Data/Compressed.lua";

// =============================================================================
// FILE MODEL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub policy: PolicyOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Read `{dir}/{Table}.csv` instead of fetching over HTTP.
    pub dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub static_path: PathBuf,
    pub loot_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            static_path: PathBuf::from(DEFAULT_STATIC_PATH),
            loot_path: PathBuf::from(DEFAULT_LOOT_PATH),
        }
    }
}

/// Replacements for parts of the built-in [`Policy`]. Absent keys keep the
/// built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    pub current_season_tier: Option<i64>,
    pub excluded_tiers: Option<Vec<i64>>,
    pub excluded_difficulties: Option<Vec<i64>>,
}

impl PolicyOverrides {
    #[must_use]
    pub fn apply(&self, mut policy: Policy) -> Policy {
        if let Some(tier) = self.current_season_tier {
            policy.tiers.current_season = TierId(tier);
        }
        if let Some(tiers) = &self.excluded_tiers {
            policy.tiers.excluded = tiers.iter().copied().map(TierId).collect();
        }
        if let Some(ids) = &self.excluded_difficulties {
            policy.difficulties.excluded = ids.iter().copied().map(DifficultyId).collect();
        }
        policy
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, CompileError> {
        toml::from_str(text).map_err(|e| CompileError::Config(e.to_string()))
    }

    /// Load an explicit config file, or `lootdata.toml` if it exists, or the
    /// defaults. An explicit path that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CompileError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| {
            CompileError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&text)
            .map_err(|e| CompileError::Config(format!("{}: {}", path.display(), e)))
    }

    /// The resolver policy: built-in tables with file overrides applied.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy.apply(Policy::default())
    }

    /// The table source, honoring an override from the CLI or environment.
    #[must_use]
    pub fn table_source(&self, override_value: Option<&str>) -> Source {
        let timeout = Duration::from_secs(self.source.timeout_secs);
        if let Some(value) = override_value.filter(|v| !v.trim().is_empty()) {
            return Source::parse(value.trim(), timeout);
        }
        match &self.source.dir {
            Some(dir) => Source::Dir(dir.clone()),
            None => Source::Http {
                base_url: self.source.base_url.clone(),
                timeout,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(
            config.output.static_path,
            PathBuf::from(DEFAULT_STATIC_PATH)
        );
        assert_eq!(config.policy(), Policy::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            [source]
            timeout_secs = 5

            [policy]
            excluded_tiers = [72]
            "#,
        )
        .expect("parse");

        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.source.timeout_secs, 5);

        let policy = config.policy();
        assert!(policy.tiers.is_excluded(TierId(72)));
        assert_eq!(policy.difficulties, Policy::default().difficulties);
    }

    #[test]
    fn policy_overrides_replace_sets() {
        let config = Config::from_toml_str(
            r#"
            [policy]
            current_season_tier = 510
            excluded_difficulties = [205]
            "#,
        )
        .expect("parse");

        let policy = config.policy();
        assert_eq!(policy.tiers.current_season, TierId(510));
        assert!(policy.difficulties.is_excluded(DifficultyId(205)));
        assert!(!policy.difficulties.is_excluded(DifficultyId(18)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[source]\nurl = \"x\"\n"),
            Err(CompileError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[extra]\n"),
            Err(CompileError::Config(_))
        ));
    }

    #[test]
    fn source_precedence() {
        let mut config = Config::default();
        assert!(matches!(config.table_source(None), Source::Http { .. }));

        config.source.dir = Some(PathBuf::from("fixtures"));
        assert_eq!(
            config.table_source(None),
            Source::Dir(PathBuf::from("fixtures"))
        );

        assert!(matches!(
            config.table_source(Some("https://example.org/db2")),
            Source::Http { .. }
        ));
        assert_eq!(
            config.table_source(Some("  ")),
            Source::Dir(PathBuf::from("fixtures"))
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/lootdata.toml")));
        assert!(matches!(result, Err(CompileError::Config(_))));
    }
}
