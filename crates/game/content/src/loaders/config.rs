//! Arena configuration loader.

use std::path::Path;

use game_core::ArenaConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for arena configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`ArenaConfig::default`].
    pub fn load(path: &Path) -> LoadResult<ArenaConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ArenaConfig> {
        let config: ArenaConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_defaults() {
        let config = ConfigLoader::parse("box_count = 3\nseed = 42\n").unwrap();
        assert_eq!(config.box_count, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.monster_step_interval_ms,
            ArenaConfig::default().monster_step_interval_ms
        );
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(ConfigLoader::parse("box_count = \"many\"").is_err());
    }
}
