//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["ratecard.toml", ".ratecard.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. `RATECARD_` environment variables (`RATECARD_CONSENSUS__MIN_RESPONSES=4`)
    /// 3. Project root: `./ratecard.toml` or `./.ratecard.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/ratecard-quorum/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(Self::global_config_path(), Self::project_config_path(), config_path)
            .extract()
            .map_err(Box::new)
    }

    fn figment(
        global: Option<PathBuf>,
        project: Option<PathBuf>,
        explicit: Option<&PathBuf>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("RATECARD_").split("__"));

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// `$XDG_CONFIG_HOME/ratecard-quorum/config.toml`, falling back to the
    /// platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ratecard-quorum").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = explicit {
            let found = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{found:^7}] Explicit: {}", path.display());
        }

        println!("  [  ENV  ] Environment: RATECARD_*");

        match Self::project_config_path() {
            Some(path) => println!("  [ FOUND ] Project: {}", path.display()),
            None => println!("  [       ] Project: ./ratecard.toml or ./.ratecard.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let found = if path.exists() { "FOUND" } else { "" };
            println!("  [{found:^7}] Global:  {}", path.display());
        }

        println!("  [       ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.consensus.min_responses, 3);
        assert!(config.logging.audit_log.is_none());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("ratecard-quorum"));
    }

    #[test]
    fn test_project_config_prefers_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::project_config_in(dir.path()).is_none());

        std::fs::write(dir.path().join(".ratecard.toml"), "").unwrap();
        std::fs::write(dir.path().join("ratecard.toml"), "").unwrap();

        assert_eq!(
            ConfigLoader::project_config_in(dir.path()),
            Some(dir.path().join("ratecard.toml"))
        );
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("ratecard.toml");
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(
            &global,
            "[consensus]\nmin_responses = 5\npair_quorum = 3\nlabel_min_votes = 3\n",
        )
        .unwrap();
        std::fs::write(&project, "[consensus]\npair_quorum = 4\n").unwrap();
        std::fs::write(&explicit, "[consensus]\nlabel_min_votes = 4\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(global), Some(project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.consensus.min_responses, 5);
        assert_eq!(config.consensus.pair_quorum, 4);
        assert_eq!(config.consensus.label_min_votes, 4);
        assert_eq!(config.consensus.no_rates_quorum, 2);
    }

    #[test]
    fn test_missing_global_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config: FileConfig =
            ConfigLoader::figment(Some(dir.path().join("absent.toml")), None, None)
                .extract()
                .unwrap();
        assert_eq!(config, FileConfig::default());
    }
}
