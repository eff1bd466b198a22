use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the downbooru library.
///
/// Controls which booru instance to talk to and how downloaded files are
/// written out.
///
/// # Loading
///
/// ```rust,no_run
/// use downbooru::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.dir = Some("./downloads".into());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Booru API and download settings.
    pub network: NetworkConfig,
    /// Output behavior (directory, dry run, overwrite).
    pub output: OutputConfig,
}

/// Booru API and HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Base URL of the Danbooru-compatible site.
    pub base_url: String,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the tagged JPEGs are written into. `None` means the
    /// current working directory.
    pub dir: Option<String>,
    /// If `true`, preview what would be written without saving any files.
    pub dry_run: bool,
    /// If `true`, overwrite a file that already exists. If `false`, skip it.
    pub overwrite_existing: bool,
    /// If `true`, decode the source and re-encode it as a flattened JPEG
    /// even when it is already a JPEG. If `false`, JPEG sources are patched
    /// as-is and only PNG sources are re-encoded.
    pub reencode_jpeg: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                base_url: "https://danbooru.donmai.us".to_string(),
                user_agent: format!("downbooru/{}", env!("CARGO_PKG_VERSION")),
                timeout_secs: 60,
            },
            output: OutputConfig {
                dir: None,
                dry_run: false,
                overwrite_existing: false,
                reencode_jpeg: true,
            },
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Resolve the output directory for downloaded files.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_points_at_danbooru() {
        let config = Config::default();
        assert_eq!(config.network.base_url, "https://danbooru.donmai.us");
        assert!(!config.output.dry_run);
        assert!(config.output.reencode_jpeg);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.output.dir = Some("/tmp/booru".to_string());
        config.network.timeout_secs = 5;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.output.dir.as_deref(), Some("/tmp/booru"));
        assert_eq!(loaded.network.timeout_secs, 5);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.network.base_url, Config::default().network.base_url);
    }

    #[test]
    fn output_dir_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(config.output_dir(), PathBuf::from("."));
    }
}
