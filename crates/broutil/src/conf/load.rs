//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::BroUtilConfig;

impl BroUtilConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("BROUTIL_CONFIG_FILE")
            .unwrap_or_else(|_| "/etc/broutil/broutil.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: BroUtilConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `BROUTIL_*` overrides from `lookup`. Unparseable values are
    /// ignored and the current setting kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup("BROUTIL_DECODER") {
            self.decoder_program = program;
        }
        if let Some(dir) = lookup("BROUTIL_SCRATCH_DIR") {
            self.scratch_dir = Some(dir);
        }
        if let Some(follow) = lookup("BROUTIL_FOLLOW_SYMLINKS").and_then(|s| s.parse().ok()) {
            self.follow_symlinks = follow;
        }
        if let Some(scale) = lookup("BROUTIL_TIME_SCALE").and_then(|s| s.parse().ok()) {
            self.time_scale = scale;
        }
    }
}
