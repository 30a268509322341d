//! Model — BroUtilConfig.

use serde::{Deserialize, Serialize};

use crate::parser::DS_TIME_SCALE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroUtilConfig {
    /// Program used to decode DataSeries containers
    pub decoder_program: String,
    /// Parent directory for decoded scratch files; system temp dir when unset
    pub scratch_dir: Option<String>,
    /// Follow symlinks while walking input directories
    pub follow_symlinks: bool,
    /// Divisor turning DataSeries time ticks into seconds
    pub time_scale: f64,
}

impl Default for BroUtilConfig {
    fn default() -> Self {
        Self {
            decoder_program: "ds2txt".to_string(),
            scratch_dir: None,
            follow_symlinks: false,
            time_scale: DS_TIME_SCALE,
        }
    }
}

impl BroUtilConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.decoder_program.trim().is_empty() {
            return Err("decoder_program must not be empty".to_string());
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(format!("time_scale must be a positive number, got {}", self.time_scale));
        }
        if let Some(dir) = &self.scratch_dir {
            if dir.is_empty() {
                return Err("scratch_dir must not be an empty string".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let cfg = BroUtilConfig::default();
        assert_eq!(cfg.decoder_program, "ds2txt");
        assert!(cfg.scratch_dir.is_none());
        assert!(!cfg.follow_symlinks);
        assert_eq!(cfg.time_scale, 100_000.0);
        assert!(cfg.validate().is_ok());
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_empty_decoder() {
        let cfg = BroUtilConfig {
            decoder_program: "  ".to_string(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("decoder_program"), "Error should mention decoder_program: {}", err);
    }

    #[test]
    fn test_validate_rejects_bad_time_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = BroUtilConfig {
                time_scale: scale,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "time_scale {} should be rejected", scale);
        }
    }

    #[test]
    fn test_validate_rejects_empty_scratch_dir() {
        let cfg = BroUtilConfig {
            scratch_dir: Some(String::new()),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    // ── Serialization ────────────────────────────────────────────

    #[test]
    fn test_deserialize_partial_toml() {
        // Only set decoder_program; rest should use defaults via #[serde(default)]
        let toml_str = r#"decoder_program = "/opt/dataseries/bin/ds2txt""#;
        let cfg: BroUtilConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.decoder_program, "/opt/dataseries/bin/ds2txt");
        assert_eq!(cfg.time_scale, 100_000.0);
        assert!(!cfg.follow_symlinks);
    }

    #[test]
    fn test_deserialize_full_toml() {
        let toml_str = r#"
            decoder_program = "ds2txt"
            scratch_dir = "/var/tmp"
            follow_symlinks = true
            time_scale = 1000000.0
        "#;
        let cfg: BroUtilConfig = toml::from_str(toml_str).expect("Should parse full TOML");
        assert_eq!(cfg.scratch_dir.as_deref(), Some("/var/tmp"));
        assert!(cfg.follow_symlinks);
        assert_eq!(cfg.time_scale, 1_000_000.0);
    }
}
