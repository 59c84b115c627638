//! Relieve factors for the extension planner.
//!
//! Both factors live in `[0, 1]`. They can be set in code or read from the
//! `[extension]` table of a TOML file; unspecified values keep their defaults.
//!
//! ```toml
//! [extension]
//! relieve_factor_current = 0.5
//! relieve_factor_voltage = 0.7
//! ```

use std::path::Path;

use anyhow::Context;
use lvgx_core::{LvgxError, LvgxResult};
use serde::{Deserialize, Serialize};

/// Default relieve factor for thermal overloads.
pub const DEFAULT_RELIEVE_FACTOR_CURRENT: f64 = 0.4;

/// Default relieve factor for voltage bound violations.
pub const DEFAULT_RELIEVE_FACTOR_VOLTAGE: f64 = 0.7;

/// Tunables of the extension planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// A thermal-relief walk keeps extending while the next section still
    /// carries at least `(1 - factor)` of the worst overload's current.
    pub relieve_factor_current: f64,

    /// A voltage-relief walk keeps extending while the next bus deviates
    /// from nominal by at most `factor` times the feeder extremum's deviation.
    pub relieve_factor_voltage: f64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            relieve_factor_current: DEFAULT_RELIEVE_FACTOR_CURRENT,
            relieve_factor_voltage: DEFAULT_RELIEVE_FACTOR_VOLTAGE,
        }
    }
}

/// On-disk layout: the planner reads only its own table.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    extension: ExtensionConfig,
}

impl ExtensionConfig {
    /// Check both factors against `[0, 1]`.
    pub fn validate(&self) -> LvgxResult<()> {
        check_relieve_factor("relieve_factor_current", self.relieve_factor_current)?;
        check_relieve_factor("relieve_factor_voltage", self.relieve_factor_voltage)?;
        Ok(())
    }

    /// Parse and validate a TOML document with an optional `[extension]` table.
    pub fn from_toml_str(content: &str) -> LvgxResult<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| LvgxError::Config(e.to_string()))?;
        file.extension.validate()?;
        Ok(file.extension)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading extension config '{}'", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing extension config '{}'", path.display()))
    }
}

/// Rejects relieve factors outside `[0, 1]` (NaN included).
pub fn check_relieve_factor(name: &'static str, value: f64) -> LvgxResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(LvgxError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExtensionConfig::default();
        assert_eq!(config.relieve_factor_current, 0.4);
        assert_eq!(config.relieve_factor_voltage, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_check_relieve_factor_bounds() {
        assert_eq!(check_relieve_factor("f", 0.0).unwrap(), 0.0);
        assert_eq!(check_relieve_factor("f", 1.0).unwrap(), 1.0);
        assert!(check_relieve_factor("f", -0.01).is_err());
        assert!(check_relieve_factor("f", 1.01).is_err());
        assert!(check_relieve_factor("f", f64::NAN).is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExtensionConfig::from_toml_str(
            r#"
            [extension]
            relieve_factor_current = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.relieve_factor_current, 0.25);
        assert_eq!(config.relieve_factor_voltage, DEFAULT_RELIEVE_FACTOR_VOLTAGE);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ExtensionConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExtensionConfig::default());
    }

    #[test]
    fn test_out_of_range_toml_rejected() {
        let err = ExtensionConfig::from_toml_str(
            r#"
            [extension]
            relieve_factor_voltage = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LvgxError::InvalidParameter {
                name: "relieve_factor_voltage",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = ExtensionConfig::from_toml_str("[extension\n").unwrap_err();
        assert!(matches!(err, LvgxError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lvgx.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[extension]\nrelieve_factor_current = 0.6").unwrap();

        let config = ExtensionConfig::load(&path).unwrap();
        assert_eq!(config.relieve_factor_current, 0.6);

        let missing = ExtensionConfig::load(dir.path().join("missing.toml"));
        assert!(missing.unwrap_err().to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_errors_keep_their_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[extension]\nrelieve_factor_current = 7.0\n").unwrap();

        let err = ExtensionConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
        assert!(matches!(
            err.downcast_ref::<LvgxError>(),
            Some(LvgxError::InvalidParameter { .. })
        ));

        let missing = ExtensionConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(missing.downcast_ref::<std::io::Error>().is_some());
    }
}
