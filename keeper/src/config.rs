//! Keeper configuration

use anyhow::{Context, Result};
use curve_sale::CurveParameters;
use curve_sale_common::bps_to_full_scale;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Curve shared by every sale the keeper runs
    pub curve: CurveConfig,

    /// Sales deployed into the in-memory sandbox at startup
    #[serde(default)]
    pub sales: Vec<SandboxSale>,
}

/// Curve constants in basis points (10_000 = 100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub base_rate_bps: u64,
    pub optimal_rate_bps: u64,
    pub max_rate_bps: u64,
    pub breakpoint_bps: u64,
}

impl CurveConfig {
    /// Scale to FULL_SCALE and validate the ordering
    pub fn to_params(&self) -> Result<CurveParameters> {
        let params = CurveParameters::new(
            bps_to_full_scale(self.base_rate_bps)?,
            bps_to_full_scale(self.optimal_rate_bps)?,
            bps_to_full_scale(self.max_rate_bps)?,
            bps_to_full_scale(self.breakpoint_bps)?,
        )
        .context("Invalid curve configuration")?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSale {
    /// Label the sandbox asset address is derived from
    pub name: String,

    /// Asset decimals (unit scale = 10^decimals)
    pub decimals: u32,

    /// Currency atomic units per whole asset unit
    pub starting_price: u64,

    /// Capacity in whole units
    pub capacity_units: u64,

    pub duration_secs: u64,

    /// Backdate the sale start so it ends sooner
    #[serde(default)]
    pub started_secs_ago: u64,

    /// Whole units a sandbox buyer takes right after deployment
    #[serde(default)]
    pub presold_units: u64,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)
            .context("Failed to parse config TOML")?;

        if config.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }
        config.curve.to_params()?;

        Ok(config)
    }

    /// Sandbox with two sales: one already past its window, one running for a day
    pub fn default_sandbox() -> Self {
        Self {
            poll_interval_secs: 1,
            curve: CurveConfig {
                base_rate_bps: 100,      // 1%
                optimal_rate_bps: 5_000, // 50%
                max_rate_bps: 20_000,    // 200%
                breakpoint_bps: 5_000,   // kink at half sold
            },
            sales: vec![
                SandboxSale {
                    name: "launch".to_string(),
                    decimals: 3,
                    starting_price: 1_000_000,
                    capacity_units: 1_000,
                    duration_secs: 3_600,
                    started_secs_ago: 3_600,
                    presold_units: 400,
                },
                SandboxSale {
                    name: "daily".to_string(),
                    decimals: 0,
                    starting_price: 250_000,
                    capacity_units: 10_000,
                    duration_secs: 86_400,
                    started_secs_ago: 0,
                    presold_units: 0,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve_sale_common::FULL_SCALE;

    #[test]
    fn test_default_sandbox() {
        let config = Config::default_sandbox();
        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.sales.len(), 2);

        let params = config.curve.to_params().unwrap();
        assert_eq!(params.base_rate, FULL_SCALE / 100);
        assert_eq!(params.max_rate, 2 * FULL_SCALE);
        assert_eq!(params.breakpoint, FULL_SCALE / 2);
    }

    #[test]
    fn test_default_survives_toml() {
        let toml_str = toml::to_string_pretty(&Config::default_sandbox()).unwrap();
        let parsed = Config::parse(&toml_str).unwrap();

        assert_eq!(parsed.curve, Config::default_sandbox().curve);
        assert_eq!(parsed.sales[0].presold_units, 400);
    }

    #[test]
    fn test_optional_fields_default() {
        let parsed = Config::parse(
            r#"
            poll_interval_secs = 5

            [curve]
            base_rate_bps = 100
            optimal_rate_bps = 5000
            max_rate_bps = 20000
            breakpoint_bps = 5000
            "#,
        )
        .unwrap();

        assert_eq!(parsed.poll_interval_secs, 5);
        assert!(parsed.sales.is_empty());
    }

    #[test]
    fn test_rejects_bad_curve() {
        let mut config = Config::default_sandbox();
        config.curve.breakpoint_bps = 10_000;
        let toml_str = toml::to_string_pretty(&config).unwrap();

        assert!(Config::parse(&toml_str).is_err());
    }
}
