//! Tunable constants for the schedule and crashing models.
//!
//! Every heuristic in the engine lives here so it can be recalibrated from an
//! `estimate.toml` file or `ESTIMATE__*` environment variables without touching
//! the algorithms.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "estimate";
pub const ENV_PREFIX: &str = "ESTIMATE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub schedule: ScheduleParameters,
    pub crashing: CrashingParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleParameters {
    /// Working hours in one crew-day; converts daily yields into hours per unit.
    pub hours_per_workday: f64,
    /// Width of one S-curve bucket in calendar days.
    pub s_curve_bucket_days: i64,
    /// Upper bound on S-curve buckets; longer horizons get wider buckets.
    pub max_s_curve_buckets: usize,
}

impl Default for ScheduleParameters {
    fn default() -> Self {
        Self {
            hours_per_workday: 8.0,
            s_curve_bucket_days: 7,
            max_s_curve_buckets: 260,
        }
    }
}

/// Heuristic business constants of the time-cost trade-off model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashingParameters {
    /// Share of overtime hours that turn into output.
    pub overtime_productivity: f64,
    /// Efficiency loss is `overtime_percent / fatigue_divisor`.
    pub fatigue_divisor: f64,
    /// Labor premium paid per unit of overtime fraction.
    pub overtime_premium: f64,
    /// Supervision overhead added to labor per extra crew.
    pub supervision_overhead_per_crew: f64,
    pub max_extra_crews: u32,
    /// Supported overtime levels in percent, ascending.
    pub overtime_options: Vec<f64>,
}

impl Default for CrashingParameters {
    fn default() -> Self {
        Self {
            overtime_productivity: 0.8,
            fatigue_divisor: 500.0,
            overtime_premium: 1.5,
            supervision_overhead_per_crew: 0.05,
            max_extra_crews: 3,
            overtime_options: vec![0.0, 50.0, 100.0],
        }
    }
}

impl EngineConfig {
    /// Loads `estimate.toml` from the working directory (optional) and applies
    /// `ESTIMATE__SECTION__KEY` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        )
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::from(path.as_ref())))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.schedule;
        if !(s.hours_per_workday.is_finite() && s.hours_per_workday > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "schedule.hours_per_workday must be positive (got {})",
                s.hours_per_workday
            )));
        }
        if s.s_curve_bucket_days < 1 {
            return Err(ConfigError::Invalid(format!(
                "schedule.s_curve_bucket_days must be at least 1 (got {})",
                s.s_curve_bucket_days
            )));
        }
        if s.max_s_curve_buckets < 1 {
            return Err(ConfigError::Invalid(
                "schedule.max_s_curve_buckets must be at least 1".into(),
            ));
        }

        let c = &self.crashing;
        if !(c.fatigue_divisor.is_finite() && c.fatigue_divisor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "crashing.fatigue_divisor must be positive (got {})",
                c.fatigue_divisor
            )));
        }
        for (name, value) in [
            ("overtime_productivity", c.overtime_productivity),
            ("overtime_premium", c.overtime_premium),
            ("supervision_overhead_per_crew", c.supervision_overhead_per_crew),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "crashing.{name} must be non-negative (got {value})"
                )));
            }
        }
        if c.overtime_options.is_empty() {
            return Err(ConfigError::Invalid(
                "crashing.overtime_options requires at least one level".into(),
            ));
        }
        if let Some(bad) = c
            .overtime_options
            .iter()
            .find(|pct| !(pct.is_finite() && **pct >= 0.0 && **pct < c.fatigue_divisor))
        {
            return Err(ConfigError::Invalid(format!(
                "crashing.overtime_options contains unsupported level {bad}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn toml_overrides_single_constant() {
        let config = EngineConfig::from_toml_str(
            r#"
            [crashing]
            overtime_premium = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.crashing.overtime_premium, 2.0);
        assert_eq!(config.crashing.fatigue_divisor, 500.0);
        assert_eq!(config.schedule.s_curve_bucket_days, 7);
    }

    #[test]
    fn rejects_zero_bucket_width() {
        let err = EngineConfig::from_toml_str("[schedule]\ns_curve_bucket_days = 0\n").unwrap_err();
        assert!(err.to_string().contains("s_curve_bucket_days"));
    }
}
