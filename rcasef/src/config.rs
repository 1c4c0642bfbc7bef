//! Preset configuration.
//!
//! A preset is a YAML file describing one complete front-panel setting plus
//! rendering options.  Every field is optional:
//!
//! ```yaml
//! sample_rate: 48000
//! high_pass:
//!   mode: continuous
//!   cutoff_hz: 1000
//! low_pass:
//!   mode: discrete
//!   knob: 6
//!   modulated: false
//! output_gain_db: 6
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::analysis::AnalysisConfig;
use crate::mapping::{
    KnobPosition, DEFAULT_K, IMPEDANCE_PCT_MAX, IMPEDANCE_PCT_MIN, KNOB_POSITIONS,
};
use crate::params::{
    FilterParams, SectionParams, CHARACTERISTIC_IMPEDANCE_MAX, CHARACTERISTIC_IMPEDANCE_MIN,
    CUTOFF_MAX_HZ, CUTOFF_MIN_HZ, DEFAULT_OUTPUT_GAIN_DB, OUTPUT_GAIN_MAX_DB, OUTPUT_GAIN_MIN_DB,
};
use crate::wav::{DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeConfig {
    #[default]
    Continuous,
    Discrete,
}

/// One filter section.  Unset fields take the section's front-panel default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knob: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulated: Option<bool>,
}

impl SectionConfig {
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if let Some(hz) = self.cutoff_hz {
            if !(CUTOFF_MIN_HZ..=CUTOFF_MAX_HZ).contains(&hz) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.cutoff_hz {hz} outside {CUTOFF_MIN_HZ}..={CUTOFF_MAX_HZ}"
                )));
            }
        }
        if let Some(knob) = self.knob {
            if KnobPosition::new(knob).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "{name}.knob {knob} outside 1..={KNOB_POSITIONS}"
                )));
            }
        }
        Ok(())
    }

    fn apply(&self, mut base: SectionParams) -> SectionParams {
        base.continuous = self.mode == ModeConfig::Continuous;
        if let Some(hz) = self.cutoff_hz {
            base.cutoff_hz = hz;
        }
        if let Some(knob) = self.knob {
            base.knob = KnobPosition::saturating(i64::from(knob));
        }
        if let Some(modulated) = self.modulated {
            base.modulated = modulated;
        }
        base
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_output_gain_db() -> f64 {
    DEFAULT_OUTPUT_GAIN_DB
}

fn default_characteristic_impedance() -> f64 {
    DEFAULT_K
}

/// Root preset structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SefConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default)]
    pub high_pass: SectionConfig,
    #[serde(default)]
    pub low_pass: SectionConfig,
    #[serde(default)]
    pub input_impedance_pct: f64,
    #[serde(default)]
    pub output_impedance_pct: f64,
    #[serde(default = "default_output_gain_db")]
    pub output_gain_db: f64,
    #[serde(default = "default_characteristic_impedance")]
    pub characteristic_impedance: f64,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for SefConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            high_pass: SectionConfig::default(),
            low_pass: SectionConfig::default(),
            input_impedance_pct: 0.0,
            output_impedance_pct: 0.0,
            output_gain_db: default_output_gain_db(),
            characteristic_impedance: default_characteristic_impedance(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl SefConfig {
    /// Load and validate a preset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        tracing::info!(path = %path.display(), "loaded preset");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be non-zero".into()));
        }
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be non-zero".into()));
        }
        self.high_pass.validate("high_pass")?;
        self.low_pass.validate("low_pass")?;
        for (name, pct) in [
            ("input_impedance_pct", self.input_impedance_pct),
            ("output_impedance_pct", self.output_impedance_pct),
        ] {
            if !(IMPEDANCE_PCT_MIN..=IMPEDANCE_PCT_MAX).contains(&pct) {
                return Err(ConfigError::Invalid(format!(
                    "{name} {pct} outside {IMPEDANCE_PCT_MIN}..={IMPEDANCE_PCT_MAX}"
                )));
            }
        }
        if !(OUTPUT_GAIN_MIN_DB..=OUTPUT_GAIN_MAX_DB).contains(&self.output_gain_db) {
            return Err(ConfigError::Invalid(format!(
                "output_gain_db {} outside {OUTPUT_GAIN_MIN_DB}..={OUTPUT_GAIN_MAX_DB}",
                self.output_gain_db
            )));
        }
        if !(CHARACTERISTIC_IMPEDANCE_MIN..=CHARACTERISTIC_IMPEDANCE_MAX)
            .contains(&self.characteristic_impedance)
        {
            return Err(ConfigError::Invalid(format!(
                "characteristic_impedance {} outside \
                 {CHARACTERISTIC_IMPEDANCE_MIN}..={CHARACTERISTIC_IMPEDANCE_MAX}",
                self.characteristic_impedance
            )));
        }
        self.analysis
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("analysis: {e}")))?;
        Ok(())
    }

    /// The front-panel snapshot this preset describes.
    pub fn to_params(&self) -> FilterParams {
        FilterParams {
            high_pass: self.high_pass.apply(SectionParams::high_pass_default()),
            low_pass: self.low_pass.apply(SectionParams::low_pass_default()),
            input_impedance_pct: self.input_impedance_pct,
            output_impedance_pct: self.output_impedance_pct,
            output_gain_db: self.output_gain_db,
            characteristic_impedance: self.characteristic_impedance,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
