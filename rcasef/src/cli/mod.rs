pub mod process;
pub mod response;
pub mod table;

use clap::Args;
use std::path::PathBuf;

use rcasef::config::{ConfigError, ModeConfig, SefConfig};

/// Front-panel overrides shared by the subcommands that run the filter.
#[derive(Args, Debug, Clone, Default)]
pub struct PanelArgs {
    /// YAML preset to start from.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// High-pass cutoff in Hz (continuous mode).
    #[arg(long, conflicts_with = "hp_knob")]
    pub hp: Option<f64>,
    /// Low-pass cutoff in Hz (continuous mode).
    #[arg(long, conflicts_with = "lp_knob")]
    pub lp: Option<f64>,
    /// High-pass switch position, 1-11 (discrete mode).
    #[arg(long)]
    pub hp_knob: Option<u8>,
    /// Low-pass switch position, 1-11 (discrete mode).
    #[arg(long)]
    pub lp_knob: Option<u8>,
    /// Take the high-pass mod section out of circuit.
    #[arg(long)]
    pub no_hp_mod: bool,
    /// Take the low-pass mod section out of circuit.
    #[arg(long)]
    pub no_lp_mod: bool,
    /// Input impedance knob, -100..100 %.
    #[arg(long, allow_hyphen_values = true)]
    pub z_in: Option<f64>,
    /// Output impedance knob, -100..100 %.
    #[arg(long, allow_hyphen_values = true)]
    pub z_out: Option<f64>,
    /// Output gain in dB, 0..20.
    #[arg(long)]
    pub gain: Option<f64>,
    /// Characteristic impedance k in ohms.
    #[arg(long)]
    pub k: Option<f64>,
}

impl PanelArgs {
    /// Load the preset (or defaults) and apply the command-line overrides.
    pub fn resolve(&self) -> Result<SefConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SefConfig::load(path)?,
            None => SefConfig::default(),
        };

        if let Some(hz) = self.hp {
            config.high_pass.mode = ModeConfig::Continuous;
            config.high_pass.cutoff_hz = Some(hz);
        }
        if let Some(knob) = self.hp_knob {
            config.high_pass.mode = ModeConfig::Discrete;
            config.high_pass.knob = Some(knob);
        }
        if let Some(hz) = self.lp {
            config.low_pass.mode = ModeConfig::Continuous;
            config.low_pass.cutoff_hz = Some(hz);
        }
        if let Some(knob) = self.lp_knob {
            config.low_pass.mode = ModeConfig::Discrete;
            config.low_pass.knob = Some(knob);
        }
        if self.no_hp_mod {
            config.high_pass.modulated = Some(false);
        }
        if self.no_lp_mod {
            config.low_pass.modulated = Some(false);
        }
        if let Some(pct) = self.z_in {
            config.input_impedance_pct = pct;
        }
        if let Some(pct) = self.z_out {
            config.output_impedance_pct = pct;
        }
        if let Some(db) = self.gain {
            config.output_gain_db = db;
        }
        if let Some(k) = self.k {
            config.characteristic_impedance = k;
        }

        config.validate()?;
        Ok(config)
    }
}
