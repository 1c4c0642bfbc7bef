//! Offline frequency response of the filter.
//!
//! [`ResponseAnalyzer`] owns a private [`RcaMk2Sef`], drives it with a
//! single-sample impulse and transforms the captured impulse response with
//! a pre-planned real FFT.  Analysis is destructive to integrator memory,
//! which is why the analyzer never shares its filter with the audio path.

use std::path::Path;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::mapping::{decibels_to_gain, gain_to_decibels};
use crate::network::RcaMk2Sef;
use crate::params::{apply_params, FilterParams};
use crate::{Error, Result};

pub const DEFAULT_BLOCK_LEN: usize = 16_384;
pub const MIN_BLOCK_LEN: usize = 64;

/// Lower and upper edges of the displayed curve (Hz).
pub const CURVE_MIN_HZ: f64 = 20.0;
pub const CURVE_MAX_HZ: f64 = 20_000.0;

fn default_block_len() -> usize {
    DEFAULT_BLOCK_LEN
}

fn default_impulse_amplitude() -> f64 {
    decibels_to_gain(1e-12)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Impulse response length and FFT size.  Power of two, at least 64.
    #[serde(default = "default_block_len")]
    pub block_len: usize,
    /// Height of the driving impulse.  At 1.0 bins read as linear gain.
    #[serde(default = "default_impulse_amplitude")]
    pub impulse_amplitude: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            block_len: default_block_len(),
            impulse_amplitude: default_impulse_amplitude(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_len < MIN_BLOCK_LEN || !self.block_len.is_power_of_two() {
            return Err(Error::InvalidBlockLength(self.block_len));
        }
        Ok(())
    }
}

/// The dedicated analysis instance.
pub struct ResponseAnalyzer {
    filter: RcaMk2Sef,
    config: AnalysisConfig,
    fft: Arc<dyn RealToComplex<f64>>,
    response: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    magnitudes: Vec<f64>,
    last_params: Option<FilterParams>,
}

impl ResponseAnalyzer {
    pub fn new(config: AnalysisConfig, sample_rate: f64) -> Result<Self> {
        config.validate()?;

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(config.block_len);
        let response = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        let mut filter = RcaMk2Sef::new();
        filter.prepare(sample_rate);

        tracing::debug!(block_len = config.block_len, sample_rate, "response analyzer ready");

        Ok(Self {
            filter,
            magnitudes: vec![0.0; config.block_len],
            config,
            fft,
            response,
            spectrum,
            scratch,
            last_params: None,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn block_len(&self) -> usize {
        self.config.block_len
    }

    pub fn sample_rate(&self) -> f64 {
        self.filter.sample_rate()
    }

    /// Re-prepare the private filter at a new rate.  Forces the next refresh.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.filter.prepare(sample_rate);
        self.last_params = None;
    }

    pub fn filter(&self) -> &RcaMk2Sef {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut RcaMk2Sef {
        self.last_params = None;
        &mut self.filter
    }

    /// Centre frequency of bin `k` (Hz).
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate() / self.config.block_len as f64
    }

    /// Write `|H(k)|` for every bin `k in 0..block_len` into `buffer`.
    ///
    /// Bins above Nyquist mirror the ones below it.  The filter is reset
    /// afterwards whether or not the transform succeeded.
    pub fn compute_magnitude_response(&mut self, buffer: &mut [f64]) -> Result<()> {
        let n = self.config.block_len;
        if buffer.len() != n {
            return Err(Error::AnalysisLength {
                expected: n,
                actual: buffer.len(),
            });
        }

        let amplitude = self.config.impulse_amplitude;
        for (i, slot) in self.response.iter_mut().enumerate() {
            let x = if i == 0 { amplitude } else { 0.0 };
            *slot = self.filter.process_sample(x);
        }
        let transformed =
            self.fft
                .process_with_scratch(&mut self.response, &mut self.spectrum, &mut self.scratch);
        self.filter.reset();
        transformed?;

        let half = n / 2;
        for (k, out) in buffer.iter_mut().enumerate() {
            let bin = if k <= half { k } else { n - k };
            *out = self.spectrum[bin].norm();
        }
        Ok(())
    }

    /// Apply `params` and recompute, unless they match the last refresh.
    ///
    /// Returns `None` when nothing changed since the previous call.
    pub fn refresh(&mut self, params: &FilterParams) -> Result<Option<&[f64]>> {
        if self.last_params.as_ref() == Some(params) {
            return Ok(None);
        }
        apply_params(std::iter::once(&mut self.filter), params);

        let mut magnitudes = std::mem::take(&mut self.magnitudes);
        let computed = self.compute_magnitude_response(&mut magnitudes);
        self.magnitudes = magnitudes;
        computed?;

        self.last_params = Some(*params);
        Ok(Some(self.magnitudes.as_slice()))
    }

    /// Magnitudes from the most recent refresh.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }
}

// ---------------------------------------------------------------------------
// Curve
// ---------------------------------------------------------------------------

/// Log-frequency view of a magnitude buffer, in decibels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    /// `(hz, db)` pairs from 20 Hz to 20 kHz.
    pub points: Vec<(f64, f64)>,
}

impl ResponseCurve {
    /// Resample `magnitudes` (one full FFT frame) at `points` log-spaced
    /// frequencies, scaled by a linear `gain`.
    pub fn from_magnitudes(magnitudes: &[f64], sample_rate: f64, gain: f64, points: usize) -> Self {
        let n = magnitudes.len();
        if n == 0 || points == 0 {
            return Self { points: Vec::new() };
        }
        let nyquist_bin = n / 2;
        let ratio = (CURVE_MAX_HZ / CURVE_MIN_HZ).ln();
        let last = (points.max(2) - 1) as f64;

        let points = (0..points)
            .map(|i| {
                let hz = CURVE_MIN_HZ * (ratio * i as f64 / last).exp();
                let bin = ((hz * n as f64 / sample_rate).round() as usize).min(nyquist_bin);
                (hz, gain_to_decibels(magnitudes[bin] * gain))
            })
            .collect();
        Self { points }
    }
}

/// Dump magnitudes as one comma-separated line.
pub fn write_csv(path: impl AsRef<Path>, magnitudes: &[f64]) -> Result<()> {
    let mut line = magnitudes
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    std::fs::write(path, line)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
