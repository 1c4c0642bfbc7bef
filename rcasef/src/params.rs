//! Filter parameters: a plain snapshot, a shared lock-free store, and the
//! fan-out that pushes a snapshot into every filter instance.
//!
//! The audio thread and the UI/analysis thread each hold a clone of one
//! [`ParameterStore`]; clones share the same atomics.  Each block starts by
//! taking a [`FilterParams`] snapshot and handing it to [`apply_params`],
//! so all channels see the same values for the whole block.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crate::mapping::{
    map_impedance, KnobPosition, DEFAULT_K, IMPEDANCE_PCT_MAX, IMPEDANCE_PCT_MIN,
};
use crate::network::{RcaMk2Sef, DEFAULT_HIGH_PASS_CUTOFF_HZ, DEFAULT_LOW_PASS_CUTOFF_HZ};

/// Continuous cutoff range (Hz).
pub const CUTOFF_MIN_HZ: f64 = 20.0;
pub const CUTOFF_MAX_HZ: f64 = 20_000.0;

/// Output make-up gain range (dB).
pub const OUTPUT_GAIN_MIN_DB: f64 = 0.0;
pub const OUTPUT_GAIN_MAX_DB: f64 = 20.0;
pub const DEFAULT_OUTPUT_GAIN_DB: f64 = 6.0;

/// Characteristic impedance range (Ω).
pub const CHARACTERISTIC_IMPEDANCE_MIN: f64 = 1.0;
pub const CHARACTERISTIC_IMPEDANCE_MAX: f64 = 100_000.0;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One filter section's controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionParams {
    /// Cutoff knob (`true`) or hardware switch (`false`).
    pub continuous: bool,
    pub cutoff_hz: f64,
    pub knob: KnobPosition,
    pub modulated: bool,
}

impl SectionParams {
    pub fn high_pass_default() -> Self {
        Self {
            continuous: true,
            cutoff_hz: DEFAULT_HIGH_PASS_CUTOFF_HZ,
            knob: KnobPosition::MIN,
            modulated: true,
        }
    }

    pub fn low_pass_default() -> Self {
        Self {
            continuous: true,
            cutoff_hz: DEFAULT_LOW_PASS_CUTOFF_HZ,
            knob: KnobPosition::MAX,
            modulated: true,
        }
    }
}

/// Every control of the unit, read at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub high_pass: SectionParams,
    pub low_pass: SectionParams,
    /// Percent, `-100..=100`.
    pub input_impedance_pct: f64,
    /// Percent, `-100..=100`.
    pub output_impedance_pct: f64,
    pub output_gain_db: f64,
    /// `k` for the continuous formulas (Ω).
    pub characteristic_impedance: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            high_pass: SectionParams::high_pass_default(),
            low_pass: SectionParams::low_pass_default(),
            input_impedance_pct: 0.0,
            output_impedance_pct: 0.0,
            output_gain_db: DEFAULT_OUTPUT_GAIN_DB,
            characteristic_impedance: DEFAULT_K,
        }
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Apply one snapshot to every filter in `filters`.
///
/// This is the only place parameters reach a filter, so live channels and
/// the analysis instance can never disagree about a block's settings.
pub fn apply_params<'a>(filters: impl IntoIterator<Item = &'a mut RcaMk2Sef>, params: &FilterParams) {
    let input_ohms = map_impedance(params.input_impedance_pct);
    let output_ohms = map_impedance(params.output_impedance_pct);
    let hp = params.high_pass;
    let lp = params.low_pass;

    for filter in filters {
        filter.set_characteristic_impedance(params.characteristic_impedance);
        filter.set_high_pass_mod(hp.modulated);
        if hp.continuous {
            filter.set_high_pass_cutoff(hp.cutoff_hz);
        } else {
            filter.set_high_pass_knob_pos(hp.knob);
        }

        filter.set_low_pass_mod(lp.modulated);
        if lp.continuous {
            filter.set_low_pass_cutoff(lp.cutoff_hz);
        } else {
            filter.set_low_pass_knob_pos(lp.knob);
        }

        filter.set_input_impedance(input_ohms);
        filter.set_output_impedance(output_ohms);
    }
}

// ---------------------------------------------------------------------------
// Shared store
// ---------------------------------------------------------------------------

/// Shared state for one filter section.
#[derive(Debug)]
pub struct SectionState {
    pub continuous: Arc<AtomicBool>,
    pub cutoff_hz: Arc<AtomicF32>,
    pub knob: Arc<AtomicU8>,
    pub modulated: Arc<AtomicBool>,
}

impl SectionState {
    fn new(params: &SectionParams) -> Self {
        let state = Self {
            continuous: Arc::new(AtomicBool::new(params.continuous)),
            cutoff_hz: Arc::new(AtomicF32::new(CUTOFF_MIN_HZ as f32)),
            knob: Arc::new(AtomicU8::new(params.knob.get())),
            modulated: Arc::new(AtomicBool::new(params.modulated)),
        };
        state.set_cutoff_hz(params.cutoff_hz);
        state
    }

    pub fn set_continuous(&self, continuous: bool) {
        self.continuous.store(continuous, Ordering::Relaxed);
    }

    /// Clamped to 20 Hz .. 20 kHz.
    pub fn set_cutoff_hz(&self, hz: f64) {
        let hz = hz.clamp(CUTOFF_MIN_HZ, CUTOFF_MAX_HZ);
        self.cutoff_hz.store(hz as f32, Ordering::Relaxed);
    }

    pub fn set_knob(&self, knob: KnobPosition) {
        self.knob.store(knob.get(), Ordering::Relaxed);
    }

    pub fn set_modulated(&self, modulated: bool) {
        self.modulated.store(modulated, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SectionParams {
        SectionParams {
            continuous: self.continuous.load(Ordering::Relaxed),
            cutoff_hz: f64::from(self.cutoff_hz.load(Ordering::Relaxed)),
            knob: KnobPosition::saturating(i64::from(self.knob.load(Ordering::Relaxed))),
            modulated: self.modulated.load(Ordering::Relaxed),
        }
    }
}

impl Clone for SectionState {
    fn clone(&self) -> Self {
        Self {
            continuous: Arc::clone(&self.continuous),
            cutoff_hz: Arc::clone(&self.cutoff_hz),
            knob: Arc::clone(&self.knob),
            modulated: Arc::clone(&self.modulated),
        }
    }
}

/// Lock-free parameter store shared between the audio and UI threads.
#[derive(Debug)]
pub struct ParameterStore {
    high_pass: SectionState,
    low_pass: SectionState,
    input_impedance_pct: Arc<AtomicF32>,
    output_impedance_pct: Arc<AtomicF32>,
    output_gain_db: Arc<AtomicF32>,
    characteristic_impedance: Arc<AtomicF32>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(&FilterParams::default())
    }
}

impl Clone for ParameterStore {
    fn clone(&self) -> Self {
        Self {
            high_pass: self.high_pass.clone(),
            low_pass: self.low_pass.clone(),
            input_impedance_pct: Arc::clone(&self.input_impedance_pct),
            output_impedance_pct: Arc::clone(&self.output_impedance_pct),
            output_gain_db: Arc::clone(&self.output_gain_db),
            characteristic_impedance: Arc::clone(&self.characteristic_impedance),
        }
    }
}

impl ParameterStore {
    pub fn new(initial: &FilterParams) -> Self {
        let store = Self {
            high_pass: SectionState::new(&initial.high_pass),
            low_pass: SectionState::new(&initial.low_pass),
            input_impedance_pct: Arc::new(AtomicF32::new(0.0)),
            output_impedance_pct: Arc::new(AtomicF32::new(0.0)),
            output_gain_db: Arc::new(AtomicF32::new(DEFAULT_OUTPUT_GAIN_DB as f32)),
            characteristic_impedance: Arc::new(AtomicF32::new(DEFAULT_K as f32)),
        };
        store.set_input_impedance_pct(initial.input_impedance_pct);
        store.set_output_impedance_pct(initial.output_impedance_pct);
        store.set_output_gain_db(initial.output_gain_db);
        store.set_characteristic_impedance(initial.characteristic_impedance);
        store
    }

    pub fn high_pass(&self) -> &SectionState {
        &self.high_pass
    }

    pub fn low_pass(&self) -> &SectionState {
        &self.low_pass
    }

    /// Clamped to -100 .. 100 %.
    pub fn set_input_impedance_pct(&self, pct: f64) {
        let pct = pct.clamp(IMPEDANCE_PCT_MIN, IMPEDANCE_PCT_MAX);
        self.input_impedance_pct.store(pct as f32, Ordering::Relaxed);
    }

    /// Clamped to -100 .. 100 %.
    pub fn set_output_impedance_pct(&self, pct: f64) {
        let pct = pct.clamp(IMPEDANCE_PCT_MIN, IMPEDANCE_PCT_MAX);
        self.output_impedance_pct.store(pct as f32, Ordering::Relaxed);
    }

    /// Clamped to 0 .. 20 dB.
    pub fn set_output_gain_db(&self, db: f64) {
        let db = db.clamp(OUTPUT_GAIN_MIN_DB, OUTPUT_GAIN_MAX_DB);
        self.output_gain_db.store(db as f32, Ordering::Relaxed);
    }

    /// Clamped to 1 Ω .. 100 kΩ.
    pub fn set_characteristic_impedance(&self, ohms: f64) {
        let ohms = ohms.clamp(CHARACTERISTIC_IMPEDANCE_MIN, CHARACTERISTIC_IMPEDANCE_MAX);
        self.characteristic_impedance
            .store(ohms as f32, Ordering::Relaxed);
    }

    /// Read every control once.
    pub fn snapshot(&self) -> FilterParams {
        FilterParams {
            high_pass: self.high_pass.snapshot(),
            low_pass: self.low_pass.snapshot(),
            input_impedance_pct: f64::from(self.input_impedance_pct.load(Ordering::Relaxed)),
            output_impedance_pct: f64::from(self.output_impedance_pct.load(Ordering::Relaxed)),
            output_gain_db: f64::from(self.output_gain_db.load(Ordering::Relaxed)),
            characteristic_impedance: f64::from(
                self.characteristic_impedance.load(Ordering::Relaxed),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
