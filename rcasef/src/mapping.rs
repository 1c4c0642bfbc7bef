//! Parameter → component mapping.
//!
//! Two ways to arrive at a section's `(C, L)` pair:
//!
//! - **Continuous**: a target cutoff `fc` is turned into component values
//!   through the constant-k section formulas with characteristic impedance
//!   `k` (560 Ω on the original unit).
//! - **Discrete**: one of eleven rotary switch positions selects a
//!   measured pair from the hardware tables.  These are measurements, not
//!   formula output, and they intentionally disagree with the formulas at
//!   the table ends.
//!
//! Each section also has a "mod" pair that either mirrors the primary
//! pair (doubling the section) or is pinned to a near-transparent extreme.

use std::f64::consts::{PI, SQRT_2};
use std::fmt;

use crate::Error;

/// Characteristic impedance of the original unit (Ω).
pub const DEFAULT_K: f64 = 560.0;

/// Angular cutoff that makes a high-pass section transparent.
pub const HIGH_PASS_BYPASS_WC: f64 = 1e-8;

/// Angular cutoff that makes a low-pass section transparent.
pub const LOW_PASS_BYPASS_WC: f64 = 1e8;

/// Number of rotary switch positions per section.
pub const KNOB_POSITIONS: u8 = 11;

/// Impedance knob range, in percent.
pub const IMPEDANCE_PCT_MIN: f64 = -100.0;
pub const IMPEDANCE_PCT_MAX: f64 = 100.0;

/// Impedance at the knob's minimum / centre / maximum (Ω).
pub const IMPEDANCE_MIN_OHMS: f64 = 0.001;
pub const IMPEDANCE_CENTRE_OHMS: f64 = 560.0;
pub const IMPEDANCE_MAX_OHMS: f64 = 5000.0;

/// Floor used when converting gains to decibels.
pub const MINUS_INFINITY_DB: f64 = -100.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A section's reactive pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentValues {
    /// Farads.
    pub capacitance: f64,
    /// Henries.
    pub inductance: f64,
}

impl ComponentValues {
    pub const fn new(capacitance: f64, inductance: f64) -> Self {
        Self {
            capacitance,
            inductance,
        }
    }
}

/// Rotary switch position, `1..=11`.
///
/// Construction is the only place a position is validated; every setter
/// that takes a `KnobPosition` can index the tables unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KnobPosition(u8);

impl KnobPosition {
    pub const MIN: KnobPosition = KnobPosition(1);
    pub const MAX: KnobPosition = KnobPosition(KNOB_POSITIONS);

    pub fn new(position: u8) -> Result<Self, Error> {
        if (1..=KNOB_POSITIONS).contains(&position) {
            Ok(Self(position))
        } else {
            Err(Error::InvalidKnobPosition(position))
        }
    }

    /// Clamp an arbitrary integer onto the switch.
    pub fn saturating(position: i64) -> Self {
        Self(position.clamp(1, i64::from(KNOB_POSITIONS)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based table index.
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All positions, in switch order.
    pub fn all() -> impl Iterator<Item = KnobPosition> {
        (1..=KNOB_POSITIONS).map(KnobPosition)
    }
}

impl TryFrom<u8> for KnobPosition {
    type Error = Error;

    fn try_from(position: u8) -> Result<Self, Error> {
        Self::new(position)
    }
}

impl fmt::Display for KnobPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One switch position: the hardware's nominal cutoff label and the
/// measured component pair behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchPosition {
    /// `None` on the position that takes the section out of circuit.
    pub cutoff_hz: Option<f64>,
    pub values: ComponentValues,
}

const fn pos(cutoff_hz: Option<f64>, capacitance: f64, inductance: f64) -> SwitchPosition {
    SwitchPosition {
        cutoff_hz,
        values: ComponentValues::new(capacitance, inductance),
    }
}

// ---------------------------------------------------------------------------
// Hardware tables
// ---------------------------------------------------------------------------

/// High-pass switch.  Position 1 is "off": both parts are ~1e5, which
/// shorts the series capacitors and opens the shunt inductor.
pub const HIGH_PASS_TABLE: [SwitchPosition; 11] = [
    pos(None, 99999.0, 99999.0),
    pos(Some(175.0), 1.6e-6, 255.6e-3),
    pos(Some(248.0), 1.15e-6, 176.9e-3),
    pos(Some(352.0), 0.8e-6, 126.4e-3),
    pos(Some(497.0), 0.57e-6, 90.11e-3),
    pos(Some(699.0), 0.4e-6, 63.9e-3),
    pos(Some(1002.0), 0.272e-6, 44.56e-3),
    pos(Some(1411.0), 0.2e-6, 31.79e-3),
    pos(Some(2024.0), 0.15e-6, 21.77e-3),
    pos(Some(2847.0), 0.1e-6, 15.63e-3),
    pos(Some(3994.0), 0.069e-6, 11.18e-3),
];

/// Low-pass switch.  Position 11 is "off": both parts are ~1e-10, which
/// opens the shunt capacitor and shorts the series inductors.
pub const LOW_PASS_TABLE: [SwitchPosition; 11] = [
    pos(Some(175.0), 3.22e-6, 511.1e-3),
    pos(Some(245.0), 2.3e-6, 365.2e-3),
    pos(Some(350.0), 1.6e-6, 255.6e-3),
    pos(Some(499.0), 1.15e-6, 178.6e-3),
    pos(Some(703.0), 0.8e-6, 126.4e-3),
    pos(Some(996.0), 0.57e-6, 90.02e-3),
    pos(Some(1408.0), 0.4e-6, 63.54e-3),
    pos(Some(1989.0), 0.272e-6, 45.08e-3),
    pos(Some(2803.0), 0.2e-6, 32.13e-3),
    pos(Some(3992.0), 0.15e-6, 22.38e-3),
    pos(None, 1e-10, 1e-10),
];

#[inline]
pub fn high_pass_position(position: KnobPosition) -> &'static SwitchPosition {
    &HIGH_PASS_TABLE[position.index()]
}

#[inline]
pub fn low_pass_position(position: KnobPosition) -> &'static SwitchPosition {
    &LOW_PASS_TABLE[position.index()]
}

// ---------------------------------------------------------------------------
// Continuous formulas
// ---------------------------------------------------------------------------

/// High-pass T-section (series C, shunt L, series C) for angular cutoff `wc`.
#[inline]
pub fn high_pass_components_wc(wc: f64, k: f64) -> ComponentValues {
    ComponentValues {
        capacitance: SQRT_2 / (k * wc),
        inductance: k / (2.0 * SQRT_2 * wc),
    }
}

/// Low-pass T-section (series L, shunt C, series L) for angular cutoff `wc`.
#[inline]
pub fn low_pass_components_wc(wc: f64, k: f64) -> ComponentValues {
    ComponentValues {
        capacitance: (2.0 * SQRT_2) / (k * wc),
        inductance: (SQRT_2 * k) / wc,
    }
}

/// `C = √2 / (k·wc)`, `L = k / (2√2·wc)` with `wc = 2π·fc`.
pub fn high_pass_components(cutoff_hz: f64, k: f64) -> ComponentValues {
    high_pass_components_wc(2.0 * PI * cutoff_hz, k)
}

/// `C = 2√2 / (k·wc)`, `L = √2·k / wc` with `wc = 2π·fc`.
///
/// `fc` is the analog corner and is not prewarped. The discretised corner
/// lands at `(fs/π)·atan(π·fc/fs)`, so at 48 kHz a 20 kHz setting sits near
/// 14 kHz and 15 kHz is already down by about 37 dB.
pub fn low_pass_components(cutoff_hz: f64, k: f64) -> ComponentValues {
    low_pass_components_wc(2.0 * PI * cutoff_hz, k)
}

/// Mod pair for the high-pass section: a copy of `primary` when enabled,
/// otherwise the transparent extreme.
pub fn high_pass_mod_components(primary: ComponentValues, enabled: bool, k: f64) -> ComponentValues {
    if enabled {
        primary
    } else {
        high_pass_components_wc(HIGH_PASS_BYPASS_WC, k)
    }
}

/// Mod pair for the low-pass section: a copy of `primary` when enabled,
/// otherwise the transparent extreme.
pub fn low_pass_mod_components(primary: ComponentValues, enabled: bool, k: f64) -> ComponentValues {
    if enabled {
        primary
    } else {
        low_pass_components_wc(LOW_PASS_BYPASS_WC, k)
    }
}

// ---------------------------------------------------------------------------
// Impedance and gain
// ---------------------------------------------------------------------------

/// Map the impedance knob (percent) to ohms.
///
/// `0 → 560`, `[-100, 0] → [0.001, 560]` and `[0, 100] → [560, 5000]`,
/// both linear.  The input must lie in `[-100, 100]`; release builds clamp.
pub fn map_impedance(percent: f64) -> f64 {
    debug_assert!(
        (IMPEDANCE_PCT_MIN..=IMPEDANCE_PCT_MAX).contains(&percent),
        "impedance {percent}% outside [-100, 100]"
    );
    let percent = percent.clamp(IMPEDANCE_PCT_MIN, IMPEDANCE_PCT_MAX);

    if percent == 0.0 {
        IMPEDANCE_CENTRE_OHMS
    } else if percent < 0.0 {
        lerp(percent, IMPEDANCE_PCT_MIN, 0.0, IMPEDANCE_MIN_OHMS, IMPEDANCE_CENTRE_OHMS)
    } else {
        lerp(percent, 0.0, IMPEDANCE_PCT_MAX, IMPEDANCE_CENTRE_OHMS, IMPEDANCE_MAX_OHMS)
    }
}

#[inline]
fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// `10^(db/20)`; anything at or below the floor is silence.
pub fn decibels_to_gain(db: f64) -> f64 {
    if db > MINUS_INFINITY_DB {
        10f64.powf(db * 0.05)
    } else {
        0.0
    }
}

/// `20·log10(gain)`, floored at [`MINUS_INFINITY_DB`].
pub fn gain_to_decibels(gain: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    } else {
        MINUS_INFINITY_DB
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
