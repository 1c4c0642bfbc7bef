//! Linear one-port WDF elements: Resistor, Capacitor, Inductor, IdealVoltageSource.
//!
//! Reactive elements use the trapezoidal (bilinear) discretization, which
//! gives them a memoryless port resistance and a one-sample state.

use super::WdfNode;

/// Sample rate assumed until `prepare` is called.
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

// ---------------------------------------------------------------------------
// Resistor
// ---------------------------------------------------------------------------

/// Ideal resistor. Absorbs everything, reflects nothing.
///
/// `b = 0` (matched termination when Rp == R)
#[derive(Debug, Clone, Copy)]
pub struct Resistor {
    resistance: f64,
    a: f64,
    b: f64,
}

impl Resistor {
    pub fn new(resistance: f64) -> Self {
        Self {
            resistance,
            a: 0.0,
            b: 0.0,
        }
    }

    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Returns `true` if the value changed.
    pub fn set_value(&mut self, resistance: f64) -> bool {
        if self.resistance == resistance {
            return false;
        }
        self.resistance = resistance;
        true
    }

    /// Instantaneous voltage across the port: `(a + b) / 2`.
    #[inline]
    pub fn voltage(&self) -> f64 {
        0.5 * (self.a + self.b)
    }
}

impl WdfNode for Resistor {
    #[inline]
    fn port_resistance(&self) -> f64 {
        self.resistance
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        self.b = 0.0;
        self.b
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        self.a = a;
    }

    fn reset(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Capacitor
// ---------------------------------------------------------------------------

/// Capacitor (trapezoidal).
///
/// `b[n] = z^{-1} a[n]` (previous incident becomes current reflected)
/// `Rp = 1 / (2 * fs * C)`
#[derive(Debug, Clone, Copy)]
pub struct Capacitor {
    capacitance: f64,
    sample_rate: f64,
    resistance: f64,
    state: f64, // z^{-1} of incident wave
    a: f64,
    b: f64,
}

impl Capacitor {
    pub fn new(capacitance: f64, sample_rate: f64) -> Self {
        Self {
            capacitance,
            sample_rate,
            resistance: 1.0 / (2.0 * sample_rate * capacitance),
            state: 0.0,
            a: 0.0,
            b: 0.0,
        }
    }

    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns `true` if the value changed and `Rp` was recomputed.
    pub fn set_value(&mut self, capacitance: f64) -> bool {
        if self.capacitance == capacitance {
            return false;
        }
        self.capacitance = capacitance;
        self.resistance = 1.0 / (2.0 * self.sample_rate * capacitance);
        true
    }

    #[inline]
    pub fn voltage(&self) -> f64 {
        0.5 * (self.a + self.b)
    }
}

impl WdfNode for Capacitor {
    #[inline]
    fn port_resistance(&self) -> f64 {
        self.resistance
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        self.b = self.state;
        self.b
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        self.a = a;
        self.state = a;
    }

    fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.resistance = 1.0 / (2.0 * sample_rate * self.capacitance);
    }

    fn reset(&mut self) {
        self.state = 0.0;
        self.a = 0.0;
        self.b = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Inductor
// ---------------------------------------------------------------------------

/// Inductor (trapezoidal).
///
/// `b[n] = -z^{-1} a[n]`
/// `Rp = 2 * fs * L`
#[derive(Debug, Clone, Copy)]
pub struct Inductor {
    inductance: f64,
    sample_rate: f64,
    resistance: f64,
    state: f64,
    a: f64,
    b: f64,
}

impl Inductor {
    pub fn new(inductance: f64, sample_rate: f64) -> Self {
        Self {
            inductance,
            sample_rate,
            resistance: 2.0 * sample_rate * inductance,
            state: 0.0,
            a: 0.0,
            b: 0.0,
        }
    }

    pub fn inductance(&self) -> f64 {
        self.inductance
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns `true` if the value changed and `Rp` was recomputed.
    pub fn set_value(&mut self, inductance: f64) -> bool {
        if self.inductance == inductance {
            return false;
        }
        self.inductance = inductance;
        self.resistance = 2.0 * self.sample_rate * inductance;
        true
    }

    #[inline]
    pub fn voltage(&self) -> f64 {
        0.5 * (self.a + self.b)
    }
}

impl WdfNode for Inductor {
    #[inline]
    fn port_resistance(&self) -> f64 {
        self.resistance
    }

    #[inline]
    fn reflected(&mut self) -> f64 {
        self.b = -self.state;
        self.b
    }

    #[inline]
    fn incident(&mut self, a: f64) {
        self.a = a;
        self.state = a;
    }

    fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.resistance = 2.0 * sample_rate * self.inductance;
    }

    fn reset(&mut self) {
        self.state = 0.0;
        self.a = 0.0;
        self.b = 0.0;
    }
}

// ---------------------------------------------------------------------------
// IdealVoltageSource
// ---------------------------------------------------------------------------

/// Ideal (zero-impedance) voltage source.
///
/// `b = 2 * Vs - a`.  An ideal source cannot be adapted, so it is only
/// valid as the root of a tree, where it closes the single implicit loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealVoltageSource {
    voltage: f64,
    a: f64,
    b: f64,
}

impl IdealVoltageSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_voltage(&mut self, v: f64) {
        self.voltage = v;
    }

    #[inline]
    pub fn incident(&mut self, a: f64) {
        self.a = a;
    }

    #[inline]
    pub fn reflected(&mut self) -> f64 {
        self.b = 2.0 * self.voltage - self.a;
        self.b
    }

    #[inline]
    pub fn voltage(&self) -> f64 {
        0.5 * (self.a + self.b)
    }

    pub fn reset(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
    }
}
