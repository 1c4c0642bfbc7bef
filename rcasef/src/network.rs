//! The RCA MK II Sound Effects Filter network.
//!
//! A doubly-terminated constant-k ladder: source resistance, a high-pass
//! T-section and its mod twin, a low-pass T-section and its mod twin, and
//! the load resistance the output is read across.
//!
//! ```text
//!   Vs ─ Rin ─ C_HP1 ─┬─ C_HP2 ─ C_HPM1 ─┬─ C_HPM2 ─ L_LP1 ─┬─ L_LP2 ─ L_LPM1 ─┬─ L_LPM2 ─┬─
//!                     L_HP               L_HPM              C_LP              C_LPM       Rt
//!                     ┴                  ┴                  ┴                 ┴           ┴
//! ```
//!
//! The tree is wired once in [`RcaMk2Sef::new`]; setters only change leaf
//! values.  Because the source is ideal it sits above the adapted tree and
//! the one loop it closes is resolved with a single wave exchange per
//! sample.

use crate::elements::{IdealVoltageSource, WdfNode, DEFAULT_SAMPLE_RATE};
use crate::mapping::{
    high_pass_components, high_pass_mod_components, high_pass_position, low_pass_components,
    low_pass_mod_components, low_pass_position, ComponentValues, KnobPosition, DEFAULT_K,
    IMPEDANCE_CENTRE_OHMS,
};
use crate::tree::{Component, Node};

pub const DEFAULT_HIGH_PASS_CUTOFF_HZ: f64 = 20.0;
pub const DEFAULT_LOW_PASS_CUTOFF_HZ: f64 = 20_000.0;

/// How a section's primary pair was last chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionMode {
    /// From the cutoff formulas, at this frequency (Hz).
    Continuous(f64),
    /// From the hardware switch table.
    Discrete(KnobPosition),
}

#[derive(Debug, Clone, Copy)]
struct Section {
    mode: SectionMode,
    /// Last continuous cutoff, kept across knob changes for display.
    cutoff_hz: f64,
    modulated: bool,
    primary: ComponentValues,
}

impl Section {
    fn continuous(cutoff_hz: f64, primary: ComponentValues) -> Self {
        Self {
            mode: SectionMode::Continuous(cutoff_hz),
            cutoff_hz,
            modulated: true,
            primary,
        }
    }
}

/// One channel of the filter.
#[derive(Debug, Clone)]
pub struct RcaMk2Sef {
    source: IdealVoltageSource,
    root: Node,
    sample_rate: f64,
    k: f64,
    high_pass: Section,
    low_pass: Section,
    input_impedance: f64,
    output_impedance: f64,
    prepared: bool,
}

impl Default for RcaMk2Sef {
    fn default() -> Self {
        Self::new()
    }
}

impl RcaMk2Sef {
    /// Build the network with HP at 20 Hz, LP at 20 kHz, both mods on and
    /// 560 Ω terminations.  [`prepare`](Self::prepare) must still be called.
    pub fn new() -> Self {
        let k = DEFAULT_K;
        let hp = high_pass_components(DEFAULT_HIGH_PASS_CUTOFF_HZ, k);
        let lp = low_pass_components(DEFAULT_LOW_PASS_CUTOFF_HZ, k);
        let fs = DEFAULT_SAMPLE_RATE;
        let z = IMPEDANCE_CENTRE_OHMS;

        let lp_mod = Node::series(
            Node::inductor(Component::LowPassModL1, lp.inductance, fs),
            Node::parallel(
                Node::capacitor(Component::LowPassModC, lp.capacitance, fs),
                Node::series(
                    Node::inductor(Component::LowPassModL2, lp.inductance, fs),
                    Node::resistor(Component::OutputResistor, z),
                ),
            ),
        );
        let lp_primary = Node::series(
            Node::inductor(Component::LowPassL1, lp.inductance, fs),
            Node::parallel(
                Node::capacitor(Component::LowPassC, lp.capacitance, fs),
                Node::series(Node::inductor(Component::LowPassL2, lp.inductance, fs), lp_mod),
            ),
        );
        let hp_mod = Node::series(
            Node::capacitor(Component::HighPassModC1, hp.capacitance, fs),
            Node::parallel(
                Node::inductor(Component::HighPassModL, hp.inductance, fs),
                Node::series(
                    Node::capacitor(Component::HighPassModC2, hp.capacitance, fs),
                    lp_primary,
                ),
            ),
        );
        let hp_primary = Node::series(
            Node::capacitor(Component::HighPassC1, hp.capacitance, fs),
            Node::parallel(
                Node::inductor(Component::HighPassL, hp.inductance, fs),
                Node::series(Node::capacitor(Component::HighPassC2, hp.capacitance, fs), hp_mod),
            ),
        );
        let root = Node::series(Node::resistor(Component::InputResistor, z), hp_primary);
        debug_assert_eq!(root.rightmost().component, Component::OutputResistor);

        Self {
            source: IdealVoltageSource::new(),
            root,
            sample_rate: fs,
            k,
            high_pass: Section::continuous(DEFAULT_HIGH_PASS_CUTOFF_HZ, hp),
            low_pass: Section::continuous(DEFAULT_LOW_PASS_CUTOFF_HZ, lp),
            input_impedance: z,
            output_impedance: z,
            prepared: false,
        }
    }

    // -- lifecycle ----------------------------------------------------------

    /// Propagate the sample rate to every reactive element and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.root.prepare(sample_rate);
        self.reset();
        self.prepared = true;
        tracing::debug!(
            sample_rate,
            port_resistance = self.root.port_resistance(),
            "filter prepared"
        );
    }

    /// Zero integrator memory.  Component values are kept.
    pub fn reset(&mut self) {
        self.source.reset();
        self.root.reset();
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Run one sample through the network and return the load voltage.
    ///
    /// The load sits below an odd number of series junctions, so the
    /// result is polarity-inverted with respect to `x`.
    #[inline]
    pub fn process_sample(&mut self, x: f64) -> f64 {
        debug_assert!(self.prepared, "process_sample called before prepare");
        self.source.set_voltage(x);
        self.source.incident(self.root.reflected());
        self.root.incident(self.source.reflected());
        self.root.rightmost().element.voltage()
    }

    // -- high-pass ----------------------------------------------------------

    pub fn set_high_pass_cutoff(&mut self, cutoff_hz: f64) {
        debug_assert!(cutoff_hz > 0.0, "cutoff must be positive, got {cutoff_hz}");
        self.high_pass.mode = SectionMode::Continuous(cutoff_hz);
        self.high_pass.cutoff_hz = cutoff_hz;
        self.high_pass.primary = high_pass_components(cutoff_hz, self.k);
        self.apply_high_pass();
    }

    pub fn set_high_pass_knob_pos(&mut self, position: KnobPosition) {
        self.high_pass.mode = SectionMode::Discrete(position);
        self.high_pass.primary = high_pass_position(position).values;
        self.apply_high_pass();
    }

    pub fn set_high_pass_mod(&mut self, enabled: bool) {
        self.high_pass.modulated = enabled;
        self.apply_high_pass();
    }

    /// Last continuous cutoff, even while the section is switched.
    pub fn high_pass_cutoff(&self) -> f64 {
        self.high_pass.cutoff_hz
    }

    pub fn high_pass_mode(&self) -> SectionMode {
        self.high_pass.mode
    }

    pub fn high_pass_mod(&self) -> bool {
        self.high_pass.modulated
    }

    // -- low-pass -----------------------------------------------------------

    pub fn set_low_pass_cutoff(&mut self, cutoff_hz: f64) {
        debug_assert!(cutoff_hz > 0.0, "cutoff must be positive, got {cutoff_hz}");
        self.low_pass.mode = SectionMode::Continuous(cutoff_hz);
        self.low_pass.cutoff_hz = cutoff_hz;
        self.low_pass.primary = low_pass_components(cutoff_hz, self.k);
        self.apply_low_pass();
    }

    pub fn set_low_pass_knob_pos(&mut self, position: KnobPosition) {
        self.low_pass.mode = SectionMode::Discrete(position);
        self.low_pass.primary = low_pass_position(position).values;
        self.apply_low_pass();
    }

    pub fn set_low_pass_mod(&mut self, enabled: bool) {
        self.low_pass.modulated = enabled;
        self.apply_low_pass();
    }

    pub fn low_pass_cutoff(&self) -> f64 {
        self.low_pass.cutoff_hz
    }

    pub fn low_pass_mode(&self) -> SectionMode {
        self.low_pass.mode
    }

    pub fn low_pass_mod(&self) -> bool {
        self.low_pass.modulated
    }

    // -- terminations -------------------------------------------------------

    /// Source resistance in ohms.
    pub fn set_input_impedance(&mut self, ohms: f64) {
        debug_assert!(ohms > 0.0, "input impedance must be positive, got {ohms}");
        self.input_impedance = ohms;
        self.root.set_component(Component::InputResistor, ohms);
    }

    /// Load resistance in ohms.
    pub fn set_output_impedance(&mut self, ohms: f64) {
        debug_assert!(ohms > 0.0, "output impedance must be positive, got {ohms}");
        self.output_impedance = ohms;
        self.root.set_component(Component::OutputResistor, ohms);
    }

    pub fn input_impedance(&self) -> f64 {
        self.input_impedance
    }

    pub fn output_impedance(&self) -> f64 {
        self.output_impedance
    }

    /// Change `k`.  Continuous sections and disabled mod pairs depend on it
    /// and are re-derived; switched primaries are not.
    pub fn set_characteristic_impedance(&mut self, k: f64) {
        debug_assert!(k > 0.0, "characteristic impedance must be positive, got {k}");
        if k == self.k {
            return;
        }
        self.k = k;
        if let SectionMode::Continuous(hz) = self.high_pass.mode {
            self.high_pass.primary = high_pass_components(hz, k);
        }
        if let SectionMode::Continuous(hz) = self.low_pass.mode {
            self.low_pass.primary = low_pass_components(hz, k);
        }
        self.apply_high_pass();
        self.apply_low_pass();
    }

    pub fn characteristic_impedance(&self) -> f64 {
        self.k
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // -- inspection ---------------------------------------------------------

    /// Current value of one component (Ω, F or H).
    pub fn component_value(&self, component: Component) -> f64 {
        self.root
            .element(component)
            .map(|e| e.value())
            .unwrap_or_default()
    }

    pub fn port_resistance_of(&self, component: Component) -> f64 {
        self.root
            .element(component)
            .map(|e| e.port_resistance())
            .unwrap_or_default()
    }

    /// Port resistance the source sees.
    pub fn port_resistance(&self) -> f64 {
        self.root.port_resistance()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    // -- internals ----------------------------------------------------------

    fn apply_high_pass(&mut self) {
        let primary = self.high_pass.primary;
        let pinned = high_pass_mod_components(primary, self.high_pass.modulated, self.k);
        let root = &mut self.root;
        root.set_component(Component::HighPassC1, primary.capacitance);
        root.set_component(Component::HighPassL, primary.inductance);
        root.set_component(Component::HighPassC2, primary.capacitance);
        root.set_component(Component::HighPassModC1, pinned.capacitance);
        root.set_component(Component::HighPassModL, pinned.inductance);
        root.set_component(Component::HighPassModC2, pinned.capacitance);
    }

    fn apply_low_pass(&mut self) {
        let primary = self.low_pass.primary;
        let pinned = low_pass_mod_components(primary, self.low_pass.modulated, self.k);
        let root = &mut self.root;
        root.set_component(Component::LowPassL1, primary.inductance);
        root.set_component(Component::LowPassC, primary.capacitance);
        root.set_component(Component::LowPassL2, primary.inductance);
        root.set_component(Component::LowPassModL1, pinned.inductance);
        root.set_component(Component::LowPassModC, pinned.capacitance);
        root.set_component(Component::LowPassModL2, pinned.inductance);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{gain_to_decibels, map_impedance, HIGH_PASS_TABLE, LOW_PASS_TABLE};
    use std::f64::consts::PI;

    const FS: f64 = 48_000.0;

    fn prepared() -> RcaMk2Sef {
        let mut f = RcaMk2Sef::new();
        f.prepare(FS);
        f
    }

    fn snapshot(f: &RcaMk2Sef) -> Vec<u64> {
        Component::ALL
            .iter()
            .map(|&c| f.component_value(c).to_bits())
            .collect()
    }

    /// Steady-state gain at `freq`: 0.2 s of sine, RMS over the second half.
    fn sine_gain_db(f: &mut RcaMk2Sef, freq: f64) -> f64 {
        f.reset();
        let n = (0.2 * FS) as usize;
        let (mut in_sq, mut out_sq) = (0.0, 0.0);
        for i in 0..n {
            let x = 0.5 * (2.0 * PI * freq * i as f64 / FS).sin();
            let y = f.process_sample(x);
            if i >= n / 2 {
                in_sq += x * x;
                out_sq += y * y;
            }
        }
        10.0 * (out_sq / in_sq).log10()
    }

    #[test]
    fn topology_counts() {
        let f = RcaMk2Sef::new();
        assert_eq!(f.root().leaf_count(), 14);
        assert_eq!(f.root().node_count(), 27);
        for c in Component::ALL {
            assert!(f.root().element(c).is_some(), "{} missing", c.designator());
        }
    }

    #[test]
    fn output_is_read_from_the_load() {
        let mut f = prepared();
        f.set_output_impedance(300.0);
        assert_eq!(f.root().rightmost().component, Component::OutputResistor);
        for i in 0..256 {
            let x = (i as f64 * 0.05).sin();
            let y = f.process_sample(x);
            assert_eq!(Some(y), f.root().voltage_across(Component::OutputResistor));
        }
    }

    #[test]
    fn new_applies_default_cutoffs() {
        let f = RcaMk2Sef::new();
        let hp = high_pass_components(20.0, DEFAULT_K);
        let lp = low_pass_components(20_000.0, DEFAULT_K);
        assert_eq!(f.component_value(Component::HighPassC1), hp.capacitance);
        assert_eq!(f.component_value(Component::HighPassModL), hp.inductance);
        assert_eq!(f.component_value(Component::LowPassC), lp.capacitance);
        assert_eq!(f.component_value(Component::LowPassModL2), lp.inductance);
        assert_eq!(f.component_value(Component::InputResistor), 560.0);
        assert_eq!(f.high_pass_cutoff(), 20.0);
        assert_eq!(f.low_pass_cutoff(), 20_000.0);
        assert!(f.high_pass_mod() && f.low_pass_mod());
        assert!(!f.is_prepared());
    }

    #[test]
    fn prepare_rescales_reactive_ports() {
        let mut f = RcaMk2Sef::new();
        f.prepare(96_000.0);
        let c = f.component_value(Component::HighPassC1);
        let expected = 1.0 / (2.0 * 96_000.0 * c);
        assert!((f.port_resistance_of(Component::HighPassC1) - expected).abs() < 1e-9);
        assert_eq!(f.sample_rate(), 96_000.0);
        assert!(f.is_prepared());
    }

    #[test]
    fn silence_in_silence_out() {
        let mut f = prepared();
        f.set_high_pass_cutoff(1000.0);
        for _ in 0..1000 {
            assert_eq!(f.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn reset_clears_memory() {
        let mut f = prepared();
        f.set_low_pass_cutoff(500.0);
        for i in 0..512 {
            f.process_sample(if i % 7 == 0 { 1.0 } else { -0.3 });
        }
        f.reset();
        for _ in 0..64 {
            assert_eq!(f.process_sample(0.0), 0.0);
        }
        assert_eq!(f.low_pass_cutoff(), 500.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before prepare")]
    fn process_before_prepare_fails_fast() {
        let mut f = RcaMk2Sef::new();
        f.process_sample(1.0);
    }

    #[test]
    fn mod_toggle_round_trip_is_bit_identical() {
        for mode in 0..2 {
            let mut f = prepared();
            if mode == 0 {
                f.set_high_pass_cutoff(1234.5);
                f.set_low_pass_cutoff(3456.7);
            } else {
                f.set_high_pass_knob_pos(KnobPosition::new(4).unwrap());
                f.set_low_pass_knob_pos(KnobPosition::new(9).unwrap());
            }
            let before = snapshot(&f);

            f.set_high_pass_mod(false);
            f.set_low_pass_mod(false);
            assert_ne!(snapshot(&f), before);
            f.set_high_pass_mod(true);
            f.set_low_pass_mod(true);
            assert_eq!(snapshot(&f), before);
        }
    }

    #[test]
    fn mod_disabled_pins_bypass_values() {
        let mut f = prepared();
        f.set_high_pass_cutoff(1000.0);
        f.set_high_pass_mod(false);
        assert!(f.component_value(Component::HighPassModC1) > 1e5);
        assert!(f.component_value(Component::HighPassModL) > 1e9);
        // Primary pair untouched.
        let hp = high_pass_components(1000.0, DEFAULT_K);
        assert_eq!(f.component_value(Component::HighPassC2), hp.capacitance);

        f.set_low_pass_mod(false);
        assert!(f.component_value(Component::LowPassModC) < 1e-9);
        assert!(f.component_value(Component::LowPassModL1) < 1e-4);
    }

    #[test]
    fn knob_positions_are_deterministic() {
        let mut f = prepared();
        for p in KnobPosition::all() {
            f.set_high_pass_knob_pos(p);
            f.set_low_pass_knob_pos(p);
            let first = snapshot(&f);
            f.set_high_pass_knob_pos(p);
            f.set_low_pass_knob_pos(p);
            assert_eq!(snapshot(&f), first, "position {p}");

            let hp = HIGH_PASS_TABLE[p.index()].values;
            let lp = LOW_PASS_TABLE[p.index()].values;
            assert_eq!(f.component_value(Component::HighPassC1), hp.capacitance);
            assert_eq!(f.component_value(Component::HighPassL), hp.inductance);
            assert_eq!(f.component_value(Component::LowPassC), lp.capacitance);
            assert_eq!(f.component_value(Component::LowPassL2), lp.inductance);
            assert_eq!(f.high_pass_mode(), SectionMode::Discrete(p));
        }
    }

    #[test]
    fn knob_keeps_last_continuous_cutoff() {
        let mut f = prepared();
        f.set_high_pass_cutoff(800.0);
        f.set_high_pass_knob_pos(KnobPosition::new(6).unwrap());
        assert_eq!(f.high_pass_cutoff(), 800.0);
        assert_eq!(f.low_pass_mode(), SectionMode::Continuous(20_000.0));
    }

    #[test]
    fn setter_path_does_not_matter() {
        let mut direct = prepared();
        direct.set_high_pass_cutoff(2000.0);

        let mut detour = prepared();
        detour.set_high_pass_cutoff(300.0);
        detour.set_high_pass_knob_pos(KnobPosition::new(3).unwrap());
        detour.set_high_pass_mod(false);
        detour.set_high_pass_mod(true);
        detour.set_high_pass_cutoff(2000.0);

        assert_eq!(direct.port_resistance().to_bits(), detour.port_resistance().to_bits());
        for i in 0..256 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            assert_eq!(direct.process_sample(x), detour.process_sample(x));
        }
    }

    #[test]
    fn characteristic_impedance_rederives_continuous_sections() {
        let mut f = prepared();
        f.set_high_pass_cutoff(1000.0);
        f.set_low_pass_knob_pos(KnobPosition::new(5).unwrap());
        f.set_characteristic_impedance(600.0);
        assert_eq!(f.characteristic_impedance(), 600.0);
        let hp = high_pass_components(1000.0, 600.0);
        assert_eq!(f.component_value(Component::HighPassC1), hp.capacitance);
        assert_eq!(f.component_value(Component::HighPassModL), hp.inductance);
        // Switched sections keep their table values.
        assert_eq!(
            f.component_value(Component::LowPassC),
            LOW_PASS_TABLE[4].values.capacitance
        );
    }

    #[test]
    fn transparent_network_is_a_resistive_divider() {
        let mut f = prepared();
        f.set_high_pass_knob_pos(KnobPosition::MIN);
        f.set_low_pass_knob_pos(KnobPosition::MAX);
        f.set_high_pass_mod(false);
        f.set_low_pass_mod(false);

        let g = sine_gain_db(&mut f, 1000.0);
        assert!((g - gain_to_decibels(0.5)).abs() < 0.1, "got {g}");

        f.set_input_impedance(map_impedance(-100.0));
        let g = sine_gain_db(&mut f, 1000.0);
        assert!(g.abs() < 0.1, "got {g}");
        assert_eq!(f.input_impedance(), map_impedance(-100.0));
    }

    #[test]
    fn high_pass_attenuates_below_cutoff() {
        let mut f = prepared();
        f.set_high_pass_cutoff(1000.0);
        let gains: Vec<f64> = [250.0, 500.0, 1000.0, 2000.0]
            .iter()
            .map(|&hz| sine_gain_db(&mut f, hz))
            .collect();
        for pair in gains.windows(2) {
            assert!(pair[0] < pair[1], "{gains:?}");
        }
        assert!(gains[0] < -60.0, "{gains:?}");
        assert!(gains[3] > -9.0, "{gains:?}");
    }

    #[test]
    fn low_pass_attenuates_above_cutoff() {
        let mut f = prepared();
        f.set_low_pass_cutoff(2000.0);
        let gains: Vec<f64> = [1000.0, 2000.0, 4000.0, 8000.0]
            .iter()
            .map(|&hz| sine_gain_db(&mut f, hz))
            .collect();
        for pair in gains.windows(2) {
            assert!(pair[0] > pair[1], "{gains:?}");
        }
        assert!(gains[0] > -7.5, "{gains:?}");
        assert!(gains[3] < -60.0, "{gains:?}");
    }

    #[test]
    fn disabling_mod_softens_the_slope() {
        let mut f = prepared();
        f.set_high_pass_cutoff(1000.0);
        let doubled = sine_gain_db(&mut f, 500.0);
        f.set_high_pass_mod(false);
        let single = sine_gain_db(&mut f, 500.0);
        assert!(single > doubled + 15.0, "single {single}, doubled {doubled}");
    }
}
