//! Hardware switch positions, mod sections and impedance knobs.


use audio_analysis::*;
use rcasef::mapping::{HIGH_PASS_TABLE, LOW_PASS_TABLE};
use rcasef::{map_impedance, Component, FilterParams, KnobPosition, SectionMode};

fn switched(hp: u8, lp: u8) -> FilterParams {
    let mut p = FilterParams::default();
    p.high_pass.continuous = false;
    p.high_pass.knob = KnobPosition::new(hp).unwrap();
    p.low_pass.continuous = false;
    p.low_pass.knob = KnobPosition::new(lp).unwrap();
    p
}

#[test]
fn off_positions_leave_a_flat_divider() {
    let (_, mags) = magnitude_response(&switched(1, 11));
    for hz in [50.0, 200.0, 1000.0, 5000.0, 10_000.0] {
        let g = response_db_at(&mags, hz);
        assert!(
            (g - TERMINATION_LOSS_DB).abs() < 0.1,
            "{hz} Hz: {g:.3} dB"
        );
    }
}

#[test]
fn high_pass_switch_raises_the_corner() {
    // 200 Hz sinks further into the stopband at every step.
    let mut gains = Vec::new();
    for p in 2..=11 {
        let mut filter = filter_with(&switched(p, 11));
        gains.push(tone_gain_db(&mut filter, 200.0));
    }
    assert_decreasing(&gains, "high-pass switch at 200 Hz");
    assert!(gains[0] > -12.0, "{gains:?}");
}

#[test]
fn low_pass_switch_raises_the_corner() {
    // 2 kHz comes out of the stopband as the switch is turned up.
    let mut gains = Vec::new();
    for p in 1..=8 {
        let mut filter = filter_with(&switched(1, p));
        gains.push(tone_gain_db(&mut filter, 2000.0));
    }
    assert_increasing(&gains, "low-pass switch at 2 kHz");
}

#[test]
fn switch_positions_are_deterministic() {
    for p in KnobPosition::all() {
        let a = filter_with(&switched(p.get(), p.get()));
        let b = filter_with(&switched(p.get(), p.get()));
        for c in Component::ALL {
            assert_eq!(
                a.component_value(c).to_bits(),
                b.component_value(c).to_bits(),
                "{} at position {p}",
                c.designator()
            );
        }
        assert_eq!(
            a.component_value(Component::HighPassC1),
            HIGH_PASS_TABLE[p.index()].values.capacitance
        );
        assert_eq!(
            a.component_value(Component::LowPassL1),
            LOW_PASS_TABLE[p.index()].values.inductance
        );
        assert_eq!(a.high_pass_mode(), SectionMode::Discrete(p));
    }
}

#[test]
fn switch_display_keeps_continuous_cutoff() {
    let mut p = FilterParams::default();
    p.high_pass.cutoff_hz = 640.0;
    let mut filter = filter_with(&p);
    p.high_pass.continuous = false;
    p.high_pass.knob = KnobPosition::new(3).unwrap();
    rcasef::apply_params(std::iter::once(&mut filter), &p);
    assert_eq!(filter.high_pass_cutoff(), 640.0);
    assert_eq!(
        filter.high_pass_mode(),
        SectionMode::Discrete(KnobPosition::new(3).unwrap())
    );
}

#[test]
fn mod_section_doubles_the_slope() {
    let mut p = FilterParams::default();
    p.low_pass.cutoff_hz = 1000.0;
    let mut doubled = filter_with(&p);
    p.low_pass.modulated = false;
    let mut single = filter_with(&p);

    let d = tone_gain_db(&mut doubled, 2000.0);
    let s = tone_gain_db(&mut single, 2000.0);
    assert!(s > d + 10.0, "single {s:.1} dB, doubled {d:.1} dB");
}

#[test]
fn mod_round_trip_restores_component_values() {
    let mut p = FilterParams::default();
    p.high_pass.cutoff_hz = 321.0;
    p.low_pass.cutoff_hz = 4321.0;
    let mut filter = filter_with(&p);
    let before: Vec<u64> = Component::ALL
        .iter()
        .map(|&c| filter.component_value(c).to_bits())
        .collect();

    p.high_pass.modulated = false;
    p.low_pass.modulated = false;
    rcasef::apply_params(std::iter::once(&mut filter), &p);
    p.high_pass.modulated = true;
    p.low_pass.modulated = true;
    rcasef::apply_params(std::iter::once(&mut filter), &p);

    let after: Vec<u64> = Component::ALL
        .iter()
        .map(|&c| filter.component_value(c).to_bits())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn impedance_knobs_reach_the_terminations() {
    let mut p = switched(1, 11);
    p.input_impedance_pct = -100.0;
    p.output_impedance_pct = 100.0;
    let mut filter = filter_with(&p);
    assert_eq!(filter.component_value(Component::InputResistor), map_impedance(-100.0));
    assert_eq!(filter.component_value(Component::OutputResistor), 5000.0);

    // Near-zero source resistance: the load sees the whole input.
    let g = tone_gain_db(&mut filter, 1000.0);
    assert!(g.abs() < 0.1, "{g:.3} dB");
}

#[test]
fn extreme_settings_stay_finite() {
    for (hp, lp) in [(11, 1), (1, 1), (11, 11), (6, 6)] {
        let mut filter = filter_with(&switched(hp, lp));
        let out = process(&mut filter, &noise(8192, 99));
        assert_healthy(&out, &format!("hp {hp} / lp {lp}"), 2.0);
    }
}
