//! Block processing, the shared parameter store and offline rendering.


use audio_analysis::*;
use rcasef::wav::{read_wav, render_file, sine_wave, write_wav};
use rcasef::{
    Component, KnobPosition, ParameterStore, ResponseAnalyzer, SefConfig, SefProcessor,
};

fn to_f32(buf: &[f64]) -> Vec<f32> {
    buf.iter().map(|&s| s as f32).collect()
}

fn to_f64(buf: &[f32]) -> Vec<f64> {
    buf.iter().map(|&s| f64::from(s)).collect()
}

#[test]
fn ui_thread_settings_reach_the_audio_thread() {
    let ui = ParameterStore::default();
    let audio = ui.clone();

    std::thread::spawn(move || {
        ui.high_pass().set_cutoff_hz(2000.0);
        ui.low_pass().set_continuous(false);
        ui.low_pass().set_knob(KnobPosition::new(9).unwrap());
        ui.set_output_gain_db(12.0);
    })
    .join()
    .unwrap();

    let p = audio.snapshot();
    assert_eq!(p.high_pass.cutoff_hz, 2000.0);
    assert!(!p.low_pass.continuous);
    assert_eq!(p.low_pass.knob.get(), 9);
    assert_eq!(p.output_gain_db, 12.0);
}

#[test]
fn stereo_block_processing_matches_single_channel_filter() {
    let store = ParameterStore::default();
    store.high_pass().set_cutoff_hz(500.0);
    store.set_output_gain_db(0.0);
    let params = store.snapshot();

    let input = noise(2048, 3);
    let mut left = to_f32(&input);
    let mut right = to_f32(&input);

    let mut proc = SefProcessor::new(2);
    proc.prepare(SAMPLE_RATE);
    for (l, r) in left.chunks_mut(128).zip(right.chunks_mut(128)) {
        proc.process_block(&params, &mut [l, r]);
    }

    let mut reference = filter_with(&params);
    let expected: Vec<f32> = input
        .iter()
        .map(|&x| reference.process_sample(f64::from(x as f32)) as f32)
        .collect();

    assert_eq!(left, expected);
    assert_eq!(right, expected);
}

#[test]
fn block_size_does_not_change_the_result() {
    let mut params = rcasef::FilterParams::default();
    params.low_pass.cutoff_hz = 3000.0;
    let input = to_f32(&noise(1000, 11));

    let run = |block: usize| {
        let mut buf = input.clone();
        let mut proc = SefProcessor::new(1);
        proc.prepare(SAMPLE_RATE);
        for chunk in buf.chunks_mut(block) {
            proc.process_block(&params, &mut [chunk]);
        }
        buf
    };
    assert_eq!(run(1000), run(37));
}

#[test]
fn switching_mid_stream_drops_the_tail() {
    let store = ParameterStore::default();
    store.high_pass().set_continuous(false);
    store.high_pass().set_knob(KnobPosition::new(4).unwrap());

    let mut proc = SefProcessor::new(1);
    proc.prepare(SAMPLE_RATE);
    let mut loud = to_f32(&noise(512, 5));
    proc.process_block(&store.snapshot(), &mut [&mut loud[..]]);

    store.high_pass().set_knob(KnobPosition::new(5).unwrap());
    let mut quiet = vec![0.0f32; 256];
    proc.process_block(&store.snapshot(), &mut [&mut quiet[..]]);
    assert!(quiet.iter().all(|&s| s == 0.0));
}

#[test]
fn analyzer_and_processor_share_one_store() {
    let ui = ParameterStore::default();
    let mut analyzer =
        ResponseAnalyzer::new(rcasef::AnalysisConfig::default(), SAMPLE_RATE).unwrap();
    let mut proc = SefProcessor::new(2);
    proc.prepare(SAMPLE_RATE);

    ui.high_pass().set_cutoff_hz(1500.0);
    let params = ui.snapshot();
    let mut block = vec![0.0f32; 64];
    proc.process_block(&params, &mut [&mut block[..]]);
    assert!(analyzer.refresh(&params).unwrap().is_some());

    for i in 0..proc.num_channels() {
        assert_eq!(
            proc.channel(i).unwrap().high_pass_cutoff(),
            analyzer.filter().high_pass_cutoff()
        );
    }
    // Unchanged store: the curve does not need recomputing.
    assert!(analyzer.refresh(&ui.snapshot()).unwrap().is_none());
}

#[test]
fn render_file_applies_the_preset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let preset = dir.path().join("preset.yaml");

    std::fs::write(
        &preset,
        "high_pass:\n  mode: discrete\n  knob: 7\noutput_gain_db: 0\nblock_size: 128\n",
    )
    .unwrap();
    let config = SefConfig::load(&preset).unwrap();

    let low = sine_wave(100.0, 0.2, SAMPLE_RATE_U32);
    let high = sine_wave(5000.0, 0.2, SAMPLE_RATE_U32);
    write_wav(&input, &[low.clone(), high.clone()], SAMPLE_RATE_U32).unwrap();

    render_file(&input, &output, &config.to_params(), config.block_size).unwrap();

    let (channels, rate) = read_wav(&output).unwrap();
    assert_eq!(rate, SAMPLE_RATE_U32);
    assert_eq!(channels.len(), 2);
    let half = low.len() / 2;
    let low_gain = db(rms(&to_f64(&channels[0][half..])) / rms(&to_f64(&low[half..])));
    let high_gain = db(rms(&to_f64(&channels[1][half..])) / rms(&to_f64(&high[half..])));
    // Position 7 is the ~1 kHz corner.
    assert!(low_gain < -60.0, "100 Hz: {low_gain:.1} dB");
    assert!(high_gain > -8.0, "5 kHz: {high_gain:.1} dB");
}

#[test]
fn preset_impedance_reaches_processor_and_analyzer_alike() {
    let config = SefConfig::from_yaml_str(
        "characteristic_impedance: 600\nhigh_pass:\n  cutoff_hz: 500\nlow_pass:\n  cutoff_hz: 8000\n",
    )
    .unwrap();
    let params = config.to_params();
    assert_eq!(params.characteristic_impedance, 600.0);

    let mut proc = SefProcessor::new(1);
    proc.prepare(SAMPLE_RATE);
    let mut block = vec![0.0_f32; 64];
    proc.process_block(&params, &mut [&mut block[..]]);

    let mut analyzer = ResponseAnalyzer::new(config.analysis.clone(), SAMPLE_RATE).unwrap();
    analyzer.refresh(&params).unwrap();

    let rendered = proc.channel(0).unwrap();
    let plotted = analyzer.filter();
    assert_eq!(rendered.characteristic_impedance(), 600.0);
    assert_eq!(plotted.characteristic_impedance(), 600.0);
    for component in Component::ALL {
        assert_eq!(
            rendered.component_value(component),
            plotted.component_value(component),
            "{component:?}"
        );
    }
}
