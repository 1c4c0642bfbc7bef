use std::path::Path;

use rcasef::analysis::write_csv;
use rcasef::mapping::gain_to_decibels;
use rcasef::ResponseAnalyzer;

use super::PanelArgs;

pub fn run(output: &Path, sample_rate: Option<u32>, panel: &PanelArgs) -> rcasef::Result<()> {
    let config = panel.resolve()?;
    let params = config.to_params();
    let sample_rate = f64::from(sample_rate.unwrap_or(config.sample_rate));

    let mut analyzer = ResponseAnalyzer::new(config.analysis.clone(), sample_rate)?;
    let magnitudes = analyzer
        .refresh(&params)?
        .map(<[f64]>::to_vec)
        .unwrap_or_default();

    let nyquist = magnitudes.len() / 2;
    if let Some((bin, peak)) = magnitudes
        .iter()
        .copied()
        .take(nyquist + 1)
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
    {
        tracing::info!(
            peak_hz = analyzer.bin_frequency(bin),
            peak_db = gain_to_decibels(peak),
            "response computed"
        );
    }

    write_csv(output, &magnitudes)?;
    tracing::info!(path = %output.display(), bins = magnitudes.len(), "wrote response");
    Ok(())
}
