//! WAV file I/O for offline rendering and testing.
//!
//! Uses `hound` to push audio files through the filter so settings can be
//! auditioned without a plugin host.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

use crate::params::FilterParams;
use crate::processor::SefProcessor;
use crate::Result;

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
pub const DEFAULT_BLOCK_SIZE: usize = 512;

fn wav_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Generate a sine wave test signal with peak 0.5.
pub fn sine_wave(freq_hz: f64, duration_secs: f64, sample_rate: u32) -> Vec<f32> {
    let n = (duration_secs * sample_rate as f64) as usize;
    let mut buf = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64 / sample_rate as f64;
        buf.push((0.5 * (2.0 * std::f64::consts::PI * freq_hz * t).sin()) as f32);
    }
    buf
}

/// A single `amplitude` sample followed by `len - 1` zeros.
pub fn impulse(len: usize, amplitude: f32) -> Vec<f32> {
    let mut buf = vec![0.0; len];
    if let Some(first) = buf.first_mut() {
        *first = amplitude;
    }
    buf
}

/// Read a WAV file into one buffer per channel.
///
/// Integer formats are scaled to `[-1, 1)`.
pub fn read_wav(path: &Path) -> Result<(Vec<Vec<f32>>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok((channels, spec.sample_rate))
}

/// Write per-channel buffers as an interleaved 32-bit float WAV.
pub fn write_wav(path: &Path, channels: &[Vec<f32>], sample_rate: u32) -> Result<()> {
    let num_channels = channels.len().max(1) as u16;
    let mut writer = WavWriter::create(path, wav_spec(num_channels, sample_rate))?;
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    for i in 0..frames {
        for channel in channels {
            writer.write_sample(channel[i])?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Run `channels` through `processor` in blocks of `block_size` frames.
pub fn render_buffers(
    processor: &mut SefProcessor,
    params: &FilterParams,
    channels: &mut [Vec<f32>],
    block_size: usize,
) {
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let block_size = block_size.max(1);
    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let mut block: Vec<&mut [f32]> = channels
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        processor.process_block(params, &mut block);
        start = end;
    }
}

/// Filter a WAV file into another with the given settings.
pub fn render_file(
    input: &Path,
    output: &Path,
    params: &FilterParams,
    block_size: usize,
) -> Result<()> {
    let (mut channels, sample_rate) = read_wav(input)?;
    tracing::info!(
        input = %input.display(),
        channels = channels.len(),
        sample_rate,
        frames = channels.first().map_or(0, Vec::len),
        "rendering"
    );

    let mut processor = SefProcessor::new(channels.len());
    processor.prepare(f64::from(sample_rate));
    render_buffers(&mut processor, params, &mut channels, block_size);

    write_wav(output, &channels, sample_rate)?;
    tracing::info!(output = %output.display(), "render complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
