//! WAV plumbing for the binaries
//!
//! Mono 16-bit PCM or 32-bit float input, 16-bit PCM output. The modem itself works on
//! `f32` samples and never touches files.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use snafu::{ensure, ResultExt, Snafu};
use tracing::debug;

#[derive(Debug, Snafu)]
pub enum WavError {
    #[snafu(display("WAV I/O failed for {path}: {source}"))]
    Hound { path: String, source: hound::Error },

    #[snafu(display("Expected mono audio, got {channels} channels"))]
    Channels { channels: u16 },

    #[snafu(display("Unsupported sample format: {bits}-bit {format:?}"))]
    Format { bits: u16, format: SampleFormat },
}

/// Audio read from a WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Convert a sample in [-1.0, 1.0] to 16-bit PCM, clamping out-of-range values
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Audio, WavError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let reader = WavReader::open(path).context(HoundSnafu { path: display.clone() })?;
    let spec = reader.spec();
    ensure!(spec.channels == 1, ChannelsSnafu { channels: spec.channels });

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<Vec<f32>, _>>(),
        (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<Vec<f32>, _>>(),
        (format, bits) => return FormatSnafu { bits, format }.fail(),
    }
    .context(HoundSnafu { path: display })?;

    debug!("Read {} samples at {} Hz from {}", samples.len(), spec.sample_rate, path.display());
    Ok(Audio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<(), WavError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).context(HoundSnafu { path: display.clone() })?;
    for &sample in samples {
        writer
            .write_sample(f32_to_i16(sample))
            .context(HoundSnafu { path: display.clone() })?;
    }
    writer.finalize().context(HoundSnafu { path: display })?;

    debug!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}
