//! Oversampled STFT front-end
//!
//! Audio is consumed one sub-block (`N / time_osr` samples) at a time. Every sub-block slides a
//! Hann-windowed analysis frame of `L = N * freq_osr` samples and produces one column of
//! log-magnitudes covering all tone bins and frequency sub-bins. `time_osr` columns make a block,
//! and one block spans one symbol period.
//!
//! Grid layout: `[block][bin][time_sub][freq_sub]`, one byte per cell storing
//! `round(2 * dB + 240)` clamped to `0..=255`.

use core::fmt;
use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use snafu::{ensure, Snafu};
use tracing::{debug, trace};

use crate::protocol::Protocol;

#[derive(Debug, Snafu, PartialEq)]
pub enum WaterfallError {
    #[snafu(display("Invalid sample rate: {rate}"))]
    SampleRate { rate: u32 },

    #[snafu(display("Invalid frequency range {f_min}..{f_max} Hz (Nyquist {nyquist} Hz)"))]
    FrequencyRange { f_min: f32, f_max: f32, nyquist: f32 },

    #[snafu(display("Invalid oversampling: time_osr={time_osr}, freq_osr={freq_osr}"))]
    Oversampling { time_osr: usize, freq_osr: usize },

    #[snafu(display("Symbol length {samples} is not divisible by time_osr={time_osr}"))]
    SubBlock { samples: usize, time_osr: usize },

    #[snafu(display("Expected {expected} samples per column, got {actual}"))]
    BlockLength { expected: usize, actual: usize },
}

/// Waterfall geometry
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallConfig {
    pub protocol: Protocol,
    pub sample_rate: u32,
    /// Lowest frequency of interest (Hz)
    pub f_min: f32,
    /// Highest frequency of interest (Hz)
    pub f_max: f32,
    pub time_osr: usize,
    pub freq_osr: usize,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ft8,
            sample_rate: 12000,
            f_min: 200.0,
            f_max: 3000.0,
            time_osr: 2,
            freq_osr: 2,
        }
    }
}

impl WaterfallConfig {
    fn validate(&self) -> Result<(), WaterfallError> {
        ensure!(self.sample_rate > 0, SampleRateSnafu { rate: self.sample_rate });
        ensure!(
            self.time_osr >= 1 && self.freq_osr >= 1,
            OversamplingSnafu {
                time_osr: self.time_osr,
                freq_osr: self.freq_osr,
            }
        );

        let nyquist = self.sample_rate as f32 / 2.0;
        // the top bin plus one tone spacing has to stay below Nyquist
        let top = self.f_max + self.protocol.tone_spacing();
        ensure!(
            self.f_min >= 0.0 && self.f_max > self.f_min && top < nyquist,
            FrequencyRangeSnafu {
                f_min: self.f_min,
                f_max: self.f_max,
                nyquist,
            }
        );

        let samples = self.protocol.samples_per_symbol(self.sample_rate);
        ensure!(
            samples >= self.time_osr && samples % self.time_osr == 0,
            SubBlockSnafu {
                samples,
                time_osr: self.time_osr,
            }
        );
        Ok(())
    }
}

/// Log-magnitude time/frequency grid built incrementally from audio
pub struct Waterfall {
    config: WaterfallConfig,
    block_size: usize,
    subblock_size: usize,
    nfft: usize,
    window: Vec<f32>,
    frame: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    min_bin: usize,
    num_bins: usize,
    max_blocks: usize,
    num_blocks: usize,
    time_sub: usize,
    lead: usize,
    lead_remaining: usize,
    mag: Vec<u8>,
}

impl fmt::Debug for Waterfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waterfall")
            .field("config", &self.config)
            .field("nfft", &self.nfft)
            .field("min_bin", &self.min_bin)
            .field("num_bins", &self.num_bins)
            .field("num_blocks", &self.num_blocks)
            .field("max_blocks", &self.max_blocks)
            .finish()
    }
}

/// Convert a magnitude-squared value to the stored byte scale
fn encode_magnitude(mag2: f32) -> u8 {
    let db = 10.0 * (1e-12 + mag2).log10();
    (2.0 * db + 240.0).round().clamp(0.0, 255.0) as u8
}

/// Decibel value of a stored cell
pub fn cell_db(cell: u8) -> f32 {
    cell as f32 * 0.5 - 120.0
}

impl Waterfall {
    pub fn new(config: WaterfallConfig) -> Result<Self, WaterfallError> {
        config.validate()?;

        let protocol = config.protocol;
        let period = protocol.symbol_period();
        let block_size = protocol.samples_per_symbol(config.sample_rate);
        let subblock_size = block_size / config.time_osr;
        let nfft = block_size * config.freq_osr;

        let norm = 2.0 / nfft as f32;
        let window = (0..nfft)
            .map(|i| {
                let s = (PI * i as f32 / nfft as f32).sin();
                norm * s * s
            })
            .collect();

        let min_bin = (config.f_min * period).floor() as usize;
        let max_bin = (config.f_max * period).floor() as usize + 1;
        let num_bins = max_bin - min_bin;
        let max_blocks = (protocol.slot_time() / period).floor() as usize;

        // columns whose window centre falls before the first symbol centre
        let lead = ((nfft + block_size + subblock_size) / (2 * subblock_size)).saturating_sub(1);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(nfft);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        debug!(
            "{} waterfall: nfft={}, bins {}..{}, max_blocks={}, lead={}",
            protocol, nfft, min_bin, max_bin, max_blocks, lead
        );

        let stride = num_bins * config.time_osr * config.freq_osr;
        Ok(Self {
            block_size,
            subblock_size,
            nfft,
            window,
            frame: vec![0.0; nfft],
            fft,
            buffer: vec![Complex::new(0.0, 0.0); nfft],
            scratch,
            min_bin,
            num_bins,
            max_blocks,
            num_blocks: 0,
            time_sub: 0,
            lead,
            lead_remaining: lead,
            mag: vec![0; max_blocks * stride],
            config,
        })
    }

    /// Consume exactly one sub-block of samples and write the next column
    pub fn process(&mut self, samples: &[f32]) -> Result<(), WaterfallError> {
        ensure!(
            samples.len() == self.subblock_size,
            BlockLengthSnafu {
                expected: self.subblock_size,
                actual: samples.len(),
            }
        );
        self.push_column(samples);
        Ok(())
    }

    /// Feed a complete recording, chunked into sub-blocks
    ///
    /// The final partial chunk is zero-padded, and enough trailing silence is appended to
    /// flush the columns still held back by the analysis window. Returns the number of
    /// complete blocks in the grid.
    pub fn process_audio(&mut self, samples: &[f32]) -> usize {
        let mut chunk = vec![0.0f32; self.subblock_size];
        for piece in samples.chunks(self.subblock_size) {
            if self.is_full() {
                break;
            }
            chunk[..piece.len()].copy_from_slice(piece);
            chunk[piece.len()..].fill(0.0);
            self.push_column(&chunk);
        }

        chunk.fill(0.0);
        for _ in 0..self.lead {
            if self.is_full() {
                break;
            }
            self.push_column(&chunk);
        }

        debug!("Waterfall holds {} of {} blocks", self.num_blocks, self.max_blocks);
        self.num_blocks
    }

    fn push_column(&mut self, samples: &[f32]) {
        let sub = self.subblock_size;
        self.frame.copy_within(sub.., 0);
        let keep = self.nfft - sub;
        self.frame[keep..].copy_from_slice(samples);

        if self.lead_remaining > 0 {
            self.lead_remaining -= 1;
            return;
        }
        if self.is_full() {
            return;
        }

        for (slot, (&x, &w)) in self.buffer.iter_mut().zip(self.frame.iter().zip(&self.window)) {
            *slot = Complex::new(x * w, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let fosr = self.config.freq_osr;
        let tosr = self.config.time_osr;
        let block = self.num_blocks;
        for bin in 0..self.num_bins {
            for fsub in 0..fosr {
                let src = (self.min_bin + bin) * fosr + fsub;
                let value = encode_magnitude(self.buffer[src].norm_sqr());
                let idx = ((block * self.num_bins + bin) * tosr + self.time_sub) * fosr + fsub;
                self.mag[idx] = value;
            }
        }
        trace!("Column written: block={}, time_sub={}", block, self.time_sub);

        self.time_sub += 1;
        if self.time_sub == tosr {
            self.time_sub = 0;
            self.num_blocks += 1;
        }
    }

    /// Clear the grid, the analysis frame and all counters
    pub fn reset(&mut self) {
        self.frame.fill(0.0);
        self.mag.fill(0);
        self.num_blocks = 0;
        self.time_sub = 0;
        self.lead_remaining = self.lead;
    }

    /// Stored magnitude of one cell; zero outside the written area
    pub fn get(&self, block: usize, bin: usize, time_sub: usize, freq_sub: usize) -> u8 {
        let tosr = self.config.time_osr;
        let fosr = self.config.freq_osr;
        if block >= self.num_blocks || bin >= self.num_bins || time_sub >= tosr || freq_sub >= fosr {
            return 0;
        }
        let idx = ((block * self.num_bins + bin) * tosr + time_sub) * fosr + freq_sub;
        self.mag.get(idx).copied().unwrap_or(0)
    }

    pub fn is_full(&self) -> bool {
        self.num_blocks >= self.max_blocks
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn min_bin(&self) -> usize {
        self.min_bin
    }

    pub fn time_osr(&self) -> usize {
        self.config.time_osr
    }

    pub fn freq_osr(&self) -> usize {
        self.config.freq_osr
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    pub fn config(&self) -> &WaterfallConfig {
        &self.config
    }

    /// Samples per symbol
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Samples consumed by [`Waterfall::process`]
    pub fn subblock_size(&self) -> usize {
        self.subblock_size
    }

    /// Width of one tone bin in Hz
    pub fn bin_spacing_hz(&self) -> f32 {
        self.config.sample_rate as f32 / self.block_size as f32
    }

    /// Raw grid bytes for the blocks written so far
    pub fn magnitudes(&self) -> &[u8] {
        let stride = self.num_bins * self.config.time_osr * self.config.freq_osr;
        &self.mag[..self.num_blocks * stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_ft8_geometry() {
        let wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        assert_eq!(wf.block_size(), 1920);
        assert_eq!(wf.subblock_size(), 960);
        assert_eq!(wf.min_bin(), 32);
        assert_eq!(wf.num_bins(), 481 - 32);
        assert_eq!(wf.max_blocks(), 93);
        assert!((wf.bin_spacing_hz() - 6.25).abs() < 1e-4);
    }

    #[test]
    fn test_ft4_geometry() {
        let config = WaterfallConfig {
            protocol: Protocol::Ft4,
            ..WaterfallConfig::default()
        };
        let wf = Waterfall::new(config).unwrap();
        assert_eq!(wf.block_size(), 576);
        assert_eq!(wf.max_blocks(), 156);
        assert!((wf.bin_spacing_hz() - 20.833334).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_configs() {
        let bad_range = WaterfallConfig {
            f_min: 3000.0,
            f_max: 200.0,
            ..WaterfallConfig::default()
        };
        assert!(matches!(Waterfall::new(bad_range), Err(WaterfallError::FrequencyRange { .. })));

        let above_nyquist = WaterfallConfig {
            f_max: 5999.0,
            ..WaterfallConfig::default()
        };
        assert!(matches!(Waterfall::new(above_nyquist), Err(WaterfallError::FrequencyRange { .. })));

        let no_osr = WaterfallConfig {
            time_osr: 0,
            ..WaterfallConfig::default()
        };
        assert!(matches!(Waterfall::new(no_osr), Err(WaterfallError::Oversampling { .. })));

        let uneven = WaterfallConfig {
            time_osr: 7,
            ..WaterfallConfig::default()
        };
        assert!(matches!(Waterfall::new(uneven), Err(WaterfallError::SubBlock { .. })));

        let no_rate = WaterfallConfig {
            sample_rate: 0,
            ..WaterfallConfig::default()
        };
        assert!(matches!(Waterfall::new(no_rate), Err(WaterfallError::SampleRate { .. })));
    }

    #[test]
    fn test_process_rejects_wrong_length() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        assert_eq!(
            wf.process(&[0.0; 100]),
            Err(WaterfallError::BlockLength {
                expected: 960,
                actual: 100
            })
        );
    }

    #[test]
    fn test_tone_lands_in_expected_bin() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        // 1000 Hz = bin 160, sub-bin 0
        let audio = tone(1000.0, 12000, 12000 * 3);
        wf.process_audio(&audio);
        assert!(wf.num_blocks() >= 10);

        let bin = 160 - wf.min_bin();
        let on = wf.get(5, bin, 0, 0);
        let off = wf.get(5, bin + 20, 0, 0);
        assert!(on > 200, "peak cell too weak: {}", on);
        assert!(on as i32 - off as i32 > 60, "on={} off={}", on, off);
        assert!(wf.get(5, bin, 0, 0) > wf.get(5, bin, 0, 1));
    }

    #[test]
    fn test_get_outside_grid_is_zero() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&tone(1000.0, 12000, 12000 * 3));
        let bin = 160 - wf.min_bin();
        assert!(wf.get(5, bin, 0, 0) > 0);

        // sub-indices past the oversampling factor must not alias a neighbouring cell
        assert_eq!(wf.get(5, bin - 1, 0, 2), 0);
        assert_eq!(wf.get(4, bin, 2, 0), 0);
        assert_eq!(wf.get(5, bin, 1_000_000, 0), 0);
        assert_eq!(wf.get(5, bin, 0, usize::MAX), 0);
        assert_eq!(wf.get(usize::MAX, bin, 0, 0), 0);
        assert_eq!(wf.get(5, usize::MAX, 0, 0), 0);
    }

    #[test]
    fn test_silence_is_floor() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&vec![0.0; 12000]);
        assert!(wf.magnitudes().iter().all(|&m| m == 0));
    }

    #[test]
    fn test_stops_at_max_blocks() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        let blocks = wf.process_audio(&vec![0.01; 12000 * 20]);
        assert_eq!(blocks, 93);
        assert!(wf.is_full());
    }

    #[test]
    fn test_deterministic_and_reset() {
        let audio = tone(1234.5, 12000, 12000 * 2);
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&audio);
        let first = wf.magnitudes().to_vec();

        wf.reset();
        assert_eq!(wf.num_blocks(), 0);
        wf.process_audio(&audio);
        assert_eq!(first, wf.magnitudes());

        let mut other = Waterfall::new(WaterfallConfig::default()).unwrap();
        other.process_audio(&audio);
        assert_eq!(first, other.magnitudes());
    }

    #[test]
    fn test_streaming_matches_process_audio_prefix() {
        let audio = tone(800.0, 12000, 960 * 40);
        let mut streamed = Waterfall::new(WaterfallConfig::default()).unwrap();
        for chunk in audio.chunks(960) {
            streamed.process(chunk).unwrap();
        }
        let mut whole = Waterfall::new(WaterfallConfig::default()).unwrap();
        whole.process_audio(&audio);

        let n = streamed.magnitudes().len();
        assert!(n > 0);
        assert_eq!(streamed.magnitudes(), &whole.magnitudes()[..n]);
    }

    #[test]
    fn test_cell_db_scale() {
        assert_eq!(cell_db(240), 0.0);
        assert_eq!(cell_db(0), -120.0);
        assert_eq!(encode_magnitude(1.0), 240);
        assert_eq!(encode_magnitude(0.0), 0);
    }
}
