//! GFSK Pulse Shaping and Waveform Generation
//!
//! FT8 and FT4 are sent as continuous-phase FSK whose frequency steps are
//! smoothed by a Gaussian filter:
//!
//! ```text
//! p(t) = ½ [erf(K·BT·(t + ½)) − erf(K·BT·(t − ½))],   K = π·sqrt(2 / ln 2)
//! ```
//!
//! Each symbol contributes `2π/N · tone · p` to the per-sample phase increment
//! over three symbol periods. The first and last tones are extended by dummy
//! symbols so the burst starts and ends on a steady frequency, and a raised
//! cosine ramp over `N/8` samples suppresses key clicks.

use core::f32::consts::PI;

use snafu::prelude::*;
use tracing::{debug, trace};

use crate::protocol::Protocol;

#[derive(Debug, Snafu, PartialEq)]
pub enum ModulationError {
    #[snafu(display("cannot modulate an empty tone sequence"))]
    EmptyTones,

    #[snafu(display("tone {tone} at symbol {position} is out of range for {protocol}"))]
    ToneOutOfRange {
        protocol: Protocol,
        tone: u8,
        position: usize,
    },

    #[snafu(display("sample rate must be positive"))]
    SampleRate,

    #[snafu(display("carrier {frequency} Hz outside (0, {nyquist}) Hz"))]
    Frequency { frequency: f32, nyquist: f32 },
}

/// Gaussian frequency pulse at normalised time `t` (0 = symbol centre)
pub fn gfsk_pulse(bt: f32, t: f32) -> f32 {
    let c = PI * libm::sqrtf(2.0 / libm::logf(2.0));
    0.5 * (libm::erff(c * bt * (t + 0.5)) - libm::erff(c * bt * (t - 0.5)))
}

/// Sample the pulse over three symbol periods, `t = i/N − 1.5`
pub fn compute_pulse(bt: f32, nsps: usize) -> Vec<f32> {
    (0..3 * nsps)
        .map(|i| gfsk_pulse(bt, i as f32 / nsps as f32 - 1.5))
        .collect()
}

/// Carrier, rate and filter settings for one transmission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationParams {
    pub protocol: Protocol,
    /// Frequency of tone 0 in Hz
    pub frequency: f32,
    pub sample_rate: u32,
    pub symbol_bt: f32,
}

impl ModulationParams {
    /// Parameters with the protocol's default BT
    pub fn new(protocol: Protocol, frequency: f32, sample_rate: u32) -> Self {
        Self {
            protocol,
            frequency,
            sample_rate,
            symbol_bt: protocol.default_bt(),
        }
    }

    pub fn with_bt(mut self, symbol_bt: f32) -> Self {
        self.symbol_bt = symbol_bt;
        self
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.protocol.samples_per_symbol(self.sample_rate)
    }

    fn validate(&self, tones: &[u8]) -> Result<(), ModulationError> {
        ensure!(!tones.is_empty(), EmptyTonesSnafu);
        ensure!(self.sample_rate > 0, SampleRateSnafu);
        let nyquist = self.sample_rate as f32 / 2.0;
        ensure!(
            self.frequency > 0.0 && self.frequency < nyquist,
            FrequencySnafu {
                frequency: self.frequency,
                nyquist
            }
        );
        let num_tones = self.protocol.num_tones();
        if let Some(position) = tones.iter().position(|&t| t as usize >= num_tones) {
            return ToneOutOfRangeSnafu {
                protocol: self.protocol,
                tone: tones[position],
                position,
            }
            .fail();
        }
        Ok(())
    }
}

#[derive(Debug)]
struct PulseTable {
    sample_rate: u32,
    nsps: usize,
    bt_bits: u32,
    pulse: Vec<f32>,
}

/// GFSK modulator holding the pulse tables it has computed
///
/// # Example
/// ```
/// use rustyftx::protocol::Protocol;
/// use rustyftx::pulse::{ModulationParams, Modulator};
///
/// let mut modulator = Modulator::new();
/// let params = ModulationParams::new(Protocol::Ft8, 1000.0, 12000);
/// let samples = modulator.modulate(&[0u8; 79], &params)?;
/// assert_eq!(samples.len(), 79 * 1920);
/// # Ok::<(), rustyftx::pulse::ModulationError>(())
/// ```
#[derive(Debug, Default)]
pub struct Modulator {
    tables: Vec<PulseTable>,
}

impl Modulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn pulse(&mut self, sample_rate: u32, nsps: usize, bt: f32) -> &[f32] {
        let bt_bits = bt.to_bits();
        let index = match self
            .tables
            .iter()
            .position(|t| t.sample_rate == sample_rate && t.nsps == nsps && t.bt_bits == bt_bits)
        {
            Some(index) => index,
            None => {
                debug!(sample_rate, nsps, bt, "computing GFSK pulse table");
                self.tables.push(PulseTable {
                    sample_rate,
                    nsps,
                    bt_bits,
                    pulse: compute_pulse(bt, nsps),
                });
                self.tables.len() - 1
            }
        };
        &self.tables[index].pulse
    }

    /// Number of cached pulse tables
    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    /// Synthesise a burst of exactly `tones.len() × N` samples
    pub fn modulate(&mut self, tones: &[u8], params: &ModulationParams) -> Result<Vec<f32>, ModulationError> {
        params.validate(tones)?;

        let nsps = params.samples_per_symbol();
        let nsym = tones.len();
        let twopi = 2.0 * PI;
        let dphi_peak = twopi / nsps as f32;
        let pulse = self.pulse(params.sample_rate, nsps, params.symbol_bt);

        // one dummy symbol on each side
        let mut dphi = vec![0.0f32; (nsym + 2) * nsps];
        for (j, &tone) in tones.iter().enumerate() {
            let start = j * nsps;
            for (k, &p) in pulse.iter().enumerate() {
                dphi[start + k] += dphi_peak * tone as f32 * p;
            }
        }

        let first = tones[0] as f32;
        let last = tones[nsym - 1] as f32;
        for k in 0..2 * nsps {
            dphi[k] += dphi_peak * first * pulse[nsps + k];
            dphi[nsym * nsps + k] += dphi_peak * last * pulse[k];
        }

        let carrier = twopi * params.frequency / params.sample_rate as f32;
        let mut samples = Vec::with_capacity(nsym * nsps);
        let mut phi = 0.0f32;
        for &d in &dphi[nsps..nsps + nsym * nsps] {
            samples.push(libm::sinf(phi));
            phi = (phi + d + carrier).rem_euclid(twopi);
        }

        let nramp = nsps / 8;
        let len = samples.len();
        for i in 0..nramp {
            let envelope = (1.0 - libm::cosf(twopi * i as f32 / (2.0 * nramp as f32))) / 2.0;
            samples[i] *= envelope;
            samples[len - 1 - i] *= envelope;
        }

        trace!(symbols = nsym, samples = len, "modulated burst");
        Ok(samples)
    }

    /// Modulate and centre the burst inside a full slot of silence
    pub fn synthesize_slot(&mut self, tones: &[u8], params: &ModulationParams) -> Result<Vec<f32>, ModulationError> {
        let burst = self.modulate(tones, params)?;
        let slot_len = (params.protocol.slot_time() * params.sample_rate as f32).round() as usize;
        let total = slot_len.max(burst.len());
        let offset = (total - burst.len()) / 2;

        let mut slot = vec![0.0f32; total];
        slot[offset..offset + burst.len()].copy_from_slice(&burst);
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ft8_params() -> ModulationParams {
        ModulationParams::new(Protocol::Ft8, 1000.0, 12000)
    }

    #[test]
    fn test_gfsk_pulse_properties() {
        let bt = 2.0;
        let n = 1000;
        let sum: f32 = (0..n).map(|i| gfsk_pulse(bt, i as f32 / n as f32 - 0.5)).sum::<f32>() / n as f32;
        assert!((sum - 1.0).abs() < 0.1, "pulse mean over one symbol should be ~1.0, got {}", sum);

        for i in 1..10 {
            let t = i as f32 * 0.1;
            assert!((gfsk_pulse(bt, t) - gfsk_pulse(bt, -t)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_compute_pulse_shape() {
        let pulse = compute_pulse(2.0, 1920);
        assert_eq!(pulse.len(), 3 * 1920);
        assert!(pulse.iter().all(|&p| (0.0..=1.0).contains(&p)));
        let mid = pulse.len() / 2;
        for i in 1..100 {
            assert!((pulse[mid - i] - pulse[mid + i]).abs() < 1e-5, "asymmetric at {}", i);
        }
    }

    #[test]
    fn test_burst_length_both_protocols() {
        let mut modulator = Modulator::new();
        let ft8 = modulator.modulate(&[0u8; 79], &ft8_params()).unwrap();
        assert_eq!(ft8.len(), 79 * 1920);

        let ft4 = modulator
            .modulate(&[0u8; 105], &ModulationParams::new(Protocol::Ft4, 1000.0, 12000))
            .unwrap();
        assert_eq!(ft4.len(), 105 * 576);
    }

    #[test]
    fn test_samples_bounded_and_ramped() {
        let mut modulator = Modulator::new();
        let wave = modulator.modulate(&[4u8; 79], &ft8_params()).unwrap();
        assert!(wave.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(wave[0].abs() < 1e-6);
        assert!(wave[wave.len() - 1].abs() < 0.1);

        let peak_first = wave[..240].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let peak_mid = wave[1920..2160].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak_first <= peak_mid);
    }

    #[test]
    fn test_different_tones_produce_different_waveforms() {
        let mut modulator = Modulator::new();
        let low = modulator.modulate(&[0u8; 79], &ft8_params()).unwrap();
        let high = modulator.modulate(&[7u8; 79], &ft8_params()).unwrap();
        let differences = (1920..2000).filter(|&i| (low[i] - high[i]).abs() > 0.01).count();
        assert!(differences > 50);
    }

    #[test]
    fn test_pulse_tables_are_cached() {
        let mut modulator = Modulator::new();
        modulator.modulate(&[1u8; 79], &ft8_params()).unwrap();
        modulator.modulate(&[2u8; 79], &ft8_params()).unwrap();
        assert_eq!(modulator.cached_tables(), 1);

        modulator.modulate(&[1u8; 79], &ft8_params().with_bt(1.0)).unwrap();
        modulator.modulate(&[1u8; 79], &ModulationParams::new(Protocol::Ft8, 1000.0, 48000)).unwrap();
        assert_eq!(modulator.cached_tables(), 3);
    }

    #[test]
    fn test_slot_is_centred() {
        let mut modulator = Modulator::new();
        let slot = modulator.synthesize_slot(&[3u8; 79], &ft8_params()).unwrap();
        assert_eq!(slot.len(), 180_000);
        let offset = (180_000 - 79 * 1920) / 2;
        assert!(slot[..offset].iter().all(|&s| s == 0.0));
        assert!(slot[offset + 79 * 1920..].iter().all(|&s| s == 0.0));
        assert!(slot[offset + 1920..offset + 2 * 1920].iter().any(|&s| s.abs() > 0.5));
    }

    #[test]
    fn test_errors() {
        let mut modulator = Modulator::new();
        assert_eq!(modulator.modulate(&[], &ft8_params()), Err(ModulationError::EmptyTones));

        let ft4 = ModulationParams::new(Protocol::Ft4, 1000.0, 12000);
        assert_eq!(
            modulator.modulate(&[0, 1, 4], &ft4),
            Err(ModulationError::ToneOutOfRange {
                protocol: Protocol::Ft4,
                tone: 4,
                position: 2
            })
        );

        let bad_rate = ModulationParams::new(Protocol::Ft8, 1000.0, 0);
        assert_eq!(modulator.modulate(&[0], &bad_rate), Err(ModulationError::SampleRate));

        let too_high = ModulationParams::new(Protocol::Ft8, 6000.0, 12000);
        assert!(matches!(modulator.modulate(&[0], &too_high), Err(ModulationError::Frequency { .. })));
    }
}
