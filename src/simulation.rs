//! Channel simulation helpers for the simulator binary and tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

/// Bandwidth in which SNR figures are quoted (Hz)
pub const SNR_BANDWIDTH_HZ: f32 = 2500.0;

/// Scale a signal for `snr_db` in 2500 Hz and add unit-variance white noise
///
/// Uses the WSJT-X convention: the signal is multiplied by
/// `sqrt(2 * 2500 / (rate / 2)) * 10^(snr_db / 20)` before the noise is added, so the result
/// typically spans a few units and needs [`normalize_peak`] before PCM output.
pub fn add_noise(signal: &mut [f32], snr_db: f32, sample_rate: u32, seed: u64) {
    let bandwidth_ratio = SNR_BANDWIDTH_HZ / (sample_rate as f32 / 2.0);
    let scale = (2.0 * bandwidth_ratio).sqrt() * 10.0f32.powf(0.05 * snr_db);
    debug!("Adding noise: snr={} dB, signal scale={:.4}, seed={}", snr_db, scale, seed);

    let mut rng = StdRng::seed_from_u64(seed);
    for s in signal.iter_mut() {
        let noise: f32 = rng.sample(StandardNormal);
        *s = *s * scale + noise;
    }
}

/// Add `signal` into `target` starting at `offset`, truncating at the end of `target`
pub fn mix_into(target: &mut [f32], signal: &[f32], offset: usize, gain: f32) {
    for (t, &s) in target.iter_mut().skip(offset).zip(signal) {
        *t += s * gain;
    }
}

/// Rescale so the largest magnitude equals `peak`; silence is left alone
pub fn normalize_peak(signal: &mut [f32], peak: f32) {
    let max = signal.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    if max > 0.0 {
        let gain = peak / max;
        signal.iter_mut().for_each(|s| *s *= gain);
    }
}
