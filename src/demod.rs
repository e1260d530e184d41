//! Soft-bit extraction from the waterfall
//!
//! Each data symbol yields one log-likelihood ratio per coded bit: the strongest tone whose
//! Gray-coded value has the bit clear minus the strongest tone with the bit set, in dB.
//! Positive values favour 0, matching the LDPC decoder.

use crate::ldpc;
use crate::sync::Candidate;
use crate::waterfall::{cell_db, Waterfall};

/// Soft bits of one candidate, one per codeword bit
pub type Llr = [f32; ldpc::N];

/// LLRs of one symbol given the dB magnitude of each tone
///
/// `bits` bits are written MSB first into `out`.
pub fn symbol_llr(mags: &[f32], gray_map: &[u8], bits: usize, out: &mut [f32]) {
    for (b, slot) in out.iter_mut().take(bits).enumerate() {
        let mask = 1 << (bits - 1 - b);
        let mut best_zero = f32::NEG_INFINITY;
        let mut best_one = f32::NEG_INFINITY;
        for (value, &tone) in gray_map.iter().enumerate() {
            let mag = mags[tone as usize];
            if value & mask == 0 {
                best_zero = best_zero.max(mag);
            } else {
                best_one = best_one.max(mag);
            }
        }
        *slot = best_zero - best_one;
    }
}

/// Scale LLRs so their variance is 24
///
/// Left untouched when the variance is zero.
pub fn normalize(llr: &mut [f32]) {
    if llr.is_empty() {
        return;
    }
    let n = llr.len() as f32;
    let sum: f32 = llr.iter().sum();
    let sum2: f32 = llr.iter().map(|x| x * x).sum();
    let variance = (sum2 - sum * sum / n) / n;
    if variance <= 0.0 {
        return;
    }
    let factor = (24.0 / variance).sqrt();
    for x in llr.iter_mut() {
        *x *= factor;
    }
}

/// Extract and normalise the soft bits of a candidate
///
/// Symbols falling outside the grid contribute zeros.
pub fn extract_llr(waterfall: &Waterfall, candidate: &Candidate) -> Llr {
    let protocol = waterfall.protocol();
    let bits = protocol.bits_per_symbol();
    let num_tones = protocol.num_tones();
    let gray = protocol.gray_map();
    let num_blocks = waterfall.num_blocks() as i32;

    let mut llr = [0.0f32; ldpc::N];
    let mut mags = [0.0f32; 8];
    for k in 0..protocol.num_data_symbols() {
        let block = candidate.time_offset.saturating_add(protocol.data_symbol_position(k) as i32);
        if block < 0 || block >= num_blocks {
            continue;
        }
        for (tone, mag) in mags.iter_mut().take(num_tones).enumerate() {
            let cell = candidate.freq_offset.checked_add(tone).map_or(0, |bin| {
                waterfall.get(block as usize, bin, candidate.time_sub, candidate.freq_sub)
            });
            *mag = cell_db(cell);
        }
        symbol_llr(&mags[..num_tones], gray, bits, &mut llr[k * bits..(k + 1) * bits]);
    }

    normalize(&mut llr);
    llr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Protocol;

    #[test]
    fn test_ft8_symbol_llr_signs() {
        let gray = Protocol::Ft8.gray_map();
        for value in 0..8usize {
            let tone = gray[value] as usize;
            let mut mags = [-100.0f32; 8];
            mags[tone] = 0.0;
            let mut out = [0.0f32; 3];
            symbol_llr(&mags, gray, 3, &mut out);
            for b in 0..3 {
                let bit = (value >> (2 - b)) & 1;
                if bit == 0 {
                    assert_eq!(out[b], 100.0, "value {} bit {}", value, b);
                } else {
                    assert_eq!(out[b], -100.0, "value {} bit {}", value, b);
                }
            }
        }
    }

    #[test]
    fn test_ft4_symbol_llr_signs() {
        let gray = Protocol::Ft4.gray_map();
        let mut mags = [-50.0f32; 4];
        // tone 2 carries value 3
        mags[2] = -10.0;
        let mut out = [0.0f32; 2];
        symbol_llr(&mags, gray, 2, &mut out);
        assert!(out[0] < 0.0 && out[1] < 0.0);
    }

    #[test]
    fn test_symbols_before_the_grid_are_erased() {
        use crate::waterfall::WaterfallConfig;
        use crate::{channel, message};
        use crate::pulse::{ModulationParams, Modulator};

        let payload = message::encode("K1ABC W9XYZ -14", &mut ()).unwrap();
        let tones = channel::encode_tones(&payload, Protocol::Ft8);
        let audio = Modulator::new()
            .synthesize_slot(&tones, &ModulationParams::new(Protocol::Ft8, 1000.0, 12000))
            .unwrap();
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&audio);

        // frame starting ten symbols before the grid: data symbols 0..3 land at blocks -3..-1
        let candidate = Candidate {
            score: 0,
            time_offset: -10,
            freq_offset: 160 - wf.min_bin(),
            time_sub: 0,
            freq_sub: 0,
        };
        let llr = extract_llr(&wf, &candidate);
        assert!(llr[..9].iter().all(|&x| x == 0.0));
        assert!(llr.iter().all(|x| x.is_finite()));
        assert!(llr[9..].iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_normalize_variance() {
        let mut llr: Vec<f32> = (0..174).map(|i| if i % 3 == 0 { 5.0 } else { -2.0 }).collect();
        normalize(&mut llr);
        let n = llr.len() as f32;
        let mean = llr.iter().sum::<f32>() / n;
        let var = llr.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        assert!((var - 24.0).abs() < 1e-2, "variance {}", var);
    }

    #[test]
    fn test_normalize_constant_is_untouched() {
        let mut llr = vec![0.0f32; 174];
        normalize(&mut llr);
        assert!(llr.iter().all(|&x| x == 0.0));

        let mut flat = vec![3.0f32; 10];
        normalize(&mut flat);
        assert!(flat.iter().all(|&x| x == 3.0));
    }
}
