//! Costas-array candidate search over the waterfall
//!
//! Every grid position (time offset, tone bin, time/frequency sub-bin) is scored by how much
//! the expected Costas cells stand out from their neighbours. The best positions are kept in
//! a bounded min-heap.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::{debug, instrument, trace};

use crate::waterfall::Waterfall;

/// A grid position that may hold a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Average Costas contrast in stored magnitude units (0.5 dB)
    pub score: i32,
    /// Frame start in symbol periods, may be negative
    pub time_offset: i32,
    /// Lowest tone, in bins above the waterfall's `min_bin`
    pub freq_offset: usize,
    pub time_sub: usize,
    pub freq_sub: usize,
}

impl Candidate {
    /// Frame start in units of `1/time_osr` symbols
    pub fn fine_time(&self, time_osr: usize) -> i32 {
        self.time_offset * time_osr as i32 + self.time_sub as i32
    }

    /// Lowest tone in units of `1/freq_osr` bins
    pub fn fine_freq(&self, freq_osr: usize) -> usize {
        self.freq_offset * freq_osr + self.freq_sub
    }

    /// Frame start in seconds from the start of the recording
    pub fn time_s(&self, waterfall: &Waterfall) -> f32 {
        let osr = waterfall.time_osr() as f32;
        (self.time_offset as f32 + self.time_sub as f32 / osr) * waterfall.protocol().symbol_period()
    }

    /// Frequency of tone 0 in Hz
    pub fn frequency_hz(&self, waterfall: &Waterfall) -> f32 {
        let osr = waterfall.freq_osr() as f32;
        let bin = waterfall.min_bin() as f32 + self.freq_offset as f32 + self.freq_sub as f32 / osr;
        bin * waterfall.bin_spacing_hz()
    }
}

/// Heap entry ordered so that "greater" means "better"
#[derive(PartialEq, Eq)]
struct Ranked {
    key: (i32, Reverse<i32>, Reverse<usize>),
    candidate: Candidate,
}

impl Ranked {
    fn new(candidate: Candidate, time_osr: usize, freq_osr: usize) -> Self {
        Self {
            key: (
                candidate.score,
                Reverse(candidate.fine_time(time_osr)),
                Reverse(candidate.fine_freq(freq_osr)),
            ),
            candidate,
        }
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Costas contrast of one grid position
///
/// Each sync cell is compared with the tone above and below and the symbol before and
/// after, as long as the neighbour lies inside the Costas run and the grid. The result is
/// the integer mean of those differences.
pub fn sync_score(waterfall: &Waterfall, candidate: &Candidate) -> i32 {
    let protocol = waterfall.protocol();
    let num_tones = protocol.num_tones();
    let length = protocol.sync_length();
    let num_blocks = waterfall.num_blocks() as i32;

    let cell = |block: i32, tone: usize| -> i32 {
        candidate.freq_offset.checked_add(tone).map_or(0, |bin| {
            waterfall.get(block as usize, bin, candidate.time_sub, candidate.freq_sub) as i32
        })
    };

    let mut score = 0i32;
    let mut count = 0i32;
    for (m, &offset) in protocol.sync_offsets().iter().enumerate() {
        for k in 0..length {
            let block = candidate.time_offset.saturating_add((offset + k) as i32);
            if block < 0 {
                continue;
            }
            if block >= num_blocks {
                break;
            }

            let tone = protocol.costas_tone(m, k) as usize;
            let here = cell(block, tone);
            if tone > 0 {
                score += here - cell(block, tone - 1);
                count += 1;
            }
            if tone + 1 < num_tones {
                score += here - cell(block, tone + 1);
                count += 1;
            }
            if k > 0 && block > 0 {
                score += here - cell(block - 1, tone);
                count += 1;
            }
            if k + 1 < length && block + 1 < num_blocks {
                score += here - cell(block + 1, tone);
                count += 1;
            }
        }
    }

    if count > 0 {
        score / count
    } else {
        0
    }
}

/// Find up to `max_candidates` grid positions scoring at least `min_score`
///
/// Returned best first: score descending, then start time ascending, then frequency ascending.
#[instrument(skip(waterfall), fields(num_blocks = waterfall.num_blocks()))]
pub fn find_candidates(waterfall: &Waterfall, max_candidates: usize, min_score: i32) -> Vec<Candidate> {
    let protocol = waterfall.protocol();
    let num_tones = protocol.num_tones();
    let time_osr = waterfall.time_osr();
    let freq_osr = waterfall.freq_osr();

    let first_data = protocol.data_symbol_position(0) as i32;
    let last_data = protocol.data_symbol_position(protocol.num_data_symbols() - 1) as i32;
    let time_min = -first_data;
    let time_max = waterfall.num_blocks() as i32 - last_data - 1;

    if max_candidates == 0 || time_max < time_min || waterfall.num_bins() < num_tones {
        debug!("Grid too small for a {} frame", protocol);
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(max_candidates + 1);
    for time_sub in 0..time_osr {
        for freq_sub in 0..freq_osr {
            for time_offset in time_min..=time_max {
                for freq_offset in 0..=(waterfall.num_bins() - num_tones) {
                    let mut candidate = Candidate {
                        score: 0,
                        time_offset,
                        freq_offset,
                        time_sub,
                        freq_sub,
                    };
                    candidate.score = sync_score(waterfall, &candidate);
                    if candidate.score < min_score {
                        continue;
                    }

                    let ranked = Ranked::new(candidate, time_osr, freq_osr);
                    if heap.len() < max_candidates {
                        heap.push(Reverse(ranked));
                    } else if heap.peek().is_some_and(|worst| ranked > worst.0) {
                        heap.pop();
                        heap.push(Reverse(ranked));
                    }
                }
            }
        }
    }

    // ascending order of Reverse is best first
    let candidates: Vec<Candidate> = heap.into_sorted_vec().into_iter().map(|r| r.0.candidate).collect();
    for c in candidates.iter().take(5) {
        trace!(
            "Candidate score={} time={}+{}/{} freq={}+{}/{}",
            c.score,
            c.time_offset,
            c.time_sub,
            time_osr,
            c.freq_offset,
            c.freq_sub,
            freq_osr
        );
    }
    debug!("{} candidates above score {}", candidates.len(), min_score);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;
    use crate::message::{self, CallsignHashCache};
    use crate::protocol::Protocol;
    use crate::pulse::{ModulationParams, Modulator};
    use crate::waterfall::WaterfallConfig;

    fn waterfall_for(text: &str, protocol: Protocol, freq: f32) -> Waterfall {
        let mut table = CallsignHashCache::new();
        let payload = message::encode(text, &mut table).unwrap();
        let tones = channel::encode_tones(&payload, protocol);
        let params = ModulationParams::new(protocol, freq, 12000);
        let audio = Modulator::new().synthesize_slot(&tones, &params).unwrap();

        let mut wf = Waterfall::new(WaterfallConfig {
            protocol,
            ..WaterfallConfig::default()
        })
        .unwrap();
        wf.process_audio(&audio);
        wf
    }

    #[test]
    fn test_best_candidate_matches_signal() {
        let wf = waterfall_for("CQ K1ABC FN42", Protocol::Ft8, 1000.0);
        let candidates = find_candidates(&wf, 20, 10);
        assert!(!candidates.is_empty());

        let best = candidates[0];
        assert!((best.frequency_hz(&wf) - 1000.0).abs() < 1.6, "freq {}", best.frequency_hz(&wf));
        assert!((best.time_s(&wf) - 1.18).abs() < 0.1, "time {}", best.time_s(&wf));
    }

    #[test]
    fn test_ft4_candidate() {
        let wf = waterfall_for("K1ABC W9XYZ 73", Protocol::Ft4, 1200.0);
        let candidates = find_candidates(&wf, 20, 10);
        assert!(!candidates.is_empty());
        assert!((candidates[0].frequency_hz(&wf) - 1200.0).abs() < 11.0);
    }

    #[test]
    fn test_candidate_order() {
        let wf = waterfall_for("CQ K1ABC FN42", Protocol::Ft8, 1500.0);
        let candidates = find_candidates(&wf, 50, 0);
        assert!(candidates.len() <= 50);
        for pair in candidates.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ordered = a.score > b.score
                || (a.score == b.score && a.fine_time(2) < b.fine_time(2))
                || (a.score == b.score && a.fine_time(2) == b.fine_time(2) && a.fine_freq(2) < b.fine_freq(2));
            assert!(ordered, "{:?} before {:?}", a, b);
        }
    }

    #[test]
    fn test_heap_keeps_top_scores() {
        let wf = waterfall_for("CQ K1ABC FN42", Protocol::Ft8, 1500.0);
        let many = find_candidates(&wf, 200, 0);
        let few = find_candidates(&wf, 10, 0);
        assert_eq!(few.len(), 10);
        assert_eq!(&many[..10], &few[..]);
    }

    #[test]
    fn test_silence_has_no_candidates() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&vec![0.0; 180000]);
        assert!(find_candidates(&wf, 100, 1).is_empty());
    }

    #[test]
    fn test_short_grid_yields_nothing() {
        let mut wf = Waterfall::new(WaterfallConfig::default()).unwrap();
        wf.process_audio(&vec![0.0; 12000]);
        assert!(find_candidates(&wf, 100, 0).is_empty());
    }
}
