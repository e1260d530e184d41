//! Multi-signal FT8 / FT4 decoder
//!
//! Pipeline: audio → waterfall → Costas candidate search → soft bits → belief propagation →
//! CRC check → message unpack. The soft decode of each candidate is independent and runs in
//! parallel; unpacking runs afterwards in candidate order so the callsign hash table and the
//! reported order stay deterministic.

use rayon::prelude::*;
use snafu::{ensure, ResultExt, Snafu};
use tracing::{debug, info, instrument};

use crate::channel::{self, CheckFailure};
use crate::crc;
use crate::demod;
use crate::ldpc;
use crate::message::{self, CallsignHashTable, MessageError, MessageType, Payload};
use crate::protocol::Protocol;
use crate::sync::{self, Candidate};
use crate::waterfall::{Waterfall, WaterfallConfig, WaterfallError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    /// Belief propagation left parity checks unsatisfied (0 for the all-zero codeword)
    #[snafu(display("LDPC decode failed with {errors} unsatisfied checks"))]
    LdpcFail { errors: usize },

    #[snafu(display("CRC mismatch: extracted {extracted:#06x}, calculated {calculated:#06x}"))]
    CrcMismatch { extracted: u16, calculated: u16 },

    #[snafu(display("Message unpack failed: {source}"))]
    MessageUnpackFail { source: MessageError },

    #[snafu(display("Invalid waterfall configuration: {source}"))]
    Waterfall { source: WaterfallError },

    /// Candidate does not address a frame of this waterfall
    #[snafu(display("Invalid candidate {candidate:?}: {reason}"))]
    InvalidCandidate { candidate: Candidate, reason: &'static str },
}

/// Configuration for the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub protocol: Protocol,
    /// Audio sample rate in Hz
    pub sample_rate: u32,
    /// Minimum sync score for a candidate to be tried
    pub min_score: i32,
    /// Maximum number of candidates kept by the search
    pub max_candidates: usize,
    pub max_ldpc_iterations: usize,
    /// Maximum number of messages reported per decode
    pub max_decoded_messages: usize,
    pub freq_osr: usize,
    pub time_osr: usize,
    /// Lowest frequency to search (Hz)
    pub f_min: f32,
    /// Highest frequency to search (Hz)
    pub f_max: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ft8,
            sample_rate: 12000,
            min_score: 10,
            max_candidates: 140,
            max_ldpc_iterations: 25,
            max_decoded_messages: 50,
            freq_osr: 2,
            time_osr: 2,
            f_min: 200.0,
            f_max: 3000.0,
        }
    }
}

impl DecoderConfig {
    pub fn ft4() -> Self {
        Self {
            protocol: Protocol::Ft4,
            ..Self::default()
        }
    }

    pub fn waterfall_config(&self) -> WaterfallConfig {
        WaterfallConfig {
            protocol: self.protocol,
            sample_rate: self.sample_rate,
            f_min: self.f_min,
            f_max: self.f_max,
            time_osr: self.time_osr,
            freq_osr: self.freq_osr,
        }
    }
}

/// Diagnostics of one candidate decode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeStatus {
    /// Unsatisfied parity checks after belief propagation
    pub ldpc_errors: usize,
    pub crc_extracted: u16,
    pub crc_calculated: u16,
    /// Frequency of tone 0 in Hz
    pub frequency: f32,
    /// Frame start in seconds
    pub time: f32,
}

/// A candidate whose codeword and CRC checked out
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDecode {
    pub payload: Payload,
    /// The 14-bit CRC, used as the message hash
    pub hash: u16,
    pub ldpc_iterations: usize,
    pub status: DecodeStatus,
}

/// Decoded message with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub text: String,
    pub payload: Payload,
    pub hash: u16,
    pub message_type: MessageType,
    /// Frequency of tone 0 in Hz
    pub frequency: f32,
    /// Frame start in seconds from the start of the recording
    pub time_offset: f32,
    /// Sync score of the candidate
    pub score: i32,
    pub status: DecodeStatus,
}

/// Reject candidates whose sub-bins or tones fall outside the grid, or whose frame does not
/// overlap it at all
fn check_candidate(waterfall: &Waterfall, candidate: &Candidate) -> Result<(), DecodeError> {
    let invalid = |reason| InvalidCandidateSnafu {
        candidate: *candidate,
        reason,
    };
    let protocol = waterfall.protocol();
    ensure!(candidate.time_sub < waterfall.time_osr(), invalid("time_sub exceeds time_osr"));
    ensure!(candidate.freq_sub < waterfall.freq_osr(), invalid("freq_sub exceeds freq_osr"));
    ensure!(
        candidate
            .freq_offset
            .checked_add(protocol.num_tones())
            .is_some_and(|top| top <= waterfall.num_bins()),
        invalid("tones extend past the top bin")
    );
    let start = candidate.time_offset as i64;
    ensure!(
        start + protocol.num_symbols() as i64 > 0 && start < waterfall.num_blocks() as i64,
        invalid("frame lies outside the grid")
    );
    Ok(())
}

/// Soft-decode one candidate: LLRs, belief propagation and CRC check
///
/// FT4 payloads are descrambled after the CRC passes. Candidates whose frame is only partly
/// inside the grid are decoded with the missing symbols erased.
pub fn decode_candidate(
    waterfall: &Waterfall,
    candidate: &Candidate,
    max_iterations: usize,
) -> Result<CandidateDecode, DecodeError> {
    check_candidate(waterfall, candidate)?;
    let llr = demod::extract_llr(waterfall, candidate);
    let bp = ldpc::decode(&llr, max_iterations);
    if !bp.is_valid() {
        return LdpcFailSnafu { errors: bp.errors }.fail();
    }

    let crc_extracted = crc::extract_crc(&bp.plain);
    let crc_calculated = crc::crc14(&bp.plain[..crc::MESSAGE_BITS]);
    let payload = match channel::recover_payload(&bp.plain, waterfall.protocol()) {
        Ok(payload) => payload,
        Err(CheckFailure::AllZero) => return LdpcFailSnafu { errors: 0usize }.fail(),
        Err(CheckFailure::CrcMismatch) => {
            return CrcMismatchSnafu {
                extracted: crc_extracted,
                calculated: crc_calculated,
            }
            .fail()
        }
    };

    Ok(CandidateDecode {
        payload,
        hash: crc_extracted,
        ldpc_iterations: bp.iterations,
        status: DecodeStatus {
            ldpc_errors: bp.errors,
            crc_extracted,
            crc_calculated,
            frequency: candidate.frequency_hz(waterfall),
            time: candidate.time_s(waterfall),
        },
    })
}

/// Unpack a soft-decoded candidate into a reportable message
fn promote(
    decoded: CandidateDecode,
    candidate: &Candidate,
    table: &mut dyn CallsignHashTable,
) -> Result<DecodedMessage, DecodeError> {
    let text = message::decode(&decoded.payload, table).context(MessageUnpackFailSnafu)?;
    if text.is_empty() {
        return Err(DecodeError::MessageUnpackFail {
            source: MessageError::Unpack {
                i3: decoded.payload.i3(),
                n3: decoded.payload.subtype(),
                reason: "empty message".to_string(),
            },
        });
    }
    Ok(DecodedMessage {
        text,
        message_type: decoded.payload.message_type(),
        payload: decoded.payload,
        hash: decoded.hash,
        frequency: decoded.status.frequency,
        time_offset: decoded.status.time,
        score: candidate.score,
        status: decoded.status,
    })
}

/// Decoder front end holding its configuration
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Build the waterfall of a recording
    pub fn waterfall(&self, audio: &[f32]) -> Result<Waterfall, DecodeError> {
        let mut waterfall = Waterfall::new(self.config.waterfall_config()).context(WaterfallSnafu)?;
        waterfall.process_audio(audio);
        Ok(waterfall)
    }

    /// Candidate positions in a recording, best first
    pub fn find_candidates(&self, audio: &[f32]) -> Result<Vec<Candidate>, DecodeError> {
        let waterfall = self.waterfall(audio)?;
        Ok(sync::find_candidates(
            &waterfall,
            self.config.max_candidates,
            self.config.min_score,
        ))
    }

    /// Decode a single candidate of a recording
    pub fn decode_candidate(
        &self,
        audio: &[f32],
        candidate: &Candidate,
        table: &mut dyn CallsignHashTable,
    ) -> Result<(DecodedMessage, DecodeStatus), DecodeError> {
        let waterfall = self.waterfall(audio)?;
        let decoded = decode_candidate(&waterfall, candidate, self.config.max_ldpc_iterations)?;
        let status = decoded.status;
        Ok((promote(decoded, candidate, table)?, status))
    }

    /// Decode every signal in a recording
    pub fn decode(&self, audio: &[f32], table: &mut dyn CallsignHashTable) -> Result<Vec<DecodedMessage>, DecodeError> {
        let mut messages = Vec::new();
        self.decode_with(audio, table, |message| {
            messages.push(message);
            true
        })?;
        Ok(messages)
    }

    /// Decode every signal in a recording, reporting each message through `callback`
    ///
    /// Duplicates (same hash and text) are reported once, for the best candidate. The
    /// callback returns `false` to stop early. Returns the number of messages reported.
    #[instrument(skip(self, audio, table, callback), fields(protocol = %self.config.protocol, samples = audio.len()))]
    pub fn decode_with<F>(
        &self,
        audio: &[f32],
        table: &mut dyn CallsignHashTable,
        callback: F,
    ) -> Result<usize, DecodeError>
    where
        F: FnMut(DecodedMessage) -> bool,
    {
        let waterfall = self.waterfall(audio)?;
        Ok(self.decode_waterfall(&waterfall, table, callback))
    }

    /// Run candidate search and decoding on a prepared waterfall
    pub fn decode_waterfall<F>(&self, waterfall: &Waterfall, table: &mut dyn CallsignHashTable, mut callback: F) -> usize
    where
        F: FnMut(DecodedMessage) -> bool,
    {
        let candidates = sync::find_candidates(waterfall, self.config.max_candidates, self.config.min_score);
        let max_iterations = self.config.max_ldpc_iterations;

        let soft: Vec<(usize, Result<CandidateDecode, DecodeError>)> = candidates
            .par_iter()
            .enumerate()
            .map(|(idx, candidate)| (idx, decode_candidate(waterfall, candidate, max_iterations)))
            .collect();

        let mut seen: Vec<(u16, String)> = Vec::new();
        let mut reported = 0;
        for (idx, result) in soft {
            if reported >= self.config.max_decoded_messages {
                break;
            }
            let candidate = &candidates[idx];
            let decoded = match result {
                Ok(decoded) => decoded,
                Err(e) => {
                    debug!("Candidate {} ({:?}): {}", idx, candidate, e);
                    continue;
                }
            };

            let message = match promote(decoded, candidate, table) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Candidate {}: {}", idx, e);
                    continue;
                }
            };

            if seen.iter().any(|(hash, text)| *hash == message.hash && *text == message.text) {
                debug!("Candidate {}: duplicate '{}'", idx, message.text);
                continue;
            }
            seen.push((message.hash, message.text.clone()));

            debug!(
                "Decoded '{}' at {:.1} Hz, {:+.2} s (score {})",
                message.text, message.frequency, message.time_offset, message.score
            );
            reported += 1;
            if !callback(message) {
                break;
            }
        }

        info!("{} candidates, {} messages", candidates.len(), reported);
        reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CallsignHashCache;
    use crate::pulse::{ModulationParams, Modulator};

    fn slot_audio(text: &str, protocol: Protocol, freq: f32) -> Vec<f32> {
        let payload = message::encode(text, &mut ()).unwrap();
        let tones = channel::encode_tones(&payload, protocol);
        Modulator::new()
            .synthesize_slot(&tones, &ModulationParams::new(protocol, freq, 12000))
            .unwrap()
    }

    #[test]
    fn test_decode_clean_ft8() {
        let audio = slot_audio("CQ K1ABC FN42", Protocol::Ft8, 1000.0);
        let mut table = CallsignHashCache::new();
        let messages = Decoder::default().decode(&audio, &mut table).unwrap();
        assert_eq!(messages.len(), 1);

        let m = &messages[0];
        assert_eq!(m.text, "CQ K1ABC FN42");
        assert_eq!(m.message_type, MessageType::Standard);
        assert_eq!(m.status.ldpc_errors, 0);
        assert_eq!(m.status.crc_extracted, m.status.crc_calculated);
        assert!((m.frequency - 1000.0).abs() <= 0.5);
        // burst starts at 1.18 s; the nearest 80 ms grid step is 1.20 s
        assert!((m.time_offset - 1.20).abs() < 1e-4, "time {}", m.time_offset);
    }

    #[test]
    fn test_decode_clean_ft4() {
        let audio = slot_audio("K1ABC W9XYZ 73", Protocol::Ft4, 1200.0);
        let messages = Decoder::new(DecoderConfig::ft4()).decode(&audio, &mut ()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "K1ABC W9XYZ 73");
    }

    #[test]
    fn test_decode_candidate_reports_status() {
        let audio = slot_audio("K1ABC W9XYZ -14", Protocol::Ft8, 1500.0);
        let decoder = Decoder::default();
        let candidates = decoder.find_candidates(&audio).unwrap();
        assert!(!candidates.is_empty());

        let (message, status) = decoder.decode_candidate(&audio, &candidates[0], &mut ()).unwrap();
        assert_eq!(message.text, "K1ABC W9XYZ -14");
        assert_eq!(status.ldpc_errors, 0);
        assert_eq!(status, message.status);
    }

    #[test]
    fn test_silence_decodes_nothing() {
        let audio = vec![0.0f32; 180000];
        assert!(Decoder::default().decode(&audio, &mut ()).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_position_fails_ldpc() {
        let audio = slot_audio("CQ K1ABC FN42", Protocol::Ft8, 1000.0);
        let decoder = Decoder::default();
        let waterfall = decoder.waterfall(&audio).unwrap();
        let nowhere = Candidate {
            score: 0,
            time_offset: 0,
            freq_offset: 300,
            time_sub: 0,
            freq_sub: 0,
        };
        assert!(matches!(
            decode_candidate(&waterfall, &nowhere, 25),
            Err(DecodeError::LdpcFail { .. })
        ));
    }

    #[test]
    fn test_malformed_candidates_are_rejected() {
        let audio = slot_audio("K1ABC W9XYZ -14", Protocol::Ft8, 1500.0);
        let decoder = Decoder::default();
        let waterfall = decoder.waterfall(&audio).unwrap();
        let best = decoder.find_candidates(&audio).unwrap()[0];
        assert!(decode_candidate(&waterfall, &best, 25).is_ok());

        let malformed = [
            Candidate { time_sub: 1_000_000, ..best },
            Candidate { time_sub: 2, ..best },
            // aliases the neighbouring bin's sub-bin 0 when not checked
            Candidate {
                freq_sub: best.freq_sub + 2,
                freq_offset: best.freq_offset - 1,
                ..best
            },
            Candidate { freq_sub: usize::MAX, ..best },
            Candidate {
                freq_offset: waterfall.num_bins() - 7,
                ..best
            },
            Candidate {
                freq_offset: usize::MAX,
                ..best
            },
            Candidate { time_offset: -79, ..best },
            Candidate {
                time_offset: waterfall.num_blocks() as i32,
                ..best
            },
            Candidate {
                time_offset: i32::MIN,
                ..best
            },
            Candidate {
                time_offset: i32::MAX,
                ..best
            },
        ];
        for candidate in &malformed {
            let result = decode_candidate(&waterfall, candidate, 25);
            assert!(
                matches!(result, Err(DecodeError::InvalidCandidate { .. })),
                "{:?} gave {:?}",
                candidate,
                result
            );
            assert!(matches!(
                decoder.decode_candidate(&audio, candidate, &mut ()),
                Err(DecodeError::InvalidCandidate { .. })
            ));
        }
    }

    #[test]
    fn test_highest_valid_frequency_offset_is_accepted() {
        let audio = slot_audio("CQ K1ABC FN42", Protocol::Ft8, 1000.0);
        let waterfall = Decoder::default().waterfall(&audio).unwrap();
        let top = Candidate {
            score: 0,
            time_offset: 0,
            freq_offset: waterfall.num_bins() - 8,
            time_sub: 1,
            freq_sub: 1,
        };
        let result = decode_candidate(&waterfall, &top, 25);
        assert!(!matches!(result, Err(DecodeError::InvalidCandidate { .. })), "{:?}", result);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config() {
        let decoder = Decoder::new(DecoderConfig {
            f_max: 9000.0,
            ..DecoderConfig::default()
        });
        assert!(matches!(decoder.decode(&[0.0; 100], &mut ()), Err(DecodeError::Waterfall { .. })));
    }

    #[test]
    fn test_callback_can_stop() {
        let mut audio = slot_audio("CQ K1ABC FN42", Protocol::Ft8, 1000.0);
        let other = slot_audio("K1ABC W9XYZ -14", Protocol::Ft8, 1500.0);
        for (a, b) in audio.iter_mut().zip(other) {
            *a += b;
        }
        let mut seen = 0;
        let reported = Decoder::default()
            .decode_with(&audio, &mut (), |_| {
                seen += 1;
                false
            })
            .unwrap();
        assert_eq!(reported, 1);
        assert_eq!(seen, 1);
    }
}
