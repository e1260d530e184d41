//! Text to audio
//!
//! ```
//! use rustyftx::encoder::{Encoder, EncoderConfig};
//!
//! let mut encoder = Encoder::new(EncoderConfig::default());
//! let (message, audio) = encoder.encode_to_audio("CQ K1ABC FN42", &mut ())?;
//! assert_eq!(message.tones.len(), 79);
//! assert_eq!(audio.len(), 180000);
//! # Ok::<(), rustyftx::encoder::EncodeError>(())
//! ```

use snafu::{ResultExt, Snafu};
use tracing::{debug, instrument};

use crate::channel;
use crate::crc;
use crate::message::{self, CallsignHashTable, MessageError, Payload};
use crate::protocol::Protocol;
use crate::pulse::{ModulationError, ModulationParams, Modulator};

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("Cannot pack message: {source}"))]
    Message { source: MessageError },

    #[snafu(display("Cannot modulate: {source}"))]
    Modulation { source: ModulationError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub protocol: Protocol,
    /// Frequency of tone 0 in Hz
    pub frequency: f32,
    pub sample_rate: u32,
    /// Gaussian BT product; `None` picks the protocol default
    pub symbol_bt: Option<f32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Ft8,
            frequency: 1000.0,
            sample_rate: 12000,
            symbol_bt: None,
        }
    }
}

impl EncoderConfig {
    pub fn ft4() -> Self {
        Self {
            protocol: Protocol::Ft4,
            ..Self::default()
        }
    }

    pub fn modulation_params(&self) -> ModulationParams {
        let params = ModulationParams::new(self.protocol, self.frequency, self.sample_rate);
        match self.symbol_bt {
            Some(bt) => params.with_bt(bt),
            None => params,
        }
    }
}

/// A packed and channel-coded message
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
    /// Normalised message text
    pub text: String,
    pub payload: Payload,
    pub tones: Vec<u8>,
    /// CRC-14 sent with the payload, as reported by the decoder
    pub hash: u16,
    pub protocol: Protocol,
}

#[derive(Debug, Default)]
pub struct Encoder {
    config: EncoderConfig,
    modulator: Modulator,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            modulator: Modulator::new(),
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Pack `text` and compute its tone sequence
    pub fn encode(&self, text: &str, table: &mut dyn CallsignHashTable) -> Result<EncodedMessage, EncodeError> {
        let protocol = self.config.protocol;
        let payload = message::encode(text, table).context(MessageSnafu)?;
        let tones = channel::encode_tones(&payload, protocol);
        let hash = crc::extract_crc(&channel::message91(&payload, protocol)[..crc::MESSAGE_BITS]);

        debug!("{} '{}': {} tones, hash {:#06x}", protocol, text, tones.len(), hash);
        Ok(EncodedMessage {
            text: message::parser::normalize(text),
            payload,
            tones,
            hash,
            protocol,
        })
    }

    /// Slot-length audio for a tone sequence, burst centred in silence
    pub fn generate_audio(&mut self, tones: &[u8]) -> Result<Vec<f32>, EncodeError> {
        let params = self.config.modulation_params();
        self.modulator.synthesize_slot(tones, &params).context(ModulationSnafu)
    }

    #[instrument(skip(self, table))]
    pub fn encode_to_audio(
        &mut self,
        text: &str,
        table: &mut dyn CallsignHashTable,
    ) -> Result<(EncodedMessage, Vec<f32>), EncodeError> {
        let encoded = self.encode(text, table)?;
        let audio = self.generate_audio(&encoded.tones)?;
        Ok((encoded, audio))
    }
}
