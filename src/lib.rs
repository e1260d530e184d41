//! FT8 / FT4 modem core
//!
//! ```text
//! TX: text → message::encode → channel::encode_tones → pulse::Modulator → audio
//! RX: audio → waterfall → sync::find_candidates → demod → ldpc::decode → crc → message::decode → text
//! ```
//!
//! ```
//! use rustyftx::{Decoder, DecoderConfig, Encoder, EncoderConfig};
//! use rustyftx::message::CallsignHashCache;
//!
//! let mut table = CallsignHashCache::new();
//! let mut encoder = Encoder::new(EncoderConfig::default());
//! let (_, audio) = encoder.encode_to_audio("CQ K1ABC FN42", &mut table).unwrap();
//!
//! let messages = Decoder::new(DecoderConfig::default()).decode(&audio, &mut table).unwrap();
//! assert_eq!(messages[0].text, "CQ K1ABC FN42");
//! ```

pub mod channel;
pub mod crc;
pub mod decoder;
pub mod demod;
pub mod encoder;
pub mod ldpc;
pub mod message;
pub mod protocol;
pub mod pulse;
pub mod simulation;
pub mod symbol;
pub mod sync;
pub mod tracing_init;
pub mod waterfall;
pub mod wav;

pub use decoder::{DecodeError, DecodeStatus, DecodedMessage, Decoder, DecoderConfig};
pub use encoder::{EncodeError, EncodedMessage, Encoder, EncoderConfig};
pub use message::{decode, encode, CallsignHashCache, CallsignHashTable, MessageError, MessageType, Payload};
pub use protocol::{Protocol, ProtocolConstants};
