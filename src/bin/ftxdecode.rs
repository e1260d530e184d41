//! FT8 / FT4 Decoder
//!
//! Decodes every message in a slot-length WAV recording.
//!
//! **Usage**:
//! ```bash
//! cargo run --bin ftxdecode -- [-4] [-c] input.wav
//! ```
//!
//! `-4` selects FT4, `-c` also lists the candidates found by the sync search.

use rustyftx::message::CallsignHashCache;
use rustyftx::{sync, tracing_init, wav, Decoder, DecoderConfig};

fn main() {
    tracing_init::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let ft4 = args.iter().skip(1).any(|a| a == "-4" || a == "--ft4");
    let show_candidates = args.iter().skip(1).any(|a| a == "-c" || a == "--candidates");
    let Some(path) = args.iter().skip(1).find(|a| !a.starts_with('-')) else {
        eprintln!("Usage: {} [-4] [-c] <input.wav>", args[0]);
        std::process::exit(1);
    };

    let audio = match wav::read_wav(path) {
        Ok(audio) => audio,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = DecoderConfig {
        sample_rate: audio.sample_rate,
        ..if ft4 { DecoderConfig::ft4() } else { DecoderConfig::default() }
    };
    let decoder = Decoder::new(config);

    let waterfall = match decoder.waterfall(&audio.samples) {
        Ok(waterfall) => waterfall,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if show_candidates {
        let candidates = sync::find_candidates(&waterfall, decoder.config().max_candidates, decoder.config().min_score);
        println!("{} candidates", candidates.len());
        for c in &candidates {
            println!(
                "  score {:4}  {:7.1} Hz  {:+6.2} s",
                c.score,
                c.frequency_hz(&waterfall),
                c.time_s(&waterfall)
            );
        }
        println!();
    }

    let mut table = CallsignHashCache::new();
    let count = decoder.decode_waterfall(&waterfall, &mut table, |m| {
        println!(
            "{:+6.2} {:7.1} {:4} {:#06x}  {:<12} {}",
            m.time_offset, m.frequency, m.score, m.hash, m.message_type.to_string(), m.text
        );
        true
    });
    println!("{} decoded", count);
}
