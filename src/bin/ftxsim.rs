//! FT8 / FT4 Signal Simulator
//!
//! Writes one slot of audio carrying a message, optionally with white noise.
//!
//! Usage:
//!   ftxsim [OPTIONS] <message> <output.wav>
//!
//! Options:
//!   -4, --ft4             Use FT4 instead of FT8
//!   -f, --freq <Hz>       Frequency of tone 0 (default: 1000)
//!   -d, --delay <sec>     Burst start within the slot (default: centred)
//!   -s, --snr <dB>        Add noise for this SNR in 2500 Hz
//!   --seed <n>            Noise seed (default: 1)
//!   -h, --help            Show this help message
//!
//! Examples:
//!   ftxsim "CQ K1ABC FN42" cq.wav
//!   ftxsim -4 -f 1200 "K1ABC W9XYZ 73" ft4.wav
//!   ftxsim -s -15 "K1ABC W9XYZ -14" weak.wav

use rustyftx::message::CallsignHashCache;
use rustyftx::{simulation, tracing_init, wav, Encoder, EncoderConfig, Protocol};

struct SimConfig {
    message: String,
    output_path: String,
    protocol: Protocol,
    frequency: f32,
    delay: Option<f32>,
    snr_db: Option<f32>,
    seed: u64,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, name: &str) -> Result<T, String> {
    let raw = args.get(i).ok_or_else(|| format!("Missing value for {}", name))?;
    raw.parse().map_err(|_| format!("Invalid {} value: {}", name, raw))
}

impl SimConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut protocol = Protocol::Ft8;
        let mut frequency = 1000.0;
        let mut delay = None;
        let mut snr_db = None;
        let mut seed = 1;
        let mut message = None;
        let mut output_path = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-4" | "--ft4" => protocol = Protocol::Ft4,
                "-f" | "--freq" => {
                    i += 1;
                    frequency = parse_value(&args, i, "--freq")?;
                }
                "-d" | "--delay" => {
                    i += 1;
                    delay = Some(parse_value(&args, i, "--delay")?);
                }
                "-s" | "--snr" => {
                    i += 1;
                    snr_db = Some(parse_value(&args, i, "--snr")?);
                }
                "--seed" => {
                    i += 1;
                    seed = parse_value(&args, i, "--seed")?;
                }
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if !arg.starts_with('-') || arg.parse::<f32>().is_ok() => {
                    if message.is_none() {
                        message = Some(arg.to_string());
                    } else if output_path.is_none() {
                        output_path = Some(arg.to_string());
                    } else {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        Ok(SimConfig {
            message: message.ok_or("Missing message argument")?,
            output_path: output_path.ok_or("Missing output file argument")?,
            protocol,
            frequency,
            delay,
            snr_db,
            seed,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("FT8 / FT4 Signal Simulator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <message> <output.wav>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -4, --ft4             Use FT4 instead of FT8");
    eprintln!("  -f, --freq <Hz>       Frequency of tone 0 (default: 1000)");
    eprintln!("  -d, --delay <sec>     Burst start within the slot (default: centred)");
    eprintln!("  -s, --snr <dB>        Add noise for this SNR in 2500 Hz");
    eprintln!("  --seed <n>            Noise seed (default: 1)");
    eprintln!("  -h, --help            Show this help message");
}

fn main() -> Result<(), String> {
    tracing_init::init_tracing();
    let config = SimConfig::parse_args()?;

    let encoder_config = EncoderConfig {
        protocol: config.protocol,
        frequency: config.frequency,
        ..EncoderConfig::default()
    };
    let sample_rate = encoder_config.sample_rate;
    let mut encoder = Encoder::new(encoder_config);
    let mut table = CallsignHashCache::new();

    let encoded = encoder.encode(&config.message, &mut table).map_err(|e| e.to_string())?;
    println!("{} message: {}", encoded.protocol, encoded.text);
    println!("Type:      {}", encoded.payload.message_type());
    println!("Hash:      {:#06x}", encoded.hash);
    let tones: String = encoded.tones.iter().map(|t| char::from(b'0' + t)).collect();
    println!("Tones:     {}", tones);

    let mut audio = encoder.generate_audio(&encoded.tones).map_err(|e| e.to_string())?;
    if let Some(delay) = config.delay {
        let burst_len = encoded.tones.len() * config.protocol.samples_per_symbol(sample_rate);
        let start = (audio.len() - burst_len) / 2;
        let burst = audio[start..start + burst_len].to_vec();
        audio.fill(0.0);
        let offset = (delay.max(0.0) * sample_rate as f32) as usize;
        simulation::mix_into(&mut audio, &burst, offset, 1.0);
    }

    if let Some(snr_db) = config.snr_db {
        simulation::add_noise(&mut audio, snr_db, sample_rate, config.seed);
        simulation::normalize_peak(&mut audio, 0.9);
        println!("SNR:       {:.1} dB (seed {})", snr_db, config.seed);
    }

    wav::write_wav(&config.output_path, &audio, sample_rate).map_err(|e| e.to_string())?;
    println!("Wrote {} samples to {}", audio.len(), config.output_path);
    Ok(())
}
