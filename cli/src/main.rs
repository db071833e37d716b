mod report;
mod server;
mod wav;

use clap::{Parser, Subcommand};
use magswipe_core::{
    split_swipes, DecoderConfig, EncoderConfig, SwipeDetectorConfig, Track2Decoder,
    Track2Encoder, SAMPLE_RATE,
};
use report::DecodeSummary;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "magswipe")]
#[command(about = "Decode magnetic stripe track 2 swipes from audio recordings")]
struct Cli {
    /// Log pipeline details (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct ThresholdArgs {
    /// Fraction of the loudest sample that ends the leading quiet region
    #[arg(long, default_value_t = magswipe_core::QUIET_THRESHOLD_FACTOR)]
    quiet_factor: f64,

    /// Fraction of the loudest sample used as the first peak threshold
    #[arg(long, default_value_t = magswipe_core::INITIAL_PEAK_FACTOR)]
    initial_peak_factor: f64,

    /// Fraction of the previous peak used as the next peak threshold
    #[arg(long, default_value_t = magswipe_core::PEAK_DECAY_FACTOR)]
    peak_decay_factor: f64,
}

impl ThresholdArgs {
    fn decoder(self) -> magswipe_core::Result<Track2Decoder> {
        Track2Decoder::with_config(DecoderConfig {
            quiet_threshold_factor: self.quiet_factor,
            initial_peak_factor: self.initial_peak_factor,
            peak_decay_factor: self.peak_decay_factor,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one swipe from a WAV file
    Decode {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Do not retry with the samples reversed when the forward decode fails
        #[arg(long)]
        no_reverse: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Write a synthetic swipe of track 2 data to a WAV file
    Encode {
        /// Card data without sentinels, e.g. 4111111111111111=2512
        #[arg(value_name = "DATA")]
        data: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Bit cell length at the start of the swipe, in samples
        #[arg(long, default_value = "30")]
        samples_per_bit: f64,

        /// Bit cell length at the end of the swipe (defaults to the start length)
        #[arg(long)]
        end_samples_per_bit: Option<f64>,

        /// Peak pulse amplitude
        #[arg(long, default_value = "16000")]
        amplitude: i16,

        /// Write the swipe backwards, as if the card was pulled the other way
        #[arg(long)]
        reverse: bool,
    },

    /// Split a long recording into swipes and decode each one
    Scan {
        /// Input WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Sample magnitude that counts as signal
        #[arg(long, default_value = "655")]
        activity_threshold: i32,

        /// Seconds of quiet that end a swipe
        #[arg(long, default_value = "0.25")]
        quiet_seconds: f64,

        /// Longest swipe in seconds; louder stretches are cut into pieces
        #[arg(long, default_value = "10")]
        max_swipe_seconds: f64,

        /// Print one JSON object per swipe
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Serve decoding over HTTP (POST a WAV file to /decode)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };

    match cli.command {
        Commands::Decode {
            input,
            no_reverse,
            json,
            thresholds,
        } => {
            init_env_logger(default_level);
            let ok = decode_command(&input, !no_reverse, json, thresholds)?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Encode {
            data,
            output,
            samples_per_bit,
            end_samples_per_bit,
            amplitude,
            reverse,
        } => {
            init_env_logger(default_level);
            let config = EncoderConfig {
                samples_per_bit,
                end_samples_per_bit: end_samples_per_bit.unwrap_or(samples_per_bit),
                amplitude,
                ..EncoderConfig::default()
            };
            encode_command(&data, &output, config, reverse)?
        }
        Commands::Scan {
            input,
            activity_threshold,
            quiet_seconds,
            max_swipe_seconds,
            json,
            thresholds,
        } => {
            init_env_logger(default_level);
            let gate = SwipeDetectorConfig {
                quiet_threshold: activity_threshold,
                quiet_wait_samples: (SAMPLE_RATE as f64 * quiet_seconds) as usize,
                max_swipe_samples: (SAMPLE_RATE as f64 * max_swipe_seconds) as usize,
            };
            scan_command(&input, gate, json, thresholds)?
        }
        Commands::Serve { addr, thresholds } => {
            init_tracing(if cli.verbose { "debug" } else { "info" });
            let decoder = thresholds.decoder()?;
            tokio::runtime::Runtime::new()?.block_on(server::run(addr, decoder))?
        }
    }

    Ok(())
}

fn init_env_logger(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Returns whether the swipe decoded
fn decode_command(
    input_path: &Path,
    allow_reverse: bool,
    json: bool,
    thresholds: ThresholdArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let capture = wav::read_wav_file(input_path)?;
    log::info!(
        "Extracted {} samples from {} Hz, {} channel audio",
        capture.samples.len(),
        capture.source_rate,
        capture.source_channels
    );

    let decoder = thresholds.decoder()?;
    let swipe = if allow_reverse {
        decoder.decode_bidirectional(&capture.samples)
    } else {
        magswipe_core::SwipeDecode {
            direction: magswipe_core::Direction::Forward,
            report: decoder.analyze(&capture.samples),
            forward_failure: None,
        }
    };

    let summary = DecodeSummary::new(&swipe, capture.samples.len());
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render());
    }

    Ok(summary.success)
}

fn encode_command(
    data: &str,
    output_path: &Path,
    config: EncoderConfig,
    reverse: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoder = Track2Encoder::with_config(config)?;
    let mut samples = encoder.encode(data)?;
    if reverse {
        samples.reverse();
    }
    println!(
        "Encoded {} characters to {} audio samples",
        data.chars().count(),
        samples.len()
    );

    std::fs::write(output_path, wav::wav_bytes(&samples, SAMPLE_RATE)?)?;
    println!("Wrote {}", output_path.display());
    Ok(())
}

fn scan_command(
    input_path: &Path,
    gate: SwipeDetectorConfig,
    json: bool,
    thresholds: ThresholdArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let capture = wav::read_wav_file(input_path)?;
    let decoder = thresholds.decoder()?;
    let swipes = split_swipes(&capture.samples, gate)?;
    if !json {
        println!("Found {} swipes in {} samples", swipes.len(), capture.samples.len());
    }

    for (n, swipe) in swipes.iter().enumerate() {
        let summary = DecodeSummary::new(&decoder.decode_bidirectional(swipe), swipe.len());
        if json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!("--- swipe {} ---\n{}\n", n + 1, summary.render());
        }
    }

    Ok(())
}
