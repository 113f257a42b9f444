//! hk-rtd - Housekeeping RTD log tool
//!
//! Usage:
//!   hk-rtd decode <file> [--json]          - Decode a log, print per-chip summary
//!   hk-rtd scan <dir> [--name <file>]      - Find and decode every log under a directory
//!   hk-rtd flags <file>                    - Per-sensor flag bit histogram
//!   hk-rtd report <file> [--chip <n>]      - Derived series as JSON
//!   hk-rtd notes <file> [--log-dir <dir>]  - Parse an operator notes file
//!   hk-rtd strip <packets> --output <log>  - Strip bench headers into a raw log

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hk_telemetry::common::{CommonArgs, DecodeArgs, HkError, HkResult};
use hk_telemetry::config::Config;
use hk_telemetry::decoder::labels::{display_range, sensor_labels, FlagBit};
use hk_telemetry::decoder::{ChipId, RtdDecoder, UnknownChipPolicy};
use hk_telemetry::packet;
use hk_telemetry::report::{parse_notes, ChipReport, ChipSummary, FLAG_BITS};
use hk_telemetry::session::{self, RtdLog};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hk-rtd")]
#[command(about = "Housekeeping RTD log decoder")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a log and print a per-chip summary
    Decode {
        #[command(flatten)]
        args: DecodeArgs,

        /// Print all decoded records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find and decode every log under a directory
    Scan {
        /// Directory to search recursively
        directory: PathBuf,

        /// Log file name (default from config)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print the flag bit histogram of each sensor
    Flags {
        #[command(flatten)]
        args: DecodeArgs,
    },

    /// Print derived series as JSON
    Report {
        #[command(flatten)]
        args: DecodeArgs,

        /// Only report one chip (1 or 2)
        #[arg(short, long)]
        chip: Option<u8>,
    },

    /// Parse an operator notes file
    Notes {
        /// Notes file (`HH:MM:SS - text` per line)
        file: PathBuf,

        /// Run directory; notes are placed on the day its logs started
        #[arg(short, long)]
        log_dir: Option<PathBuf>,

        /// Run date (YYYY-MM-DD), overrides the day found under --log-dir
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Strip bench packet headers from a capture into a raw RTD log
    Strip {
        /// File of concatenated 50-byte RTD bench packets
        file: PathBuf,

        /// Output raw log path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hk_telemetry=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.common.config_file)
        .with_context(|| format!("loading {}", cli.common.config_file))?;

    match cli.command {
        Commands::Decode { args, json } => {
            let log = load(&config, &cli.common, &args)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&log.streams)?);
            } else {
                print_summary(&log);
            }
        }
        Commands::Scan { directory, name } => {
            let name = name.unwrap_or_else(|| config.session.log_name.clone());
            scan(&config, &cli.common, &directory, &name)?;
        }
        Commands::Flags { args } => {
            let log = load(&config, &cli.common, &args)?;
            print_flags(&log);
        }
        Commands::Report { args, chip } => {
            let log = load(&config, &cli.common, &args)?;
            report(&log, chip)?;
        }
        Commands::Notes {
            file,
            log_dir,
            date,
        } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            notes(&config, &text, log_dir.as_deref(), date)?;
        }
        Commands::Strip { file, output } => {
            strip(&file, &output).with_context(|| format!("stripping {}", file.display()))?;
        }
    }

    Ok(())
}

fn build_decoder(config: &Config, common: &CommonArgs, skip_unknown: bool) -> RtdDecoder {
    let mut decoder = config.decoder();
    if common.dump {
        decoder.set_dump_enabled(true);
    }
    if skip_unknown {
        let mut rtd = decoder.config().clone();
        rtd.on_unknown_chip = UnknownChipPolicy::Skip;
        decoder = RtdDecoder::new(rtd);
    }
    decoder
}

fn load(config: &Config, common: &CommonArgs, args: &DecodeArgs) -> HkResult<RtdLog> {
    let decoder = build_decoder(config, common, args.skip_unknown);
    Ok(RtdLog::load(&args.file, &decoder)?)
}

fn report(log: &RtdLog, chip: Option<u8>) -> HkResult<()> {
    let chips = match chip {
        Some(id) => vec![ChipId::try_from(id)
            .map_err(|v| HkError::other(format!("chip must be 1 or 2, got {}", v)))?],
        None => ChipId::ALL.to_vec(),
    };
    let reports: Vec<ChipReport> = chips
        .into_iter()
        .map(|c| ChipReport::build(c, &log.streams[c], log.start))
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn notes(
    config: &Config,
    text: &str,
    log_dir: Option<&Path>,
    date: Option<NaiveDate>,
) -> HkResult<()> {
    let day = match (date, log_dir) {
        (Some(day), _) => Some(day),
        (None, Some(dir)) => {
            let day = session::run_date(dir, &config.session.log_name)?;
            if day.is_none() {
                warn!(dir = %dir.display(), "No run start found, printing times of day only");
            }
            day
        }
        (None, None) => None,
    };

    for note in parse_notes(text, config.notes.max_note_length)? {
        match day {
            Some(day) => println!("{}  {}", note.at(day), note.text),
            None => println!("{}  {}", note.time, note.text),
        }
    }
    Ok(())
}

fn strip(file: &Path, output: &Path) -> HkResult<()> {
    let packets = std::fs::read(file)?;
    let log = packet::unwrap_rtd_packets(&packets)?;
    std::fs::write(output, &log)?;
    info!(
        input = %file.display(),
        output = %output.display(),
        frames = log.len() / packet::FRAMESIZE_RTD,
        "Stripped bench headers"
    );
    Ok(())
}

fn scan(config: &Config, common: &CommonArgs, directory: &Path, name: &str) -> HkResult<()> {
    let decoder = build_decoder(config, common, false);
    let logs = session::load_all(directory, name, &decoder)?;

    if logs.is_empty() {
        println!("No {} files found under {}", name, directory.display());
        return Ok(());
    }

    println!(
        "{:<60} {:<20} {:>8} {:>8}",
        "File", "Start", "Chip 1", "Chip 2"
    );
    println!("{}", "-".repeat(99));
    for log in &logs {
        let start = log
            .start
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<60} {:<20} {:>8} {:>8}",
            log.path.display(),
            start,
            log.streams.chip1.len(),
            log.streams.chip2.len()
        );
    }
    Ok(())
}

fn print_summary(log: &RtdLog) {
    println!("File: {}", log.path.display());
    match log.start {
        Some(start) => println!("Start: {}", start),
        None => println!("Start: unknown"),
    }
    if !log.streams.skipped.is_empty() {
        println!("Skipped frames: {}", log.streams.skipped.len());
    }

    for chip in ChipId::ALL {
        let summary = ChipSummary::of(chip, &log.streams[chip]);
        println!();
        println!("=== {} ===", chip);
        println!("  Records:        {}", summary.records);
        if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp) {
            println!("  Timestamps:     {} .. {}", first, last);
        }
        println!("  Valid readings: {:.1}%", summary.valid_fraction * 100.0);
        let (lo, hi) = display_range(chip);
        println!("  Nominal range:  {} .. {} ºC", lo, hi);
        for (label, range) in sensor_labels(chip).iter().zip(summary.temp_range.iter()) {
            match range {
                Some((lo, hi)) => println!("  {:<28} {:8.3} .. {:8.3} ºC", label, lo, hi),
                None => println!("  {:<28} no valid readings", label),
            }
        }
    }
}

fn print_flags(log: &RtdLog) {
    for chip in ChipId::ALL {
        let report = ChipReport::build(chip, &log.streams[chip], log.start);
        println!("=== {} ({} records) ===", chip, report.len());

        print!("{:<28}", "Sensor");
        for bit in FlagBit::ALL {
            print!(" {:>8}", format!("b{}", bit.bit()));
        }
        println!();

        for (label, counts) in sensor_labels(chip).iter().zip(report.flag_counts.iter()) {
            print!("{:<28}", label);
            for count in counts.iter().take(FLAG_BITS) {
                print!(" {:>8}", count);
            }
            println!();
        }
        println!();
    }

    println!("Bits:");
    for bit in FlagBit::ALL {
        println!("  b{} = {}", bit.bit(), bit);
    }
}
