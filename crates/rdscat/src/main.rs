//! Replay RDS captures as JSON lines.
//!
//! Two input formats are supported:
//! - a raw demodulated bit stream as ASCII `0`/`1` characters (whitespace
//!   ignored), the default;
//! - with `--hex`, RDS-Spy-style group lines: four hex words per line,
//!   `----` for blocks that were not received, trailing metadata ignored.
//!
//! # Usage examples
//!
//! ```bash
//! rdscat bits.txt
//! rdscat --hex capture.txt
//! some-demodulator | rdscat -
//! rdscat --hex --show-partial --show-raw capture.txt -vv
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::warn;

use sidecarrier::{Group, Options, Receiver};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay RDS captures (bit streams or hex groups) as JSON lines", long_about = None)]
struct Args {
    /// Input file, or "-" for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Input is a hex group capture instead of a bit stream
    #[arg(long)]
    hex: bool,

    /// Also emit incomplete PS / RadioText / AF lists
    #[arg(long)]
    show_partial: bool,

    /// Attach the raw group as hex to every message
    #[arg(long)]
    show_raw: bool,

    /// Attach the reception timestamp to every message
    #[arg(long)]
    timestamp: bool,

    /// Verbosity level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> sidecarrier::Result<()> {
    let args = Args::parse();

    // 0 = WARN (quiet), 1 = INFO, 2 = DEBUG, 3+ = TRACE
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .try_init();

    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    let mut receiver = Receiver::new(Options {
        show_partial: args.show_partial,
        show_raw: args.show_raw,
        timestamp: args.timestamp,
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.hex {
        replay_hex(reader, &mut receiver, &mut out)?;
    } else {
        replay_bits(reader, &mut receiver, &mut out)?;
    }

    Ok(())
}

fn replay_hex(
    reader: Box<dyn BufRead>,
    receiver: &mut Receiver,
    out: &mut impl Write,
) -> sidecarrier::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match Group::parse_hex(&line) {
            Ok(group) => {
                if let Some(message) = receiver.process_group(group) {
                    writeln!(out, "{message}")?;
                }
            }
            Err(e) => warn!("skipping line: {e}"),
        }
    }
    Ok(())
}

fn replay_bits(
    reader: Box<dyn BufRead>,
    receiver: &mut Receiver,
    out: &mut impl Write,
) -> sidecarrier::Result<()> {
    for byte in reader.bytes() {
        match byte? {
            b'0' => {
                if let Some(message) = receiver.push_bit(false) {
                    writeln!(out, "{message}")?;
                }
            }
            b'1' => {
                if let Some(message) = receiver.push_bit(true) {
                    writeln!(out, "{message}")?;
                }
            }
            c if c.is_ascii_whitespace() => {}
            c => warn!("ignoring unexpected byte 0x{c:02X} in bit stream"),
        }
    }

    // End of stream: surface whatever partial group is in flight.
    if let Some(message) = receiver.flush() {
        writeln!(out, "{message}")?;
    }
    Ok(())
}
