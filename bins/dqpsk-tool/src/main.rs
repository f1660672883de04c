use clap::Parser;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use dqpsk_config::{InputFormat, ToolConfig, toml_config};
use dqpsk_core::{BitBuffer, debug};
use dqpsk_modem::{IqFormat, encode_bitbuffer, write_symbols};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pi/4-DQPSK burst modulator",
    long_about = "Maps burst bits to differential 8-PSK I/Q symbols, preceded by a reference symbol at phase 0"
)]
struct Args {
    /// Raw bitstring to modulate
    #[arg(help = "Bitstring of '0'/'1' characters. Read from --input or stdin if absent")]
    bitstring: Option<String>,

    #[arg(short = 'c', long = "config", help = "TOML config file")]
    config: Option<String>,

    #[arg(short = 'i', long = "input", help = "Read bits from file instead")]
    input: Option<String>,

    #[arg(long = "bytes", help = "Input file holds packed bytes (MSB first) instead of a bitstring")]
    bytes: bool,

    #[arg(
        short = 'f',
        long = "format",
        help = "Output format: [ text | cf32 | cf64 ]"
    )]
    format: Option<String>,

    #[arg(short = 'o', long = "output", help = "Write symbols to file instead of stdout")]
    output: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Trace every symbol on stderr and in the debug log")]
    verbose: bool,
}

/// Load the config file if given, then apply command line overrides on top
fn build_config(args: &Args) -> Result<ToolConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => toml_config::from_file(path)
            .map_err(|e| format!("Failed to load configuration from {}: {}", path, e))?,
        None => ToolConfig::default(),
    };

    if let Some(input) = &args.input {
        cfg.input.file = Some(input.clone());
    }
    if args.bytes {
        cfg.input.format = InputFormat::Bytes;
    }
    if let Some(name) = &args.format {
        cfg.output.format = IqFormat::from_name(name)
            .ok_or_else(|| format!("Unsupported output format '{}'. Use: text, cf32, cf64", name))?;
    }
    if let Some(output) = &args.output {
        cfg.output.file = Some(output.clone());
    }
    Ok(cfg)
}

/// Parse raw input contents according to the configured input format
fn parse_bits(contents: Vec<u8>, format: InputFormat) -> Result<BitBuffer, Box<dyn Error>> {
    match format {
        InputFormat::Bitstr => {
            let text = String::from_utf8(contents)?;
            Ok(BitBuffer::from_bitstr(&text)?)
        }
        InputFormat::Bytes => Ok(BitBuffer::from_vec(contents)),
    }
}

fn read_bits(args: &Args, cfg: &ToolConfig) -> Result<BitBuffer, Box<dyn Error>> {
    if let Some(bitstring) = &args.bitstring {
        return Ok(BitBuffer::from_bitstr(bitstring)?);
    }

    let mut contents = Vec::new();
    match &cfg.input.file {
        Some(path) => {
            File::open(path)
                .map_err(|e| format!("Failed to open input {}: {}", path, e))?
                .read_to_end(&mut contents)?;
        }
        None => {
            io::stdin().lock().read_to_end(&mut contents)?;
        }
    }
    parse_bits(contents, cfg.input.format)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let cfg = build_config(&args)?;

    let _log_guard = debug::setup_logging_default(args.verbose, cfg.debug_log.clone())?;

    let bits = read_bits(&args, &cfg)?;
    tracing::info!("modulating {} bits", bits.get_len());

    let symbols = encode_bitbuffer(&bits)?;
    tracing::info!("-> {} symbols as {:?}", symbols.len(), cfg.output.format);

    let mut writer: Box<dyn Write> = match &cfg.output.file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    write_symbols(&mut writer, &symbols, cfg.output.format)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
