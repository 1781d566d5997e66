//! Encode and decode messages from the command line.
//!
//! Usage:
//!   msgdesc serialize '{"id":12}' -s user.schema -n User -e hex
//!   msgdesc deserialize 0100000001000000... -s user.schema -n User
//!   msgdesc stringify '{"id":12}' -s user.schema -n User
//!   msgdesc destringify '{"1":12}' -s user.schema -n User
//!
//! Logging goes to stderr; set RUST_LOG or pass --verbose.

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use msgdesc::{deserialize_text, parse, serialize_text, BinaryCodec, MessageDescriptor, Schema};
use serde_json::Value as Json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "msgdesc", about = "Descriptor-driven message codecs")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name-keyed JSON to binary.
    Serialize {
        json: String,
        #[command(flatten)]
        target: Target,
        #[arg(short, long, value_enum, default_value_t = Encoding::Hex)]
        encoding: Encoding,
        /// Scratch buffer capacity in bytes.
        #[arg(long, default_value_t = msgdesc::DEFAULT_CAPACITY)]
        max_bytes: usize,
    },
    /// Binary to name-keyed JSON.
    Deserialize {
        encoded: String,
        #[command(flatten)]
        target: Target,
        #[arg(short, long, value_enum, default_value_t = Encoding::Hex)]
        encoding: Encoding,
    },
    /// Name-keyed JSON to index-keyed JSON.
    Stringify {
        json: String,
        #[command(flatten)]
        target: Target,
    },
    /// Index-keyed JSON to name-keyed JSON.
    Destringify {
        text: String,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
struct Target {
    /// Schema file.
    #[arg(short, long)]
    schema: PathBuf,
    /// Message type name.
    #[arg(short = 'n', long = "message")]
    message: String,
}

impl Target {
    fn load(&self) -> Result<Arc<MessageDescriptor>> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("reading schema {}", self.schema.display()))?;
        let schema = Schema::parse(&source)
            .with_context(|| format!("parsing schema {}", self.schema.display()))?;
        schema.message(&self.message).ok_or_else(|| {
            let known: Vec<&str> = schema.message_names().collect();
            anyhow!("unknown message {} (schema declares: {})", self.message, known.join(", "))
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    Hex,
    Base64,
}

impl Encoding {
    fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Hex => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
            Encoding::Base64 => STANDARD.encode(bytes),
        }
    }

    fn decode(self, text: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        match self {
            Encoding::Hex => decode_hex(text),
            Encoding::Base64 => STANDARD.decode(text).context("invalid base64"),
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        bail!("hex input has odd length {}", text.len());
    }
    text.as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            if !pair.iter().all(u8::is_ascii_hexdigit) {
                bail!("invalid hex {:?} at offset {}", String::from_utf8_lossy(pair), i * 2);
            }
            let digits = std::str::from_utf8(pair).map_err(|_| anyhow!("invalid hex at offset {}", i * 2))?;
            u8::from_str_radix(digits, 16).map_err(|_| anyhow!("invalid hex {:?} at offset {}", digits, i * 2))
        })
        .collect()
}

fn read_json(text: &str) -> Result<Json> {
    serde_json::from_str(text).context("input is not valid JSON")
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serialize {
            json,
            target,
            encoding,
            max_bytes,
        } => {
            let descriptor = target.load()?;
            let message = parse(&read_json(&json)?, &descriptor);
            let mut codec = BinaryCodec::with_capacity(max_bytes);
            let bytes = codec
                .serialize(message.as_ref(), &descriptor)
                .with_context(|| format!("encoding {}", descriptor.name()))?;
            println!("{}", encoding.encode(&bytes));
        }
        Commands::Deserialize {
            encoded,
            target,
            encoding,
        } => {
            let descriptor = target.load()?;
            let bytes = encoding.decode(&encoded)?;
            let message = msgdesc::deserialize_binary(Some(bytes.as_slice()), &descriptor)
                .with_context(|| format!("decoding {}", descriptor.name()))?;
            println!("{}", message.map_or(Json::Null, |m| m.to_json(&descriptor)));
        }
        Commands::Stringify { json, target } => {
            let descriptor = target.load()?;
            let message = parse(&read_json(&json)?, &descriptor)
                .ok_or_else(|| anyhow!("input is not a JSON object"))?;
            println!("{}", serialize_text(&message, &descriptor));
        }
        Commands::Destringify { text, target } => {
            let descriptor = target.load()?;
            let message = deserialize_text(&text, &descriptor)
                .with_context(|| format!("decoding {}", descriptor.name()))?;
            println!("{}", message.map_or(Json::Null, |m| m.to_json(&descriptor)));
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
