//! # thaibill CLI
//!
//! Command-line interface for converting BOT bill-payment barcodes.
//!
//! ## Usage
//!
//! ```bash
//! # Show the parsed record and both payloads
//! thaibill parse "|099400016301108 50A0230680100001 0000000105542003108 20000"
//!
//! # Save QR code and barcode images
//! thaibill generate --qr qr.png --barcode barcode.png "|0994... 50A0... 0000... 20000"
//!
//! # Print data URLs instead of writing files
//! thaibill generate --blob "|0994... 50A0... 0000... 20000"
//!
//! # Start the HTTP API
//! thaibill serve --listen 0.0.0.0:8080
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` for more detail.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use thaibill::{
    ThaiBillError,
    codec::{MarkerPolicy, Warning},
    generate::{self, GenerateOptions},
    render::ErrorCorrection,
    server::{self, ServerConfig},
};

/// thaibill - Thai bill-payment QR code and barcode generator
#[derive(Parser, Debug)]
#[command(name = "thaibill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a barcode and print the record and payloads as JSON
    Parse {
        /// BOT barcode text, e.g. "|<biller> <ref1> <ref2> <satang>"
        barcode: String,

        /// Accept text without the leading '|'
        #[arg(long)]
        lenient: bool,
    },

    /// Render the QR code and barcode for a BOT barcode
    Generate {
        /// BOT barcode text, e.g. "|<biller> <ref1> <ref2> <satang>"
        barcode: String,

        /// Save the QR code PNG here
        #[arg(long, value_name = "FILE")]
        qr: Option<PathBuf>,

        /// Save the barcode PNG here
        #[arg(long = "barcode", value_name = "FILE")]
        barcode_out: Option<PathBuf>,

        /// Return data URLs instead of writing files
        #[arg(long)]
        blob: bool,

        /// Accept text without the leading '|'
        #[arg(long)]
        lenient: bool,

        /// QR image width in pixels
        #[arg(long)]
        qr_width: Option<u32>,

        /// Leave out the text line under the barcode
        #[arg(long)]
        no_text: bool,

        /// QR error correction level
        #[arg(long, value_enum, ignore_case = true)]
        ec_level: Option<ErrorCorrection>,

        /// JSON options file (flags override its values)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ThaiBillError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { barcode, lenient } => {
            let mut options = GenerateOptions::default();
            if lenient {
                options.codec.marker_policy = MarkerPolicy::Lenient;
            }
            let generated = generate::generate(&barcode, &options)?;
            warn_all(&generated.warnings);
            print_json(&generated)?;
        }

        Commands::Generate {
            barcode,
            qr,
            barcode_out,
            blob,
            lenient,
            qr_width,
            no_text,
            ec_level,
            options,
        } => {
            let mut options = match options {
                Some(path) => GenerateOptions::from_json_file(&path)?,
                None => GenerateOptions::default(),
            };
            if qr.is_some() {
                options.qr_output_path = qr;
            }
            if barcode_out.is_some() {
                options.barcode_output_path = barcode_out;
            }
            if blob {
                options.return_blob = true;
            }
            if lenient {
                options.codec.marker_policy = MarkerPolicy::Lenient;
            }
            if let Some(width) = qr_width {
                options.qr_style.width = width;
            }
            if no_text {
                options.barcode_style.show_text = false;
            }
            if let Some(level) = ec_level {
                options.qr_style.error_correction = level;
            }

            let generated = generate::generate(&barcode, &options)?;
            warn_all(&generated.warnings);
            print_json(&generated)?;
        }

        Commands::Serve { listen } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(ServerConfig {
                listen_addr: listen,
                ..Default::default()
            }))?;
        }
    }

    Ok(())
}

fn warn_all(warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!(%warning, "barcode diagnostic");
    }
}

/// Pretty-print a result as JSON on stdout
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ThaiBillError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ThaiBillError::Config(format!("Failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}
