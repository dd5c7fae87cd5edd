//! jsontlv CLI — JSON lines -> TLV conversion.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use jsontlv::{encode_stream, EncodeSummary, EncoderOptions};
use log::info;
use std::fs::File;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsontlv", about = "Encode JSON lines to dictionary-keyed TLV")]
struct Cli {
    /// Input file, one JSON object per line
    input: String,

    /// Output file (written as <OUTPUT>.tmp and renamed on success)
    output: String,

    /// Abort on the first malformed line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Maximum string payload length in bytes (including the terminator)
    #[arg(long, value_name = "N")]
    max_value_length: Option<u32>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_options(&self) -> EncoderOptions {
        let mut opts = EncoderOptions::default();
        opts.set_strict(self.strict);
        opts.set_max_value_length(self.max_value_length);
        opts
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Logs gehen nach stderr; `log`-Records der Library werden mit erfasst.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let opts = cli.to_options();
    opts.validate().map_err(|e| e.to_string())?;

    let input = File::open(&cli.input)
        .map_err(|e| format!("cannot open input file '{}': {e}", cli.input))?;

    let summary = write_to_output(&cli.output, |tmp| {
        let file = File::create(tmp)
            .map_err(|e| format!("cannot create output file '{}': {e}", tmp.display()))?;
        encode_stream(input, file, &opts).map_err(|e| e.to_string())
    })?;

    info!(
        "wrote {}: {} records, {} skipped, {} keys, {} bytes",
        cli.output, summary.stats.records, summary.stats.skipped, summary.keys, summary.bytes_written
    );
    Ok(())
}

/// Schreibt atomar in eine Datei (tmp+rename).
///
/// Bei Fehler wird die tmp-Datei geloescht, das Ziel bleibt unveraendert.
fn write_to_output(
    output_path: &str,
    write_fn: impl FnOnce(&Path) -> Result<EncodeSummary, String>,
) -> Result<EncodeSummary, String> {
    let tmp_path = format!("{output_path}.tmp");
    let summary = match write_fn(Path::new(&tmp_path)) {
        Ok(summary) => summary,
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
    };
    std::fs::rename(&tmp_path, output_path)
        .map_err(|e| format!("cannot rename '{tmp_path}' to '{output_path}': {e}"))?;
    Ok(summary)
}
