//! tlvdump CLI — prints the entries of a jsontlv output file.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use jsontlv::{Entry, KeyDictionary, TlvStreamReader};
use std::io::{self, BufWriter, Write};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tlvdump", about = "Print the pairs and the dictionary of a TLV file")]
struct Cli {
    /// TLV file produced by jsontlv
    file: String,

    /// Maximum accepted string payload length in bytes
    #[arg(long, value_name = "N")]
    max_value_length: Option<u32>,

    /// Only print the dictionary block
    #[arg(long)]
    keys_only: bool,
}

/// Besitzer der Eingabedaten. Haelt entweder eine Mmap oder einen Vec<u8> am Leben,
/// damit der zurueckgegebene &[u8] Slice gueltig bleibt.
enum DumpInput {
    #[cfg_attr(feature = "mmap", allow(dead_code))]
    Buf(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mmap(memmap2::Mmap),
}

impl std::ops::Deref for DumpInput {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            DumpInput::Buf(v) => v,
            #[cfg(feature = "mmap")]
            DumpInput::Mmap(m) => m,
        }
    }
}

/// Laedt die Datei Memory-Mapped (nur benoetigte Seiten im RAM).
#[cfg(feature = "mmap")]
fn load_input(path: &str) -> Result<DumpInput, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("cannot read '{path}': {e}"))?;
    // SAFETY: die Datei wird waehrend des Dumps nicht von uns veraendert
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| format!("cannot map '{path}': {e}"))?;
    Ok(DumpInput::Mmap(mmap))
}

#[cfg(not(feature = "mmap"))]
fn load_input(path: &str) -> Result<DumpInput, String> {
    let buf = std::fs::read(path).map_err(|e| format!("cannot read '{path}': {e}"))?;
    Ok(DumpInput::Buf(buf))
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let input = load_input(&cli.file)?;
    let data: &[u8] = &input;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut keys = Vec::new();
    let mut fields = 0u64;

    let reader = TlvStreamReader::new(data).with_max_value_length(cli.max_value_length);
    for entry in reader {
        match entry.map_err(|e| e.to_string())? {
            Entry::Field { id, value } => {
                fields += 1;
                if !cli.keys_only {
                    writeln!(out, "field {id:>5}  {value}").map_err(write_error)?;
                }
            }
            Entry::Key { name, id } => keys.push((name, id)),
        }
    }

    // Konsistenz pruefen (fortlaufende IDs, keine Duplikate)
    let dictionary = KeyDictionary::from_entries(keys).map_err(|e| e.to_string())?;
    writeln!(out, "dictionary: {} keys, {} fields", dictionary.len(), fields).map_err(write_error)?;
    for (name, id) in dictionary.iter() {
        writeln!(out, "key {id:>5}  {name}").map_err(write_error)?;
    }
    out.flush().map_err(write_error)
}

fn write_error(e: io::Error) -> String {
    format!("cannot write to stdout: {e}")
}
