//! Dump a SIS package as JSON.
//!
//! Reads the package from the path given as the first argument, or from
//! stdin when no path is given.

use sisinfo::SisFile;
use std::error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let sis = match std::env::args().nth(1) {
        Some(path) => SisFile::from_reader(BufReader::new(File::open(path)?))?,
        None => SisFile::from_reader(io::stdin().lock())?,
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, &sis)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
