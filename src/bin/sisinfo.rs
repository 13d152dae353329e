//! Inspect a SIS installation package.
//!
//! `structure` prints the decoded field tree, `info` lists the files the
//! package installs, and `extract` writes those files out to a directory.

use sisinfo::{Field, SisFile};
use std::error;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <structure|info|extract> <file> [dir]", args[0]);
        std::process::exit(1);
    }

    let command = &args[1];
    let file_path = &args[2];

    let file = File::open(file_path)?;
    let sis = SisFile::from_reader(BufReader::new(file))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command.as_str() {
        "structure" => print_structure(&sis, &mut out)?,
        "info" => print_info(&sis, &mut out)?,
        "extract" => {
            let dir = args.get(3).map(String::as_str).unwrap_or(".");
            extract(&sis, Path::new(dir))?;
        }
        _ => {
            eprintln!(
                "Error: command must be 'structure', 'info', or 'extract', got '{}'",
                command
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_structure<W: Write>(sis: &SisFile, out: &mut W) -> io::Result<()> {
    writeln!(out, "ROOT")?;

    let mut result = Ok(());
    sis.traverse(&mut |field: &Field, depth: usize| {
        if result.is_ok() {
            result = writeln!(
                out,
                "{}{} {}",
                "  ".repeat(depth),
                field.field_type(),
                field.readable_str()
            );
        }
    });
    result
}

fn print_info<W: Write>(sis: &SisFile, out: &mut W) -> io::Result<()> {
    for file in sis.files() {
        write!(out, "   {}", file.target())?;
        if let Some(caps) = file.capabilities() {
            write!(out, " [{}]", caps.join(" "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn extract(sis: &SisFile, dir: &Path) -> Result<(), Box<dyn error::Error>> {
    fs::create_dir_all(dir)?;
    for file in sis.files() {
        let Some(name) = file.file_name() else {
            if !file.target().ends_with('\\') {
                tracing::warn!(path = file.target(), "skipping file without a usable name");
            }
            continue;
        };

        let Some(contents) = file.contents() else {
            tracing::warn!(path = file.target(), "no file data for description");
            continue;
        };

        let path = dir.join(name);
        tracing::info!(path = %path.display(), len = contents.len(), "extracting");
        fs::write(path, contents)?;
    }
    Ok(())
}
