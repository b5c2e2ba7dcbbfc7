//! A CLI tool which reads a DICOM file and writes it back,
//! structurally unchanged: group lengths are recomputed,
//! reserved header bytes are zeroed, and elements come out
//! in ascending tag order.
use clap::Parser;
use dcmio_object::open_file;
use snafu::Report;
use std::path::PathBuf;

/// Read a DICOM file and write it back unchanged
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The DICOM file to read
    #[clap(short = 'i', long = "input")]
    input: PathBuf,
    /// The path of the rewritten file
    #[clap(short = 'o', long = "output")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let app = App::try_parse().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let obj = open_file(&app.input).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(1);
    });

    if let Err(e) = obj.save(&app.output) {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
