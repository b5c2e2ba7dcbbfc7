//! A CLI tool for inspecting the contents of a DICOM file
//! by printing it in a human readable format.
use clap::Parser;
use dcmio_dump::DumpOptions;
use dcmio_object::open_file;
use snafu::Report;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Dump the contents of a DICOM file
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The DICOM file to read
    #[clap(short = 'i', long = "input")]
    input: PathBuf,
    /// Print text values to the end
    #[clap(long = "no-text-limit")]
    no_text_limit: bool,
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

    let mut options = DumpOptions::new();
    options.no_text_limit(app.no_text_limit);
    let mut stdout = std::io::stdout();
    if let Err(e) = options.dump_file(&mut stdout, &obj) {
        if e.kind() == ErrorKind::BrokenPipe {
            // handle broken pipe separately with a no-op
        } else {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
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
