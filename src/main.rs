use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use roadmap_deck::compose::generate_presentation;
use roadmap_deck::config::Config;

/// Generate a branded PowerPoint roadmap deck from an Excel workbook.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Excel workbook with "Objectives" and "Roadmap" sheets
    excel_file: PathBuf,

    /// Output path (defaults to the input path with a .pptx extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if !cli.excel_file.exists() {
        eprintln!("error: file not found: {}", cli.excel_file.display());
        return ExitCode::FAILURE;
    }

    let config = Config::load_or_default();

    match generate_presentation(&cli.excel_file, cli.output.as_deref(), &config) {
        Ok(path) => {
            println!("Presentation saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
