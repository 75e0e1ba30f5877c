use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "manga-translator-rust",
    version,
    about = "Overlay translated manga text onto page images"
)]
struct Cli {
    /// HTML document to annotate (reads stdin when omitted)
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Translation mode passed through to the backend (default from settings)
    #[arg(short = 'm', long = "mode")]
    mode: Option<String>,

    /// Translation backend base URL (default from settings)
    #[arg(short = 'a', long = "api-url")]
    api_url: Option<String>,

    /// Remove existing overlays instead of translating
    #[arg(long = "clear")]
    clear: bool,

    /// Print selected candidate image URLs and exit
    #[arg(long = "show-candidates")]
    show_candidates: bool,

    /// Print the pass report instead of the annotated document
    #[arg(long = "report")]
    report: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    manga_translator_rust::logging::init(cli.verbose)?;

    let input = match cli.input.as_deref() {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input: {}", path))?,
        ),
        None => {
            if io::stdin().is_terminal() {
                None
            } else {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Some(buffer)
            }
        }
    };

    let output = manga_translator_rust::run(
        manga_translator_rust::Config {
            mode: cli.mode,
            api_url: cli.api_url,
            clear: cli.clear,
            show_candidates: cli.show_candidates,
            report: cli.report,
            settings_path: cli.read_settings,
        },
        input,
    )
    .await?;

    println!("{}", output);
    Ok(())
}
