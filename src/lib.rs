use anyhow::{Result, anyhow};
use std::path::Path;

pub mod backend;
pub mod geometry;
pub mod logging;
pub mod overlay;
pub mod page;
pub mod selector;
pub mod session;
pub mod settings;

pub use backend::{Backend, BackendFuture, Bubble, HttpBackend, TranslateRequest, TranslateResponse};
pub use overlay::{OverlayPolicy, OverlayStyle, TextRegion};
pub use page::{PageDocument, PageImage};
pub use selector::{ImageInfo, SelectorRules};
pub use session::{PageSession, PassOutcome, PassReport};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub mode: Option<String>,
    pub api_url: Option<String>,
    pub clear: bool,
    pub show_candidates: bool,
    pub report: bool,
    pub settings_path: Option<String>,
}

/// Run one operation against an HTML document and return the output: the
/// annotated (or cleared) document, a candidate listing, or a pass report.
pub async fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(api_url) = config.api_url {
        if !api_url.trim().is_empty() {
            settings.api_url = api_url.trim_end_matches('/').to_string();
        }
    }

    let input = input.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(anyhow!("stdin is empty"));
    }
    let document = page::PageDocument::parse(&input);

    if config.show_candidates {
        return Ok(format_candidates(&document, &settings));
    }

    let backend = HttpBackend::new(settings.api_url.clone());
    let session = PageSession::new(&document, backend, &settings);

    if config.clear {
        let removed = session.clear();
        tracing::info!("removed {} overlay containers", removed);
        return Ok(document.to_html());
    }

    let mode = config
        .mode
        .filter(|mode| !mode.trim().is_empty())
        .unwrap_or_else(|| settings.default_mode.clone());
    let outcome = session.translate(&mode).await;

    if config.report {
        return Ok(format_outcome(&outcome));
    }
    Ok(document.to_html())
}

fn format_candidates(document: &page::PageDocument, settings: &settings::Settings) -> String {
    let rules = SelectorRules::from_settings(settings);
    let infos: Vec<ImageInfo> = document
        .images()
        .iter()
        .map(|image| image.info.clone())
        .collect();
    selector::select_candidates(&infos, &rules)
        .iter()
        .map(|info| info.src.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_outcome(outcome: &PassOutcome) -> String {
    match outcome {
        PassOutcome::AlreadyRunning => "pass already in flight".to_string(),
        PassOutcome::Completed(report) => format!(
            "images: {}\ncandidates: {}\ntranslated: {}\nskipped: {}\nfailed: {}",
            report.images, report.candidates, report.translated, report.skipped, report.failed
        ),
    }
}
