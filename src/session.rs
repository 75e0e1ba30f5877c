//! A translation pass over one document: select candidates, ask the backend
//! for each in turn, render overlays. The session owns the in-flight flag, so
//! there is no module-level mutable state; hosts register `translate` and
//! `clear` against a session they construct.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::backend::{Backend, TranslateRequest};
use crate::geometry::Region;
use crate::overlay::{self, OverlayPolicy, OverlayStyle, TextRegion};
use crate::page::{PageDocument, PageImage};
use crate::selector::{SelectorRules, is_manga_image};
use crate::settings::Settings;

pub struct PageSession<'a, B: Backend> {
    document: &'a PageDocument,
    backend: B,
    rules: SelectorRules,
    style: OverlayStyle,
    policy: OverlayPolicy,
    translating: AtomicBool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Images seen on the page.
    pub images: usize,
    /// Images that passed the selection heuristic.
    pub candidates: usize,
    /// Candidates that received an overlay.
    pub translated: usize,
    /// Candidates skipped (no bubbles, or unusable geometry).
    pub skipped: usize,
    /// Candidates whose request or response failed.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassReport),
    /// Another pass was in flight; this one was dropped, not queued, and had
    /// no observable effect.
    AlreadyRunning,
}

impl<'a, B: Backend> PageSession<'a, B> {
    pub fn new(document: &'a PageDocument, backend: B, settings: &Settings) -> Self {
        Self {
            document,
            backend,
            rules: SelectorRules::from_settings(settings),
            style: OverlayStyle {
                marker_class: settings.marker_class.clone(),
                text_class: settings.text_class.clone(),
            },
            policy: settings.overlay_policy,
            translating: AtomicBool::new(false),
        }
    }

    /// Run one pass. Candidates are processed strictly sequentially; a single
    /// image's failure is logged and never aborts the pass.
    pub async fn translate(&self, mode: &str) -> PassOutcome {
        if self
            .translating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return PassOutcome::AlreadyRunning;
        }
        let report = self.run_pass(mode).await;
        self.translating.store(false, Ordering::Release);
        PassOutcome::Completed(report)
    }

    /// Remove every overlay in the document. Idempotent.
    pub fn clear(&self) -> usize {
        overlay::clear_overlays(self.document.root(), &self.style.marker_class)
    }

    async fn run_pass(&self, mode: &str) -> PassReport {
        let images = self.document.images();
        let mut report = PassReport {
            images: images.len(),
            ..PassReport::default()
        };
        for image in &images {
            if !is_manga_image(&image.info, &self.rules) {
                continue;
            }
            report.candidates += 1;
            self.translate_image(image, mode, &mut report).await;
        }
        info!(
            "pass finished: {} images, {} candidates, {} translated, {} skipped, {} failed",
            report.images, report.candidates, report.translated, report.skipped, report.failed
        );
        report
    }

    async fn translate_image(&self, image: &PageImage, mode: &str, report: &mut PassReport) {
        let request = TranslateRequest {
            image_url: image.info.src.clone(),
            mode: mode.to_string(),
        };
        match self.backend.translate(request).await {
            Ok(response) => {
                let regions: Vec<TextRegion> = response
                    .bubbles
                    .into_iter()
                    .map(|bubble| TextRegion {
                        region: Region {
                            x: bubble.x,
                            y: bubble.y,
                            width: bubble.width,
                            height: bubble.height,
                        },
                        text: bubble.translated_text,
                    })
                    .collect();
                if overlay::render_overlay(image, &regions, &self.style, self.policy) {
                    report.translated += 1;
                } else {
                    report.skipped += 1;
                }
            }
            Err(err) => {
                warn!("translation failed for {}: {:#}", image.info.src, err);
                report.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendFuture, Bubble, TranslateResponse};
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct StubBackend {
        bubbles: Vec<Bubble>,
        fail: bool,
        delay: Option<Duration>,
        requests: Arc<Mutex<Vec<TranslateRequest>>>,
    }

    impl StubBackend {
        fn with_bubbles(bubbles: Vec<Bubble>) -> Self {
            Self {
                bubbles,
                ..Self::default()
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().expect("lock").len()
        }
    }

    impl Backend for StubBackend {
        fn translate(&self, request: TranslateRequest) -> BackendFuture {
            self.requests.lock().expect("lock").push(request);
            let bubbles = self.bubbles.clone();
            let fail = self.fail;
            let delay = self.delay;
            Box::pin(async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                if fail {
                    return Err(anyhow!("backend unreachable"));
                }
                Ok(TranslateResponse {
                    bubbles,
                    success: true,
                })
            })
        }
    }

    fn bubble(text: &str) -> Bubble {
        Bubble {
            x: 100.0,
            y: 200.0,
            width: 50.0,
            height: 30.0,
            original_text: None,
            translated_text: text.to_string(),
        }
    }

    fn document() -> PageDocument {
        PageDocument::parse(
            r#"<html><body>
                <div><img src="https://cdn.example/manga-1.png" width="800" height="1200"
                          style="width: 400px; height: 600px"></div>
                <div><img src="https://cdn.example/banner.png" width="728" height="90"></div>
                <div><img src="https://cdn.example/comic-2.png" width="900" height="1300"></div>
            </body></html>"#,
        )
    }

    #[tokio::test]
    async fn pass_overlays_candidates_only() {
        let doc = document();
        let backend = StubBackend::with_bubbles(vec![bubble("Hello")]);
        let session = PageSession::new(&doc, backend.clone(), &Settings::default());

        let outcome = session.translate("natural").await;
        assert_eq!(
            outcome,
            PassOutcome::Completed(PassReport {
                images: 3,
                candidates: 2,
                translated: 2,
                skipped: 0,
                failed: 0,
            })
        );
        assert_eq!(backend.request_count(), 2);

        let requests = backend.requests.lock().expect("lock");
        assert_eq!(requests[0].image_url, "https://cdn.example/manga-1.png");
        assert_eq!(requests[0].mode, "natural");
        assert_eq!(requests[1].image_url, "https://cdn.example/comic-2.png");

        let html = doc.to_html();
        assert!(html.contains("manga-overlay"));
        // 800x1200 shown at 400x600: bubble lands at half coordinates.
        assert!(
            html.contains("position: absolute; left: 50px; top: 100px; width: 25px; height: 15px")
        );
    }

    #[tokio::test]
    async fn empty_bubbles_create_no_container() {
        let doc = document();
        let backend = StubBackend::with_bubbles(Vec::new());
        let session = PageSession::new(&doc, backend, &Settings::default());

        let PassOutcome::Completed(report) = session.translate("natural").await else {
            panic!("pass should complete");
        };
        assert_eq!(report.translated, 0);
        assert_eq!(report.skipped, 2);
        assert!(!doc.to_html().contains("manga-overlay"));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_pass() {
        let doc = document();
        let backend = StubBackend {
            fail: true,
            ..StubBackend::default()
        };
        let session = PageSession::new(&doc, backend.clone(), &Settings::default());

        let PassOutcome::Completed(report) = session.translate("natural").await else {
            panic!("pass should complete");
        };
        assert_eq!(report.failed, 2);
        // Both candidates were still attempted.
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_pass_is_dropped() {
        let doc = document();
        let backend = StubBackend {
            bubbles: vec![bubble("Hello")],
            delay: Some(Duration::from_millis(20)),
            ..StubBackend::default()
        };
        let session = PageSession::new(&doc, backend.clone(), &Settings::default());

        let (first, second) = tokio::join!(session.translate("natural"), async {
            // Let the first pass take the flag before the second tries.
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.translate("natural").await
        });

        assert!(matches!(first, PassOutcome::Completed(_)));
        assert_eq!(second, PassOutcome::AlreadyRunning);
        // No duplicate requests from the dropped pass.
        assert_eq!(backend.request_count(), 2);
        // No duplicate overlays either: one container per candidate.
        assert_eq!(session.clear(), 2);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let doc = document();
        let backend = StubBackend::with_bubbles(vec![bubble("Hello")]);
        let session = PageSession::new(&doc, backend, &Settings::default());

        session.translate("natural").await;
        assert_eq!(session.clear(), 2);
        assert_eq!(session.clear(), 0);
    }

    #[tokio::test]
    async fn mode_is_passed_through_verbatim() {
        let doc = document();
        let backend = StubBackend::with_bubbles(vec![bubble("Hello")]);
        let session = PageSession::new(&doc, backend.clone(), &Settings::default());

        session.translate("weird-custom-mode").await;
        let requests = backend.requests.lock().expect("lock");
        assert!(requests.iter().all(|r| r.mode == "weird-custom-mode"));
    }
}
