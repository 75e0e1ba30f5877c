use anyhow::{Context, anyhow};

use super::{Backend, BackendFuture, TranslateRequest, TranslateResponse};

/// The real backend: `POST {base_url}/translate`. Single request/response,
/// no retry; callers treat any failure as a per-image skip.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Backend for HttpBackend {
    fn translate(&self, request: TranslateRequest) -> BackendFuture {
        let client = self.client.clone();
        let url = format!("{}/translate", self.base_url);
        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&request)
                .send()
                .await
                .with_context(|| format!("failed to reach translation backend at {}", url))?;
            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!(
                    "translation backend returned {} for {}",
                    status,
                    request.image_url
                ));
            }
            response
                .json::<TranslateResponse>()
                .await
                .with_context(|| "failed to decode translation response")
        })
    }
}
