//! Contract with the external translation backend: one JSON POST per image,
//! returning translated text regions in the image's natural pixel space.

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

mod http;

pub use http::HttpBackend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub image_url: String,
    /// Open-ended style identifier interpreted by the backend; passed through
    /// verbatim, no validation.
    pub mode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateResponse {
    /// Absent or empty means the backend found nothing to overlay.
    pub bubbles: Vec<Bubble>,
    pub success: bool,
}

/// One text bubble: a rectangle in the source image's natural pixel space
/// plus the translated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    pub translated_text: String,
}

pub type BackendFuture = BoxFuture<'static, Result<TranslateResponse>>;

/// A translation backend. Boxed-future shape so sessions stay generic and
/// tests can substitute a stub.
pub trait Backend: Send + Sync {
    fn translate(&self, request: TranslateRequest) -> BackendFuture;
}
