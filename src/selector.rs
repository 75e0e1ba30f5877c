//! Heuristic detection of manga/comic page images. Pure and read-only: only
//! attributes already present on the page are consulted, never the network.

use crate::settings::Settings;

/// Attributes of one page image, read at selection time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub natural_width: f32,
    pub natural_height: f32,
}

/// Thresholds and keyword sets for the selection predicate.
///
/// Keywords are matched as lowercase substrings; `from_settings` lowercases
/// them once so the per-image check stays cheap.
#[derive(Debug, Clone)]
pub struct SelectorRules {
    pub min_width: u32,
    pub min_height: u32,
    pub url_keywords: Vec<String>,
    pub alt_keywords: Vec<String>,
}

impl SelectorRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_width: settings.min_width,
            min_height: settings.min_height,
            url_keywords: lowercase_all(&settings.url_keywords),
            alt_keywords: lowercase_all(&settings.alt_keywords),
        }
    }
}

impl Default for SelectorRules {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// The selection predicate: both natural dimensions must meet the size
/// thresholds, and the source URL or alt text must contain a keyword.
///
/// Images without known natural dimensions fail the size check. That skips
/// lazily-loaded images that have not decoded yet; a documented limitation,
/// not a bug.
pub fn is_manga_image(info: &ImageInfo, rules: &SelectorRules) -> bool {
    if info.natural_width < rules.min_width as f32 || info.natural_height < rules.min_height as f32
    {
        return false;
    }
    let src = info.src.to_lowercase();
    if rules
        .url_keywords
        .iter()
        .any(|keyword| src.contains(keyword))
    {
        return true;
    }
    let alt = info.alt.to_lowercase();
    rules
        .alt_keywords
        .iter()
        .any(|keyword| alt.contains(keyword))
}

/// Filter a document-ordered list of images down to likely manga pages,
/// preserving order.
pub fn select_candidates<'a>(images: &'a [ImageInfo], rules: &SelectorRules) -> Vec<&'a ImageInfo> {
    images
        .iter()
        .filter(|info| is_manga_image(info, rules))
        .collect()
}
