//! Static-HTML host binding. A [`PageDocument`] wraps a parsed tree and
//! exposes its images with the metadata the selector and renderer need.
//!
//! Without a layout engine the dimension convention is: `width`/`height`
//! attributes give the natural (intrinsic) size, inline-style `width`/`height`
//! in px give the rendered size (defaulting to natural), and offsets within
//! the container are zero.

use kuchiki::{Attributes, NodeRef};

use crate::geometry::ImageMetrics;
use crate::selector::ImageInfo;

pub struct PageDocument {
    root: NodeRef,
}

/// One `<img>` element together with its selection attributes and metrics.
pub struct PageImage {
    node: NodeRef,
    pub info: ImageInfo,
    pub metrics: ImageMetrics,
}

impl PageImage {
    pub fn node(&self) -> &NodeRef {
        &self.node
    }
}

impl PageDocument {
    pub fn parse(html: &str) -> Self {
        use kuchiki::traits::*;

        Self {
            root: kuchiki::parse_html().one(html),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn to_html(&self) -> String {
        self.root.to_string()
    }

    /// All `<img>` elements in document order.
    pub fn images(&self) -> Vec<PageImage> {
        let Ok(matches) = self.root.select("img") else {
            return Vec::new();
        };
        matches
            .map(|element| {
                let node = element.as_node().clone();
                let attributes = element.attributes.borrow();
                let natural_width = attr_dimension(&attributes, "width");
                let natural_height = attr_dimension(&attributes, "height");
                let style = attributes.get("style");
                let rendered_width = style
                    .and_then(|style| style_px(style, "width"))
                    .unwrap_or(natural_width);
                let rendered_height = style
                    .and_then(|style| style_px(style, "height"))
                    .unwrap_or(natural_height);
                let info = ImageInfo {
                    src: attributes.get("src").unwrap_or("").to_string(),
                    alt: attributes.get("alt").unwrap_or("").to_string(),
                    natural_width,
                    natural_height,
                };
                let metrics = ImageMetrics {
                    natural_width,
                    natural_height,
                    rendered_width,
                    rendered_height,
                    offset_left: 0.0,
                    offset_top: 0.0,
                };
                PageImage {
                    node,
                    info,
                    metrics,
                }
            })
            .collect()
    }
}

fn attr_dimension(attributes: &Attributes, name: &str) -> f32 {
    attributes
        .get(name)
        .and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(0.0)
}

/// Read a `px` declaration out of an inline style string.
pub(crate) fn style_px(style: &str, property: &str) -> Option<f32> {
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case(property) {
            continue;
        }
        let Some(number) = value.trim().strip_suffix("px") else {
            continue;
        };
        if let Ok(parsed) = number.trim().parse::<f32>() {
            return Some(parsed);
        }
    }
    None
}

/// Set one declaration in an inline style string, preserving the others.
pub(crate) fn upsert_declaration(style: Option<&str>, property: &str, value: &str) -> String {
    let mut declarations = Vec::new();
    let mut replaced = false;
    if let Some(style) = style {
        for declaration in style.split(';') {
            let trimmed = declaration.trim();
            if trimmed.is_empty() {
                continue;
            }
            let name = trimmed.split_once(':').map(|(name, _)| name.trim());
            if name.is_some_and(|name| name.eq_ignore_ascii_case(property)) {
                declarations.push(format!("{}: {}", property, value));
                replaced = true;
            } else {
                declarations.push(trimmed.to_string());
            }
        }
    }
    if !replaced {
        declarations.push(format!("{}: {}", property, value));
    }
    declarations.join("; ")
}
