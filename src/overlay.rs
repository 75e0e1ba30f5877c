//! Overlay rendering: positioned text boxes injected over a candidate image,
//! removable as a group via the marker class.

use html5ever::{QualName, local_name, namespace_url, ns};
use kuchiki::{Attribute, ExpandedName, NodeRef};

use crate::geometry::{OverlayBox, Region, project};
use crate::page::{PageImage, upsert_declaration};

/// What a new translation pass does with overlays already attached to the
/// same image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPolicy {
    Replace,
    Stack,
}

impl OverlayPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "stack" => Some(Self::Stack),
            _ => None,
        }
    }
}

/// Class names stamped onto the generated elements.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub marker_class: String,
    pub text_class: String,
}

/// One translated text region in the image's natural pixel space.
#[derive(Debug, Clone)]
pub struct TextRegion {
    pub region: Region,
    pub text: String,
}

/// Insert one overlay container over `image`, one text box per region.
///
/// Returns `false` without touching the tree when there is nothing to render:
/// no regions, no usable scale (natural size unknown), or no parent element
/// to anchor against.
pub fn render_overlay(
    image: &PageImage,
    regions: &[TextRegion],
    style: &OverlayStyle,
    policy: OverlayPolicy,
) -> bool {
    if regions.is_empty() {
        return false;
    }
    let Some(scale) = image.metrics.scale() else {
        return false;
    };
    let Some(parent) = image.node().parent() else {
        return false;
    };
    if parent.as_element().is_none() {
        return false;
    }

    if policy == OverlayPolicy::Replace {
        remove_marked_children(&parent, &style.marker_class);
    }

    let container = new_div(
        &style.marker_class,
        &container_style(&image.metrics.frame()),
    );
    for text_region in regions {
        let bbox = project(&text_region.region, scale);
        let text_box = new_div(&style.text_class, &box_style(&bbox));
        text_box.append(NodeRef::new_text(text_region.text.clone()));
        container.append(text_box);
    }

    force_relative_position(&parent);
    parent.append(container);
    true
}

/// Remove every marker-tagged overlay under `root`. Idempotent; returns the
/// number of containers removed.
pub fn clear_overlays(root: &NodeRef, marker_class: &str) -> usize {
    let marked: Vec<NodeRef> = root
        .descendants()
        .filter(|node| has_class(node, marker_class))
        .collect();
    let removed = marked.len();
    for node in marked {
        node.detach();
    }
    removed
}

fn container_style(frame: &OverlayBox) -> String {
    format!(
        "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; pointer-events: none",
        frame.left, frame.top, frame.width, frame.height
    )
}

fn box_style(bbox: &OverlayBox) -> String {
    format!(
        "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px",
        bbox.left, bbox.top, bbox.width, bbox.height
    )
}

fn new_div(class: &str, style: &str) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), local_name!("div")),
        vec![
            (
                ExpandedName::new(ns!(), "class"),
                Attribute {
                    prefix: None,
                    value: class.to_string(),
                },
            ),
            (
                ExpandedName::new(ns!(), "style"),
                Attribute {
                    prefix: None,
                    value: style.to_string(),
                },
            ),
        ],
    )
}

fn force_relative_position(parent: &NodeRef) {
    if let Some(element) = parent.as_element() {
        let mut attributes = element.attributes.borrow_mut();
        let style = attributes.get("style").map(|value| value.to_string());
        attributes.insert(
            "style",
            upsert_declaration(style.as_deref(), "position", "relative"),
        );
    }
}

fn remove_marked_children(parent: &NodeRef, marker_class: &str) {
    let marked: Vec<NodeRef> = parent
        .children()
        .filter(|child| has_class(child, marker_class))
        .collect();
    for node in marked {
        node.detach();
    }
}

fn has_class(node: &NodeRef, class: &str) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let attributes = element.attributes.borrow();
    attributes
        .get("class")
        .map(|value| value.split_whitespace().any(|entry| entry == class))
        .unwrap_or(false)
}
