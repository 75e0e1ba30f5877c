//! Coordinate mapping between an image's natural pixel space and its
//! rendered on-page size. The two axis factors are computed independently;
//! a stretched image gives a non-uniform but still correct mapping.

/// Axis-aligned rectangle in an image's natural pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Dimensions and in-container position of one rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetrics {
    pub natural_width: f32,
    pub natural_height: f32,
    pub rendered_width: f32,
    pub rendered_height: f32,
    pub offset_left: f32,
    pub offset_top: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

/// Box in rendered-page coordinates, relative to the image's container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ImageMetrics {
    /// Per-axis `rendered / natural` factors. `None` when the natural size is
    /// unknown (not yet decoded) or any dimension is non-finite; callers skip
    /// the image instead of rendering non-finite coordinates.
    pub fn scale(&self) -> Option<Scale> {
        let dims = [
            self.natural_width,
            self.natural_height,
            self.rendered_width,
            self.rendered_height,
        ];
        if dims.iter().any(|value| !value.is_finite()) {
            return None;
        }
        if self.natural_width <= 0.0 || self.natural_height <= 0.0 {
            return None;
        }
        Some(Scale {
            x: self.rendered_width / self.natural_width,
            y: self.rendered_height / self.natural_height,
        })
    }

    /// The overlay container box: positioned at the image's offset and sized
    /// exactly to the rendered image.
    pub fn frame(&self) -> OverlayBox {
        OverlayBox {
            left: self.offset_left,
            top: self.offset_top,
            width: self.rendered_width,
            height: self.rendered_height,
        }
    }
}

/// Map a natural-space region into an image-local rendered box.
pub fn project(region: &Region, scale: Scale) -> OverlayBox {
    OverlayBox {
        left: region.x * scale.x,
        top: region.y * scale.y,
        width: region.width * scale.x,
        height: region.height * scale.y,
    }
}
