//! Sizing of uploaded images and captured frames on the measuring canvas

use serde::{Deserialize, Serialize};

/// Default canvas bounds for a displayed image
pub const DEFAULT_CANVAS_WIDTH: f64 = 600.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 400.0;

/// Source dimensions of an image or video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Size an image is drawn at; pointer coordinates live in this space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both sides are positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self { width: DEFAULT_CANVAS_WIDTH, height: DEFAULT_CANVAS_HEIGHT }
    }
}

/// Fit `image` into the canvas bounds keeping its aspect ratio.
///
/// The width fills `max_width` first; if the resulting height overflows,
/// the height is pinned to `max_height` and the width shrinks instead.
/// Returns `None` for empty images or non-positive bounds.
pub fn fit_to_canvas(image: ImageSize, max_width: f64, max_height: f64) -> Option<DisplaySize> {
    if image.width == 0 || image.height == 0 || max_width <= 0.0 || max_height <= 0.0 {
        return None;
    }

    let aspect_ratio = f64::from(image.width) / f64::from(image.height);
    let mut width = max_width;
    let mut height = max_width / aspect_ratio;

    if height > max_height {
        height = max_height;
        width = max_height * aspect_ratio;
    }

    Some(DisplaySize { width, height })
}
