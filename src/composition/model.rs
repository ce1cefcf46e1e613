use std::path::PathBuf;

use crate::{
    foundation::core::{Canvas, Fps, Point, Size},
    layout::placement::{Anchor, HorizontalAnchor, PlacementSpec},
};

/// Z-order of the background layer.
pub const Z_BACKGROUND: u8 = 0;
/// Z-order of character artwork.
pub const Z_CHARACTER: u8 = 1;
/// Z-order of captions; always drawn last.
pub const Z_CAPTION: u8 = 2;

/// What a visual element shows.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementContent {
    /// A caption chunk drawn inside a text box.
    Caption {
        /// Words shown together.
        text: String,
    },
    /// Character artwork.
    Image {
        /// Source image on disk.
        path: PathBuf,
    },
}

/// A caption or character shown during `[start_s, end_s)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualElement {
    /// Content kind and payload.
    pub content: ElementContent,
    /// Rendered size in canvas pixels.
    pub size: Size,
    /// Declarative placement; resolved during assembly.
    pub placement: PlacementSpec,
    /// Visibility start in seconds.
    pub start_s: f64,
    /// Visibility end in seconds (exclusive).
    pub end_s: f64,
}

/// Text alignment of a caption inside its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Captions follow their box's horizontal anchor; anything but left/right is centered.
    pub fn for_anchor(anchor: &Anchor) -> Self {
        let h = match anchor {
            Anchor::Named(h) | Anchor::Relative(h, _) => h,
            Anchor::Absolute { .. } => return Self::Center,
        };
        match h {
            HorizontalAnchor::Left => Self::Left,
            HorizontalAnchor::Right => Self::Right,
            _ => Self::Center,
        }
    }
}

/// Payload of a render-list entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    /// The background video; fit and timing live in [`BackgroundPlan`].
    Background { path: PathBuf },
    Image { path: PathBuf },
    Caption { text: String, align: TextAlign },
}

/// One layer of the final render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderEntry {
    pub layer: LayerContent,
    pub z_order: u8,
    pub start_s: f64,
    pub end_s: f64,
    /// Resolved top-left pixel position.
    pub position: Point,
    pub size: Size,
}

/// How the background's length is matched to the narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Background is shorter; repeat it.
    Loop,
    /// Background is longer; cut it.
    Truncate,
    /// Lengths already match.
    Exact,
}

/// How the height-scaled background is fitted to the canvas width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanvasFit {
    /// Too wide; crop a centered window starting at `x`.
    Crop { x: f64 },
    /// Too narrow; pad with black, `left` pixels on the left.
    Pad { left: f64 },
    /// Already canvas-wide.
    None,
}

/// Source video facts as reported by a probe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_s: f64,
}

/// Background video and how it is stretched onto the canvas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundPlan {
    pub source: PathBuf,
    pub native: VideoInfo,
    /// Size after scaling to canvas height.
    pub scaled: Size,
    pub duration_policy: DurationPolicy,
    pub fit: CanvasFit,
}

/// Everything a renderer needs to produce the final video.
///
/// `entries` are sorted by `z_order` and start with the full-length background; within a layer
/// they keep event order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderList {
    pub canvas: Canvas,
    pub fps: Fps,
    pub duration_s: f64,
    pub background: BackgroundPlan,
    pub entries: Vec<RenderEntry>,
}

impl RenderList {
    pub fn to_json_pretty(&self) -> crate::foundation::error::ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn images(&self) -> impl Iterator<Item = &RenderEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.layer, LayerContent::Image { .. }))
    }

    pub fn captions(&self) -> impl Iterator<Item = &RenderEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.layer, LayerContent::Caption { .. }))
    }
}
