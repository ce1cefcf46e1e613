use crate::foundation::core::{Canvas, Point, Size};

/// Horizontal margin used by the `left`/`right` anchors, as a fraction of canvas width.
pub const SIDE_MARGIN_FRACTION: f64 = 0.05;

/// Horizontal part of an [`Anchor`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawHorizontal", into = "RawHorizontal")]
pub enum HorizontalAnchor {
    /// `0.05 * W` from the left edge.
    Left,
    /// Element centered horizontally.
    Center,
    /// `0.05 * W` from the right edge.
    Right,
    /// Absolute x in pixels.
    Pixels(f64),
    /// Anything else; resolves like [`HorizontalAnchor::Left`] with a warning.
    Unrecognized(String),
}

impl HorizontalAnchor {
    pub fn parse(s: &str) -> Self {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "left" => Self::Left,
            "center" | "centre" => Self::Center,
            "right" => Self::Right,
            other => match other.parse::<f64>() {
                Ok(x) if x.is_finite() => Self::Pixels(x),
                _ => Self::Unrecognized(s.to_string()),
            },
        }
    }

    fn x_for(&self, element_w: f64, canvas_w: f64) -> f64 {
        let margin = canvas_w * SIDE_MARGIN_FRACTION;
        match self {
            Self::Left => margin,
            Self::Center => (canvas_w - element_w) / 2.0,
            Self::Right => canvas_w - element_w - margin,
            Self::Pixels(x) => *x,
            Self::Unrecognized(raw) => {
                tracing::warn!(anchor = raw.as_str(), "unrecognized horizontal anchor; using left");
                margin
            }
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum RawHorizontal {
    Pixels(f64),
    Name(String),
}

impl From<RawHorizontal> for HorizontalAnchor {
    fn from(raw: RawHorizontal) -> Self {
        match raw {
            RawHorizontal::Pixels(x) => Self::Pixels(x),
            RawHorizontal::Name(s) => Self::parse(&s),
        }
    }
}

impl From<HorizontalAnchor> for RawHorizontal {
    fn from(h: HorizontalAnchor) -> Self {
        match h {
            HorizontalAnchor::Left => Self::Name("left".to_string()),
            HorizontalAnchor::Center => Self::Name("center".to_string()),
            HorizontalAnchor::Right => Self::Name("right".to_string()),
            HorizontalAnchor::Pixels(x) => Self::Pixels(x),
            HorizontalAnchor::Unrecognized(s) => Self::Name(s),
        }
    }
}

/// Where an element sits on the canvas before offsets are applied.
///
/// JSON forms: `"right"` (named, bottom-anchored), `["center", 0.7]` (horizontal anchor plus a
/// vertical fraction of canvas height measured from the top), `{"x": 10, "y": 20}` (absolute).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Anchor {
    Named(HorizontalAnchor),
    Relative(HorizontalAnchor, f64),
    Absolute { x: f64, y: f64 },
}

/// Declarative placement of one visual element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementSpec {
    #[serde(alias = "position")]
    pub anchor: Anchor,
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
    /// Gap kept below bottom-anchored elements, as a fraction of canvas height.
    #[serde(default)]
    pub base_margin_fraction: f64,
}

impl PlacementSpec {
    pub fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            offset_x: 0,
            offset_y: 0,
            base_margin_fraction: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// Resolve a placement into the element's top-left pixel position.
///
/// The result always lies in `[0, max(0, W - w)] x [0, max(0, H - h)]`, so an element never
/// starts off-canvas. Elements larger than the canvas are pinned to the origin on that axis.
pub fn resolve(placement: &PlacementSpec, element: Size, canvas: Canvas) -> Point {
    let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
    let bottom_y = ch * (1.0 - placement.base_margin_fraction) - element.height;

    let (base_x, base_y) = match &placement.anchor {
        Anchor::Named(h) => (h.x_for(element.width, cw), bottom_y),
        Anchor::Relative(h, fy) => (h.x_for(element.width, cw), fy * ch),
        Anchor::Absolute { x, y } => (*x, *y),
    };

    let x = base_x + f64::from(placement.offset_x);
    let y = base_y + f64::from(placement.offset_y);

    Point::new(
        clamp_axis(x, (cw - element.width).max(0.0)),
        clamp_axis(y, (ch - element.height).max(0.0)),
    )
}

fn clamp_axis(v: f64, max: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, max)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
