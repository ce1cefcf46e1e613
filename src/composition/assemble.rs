use std::path::Path;

use crate::{
    composition::model::{
        BackgroundPlan, CanvasFit, DurationPolicy, ElementContent, LayerContent, RenderEntry,
        RenderList, TextAlign, VideoInfo, VisualElement, Z_BACKGROUND, Z_CAPTION, Z_CHARACTER,
    },
    foundation::core::{Canvas, Fps, Point, Size},
    foundation::error::{ReelError, ReelResult},
    layout::placement::resolve,
};

/// Durations closer than this are treated as equal.
const DURATION_EPSILON_S: f64 = 1e-3;

/// Build the render list for one video.
///
/// The background comes first, characters above it and captions above characters; each group
/// keeps its event order. Elements that end before they start, or start after `target_duration_s`,
/// are dropped; the rest are clipped to the target.
#[tracing::instrument(skip_all, fields(characters = characters.len(), captions = captions.len()))]
pub fn assemble(
    background: &Path,
    background_info: &VideoInfo,
    characters: &[VisualElement],
    captions: &[VisualElement],
    canvas: Canvas,
    fps: Fps,
    target_duration_s: f64,
) -> ReelResult<RenderList> {
    canvas.validate()?;
    if !(target_duration_s.is_finite() && target_duration_s > 0.0) {
        return Err(ReelError::composition(format!(
            "target duration must be > 0, got {target_duration_s}"
        )));
    }

    let background = plan_background(background, background_info, canvas, target_duration_s)?;
    tracing::debug!(
        policy = ?background.duration_policy,
        fit = ?background.fit,
        "background plan"
    );

    let mut entries = Vec::with_capacity(1 + characters.len() + captions.len());
    entries.push(RenderEntry {
        layer: LayerContent::Background {
            path: background.source.clone(),
        },
        z_order: Z_BACKGROUND,
        start_s: 0.0,
        end_s: target_duration_s,
        position: Point::ZERO,
        size: canvas.size(),
    });
    for (z_order, group) in [(Z_CHARACTER, characters), (Z_CAPTION, captions)] {
        for element in group {
            if let Some(entry) = place_element(element, z_order, canvas, target_duration_s) {
                entries.push(entry);
            }
        }
    }

    Ok(RenderList {
        canvas,
        fps,
        duration_s: target_duration_s,
        background,
        entries,
    })
}

fn place_element(
    element: &VisualElement,
    z_order: u8,
    canvas: Canvas,
    target_duration_s: f64,
) -> Option<RenderEntry> {
    let start_s = element.start_s.max(0.0);
    let end_s = element.end_s.min(target_duration_s);
    if end_s <= start_s {
        tracing::debug!(
            start_s = element.start_s,
            end_s = element.end_s,
            z_order,
            "dropping element with empty visible window"
        );
        return None;
    }

    let layer = match &element.content {
        ElementContent::Image { path } => LayerContent::Image { path: path.clone() },
        ElementContent::Caption { text } => LayerContent::Caption {
            text: text.clone(),
            align: TextAlign::for_anchor(&element.placement.anchor),
        },
    };

    Some(RenderEntry {
        layer,
        z_order,
        start_s,
        end_s,
        position: resolve(&element.placement, element.size, canvas),
        size: element.size,
    })
}

/// Decide how the background is scaled, fitted and timed against the narration.
pub fn plan_background(
    source: &Path,
    info: &VideoInfo,
    canvas: Canvas,
    target_duration_s: f64,
) -> ReelResult<BackgroundPlan> {
    if info.width == 0 || info.height == 0 {
        return Err(ReelError::composition(format!(
            "background '{}' has no video dimensions",
            source.display()
        )));
    }

    let scaled = scaled_to_height(info, canvas);
    let cw = canvas.width_f64();
    let fit = if scaled.width > cw {
        CanvasFit::Crop {
            x: ((scaled.width - cw) / 2.0).floor(),
        }
    } else if scaled.width < cw {
        CanvasFit::Pad {
            left: ((cw - scaled.width) / 2.0).floor(),
        }
    } else {
        CanvasFit::None
    };

    let duration_policy = if (info.duration_s - target_duration_s).abs() < DURATION_EPSILON_S {
        DurationPolicy::Exact
    } else if info.duration_s < target_duration_s {
        DurationPolicy::Loop
    } else {
        DurationPolicy::Truncate
    };

    Ok(BackgroundPlan {
        source: source.to_path_buf(),
        native: info.clone(),
        scaled,
        duration_policy,
        fit,
    })
}

/// Scale to canvas height keeping aspect; width is rounded to an even pixel count.
fn scaled_to_height(info: &VideoInfo, canvas: Canvas) -> Size {
    let h = canvas.height_f64();
    let w = f64::from(info.width) * h / f64::from(info.height);
    let even_w = ((w / 2.0).round() * 2.0).max(2.0);
    Size::new(even_w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/composition/assemble.rs"]
mod tests;
