use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    captions::chunker::chunk,
    composition::model::{ElementContent, VisualElement},
    config::catalog::CharacterCatalog,
    config::settings::{CaptionStyle, CharacterLayout},
    foundation::core::{Canvas, Size},
    foundation::error::{ReelError, ReelResult},
    script::model::TimedTurn,
};

/// One caption element per word chunk of every turn, in timeline order.
pub fn caption_events(
    timed: &[TimedTurn],
    style: &CaptionStyle,
    canvas: Canvas,
    words_per_chunk: usize,
) -> Vec<VisualElement> {
    let size = Size::new(
        canvas.width_f64() * style.box_width_fraction,
        style.box_height_px,
    );
    timed
        .iter()
        .flat_map(|turn| chunk(turn.text(), turn.window_secs(), words_per_chunk))
        .map(|c| VisualElement {
            content: ElementContent::Caption { text: c.text },
            size,
            placement: style.placement.clone(),
            start_s: c.start_s,
            end_s: c.end_s,
        })
        .collect()
}

/// One character element per turn whose speaker has catalog artwork.
///
/// `measure` reports an image's native pixel size; the element is scaled to
/// `layout.height_fraction` of canvas height keeping the aspect ratio. Each image is measured
/// once. Speakers without a catalog entry and images that cannot be measured are skipped.
pub fn character_events<M>(
    timed: &[TimedTurn],
    catalog: &CharacterCatalog,
    layout: &CharacterLayout,
    canvas: Canvas,
    measure: M,
) -> Vec<VisualElement>
where
    M: Fn(&Path) -> ReelResult<(u32, u32)>,
{
    let target_h = canvas.height_f64() * layout.height_fraction;
    let mut sizes: BTreeMap<PathBuf, Option<Size>> = BTreeMap::new();
    let mut out = Vec::new();

    for (idx, turn) in timed.iter().enumerate() {
        let Some(profile) = catalog.get(turn.speaker()) else {
            tracing::debug!(turn = idx + 1, speaker = turn.speaker(), "no character art for speaker");
            continue;
        };

        let size = *sizes
            .entry(profile.image_path.clone())
            .or_insert_with(|| match measure(&profile.image_path) {
                Ok((w, h)) if w > 0 && h > 0 => {
                    let scale = target_h / f64::from(h);
                    Some(Size::new(f64::from(w) * scale, target_h))
                }
                Ok(_) => {
                    tracing::warn!(path = %profile.image_path.display(), "character image has zero size; skipping");
                    None
                }
                Err(e) => {
                    tracing::warn!(path = %profile.image_path.display(), error = %e, "character image unavailable; skipping");
                    None
                }
            });
        let Some(size) = size else {
            continue;
        };

        let mut placement = profile.placement.clone();
        placement.base_margin_fraction = layout.base_margin_fraction;
        let (start_s, end_s) = turn.window_secs();
        out.push(VisualElement {
            content: ElementContent::Image {
                path: profile.image_path.clone(),
            },
            size,
            placement,
            start_s,
            end_s,
        });
    }
    out
}

/// Native pixel size of an image file, read from its header.
pub fn image_size(path: &Path) -> ReelResult<(u32, u32)> {
    if !path.is_file() {
        return Err(ReelError::missing_asset(format!(
            "image not found: {}",
            path.display()
        )));
    }
    image::image_dimensions(path)
        .map_err(|e| ReelError::malformed(format!("image '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/composition/events.rs"]
mod tests;
