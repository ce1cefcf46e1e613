use super::*;
use crate::{
    config::catalog::CharacterProfile,
    layout::placement::{Anchor, HorizontalAnchor, PlacementSpec},
    script::model::DialogueTurn,
};
use std::cell::Cell;

fn timed(speaker: &str, text: &str, start_ms: u64, duration_ms: u64) -> TimedTurn {
    TimedTurn {
        turn: DialogueTurn::new(speaker, text),
        duration_ms,
        start_time_ms: start_ms,
        end_time_ms: start_ms + duration_ms,
    }
}

fn catalog() -> CharacterCatalog {
    CharacterCatalog::from_profiles([
        CharacterProfile {
            name: "Rick".to_string(),
            voice_id: Some("v1".to_string()),
            image_path: PathBuf::from("art/rick.png"),
            placement: PlacementSpec::new(Anchor::Named(HorizontalAnchor::Right)),
        },
        CharacterProfile {
            name: "Morty".to_string(),
            voice_id: Some("v2".to_string()),
            image_path: PathBuf::from("art/missing.png"),
            placement: PlacementSpec::new(Anchor::Named(HorizontalAnchor::Left)),
        },
    ])
}

#[test]
fn captions_follow_turn_windows_and_box_size() {
    let script = vec![
        timed("Rick", "one two three four five six seven", 0, 7000),
        timed("Morty", "", 7500, 1000),
        timed("Rick", "ok", 9000, 0),
    ];
    let style = CaptionStyle::default();
    let events = caption_events(&script, &style, Canvas::PORTRAIT_1080P, 6);

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].content,
        ElementContent::Caption {
            text: "one two three four five six".to_string()
        }
    );
    assert_eq!((events[0].start_s, events[0].end_s), (0.0, 6.0));
    assert_eq!((events[1].start_s, events[1].end_s), (6.0, 7.0));
    assert_eq!(events[0].size, Size::new(1080.0 * 0.9, 900.0));
    assert_eq!(events[1].placement, style.placement);
}

#[test]
fn characters_scale_to_height_fraction_and_skip_unknown_art() {
    let script = vec![
        timed("Rick", "a", 0, 1000),
        timed("Morty", "b", 1500, 1000),
        timed("Summer", "c", 3000, 1000),
        timed("Rick", "d", 4500, 500),
    ];
    let calls = Cell::new(0);
    let measure = |p: &Path| {
        calls.set(calls.get() + 1);
        if p.ends_with("rick.png") {
            Ok((400, 800))
        } else {
            Err(ReelError::missing_asset("no such image"))
        }
    };
    let layout = CharacterLayout {
        height_fraction: 0.5,
        base_margin_fraction: 0.1,
    };
    let events = character_events(&script, &catalog(), &layout, Canvas::PORTRAIT_1080P, measure);

    assert_eq!(events.len(), 2);
    assert_eq!(calls.get(), 2, "each image is measured once");
    for e in &events {
        assert_eq!(e.size, Size::new(480.0, 960.0));
        assert_eq!(e.placement.anchor, Anchor::Named(HorizontalAnchor::Right));
        assert_eq!(e.placement.base_margin_fraction, 0.1);
    }
    assert_eq!((events[0].start_s, events[0].end_s), (0.0, 1.0));
    assert_eq!((events[1].start_s, events[1].end_s), (4.5, 5.0));
}

#[test]
fn image_size_reads_png_header() {
    let dir = PathBuf::from("target").join("unit_composition_events");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tiny.png");
    image::RgbaImage::new(6, 4).save(&path).unwrap();

    assert_eq!(image_size(&path).unwrap(), (6, 4));
    assert!(matches!(
        image_size(&dir.join("absent.png")),
        Err(ReelError::MissingAsset(_))
    ));
}
