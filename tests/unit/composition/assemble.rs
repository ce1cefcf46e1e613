use super::*;
use crate::{
    foundation::core::Point,
    layout::placement::{Anchor, HorizontalAnchor, PlacementSpec},
};
use std::path::PathBuf;

const CANVAS: Canvas = Canvas::PORTRAIT_1080P;

fn info(width: u32, height: u32, duration_s: f64) -> VideoInfo {
    VideoInfo {
        width,
        height,
        duration_s,
    }
}

fn image(name: &str, start_s: f64, end_s: f64) -> VisualElement {
    VisualElement {
        content: ElementContent::Image {
            path: PathBuf::from(name),
        },
        size: Size::new(100.0, 50.0),
        placement: PlacementSpec::new(Anchor::Relative(HorizontalAnchor::Right, 0.5)),
        start_s,
        end_s,
    }
}

fn caption(text: &str, start_s: f64, end_s: f64) -> VisualElement {
    VisualElement {
        content: ElementContent::Caption {
            text: text.to_string(),
        },
        size: Size::new(972.0, 300.0),
        placement: PlacementSpec::new(Anchor::Relative(HorizontalAnchor::Center, 0.7)),
        start_s,
        end_s,
    }
}

#[test]
fn layers_are_ordered_background_characters_captions() {
    let chars = vec![image("b.png", 2.0, 3.0), image("a.png", 0.0, 1.0)];
    let caps = vec![caption("second", 1.0, 2.0), caption("first", 0.0, 1.0)];
    let list = assemble(
        Path::new("bg.mp4"),
        &info(1080, 1920, 10.0),
        &chars,
        &caps,
        CANVAS,
        Fps::default(),
        5.0,
    )
    .unwrap();

    let z: Vec<u8> = list.entries.iter().map(|e| e.z_order).collect();
    assert_eq!(
        z,
        vec![Z_BACKGROUND, Z_CHARACTER, Z_CHARACTER, Z_CAPTION, Z_CAPTION]
    );
    assert!(Z_BACKGROUND < Z_CHARACTER && Z_CHARACTER < Z_CAPTION);

    let bg = &list.entries[0];
    assert_eq!(
        bg.layer,
        LayerContent::Background {
            path: PathBuf::from("bg.mp4")
        }
    );
    assert_eq!((bg.start_s, bg.end_s), (0.0, 5.0));
    assert_eq!(bg.position, Point::new(0.0, 0.0));
    assert_eq!(bg.size, Size::new(1080.0, 1920.0));

    assert_eq!(
        list.entries[1].layer,
        LayerContent::Image {
            path: PathBuf::from("b.png")
        }
    );
    assert_eq!(
        list.entries[3].layer,
        LayerContent::Caption {
            text: "second".to_string(),
            align: TextAlign::Center
        }
    );
    assert_eq!(list.entries[1].position, Point::new(926.0, 960.0));
    assert_eq!(list.entries[3].position, Point::new(54.0, 1344.0));
    assert_eq!(list.duration_s, 5.0);
    assert_eq!(list.images().count(), 2);
    assert_eq!(list.captions().count(), 2);
}

#[test]
fn empty_and_out_of_range_elements_are_dropped_or_clipped() {
    let chars = vec![
        image("zero.png", 1.0, 1.0),
        image("late.png", 6.0, 7.0),
        image("tail.png", 4.0, 9.0),
    ];
    let list = assemble(
        Path::new("bg.mp4"),
        &info(1080, 1920, 5.0),
        &chars,
        &[],
        CANVAS,
        Fps::default(),
        5.0,
    )
    .unwrap();
    assert_eq!(list.images().count(), 1);
    let tail = &list.entries[1];
    assert_eq!((tail.start_s, tail.end_s), (4.0, 5.0));
}

#[test]
fn wide_background_is_center_cropped() {
    let plan = plan_background(Path::new("bg.mp4"), &info(1920, 1080, 30.0), CANVAS, 10.0).unwrap();
    // 1920x1080 scaled to height 1920 is 3413.33 wide, rounded to 3414
    assert_eq!(plan.scaled, Size::new(3414.0, 1920.0));
    assert_eq!(plan.fit, CanvasFit::Crop { x: 1167.0 });
    assert_eq!(plan.duration_policy, DurationPolicy::Truncate);
}

#[test]
fn narrow_background_is_padded() {
    let plan = plan_background(Path::new("bg.mp4"), &info(540, 1920, 3.0), CANVAS, 10.0).unwrap();
    assert_eq!(plan.scaled, Size::new(540.0, 1920.0));
    assert_eq!(plan.fit, CanvasFit::Pad { left: 270.0 });
    assert_eq!(plan.duration_policy, DurationPolicy::Loop);
}

#[test]
fn matching_background_needs_no_fit_or_retiming() {
    let plan = plan_background(Path::new("bg.mp4"), &info(720, 1280, 10.0004), CANVAS, 10.0).unwrap();
    assert_eq!(plan.scaled, Size::new(1080.0, 1920.0));
    assert_eq!(plan.fit, CanvasFit::None);
    assert_eq!(plan.duration_policy, DurationPolicy::Exact);
}

#[test]
fn invalid_inputs_are_composition_errors() {
    let bad_bg = plan_background(Path::new("bg.mp4"), &info(0, 0, 1.0), CANVAS, 1.0);
    assert!(matches!(bad_bg, Err(ReelError::Composition(_))));

    let zero_target = assemble(
        Path::new("bg.mp4"),
        &info(1080, 1920, 1.0),
        &[],
        &[],
        CANVAS,
        Fps::default(),
        0.0,
    );
    assert!(matches!(zero_target, Err(ReelError::Composition(_))));
}

#[test]
fn render_list_serializes_for_inspection() {
    let list = assemble(
        Path::new("bg.mp4"),
        &info(1080, 1920, 4.0),
        &[],
        &[caption("hi", 0.0, 1.0)],
        CANVAS,
        Fps::default(),
        4.0,
    )
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&list.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["background"]["duration_policy"], "exact");
    assert_eq!(json["background"]["fit"]["kind"], "none");
    assert_eq!(json["entries"][0]["layer"]["kind"], "background");
    assert_eq!(json["entries"][0]["z_order"], 0);
    assert_eq!(json["entries"][1]["layer"]["kind"], "caption");
    assert_eq!(json["entries"][1]["z_order"], 2);
}
