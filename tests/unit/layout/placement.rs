use super::*;

const CANVAS: Canvas = Canvas::PORTRAIT_1080P;

fn relative(h: HorizontalAnchor, fy: f64) -> PlacementSpec {
    PlacementSpec::new(Anchor::Relative(h, fy))
}

#[test]
fn right_anchor_with_vertical_fraction() {
    let p = resolve(
        &relative(HorizontalAnchor::Right, 0.5),
        Size::new(100.0, 50.0),
        CANVAS,
    );
    assert_eq!(p, Point::new(926.0, 960.0));
}

#[test]
fn named_anchors_are_bottom_anchored() {
    let size = Size::new(200.0, 1056.0);
    let left = resolve(&PlacementSpec::new(Anchor::Named(HorizontalAnchor::Left)), size, CANVAS);
    assert_eq!(left, Point::new(54.0, 864.0));

    let center = resolve(
        &PlacementSpec::new(Anchor::Named(HorizontalAnchor::Center)),
        size,
        CANVAS,
    );
    assert_eq!(center, Point::new(440.0, 864.0));

    let mut raised = PlacementSpec::new(Anchor::Named(HorizontalAnchor::Right));
    raised.base_margin_fraction = 0.1;
    let right = resolve(&raised, size, CANVAS);
    assert_eq!(right, Point::new(826.0, 1920.0 * 0.9 - 1056.0));
}

#[test]
fn offsets_are_added_after_anchoring() {
    let p = resolve(
        &relative(HorizontalAnchor::Center, 0.25).with_offset(-40, 30),
        Size::new(80.0, 80.0),
        CANVAS,
    );
    assert_eq!(p, Point::new(460.0, 510.0));
}

#[test]
fn result_is_clamped_into_canvas() {
    let size = Size::new(300.0, 400.0);
    for (ox, oy) in [(5000, 5000), (-5000, -5000), (0, 100_000), (i32::MAX, i32::MIN)] {
        for anchor in [
            Anchor::Named(HorizontalAnchor::Right),
            Anchor::Relative(HorizontalAnchor::Left, 0.99),
            Anchor::Absolute { x: 10.0, y: 10.0 },
        ] {
            let p = resolve(&PlacementSpec::new(anchor).with_offset(ox, oy), size, CANVAS);
            assert!(p.x >= 0.0 && p.x <= 1080.0 - 300.0, "x={}", p.x);
            assert!(p.y >= 0.0 && p.y <= 1920.0 - 400.0, "y={}", p.y);
        }
    }
}

#[test]
fn oversized_element_is_pinned_to_origin() {
    let p = resolve(
        &relative(HorizontalAnchor::Right, 0.5),
        Size::new(2000.0, 4000.0),
        CANVAS,
    );
    assert_eq!(p, Point::new(0.0, 0.0));
}

#[test]
fn unrecognized_horizontal_falls_back_to_left_margin() {
    let spec = PlacementSpec::new(Anchor::Named(HorizontalAnchor::parse("upper-ish")));
    let size = Size::new(100.0, 100.0);
    let p = resolve(&spec, size, CANVAS);
    assert_eq!(p.x, 54.0);
    assert_eq!(p, resolve(&spec, size, CANVAS));
}

#[test]
fn resolve_is_deterministic() {
    let spec = relative(HorizontalAnchor::Pixels(123.5), 0.3).with_offset(7, -9);
    let size = Size::new(64.0, 32.0);
    let first = resolve(&spec, size, CANVAS);
    for _ in 0..8 {
        assert_eq!(resolve(&spec, size, CANVAS), first);
    }
    assert_eq!(first, Point::new(130.5, 1920.0 * 0.3 - 9.0));
}

#[test]
fn anchors_parse_from_all_json_forms() {
    let named: Anchor = serde_json::from_str(r#""Right""#).unwrap();
    assert_eq!(named, Anchor::Named(HorizontalAnchor::Right));

    let pair: Anchor = serde_json::from_str(r#"["center", 0.7]"#).unwrap();
    assert_eq!(pair, Anchor::Relative(HorizontalAnchor::Center, 0.7));

    let pixel_pair: Anchor = serde_json::from_str(r#"[120, 0.2]"#).unwrap();
    assert_eq!(pixel_pair, Anchor::Relative(HorizontalAnchor::Pixels(120.0), 0.2));

    let numeric_text: Anchor = serde_json::from_str(r#"["48.5", 0.2]"#).unwrap();
    assert_eq!(numeric_text, Anchor::Relative(HorizontalAnchor::Pixels(48.5), 0.2));

    let absolute: Anchor = serde_json::from_str(r#"{"x": 10, "y": 20}"#).unwrap();
    assert_eq!(absolute, Anchor::Absolute { x: 10.0, y: 20.0 });

    let odd: Anchor = serde_json::from_str(r#""middle-ish""#).unwrap();
    assert_eq!(
        odd,
        Anchor::Named(HorizontalAnchor::Unrecognized("middle-ish".to_string()))
    );
}

#[test]
fn placement_accepts_position_alias_and_default_offsets() {
    let spec: PlacementSpec =
        serde_json::from_str(r#"{"position": ["left", 0.4], "offset_y": -12}"#).unwrap();
    assert_eq!(spec.anchor, Anchor::Relative(HorizontalAnchor::Left, 0.4));
    assert_eq!(spec.offset_x, 0);
    assert_eq!(spec.offset_y, -12);
    assert_eq!(spec.base_margin_fraction, 0.0);

    let json = serde_json::to_value(&spec).unwrap();
    assert_eq!(json["anchor"], serde_json::json!(["left", 0.4]));
}
