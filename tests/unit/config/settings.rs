use super::*;

#[test]
fn defaults_describe_a_portrait_short() {
    let s = PipelineSettings::default();
    assert_eq!(s.canvas, Canvas { width: 1080, height: 1920 });
    assert_eq!(s.fps, Fps { num: 30, den: 1 });
    assert_eq!(s.gap_ms, 500);
    assert_eq!(s.words_per_chunk, 6);
    assert_eq!(
        s.captions.placement.anchor,
        Anchor::Relative(HorizontalAnchor::Center, 0.7)
    );
    assert_eq!(s.captions.font, "Arial-Bold");
    assert_eq!(s.captions.font_size, 100);
    assert_eq!(s.captions.color, "#FFFF00");
    assert_eq!(s.captions.box_width_fraction, 0.9);
    assert_eq!(s.captions.box_height_px, 900.0);
    assert_eq!(s.characters.height_fraction, 0.55);
    assert_eq!(s.llm_model, "gpt-4o");
    assert!(s.default_voice_id.is_none());
    assert!(!s.parallel_synthesis);
    s.validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults_for_missing_sections() {
    let s: PipelineSettings = serde_json::from_str(
        r#"{
            "gap_ms": 250,
            "captions": {"placement": {"anchor": ["center", 0.2]}, "font_size": 72},
            "default_voice_id": "voice-x"
        }"#,
    )
    .unwrap();
    assert_eq!(s.gap_ms, 250);
    assert_eq!(s.captions.font_size, 72);
    assert_eq!(
        s.captions.placement.anchor,
        Anchor::Relative(HorizontalAnchor::Center, 0.2)
    );
    assert_eq!(s.captions.color, "#FFFF00");
    assert_eq!(s.words_per_chunk, 6);
    assert_eq!(s.default_voice_id.as_deref(), Some("voice-x"));
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = PipelineSettings::default();
    s.words_per_chunk = 0;
    assert!(matches!(s.validate(), Err(ReelError::Validation(_))));

    let mut s = PipelineSettings::default();
    s.canvas.width = 1079;
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.fps.den = 0;
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.characters.height_fraction = 1.5;
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.captions.box_width_fraction = 0.0;
    assert!(s.validate().is_err());

    let mut s = PipelineSettings::default();
    s.synthesis_threads = Some(0);
    assert!(s.validate().is_err());
}

#[test]
fn printed_defaults_load_back_identically() {
    let dir = std::path::PathBuf::from("target").join("unit_config_settings");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    std::fs::write(&path, PipelineSettings::default().to_json_pretty().unwrap()).unwrap();

    let loaded = PipelineSettings::load(Some(&path)).unwrap();
    assert_eq!(loaded, PipelineSettings::default());
    assert_eq!(PipelineSettings::load(None).unwrap(), PipelineSettings::default());
}

#[test]
fn missing_settings_file_is_reported() {
    let err = PipelineSettings::load(Some(Path::new("target/nope/settings.json"))).unwrap_err();
    assert!(matches!(err, ReelError::MissingAsset(_)));
}
