use super::*;

const CATALOG: &str = r#"{
    "Rick": {"voice_id": "v-rick", "image_path": "assets/rick.png", "position": "right", "offset_x": -20},
    "Morty": {"voice_id": "v-morty", "image_path": "assets/morty.png", "position": ["left", 0.5]},
    "Ghost": {"voice_id": "v-ghost"},
    "Broken": "not an object",
    "Mute": {"image_path": "assets/mute.png", "offset_y": 15}
}"#;

#[test]
fn catalog_keeps_valid_entries_and_skips_the_rest() {
    let catalog = CharacterCatalog::from_json_str(CATALOG).unwrap();
    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("Ghost").is_none());
    assert!(catalog.get("Broken").is_none());

    let rick = catalog.get("Rick").unwrap();
    assert_eq!(rick.voice_id.as_deref(), Some("v-rick"));
    assert_eq!(rick.image_path, PathBuf::from("assets/rick.png"));
    assert_eq!(rick.placement.anchor, Anchor::Named(HorizontalAnchor::Right));
    assert_eq!(rick.placement.offset_x, -20);

    let mute = catalog.get("Mute").unwrap();
    assert_eq!(mute.placement.anchor, Anchor::Named(HorizontalAnchor::Center));
    assert_eq!(mute.placement.offset_y, 15);
}

#[test]
fn list_wrapped_catalog_is_accepted() {
    let wrapped = format!("[{CATALOG}]");
    let catalog = CharacterCatalog::from_json_str(&wrapped).unwrap();
    assert_eq!(catalog, CharacterCatalog::from_json_str(CATALOG).unwrap());
}

#[test]
fn non_object_catalog_is_malformed() {
    for raw in ["[]", "[1]", "42", r#""x""#] {
        assert!(matches!(
            CharacterCatalog::from_json_str(raw),
            Err(ReelError::Malformed(_))
        ));
    }
    assert!(matches!(
        CharacterCatalog::from_json_str("{not json"),
        Err(ReelError::Serde(_))
    ));
}

#[test]
fn voice_lookup_falls_back_to_default() {
    let catalog = CharacterCatalog::from_json_str(CATALOG).unwrap();
    assert_eq!(catalog.voice_for("Rick", Some("dflt")), Some("v-rick"));
    assert_eq!(catalog.voice_for(" Rick ", None), Some("v-rick"));
    assert_eq!(catalog.voice_for("Mute", Some("dflt")), Some("dflt"));
    assert_eq!(catalog.voice_for("Nobody", None), None);
}

#[test]
fn subset_keeps_only_known_scene_characters() {
    let catalog = CharacterCatalog::from_json_str(CATALOG).unwrap();
    let scene = catalog.subset(&["Morty".to_string(), "Summer".to_string()]);
    assert_eq!(scene.len(), 1);
    assert!(scene.get("Morty").is_some());
}

#[test]
fn scenes_skip_malformed_entries() {
    let scenes = parse_scenes(
        r#"[
            {"Title": "Garage Lab", "Prompt": "Explain {topic} like Rick.", "DefaultTopic": "entropy", "Characters": ["Rick", "Morty"]},
            {"Prompt": "no title"},
            "junk",
            {"Title": "Plain", "Prompt": "No placeholder here."}
        ]"#,
    )
    .unwrap();
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].characters, vec!["Rick", "Morty"]);
    assert_eq!(scenes[0].render_prompt("black holes"), "Explain black holes like Rick.");
    assert_eq!(scenes[1].render_prompt("anything"), "No placeholder here.");
    assert!(scenes[1].characters.is_empty());

    assert!(matches!(parse_scenes("{}"), Err(ReelError::Malformed(_))));
}

#[test]
fn scene_selection_by_index_or_title() {
    let scenes = parse_scenes(
        r#"[{"Title": "A", "Prompt": "p"}, {"Title": "Space Trip", "Prompt": "q", "DefaultTopic": "orbits"}]"#,
    )
    .unwrap();
    assert_eq!(select_scene(&scenes, "2").unwrap().title, "Space Trip");
    assert_eq!(select_scene(&scenes, "space trip").unwrap().title, "Space Trip");
    assert!(select_scene(&scenes, "0").is_err());
    assert!(select_scene(&scenes, "Nope").is_err());

    let trip = &scenes[1];
    assert_eq!(trip.topic_or_default(None).unwrap(), "orbits");
    assert_eq!(trip.topic_or_default(Some("  ")).unwrap(), "orbits");
    assert_eq!(trip.topic_or_default(Some("tides")).unwrap(), "tides");
    assert!(scenes[0].topic_or_default(None).is_err());
}

#[test]
fn project_name_is_filesystem_friendly() {
    assert_eq!(
        project_name("Rick & Morty (Lab)", "black holes"),
        "Rick_and_Morty_Lab_black_holes"
    );
}
