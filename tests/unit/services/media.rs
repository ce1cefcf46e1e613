use super::*;

fn as_strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn filter_of(args: &[String]) -> &str {
    let idx = args.iter().position(|a| a == "-filter_complex").unwrap();
    &args[idx + 1]
}

#[test]
fn missing_turns_keep_their_gap() {
    let segments = vec![
        Some(PathBuf::from("a/turn_001_Rick.mp3")),
        None,
        Some(PathBuf::from("a/turn_003_Rick.mp3")),
    ];
    let args = as_strings(&concat_args(&segments, 500, Path::new("a/combined_dialogue.mp3")).unwrap());

    let inputs: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
        .map(|(_, a)| a)
        .collect();
    assert_eq!(inputs, vec!["a/turn_001_Rick.mp3", "a/turn_003_Rick.mp3"]);

    let graph = filter_of(&args);
    assert!(graph.starts_with("[0:a]aresample=44100"));
    assert!(graph.contains("[1:a]aresample=44100"));
    assert!(graph.contains("atrim=duration=0.500"));
    assert!(graph.ends_with("[s0][g0][g1][s2]concat=n=4:v=0:a=1[narration]"));
    assert_eq!(args.last().unwrap(), "a/combined_dialogue.mp3");
}

#[test]
fn zero_gap_joins_segments_directly() {
    let segments = vec![Some(PathBuf::from("x.mp3")), Some(PathBuf::from("y.mp3"))];
    let args = as_strings(&concat_args(&segments, 0, Path::new("out.mp3")).unwrap());
    let graph = filter_of(&args);
    assert!(!graph.contains("anullsrc"));
    assert!(graph.ends_with("[s0][s1]concat=n=2:v=0:a=1[narration]"));
}

#[test]
fn nothing_to_collate_is_an_error() {
    assert!(matches!(
        concat_args(&[None, None], 500, Path::new("out.mp3")),
        Err(ReelError::MissingAsset(_))
    ));
    assert!(concat_args(&[], 500, Path::new("out.mp3")).is_err());
}

#[test]
fn durations_parse_to_whole_milliseconds() {
    assert_eq!(parse_duration_ms("12.345000").unwrap(), 12_345);
    assert_eq!(parse_duration_ms(" 0.0016 ").unwrap(), 2);
    assert_eq!(parse_duration_ms("3").unwrap(), 3000);
    assert!(parse_duration_ms("N/A").is_err());
    assert!(parse_duration_ms("-1").is_err());
}

#[test]
fn probing_a_missing_file_is_a_missing_asset() {
    let media = FfmpegMedia::default();
    let err = media
        .measure_duration_ms(Path::new("target/definitely/absent.mp3"))
        .unwrap_err();
    assert!(matches!(err, ReelError::MissingAsset(_)));
}
