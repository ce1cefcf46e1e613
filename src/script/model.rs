use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::foundation::error::{ReelError, ReelResult};

/// Speaker name used when a turn arrives without one.
pub const UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// File name of the persisted timed script inside a project's audio folder.
pub const TIMED_SCRIPT_FILE: &str = "timed_script.json";

/// One line of dialogue attributed to a speaker.
///
/// Serialized as `{"speaker": ..., "dialogue": ...}`. A missing or blank speaker becomes
/// [`UNKNOWN_SPEAKER`] and a missing line becomes empty text, so a sloppy script degrades instead
/// of being rejected.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DialogueTurn {
    #[serde(default = "default_speaker", deserialize_with = "de_speaker")]
    pub speaker: String,
    #[serde(
        rename = "dialogue",
        alias = "text",
        default,
        deserialize_with = "de_text"
    )]
    pub text: String,
}

impl DialogueTurn {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: normalize_speaker(Some(speaker.into())),
            text: text.into(),
        }
    }
}

/// A dialogue turn placed on the narration timeline.
///
/// Invariant: `end_time_ms == start_time_ms + duration_ms`. Only
/// [`crate::build_timeline`] constructs these from fresh audio measurements.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimedTurn {
    #[serde(flatten)]
    pub turn: DialogueTurn,
    pub duration_ms: u64,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
}

impl TimedTurn {
    pub fn speaker(&self) -> &str {
        &self.turn.speaker
    }

    pub fn text(&self) -> &str {
        &self.turn.text
    }

    /// Visibility window in seconds, `[start, end)`.
    pub fn window_secs(&self) -> (f64, f64) {
        (
            crate::foundation::core::ms_to_secs(self.start_time_ms),
            crate::foundation::core::ms_to_secs(self.end_time_ms),
        )
    }
}

/// End of the last turn, i.e. the narration length the timeline predicts.
pub fn timeline_duration_ms(timed: &[TimedTurn]) -> u64 {
    timed.last().map(|t| t.end_time_ms).unwrap_or(0)
}

fn default_speaker() -> String {
    UNKNOWN_SPEAKER.to_string()
}

fn normalize_speaker(raw: Option<String>) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default_speaker(),
    }
}

fn de_speaker<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_speaker(Option::<String>::deserialize(
        deserializer,
    )?))
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Load an ordered list of dialogue turns (`script.json`).
pub fn load_turns(path: &Path) -> ReelResult<Vec<DialogueTurn>> {
    let raw = read_json_file(path, "script")?;
    serde_json::from_str(&raw)
        .map_err(|e| ReelError::serde(format!("script '{}': {e}", path.display())))
}

/// Persist generated dialogue turns as `script.json` inside `dir`.
pub fn save_turns(dir: &Path, turns: &[DialogueTurn]) -> ReelResult<PathBuf> {
    write_json_file(dir, "script.json", turns)
}

/// Persist the timed script inside `dir`; returns the written path.
pub fn save_timed_script(dir: &Path, timed: &[TimedTurn]) -> ReelResult<PathBuf> {
    let path = write_json_file(dir, TIMED_SCRIPT_FILE, timed)?;
    tracing::info!(path = %path.display(), turns = timed.len(), "saved timed script");
    Ok(path)
}

/// Load a previously persisted timed script.
pub fn load_timed_script(path: &Path) -> ReelResult<Vec<TimedTurn>> {
    let raw = read_json_file(path, "timed script")?;
    let timed: Vec<TimedTurn> = serde_json::from_str(&raw)
        .map_err(|e| ReelError::serde(format!("timed script '{}': {e}", path.display())))?;
    for (idx, t) in timed.iter().enumerate() {
        if t.start_time_ms.checked_add(t.duration_ms) != Some(t.end_time_ms) {
            return Err(ReelError::malformed(format!(
                "timed script '{}' turn {}: end_time_ms != start_time_ms + duration_ms",
                path.display(),
                idx + 1
            )));
        }
    }
    Ok(timed)
}

fn read_json_file(path: &Path, what: &str) -> ReelResult<String> {
    if !path.is_file() {
        return Err(ReelError::missing_asset(format!(
            "{what} file not found: {}",
            path.display()
        )));
    }
    use anyhow::Context as _;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} '{}'", path.display()))?;
    Ok(raw)
}

fn write_json_file<T: serde::Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    value: &T,
) -> ReelResult<PathBuf> {
    use anyhow::Context as _;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(path)
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
