use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{ReelError, ReelResult},
    layout::placement::{Anchor, HorizontalAnchor, PlacementSpec},
};

/// A speaker's voice, artwork and on-screen placement.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CharacterProfile {
    pub name: String,
    pub voice_id: Option<String>,
    pub image_path: PathBuf,
    pub placement: PlacementSpec,
}

/// Characters keyed by speaker name, passed explicitly through the pipeline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CharacterCatalog {
    entries: BTreeMap<String, CharacterProfile>,
}

#[derive(serde::Deserialize)]
struct RawCharacter {
    #[serde(default)]
    voice_id: Option<String>,
    #[serde(default)]
    image_path: Option<PathBuf>,
    #[serde(default = "default_character_anchor")]
    position: Anchor,
    #[serde(default)]
    offset_x: i32,
    #[serde(default)]
    offset_y: i32,
}

fn default_character_anchor() -> Anchor {
    Anchor::Named(HorizontalAnchor::Center)
}

impl CharacterCatalog {
    pub fn from_profiles(profiles: impl IntoIterator<Item = CharacterProfile>) -> Self {
        Self {
            entries: profiles
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    /// Parse a catalog document: an object keyed by character name, or a one-element list
    /// wrapping such an object. Entries that are not objects, fail to parse, or have no
    /// `image_path` are skipped with a warning.
    pub fn from_json_str(raw: &str) -> ReelResult<Self> {
        let doc: serde_json::Value = serde_json::from_str(raw)?;
        let map = match doc {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Array(mut items) if !items.is_empty() => match items.swap_remove(0) {
                serde_json::Value::Object(map) => map,
                _ => {
                    return Err(ReelError::malformed(
                        "character catalog list must wrap an object",
                    ));
                }
            },
            _ => {
                return Err(ReelError::malformed(
                    "character catalog must be an object keyed by character name",
                ));
            }
        };

        let mut entries = BTreeMap::new();
        for (name, value) in map {
            let raw: RawCharacter = match serde_json::from_value(value) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(character = name.as_str(), error = %e, "skipping malformed character entry");
                    continue;
                }
            };
            let Some(image_path) = raw.image_path else {
                tracing::warn!(character = name.as_str(), "skipping character without image_path");
                continue;
            };
            let voice_id = raw.voice_id.filter(|v| !v.trim().is_empty());
            let placement = PlacementSpec::new(raw.position).with_offset(raw.offset_x, raw.offset_y);
            entries.insert(
                name.clone(),
                CharacterProfile {
                    name,
                    voice_id,
                    image_path,
                    placement,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> ReelResult<Self> {
        let raw = read_catalog_file(path, "character catalog")?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), characters = catalog.len(), "loaded character catalog");
        Ok(catalog)
    }

    pub fn get(&self, speaker: &str) -> Option<&CharacterProfile> {
        self.entries.get(speaker.trim())
    }

    /// Voice for `speaker`, falling back to `default_voice`.
    pub fn voice_for<'a>(&'a self, speaker: &str, default_voice: Option<&'a str>) -> Option<&'a str> {
        self.get(speaker)
            .and_then(|p| p.voice_id.as_deref())
            .or(default_voice)
    }

    /// Restrict the catalog to the characters a scene names. Unknown names are logged.
    pub fn subset(&self, names: &[String]) -> Self {
        let mut entries = BTreeMap::new();
        for name in names {
            match self.get(name) {
                Some(p) => {
                    entries.insert(p.name.clone(), p.clone());
                }
                None => tracing::warn!(character = name.as_str(), "character not in catalog"),
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterProfile> {
        self.entries.values()
    }
}

/// A selectable scene: a prompt template and the two characters who perform it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Prompt")]
    pub prompt: String,
    #[serde(rename = "DefaultTopic", default)]
    pub default_topic: String,
    #[serde(rename = "Characters", default)]
    pub characters: Vec<String>,
}

impl Scene {
    /// System prompt for `topic`; templates without a `{topic}` placeholder pass through.
    pub fn render_prompt(&self, topic: &str) -> String {
        self.prompt.replace("{topic}", topic)
    }

    /// `topic` if non-blank, otherwise the scene's default topic.
    pub fn topic_or_default<'a>(&'a self, topic: Option<&'a str>) -> ReelResult<&'a str> {
        let chosen = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.default_topic.trim());
        if chosen.is_empty() {
            return Err(ReelError::validation(format!(
                "scene '{}' has no default topic; a topic is required",
                self.title
            )));
        }
        Ok(chosen)
    }
}

/// Parse a scene catalog (a JSON list), skipping entries that are not well-formed scenes.
pub fn parse_scenes(raw: &str) -> ReelResult<Vec<Scene>> {
    let doc: serde_json::Value = serde_json::from_str(raw)?;
    let serde_json::Value::Array(items) = doc else {
        return Err(ReelError::malformed("scene catalog must be a JSON list"));
    };
    let mut scenes = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Scene>(item) {
            Ok(scene) => scenes.push(scene),
            Err(e) => tracing::warn!(index = idx, error = %e, "skipping malformed scene entry"),
        }
    }
    Ok(scenes)
}

pub fn load_scenes(path: &Path) -> ReelResult<Vec<Scene>> {
    let raw = read_catalog_file(path, "scene catalog")?;
    parse_scenes(&raw)
}

/// Find a scene by 1-based index or case-insensitive title.
pub fn select_scene<'a>(scenes: &'a [Scene], key: &str) -> ReelResult<&'a Scene> {
    let key = key.trim();
    if let Ok(n) = key.parse::<usize>()
        && n >= 1
        && let Some(scene) = scenes.get(n - 1)
    {
        return Ok(scene);
    }
    scenes
        .iter()
        .find(|s| s.title.eq_ignore_ascii_case(key))
        .ok_or_else(|| ReelError::validation(format!("no scene matches '{key}'")))
}

/// Filesystem-friendly project name derived from a scene title and topic.
pub fn project_name(scene_title: &str, topic: &str) -> String {
    format!("{}_{}", clean_name_part(scene_title), clean_name_part(topic))
}

fn clean_name_part(s: &str) -> String {
    s.replace(' ', "_")
        .replace(['(', ')'], "")
        .replace('&', "and")
}

fn read_catalog_file(path: &Path, what: &str) -> ReelResult<String> {
    if !path.is_file() {
        return Err(ReelError::missing_asset(format!(
            "{what} not found: {}",
            path.display()
        )));
    }
    use anyhow::Context as _;
    Ok(std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} '{}'", path.display()))?)
}

#[cfg(test)]
#[path = "../../tests/unit/config/catalog.rs"]
mod tests;
