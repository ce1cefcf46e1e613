use std::path::{Path, PathBuf};

use crate::script::model::TIMED_SCRIPT_FILE;

/// File name of the collated narration track inside the audio folder.
pub const COMBINED_AUDIO_FILE: &str = "combined_dialogue.mp3";

/// On-disk layout of one project: `<root>/<name>/{script.json, audio/, <name>_final.mp4}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    pub name: String,
    pub dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(projects_root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dir: projects_root.join(&name),
            name,
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.dir.join("script.json")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.dir.join("audio")
    }

    /// `audio/turn_003_Rick.mp3` for the third turn.
    pub fn turn_audio(&self, index: usize, speaker: &str) -> PathBuf {
        self.audio_dir()
            .join(format!("turn_{:03}_{}.mp3", index + 1, file_safe(speaker)))
    }

    pub fn combined_audio(&self) -> PathBuf {
        self.audio_dir().join(COMBINED_AUDIO_FILE)
    }

    pub fn timed_script(&self) -> PathBuf {
        self.audio_dir().join(TIMED_SCRIPT_FILE)
    }

    pub fn final_video(&self) -> PathBuf {
        self.dir.join(format!("{}_final.mp4", self.name))
    }
}

fn file_safe(speaker: &str) -> String {
    speaker
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
