use std::path::{Path, PathBuf};

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{ReelError, ReelResult},
    layout::placement::{Anchor, HorizontalAnchor, PlacementSpec},
};

/// Knobs for one pipeline run. Every section falls back to its default when omitted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Silence inserted after every turn, in milliseconds.
    pub gap_ms: u64,
    pub words_per_chunk: usize,
    pub captions: CaptionStyle,
    pub characters: CharacterLayout,
    /// Voice for speakers whose catalog entry has no `voice_id`.
    pub default_voice_id: Option<String>,
    pub llm_model: String,
    pub parallel_synthesis: bool,
    /// Worker count for parallel synthesis; `None` lets rayon decide.
    pub synthesis_threads: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::PORTRAIT_1080P,
            fps: Fps::default(),
            gap_ms: 500,
            words_per_chunk: 6,
            captions: CaptionStyle::default(),
            characters: CharacterLayout::default(),
            default_voice_id: None,
            llm_model: "gpt-4o".to_string(),
            parallel_synthesis: false,
            synthesis_threads: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub placement: PlacementSpec,
    /// Font name handed to fontconfig.
    pub font: String,
    /// Explicit font file; takes precedence over `font`.
    pub font_file: Option<PathBuf>,
    pub font_size: u32,
    pub color: String,
    pub stroke_color: Option<String>,
    pub stroke_width: u32,
    /// Caption box width as a fraction of canvas width.
    pub box_width_fraction: f64,
    pub box_height_px: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            placement: PlacementSpec::new(Anchor::Relative(HorizontalAnchor::Center, 0.7)),
            font: "Arial-Bold".to_string(),
            font_file: None,
            font_size: 100,
            color: "#FFFF00".to_string(),
            stroke_color: None,
            stroke_width: 0,
            box_width_fraction: 0.9,
            box_height_px: 900.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CharacterLayout {
    /// Rendered character height as a fraction of canvas height.
    pub height_fraction: f64,
    /// Gap below bottom-anchored characters as a fraction of canvas height.
    pub base_margin_fraction: f64,
}

impl Default for CharacterLayout {
    fn default() -> Self {
        Self {
            height_fraction: 0.55,
            base_margin_fraction: 0.0,
        }
    }
}

impl PipelineSettings {
    /// Load settings from a JSON file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> ReelResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.is_file() {
            return Err(ReelError::missing_asset(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        use anyhow::Context as _;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&raw)
            .map_err(|e| ReelError::serde(format!("settings '{}': {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if self.words_per_chunk == 0 {
            return Err(ReelError::validation("words_per_chunk must be > 0"));
        }
        if self.synthesis_threads == Some(0) {
            return Err(ReelError::validation("synthesis_threads must be > 0 when set"));
        }
        if self.llm_model.trim().is_empty() {
            return Err(ReelError::validation("llm_model must not be empty"));
        }

        let c = &self.captions;
        check_fraction("captions.box_width_fraction", c.box_width_fraction, false)?;
        check_fraction(
            "captions.placement.base_margin_fraction",
            c.placement.base_margin_fraction,
            true,
        )?;
        if !(c.box_height_px.is_finite() && c.box_height_px > 0.0) {
            return Err(ReelError::validation("captions.box_height_px must be > 0"));
        }
        if c.font_size == 0 {
            return Err(ReelError::validation("captions.font_size must be > 0"));
        }
        if c.color.trim().is_empty() {
            return Err(ReelError::validation("captions.color must not be empty"));
        }

        check_fraction("characters.height_fraction", self.characters.height_fraction, false)?;
        check_fraction(
            "characters.base_margin_fraction",
            self.characters.base_margin_fraction,
            true,
        )?;
        Ok(())
    }
}

fn check_fraction(name: &str, v: f64, allow_zero: bool) -> ReelResult<()> {
    let lower_ok = if allow_zero { v >= 0.0 } else { v > 0.0 };
    if v.is_finite() && lower_ok && v <= 1.0 {
        Ok(())
    } else {
        Err(ReelError::validation(format!(
            "{name} must be in {}0, 1], got {v}",
            if allow_zero { "[" } else { "(" }
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
