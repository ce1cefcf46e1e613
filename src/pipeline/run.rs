use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use rayon::prelude::*;

use crate::{
    composition::{
        assemble::assemble,
        events::{caption_events, character_events, image_size},
        model::{RenderList, VideoInfo},
    },
    config::{
        catalog::{CharacterCatalog, Scene},
        settings::PipelineSettings,
    },
    encode::ffmpeg::VideoRenderer,
    foundation::core::ms_to_secs,
    foundation::error::{ReelError, ReelResult},
    pipeline::project::ProjectLayout,
    script::{
        model::{DialogueTurn, TimedTurn, save_timed_script, save_turns, timeline_duration_ms},
        timeline::build_timeline,
    },
    services::{dialogue::DialogueGenerator, media::MediaToolkit, speech::SpeechSynthesizer},
};

/// Audio written for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnAudio {
    pub path: PathBuf,
    /// Provider-reported length, or the measured one.
    pub duration_ms: u64,
}

/// Result of the narration phase.
#[derive(Clone, Debug, PartialEq)]
pub struct Narration {
    pub timed: Vec<TimedTurn>,
    pub combined_audio: PathBuf,
    pub timed_script: PathBuf,
    /// Length of the collated track, falling back to the timeline length.
    pub duration_ms: u64,
}

/// Outputs of a full run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    pub narration: Narration,
    pub render_list: RenderList,
    pub video: PathBuf,
}

/// Everything downstream of the script: speech, timing, composition and render.
///
/// Configuration and the character catalog are owned here and threaded through every stage.
pub struct Pipeline {
    pub settings: PipelineSettings,
    pub catalog: CharacterCatalog,
    speech: Arc<dyn SpeechSynthesizer>,
    media: Arc<dyn MediaToolkit>,
    renderer: Arc<dyn VideoRenderer>,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        catalog: CharacterCatalog,
        speech: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaToolkit>,
        renderer: Arc<dyn VideoRenderer>,
    ) -> ReelResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            catalog,
            speech,
            media,
            renderer,
        })
    }

    /// Speech, timing, composition and render for an existing script.
    #[tracing::instrument(skip_all, fields(project = project.name.as_str(), turns = turns.len()))]
    pub fn run(
        &self,
        turns: &[DialogueTurn],
        background: &Path,
        project: &ProjectLayout,
    ) -> ReelResult<RunOutput> {
        if !background.is_file() {
            return Err(ReelError::composition(format!(
                "background video not found: {}",
                background.display()
            )));
        }
        let narration = self.narrate(turns, project)?;
        let video = project.final_video();
        let render_list = self.compose(
            &narration.timed,
            background,
            &narration.combined_audio,
            Some(narration.duration_ms),
            &video,
        )?;
        tracing::info!(path = %video.display(), "run complete");
        Ok(RunOutput {
            narration,
            render_list,
            video,
        })
    }

    /// Synthesize every turn, collate the narration and persist the timed script.
    pub fn narrate(&self, turns: &[DialogueTurn], project: &ProjectLayout) -> ReelResult<Narration> {
        let audio = self.synthesize_turns(turns, project)?;

        let segments: Vec<Option<PathBuf>> = audio
            .iter()
            .map(|a| a.as_ref().map(|a| a.path.clone()))
            .collect();
        let combined_audio = project.combined_audio();
        self.media
            .concatenate(&segments, self.settings.gap_ms, &combined_audio)
            .map_err(|e| ReelError::composition(format!("narration collation failed: {e}")))?;

        let timed = build_timeline(
            turns,
            |i| audio.get(i).and_then(|a| a.as_ref()).map(|a| a.duration_ms),
            self.settings.gap_ms,
        );
        let timed_script = save_timed_script(&project.audio_dir(), &timed)?;

        let duration_ms = match self.media.measure_duration_ms(&combined_audio) {
            Ok(ms) => ms,
            Err(e) => {
                let fallback = timeline_duration_ms(&timed);
                tracing::warn!(error = %e, fallback_ms = fallback, "could not measure collated narration");
                fallback
            }
        };

        Ok(Narration {
            timed,
            combined_audio,
            timed_script,
            duration_ms,
        })
    }

    /// Write one audio file per turn and determine its duration.
    ///
    /// Results are indexed like `turns`. Any per-turn failure (no voice, synthesis, write or
    /// measurement) yields `None` and a warning; the run continues.
    pub fn synthesize_turns(
        &self,
        turns: &[DialogueTurn],
        project: &ProjectLayout,
    ) -> ReelResult<Vec<Option<TurnAudio>>> {
        let audio_dir = project.audio_dir();
        use anyhow::Context as _;
        std::fs::create_dir_all(&audio_dir)
            .with_context(|| format!("failed to create '{}'", audio_dir.display()))?;

        let indexed: Vec<(usize, &DialogueTurn)> = turns.iter().enumerate().collect();
        let audio = if self.settings.parallel_synthesis && turns.len() > 1 {
            let pool = build_thread_pool(self.settings.synthesis_threads)?;
            pool.install(|| {
                indexed
                    .par_iter()
                    .map(|(i, turn)| self.synthesize_one(*i, turn, project))
                    .collect::<Vec<_>>()
            })
        } else {
            indexed
                .iter()
                .map(|(i, turn)| self.synthesize_one(*i, turn, project))
                .collect()
        };

        let produced = audio.iter().filter(|a| a.is_some()).count();
        tracing::info!(produced, total = turns.len(), "speech synthesis finished");
        Ok(audio)
    }

    fn synthesize_one(&self, idx: usize, turn: &DialogueTurn, project: &ProjectLayout) -> Option<TurnAudio> {
        let Some(voice) = self
            .catalog
            .voice_for(&turn.speaker, self.settings.default_voice_id.as_deref())
        else {
            tracing::warn!(turn = idx + 1, speaker = turn.speaker.as_str(), "no voice for speaker; skipping turn audio");
            return None;
        };

        let clip = match self.speech.synthesize(voice, &turn.text) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!(turn = idx + 1, speaker = turn.speaker.as_str(), error = %e, "speech synthesis failed");
                return None;
            }
        };

        let path = project.turn_audio(idx, &turn.speaker);
        if let Err(e) = std::fs::write(&path, &clip.bytes) {
            tracing::warn!(turn = idx + 1, path = %path.display(), error = %e, "failed to write turn audio");
            return None;
        }

        // unmeasured audio stays out of the collated track
        let duration_ms = match clip.duration_ms {
            Some(ms) => ms,
            None => match self.media.measure_duration_ms(&path) {
                Ok(ms) => ms,
                Err(e) => {
                    tracing::warn!(turn = idx + 1, path = %path.display(), error = %e, "could not measure turn audio");
                    return None;
                }
            },
        };
        tracing::debug!(turn = idx + 1, duration_ms, path = %path.display(), "turn audio ready");
        Some(TurnAudio { path, duration_ms })
    }

    /// Build the render list for a timed script without rendering it.
    pub fn plan(
        &self,
        timed: &[TimedTurn],
        background: &Path,
        background_info: &VideoInfo,
        target_duration_s: f64,
    ) -> ReelResult<RenderList> {
        plan_render(
            &self.settings,
            &self.catalog,
            timed,
            background,
            background_info,
            target_duration_s,
        )
    }

    /// Compose and render the final video from a timed script and its collated narration.
    ///
    /// `duration_ms` overrides measuring `audio_track`.
    pub fn compose(
        &self,
        timed: &[TimedTurn],
        background: &Path,
        audio_track: &Path,
        duration_ms: Option<u64>,
        out: &Path,
    ) -> ReelResult<RenderList> {
        if !background.is_file() {
            return Err(ReelError::composition(format!(
                "background video not found: {}",
                background.display()
            )));
        }
        if !audio_track.is_file() {
            return Err(ReelError::composition(format!(
                "collated narration not found: {}",
                audio_track.display()
            )));
        }

        let info = self
            .media
            .probe_video(background)
            .map_err(|e| ReelError::composition(format!("background probe failed: {e}")))?;
        let duration_ms = match duration_ms {
            Some(ms) => ms,
            None => self.media.measure_duration_ms(audio_track).unwrap_or_else(|e| {
                let fallback = timeline_duration_ms(timed);
                tracing::warn!(error = %e, fallback_ms = fallback, "could not measure narration");
                fallback
            }),
        };

        let list = self.plan(timed, background, &info, ms_to_secs(duration_ms))?;
        self.renderer.render(&list, audio_track, out)?;
        Ok(list)
    }
}

/// Caption and character events assembled over the background.
pub fn plan_render(
    settings: &PipelineSettings,
    catalog: &CharacterCatalog,
    timed: &[TimedTurn],
    background: &Path,
    background_info: &VideoInfo,
    target_duration_s: f64,
) -> ReelResult<RenderList> {
    let canvas = settings.canvas;
    let captions = caption_events(timed, &settings.captions, canvas, settings.words_per_chunk);
    let characters = character_events(timed, catalog, &settings.characters, canvas, image_size);
    tracing::debug!(
        captions = captions.len(),
        characters = characters.len(),
        "built visual events"
    );
    assemble(
        background,
        background_info,
        &characters,
        &captions,
        canvas,
        settings.fps,
        target_duration_s,
    )
}

/// Ask `generator` for a script for `topic` in `scene` and save it as the project's `script.json`.
pub fn generate_script(
    generator: &dyn DialogueGenerator,
    scene: &Scene,
    topic: &str,
    project: &ProjectLayout,
) -> ReelResult<Vec<DialogueTurn>> {
    let prompt = scene.render_prompt(topic);
    let turns = generator.generate(topic, &prompt)?;
    let path = save_turns(&project.dir, &turns)?;
    tracing::info!(path = %path.display(), turns = turns.len(), "saved script");
    Ok(turns)
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "synthesis_threads must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
