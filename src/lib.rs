//! talkreel turns a two-character dialogue script into a narrated short-form video.
//!
//! # Pipeline overview
//!
//! 1. **Script**: a topic and scene prompt become ordered [`DialogueTurn`]s
//!    (via a [`DialogueGenerator`], or loaded from `script.json`).
//! 2. **Narrate**: every turn is synthesized ([`SpeechSynthesizer`]), measured and collated
//!    with fixed silent gaps ([`MediaToolkit`]); [`build_timeline`] places the turns on an
//!    absolute timeline that is persisted as `timed_script.json`.
//! 3. **Compose**: captions are chunked by word count ([`chunk`]), characters are shown while
//!    they speak, and [`assemble`] resolves every placement ([`resolve`]) into a z-ordered
//!    [`RenderList`] over a fitted, looped or truncated background.
//! 4. **Render**: a [`VideoRenderer`] (the system `ffmpeg` by default) writes the final MP4.
//!
//! External services sit behind traits so every stage can run against fakes.
#![forbid(unsafe_code)]

pub mod captions;
pub mod composition;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod layout;
pub mod pipeline;
pub mod script;
pub mod services;

pub use captions::chunker::{CaptionChunk, chunk};
pub use composition::assemble::{assemble, plan_background};
pub use composition::events::{caption_events, character_events, image_size};
pub use composition::model::{
    BackgroundPlan, CanvasFit, DurationPolicy, ElementContent, LayerContent, RenderEntry,
    RenderList, TextAlign, VideoInfo, VisualElement, Z_BACKGROUND, Z_CAPTION, Z_CHARACTER,
};
pub use config::catalog::{
    CharacterCatalog, CharacterProfile, Scene, load_scenes, parse_scenes, project_name,
    select_scene,
};
pub use config::settings::{CaptionStyle, CharacterLayout, PipelineSettings};
pub use encode::ffmpeg::{
    FfmpegRenderer, VideoRenderer, ensure_parent_dir, filter_graph, is_tool_on_path, render_args,
};
pub use foundation::core::{Canvas, Fps, Point, Size, ms_to_secs};
pub use foundation::error::{ReelError, ReelResult};
pub use layout::placement::{Anchor, HorizontalAnchor, PlacementSpec, resolve};
pub use pipeline::project::{COMBINED_AUDIO_FILE, ProjectLayout};
pub use pipeline::run::{Narration, Pipeline, RunOutput, TurnAudio, generate_script, plan_render};
pub use script::model::{
    DialogueTurn, TIMED_SCRIPT_FILE, TimedTurn, UNKNOWN_SPEAKER, load_timed_script, load_turns,
    save_timed_script, save_turns, timeline_duration_ms,
};
pub use script::timeline::build_timeline;
pub use services::dialogue::{DialogueGenerator, OPENAI_API_KEY_ENV, OpenAiDialogue};
pub use services::media::{FfmpegMedia, MediaToolkit};
pub use services::speech::{
    FISH_AUDIO_API_KEY_ENV, FishAudioConfig, FishAudioSpeech, SpeechClip, SpeechSynthesizer,
};
