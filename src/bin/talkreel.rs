use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use talkreel::{
    CharacterCatalog, FfmpegMedia, FfmpegRenderer, FishAudioConfig, FishAudioSpeech,
    MediaToolkit as _, OpenAiDialogue, Pipeline, PipelineSettings, ProjectLayout, ReelError,
    ReelResult, SpeechClip, SpeechSynthesizer, VideoInfo, generate_script, load_scenes,
    load_timed_script, load_turns, ms_to_secs, plan_render, project_name, select_scene,
    timeline_duration_ms,
};

#[derive(Parser, Debug)]
#[command(name = "talkreel", version)]
struct Cli {
    /// Pipeline settings JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate (or load) a script, narrate it and render the final video.
    Run(RunArgs),
    /// Render a video from a persisted timed script and collated narration.
    Compose(ComposeArgs),
    /// Print the render list for a timed script as JSON without rendering.
    Plan(PlanArgs),
    /// Print the default pipeline settings as JSON.
    PrintDefaultConfig,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Character catalog JSON.
    #[arg(long)]
    characters: PathBuf,

    /// Background video.
    #[arg(long)]
    background: PathBuf,

    /// Directory that holds one folder per project.
    #[arg(long, default_value = "projects")]
    projects: PathBuf,

    /// Scene catalog JSON; the script is generated from the chosen scene.
    #[arg(long, requires = "scene", conflicts_with = "script")]
    scenes: Option<PathBuf>,

    /// Scene title or 1-based index in the scene catalog.
    #[arg(long)]
    scene: Option<String>,

    /// Topic to explain; the scene's default topic is used when omitted.
    #[arg(long)]
    topic: Option<String>,

    /// Existing `script.json` to narrate instead of generating one.
    #[arg(long, required_unless_present = "scenes")]
    script: Option<PathBuf>,

    /// Project name for `--script` runs (defaults to the script's folder name).
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Character catalog JSON.
    #[arg(long)]
    characters: PathBuf,

    /// Timed script JSON.
    #[arg(long)]
    timed_script: PathBuf,

    /// Collated narration track.
    #[arg(long)]
    audio: PathBuf,

    /// Background video.
    #[arg(long)]
    background: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Character catalog JSON.
    #[arg(long)]
    characters: PathBuf,

    /// Timed script JSON.
    #[arg(long)]
    timed_script: PathBuf,

    /// Background video (probed with `ffprobe` unless its size and length are given).
    #[arg(long)]
    background: PathBuf,

    #[arg(long, requires_all = ["background_height", "background_duration"])]
    background_width: Option<u32>,

    #[arg(long, requires_all = ["background_width", "background_duration"])]
    background_height: Option<u32>,

    /// Background length in seconds.
    #[arg(long, requires_all = ["background_width", "background_height"])]
    background_duration: Option<f64>,

    /// Target length in milliseconds (defaults to the end of the timed script).
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Write the JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let settings_path = cli.settings.as_deref();
    match cli.cmd {
        Command::Run(args) => cmd_run(settings_path, args),
        Command::Compose(args) => cmd_compose(settings_path, args),
        Command::Plan(args) => cmd_plan(settings_path, args),
        Command::PrintDefaultConfig => {
            println!("{}", PipelineSettings::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_run(settings_path: Option<&Path>, args: RunArgs) -> anyhow::Result<()> {
    let settings = PipelineSettings::load(settings_path)?;
    let mut catalog = CharacterCatalog::load(&args.characters)?;

    let (turns, project) = match (&args.scenes, &args.script) {
        (Some(scenes_path), _) => {
            let scenes = load_scenes(scenes_path)?;
            let key = args.scene.as_deref().unwrap_or_default();
            let scene = select_scene(&scenes, key)?;
            let topic = scene.topic_or_default(args.topic.as_deref())?;
            let project = ProjectLayout::new(&args.projects, project_name(&scene.title, topic));
            if !scene.characters.is_empty() {
                catalog = catalog.subset(&scene.characters);
            }
            let generator = OpenAiDialogue::from_env(settings.llm_model.clone())?;
            let turns = generate_script(&generator, scene, topic, &project)
                .with_context(|| format!("generate script for scene '{}'", scene.title))?;
            (turns, project)
        }
        (None, Some(script)) => {
            let turns = load_turns(script)?;
            let name = match &args.name {
                Some(name) => name.clone(),
                None => script_folder_name(script)?,
            };
            (turns, ProjectLayout::new(&args.projects, name))
        }
        (None, None) => anyhow::bail!("either --scenes or --script is required"),
    };

    let renderer = FfmpegRenderer::new(settings.captions.clone());
    let pipeline = Pipeline::new(
        settings,
        catalog,
        Arc::new(FishAudioSpeech::from_env(FishAudioConfig::default())?),
        Arc::new(FfmpegMedia::default()),
        Arc::new(renderer),
    )?;
    let out = pipeline.run(&turns, &args.background, &project)?;

    eprintln!("wrote {}", out.narration.timed_script.display());
    eprintln!("wrote {}", out.video.display());
    Ok(())
}

fn script_folder_name(script: &Path) -> anyhow::Result<String> {
    let abs = std::path::absolute(script)
        .with_context(|| format!("resolve script path '{}'", script.display()))?;
    abs.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive a project name from '{}'; pass --name", script.display()))
}

/// Stand-in for commands that never synthesize speech.
struct NoSpeech;

impl SpeechSynthesizer for NoSpeech {
    fn synthesize(&self, _voice_id: &str, _text: &str) -> ReelResult<SpeechClip> {
        Err(ReelError::service("speech synthesis is not available for this command"))
    }
}

fn cmd_compose(settings_path: Option<&Path>, args: ComposeArgs) -> anyhow::Result<()> {
    let settings = PipelineSettings::load(settings_path)?;
    let catalog = CharacterCatalog::load(&args.characters)?;
    let timed = load_timed_script(&args.timed_script)?;

    let renderer = FfmpegRenderer::new(settings.captions.clone());
    let pipeline = Pipeline::new(
        settings,
        catalog,
        Arc::new(NoSpeech),
        Arc::new(FfmpegMedia::default()),
        Arc::new(renderer),
    )?;
    pipeline.compose(&timed, &args.background, &args.audio, None, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(settings_path: Option<&Path>, args: PlanArgs) -> anyhow::Result<()> {
    let settings = PipelineSettings::load(settings_path)?;
    let catalog = CharacterCatalog::load(&args.characters)?;
    let timed = load_timed_script(&args.timed_script)?;

    let info = match (
        args.background_width,
        args.background_height,
        args.background_duration,
    ) {
        (Some(width), Some(height), Some(duration_s)) => VideoInfo {
            width,
            height,
            duration_s,
        },
        _ => FfmpegMedia::default().probe_video(&args.background)?,
    };
    let duration_ms = args
        .duration_ms
        .unwrap_or_else(|| timeline_duration_ms(&timed));

    let list = plan_render(
        &settings,
        &catalog,
        &timed,
        &args.background,
        &info,
        ms_to_secs(duration_ms),
    )?;
    let json = list.to_json_pretty()?;

    match &args.out {
        Some(out) => {
            talkreel::ensure_parent_dir(out)?;
            std::fs::write(out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
