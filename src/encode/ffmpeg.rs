use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    composition::model::{
        CanvasFit, DurationPolicy, LayerContent, RenderEntry, RenderList, TextAlign,
    },
    config::settings::CaptionStyle,
    foundation::core::{Point, Size},
    foundation::error::{ReelError, ReelResult},
};

/// Produces the final video from a render list and the collated narration.
pub trait VideoRenderer: Send + Sync {
    fn render(&self, list: &RenderList, audio_track: &Path, out: &Path) -> ReelResult<()>;
}

/// [`VideoRenderer`] that builds one `ffmpeg` filter graph for the whole video.
#[derive(Clone, Debug)]
pub struct FfmpegRenderer {
    pub ffmpeg: PathBuf,
    pub captions: CaptionStyle,
}

impl FfmpegRenderer {
    pub fn new(captions: CaptionStyle) -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            captions,
        }
    }
}

impl VideoRenderer for FfmpegRenderer {
    #[tracing::instrument(skip(self, list), fields(entries = list.entries.len(), duration_s = list.duration_s))]
    fn render(&self, list: &RenderList, audio_track: &Path, out: &Path) -> ReelResult<()> {
        if !list.background.source.is_file() {
            return Err(ReelError::composition(format!(
                "background video not found: {}",
                list.background.source.display()
            )));
        }
        if !audio_track.is_file() {
            return Err(ReelError::composition(format!(
                "collated narration not found: {}",
                audio_track.display()
            )));
        }
        list.canvas.validate()?;
        if !is_tool_on_path(&self.ffmpeg) {
            return Err(ReelError::composition(
                "ffmpeg is required for rendering, but was not found on PATH",
            ));
        }

        ensure_parent_dir(out)?;
        let partial = partial_path(out);
        let args = render_args(list, &self.captions, audio_track, &partial);
        tracing::debug!(graph = %filter_graph(list, &self.captions), "ffmpeg filter graph");

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(&args);
        if let Err(e) = run_tool(&mut cmd, "ffmpeg") {
            let _ = std::fs::remove_file(&partial);
            return Err(match e {
                ReelError::Service(msg) => ReelError::Composition(msg),
                other => other,
            });
        }

        use anyhow::Context as _;
        std::fs::rename(&partial, out).with_context(|| {
            format!(
                "failed to move '{}' to '{}'",
                partial.display(),
                out.display()
            )
        })?;
        tracing::info!(path = %out.display(), "rendered video");
        Ok(())
    }
}

/// Sibling file ffmpeg writes into before the final rename.
pub fn partial_path(out: &Path) -> PathBuf {
    let name = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out.with_file_name(format!("{name}.partial.mp4"))
}

/// Full ffmpeg argument list: inputs, filter graph and encoder settings.
///
/// Input 0 is the background, input 1 the narration, inputs 2.. one looped still per distinct
/// character image.
pub fn render_args(
    list: &RenderList,
    style: &CaptionStyle,
    audio_track: &Path,
    out: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |a: &str| args.push(OsString::from(a));
    push("-y");
    push("-hide_banner");
    push("-loglevel");
    push("error");
    if list.background.duration_policy == DurationPolicy::Loop {
        push("-stream_loop");
        push("-1");
    }

    args.push("-i".into());
    args.push(list.background.source.as_os_str().to_owned());
    args.push("-i".into());
    args.push(audio_track.as_os_str().to_owned());
    for layer in image_layers(&list.entries) {
        for a in ["-loop", "1", "-i"] {
            args.push(a.into());
        }
        args.push(layer.path.as_os_str().to_owned());
    }

    let tail = [
        "-filter_complex".to_string(),
        filter_graph(list, style),
        "-map".to_string(),
        "[vout]".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-t".to_string(),
        format!("{:.3}", list.duration_s),
        "-r".to_string(),
        format!("{}/{}", list.fps.num, list.fps.den),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "libmp3lame".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ];
    args.extend(tail.into_iter().map(OsString::from));
    args.push(out.as_os_str().to_owned());
    args
}

/// Character entries sharing an image and placement become one overlay with a combined enable
/// expression.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayer {
    pub path: PathBuf,
    pub position: Point,
    pub size: Size,
    pub windows: Vec<(f64, f64)>,
}

pub fn image_layers(entries: &[RenderEntry]) -> Vec<ImageLayer> {
    let mut layers: Vec<ImageLayer> = Vec::new();
    for entry in entries {
        let LayerContent::Image { path } = &entry.layer else {
            continue;
        };
        let window = (entry.start_s, entry.end_s);
        match layers
            .iter_mut()
            .find(|l| &l.path == path && l.position == entry.position && l.size == entry.size)
        {
            Some(layer) => layer.windows.push(window),
            None => layers.push(ImageLayer {
                path: path.clone(),
                position: entry.position,
                size: entry.size,
                windows: vec![window],
            }),
        }
    }
    layers
}

/// Build the `-filter_complex` graph; its output label is `[vout]`.
pub fn filter_graph(list: &RenderList, style: &CaptionStyle) -> String {
    let (cw, ch) = (list.canvas.width, list.canvas.height);
    let bg = &list.background;
    let scaled_w = bg.scaled.width.round() as i64;

    let fit = match bg.fit {
        CanvasFit::Crop { x } => format!("scale={scaled_w}:{ch},crop={cw}:{ch}:{}:0", x.round() as i64),
        CanvasFit::Pad { left } => {
            format!("scale={scaled_w}:{ch},pad={cw}:{ch}:{}:0:black", left.round() as i64)
        }
        CanvasFit::None => format!("scale={cw}:{ch}"),
    };
    let mut chains = vec![format!(
        "[0:v]{fit},setsar=1,fps={}/{}[bg]",
        list.fps.num, list.fps.den
    )];

    let mut last = "bg".to_string();
    for (k, layer) in image_layers(&list.entries).iter().enumerate() {
        let input = k + 2;
        chains.push(format!(
            "[{input}:v]scale={}:{},format=rgba[img{k}]",
            even_px(layer.size.width),
            even_px(layer.size.height)
        ));
        let overlay = option_list(&[
            ("x", format!("{}", layer.position.x.round() as i64)),
            ("y", format!("{}", layer.position.y.round() as i64)),
            ("enable", enable_expr(&layer.windows)),
            ("eof_action", "repeat".to_string()),
        ]);
        chains.push(format!(
            "[{last}][img{k}]overlay={}[ov{k}]",
            quote_value(&overlay)
        ));
        last = format!("ov{k}");
    }

    let captions: Vec<String> = list
        .entries
        .iter()
        .filter_map(|e| match &e.layer {
            LayerContent::Caption { text, align } => Some(drawtext(e, text, *align, style)),
            LayerContent::Background { .. } | LayerContent::Image { .. } => None,
        })
        .collect();
    if captions.is_empty() {
        chains.push(format!("[{last}]null[vout]"));
    } else {
        chains.push(format!("[{last}]{}[vout]", captions.join(",")));
    }

    chains.join(";")
}

fn drawtext(entry: &RenderEntry, text: &str, align: TextAlign, style: &CaptionStyle) -> String {
    let box_x = entry.position.x.round() as i64;
    let box_y = entry.position.y.round() as i64;
    let box_w = entry.size.width.round() as i64;
    let box_h = entry.size.height.round() as i64;
    let x = match align {
        TextAlign::Left => format!("{box_x}"),
        TextAlign::Center => format!("{box_x}+({box_w}-text_w)/2"),
        TextAlign::Right => format!("{box_x}+{box_w}-text_w"),
    };
    let y = format!("{box_y}+({box_h}-text_h)/2");

    let mut opts: Vec<(&str, String)> = Vec::new();
    match &style.font_file {
        Some(file) => opts.push(("fontfile", file.to_string_lossy().replace('\\', "/"))),
        None => opts.push(("font", style.font.clone())),
    }
    opts.push(("text", wrap_caption(text, entry.size.width, style.font_size)));
    opts.push(("expansion", "none".to_string()));
    opts.push(("fontsize", style.font_size.to_string()));
    opts.push(("fontcolor", style.color.clone()));
    if let Some(stroke) = &style.stroke_color
        && style.stroke_width > 0
    {
        opts.push(("bordercolor", stroke.clone()));
        opts.push(("borderw", style.stroke_width.to_string()));
    }
    opts.push(("x", x));
    opts.push(("y", y));
    opts.push(("enable", enable_expr(&[(entry.start_s, entry.end_s)])));

    format!("drawtext={}", quote_value(&option_list(&opts)))
}

/// Greedy word wrap using an average glyph width of `0.55 * font_size`.
pub fn wrap_caption(text: &str, box_width: f64, font_size: u32) -> String {
    let glyph_w = 0.55 * f64::from(font_size.max(1));
    let max_chars = ((box_width / glyph_w).floor() as usize).max(1);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// `gte(t,s)*lt(t,e)` per window, summed; windows never overlap so the sum is 0 or 1.
pub fn enable_expr(windows: &[(f64, f64)]) -> String {
    windows
        .iter()
        .map(|(s, e)| format!("gte(t,{s:.3})*lt(t,{e:.3})"))
        .collect::<Vec<_>>()
        .join("+")
}

fn option_list(opts: &[(&str, String)]) -> String {
    opts.iter()
        .map(|(k, v)| format!("{k}={}", quote_value(v)))
        .collect::<Vec<_>>()
        .join(":")
}

/// Quote `s` for one level of ffmpeg option/filtergraph parsing when it contains special
/// characters. A literal `'` is written as `'\''`.
pub fn quote_value(s: &str) -> String {
    const SPECIAL: &[char] = &['\'', '\\', ':', ',', ';', '[', ']', '=', ' ', '\n', '%'];
    if !s.is_empty() && !s.contains(SPECIAL) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn even_px(v: f64) -> i64 {
    (((v / 2.0).round() as i64) * 2).max(2)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `tool -version` runs successfully.
pub fn is_tool_on_path(tool: &Path) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run an external tool to completion and return its stdout.
pub fn run_tool(cmd: &mut Command, name: &str) -> ReelResult<Vec<u8>> {
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelError::service(format!("failed to run {name} (is it on PATH?): {e}")))?;
    if !out.status.success() {
        return Err(ReelError::service(format!(
            "{name} exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(out.stdout)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
