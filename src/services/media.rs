use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    composition::model::VideoInfo,
    encode::ffmpeg::{ensure_parent_dir, run_tool},
    foundation::error::{ReelError, ReelResult},
};

/// Sample rate used for collated narration and generated silence.
pub const NARRATION_SAMPLE_RATE: u32 = 44_100;

/// Audio/video inspection and narration collation.
pub trait MediaToolkit: Send + Sync {
    /// Length of an audio file in whole milliseconds.
    fn measure_duration_ms(&self, path: &Path) -> ReelResult<u64>;

    /// Join `segments` in order into `out`, with `gap_ms` of silence after every segment but
    /// the last. `None` segments contribute no audio but keep their gap.
    fn concatenate(&self, segments: &[Option<PathBuf>], gap_ms: u64, out: &Path)
    -> ReelResult<()>;

    fn probe_video(&self, path: &Path) -> ReelResult<VideoInfo>;
}

/// [`MediaToolkit`] backed by the system `ffmpeg`/`ffprobe` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegMedia {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for FfmpegMedia {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl FfmpegMedia {
    fn probe(&self, path: &Path) -> ReelResult<ProbeOut> {
        if !path.is_file() {
            return Err(ReelError::missing_asset(format!(
                "media file not found: {}",
                path.display()
            )));
        }
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path);
        let out = run_tool(&mut cmd, "ffprobe")?;
        serde_json::from_slice(&out)
            .map_err(|e| ReelError::malformed(format!("ffprobe json parse failed: {e}")))
    }
}

impl MediaToolkit for FfmpegMedia {
    fn measure_duration_ms(&self, path: &Path) -> ReelResult<u64> {
        let probe = self.probe(path)?;
        let raw = probe
            .format
            .and_then(|f| f.duration)
            .or_else(|| probe.streams.into_iter().find_map(|s| s.duration))
            .ok_or_else(|| {
                ReelError::malformed(format!("no duration reported for '{}'", path.display()))
            })?;
        parse_duration_ms(&raw)
    }

    #[tracing::instrument(skip(self, segments), fields(segments = segments.len()))]
    fn concatenate(
        &self,
        segments: &[Option<PathBuf>],
        gap_ms: u64,
        out: &Path,
    ) -> ReelResult<()> {
        let args = concat_args(segments, gap_ms, out)?;
        ensure_parent_dir(out)?;
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(&args);
        run_tool(&mut cmd, "ffmpeg")?;
        tracing::info!(path = %out.display(), "collated narration");
        Ok(())
    }

    fn probe_video(&self, path: &Path) -> ReelResult<VideoInfo> {
        let probe = self.probe(path)?;
        let format_duration = probe.format.as_ref().and_then(|f| f.duration.clone());
        let video = probe
            .streams
            .into_iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                ReelError::malformed(format!("no video stream in '{}'", path.display()))
            })?;
        let (Some(width), Some(height)) = (video.width, video.height) else {
            return Err(ReelError::malformed(format!(
                "missing video dimensions for '{}'",
                path.display()
            )));
        };
        let duration_ms = match format_duration.or(video.duration) {
            Some(raw) => parse_duration_ms(&raw)?,
            None => 0,
        };
        Ok(VideoInfo {
            width,
            height,
            duration_s: crate::foundation::core::ms_to_secs(duration_ms),
        })
    }
}

/// ffprobe's `"12.345000"` seconds as whole milliseconds.
pub fn parse_duration_ms(raw: &str) -> ReelResult<u64> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ReelError::malformed(format!("invalid duration '{raw}'")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ReelError::malformed(format!("invalid duration '{raw}'")));
    }
    Ok((secs * 1000.0).round() as u64)
}

/// Arguments for an ffmpeg run that joins narration segments with silent gaps.
pub fn concat_args(
    segments: &[Option<PathBuf>],
    gap_ms: u64,
    out: &Path,
) -> ReelResult<Vec<OsString>> {
    if segments.iter().all(Option::is_none) {
        return Err(ReelError::missing_asset("no synthesized audio to collate"));
    }

    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error"]
        .into_iter()
        .map(OsString::from)
        .collect();

    let mut graph = Vec::<String>::new();
    let mut labels = Vec::<String>::new();
    let mut input_idx = 0usize;
    let last = segments.len() - 1;

    for (i, segment) in segments.iter().enumerate() {
        if let Some(path) = segment {
            args.push("-i".into());
            args.push(path.as_os_str().to_owned());
            graph.push(format!(
                "[{input_idx}:a]aresample={NARRATION_SAMPLE_RATE},aformat=sample_fmts=fltp:channel_layouts=stereo[s{i}]"
            ));
            labels.push(format!("[s{i}]"));
            input_idx += 1;
        }
        if i < last && gap_ms > 0 {
            graph.push(format!(
                "anullsrc=r={NARRATION_SAMPLE_RATE}:cl=stereo,atrim=duration={:.3},aformat=sample_fmts=fltp:channel_layouts=stereo[g{i}]",
                crate::foundation::core::ms_to_secs(gap_ms)
            ));
            labels.push(format!("[g{i}]"));
        }
    }

    graph.push(format!(
        "{}concat=n={}:v=0:a=1[narration]",
        labels.concat(),
        labels.len()
    ));

    args.push("-filter_complex".into());
    args.push(graph.join(";").into());
    for a in ["-map", "[narration]", "-c:a", "libmp3lame", "-q:a", "2"] {
        args.push(a.into());
    }
    args.push(out.as_os_str().to_owned());
    Ok(args)
}

#[cfg(test)]
#[path = "../../tests/unit/services/media.rs"]
mod tests;
