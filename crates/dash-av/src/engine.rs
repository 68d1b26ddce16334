//! Job submission to the transcoding engine.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::ToolCommand;
use crate::job::{DashJob, InputSource, OutputMode, VideoProfile};
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Number of stderr lines kept in an engine failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Something that turns a [`DashJob`] into a manifest plus segments.
///
/// `submit` returns once the package is complete (or the engine failed).
#[async_trait]
pub trait Engine: Send + Sync {
    async fn submit(&self, job: &DashJob) -> Result<()>;
}

/// Encoder knobs shared by every rendition of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    /// Target segment length in seconds.
    pub segment_duration: u32,
    pub keyint_min: u32,
    pub gop_size: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            segment_duration: 10,
            keyint_min: 25,
            gop_size: 250,
        }
    }
}

/// [`Engine`] backed by the ffmpeg CLI and its `dash` muxer.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    settings: EncodeSettings,
    timeout: Option<Duration>,
}

impl FfmpegEngine {
    pub fn new(ffmpeg: PathBuf, settings: EncodeSettings) -> Self {
        Self {
            ffmpeg,
            settings,
            timeout: None,
        }
    }

    /// Kill ffmpeg if a job runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    /// Build the ffmpeg invocation for `job`, writing the manifest to
    /// `manifest`.
    pub fn command(&self, job: &DashJob, manifest: &Path) -> ToolCommand {
        let s = &self.settings;
        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        if let Some(limit) = self.timeout {
            cmd.timeout(limit);
        }

        cmd.args(["-y", "-hide_banner", "-loglevel", "warning"]);

        match &job.source {
            InputSource::File { path } => {
                cmd.arg("-i");
                cmd.arg(path.to_string_lossy());
            }
            InputSource::Capture {
                device,
                format,
                framerate,
                ..
            } => {
                cmd.args(["-f", format.ffmpeg_format()]);
                if let Some(fps) = framerate {
                    cmd.args(["-framerate".to_string(), fps.to_string()]);
                }
                cmd.args(["-i", device.as_str()]);
            }
        }

        match job.profile {
            VideoProfile::H264 => {
                cmd.args(["-c:v", s.video_codec.as_str()]);
                cmd.args(["-c:a", s.audio_codec.as_str()]);
                cmd.args(["-bf", "1"]);
                cmd.args(["-keyint_min".to_string(), s.keyint_min.to_string()]);
                cmd.args(["-g".to_string(), s.gop_size.to_string()]);
                cmd.args(["-sc_threshold", "0"]);
            }
        }

        for (i, r) in job.renditions.iter().enumerate() {
            cmd.args(["-map", "0:v:0"]);
            cmd.args([format!("-s:v:{i}"), r.size_arg()]);
            cmd.args([format!("-b:v:{i}"), r.video_bitrate_arg()]);
        }
        for (i, r) in job.renditions.iter().enumerate() {
            cmd.args(["-map", "0:a:0?"]);
            cmd.args([format!("-b:a:{i}"), r.audio_bitrate_arg()]);
        }

        cmd.args(["-use_timeline", "1", "-use_template", "1"]);
        cmd.args(["-init_seg_name", "init_$RepresentationID$.$ext$"]);
        cmd.args(["-media_seg_name", "chunk_$RepresentationID$_$Number%05d$.$ext$"]);
        cmd.args(["-seg_duration".to_string(), s.segment_duration.to_string()]);
        cmd.args(["-adaptation_sets", "id=0,streams=v id=1,streams=a"]);
        if job.source.is_capture() {
            cmd.args(["-streaming", "1"]);
        }
        cmd.args(["-f", "dash"]);
        cmd.arg(manifest.to_string_lossy());

        cmd
    }

    async fn run(&self, cmd: &ToolCommand) -> Result<()> {
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(Error::tool_failed(
                "ffmpeg",
                format!(
                    "exited with status {}: {}",
                    output.status,
                    stderr_tail(&output.stderr, STDERR_TAIL_LINES)
                ),
            ));
        }
        if !output.stderr.trim().is_empty() {
            tracing::debug!("ffmpeg stderr: {}", output.stderr.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    async fn submit(&self, job: &DashJob) -> Result<()> {
        if let InputSource::File { path } = &job.source {
            if !path.exists() {
                return Err(Error::file_not_found(path));
            }
            // Staged output is renamed over the destination, so ffmpeg's own
            // same-file check never sees the real manifest path.
            if same_file(path, &job.output) {
                return Err(Error::InvalidInput(format!(
                    "output manifest is the input file: {}",
                    job.output.display()
                )));
            }
        }

        tracing::info!(
            "DASH: {} renditions -> {:?} ({:?})",
            job.renditions.len(),
            job.output,
            job.mode
        );

        match job.mode {
            OutputMode::Staged => {
                let workspace = Workspace::new(&job.output)?;
                let cmd = self.command(job, &workspace.manifest());
                if let Err(e) = self.run(&cmd).await {
                    tracing::warn!(
                        "Discarding partial output in {}",
                        workspace.temp_dir().display()
                    );
                    workspace.cleanup();
                    return Err(e);
                }
                let manifest = workspace.finalize()?;
                tracing::info!("DASH package complete: {}", manifest.display());
            }
            OutputMode::Direct => {
                std::fs::create_dir_all(job.output_dir())?;
                let cmd = self.command(job, &job.output);
                self.run(&cmd).await?;
                tracing::info!("DASH package complete: {}", job.output.display());
            }
        }

        Ok(())
    }
}

/// Whether both paths exist and resolve to the same file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn stderr_tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.trim().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::CaptureFormat;
    use crate::preset::{CAPTURE_RENDITION, STANDARD_LADDER};

    fn engine() -> FfmpegEngine {
        FfmpegEngine::new(PathBuf::from("ffmpeg"), EncodeSettings::default())
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_file_command_maps_every_rendition() {
        let job = DashJob::new(
            InputSource::file("in.mp4"),
            STANDARD_LADDER.to_vec(),
            "out/stream.mpd",
            OutputMode::Staged,
        )
        .unwrap();
        let cmd = engine().command(&job, Path::new("/tmp/stage/stream.mpd"));
        let args = cmd.get_args();

        assert_eq!(value_after(args, "-i"), Some("in.mp4"));
        assert_eq!(args.iter().filter(|a| *a == "0:v:0").count(), 6);
        assert_eq!(args.iter().filter(|a| *a == "0:a:0?").count(), 6);
        assert_eq!(value_after(args, "-s:v:0"), Some("256x144"));
        assert_eq!(value_after(args, "-b:v:0"), Some("95k"));
        assert_eq!(value_after(args, "-b:a:0"), Some("64k"));
        assert_eq!(value_after(args, "-s:v:5"), Some("1920x1080"));
        assert_eq!(value_after(args, "-b:v:5"), Some("4096k"));
        assert_eq!(value_after(args, "-b:a:5"), Some("320k"));
        assert_eq!(value_after(args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(args, "-seg_duration"), Some("10"));
        assert_eq!(value_after(args, "-f"), Some("dash"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/stage/stream.mpd"));
        assert!(!args.iter().any(|a| a == "-streaming"));
    }

    #[test]
    fn test_capture_command_uses_device_input() {
        let job = DashJob::new(
            InputSource::Capture {
                device: "0:0".to_string(),
                format: CaptureFormat::Avfoundation,
                framerate: Some(30),
                device_name: "FaceTime HD Camera".to_string(),
            },
            vec![CAPTURE_RENDITION],
            "./dash.mpd",
            OutputMode::Direct,
        )
        .unwrap();
        let cmd = engine().command(&job, &job.output);
        let args = cmd.get_args();

        assert_eq!(value_after(args, "-f"), Some("avfoundation"));
        assert_eq!(value_after(args, "-framerate"), Some("30"));
        assert_eq!(value_after(args, "-i"), Some("0:0"));
        assert_eq!(value_after(args, "-s:v:0"), Some("640x480"));
        assert_eq!(value_after(args, "-b:v:0"), Some("750k"));
        assert!(value_after(args, "-s:v:1").is_none());
        assert_eq!(value_after(args, "-streaming"), Some("1"));
        assert_eq!(args.last().map(String::as_str), Some("./dash.mpd"));
    }

    #[test]
    fn test_capture_input_address_matches_format() {
        for format in [CaptureFormat::Avfoundation, CaptureFormat::V4l2] {
            let job = DashJob::new(
                InputSource::Capture {
                    device: format.default_device().to_string(),
                    format,
                    framerate: None,
                    device_name: "Cam".to_string(),
                },
                vec![CAPTURE_RENDITION],
                "./dash.mpd",
                OutputMode::Direct,
            )
            .unwrap();
            let cmd = engine().command(&job, &job.output);
            let args = cmd.get_args();

            assert_eq!(value_after(args, "-f"), Some(format.ffmpeg_format()));
            assert_eq!(value_after(args, "-i"), Some(format.default_device()));
        }
    }

    #[test]
    fn test_custom_settings() {
        let settings = EncodeSettings {
            video_codec: "h264_videotoolbox".to_string(),
            segment_duration: 4,
            ..EncodeSettings::default()
        };
        let job = DashJob::new(
            InputSource::file("in.mp4"),
            vec![CAPTURE_RENDITION],
            "a.mpd",
            OutputMode::Staged,
        )
        .unwrap();
        let cmd = FfmpegEngine::new(PathBuf::from("ffmpeg"), settings).command(&job, Path::new("a.mpd"));
        assert_eq!(value_after(cmd.get_args(), "-c:v"), Some("h264_videotoolbox"));
        assert_eq!(value_after(cmd.get_args(), "-seg_duration"), Some("4"));
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = (1..=30).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = stderr_tail(&stderr, 3);
        assert_eq!(tail, "line 28\nline 29\nline 30");
    }

    #[tokio::test]
    async fn test_missing_input_is_not_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let job = DashJob::new(
            InputSource::file(dir.path().join("missing.mp4")),
            STANDARD_LADDER.to_vec(),
            dir.path().join("out.mpd"),
            OutputMode::Staged,
        )
        .unwrap();
        let err = engine().submit(&job).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    /// Stand-in for ffmpeg: a shell script that treats its last argument as
    /// the manifest path.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> FfmpegEngine {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\nfor last; do :; done\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        FfmpegEngine::new(path, EncodeSettings::default())
    }

    #[cfg(unix)]
    const WRITES_PACKAGE: &str = r#"dir=$(dirname "$last")
echo '<MPD/>' > "$last"
echo init > "$dir/init_0.m4s"
echo chunk > "$dir/chunk_0_00001.m4s""#;

    #[cfg(unix)]
    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_staged_job_moves_package_next_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"mp4").unwrap();
        let out_dir = dir.path().join("out");

        let job = DashJob::new(
            InputSource::file(&input),
            STANDARD_LADDER.to_vec(),
            out_dir.join("stream.mpd"),
            OutputMode::Staged,
        )
        .unwrap();

        fake_ffmpeg(dir.path(), WRITES_PACKAGE).submit(&job).await.unwrap();

        assert_eq!(
            file_names(&out_dir),
            vec!["chunk_0_00001.m4s", "init_0.m4s", "stream.mpd"]
        );
        assert!(!file_names(&out_dir)
            .iter()
            .any(|n| n.starts_with(".dash-staging-")));
        assert_eq!(
            std::fs::read_to_string(out_dir.join("stream.mpd")).unwrap().trim(),
            "<MPD/>"
        );
        assert_eq!(std::fs::read(&input).unwrap(), b"mp4");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_direct_job_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"mp4").unwrap();
        let out_dir = dir.path().join("live").join("nested");

        let job = DashJob::new(
            InputSource::file(&input),
            vec![CAPTURE_RENDITION],
            out_dir.join("dash.mpd"),
            OutputMode::Direct,
        )
        .unwrap();

        fake_ffmpeg(dir.path(), WRITES_PACKAGE).submit(&job).await.unwrap();

        assert!(out_dir.is_dir());
        assert_eq!(
            file_names(&out_dir),
            vec!["chunk_0_00001.m4s", "dash.mpd", "init_0.m4s"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_over_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("movie.mp4");
        std::fs::write(&input, b"mp4 bytes").unwrap();

        let job = DashJob::new(
            InputSource::file(&input),
            STANDARD_LADDER.to_vec(),
            dir.path().join(".").join("movie.mp4"),
            OutputMode::Staged,
        )
        .unwrap();

        let err = fake_ffmpeg(dir.path(), WRITES_PACKAGE)
            .submit(&job)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(std::fs::read(&input).unwrap(), b"mp4 bytes");
        assert_eq!(file_names(dir.path()), vec!["fake-ffmpeg", "movie.mp4"]);
    }

    #[test]
    fn test_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp4");
        std::fs::write(&file, b"x").unwrap();

        assert!(same_file(&file, &dir.path().join(".").join("a.mp4")));
        assert!(!same_file(&file, &dir.path().join("a.mpd")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_engine_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"not really an mp4").unwrap();
        let out_dir = dir.path().join("out");

        let job = DashJob::new(
            InputSource::file(&input),
            STANDARD_LADDER.to_vec(),
            out_dir.join("stream.mpd"),
            OutputMode::Staged,
        )
        .unwrap();

        let failing = fake_ffmpeg(
            dir.path(),
            r#"echo chunk > "$(dirname "$last")/chunk_0_00001.m4s"
echo "Invalid data found when processing input" >&2
exit 1"#,
        );
        let err = failing.submit(&job).await.unwrap_err();

        match err {
            Error::ToolFailed { tool, message } => {
                assert_eq!(tool, "ffmpeg");
                assert!(message.contains("Invalid data found"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(file_names(&out_dir).is_empty());
    }
}
