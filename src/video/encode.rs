//! Encoder invocation: argument vector construction and the ffmpeg subprocess

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

use super::config::VideoConfig;

/// Video utility failures
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("input folder does not exist: {}", .0.display())]
    MissingInputDir(PathBuf),

    #[error("encoder '{0}' is not installed or not on PATH")]
    EncoderMissing(String),

    #[error("failed to launch encoder '{program}'")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Nonzero exit; `stderr` is the encoder's own output, unparsed
    #[error("encoder exited with {status}:\n{stderr}")]
    EncoderFailed { status: String, stderr: String },
}

/// Captured result of one encoder run
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// The external encoder process
pub trait Encoder {
    /// Program name shown to the user
    fn program(&self) -> String;

    /// Run the encoder to completion with `args`
    fn run(&mut self, args: &[String]) -> Result<EncoderOutput, VideoError>;
}

/// ffmpeg binary on PATH (or at an explicit location)
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the binary can be started at all (`ffmpeg -version`)
    pub fn check_available(&self) -> Result<(), VideoError> {
        let status = Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(VideoError::EncoderMissing(self.program()))
            }
            Err(source) => Err(VideoError::Launch {
                program: self.program(),
                source,
            }),
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Encoder for FfmpegEncoder {
    fn program(&self) -> String {
        self.program.display().to_string()
    }

    fn run(&mut self, args: &[String]) -> Result<EncoderOutput, VideoError> {
        debug!(program = %self.program.display(), ?args, "spawning encoder");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| VideoError::Launch {
                program: self.program(),
                source,
            })?;

        Ok(EncoderOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Input pattern matching every PNG in the folder, in glob order
pub fn input_pattern(input_dir: &Path) -> String {
    input_dir.join("*.png").display().to_string()
}

/// Full encoder argument vector for `config` (program name excluded)
pub fn build_args(config: &VideoConfig) -> Vec<String> {
    let quality = config.quality.encoder_quality();
    let rate = config.frame_rate.to_string();

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-framerate".into(),
        rate.clone(),
        "-pattern_type".into(),
        "glob".into(),
        "-i".into(),
        input_pattern(&config.input_dir),
        "-c:v".into(),
        config.codec.encoder_id().into(),
        "-preset".into(),
        quality.preset.into(),
        "-crf".into(),
        quality.crf.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-r".into(),
        rate,
        "-movflags".into(),
        "+faststart".into(),
    ];
    args.extend(config.codec.extra_args().iter().map(|a| a.to_string()));
    args.push(config.output_file.display().to_string());
    args
}

/// A successful encode
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    pub output_file: PathBuf,
    /// `None` when the output file could not be read back after the run
    pub size_bytes: Option<u64>,
}

impl EncodeReport {
    pub fn size_mb(&self) -> Option<f64> {
        self.size_bytes.map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Run the encoder once for `config`
pub fn encode<E>(encoder: &mut E, config: &VideoConfig) -> Result<EncodeReport, VideoError>
where
    E: Encoder + ?Sized,
{
    let args = build_args(config);
    let output = encoder.run(&args)?;

    if !output.success {
        return Err(VideoError::EncoderFailed {
            status: output.status,
            stderr: output.stderr,
        });
    }

    let size_bytes = match fs::metadata(&config.output_file) {
        Ok(meta) => Some(meta.len()),
        Err(err) => {
            debug!(file = %config.output_file.display(), error = %err, "cannot stat encoder output");
            None
        }
    };
    Ok(EncodeReport {
        output_file: config.output_file.clone(),
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_reported_as_missing() {
        let encoder = FfmpegEncoder::new("/nonexistent/ffmpeg-binary");
        assert!(matches!(
            encoder.check_available(),
            Err(VideoError::EncoderMissing(_))
        ));
    }

    #[test]
    fn test_input_pattern_globs_png_files() {
        assert_eq!(input_pattern(Path::new("/renders/shot")), "/renders/shot/*.png");
    }

    #[test]
    fn test_report_size_in_megabytes() {
        let report = EncodeReport {
            output_file: PathBuf::from("out.mp4"),
            size_bytes: Some(3 * 1024 * 1024 / 2),
        };
        assert!((report.size_mb().unwrap() - 1.5).abs() < f64::EPSILON);

        let unknown = EncodeReport {
            size_bytes: None,
            ..report
        };
        assert_eq!(unknown.size_mb(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = VideoError::MissingInputDir(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "input folder does not exist: /no/such/dir");

        let err = VideoError::EncoderFailed {
            status: "exit status: 1".to_string(),
            stderr: "Unknown encoder 'libx265'".to_string(),
        };
        assert!(err.to_string().ends_with("Unknown encoder 'libx265'"));
    }

    #[test]
    fn test_launch_error_keeps_cause_separate() {
        use std::error::Error as _;

        let err = VideoError::Launch {
            program: "ffmpeg".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(err.to_string(), "failed to launch encoder 'ffmpeg'");
        let cause = err.source().expect("launch errors carry their cause");
        assert_eq!(cause.to_string(), "permission denied");
    }
}
