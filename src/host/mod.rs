//! Host module - the 3D application's scene and preferences object graph
//!
//! The render utility never talks to Blender directly. It reads and writes
//! through [`RenderHost`], which is implemented by:
//! - [`SnapshotHost`]: an in-memory scene loaded from a JSON snapshot (dry runs, tests)
//! - [`BlenderHost`]: a `.blend` file driven through Blender's background mode

pub mod blender;
pub mod snapshot;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use blender::BlenderHost;
pub use snapshot::SnapshotHost;

/// Errors raised while reading or writing host state
#[derive(Debug, Error)]
pub enum HostError {
    /// The host program could not be started at all
    #[error("failed to launch '{program}'")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The host program ran but reported failure; `output` is its captured text
    #[error("'{program}' exited with {status}:\n{output}")]
    Process {
        program: String,
        status: String,
        output: String,
    },

    /// The host answered with something that is not a scene description
    #[error("unexpected host response: {0}")]
    Protocol(String),

    #[error("no driver at index {0}")]
    UnknownDriver(usize),

    #[error("no compute device with id '{0}'")]
    UnknownDevice(String),

    #[error("scene file error: {0}")]
    Io(#[from] io::Error),

    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output block of the render settings: engine, paths, format, frames, resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub engine: String,
    pub filepath: String,
    pub file_format: String,
    pub color_mode: String,
    pub frame_start: i32,
    pub frame_end: i32,
    pub resolution_x: i32,
    pub resolution_y: i32,
    pub resolution_percentage: i32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            engine: "CYCLES".to_string(),
            filepath: "/tmp/".to_string(),
            file_format: "PNG".to_string(),
            color_mode: "RGBA".to_string(),
            frame_start: 1,
            frame_end: 250,
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 100,
        }
    }
}

/// Ray-trace engine sub-settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclesSettings {
    pub samples: i32,
    pub tile_size: i32,
    pub max_bounces: i32,
    pub noise_threshold: f64,
    pub denoising_samples: i32,
    pub use_denoising: bool,
    pub denoiser: String,
}

impl Default for CyclesSettings {
    fn default() -> Self {
        Self {
            samples: 4096,
            tile_size: 2048,
            max_bounces: 12,
            noise_threshold: 0.01,
            denoising_samples: 0,
            use_denoising: true,
            denoiser: "OPENIMAGEDENOISE".to_string(),
        }
    }
}

/// Real-time engine sub-settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EeveeSettings {
    pub taa_render_samples: i32,
    pub use_gtao: bool,
    pub use_bloom: bool,
    pub use_ssr: bool,
    pub use_volumetric: bool,
}

impl Default for EeveeSettings {
    fn default() -> Self {
        Self {
            taa_render_samples: 64,
            use_gtao: false,
            use_bloom: false,
            use_ssr: false,
            use_volumetric: false,
        }
    }
}

/// Container-format sub-settings used when the output format is a video file.
///
/// `quality` is the preset name the host reports; `crf` is the numeric
/// quality factor written by the render utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegSettings {
    pub format: String,
    pub codec: String,
    pub quality: String,
    pub crf: u8,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            format: "MPEG4".to_string(),
            codec: "H264".to_string(),
            quality: "MEDIUM".to_string(),
            crf: 23,
        }
    }
}

/// A compute device as reported by the host's device enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeDevice {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(rename = "use", default)]
    pub use_device: bool,
    #[serde(default = "default_compatible")]
    pub is_compatible: bool,
}

fn default_compatible() -> bool {
    true
}

impl ComputeDevice {
    pub fn new(id: &str, name: &str, device_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            device_type: device_type.to_string(),
            use_device: false,
            is_compatible: true,
        }
    }
}

/// Compute backend preferences and the devices detected for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputePreferences {
    pub compute_device_type: String,
    pub devices: Vec<ComputeDevice>,
}

impl Default for ComputePreferences {
    fn default() -> Self {
        Self {
            compute_device_type: "NONE".to_string(),
            devices: Vec::new(),
        }
    }
}

/// A driver attached to the scene's animation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverExpression {
    #[serde(default)]
    pub data_path: String,
    pub expression: String,
}

/// Everything the render utility can read from the host in one go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneState {
    pub output: OutputSettings,
    pub cycles: CyclesSettings,
    pub eevee: EeveeSettings,
    pub ffmpeg: FfmpegSettings,
    pub compute: ComputePreferences,
    pub drivers: Vec<DriverExpression>,
}

/// The scene/preferences object graph of the host application.
///
/// Writes are immediate from the caller's point of view; the host is assumed
/// single-threaded and non-reentrant.
pub trait RenderHost {
    /// Current scene settings
    fn scene(&self) -> Result<SceneState, HostError>;

    fn set_output(&mut self, output: &OutputSettings) -> Result<(), HostError>;

    fn set_cycles(&mut self, cycles: &CyclesSettings) -> Result<(), HostError>;

    fn set_eevee(&mut self, eevee: &EeveeSettings) -> Result<(), HostError>;

    fn set_ffmpeg(&mut self, ffmpeg: &FfmpegSettings) -> Result<(), HostError>;

    /// Devices as of the last refresh
    fn devices(&self) -> Result<Vec<ComputeDevice>, HostError>;

    /// Select the compute backend (`CUDA`, `OPTIX`, `NONE` for CPU, ...)
    fn set_compute_backend(&mut self, backend: &str) -> Result<(), HostError>;

    /// Ask the host to re-detect devices for the current backend
    fn refresh_devices(&mut self) -> Result<(), HostError>;

    fn set_device_active(&mut self, device_id: &str, active: bool) -> Result<(), HostError>;

    fn drivers(&self) -> Result<Vec<DriverExpression>, HostError>;

    fn set_driver_expression(&mut self, index: usize, expression: &str) -> Result<(), HostError>;

    /// Batch-render the configured frame range
    fn render_animation(&mut self) -> Result<(), HostError>;

    /// Resolve a host path (possibly blend-relative `//...`) to an absolute path
    fn absolute_path(&self, path: &str) -> PathBuf;

    /// Refresh and list devices, as done when offering the device menu
    fn compute_devices(&mut self) -> Result<Vec<ComputeDevice>, HostError> {
        self.refresh_devices()?;
        self.devices()
    }
}

/// Resolve `//`-prefixed paths against the blend file's directory and
/// relative paths against the working directory.
pub fn resolve_blend_path(path: &str, blend_dir: &Path) -> PathBuf {
    let resolved = match path.strip_prefix("//") {
        Some(rest) => blend_dir.join(rest),
        None => PathBuf::from(path),
    };

    if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&resolved))
            .unwrap_or(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_relative_path_uses_blend_dir() {
        let resolved = resolve_blend_path("//renders/frame_####", Path::new("/projects/shot"));
        assert_eq!(resolved, PathBuf::from("/projects/shot/renders/frame_####"));
    }

    #[test]
    fn test_absolute_path_is_untouched() {
        let resolved = resolve_blend_path("/workspace/out/frame_####", Path::new("/projects"));
        assert_eq!(resolved, PathBuf::from("/workspace/out/frame_####"));
    }

    #[test]
    fn test_relative_path_is_made_absolute() {
        let resolved = resolve_blend_path("out/frame_####", Path::new("/projects"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("out/frame_####"));
    }

    #[test]
    fn test_device_json_uses_host_field_names() {
        let device: ComputeDevice = serde_json::from_str(
            r#"{"id": "CUDA_0", "name": "RTX 4090", "type": "CUDA", "use": true}"#,
        )
        .unwrap();
        assert_eq!(device.device_type, "CUDA");
        assert!(device.use_device);
        assert!(device.is_compatible);
    }

    #[test]
    fn test_partial_scene_json_fills_defaults() {
        let state: SceneState =
            serde_json::from_str(r#"{"output": {"engine": "BLENDER_EEVEE"}}"#).unwrap();
        assert_eq!(state.output.engine, "BLENDER_EEVEE");
        assert_eq!(state.output.resolution_x, 1920);
        assert!(state.drivers.is_empty());
    }
}
