//! Shared test utilities: scripted prompt input, sample scenes and fake processes

#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use rendercue::cli::{Prompter, StdioSource};
use rendercue::host::{
    ComputeDevice, CyclesSettings, DriverExpression, EeveeSettings, FfmpegSettings, HostError,
    OutputSettings, RenderHost, SceneState, SnapshotHost,
};
use rendercue::video::{Encoder, EncoderOutput, VideoError};

pub type ScriptedPrompter = Prompter<StdioSource<Cursor<Vec<u8>>, Vec<u8>>>;

/// Prompter fed from a fixed script; one answer per line
pub fn scripted(input: &str) -> ScriptedPrompter {
    Prompter::new(StdioSource::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
    ))
}

/// Everything the prompter printed so far
pub fn transcript(prompter: &ScriptedPrompter) -> String {
    String::from_utf8_lossy(prompter.source().writer()).into_owned()
}

/// A Cycles scene with one GPU, one CPU and a fragile camera driver
pub fn sample_scene() -> SceneState {
    let mut state = SceneState::default();
    state.output.filepath = "/renders/shot_".to_string();
    state.output.frame_start = 1;
    state.output.frame_end = 48;
    state.compute.compute_device_type = "CUDA".to_string();
    state.compute.devices = vec![
        ComputeDevice::new("CUDA_0", "RTX 4090", "CUDA"),
        ComputeDevice::new("CPU_0", "Ryzen 9", "CPU"),
    ];
    state.drivers = vec![
        DriverExpression {
            data_path: "lens".to_string(),
            expression: "sensor_height/tan(angle/2)/2".to_string(),
        },
        DriverExpression {
            data_path: "location".to_string(),
            expression: "frame * 0.1".to_string(),
        },
    ];
    state
}

pub fn sample_host() -> SnapshotHost {
    SnapshotHost::new(sample_scene())
}

/// Write `state` as a snapshot file under `dir`
pub fn write_scene(dir: &Path, state: &SceneState) -> PathBuf {
    let path = dir.join("scene.json");
    fs::write(&path, serde_json::to_string_pretty(state).unwrap()).unwrap();
    path
}

/// Snapshot host that logs every write call by name
pub struct RecordingHost {
    pub inner: SnapshotHost,
    pub calls: Vec<String>,
}

impl RecordingHost {
    pub fn new(inner: SnapshotHost) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

impl RenderHost for RecordingHost {
    fn scene(&self) -> Result<SceneState, HostError> {
        self.inner.scene()
    }

    fn set_output(&mut self, output: &OutputSettings) -> Result<(), HostError> {
        self.calls.push("set_output".to_string());
        self.inner.set_output(output)
    }

    fn set_cycles(&mut self, cycles: &CyclesSettings) -> Result<(), HostError> {
        self.calls.push("set_cycles".to_string());
        self.inner.set_cycles(cycles)
    }

    fn set_eevee(&mut self, eevee: &EeveeSettings) -> Result<(), HostError> {
        self.calls.push("set_eevee".to_string());
        self.inner.set_eevee(eevee)
    }

    fn set_ffmpeg(&mut self, ffmpeg: &FfmpegSettings) -> Result<(), HostError> {
        self.calls.push("set_ffmpeg".to_string());
        self.inner.set_ffmpeg(ffmpeg)
    }

    fn devices(&self) -> Result<Vec<ComputeDevice>, HostError> {
        self.inner.devices()
    }

    fn set_compute_backend(&mut self, backend: &str) -> Result<(), HostError> {
        self.calls.push(format!("set_compute_backend:{}", backend));
        self.inner.set_compute_backend(backend)
    }

    fn refresh_devices(&mut self) -> Result<(), HostError> {
        self.calls.push("refresh_devices".to_string());
        self.inner.refresh_devices()
    }

    fn set_device_active(&mut self, device_id: &str, active: bool) -> Result<(), HostError> {
        self.calls.push(format!("set_device_active:{}:{}", device_id, active));
        self.inner.set_device_active(device_id, active)
    }

    fn drivers(&self) -> Result<Vec<DriverExpression>, HostError> {
        self.inner.drivers()
    }

    fn set_driver_expression(&mut self, index: usize, expression: &str) -> Result<(), HostError> {
        self.calls.push(format!("set_driver_expression:{}", index));
        self.inner.set_driver_expression(index, expression)
    }

    fn render_animation(&mut self) -> Result<(), HostError> {
        self.calls.push("render_animation".to_string());
        self.inner.render_animation()
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        self.inner.absolute_path(path)
    }
}

/// Encoder stand-in: records argument vectors and writes a dummy output file
pub struct FakeEncoder {
    pub calls: Vec<Vec<String>>,
    pub fail_with: Option<String>,
    /// `None` reports success without creating the output file
    pub output_bytes: Option<usize>,
}

impl FakeEncoder {
    pub fn succeeding() -> Self {
        Self {
            calls: Vec::new(),
            fail_with: None,
            output_bytes: Some(2048),
        }
    }

    pub fn without_output() -> Self {
        Self {
            output_bytes: None,
            ..Self::succeeding()
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn runs(&self) -> usize {
        self.calls.len()
    }
}

impl Encoder for FakeEncoder {
    fn program(&self) -> String {
        "fake-ffmpeg".to_string()
    }

    fn run(&mut self, args: &[String]) -> Result<EncoderOutput, VideoError> {
        self.calls.push(args.to_vec());

        if let Some(stderr) = &self.fail_with {
            return Ok(EncoderOutput {
                success: false,
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        // The output file is always the last argument.
        if let (Some(output), Some(bytes)) = (args.last(), self.output_bytes) {
            fs::write(output, vec![0u8; bytes]).unwrap();
        }
        Ok(EncoderOutput {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
