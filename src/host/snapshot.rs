//! In-memory host backed by a JSON scene snapshot

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{
    resolve_blend_path, ComputeDevice, CyclesSettings, DriverExpression, EeveeSettings,
    FfmpegSettings, HostError, OutputSettings, RenderHost, SceneState,
};

/// A host whose whole object graph is a [`SceneState`] value.
///
/// Rendering does not produce images; it records the frame range that would
/// have been rendered so a dry run can be inspected afterwards.
#[derive(Debug, Clone)]
pub struct SnapshotHost {
    state: SceneState,
    base_dir: PathBuf,
    rendered: Vec<(i32, i32)>,
}

impl SnapshotHost {
    pub fn new(state: SceneState) -> Self {
        Self {
            state,
            base_dir: PathBuf::from("."),
            rendered: Vec::new(),
        }
    }

    /// Load a snapshot; blend-relative paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let text = fs::read_to_string(path)?;
        let state: SceneState = serde_json::from_str(&text)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!(snapshot = %path.display(), "loaded scene snapshot");

        Ok(Self {
            state,
            base_dir,
            rendered: Vec::new(),
        })
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Write the current scene state as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), HostError> {
        let json = serde_json::to_string_pretty(&self.state)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Frame ranges passed to [`RenderHost::render_animation`], in call order
    pub fn rendered_ranges(&self) -> &[(i32, i32)] {
        &self.rendered
    }
}

impl RenderHost for SnapshotHost {
    fn scene(&self) -> Result<SceneState, HostError> {
        Ok(self.state.clone())
    }

    fn set_output(&mut self, output: &OutputSettings) -> Result<(), HostError> {
        self.state.output = output.clone();
        Ok(())
    }

    fn set_cycles(&mut self, cycles: &CyclesSettings) -> Result<(), HostError> {
        self.state.cycles = cycles.clone();
        Ok(())
    }

    fn set_eevee(&mut self, eevee: &EeveeSettings) -> Result<(), HostError> {
        self.state.eevee = eevee.clone();
        Ok(())
    }

    fn set_ffmpeg(&mut self, ffmpeg: &FfmpegSettings) -> Result<(), HostError> {
        self.state.ffmpeg = ffmpeg.clone();
        Ok(())
    }

    fn devices(&self) -> Result<Vec<ComputeDevice>, HostError> {
        Ok(self.state.compute.devices.clone())
    }

    fn set_compute_backend(&mut self, backend: &str) -> Result<(), HostError> {
        self.state.compute.compute_device_type = backend.to_string();
        Ok(())
    }

    fn refresh_devices(&mut self) -> Result<(), HostError> {
        // The snapshot's device list is fixed at load time.
        Ok(())
    }

    fn set_device_active(&mut self, device_id: &str, active: bool) -> Result<(), HostError> {
        let device = self
            .state
            .compute
            .devices
            .iter_mut()
            .find(|d| d.id == device_id)
            .ok_or_else(|| HostError::UnknownDevice(device_id.to_string()))?;
        device.use_device = active;
        Ok(())
    }

    fn drivers(&self) -> Result<Vec<DriverExpression>, HostError> {
        Ok(self.state.drivers.clone())
    }

    fn set_driver_expression(&mut self, index: usize, expression: &str) -> Result<(), HostError> {
        let driver = self
            .state
            .drivers
            .get_mut(index)
            .ok_or(HostError::UnknownDriver(index))?;
        driver.expression = expression.to_string();
        Ok(())
    }

    fn render_animation(&mut self) -> Result<(), HostError> {
        let range = (self.state.output.frame_start, self.state.output.frame_end);
        info!(start = range.0, end = range.1, "snapshot host: recording render request");
        self.rendered.push(range);
        Ok(())
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        resolve_blend_path(path, &self.base_dir)
    }
}
