//! Blender host driven through background mode
//!
//! Blender's object model only exists inside a running Blender process, so
//! this host works in three kinds of round trips:
//! - probe: run a small Python script that prints the scene state as JSON
//! - device refresh: re-run device detection for the selected backend
//! - render: replay every queued write inside Blender, then render the animation
//!
//! Writes between round trips are kept as [`HostOp`] values and mirrored into
//! the cached [`SceneState`] so reads stay consistent with what was written.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    resolve_blend_path, ComputeDevice, ComputePreferences, CyclesSettings, DriverExpression,
    EeveeSettings, FfmpegSettings, HostError, OutputSettings, RenderHost, SceneState,
};

const PAYLOAD_BEGIN: &str = "@@RENDERCUE_BEGIN@@";
const PAYLOAD_END: &str = "@@RENDERCUE_END@@";
const OPS_ENV: &str = "RENDERCUE_OPS";
const BACKEND_ENV: &str = "RENDERCUE_BACKEND";

const PRELUDE: &str = r#"
import bpy, json, os

def _emit(value):
    print("@@RENDERCUE_BEGIN@@")
    print(json.dumps(value))
    print("@@RENDERCUE_END@@")

def _compute():
    addon = bpy.context.preferences.addons.get("cycles")
    if addon is None:
        return {"compute_device_type": "NONE", "devices": []}
    prefs = addon.preferences
    backend = os.environ.get("RENDERCUE_BACKEND")
    if backend:
        prefs.compute_device_type = backend
    prefs.get_devices()
    return {
        "compute_device_type": prefs.compute_device_type,
        "devices": [
            {"id": d.id, "name": d.name, "type": d.type, "use": d.use,
             "is_compatible": getattr(d, "is_compatible", True)}
            for d in prefs.devices
        ],
    }
"#;

const PROBE_SCRIPT: &str = r#"
scene = bpy.context.scene
r = scene.render
c = getattr(scene, "cycles", None)
e = scene.eevee
ad = scene.animation_data
state = {
    "output": {
        "engine": r.engine, "filepath": r.filepath,
        "file_format": r.image_settings.file_format,
        "color_mode": r.image_settings.color_mode,
        "frame_start": scene.frame_start, "frame_end": scene.frame_end,
        "resolution_x": r.resolution_x, "resolution_y": r.resolution_y,
        "resolution_percentage": r.resolution_percentage,
    },
    "eevee": {
        "taa_render_samples": e.taa_render_samples,
        "use_gtao": getattr(e, "use_gtao", False),
        "use_bloom": getattr(e, "use_bloom", False),
        "use_ssr": getattr(e, "use_ssr", False),
        "use_volumetric": getattr(e, "use_volumetric", False),
    },
    "ffmpeg": {
        "format": r.ffmpeg.format, "codec": r.ffmpeg.codec,
        "quality": str(r.ffmpeg.constant_rate_factor),
    },
    "compute": _compute(),
    "drivers": [
        {"data_path": fc.data_path, "expression": fc.driver.expression}
        for fc in (ad.drivers if ad else [])
    ],
}
if c is not None:
    state["cycles"] = {
        "samples": c.samples, "tile_size": c.tile_size, "max_bounces": c.max_bounces,
        "noise_threshold": getattr(c, "adaptive_threshold", 0.01),
        "denoising_samples": getattr(c, "denoising_samples", 0),
        "use_denoising": c.use_denoising, "denoiser": c.denoiser,
    }
_emit(state)
"#;

const DEVICES_SCRIPT: &str = r#"
_emit(_compute())
"#;

const RENDER_SCRIPT: &str = r#"
CRF_PRESETS = {0: "LOSSLESS", 18: "PERC_LOSSLESS", 20: "HIGH", 23: "MEDIUM", 28: "LOW"}
scene = bpy.context.scene
r = scene.render

def _set(obj, name, value):
    if hasattr(obj, name):
        setattr(obj, name, value)
    else:
        print("rendercue: host has no property", name)

def _prefs():
    return bpy.context.preferences.addons["cycles"].preferences

for op in json.loads(os.environ.get("RENDERCUE_OPS", "[]")):
    kind = op["op"]
    if kind == "set_output":
        r.engine = op["engine"]
        r.filepath = op["filepath"]
        r.image_settings.file_format = op["file_format"]
        r.image_settings.color_mode = op["color_mode"]
        scene.frame_start = op["frame_start"]
        scene.frame_end = op["frame_end"]
        r.resolution_x = op["resolution_x"]
        r.resolution_y = op["resolution_y"]
        r.resolution_percentage = op["resolution_percentage"]
    elif kind == "set_cycles":
        c = scene.cycles
        c.samples = op["samples"]
        _set(c, "tile_size", op["tile_size"])
        c.max_bounces = op["max_bounces"]
        _set(c, "adaptive_threshold", op["noise_threshold"])
        _set(c, "denoising_samples", op["denoising_samples"])
        c.use_denoising = op["use_denoising"]
        if op["use_denoising"]:
            c.denoiser = op["denoiser"]
    elif kind == "set_eevee":
        e = scene.eevee
        e.taa_render_samples = op["taa_render_samples"]
        for name in ("use_gtao", "use_bloom", "use_ssr", "use_volumetric"):
            _set(e, name, op[name])
    elif kind == "set_ffmpeg":
        r.ffmpeg.format = op["format"]
        r.ffmpeg.codec = op["codec"]
        r.ffmpeg.constant_rate_factor = CRF_PRESETS.get(op["crf"], "MEDIUM")
    elif kind == "set_compute_backend":
        _prefs().compute_device_type = op["backend"]
    elif kind == "refresh_devices":
        _prefs().get_devices()
    elif kind == "set_device_active":
        for d in _prefs().devices:
            if d.id == op["id"]:
                d.use = op["active"]
    elif kind == "set_driver_expression":
        scene.animation_data.drivers[op["index"]].driver.expression = op["expression"]

bpy.ops.render.render(animation=True)
"#;

/// A queued write, replayed inside Blender right before rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostOp {
    SetOutput(OutputSettings),
    SetCycles(CyclesSettings),
    SetEevee(EeveeSettings),
    SetFfmpeg(FfmpegSettings),
    SetComputeBackend { backend: String },
    RefreshDevices,
    SetDeviceActive { id: String, active: bool },
    SetDriverExpression { index: usize, expression: String },
}

/// A `.blend` file opened through the Blender executable
#[derive(Debug)]
pub struct BlenderHost {
    blender: PathBuf,
    blend_file: PathBuf,
    state: SceneState,
    pending: Vec<HostOp>,
}

impl BlenderHost {
    /// Probe `blend_file` with `blender` and cache its scene state
    pub fn open(blender: impl Into<PathBuf>, blend_file: impl Into<PathBuf>) -> Result<Self, HostError> {
        let mut host = Self {
            blender: blender.into(),
            blend_file: blend_file.into(),
            state: SceneState::default(),
            pending: Vec::new(),
        };

        let stdout = host.run_script(PROBE_SCRIPT, &[])?;
        host.state = serde_json::from_str(extract_payload(&stdout)?)?;
        debug!(
            blend = %host.blend_file.display(),
            engine = %host.state.output.engine,
            devices = host.state.compute.devices.len(),
            "probed blend file"
        );
        Ok(host)
    }

    /// Writes queued since the host was opened
    pub fn pending_ops(&self) -> &[HostOp] {
        &self.pending
    }

    fn run_script(&self, body: &str, env: &[(&str, String)]) -> Result<String, HostError> {
        let script = format!("{}\n{}", PRELUDE, body);
        let mut cmd = Command::new(&self.blender);
        cmd.arg("--background")
            .arg(&self.blend_file)
            .args(["--python-exit-code", "1", "--python-expr"])
            .arg(script);
        for (key, value) in env {
            cmd.env(key, value);
        }

        debug!(program = %self.blender.display(), "running host script");
        let output = cmd.output().map_err(|source| HostError::Launch {
            program: self.blender.display().to_string(),
            source,
        })?;
        self.check(output)
    }

    fn check(&self, output: Output) -> Result<String, HostError> {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(HostError::Process {
            program: self.blender.display().to_string(),
            status: output.status.to_string(),
            output: format!("{}{}", stdout, stderr),
        })
    }
}

impl RenderHost for BlenderHost {
    fn scene(&self) -> Result<SceneState, HostError> {
        Ok(self.state.clone())
    }

    fn set_output(&mut self, output: &OutputSettings) -> Result<(), HostError> {
        self.state.output = output.clone();
        self.pending.push(HostOp::SetOutput(output.clone()));
        Ok(())
    }

    fn set_cycles(&mut self, cycles: &CyclesSettings) -> Result<(), HostError> {
        self.state.cycles = cycles.clone();
        self.pending.push(HostOp::SetCycles(cycles.clone()));
        Ok(())
    }

    fn set_eevee(&mut self, eevee: &EeveeSettings) -> Result<(), HostError> {
        self.state.eevee = eevee.clone();
        self.pending.push(HostOp::SetEevee(eevee.clone()));
        Ok(())
    }

    fn set_ffmpeg(&mut self, ffmpeg: &FfmpegSettings) -> Result<(), HostError> {
        self.state.ffmpeg = ffmpeg.clone();
        self.pending.push(HostOp::SetFfmpeg(ffmpeg.clone()));
        Ok(())
    }

    fn devices(&self) -> Result<Vec<ComputeDevice>, HostError> {
        Ok(self.state.compute.devices.clone())
    }

    fn set_compute_backend(&mut self, backend: &str) -> Result<(), HostError> {
        self.state.compute.compute_device_type = backend.to_string();
        self.pending.push(HostOp::SetComputeBackend {
            backend: backend.to_string(),
        });
        Ok(())
    }

    fn refresh_devices(&mut self) -> Result<(), HostError> {
        let backend = self.state.compute.compute_device_type.clone();
        let stdout = self.run_script(DEVICES_SCRIPT, &[(BACKEND_ENV, backend)])?;
        let compute: ComputePreferences = serde_json::from_str(extract_payload(&stdout)?)?;
        self.state.compute = compute;
        self.pending.push(HostOp::RefreshDevices);
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
        self.pending.push(HostOp::SetDeviceActive {
            id: device_id.to_string(),
            active,
        });
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
        self.pending.push(HostOp::SetDriverExpression {
            index,
            expression: expression.to_string(),
        });
        Ok(())
    }

    fn render_animation(&mut self) -> Result<(), HostError> {
        let ops = serde_json::to_string(&self.pending)?;
        self.run_script(RENDER_SCRIPT, &[(OPS_ENV, ops)])?;
        Ok(())
    }

    fn absolute_path(&self, path: &str) -> PathBuf {
        let blend_dir = self.blend_file.parent().unwrap_or_else(|| Path::new("."));
        resolve_blend_path(path, blend_dir)
    }
}

/// Pull the JSON payload printed between the marker lines out of Blender's stdout
pub fn extract_payload(stdout: &str) -> Result<&str, HostError> {
    let start = stdout
        .find(PAYLOAD_BEGIN)
        .map(|i| i + PAYLOAD_BEGIN.len())
        .ok_or_else(|| HostError::Protocol("no scene payload in host output".to_string()))?;
    let len = stdout[start..]
        .find(PAYLOAD_END)
        .ok_or_else(|| HostError::Protocol("scene payload is not terminated".to_string()))?;
    Ok(stdout[start..start + len].trim())
}
