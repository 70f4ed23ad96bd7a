//! Projection of a render configuration onto the host's settings

use std::fs;

use anyhow::{Context, Result};
use tracing::debug;

use super::config::{Denoiser, RenderConfig};
use crate::host::{CyclesSettings, EeveeSettings, FfmpegSettings, OutputSettings, RenderHost};

/// Logical device type for CPU rendering
pub const CPU_DEVICE_TYPE: &str = "CPU";

/// Backend value the host expects when rendering on the CPU
pub const CPU_BACKEND: &str = "NONE";

/// Compute backend to select for a chosen device type.
///
/// CPU devices report type `CPU` but the host's backend selector has no such
/// value; CPU rendering is backend `NONE`. Every GPU type is its own backend.
pub fn compute_backend_for(device_type: &str) -> &str {
    if device_type == CPU_DEVICE_TYPE {
        CPU_BACKEND
    } else {
        device_type
    }
}

/// Inverse of [`compute_backend_for`], used when reading the host's backend back
pub fn device_type_for_backend(backend: &str) -> String {
    if backend == CPU_BACKEND {
        CPU_DEVICE_TYPE.to_string()
    } else {
        backend.to_string()
    }
}

/// Write every field of `config` to the host and create the output directory.
///
/// Safe to call repeatedly with the same configuration.
pub fn apply<H>(config: &RenderConfig, host: &mut H) -> Result<()>
where
    H: RenderHost + ?Sized,
{
    host.set_output(&output_settings(config))
        .context("Failed to apply output settings")?;

    if config.render_engine.is_ray_traced() {
        select_devices(host, &config.device_type)?;
        host.set_cycles(&cycles_settings(config))
            .context("Failed to apply Cycles settings")?;
    } else {
        host.set_eevee(&eevee_settings(config))
            .context("Failed to apply Eevee settings")?;
    }

    if config.file_format.is_video() {
        host.set_ffmpeg(&ffmpeg_settings(config))
            .context("Failed to apply FFmpeg settings")?;
    }

    // The host keeps `//` paths blend-relative; the directory must be created
    // where the host will write.
    let output_dir = host.absolute_path(&config.output_dir.to_string_lossy());
    debug!(dir = %output_dir.display(), "creating output directory");
    fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    Ok(())
}

/// Two-phase device update: pick the backend, let the host re-detect devices,
/// then enable exactly the devices of the chosen type.
fn select_devices<H>(host: &mut H, device_type: &str) -> Result<()>
where
    H: RenderHost + ?Sized,
{
    let backend = compute_backend_for(device_type);
    host.set_compute_backend(backend)
        .with_context(|| format!("Failed to select compute backend {}", backend))?;
    host.refresh_devices()
        .context("Failed to refresh compute devices")?;

    for device in host.devices()? {
        let active = device.device_type == device_type;
        debug!(device = %device.name, device_type = %device.device_type, active, "device selection");
        host.set_device_active(&device.id, active)
            .with_context(|| format!("Failed to update device {}", device.name))?;
    }
    Ok(())
}

pub fn output_settings(config: &RenderConfig) -> OutputSettings {
    OutputSettings {
        engine: config.render_engine.host_id().to_string(),
        filepath: config.render_filepath(),
        file_format: config.file_format.host_id().to_string(),
        color_mode: config.effective_color_mode().host_id().to_string(),
        frame_start: config.start_frame,
        frame_end: config.end_frame,
        resolution_x: config.resolution_x,
        resolution_y: config.resolution_y,
        resolution_percentage: config.resolution_percent,
    }
}

pub fn cycles_settings(config: &RenderConfig) -> CyclesSettings {
    CyclesSettings {
        samples: config.samples,
        tile_size: config.tile_size,
        max_bounces: config.max_bounces,
        noise_threshold: config.noise_threshold,
        denoising_samples: config.denoising_samples,
        use_denoising: config.denoiser != Denoiser::None,
        denoiser: config.denoiser.host_id().to_string(),
    }
}

pub fn eevee_settings(config: &RenderConfig) -> EeveeSettings {
    EeveeSettings {
        taa_render_samples: config.eevee_samples,
        use_gtao: config.eevee_ambient_occlusion,
        use_bloom: config.eevee_bloom,
        use_ssr: config.eevee_ssr,
        use_volumetric: config.eevee_volumetric,
    }
}

pub fn ffmpeg_settings(config: &RenderConfig) -> FfmpegSettings {
    FfmpegSettings {
        format: config.ffmpeg_format.clone(),
        codec: config.ffmpeg_codec.clone(),
        quality: config.ffmpeg_quality.clone(),
        crf: config.crf(),
    }
}
