//! Render configuration assembly
//!
//! A configuration comes from one of three places, picked by the first menu:
//! the settings already stored in the scene, the built-in defaults (or preset),
//! or a sequence of questions. The questions form a fixed decision tree:
//!
//! 1. output location and naming, engine, file format, frames, resolution, color mode
//! 2. engine branch: ray-trace sampler/denoiser/device questions, or the
//!    real-time sample count and effect toggles
//! 3. format branch (independent of step 2): container, codec and quality for video output

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use super::config::{
    ColorMode, Denoiser, FileFormat, QualityTier, RenderConfig, RenderEngine, CONTAINER_FORMATS,
    VIDEO_CODECS,
};
use super::project::device_type_for_backend;
use crate::cli::prompts::{LineSource, Prompter};
use crate::host::{ComputeDevice, HostError, RenderHost};
use crate::utils::{print_header, CHECK, WARN};

/// Where the configuration comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    BlendFile,
    BuiltIn,
    Custom,
}

impl ConfigSource {
    pub const ALL: [ConfigSource; 3] = [
        ConfigSource::BlendFile,
        ConfigSource::BuiltIn,
        ConfigSource::Custom,
    ];
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::BlendFile => "Use the settings stored in the .blend file",
            ConfigSource::BuiltIn => "Use built-in defaults",
            ConfigSource::Custom => "Custom settings",
        };
        f.write_str(label)
    }
}

/// One entry of the device menu
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceChoice {
    pub label: String,
    pub device_type: String,
}

impl fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Build the device menu from whatever the host detected.
///
/// The host may report nothing, or only GPUs; a CPU entry is appended whenever
/// none is present so there is always something to pick.
pub fn device_options(devices: &[ComputeDevice]) -> Vec<DeviceChoice> {
    let mut options: Vec<DeviceChoice> = devices
        .iter()
        .map(|d| {
            let mut label = format!("{} ({})", d.name, d.device_type);
            if !d.is_compatible {
                label.push_str(" [unsupported]");
            }
            DeviceChoice {
                label,
                device_type: d.device_type.clone(),
            }
        })
        .collect();

    if !devices.iter().any(|d| d.device_type == "CPU") {
        options.push(DeviceChoice {
            label: "CPU (fallback)".to_string(),
            device_type: "CPU".to_string(),
        });
    }
    options
}

/// Ask where the configuration should come from and build it
pub fn assemble<S, H>(
    prompter: &mut Prompter<S>,
    host: &mut H,
    defaults: &RenderConfig,
) -> Result<RenderConfig>
where
    S: LineSource,
    H: RenderHost + ?Sized,
{
    print_header("Render Configuration");
    let source = prompter.choose("Choose a configuration mode:", &ConfigSource::ALL, 1)?;

    let config = match source {
        ConfigSource::BlendFile => {
            let config = from_host(&*host, defaults)?;
            prompter.say(&format!("{}Using the settings stored in the .blend file", CHECK))?;
            config
        }
        ConfigSource::BuiltIn => {
            prompter.say(&format!("{}Using built-in defaults", CHECK))?;
            defaults.clone()
        }
        ConfigSource::Custom => interactive(prompter, host, defaults)?,
    };
    Ok(config)
}

/// Read the current host settings into a configuration.
///
/// Fields the host cannot supply keep their value from `defaults`.
pub fn from_host<H>(host: &H, defaults: &RenderConfig) -> Result<RenderConfig, HostError>
where
    H: RenderHost + ?Sized,
{
    let scene = host.scene()?;
    let output = &scene.output;
    let mut config = defaults.clone();

    config.render_engine = RenderEngine::from_host_id(&output.engine).unwrap_or_else(|| {
        warn!(engine = %output.engine, "unsupported render engine in scene, using default");
        defaults.render_engine
    });

    let (dir, file_name) = split_host_path(&output.filepath);
    if !dir.is_empty() {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(prefix) = file_name.split('_').next().filter(|p| !p.is_empty()) {
        config.filename_prefix = prefix.to_string();
    }

    config.file_format = FileFormat::from_host_id(&output.file_format).unwrap_or_else(|| {
        warn!(format = %output.file_format, "unsupported file format in scene, using default");
        defaults.file_format
    });
    config.color_mode = ColorMode::from_host_id(&output.color_mode).unwrap_or(defaults.color_mode);
    config.start_frame = output.frame_start;
    config.end_frame = output.frame_end;
    config.resolution_x = output.resolution_x;
    config.resolution_y = output.resolution_y;
    config.resolution_percent = output.resolution_percentage;

    if config.render_engine.is_ray_traced() {
        let cycles = &scene.cycles;
        config.samples = cycles.samples;
        config.tile_size = cycles.tile_size;
        config.max_bounces = cycles.max_bounces;
        config.noise_threshold = cycles.noise_threshold;
        config.denoising_samples = cycles.denoising_samples;
        config.denoiser = if cycles.use_denoising {
            Denoiser::from_host_id(&cycles.denoiser).unwrap_or(defaults.denoiser)
        } else {
            Denoiser::None
        };
        config.device_type = device_type_for_backend(&scene.compute.compute_device_type);
    } else {
        let eevee = &scene.eevee;
        config.eevee_samples = eevee.taa_render_samples;
        config.eevee_ambient_occlusion = eevee.use_gtao;
        config.eevee_bloom = eevee.use_bloom;
        config.eevee_ssr = eevee.use_ssr;
        config.eevee_volumetric = eevee.use_volumetric;
    }

    if config.file_format.is_video() {
        config.ffmpeg_format = scene.ffmpeg.format.clone();
        config.ffmpeg_codec = scene.ffmpeg.codec.clone();
        config.ffmpeg_quality = scene.ffmpeg.quality.clone();
    }

    Ok(config)
}

/// Build a configuration by asking the user, starting from `defaults`
pub fn interactive<S, H>(
    prompter: &mut Prompter<S>,
    host: &mut H,
    defaults: &RenderConfig,
) -> Result<RenderConfig>
where
    S: LineSource,
    H: RenderHost + ?Sized,
{
    let mut config = defaults.clone();
    print_header("Custom Configuration");

    let default_dir = defaults.output_dir.display().to_string();
    config.output_dir = prompter.ask_path("Output directory", Some(&default_dir))?;
    config.filename_prefix = prompter.ask_text("Filename prefix", &defaults.filename_prefix)?;

    config.render_engine = prompter.choose("Choose a render engine:", &RenderEngine::ALL, 1)?;
    config.file_format = prompter.choose("Choose a file format:", &FileFormat::ALL, 1)?;

    config.start_frame = prompter.ask("Start frame", Some(defaults.start_frame))?;
    config.end_frame = prompter.ask("End frame", Some(defaults.end_frame))?;

    config.resolution_x = prompter.ask("Width", Some(defaults.resolution_x))?;
    config.resolution_y = prompter.ask("Height", Some(defaults.resolution_y))?;
    config.resolution_percent = prompter.ask("Resolution percentage", Some(defaults.resolution_percent))?;

    config.color_mode = prompter.choose("Choose a color mode:", &ColorMode::ALL, 1)?;

    if config.render_engine.is_ray_traced() {
        ask_cycles(prompter, host, defaults, &mut config)?;
    } else {
        ask_eevee(prompter, defaults, &mut config)?;
    }

    if config.file_format.is_video() {
        ask_ffmpeg(prompter, &mut config)?;
    }

    Ok(config)
}

fn ask_cycles<S, H>(
    prompter: &mut Prompter<S>,
    host: &mut H,
    defaults: &RenderConfig,
    config: &mut RenderConfig,
) -> Result<()>
where
    S: LineSource,
    H: RenderHost + ?Sized,
{
    print_header("Cycles Settings");
    config.samples = prompter.ask("Samples", Some(defaults.samples))?;
    config.tile_size = prompter.ask("Tile size", Some(defaults.tile_size))?;
    config.max_bounces = prompter.ask("Max light bounces", Some(defaults.max_bounces))?;
    config.noise_threshold = prompter.ask("Noise threshold (0.01-0.1)", Some(defaults.noise_threshold))?;
    config.denoising_samples = prompter.ask(
        "Denoising samples (0 = use all samples)",
        Some(defaults.denoising_samples),
    )?;

    config.denoiser = prompter.choose("Choose a denoiser:", &Denoiser::ALL, 1)?;

    let detected = host.compute_devices()?;
    if detected.is_empty() {
        prompter.say(&format!("{}The host reported no compute devices", WARN))?;
    }
    let options = device_options(&detected);
    let device = prompter.choose("Choose a device:", &options, 1)?;
    config.device_type = device.device_type;

    Ok(())
}

fn ask_eevee<S: LineSource>(
    prompter: &mut Prompter<S>,
    defaults: &RenderConfig,
    config: &mut RenderConfig,
) -> Result<()> {
    print_header(&format!("{} Settings", config.render_engine.name()));
    config.eevee_samples = prompter.ask("Samples", Some(defaults.eevee_samples))?;

    config.eevee_ambient_occlusion = ask_yes_no(prompter, "Enable ambient occlusion?")?;
    config.eevee_bloom = ask_yes_no(prompter, "Enable bloom?")?;
    config.eevee_ssr = ask_yes_no(prompter, "Enable screen-space reflections?")?;
    config.eevee_volumetric = ask_yes_no(prompter, "Enable volumetrics?")?;
    Ok(())
}

fn ask_ffmpeg<S: LineSource>(prompter: &mut Prompter<S>, config: &mut RenderConfig) -> Result<()> {
    print_header("FFmpeg Settings");
    config.ffmpeg_format = prompter
        .choose("Choose a container format:", CONTAINER_FORMATS, 1)?
        .to_string();
    config.ffmpeg_codec = prompter
        .choose("Choose a video codec:", VIDEO_CODECS, 1)?
        .to_string();

    let tiers: Vec<&str> = QualityTier::ALL.iter().map(|t| t.host_id()).collect();
    config.ffmpeg_quality = prompter
        .choose("Choose a quality setting:", &tiers, 1)?
        .to_string();
    Ok(())
}

fn ask_yes_no<S: LineSource>(prompter: &mut Prompter<S>, text: &str) -> Result<bool> {
    Ok(prompter.choose(text, &["Yes", "No"], 1)? == "Yes")
}

/// Split a host filepath into directory and file name.
///
/// Unlike `Path::parent`, a trailing separator keeps the whole path as the
/// directory with an empty file name (`/tmp/` → (`/tmp`, ``)). The
/// blend-relative `//` prefix stays whole (`//f_` → (`//`, `f_`)).
fn split_host_path(filepath: &str) -> (&str, &str) {
    match filepath.rfind(['/', '\\']) {
        Some(1) if filepath.starts_with("//") => ("//", &filepath[2..]),
        Some(0) => ("/", &filepath[1..]),
        Some(i) => (&filepath[..i], &filepath[i + 1..]),
        None => ("", filepath),
    }
}
