//! Tests for render configuration assembly

mod common;

use std::path::PathBuf;
use tempfile::TempDir;

use common::{sample_host, sample_scene, scripted, transcript, RecordingHost};
use rendercue::host::{RenderHost, SceneState, SnapshotHost};
use rendercue::render::{
    apply, assemble, from_host, ColorMode, Denoiser, FileFormat, RenderConfig, RenderEngine,
};

#[test]
fn test_built_in_defaults_mode() {
    let mut prompter = scripted("2\n");
    let mut host = sample_host();
    let defaults = RenderConfig::default();

    let config = assemble(&mut prompter, &mut host, &defaults).unwrap();
    assert_eq!(config, defaults);
}

#[test]
fn test_blend_file_mode_reads_scene() {
    let mut prompter = scripted("1\n");
    let mut host = sample_host();

    let config = assemble(&mut prompter, &mut host, &RenderConfig::default()).unwrap();

    assert_eq!(config.render_engine, RenderEngine::Cycles);
    assert_eq!(config.output_dir, PathBuf::from("/renders"));
    assert_eq!(config.filename_prefix, "shot");
    assert_eq!(config.file_format, FileFormat::Png);
    assert_eq!(config.color_mode, ColorMode::Rgba);
    assert_eq!((config.start_frame, config.end_frame), (1, 48));
    assert_eq!(config.samples, 4096);
    assert_eq!(config.denoiser, Denoiser::OpenImageDenoise);
    assert_eq!(config.device_type, "CUDA");
}

#[test]
fn test_extraction_keeps_defaults_for_empty_path_parts() {
    let mut state = SceneState::default();
    state.output.filepath = "/tmp/".to_string();
    let host = SnapshotHost::new(state);
    let defaults = RenderConfig::default();

    let config = from_host(&host, &defaults).unwrap();
    assert_eq!(config.output_dir, PathBuf::from("/tmp"));
    assert_eq!(
        config.filename_prefix, defaults.filename_prefix,
        "An empty file name keeps the default prefix"
    );

    let mut state = SceneState::default();
    state.output.filepath = String::new();
    let config = from_host(&SnapshotHost::new(state), &defaults).unwrap();
    assert_eq!(config.output_dir, defaults.output_dir);
}

#[test]
fn test_blend_relative_filepath_survives_extract_and_apply() {
    let dir = TempDir::new().unwrap();
    let mut state = sample_scene();
    state.output.filepath = "//frame_####".to_string();
    let mut host = SnapshotHost::new(state).with_base_dir(dir.path());

    let config = from_host(&host, &RenderConfig::default()).unwrap();
    assert_eq!(config.output_dir, PathBuf::from("//"));
    assert_eq!(config.filename_prefix, "frame");

    apply(&config, &mut host).unwrap();
    assert_eq!(host.scene().unwrap().output.filepath, "//frame_####");
}

#[test]
fn test_extraction_maps_cpu_backend_and_disabled_denoising() {
    let mut state = sample_scene();
    state.compute.compute_device_type = "NONE".to_string();
    state.cycles.use_denoising = false;

    let config = from_host(&SnapshotHost::new(state), &RenderConfig::default()).unwrap();
    assert_eq!(config.device_type, "CPU");
    assert_eq!(config.denoiser, Denoiser::None);
}

#[test]
fn test_unknown_engine_and_format_fall_back_to_defaults() {
    let mut state = SceneState::default();
    state.output.engine = "BLENDER_WORKBENCH".to_string();
    state.output.file_format = "TARGA".to_string();
    let defaults = RenderConfig {
        render_engine: RenderEngine::Eevee,
        ..Default::default()
    };

    let config = from_host(&SnapshotHost::new(state), &defaults).unwrap();
    assert_eq!(config.render_engine, RenderEngine::Eevee);
    assert_eq!(config.file_format, FileFormat::Png);
}

#[test]
fn test_extraction_reads_ffmpeg_block_for_video_output() {
    let mut state = SceneState::default();
    state.output.engine = "BLENDER_EEVEE_NEXT".to_string();
    state.output.file_format = "FFMPEG".to_string();
    state.ffmpeg.format = "MKV".to_string();
    state.ffmpeg.codec = "AV1".to_string();
    state.ffmpeg.quality = "HIGH".to_string();
    state.eevee.taa_render_samples = 16;
    state.eevee.use_bloom = true;

    let config = from_host(&SnapshotHost::new(state), &RenderConfig::default()).unwrap();
    assert_eq!(config.render_engine, RenderEngine::EeveeNext);
    assert_eq!(config.eevee_samples, 16);
    assert!(config.eevee_bloom);
    assert!(!config.eevee_ssr);
    assert_eq!(config.ffmpeg_format, "MKV");
    assert_eq!(config.ffmpeg_codec, "AV1");
    assert_eq!(config.ffmpeg_quality, "HIGH");
}

#[test]
fn test_custom_cycles_with_no_devices_falls_back_to_cpu() {
    // Mode, then every question answered with its default.
    let script = format!("3\n{}", "\n".repeat(17));
    let mut prompter = scripted(&script);
    let mut host = SnapshotHost::new(SceneState::default());

    let config = assemble(&mut prompter, &mut host, &RenderConfig::default()).unwrap();

    assert_eq!(config.render_engine, RenderEngine::Cycles);
    assert_eq!(config.device_type, "CPU");
    let out = transcript(&prompter);
    assert!(out.contains("The host reported no compute devices"));
    assert!(out.contains("  1. CPU (fallback)"));
}

#[test]
fn test_custom_cycles_picks_listed_device() {
    let script = format!("3\n{}2\n", "\n".repeat(16));
    let mut prompter = scripted(&script);
    let mut host = RecordingHost::new(sample_host());

    let config = assemble(&mut prompter, &mut host, &RenderConfig::default()).unwrap();

    assert_eq!(config.device_type, "CPU");
    assert!(
        host.position("refresh_devices").is_some(),
        "Devices are refreshed before the menu is shown"
    );
    let out = transcript(&prompter);
    assert!(out.contains("  1. RTX 4090 (CUDA)"));
    assert!(out.contains("  2. Ryzen 9 (CPU)"));
    assert!(!out.contains("CPU (fallback)"));
}

#[test]
fn test_custom_eevee_video_asks_toggles_and_container() {
    let script = [
        "3",       // custom settings
        "/tmp/rc", // output directory
        "shot",    // prefix
        "2",       // Eevee
        "5",       // FFMPEG
        "10",      // start frame
        "20",      // end frame
        "1280",    // width
        "720",     // height
        "50",      // percentage
        "3",       // RGBA
        "32",      // eevee samples
        "2",       // ambient occlusion: No
        "1",       // bloom: Yes
        "2",       // ssr: No
        "1",       // volumetrics: Yes
        "10",      // WEBM
        "5",       // VP9
        "3",       // HIGH
    ]
    .join("\n")
        + "\n";
    let mut prompter = scripted(&script);
    let mut host = RecordingHost::new(sample_host());

    let config = assemble(&mut prompter, &mut host, &RenderConfig::default()).unwrap();

    assert_eq!(config.render_engine, RenderEngine::Eevee);
    assert_eq!(config.file_format, FileFormat::Ffmpeg);
    assert_eq!(config.output_dir, PathBuf::from("/tmp/rc"));
    assert_eq!(config.filename_prefix, "shot");
    assert_eq!((config.start_frame, config.end_frame), (10, 20));
    assert_eq!(
        (config.resolution_x, config.resolution_y, config.resolution_percent),
        (1280, 720, 50)
    );
    assert_eq!(config.color_mode, ColorMode::Rgba);
    assert_eq!(config.eevee_samples, 32);
    assert!(!config.eevee_ambient_occlusion);
    assert!(config.eevee_bloom);
    assert!(!config.eevee_ssr);
    assert!(config.eevee_volumetric);
    assert_eq!(config.ffmpeg_format, "WEBM");
    assert_eq!(config.ffmpeg_codec, "VP9");
    assert_eq!(config.ffmpeg_quality, "HIGH");
    assert_eq!(config.crf(), 20);

    let out = transcript(&prompter);
    assert!(!out.contains("Choose a device:"));
    assert!(!out.contains("Choose a denoiser:"));
    assert!(host.calls.is_empty(), "Assembly never writes to the host");
}
