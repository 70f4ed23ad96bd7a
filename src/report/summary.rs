//! Configuration and outcome summaries

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::render::{QualityTier, RenderConfig, RenderOutcome};
use crate::video::VideoConfig;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Setting").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table
}

fn yes_no(value: bool) -> Cell {
    if value {
        Cell::new("Yes").fg(Color::Green)
    } else {
        Cell::new("No").fg(Color::DarkGrey)
    }
}

fn print_indented(title: &str, table: &Table) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
    println!();
}

/// Table of the final render configuration; engine rows follow the engine branch
pub fn render_summary_table(config: &RenderConfig) -> Table {
    let mut table = new_table();

    table.add_row(vec![
        Cell::new("Render engine"),
        Cell::new(config.render_engine.host_id()).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Output directory"),
        Cell::new(config.output_dir.display()),
    ]);
    table.add_row(vec![Cell::new("Filename prefix"), Cell::new(&config.filename_prefix)]);
    table.add_row(vec![Cell::new("File format"), Cell::new(config.file_format)]);
    table.add_row(vec![
        Cell::new("Frame range"),
        Cell::new(format!("{}-{}", config.start_frame, config.end_frame)),
    ]);
    table.add_row(vec![
        Cell::new("Resolution"),
        Cell::new(format!(
            "{}x{} ({}%)",
            config.resolution_x, config.resolution_y, config.resolution_percent
        )),
    ]);

    if config.render_engine.is_ray_traced() {
        table.add_row(vec![Cell::new("Cycles samples"), Cell::new(config.samples)]);
        table.add_row(vec![Cell::new("Tile size"), Cell::new(config.tile_size)]);
        table.add_row(vec![Cell::new("Max light bounces"), Cell::new(config.max_bounces)]);
        table.add_row(vec![Cell::new("Noise threshold"), Cell::new(config.noise_threshold)]);
        table.add_row(vec![
            Cell::new("Denoising samples"),
            Cell::new(config.denoising_samples),
        ]);
        table.add_row(vec![Cell::new("Denoiser"), Cell::new(config.denoiser.host_id())]);
        table.add_row(vec![Cell::new("Device type"), Cell::new(&config.device_type)]);
    } else {
        let engine = config.render_engine.name();
        table.add_row(vec![
            Cell::new(format!("{} samples", engine)),
            Cell::new(config.eevee_samples),
        ]);
        table.add_row(vec![
            Cell::new("Ambient occlusion"),
            yes_no(config.eevee_ambient_occlusion),
        ]);
        table.add_row(vec![Cell::new("Bloom"), yes_no(config.eevee_bloom)]);
        table.add_row(vec![
            Cell::new("Screen-space reflections"),
            yes_no(config.eevee_ssr),
        ]);
        table.add_row(vec![Cell::new("Volumetrics"), yes_no(config.eevee_volumetric)]);
    }

    if config.file_format.is_video() {
        table.add_row(vec![Cell::new("FFmpeg container"), Cell::new(&config.ffmpeg_format)]);
        table.add_row(vec![Cell::new("FFmpeg codec"), Cell::new(&config.ffmpeg_codec)]);
        let quality = match QualityTier::from_host_id(&config.ffmpeg_quality) {
            Some(tier) => format!("{} (CRF={})", tier.description(), tier.crf()),
            None => format!("Custom (CRF={})", config.crf()),
        };
        table.add_row(vec![Cell::new("FFmpeg quality"), Cell::new(quality)]);
    }

    table
}

pub fn display_render_summary(config: &RenderConfig) {
    print_indented("FINAL RENDER CONFIGURATION", &render_summary_table(config));
}

/// Table of the video settings shown before encoding
pub fn video_summary_table(config: &VideoConfig) -> Table {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Input folder"),
        Cell::new(config.input_dir.display()),
    ]);
    table.add_row(vec![
        Cell::new("Output file"),
        Cell::new(config.output_file.display()),
    ]);
    table.add_row(vec![
        Cell::new("Frame rate"),
        Cell::new(format!("{} FPS", config.frame_rate)),
    ]);
    table.add_row(vec![Cell::new("Codec"), Cell::new(config.codec)]);
    table.add_row(vec![Cell::new("Quality"), Cell::new(config.quality)]);
    table
}

pub fn display_video_summary(config: &VideoConfig) {
    print_indented("FINAL VIDEO SETTINGS", &video_summary_table(config));
}

/// Where a finished render went and how long it took
pub fn display_render_outcome(outcome: &RenderOutcome) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.add_row(vec![
        Cell::new("🎞️  Frames"),
        Cell::new(format!("{}-{}", outcome.frame_start, outcome.frame_end)),
    ]);
    table.add_row(vec![
        Cell::new("🕒 Started"),
        Cell::new(outcome.started_at.format("%Y-%m-%d %H:%M:%S")),
    ]);
    table.add_row(vec![
        Cell::new("⏱️  Elapsed"),
        Cell::new(format!("{:.1}s", outcome.elapsed.as_secs_f64())),
    ]);
    table.add_row(vec![
        Cell::new("💾 Saved to"),
        Cell::new(outcome.output_path.display())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    print_indented("RENDER COMPLETE", &table);
}
