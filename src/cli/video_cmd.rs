//! The `video` subcommand: PNG sequence to video with ffmpeg

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use super::prompts::{open_source, PromptError, Prompter};
use crate::utils::{print_banner, print_error, print_farewell};
use crate::video::{run_session, FfmpegEncoder};

/// Run the video utility with the encoder at `ffmpeg`.
///
/// The encoder is checked before anything is asked. Closing input or
/// pressing Ctrl-C ends the session without an error.
pub fn run_video(ffmpeg: &Path) -> Result<()> {
    let mut encoder = FfmpegEncoder::new(ffmpeg);
    if let Err(err) = encoder.check_available() {
        print_error("ffmpeg is required for this tool");
        print_install_hints();
        return Err(err.into());
    }

    ctrlc::set_handler(|| {
        println!();
        print_farewell("Interrupted, goodbye!");
        std::process::exit(0);
    })
    .context("Failed to install Ctrl-C handler")?;

    print_banner(
        "RENDERCUE VIDEO",
        "PNG sequence to video",
        env!("CARGO_PKG_VERSION"),
    );

    let mut prompter = Prompter::new(open_source());
    match run_session(&mut prompter, &mut encoder) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<PromptError>() {
            Some(PromptError::Interrupted) | Some(PromptError::Closed) => {
                info!("input ended, leaving video session");
                println!();
                print_farewell("Goodbye!");
                Ok(())
            }
            _ => Err(err),
        },
    }
}

fn print_install_hints() {
    println!();
    println!("    {}", style("Install ffmpeg:").white().bold());
    println!("      Ubuntu/Debian:  {}", style("sudo apt install ffmpeg").cyan());
    println!("      macOS:          {}", style("brew install ffmpeg").cyan());
    println!(
        "      Windows:        {}",
        style("download from https://ffmpeg.org/download.html").cyan()
    );
    println!();
}
