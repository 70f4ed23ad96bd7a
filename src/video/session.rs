//! Interactive video assembly session

use anyhow::Result;
use console::style;

use super::config::{ensure_extension, QualityPreset, VideoCodec, VideoConfig};
use super::encode::{build_args, encode, Encoder, VideoError};
use crate::cli::prompts::{LineSource, Prompter};
use crate::report::display_video_summary;
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_error, print_farewell,
    print_header, print_info, print_step_header, print_success,
};

/// Ask the five setup questions.
///
/// Returns [`VideoError::MissingInputDir`] right after the first question when
/// the folder does not exist; nothing else is asked in that case.
pub fn ask_config<S: LineSource>(prompter: &mut Prompter<S>) -> Result<VideoConfig> {
    print_step_header(1, "PNG sequence folder");
    let input_dir = prompter.ask_path("PNG sequence folder", None)?;
    if !input_dir.exists() {
        return Err(VideoError::MissingInputDir(input_dir).into());
    }

    print_step_header(2, "Output video file");
    let output: String = prompter.ask_text("Output video file (e.g. output.mp4)", "output.mp4")?;
    let output_file = crate::cli::prompts::expand_home(&ensure_extension(&output));

    print_step_header(3, "Frame rate");
    let frame_rate: u32 = prompter.ask("Frame rate (FPS)", Some(24))?;

    print_step_header(4, "Video codec");
    let codec = prompter.choose("Choose a video codec:", &VideoCodec::ALL, 1)?;

    print_step_header(5, "Video quality");
    let quality = prompter.choose("Choose the video quality:", &QualityPreset::ALL, 2)?;

    Ok(VideoConfig {
        input_dir,
        output_file,
        frame_rate,
        codec,
        quality,
    })
}

/// One pass through the flow: questions, confirmation, encode.
///
/// Returns whether a video was produced. Missing input folders, a declined
/// confirmation and encoder failures are reported here and return `false`;
/// only prompt failures (closed input, interrupt) propagate.
pub fn create_video<S, E>(prompter: &mut Prompter<S>, encoder: &mut E) -> Result<bool>
where
    S: LineSource,
    E: Encoder + ?Sized,
{
    print_header("PNG Sequence to Video");

    let config = match ask_config(prompter) {
        Ok(config) => config,
        Err(err) => match err.downcast::<VideoError>() {
            Ok(video_err) => {
                print_error(&video_err.to_string());
                return Ok(false);
            }
            Err(other) => return Err(other),
        },
    };

    display_video_summary(&config);
    if !prompter.confirm("Start creating the video?", true)? {
        print_info("Cancelled");
        return Ok(false);
    }

    println!(
        "    {} {} {}",
        style("$").dim(),
        encoder.program(),
        build_args(&config).join(" ")
    );
    let spinner = create_spinner("Encoding video...");
    match encode(encoder, &config) {
        Ok(report) => {
            finish_with_success(&spinner, "Encoding complete");
            print_success(&format!(
                "Video created: {}",
                report.output_file.display()
            ));
            match report.size_mb() {
                Some(mb) => print_info(&format!("File size: {:.2} MB", mb)),
                None => print_info("File size: unknown"),
            }
            Ok(true)
        }
        Err(err) => {
            finish_with_failure(&spinner, "Encoding failed");
            // `{:#}` appends the cause, e.g. the OS error behind a launch failure
            print_error(&format!("{:#}", anyhow::Error::new(err)));
            Ok(false)
        }
    }
}

/// Run batches until the user declines another one
pub fn run_session<S, E>(prompter: &mut Prompter<S>, encoder: &mut E) -> Result<()>
where
    S: LineSource,
    E: Encoder + ?Sized,
{
    loop {
        if create_video(prompter, encoder)? {
            print_success("Done!");
        } else {
            print_error("Processing failed");
        }

        if !prompter.confirm("Create another video?", false)? {
            break;
        }
    }

    print_farewell("Thanks for using the PNG sequence to video tool!");
    Ok(())
}
