//! Rendercue: interactive batch rendering CLI
//!
//! `rendercue render` configures and renders a scene, `rendercue video`
//! turns a folder of rendered frames into a video file.

use clap::Parser;

use rendercue::cli::{run_render, run_video, Cli, Commands, PromptError};
use rendercue::utils::{init_logging, print_error, print_warning};

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Video { ffmpeg } => run_video(ffmpeg),
        command @ Commands::Render { .. } => match command.render_args() {
            Some(args) => run_render(&args),
            None => Err(anyhow::anyhow!("Either --blend or --scene is required")),
        },
    };

    if let Err(err) = result {
        if let Some(PromptError::Interrupted) = err.downcast_ref::<PromptError>() {
            println!();
            print_warning("Interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        print_error(&err.to_string());
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}
