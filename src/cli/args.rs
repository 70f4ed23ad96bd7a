//! Command-line argument definitions using clap

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Rendercue - interactive batch rendering and PNG sequence to video assembly
#[derive(Parser, Debug)]
#[command(name = "rendercue")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure and batch-render a scene
    #[command(group(
        ArgGroup::new("host")
            .required(true)
            .args(["blend", "scene"])
    ))]
    Render {
        /// Blend file to render through a local Blender install
        #[arg(long)]
        blend: Option<PathBuf>,

        /// JSON scene snapshot to configure without rendering (dry run)
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Blender executable used with --blend
        #[arg(long, default_value = "blender")]
        blender: PathBuf,

        /// JSON preset overriding the built-in defaults.
        /// Keys left out of the file keep their built-in value.
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Write the assembled configuration to this JSON file
        #[arg(long)]
        export_config: Option<PathBuf>,

        /// Write the resulting scene state after the run (--scene only)
        #[arg(long, requires = "scene", conflicts_with = "blend")]
        save_scene: Option<PathBuf>,
    },

    /// Stitch a folder of PNG frames into a video with ffmpeg
    Video {
        /// ffmpeg executable
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg: PathBuf,
    },
}

/// Where the render command gets its scene from
#[derive(Debug, Clone, PartialEq)]
pub enum HostTarget {
    Blend { blender: PathBuf, file: PathBuf },
    Snapshot(PathBuf),
}

/// Options of the `render` subcommand, detached from clap
#[derive(Debug, Clone, PartialEq)]
pub struct RenderArgs {
    pub target: HostTarget,
    pub preset: Option<PathBuf>,
    pub export_config: Option<PathBuf>,
    pub save_scene: Option<PathBuf>,
}

impl Commands {
    /// Render options, if this is the `render` subcommand.
    ///
    /// The clap group guarantees one of `--blend`/`--scene`; `--blend` wins
    /// should both somehow be present.
    pub fn render_args(&self) -> Option<RenderArgs> {
        match self {
            Commands::Render {
                blend,
                scene,
                blender,
                preset,
                export_config,
                save_scene,
            } => {
                let target = match (blend, scene) {
                    (Some(file), _) => HostTarget::Blend {
                        blender: blender.clone(),
                        file: file.clone(),
                    },
                    (None, Some(snapshot)) => HostTarget::Snapshot(snapshot.clone()),
                    (None, None) => return None,
                };
                Some(RenderArgs {
                    target,
                    preset: preset.clone(),
                    export_config: export_config.clone(),
                    save_scene: save_scene.clone(),
                })
            }
            Commands::Video { .. } => None,
        }
    }
}
