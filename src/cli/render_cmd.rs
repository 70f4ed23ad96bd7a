//! The `render` subcommand: configure a scene through a host and batch-render it

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::args::{HostTarget, RenderArgs};
use super::prompts::{open_source, LineSource, Prompter};
use crate::host::{BlenderHost, RenderHost, SnapshotHost};
use crate::render::{
    apply, assemble, fix_driver_issues, render_frames, RenderConfig, RenderOutcome,
};
use crate::report::{display_render_outcome, display_render_summary};
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_info, print_path, print_success,
};

/// Run the render utility for the parsed command line
pub fn run_render(args: &RenderArgs) -> Result<()> {
    print_banner(
        "RENDERCUE",
        "Interactive batch rendering",
        env!("CARGO_PKG_VERSION"),
    );

    let defaults = match &args.preset {
        Some(path) => {
            let config = RenderConfig::load_preset(path)?;
            print_path("Preset", path);
            config
        }
        None => RenderConfig::default(),
    };

    let mut prompter = Prompter::new(open_source());

    match &args.target {
        HostTarget::Blend { blender, file } => {
            let spinner = create_spinner("Reading scene from blend file...");
            let mut host = match BlenderHost::open(blender, file) {
                Ok(host) => {
                    finish_with_success(&spinner, "Scene loaded");
                    host
                }
                Err(err) => {
                    finish_with_failure(&spinner, "Could not read blend file");
                    return Err(err)
                        .with_context(|| format!("Failed to open {}", file.display()));
                }
            };
            render_session(
                &mut prompter,
                &mut host,
                &defaults,
                args.export_config.as_deref(),
            )?;
        }
        HostTarget::Snapshot(path) => {
            let mut host = SnapshotHost::load(path)
                .with_context(|| format!("Failed to load scene snapshot: {}", path.display()))?;
            print_path("Scene", path);
            render_session(
                &mut prompter,
                &mut host,
                &defaults,
                args.export_config.as_deref(),
            )?;

            if let Some(out) = &args.save_scene {
                host.save(out)
                    .with_context(|| format!("Failed to save scene: {}", out.display()))?;
                print_path("Scene saved", out);
            }
        }
    }

    Ok(())
}

/// Driver fix-up, assembly, projection, summary, confirmation and render.
///
/// Returns `None` when the user declines to render; the scene is configured
/// either way.
pub fn render_session<S, H>(
    prompter: &mut Prompter<S>,
    host: &mut H,
    defaults: &RenderConfig,
    export_config: Option<&Path>,
) -> Result<Option<RenderOutcome>>
where
    S: LineSource,
    H: RenderHost + ?Sized,
{
    let patched = fix_driver_issues(host);
    if patched > 0 {
        info!(patched, "driver expressions patched");
    }

    let config = assemble(prompter, host, defaults)?;
    apply(&config, host).context("Failed to apply render configuration")?;
    print_success("Render settings applied");

    if let Some(path) = export_config {
        config.save(path)?;
        print_path("Configuration exported", path);
    }

    display_render_summary(&config);

    if !prompter.confirm("Start rendering?", false)? {
        print_info("Render cancelled");
        return Ok(None);
    }

    let outcome = render_frames(host)?;
    display_render_outcome(&outcome);
    print_completion("Render finished");
    Ok(Some(outcome))
}
