//! Render invocation: pre-flight driver fix-up and the batch render itself

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::host::{HostError, RenderHost};
use crate::utils::{create_spinner, finish_with_failure, finish_with_success, print_success};

/// Camera driver expression that divides by zero when `angle` reaches zero
pub const FRAGILE_DRIVER_EXPR: &str = "sensor_height/tan(angle/2)/2";

/// Replacement with an epsilon added to the denominator
pub const PATCHED_DRIVER_EXPR: &str = "sensor_height/(tan(angle/2)+0.0001)/2";

/// Rewrite a driver expression if it contains the fragile pattern
pub fn patch_driver_expression(expression: &str) -> Option<String> {
    if expression.contains(FRAGILE_DRIVER_EXPR) {
        Some(expression.replace(FRAGILE_DRIVER_EXPR, PATCHED_DRIVER_EXPR))
    } else {
        None
    }
}

/// Patch every fragile driver expression in the scene.
///
/// Never fails: problems reading or writing drivers are logged and the run
/// continues. Returns the number of drivers rewritten.
pub fn fix_driver_issues<H>(host: &mut H) -> usize
where
    H: RenderHost + ?Sized,
{
    match patch_drivers(host) {
        Ok(patched) => patched,
        Err(err) => {
            warn!(error = %err, "driver fix-up failed, continuing");
            0
        }
    }
}

fn patch_drivers<H>(host: &mut H) -> Result<usize, HostError>
where
    H: RenderHost + ?Sized,
{
    let mut patched = 0;
    for (index, driver) in host.drivers()?.iter().enumerate() {
        if let Some(expression) = patch_driver_expression(&driver.expression) {
            host.set_driver_expression(index, &expression)?;
            debug!(data_path = %driver.data_path, %expression, "patched driver expression");
            print_success("Fixed divide-by-zero driver expression");
            patched += 1;
        }
    }
    Ok(patched)
}

/// What a finished render run produced
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub frame_start: i32,
    pub frame_end: i32,
    /// Absolute form of the host's render filepath
    pub output_path: PathBuf,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

/// Run the host's batch render for the configured frame range
pub fn render_frames<H>(host: &mut H) -> Result<RenderOutcome>
where
    H: RenderHost + ?Sized,
{
    let scene = host.scene().context("Failed to read scene before rendering")?;
    let output = scene.output;

    let started_at = Local::now();
    let timer = Instant::now();
    let spinner = create_spinner(&format!(
        "Rendering frames {}-{} (started {})",
        output.frame_start,
        output.frame_end,
        started_at.format("%H:%M:%S")
    ));

    if let Err(err) = host.render_animation() {
        finish_with_failure(&spinner, "Render failed");
        return Err(err).context("Host render failed");
    }
    finish_with_success(&spinner, "Render complete");

    Ok(RenderOutcome {
        frame_start: output.frame_start,
        frame_end: output.frame_end,
        output_path: host.absolute_path(&output.filepath),
        started_at,
        elapsed: timer.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_rewrites_fragile_pattern() {
        let patched = patch_driver_expression("sensor_height/tan(angle/2)/2").unwrap();
        assert_eq!(patched, PATCHED_DRIVER_EXPR);
    }

    #[test]
    fn test_patch_keeps_surrounding_expression() {
        let patched = patch_driver_expression("1.5 * sensor_height/tan(angle/2)/2 + 0.1").unwrap();
        assert_eq!(patched, "1.5 * sensor_height/(tan(angle/2)+0.0001)/2 + 0.1");
    }

    #[test]
    fn test_patch_ignores_other_expressions() {
        assert!(patch_driver_expression("frame / 24").is_none());
        assert!(patch_driver_expression(PATCHED_DRIVER_EXPR).is_none());
    }
}
