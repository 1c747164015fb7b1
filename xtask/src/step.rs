//! One cargo (or probe-rs) invocation with a banner, timing and a verdict.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// What a failed step does to the whole task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Warn,
}

/// Target triple of the STM32H743 board.
pub const BOARD_TARGET: &str = "thumbv7em-none-eabihf";

/// Probe-rs chip name of the STM32H743 board.
pub const BOARD_CHIP: &str = "STM32H743ZITx";

/// Run `program args` with captured output. Returns the captured stdout when
/// the command succeeds, `None` when it failed with [`OnFailure::Warn`].
pub fn captured(
    label: &str,
    program: &str,
    args: &[&str],
    on_failure: OnFailure,
) -> Result<Option<String>> {
    captured_env(label, program, args, &[], on_failure)
}

/// [`captured`] with extra environment variables for the child.
pub fn captured_env(
    label: &str,
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
    on_failure: OnFailure,
) -> Result<Option<String>> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();

    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .output()
        .with_context(|| format!("Failed to spawn {program} for {label}"))?;

    if output.status.success() {
        println!(
            "{}",
            format!("  ✓ {label} in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
        return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    match on_failure {
        OnFailure::Abort => {
            eprintln!("{}", format!("  ✗ {label} failed").red().bold());
            eprintln!("{stderr}");
            anyhow::bail!("{label} failed");
        }
        OnFailure::Warn => {
            eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold());
            eprintln!("{stderr}");
            Ok(None)
        }
    }
}

/// Print the closing line of a task.
pub fn done(task: &str, start: Instant) {
    println!();
    println!(
        "{}",
        format!("✓ {task} completed in {:.2}s", start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
}
