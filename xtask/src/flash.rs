//! xtask flash - build the board binary and run it under probe-rs
//!
//! probe-rs stays attached after flashing and decodes the defmt RTT stream,
//! so the engine's startup sequence and tone log appear in this terminal.

use anyhow::{Context, Result};
use colored::Colorize;
use platform::config;
use std::process::Command;
use std::time::Instant;

use crate::step::{self, OnFailure, BOARD_CHIP, BOARD_TARGET};

pub fn run(release: bool, defmt_log: &str) -> Result<()> {
    let profile = if release { "release" } else { "debug" };
    println!();
    println!(
        "{}",
        format!("🔨 {} for {} ({profile})", config::APP_NAME, config::BOARD_NAME)
            .cyan()
            .bold()
    );
    println!();
    let start = Instant::now();

    let mut build = vec![
        "build",
        "-p",
        "firmware",
        "--bin",
        "firmware",
        "--target",
        BOARD_TARGET,
        "--features",
        "hardware",
    ];
    if release {
        build.push("--release");
    }
    // DEFMT_LOG is read at compile time; the level must be set on the build.
    step::captured_env(
        &format!("build with DEFMT_LOG={defmt_log}"),
        "cargo",
        &build,
        &[("DEFMT_LOG", defmt_log)],
        OnFailure::Abort,
    )?;

    let elf = format!("target/{BOARD_TARGET}/{profile}/firmware");
    println!();
    println!("{}", format!("📡 Flashing {elf} to {BOARD_CHIP}").cyan().bold());
    println!("   {}", "Ctrl-C detaches; the board keeps playing".dimmed());
    println!();

    let status = Command::new("probe-rs")
        .args(["run", "--chip", BOARD_CHIP, &elf])
        .status()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;
    if !status.success() {
        anyhow::bail!("probe-rs exited with {status}; check the probe and board power");
    }

    step::done("Flash", start);
    Ok(())
}
