//! xtask emulate - run the tone engine against the host transmitter
//!
//! Builds and runs `firmware`'s `selcall_emulator` example with the
//! `emulator` feature. The emulator paces writes in real time and logs each
//! tone change, so a run shows the call timing as the board would play it.

use anyhow::{Context, Result};
use colored::Colorize;
use platform::config;
use std::process::Command;

pub fn run(seconds: u64, log: &str) -> Result<()> {
    println!();
    println!(
        "{}",
        format!("📻 {} emulator ({seconds} s)", config::APP_NAME)
            .cyan()
            .bold()
    );
    println!("   {}", format!("RUST_LOG={log}").dimmed());
    println!();

    let status = Command::new("cargo")
        .args([
            "run",
            "-p",
            "firmware",
            "--example",
            "selcall_emulator",
            "--features",
            "emulator",
            "--",
        ])
        .arg(seconds.to_string())
        .env("RUST_LOG", log)
        .status()
        .context("Failed to run the selcall emulator")?;

    if !status.success() {
        anyhow::bail!("Emulator exited with {status}");
    }

    println!();
    println!("{}", "✓ Emulator run complete".green());
    Ok(())
}
