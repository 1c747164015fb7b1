//! xtask check - every build configuration the tone engine ships in
//!
//! The engine crates must build for the board without `std`, with each of
//! the two logging backends, and the firmware must build both as the board
//! binary and as the host emulator.

use anyhow::Result;
use std::time::Instant;

use crate::step::{self, OnFailure, BOARD_TARGET};

struct Build {
    label: &'static str,
    args: &'static [&'static str],
}

const BUILDS: &[Build] = &[
    Build {
        label: "platform, no_std on the board target",
        args: &["-p", "platform", "--target", BOARD_TARGET, "--no-default-features"],
    },
    Build {
        label: "selcall, no_std without logging",
        args: &["-p", "selcall", "--target", BOARD_TARGET, "--no-default-features"],
    },
    Build {
        label: "selcall, defmt logging",
        args: &["-p", "selcall", "--target", BOARD_TARGET, "--features", "defmt"],
    },
    Build {
        label: "selcall, tracing logging on the host",
        args: &["-p", "selcall", "--features", "std,tracing"],
    },
    Build {
        label: "firmware board binary",
        args: &["-p", "firmware", "--target", BOARD_TARGET, "--features", "hardware"],
    },
    Build {
        label: "firmware emulator example",
        args: &["-p", "firmware", "--features", "emulator", "--examples"],
    },
];

pub fn run() -> Result<()> {
    println!();
    let start = Instant::now();

    for build in BUILDS {
        let mut args = vec!["check"];
        args.extend_from_slice(build.args);
        step::captured(build.label, "cargo", &args, OnFailure::Abort)?;
    }

    // The clippy deny list is part of the contract, but report rather than
    // stop so the format check still runs.
    step::captured(
        "clippy, all targets",
        "cargo",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    if step::captured("rustfmt", "cargo", &["fmt", "--all", "--check"], OnFailure::Warn)?
        .is_none()
    {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    step::done("Checks", start);
    Ok(())
}
