// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod emulate;
mod flash;
mod step;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Selcall tone generator development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the board binary, flash it via probe-rs and follow its RTT log
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
        /// defmt level compiled into the binary
        #[arg(long, default_value = "info")]
        defmt_log: String,
    },
    /// Run the tone engine on the host with a real-time paced transmitter
    Emulate {
        /// How long to run before cancelling the engine
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// tracing filter passed as RUST_LOG
        #[arg(long, default_value = "info")]
        log: String,
    },
    /// Check every build configuration: no_std engine, both logging
    /// backends, board binary and emulator
    Check,
    /// Run the platform, selcall and firmware test suites
    Test {
        /// Run only unit tests
        #[arg(long, conflicts_with = "integration")]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
        /// Run a single crate's suite
        #[arg(long, value_name = "CRATE")]
        only: Option<String>,
        /// Finish with an emulator run of this many seconds
        #[arg(long, value_name = "SECONDS")]
        smoke: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash { release, defmt_log } => flash::run(release, &defmt_log),
        Commands::Emulate { seconds, log } => emulate::run(seconds, &log),
        Commands::Check => check::run(),
        Commands::Test {
            unit,
            integration,
            only,
            smoke,
        } => {
            let scope = match (unit, integration) {
                (true, _) => test::Scope::Unit,
                (_, true) => test::Scope::Integration,
                _ => test::Scope::All,
            };
            test::run(scope, only.as_deref(), smoke)
        }
    }
}
