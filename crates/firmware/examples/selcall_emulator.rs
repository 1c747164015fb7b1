//! Selcall Emulator
//!
//! Runs the tone engine against a real-time paced host transmitter and logs
//! every tone change, so the call timing can be checked without a board.
//!
//! Run with: cargo run --example selcall_emulator --features emulator -- [seconds]
//! Log level: RUST_LOG=debug for block-level detail.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Duration;
use tracing_subscriber::EnvFilter;

use firmware::{CodecSink, HostI2s, MockCodec};
use platform::config;
use selcall::waveform::tones;
use selcall::{run_selcall, AudioBlock, CancelToken, EngineConfig, SelcallPool, Waveform};
use selcall::{BLOCK_CAPACITY, NUM_BLOCKS};

/// Default run time when no argument is given.
const DEFAULT_RUN_SECS: u64 = 10;

static LABELS: [Waveform; 6] = [
    tones::PRIMING,
    tones::TONE_852,
    tones::TONE_1393,
    tones::TONE_1020,
    tones::TONE_2100,
    tones::TONE_1153,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let run_secs = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_RUN_SECS,
    };

    println!("{} - Selcall Emulator", config::APP_NAME);
    println!("Running for {run_secs} s (Ctrl-C to stop early)\n");

    let mut storage = [(); NUM_BLOCKS].map(|()| AudioBlock::<BLOCK_CAPACITY>::new());
    let pool = SelcallPool::<NoopRawMutex>::new(&mut storage);
    let cancel = CancelToken::<NoopRawMutex>::new();

    let sink = CodecSink::new(
        MockCodec::new(),
        HostI2s::new().with_labels(&LABELS),
        pool.completion_sender(),
    );

    let stop = async {
        tokio::select! {
            () = embassy_time::Timer::after(Duration::from_secs(run_secs)) => {}
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
        }
        cancel.cancel();
    };

    let (result, ()) = tokio::join!(
        run_selcall(sink, &pool, EngineConfig::default(), &cancel),
        stop
    );
    result?;

    let census = pool.census();
    println!("\n✓ Stopped cleanly; pool {census:?}");
    Ok(())
}
