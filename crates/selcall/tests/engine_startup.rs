//! Engine bootstrap against a scripted sink: call order, priming, fatal
//! configuration errors, and a short end-to-end run.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

mod common;

use common::{Call, ScriptedSink};
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Timer};
use platform::{ConfigError, LevelDb, OutputLevel};
use selcall::waveform::tones;
use selcall::{
    run_selcall, AudioBlock, BlockPool, CancelToken, EngineConfig, EngineError, SelcallEngine,
    SlotState, WaveformId, BLOCK_CAPACITY, NUM_BLOCKS,
};

type Pool<'a> = BlockPool<'a, NoopRawMutex, NUM_BLOCKS, BLOCK_CAPACITY>;

fn storage() -> Box<[AudioBlock<BLOCK_CAPACITY>; NUM_BLOCKS]> {
    Box::new([(); NUM_BLOCKS].map(|()| AudioBlock::new()))
}

fn fast_config() -> EngineConfig {
    EngineConfig::default()
        .with_codec_settle(Duration::from_millis(1))
        .with_tone_window(Duration::from_millis(30))
        .with_settle(Duration::from_millis(2))
        .with_cycle_pause(Duration::from_millis(20))
}

fn sig(wave: &selcall::Waveform) -> i16 {
    wave.samples()[1]
}

#[test]
fn defaults_match_reference_board() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.sample_rate.get(), 48_000);
    assert_eq!(cfg.write_timeout, Duration::from_millis(2000));
    assert_eq!(cfg.tone_window, Duration::from_millis(100));
    assert_eq!(cfg.settle, Duration::from_millis(10));
    assert_eq!(cfg.cycle_pause, Duration::from_secs(1));
    assert_eq!(cfg.codec_settle, Duration::from_secs(1));
    assert_eq!(cfg.output_level, OutputLevel::unmuted(LevelDb::from_db(-50)));
    assert!(cfg.start_codec_output);
}

#[test]
fn stream_config_describes_the_pool() {
    let stream = EngineConfig::default().stream_config::<NUM_BLOCKS, BLOCK_CAPACITY>();
    assert_eq!(stream.validate(), Ok(()));
    assert_eq!(stream.pool.block_count, 4);
    assert_eq!(stream.block_bytes, 1920, "twice the 960-byte tone table");
    assert_eq!(stream.timeout, Duration::from_millis(2000));
}

#[tokio::test]
async fn startup_configures_levels_primes_then_triggers() {
    let mut blocks = storage();
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let mut sink =
        ScriptedSink::new(Duration::from_millis(1)).with_completions(pool.completion_sender());

    let engine = SelcallEngine::start(&mut sink, &pool, fast_config(), &cancel)
        .await
        .unwrap();
    drop(engine);

    assert_eq!(
        sink.calls,
        vec![
            Call::Configure,
            Call::SetLevel(OutputLevel::unmuted(LevelDb::from_db(-50))),
            Call::StartOutput,
            Call::Write(sig(&tones::PRIMING)),
            Call::Trigger,
        ]
    );
    let cfg = sink.config.unwrap();
    assert_eq!(cfg.bit_depth, 16);
    assert_eq!(cfg.channels, 2);

    assert_eq!(pool.slot_state(0), Some(SlotState::InFlight));
    for i in 0..NUM_BLOCKS {
        assert_eq!(pool.slot_content(i), Some(WaveformId(697)), "slot {i} primed");
    }
    assert_eq!(pool.cursor(), 1);
}

#[tokio::test]
async fn codec_output_start_can_be_skipped() {
    let mut blocks = storage();
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let mut sink =
        ScriptedSink::new(Duration::from_millis(1)).with_completions(pool.completion_sender());

    SelcallEngine::start(
        &mut sink,
        &pool,
        fast_config().with_start_codec_output(false),
        &cancel,
    )
    .await
    .unwrap();

    assert!(!sink.calls.contains(&Call::StartOutput));
    assert_eq!(sink.calls.last(), Some(&Call::Trigger));
}

#[tokio::test]
async fn configuration_failure_is_fatal_and_silent() {
    let mut blocks = storage();
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let mut sink =
        ScriptedSink::new(Duration::from_millis(1)).with_completions(pool.completion_sender());
    sink.fail_configure = Some(ConfigError::NotReady);

    let result = run_selcall(&mut sink, &pool, fast_config(), &cancel).await;

    assert_eq!(result, Err(EngineError::Config(ConfigError::NotReady)));
    assert_eq!(sink.calls, vec![Call::Configure], "nothing after the failure");
    assert_eq!(pool.census().free, NUM_BLOCKS);
}

#[tokio::test]
async fn priming_write_failure_aborts_startup() {
    let mut blocks = storage();
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let mut sink = ScriptedSink::new(Duration::from_millis(1))
        .with_completions(pool.completion_sender())
        .failing_on(sig(&tones::PRIMING));

    let result = SelcallEngine::start(&mut sink, &pool, fast_config(), &cancel).await;

    assert!(matches!(result, Err(EngineError::Write(_))));
    assert!(!sink.calls.contains(&Call::Trigger));
    assert_eq!(pool.census().free, NUM_BLOCKS);
}

#[tokio::test]
async fn runs_the_selcall_sequence_until_cancelled() {
    let mut blocks = storage();
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let mut sink =
        ScriptedSink::new(Duration::from_millis(5)).with_completions(pool.completion_sender());

    let (result, ()) = join(run_selcall(&mut sink, &pool, fast_config(), &cancel), async {
        Timer::after_millis(600).await;
        cancel.cancel();
    })
    .await;

    assert_eq!(result, Ok(()));
    let written = sink.written();
    assert_eq!(written.first(), Some(&sig(&tones::PRIMING)));

    // First appearance of each tone follows the call order.
    let first_seen: Vec<usize> = tones::SELCALL_SEQUENCE
        .iter()
        .map(|w| written.iter().position(|&s| s == sig(w)).unwrap())
        .collect();
    assert!(first_seen.windows(2).all(|w| w[0] < w[1]), "{first_seen:?}");
    assert_eq!(pool.census().allocated, 0);
}
