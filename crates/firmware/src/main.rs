//! Selcall tone generator - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::peripherals::{DMA1_CH6, DMA1_CH7, I2C3};
use embassy_stm32::sai::{self, Sai};
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use firmware::audio::i2s::sai::SaiTx;
use firmware::boot::{self, WATCHDOG_TIMEOUT_MS};
use firmware::{CodecSink, Es9038q2mDriver, SaiTransmitter};
use selcall::{
    run_selcall, AudioBlock, CancelToken, EngineConfig, SelcallPool, BLOCK_CAPACITY, NUM_BLOCKS,
};

// Logging transport + panic handler
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    I2C3_EV => i2c::EventInterruptHandler<peripherals::I2C3>;
    I2C3_ER => i2c::ErrorInterruptHandler<peripherals::I2C3>;
});

type CodecBus = I2c<'static, I2C3, DMA1_CH6, DMA1_CH7>;
type BoardSink = CodecSink<
    'static,
    Es9038q2mDriver<CodecBus>,
    SaiTransmitter,
    CriticalSectionRawMutex,
    NUM_BLOCKS,
>;
type BoardPool = SelcallPool<'static, CriticalSectionRawMutex>;

/// SAI1 DMA ring: two blocks of interleaved samples.
const SAI_RING_LEN: usize = 2 * BLOCK_CAPACITY;

// RAM is AXI SRAM (see memory.x), reachable by DMA1.
static mut SAI_RING: [u16; SAI_RING_LEN] = [0; SAI_RING_LEN];

static BLOCKS: StaticCell<[AudioBlock<BLOCK_CAPACITY>; NUM_BLOCKS]> = StaticCell::new();
static POOL: StaticCell<BoardPool> = StaticCell::new();
static CANCEL: CancelToken<CriticalSectionRawMutex> = CancelToken::new();

/// Construct SAI1 block A as an I2S master transmitter on `SAI_RING`.
///
/// Called by [`SaiTransmitter`] on configure and after a ring overrun, each
/// time after the previous instance was dropped.
#[allow(unsafe_code)]
fn build_sai() -> SaiTx {
    // SAFETY: only the selcall task reaches this, and only after dropping the
    // previous driver, so the SAI1 / DMA1_CH0 / PE2..PE6 handles and the ring
    // buffer have no other live owner.
    let p = unsafe { embassy_stm32::Peripherals::steal() };
    // SAFETY: the previous borrow of SAI_RING ended with the dropped driver.
    let ring = unsafe { &mut *core::ptr::addr_of_mut!(SAI_RING) };

    let (block_a, _block_b) = sai::split_subblocks(p.SAI1);
    let mut config = sai::Config::default();
    config.mode = sai::Mode::Master;
    config.tx_rx = sai::TxRx::Transmitter;
    config.data_size = sai::DataSize::Data16;

    Sai::new_asynchronous_with_mclk(
        block_a, p.PE5, // SCK
        p.PE6,    // SD
        p.PE4,    // FS
        p.PE2,    // MCLK
        p.DMA1_CH0, ring, config,
    )
}

#[embassy_executor::task]
async fn selcall_task(sink: BoardSink, pool: &'static BoardPool) {
    match run_selcall(sink, pool, EngineConfig::default(), &CANCEL).await {
        Ok(()) => defmt::info!("Selcall task stopped"),
        Err(e) => defmt::error!("Selcall task failed: {}", e),
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!(
        "{=str} v{=str} ({=str})",
        platform::config::APP_NAME,
        platform::config::APP_VERSION,
        platform::config::BOARD_NAME
    );

    // Steps 1-2: clocks. PLL3 must be trimmed before SAI1 exists.
    let p = embassy_stm32::init(boot::build_embassy_config());
    boot::hardware::apply_audio_clock_trim();

    // Step 3: IWDG. Once unleashed it cannot be stopped; the loop below pets it.
    let mut watchdog =
        embassy_stm32::wdg::IndependentWatchdog::new(p.IWDG1, boot::watchdog_timeout_us());
    watchdog.unleash();
    defmt::info!("IWDG watchdog armed: timeout={=u32}ms", WATCHDOG_TIMEOUT_MS);

    // Step 4: I2C3 for ES9038Q2M control (PA8 = SCL, PC9 = SDA).
    let i2c3 = I2c::new(
        p.I2C3,
        p.PA8,
        p.PC9,
        Irqs,
        p.DMA1_CH6,
        p.DMA1_CH7,
        Hertz(boot::CODEC_I2C_HZ),
        i2c::Config::default(),
    );

    // Step 5: block pool.
    let blocks = BLOCKS.init([(); NUM_BLOCKS].map(|()| AudioBlock::new()));
    let pool: &'static BoardPool = POOL.init(SelcallPool::new(blocks));

    // Step 6: tone task. SAI1 is built inside the sink on configure.
    let sink = CodecSink::new(
        Es9038q2mDriver::new(i2c3),
        SaiTransmitter::new(build_sai),
        pool.completion_sender(),
    );
    spawner.must_spawn(selcall_task(sink, pool));
    defmt::info!("Selcall task spawned");

    loop {
        Timer::after(Duration::from_secs(1)).await;
        watchdog.pet();
    }
}
