//! Blocking allocation: waits on in-flight slots, wakes on completion and
//! release, and gives up on cancellation.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

mod common;

use common::{CAP, N};
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Instant, Timer};
use selcall::{AudioBlock, BlockConsumed, BlockPool, CancelToken, Cancelled, SlotState};

type Pool<'a> = BlockPool<'a, NoopRawMutex, N, CAP>;

fn fill_queue(pool: &Pool<'_>) {
    for _ in 0..N {
        let h = pool.try_allocate().unwrap();
        pool.dispatch(h);
    }
}

#[tokio::test]
async fn allocation_waits_for_completion_of_cursor_slot() {
    let mut blocks = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    fill_queue(&pool);
    assert_eq!(pool.census().in_flight, N);

    let sender = pool.completion_sender();
    let started = Instant::now();
    let (handle, ()) = join(pool.allocate(&cancel), async {
        Timer::after_millis(20).await;
        sender.send(BlockConsumed).await;
    })
    .await;

    let handle = handle.unwrap();
    assert_eq!(handle.index(), 0, "the oldest block retires first");
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(pool.slot_state(1), Some(SlotState::InFlight));
    pool.release(handle);
}

#[tokio::test]
async fn allocation_wakes_on_release() {
    let mut blocks = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    let held = pool.try_allocate().unwrap();
    for _ in 1..N {
        let h = pool.try_allocate().unwrap();
        pool.release(h);
    }

    let (handle, ()) = join(pool.allocate(&cancel), async {
        Timer::after_millis(10).await;
        pool.release(held);
    })
    .await;

    assert_eq!(handle.map(|h| h.index()).ok(), Some(0));
}

#[tokio::test]
async fn stalled_allocation_is_cancellable() {
    let mut blocks = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    fill_queue(&pool);

    let (result, ()) = join(pool.allocate(&cancel), async {
        Timer::after_millis(10).await;
        cancel.cancel();
    })
    .await;

    assert!(matches!(result, Err(Cancelled)));
    assert_eq!(pool.census().in_flight, N, "nothing changed hands");
}

#[tokio::test]
async fn queued_completions_are_applied_before_waiting() {
    let mut blocks = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    fill_queue(&pool);
    let sender = pool.completion_sender();
    sender.try_send(BlockConsumed).unwrap();
    sender.try_send(BlockConsumed).unwrap();

    let a = pool.allocate(&cancel).await.unwrap();
    assert_eq!(a.index(), 0);
    assert_eq!(pool.slot_state(1), Some(SlotState::Free));
    let b = pool.allocate(&cancel).await.unwrap();
    assert_eq!(b.index(), 1);
    pool.release(a);
    pool.release(b);
    assert_eq!(pool.census().total(), N);
}

#[tokio::test]
async fn spurious_completion_is_ignored() {
    let mut blocks = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool = Pool::new(&mut blocks);
    let cancel = CancelToken::new();
    pool.completion_sender().try_send(BlockConsumed).unwrap();

    let h = pool.allocate(&cancel).await.unwrap();
    assert_eq!(h.index(), 0);
    pool.release(h);
    assert_eq!(pool.census().free, N);
}

#[tokio::test]
async fn handle_released_into_another_pool_returns_to_its_owner() {
    let mut blocks_a = [(); N].map(|()| AudioBlock::<CAP>::new());
    let mut blocks_b = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool_a = Pool::new(&mut blocks_a);
    let pool_b = Pool::new(&mut blocks_b);
    let cancel = CancelToken::new();

    let stray = pool_a.try_allocate().unwrap();
    pool_b.release(stray);
    assert_eq!(pool_a.census().free, N);
    assert_eq!(pool_b.census().free, N);

    // A full lap of the cursor: every slot of pool_a is still allocatable.
    for expected in (1..N).chain([0]) {
        let h = pool_a.allocate(&cancel).await.unwrap();
        assert_eq!(h.index(), expected);
        pool_a.dispatch(h);
        pool_a.completion_sender().send(BlockConsumed).await;
    }
    assert_eq!(pool_a.census().free, N);
}

#[test]
fn foreign_handle_never_fills_a_slot_whose_block_is_out() {
    let mut blocks_a = [(); N].map(|()| AudioBlock::<CAP>::new());
    let mut blocks_b = [(); N].map(|()| AudioBlock::<CAP>::new());
    let pool_a = Pool::new(&mut blocks_a);
    let pool_b = Pool::new(&mut blocks_b);

    let from_a = pool_a.try_allocate().unwrap();
    let from_b = pool_b.try_allocate().unwrap();
    assert_eq!(from_a.index(), from_b.index());

    // pool_b's slot 0 would accept a block by state alone; ownership decides.
    pool_b.dispatch(from_a);
    assert_eq!(pool_b.slot_state(0), Some(SlotState::Allocated));
    assert_eq!(pool_b.census().in_flight, 0);
    assert_eq!(pool_a.slot_state(0), Some(SlotState::Free));

    pool_b.release(from_b);
    assert_eq!(pool_b.census().free, N);
}
