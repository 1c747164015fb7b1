//! Fixed block pool feeding the transmit queue.
//!
//! The pool owns exclusive borrows of exactly `N` [`AudioBlock`]s for its whole
//! life. A block is in exactly one place at a time:
//!
//! ```text
//!            allocate                 dispatch
//!   Free ─────────────▶ Allocated ─────────────▶ InFlight
//!    ▲                     │                        │
//!    └──── release ────────┘                        │
//!    └──────────────── BlockConsumed ───────────────┘
//! ```
//!
//! `Allocated` blocks live in a [`BlockHandle`], which is move-only; giving it
//! back through [`BlockPool::release`] or [`BlockPool::dispatch`] is the only
//! way to return the block, so `free + allocated + in_flight == N` always holds.
//!
//! Allocation is cursor-strict: slots are handed out in index order, modulo
//! `N`, and the allocator waits until the slot under the cursor is free. This
//! keeps transmission order equal to slot order. In-flight blocks retire in
//! FIFO order, one per [`BlockConsumed`] event on the completion channel.

use core::cell::RefCell;

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::{Channel, Sender};
use embassy_sync::signal::Signal;
use heapless::Deque;

use crate::cancel::CancelToken;
use crate::error::Cancelled;
use crate::fill;
use crate::waveform::{Waveform, WaveformId};

/// Interleaved stereo sample buffer, aligned to a cache line for DMA.
#[repr(C, align(32))]
pub struct AudioBlock<const CAP: usize> {
    samples: [i16; CAP],
}

impl<const CAP: usize> AudioBlock<CAP> {
    /// Silent block.
    pub const fn new() -> Self {
        Self { samples: [0; CAP] }
    }

    /// Samples in transmit order.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }
}

impl<const CAP: usize> Default for AudioBlock<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a slot's block currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Parked in the pool, ready to allocate
    Free,
    /// Held by a [`BlockHandle`]
    Allocated,
    /// Submitted to the sink, waiting for a completion event
    InFlight,
}

/// Completion event: the oldest in-flight block has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockConsumed;

/// Ownership snapshot. The three counts always sum to the pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolCensus {
    /// Blocks parked in the pool
    pub free: usize,
    /// Blocks held by handles
    pub allocated: usize,
    /// Blocks owned by the transmit queue
    pub in_flight: usize,
}

impl PoolCensus {
    /// Sum of all three states.
    pub fn total(&self) -> usize {
        self.free
            .saturating_add(self.allocated)
            .saturating_add(self.in_flight)
    }
}

/// Exclusive ownership of one allocated block.
///
/// Not `Clone`: the handle *is* the block's ownership. It remembers the pool
/// it came from, so it can only ever be parked back there.
pub struct BlockHandle<'p, 'a, const CAP: usize> {
    owner: &'p dyn SlotOwner<'a, CAP>,
    index: usize,
    block: &'a mut AudioBlock<CAP>,
    content: Option<WaveformId>,
}

impl<'p, 'a, const CAP: usize> BlockHandle<'p, 'a, CAP> {
    /// Slot index the block belongs to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Waveform the block currently holds, if it was ever filled.
    pub fn content(&self) -> Option<WaveformId> {
        self.content
    }

    /// Samples, interleaved L/R.
    pub fn samples(&self) -> &[i16] {
        &self.block.samples
    }

    /// Overwrite the block with `waveform` and retag it.
    pub fn refill(&mut self, waveform: &Waveform) {
        fill::fill(&mut self.block.samples, waveform);
        self.content = Some(waveform.id());
    }

    fn owner_addr(&self) -> *const () {
        let owner: *const (dyn SlotOwner<'a, CAP> + 'p) = self.owner;
        owner.cast()
    }
}

/// The pool a [`BlockHandle`] was allocated from.
trait SlotOwner<'a, const CAP: usize> {
    /// Park `handle` back in its slot as free.
    fn take_back(&self, handle: BlockHandle<'_, 'a, CAP>);
}

struct Slot<'a, const CAP: usize> {
    state: SlotState,
    block: Option<&'a mut AudioBlock<CAP>>,
    content: Option<WaveformId>,
}

struct Inner<'a, const N: usize, const CAP: usize> {
    slots: [Slot<'a, CAP>; N],
    in_flight: Deque<usize, N>,
    cursor: usize,
}

impl<'a, const N: usize, const CAP: usize> Inner<'a, N, CAP> {
    fn take_at_cursor(&mut self) -> Option<(usize, &'a mut AudioBlock<CAP>, Option<WaveformId>)> {
        let index = self.cursor;
        let slot = self.slots.get_mut(index)?;
        if slot.state != SlotState::Free {
            return None;
        }
        let block = slot.block.take()?;
        slot.state = SlotState::Allocated;
        self.cursor = index.wrapping_add(1).checked_rem(N).unwrap_or(0);
        Some((index, block, slot.content))
    }

    /// Park `block` back in slot `index` in `state`. Returns `false` if the
    /// slot does not expect it.
    fn park(
        &mut self,
        index: usize,
        block: &'a mut AudioBlock<CAP>,
        content: Option<WaveformId>,
        state: SlotState,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        if slot.state != SlotState::Allocated || slot.block.is_some() {
            return false;
        }
        slot.state = state;
        slot.content = content;
        slot.block = Some(block);
        if state == SlotState::InFlight {
            // At most N blocks exist, so the FIFO cannot be full here.
            let _ = self.in_flight.push_back(index);
        }
        true
    }

    fn census(&self) -> PoolCensus {
        self.slots
            .iter()
            .fold(PoolCensus::default(), |mut c, slot| {
                match slot.state {
                    SlotState::Free => c.free = c.free.saturating_add(1),
                    SlotState::Allocated => c.allocated = c.allocated.saturating_add(1),
                    SlotState::InFlight => c.in_flight = c.in_flight.saturating_add(1),
                }
                c
            })
    }
}

/// Pool of `N` blocks of `CAP` interleaved samples.
///
/// `M` guards the slot table and the completion channel. Use `NoopRawMutex`
/// when everything runs in one task, `CriticalSectionRawMutex` when completion
/// events are sent from interrupt context.
pub struct BlockPool<'a, M: RawMutex, const N: usize, const CAP: usize> {
    inner: Mutex<M, RefCell<Inner<'a, N, CAP>>>,
    released: Signal<M, ()>,
    consumed: Channel<M, BlockConsumed, N>,
}

impl<'a, M: RawMutex, const N: usize, const CAP: usize> BlockPool<'a, M, N, CAP> {
    /// Take ownership of `storage`. All blocks start free and untagged, the
    /// cursor at slot 0.
    pub fn new(storage: &'a mut [AudioBlock<CAP>; N]) -> Self {
        let mut blocks = storage.iter_mut();
        let slots = core::array::from_fn(|_| Slot {
            state: SlotState::Free,
            block: blocks.next(),
            content: None,
        });
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                slots,
                in_flight: Deque::new(),
                cursor: 0,
            })),
            released: Signal::new(),
            consumed: Channel::new(),
        }
    }

    /// Number of blocks (N).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Interleaved samples per block (CAP).
    pub const fn block_capacity(&self) -> usize {
        CAP
    }

    /// Allocate the block under the cursor, waiting until it is free.
    ///
    /// Pending completion events are applied first. While waiting, the call
    /// wakes on completion events, on [`release`](Self::release) and on
    /// cancellation. There is no timeout.
    ///
    /// # Errors
    ///
    /// [`Cancelled`] if `cancel` fires before a block is available.
    pub async fn allocate(
        &self,
        cancel: &CancelToken<M>,
    ) -> Result<BlockHandle<'_, 'a, CAP>, Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            self.drain_consumed();
            if let Some(handle) = self.try_allocate() {
                return Ok(handle);
            }
            trace!("pool: slot {} busy, waiting", self.cursor());
            match select3(self.consumed.receive(), self.released.wait(), cancel.cancelled()).await
            {
                Either3::First(BlockConsumed) => {
                    self.retire_oldest();
                }
                Either3::Second(()) => {}
                Either3::Third(()) => return Err(Cancelled),
            }
        }
    }

    /// Allocate the block under the cursor if it is free.
    ///
    /// Does not apply pending completion events.
    pub fn try_allocate(&self) -> Option<BlockHandle<'_, 'a, CAP>> {
        let (index, block, content) = self
            .inner
            .lock(|cell| cell.borrow_mut().take_at_cursor())?;
        Some(BlockHandle {
            owner: self,
            index,
            block,
            content,
        })
    }

    /// Return an unsubmitted block to the pool. Its content tag is kept.
    ///
    /// A handle allocated from another pool is logged and parked back in the
    /// pool it came from.
    pub fn release(&self, handle: BlockHandle<'_, 'a, CAP>) {
        if !self.owns(&handle) {
            warn!("pool: release of block {} from another pool", handle.index);
            let owner = handle.owner;
            owner.take_back(handle);
            return;
        }
        self.park(handle, SlotState::Free);
    }

    /// Hand a submitted block to the in-flight queue. It becomes free again
    /// after one [`BlockConsumed`] event for every block dispatched before it.
    ///
    /// A handle allocated from another pool is logged and parked back in the
    /// pool it came from as free; it never enters this pool's FIFO.
    pub fn dispatch(&self, handle: BlockHandle<'_, 'a, CAP>) {
        if !self.owns(&handle) {
            warn!("pool: dispatch of block {} from another pool", handle.index);
            let owner = handle.owner;
            owner.take_back(handle);
            return;
        }
        self.park(handle, SlotState::InFlight);
    }

    fn owns(&self, handle: &BlockHandle<'_, 'a, CAP>) -> bool {
        let this: *const Self = self;
        core::ptr::eq(handle.owner_addr(), this.cast())
    }

    fn park(&self, handle: BlockHandle<'_, 'a, CAP>, state: SlotState) {
        let BlockHandle {
            index,
            block,
            content,
            ..
        } = handle;
        let parked = self
            .inner
            .lock(|cell| cell.borrow_mut().park(index, block, content, state));
        if !parked {
            warn!("pool: slot {} did not expect its block back", index);
        } else if state == SlotState::Free {
            self.released.signal(());
        }
    }

    /// Sender for completion events, one per consumed block.
    pub fn completion_sender(&self) -> Sender<'_, M, BlockConsumed, N> {
        self.consumed.sender()
    }

    /// Apply every queued completion event.
    pub fn drain_consumed(&self) {
        while let Ok(BlockConsumed) = self.consumed.try_receive() {
            self.retire_oldest();
        }
    }

    /// Move the oldest in-flight block back to the free set.
    ///
    /// Returns `false` for a spurious event with nothing in flight.
    pub fn retire_oldest(&self) -> bool {
        let retired = self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let index = inner.in_flight.pop_front()?;
            let slot = inner.slots.get_mut(index)?;
            slot.state = SlotState::Free;
            Some(index)
        });
        match retired {
            Some(index) => {
                trace!("pool: block {} consumed", index);
                self.released.signal(());
                true
            }
            None => {
                warn!("pool: completion event with nothing in flight");
                false
            }
        }
    }

    /// Current ownership counts.
    pub fn census(&self) -> PoolCensus {
        self.inner.lock(|cell| cell.borrow().census())
    }

    /// Slot the next allocation will take.
    pub fn cursor(&self) -> usize {
        self.inner.lock(|cell| cell.borrow().cursor)
    }

    /// State of slot `index`, `None` if out of range.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.inner
            .lock(|cell| cell.borrow().slots.get(index).map(|slot| slot.state))
    }

    /// Content tag of slot `index` while it is parked.
    pub fn slot_content(&self, index: usize) -> Option<WaveformId> {
        self.inner
            .lock(|cell| cell.borrow().slots.get(index).and_then(|slot| slot.content))
    }
}

impl<'a, M: RawMutex, const N: usize, const CAP: usize> SlotOwner<'a, CAP>
    for BlockPool<'a, M, N, CAP>
{
    fn take_back(&self, handle: BlockHandle<'_, 'a, CAP>) {
        self.park(handle, SlotState::Free);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    static SILENCE: [i16; 2] = [0, 0];
    static ONES: [i16; 2] = [1, 1];

    type TestPool<'a> = BlockPool<'a, NoopRawMutex, 4, 4>;

    #[test]
    fn starts_all_free() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        assert_eq!(
            pool.census(),
            PoolCensus {
                free: 4,
                allocated: 0,
                in_flight: 0
            }
        );
        assert_eq!(pool.cursor(), 0);
    }

    #[test]
    fn blocks_are_cache_line_aligned() {
        assert_eq!(core::mem::align_of::<AudioBlock<4>>(), 32);
    }

    #[test]
    fn allocation_follows_cursor_and_wraps() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        for expected in [0, 1, 2, 3, 0] {
            let h = pool.try_allocate().unwrap();
            assert_eq!(h.index(), expected);
            pool.release(h);
        }
        assert_eq!(pool.cursor(), 1);
    }

    #[test]
    fn cursor_waits_on_busy_slot_even_if_others_are_free() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        let held = pool.try_allocate().unwrap();
        for _ in 0..3 {
            let h = pool.try_allocate().unwrap();
            pool.release(h);
        }
        // Cursor is back on slot 0, which is still held.
        assert!(pool.try_allocate().is_none());
        pool.release(held);
        assert_eq!(pool.try_allocate().map(|h| h.index()), Some(0));
    }

    #[test]
    fn content_tag_survives_release() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        let mut h = pool.try_allocate().unwrap();
        assert_eq!(h.content(), None);
        h.refill(&Waveform::new(7, &ONES));
        pool.release(h);
        assert_eq!(pool.slot_content(0), Some(WaveformId(7)));
    }

    #[test]
    fn dispatched_blocks_retire_in_fifo_order() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        let a = pool.try_allocate().unwrap();
        let b = pool.try_allocate().unwrap();
        pool.dispatch(a);
        pool.dispatch(b);
        assert_eq!(pool.census().in_flight, 2);
        assert!(pool.retire_oldest());
        assert_eq!(pool.slot_state(0), Some(SlotState::Free));
        assert_eq!(pool.slot_state(1), Some(SlotState::InFlight));
        assert!(pool.retire_oldest());
        assert!(!pool.retire_oldest(), "nothing left in flight");
    }

    #[test]
    fn completion_events_are_applied_on_drain() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        let h = pool.try_allocate().unwrap();
        pool.dispatch(h);
        pool.completion_sender().try_send(BlockConsumed).unwrap();
        pool.drain_consumed();
        assert_eq!(pool.census().free, 4);
    }

    #[test]
    fn release_into_foreign_pool_goes_back_to_owner() {
        let mut storage_a = [(); 4].map(|()| AudioBlock::<4>::new());
        let mut storage_b = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool_a = TestPool::new(&mut storage_a);
        let pool_b = TestPool::new(&mut storage_b);
        let h = pool_a.try_allocate().unwrap();
        let held_b = pool_b.try_allocate().unwrap();

        // pool_b's slot 0 is out too, but the handle is not pool_b's.
        pool_b.release(h);
        assert_eq!(pool_a.census().free, 4);
        assert_eq!(pool_b.census().allocated, 1);
        assert_eq!(pool_b.slot_state(0), Some(SlotState::Allocated));

        pool_b.release(held_b);
        assert_eq!(pool_b.census().free, 4);
    }

    #[test]
    fn foreign_dispatch_is_freed_in_owner_not_queued() {
        let mut storage_a = [(); 4].map(|()| AudioBlock::<4>::new());
        let mut storage_b = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool_a = TestPool::new(&mut storage_a);
        let pool_b = TestPool::new(&mut storage_b);
        let h = pool_a.try_allocate().unwrap();

        pool_b.dispatch(h);
        assert_eq!(pool_a.census().free, 4);
        assert_eq!(pool_b.census().in_flight, 0);
        assert!(!pool_a.retire_oldest());
        assert!(!pool_b.retire_oldest());
    }

    #[test]
    fn refill_overwrites_whole_block() {
        let mut storage = [(); 4].map(|()| AudioBlock::<4>::new());
        let pool = TestPool::new(&mut storage);
        let mut h = pool.try_allocate().unwrap();
        h.refill(&Waveform::new(1, &ONES));
        assert_eq!(h.samples(), &[1, 1, 1, 1]);
        h.refill(&Waveform::new(0, &SILENCE));
        assert_eq!(h.samples(), &[0, 0, 0, 0]);
    }
}
