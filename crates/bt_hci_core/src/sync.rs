//! Per-call synchronous-completion signals (§4.2, §9 "Synchronous command
//! as one-shot signal").
//!
//! `cmd_send_sync` attaches a *distinct* one-shot signal to each outgoing
//! buffer rather than sharing a single core-wide one: several callers on
//! different tasks may each have a synchronous command sitting in
//! `cmd_queue` at once (§5 "any number of caller tasks"), each waiting on
//! its own opcode's completion, and a shared signal would let one caller's
//! wake-up be silently delivered to a different caller's `.wait()`. Slots
//! are drawn from a free list exactly the size of the buffer pool, so a
//! buffer can never outlive the slot it was tagged with, and acquiring one
//! can never actually block — there can be at most `NUM_BUFS` buffers in
//! flight at any time, sync or not.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::buf::NUM_BUFS;

const _: () = assert!(NUM_BUFS == 5, "SyncSlots's signal array must list exactly NUM_BUFS elements");

pub(crate) struct SyncSlots {
    signals: [Signal<CriticalSectionRawMutex, ()>; NUM_BUFS],
    free: Channel<CriticalSectionRawMutex, u8, NUM_BUFS>,
}

impl SyncSlots {
    pub const fn new() -> Self {
        SyncSlots {
            signals: [
                Signal::new(),
                Signal::new(),
                Signal::new(),
                Signal::new(),
                Signal::new(),
            ],
            free: Channel::new(),
        }
    }

    /// Seeds the free list with every slot index. Called once from
    /// `bt_init`, alongside `BufferPool::init`.
    pub fn init(&self) {
        for i in 0..NUM_BUFS as u8 {
            self.free
                .try_send(i)
                .unwrap_or_else(|_| unreachable!("sync slot free list over-filled"));
        }
    }

    /// Reserves one slot for a synchronous call. A slot is only ever held
    /// alongside a buffer the caller already owns, and there are always at
    /// least as many slots as buffers, so this never actually blocks.
    pub async fn acquire(&self) -> u8 {
        self.free.receive().await
    }

    /// Resets slot `idx` to the unsignaled state. Must be called before the
    /// tagged buffer is enqueued, so a stale signal left by a previous
    /// occupant can never be observed as this call's completion.
    pub fn reset(&self, idx: u8) {
        self.signals[idx as usize].reset();
    }

    /// Waits for slot `idx` to be signaled.
    pub async fn wait(&self, idx: u8) {
        self.signals[idx as usize].wait().await;
    }

    /// Wakes whichever caller is waiting on slot `idx` (exactly one, by
    /// construction). Called from the completion correlator.
    pub fn signal(&self, idx: u8) {
        self.signals[idx as usize].signal(());
    }

    /// Returns slot `idx` to the free list. Callers must only do this after
    /// observing their own `wait(idx)` complete, never from the signaling
    /// side: releasing earlier could let another task reset the slot before
    /// this waiter has actually consumed its wake-up — the cooperative
    /// scheduler (§5) doesn't preempt mid-await, but it does interleave
    /// distinct tasks that are simultaneously ready.
    pub fn release(&self, idx: u8) {
        self.free
            .try_send(idx)
            .unwrap_or_else(|_| unreachable!("released more sync slots than exist"));
    }
}
