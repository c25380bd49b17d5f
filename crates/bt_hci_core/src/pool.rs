//! The free buffer pool (§4.1).
//!
//! `NUM_BUFS` buffers are handed out and returned through a single MPSC
//! [`embassy_sync::channel::Channel`] — any task may `release`, any task may
//! `acquire`. There is no blocking allocation: an empty pool fails fast with
//! [`Error::NoBuffer`] and the caller aborts the current operation.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TryRecvError};

use crate::buf::{Buf, NUM_BUFS};
use crate::error::Error;

pub struct BufferPool {
    free: Channel<CriticalSectionRawMutex, Buf, NUM_BUFS>,
}

impl BufferPool {
    pub const fn new() -> Self {
        BufferPool {
            free: Channel::new(),
        }
    }

    /// Fills the pool with `NUM_BUFS` fresh buffers. Called once from
    /// `bt_init`'s `init_free_pool` step.
    pub fn init(&self) {
        for _ in 0..NUM_BUFS {
            // Capacity is exactly NUM_BUFS and this runs once before any
            // buffer has left the pool, so this can never fail.
            self.free
                .try_send(Buf::empty())
                .unwrap_or_else(|_| unreachable!("free pool over-filled"));
        }
    }

    /// Removes one buffer from the pool with `reserve_head` bytes of
    /// head-room pre-reserved. Fails with `NoBuffer` if the pool is empty;
    /// never blocks.
    pub fn acquire(&self, reserve_head: usize) -> Result<Buf, Error> {
        match self.free.try_recv() {
            Ok(mut buf) => {
                buf.reset(reserve_head);
                Ok(buf)
            }
            Err(TryRecvError::Empty) => Err(Error::NoBuffer),
        }
    }

    /// Returns a buffer to the pool. The completion correlator is the sole
    /// releaser of command buffers (§4.1); the RX worker releases buffers it
    /// has finished dispatching.
    pub fn release(&self, buf: Buf) {
        self.free
            .try_send(buf)
            .unwrap_or_else(|_| unreachable!("released more buffers than the pool holds"));
    }

    /// Buffers currently sitting in the free pool. For diagnostics/tests
    /// only — not part of the spec's API surface.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}
