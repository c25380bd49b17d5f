//! The central coordinating struct: buffer pool, queues, credit gate,
//! driver slot and controller state record, tied together behind the
//! public host API (§6).

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::buf::{Buf, BufType};
use crate::credit::CreditGate;
use crate::driver::{Driver, DriverSlot};
use crate::error::Error;
use crate::pool::BufferPool;
use crate::queue::{CmdQueue, RxQueue};
use crate::state::ControllerState;
use crate::sync::SyncSlots;
use crate::wire::CommandHeader;

/// Ties together every piece of the core (§2). Construct one as a `'static`
/// singleton (the spec's process-wide controller record, §9 "Global mutable
/// device record"), register a driver, spawn
/// [`HciCore::run_cmd_worker`]/[`HciCore::run_rx_worker`] on the executor,
/// then call [`HciCore::bt_init`].
pub struct HciCore<D: Driver + 'static> {
    pub(crate) pool: BufferPool,
    pub(crate) cmd_queue: CmdQueue,
    pub(crate) rx_queue: RxQueue,
    pub(crate) credit: CreditGate,
    pub(crate) driver: Mutex<CriticalSectionRawMutex, RefCell<DriverSlot<D>>>,
    pub(crate) sent_cmd: Mutex<CriticalSectionRawMutex, RefCell<Option<Buf>>>,
    pub(crate) sync_slots: SyncSlots,
    pub(crate) state: Mutex<CriticalSectionRawMutex, RefCell<ControllerState>>,
}

impl<D: Driver + 'static> HciCore<D> {
    pub const fn new() -> Self {
        HciCore {
            pool: BufferPool::new(),
            cmd_queue: CmdQueue::new(),
            rx_queue: RxQueue::new(),
            credit: CreditGate::new(),
            driver: Mutex::new(RefCell::new(DriverSlot::new())),
            sent_cmd: Mutex::new(RefCell::new(None)),
            sync_slots: SyncSlots::new(),
            state: Mutex::new(RefCell::new(ControllerState::new())),
        }
    }

    // ---- Buffer pool API (§6 "Host API exposed upward") ----------------

    pub fn buf_get_reserve(&self, reserve_head: usize) -> Result<Buf, Error> {
        self.pool.acquire(reserve_head)
    }

    pub fn buf_get(&self) -> Result<Buf, Error> {
        self.buf_get_reserve(0)
    }

    pub fn buf_put(&self, buf: Buf) {
        self.pool.release(buf)
    }

    /// A read-only snapshot of the controller state record (§3).
    pub fn controller_state(&self) -> ControllerState {
        self.state.lock(|s| *s.borrow())
    }

    // ---- Transport binding (§4.7) ----------------------------------------

    pub fn driver_register(&self, drv: &'static mut D) -> Result<(), Error> {
        self.driver.lock(|slot| slot.borrow_mut().register(drv))
    }

    pub fn driver_unregister(&self, drv: &D) -> Result<(), Error> {
        self.driver.lock(|slot| slot.borrow_mut().unregister(drv))
    }

    pub(crate) fn head_reserve(&self) -> usize {
        self.driver
            .lock(|slot| slot.borrow_mut().get_mut().map(|d| d.head_reserve()))
            .unwrap_or(0)
    }

    // ---- Command dispatch (§4.2) ------------------------------------------

    fn cmd_create(&self, opcode: u16) -> Result<Buf, Error> {
        self.build_cmd(opcode, &[])
    }

    /// Acquires a buffer, reserving the transport's head-room, and writes a
    /// command header plus `params` into it.
    pub(crate) fn build_cmd(&self, opcode: u16, params: &[u8]) -> Result<Buf, Error> {
        let reserve = self.head_reserve();
        let mut buf = self.buf_get_reserve(reserve)?;
        buf.set_kind(BufType::Command);
        buf.set_opcode(opcode);
        let mut hdr = [0u8; CommandHeader::SIZE];
        CommandHeader {
            opcode,
            param_len: params.len() as u8,
        }
        .write(&mut hdr);
        buf.add(&hdr);
        buf.add(params);
        Ok(buf)
    }

    fn enqueue_cmd(&self, buf: Buf) {
        // cmd_queue's capacity equals the whole buffer pool, and every
        // buffer enqueued here was just acquired from that same pool, so
        // this can never actually block or fail.
        self.cmd_queue
            .try_send(buf)
            .unwrap_or_else(|_| unreachable!("cmd_queue capacity tracks the buffer pool"));
    }

    /// Enqueues `opcode` and returns immediately (§4.2). If `buf` is `None`
    /// a fresh zero-parameter command buffer is built.
    pub fn cmd_send(&self, opcode: u16, buf: Option<Buf>) -> Result<(), Error> {
        let mut buf = match buf {
            Some(b) => b,
            None => self.cmd_create(opcode)?,
        };
        buf.set_kind(BufType::Command);
        buf.set_opcode(opcode);
        self.enqueue_cmd(buf);
        Ok(())
    }

    /// As [`HciCore::cmd_send`], but waits for the controller's completion
    /// (or status) for `opcode` before returning (§4.2).
    pub async fn cmd_send_sync(&self, opcode: u16, buf: Option<Buf>) -> Result<(), Error> {
        let mut buf = match buf {
            Some(b) => b,
            None => self.cmd_create(opcode)?,
        };
        buf.set_kind(BufType::Command);
        buf.set_opcode(opcode);
        let slot = self.sync_slots.acquire().await;
        buf.mark_sync(slot);
        self.sync_slots.reset(slot);
        self.enqueue_cmd(buf);
        self.sync_slots.wait(slot).await;
        self.sync_slots.release(slot);
        Ok(())
    }

    /// Re-runs bring-up (§6 `bt_hci_reset`).
    pub async fn bt_hci_reset(&self) -> Result<(), Error> {
        self.init_sequence().await
    }
}

impl<D: Driver + 'static> Default for HciCore<D> {
    fn default() -> Self {
        Self::new()
    }
}
