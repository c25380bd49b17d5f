//! The two long-lived cooperative worker fibers (§4.2 command worker, §4.3
//! RX worker) and the `bt_recv` ingress (§6).
//!
//! Both loops are plain `async fn`s rather than `#[embassy_executor::task]`
//! functions: spawning is the embedding application's job (it owns the
//! `Spawner` and the task arena), and both worker methods take `&self` so
//! the same `'static HciCore` can be driven from whatever task shape the
//! app's executor wants. `bt_init` assumes both are already polled by the
//! time it is called (§4.6 "relies on the RX worker being already running").

use crate::buf::Buf;
use crate::driver::Driver;
use crate::hci::HciCore;

impl<D: Driver + 'static> HciCore<D> {
    /// Non-blocking handoff from the transport into `rx_queue` (§6
    /// `bt_recv`). The driver must have already set `buf`'s `kind` and
    /// payload before calling this and must not touch it again afterward.
    pub fn bt_recv(&self, buf: Buf) {
        // rx_queue's capacity equals the buffer pool, and the driver can
        // only be holding buffers it acquired from that same pool, so this
        // cannot fail in practice; if the driver races ahead of the pool
        // size it is a driver bug, not something this core recovers from.
        let _ = self.rx_queue.try_send(buf);
    }

    /// The command dispatch worker (§4.2). Runs until cancelled by the
    /// embedding executor; never returns on its own.
    pub async fn run_cmd_worker(&self) {
        loop {
            self.credit.take().await;
            let mut buf = self.cmd_queue.receive().await;
            self.driver.lock(|slot| {
                if let Some(drv) = slot.borrow_mut().get_mut() {
                    drv.send(&mut buf);
                }
            });
            self.sent_cmd.lock(|cell| *cell.borrow_mut() = Some(buf));
        }
    }

    /// The RX worker (§4.3). Runs until cancelled, or until it observes an
    /// unrecognized buffer type, at which point it terminates (treated as a
    /// fatal driver bug, §7).
    pub async fn run_rx_worker(&self) {
        loop {
            let buf = self.rx_queue.receive().await;
            if !self.dispatch_rx(buf) {
                return;
            }
        }
    }
}
