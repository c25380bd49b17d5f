//! Completion correlation and credit refill (§4.4).

use crate::driver::Driver;
use crate::hci::HciCore;
use crate::response;

impl<D: Driver + 'static> HciCore<D> {
    /// Called by the event demultiplexer for both `Command Complete` and
    /// `Command Status`, after it has pulled off everything but the
    /// return-parameters (`params` is empty for a bare status event besides
    /// the status byte itself, which the caller folds in as `params[0]`).
    pub(crate) fn complete(&self, opcode: u16, ncmd: u8, params: &[u8]) {
        self.state.lock(|s| {
            response::apply(&mut s.borrow_mut(), opcode, params);
        });

        let matched = self.sent_cmd.lock(|cell| {
            let mut sent = cell.borrow_mut();
            match sent.as_ref() {
                Some(buf) if buf.opcode() == opcode => sent.take(),
                _ => None,
            }
        });

        match matched {
            Some(buf) => {
                if let Some(slot) = buf.sync_slot() {
                    self.sync_slots.signal(slot);
                }
                self.buf_put(buf);
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "unexpected completion for opcode={:x}, sent_cmd mismatch",
                    opcode
                );
                return;
            }
        }

        self.refill_credit(ncmd);
    }

    fn refill_credit(&self, ncmd: u8) {
        if ncmd > 0 && !self.credit.available() {
            self.credit.give();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buf::BufType;
    use crate::opcode;

    struct StubDriver;
    impl Driver for StubDriver {
        fn open(&mut self) -> i32 {
            0
        }
        fn send(&mut self, _buf: &mut crate::buf::Buf) {}
        fn head_reserve(&self) -> usize {
            0
        }
    }

    fn core_with_sent(opcode: u16, sync: bool) -> HciCore<StubDriver> {
        let core: HciCore<StubDriver> = HciCore::new();
        core.pool.init();
        let mut buf = core.buf_get().unwrap();
        buf.set_kind(BufType::Command);
        buf.set_opcode(opcode);
        if sync {
            buf.mark_sync(0);
        }
        core.sent_cmd.lock(|cell| *cell.borrow_mut() = Some(buf));
        core
    }

    #[test]
    fn matching_completion_clears_sent_cmd_and_releases_buffer() {
        let core = core_with_sent(opcode::RESET, false);
        let before = core.pool.available();
        core.complete(opcode::RESET, 1, &[0]);
        assert!(core.sent_cmd.lock(|c| c.borrow().is_none()));
        assert_eq!(core.pool.available(), before + 1);
    }

    #[test]
    fn credit_refills_only_when_previously_unavailable() {
        let core = core_with_sent(opcode::RESET, false);
        assert!(!core.credit.available());
        core.complete(opcode::RESET, 1, &[0]);
        assert!(core.credit.available());
    }

    #[test]
    fn mismatched_opcode_leaves_sent_cmd_and_credit_untouched() {
        let core = core_with_sent(opcode::RESET, false);
        core.complete(opcode::READ_BD_ADDR, 1, &[0]);
        assert!(core.sent_cmd.lock(|c| c.borrow().is_some()));
        assert!(!core.credit.available());
    }

    #[test]
    fn sync_completion_wakes_its_slot() {
        let core = core_with_sent(opcode::READ_BD_ADDR, true);
        core.complete(opcode::READ_BD_ADDR, 1, &[0, 1, 2, 3, 4, 5, 6]);
        embassy_futures::block_on(core.sync_slots.wait(0));
    }

    #[test]
    fn concurrent_sync_callers_each_wake_on_their_own_slot() {
        // Two callers with distinct opcodes queued concurrently must not
        // share a wakeup: completing one must not also (or instead) wake
        // the other. Regression test for the single-shared-signal bug.
        let core: HciCore<StubDriver> = HciCore::new();
        core.pool.init();
        core.sync_slots.init();

        let slot_a = embassy_futures::block_on(core.sync_slots.acquire());
        let slot_b = embassy_futures::block_on(core.sync_slots.acquire());
        assert_ne!(slot_a, slot_b);
        core.sync_slots.reset(slot_a);
        core.sync_slots.reset(slot_b);

        let mut buf_a = core.buf_get().unwrap();
        buf_a.set_kind(BufType::Command);
        buf_a.set_opcode(opcode::RESET);
        buf_a.mark_sync(slot_a);
        core.sent_cmd.lock(|cell| *cell.borrow_mut() = Some(buf_a));

        core.complete(opcode::RESET, 1, &[0]);

        // `a`'s slot is signaled; `b`'s must still be unsignaled.
        embassy_futures::block_on(core.sync_slots.wait(slot_a));
        assert!(embassy_futures::poll_once(core.sync_slots.wait(slot_b)).is_pending());
        core.sync_slots.release(slot_a);
        core.sync_slots.release(slot_b);
    }
}
