//! Event and ACL demultiplexing on the RX path (§4.3).
//!
//! `Command Complete`/`Command Status` are pulled apart here far enough to
//! hand the opcode, `ncmd` and return-parameters off to [`crate::response`]
//! and [`crate::hci::HciCore::complete`]; everything else is either a
//! framing check (ACL) or a log-and-drop (unrecognized event, meta-events).

use crate::buf::{Buf, BufType};
use crate::driver::Driver;
use crate::hci::HciCore;
use crate::wire::{AclHeader, CmdCompletePrologue, CmdStatusEvent, EventHeader};

/// `Command Complete`.
const EVT_CMD_COMPLETE: u8 = 0x0E;
/// `Command Status`.
const EVT_CMD_STATUS: u8 = 0x0F;

impl<D: Driver + 'static> HciCore<D> {
    /// Dispatches one buffer popped off `rx_queue`. Always consumes `buf`;
    /// returns `false` only for the fatal "unknown buffer type" case, which
    /// tells [`HciCore::run_rx_worker`] to stop (§4.3 "Unknown type").
    pub(crate) fn dispatch_rx(&self, mut buf: Buf) -> bool {
        match buf.kind() {
            BufType::Event => {
                self.dispatch_event(&mut buf);
                self.buf_put(buf);
                true
            }
            BufType::AclData => {
                self.dispatch_acl(&mut buf);
                self.buf_put(buf);
                true
            }
            BufType::Command | BufType::Unknown => {
                #[cfg(feature = "defmt")]
                defmt::error!("rx worker: unknown buffer type, terminating");
                self.buf_put(buf);
                false
            }
        }
    }

    fn dispatch_event(&self, buf: &mut Buf) {
        let hdr = match EventHeader::parse(buf.data()) {
            Some(h) => h,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("event: header too short, dropping");
                return;
            }
        };
        buf.pull(EventHeader::SIZE);

        match hdr.evt {
            EVT_CMD_COMPLETE => {
                let prologue = match CmdCompletePrologue::parse(buf.data()) {
                    Some(p) => p,
                    None => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("cmd complete: prologue too short, dropping");
                        return;
                    }
                };
                buf.pull(CmdCompletePrologue::SIZE);
                self.complete(prologue.opcode, prologue.ncmd, buf.data());
            }
            EVT_CMD_STATUS => {
                let status = match CmdStatusEvent::parse(buf.data()) {
                    Some(s) => s,
                    None => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("cmd status: payload too short, dropping");
                        return;
                    }
                };
                self.complete(status.opcode, status.ncmd, &[status.status]);
            }
            _ => {
                #[cfg(feature = "defmt")]
                defmt::debug!("event: unrecognized evt={:x}, dropping", hdr.evt);
            }
        }
    }

    fn dispatch_acl(&self, buf: &mut Buf) {
        let hdr = match AclHeader::parse(buf.data()) {
            Some(h) => h,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("acl: header too short, dropping");
                return;
            }
        };
        buf.pull(AclHeader::SIZE);
        if buf.len() != hdr.len as usize {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "acl: length mismatch, header says {} got {}, dropping",
                hdr.len,
                buf.len()
            );
            return;
        }
        // Upper ACL delivery (L2CAP reassembly and on) is out of scope here;
        // the core's job ends at framing validation (§4.3).
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    struct StubDriver;
    impl Driver for StubDriver {
        fn open(&mut self) -> i32 {
            0
        }
        fn send(&mut self, _buf: &mut Buf) {}
        fn head_reserve(&self) -> usize {
            0
        }
    }

    fn fresh_core() -> HciCore<StubDriver> {
        let core: HciCore<StubDriver> = HciCore::new();
        core.pool.init();
        core
    }

    #[test]
    fn cmd_complete_event_correlates_and_updates_state() {
        let core = fresh_core();
        let mut sent = core.buf_get().unwrap();
        sent.set_kind(BufType::Command);
        sent.set_opcode(opcode::RESET);
        core.sent_cmd.lock(|c| *c.borrow_mut() = Some(sent));

        let mut evt = core.buf_get().unwrap();
        evt.set_kind(BufType::Event);
        let op = opcode::RESET.to_le_bytes();
        // evt=CMD_COMPLETE, param_len=4, ncmd=1, opcode, status=0
        evt.add(&[0x0E, 4, 1, op[0], op[1], 0x00]);

        assert!(core.dispatch_rx(evt));
        assert!(core.sent_cmd.lock(|c| c.borrow().is_none()));
        assert!(core.credit.available());
    }

    #[test]
    fn unknown_buffer_type_is_fatal() {
        let core = fresh_core();
        let buf = core.buf_get().unwrap();
        assert!(!core.dispatch_rx(buf));
    }

    #[test]
    fn acl_length_mismatch_is_dropped_without_panic() {
        let core = fresh_core();
        let mut buf = core.buf_get().unwrap();
        buf.set_kind(BufType::AclData);
        // handle_flags arbitrary, len field claims 10 bytes but only 2 follow.
        buf.add(&[0x00, 0x00, 10, 0, 0xAA, 0xBB]);
        let before = core.pool.available();
        assert!(core.dispatch_rx(buf));
        assert_eq!(core.pool.available(), before + 1);
    }
}
