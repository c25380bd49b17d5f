//! Response parsers (§4.5).
//!
//! Each recognized opcode mutates the controller state record from the
//! command-complete payload. `buf` has already had the event header and the
//! `hci_evt_cmd_complete` prologue pulled off by the time these run, so
//! `buf.data()` starts at the return-parameters byte, `status` first.

use crate::opcode;
use crate::state::ControllerState;
use crate::wire::read_u16;

/// Applies the tabulated effect of a `Command Complete` payload for `opcode`
/// to `state`. Unrecognized opcodes are reported to the caller (which logs
/// and proceeds to completion correlation) rather than handled here.
pub(crate) fn apply(state: &mut ControllerState, opcode: u16, params: &[u8]) -> bool {
    match opcode {
        opcode::RESET => {
            // Status-only; no state effect either way (§4.5).
        }
        opcode::READ_LOCAL_VERSION_INFO => {
            if status_ok(params) && params.len() >= 6 {
                state.hci_version = params[1];
                state.hci_revision = read_u16(&params[2..4]);
                state.manufacturer = read_u16(&params[4..6]);
            }
        }
        opcode::READ_LOCAL_FEATURES => {
            // Recorded unconditionally, regardless of status (§4.5).
            if params.len() >= 1 + 8 {
                state.features.copy_from_slice(&params[1..9]);
            }
        }
        opcode::READ_BUFFER_SIZE => {
            // status(1), acl_max_len(2), sco_max_len(1), acl_max_num(2),
            // sco_max_num(2) — the packet count sits after the one-byte
            // SCO length field, not immediately after acl_max_len.
            if status_ok(params) && params.len() >= 1 + 2 + 1 + 2 && state.le_mtu == 0 {
                state.le_mtu = read_u16(&params[1..3]);
                state.le_pkts = read_u16(&params[4..6]) as u8;
            }
        }
        opcode::READ_BD_ADDR => {
            if status_ok(params) && params.len() >= 1 + 6 {
                state.bdaddr.copy_from_slice(&params[1..7]);
            }
        }
        opcode::LE_READ_BUFFER_SIZE => {
            if status_ok(params) && params.len() >= 1 + 3 {
                state.le_mtu = read_u16(&params[1..3]);
                state.le_pkts = params[3];
            }
        }
        opcode::LE_READ_LOCAL_FEATURES => {
            if params.len() >= 1 + 8 {
                state.le_features.copy_from_slice(&params[1..9]);
            }
        }
        opcode::SET_EVENT_MASK | opcode::LE_WRITE_LE_HOST_SUPP => {
            // Status-only commands issued by bring-up; no state effect.
        }
        _ => return false,
    }
    true
}

fn status_ok(params: &[u8]) -> bool {
    params.first() == Some(&0)
}
