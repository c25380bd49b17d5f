//! A simulated transport standing in for real UART/USB/SPI wiring, so the
//! bring-up sequence can be driven end to end without hardware.

use bt_hci_core::{opcode, Buf, BufType, Driver, HciCore};

/// Canned controller answers for the two bring-up shapes the spec's
/// scenarios exercise: LE-only and dual-mode.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub features4: u8,
    pub le_features0: u8,
    pub le_mtu: u16,
    pub le_pkts: u8,
    pub bredr_mtu: u16,
    pub bredr_pkts: u8,
}

impl Scenario {
    pub const LE_ONLY: Scenario = Scenario {
        features4: 0x40,
        le_features0: 0x00,
        le_mtu: 27,
        le_pkts: 4,
        bredr_mtu: 0,
        bredr_pkts: 0,
    };

    pub const DUAL_MODE: Scenario = Scenario {
        features4: 0x42,
        le_features0: 0x00,
        le_mtu: 0,
        le_pkts: 0,
        bredr_mtu: 32,
        bredr_pkts: 8,
    };
}

pub struct LoopbackDriver {
    core: &'static HciCore<LoopbackDriver>,
    scenario: Scenario,
}

impl LoopbackDriver {
    pub const fn new(core: &'static HciCore<LoopbackDriver>, scenario: Scenario) -> Self {
        LoopbackDriver { core, scenario }
    }

    fn reply_cmd_complete(&self, opcode: u16, params: &[u8]) {
        let mut buf = self
            .core
            .buf_get()
            .expect("simulated controller always has a free buffer");
        buf.set_kind(BufType::Event);
        let op = opcode.to_le_bytes();
        buf.add(&[0x0E, (3 + params.len()) as u8, 1, op[0], op[1]]);
        buf.add(params);
        self.core.bt_recv(buf);
    }
}

impl Driver for LoopbackDriver {
    fn open(&mut self) -> i32 {
        0
    }

    fn send(&mut self, buf: &mut Buf) {
        let op = buf.opcode();
        match op {
            opcode::RESET => self.reply_cmd_complete(op, &[0]),
            opcode::READ_LOCAL_FEATURES => {
                let mut params = [0u8; 9];
                params[5] = self.scenario.features4; // params[1..9] is features[0..8]
                self.reply_cmd_complete(op, &params);
            }
            opcode::READ_LOCAL_VERSION_INFO => {
                self.reply_cmd_complete(op, &[0, 9, 0x34, 0x12, 0x0F, 0x00]);
            }
            opcode::READ_BD_ADDR => {
                self.reply_cmd_complete(op, &[0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
            }
            opcode::LE_READ_LOCAL_FEATURES => {
                let mut params = [0u8; 9];
                params[1] = self.scenario.le_features0;
                self.reply_cmd_complete(op, &params);
            }
            opcode::LE_READ_BUFFER_SIZE => {
                let mtu = self.scenario.le_mtu.to_le_bytes();
                self.reply_cmd_complete(op, &[0, mtu[0], mtu[1], self.scenario.le_pkts]);
            }
            opcode::READ_BUFFER_SIZE => {
                let mtu = self.scenario.bredr_mtu.to_le_bytes();
                self.reply_cmd_complete(
                    op,
                    &[0, mtu[0], mtu[1], 0, self.scenario.bredr_pkts, 0, 0, 0],
                );
            }
            opcode::SET_EVENT_MASK | opcode::LE_WRITE_LE_HOST_SUPP => {
                self.reply_cmd_complete(op, &[0]);
            }
            _ => {}
        }
    }

    fn head_reserve(&self) -> usize {
        0
    }
}
