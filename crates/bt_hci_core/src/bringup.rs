//! The bring-up state sequence (§4.6) and `bt_init`/`bt_hci_reset` (§4.7).

use crate::driver::Driver;
use crate::error::Error;
use crate::hci::HciCore;
use crate::opcode;

impl<D: Driver + 'static> HciCore<D> {
    /// Requires a registered driver; initializes the free pool and credit
    /// gate, opens the transport, then runs bring-up. The command and RX
    /// worker loops must already be polled by the caller's executor (§4.6
    /// "relies on the RX worker being already running").
    pub async fn bt_init(&self) -> Result<(), Error> {
        if !self.driver.lock(|slot| slot.borrow().is_registered()) {
            return Err(Error::NoDevice);
        }

        self.pool.init();
        self.credit.init();
        self.sync_slots.init();

        let open_result = self
            .driver
            .lock(|slot| slot.borrow_mut().get_mut().map(|d| d.open()));
        match open_result {
            Some(0) => {}
            _ => return Err(Error::Invalid),
        }

        self.init_sequence().await
    }

    /// Re-runs bring-up against an already-initialized core (§6
    /// `bt_hci_reset`). Does not touch driver registration or the buffer
    /// pool's contents.
    pub(crate) async fn init_sequence(&self) -> Result<(), Error> {
        self.cmd_send(opcode::RESET, None)?;
        self.cmd_send(opcode::READ_LOCAL_FEATURES, None)?;
        self.cmd_send(opcode::READ_LOCAL_VERSION_INFO, None)?;
        // Barrier: by the time this returns, steps 1-3 have also completed,
        // since at most one command is ever outstanding (§4.2).
        self.cmd_send_sync(opcode::READ_BD_ADDR, None).await?;
        #[cfg(feature = "defmt")]
        defmt::debug!("bring-up: reset sent, local features/version/bdaddr read");

        if !self.controller_state().le_capable() {
            #[cfg(feature = "defmt")]
            defmt::warn!("bring-up: controller is not LE-capable, aborting");
            return Err(Error::NoDevice);
        }

        self.cmd_send(opcode::LE_READ_LOCAL_FEATURES, None)?;
        // Synchronous rather than the fire-and-forget send used for the
        // two reads above: the mask built below reads `le_features`, which
        // only LE_READ_LOCAL_FEATURES's completion populates, and FIFO
        // ordering plus the single-outstanding-command gate guarantee that
        // completion has landed by the time this barrier returns.
        self.cmd_send_sync(opcode::LE_READ_BUFFER_SIZE, None).await?;
        #[cfg(feature = "defmt")]
        defmt::debug!("bring-up: LE features and buffer size read");

        let state = self.controller_state();
        let mut mask = [0u8; 8];
        mask[0] = 0x10 | if state.le_encryption_capable() { 0x80 } else { 0 };
        mask[1] = 0x08 | 0x20 | 0x40 | 0x80;
        mask[2] = 0x04;
        mask[3] = 0x02;
        mask[5] = if state.le_encryption_capable() { 0x80 } else { 0 };
        mask[7] = 0x20;
        let set_mask = self.build_cmd(opcode::SET_EVENT_MASK, &mask)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("bring-up: sending event mask {:02x}", mask);
        self.cmd_send_sync(opcode::SET_EVENT_MASK, Some(set_mask))
            .await?;

        if state.bredr_capable() {
            if state.le_mtu == 0 {
                #[cfg(feature = "defmt")]
                defmt::debug!("bring-up: dual-mode controller, reading BR/EDR buffer size");
                self.cmd_send(opcode::READ_BUFFER_SIZE, None)?;
            }
            let supp = self.build_cmd(opcode::LE_WRITE_LE_HOST_SUPP, &[1, 0])?;
            self.cmd_send_sync(opcode::LE_WRITE_LE_HOST_SUPP, Some(supp))
                .await?;
            #[cfg(feature = "defmt")]
            defmt::debug!("bring-up: BR/EDR LE host support written");
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("bring-up: complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buf::{Buf, BufType};

    /// A controller stub that answers every command synchronously, inline
    /// in `send`, per a canned feature-bit scenario — the §8 S1-S3 seeds
    /// made concrete. `dual_mode` selects between S1's LE-only buffer-size
    /// answer and S2's dual-mode one where `LE_READ_BUFFER_SIZE` reports
    /// `le_mtu = 0` and a BR/EDR `READ_BUFFER_SIZE` round-trip is expected.
    struct ScenarioDriver {
        core: &'static HciCore<ScenarioDriver>,
        features4: u8,
        dual_mode: bool,
        read_buffer_size_calls: u32,
        le_write_host_supp_calls: u32,
    }

    impl ScenarioDriver {
        fn reply(&self, opcode: u16, params: &[u8]) {
            let mut buf = self.core.buf_get().unwrap();
            buf.set_kind(BufType::Event);
            let op = opcode.to_le_bytes();
            buf.add(&[0x0E, (3 + params.len()) as u8, 1, op[0], op[1]]);
            buf.add(params);
            self.core.bt_recv(buf);
        }
    }

    impl Driver for ScenarioDriver {
        fn open(&mut self) -> i32 {
            0
        }

        fn send(&mut self, buf: &mut Buf) {
            let op = buf.opcode();
            match op {
                opcode::RESET => self.reply(op, &[0]),
                opcode::READ_LOCAL_FEATURES => {
                    let mut params = [0u8; 9];
                    params[5] = self.features4;
                    self.reply(op, &params);
                }
                opcode::READ_LOCAL_VERSION_INFO => {
                    self.reply(op, &[0, 9, 0x34, 0x12, 0x0F, 0x00]);
                }
                opcode::READ_BD_ADDR => {
                    self.reply(op, &[0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
                }
                opcode::LE_READ_LOCAL_FEATURES => self.reply(op, &[0u8; 9]),
                opcode::LE_READ_BUFFER_SIZE => {
                    if self.dual_mode {
                        self.reply(op, &[0, 0, 0, 0]);
                    } else {
                        self.reply(op, &[0, 27, 0, 4]);
                    }
                }
                opcode::READ_BUFFER_SIZE => {
                    self.read_buffer_size_calls += 1;
                    self.reply(op, &[0, 32, 0, 0, 8, 0]);
                }
                opcode::SET_EVENT_MASK => self.reply(op, &[0]),
                opcode::LE_WRITE_LE_HOST_SUPP => {
                    self.le_write_host_supp_calls += 1;
                    self.reply(op, &[0]);
                }
                _ => {}
            }
        }

        fn head_reserve(&self) -> usize {
            0
        }
    }

    async fn run_bring_up(core: &'static HciCore<ScenarioDriver>) -> Result<(), Error> {
        use embassy_futures::{join::join, select::select, select::Either};
        match select(core.bt_init(), join(core.run_cmd_worker(), core.run_rx_worker())).await {
            Either::First(result) => result,
            Either::Second(_) => unreachable!("worker loops never return on their own"),
        }
    }

    static LE_ONLY_CORE: HciCore<ScenarioDriver> = HciCore::new();
    static mut LE_ONLY_DRIVER: ScenarioDriver = ScenarioDriver {
        core: &LE_ONLY_CORE,
        features4: 0x40,
        dual_mode: false,
        read_buffer_size_calls: 0,
        le_write_host_supp_calls: 0,
    };

    #[test]
    fn s1_bring_up_of_le_only_controller() {
        let core = &LE_ONLY_CORE;
        core.driver_register(unsafe { &mut LE_ONLY_DRIVER }).unwrap();
        embassy_futures::block_on(run_bring_up(core)).unwrap();

        let state = core.controller_state();
        assert_eq!(state.bdaddr, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(state.hci_version, 9);
        assert_eq!(state.hci_revision, 0x1234);
        assert_eq!(state.manufacturer, 0x000F);
        assert_eq!(state.le_mtu, 27);
        assert_eq!(state.le_pkts, 4);
        // LE-only controller: no BR/EDR follow-up commands issued (§8 S1).
        assert_eq!(unsafe { LE_ONLY_DRIVER.read_buffer_size_calls }, 0);
        assert_eq!(unsafe { LE_ONLY_DRIVER.le_write_host_supp_calls }, 0);
    }

    static NON_LE_CORE: HciCore<ScenarioDriver> = HciCore::new();
    static mut NON_LE_DRIVER: ScenarioDriver = ScenarioDriver {
        core: &NON_LE_CORE,
        features4: 0x00,
        dual_mode: false,
        read_buffer_size_calls: 0,
        le_write_host_supp_calls: 0,
    };

    #[test]
    fn s3_non_le_controller_is_rejected() {
        let core = &NON_LE_CORE;
        core.driver_register(unsafe { &mut NON_LE_DRIVER }).unwrap();
        let result = embassy_futures::block_on(run_bring_up(core));
        assert_eq!(result, Err(Error::NoDevice));
    }

    static DUAL_MODE_CORE: HciCore<ScenarioDriver> = HciCore::new();
    static mut DUAL_MODE_DRIVER: ScenarioDriver = ScenarioDriver {
        core: &DUAL_MODE_CORE,
        features4: 0x42,
        dual_mode: true,
        read_buffer_size_calls: 0,
        le_write_host_supp_calls: 0,
    };

    #[test]
    fn s2_bring_up_of_dual_mode_controller() {
        let core = &DUAL_MODE_CORE;
        core.driver_register(unsafe { &mut DUAL_MODE_DRIVER }).unwrap();
        embassy_futures::block_on(run_bring_up(core)).unwrap();

        let state = core.controller_state();
        assert_eq!(state.bdaddr, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        // LE_READ_BUFFER_SIZE reported le_mtu=0, so the BR/EDR value won
        // through the READ_BUFFER_SIZE follow-up (§4.6 step 9, §8 S2).
        assert_eq!(state.le_mtu, 32);
        assert_eq!(state.le_pkts, 8);
        assert_eq!(unsafe { DUAL_MODE_DRIVER.read_buffer_size_calls }, 1);
        assert_eq!(unsafe { DUAL_MODE_DRIVER.le_write_host_supp_calls }, 1);
    }
}
