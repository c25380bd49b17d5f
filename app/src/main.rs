//! Bring-up over a simulated transport, against either of the §8 S1/S2
//! scenario shapes — pass `--dual-mode` to exercise S2 instead of the
//! default LE-only S1.

use std::boxed::Box;

use bt_hci_core::HciCore;
use embassy_executor::Spawner;

use loopback::{LoopbackDriver, Scenario};

mod loopback;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let dual_mode = std::env::args().any(|a| a == "--dual-mode");
    let scenario = if dual_mode {
        Scenario::DUAL_MODE
    } else {
        Scenario::LE_ONLY
    };

    let core: &'static HciCore<LoopbackDriver> = Box::leak(Box::new(HciCore::new()));
    let driver: &'static mut LoopbackDriver =
        Box::leak(Box::new(LoopbackDriver::new(core, scenario)));
    core.driver_register(driver)
        .expect("single registration at startup");

    let bring_up = core.bt_init();
    let workers = embassy_futures::join::join(core.run_cmd_worker(), core.run_rx_worker());

    match embassy_futures::select::select(bring_up, workers).await {
        embassy_futures::select::Either::First(Ok(())) => {
            let state = core.controller_state();
            println!(
                "bring-up complete: bdaddr={:02x?} hci_version={} hci_revision={:#x} le_mtu={} le_pkts={}",
                state.bdaddr, state.hci_version, state.hci_revision, state.le_mtu, state.le_pkts,
            );
        }
        embassy_futures::select::Either::First(Err(e)) => {
            println!("bring-up failed: {:?}", e);
        }
        embassy_futures::select::Either::Second(_) => {
            unreachable!("the worker loops never return on their own")
        }
    }
}
