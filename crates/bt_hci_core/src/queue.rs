//! The command and RX FIFOs (§3 "Queues").
//!
//! `cmd_queue` is MPSC in (any caller enqueues), SPSC out (only the command
//! worker dequeues). `rx_queue` is SPSC: the transport ingress is the only
//! producer, the RX worker the only consumer. Both are modeled with the
//! same `embassy_sync::channel::Channel` the free pool uses (§4.1) — nothing
//! here enforces the "only one consumer" half of the discipline at the type
//! level, exactly as the spec's own FIFO primitive does not; it is a
//! contract on the callers, not the data structure.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::buf::{Buf, NUM_BUFS};

/// Outgoing HCI commands, host to controller.
pub type CmdQueue = Channel<CriticalSectionRawMutex, Buf, NUM_BUFS>;

/// Incoming HCI events and ACL data, controller to host.
pub type RxQueue = Channel<CriticalSectionRawMutex, Buf, NUM_BUFS>;
