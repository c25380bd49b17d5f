//! The command credit gate (§4.4, §3 "Credit semaphore").
//!
//! Tracks `ncmd`, the number of HCI commands the controller is ready to
//! accept. This core deliberately caps outstanding commands at one
//! regardless of what the controller advertises (§4.4): the gate is a
//! single-token rendezvous, not a general counting semaphore, which keeps
//! completion correlation trivially unambiguous. A bounded
//! `embassy_sync::channel::Channel<_, (), 1>` models exactly that — `give`
//! is a non-blocking `try_send` of one token, `take` is an async `receive`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

pub struct CreditGate {
    tokens: Channel<CriticalSectionRawMutex, (), 1>,
}

impl CreditGate {
    pub const fn new() -> Self {
        CreditGate {
            tokens: Channel::new(),
        }
    }

    /// Seeds the gate with its initial credit of one, allowing the first
    /// RESET to be issued before any completion has been observed (§3).
    pub fn init(&self) {
        let _ = self.tokens.try_send(());
    }

    /// Blocks (cooperatively) until credit is available, then consumes it.
    /// Called by the command worker before dequeuing the next command.
    pub async fn take(&self) {
        self.tokens.receive().await;
    }

    /// Grants one unit of credit. A no-op if a token is already pending —
    /// the gate never holds more than one, matching the single-outstanding-
    /// command invariant.
    pub fn give(&self) {
        let _ = self.tokens.try_send(());
    }

    /// Whether a credit token is currently sitting in the gate, i.e.
    /// `ncmd == 1` (§4.4 credit refill reads this before deciding whether a
    /// refill is due).
    pub fn available(&self) -> bool {
        self.tokens.len() > 0
    }
}
