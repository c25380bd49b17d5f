//! Transport driver contract and registration (§4.7, §6).
//!
//! The transport driver itself (byte I/O to the controller over UART/USB/
//! SPI) is out of scope (spec.md §1); this module only carries the
//! interface the core drives and the single-slot registration discipline.

use crate::buf::Buf;
use crate::error::Error;

/// The collaborator the core drives. Implemented by the transport, out of
/// scope here.
pub trait Driver {
    /// Initializes the link. Called once from `bt_init` before bring-up.
    /// Returns an errno-style negative code on failure, `0` on success,
    /// matching §6's `open() -> 0 | errno`.
    fn open(&mut self) -> i32;

    /// Transmits one Command or ACL packet. The driver prepends its own
    /// framing using the reserved head-room and must not retain `buf` past
    /// return.
    fn send(&mut self, buf: &mut Buf);

    /// Bytes of head-room every freshly acquired buffer must leave at
    /// `data` for this driver's prefix.
    fn head_reserve(&self) -> usize;
}

/// Single-slot transport registration (§4.7).
///
/// Holds at most one driver at a time; `bt_init` requires one to be
/// registered. Not `Sync`-safe to mutate from more than the fiber that owns
/// `HciCore`, matching the spec's single-cooperative-scheduler assumption.
pub(crate) struct DriverSlot<D: 'static> {
    drv: Option<&'static mut D>,
}

impl<D: Driver + 'static> DriverSlot<D> {
    pub const fn new() -> Self {
        DriverSlot { drv: None }
    }

    pub fn register(&mut self, drv: &'static mut D) -> Result<(), Error> {
        if self.drv.is_some() {
            return Err(Error::AlreadyRegistered);
        }
        // `Driver::open`/`send` are always implemented (they are trait
        // methods with no default), so the only capability check left is
        // "is a driver already registered" above; §9's open question
        // resolves the mismatched-unregister case to an explicit `Invalid`
        // rather than the source's silent no-op.
        self.drv = Some(drv);
        Ok(())
    }

    pub fn unregister(&mut self, drv: &D) -> Result<(), Error> {
        match &self.drv {
            Some(registered) if core::ptr::eq(*registered, drv) => {
                self.drv = None;
                Ok(())
            }
            Some(_) => Err(Error::Invalid),
            None => Err(Error::Invalid),
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut D> {
        self.drv.as_deref_mut()
    }

    pub fn is_registered(&self) -> bool {
        self.drv.is_some()
    }
}
