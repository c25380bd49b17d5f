//! Error kinds surfaced at the API boundary (§6, §7).
//!
//! Protocol anomalies (wrong-opcode completion, unknown event, ACL length
//! mismatch, unknown buffer type) are *not* represented here: per §7 they
//! are logged and the packet dropped without producing a `Result` the
//! caller has to handle.

/// Errors surfaced from the host-facing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The free buffer pool is empty (`ENOBUFS`).
    NoBuffer,
    /// No transport is registered, or the controller is not LE-capable
    /// (`ENODEV`).
    NoDevice,
    /// A transport driver is already registered (`EALREADY`).
    AlreadyRegistered,
    /// The driver argument is missing a required capability, or does not
    /// match the currently registered driver (`EINVAL`).
    Invalid,
}
