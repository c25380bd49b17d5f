//! HCI opcodes this core issues or recognizes in a completion (§4.5, §4.6).
//!
//! Opcode encoding is `(OGF << 10) | OCF`, per the Bluetooth Core spec; the
//! constants below are the already-combined 16-bit values used on the wire.

/// Controller & Baseband (OGF 0x03): Reset.
pub const RESET: u16 = 0x0C03;
/// Controller & Baseband (OGF 0x03): Set Event Mask.
pub const SET_EVENT_MASK: u16 = 0x0C01;
/// Controller & Baseband (OGF 0x03): Read Buffer Size (BR/EDR).
pub const READ_BUFFER_SIZE: u16 = 0x1005;
/// Controller & Baseband (OGF 0x03): LE Write LE Host Support.
pub const LE_WRITE_LE_HOST_SUPP: u16 = 0x0C6D;

/// Informational Parameters (OGF 0x04): Read Local Supported Features.
pub const READ_LOCAL_FEATURES: u16 = 0x1003;
/// Informational Parameters (OGF 0x04): Read Local Version Information.
pub const READ_LOCAL_VERSION_INFO: u16 = 0x1001;
/// Informational Parameters (OGF 0x04): Read BD_ADDR.
pub const READ_BD_ADDR: u16 = 0x1009;

/// LE Controller Commands (OGF 0x08): LE Read Buffer Size.
pub const LE_READ_BUFFER_SIZE: u16 = 0x2002;
/// LE Controller Commands (OGF 0x08): LE Read Local Supported Features.
pub const LE_READ_LOCAL_FEATURES: u16 = 0x2003;

bitflags::bitflags! {
    /// LMP feature page 0, byte 4 (§3 `features`, §4.6 steps 5 and 9).
    ///
    /// `BREDR` is expressed here as a direct "supported" flag rather than
    /// Zephyr's inverted `BT_LMP_NO_BREDR`, which an OR of feature bits can
    /// never clear back out; see DESIGN.md for the §8 scenario values this
    /// resolves against.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LmpFeaturesPage4: u8 {
        /// LE Supported (Controller).
        const LE = 1 << 6;
        /// BR/EDR Supported.
        const BREDR = 1 << 1;
    }
}

bitflags::bitflags! {
    /// LE feature page 0, byte 0 (§3 `le_features`, §4.6 step 8).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LeFeaturesPage0: u8 {
        const ENCRYPTION = 1 << 0;
    }
}
