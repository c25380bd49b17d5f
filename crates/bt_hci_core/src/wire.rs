//! Little-endian HCI wire header formats (§6).
//!
//! The source overlays wire structs onto raw buffers; here every multi-byte
//! field is decoded/encoded explicitly with `byteorder` instead, so there is
//! no reliance on struct layout or native endianness.

use byteorder::{ByteOrder, LittleEndian};

/// `opcode:u16, param_len:u8`.
pub struct CommandHeader {
    pub opcode: u16,
    pub param_len: u8,
}

impl CommandHeader {
    pub const SIZE: usize = 3;

    pub fn write(&self, out: &mut [u8]) {
        LittleEndian::write_u16(&mut out[0..2], self.opcode);
        out[2] = self.param_len;
    }
}

/// `evt:u8, param_len:u8`.
pub struct EventHeader {
    pub evt: u8,
    pub param_len: u8,
}

impl EventHeader {
    pub const SIZE: usize = 2;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(EventHeader {
            evt: buf[0],
            param_len: buf[1],
        })
    }
}

/// `handle_flags:u16, len:u16`. Lower 12 bits of `handle_flags` are the
/// connection handle, upper 4 bits are packet-boundary + broadcast flags.
pub struct AclHeader {
    pub handle: u16,
    pub flags: u8,
    pub len: u16,
}

impl AclHeader {
    pub const SIZE: usize = 4;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        let handle_flags = LittleEndian::read_u16(&buf[0..2]);
        let len = LittleEndian::read_u16(&buf[2..4]);
        Some(AclHeader {
            handle: handle_flags & 0x0FFF,
            flags: (handle_flags >> 12) as u8,
            len,
        })
    }
}

/// `Command Complete` payload prologue: `ncmd:u8, opcode:u16`.
pub struct CmdCompletePrologue {
    pub ncmd: u8,
    pub opcode: u16,
}

impl CmdCompletePrologue {
    pub const SIZE: usize = 3;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(CmdCompletePrologue {
            ncmd: buf[0],
            opcode: LittleEndian::read_u16(&buf[1..3]),
        })
    }
}

/// `Command Status` payload: `status:u8, ncmd:u8, opcode:u16`.
pub struct CmdStatusEvent {
    pub status: u8,
    pub ncmd: u8,
    pub opcode: u16,
}

impl CmdStatusEvent {
    pub const SIZE: usize = 4;

    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(CmdStatusEvent {
            status: buf[0],
            ncmd: buf[1],
            opcode: LittleEndian::read_u16(&buf[2..4]),
        })
    }
}

pub fn read_u16(buf: &[u8]) -> u16 {
    LittleEndian::read_u16(buf)
}
