//! # Frame layout of the security-system radio protocol
//!
//! Every frame shares an outer structure; only the payload (and the
//! base-station footer) varies by message class:
//!
//! | offset | width | field                                             |
//! |--------|-------|---------------------------------------------------|
//! | 0      | 2     | vendor code `0xCC05`, big-endian                  |
//! | 2      | 1     | payload length code (frame discriminator)         |
//! | 3      | 5     | device serial number, 5 ASCII characters          |
//! | 8      | n     | payload; `n` is fixed by the length code          |
//! | 8+n    | 1     | checksum: sum of the payload bytes, mod 256       |
//! | 9+n    | 0/6   | footer, present only on base-station frames       |
//!
//! Known payload length codes:
//!
//! | code   | payload bytes | carried by                       |
//! |--------|---------------|----------------------------------|
//! | `0x00` | 7             | (reserved, observed on air)      |
//! | `0x11` | 2             | sensors and keychain remotes     |
//! | `0x22` | 3             | keypad commands                  |
//! | `0x33` | 4             | base-station responses           |
//! | `0x66` | 7             | keypad PIN entry                 |
//!
//! The first payload byte identifies the transmitting device class; a
//! value of `0x00` (base station) means a six-byte footer follows the
//! checksum. These values are fixed by the devices' firmware and must be
//! reproduced bit-exactly for interoperability.

use std::convert::TryFrom;
use std::fmt;

use strum::EnumMessage;

/// Vendor code carried by every frame, big-endian on the wire
pub const VENDOR_CODE: u16 = 0xCC05;

/// Offset of the payload length code
pub const OFFSET_PLC: usize = 2;

/// Offset of the device serial number
pub const OFFSET_SERIAL: usize = 3;

/// Width of the device serial number, in bytes
pub const SERIAL_LEN: usize = 5;

/// Offset of the payload
pub const OFFSET_PAYLOAD: usize = 8;

/// Width of the base-station footer, in bytes
pub const FOOTER_LEN: usize = 6;

/// Shortest prefix from which a frame's total length can be resolved
///
/// Runs through the first payload byte, which carries the device class.
pub const MIN_FRAME_LEN: usize = OFFSET_PAYLOAD + 1;

/// Longest frame the protocol defines
///
/// A seven-byte payload plus checksum and base-station footer.
pub const MAX_FRAME_LEN: usize = OFFSET_PAYLOAD + 7 + 1 + FOOTER_LEN;

/// Payload width for a payload length code
///
/// Returns `None` for codes the protocol does not define.
pub fn payload_len(plc: u8) -> Option<usize> {
    match plc {
        0x00 => Some(7),
        0x11 => Some(2),
        0x22 => Some(3),
        0x33 => Some(4),
        0x66 => Some(7),
        _ => None,
    }
}

/// Total frame length for a length code and leading payload byte
///
/// The `origin` byte is the first payload byte; base-station frames
/// (`origin == 0x00`) carry a footer after the checksum. Returns `None`
/// when the length code is unknown.
pub fn frame_len(plc: u8, origin: u8) -> Option<usize> {
    let n = payload_len(plc)?;
    let footer = if origin == DeviceClass::BaseStation as u8 {
        FOOTER_LEN
    } else {
        0
    };
    Some(OFFSET_PAYLOAD + n + 1 + footer)
}

/// Frame checksum: sum of the payload bytes, mod 256
pub fn checksum(payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// Transmitting device class
///
/// Carried in the first payload byte of every frame: whole byte for
/// keypad and base-station traffic, low nibble for sensor traffic
/// (whose high nibble holds the sequence counter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[repr(u8)]
pub enum DeviceClass {
    /// The base station
    #[strum(detailed_message = "base station")]
    BaseStation = 0x0,

    /// A wall keypad
    #[strum(detailed_message = "keypad")]
    Keypad = 0x1,

    /// A keychain remote
    #[strum(detailed_message = "keychain remote")]
    KeychainRemote = 0x2,

    /// A motion sensor
    #[strum(detailed_message = "motion sensor")]
    MotionSensor = 0x4,

    /// An entry (door/window) sensor
    #[strum(detailed_message = "entry sensor")]
    EntrySensor = 0x5,
}

impl DeviceClass {
    /// Human-readable name, like "`entry sensor`"
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }
}

impl TryFrom<u8> for DeviceClass {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x0 => Ok(DeviceClass::BaseStation),
            0x1 => Ok(DeviceClass::Keypad),
            0x2 => Ok(DeviceClass::KeychainRemote),
            0x4 => Ok(DeviceClass::MotionSensor),
            0x5 => Ok(DeviceClass::EntrySensor),
            other => Err(other),
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}
