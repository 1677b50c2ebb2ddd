//! Validated field types shared by every message class
//!
//! All field validation happens here, at construction time. A message
//! assembled from these types is guaranteed serializable; the encode
//! path can never fail after construction.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::wire;

/// Rejected attempt to construct a message field
///
/// Out-of-domain inputs are refused before any encode attempt; nothing
/// is ever silently clamped.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructionError {
    /// Device serials are exactly five digits or uppercase letters
    #[error("serial number must be 5 digits or uppercase letters")]
    InvalidSerial,

    /// Base-station serials are exactly six hexadecimal digits
    #[error("station serial must be 6 hexadecimal digits")]
    InvalidStationSerial,

    /// PINs are exactly four decimal digits
    #[error("PIN must be 4 decimal digits")]
    InvalidPin,

    /// Sequence counters occupy a single nibble
    #[error("sequence counter must be 0x0..=0xF")]
    InvalidSequence,
}

/// Five-character device serial number
///
/// Identifies one physical device, as printed on its label: five ASCII
/// digits or uppercase letters. Addressing is flat; any receiver decodes
/// any frame.
///
/// ```
/// use ookguard::SerialNumber;
///
/// let sn = SerialNumber::new("159MP").unwrap();
/// assert_eq!("159MP", sn.as_str());
/// assert!(SerialNumber::new("159mp").is_err());
/// assert!(SerialNumber::new("159MPX").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SerialNumber([u8; wire::SERIAL_LEN]);

impl SerialNumber {
    /// Validate and construct a serial number
    pub fn new(serial: &str) -> Result<Self, ConstructionError> {
        let bytes = serial.as_bytes();
        Self::from_wire(bytes).ok_or(ConstructionError::InvalidSerial)
    }

    /// Serial as text
    pub fn as_str(&self) -> &str {
        // invariant: constructed from ASCII only
        std::str::from_utf8(&self.0).expect("serial is ASCII")
    }

    /// Wire representation: the five ASCII bytes
    pub(crate) fn as_wire(&self) -> &[u8; wire::SERIAL_LEN] {
        &self.0
    }

    /// Decode from wire bytes, if they form a valid serial
    pub(crate) fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != wire::SERIAL_LEN {
            return None;
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        {
            return None;
        }

        let mut out = [0u8; wire::SERIAL_LEN];
        out.copy_from_slice(bytes);
        Some(Self(out))
    }
}

impl FromStr for SerialNumber {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, ConstructionError> {
        Self::new(s)
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Six-hex-digit base-station serial number
///
/// Base stations identify themselves with six hexadecimal digits,
/// packed into the five-byte footer of their frames. Lowercase input is
/// accepted and canonicalized to uppercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StationSerial([u8; 6]);

impl StationSerial {
    /// Validate and construct a station serial
    pub fn new(serial: &str) -> Result<Self, ConstructionError> {
        let bytes = serial.as_bytes();
        if bytes.len() != 6 || !bytes.iter().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConstructionError::InvalidStationSerial);
        }

        let mut out = [0u8; 6];
        for (o, b) in out.iter_mut().zip(bytes) {
            *o = b.to_ascii_uppercase();
        }
        Ok(Self(out))
    }

    /// Serial as text (uppercase hex)
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("serial is ASCII")
    }

    // hex value of digit i
    fn digit(&self, i: usize) -> u8 {
        let b = self.0[i];
        if b.is_ascii_digit() {
            b - b'0'
        } else {
            b - b'A' + 10
        }
    }

    /// Pack into the five-byte footer representation
    pub(crate) fn pack(&self) -> [u8; 5] {
        [
            self.digit(0),
            self.digit(1),
            self.digit(2),
            (self.digit(5) << 4) | self.digit(3),
            self.digit(4),
        ]
    }

    /// Unpack from the five-byte footer representation
    ///
    /// Every five-byte pattern unpacks; the upper nibbles of the first
    /// three bytes and the last byte are ignored, as the hardware does.
    pub(crate) fn unpack(bytes: &[u8]) -> Self {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";

        let digits = [
            bytes[0] & 0xF,
            bytes[1] & 0xF,
            bytes[2] & 0xF,
            bytes[3] & 0xF,
            bytes[4] & 0xF,
            bytes[3] >> 4,
        ];
        let mut out = [0u8; 6];
        for (o, d) in out.iter_mut().zip(digits) {
            *o = HEX[d as usize];
        }
        Self(out)
    }
}

impl FromStr for StationSerial {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, ConstructionError> {
        Self::new(s)
    }
}

impl AsRef<str> for StationSerial {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StationSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Per-device transmission sequence counter
///
/// One nibble, incremented by the sending device after every
/// transmission. The codec reads and writes the field; monotonicity and
/// duplicate detection are receiver policy, outside this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(u8);

impl Sequence {
    /// Validate and construct a sequence counter
    pub fn new(value: u8) -> Result<Self, ConstructionError> {
        if value <= 0xF {
            Ok(Self(value))
        } else {
            Err(ConstructionError::InvalidSequence)
        }
    }

    /// The counter value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Counter from a wire nibble, which is in range by construction
    pub(crate) fn from_nibble(value: u8) -> Self {
        Self(value & 0xF)
    }
}

impl TryFrom<u8> for Sequence {
    type Error = ConstructionError;

    fn try_from(value: u8) -> Result<Self, ConstructionError> {
        Self::new(value)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Four-digit keypad PIN
///
/// Stored as its ASCII digits; packed as BCD nibble pairs on the wire.
///
/// ```
/// use ookguard::Pin;
///
/// assert!(Pin::new("1379").is_ok());
/// assert!(Pin::new("137").is_err());
/// assert!(Pin::new("13790").is_err());
/// assert!(Pin::new("137a").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pin([u8; 4]);

impl Pin {
    /// Validate and construct a PIN
    pub fn new(pin: &str) -> Result<Self, ConstructionError> {
        let bytes = pin.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_digit()) {
            return Err(ConstructionError::InvalidPin);
        }

        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// PIN as text
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("PIN is ASCII")
    }

    // numeric value of digit i
    fn digit(&self, i: usize) -> u8 {
        self.0[i] - b'0'
    }

    /// Pack into the two wire bytes
    pub(crate) fn pack(&self) -> [u8; 2] {
        [
            (self.digit(1) << 4) | self.digit(0),
            (self.digit(3) << 4) | self.digit(2),
        ]
    }

    /// Unpack from the two wire bytes
    ///
    /// Each nibble must be a decimal digit.
    pub(crate) fn unpack(bytes: [u8; 2]) -> Option<Self> {
        let nibbles = [
            bytes[0] & 0xF,
            bytes[0] >> 4,
            bytes[1] & 0xF,
            bytes[1] >> 4,
        ];
        if nibbles.iter().any(|n| *n > 9) {
            return None;
        }

        let mut out = [0u8; 4];
        for (o, n) in out.iter_mut().zip(nibbles) {
            *o = n + b'0';
        }
        Some(Self(out))
    }
}

impl FromStr for Pin {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, ConstructionError> {
        Self::new(s)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_domain() {
        assert!(SerialNumber::new("123AZ").is_ok());
        assert!(SerialNumber::new("12345").is_ok());
        assert!(SerialNumber::new("ABCDE").is_ok());

        assert_eq!(
            Err(ConstructionError::InvalidSerial),
            SerialNumber::new("1234")
        );
        assert_eq!(
            Err(ConstructionError::InvalidSerial),
            SerialNumber::new("123456")
        );
        assert_eq!(
            Err(ConstructionError::InvalidSerial),
            SerialNumber::new("123a5")
        );
        assert_eq!(
            Err(ConstructionError::InvalidSerial),
            SerialNumber::new("12 45")
        );
    }

    #[test]
    fn test_serial_wire_round_trip() {
        let sn = SerialNumber::new("159MP").unwrap();
        assert_eq!(b"159MP", sn.as_wire());
        assert_eq!(Some(sn), SerialNumber::from_wire(b"159MP"));

        assert_eq!(None, SerialNumber::from_wire(b"15\x009P"));
        assert_eq!(None, SerialNumber::from_wire(b"159M"));
    }

    #[test]
    fn test_station_serial_pack() {
        let sn = StationSerial::new("CAFE12").unwrap();
        assert_eq!([0x0C, 0x0A, 0x0F, 0x2E, 0x01], sn.pack());
        assert_eq!(sn, StationSerial::unpack(&sn.pack()));

        // lowercase canonicalizes
        assert_eq!(sn, StationSerial::new("cafe12").unwrap());
        assert_eq!("CAFE12", sn.as_str());

        assert!(StationSerial::new("CAFE1").is_err());
        assert!(StationSerial::new("CAFE1G").is_err());
    }

    #[test]
    fn test_station_serial_unpack_masks_high_nibbles() {
        // hardware ignores the nibbles it does not use
        let a = StationSerial::unpack(&[0x0C, 0x0A, 0x0F, 0x2E, 0x01]);
        let b = StationSerial::unpack(&[0xFC, 0xFA, 0xFF, 0x2E, 0xF1]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_domain() {
        assert!(Sequence::new(0x0).is_ok());
        assert!(Sequence::new(0xF).is_ok());
        assert_eq!(
            Err(ConstructionError::InvalidSequence),
            Sequence::new(0x10)
        );
        assert_eq!("0xA", format!("{}", Sequence::new(0xA).unwrap()));
    }

    #[test]
    fn test_pin_domain() {
        assert!(Pin::new("0000").is_ok());
        assert!(Pin::new("9999").is_ok());

        assert_eq!(Err(ConstructionError::InvalidPin), Pin::new("137"));
        assert_eq!(Err(ConstructionError::InvalidPin), Pin::new("13790"));
        assert_eq!(Err(ConstructionError::InvalidPin), Pin::new("137a"));
        assert_eq!(Err(ConstructionError::InvalidPin), Pin::new(""));
    }

    #[test]
    fn test_pin_pack() {
        let pin = Pin::new("1379").unwrap();
        assert_eq!([0x31, 0x97], pin.pack());
        assert_eq!(Some(pin), Pin::unpack([0x31, 0x97]));

        // any nibble above 9 is rejected
        assert_eq!(None, Pin::unpack([0x3A, 0x97]));
        assert_eq!(None, Pin::unpack([0x31, 0xF7]));
    }
}
