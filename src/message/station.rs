//! Base-station traffic
//!
//! Base-station frames answer keypad requests. They are addressed with
//! the *keypad's* serial in the frame header and carry their own
//! identity, the sequence counter, and an info-type tag in a
//! six-byte footer after the checksum. Status-flavored footers hold the
//! packed base-station serial; menu-flavored footers are a fixed filler
//! pattern.

use std::fmt;

use strum::EnumMessage;

use super::fields::{Sequence, SerialNumber, StationSerial};
use super::keypad;
use crate::wire::{self, DeviceClass};

/// Message-type byte of a direct response
pub(crate) const MSG_TYPE_RESPONSE: u8 = 0x01;

/// Footer info nibble of status-flavored traffic
pub(crate) const INFO_STATUS: u8 = 0x2;

/// Footer info nibble of menu-flavored traffic
pub(crate) const INFO_MENU: u8 = 0x6;

/// Footer body of menu-flavored traffic
pub(crate) const MENU_FOOTER_BODY: [u8; 5] = [0xFF; 5];

// wire values differ between the disarm and menu flows
const DISARM_VALID: u8 = 0x4E;
const DISARM_INVALID: u8 = 0x01;
const MENU_VALID: u8 = 0x00;
const MENU_INVALID: u8 = 0x01;

/// Base station's verdict on an entered PIN
///
/// The wire value differs between the disarm and menu flows; this enum
/// is the flow-independent meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum PinResponse {
    /// PIN accepted
    #[strum(detailed_message = "valid")]
    Valid,

    /// PIN rejected
    #[strum(detailed_message = "invalid")]
    Invalid,
}

impl PinResponse {
    /// Human-readable verdict
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    pub(crate) fn disarm_wire(self) -> u8 {
        match self {
            PinResponse::Valid => DISARM_VALID,
            PinResponse::Invalid => DISARM_INVALID,
        }
    }

    pub(crate) fn from_disarm_wire(value: u8) -> Result<Self, u8> {
        match value {
            DISARM_VALID => Ok(PinResponse::Valid),
            DISARM_INVALID => Ok(PinResponse::Invalid),
            other => Err(other),
        }
    }

    pub(crate) fn menu_wire(self) -> u8 {
        match self {
            PinResponse::Valid => MENU_VALID,
            PinResponse::Invalid => MENU_INVALID,
        }
    }

    pub(crate) fn from_menu_wire(value: u8) -> Result<Self, u8> {
        match value {
            MENU_VALID => Ok(PinResponse::Valid),
            MENU_INVALID => Ok(PinResponse::Invalid),
            other => Err(other),
        }
    }
}

impl fmt::Display for PinResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

/// Base station's answer to a disarm PIN entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisarmPinResponse {
    keypad_serial: SerialNumber,
    sequence: Sequence,
    station_serial: StationSerial,
    response: PinResponse,
}

impl DisarmPinResponse {
    /// New message; fields are pre-validated by their types
    pub fn new(
        keypad_serial: SerialNumber,
        sequence: Sequence,
        station_serial: StationSerial,
        response: PinResponse,
    ) -> Self {
        Self {
            keypad_serial,
            sequence,
            station_serial,
            response,
        }
    }

    /// Serial of the keypad being answered
    pub fn keypad_serial(&self) -> SerialNumber {
        self.keypad_serial
    }

    /// Base station's transmission sequence counter
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Responding base station's serial
    pub fn station_serial(&self) -> StationSerial {
        self.station_serial
    }

    /// The verdict
    pub fn response(&self) -> PinResponse {
        self.response
    }

    /// The four payload bytes
    pub(crate) fn payload(&self) -> [u8; 4] {
        [
            DeviceClass::BaseStation as u8,
            MSG_TYPE_RESPONSE,
            self.response.disarm_wire(),
            keypad::EVENT_DISARM_PIN,
        ]
    }

    /// The six footer bytes
    pub(crate) fn footer(&self) -> [u8; wire::FOOTER_LEN] {
        let body = self.station_serial.pack();
        [
            body[0],
            body[1],
            body[2],
            body[3],
            body[4],
            (self.sequence.value() << 4) | INFO_STATUS,
        ]
    }
}

impl fmt::Display for DisarmPinResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base station {} to keypad {} (seq {}): disarm PIN {}",
            self.station_serial, self.keypad_serial, self.sequence, self.response
        )
    }
}

/// Base station's answer to a settings-menu PIN entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MenuPinResponse {
    keypad_serial: SerialNumber,
    sequence: Sequence,
    response: PinResponse,
}

impl MenuPinResponse {
    /// New message; fields are pre-validated by their types
    pub fn new(keypad_serial: SerialNumber, sequence: Sequence, response: PinResponse) -> Self {
        Self {
            keypad_serial,
            sequence,
            response,
        }
    }

    /// Serial of the keypad being answered
    pub fn keypad_serial(&self) -> SerialNumber {
        self.keypad_serial
    }

    /// Base station's transmission sequence counter
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// The verdict
    pub fn response(&self) -> PinResponse {
        self.response
    }

    /// The four payload bytes
    pub(crate) fn payload(&self) -> [u8; 4] {
        [
            DeviceClass::BaseStation as u8,
            MSG_TYPE_RESPONSE,
            self.response.menu_wire(),
            keypad::EVENT_MENU_PIN,
        ]
    }

    /// The six footer bytes
    pub(crate) fn footer(&self) -> [u8; wire::FOOTER_LEN] {
        [
            MENU_FOOTER_BODY[0],
            MENU_FOOTER_BODY[1],
            MENU_FOOTER_BODY[2],
            MENU_FOOTER_BODY[3],
            MENU_FOOTER_BODY[4],
            (self.sequence.value() << 4) | INFO_MENU,
        ]
    }
}

impl fmt::Display for MenuPinResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base station to keypad {} (seq {}): menu PIN {}",
            self.keypad_serial, self.sequence, self.response
        )
    }
}
