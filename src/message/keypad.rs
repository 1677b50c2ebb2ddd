//! Keypad traffic
//!
//! Keypads transmit two payload shapes: a three-byte command frame for
//! button presses and mode changes, and a seven-byte frame for PIN
//! entry. Both tag the sequence byte's low nibble with a fixed keypad
//! marker.

use std::convert::TryFrom;
use std::fmt;

use strum::EnumMessage;

use super::fields::{Pin, Sequence, SerialNumber};
use crate::wire::DeviceClass;

/// Fixed low-nibble tag in every keypad sequence byte
pub(crate) const SEQUENCE_TAG: u8 = 0x4;

/// Fixed trailer bytes after the packed PIN digits
pub(crate) const PIN_TRAILER: [u8; 2] = [0x0F, 0xF0];

/// Event byte of a disarm PIN entry
pub(crate) const EVENT_DISARM_PIN: u8 = 0x51;

/// Event byte of a new-PIN entry (PIN change flow)
pub(crate) const EVENT_NEW_PIN: u8 = 0x62;

/// Event byte of a settings-menu PIN entry
pub(crate) const EVENT_MENU_PIN: u8 = 0x66;

/// Keypad command event
///
/// The simple request family: one event byte, no further payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u8)]
pub enum KeypadCommand {
    /// Ask the base station for full system status
    #[strum(detailed_message = "extended status request")]
    ExtendedStatusRequest = 0x11,

    /// Enter sensor test mode
    #[strum(detailed_message = "test mode on")]
    TestModeOn = 0x13,

    /// Arm in home mode
    #[strum(detailed_message = "home")]
    Home = 0x53,

    /// Panic alarm
    #[strum(detailed_message = "panic")]
    Panic = 0x54,

    /// Arm in away mode
    #[strum(detailed_message = "away")]
    Away = 0x56,

    /// Disarm (PIN entry follows separately)
    #[strum(detailed_message = "off")]
    Off = 0x5C,

    /// Leave sensor test mode
    #[strum(detailed_message = "test mode off")]
    TestModeOff = 0x5E,

    /// Open the settings menu
    #[strum(detailed_message = "enter menu")]
    EnterMenu = 0x61,

    /// Leave the settings menu
    #[strum(detailed_message = "exit menu")]
    ExitMenu = 0x64,
}

impl KeypadCommand {
    /// Human-readable command name
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }
}

impl TryFrom<u8> for KeypadCommand {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        use KeypadCommand::*;
        match value {
            0x11 => Ok(ExtendedStatusRequest),
            0x13 => Ok(TestModeOn),
            0x53 => Ok(Home),
            0x54 => Ok(Panic),
            0x56 => Ok(Away),
            0x5C => Ok(Off),
            0x5E => Ok(TestModeOff),
            0x61 => Ok(EnterMenu),
            0x64 => Ok(ExitMenu),
            other => Err(other),
        }
    }
}

impl fmt::Display for KeypadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

/// Keypad button-press / mode-change request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeypadCommandMessage {
    serial: SerialNumber,
    sequence: Sequence,
    command: KeypadCommand,
}

impl KeypadCommandMessage {
    /// New message; fields are pre-validated by their types
    pub fn new(serial: SerialNumber, sequence: Sequence, command: KeypadCommand) -> Self {
        Self {
            serial,
            sequence,
            command,
        }
    }

    /// Transmitting keypad's serial number
    pub fn serial(&self) -> SerialNumber {
        self.serial
    }

    /// Transmission sequence counter
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Requested command
    pub fn command(&self) -> KeypadCommand {
        self.command
    }

    /// The three payload bytes
    pub(crate) fn payload(&self) -> [u8; 3] {
        [
            DeviceClass::Keypad as u8,
            (self.sequence.value() << 4) | SEQUENCE_TAG,
            self.command as u8,
        ]
    }
}

impl fmt::Display for KeypadCommandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keypad {} (seq {}): {}",
            self.serial, self.sequence, self.command
        )
    }
}

/// Keypad PIN entry
///
/// The same payload shape serves the disarm, settings-menu, and
/// PIN-change request flavors, distinguished only by the event byte,
/// which the enclosing [`Message`](super::Message) variant selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeypadPinMessage {
    serial: SerialNumber,
    sequence: Sequence,
    pin: Pin,
}

impl KeypadPinMessage {
    /// New message; fields are pre-validated by their types
    pub fn new(serial: SerialNumber, sequence: Sequence, pin: Pin) -> Self {
        Self {
            serial,
            sequence,
            pin,
        }
    }

    /// Transmitting keypad's serial number
    pub fn serial(&self) -> SerialNumber {
        self.serial
    }

    /// Transmission sequence counter
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// The entered PIN
    pub fn pin(&self) -> Pin {
        self.pin
    }

    /// The seven payload bytes, completed with the given event byte
    pub(crate) fn payload(&self, event: u8) -> [u8; 7] {
        let pin = self.pin.pack();
        [
            DeviceClass::Keypad as u8,
            (self.sequence.value() << 4) | SEQUENCE_TAG,
            pin[0],
            pin[1],
            PIN_TRAILER[0],
            PIN_TRAILER[1],
            event,
        ]
    }
}

impl fmt::Display for KeypadPinMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keypad {} (seq {}): PIN entry", self.serial, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_command_bytes_round_trip() {
        for cmd in KeypadCommand::iter() {
            assert_eq!(Ok(cmd), KeypadCommand::try_from(cmd as u8));
        }
        assert_eq!(Err(0x44), KeypadCommand::try_from(0x44));
    }

    #[test]
    fn test_command_payload() {
        let msg = KeypadCommandMessage::new(
            SerialNumber::new("12345").unwrap(),
            Sequence::new(0x9).unwrap(),
            KeypadCommand::Away,
        );
        assert_eq!([0x01, 0x94, 0x56], msg.payload());
    }

    #[test]
    fn test_pin_payload() {
        let msg = KeypadPinMessage::new(
            SerialNumber::new("159MP").unwrap(),
            Sequence::new(0x3).unwrap(),
            Pin::new("1379").unwrap(),
        );
        assert_eq!(
            [0x01, 0x34, 0x31, 0x97, 0x0F, 0xF0, EVENT_DISARM_PIN],
            msg.payload(EVENT_DISARM_PIN)
        );
    }
}
