//! Typed protocol messages and the frame codec
//!
//! [`Message`] is the closed set of frame interpretations this crate
//! understands. [`Message::parse`] turns a complete raw frame into a
//! variant (or a classified [`DecodeError`]); [`Message::serialize`] is
//! the structural inverse and cannot fail, because every field type
//! validates its domain at construction.
//!
//! The round-trip law holds for every constructible message `m`:
//! `Message::parse(&m.serialize()) == Ok(m)`.
//!
//! Frames whose outer structure is valid (vendor code, length code,
//! checksum) but whose class structure is unmodeled decode to
//! [`Message::Unknown`], preserving the raw bytes for traffic
//! monitoring. Frames whose length code is itself unknown surface as
//! [`DecodeError::UnrecognizedFormat`], also carrying the bytes, never
//! silently dropped.

mod fields;
mod keypad;
mod sensor;
mod station;

pub use fields::{ConstructionError, Pin, Sequence, SerialNumber, StationSerial};
pub use keypad::{KeypadCommand, KeypadCommandMessage, KeypadPinMessage};
pub use sensor::{
    EntrySensorEvent, EntrySensorMessage, KeychainRemoteEvent, KeychainRemoteMessage,
    MotionSensorEvent, MotionSensorMessage,
};
pub use station::{DisarmPinResponse, MenuPinResponse, PinResponse};

use std::convert::TryFrom;
use std::fmt;

use thiserror::Error;

use crate::wire::{self, DeviceClass};

// payload length codes of the modeled message classes
const PLC_SENSOR: u8 = 0x11;
const PLC_KEYPAD_COMMAND: u8 = 0x22;
const PLC_STATION_RESPONSE: u8 = 0x33;
const PLC_KEYPAD_PIN: u8 = 0x66;

/// Error decoding a raw frame
///
/// Every variant is recoverable and local to one frame attempt; no
/// decode failure ever halts a monitoring loop.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// Frame ended before the minimum parseable length
    #[error("frame shorter than the minimum parseable length")]
    TooShort,

    /// Vendor code or length code is not one the protocol defines.
    /// The raw bytes are carried for traffic monitoring.
    #[error("unrecognized frame format ({} bytes)", .0.len())]
    UnrecognizedFormat(Vec<u8>),

    /// Frame is structurally complete but its checksum does not match
    #[error("checksum mismatch: received {received:#04X}, computed {computed:#04X}")]
    ChecksumMismatch {
        /// Checksum byte carried by the frame
        received: u8,
        /// Checksum computed over the received payload
        computed: u8,
    },

    /// A decoded field's value is outside its defined domain
    #[error("invalid {field} field")]
    InvalidField {
        /// Which field was rejected
        field: &'static str,
    },
}

/// A checksum-valid frame of a class this crate does not model
///
/// Surfaced instead of being dropped so that traffic monitors see the
/// whole channel. Serializes back to the identical bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownFrame {
    bytes: Vec<u8>,
}

impl UnknownFrame {
    fn new(frame: &[u8]) -> Self {
        Self {
            bytes: frame.to_vec(),
        }
    }

    /// The complete raw frame, checksum and footer included
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The frame's payload length code
    pub fn length_code(&self) -> u8 {
        self.bytes[wire::OFFSET_PLC]
    }

    /// The five raw serial-number bytes
    pub fn serial_bytes(&self) -> &[u8] {
        &self.bytes[wire::OFFSET_SERIAL..wire::OFFSET_SERIAL + wire::SERIAL_LEN]
    }
}

/// A decoded protocol message
///
/// The closed set of frame interpretations. New device classes extend
/// this enum and the dispatch tables in this module; there is no
/// open-ended dynamic dispatch anywhere in the codec.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    /// Door/window sensor report
    EntrySensor(EntrySensorMessage),

    /// Motion sensor report
    MotionSensor(MotionSensorMessage),

    /// Keychain remote button press
    KeychainRemote(KeychainRemoteMessage),

    /// Keypad button-press / mode-change request
    KeypadCommand(KeypadCommandMessage),

    /// Keypad PIN entry to disarm the system
    KeypadDisarmPinRequest(KeypadPinMessage),

    /// Keypad PIN entry to open the settings menu
    KeypadMenuPinRequest(KeypadPinMessage),

    /// Keypad PIN entry setting a new PIN
    KeypadNewPinRequest(KeypadPinMessage),

    /// Base station's answer to a disarm PIN entry
    DisarmPinResponse(DisarmPinResponse),

    /// Base station's answer to a settings-menu PIN entry
    MenuPinResponse(MenuPinResponse),

    /// Checksum-valid frame of an unmodeled class, kept raw
    Unknown(UnknownFrame),
}

impl Message {
    /// Decode a complete raw frame
    ///
    /// `frame` must be exactly one frame: header, payload, checksum,
    /// and footer where the class carries one. The checksum is
    /// validated before any field is interpreted.
    ///
    /// ```
    /// use ookguard::{EntrySensorEvent, Message};
    ///
    /// const FRAME: &[u8] = &[
    ///     0xCC, 0x05, 0x11, b'1', b'2', b'3', b'A', b'Z', 0x05, 0x01, 0x06,
    /// ];
    ///
    /// match Message::parse(FRAME).unwrap() {
    ///     Message::EntrySensor(msg) => {
    ///         assert_eq!("123AZ", msg.serial().as_str());
    ///         assert_eq!(EntrySensorEvent::Open, msg.event());
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn parse(frame: &[u8]) -> Result<Message, DecodeError> {
        if frame.len() < wire::MIN_FRAME_LEN {
            return Err(DecodeError::TooShort);
        }

        let vendor = u16::from_be_bytes([frame[0], frame[1]]);
        if vendor != wire::VENDOR_CODE {
            return Err(DecodeError::UnrecognizedFormat(frame.to_vec()));
        }

        let plc = frame[wire::OFFSET_PLC];
        let n = wire::payload_len(plc)
            .ok_or_else(|| DecodeError::UnrecognizedFormat(frame.to_vec()))?;
        let origin = frame[wire::OFFSET_PAYLOAD];
        let expected_len = wire::frame_len(plc, origin)
            .ok_or_else(|| DecodeError::UnrecognizedFormat(frame.to_vec()))?;
        if frame.len() < expected_len {
            return Err(DecodeError::TooShort);
        }
        if frame.len() != expected_len {
            return Err(DecodeError::UnrecognizedFormat(frame.to_vec()));
        }

        // checksum comes before any field interpretation
        let payload = &frame[wire::OFFSET_PAYLOAD..wire::OFFSET_PAYLOAD + n];
        let received = frame[wire::OFFSET_PAYLOAD + n];
        let computed = wire::checksum(payload);
        if received != computed {
            return Err(DecodeError::ChecksumMismatch { received, computed });
        }
        let footer = &frame[wire::OFFSET_PAYLOAD + n + 1..];

        match plc {
            PLC_SENSOR => {
                let sequence = Sequence::from_nibble(payload[0] >> 4);
                match DeviceClass::try_from(payload[0] & 0xF) {
                    Ok(DeviceClass::EntrySensor) => {
                        let serial = decode_serial(frame)?;
                        let event = EntrySensorEvent::try_from(payload[1])
                            .map_err(|_| invalid("entry sensor event"))?;
                        Ok(Message::EntrySensor(EntrySensorMessage::new(
                            serial, sequence, event,
                        )))
                    }
                    Ok(DeviceClass::MotionSensor) => {
                        let serial = decode_serial(frame)?;
                        let event = MotionSensorEvent::try_from(payload[1])
                            .map_err(|_| invalid("motion sensor event"))?;
                        Ok(Message::MotionSensor(MotionSensorMessage::new(
                            serial, sequence, event,
                        )))
                    }
                    Ok(DeviceClass::KeychainRemote) => {
                        let serial = decode_serial(frame)?;
                        let event = KeychainRemoteEvent::try_from(payload[1])
                            .map_err(|_| invalid("keychain remote event"))?;
                        Ok(Message::KeychainRemote(KeychainRemoteMessage::new(
                            serial, sequence, event,
                        )))
                    }
                    _ => Ok(Message::Unknown(UnknownFrame::new(frame))),
                }
            }

            PLC_KEYPAD_COMMAND => {
                if origin != DeviceClass::Keypad as u8 {
                    return Ok(Message::Unknown(UnknownFrame::new(frame)));
                }
                let serial = decode_serial(frame)?;
                let sequence = decode_keypad_sequence(payload[1])?;
                let command = KeypadCommand::try_from(payload[2])
                    .map_err(|_| invalid("keypad command"))?;
                Ok(Message::KeypadCommand(KeypadCommandMessage::new(
                    serial, sequence, command,
                )))
            }

            PLC_KEYPAD_PIN => {
                if origin != DeviceClass::Keypad as u8 {
                    return Ok(Message::Unknown(UnknownFrame::new(frame)));
                }
                let serial = decode_serial(frame)?;
                let sequence = decode_keypad_sequence(payload[1])?;
                if payload[4..6] != keypad::PIN_TRAILER {
                    return Err(invalid("PIN trailer"));
                }
                let pin =
                    Pin::unpack([payload[2], payload[3]]).ok_or_else(|| invalid("PIN digits"))?;
                let request = KeypadPinMessage::new(serial, sequence, pin);
                match payload[6] {
                    keypad::EVENT_DISARM_PIN => Ok(Message::KeypadDisarmPinRequest(request)),
                    keypad::EVENT_MENU_PIN => Ok(Message::KeypadMenuPinRequest(request)),
                    keypad::EVENT_NEW_PIN => Ok(Message::KeypadNewPinRequest(request)),
                    _ => Err(invalid("PIN event")),
                }
            }

            PLC_STATION_RESPONSE => {
                if origin != DeviceClass::BaseStation as u8 {
                    // keypad menu-navigation frames share this length code
                    return Ok(Message::Unknown(UnknownFrame::new(frame)));
                }
                let tail = footer[wire::FOOTER_LEN - 1];
                let sequence = Sequence::from_nibble(tail >> 4);
                match (payload[1], tail & 0xF, payload[3]) {
                    (station::MSG_TYPE_RESPONSE, station::INFO_STATUS, keypad::EVENT_DISARM_PIN) => {
                        let serial = decode_serial(frame)?;
                        let response = PinResponse::from_disarm_wire(payload[2])
                            .map_err(|_| invalid("disarm response"))?;
                        let station_serial = StationSerial::unpack(&footer[0..5]);
                        Ok(Message::DisarmPinResponse(DisarmPinResponse::new(
                            serial,
                            sequence,
                            station_serial,
                            response,
                        )))
                    }
                    (station::MSG_TYPE_RESPONSE, station::INFO_MENU, keypad::EVENT_MENU_PIN) => {
                        let serial = decode_serial(frame)?;
                        if footer[0..5] != station::MENU_FOOTER_BODY {
                            return Err(invalid("menu footer"));
                        }
                        let response = PinResponse::from_menu_wire(payload[2])
                            .map_err(|_| invalid("menu response"))?;
                        Ok(Message::MenuPinResponse(MenuPinResponse::new(
                            serial, sequence, response,
                        )))
                    }
                    _ => Ok(Message::Unknown(UnknownFrame::new(frame))),
                }
            }

            _ => Ok(Message::Unknown(UnknownFrame::new(frame))),
        }
    }

    /// Encode this message as a complete raw frame
    ///
    /// Total: construction already validated every field, so there is
    /// nothing left to fail.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Message::EntrySensor(m) => {
                build_frame(PLC_SENSOR, m.serial(), &m.payload(), &[])
            }
            Message::MotionSensor(m) => {
                build_frame(PLC_SENSOR, m.serial(), &m.payload(), &[])
            }
            Message::KeychainRemote(m) => {
                build_frame(PLC_SENSOR, m.serial(), &m.payload(), &[])
            }
            Message::KeypadCommand(m) => {
                build_frame(PLC_KEYPAD_COMMAND, m.serial(), &m.payload(), &[])
            }
            Message::KeypadDisarmPinRequest(m) => build_frame(
                PLC_KEYPAD_PIN,
                m.serial(),
                &m.payload(keypad::EVENT_DISARM_PIN),
                &[],
            ),
            Message::KeypadMenuPinRequest(m) => build_frame(
                PLC_KEYPAD_PIN,
                m.serial(),
                &m.payload(keypad::EVENT_MENU_PIN),
                &[],
            ),
            Message::KeypadNewPinRequest(m) => build_frame(
                PLC_KEYPAD_PIN,
                m.serial(),
                &m.payload(keypad::EVENT_NEW_PIN),
                &[],
            ),
            Message::DisarmPinResponse(m) => build_frame(
                PLC_STATION_RESPONSE,
                m.keypad_serial(),
                &m.payload(),
                &m.footer(),
            ),
            Message::MenuPinResponse(m) => build_frame(
                PLC_STATION_RESPONSE,
                m.keypad_serial(),
                &m.payload(),
                &m.footer(),
            ),
            Message::Unknown(u) => u.bytes().to_vec(),
        }
    }

    /// Class of the transmitting device, when it is known
    ///
    /// Determines the transmit sync-train profile. `None` for
    /// [`Message::Unknown`].
    pub fn device_class(&self) -> Option<DeviceClass> {
        match self {
            Message::EntrySensor(_) => Some(DeviceClass::EntrySensor),
            Message::MotionSensor(_) => Some(DeviceClass::MotionSensor),
            Message::KeychainRemote(_) => Some(DeviceClass::KeychainRemote),
            Message::KeypadCommand(_)
            | Message::KeypadDisarmPinRequest(_)
            | Message::KeypadMenuPinRequest(_)
            | Message::KeypadNewPinRequest(_) => Some(DeviceClass::Keypad),
            Message::DisarmPinResponse(_) | Message::MenuPinResponse(_) => {
                Some(DeviceClass::BaseStation)
            }
            Message::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::EntrySensor(m) => m.fmt(f),
            Message::MotionSensor(m) => m.fmt(f),
            Message::KeychainRemote(m) => m.fmt(f),
            Message::KeypadCommand(m) => m.fmt(f),
            Message::KeypadDisarmPinRequest(m) => write!(f, "{} (disarm)", m),
            Message::KeypadMenuPinRequest(m) => write!(f, "{} (menu)", m),
            Message::KeypadNewPinRequest(m) => write!(f, "{} (new PIN)", m),
            Message::DisarmPinResponse(m) => m.fmt(f),
            Message::MenuPinResponse(m) => m.fmt(f),
            Message::Unknown(u) => {
                write!(f, "unknown frame ({} bytes)", u.bytes().len())
            }
        }
    }
}

#[inline]
fn invalid(field: &'static str) -> DecodeError {
    DecodeError::InvalidField { field }
}

fn decode_serial(frame: &[u8]) -> Result<SerialNumber, DecodeError> {
    SerialNumber::from_wire(&frame[wire::OFFSET_SERIAL..wire::OFFSET_SERIAL + wire::SERIAL_LEN])
        .ok_or_else(|| invalid("serial number"))
}

fn decode_keypad_sequence(byte: u8) -> Result<Sequence, DecodeError> {
    if byte & 0xF != keypad::SEQUENCE_TAG {
        return Err(invalid("sequence tag"));
    }
    Ok(Sequence::from_nibble(byte >> 4))
}

fn build_frame(plc: u8, serial: SerialNumber, payload: &[u8], footer: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(wire::OFFSET_PAYLOAD + payload.len() + 1 + footer.len());
    out.extend_from_slice(&wire::VENDOR_CODE.to_be_bytes());
    out.push(plc);
    out.extend_from_slice(serial.as_wire());
    out.extend_from_slice(payload);
    out.push(wire::checksum(payload));
    out.extend_from_slice(footer);
    out
}
