//! Sensor and keychain-remote traffic
//!
//! The simplest frames in the protocol: two payload bytes carrying the
//! device class, the sequence counter, and one event byte. Sensors are
//! transmit-only devices; they never listen.

use std::convert::TryFrom;
use std::fmt;

use strum::EnumMessage;

use super::fields::{Sequence, SerialNumber};
use crate::wire::DeviceClass;

/// Entry-sensor event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u8)]
pub enum EntrySensorEvent {
    /// Door or window opened
    #[strum(detailed_message = "open")]
    Open = 0x01,

    /// Door or window closed
    #[strum(detailed_message = "closed")]
    Closed = 0x02,
}

/// Motion-sensor event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u8)]
pub enum MotionSensorEvent {
    /// Periodic supervisory heartbeat
    #[strum(detailed_message = "heartbeat")]
    Heartbeat = 0x00,

    /// Motion detected
    #[strum(detailed_message = "motion")]
    Motion = 0x02,
}

/// Keychain-remote button event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[repr(u8)]
pub enum KeychainRemoteEvent {
    /// Panic button
    #[strum(detailed_message = "panic")]
    Panic = 0x01,

    /// Arm away
    #[strum(detailed_message = "away")]
    Away = 0x02,

    /// Disarm
    #[strum(detailed_message = "off")]
    Off = 0x03,
}

macro_rules! event_byte_enum {
    ($name:ident { $($variant:ident),+ }) => {
        impl $name {
            /// Human-readable event name
            pub fn as_display_str(&self) -> &'static str {
                self.get_detailed_message().expect("missing definition")
            }
        }

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, u8> {
                $(
                    if value == $name::$variant as u8 {
                        return Ok($name::$variant);
                    }
                )+
                Err(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.as_display_str().fmt(f)
            }
        }
    };
}

event_byte_enum!(EntrySensorEvent { Open, Closed });
event_byte_enum!(MotionSensorEvent { Heartbeat, Motion });
event_byte_enum!(KeychainRemoteEvent { Panic, Away, Off });

macro_rules! sensor_message {
    ($(#[$doc:meta])* $name:ident, $event:ident, $class:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            serial: SerialNumber,
            sequence: Sequence,
            event: $event,
        }

        impl $name {
            pub(crate) const CLASS: DeviceClass = $class;

            /// New message; fields are pre-validated by their types
            pub fn new(serial: SerialNumber, sequence: Sequence, event: $event) -> Self {
                Self {
                    serial,
                    sequence,
                    event,
                }
            }

            /// Transmitting device's serial number
            pub fn serial(&self) -> SerialNumber {
                self.serial
            }

            /// Transmission sequence counter
            pub fn sequence(&self) -> Sequence {
                self.sequence
            }

            /// Reported event
            pub fn event(&self) -> $event {
                self.event
            }

            /// The two payload bytes
            pub(crate) fn payload(&self) -> [u8; 2] {
                [
                    (self.sequence.value() << 4) | Self::CLASS as u8,
                    self.event as u8,
                ]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{} {} (seq {}): {}",
                    Self::CLASS,
                    self.serial,
                    self.sequence,
                    self.event
                )
            }
        }
    };
}

sensor_message!(
    /// Door/window sensor report
    EntrySensorMessage,
    EntrySensorEvent,
    DeviceClass::EntrySensor
);

sensor_message!(
    /// Motion sensor report
    MotionSensorMessage,
    MotionSensorEvent,
    DeviceClass::MotionSensor
);

sensor_message!(
    /// Keychain remote button press
    KeychainRemoteMessage,
    KeychainRemoteEvent,
    DeviceClass::KeychainRemote
);
