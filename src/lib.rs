//! # ookguard: security-system OOK radio codec
//!
//! This crate decodes and synthesizes the unencrypted on-off-keying
//! radio protocol spoken by a consumer security-system product line:
//! entry sensors, motion sensors, keychain remotes, keypads, and the
//! base station. It turns raw waveform edge timings captured from a
//! radio receiver into typed protocol [`Message`]s, and performs the
//! inverse transformation to synthesize valid transmittable waveforms
//! for any emulated device.
//!
//! The protocol was reverse-engineered from production hardware. It has
//! no encryption and no authentication; anyone with a $5 receiver can
//! decode it, which is exactly what makes it useful for integrating
//! these devices into your own home automation. Only operate on radio
//! traffic you are authorized to capture and emit.
//!
//! ## Decoding
//!
//! Obtain *pulses* (carrier level plus duration in microseconds) from
//! your radio hardware. Getting them is beyond the scope of this crate:
//! a GPIO edge timer on a receiver board works, as does any SDR that
//! can produce OOK edge timings. Feed them to an [`OokReceiver`]:
//!
//! ```
//! use ookguard::{FrameOut, OokReceiver, PulseTimings};
//!
//! # let captured_pulses = Vec::new();
//! let mut rx = OokReceiver::new(PulseTimings::default());
//! for event in rx.iter(captured_pulses) {
//!     match event {
//!         FrameOut::Ready(Ok(msg)) => println!("decoded: {}", msg),
//!         FrameOut::Ready(Err(err)) => eprintln!("undecodable frame: {}", err),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Shared-spectrum interference is expected and harmless: an
//! out-of-tolerance pulse costs at most the frame it interrupted, and
//! scanning resumes immediately. "No message this cycle" is the normal
//! state of a quiet channel, not an error.
//!
//! ## Encoding
//!
//! Messages are built from validated field types and serialized to a
//! complete transmit waveform, ready for any [`Transceiver`] backend:
//!
//! ```
//! use ookguard::{
//!     transmission, EntrySensorEvent, EntrySensorMessage, Message, OokReceiver,
//!     Sequence, SerialNumber,
//! };
//!
//! // a door sensor reporting "open"
//! let msg = Message::EntrySensor(EntrySensorMessage::new(
//!     SerialNumber::new("123AZ")?,
//!     Sequence::new(0x0)?,
//!     EntrySensorEvent::Open,
//! ));
//!
//! // the waveform an emulated sensor would radiate, which decodes
//! // back to the original, once per on-air frame repeat
//! let pulses = transmission(&msg);
//! let mut rx = OokReceiver::default();
//! let decoded: Vec<_> = rx.messages(pulses).collect();
//! assert_eq!(vec![Ok(msg.clone()), Ok(msg)], decoded);
//! # Ok::<(), ookguard::ConstructionError>(())
//! ```
//!
//! ## Layering
//!
//! * [`PulseDecoder`] classifies pulse widths against calibrated
//!   [tolerance bands](PulseTimings) and recognizes the preamble.
//! * [`Framer`] packs bit symbols into frames, sizes them from the
//!   [frame discriminator](wire), and validates nothing itself: it
//!   hands complete frames to the message layer.
//! * [`Message`] owns the per-device-class field layout: checksum,
//!   serial addressing, sequence counters, events, PIN payloads.
//!
//! The codec is a pure transformation pipeline: no I/O, no blocking, no
//! shared state. Hardware lives behind the two-method [`Transceiver`]
//! capability, and per-device sequence counters belong to the caller;
//! the codec only reads and writes the field.

pub mod waveform;
pub mod wire;

mod framing;
mod message;
mod pulse;
mod receiver;
mod transceiver;

pub use framing::{transmission, FrameOut, Framer};
pub use message::{
    ConstructionError, DecodeError, DisarmPinResponse, EntrySensorEvent, EntrySensorMessage,
    KeychainRemoteEvent, KeychainRemoteMessage, KeypadCommand, KeypadCommandMessage,
    KeypadPinMessage, MenuPinResponse, Message, MotionSensorEvent, MotionSensorMessage, Pin,
    PinResponse, Sequence, SerialNumber, StationSerial, UnknownFrame,
};
pub use pulse::{encode_bits, BitSymbol, Pulse, PulseDecoder, PulseLevel, SymbolIter};
pub use receiver::{OokReceiver, SourceIter};
pub use transceiver::{recv_message, send_message, Transceiver};
pub use waveform::PulseTimings;
pub use wire::DeviceClass;
