//! Frame assembly from bit symbols, and transmit waveform synthesis
//!
//! The [`Framer`] is a small state machine: it waits for a
//! [`Preamble`](BitSymbol::Preamble), packs data bits LSB-first into
//! bytes, resolves the frame's total length from the discriminator
//! header, and hands complete frames to
//! [`Message::parse`](crate::Message::parse).
//!
//! An [`Invalid`](BitSymbol::Invalid) symbol kills only the frame
//! attempt in progress; the framer re-enters its scanning state with the
//! very next symbol, so a noise burst costs at most one frame.
//!
//! Frames whose length code is unknown cannot be sized, so the framer
//! reads them out to the protocol's maximum frame length (or until the
//! transmission dies) and surfaces whatever it banked, which is what
//! keeps unmodeled traffic visible to monitors.

use arrayvec::ArrayVec;

#[cfg(not(test))]
use log::{debug, info};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;

use crate::message::{DecodeError, Message};
use crate::pulse::{self, BitSymbol, Pulse, PulseLevel};
use crate::waveform;
use crate::wire::{self, DeviceClass};

// frame buffer, bounded by the protocol's maximum frame length
type FrameBuf = ArrayVec<u8, { wire::MAX_FRAME_LEN }>;

/// Framer output event
///
/// Every call to [`Framer::input`] yields one of these. `Searching` is
/// the normal "no message yet" state of an idle channel, not an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameOut {
    /// Waiting for a preamble
    Searching,

    /// Preamble seen; collecting frame bits
    Reading,

    /// An out-of-tolerance pulse killed the frame attempt.
    /// Scanning has already resumed.
    Aborted,

    /// A complete frame was collected and parsed
    Ready(Result<Message, DecodeError>),
}

impl FrameOut {
    /// True if a frame is being collected
    pub fn is_active(&self) -> bool {
        matches!(self, FrameOut::Reading)
    }

    /// Consume the event, returning the frame result if one is ready
    pub fn ready(self) -> Option<Result<Message, DecodeError>> {
        match self {
            FrameOut::Ready(res) => Some(res),
            _ => None,
        }
    }
}

// How much frame remains to be read
#[derive(Clone, Debug)]
enum Expect {
    // still reading the discriminator header
    Header,

    // known length code; read this many bytes total
    Total(usize),

    // unknown length code; read to the maximum and surface raw
    ToMax,
}

// Framer state
#[derive(Clone, Debug)]
enum State {
    // scanning for a preamble
    Searching,

    // collecting frame bits
    //
    // `bits` accumulates LSB-first; `nbits` counts bits banked so far
    Collecting {
        bits: u8,
        nbits: u8,
        frame: FrameBuf,
        expect: Expect,
    },
}

/// Assembles bit symbols into frames
///
/// One `Framer` serves one physical channel. It holds only the scan
/// position of that channel; framers are independent and need no
/// synchronization across channels.
#[derive(Clone, Debug)]
pub struct Framer {
    state: State,
}

impl Framer {
    /// New framer, scanning for a preamble
    pub fn new() -> Self {
        Self {
            state: State::Searching,
        }
    }

    /// Discard any frame in progress and resume scanning
    pub fn reset(&mut self) {
        self.state = State::Searching;
    }

    /// Handle one decoded bit symbol
    ///
    /// See [`FrameOut`] for the possible outcomes. A `Preamble`
    /// restarts collection even mid-frame; if an unknown-format frame
    /// was pending, it is surfaced first.
    pub fn input(&mut self, symbol: BitSymbol) -> FrameOut {
        match symbol {
            BitSymbol::Preamble => {
                let pending = self.end();
                debug!("framer: preamble; collecting");
                self.state = State::Collecting {
                    bits: 0,
                    nbits: 0,
                    frame: FrameBuf::new(),
                    expect: Expect::Header,
                };
                match pending {
                    FrameOut::Ready(_) => pending,
                    _ => FrameOut::Reading,
                }
            }

            BitSymbol::Invalid => {
                match std::mem::replace(&mut self.state, State::Searching) {
                    State::Collecting {
                        frame,
                        expect: Expect::ToMax,
                        ..
                    } if frame.len() >= wire::MIN_FRAME_LEN => {
                        // the transmission died mid-read, but an
                        // unknown-format frame is still worth surfacing
                        FrameOut::Ready(Message::parse(&frame))
                    }
                    State::Collecting { .. } => {
                        debug!("framer: aborted on out-of-tolerance pulse");
                        FrameOut::Aborted
                    }
                    State::Searching => FrameOut::Searching,
                }
            }

            BitSymbol::Zero | BitSymbol::One => {
                self.data_bit(symbol == BitSymbol::One)
            }
        }
    }

    /// Signal end of input
    ///
    /// Surfaces a pending unknown-format frame, if one was being read
    /// when the pulse source dried up. A partially-read known-length
    /// frame is simply discarded.
    pub fn end(&mut self) -> FrameOut {
        match std::mem::replace(&mut self.state, State::Searching) {
            State::Collecting {
                frame,
                expect: Expect::ToMax,
                ..
            } if frame.len() >= wire::MIN_FRAME_LEN => FrameOut::Ready(Message::parse(&frame)),
            _ => FrameOut::Searching,
        }
    }

    // Bank one data bit; finish the frame when it reaches full length
    fn data_bit(&mut self, bit: bool) -> FrameOut {
        let done = match &mut self.state {
            State::Searching => return FrameOut::Searching,
            State::Collecting {
                bits,
                nbits,
                frame,
                expect,
            } => {
                if bit {
                    *bits |= 1 << *nbits;
                }
                *nbits += 1;
                if *nbits < 8 {
                    return FrameOut::Reading;
                }

                let byte = std::mem::take(bits);
                *nbits = 0;
                if frame.try_push(byte).is_err() {
                    // buffer full; finalize with what we have
                    true
                } else {
                    if frame.len() == wire::MIN_FRAME_LEN {
                        let plc = frame[wire::OFFSET_PLC];
                        let origin = frame[wire::OFFSET_PAYLOAD];
                        *expect = match wire::frame_len(plc, origin) {
                            Some(total) => Expect::Total(total),
                            None => {
                                debug!(
                                    "framer: unknown length code {:#04X}; reading to max",
                                    plc
                                );
                                Expect::ToMax
                            }
                        };
                    }
                    match expect {
                        Expect::Total(total) => frame.len() == *total,
                        Expect::ToMax => frame.len() == wire::MAX_FRAME_LEN,
                        Expect::Header => false,
                    }
                }
            }
        };

        if done {
            self.finish()
        } else {
            FrameOut::Reading
        }
    }

    // Parse the collected frame and resume scanning
    fn finish(&mut self) -> FrameOut {
        match std::mem::replace(&mut self.state, State::Searching) {
            State::Collecting { frame, .. } => {
                info!("framer: frame complete ({} bytes)", frame.len());
                FrameOut::Ready(Message::parse(&frame))
            }
            State::Searching => FrameOut::Searching,
        }
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the complete transmit waveform for a message
///
/// Serializes the message, prepends the class-appropriate sync train
/// and start marker, appends the trailer bits, and repeats the burst
/// the way the production transmitters do: twice back-to-back for
/// component devices, three times with resync trains for the base
/// station. The output is ready for
/// [`Transceiver::emit`](crate::Transceiver::emit).
///
/// Receivers decode *every* burst, so one transmission yields one
/// message per repeat; de-duplication by sequence counter is receiver
/// policy.
pub fn transmission(msg: &Message) -> Vec<Pulse> {
    let frame = msg.serialize();

    let (sync_pairs, repeats, resync_pairs, station_trailer) = match msg.device_class() {
        Some(DeviceClass::BaseStation) => (
            waveform::STATION_SYNC_PAIRS,
            waveform::STATION_FRAME_REPEATS,
            waveform::STATION_RESYNC_PAIRS,
            true,
        ),
        Some(DeviceClass::Keypad) => (
            waveform::KEYPAD_SYNC_PAIRS,
            waveform::COMPONENT_FRAME_REPEATS,
            0,
            false,
        ),
        _ => (
            waveform::SENSOR_SYNC_PAIRS,
            waveform::COMPONENT_FRAME_REPEATS,
            0,
            false,
        ),
    };

    // frame bits, LSB first, plus the burst trailer
    let mut bits = Vec::with_capacity(frame.len() * 8 + 8);
    for byte in &frame {
        for i in 0..8 {
            bits.push(byte & (1 << i) != 0);
        }
    }
    if station_trailer {
        bits.extend([true, true, false, false]);
    }
    bits.extend([true; 4]);

    let mut out = Vec::new();
    push_sync(&mut out, sync_pairs);
    for repeat in 0..repeats {
        if repeat > 0 && resync_pairs > 0 {
            push_sync(&mut out, resync_pairs);
        }
        out.push(Pulse::low(waveform::MARKER_US));
        out.push(Pulse::high(waveform::MARKER_US));
        out.extend(pulse::encode_bits(bits.iter().copied(), PulseLevel::Low));
    }
    out
}

// alternating one-bit-width pulses, low first
fn push_sync(out: &mut Vec<Pulse>, pairs: usize) {
    for _ in 0..pairs {
        out.push(Pulse::low(waveform::BIT_ONE_US));
        out.push(Pulse::high(waveform::BIT_ONE_US));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{EntrySensorEvent, EntrySensorMessage, Sequence, SerialNumber};
    use crate::pulse::PulseDecoder;

    fn entry_sensor() -> Message {
        Message::EntrySensor(EntrySensorMessage::new(
            SerialNumber::new("123AZ").unwrap(),
            Sequence::new(0x0).unwrap(),
            EntrySensorEvent::Open,
        ))
    }

    // symbols for one frame: preamble plus LSB-first data bits
    fn frame_symbols(frame: &[u8]) -> Vec<BitSymbol> {
        let mut syms = vec![BitSymbol::Preamble];
        for byte in frame {
            for i in 0..8 {
                syms.push(if byte & (1 << i) != 0 {
                    BitSymbol::One
                } else {
                    BitSymbol::Zero
                });
            }
        }
        syms
    }

    fn run(framer: &mut Framer, symbols: &[BitSymbol]) -> Vec<FrameOut> {
        symbols
            .iter()
            .map(|s| framer.input(*s))
            .filter(|out| !matches!(out, FrameOut::Searching | FrameOut::Reading))
            .collect()
    }

    #[test]
    fn test_known_frame_assembles() {
        let msg = entry_sensor();
        let mut framer = Framer::new();

        let outs = run(&mut framer, &frame_symbols(&msg.serialize()));
        assert_eq!(vec![FrameOut::Ready(Ok(msg))], outs);
    }

    #[test]
    fn test_invalid_aborts_then_recovers() {
        let msg = entry_sensor();
        let mut framer = Framer::new();

        // frame attempt dies on a bad pulse
        assert_eq!(FrameOut::Reading, framer.input(BitSymbol::Preamble));
        assert_eq!(FrameOut::Reading, framer.input(BitSymbol::One));
        assert_eq!(FrameOut::Aborted, framer.input(BitSymbol::Invalid));

        // data bits without a preamble are ignored
        assert_eq!(FrameOut::Searching, framer.input(BitSymbol::Zero));

        // the next complete frame still decodes
        let outs = run(&mut framer, &frame_symbols(&msg.serialize()));
        assert_eq!(vec![FrameOut::Ready(Ok(msg))], outs);
    }

    #[test]
    fn test_preamble_mid_frame_restarts() {
        let msg = entry_sensor();
        let mut framer = Framer::new();

        framer.input(BitSymbol::Preamble);
        for _ in 0..20 {
            framer.input(BitSymbol::One);
        }

        // second preamble abandons the partial frame silently
        let outs = run(&mut framer, &frame_symbols(&msg.serialize()));
        assert_eq!(vec![FrameOut::Ready(Ok(msg))], outs);
    }

    #[test]
    fn test_unknown_length_code_surfaces_on_stream_death() {
        // vendor code is right but the length code is not in the table
        let raw: &[u8] = &[
            0xCC, 0x05, 0x44, b'1', b'2', b'3', b'A', b'Z', 0x05, 0x01,
        ];
        let mut framer = Framer::new();

        let mut outs = run(&mut framer, &frame_symbols(raw));
        assert!(outs.is_empty());

        outs.push(framer.input(BitSymbol::Invalid));
        assert_eq!(
            vec![FrameOut::Ready(Err(DecodeError::UnrecognizedFormat(
                raw.to_vec()
            )))],
            outs
        );
    }

    #[test]
    fn test_unknown_length_code_reads_to_max() {
        let raw: Vec<u8> = std::iter::once(0xCCu8)
            .chain([0x05, 0x44])
            .chain((0..wire::MAX_FRAME_LEN as u8 - 3).map(|i| b'A' + (i % 26)))
            .collect();
        assert_eq!(wire::MAX_FRAME_LEN, raw.len());

        let mut framer = Framer::new();
        let outs = run(&mut framer, &frame_symbols(&raw));
        assert_eq!(
            vec![FrameOut::Ready(Err(DecodeError::UnrecognizedFormat(raw)))],
            outs
        );
    }

    #[test]
    fn test_end_flushes_pending_unknown_frame() {
        let raw: &[u8] = &[
            0xCC, 0x05, 0x44, b'1', b'2', b'3', b'A', b'Z', 0x05, 0x01, 0x02,
        ];
        let mut framer = Framer::new();

        assert!(run(&mut framer, &frame_symbols(raw)).is_empty());
        assert_eq!(
            FrameOut::Ready(Err(DecodeError::UnrecognizedFormat(raw.to_vec()))),
            framer.end()
        );

        // nothing pending afterwards
        assert_eq!(FrameOut::Searching, framer.end());
    }

    #[test]
    fn test_incomplete_known_frame_discarded_on_end() {
        let msg = entry_sensor();
        let frame = msg.serialize();
        let symbols = frame_symbols(&frame);

        let mut framer = Framer::new();
        for sym in &symbols[..symbols.len() - 8] {
            framer.input(*sym);
        }
        assert_eq!(FrameOut::Searching, framer.end());
    }

    #[test]
    fn test_transmission_decodes_once_per_burst() {
        let msg = entry_sensor();
        let pulses = transmission(&msg);

        let mut decoder = PulseDecoder::default();
        let mut framer = Framer::new();
        let mut messages = Vec::new();
        for sym in decoder.iter(pulses) {
            if let FrameOut::Ready(res) = framer.input(sym) {
                messages.push(res);
            }
        }

        // component transmissions carry the frame twice
        assert_eq!(vec![Ok(msg.clone()), Ok(msg)], messages);
    }

    #[test]
    fn test_station_transmission_decodes_three_times() {
        use crate::message::{DisarmPinResponse, PinResponse, StationSerial};

        let msg = Message::DisarmPinResponse(DisarmPinResponse::new(
            SerialNumber::new("12345").unwrap(),
            Sequence::new(0x7).unwrap(),
            StationSerial::new("CAFE12").unwrap(),
            PinResponse::Valid,
        ));
        let pulses = transmission(&msg);

        let mut decoder = PulseDecoder::default();
        let mut framer = Framer::new();
        let decoded: Vec<_> = decoder
            .iter(pulses)
            .filter_map(|sym| framer.input(sym).ready())
            .collect();

        assert_eq!(vec![Ok(msg.clone()), Ok(msg.clone()), Ok(msg)], decoded);
    }
}
