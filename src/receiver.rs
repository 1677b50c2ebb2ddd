//! Pull-based receive pipeline
//!
//! [`OokReceiver`] chains the [`PulseDecoder`](crate::PulseDecoder) and
//! [`Framer`](crate::Framer) behind one `input()` call. The caller owns
//! the loop: pull a pulse from the transceiver, feed it in, act on the
//! event. The pipeline hosts equally well on a dedicated thread or
//! inline in a poll loop. Cancellation is simply ceasing to pull.
//!
//! One receiver serves one physical channel. Monitoring several bands
//! at once (say, 315 MHz and 433 MHz) takes one receiver per capture
//! stream, with no synchronization between them.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::framing::{FrameOut, Framer};
use crate::message::{DecodeError, Message};
use crate::pulse::{Pulse, PulseDecoder};
use crate::waveform::PulseTimings;

/// Complete receive chain: pulses in, frame events out
///
/// ```
/// use ookguard::{FrameOut, OokReceiver, PulseTimings};
///
/// # let captured_pulses = Vec::new();
/// let mut rx = OokReceiver::new(PulseTimings::default());
/// for event in rx.iter(captured_pulses) {
///     if let FrameOut::Ready(Ok(msg)) = event {
///         println!("decoded: {}", msg);
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct OokReceiver {
    decoder: PulseDecoder,
    framer: Framer,
    last: FrameOut,
}

impl OokReceiver {
    /// New receiver with the given tolerance calibration
    pub fn new(timings: PulseTimings) -> Self {
        Self {
            decoder: PulseDecoder::new(timings),
            framer: Framer::new(),
            last: FrameOut::Searching,
        }
    }

    /// Discard all scan state and resume searching
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.framer.reset();
        self.last = FrameOut::Searching;
    }

    /// Process one pulse
    ///
    /// Returns an event when the pipeline's state changes: `Aborted`
    /// and `Ready` always surface; repeated `Searching`/`Reading`
    /// states are suppressed.
    pub fn input(&mut self, pulse: Pulse) -> Option<FrameOut> {
        let symbol = self.decoder.input(pulse)?;
        let out = self.framer.input(symbol);
        self.emit(out)
    }

    /// Signal end of the pulse source
    ///
    /// Flushes a pending unknown-format frame, if the capture died
    /// while one was being read.
    pub fn end(&mut self) -> Option<FrameOut> {
        let out = self.framer.end();
        self.emit(out)
    }

    /// Receive events from a source of pulses
    ///
    /// Binds an iterator which consumes pulses and produces
    /// [`FrameOut`] events. The iterator consumes as many pulses as
    /// required for the next event and returns `None` when the source
    /// is exhausted.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter<'rx, I, T>(&'rx mut self, pulses: I) -> SourceIter<'rx, T>
    where
        I: IntoIterator<Item = Pulse> + IntoIterator<IntoIter = T>,
        T: Iterator<Item = Pulse>,
    {
        SourceIter {
            receiver: self,
            pulses: pulses.into_iter(),
        }
    }

    /// Receive only frame results from a source of pulses
    ///
    /// Convenience over [`iter()`](OokReceiver::iter) for callers that
    /// do not care about scan-state events.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn messages<'rx, I, T>(
        &'rx mut self,
        pulses: I,
    ) -> impl Iterator<Item = Result<Message, DecodeError>> + 'rx
    where
        I: IntoIterator<Item = Pulse> + IntoIterator<IntoIter = T>,
        T: Iterator<Item = Pulse> + 'rx,
    {
        self.iter(pulses).filter_map(FrameOut::ready)
    }

    // suppress events that repeat the previous scan state
    fn emit(&mut self, out: FrameOut) -> Option<FrameOut> {
        match &out {
            FrameOut::Searching | FrameOut::Reading => {
                if out == self.last {
                    return None;
                }
                debug!("receiver: {:?}", out);
            }
            _ => {}
        }
        self.last = out.clone();
        Some(out)
    }
}

impl Default for OokReceiver {
    fn default() -> Self {
        Self::new(PulseTimings::default())
    }
}

/// Iterator binding an [`OokReceiver`] to a pulse source
///
/// See [`OokReceiver::iter`].
pub struct SourceIter<'rx, I>
where
    I: Iterator<Item = Pulse>,
{
    receiver: &'rx mut OokReceiver,
    pulses: I,
}

impl<'rx, I> Iterator for SourceIter<'rx, I>
where
    I: Iterator<Item = Pulse>,
{
    type Item = FrameOut;

    fn next(&mut self) -> Option<FrameOut> {
        loop {
            let pulse = self.pulses.next()?;
            if let Some(out) = self.receiver.input(pulse) {
                return Some(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        EntrySensorEvent, EntrySensorMessage, KeychainRemoteEvent, KeychainRemoteMessage,
        Sequence, SerialNumber,
    };
    use crate::pulse::{self, PulseLevel};
    use crate::waveform::{BIT_ONE_US, MARKER_US};

    fn entry_sensor() -> Message {
        Message::EntrySensor(EntrySensorMessage::new(
            SerialNumber::new("123AZ").unwrap(),
            Sequence::new(0x0).unwrap(),
            EntrySensorEvent::Open,
        ))
    }

    fn keychain_off() -> Message {
        Message::KeychainRemote(KeychainRemoteMessage::new(
            SerialNumber::new("KEY01").unwrap(),
            Sequence::new(0x4).unwrap(),
            KeychainRemoteEvent::Off,
        ))
    }

    // short sync train, marker pair, and a single copy of the frame
    fn single_burst(msg: &Message) -> Vec<Pulse> {
        let frame = msg.serialize();
        let mut bits = Vec::new();
        for byte in &frame {
            for i in 0..8 {
                bits.push(byte & (1 << i) != 0);
            }
        }

        let mut pulses = Vec::new();
        for _ in 0..6 {
            pulses.push(Pulse::low(BIT_ONE_US));
            pulses.push(Pulse::high(BIT_ONE_US));
        }
        pulses.push(Pulse::low(MARKER_US));
        pulses.push(Pulse::high(MARKER_US));
        pulses.extend(pulse::encode_bits(bits, PulseLevel::Low));
        pulses
    }

    #[test]
    fn test_end_to_end_entry_sensor() {
        // the full transmit waveform decodes back to the original,
        // once per burst repeat
        let msg = entry_sensor();
        let pulses = crate::framing::transmission(&msg);

        let mut rx = OokReceiver::default();
        let decoded: Vec<_> = rx.messages(pulses).collect();
        assert_eq!(vec![Ok(msg.clone()), Ok(msg)], decoded);
    }

    #[test]
    fn test_two_frames_with_minimal_gap() {
        // two different frames back to back, separated by less than a
        // preamble's worth of idle bits, decode as exactly two messages
        let first = entry_sensor();
        let second = keychain_off();

        let mut pulses = single_burst(&first);
        pulses.extend(single_burst(&second));

        let mut rx = OokReceiver::default();
        let decoded: Vec<_> = rx.messages(pulses).collect();
        assert_eq!(vec![Ok(first), Ok(second)], decoded);
    }

    #[test]
    fn test_noise_pulse_mid_frame_aborts_exactly_once() {
        let first = entry_sensor();
        let second = keychain_off();

        // clip the last three pulses off the first burst and replace
        // them with an out-of-tolerance pulse
        let mut pulses = single_burst(&first);
        pulses.truncate(pulses.len() - 3);
        pulses.push(Pulse::low(1500));
        pulses.extend(single_burst(&second));

        let mut rx = OokReceiver::default();
        let events: Vec<_> = rx.iter(pulses).collect();

        let aborts = events
            .iter()
            .filter(|e| matches!(e, FrameOut::Aborted))
            .count();
        let decoded: Vec<_> = events
            .into_iter()
            .filter_map(FrameOut::ready)
            .collect();

        assert_eq!(1, aborts);
        assert_eq!(vec![Ok(second)], decoded);
    }

    #[test]
    fn test_noise_pulse_between_frames_is_harmless() {
        let first = entry_sensor();
        let second = keychain_off();

        let mut pulses = single_burst(&first);
        pulses.push(Pulse::low(1500));
        pulses.extend(single_burst(&second));

        let mut rx = OokReceiver::default();
        let decoded: Vec<_> = rx.messages(pulses).collect();
        assert_eq!(vec![Ok(first), Ok(second)], decoded);
    }

    #[test]
    fn test_quiet_channel_produces_no_events() {
        // a channel with nothing but noise never produces a frame
        let pulses = vec![
            Pulse::low(300),
            Pulse::high(1500),
            Pulse::low(50_000),
            Pulse::high(700),
        ];

        let mut rx = OokReceiver::default();
        assert_eq!(0, rx.messages(pulses).count());
        assert_eq!(None, rx.end());
    }

    #[test]
    fn test_state_change_events_are_deduplicated() {
        let msg = entry_sensor();
        let mut rx = OokReceiver::default();
        let events: Vec<_> = rx.iter(single_burst(&msg)).collect();

        // one Reading on preamble, one Ready at the end; the sync train
        // produces no repeated Searching events
        assert_eq!(
            vec![FrameOut::Reading, FrameOut::Ready(Ok(msg))],
            events
        );
    }
}
