//! Decoding of the digitizer2 acquisition buffer.
//!
//! The device delivers one flat stream of 16-bit words whose layout depends on
//! the acquisition mode that was active while capturing:
//!
//! - **RAW** (selector 0): one word per sample. Bits \[11:0\] hold a 12-bit
//!   two's-complement analog sample (2 ns period), bits \[15:12\] hold packed
//!   digital data (1 ns period, two channels interleaved at word stride 2).
//! - **TDC** (selector 2): two words per packet, combined big-word-first into
//!   32 bits. Bit 31 flags a counter overflow; bits 30/27/24 flag an event on
//!   the analog, digital-1 and digital-2 channel, each with a 2-bit sub-cycle
//!   position in bits \[29:28\], \[26:25\] and \[23:22\]; bits \[21:0\] hold the
//!   free-running cycle counter (4 ns period, 1 ns sub-cycle resolution).
//! - **MAXFIND** (selector 3): two words per packet. Bits \[21:0\] hold the
//!   cycle counter, bits \[31:22\] the detected peak amplitude. There is no
//!   overflow flag; a counter value of exactly zero marks the overflow.
//!
//! The 22-bit counter wraps every 2^22 cycles. All decoders reconstruct a
//! continuous time axis by accumulating the counter span once per overflow
//! marker, in packet order, before computing event times of that packet.
//!
//! Decoding is pure: it borrows the word buffer read-only, keeps all state
//! local to the call and never fails. A trailing partial packet is discarded
//! silently, an empty buffer decodes to empty outputs.

/// Sample period of the analog channel in RAW mode, seconds.
pub const ANALOG_SAMPLE_PERIOD: f64 = 2e-9;
/// Sample period of the digital channels in RAW mode, seconds.
pub const DIGITAL_SAMPLE_PERIOD: f64 = 1e-9;
/// Period of one cycle of the free-running counter, seconds.
pub const CYCLE_PERIOD: f64 = 4e-9;
/// Resolution of the 2-bit sub-cycle position in TDC packets, seconds.
pub const SUBCYCLE_PERIOD: f64 = 1e-9;
/// Width of the free-running cycle counter in bits.
pub const COUNTER_BITS: u32 = 22;
/// Number of cycles after which the counter wraps around.
pub const COUNTER_SPAN: u64 = 1 << COUNTER_BITS;

const COUNTER_MASK: u32 = (COUNTER_SPAN - 1) as u32;

/// Acquisition modes of the digitizer2 firmware.
///
/// The discriminants are the on-wire selector values. Selector 1 is not
/// assigned by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcqMode {
    /// Raw oscilloscope-style sampling of the analog and digital inputs.
    Raw,
    /// Sparse per-channel event timestamping.
    Tdc,
    /// Sparse analog peak detection with timestamps and amplitudes.
    Maxfind,
}

impl AcqMode {
    /// Map an on-wire mode selector to an acquisition mode.
    pub fn from_wire(selector: u16) -> Option<Self> {
        match selector {
            0 => Some(Self::Raw),
            2 => Some(Self::Tdc),
            3 => Some(Self::Maxfind),
            _ => None,
        }
    }

    /// The on-wire selector value of this mode.
    pub fn to_wire(self) -> u16 {
        match self {
            Self::Raw => 0,
            Self::Tdc => 2,
            Self::Maxfind => 3,
        }
    }
}

/// Fixed-rate analog samples with their time axis in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogTrace {
    pub times: Vec<f64>,
    /// 12-bit two's-complement samples, sign-extended.
    pub values: Vec<i16>,
}

/// Fixed-rate digital samples with their time axis in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitalTrace {
    pub times: Vec<f64>,
    pub bits: Vec<bool>,
}

/// Decoded RAW-mode capture: one analog and two digital traces.
///
/// The digital traces run at twice the analog sample count since the device
/// packs eight 1 ns digital samples per channel into every pair of words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCapture {
    pub analog: AnalogTrace,
    pub digital1: DigitalTrace,
    pub digital2: DigitalTrace,
}

/// Decoded TDC-mode capture: per-channel event timestamps in seconds.
///
/// Each list is ordered by packet index, which the hardware guarantees to be
/// time-ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TdcEvents {
    pub analog: Vec<f64>,
    pub digital1: Vec<f64>,
    pub digital2: Vec<f64>,
}

/// Decoded MAXFIND-mode capture: peak timestamps and amplitudes.
///
/// Both lists have the same length; entry `i` of `amplitudes` belongs to
/// entry `i` of `times`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaxfindEvents {
    pub times: Vec<f64>,
    pub amplitudes: Vec<u16>,
}

/// Result of decoding an acquisition buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum AcqData {
    Raw(RawCapture),
    Tdc(TdcEvents),
    Maxfind(MaxfindEvents),
    /// The selector did not name a known mode; the buffer is passed through
    /// unchanged.
    Unparsed(Vec<u16>),
}

/// Decode an acquisition buffer according to the given mode selector.
///
/// Selectors outside `{0, 2, 3}` yield [`AcqData::Unparsed`] with the input
/// words copied verbatim. Callers that require strict mode validation should
/// check [`AcqMode::from_wire`] themselves.
pub fn decode(selector: u16, words: &[u16]) -> AcqData {
    match AcqMode::from_wire(selector) {
        Some(AcqMode::Raw) => AcqData::Raw(decode_raw(words)),
        Some(AcqMode::Tdc) => AcqData::Tdc(decode_tdc(words)),
        Some(AcqMode::Maxfind) => AcqData::Maxfind(decode_maxfind(words)),
        None => AcqData::Unparsed(words.to_vec()),
    }
}

/// Decode a RAW-mode buffer into analog and digital traces.
///
/// The buffer is clamped to a multiple of four words; the digital unpacking
/// consumes words in groups of four (two per channel, two nibbles per byte).
pub fn decode_raw(words: &[u16]) -> RawCapture {
    let words = &words[..words.len() - words.len() % 4];

    let times = (0..words.len())
        .map(|i| i as f64 * ANALOG_SAMPLE_PERIOD)
        .collect();
    let values = words
        .iter()
        .map(|&w| (((w & 0x0fff) << 4) as i16) >> 4)
        .collect();

    RawCapture {
        analog: AnalogTrace { times, values },
        digital1: unpack_digital(words, 0),
        digital2: unpack_digital(words, 1),
    }
}

/// Expand the packed 4-bit digital data of one channel into a boolean trace.
///
/// Channel `k` occupies the top nibble of words `k, k + 2, k + 4, ...`.
/// Consecutive nibbles form a byte which unpacks MSB-first into eight 1 ns
/// samples.
fn unpack_digital(words: &[u16], channel: usize) -> DigitalTrace {
    let nibbles: Vec<u8> = words
        .iter()
        .skip(channel)
        .step_by(2)
        .map(|&w| ((w >> 12) & 0xf) as u8)
        .collect();

    let mut bits = Vec::with_capacity(nibbles.len() / 2 * 8);
    for pair in nibbles.chunks_exact(2) {
        let byte = (pair[0] << 4) | pair[1];
        for b in (0..8).rev() {
            bits.push(byte >> b & 1 == 1);
        }
    }

    let times = (0..bits.len())
        .map(|i| i as f64 * DIGITAL_SAMPLE_PERIOD)
        .collect();
    DigitalTrace { times, bits }
}

/// Combine adjacent word pairs into 32-bit packets, first word on top.
///
/// A trailing unpaired word is discarded.
fn packets(words: &[u16]) -> impl Iterator<Item = u32> + '_ {
    words
        .chunks_exact(2)
        .map(|pair| (u32::from(pair[0]) << 16) | u32::from(pair[1]))
}

/// Decode a TDC-mode buffer into per-channel event timestamps.
///
/// The overflow accumulation is a sequential scan over the packets: the
/// overflow flag of a packet takes effect before the event times of that same
/// packet are computed, so overflow and event flags may coexist.
pub fn decode_tdc(words: &[u16]) -> TdcEvents {
    let mut events = TdcEvents::default();
    let mut accum: u64 = 0;

    for packet in packets(words) {
        if packet & (1 << 31) != 0 {
            accum += COUNTER_SPAN;
        }
        let counter = u64::from(packet & COUNTER_MASK);
        let base = (accum + counter) as f64 * CYCLE_PERIOD;

        if packet & (1 << 30) != 0 {
            events
                .analog
                .push(base + f64::from(packet >> 28 & 0b11) * SUBCYCLE_PERIOD);
        }
        if packet & (1 << 27) != 0 {
            events
                .digital1
                .push(base + f64::from(packet >> 25 & 0b11) * SUBCYCLE_PERIOD);
        }
        if packet & (1 << 24) != 0 {
            events
                .digital2
                .push(base + f64::from(packet >> 22 & 0b11) * SUBCYCLE_PERIOD);
        }
    }

    events
}

/// Decode a MAXFIND-mode buffer into peak timestamps and amplitudes.
///
/// This mode has no overflow flag: a packet whose counter field is exactly
/// zero marks the overflow, whether or not it also carries an event. A packet
/// carries an event iff its amplitude field is non-zero. The firmware
/// protocol leaves open whether a legitimate event can land on counter value
/// zero coincidentally; this decoder treats such a packet as both.
pub fn decode_maxfind(words: &[u16]) -> MaxfindEvents {
    let mut events = MaxfindEvents::default();
    let mut accum: u64 = 0;

    for packet in packets(words) {
        let counter = packet & COUNTER_MASK;
        if counter == 0 {
            accum += COUNTER_SPAN;
        }

        let amplitude = (packet >> COUNTER_BITS) as u16;
        if amplitude != 0 {
            events
                .times
                .push((accum + u64::from(counter)) as f64 * CYCLE_PERIOD);
            events.amplitudes.push(amplitude);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build the two words of a TDC packet from its fields.
    fn tdc_packet(
        overflow: bool,
        a: Option<u32>,
        d1: Option<u32>,
        d2: Option<u32>,
        counter: u32,
    ) -> [u16; 2] {
        let mut packet = counter & COUNTER_MASK;
        if overflow {
            packet |= 1 << 31;
        }
        if let Some(pos) = a {
            packet |= 1 << 30 | pos << 28;
        }
        if let Some(pos) = d1 {
            packet |= 1 << 27 | pos << 25;
        }
        if let Some(pos) = d2 {
            packet |= 1 << 24 | pos << 22;
        }
        [(packet >> 16) as u16, packet as u16]
    }

    fn maxfind_packet(amplitude: u16, counter: u32) -> [u16; 2] {
        let packet = u32::from(amplitude) << COUNTER_BITS | (counter & COUNTER_MASK);
        [(packet >> 16) as u16, packet as u16]
    }

    #[test]
    fn mode_wire_values() {
        assert_eq!(AcqMode::from_wire(0), Some(AcqMode::Raw));
        assert_eq!(AcqMode::from_wire(2), Some(AcqMode::Tdc));
        assert_eq!(AcqMode::from_wire(3), Some(AcqMode::Maxfind));
        assert_eq!(AcqMode::from_wire(1), None);
        assert_eq!(AcqMode::from_wire(4), None);
        for mode in [AcqMode::Raw, AcqMode::Tdc, AcqMode::Maxfind] {
            assert_eq!(AcqMode::from_wire(mode.to_wire()), Some(mode));
        }
    }

    #[test]
    fn unknown_mode_passes_buffer_through() {
        let words = vec![0xdead, 0xbeef, 0x1234];
        assert_eq!(decode(1, &words), AcqData::Unparsed(words.clone()));
        assert_eq!(decode(7, &words), AcqData::Unparsed(words));
    }

    #[test]
    fn empty_buffer_decodes_to_empty_outputs() {
        assert_eq!(decode_raw(&[]), RawCapture::default());
        assert_eq!(decode_tdc(&[]), TdcEvents::default());
        assert_eq!(decode_maxfind(&[]), MaxfindEvents::default());
    }

    #[test]
    fn raw_analog_sign_extension() {
        let capture = decode_raw(&[0x0000, 0x07ff, 0x0800, 0x0fff]);
        assert_eq!(capture.analog.values, vec![0, 2047, -2048, -1]);
        assert_eq!(
            capture.analog.times,
            vec![0.0, ANALOG_SAMPLE_PERIOD, 2.0 * ANALOG_SAMPLE_PERIOD, 3.0 * ANALOG_SAMPLE_PERIOD]
        );
    }

    #[test]
    fn raw_digital_unpacks_msb_first() {
        // Channel 1 nibbles come from words 0 and 2; 0b1011 then 0b0010
        // combine to the byte 0b1011_0010.
        let words = [0xb000, 0xf000, 0x2000, 0x9000];
        let capture = decode_raw(&words);
        assert_eq!(
            capture.digital1.bits,
            vec![true, false, true, true, false, false, true, false]
        );
        // Channel 2 nibbles from words 1 and 3: 0b1111_1001.
        assert_eq!(
            capture.digital2.bits,
            vec![true, true, true, true, true, false, false, true]
        );
        let times: Vec<f64> = (0..8).map(|i| f64::from(i) * DIGITAL_SAMPLE_PERIOD).collect();
        assert_eq!(capture.digital1.times, times);
        assert_eq!(capture.digital2.times, times);
    }

    #[test]
    fn raw_digital_runs_at_twice_the_analog_rate() {
        let words = vec![0u16; 32];
        let capture = decode_raw(&words);
        assert_eq!(capture.analog.values.len(), 32);
        assert_eq!(capture.digital1.bits.len(), 64);
        assert_eq!(capture.digital2.bits.len(), 64);
    }

    #[test]
    fn raw_clamps_to_whole_groups_of_four() {
        let mut words = vec![0x0123u16; 8];
        let reference = decode_raw(&words);
        words.extend_from_slice(&[0x0fff, 0x0fff, 0x0fff]);
        assert_eq!(decode_raw(&words), reference);
    }

    #[test]
    fn tdc_overflow_applies_before_same_packet_events() {
        let mut words = Vec::new();
        words.extend_from_slice(&tdc_packet(true, Some(0), None, None, 0));
        words.extend_from_slice(&tdc_packet(false, Some(2), None, None, 5));

        let events = decode_tdc(&words);
        assert_eq!(
            events.analog,
            vec![
                COUNTER_SPAN as f64 * CYCLE_PERIOD,
                (COUNTER_SPAN + 5) as f64 * CYCLE_PERIOD + 2.0 * SUBCYCLE_PERIOD,
            ]
        );
        assert!(events.digital1.is_empty());
        assert!(events.digital2.is_empty());
    }

    #[test]
    fn tdc_decodes_all_channels_independently() {
        let mut words = Vec::new();
        words.extend_from_slice(&tdc_packet(false, Some(1), Some(2), Some(3), 100));
        words.extend_from_slice(&tdc_packet(false, None, Some(0), None, 200));

        let events = decode_tdc(&words);
        assert_eq!(events.analog, vec![100.0 * CYCLE_PERIOD + SUBCYCLE_PERIOD]);
        assert_eq!(
            events.digital1,
            vec![
                100.0 * CYCLE_PERIOD + 2.0 * SUBCYCLE_PERIOD,
                200.0 * CYCLE_PERIOD,
            ]
        );
        assert_eq!(events.digital2, vec![100.0 * CYCLE_PERIOD + 3.0 * SUBCYCLE_PERIOD]);
    }

    #[test]
    fn tdc_timestamps_stay_monotonic_across_overflows() {
        // Counter values wrap twice; the reconstructed axis must not.
        let mut words = Vec::new();
        words.extend_from_slice(&tdc_packet(false, Some(0), None, None, 4_000_000));
        words.extend_from_slice(&tdc_packet(true, Some(0), None, None, 17));
        words.extend_from_slice(&tdc_packet(false, Some(3), None, None, 90_000));
        words.extend_from_slice(&tdc_packet(true, Some(1), None, None, 3));

        let events = decode_tdc(&words);
        assert_eq!(events.analog.len(), 4);
        assert!(events.analog.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn maxfind_zero_counter_registers_overflow_and_event() {
        let words = maxfind_packet(3, 0);
        let events = decode_maxfind(&words);
        assert_eq!(events.times, vec![COUNTER_SPAN as f64 * CYCLE_PERIOD]);
        assert_eq!(events.amplitudes, vec![3]);
    }

    #[test]
    fn maxfind_skips_packets_without_amplitude() {
        let mut words = Vec::new();
        words.extend_from_slice(&maxfind_packet(0, 42));
        words.extend_from_slice(&maxfind_packet(700, 43));
        words.extend_from_slice(&maxfind_packet(0, 0)); // overflow marker only
        words.extend_from_slice(&maxfind_packet(1023, 7));

        let events = decode_maxfind(&words);
        assert_eq!(
            events.times,
            vec![
                43.0 * CYCLE_PERIOD,
                (COUNTER_SPAN + 7) as f64 * CYCLE_PERIOD,
            ]
        );
        assert_eq!(events.amplitudes, vec![700, 1023]);
        assert!(events.times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn two_word_modes_discard_a_trailing_word() {
        let mut words = Vec::new();
        words.extend_from_slice(&tdc_packet(false, Some(0), None, None, 10));
        let reference_tdc = decode_tdc(&words);
        let reference_max = decode_maxfind(&words);

        words.push(0xffff);
        assert_eq!(decode_tdc(&words), reference_tdc);
        assert_eq!(decode_maxfind(&words), reference_max);
    }

    #[test]
    fn decoding_is_pure() {
        let mut words = Vec::new();
        words.extend_from_slice(&tdc_packet(true, Some(2), Some(1), None, 55));
        words.extend_from_slice(&tdc_packet(false, None, None, Some(0), 60));

        assert_eq!(decode_tdc(&words), decode_tdc(&words));
        assert_eq!(decode_maxfind(&words), decode_maxfind(&words));
        assert_eq!(decode_raw(&words), decode_raw(&words));
    }
}
