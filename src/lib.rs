//! # digitizer2 RS
//!
//! A Rust client library for the digitizer2 FPGA acquisition firmware.
//!
//! The heart of this library is the decoder for the device's capture buffer:
//! pure functions turning the flat 16-bit word stream into physically
//! meaningful event lists for the three acquisition modes (RAW, TDC,
//! MAXFIND), including reconstruction of the wrapping 22-bit cycle counter
//! into a continuous time axis. Around it sits a narrow register-bus seam
//! and a thin device front for the readout path.
//!
//! ## Features
//!
//! - **Pure buffer decoding**: RAW traces, TDC event timestamps and MAXFIND
//!   peaks, with counter-overflow tracking and unknown-mode passthrough
//! - **Transport independence**: all device access goes through the
//!   [`RegisterBus`] trait, so USB bridges, device servers or simulators plug
//!   in without touching this crate
//! - **Readout front**: [`Digitizer2`] reads acquisition state, buffer
//!   contents and decodes them according to the device's selected mode
//! - **DataFrame output** (feature `dataframe`): `polars` conversions for the
//!   decoded captures
//!
//! ## Examples
//!
//! ### Decoding a TDC capture
//!
//! ```rust
//! use digitizer2_rs::{decode_tdc, COUNTER_SPAN, CYCLE_PERIOD, SUBCYCLE_PERIOD};
//!
//! // Two packets: a counter overflow coinciding with an analog event, then
//! // a plain analog event at counter 5, sub-position 2.
//! let words = [0xc000, 0x0000, 0x6000, 0x0005];
//!
//! let events = decode_tdc(&words);
//! assert_eq!(events.analog.len(), 2);
//! assert_eq!(events.analog[0], COUNTER_SPAN as f64 * CYCLE_PERIOD);
//! assert_eq!(
//!     events.analog[1],
//!     (COUNTER_SPAN + 5) as f64 * CYCLE_PERIOD + 2.0 * SUBCYCLE_PERIOD
//! );
//! ```
//!
//! ### Dispatching on the mode selector
//!
//! ```rust
//! use digitizer2_rs::{decode, AcqData};
//!
//! let words = [0x0123, 0x4567];
//!
//! // Selector 1 is unassigned; the buffer passes through unchanged.
//! match decode(1, &words) {
//!     AcqData::Unparsed(raw) => assert_eq!(raw, words),
//!     other => panic!("unexpected decode result: {other:?}"),
//! }
//! ```
//!
//! ### Reading out a device
//!
//! ```rust,no_run
//! use digitizer2_rs::{AcqData, AcqState, Digitizer2, RegisterBus};
//!
//! fn readout<B: RegisterBus>(bus: B) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = Digitizer2::new(bus);
//!     while device.acq_state()? != AcqState::Done {}
//!     match device.read_buffer()? {
//!         AcqData::Maxfind(events) => println!("{} peaks", events.times.len()),
//!         other => println!("other capture: {other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod acq_decode;
#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod digitizer;
pub mod register_bus;

// Re-export the main types for convenience
pub use acq_decode::{
    decode, decode_maxfind, decode_raw, decode_tdc, AcqData, AcqMode, AnalogTrace, DigitalTrace,
    MaxfindEvents, RawCapture, TdcEvents, ANALOG_SAMPLE_PERIOD, COUNTER_BITS, COUNTER_SPAN,
    CYCLE_PERIOD, DIGITAL_SAMPLE_PERIOD, SUBCYCLE_PERIOD,
};

pub use register_bus::RegisterBus;

pub use digitizer::{AcqState, Digitizer2, DigitizerError};
