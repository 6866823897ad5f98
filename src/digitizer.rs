//! Device front for the digitizer2 acquisition firmware.
//!
//! [`Digitizer2`] wraps a [`RegisterBus`] and covers the readout path:
//! acquisition status, the mode the device captured with, and the acquisition
//! buffer itself, raw or decoded. Bring-up, trigger programming and
//! diagnostics live with the owner of the bus.

use crate::acq_decode::{self, AcqData};
use crate::register_bus::RegisterBus;

const REG_STATUS: (u8, u16) = (0, 1);
const REG_CONFIG_ACQ: (u8, u16) = (0, 5);
const PORT_ACQBUF: u8 = 4;

/// State of the acquisition logic as reported by the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcqState {
    Reset,
    WaitReady,
    WaitTrigger,
    Buffering,
    Done,
}

impl AcqState {
    fn from_status(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Reset),
            1 => Some(Self::WaitReady),
            2 => Some(Self::WaitTrigger),
            3 => Some(Self::Buffering),
            4 => Some(Self::Done),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigitizerError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("register bus error: {0}")]
    Bus(#[from] E),

    #[error("device reported acquisition state {0}, expected 0..=4")]
    UnknownAcqState(u16),
}

/// Client for one digitizer2 device behind a register bus.
pub struct Digitizer2<B> {
    bus: B,
}

impl<B: RegisterBus> Digitizer2<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give the bus back, e.g. to hand it to bring-up code.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Read the current state of the acquisition logic.
    pub fn acq_state(&mut self) -> Result<AcqState, DigitizerError<B::Error>> {
        let value = self.bus.read_word(REG_STATUS.0, REG_STATUS.1)?;
        AcqState::from_status(value).ok_or(DigitizerError::UnknownAcqState(value))
    }

    /// Read the mode selector the acquisition was configured with.
    ///
    /// Returns the raw 2-bit field; the unassigned selector 1 is passed on
    /// as-is and later dispatches to [`AcqData::Unparsed`].
    pub fn selected_mode(&mut self) -> Result<u16, DigitizerError<B::Error>> {
        let config = self.bus.read_word(REG_CONFIG_ACQ.0, REG_CONFIG_ACQ.1)?;
        Ok(config >> 2 & 0b11)
    }

    /// Number of words currently held in the acquisition buffer.
    pub fn buffer_count(&mut self) -> Result<usize, DigitizerError<B::Error>> {
        // The device counts 32-bit entries; the buffer drains as 16-bit words.
        Ok(2 * usize::from(self.bus.read_word(PORT_ACQBUF, 0)?))
    }

    /// Drain the acquisition buffer without decoding it.
    pub fn read_buffer_raw(&mut self) -> Result<Vec<u16>, DigitizerError<B::Error>> {
        let count = self.buffer_count()?;
        log::debug!("Draining {count} words from the acquisition buffer");
        Ok(self.bus.read_words(PORT_ACQBUF, 1, count)?)
    }

    /// Drain the acquisition buffer and decode it according to the mode the
    /// device captured with.
    pub fn read_buffer(&mut self) -> Result<AcqData, DigitizerError<B::Error>> {
        let selector = self.selected_mode()?;
        let words = self.read_buffer_raw()?;
        log::debug!("Decoding {} words with mode selector {selector}", words.len());
        Ok(acq_decode::decode(selector, &words))
    }
}
