//! Hardware access seam for the digitizer2 register file.
//!
//! The firmware exposes its state as 16-bit registers grouped into ports.
//! Everything that talks to the device goes through [`RegisterBus`], so the
//! transport (USB, Ethernet, a device server, a simulator in tests) stays out
//! of this crate and can be swapped freely.

use std::time::Duration;

/// Word-addressed register access over ports.
///
/// Implementations are expected to be blocking; the decoder side of this
/// crate never touches the bus and stays pure.
pub trait RegisterBus {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read one register word.
    fn read_word(&mut self, port: u8, offset: u16) -> Result<u16, Self::Error>;

    /// Write one register word.
    fn write_word(&mut self, port: u8, offset: u16, value: u16) -> Result<(), Self::Error>;

    /// Read `count` words from one register offset.
    ///
    /// The acquisition buffer drains FIFO-style through a single offset, so
    /// the default implementation re-reads the same register. Transports with
    /// a bulk primitive should override this.
    fn read_words(&mut self, port: u8, offset: u16, count: usize) -> Result<Vec<u16>, Self::Error> {
        let mut words = Vec::with_capacity(count);
        for _ in 0..count {
            words.push(self.read_word(port, offset)?);
        }
        Ok(words)
    }

    /// Block for a settling delay, e.g. between programming steps.
    fn sleep(&mut self, duration: Duration);
}
