//! Bus interface abstraction for the TLE7230 driver.

pub mod spi;

/// How the two devices are wired to the SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topology {
    /// One chip-select per device, 16-bit frames.
    Independent,
    /// Both devices share one chip-select; device 1's SO feeds device 2's SI
    /// and every frame is 32 bits long.
    DaisyChained,
}

impl Topology {
    /// Number of bytes exchanged per frame.
    pub const fn frame_len(self) -> usize {
        match self {
            Self::Independent => 2,
            Self::DaisyChained => 4,
        }
    }
}

/// Chip-select line a transfer is issued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Chip-select 0: device 1, or the whole cascade.
    Cs0,
    /// Chip-select 1: device 2 when wired independently.
    Cs1,
}

/// Abstraction over the low-level bus access required by the driver.
pub trait Tle7230Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Wiring of the devices behind this interface. Must not change over the
    /// lifetime of the interface.
    fn topology(&self) -> Topology;

    /// Exchanges `frame` full-duplex on `channel`, overwriting it in place
    /// with the received bytes.
    fn transfer(&mut self, channel: Channel, frame: &mut [u8]) -> core::result::Result<(), Self::Error>;
}
