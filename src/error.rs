//! Error handling primitives for the TLE7230 driver.

use crate::interface::Topology;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The bus failed while probing the devices during construction.
    Initialization(E),
    /// Register address outside `1..=8`.
    InvalidAddress(u8),
    /// Device number other than 1 or 2.
    InvalidDevice(u8),
    /// Relay number outside `1..=8`.
    InvalidRelay(u8),
    /// The operation is only available on the given topology.
    ModeViolation {
        /// Topology the operation requires.
        required: Topology,
    },
}

/// Input rejected before any bus access.
///
/// Returned by the pure helpers that have no bus error type to carry; it
/// converts into the matching [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidArgument {
    /// Register address outside `1..=8`.
    Address(u8),
    /// Device number other than 1 or 2.
    Device(u8),
    /// Relay number outside `1..=8`.
    Relay(u8),
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(err: InvalidArgument) -> Self {
        match err {
            InvalidArgument::Address(address) => Self::InvalidAddress(address),
            InvalidArgument::Device(device) => Self::InvalidDevice(device),
            InvalidArgument::Relay(relay) => Self::InvalidRelay(relay),
        }
    }
}

