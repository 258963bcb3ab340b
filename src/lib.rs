#![cfg_attr(not(test), no_std)]

mod error;

pub mod config;
pub mod device;
pub mod diagnosis;
pub mod frame;
pub mod interface;
mod log;
pub mod params;
pub mod pins;
pub mod registers;
pub mod relays;

#[cfg(test)]
mod testing;

pub use crate::device::Tle7230;
pub use crate::error::{Error, InvalidArgument, Result};
pub use crate::relays::{RelaySelection, RelaySet};
