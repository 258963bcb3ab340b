//! Strongly typed parameter enumerations for the TLE7230 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! the frame codec and the high-level driver APIs. Prefer these types over raw
//! integers to keep values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use tle7230::params::{Device, Opcode, RelayHealth};
//!
//! let device = Device::try_from(2u8).unwrap();
//! assert_eq!(device, Device::Two);
//! assert_eq!(Opcode::WriteRegister.bits(), 0b11);
//! assert!(RelayHealth::Normal.is_normal());
//! ```

use modular_bitfield::prelude::Specifier;

use crate::error::InvalidArgument;

/// One of the two TLE7230 devices handled by a driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Device {
    /// Device 1: own chip-select 0, or the MOSI-receiving end of a cascade.
    One = 1,
    /// Device 2: own chip-select 1, or the MISO-transmitting end of a cascade.
    Two = 2,
}

impl Device {
    /// Both devices, in numbering order.
    pub const ALL: [Device; 2] = [Device::One, Device::Two];

    /// Zero-based index into per-device storage.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl TryFrom<u8> for Device {
    type Error = InvalidArgument;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(InvalidArgument::Device(other)),
        }
    }
}

impl From<Device> for u8 {
    fn from(value: Device) -> Self {
        value as u8
    }
}

/// SPI command opcodes encoded in bits `[7:6]` of the command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Opcode {
    /// Shift out the diagnosis word only.
    DiagnosisOnly = 0b00,
    /// Latch a register for read-out on the next frame.
    ReadRegister = 0b01,
    /// Return all logic registers to their defaults.
    ResetDevice = 0b10,
    /// Write the data byte to the addressed register.
    WriteRegister = 0b11,
}

impl Opcode {
    /// Raw two-bit encoding.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Health of one output channel, as reported by its diagnosis bit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum RelayHealth {
    /// Short circuit to ground.
    ShortToGround = 0b00,
    /// Open load.
    OpenLoad = 0b01,
    /// Overload or short circuit to battery.
    Overload = 0b10,
    /// Normal function.
    Normal = 0b11,
}

impl RelayHealth {
    /// Raw two-bit encoding (`statCh`, `statGnd`).
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` for [`RelayHealth::Normal`].
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Human-readable description.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ShortToGround => "short to ground",
            Self::OpenLoad => "open load",
            Self::Overload => "short circuit/overload",
            Self::Normal => "normal function",
        }
    }
}

impl core::fmt::Display for RelayHealth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.describe())
    }
}
