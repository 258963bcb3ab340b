//! Register map definitions for the TLE7230 relay driver.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::error::InvalidArgument;
use crate::params::Opcode;

/// Register address of `MAP` (parallel input IN4 mapping).
pub const REG_MAP: u8 = 1;
/// Register address of `BOL` (boolean combination with the parallel inputs).
pub const REG_BOL: u8 = 2;
/// Register address of `OVL` (overload behaviour).
pub const REG_OVL: u8 = 3;
/// Register address of `OVT` (overtemperature behaviour).
pub const REG_OVT: u8 = 4;
/// Register address of `SLE` (slew rate).
pub const REG_SLE: u8 = 5;
/// Register address of `STA` (DMOS output state).
pub const REG_STA: u8 = 6;
/// Register address of `CTL` (output control).
pub const REG_CTL: u8 = 7;

/// Lowest valid register address.
pub const MIN_ADDRESS: u8 = 1;
/// Highest valid register address. Address 8 is reserved but accepted.
pub const MAX_ADDRESS: u8 = 8;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Named registers of the TLE7230. Every register holds one bit per output,
/// bit `n - 1` belonging to OUTn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Outputs switched by the IN4 parallel input.
    Map = REG_MAP,
    /// 0 = OR, 1 = AND of the SPI bit with the parallel input.
    Bol = REG_BOL,
    /// 0 = current limitation only, 1 = latching shutdown on overload.
    Ovl = REG_OVL,
    /// 0 = restart after cool-down, 1 = latching shutdown on overtemperature.
    Ovt = REG_OVT,
    /// 0 = 10 µs, 1 = 50 µs switching slew rate.
    Sle = REG_SLE,
    /// DMOS state; not the same as the commanded on/off state in `CTL`.
    Sta = REG_STA,
    /// Output on/off command.
    Ctl = REG_CTL,
}

impl Register {
    /// Register address as documented in the datasheet.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Access permission classification.
    pub const fn access(self) -> RegisterAccess {
        match self {
            Self::Sta => RegisterAccess::ReadOnly,
            _ => RegisterAccess::ReadWrite,
        }
    }

    /// Value after power-up or a reset command, if defined.
    pub const fn reset_value(self) -> Option<u8> {
        match self {
            // OUT4 follows IN4.
            Self::Map => Some(1 << 3),
            Self::Sta => None,
            _ => Some(0x00),
        }
    }
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value.address()
    }
}

/// Checks that `address` lies in `1..=8`.
pub fn validate_address(address: u8) -> core::result::Result<u8, InvalidArgument> {
    if (MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
        Ok(address)
    } else {
        Err(InvalidArgument::Address(address))
    }
}

/// Bitfield representation of an SPI command byte.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    // Register address (bits 5:0, only 3:0 meaningful).
    pub address: B6,
    // Command opcode (bits 7:6).
    pub opcode: Opcode,
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        value.into_bytes()[0]
    }
}
