//! Relay switching on top of the `CTL` register.
//!
//! Every helper is a read-modify-write of `CTL`: the register is read through
//! the pipelined read path (which also refreshes the diagnosis), the selected
//! bits are set or cleared, and the result is written back. Bits outside the
//! selection are preserved. The sequence is not atomic; it assumes no other
//! bus master writes `CTL` in between.

use crate::device::Tle7230;
use crate::error::{InvalidArgument, Result};
use crate::interface::Tle7230Interface;
use crate::log::debug;
use crate::params::Device;
use crate::registers::REG_CTL;

/// Number of outputs per device.
pub const RELAY_COUNT: u8 = 8;

/// Canonical set of relays 1..=8; bit `n - 1` stands for relay `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelaySet(u8);

impl RelaySet {
    /// No relay.
    pub const EMPTY: RelaySet = RelaySet(0x00);
    /// All eight relays.
    pub const ALL: RelaySet = RelaySet(0xFF);

    /// Wraps a raw `CTL`-style bit mask.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bit mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Set holding only `relay`.
    pub fn single(relay: u8) -> core::result::Result<Self, InvalidArgument> {
        let mut set = Self::EMPTY;
        set.insert(relay)?;
        Ok(set)
    }

    /// Adds `relay` (1..=8) to the set.
    pub fn insert(&mut self, relay: u8) -> core::result::Result<(), InvalidArgument> {
        if !(1..=RELAY_COUNT).contains(&relay) {
            return Err(InvalidArgument::Relay(relay));
        }
        self.0 |= 1 << (relay - 1);
        Ok(())
    }

    /// Returns `true` if `relay` is in the set. Out-of-range relays never are.
    pub fn contains(self, relay: u8) -> bool {
        (1..=RELAY_COUNT).contains(&relay) && self.0 & (1 << (relay - 1)) != 0
    }

    /// Relay numbers in the set, ascending.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=RELAY_COUNT).filter(move |&relay| self.contains(relay))
    }
}

impl From<RelaySet> for u8 {
    fn from(value: RelaySet) -> Self {
        value.0
    }
}

/// The accepted shapes of a relay selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySelection<'a> {
    /// Bit mask; bit `n - 1` selects relay `n`.
    Mask(u8),
    /// Flags written most significant first, like a binary literal: the last
    /// flag is relay 1 and the first is relay `len`. A shorter list only
    /// covers relays `1..=len`; relays above it are not selected. At most
    /// eight flags.
    Flags(&'a [bool]),
    /// Relay numbers, each in `1..=8`. Duplicates are allowed.
    Numbers(&'a [u8]),
}

impl RelaySelection<'_> {
    /// Normalizes the selection into a [`RelaySet`].
    pub fn normalize(self) -> core::result::Result<RelaySet, InvalidArgument> {
        match self {
            Self::Mask(bits) => Ok(RelaySet::from_bits(bits)),
            Self::Flags(flags) => {
                if flags.len() > RELAY_COUNT as usize {
                    let highest = u8::try_from(flags.len()).unwrap_or(u8::MAX);
                    return Err(InvalidArgument::Relay(highest));
                }
                let set = flags
                    .iter()
                    .fold(0u8, |bits, &flag| (bits << 1) | u8::from(flag));
                Ok(RelaySet::from_bits(set))
            }
            Self::Numbers(relays) => {
                let mut set = RelaySet::EMPTY;
                for &relay in relays {
                    set.insert(relay)?;
                }
                Ok(set)
            }
        }
    }
}

impl From<RelaySet> for RelaySelection<'_> {
    fn from(value: RelaySet) -> Self {
        Self::Mask(value.bits())
    }
}

impl<'a> From<&'a [bool]> for RelaySelection<'a> {
    fn from(value: &'a [bool]) -> Self {
        Self::Flags(value)
    }
}

impl<'a> From<&'a [u8]> for RelaySelection<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Numbers(value)
    }
}

impl TryFrom<RelaySelection<'_>> for RelaySet {
    type Error = InvalidArgument;

    fn try_from(value: RelaySelection<'_>) -> core::result::Result<Self, Self::Error> {
        value.normalize()
    }
}

impl<IFACE, CommE> Tle7230<IFACE>
where
    IFACE: Tle7230Interface<Error = CommE>,
{
    // ==================================================================
    // == Relay Control =================================================
    // ==================================================================
    /// Reads the commanded on/off state of `device`'s relays from `CTL`.
    pub fn relay_states(&mut self, device: Device) -> Result<RelaySet, CommE> {
        self.read_register(device, REG_CTL).map(RelaySet::from_bits)
    }

    /// Switches `relay` (1..=8) of `device` on.
    pub fn turn_relay_on(&mut self, device: Device, relay: u8) -> Result<RelaySet, CommE> {
        let selected = RelaySet::single(relay)?;
        self.update_control(device, |ctl| ctl | selected.bits())
    }

    /// Switches `relay` (1..=8) of `device` off.
    pub fn turn_relay_off(&mut self, device: Device, relay: u8) -> Result<RelaySet, CommE> {
        let selected = RelaySet::single(relay)?;
        self.update_control(device, |ctl| ctl & !selected.bits())
    }

    /// Switches every selected relay of `device` on, leaving the others as
    /// they are. The selection is validated before any transfer.
    pub fn turn_relays_on(
        &mut self,
        device: Device,
        selection: RelaySelection<'_>,
    ) -> Result<RelaySet, CommE> {
        let selected = selection.normalize()?;
        self.update_control(device, |ctl| ctl | selected.bits())
    }

    /// Switches every selected relay of `device` off, leaving the others as
    /// they are. The selection is validated before any transfer.
    pub fn turn_relays_off(
        &mut self,
        device: Device,
        selection: RelaySelection<'_>,
    ) -> Result<RelaySet, CommE> {
        let selected = selection.normalize()?;
        self.update_control(device, |ctl| ctl & !selected.bits())
    }

    /// Read-modify-write of `CTL`; returns the value written.
    fn update_control<F>(&mut self, device: Device, mutate: F) -> Result<RelaySet, CommE>
    where
        F: FnOnce(u8) -> u8,
    {
        let current = self.read_register(device, REG_CTL)?;
        let updated = mutate(current);
        debug!(
            "device {} CTL {:#x} -> {:#x}",
            u8::from(device),
            current,
            updated
        );

        if updated != current || !self.config().skip_redundant_writes {
            self.write_register(device, REG_CTL, updated)?;
        }
        Ok(RelaySet::from_bits(updated))
    }
}
