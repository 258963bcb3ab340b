//! Diagnosis word decoding and the per-device status store.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::error::InvalidArgument;
use crate::params::{Device, RelayHealth};

/// Value every diagnosis word holds before the first transfer.
pub const DIAGNOSIS_ALL_NORMAL: u16 = 0xFFFF;

/// Bitfield representation of the 16-bit diagnosis word shifted out with
/// every frame. Layout: `0b8877_6655_4433_2211`, two bits per output.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosisWord {
    pub out1: RelayHealth,
    pub out2: RelayHealth,
    pub out3: RelayHealth,
    pub out4: RelayHealth,
    pub out5: RelayHealth,
    pub out6: RelayHealth,
    pub out7: RelayHealth,
    pub out8: RelayHealth,
}

impl DiagnosisWord {
    /// Word reporting normal function on every output.
    pub fn all_normal() -> Self {
        Self::from(DIAGNOSIS_ALL_NORMAL)
    }

    /// Decodes the two bytes in wire order (high byte first).
    pub fn from_wire(high: u8, low: u8) -> Self {
        Self::from(u16::from_be_bytes([high, low]))
    }

    /// Health of output `relay` (1..=8).
    pub fn relay(&self, relay: u8) -> core::result::Result<RelayHealth, InvalidArgument> {
        let health = match relay {
            1 => self.out1(),
            2 => self.out2(),
            3 => self.out3(),
            4 => self.out4(),
            5 => self.out5(),
            6 => self.out6(),
            7 => self.out7(),
            8 => self.out8(),
            other => return Err(InvalidArgument::Relay(other)),
        };
        Ok(health)
    }

    /// Returns `true` when every output reports normal function.
    pub fn is_normal(&self) -> bool {
        u16::from(*self) == DIAGNOSIS_ALL_NORMAL
    }

    /// Iterates over `(relay, health)` for all eight outputs.
    pub fn relays(&self) -> impl Iterator<Item = (u8, RelayHealth)> + '_ {
        (1..=8u8).filter_map(move |relay| self.relay(relay).ok().map(|health| (relay, health)))
    }

    /// Iterates over the outputs that do not report normal function.
    pub fn faults(&self) -> impl Iterator<Item = (u8, RelayHealth)> + '_ {
        self.relays().filter(|(_, health)| !health.is_normal())
    }
}

impl From<u16> for DiagnosisWord {
    fn from(value: u16) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<DiagnosisWord> for u16 {
    fn from(value: DiagnosisWord) -> Self {
        u16::from_le_bytes(value.into_bytes())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DiagnosisWord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "DiagnosisWord {{ OUT1: {}, OUT2: {}, OUT3: {}, OUT4: {}, OUT5: {}, OUT6: {}, OUT7: {}, OUT8: {} }}",
            self.out1(),
            self.out2(),
            self.out3(),
            self.out4(),
            self.out5(),
            self.out6(),
            self.out7(),
            self.out8()
        );
    }
}

/// Latest diagnosis word of each device.
///
/// Words are replaced wholesale from completed transfers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticStatus {
    words: [DiagnosisWord; 2],
}

impl DiagnosticStatus {
    /// Creates a store with both devices reporting normal function.
    pub fn new() -> Self {
        Self {
            words: [DiagnosisWord::all_normal(); 2],
        }
    }

    /// Snapshot of one device's word.
    pub fn word(&self, device: Device) -> DiagnosisWord {
        self.words[device.index()]
    }

    /// Snapshot of both words, device 1 first.
    pub fn pair(&self) -> (DiagnosisWord, DiagnosisWord) {
        (self.words[0], self.words[1])
    }

    /// Health of `relay` on `device`.
    pub fn relay_health(
        &self,
        device: Device,
        relay: u8,
    ) -> core::result::Result<RelayHealth, InvalidArgument> {
        self.word(device).relay(relay)
    }

    pub(crate) fn store(&mut self, device: Device, word: DiagnosisWord) {
        self.words[device.index()] = word;
    }

    /// Line-per-relay report of both devices.
    pub fn report(&self) -> DiagnosisReport {
        DiagnosisReport { status: *self }
    }
}

impl Default for DiagnosticStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// `Display` adapter printing one line per device and relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosisReport {
    status: DiagnosticStatus,
}

impl core::fmt::Display for DiagnosisReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for device in Device::ALL {
            for (relay, health) in self.status.word(device).relays() {
                writeln!(f, "DEVICE {} RELAY {}: {}", u8::from(device), relay, health)?;
            }
        }
        Ok(())
    }
}
