//! Wire-level command frames and the decoding of what the devices shift back.
//!
//! A frame is a plain stack array exchanged full-duplex with the bus: it is
//! built from the command bytes, handed to the transport, and afterwards holds
//! the received bytes. Nothing here performs I/O.
//!
//! Byte order on the wire, index 0 shifted out first:
//!
//! ```text
//! independent:   [0: command][1: data]
//! daisy-chained: [0: command 2][1: data 2][2: command 1][3: data 1]
//! ```
//!
//! In a cascade the first half travels through device 1 into device 2, so
//! device 2's fields sit in the low half and device 1's in the high half. The
//! received frame follows the same split: device 2 shifts its word out first.

use crate::diagnosis::DiagnosisWord;
use crate::error::InvalidArgument;
use crate::interface::Topology;
use crate::params::{Device, Opcode};
use crate::registers::{validate_address, Command};

/// Command byte of a diagnosis-only frame.
pub const DIAGNOSIS_ONLY: u8 = 0b00_000000;
/// Command byte of a device reset.
pub const RESET_DEVICE: u8 = 0b10_000000;

/// Builds a command byte: `(opcode << 6) | address`.
///
/// Fails when `address` is outside `1..=8`.
pub fn encode_command(opcode: Opcode, address: u8) -> core::result::Result<u8, InvalidArgument> {
    let address = validate_address(address)?;
    Ok(Command::new().with_opcode(opcode).with_address(address).into())
}

/// Splits a command byte back into opcode and address.
pub fn decode_command(byte: u8) -> (Opcode, u8) {
    let command = Command::from(byte);
    (command.opcode(), command.address())
}

/// Command and data byte addressed to one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    /// Command byte.
    pub command: u8,
    /// Data byte; ignored by the device unless the command is a write.
    pub data: u8,
}

impl Slot {
    /// Diagnosis-only slot; leaves the device untouched.
    pub const DIAGNOSIS: Slot = Slot {
        command: DIAGNOSIS_ONLY,
        data: 0x00,
    };

    /// Reset slot.
    pub const RESET: Slot = Slot {
        command: RESET_DEVICE,
        data: 0x00,
    };

    /// Read command for `address`.
    pub fn read(address: u8) -> core::result::Result<Self, InvalidArgument> {
        Ok(Self {
            command: encode_command(Opcode::ReadRegister, address)?,
            data: 0x00,
        })
    }

    /// Write command storing `data` at `address`.
    pub fn write(address: u8, data: u8) -> core::result::Result<Self, InvalidArgument> {
        Ok(Self {
            command: encode_command(Opcode::WriteRegister, address)?,
            data,
        })
    }
}

/// Diagnosis words decoded from a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Word of the single device on the channel.
    Single(DiagnosisWord),
    /// Words of both cascaded devices.
    Chained {
        /// Device 1 (bytes 2 and 3).
        first: DiagnosisWord,
        /// Device 2 (bytes 0 and 1).
        second: DiagnosisWord,
    },
}

/// One full-duplex transfer worth of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// 16-bit frame for a device behind its own chip-select.
    Single([u8; 2]),
    /// 32-bit frame for the cascade.
    Chained([u8; 4]),
}

impl Frame {
    /// Frame for a device behind its own chip-select.
    pub const fn single(slot: Slot) -> Self {
        Self::Single([slot.command, slot.data])
    }

    /// Cascade frame carrying `first` to device 1 and `second` to device 2.
    pub const fn chained(first: Slot, second: Slot) -> Self {
        Self::Chained([second.command, second.data, first.command, first.data])
    }

    /// Frame addressing `slot` to `device` only.
    ///
    /// In a cascade the other device receives a diagnosis-only command.
    pub const fn for_device(topology: Topology, device: Device, slot: Slot) -> Self {
        match (topology, device) {
            (Topology::Independent, _) => Self::single(slot),
            (Topology::DaisyChained, Device::One) => Self::chained(slot, Slot::DIAGNOSIS),
            (Topology::DaisyChained, Device::Two) => Self::chained(Slot::DIAGNOSIS, slot),
        }
    }

    /// Diagnosis-only frame.
    pub const fn diagnosis(topology: Topology) -> Self {
        match topology {
            Topology::Independent => Self::single(Slot::DIAGNOSIS),
            Topology::DaisyChained => Self::chained(Slot::DIAGNOSIS, Slot::DIAGNOSIS),
        }
    }

    /// Bytes in wire order.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Single(bytes) => &bytes[..],
            Self::Chained(bytes) => &bytes[..],
        }
    }

    /// Mutable bytes in wire order, handed to the transport.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        match self {
            Self::Single(bytes) => &mut bytes[..],
            Self::Chained(bytes) => &mut bytes[..],
        }
    }

    /// Index of the command byte belonging to `device`; the data byte
    /// follows it.
    const fn slot_offset(&self, device: Device) -> usize {
        match (self, device) {
            (Self::Single(_), _) => 0,
            (Self::Chained(_), Device::One) => 2,
            (Self::Chained(_), Device::Two) => 0,
        }
    }

    /// Command and data byte currently held for `device`.
    pub fn slot(&self, device: Device) -> Slot {
        let offset = self.slot_offset(device);
        let bytes = self.as_bytes();
        Slot {
            command: bytes[offset],
            data: bytes[offset + 1],
        }
    }

    /// Decodes the received diagnosis word(s).
    pub fn status(&self) -> FrameStatus {
        match self {
            Self::Single(_) => FrameStatus::Single(self.word(Device::One)),
            Self::Chained(_) => FrameStatus::Chained {
                first: self.word(Device::One),
                second: self.word(Device::Two),
            },
        }
    }

    /// Received diagnosis word of `device`. A single frame only carries the
    /// word of whichever device it was exchanged with.
    pub fn word(&self, device: Device) -> DiagnosisWord {
        let slot = self.slot(device);
        DiagnosisWord::from_wire(slot.command, slot.data)
    }

    /// Register contents shifted out by `device` in response to the previous
    /// read command.
    pub fn register_value(&self, device: Device) -> u8 {
        self.slot(device).data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RelayHealth;
    use crate::registers::{REG_CTL, REG_MAP};

    #[test]
    fn command_roundtrips_for_every_valid_address() {
        for address in 1..=8u8 {
            for opcode in [Opcode::ReadRegister, Opcode::WriteRegister] {
                let byte = encode_command(opcode, address).unwrap();
                assert_eq!(byte, (opcode.bits() << 6) | address);
                assert_eq!(decode_command(byte), (opcode, address));
            }
        }
    }

    #[test]
    fn command_rejects_out_of_range_addresses() {
        for address in [0u8, 9, 0x3F, 0xFF] {
            assert_eq!(
                encode_command(Opcode::WriteRegister, address),
                Err(InvalidArgument::Address(address))
            );
            assert_eq!(Slot::read(address), Err(InvalidArgument::Address(address)));
        }
    }

    #[test]
    fn fixed_commands_match_opcodes() {
        assert_eq!(decode_command(DIAGNOSIS_ONLY).0, Opcode::DiagnosisOnly);
        assert_eq!(decode_command(RESET_DEVICE).0, Opcode::ResetDevice);
    }

    #[test]
    fn chained_frame_puts_device_two_first() {
        let first = Slot::write(REG_CTL, 0xA1).unwrap();
        let second = Slot::write(REG_MAP, 0x5B).unwrap();
        let frame = Frame::chained(first, second);
        assert_eq!(frame.as_bytes(), &[0xC1, 0x5B, 0xC7, 0xA1]);
        assert_eq!(frame.slot(Device::One), first);
        assert_eq!(frame.slot(Device::Two), second);
    }

    #[test]
    fn single_device_write_in_cascade_spares_the_other_device() {
        let slot = Slot::write(REG_CTL, 0x0F).unwrap();

        let frame = Frame::for_device(Topology::DaisyChained, Device::One, slot);
        assert_eq!(frame.as_bytes(), &[0x00, 0x00, 0xC7, 0x0F]);

        let frame = Frame::for_device(Topology::DaisyChained, Device::Two, slot);
        assert_eq!(frame.as_bytes(), &[0xC7, 0x0F, 0x00, 0x00]);

        let frame = Frame::for_device(Topology::Independent, Device::Two, slot);
        assert_eq!(frame.as_bytes(), &[0xC7, 0x0F]);
    }

    #[test]
    fn register_value_offsets_follow_topology_and_device() {
        let single = Frame::Single([0x11, 0x22]);
        assert_eq!(single.register_value(Device::One), 0x22);
        assert_eq!(single.register_value(Device::Two), 0x22);

        let chained = Frame::Chained([0x11, 0x22, 0x33, 0x44]);
        assert_eq!(chained.register_value(Device::One), 0x44);
        assert_eq!(chained.register_value(Device::Two), 0x22);
    }

    #[test]
    fn chained_status_splits_halves() {
        let frame = Frame::Chained([0xFF, 0xFE, 0x7F, 0xFF]);
        match frame.status() {
            FrameStatus::Chained { first, second } => {
                assert_eq!(first.relay(8), Ok(RelayHealth::OpenLoad));
                assert!(first.relay(1).unwrap().is_normal());
                assert_eq!(second.relay(1), Ok(RelayHealth::Overload));
                assert!(second.relay(8).unwrap().is_normal());
            }
            other => panic!("unexpected status {other:?}"),
        }

        let frame = Frame::Single([0xE4, 0xE4]);
        assert_eq!(
            frame.status(),
            FrameStatus::Single(DiagnosisWord::from(0xE4E4_u16))
        );
    }

    #[test]
    fn diagnosis_frames_have_topology_length() {
        assert_eq!(Frame::diagnosis(Topology::Independent).as_bytes(), &[0, 0]);
        assert_eq!(Frame::diagnosis(Topology::DaisyChained).as_bytes(), &[0, 0, 0, 0]);
        assert_eq!(
            Frame::diagnosis(Topology::DaisyChained).as_bytes().len(),
            Topology::DaisyChained.frame_len()
        );
    }
}
