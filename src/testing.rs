//! Simulated TLE7230 pair used by the unit tests.
//!
//! Each chip answers a frame with what it latched during the previous one,
//! like the real shift register: the diagnosis word, or the addressed
//! register after a read command.

use crate::frame::decode_command;
use crate::interface::{Channel, Tle7230Interface, Topology};
use crate::params::{Device, Opcode};
use crate::registers::{Register, MAX_ADDRESS, REG_STA};

/// Error returned by [`SimulatedBus`] on an injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latched {
    Diagnosis,
    Register(u8),
}

/// One simulated device.
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    /// Register file indexed by address; index 0 is unused.
    pub registers: [u8; 9],
    /// Word shifted out in response to non-read commands.
    pub diagnosis: u16,
    latched: Latched,
}

impl SimulatedChip {
    fn new() -> Self {
        let mut chip = Self {
            registers: [0; 9],
            diagnosis: 0xFFFF,
            latched: Latched::Diagnosis,
        };
        chip.reset();
        chip
    }

    fn reset(&mut self) {
        for register in [
            Register::Map,
            Register::Bol,
            Register::Ovl,
            Register::Ovt,
            Register::Sle,
            Register::Ctl,
        ] {
            self.registers[register.address() as usize] = register.reset_value().unwrap_or(0);
        }
    }

    fn clock(&mut self, input: [u8; 2]) -> [u8; 2] {
        let output = match self.latched {
            Latched::Diagnosis => self.diagnosis.to_be_bytes(),
            Latched::Register(address) => [0x00, self.registers[address as usize]],
        };

        let (opcode, address) = decode_command(input[0]);
        let addressable = (1..=MAX_ADDRESS).contains(&address);
        self.latched = match opcode {
            Opcode::ReadRegister if addressable => Latched::Register(address),
            Opcode::WriteRegister if addressable && address != REG_STA => {
                self.registers[address as usize] = input[1];
                Latched::Diagnosis
            }
            Opcode::ResetDevice => {
                self.reset();
                Latched::Diagnosis
            }
            _ => Latched::Diagnosis,
        };
        output
    }
}

struct Record {
    channel: Channel,
    sent: Vec<u8>,
    received: Vec<u8>,
}

/// Transport adapter wired to two simulated chips.
pub struct SimulatedBus {
    topology: Topology,
    chips: [SimulatedChip; 2],
    records: Vec<Record>,
    fail_at: Option<usize>,
}

impl SimulatedBus {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            chips: [SimulatedChip::new(), SimulatedChip::new()],
            records: Vec::new(),
            fail_at: None,
        }
    }

    pub fn chip_mut(&mut self, device: Device) -> &mut SimulatedChip {
        &mut self.chips[device.index()]
    }

    /// Makes the transfer with the given zero-based index fail.
    pub fn fail_at(&mut self, index: usize) {
        self.fail_at = Some(index);
    }

    /// Number of attempted transfers, failed ones included.
    pub fn transfers(&self) -> usize {
        self.records.len()
    }

    pub fn sent(&self, index: usize) -> (Channel, &[u8]) {
        let record = &self.records[index];
        (record.channel, &record.sent)
    }

    pub fn received(&self, index: usize) -> &[u8] {
        &self.records[index].received
    }
}

impl Tle7230Interface for SimulatedBus {
    type Error = FakeError;

    fn topology(&self) -> Topology {
        self.topology
    }

    fn transfer(&mut self, channel: Channel, frame: &mut [u8]) -> Result<(), Self::Error> {
        let sent = frame.to_vec();
        if self.fail_at == Some(self.records.len()) {
            self.records.push(Record {
                channel,
                received: sent.clone(),
                sent,
            });
            return Err(FakeError);
        }

        assert_eq!(frame.len(), self.topology.frame_len(), "frame length mismatch");
        match self.topology {
            Topology::Independent => {
                let chip = match channel {
                    Channel::Cs0 => &mut self.chips[0],
                    Channel::Cs1 => &mut self.chips[1],
                };
                let output = chip.clock([frame[0], frame[1]]);
                frame.copy_from_slice(&output);
            }
            Topology::DaisyChained => {
                assert_eq!(channel, Channel::Cs0, "cascade lives on chip-select 0");
                let second = self.chips[1].clock([frame[0], frame[1]]);
                let first = self.chips[0].clock([frame[2], frame[3]]);
                frame[..2].copy_from_slice(&second);
                frame[2..].copy_from_slice(&first);
            }
        }

        self.records.push(Record {
            channel,
            sent,
            received: frame.to_vec(),
        });
        Ok(())
    }
}
