//! SPI interface implementations built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Mode, SpiDevice, MODE_1};

use super::{Channel, Tle7230Interface, Topology};

/// SPI mode required by the TLE7230 (CPOL = 0, CPHA = 1).
pub const MODE: Mode = MODE_1;

/// SCLK frequency used when the caller has no reason to pick another one.
pub const DEFAULT_FREQUENCY_HZ: u32 = 4_194_304;

/// Two devices, each behind its own chip-select.
pub struct IndependentSpi<SPI> {
    cs0: SPI,
    cs1: SPI,
}

impl<SPI> IndependentSpi<SPI> {
    /// Creates a new interface; `cs0` talks to device 1 and `cs1` to device 2.
    pub const fn new(cs0: SPI, cs1: SPI) -> Self {
        Self { cs0, cs1 }
    }

    /// Consumes the interface and returns both SPI devices.
    pub fn release(self) -> (SPI, SPI) {
        (self.cs0, self.cs1)
    }
}

impl<SPI> Tle7230Interface for IndependentSpi<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn topology(&self) -> Topology {
        Topology::Independent
    }

    fn transfer(&mut self, channel: Channel, frame: &mut [u8]) -> core::result::Result<(), Self::Error> {
        match channel {
            Channel::Cs0 => self.cs0.transfer_in_place(frame),
            Channel::Cs1 => self.cs1.transfer_in_place(frame),
        }
    }
}

/// Two devices cascaded behind a single chip-select.
pub struct DaisyChainSpi<SPI> {
    spi: SPI,
}

impl<SPI> DaisyChainSpi<SPI> {
    /// Creates a new interface from the SPI device driving the cascade.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Tle7230Interface for DaisyChainSpi<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn topology(&self) -> Topology {
        Topology::DaisyChained
    }

    // A cascade has a single chip-select, so `channel` is ignored.
    fn transfer(&mut self, _channel: Channel, frame: &mut [u8]) -> core::result::Result<(), Self::Error> {
        self.spi.transfer_in_place(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{DaisyChainSpi, IndependentSpi};
    use crate::interface::{Channel, Tle7230Interface, Topology};
    use embedded_hal_mock::eh1::spi::{Mock, Transaction};

    #[test]
    fn independent_routes_channels_to_their_devices() {
        let cs0_expectations = [
            Transaction::transaction_start(),
            Transaction::transfer_in_place(vec![0x47, 0x00], vec![0xFF, 0xFF]),
            Transaction::transaction_end(),
        ];
        let cs1_expectations = [
            Transaction::transaction_start(),
            Transaction::transfer_in_place(vec![0xC7, 0x0F], vec![0xAA, 0x55]),
            Transaction::transaction_end(),
        ];
        let mut cs0 = Mock::new(&cs0_expectations);
        let mut cs1 = Mock::new(&cs1_expectations);
        let mut interface = IndependentSpi::new(cs0.clone(), cs1.clone());
        assert_eq!(interface.topology(), Topology::Independent);

        let mut frame = [0x47, 0x00];
        interface.transfer(Channel::Cs0, &mut frame).unwrap();
        assert_eq!(frame, [0xFF, 0xFF]);

        let mut frame = [0xC7, 0x0F];
        interface.transfer(Channel::Cs1, &mut frame).unwrap();
        assert_eq!(frame, [0xAA, 0x55]);

        cs0.done();
        cs1.done();
    }

    #[test]
    fn daisy_chain_sends_whole_frame_on_single_device() {
        let expectations = [
            Transaction::transaction_start(),
            Transaction::transfer_in_place(
                vec![0x00, 0x00, 0x47, 0x00],
                vec![0x12, 0x34, 0x56, 0x78],
            ),
            Transaction::transaction_end(),
        ];
        let mut spi = Mock::new(&expectations);
        let mut interface = DaisyChainSpi::new(spi.clone());
        assert_eq!(interface.topology(), Topology::DaisyChained);

        let mut frame = [0x00, 0x00, 0x47, 0x00];
        interface.transfer(Channel::Cs1, &mut frame).unwrap();
        assert_eq!(frame, [0x12, 0x34, 0x56, 0x78]);

        spi.done();
    }
}
