//! Optional control lines: the shared active-low reset input and the two
//! active-low fault outputs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::log::debug;
use crate::params::Device;

/// Width of the reset pulse driven by [`ControlPins::hardware_reset`].
pub const RESET_PULSE_US: u32 = 10;

/// Reset and fault lines of a TLE7230 pair.
pub struct ControlPins<RST, FLT> {
    reset: RST,
    faults: [FLT; 2],
}

impl<RST, FLT> ControlPins<RST, FLT>
where
    RST: OutputPin,
    FLT: InputPin,
{
    /// `flt1` and `flt2` are the fault outputs of device 1 and device 2.
    pub fn new(reset: RST, flt1: FLT, flt2: FLT) -> Self {
        Self {
            reset,
            faults: [flt1, flt2],
        }
    }

    /// Drives the reset line. `true` holds the devices in reset.
    pub fn set_reset(&mut self, asserted: bool) -> Result<(), RST::Error> {
        if asserted {
            self.reset.set_low()
        } else {
            self.reset.set_high()
        }
    }

    /// Pulses the reset line low and releases it.
    pub fn hardware_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), RST::Error> {
        debug!("hardware reset");
        self.reset.set_low()?;
        delay.delay_us(RESET_PULSE_US);
        self.reset.set_high()
    }

    /// Returns `true` while `device` signals a fault (line pulled low).
    pub fn fault(&mut self, device: Device) -> Result<bool, FLT::Error> {
        self.faults[device.index()].is_low()
    }

    /// Consumes the wrapper and returns `(reset, flt1, flt2)`.
    pub fn release(self) -> (RST, FLT, FLT) {
        let [flt1, flt2] = self.faults;
        (self.reset, flt1, flt2)
    }
}

#[cfg(test)]
mod tests {
    use super::ControlPins;
    use crate::params::Device;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn hardware_reset_pulses_low_then_high() {
        let reset = PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let flt1 = PinMock::new(&[]);
        let flt2 = PinMock::new(&[]);

        let mut pins = ControlPins::new(reset, flt1, flt2);
        pins.hardware_reset(&mut NoopDelay::new()).unwrap();

        let (mut reset, mut flt1, mut flt2) = pins.release();
        reset.done();
        flt1.done();
        flt2.done();
    }

    #[test]
    fn fault_lines_are_active_low() {
        let reset = PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let flt1 = PinMock::new(&[Transaction::get(State::High)]);
        let flt2 = PinMock::new(&[Transaction::get(State::Low)]);

        let mut pins = ControlPins::new(reset, flt1, flt2);
        pins.set_reset(true).unwrap();
        pins.set_reset(false).unwrap();
        assert!(!pins.fault(Device::One).unwrap());
        assert!(pins.fault(Device::Two).unwrap());

        let (mut reset, mut flt1, mut flt2) = pins.release();
        reset.done();
        flt1.done();
        flt2.done();
    }
}
