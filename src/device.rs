//! High-level TLE7230 pair driver implementation.
//!
//! The devices answer every 16-bit frame with whatever their shift register
//! latched during the previous frame: normally the diagnosis word, or the
//! contents of a register after a read command. Reads therefore take two
//! transfers, while writes, resets and diagnosis requests take one and return
//! fresh diagnosis words synchronously.
//!
//! Every operation validates its arguments and the topology before the first
//! transfer, and stops at the first failed transfer without retrying. Words
//! received in earlier successful transfers of the same call stay stored.

use crate::config::Config;
use crate::diagnosis::{DiagnosisReport, DiagnosisWord, DiagnosticStatus};
use crate::error::{Error, Result};
use crate::frame::{Frame, FrameStatus, Slot};
use crate::interface::spi::{DaisyChainSpi, IndependentSpi};
use crate::interface::{Channel, Tle7230Interface, Topology};
use crate::log::{debug, trace, warning};
use crate::params::{Device, RelayHealth};
use crate::registers::validate_address;
use embedded_hal::spi::SpiDevice;

/// High-level synchronous driver for a pair of TLE7230 devices.
///
/// The driver assumes it is the only master talking to the devices; relay
/// updates are read-modify-write sequences that another master could race.
pub struct Tle7230<IFACE> {
    interface: IFACE,
    config: Config,
    topology: Topology,
    status: DiagnosticStatus,
}

/// A read command has been clocked in; the register contents wait in the
/// shift register(s) until the next frame.
#[must_use]
struct PendingRead {
    device: Device,
}

impl<IFACE> Tle7230<IFACE> {
    // ==================================================================
    // == Driver Ownership ==============================================
    // ==================================================================
    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the active configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Wiring of the devices, fixed at construction.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    // ==================================================================
    // == Diagnosis Snapshots ===========================================
    // ==================================================================
    /// Last diagnosis word received from `device`.
    pub fn diagnosis(&self, device: Device) -> DiagnosisWord {
        self.status.word(device)
    }

    /// Last diagnosis words of both devices, device 1 first.
    pub fn diagnosis_pair(&self) -> (DiagnosisWord, DiagnosisWord) {
        self.status.pair()
    }

    /// Copy of the whole diagnosis store.
    pub fn status(&self) -> DiagnosticStatus {
        self.status
    }

    /// Printable per-relay report of the last diagnosis words.
    pub fn report(&self) -> DiagnosisReport {
        self.status.report()
    }
}

impl<SPI> Tle7230<IndependentSpi<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for two devices on separate chip-selects.
    pub fn new_independent(cs0: SPI, cs1: SPI, config: Config) -> Self {
        Self::new(IndependentSpi::new(cs0, cs1), config)
    }

    /// Releases the driver, returning both SPI devices and the configuration.
    pub fn release_independent(self) -> (SPI, SPI, Config) {
        let (iface, config) = self.release();
        let (cs0, cs1) = iface.release();
        (cs0, cs1, config)
    }
}

impl<SPI> Tle7230<DaisyChainSpi<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for two cascaded devices on one chip-select.
    pub fn new_daisy_chain(spi: SPI, config: Config) -> Self {
        Self::new(DaisyChainSpi::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and the configuration.
    pub fn release_daisy_chain(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Tle7230<IFACE>
where
    IFACE: Tle7230Interface<Error = CommE>,
{
    // ==================================================================
    // == Construction & Initialization =================================
    // ==================================================================
    /// Creates a new driver instance without touching the bus.
    ///
    /// Both diagnosis words start out as "normal" until the first transfer.
    pub fn new(interface: IFACE, config: Config) -> Self {
        let topology = interface.topology();
        Self {
            interface,
            config,
            topology,
            status: DiagnosticStatus::new(),
        }
    }

    /// Creates a driver and initializes the devices.
    ///
    /// A transfer failure is reported as [`Error::Initialization`] and no
    /// driver is returned; the interface is dropped with it.
    pub fn connect(interface: IFACE, config: Config) -> Result<Self, CommE> {
        let mut driver = Self::new(interface, config);
        driver.init().map_err(|err| match err {
            Error::Interface(err) => Error::Initialization(err),
            other => other,
        })?;
        Ok(driver)
    }

    /// Fetches the diagnosis of both devices and, if configured, resets
    /// their registers.
    pub fn init(&mut self) -> Result<(), CommE> {
        debug!("initializing TLE7230 pair ({:?})", self.topology);
        self.update_diagnosis()?;
        if self.config.reset_on_init {
            self.reset_all()?;
        }
        Ok(())
    }

    // ==================================================================
    // == Diagnosis =====================================================
    // ==================================================================
    /// Health of `relay` (1..=8) on `device` according to the last
    /// diagnosis word.
    pub fn relay_health(&self, device: Device, relay: u8) -> Result<RelayHealth, CommE> {
        Ok(self.status.relay_health(device, relay)?)
    }

    /// Sends a diagnosis-only command to both devices, refreshing both
    /// diagnosis words.
    pub fn update_diagnosis(&mut self) -> Result<(), CommE> {
        self.broadcast(Slot::DIAGNOSIS, Slot::DIAGNOSIS)
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads the register at `address` (1..=8) of `device`.
    ///
    /// Takes two transfers. The first carries the read command and returns
    /// the diagnosis word, which is stored; the second returns the register
    /// contents. In a cascade both devices read `address` through
    /// [`Tle7230::read_registers`] and the value of `device` is returned.
    pub fn read_register(&mut self, device: Device, address: u8) -> Result<u8, CommE> {
        validate_address(address)?;
        match self.topology {
            Topology::Independent => self.read_single(device, address),
            Topology::DaisyChained => {
                let (first, second) = self.read_registers(address, address)?;
                Ok(match device {
                    Device::One => first,
                    Device::Two => second,
                })
            }
        }
    }

    /// Two-step read of a single device on its own chip-select.
    ///
    /// Fails with [`Error::ModeViolation`] before any transfer when the
    /// devices are daisy-chained.
    pub fn read_single(&mut self, device: Device, address: u8) -> Result<u8, CommE> {
        let slot = Slot::read(address)?;
        self.require(Topology::Independent)?;

        let pending = self.issue_read(device, Frame::single(slot))?;
        let frame = self.collect(pending)?;
        Ok(frame.register_value(device))
    }

    /// Reads `address1` of device 1 and `address2` of device 2 in one
    /// cascade read sequence. Daisy chain only.
    ///
    /// Both transfers refresh the diagnosis words of both devices.
    pub fn read_registers(&mut self, address1: u8, address2: u8) -> Result<(u8, u8), CommE> {
        let first = Slot::read(address1)?;
        let second = Slot::read(address2)?;
        self.require(Topology::DaisyChained)?;

        let pending = self.issue_read(Device::One, Frame::chained(first, second))?;
        let frame = self.collect(pending)?;
        Ok((
            frame.register_value(Device::One),
            frame.register_value(Device::Two),
        ))
    }

    /// Writes `data` to `address` of `device`.
    ///
    /// In a cascade the other device receives a diagnosis-only command.
    pub fn write_register(&mut self, device: Device, address: u8, data: u8) -> Result<(), CommE> {
        let slot = Slot::write(address, data)?;
        self.transact(device, Frame::for_device(self.topology, device, slot))?;
        Ok(())
    }

    /// Writes `data1` to `address1` of device 1 and `data2` to `address2`
    /// of device 2.
    ///
    /// On separate chip-selects device 1 is written first; a failure on
    /// device 2 leaves device 1 written.
    pub fn write_registers(
        &mut self,
        address1: u8,
        address2: u8,
        data1: u8,
        data2: u8,
    ) -> Result<(), CommE> {
        let first = Slot::write(address1, data1)?;
        let second = Slot::write(address2, data2)?;
        self.broadcast(first, second)
    }

    /// Returns the logic registers of `device` to their defaults.
    pub fn reset_registers(&mut self, device: Device) -> Result<(), CommE> {
        debug!("resetting device {}", u8::from(device));
        self.transact(device, Frame::for_device(self.topology, device, Slot::RESET))?;
        Ok(())
    }

    /// Returns the logic registers of both devices to their defaults.
    pub fn reset_all(&mut self) -> Result<(), CommE> {
        debug!("resetting both devices");
        self.broadcast(Slot::RESET, Slot::RESET)
    }

    // ==================================================================
    // == Transfer Plumbing =============================================
    // ==================================================================
    fn require(&self, topology: Topology) -> Result<(), CommE> {
        if self.topology == topology {
            Ok(())
        } else {
            Err(Error::ModeViolation { required: topology })
        }
    }

    fn channel(&self, device: Device) -> Channel {
        match (self.topology, device) {
            (Topology::DaisyChained, _) => Channel::Cs0,
            (Topology::Independent, Device::One) => Channel::Cs0,
            (Topology::Independent, Device::Two) => Channel::Cs1,
        }
    }

    /// First read step: clock the read command in and store the diagnosis
    /// shifted out alongside it.
    fn issue_read(&mut self, device: Device, frame: Frame) -> Result<PendingRead, CommE> {
        self.transact(device, frame)?;
        Ok(PendingRead { device })
    }

    /// Second read step: a diagnosis-only frame pushes the latched register
    /// contents out. A cascade stores both received halves as diagnosis
    /// again; a single device's frame is register data only.
    fn collect(&mut self, pending: PendingRead) -> Result<Frame, CommE> {
        let mut frame = Frame::diagnosis(self.topology);
        match self.topology {
            Topology::DaisyChained => self.transact(pending.device, frame),
            Topology::Independent => {
                self.exchange(self.channel(pending.device), &mut frame)?;
                Ok(frame)
            }
        }
    }

    /// Sends `first` to device 1 and `second` to device 2: one frame in a
    /// cascade, one frame per chip-select otherwise.
    fn broadcast(&mut self, first: Slot, second: Slot) -> Result<(), CommE> {
        match self.topology {
            Topology::Independent => {
                self.transact(Device::One, Frame::single(first))?;
                self.transact(Device::Two, Frame::single(second))?;
            }
            Topology::DaisyChained => {
                self.transact(Device::One, Frame::chained(first, second))?;
            }
        }
        Ok(())
    }

    /// Exchanges `frame` with `device` and stores the diagnosis word(s) it
    /// returns.
    fn transact(&mut self, device: Device, mut frame: Frame) -> Result<Frame, CommE> {
        self.exchange(self.channel(device), &mut frame)?;
        match frame.status() {
            FrameStatus::Single(word) => self.store(device, word),
            FrameStatus::Chained { first, second } => {
                self.store(Device::One, first);
                self.store(Device::Two, second);
            }
        }
        Ok(frame)
    }

    fn store(&mut self, device: Device, word: DiagnosisWord) {
        if !word.is_normal() {
            warning!(
                "device {} diagnosis {:#x}",
                u8::from(device),
                u16::from(word)
            );
        }
        self.status.store(device, word);
    }

    fn exchange(&mut self, channel: Channel, frame: &mut Frame) -> Result<(), CommE> {
        trace!("spi out {:?}: {:?}", channel, frame.as_bytes());
        if let Err(err) = self.interface.transfer(channel, frame.as_mut_bytes()) {
            warning!("spi transfer on {:?} failed", channel);
            return Err(Error::Interface(err));
        }
        trace!("spi in {:?}: {:?}", channel, frame.as_bytes());
        Ok(())
    }
}
