//! Hardware capabilities the driver consumes.
//!
//! [`DisplayPort`] is the narrow interface between the driver and the board:
//! pin configuration and levels, SPI peripheral setup, and blocking bus
//! writes. Pins are addressed by the role they play ([`Line`]) so a port
//! built from typed HAL objects does not need to know GPIO numbers.
//!
//! [`SpiInterface`] implements the trait on top of `embedded-hal` 1.0
//! [`SpiBus`] and [`OutputPin`] objects.

use core::fmt;

use embedded_hal::digital::{self, OutputPin, PinState};
use embedded_hal::spi::{self, Mode, SpiBus, MODE_0};

use crate::config::PinAssignment;

/// The five display signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// SPI clock.
    Clock,
    /// SPI data out.
    DataOut,
    /// Chip select.
    ChipSelect,
    /// Data/command select: low = command, high = data.
    DataCommand,
    /// Active-low reset.
    Reset,
}

/// Pin direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Driven by the MCU.
    Output,
    /// Sampled by the MCU.
    Input,
}

/// Peripheral a pin is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinFunction {
    /// Plain software-controlled GPIO.
    Gpio,
    /// SPI peripheral.
    Spi,
}

/// Bit order on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first.
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}

/// SPI frame parameters. The MCU is always bus master.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiFormat {
    /// Bits per word.
    pub data_bits: u8,
    /// Clock polarity and phase.
    pub mode: Mode,
    /// Bit order.
    pub bit_order: BitOrder,
}

impl SpiFormat {
    /// 8-bit words, CPOL 0 / CPHA 0, MSB first.
    pub const SSD1306: Self = Self {
        data_bits: 8,
        mode: MODE_0,
        bit_order: BitOrder::MsbFirst,
    };
}

/// Board capabilities used by [`Ssd1306`](crate::Ssd1306).
///
/// Every method blocks until the hardware has completed the operation;
/// in particular [`write_blocking`](Self::write_blocking) does not return
/// until the last bit has been clocked out.
pub trait DisplayPort {
    /// Error reported by the board.
    type Error;

    /// Configure all five pins for plain digital I/O.
    fn init_pins(&mut self, pins: &PinAssignment) -> Result<(), Self::Error>;

    /// Set the direction of one pin.
    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Self::Error>;

    /// Route one pin to a peripheral.
    fn set_function(&mut self, line: Line, function: PinFunction) -> Result<(), Self::Error>;

    /// Drive an output pin.
    fn set_level(&mut self, line: Line, level: PinState) -> Result<(), Self::Error>;

    /// Initialise the SPI peripheral as master. Returns the clock rate the
    /// hardware actually achieved.
    fn init_bus(&mut self, baudrate: u32, format: &SpiFormat) -> Result<u32, Self::Error>;

    /// Write `bytes` and wait until the transfer has finished.
    fn write_blocking(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

// ── SpiInterface ─────────────────────────────────────────────────────────

/// Errors reported by [`SpiInterface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiInterfaceError {
    /// SPI bus failure.
    Spi(spi::ErrorKind),
    /// Failure driving a control pin.
    Pin(digital::ErrorKind),
}

impl fmt::Display for SpiInterfaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpiInterfaceError::Spi(kind) => write!(f, "SPI error: {}", kind),
            SpiInterfaceError::Pin(kind) => write!(f, "pin error: {}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SpiInterfaceError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SpiInterfaceError::Spi(_) => defmt::write!(f, "SPI error"),
            SpiInterfaceError::Pin(_) => defmt::write!(f, "Pin error"),
        }
    }
}

/// [`DisplayPort`] built from `embedded-hal` objects.
///
/// HAL constructors already configure typed pins and the SPI peripheral
/// (frequency, mode, pin routing), so the configuration calls succeed
/// without touching hardware and [`init_bus`](DisplayPort::init_bus)
/// reports the requested rate back. Construct the HAL SPI with
/// [`Config::baudrate`](crate::Config::baudrate) and [`SpiFormat::SSD1306`].
///
/// Levels for [`Line::ChipSelect`], [`Line::DataCommand`] and
/// [`Line::Reset`] go to the matching pin; the clock and data lines belong
/// to the SPI peripheral.
pub struct SpiInterface<SPI, CS, DC, RST> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
}

impl<SPI, CS, DC, RST> SpiInterface<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Bundle a bus and the three control pins.
    ///
    /// # Arguments
    /// * `spi` — SPI bus (exclusive; chip select is not toggled per transfer).
    /// * `cs` — chip select output.
    /// * `dc` — data/command select output.
    /// * `rst` — reset output.
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST) -> Self {
        Self { spi, cs, dc, rst }
    }

    /// Give back the bus and pins.
    pub fn release(self) -> (SPI, CS, DC, RST) {
        (self.spi, self.cs, self.dc, self.rst)
    }
}

fn pin_error<E: digital::Error>(e: E) -> SpiInterfaceError {
    SpiInterfaceError::Pin(e.kind())
}

fn spi_error<E: spi::Error>(e: E) -> SpiInterfaceError {
    SpiInterfaceError::Spi(e.kind())
}

impl<SPI, CS, DC, RST> DisplayPort for SpiInterface<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    type Error = SpiInterfaceError;

    fn init_pins(&mut self, _pins: &PinAssignment) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_direction(&mut self, _line: Line, _direction: Direction) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_function(&mut self, _line: Line, _function: PinFunction) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_level(&mut self, line: Line, level: PinState) -> Result<(), Self::Error> {
        match line {
            Line::ChipSelect => self.cs.set_state(level).map_err(pin_error),
            Line::DataCommand => self.dc.set_state(level).map_err(pin_error),
            Line::Reset => self.rst.set_state(level).map_err(pin_error),
            Line::Clock | Line::DataOut => Ok(()),
        }
    }

    fn init_bus(&mut self, baudrate: u32, _format: &SpiFormat) -> Result<u32, Self::Error> {
        Ok(baudrate)
    }

    fn write_blocking(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes).map_err(spi_error)?;
        self.spi.flush().map_err(spi_error)
    }
}
