//! Core SSD1306 driver.
//!
//! [`Ssd1306`] manages the display lifecycle: construction without bus
//! traffic, explicit bring-up, pixel mutation in a caller-owned framebuffer,
//! and full-frame flush.
//!
//! All operations are blocking. A call that touches the bus returns only
//! after the last byte has been clocked out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::command::{addressing_preamble, init_sequence, Command};
use crate::config::Config;
use crate::error::Ssd1306Error;
use crate::interface::{Direction, DisplayPort, Line, PinFunction, SpiFormat};

/// What [`Ssd1306::draw_pixel()`] does to the addressed bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelMode {
    /// Clear the pixel.
    Off = 0,
    /// Set the pixel.
    On = 1,
    /// Flip the pixel.
    Inverted = 2,
}

impl TryFrom<u8> for PixelMode {
    /// The unrecognised raw value.
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PixelMode::Off),
            1 => Ok(PixelMode::On),
            2 => Ok(PixelMode::Inverted),
            other => Err(other),
        }
    }
}

/// Blocking driver for an SSD1306 panel on SPI.
///
/// The framebuffer is borrowed from the caller for `'buf` and never
/// allocated or freed by the driver.
///
/// # Lifecycle
///
/// 1. [`Ssd1306::new()`] — stores the configuration and clears the buffer.
///    No bus traffic.
/// 2. [`Ssd1306::start()`] — configures pins and bus, resets the panel and
///    sends the initialisation sequence.
/// 3. Draw with [`Ssd1306::draw_pixel()`] or `embedded-graphics`.
/// 4. [`Ssd1306::update()`] — transfers the whole framebuffer.
/// 5. [`Ssd1306::teardown()`] — hands the buffer back.
///
/// # Example
///
/// ```no_run
/// use ssd1306_spi_rs::{buffer_size, Config, PixelMode, Ssd1306};
///
/// # fn example<P: ssd1306_spi_rs::DisplayPort>(
/// #     port: P,
/// #     delay: impl embedded_hal::delay::DelayNs,
/// # ) -> Result<(), ssd1306_spi_rs::Ssd1306Error<P::Error>> {
/// let mut buffer = [0u8; buffer_size(128, 64)];
/// let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buffer)?;
/// oled.start()?;
/// oled.draw_pixel(10, 20, PixelMode::On)?;
/// oled.update()?;
/// # Ok(())
/// # }
/// ```
pub struct Ssd1306<'buf, P, D> {
    port: P,
    delay: D,
    config: Config,
    /// Exactly `config.buffer_size()` bytes. `None` after teardown.
    buffer: Option<&'buf mut [u8]>,
    /// Set after a successful `start()`.
    started: bool,
}

impl<'buf, P, D> Ssd1306<'buf, P, D>
where
    P: DisplayPort,
    D: DelayNs,
{
    /// Construct a driver and clear `buffer`.
    ///
    /// No bus traffic is generated. Only the first
    /// [`config.buffer_size()`](Config::buffer_size) bytes of `buffer` are
    /// used.
    ///
    /// # Errors
    ///
    /// * [`Ssd1306Error::InvalidGeometry`] if width or height is zero.
    /// * [`Ssd1306Error::BufferTooSmall`] if `buffer` cannot hold a frame.
    pub fn new(
        config: Config,
        port: P,
        delay: D,
        buffer: &'buf mut [u8],
    ) -> Result<Self, Ssd1306Error<P::Error>> {
        if config.width == 0 || config.height == 0 {
            return Err(Ssd1306Error::InvalidGeometry);
        }

        let expected = config.buffer_size();
        if buffer.len() < expected {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Framebuffer rejected: {} bytes, need {}",
                buffer.len(),
                expected
            );
            return Err(Ssd1306Error::BufferTooSmall {
                expected,
                actual: buffer.len(),
            });
        }
        let (frame, _) = buffer.split_at_mut(expected);

        let mut driver = Self {
            port,
            delay,
            config,
            buffer: Some(frame),
            started: false,
        };
        driver.clear();
        Ok(driver)
    }

    /// Release the framebuffer.
    ///
    /// Returns the buffer the first time and `None` afterwards. No bus
    /// traffic; the panel keeps showing the last flushed frame.
    pub fn teardown(&mut self) -> Option<&'buf mut [u8]> {
        self.buffer.take()
    }

    /// Consume the driver and give back the port and delay so a new driver
    /// can be built on the same hardware.
    pub fn release(self) -> (P, D) {
        (self.port, self.delay)
    }

    // -----------------------------------------------------------------------
    // Bring-up
    // -----------------------------------------------------------------------

    /// Bring the panel from power-on to displaying the framebuffer.
    ///
    /// Configures pins and the SPI bus, holds the panel in reset, then
    /// pulses reset and sends the initialisation sequence from
    /// [`init_sequence()`](crate::command::init_sequence). Blocks for at
    /// least 11 ms.
    ///
    /// # Errors
    ///
    /// Returns [`Ssd1306Error::Bus`] if any pin or bus operation fails.
    pub fn start(&mut self) -> Result<(), Ssd1306Error<P::Error>> {
        let result = self.bring_up();

        if result.is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("SSD1306 bring-up failed");
        }

        result
    }

    fn bring_up(&mut self) -> Result<(), Ssd1306Error<P::Error>> {
        self.port.init_pins(&self.config.pins)?;

        // Hold the controller in reset while the bus comes up.
        self.port.set_direction(Line::Reset, Direction::Output)?;
        self.port.set_level(Line::Reset, PinState::Low)?;

        let _actual_baud = self
            .port
            .init_bus(self.config.baudrate, &SpiFormat::SSD1306)?;

        self.port.set_function(Line::DataOut, PinFunction::Spi)?;
        self.port.set_function(Line::Clock, PinFunction::Spi)?;

        // Sole device on the bus: selected for good.
        self.port.set_direction(Line::ChipSelect, Direction::Output)?;
        self.port.set_level(Line::ChipSelect, PinState::Low)?;

        self.port.set_direction(Line::DataCommand, Direction::Output)?;
        self.port.set_level(Line::DataCommand, PinState::Low)?;

        self.delay.delay_ms(1);
        self.send_init_commands()?;
        self.started = true;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "SSD1306 {}x{} started, SPI at {} Hz",
            self.config.width,
            self.config.height,
            _actual_baud
        );

        Ok(())
    }

    fn send_init_commands(&mut self) -> Result<(), Ssd1306Error<P::Error>> {
        self.port.set_level(Line::Reset, PinState::Low)?;
        self.delay.delay_ms(10);
        self.port.set_level(Line::Reset, PinState::High)?;

        let sequence = init_sequence(&self.config);
        self.send_commands(&sequence)
    }

    // -----------------------------------------------------------------------
    // Command transmission
    // -----------------------------------------------------------------------

    /// Send one command byte (DC low).
    pub fn send_command(&mut self, code: u8) -> Result<(), Ssd1306Error<P::Error>> {
        self.send_commands(&[code])
    }

    /// Send a run of command bytes as one bus write, with DC driven low
    /// once beforehand.
    pub fn send_commands(&mut self, bytes: &[u8]) -> Result<(), Ssd1306Error<P::Error>> {
        self.port.set_level(Line::DataCommand, PinState::Low)?;
        self.port.write_blocking(bytes)?;
        Ok(())
    }

    /// Set the contrast level.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Ssd1306Error<P::Error>> {
        self.send_commands(&[Command::SetContrast.byte(), contrast])
    }

    /// Invert (`true`) or restore (`false`) the display polarity. The
    /// framebuffer is unchanged.
    pub fn set_invert(&mut self, invert: bool) -> Result<(), Ssd1306Error<P::Error>> {
        let command = if invert {
            Command::InvertDisplay
        } else {
            Command::NormalDisplay
        };
        self.send_command(command.byte())
    }

    /// Switch the panel on or put it to sleep. Display RAM is retained.
    pub fn set_display_on(&mut self, on: bool) -> Result<(), Ssd1306Error<P::Error>> {
        let command = if on {
            Command::DisplayOn
        } else {
            Command::DisplayOff
        };
        self.send_command(command.byte())
    }

    // -----------------------------------------------------------------------
    // Framebuffer
    // -----------------------------------------------------------------------

    /// Modify one pixel in the framebuffer. No bus traffic.
    ///
    /// # Errors
    ///
    /// * [`Ssd1306Error::OutOfBounds`] if `(x, y)` is outside the panel; the
    ///   buffer is left untouched.
    /// * [`Ssd1306Error::NoBuffer`] after [`teardown()`](Self::teardown).
    pub fn draw_pixel(
        &mut self,
        x: i32,
        y: i32,
        mode: PixelMode,
    ) -> Result<(), Ssd1306Error<P::Error>> {
        let Some((index, mask)) = self.pixel_index(x, y) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("Pixel ({}, {}) outside the display", x, y);
            return Err(Ssd1306Error::OutOfBounds { x, y });
        };

        let Some(buffer) = self.buffer.as_deref_mut() else {
            return Err(Ssd1306Error::NoBuffer);
        };
        if let Some(byte) = buffer.get_mut(index) {
            apply(byte, mask, mode);
        }
        Ok(())
    }

    /// Read one pixel back from the framebuffer.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<bool, Ssd1306Error<P::Error>> {
        let Some((index, mask)) = self.pixel_index(x, y) else {
            return Err(Ssd1306Error::OutOfBounds { x, y });
        };
        let Some(buffer) = self.buffer.as_deref() else {
            return Err(Ssd1306Error::NoBuffer);
        };
        Ok(buffer.get(index).is_some_and(|byte| byte & mask != 0))
    }

    /// Switch every pixel off. No bus traffic; no-op after teardown.
    pub fn clear(&mut self) {
        if let Some(buffer) = self.buffer.as_deref_mut() {
            buffer.fill(0);
        }
    }

    /// Transfer the whole framebuffer to the panel.
    ///
    /// Sends the page/column addressing preamble as commands, then the
    /// buffer as one data write. Every call sends all
    /// `width * ceil(height / 8)` bytes.
    ///
    /// # Errors
    ///
    /// * [`Ssd1306Error::NoBuffer`] after [`teardown()`](Self::teardown).
    /// * [`Ssd1306Error::Bus`] on a bus failure.
    pub fn update(&mut self) -> Result<(), Ssd1306Error<P::Error>> {
        if self.buffer.is_none() {
            return Err(Ssd1306Error::NoBuffer);
        }

        self.send_commands(&addressing_preamble(self.config.width))?;

        let Some(buffer) = self.buffer.as_deref() else {
            return Err(Ssd1306Error::NoBuffer);
        };
        self.port.set_level(Line::DataCommand, PinState::High)?;
        self.port.write_blocking(buffer)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Flushed {} bytes", buffer.len());

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The active framebuffer bytes, `None` after teardown.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Mutable access to the active framebuffer bytes.
    pub fn buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.buffer.as_deref_mut()
    }

    /// The configuration the driver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Panel width in pixels.
    pub fn width(&self) -> u8 {
        self.config.width
    }

    /// Panel height in pixels.
    pub fn height(&self) -> u8 {
        self.config.height
    }

    /// `true` once [`start()`](Self::start) has completed.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Byte index and bit mask of `(x, y)`, or `None` if off-panel.
    pub(crate) fn pixel_index(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i32::from(self.config.width) || y >= i32::from(self.config.height)
        {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((x + (y / 8) * usize::from(self.config.width), 1u8 << (y % 8)))
    }
}

pub(crate) fn apply(byte: &mut u8, mask: u8, mode: PixelMode) {
    match mode {
        PixelMode::On => *byte |= mask,
        PixelMode::Off => *byte &= !mask,
        PixelMode::Inverted => *byte ^= mask,
    }
}
