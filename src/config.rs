//! Device configuration.
//!
//! [`Config`] is the single source of panel geometry, bus speed, supply mode
//! and pin assignment. It is fixed once the driver is constructed.

/// Number of framebuffer bytes needed for a `width` × `height` panel.
///
/// Each byte holds one column of an 8-row page, so the height is rounded up
/// to whole pages: `width * ceil(height / 8)`.
pub const fn buffer_size(width: usize, height: usize) -> usize {
    width * ((height + 7) / 8)
}

/// How the panel drive voltage is generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VccMode {
    /// Internal charge pump generates the panel voltage from 3.3 V.
    #[default]
    SwitchCap,
    /// Panel voltage is supplied externally.
    External,
}

/// GPIO numbers of the five signals wired to the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAssignment {
    /// SPI clock.
    pub sclk: u8,
    /// SPI data out (MOSI / TX).
    pub mosi: u8,
    /// Chip select, held low for the lifetime of the driver.
    pub cs: u8,
    /// Data/command select.
    pub dc: u8,
    /// Active-low reset.
    pub rst: u8,
}

impl PinAssignment {
    /// All five pins, in the order they are handed to the port for
    /// digital I/O setup.
    pub fn all(&self) -> [u8; 5] {
        [self.sclk, self.mosi, self.cs, self.dc, self.rst]
    }
}

impl Default for PinAssignment {
    /// SPI0 default pins on the RP2040 / RP235x.
    fn default() -> Self {
        Self {
            sclk: 18,
            mosi: 19,
            cs: 17,
            dc: 20,
            rst: 21,
        }
    }
}

/// Configuration for one SSD1306 panel.
///
/// [`Config::default()`] describes the common 128×64 module running from its
/// internal charge pump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Panel width in pixels. Default: 128.
    pub width: u8,
    /// Panel height in pixels, ideally a multiple of 8. Default: 64.
    pub height: u8,
    /// SPI clock requested at bring-up, in Hz. Default: 8 MHz.
    pub baudrate: u32,
    /// Panel supply mode. Default: [`VccMode::SwitchCap`].
    pub vcc: VccMode,
    /// Signal to GPIO mapping.
    pub pins: PinAssignment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            baudrate: 8_000_000,
            vcc: VccMode::SwitchCap,
            pins: PinAssignment::default(),
        }
    }
}

impl Config {
    /// Default configuration with a different panel geometry.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Number of 8-row pages, rounding a partial page up.
    pub fn pages(&self) -> usize {
        (self.height as usize + 7) / 8
    }

    /// Framebuffer length required by this geometry.
    pub fn buffer_size(&self) -> usize {
        buffer_size(self.width as usize, self.height as usize)
    }

    /// `true` for the 128×64 panel, the only geometry with tuned
    /// COM-pins and contrast values.
    pub fn is_128x64(&self) -> bool {
        self.width == 128 && self.height == 64
    }
}
