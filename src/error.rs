//! Error types for the SSD1306 driver.

use core::fmt;

/// Errors that can occur during display operations.
///
/// `E` is the error type of the [`DisplayPort`](crate::DisplayPort) the
/// driver talks through.
#[derive(Debug, PartialEq, Eq)]
pub enum Ssd1306Error<E> {
    /// Underlying bus or pin failure.
    Bus(E),

    /// Pixel coordinates outside the panel.
    OutOfBounds { x: i32, y: i32 },

    /// The framebuffer is shorter than `width * ceil(height / 8)`.
    BufferTooSmall { expected: usize, actual: usize },

    /// Width or height is zero.
    InvalidGeometry,

    /// The framebuffer was released by
    /// [`teardown()`](crate::Ssd1306::teardown).
    NoBuffer,
}

// Allow ergonomic `?` propagation from raw port errors.
impl<E> From<E> for Ssd1306Error<E> {
    fn from(error: E) -> Self {
        Ssd1306Error::Bus(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Ssd1306Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ssd1306Error::Bus(e) => write!(f, "Bus error: {:?}", e),
            Ssd1306Error::OutOfBounds { x, y } => {
                write!(f, "Pixel ({}, {}) is outside the display", x, y)
            }
            Ssd1306Error::BufferTooSmall { expected, actual } => write!(
                f,
                "Framebuffer too small: need {} bytes, got {}",
                expected, actual
            ),
            Ssd1306Error::InvalidGeometry => write!(f, "Display width and height must be non-zero"),
            Ssd1306Error::NoBuffer => write!(f, "Framebuffer already released"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Ssd1306Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Ssd1306Error::Bus(e) => defmt::write!(f, "Bus error: {}", e),
            Ssd1306Error::OutOfBounds { x, y } => {
                defmt::write!(f, "Pixel ({}, {}) out of bounds", x, y)
            }
            Ssd1306Error::BufferTooSmall { expected, actual } => {
                defmt::write!(f, "Framebuffer too small ({} < {})", actual, expected)
            }
            Ssd1306Error::InvalidGeometry => defmt::write!(f, "Invalid geometry"),
            Ssd1306Error::NoBuffer => defmt::write!(f, "No framebuffer"),
        }
    }
}
