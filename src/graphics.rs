//! `embedded-graphics` support.
//!
//! [`Ssd1306`] is a [`DrawTarget`] for [`BinaryColor`], so shapes, text and
//! images from the `embedded-graphics` ecosystem render straight into the
//! framebuffer. Pixels outside the panel are clipped, as `embedded-graphics`
//! expects of a draw target.

use embedded_graphics::{draw_target::DrawTarget, pixelcolor::BinaryColor, prelude::*};
use embedded_hal::delay::DelayNs;

use crate::driver::{apply, PixelMode, Ssd1306};
use crate::error::Ssd1306Error;
use crate::interface::DisplayPort;

impl<P, D> OriginDimensions for Ssd1306<'_, P, D>
where
    P: DisplayPort,
    D: DelayNs,
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl<P, D> DrawTarget for Ssd1306<'_, P, D>
where
    P: DisplayPort,
    D: DelayNs,
{
    type Color = BinaryColor;
    type Error = Ssd1306Error<P::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        if self.buffer().is_none() {
            return Err(Ssd1306Error::NoBuffer);
        }

        for Pixel(point, color) in pixels {
            let Some((index, mask)) = self.pixel_index(point.x, point.y) else {
                continue;
            };
            let mode = match color {
                BinaryColor::On => PixelMode::On,
                BinaryColor::Off => PixelMode::Off,
            };
            if let Some(byte) = self.buffer_mut().and_then(|buffer| buffer.get_mut(index)) {
                apply(byte, mask, mode);
            }
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        };
        match self.buffer_mut() {
            Some(buffer) => {
                buffer.fill(fill);
                Ok(())
            }
            None => Err(Ssd1306Error::NoBuffer),
        }
    }
}
