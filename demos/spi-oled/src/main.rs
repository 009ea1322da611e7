//! SPI OLED demo
//!
//! Standalone hardware demonstration that exercises [`Ssd1306`] on a Pico 2.
//! Draws a bouncing bar with `embedded-graphics` and a blinking corner pixel
//! with [`Ssd1306::draw_pixel`], verifying bring-up and flush on real
//! hardware.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                      |
//! |-----------|------------|----------------------------|
//! | SPI0 SCK  | GP18       | OLED D0 / CLK              |
//! | SPI0 TX   | GP19       | OLED D1 / MOSI             |
//! | CS        | GP17       | held low                   |
//! | DC        | GP20       | low = command, high = data |
//! | RST       | GP21       |                            |
//! | OLED VCC  | 3V3        |                            |
//! | OLED GND  | GND        |                            |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use ssd1306_spi_rs::{buffer_size, Config, PixelMode, Ssd1306, SpiInterface};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

const WIDTH: u8 = 128;
const HEIGHT: u8 = 64;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("SPI OLED demo starting");

    let config = Config::default();

    // --- SPI0 (GP18 = SCK, GP19 = TX), mode 0, MSB first ---
    let mut spi_config = spi::Config::default();
    spi_config.frequency = config.baudrate;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);

    let cs = Output::new(p.PIN_17, Level::Low);
    let dc = Output::new(p.PIN_20, Level::Low);
    let rst = Output::new(p.PIN_21, Level::Low);

    let port = SpiInterface::new(spi, cs, dc, rst);
    let mut buffer = [0u8; buffer_size(WIDTH as usize, HEIGHT as usize)];

    let mut oled = match Ssd1306::new(config, port, Delay, &mut buffer) {
        Ok(oled) => oled,
        Err(e) => {
            error!("OLED construction failed: {}", e);
            return;
        }
    };

    if let Err(e) = oled.start() {
        error!("OLED start failed: {}", e);
        return;
    }
    info!("OLED started");

    let mut x: i32 = 0;
    let mut step: i32 = 2;
    let mut blink = false;

    loop {
        oled.clear();

        Rectangle::new(Point::new(x, 24), Size::new(16, 16))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut oled)
            .ok();

        // Blink the top-left pixel.
        let mode = if blink { PixelMode::On } else { PixelMode::Off };
        oled.draw_pixel(0, 0, mode).ok();
        blink = !blink;

        if let Err(e) = oled.update() {
            warn!("Flush failed: {}", e);
        }

        x += step;
        if x <= 0 || x >= i32::from(WIDTH) - 16 {
            step = -step;
        }

        Timer::after(Duration::from_millis(33)).await; // ~30 Hz
    }
}
