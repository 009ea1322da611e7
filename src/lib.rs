//! Blocking SPI driver for the SSD1306 monochrome OLED controller.
//!
//! This crate provides [`Ssd1306`], a driver that brings the panel up with
//! the vendor initialisation sequence, keeps a pixel framebuffer in
//! caller-owned memory, and flushes it to the display over SPI with a
//! data/command select line.
//!
//! # Quick Start
//!
//! ```ignore
//! use ssd1306_spi_rs::{buffer_size, Config, PixelMode, Ssd1306, SpiInterface};
//!
//! let config = Config::default(); // 128×64, internal charge pump
//! let port = SpiInterface::new(spi, cs, dc, rst);
//! let mut buffer = [0u8; buffer_size(128, 64)];
//!
//! let mut oled = Ssd1306::new(config, port, delay, &mut buffer)?;
//! oled.start()?;
//! oled.draw_pixel(64, 32, PixelMode::On)?;
//! oled.update()?;
//! ```
//!
//! # Framebuffer layout
//!
//! The buffer holds `width * ceil(height / 8)` bytes. Byte
//! `x + (y / 8) * width` is one column of an 8-row page and bit `y % 8` is
//! the pixel at row `y`.
//!
//! # Crate Features
//!
//! - **`defmt`** — structured logging via `defmt`, plus `defmt::Format`
//!   on the public configuration and error types.

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod config;
pub mod driver;
pub mod error;
mod graphics;
pub mod interface;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use command::Command;
pub use config::{buffer_size, Config, PinAssignment, VccMode};
pub use driver::{PixelMode, Ssd1306};
pub use error::Ssd1306Error;
pub use interface::{DisplayPort, SpiInterface, SpiInterfaceError};
