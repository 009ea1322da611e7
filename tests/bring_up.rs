//! Bring-up and flush integration tests.
//!
//! A recording [`DisplayPort`] and delay log every pin, bus and delay
//! operation into one shared journal so the tests can check both the exact
//! bytes and the order of side effects.
//!
//! Run with: cargo test --test bring_up

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use ssd1306_spi_rs::interface::{Direction, Line, PinFunction, SpiFormat};
use ssd1306_spi_rs::{
    buffer_size, Config, DisplayPort, PinAssignment, PixelMode, Ssd1306, Ssd1306Error, VccMode,
};

// ---------------------------------------------------------------------------
// Recording port
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
enum Op {
    InitPins([u8; 5]),
    Direction(Line, Direction),
    Function(Line, PinFunction),
    Level(Line, PinState),
    InitBus(u32, SpiFormat),
    Write(Vec<u8>),
    DelayNs(u64),
}

type Journal = Rc<RefCell<Vec<Op>>>;

struct RecordingPort {
    journal: Journal,
}

impl DisplayPort for RecordingPort {
    type Error = Infallible;

    fn init_pins(&mut self, pins: &PinAssignment) -> Result<(), Infallible> {
        self.journal.borrow_mut().push(Op::InitPins(pins.all()));
        Ok(())
    }

    fn set_direction(&mut self, line: Line, direction: Direction) -> Result<(), Infallible> {
        self.journal.borrow_mut().push(Op::Direction(line, direction));
        Ok(())
    }

    fn set_function(&mut self, line: Line, function: PinFunction) -> Result<(), Infallible> {
        self.journal.borrow_mut().push(Op::Function(line, function));
        Ok(())
    }

    fn set_level(&mut self, line: Line, level: PinState) -> Result<(), Infallible> {
        self.journal.borrow_mut().push(Op::Level(line, level));
        Ok(())
    }

    fn init_bus(&mut self, baudrate: u32, format: &SpiFormat) -> Result<u32, Infallible> {
        self.journal.borrow_mut().push(Op::InitBus(baudrate, *format));
        Ok(baudrate)
    }

    fn write_blocking(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.journal.borrow_mut().push(Op::Write(bytes.to_vec()));
        Ok(())
    }
}

struct RecordingDelay {
    journal: Journal,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.journal.borrow_mut().push(Op::DelayNs(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.journal
            .borrow_mut()
            .push(Op::DelayNs(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal
            .borrow_mut()
            .push(Op::DelayNs(u64::from(ms) * 1_000_000));
    }
}

fn recorder() -> (Journal, RecordingPort, RecordingDelay) {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let port = RecordingPort {
        journal: journal.clone(),
    };
    let delay = RecordingDelay {
        journal: journal.clone(),
    };
    (journal, port, delay)
}

/// Concatenate every byte written while DC was low.
fn command_bytes(ops: &[Op]) -> Vec<u8> {
    let mut dc = PinState::Low;
    let mut out = Vec::new();
    for op in ops {
        match op {
            Op::Level(Line::DataCommand, level) => dc = *level,
            Op::Write(bytes) if dc == PinState::Low => out.extend_from_slice(bytes),
            _ => {}
        }
    }
    out
}

const MS: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Bring-up
// ---------------------------------------------------------------------------

#[test]
fn construction_generates_no_traffic() {
    let (journal, port, delay) = recorder();
    let mut buf = [0xFFu8; 1024];
    let oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();
    assert!(journal.borrow().is_empty());
    assert!(oled.buffer().unwrap().iter().all(|&b| b == 0));
}

#[test]
fn start_follows_bring_up_order() {
    let (journal, port, delay) = recorder();
    let config = Config::default();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(config, port, delay, &mut buf).unwrap();

    oled.start().unwrap();

    let ops = journal.borrow();
    let expected_prefix = vec![
        Op::InitPins([18, 19, 17, 20, 21]),
        Op::Direction(Line::Reset, Direction::Output),
        Op::Level(Line::Reset, PinState::Low),
        Op::InitBus(8_000_000, SpiFormat::SSD1306),
        Op::Function(Line::DataOut, PinFunction::Spi),
        Op::Function(Line::Clock, PinFunction::Spi),
        Op::Direction(Line::ChipSelect, Direction::Output),
        Op::Level(Line::ChipSelect, PinState::Low),
        Op::Direction(Line::DataCommand, Direction::Output),
        Op::Level(Line::DataCommand, PinState::Low),
        Op::DelayNs(MS),
        // Hardware reset pulse
        Op::Level(Line::Reset, PinState::Low),
        Op::DelayNs(10 * MS),
        Op::Level(Line::Reset, PinState::High),
    ];
    assert_eq!(&ops[..expected_prefix.len()], &expected_prefix[..]);

    // Nothing after the reset pulse touches anything but DC and the bus.
    for op in &ops[expected_prefix.len()..] {
        assert!(
            matches!(op, Op::Level(Line::DataCommand, PinState::Low) | Op::Write(_)),
            "unexpected operation after reset: {:?}",
            op
        );
    }
    assert!(oled.is_started());
}

#[test]
fn start_128x64_switchcap_sends_exact_sequence() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();

    oled.start().unwrap();

    assert_eq!(
        command_bytes(&journal.borrow()),
        vec![
            0xAE, // displayoff
            0xD5, 0x80, // setdisplayclockdiv
            0xA8, 63, // setmultiplex
            0xD3, 0x00, // setdisplayoffset
            0x40, // setstartline
            0x8D, 0x14, // chargepump
            0x20, 0x00, // memorymode
            0xA1, // segremap | 1
            0xC8, // comscandec
            0xDA, 0x12, // setcompins
            0x81, 0xCF, // setcontrast
            0xD9, 0xF1, // setprecharge
            0xDB, 0x40, // setvcomdetect
            0xA4, // displayallon_resume
            0xA6, // normaldisplay
            0x2E, // deactivate scroll
            0xAF, // displayon
        ]
    );
}

#[test]
fn start_128x64_external_vcc() {
    let (journal, port, delay) = recorder();
    let config = Config {
        vcc: VccMode::External,
        ..Config::default()
    };
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(config, port, delay, &mut buf).unwrap();

    oled.start().unwrap();

    assert_eq!(
        command_bytes(&journal.borrow()),
        vec![
            0xAE, 0xD5, 0x80, 0xA8, 63, 0xD3, 0x00, 0x40, 0x8D, 0x10, 0x20, 0x00, 0xA1, 0xC8,
            0xDA, 0x12, 0x81, 0x9F, 0xD9, 0x22, 0xDB, 0x40, 0xA4, 0xA6, 0x2E, 0xAF,
        ]
    );
}

#[test]
fn start_128x32_uses_generic_tuning() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 512];
    let mut oled = Ssd1306::new(Config::new(128, 32), port, delay, &mut buf).unwrap();

    oled.start().unwrap();

    assert_eq!(
        command_bytes(&journal.borrow()),
        vec![
            0xAE, 0xD5, 0x80, 0xA8, 31, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0x20, 0x00, 0xA1, 0xC8,
            0xDA, 0x02, 0x81, 0x8F, 0xD9, 0xF1, 0xDB, 0x40, 0xA4, 0xA6, 0x2E, 0xAF,
        ]
    );
}

#[test]
fn custom_pins_and_baudrate_reach_the_port() {
    let (journal, port, delay) = recorder();
    let config = Config {
        baudrate: 1_000_000,
        pins: PinAssignment {
            sclk: 2,
            mosi: 3,
            cs: 5,
            dc: 6,
            rst: 7,
        },
        ..Config::default()
    };
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(config, port, delay, &mut buf).unwrap();

    oled.start().unwrap();

    let ops = journal.borrow();
    assert_eq!(ops[0], Op::InitPins([2, 3, 5, 6, 7]));
    assert!(ops.contains(&Op::InitBus(1_000_000, SpiFormat::SSD1306)));
}

// ---------------------------------------------------------------------------
// Command transmission
// ---------------------------------------------------------------------------

#[test]
fn send_command_drives_dc_low_then_writes_one_byte() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();

    oled.send_command(0xA7).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Op::Level(Line::DataCommand, PinState::Low),
            Op::Write(vec![0xA7]),
        ]
    );
}

#[test]
fn send_commands_is_one_transaction() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();

    oled.send_commands(&[0x81, 0x7F, 0xAF]).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Op::Level(Line::DataCommand, PinState::Low),
            Op::Write(vec![0x81, 0x7F, 0xAF]),
        ]
    );
}

#[test]
fn display_controls_send_their_opcodes() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();

    oled.set_contrast(0x42).unwrap();
    oled.set_invert(true).unwrap();
    oled.set_invert(false).unwrap();
    oled.set_display_on(false).unwrap();
    oled.set_display_on(true).unwrap();

    assert_eq!(
        command_bytes(&journal.borrow()),
        vec![0x81, 0x42, 0xA7, 0xA6, 0xAE, 0xAF]
    );
}

// ---------------------------------------------------------------------------
// Flush
// ---------------------------------------------------------------------------

fn assert_update_for(width: u8, height: u8) {
    let (journal, port, delay) = recorder();
    let size = buffer_size(width as usize, height as usize);
    let mut buf = vec![0u8; size];
    let mut oled = Ssd1306::new(Config::new(width, height), port, delay, &mut buf).unwrap();

    oled.draw_pixel(0, 0, PixelMode::On).unwrap();
    oled.draw_pixel(i32::from(width) - 1, i32::from(height) - 1, PixelMode::On)
        .unwrap();
    let frame = oled.buffer().unwrap().to_vec();

    oled.update().unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Op::Level(Line::DataCommand, PinState::Low),
            Op::Write(vec![0x22, 0x00, 0xFF, 0x21, 0x00, width - 1]),
            Op::Level(Line::DataCommand, PinState::High),
            Op::Write(frame),
        ],
        "update for {}x{}",
        width,
        height
    );
}

#[test]
fn update_sends_preamble_then_whole_frame() {
    assert_update_for(128, 64);
    assert_update_for(128, 32);
    assert_update_for(96, 16);
    assert_update_for(64, 48);
    assert_update_for(72, 40);
}

#[test]
fn update_retransmits_full_frame_every_call() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 512];
    let mut oled = Ssd1306::new(Config::new(128, 32), port, delay, &mut buf).unwrap();

    oled.update().unwrap();
    oled.update().unwrap();

    let data_writes: Vec<usize> = journal
        .borrow()
        .iter()
        .filter_map(|op| match op {
            Op::Write(bytes) if bytes.len() == 512 => Some(bytes.len()),
            _ => None,
        })
        .collect();
    assert_eq!(data_writes, vec![512, 512]);
}

#[test]
fn clear_generates_no_traffic() {
    let (journal, port, delay) = recorder();
    let mut buf = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut buf).unwrap();
    oled.draw_pixel(1, 1, PixelMode::On).unwrap();
    oled.clear();
    assert!(journal.borrow().is_empty());
    assert!(oled.buffer().unwrap().iter().all(|&b| b == 0));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn teardown_then_reconstruct_is_clean() {
    let (journal, port, delay) = recorder();
    let mut first = [0u8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut first).unwrap();
    oled.start().unwrap();
    oled.draw_pixel(7, 7, PixelMode::On).unwrap();

    let released = oled.teardown().unwrap();
    assert_eq!(released[7], 0x80);
    assert!(oled.teardown().is_none());
    assert_eq!(oled.update(), Err(Ssd1306Error::NoBuffer));

    let (port, delay) = oled.release();
    journal.borrow_mut().clear();

    let mut second = [0xEEu8; 1024];
    let mut oled = Ssd1306::new(Config::default(), port, delay, &mut second).unwrap();
    assert!(!oled.is_started());
    assert!(oled.buffer().unwrap().iter().all(|&b| b == 0));
    assert!(journal.borrow().is_empty());

    oled.draw_pixel(7, 7, PixelMode::On).unwrap();
    assert!(oled.get_pixel(7, 7).unwrap());
    oled.clear();
    assert!(!oled.get_pixel(7, 7).unwrap());
    oled.update().unwrap();
    assert_eq!(journal.borrow().len(), 4);
}
