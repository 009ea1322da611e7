//! SSD1306 command opcodes and the fixed initialisation tables.
//!
//! Opcode values follow the SSD1306 datasheet. Commands that take operands
//! are sent as the opcode followed by its operand bytes, all with DC low.
//!
//! The initialisation sequence is assembled from constant sub-sequence
//! tables plus the few operands that depend on [`Config`] (multiplex ratio,
//! supply mode and panel geometry). Its order is vendor protocol and must not
//! change.

use crate::config::{Config, VccMode};

/// SSD1306 command opcodes used by this driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Memory addressing mode, one operand.
    MemoryMode = 0x20,
    /// Column start/end address, two operands.
    ColumnAddr = 0x21,
    /// Page start/end address, two operands.
    PageAddr = 0x22,
    /// Stop any running hardware scroll.
    DeactivateScroll = 0x2E,
    /// Display start line; the line number is OR'd into the opcode.
    SetStartLine = 0x40,
    /// Contrast control, one operand.
    SetContrast = 0x81,
    /// Charge pump setting, one operand.
    ChargePump = 0x8D,
    /// Segment remap; bit 0 selects column 127 as SEG0.
    SegRemap = 0xA0,
    /// Display follows RAM content.
    DisplayAllOnResume = 0xA4,
    /// Non-inverted display.
    NormalDisplay = 0xA6,
    /// Inverted display.
    InvertDisplay = 0xA7,
    /// Multiplex ratio, one operand (`height - 1`).
    SetMultiplex = 0xA8,
    /// Panel off (sleep).
    DisplayOff = 0xAE,
    /// Panel on.
    DisplayOn = 0xAF,
    /// Scan COM outputs from COM[N-1] down to COM0.
    ComScanDec = 0xC8,
    /// Vertical display offset, one operand.
    SetDisplayOffset = 0xD3,
    /// Clock divide ratio / oscillator frequency, one operand.
    SetDisplayClockDiv = 0xD5,
    /// Pre-charge period, one operand.
    SetPrecharge = 0xD9,
    /// COM pins hardware configuration, one operand.
    SetComPins = 0xDA,
    /// VCOMH deselect level, one operand.
    SetVcomDetect = 0xDB,
}

impl Command {
    /// Raw opcode byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

use Command::*;

// ---------------------------------------------------------------------------
// Initialisation sub-sequences
// ---------------------------------------------------------------------------

/// Panel off, oscillator at the suggested divide ratio 0x80.
pub const INIT_TIMING: [u8; 3] = [DisplayOff.byte(), SetDisplayClockDiv.byte(), 0x80];

/// No vertical offset, start at line 0, then the charge pump opcode whose
/// operand depends on the supply mode.
pub const INIT_OFFSET: [u8; 4] = [
    SetDisplayOffset.byte(),
    0x00,
    SetStartLine.byte() | 0x00,
    ChargePump.byte(),
];

/// Horizontal addressing mode, column 127 mapped to SEG0, COM scan
/// decremented.
pub const INIT_ADDRESSING: [u8; 4] = [
    MemoryMode.byte(),
    0x00,
    SegRemap.byte() | 0x01,
    ComScanDec.byte(),
];

/// VCOMH level, resume from RAM, normal polarity, no scroll, panel on.
pub const INIT_ENABLE: [u8; 6] = [
    SetVcomDetect.byte(),
    0x40,
    DisplayAllOnResume.byte(),
    NormalDisplay.byte(),
    DeactivateScroll.byte(),
    DisplayOn.byte(),
];

/// Length of the full initialisation sequence in bytes.
pub const INIT_SEQUENCE_LEN: usize = INIT_TIMING.len()
    + 2
    + INIT_OFFSET.len()
    + 1
    + INIT_ADDRESSING.len()
    + 6
    + INIT_ENABLE.len();

/// Length of the flush addressing preamble in bytes.
pub const PREAMBLE_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Geometry / supply dependent operands
// ---------------------------------------------------------------------------

/// Operands that depend on the supply mode and panel geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelTuning {
    /// Charge pump operand: 0x14 enables the pump, 0x10 disables it.
    pub charge_pump: u8,
    /// COM pins hardware configuration.
    pub com_pins: u8,
    /// Contrast level.
    pub contrast: u8,
    /// Pre-charge period.
    pub precharge: u8,
}

impl PanelTuning {
    /// Select the operands for `config`.
    ///
    /// Only 128×64 has tuned COM-pins and contrast values; every other
    /// geometry falls back to `0x02` / `0x8F` regardless of supply mode.
    pub fn for_config(config: &Config) -> Self {
        let external = config.vcc == VccMode::External;

        let (com_pins, contrast) = if config.is_128x64() {
            (0x12, if external { 0x9F } else { 0xCF })
        } else {
            (0x02, 0x8F)
        };

        Self {
            charge_pump: if external { 0x10 } else { 0x14 },
            com_pins,
            contrast,
            precharge: if external { 0x22 } else { 0xF1 },
        }
    }
}

/// Build the complete initialisation command sequence for `config`.
///
/// This is every byte sent (in command mode) after the hardware reset
/// pulse during [`Ssd1306::start()`](crate::Ssd1306::start).
pub fn init_sequence(config: &Config) -> [u8; INIT_SEQUENCE_LEN] {
    let tuning = PanelTuning::for_config(config);

    let parts: [&[u8]; 9] = [
        &INIT_TIMING,
        &[SetMultiplex.byte(), config.height.wrapping_sub(1)],
        &INIT_OFFSET,
        &[tuning.charge_pump],
        &INIT_ADDRESSING,
        &[SetComPins.byte(), tuning.com_pins],
        &[SetContrast.byte(), tuning.contrast],
        &[SetPrecharge.byte(), tuning.precharge],
        &INIT_ENABLE,
    ];

    let mut seq = [0u8; INIT_SEQUENCE_LEN];
    let mut at = 0;
    for part in parts {
        seq[at..at + part.len()].copy_from_slice(part);
        at += part.len();
    }
    seq
}

/// Page and column range commands sent before every frame.
///
/// The page end is 0xFF rather than the real last page; the controller
/// clamps it to the panel's page count.
pub fn addressing_preamble(width: u8) -> [u8; PREAMBLE_LEN] {
    [
        PageAddr.byte(),
        0x00,
        0xFF,
        ColumnAddr.byte(),
        0x00,
        width.wrapping_sub(1),
    ]
}
