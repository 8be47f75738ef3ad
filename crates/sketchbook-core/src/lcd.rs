//! # I2C character LCD
//!
//! HD44780-compatible 16x2 display behind a PCF8574 I/O expander backpack.
//! The expander has no notion of the LCD protocol: every byte written to it
//! appears on its eight output pins, so the driver bit-bangs the LCD's 4-bit
//! interface through I2C writes.
//!
//! ```text
//! PCF8574 | P7 P6 P5 P4 | P3 | P2 | P1 | P0
//! LCD     | D7 D6 D5 D4 | BL | EN | RW | RS
//! ```
//!
//! Each LCD byte is two nibbles (high first), and each nibble is latched on
//! the falling edge of EN, so one character costs four bus writes.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::config::lcd::{ALTERNATE_ADDRESS, COLS, PRIMARY_ADDRESS, ROWS};
use crate::traits::TextDisplay;

/// Expander pin masks
pub mod bits {
    /// Register select: 0 = command, 1 = data
    pub const RS: u8 = 0x01;
    /// Read/write, held low
    pub const RW: u8 = 0x02;
    /// Enable strobe
    pub const EN: u8 = 0x04;
    pub const BACKLIGHT: u8 = 0x08;
}

/// HD44780 instruction set
pub mod commands {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_DDRAM_ADDR: u8 = 0x80;

    // Entry mode flags
    pub const ENTRY_LEFT: u8 = 0x02;
    pub const ENTRY_SHIFT_INCREMENT: u8 = 0x01;

    // Display control flags
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;

    // Function set flags
    pub const TWO_LINE: u8 = 0x08;
    pub const FONT_5X8: u8 = 0x00;
}

/// DDRAM start address of each row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// Degree sign in the HD44780 A00 character ROM
pub const DEGREE_GLYPH: u8 = 0xDF;

/// Bus address of the backpack, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdAddress {
    /// 0x27
    Primary,
    /// 0x3F
    Alternate,
}

impl LcdAddress {
    pub const fn addr(self) -> u8 {
        match self {
            Self::Primary => PRIMARY_ADDRESS,
            Self::Alternate => ALTERNATE_ADDRESS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdError<E> {
    /// Bus transfer failed (usually no device at the address)
    I2c(E),
    /// Cursor position outside the 16x2 grid
    OutOfRange { col: u8, row: u8 },
}

impl<E: fmt::Debug> fmt::Display for LcdError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "LCD bus error: {:?}", e),
            Self::OutOfRange { col, row } => write!(f, "cursor ({}, {}) outside display", col, row),
        }
    }
}

/// Map a character to its ROM code
pub fn glyph(ch: char) -> u8 {
    match ch {
        '°' => DEGREE_GLYPH,
        c if c.is_ascii() && !c.is_ascii_control() => c as u8,
        _ => b'?',
    }
}

/// 16x2 LCD driver
pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight_on: bool,
    entry_mode: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    pub fn new(i2c: I, delay: D, address: LcdAddress) -> Self {
        Self {
            i2c,
            delay,
            address: address.addr(),
            backlight_on: true,
            entry_mode: commands::ENTRY_LEFT,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Power-on initialization into 4-bit mode, 2 lines, 5x8 font.
    pub fn init(&mut self) -> Result<(), LcdError<I::Error>> {
        debug!("Initializing LCD at 0x{:02x}", self.address);

        self.delay.delay_ms(50);

        // Three 8-bit function sets bring the controller to a known state
        // regardless of the mode it powered up in.
        self.send_nibble(0x03, false)?;
        self.delay.delay_ms(5);
        self.send_nibble(0x03, false)?;
        self.delay.delay_ms(1);
        self.send_nibble(0x03, false)?;
        self.delay.delay_ms(1);

        // Switch to 4-bit interface
        self.send_nibble(0x02, false)?;
        self.delay.delay_ms(1);

        self.command(commands::FUNCTION_SET | commands::TWO_LINE | commands::FONT_5X8)?;
        self.command(commands::DISPLAY_CONTROL | commands::DISPLAY_ON)?;
        self.clear()?;
        self.entry_mode = commands::ENTRY_LEFT;
        self.command(commands::ENTRY_MODE_SET | self.entry_mode)?;

        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), LcdError<I::Error>> {
        self.command(commands::CLEAR_DISPLAY)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn home(&mut self) -> Result<(), LcdError<I::Error>> {
        self.command(commands::RETURN_HOME)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), LcdError<I::Error>> {
        if col >= COLS || row >= ROWS {
            return Err(LcdError::OutOfRange { col, row });
        }
        self.command(commands::SET_DDRAM_ADDR | (ROW_OFFSETS[row as usize] + col))
    }

    /// Write text at the cursor. Characters outside the ROM print as `?`.
    pub fn print(&mut self, text: &str) -> Result<(), LcdError<I::Error>> {
        for ch in text.chars() {
            self.write_byte(glyph(ch))?;
        }
        Ok(())
    }

    /// Write one raw character code at the cursor
    pub fn write_byte(&mut self, code: u8) -> Result<(), LcdError<I::Error>> {
        self.send_byte(code, true)
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), LcdError<I::Error>> {
        self.backlight_on = on;
        let level = if on { bits::BACKLIGHT } else { 0 };
        self.expander_write(level)
    }

    /// With autoscroll on, the display shifts left on every write so the
    /// text appears to grow from the right edge.
    pub fn autoscroll(&mut self, on: bool) -> Result<(), LcdError<I::Error>> {
        if on {
            self.entry_mode |= commands::ENTRY_SHIFT_INCREMENT;
        } else {
            self.entry_mode &= !commands::ENTRY_SHIFT_INCREMENT;
        }
        self.command(commands::ENTRY_MODE_SET | self.entry_mode)
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u8) -> Result<(), LcdError<I::Error>> {
        self.send_byte(cmd, false)
    }

    fn send_byte(&mut self, value: u8, rs: bool) -> Result<(), LcdError<I::Error>> {
        self.send_nibble(value >> 4, rs)?;
        self.send_nibble(value & 0x0F, rs)
    }

    fn send_nibble(&mut self, nibble: u8, rs: bool) -> Result<(), LcdError<I::Error>> {
        let mut byte = (nibble & 0x0F) << 4;
        if rs {
            byte |= bits::RS;
        }
        if self.backlight_on {
            byte |= bits::BACKLIGHT;
        }

        // Data is latched on the falling edge of EN
        self.expander_write(byte | bits::EN)?;
        self.delay.delay_us(1);
        self.expander_write(byte)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, byte: u8) -> Result<(), LcdError<I::Error>> {
        self.i2c.write(self.address, &[byte]).map_err(LcdError::I2c)
    }
}

impl<I: I2c, D: DelayNs> TextDisplay for Lcd1602<I, D> {
    fn init(&mut self) -> Result<(), &'static str> {
        Lcd1602::init(self).map_err(|_| "LCD init failed")
    }

    fn clear(&mut self) -> Result<(), &'static str> {
        Lcd1602::clear(self).map_err(|_| "LCD clear failed")
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), &'static str> {
        Lcd1602::set_cursor(self, col, row).map_err(|e| match e {
            LcdError::OutOfRange { .. } => "LCD cursor out of range",
            LcdError::I2c(_) => "LCD write failed",
        })
    }

    fn print(&mut self, text: &str) -> Result<(), &'static str> {
        Lcd1602::print(self, text).map_err(|_| "LCD write failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Records every byte written, optionally refusing all transfers
    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, u8)>,
        absent: bool,
    }

    impl RecordingBus {
        fn bytes(&self) -> Vec<u8> {
            self.writes.iter().map(|&(_, b)| b).collect()
        }
    }

    impl ErrorType for RecordingBus {
        type Error = Nack;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.absent {
                return Err(Nack);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    for &b in bytes.iter() {
                        self.writes.push((address, b));
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn lcd(address: LcdAddress) -> Lcd1602<RecordingBus, NoDelay> {
        Lcd1602::new(RecordingBus::default(), NoDelay, address)
    }

    /// Expected expander bytes for one LCD byte with the backlight on
    fn strobes(value: u8, rs: bool) -> [u8; 4] {
        let ctrl = bits::BACKLIGHT | if rs { bits::RS } else { 0 };
        let hi = (value & 0xF0) | ctrl;
        let lo = ((value & 0x0F) << 4) | ctrl;
        [hi | bits::EN, hi, lo | bits::EN, lo]
    }

    #[test]
    fn test_address_selection() {
        assert_eq!(LcdAddress::Primary.addr(), 0x27);
        assert_eq!(LcdAddress::Alternate.addr(), 0x3F);
        assert_eq!(lcd(LcdAddress::Alternate).address(), 0x3F);
    }

    #[test]
    fn test_init_sequence() {
        let mut display = lcd(LcdAddress::Primary);
        display.init().unwrap();
        let (bus, _) = display.release();
        let bytes = bus.bytes();

        // Three 0x03 resets and the 4-bit switch, one strobe pair each
        assert_eq!(&bytes[..8], &[0x3C, 0x38, 0x3C, 0x38, 0x3C, 0x38, 0x2C, 0x28]);
        assert_eq!(&bytes[8..12], &strobes(0x28, false));
        assert_eq!(&bytes[12..16], &strobes(0x0C, false));
        assert_eq!(&bytes[16..20], &strobes(0x01, false));
        assert_eq!(&bytes[20..24], &strobes(0x06, false));
        assert_eq!(bytes.len(), 24);
        assert!(bus.writes.iter().all(|&(addr, _)| addr == 0x27));
    }

    #[test]
    fn test_print_sends_data_nibbles() {
        let mut display = lcd(LcdAddress::Primary);
        display.print("Hi").unwrap();
        let (bus, _) = display.release();

        let mut expected = Vec::new();
        expected.extend_from_slice(&strobes(b'H', true));
        expected.extend_from_slice(&strobes(b'i', true));
        assert_eq!(bus.bytes(), expected);
    }

    #[test]
    fn test_degree_and_unknown_glyphs() {
        assert_eq!(glyph('°'), 0xDF);
        assert_eq!(glyph('A'), b'A');
        assert_eq!(glyph('é'), b'?');
        assert_eq!(glyph('\n'), b'?');
    }

    #[test]
    fn test_set_cursor_second_row() {
        let mut display = lcd(LcdAddress::Primary);
        display.set_cursor(5, 1).unwrap();
        let (bus, _) = display.release();
        assert_eq!(bus.bytes(), strobes(0x80 | 0x45, false).to_vec());
    }

    #[test]
    fn test_set_cursor_out_of_range() {
        let mut display = lcd(LcdAddress::Primary);
        assert_eq!(
            display.set_cursor(16, 0),
            Err(LcdError::OutOfRange { col: 16, row: 0 })
        );
        assert_eq!(
            display.set_cursor(0, 2),
            Err(LcdError::OutOfRange { col: 0, row: 2 })
        );
    }

    #[test]
    fn test_backlight_off_clears_bit() {
        let mut display = lcd(LcdAddress::Primary);
        display.set_backlight(false).unwrap();
        display.print("A").unwrap();
        let (bus, _) = display.release();
        let bytes = bus.bytes();
        assert_eq!(bytes[0], 0x00);
        assert!(bytes[1..].iter().all(|b| b & bits::BACKLIGHT == 0));
    }

    #[test]
    fn test_autoscroll_entry_mode() {
        let mut display = lcd(LcdAddress::Primary);
        display.autoscroll(true).unwrap();
        display.autoscroll(false).unwrap();
        let (bus, _) = display.release();
        let bytes = bus.bytes();
        assert_eq!(&bytes[..4], &strobes(0x07, false));
        assert_eq!(&bytes[4..], &strobes(0x06, false));
    }

    #[test]
    fn test_missing_device_reports_bus_error() {
        let mut display = Lcd1602::new(
            RecordingBus {
                absent: true,
                ..Default::default()
            },
            NoDelay,
            LcdAddress::Alternate,
        );
        assert_eq!(display.init(), Err(LcdError::I2c(Nack)));
        assert_eq!(TextDisplay::print(&mut display, "x"), Err("LCD write failed"));
    }
}
