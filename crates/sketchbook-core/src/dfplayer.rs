//! DFPlayer Mini MP3 module
//!
//! The module speaks fixed 10-byte frames over a 9600-baud UART:
//!
//! ```text
//! 7E FF 06 CMD ACK PH PL CKH CKL EF
//! ```
//!
//! `ACK` asks the module to confirm the command, `PH PL` is a big-endian
//! parameter and `CKH CKL` is the two's complement of the sum of the six bytes
//! after the start marker.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::traits::SerialPort;

pub const FRAME_LEN: usize = 10;

const START: u8 = 0x7E;
const VERSION: u8 = 0xFF;
const LENGTH: u8 = 0x06;
const END: u8 = 0xEF;

/// Loudest volume step
pub const MAX_VOLUME: u8 = 30;

/// How long [`DfPlayer::begin`] waits for the module to report ready
pub const BEGIN_TIMEOUT_MS: u32 = 3_000;

/// Poll period while waiting for a reply
const READ_POLL_MS: u32 = 10;

/// Command and report codes
pub mod cmd {
    pub const NEXT: u8 = 0x01;
    pub const PREVIOUS: u8 = 0x02;
    pub const PLAY_TRACK: u8 = 0x03;
    pub const VOLUME: u8 = 0x06;
    pub const RESET: u8 = 0x0C;
    pub const RESUME: u8 = 0x0D;
    pub const PAUSE: u8 = 0x0E;

    /// SD card track finished; parameter is the track number
    pub const REPORT_TRACK_FINISHED: u8 = 0x3D;
    /// Module finished initialization; parameter is the storage bitmap
    pub const REPORT_READY: u8 = 0x3F;
    /// Module error; parameter is the error code
    pub const REPORT_ERROR: u8 = 0x40;
    pub const REPORT_ACK: u8 = 0x41;
}

/// A decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub ack: bool,
    pub param: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    BadStart,
    BadHeader,
    BadEnd,
    Checksum { expected: u16, found: u16 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadStart => write!(f, "missing start byte"),
            Self::BadHeader => write!(f, "unexpected version or length"),
            Self::BadEnd => write!(f, "missing end byte"),
            Self::Checksum { expected, found } => write!(
                f,
                "checksum mismatch: expected 0x{:04X}, found 0x{:04X}",
                expected, found
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfPlayerError {
    Serial(&'static str),
    /// Nothing answered the reset
    NotFound,
    /// The module reported an error code
    Device(u16),
}

impl fmt::Display for DfPlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(e) => write!(f, "serial error: {}", e),
            Self::NotFound => write!(f, "DFPlayer not found"),
            Self::Device(code) => write!(f, "DFPlayer error code {}", code),
        }
    }
}

fn checksum(body: &[u8]) -> u16 {
    let sum = body.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    0u16.wrapping_sub(sum)
}

pub fn encode_frame(command: u8, param: u16, ack: bool) -> [u8; FRAME_LEN] {
    let [ph, pl] = param.to_be_bytes();
    let mut frame = [
        START,
        VERSION,
        LENGTH,
        command,
        ack as u8,
        ph,
        pl,
        0,
        0,
        END,
    ];
    let [ch, cl] = checksum(&frame[1..7]).to_be_bytes();
    frame[7] = ch;
    frame[8] = cl;
    frame
}

pub fn decode_frame(raw: &[u8; FRAME_LEN]) -> Result<Frame, FrameError> {
    if raw[0] != START {
        return Err(FrameError::BadStart);
    }
    if raw[1] != VERSION || raw[2] != LENGTH {
        return Err(FrameError::BadHeader);
    }
    if raw[9] != END {
        return Err(FrameError::BadEnd);
    }

    let expected = checksum(&raw[1..7]);
    let found = u16::from_be_bytes([raw[7], raw[8]]);
    if expected != found {
        return Err(FrameError::Checksum { expected, found });
    }

    Ok(Frame {
        command: raw[3],
        ack: raw[4] != 0,
        param: u16::from_be_bytes([raw[5], raw[6]]),
    })
}

/// Reassembles frames from a byte stream, resynchronizing on the start marker.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: [u8; FRAME_LEN],
    len: usize,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            len: 0,
        }
    }

    /// Feed one byte; yields a result once ten bytes have been collected.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame, FrameError>> {
        if self.len == 0 && byte != START {
            return None;
        }

        self.buf[self.len] = byte;
        self.len += 1;

        if !self.header_fits() {
            self.resync();
            return None;
        }

        if self.len < FRAME_LEN {
            return None;
        }

        let result = decode_frame(&self.buf);
        match result {
            Ok(_) => self.len = 0,
            Err(_) => self.resync(),
        }
        Some(result)
    }

    fn header_fits(&self) -> bool {
        (self.len < 2 || self.buf[1] == VERSION) && (self.len < 3 || self.buf[2] == LENGTH)
    }

    /// Drop the current start byte and restart at the next buffered one.
    fn resync(&mut self) {
        loop {
            let next = self.buf[1..self.len].iter().position(|&b| b == START);
            match next {
                Some(offset) => {
                    let start = offset + 1;
                    self.buf.copy_within(start..self.len, 0);
                    self.len -= start;
                    if self.header_fits() {
                        return;
                    }
                }
                None => {
                    self.len = 0;
                    return;
                }
            }
        }
    }
}

/// DFPlayer Mini driver
pub struct DfPlayer<S, D> {
    serial: S,
    delay: D,
    decoder: FrameDecoder,
    volume: u8,
}

impl<S: SerialPort, D: DelayNs> DfPlayer<S, D> {
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            serial,
            delay,
            decoder: FrameDecoder::new(),
            volume: 0,
        }
    }

    /// Reset the module and wait for it to report ready.
    pub fn begin(&mut self) -> Result<u16, DfPlayerError> {
        self.send(cmd::RESET, 0)?;

        let mut waited = 0;
        while waited < BEGIN_TIMEOUT_MS {
            while let Some(frame) = self.poll_frame()? {
                match frame.command {
                    cmd::REPORT_READY => {
                        info!("DFPlayer online, storage 0x{:02x}", frame.param);
                        return Ok(frame.param);
                    }
                    cmd::REPORT_ERROR => {
                        warn!("DFPlayer reported error {}", frame.param);
                        return Err(DfPlayerError::Device(frame.param));
                    }
                    other => debug!("DFPlayer frame 0x{:02x} ignored during begin", other),
                }
            }
            self.delay.delay_ms(READ_POLL_MS);
            waited += READ_POLL_MS;
        }

        Err(DfPlayerError::NotFound)
    }

    /// Set volume, clamped to 0..=30
    pub fn volume(&mut self, volume: u8) -> Result<(), DfPlayerError> {
        let volume = volume.min(MAX_VOLUME);
        self.send(cmd::VOLUME, volume as u16)?;
        self.volume = volume;
        Ok(())
    }

    /// Last volume sent
    pub fn current_volume(&self) -> u8 {
        self.volume
    }

    /// Play `NNNN.mp3` from the root of the card
    pub fn play(&mut self, track: u16) -> Result<(), DfPlayerError> {
        self.send(cmd::PLAY_TRACK, track)
    }

    pub fn pause(&mut self) -> Result<(), DfPlayerError> {
        self.send(cmd::PAUSE, 0)
    }

    pub fn resume(&mut self) -> Result<(), DfPlayerError> {
        self.send(cmd::RESUME, 0)
    }

    pub fn next(&mut self) -> Result<(), DfPlayerError> {
        self.send(cmd::NEXT, 0)
    }

    pub fn previous(&mut self) -> Result<(), DfPlayerError> {
        self.send(cmd::PREVIOUS, 0)
    }

    /// Next complete, valid frame from the receive buffer, if any.
    /// Corrupt frames are logged and dropped.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>, DfPlayerError> {
        while let Some(byte) = self.serial.read_byte().map_err(DfPlayerError::Serial)? {
            match self.decoder.push(byte) {
                Some(Ok(frame)) => return Ok(Some(frame)),
                Some(Err(e)) => warn!("Dropping DFPlayer frame: {}", e),
                None => {}
            }
        }
        Ok(None)
    }

    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }

    fn send(&mut self, command: u8, param: u16) -> Result<(), DfPlayerError> {
        let frame = encode_frame(command, param, false);
        self.serial.write_all(&frame).map_err(DfPlayerError::Serial)
    }
}
