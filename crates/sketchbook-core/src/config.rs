//! Compile-time wiring and tunables shared by the sketches, plus the Wi-Fi
//! credential type that every networked sketch validates at start-up.

use core::fmt;

/// Maximum SSID length per IEEE 802.11.
pub const MAX_SSID_LEN: usize = 32;

/// Minimum password length for WPA2.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum password length for WPA2.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Bounded-connect timing
pub mod connect {
    /// Give up joining the network after this long
    pub const DEADLINE_MS: u64 = 15_000;

    /// Sleep between two status checks
    pub const POLL_INTERVAL_MS: u64 = 500;
}

/// Polling intervals of the looping sketches
pub mod timing {
    /// Wi-Fi scanner: one scan every 5 seconds
    pub const SCAN_INTERVAL_MS: u64 = 5_000;

    /// Pause after printing the scan countdown
    pub const SCAN_COOLDOWN_MS: u64 = 1_000;

    /// Climate display refresh
    pub const CLIMATE_INTERVAL_MS: u64 = 2_000;

    /// Voice relay service loop
    pub const RELAY_LOOP_MS: u64 = 10;

    /// Blink half-period
    pub const BLINK_MS: u64 = 1_000;

    /// Idle loop of the Wi-Fi setup sketch
    pub const IDLE_MS: u64 = 1_000;
}

/// Character LCD geometry and bus addresses
pub mod lcd {
    pub const COLS: u8 = 16;
    pub const ROWS: u8 = 2;

    /// PCF8574 backpack with A0..A2 pulled high
    pub const PRIMARY_ADDRESS: u8 = 0x27;

    /// PCF8574A backpack
    pub const ALTERNATE_ADDRESS: u8 = 0x3F;

    /// Standard-mode I2C
    pub const I2C_FREQUENCY_KHZ: u32 = 100;
}

/// Voice relay LED wiring
pub mod relay {
    pub const LED_COUNT: usize = 10;

    /// Logical LED index to GPIO number
    pub const LED_PINS: [u8; LED_COUNT] = [2, 4, 5, 12, 13, 14, 15, 18, 19, 23];

    /// TCP port of the local power command listener
    pub const COMMAND_PORT: u16 = 8080;
}

/// DFPlayer Mini defaults
pub mod mp3 {
    pub const BAUD_RATE: u32 = 9_600;

    /// 0..=30
    pub const DEFAULT_VOLUME: u8 = 20;

    /// Plays `0001.mp3`
    pub const DEFAULT_TRACK: u16 = 1;
}

/// Timing for [`crate::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectConfig {
    pub deadline_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            deadline_ms: connect::DEADLINE_MS,
            poll_interval_ms: connect::POLL_INTERVAL_MS,
        }
    }
}

/// Wi-Fi credentials for joining an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifiCredentials<'a> {
    /// Network SSID (1-32 bytes).
    pub ssid: &'a str,
    /// Network password (8-64 bytes for WPA2, empty for open networks).
    pub password: &'a str,
}

impl<'a> WifiCredentials<'a> {
    /// Create validated credentials.
    pub fn new(ssid: &'a str, password: &'a str) -> Result<Self, CredentialsError> {
        let credentials = Self { ssid, password };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.ssid.is_empty() {
            return Err(CredentialsError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(CredentialsError::SsidTooLong {
                len: self.ssid.len(),
            });
        }

        // Empty is fine for open networks
        if !self.password.is_empty() && self.password.len() < MIN_PASSWORD_LEN {
            return Err(CredentialsError::PasswordTooShort {
                len: self.password.len(),
            });
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(CredentialsError::PasswordTooLong {
                len: self.password.len(),
            });
        }

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

/// Errors from credential validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    SsidEmpty,
    SsidTooLong { len: usize },
    PasswordTooShort { len: usize },
    PasswordTooLong { len: usize },
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len } => {
                write!(f, "SSID too long: {} bytes (max {})", len, MAX_SSID_LEN)
            }
            Self::PasswordTooShort { len } => write!(
                f,
                "password too short: {} bytes (min {})",
                len, MIN_PASSWORD_LEN
            ),
            Self::PasswordTooLong { len } => write!(
                f,
                "password too long: {} bytes (max {})",
                len, MAX_PASSWORD_LEN
            ),
        }
    }
}
