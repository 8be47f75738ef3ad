//! Hardware abstraction traits

use core::net::Ipv4Addr;

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wi-Fi station interface as seen by the bring-up routine
pub trait WifiStation {
    /// Start joining a network. Returns once the attempt has been issued,
    /// not once it has completed.
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), &'static str>;

    /// Whether the station is associated and has an address
    fn is_connected(&mut self) -> bool;

    /// Address assigned to the station, if any
    fn local_ip(&self) -> Option<Ipv4Addr>;
}

/// Trait for temperature/humidity sensors
pub trait ClimateSensor {
    /// Read temperature in Celsius and relative humidity in percent
    fn read(&mut self) -> Result<(f32, f32), &'static str>;
}

/// Trait for byte-oriented serial links
pub trait SerialPort {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), &'static str>;

    /// Next received byte, or `None` if nothing is buffered. Never blocks.
    fn read_byte(&mut self) -> Result<Option<u8>, &'static str>;
}

/// Trait for character display devices
pub trait TextDisplay {
    /// Initialize the display
    fn init(&mut self) -> Result<(), &'static str>;

    /// Clear the display and move the cursor home
    fn clear(&mut self) -> Result<(), &'static str>;

    /// Move the cursor to a column/row
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), &'static str>;

    /// Draw text at the current cursor position
    fn print(&mut self, text: &str) -> Result<(), &'static str>;

    /// Draw text at a specified position
    fn print_at(&mut self, col: u8, row: u8, text: &str) -> Result<(), &'static str> {
        self.set_cursor(col, row)?;
        self.print(text)
    }
}
