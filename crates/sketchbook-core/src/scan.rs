//! Wi-Fi scan reporting: serial table, LCD page per network, summaries.

use core::fmt::Write;

use heapless::String;

use crate::traits::TextDisplay;

/// Most networks kept from one scan
pub const MAX_NETWORKS: usize = 32;

/// SSID column width of the serial table
const SSID_COLUMN: usize = 31;

pub const TABLE_TOP: &str =
    "┌────┬─────────────────────────────────┬─────────┬────────┬──────────────┐";
pub const TABLE_HEADER: &str =
    "│ #  │ SSID                            │ Signal  │  Ch    │ Encryption   │";
pub const TABLE_SEPARATOR: &str =
    "├────┼─────────────────────────────────┼─────────┼────────┼──────────────┤";
pub const TABLE_BOTTOM: &str =
    "└────┴─────────────────────────────────┴─────────┴────────┴──────────────┘";

/// Access point security
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Open,
    Wep,
    Wpa,
    Wpa2,
    WpaWpa2,
    Wpa2Enterprise,
    Wpa3,
    Wpa2Wpa3,
    WapiPsk,
    Unknown,
}

impl AuthKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::WpaWpa2 => "WPA/WPA2",
            Self::Wpa2Enterprise => "WPA2-EAP",
            Self::Wpa3 => "WPA3",
            Self::Wpa2Wpa3 => "WPA2/WPA3",
            Self::WapiPsk => "WAPI",
            Self::Unknown => "Unknown",
        }
    }
}

/// One access point seen by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub ssid: String<32>,
    pub rssi: i8,
    pub channel: u8,
    pub auth: AuthKind,
}

impl NetworkInfo {
    /// SSIDs longer than 32 bytes are cut at a character boundary.
    pub fn new(ssid: &str, rssi: i8, channel: u8, auth: AuthKind) -> Self {
        let mut name = String::new();
        for ch in ssid.chars() {
            if name.push(ch).is_err() {
                break;
            }
        }
        Self {
            ssid: name,
            rssi,
            channel,
            auth,
        }
    }

    /// Hidden networks report an empty SSID
    pub fn display_name(&self) -> &str {
        if self.ssid.is_empty() {
            "<hidden>"
        } else {
            self.ssid.as_str()
        }
    }
}

/// Strongest signal first
pub fn sort_by_signal(networks: &mut [NetworkInfo]) {
    networks.sort_unstable_by(|a, b| b.rssi.cmp(&a.rssi));
}

/// "No networks found" or "Found N network(s)"
pub fn summary(count: usize) -> String<32> {
    let mut line = String::new();
    if count == 0 {
        let _ = line.push_str("No networks found");
    } else {
        let _ = write!(line, "Found {} network(s)", count);
    }
    line
}

pub fn next_scan_message(remaining_ms: u64) -> String<40> {
    let mut line = String::new();
    let _ = write!(line, "Next scan in {} seconds...", remaining_ms.div_ceil(1_000));
    line
}

/// First `max_chars` characters of `text`
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// One table row; `index` is zero-based and printed one-based.
pub fn table_row(index: usize, network: &NetworkInfo) -> String<192> {
    let mut row = String::new();
    let _ = write!(
        row,
        "│ {:<2} │ {:<w$} │ {:>4}dBm │ {:^6} │ {:<12} │",
        index + 1,
        truncate_chars(network.display_name(), SSID_COLUMN),
        network.rssi,
        network.channel,
        network.auth.label(),
        w = SSID_COLUMN,
    );
    row
}

/// The two LCD rows for a network: SSID (first 16 characters) and signal.
pub fn lcd_lines(network: &NetworkInfo) -> (String<64>, String<16>) {
    let mut name = String::new();
    let _ = name.push_str(truncate_chars(
        network.display_name(),
        crate::config::lcd::COLS as usize,
    ));

    let mut signal = String::new();
    let _ = write!(signal, "RSSI:{}dBm", network.rssi);

    (name, signal)
}

/// Replace the LCD contents with one network
pub fn display_network<D: TextDisplay>(
    display: &mut D,
    network: &NetworkInfo,
) -> Result<(), &'static str> {
    let (name, signal) = lcd_lines(network);
    display.clear()?;
    display.print_at(0, 0, &name)?;
    display.print_at(0, 1, &signal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeDisplay {
        rows: [std::string::String; 2],
        cursor: (u8, u8),
        clears: u32,
    }

    impl TextDisplay for FakeDisplay {
        fn init(&mut self) -> Result<(), &'static str> {
            Ok(())
        }

        fn clear(&mut self) -> Result<(), &'static str> {
            self.rows = Default::default();
            self.clears += 1;
            Ok(())
        }

        fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), &'static str> {
            self.cursor = (col, row);
            Ok(())
        }

        fn print(&mut self, text: &str) -> Result<(), &'static str> {
            self.rows[self.cursor.1 as usize].push_str(text);
            Ok(())
        }
    }

    fn home() -> NetworkInfo {
        NetworkInfo::new("HomeNetwork", -48, 6, AuthKind::Wpa2)
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(0).as_str(), "No networks found");
        assert_eq!(summary(1).as_str(), "Found 1 network(s)");
        assert_eq!(summary(12).as_str(), "Found 12 network(s)");
    }

    #[test]
    fn test_table_rows_align_with_header() {
        let width = TABLE_HEADER.chars().count();
        assert_eq!(TABLE_TOP.chars().count(), width);
        assert_eq!(TABLE_SEPARATOR.chars().count(), width);
        assert_eq!(TABLE_BOTTOM.chars().count(), width);

        let long = NetworkInfo::new(
            "An Extremely Long Network Name That Overflows",
            -91,
            13,
            AuthKind::Wpa2Wpa3,
        );
        for (i, network) in [home(), long].iter().enumerate() {
            let row = table_row(i, network);
            assert_eq!(row.chars().count(), width, "{}", row);
        }
    }

    #[test]
    fn test_table_row_contents() {
        let row = table_row(0, &home());
        assert!(row.starts_with("│ 1  │ HomeNetwork "));
        assert!(row.contains(" -48dBm "));
        assert!(row.contains("WPA2"));
    }

    #[test]
    fn test_lcd_lines_truncate_to_sixteen() {
        let network = NetworkInfo::new("Neighbourhood-WiFi-5G", -70, 36, AuthKind::Wpa2);
        let (name, signal) = lcd_lines(&network);
        assert_eq!(name.as_str(), "Neighbourhood-Wi");
        assert_eq!(signal.as_str(), "RSSI:-70dBm");
    }

    #[test]
    fn test_hidden_network_name() {
        let hidden = NetworkInfo::new("", -60, 1, AuthKind::Open);
        assert_eq!(lcd_lines(&hidden).0.as_str(), "<hidden>");
    }

    #[test]
    fn test_long_ssid_is_cut() {
        let ssid = "x".repeat(40);
        assert_eq!(NetworkInfo::new(&ssid, -1, 1, AuthKind::Open).ssid.len(), 32);
    }

    #[test]
    fn test_display_network() {
        let mut display = FakeDisplay::default();
        display_network(&mut display, &home()).unwrap();
        assert_eq!(display.clears, 1);
        assert_eq!(display.rows[0], "HomeNetwork");
        assert_eq!(display.rows[1], "RSSI:-48dBm");
    }

    #[test]
    fn test_sort_by_signal() {
        let mut networks = [
            NetworkInfo::new("weak", -90, 1, AuthKind::Open),
            NetworkInfo::new("strong", -30, 1, AuthKind::Open),
            NetworkInfo::new("mid", -60, 1, AuthKind::Open),
        ];
        sort_by_signal(&mut networks);
        let names: Vec<_> = networks.iter().map(|n| n.ssid.to_string()).collect();
        assert_eq!(names, ["strong", "mid", "weak"]);
    }

    #[test]
    fn test_next_scan_message() {
        assert_eq!(next_scan_message(5_000).as_str(), "Next scan in 5 seconds...");
        assert_eq!(next_scan_message(4_001).as_str(), "Next scan in 5 seconds...");
    }
}
