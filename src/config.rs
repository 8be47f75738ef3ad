//! Build-time credentials
//!
//! Set `WIFI_SSID`, `WIFI_PASSWORD`, `SOFTAP_SSID`, `SOFTAP_PASSWORD` and
//! `RELAY_DEVICE_ID` in the environment of `cargo build`. Unset variables fall
//! back to placeholders, which fail to join any real network and leave the
//! program in degraded mode.

use sketchbook_core::config::{CredentialsError, WifiCredentials};

const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "YOUR_WIFI_SSID",
};

const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "YOUR_WIFI_PASSWORD",
};

const SOFTAP_SSID: &str = match option_env!("SOFTAP_SSID") {
    Some(ssid) => ssid,
    None => "sketchbook-ap",
};

const SOFTAP_PASSWORD: &str = match option_env!("SOFTAP_PASSWORD") {
    Some(password) => password,
    None => "sketchbook",
};

/// Device id the voice relay answers to
pub const RELAY_DEVICE_ID: &str = match option_env!("RELAY_DEVICE_ID") {
    Some(id) => id,
    None => "YOUR_DEVICE_ID",
};

/// Station credentials
pub fn station_credentials() -> Result<WifiCredentials<'static>, CredentialsError> {
    WifiCredentials::new(WIFI_SSID, WIFI_PASSWORD)
}

/// Credentials the soft access point advertises
pub fn soft_ap_credentials() -> Result<WifiCredentials<'static>, CredentialsError> {
    WifiCredentials::new(SOFTAP_SSID, SOFTAP_PASSWORD)
}
