//! Radio bring-up, station adapter and scanning on top of `esp-radio`

use core::net::Ipv4Addr;

use embassy_executor::Spawner;
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::Instant;
use esp_hal::peripherals::WIFI;
use esp_radio::wifi::{
    AccessPointConfig, AccessPointInfo, AuthMethod, ClientConfig, Interfaces, ModeConfig,
    ScanConfig, WifiController, WifiDevice,
};
use heapless::Vec;
use sketchbook_core::{
    config::WifiCredentials,
    scan::{AuthKind, MAX_NETWORKS, NetworkInfo},
    traits::{Clock, WifiStation},
};
use static_cell::StaticCell;

/// Seed for the stack's port and sequence randomization
const NET_SEED: u64 = 0x5A17_2B34_D099_EE11;

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

/// Milliseconds since boot from the embassy time driver
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Start the radio and create the Wi-Fi controller. Callable once per boot.
pub fn init_radio(
    wifi: WIFI<'static>,
) -> Result<(WifiController<'static>, Interfaces<'static>), &'static str> {
    let radio = esp_radio::init().map_err(|e| {
        log::error!("esp-radio init failed: {:?}", e);
        "radio init failed"
    })?;
    let radio = RADIO.init(radio);

    esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|e| {
        log::error!("Wi-Fi init failed: {:?}", e);
        "Wi-Fi init failed"
    })
}

/// Create the DHCP network stack on `device` and spawn its runner
pub fn start_stack(
    spawner: &Spawner,
    device: WifiDevice<'static>,
) -> Result<Stack<'static>, &'static str> {
    let (stack, runner) = embassy_net::new(
        device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        NET_SEED,
    );

    spawner
        .spawn(net_task(runner))
        .map_err(|_| "network task already running")?;

    Ok(stack)
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// [`WifiStation`] over an `esp-radio` controller and its network stack.
///
/// With a soft access point configured, `begin` brings the radio up in
/// AP+STA mode and advertises it alongside the station connection.
pub struct EspStation<'a> {
    controller: &'a mut WifiController<'static>,
    stack: Stack<'static>,
    access_point: Option<WifiCredentials<'static>>,
}

impl<'a> EspStation<'a> {
    pub fn new(controller: &'a mut WifiController<'static>, stack: Stack<'static>) -> Self {
        Self {
            controller,
            stack,
            access_point: None,
        }
    }

    pub fn with_access_point(mut self, credentials: WifiCredentials<'static>) -> Self {
        self.access_point = Some(credentials);
        self
    }
}

impl WifiStation for EspStation<'_> {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), &'static str> {
        let client = ClientConfig::default()
            .with_ssid(ssid.into())
            .with_password(password.into());

        let mode = match self.access_point {
            Some(ap) => {
                let auth = if ap.is_open() {
                    AuthMethod::None
                } else {
                    AuthMethod::Wpa2Personal
                };
                let access_point = AccessPointConfig::default()
                    .with_ssid(ap.ssid.into())
                    .with_password(ap.password.into())
                    .with_auth_method(auth);
                esp_println::println!("[WIFI] Soft AP '{}'", ap.ssid);
                ModeConfig::ApSta(client, access_point)
            }
            None => ModeConfig::Client(client),
        };

        self.controller
            .set_config(&mode)
            .map_err(|_| "Wi-Fi config rejected")?;

        if !matches!(self.controller.is_started(), Ok(true)) {
            self.controller.start().map_err(|_| "Wi-Fi start failed")?;
        }

        self.controller.connect().map_err(|_| "Wi-Fi connect failed")
    }

    fn is_connected(&mut self) -> bool {
        matches!(self.controller.is_connected(), Ok(true)) && self.stack.config_v4().is_some()
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.stack.config_v4().map(|config| config.address.address())
    }
}

/// Put the radio in station mode, not associated, ready to scan
pub fn prepare_scan(controller: &mut WifiController<'static>) -> Result<(), &'static str> {
    controller
        .set_config(&ModeConfig::Client(ClientConfig::default()))
        .map_err(|_| "Wi-Fi config rejected")?;
    controller.start().map_err(|_| "Wi-Fi start failed")?;
    // Not associated yet, so a failing disconnect is expected
    let _ = controller.disconnect();
    Ok(())
}

/// One active scan. Results beyond [`MAX_NETWORKS`] are dropped.
pub async fn scan_networks(
    controller: &mut WifiController<'static>,
) -> Result<Vec<NetworkInfo, MAX_NETWORKS>, &'static str> {
    let results = controller
        .scan_with_config_async(ScanConfig::default().with_max(MAX_NETWORKS))
        .await
        .map_err(|e| {
            log::warn!("Scan failed: {:?}", e);
            "Wi-Fi scan failed"
        })?;

    let mut networks = Vec::new();
    for ap in results.iter() {
        if networks.push(network_info(ap)).is_err() {
            break;
        }
    }
    Ok(networks)
}

fn network_info(ap: &AccessPointInfo) -> NetworkInfo {
    NetworkInfo::new(
        &ap.ssid,
        ap.signal_strength,
        ap.channel,
        auth_kind(ap.auth_method),
    )
}

fn auth_kind(method: Option<AuthMethod>) -> AuthKind {
    match method {
        Some(AuthMethod::None) => AuthKind::Open,
        Some(AuthMethod::Wep) => AuthKind::Wep,
        Some(AuthMethod::Wpa) => AuthKind::Wpa,
        Some(AuthMethod::Wpa2Personal) => AuthKind::Wpa2,
        Some(AuthMethod::WpaWpa2Personal) => AuthKind::WpaWpa2,
        Some(AuthMethod::Wpa2Enterprise) => AuthKind::Wpa2Enterprise,
        Some(AuthMethod::Wpa3Personal) => AuthKind::Wpa3,
        Some(AuthMethod::Wpa2Wpa3Personal) => AuthKind::Wpa2Wpa3,
        Some(AuthMethod::WapiPersonal) => AuthKind::WapiPsk,
        _ => AuthKind::Unknown,
    }
}
