//! Station + soft access point bring-up with a bounded connect

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sketchbook::{
    config,
    wifi::{self, EmbassyClock, EspStation},
};
use sketchbook_core::{
    config::{ConnectConfig, timing},
    connect::{Mode, connect_with_timeout},
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    Timer::after(Duration::from_secs(1)).await;
    esp_println::println!("=== WiFi Setup ===");

    let credentials = config::station_credentials();
    let access_point = config::soft_ap_credentials();
    let (credentials, access_point) = match (credentials, access_point) {
        (Ok(sta), Ok(ap)) => (sta, ap),
        (Err(e), _) | (_, Err(e)) => {
            esp_println::println!("[ERROR] Invalid credentials: {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let (mut controller, interfaces) = match wifi::init_radio(peripherals.WIFI) {
        Ok(parts) => parts,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let stack = match wifi::start_stack(&spawner, interfaces.sta) {
        Ok(stack) => stack,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    esp_println::println!("Connecting to WiFi...");
    let mut station = EspStation::new(&mut controller, stack).with_access_point(access_point);
    let outcome = connect_with_timeout(
        &mut station,
        &EmbassyClock,
        &mut Delay,
        &credentials,
        &ConnectConfig::default(),
        |_| esp_println::print!("."),
    )
    .await;
    esp_println::println!("");

    let mode = outcome.then_init(|ip| {
        esp_println::println!("WiFi connected!");
        if let Some(ip) = ip {
            esp_println::println!("IP address: {}", ip);
        }
    });

    if mode == Mode::Degraded {
        esp_println::println!("WiFi connection FAILED, soft AP '{}' still up", access_point.ssid);
    }

    loop {
        Timer::after(Duration::from_millis(timing::IDLE_MS)).await;
    }
}
