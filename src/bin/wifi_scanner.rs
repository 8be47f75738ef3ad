//! Periodic Wi-Fi scan with a serial table and one LCD page per network
//!
//! Following pins are used:
//! - LCD SDA => GPIO21
//! - LCD SCL => GPIO22

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::WifiController;

use sketchbook::{
    display::{init_lcd, scroll_banner},
    hardware::{self, LcdDisplay},
    wifi::{self, EmbassyClock},
};
use sketchbook_core::{
    config::timing,
    lcd::LcdAddress,
    poller::IntervalPoller,
    scan::{self, TABLE_BOTTOM, TABLE_HEADER, TABLE_SEPARATOR, TABLE_TOP},
    traits::Clock,
};

esp_bootloader_esp_idf::esp_app_desc!();

async fn scan_and_report(controller: &mut WifiController<'static>, lcd: &mut LcdDisplay<'_>) {
    esp_println::println!("Starting Scan");

    let mut networks = match wifi::scan_networks(controller).await {
        Ok(networks) => networks,
        Err(e) => {
            esp_println::println!("[SCAN] {}", e);
            return;
        }
    };

    esp_println::println!("Scan Complete");
    esp_println::println!("{}", scan::summary(networks.len()));
    if networks.is_empty() {
        return;
    }

    scan::sort_by_signal(&mut networks);

    esp_println::println!("");
    esp_println::println!("{}", TABLE_TOP);
    esp_println::println!("{}", TABLE_HEADER);
    esp_println::println!("{}", TABLE_SEPARATOR);
    for (index, network) in networks.iter().enumerate() {
        esp_println::println!("{}", scan::table_row(index, network));
        if let Err(e) = scan::display_network(lcd, network) {
            esp_println::println!("[LCD] {}", e);
        }
    }
    esp_println::println!("{}", TABLE_BOTTOM);
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::println!("\n-----------------------------------");
    esp_println::println!("ESP32 WiFi Scanner");
    esp_println::println!("-----------------------------------\n");

    let mut lcd = match hardware::lcd_display(
        peripherals.I2C0,
        peripherals.GPIO21,
        peripherals.GPIO22,
        LcdAddress::Alternate,
    ) {
        Ok(lcd) => lcd,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    // The scanner is still useful over serial without a display
    let lcd_ready =
        init_lcd(&mut lcd, "").and_then(|_| scroll_banner(&mut lcd, "ESP32 WiFi Scanner"));
    if let Err(e) = lcd_ready {
        esp_println::println!("[ERROR] LCD init failed: {}", e);
    }

    let (mut controller, _interfaces) = match wifi::init_radio(peripherals.WIFI) {
        Ok(parts) => parts,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    if let Err(e) = wifi::prepare_scan(&mut controller) {
        esp_println::println!("[ERROR] {}", e);
        loop {
            Timer::after(Duration::from_secs(1)).await;
        }
    }
    Timer::after(Duration::from_millis(100)).await;

    esp_println::println!("Wifi scanner ready!\nScanning for networks...");

    let clock = EmbassyClock;
    let mut poller = IntervalPoller::starting_at(timing::SCAN_INTERVAL_MS, 0);

    loop {
        let now = clock.now_ms();
        if !poller.poll(now) {
            Timer::after(Duration::from_millis(poller.remaining_ms(now))).await;
            continue;
        }

        scan_and_report(&mut controller, &mut lcd).await;

        esp_println::println!(
            "{}",
            scan::next_scan_message(poller.remaining_ms(clock.now_ms()))
        );
        Timer::after(Duration::from_millis(timing::SCAN_COOLDOWN_MS)).await;
    }
}
