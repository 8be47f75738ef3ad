//! DHT11 temperature/humidity on a 16x2 LCD
//!
//! Following pins are used:
//! - DHT11 data => GPIO2
//! - LCD SDA => GPIO21
//! - LCD SCL => GPIO22

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sketchbook::{
    display::init_lcd,
    hardware::{self, Dht11Hardware},
};
use sketchbook_core::{
    climate::{ClimateMonitor, update_display_with_sensor},
    config::timing,
    lcd::LcdAddress,
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("=== Climate Display ===");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut sensor = Dht11Hardware::new(peripherals.GPIO2);

    let mut lcd = match hardware::lcd_display(
        peripherals.I2C0,
        peripherals.GPIO21,
        peripherals.GPIO22,
        LcdAddress::Primary,
    ) {
        Ok(lcd) => lcd,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    if let Err(e) = init_lcd(&mut lcd, "HELLO") {
        esp_println::println!("[ERROR] LCD init failed: {}", e);
        loop {
            Timer::after(Duration::from_secs(1)).await;
        }
    }

    let mut monitor = ClimateMonitor::new();

    loop {
        match update_display_with_sensor(&mut lcd, &mut sensor, &mut monitor) {
            Ok(reading) => esp_println::println!(
                "[DHT11] Temperature: {:.2}°C, Humidity: {:.2}%",
                reading.temperature_c,
                reading.humidity_pct
            ),
            Err(e) => esp_println::println!(
                "[DHT11] Read error: {} ({} failures)",
                e,
                monitor.failures()
            ),
        }

        Timer::after(Duration::from_millis(timing::CLIMATE_INTERVAL_MS)).await;
    }
}
