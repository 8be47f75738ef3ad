//! I2C bus scan
//!
//! Probes every 7-bit address and reports the ones that acknowledge. Use it to
//! find out whether an LCD backpack sits at 0x27 or 0x3F.
//!
//! Following pins are used:
//! - SDA => GPIO21
//! - SCL => GPIO22

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sketchbook::hardware::{self, FIRST_I2C_ADDRESS, LAST_I2C_ADDRESS};
use sketchbook_core::lcd::LcdAddress;

esp_bootloader_esp_idf::esp_app_desc!();

const RESCAN_INTERVAL_SECS: u64 = 5;

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut i2c0 = match hardware::i2c_bus(peripherals.I2C0, peripherals.GPIO21, peripherals.GPIO22)
    {
        Ok(i2c) => i2c,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    loop {
        esp_println::println!(
            "I2C scan start (0x{:02X}..=0x{:02X})",
            FIRST_I2C_ADDRESS,
            LAST_I2C_ADDRESS
        );
        let found = hardware::scan_bus(&mut i2c0);

        if found.is_empty() {
            esp_println::println!("No I2C devices found");
        } else {
            esp_println::println!("{} device(s) found", found.len());
            for address in [LcdAddress::Primary, LcdAddress::Alternate] {
                if found.contains(&address.addr()) {
                    esp_println::println!("LCD backpack at 0x{:02X}", address.addr());
                }
            }
        }

        Timer::after(Duration::from_secs(RESCAN_INTERVAL_SECS)).await;
    }
}
