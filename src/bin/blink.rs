//! On-board LED blink
//!
//! Following pins are used:
//! - LED => GPIO2

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{
    gpio::{Level, Output, OutputConfig},
    timer::timg::TimerGroup,
};

use sketchbook_core::config::timing;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::println!("ESP32 Blink Test");

    let mut led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());

    loop {
        led.set_high();
        esp_println::println!("LED ON");
        Timer::after(Duration::from_millis(timing::BLINK_MS)).await;

        led.set_low();
        esp_println::println!("LED OFF");
        Timer::after(Duration::from_millis(timing::BLINK_MS)).await;
    }
}
