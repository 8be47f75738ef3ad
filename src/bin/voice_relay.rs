//! Ten LEDs switched together by power-state commands
//!
//! Following pins are used:
//! - LEDs 1-10 => GPIO2, 4, 5, 12, 13, 14, 15, 18, 19, 23

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sketchbook::{
    config, hardware,
    relay::{RelayLink, command_listener},
    wifi::{self, EmbassyClock, EspStation},
};
use sketchbook_core::{
    config::{ConnectConfig, relay::COMMAND_PORT, timing},
    connect::{Mode, connect_with_timeout},
    switch::PowerSwitch,
};

esp_bootloader_esp_idf::esp_app_desc!();

static RELAY_LINK: RelayLink = RelayLink::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::println!("=== Voice Relay ===");

    let mut leds = hardware::led_bank([
        peripherals.GPIO2.into(),
        peripherals.GPIO4.into(),
        peripherals.GPIO5.into(),
        peripherals.GPIO12.into(),
        peripherals.GPIO13.into(),
        peripherals.GPIO14.into(),
        peripherals.GPIO15.into(),
        peripherals.GPIO18.into(),
        peripherals.GPIO19.into(),
        peripherals.GPIO23.into(),
    ]);

    let mut on_power_state = |device_id: &str, state: bool| -> bool {
        esp_println::println!(
            "[RELAY] {} -> {}",
            device_id,
            if state { "ON" } else { "OFF" }
        );
        leds.set_all(state).is_ok()
    };
    let mut switch = PowerSwitch::new(config::RELAY_DEVICE_ID);

    let credentials = match config::station_credentials() {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            esp_println::println!("[ERROR] Invalid credentials: {}", e);
            None
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

    let mode = match credentials {
        Some(credentials) => {
            esp_println::println!("Attempting to connect to internet");
            let mut station = EspStation::new(&mut controller, stack);
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

            outcome.then_init(|ip| {
                esp_println::println!("WiFi connected");
                if let Some(ip) = ip {
                    esp_println::println!("Connected with IP addr: {}", ip);
                }

                switch.on_power_state(&mut on_power_state);
                if let Err(e) = spawner.spawn(command_listener(stack, &RELAY_LINK)) {
                    esp_println::println!("[ERROR] Failed to spawn listener: {:?}", e);
                }

                esp_println::println!("Relay initialization complete!");
                esp_println::println!(
                    "Send '{} on' or '{} off' to port {}",
                    config::RELAY_DEVICE_ID,
                    config::RELAY_DEVICE_ID,
                    COMMAND_PORT
                );
            })
        }
        None => Mode::Degraded,
    };

    if mode == Mode::Degraded {
        esp_println::println!("WiFi connection FAILED");
        esp_println::println!("Skipping relay init due to WiFi failure");
    }

    loop {
        RELAY_LINK.handle(&mut switch);
        Timer::after(Duration::from_millis(timing::RELAY_LOOP_MS)).await;
    }
}
