//! DFPlayer Mini: probe, set the volume and play the first track
//!
//! Following pins are used:
//! - DFPlayer TX => GPIO16 (UART2 RX)
//! - DFPlayer RX => GPIO17 (UART2 TX)

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{delay::Delay, timer::timg::TimerGroup};

use sketchbook::hardware::Mp3Serial;
use sketchbook_core::{
    config::mp3,
    dfplayer::{DfPlayer, cmd},
};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("=== MP3 Player ===");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let serial = match Mp3Serial::new(peripherals.UART2, peripherals.GPIO16, peripherals.GPIO17)
    {
        Ok(serial) => serial,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut player = DfPlayer::new(serial, Delay::new());

    match player.begin() {
        Ok(devices) => esp_println::println!("[MP3] DFPlayer online, devices 0x{:02X}", devices),
        Err(e) => {
            esp_println::println!("DFPlayer not found ({})", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    }

    if let Err(e) = player.volume(mp3::DEFAULT_VOLUME) {
        esp_println::println!("[MP3] Volume failed: {}", e);
    }
    if let Err(e) = player.play(mp3::DEFAULT_TRACK) {
        esp_println::println!("[MP3] Play failed: {}", e);
    }
    esp_println::println!(
        "[MP3] Playing track {} at volume {}",
        mp3::DEFAULT_TRACK,
        player.current_volume()
    );

    loop {
        match player.poll_frame() {
            Ok(Some(frame)) => match frame.command {
                cmd::REPORT_ERROR => esp_println::println!("[MP3] Error code {}", frame.param),
                cmd::REPORT_TRACK_FINISHED => {
                    esp_println::println!("[MP3] Track {} finished", frame.param)
                }
                cmd::REPORT_ACK => {}
                command => log::debug!("Report 0x{:02X} param {}", command, frame.param),
            },
            Ok(None) => Timer::after(Duration::from_millis(100)).await,
            Err(e) => {
                esp_println::println!("[MP3] {}", e);
                Timer::after(Duration::from_millis(100)).await;
            }
        }
    }
}
