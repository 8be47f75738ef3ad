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
    climate::{self, ClimateReading},
    config::WifiCredentials,
    dfplayer::{self, cmd},
    lcd::{Lcd1602, LcdAddress},
    poller::IntervalPoller,
    scan::{self, AuthKind, NetworkInfo},
    switch::{PowerCommand, PowerSwitch},
    traits::ClimateSensor,
};

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn assert_close(&mut self, value: f32, expected: f32, tolerance: f32, test_name: &str) {
        self.total += 1;
        if (value - expected).abs() < tolerance {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!(
                "  ✗ {} FAILED: {:.2} not close to {:.2} (tolerance: {:.2})",
                test_name,
                value,
                expected,
                tolerance
            );
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

fn test_core_logic(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Core Logic Tests");

    // Credentials
    results.assert(
        WifiCredentials::new("HomeNetwork", "password123").is_ok(),
        "valid credentials accepted",
    );
    results.assert(
        WifiCredentials::new("", "password123").is_err(),
        "empty SSID rejected",
    );
    results.assert(
        WifiCredentials::new("HomeNetwork", "short").is_err(),
        "short password rejected",
    );

    // Poller
    let mut poller = IntervalPoller::starting_at(5_000, 0);
    results.assert(!poller.poll(4_999), "poller waits for the interval");
    results.assert(poller.poll(5_000), "poller fires at the interval");
    results.assert(!poller.poll(5_001), "poller fires once per window");
    results.assert_eq(poller.remaining_ms(6_000), 4_000, "poller remaining time");

    // Power switch
    results.assert_eq(
        PowerCommand::parse("lights ON"),
        Ok(PowerCommand {
            device_id: "lights",
            state: true,
        }),
        "parse power command",
    );
    results.assert(
        PowerCommand::parse("lights dim").is_err(),
        "reject unknown state",
    );

    let mut applied = None;
    let mut handler = |_id: &str, state: bool| {
        applied = Some(state);
        true
    };
    let mut switch = PowerSwitch::new("lights");
    results.assert(!switch.dispatch("lights", true), "no handler, no dispatch");
    switch.on_power_state(&mut handler);
    results.assert(!switch.dispatch("fan", true), "unknown device ignored");
    results.assert(switch.dispatch("lights", false), "handler accepts state");
    results.assert_eq(applied, Some(false), "handler saw requested state");

    // Formatting
    let network = NetworkInfo::new("HomeNetwork", -48, 6, AuthKind::Wpa2);
    let (name, signal) = scan::lcd_lines(&network);
    results.assert_eq(name.as_str(), "HomeNetwork", "scan LCD row 0");
    results.assert_eq(signal.as_str(), "RSSI:-48dBm", "scan LCD row 1");
    results.assert_eq(scan::summary(0).as_str(), "No networks found", "empty scan summary");

    let (temp, humi) = climate::lcd_lines(&ClimateReading {
        temperature_c: 23.0,
        humidity_pct: 45.0,
    });
    results.assert_eq(temp.as_str(), "Temp.: 23.00°C", "climate LCD row 0");
    results.assert_eq(humi.as_str(), "Humi.: 45.00%", "climate LCD row 1");

    // DFPlayer framing
    let frame = dfplayer::encode_frame(cmd::VOLUME, 30, false);
    results.assert_eq(
        frame,
        [0x7E, 0xFF, 0x06, 0x06, 0x00, 0x00, 0x1E, 0xFE, 0xD7, 0xEF],
        "volume frame bytes",
    );
    results.assert_eq(
        dfplayer::decode_frame(&frame).map(|f| f.param),
        Ok(30),
        "volume frame decodes",
    );
}

fn test_lcd<SDA, SCL>(
    results: &mut TestResults,
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: SDA,
    scl: SCL,
) where
    SDA: Into<esp_hal::gpio::AnyPin<'static>>,
    SCL: Into<esp_hal::gpio::AnyPin<'static>>,
{
    esp_println::println!("\n[TEST] LCD Tests");

    let mut i2c = match hardware::i2c_bus(i2c0, sda, scl) {
        Ok(i2c) => i2c,
        Err(e) => {
            esp_println::println!("  Failed to create I2C bus: {}", e);
            results.assert(false, "I2C bus created");
            return;
        }
    };

    esp_println::println!("  Running I2C scan...");
    let found = hardware::scan_bus(&mut i2c);
    results.assert(!found.is_empty(), "I2C scan found a device");

    let address = if found.contains(&LcdAddress::Primary.addr()) {
        LcdAddress::Primary
    } else if found.contains(&LcdAddress::Alternate.addr()) {
        LcdAddress::Alternate
    } else {
        results.assert(false, "LCD backpack at 0x27 or 0x3F");
        return;
    };
    results.assert(true, "LCD backpack at 0x27 or 0x3F");

    let mut lcd = Lcd1602::new(i2c, esp_hal::delay::Delay::new(), address);
    results.assert(init_lcd(&mut lcd, "Self test").is_ok(), "LCD initialization");
    results.assert(
        lcd.set_cursor(0, 1).is_ok() && lcd.print("25.00°C 40%").is_ok(),
        "LCD cursor and print",
    );
    results.assert(lcd.set_cursor(16, 0).is_err(), "LCD rejects column 16");
}

async fn test_dht11<DATA>(results: &mut TestResults, data: DATA)
where
    DATA: Into<esp_hal::gpio::AnyPin<'static>>,
{
    esp_println::println!("\n[TEST] DHT11 Sensor Tests");

    let mut sensor = Dht11Hardware::new(data);

    // DHT11 needs a second between conversions
    esp_println::println!("  Reading climate (5 samples)...");
    let mut temps = heapless::Vec::<f32, 5>::new();
    let mut humidities = heapless::Vec::<f32, 5>::new();
    for i in 0..5 {
        Timer::after(Duration::from_millis(1_100)).await;
        match sensor.read() {
            Ok((temp, humidity)) => {
                esp_println::println!("    Sample {}: {:.2}°C {:.2}%", i + 1, temp, humidity);
                let _ = temps.push(temp);
                let _ = humidities.push(humidity);
            }
            Err(e) => {
                esp_println::println!("    Failed to read sensor: {}", e);
            }
        }
    }

    results.assert(temps.len() >= 4, "collected at least 4 of 5 samples");

    if !temps.is_empty() {
        for temp in temps.iter() {
            results.assert(*temp >= 0.0 && *temp <= 50.0, "temperature in DHT11 range");
        }
        for humidity in humidities.iter() {
            results.assert(
                *humidity >= 20.0 && *humidity <= 90.0,
                "humidity in DHT11 range",
            );
        }

        // Readings are whole degrees and should not jump between samples
        let min_temp = temps.iter().fold(f32::INFINITY, |a, &b| a.min(b));
        let max_temp = temps.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        results.assert_close(max_temp, min_temp, 2.5, "temperature readings stable");
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Hardware Unit Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Run tests that don't need hardware
    test_core_logic(&mut results);

    // Initialize RTOS timer for embassy (this consumes TIMG0)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Run hardware tests
    test_lcd(
        &mut results,
        peripherals.I2C0,
        peripherals.GPIO21,
        peripherals.GPIO22,
    );
    test_dht11(&mut results, peripherals.GPIO2).await;

    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        if results.failed == 0 {
            Timer::after(Duration::from_millis(200)).await;
        } else {
            Timer::after(Duration::from_millis(1000)).await;
        }
    }
}
