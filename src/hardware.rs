use dht_sensor::dht11;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{AnyPin, DriveMode, Flex, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    peripherals::{I2C0, UART2},
    time::Rate,
    uart::{Config as UartConfig, Uart},
};
use heapless::Vec;
use sketchbook_core::{
    actuator::PinBank,
    config::{lcd, mp3, relay},
    lcd::{Lcd1602, LcdAddress},
    traits::{ClimateSensor, SerialPort},
};

/// Lowest and highest 7-bit addresses probed by [`scan_bus`]
pub const FIRST_I2C_ADDRESS: u8 = 0x03;
pub const LAST_I2C_ADDRESS: u8 = 0x77;

pub type LcdDisplay<'a> = Lcd1602<I2c<'a, Blocking>, Delay>;

pub type LedBank<'a> = PinBank<Output<'a>, { relay::LED_COUNT }>;

/// Standard-mode I2C master on the given pins
pub fn i2c_bus<'a, SDA, SCL>(
    i2c_periph: I2C0<'a>,
    sda: SDA,
    scl: SCL,
) -> Result<I2c<'a, Blocking>, &'static str>
where
    SDA: Into<AnyPin<'a>>,
    SCL: Into<AnyPin<'a>>,
{
    let i2c = I2c::new(
        i2c_periph,
        I2cConfig::default().with_frequency(Rate::from_khz(lcd::I2C_FREQUENCY_KHZ)),
    )
    .map_err(|_| "I2C config rejected")?
    .with_sda(sda.into())
    .with_scl(scl.into());

    Ok(i2c)
}

/// 16x2 LCD behind a PCF8574 backpack. Not initialized yet.
pub fn lcd_display<'a, SDA, SCL>(
    i2c_periph: I2C0<'a>,
    sda: SDA,
    scl: SCL,
    address: LcdAddress,
) -> Result<LcdDisplay<'a>, &'static str>
where
    SDA: Into<AnyPin<'a>>,
    SCL: Into<AnyPin<'a>>,
{
    let i2c = i2c_bus(i2c_periph, sda, scl)?;
    Ok(Lcd1602::new(i2c, Delay::new(), address))
}

/// Addresses that acknowledge an empty write
pub fn scan_bus(i2c: &mut I2c<'_, Blocking>) -> Vec<u8, 8> {
    let mut found = Vec::new();
    for address in FIRST_I2C_ADDRESS..=LAST_I2C_ADDRESS {
        if i2c.write(address, &[]).is_ok() {
            esp_println::println!("[I2C] Found device at 0x{:02X}", address);
            if found.push(address).is_err() {
                esp_println::println!("[I2C] Too many devices, stopping scan");
                break;
            }
        }
    }
    found
}

/// Ten LEDs, all off
pub fn led_bank<'a>(pins: [AnyPin<'a>; relay::LED_COUNT]) -> LedBank<'a> {
    PinBank::new(pins.map(|pin| Output::new(pin, Level::Low, OutputConfig::default())))
}

/// DHT11 on a single open-drain data line with the internal pull-up
pub struct Dht11Hardware<'a> {
    pin: Flex<'a>,
    delay: Delay,
}

impl<'a> Dht11Hardware<'a> {
    pub fn new<DATA>(data: DATA) -> Self
    where
        DATA: Into<AnyPin<'a>>,
    {
        let mut pin = Flex::new(data.into());
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.apply_input_config(&InputConfig::default().with_pull(Pull::Up));
        pin.set_input_enable(true);
        pin.set_output_enable(true);
        pin.set_high();

        Self {
            pin,
            delay: Delay::new(),
        }
    }
}

impl ClimateSensor for Dht11Hardware<'_> {
    fn read(&mut self) -> Result<(f32, f32), &'static str> {
        // Line must idle high before the start pulse
        self.pin.set_high();

        match dht11::blocking::read(&mut self.delay, &mut self.pin) {
            Ok(reading) => Ok((
                reading.temperature as f32,
                reading.relative_humidity as f32,
            )),
            Err(e) => {
                log::warn!("DHT11 read failed: {:?}", e);
                Err("DHT11 read failed")
            }
        }
    }
}

/// UART link to the DFPlayer Mini
pub struct Mp3Serial<'a> {
    uart: Uart<'a, Blocking>,
}

impl<'a> Mp3Serial<'a> {
    pub fn new<RX, TX>(uart_periph: UART2<'a>, rx: RX, tx: TX) -> Result<Self, &'static str>
    where
        RX: Into<AnyPin<'a>>,
        TX: Into<AnyPin<'a>>,
    {
        let uart = Uart::new(
            uart_periph,
            UartConfig::default().with_baudrate(mp3::BAUD_RATE),
        )
        .map_err(|_| "UART config rejected")?
        .with_rx(rx.into())
        .with_tx(tx.into());

        Ok(Self { uart })
    }
}

impl SerialPort for Mp3Serial<'_> {
    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), &'static str> {
        while !bytes.is_empty() {
            let written = self.uart.write(bytes).map_err(|_| "UART write failed")?;
            bytes = &bytes[written..];
        }
        self.uart.flush().map_err(|_| "UART flush failed")
    }

    fn read_byte(&mut self) -> Result<Option<u8>, &'static str> {
        let mut byte = [0u8; 1];
        match self.uart.read_buffered(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(_) => Err("UART read failed"),
        }
    }
}
