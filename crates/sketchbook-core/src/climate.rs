//! Climate display logic (hardware-independent)

use core::fmt::Write;

use heapless::String;

use crate::traits::{ClimateSensor, TextDisplay};

/// One temperature/humidity sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Latest reading, overwritten on every successful poll
pub struct ClimateMonitor {
    latest: Option<ClimateReading>,
    failures: u32,
}

impl ClimateMonitor {
    pub const fn new() -> Self {
        Self {
            latest: None,
            failures: 0,
        }
    }

    /// Read the sensor. On failure the previous reading stays current.
    pub fn update<S: ClimateSensor>(&mut self, sensor: &mut S) -> Result<ClimateReading, &'static str> {
        match sensor.read() {
            Ok((temperature_c, humidity_pct)) => {
                let reading = ClimateReading {
                    temperature_c,
                    humidity_pct,
                };
                self.latest = Some(reading);
                Ok(reading)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                Err(e)
            }
        }
    }

    /// `None` until the first successful read
    pub fn latest(&self) -> Option<ClimateReading> {
        self.latest
    }

    /// Failed reads since start-up
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for ClimateMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Temperatures outside this span are pinned to its ends for display
const TEMP_DISPLAY_RANGE: (f32, f32) = (-99.99, 999.99);

/// Format a reading as the two LCD rows.
///
/// Values are clamped so the widest number still fits the row buffer.
pub fn lcd_lines(reading: &ClimateReading) -> (String<24>, String<24>) {
    let (lo, hi) = TEMP_DISPLAY_RANGE;
    let mut temp = String::new();
    let _ = write!(temp, "Temp.: {:.2}°C", reading.temperature_c.clamp(lo, hi));

    let mut humi = String::new();
    let _ = write!(humi, "Humi.: {:.2}%", reading.humidity_pct.clamp(0.0, 100.0));

    (temp, humi)
}

/// Update display with sensor reading
pub fn update_display_with_sensor<D: TextDisplay, S: ClimateSensor>(
    display: &mut D,
    sensor: &mut S,
    monitor: &mut ClimateMonitor,
) -> Result<ClimateReading, &'static str> {
    let reading = monitor.update(sensor)?;

    let (temp, humi) = lcd_lines(&reading);
    display.print_at(0, 0, &temp)?;
    display.print_at(0, 1, &humi)?;

    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String as StdString;

    struct ScriptedSensor {
        samples: std::vec::Vec<Result<(f32, f32), &'static str>>,
    }

    impl ClimateSensor for ScriptedSensor {
        fn read(&mut self) -> Result<(f32, f32), &'static str> {
            self.samples.remove(0)
        }
    }

    #[derive(Default)]
    struct FakeDisplay {
        rows: [StdString; 2],
        row: usize,
    }

    impl TextDisplay for FakeDisplay {
        fn init(&mut self) -> Result<(), &'static str> {
            Ok(())
        }

        fn clear(&mut self) -> Result<(), &'static str> {
            self.rows = Default::default();
            Ok(())
        }

        fn set_cursor(&mut self, _col: u8, row: u8) -> Result<(), &'static str> {
            self.row = row as usize;
            self.rows[self.row].clear();
            Ok(())
        }

        fn print(&mut self, text: &str) -> Result<(), &'static str> {
            self.rows[self.row].push_str(text);
            Ok(())
        }
    }

    #[test]
    fn test_no_reading_before_first_success() {
        let mut sensor = ScriptedSensor {
            samples: std::vec![Err("checksum mismatch"), Ok((21.0, 40.0))],
        };
        let mut monitor = ClimateMonitor::new();

        assert_eq!(monitor.update(&mut sensor), Err("checksum mismatch"));
        assert_eq!(monitor.latest(), None);
        assert_eq!(monitor.failures(), 1);

        monitor.update(&mut sensor).unwrap();
        assert_eq!(
            monitor.latest(),
            Some(ClimateReading {
                temperature_c: 21.0,
                humidity_pct: 40.0
            })
        );
    }

    #[test]
    fn test_failed_read_keeps_previous_value() {
        let mut sensor = ScriptedSensor {
            samples: std::vec![Ok((23.0, 45.0)), Err("timeout")],
        };
        let mut monitor = ClimateMonitor::new();
        monitor.update(&mut sensor).unwrap();
        assert!(monitor.update(&mut sensor).is_err());
        assert_eq!(monitor.latest().map(|r| r.temperature_c), Some(23.0));
    }

    #[test]
    fn test_lcd_lines() {
        let (temp, humi) = lcd_lines(&ClimateReading {
            temperature_c: 23.0,
            humidity_pct: 45.0,
        });
        assert_eq!(temp.as_str(), "Temp.: 23.00°C");
        assert_eq!(humi.as_str(), "Humi.: 45.00%");
        // Fits the 16 columns once the degree sign becomes one glyph
        assert!(temp.chars().count() <= 16);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let (temp, humi) = lcd_lines(&ClimateReading {
            temperature_c: 1.0e30,
            humidity_pct: 250.0,
        });
        assert_eq!(temp.as_str(), "Temp.: 999.99°C");
        assert_eq!(humi.as_str(), "Humi.: 100.00%");

        let (temp, humi) = lcd_lines(&ClimateReading {
            temperature_c: -1.0e9,
            humidity_pct: -5.0,
        });
        assert_eq!(temp.as_str(), "Temp.: -99.99°C");
        assert_eq!(humi.as_str(), "Humi.: 0.00%");
    }

    #[test]
    fn test_negative_temperature() {
        let (temp, _) = lcd_lines(&ClimateReading {
            temperature_c: -5.5,
            humidity_pct: 80.0,
        });
        assert_eq!(temp.as_str(), "Temp.: -5.50°C");
    }

    #[test]
    fn test_update_display_with_sensor() {
        let mut sensor = ScriptedSensor {
            samples: std::vec![Ok((19.0, 55.0))],
        };
        let mut display = FakeDisplay::default();
        let mut monitor = ClimateMonitor::new();

        update_display_with_sensor(&mut display, &mut sensor, &mut monitor).unwrap();
        assert_eq!(display.rows[0], "Temp.: 19.00°C");
        assert_eq!(display.rows[1], "Humi.: 55.00%");
    }

    #[test]
    fn test_display_untouched_on_read_error() {
        let mut sensor = ScriptedSensor {
            samples: std::vec![Err("timeout")],
        };
        let mut display = FakeDisplay::default();
        let mut monitor = ClimateMonitor::new();

        assert!(update_display_with_sensor(&mut display, &mut sensor, &mut monitor).is_err());
        assert!(display.rows.iter().all(|r| r.is_empty()));
    }
}
