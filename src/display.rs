use sketchbook_core::lcd::LcdError;

use crate::hardware::LcdDisplay;

/// Initialize the LCD, switch the backlight on and print a banner on the top row
pub fn init_lcd(lcd: &mut LcdDisplay<'_>, banner: &str) -> Result<(), &'static str> {
    esp_println::println!("[LCD] Initializing 16x2 LCD at 0x{:02X}", lcd.address());

    lcd.init().map_err(describe)?;
    lcd.set_backlight(true).map_err(describe)?;
    lcd.clear().map_err(describe)?;
    lcd.set_cursor(0, 0).map_err(describe)?;
    lcd.print(banner).map_err(describe)?;

    esp_println::println!("[LCD] Ready");
    Ok(())
}

/// Print a banner longer than the display by letting it scroll in from the
/// right, then restore normal left-to-right entry.
pub fn scroll_banner(lcd: &mut LcdDisplay<'_>, banner: &str) -> Result<(), &'static str> {
    lcd.clear().map_err(describe)?;
    lcd.set_cursor(0, 0).map_err(describe)?;
    lcd.autoscroll(true).map_err(describe)?;
    lcd.print(banner).map_err(describe)?;
    lcd.autoscroll(false).map_err(describe)?;
    Ok(())
}

fn describe<E>(e: LcdError<E>) -> &'static str {
    match e {
        LcdError::I2c(_) => "LCD not responding",
        LcdError::OutOfRange { .. } => "LCD cursor out of range",
    }
}
