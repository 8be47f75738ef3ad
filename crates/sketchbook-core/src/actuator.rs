//! Fixed-mapping actuator control
//!
//! One boolean command fans out to every pin of a fixed bank.

use embedded_hal::digital::{OutputPin, PinState};

/// A fixed, ordered set of output pins driven together.
pub struct PinBank<P, const N: usize> {
    pins: [P; N],
    state: bool,
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// Take ownership of the pins. The bank starts off, but the pins are not
    /// written until the first [`set_all`](Self::set_all).
    pub fn new(pins: [P; N]) -> Self {
        Self { pins, state: false }
    }

    /// Drive every pin to the level matching `on`, in declaration order.
    pub fn set_all(&mut self, on: bool) -> Result<(), P::Error> {
        let level = PinState::from(on);
        for pin in self.pins.iter_mut() {
            pin.set_state(level)?;
        }
        self.state = on;
        Ok(())
    }

    /// Last level commanded through [`set_all`](Self::set_all)
    pub fn state(&self) -> bool {
        self.state
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Give the pins back
    pub fn release(self) -> [P; N] {
        self.pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::vec::Vec;

    /// Records (pin id, level) for every write
    struct RecordingPin<'a> {
        id: u8,
        log: &'a RefCell<Vec<(u8, bool)>>,
    }

    impl ErrorType for RecordingPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.id, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push((self.id, true));
            Ok(())
        }
    }

    fn relay_bank(log: &RefCell<Vec<(u8, bool)>>) -> PinBank<RecordingPin<'_>, 10> {
        PinBank::new(crate::config::relay::LED_PINS.map(|id| RecordingPin { id, log }))
    }

    #[test]
    fn test_on_writes_every_pin_high() {
        let log = RefCell::new(Vec::new());
        let mut bank = relay_bank(&log);

        bank.set_all(true).unwrap();

        let writes = log.borrow();
        assert_eq!(writes.len(), 10);
        assert!(writes.iter().all(|&(_, level)| level));
        let order: Vec<u8> = writes.iter().map(|&(id, _)| id).collect();
        assert_eq!(order, crate::config::relay::LED_PINS.to_vec());
        assert!(bank.state());
    }

    #[test]
    fn test_off_writes_every_pin_low() {
        let log = RefCell::new(Vec::new());
        let mut bank = relay_bank(&log);

        bank.set_all(true).unwrap();
        log.borrow_mut().clear();
        bank.set_all(false).unwrap();

        let writes = log.borrow();
        assert_eq!(writes.len(), bank.len());
        assert!(writes.iter().all(|&(_, level)| !level));
        assert!(!bank.state());
    }

    #[test]
    fn test_new_does_not_touch_pins() {
        let log = RefCell::new(Vec::new());
        let bank = relay_bank(&log);
        assert!(log.borrow().is_empty());
        assert_eq!(bank.release().len(), 10);
    }
}
