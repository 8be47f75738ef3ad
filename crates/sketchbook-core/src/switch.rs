//! Power-state switch device
//!
//! A switch owns a single handler slot. Whatever delivers commands (a cloud
//! SDK, a local socket) calls [`PowerSwitch::dispatch`]; the handler applies
//! the state and reports whether it succeeded.

use log::{debug, warn};

/// Handler signature: device id and requested state, returns success
pub type PowerStateHandler<'a> = &'a mut dyn FnMut(&str, bool) -> bool;

pub struct PowerSwitch<'a> {
    device_id: &'a str,
    handler: Option<PowerStateHandler<'a>>,
}

impl<'a> PowerSwitch<'a> {
    pub fn new(device_id: &'a str) -> Self {
        Self {
            device_id,
            handler: None,
        }
    }

    pub fn device_id(&self) -> &str {
        self.device_id
    }

    /// Register the power-state handler, replacing any previous one.
    pub fn on_power_state(&mut self, handler: PowerStateHandler<'a>) {
        self.handler = Some(handler);
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Deliver a power-state request. Returns `false` if the id does not
    /// match, no handler is registered, or the handler rejected it.
    pub fn dispatch(&mut self, device_id: &str, state: bool) -> bool {
        if device_id != self.device_id {
            warn!("Ignoring power state for unknown device '{}'", device_id);
            return false;
        }

        match self.handler.as_mut() {
            Some(handler) => {
                debug!("Power state {} -> {}", device_id, state);
                handler(device_id, state)
            }
            None => {
                warn!("No power state handler registered for '{}'", device_id);
                false
            }
        }
    }
}

/// A parsed `<device-id> <on|off>` command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCommand<'a> {
    pub device_id: &'a str,
    pub state: bool,
}

impl<'a> PowerCommand<'a> {
    pub fn parse(line: &'a str) -> Result<Self, &'static str> {
        let mut words = line.split_ascii_whitespace();
        let device_id = words.next().ok_or("empty command")?;
        let state_word = words.next().ok_or("missing state")?;
        if words.next().is_some() {
            return Err("trailing input");
        }

        let state = parse_state(state_word).ok_or("state must be on or off")?;
        Ok(Self { device_id, state })
    }
}

fn parse_state(word: &str) -> Option<bool> {
    const ON: [&str; 3] = ["on", "1", "true"];
    const OFF: [&str; 3] = ["off", "0", "false"];

    if ON.iter().any(|w| w.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if OFF.iter().any(|w| w.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_without_handler() {
        let mut switch = PowerSwitch::new("lights");
        assert!(!switch.has_handler());
        assert!(!switch.dispatch("lights", true));
    }

    #[test]
    fn test_dispatch_runs_handler() {
        let mut seen = None;
        let mut handler = |id: &str, state: bool| {
            seen = Some((std::string::String::from(id), state));
            true
        };

        let mut switch = PowerSwitch::new("lights");
        switch.on_power_state(&mut handler);
        assert!(switch.dispatch("lights", true));
        drop(switch);

        assert_eq!(seen, Some(("lights".into(), true)));
    }

    #[test]
    fn test_dispatch_rejects_other_device() {
        let mut calls = 0;
        let mut handler = |_: &str, _: bool| {
            calls += 1;
            true
        };

        let mut switch = PowerSwitch::new("lights");
        switch.on_power_state(&mut handler);
        assert!(!switch.dispatch("fan", true));
        drop(switch);

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_second_registration_replaces_first() {
        let mut first = |_: &str, _: bool| true;
        let mut second = |_: &str, _: bool| false;

        let mut switch = PowerSwitch::new("lights");
        switch.on_power_state(&mut first);
        switch.on_power_state(&mut second);
        assert!(!switch.dispatch("lights", false));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            PowerCommand::parse("lights on"),
            Ok(PowerCommand {
                device_id: "lights",
                state: true
            })
        );
        assert_eq!(
            PowerCommand::parse("  lights   OFF\r\n"),
            Ok(PowerCommand {
                device_id: "lights",
                state: false
            })
        );
        assert_eq!(PowerCommand::parse("lights 1").map(|c| c.state), Ok(true));
        assert_eq!(PowerCommand::parse("lights False").map(|c| c.state), Ok(false));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PowerCommand::parse(""), Err("empty command"));
        assert_eq!(PowerCommand::parse("lights"), Err("missing state"));
        assert_eq!(PowerCommand::parse("lights dim"), Err("state must be on or off"));
        assert_eq!(PowerCommand::parse("lights on now"), Err("trailing input"));
    }
}
