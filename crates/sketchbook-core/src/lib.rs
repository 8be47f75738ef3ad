//! Hardware-independent core of the sketchbook firmware.
//!
//! Everything in here is written against `embedded-hal`, `embedded-hal-async`
//! and the small traits in [`traits`], so it builds for the ESP32 and for the
//! host, where the unit tests run.

#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod climate;
pub mod config;
pub mod connect;
pub mod dfplayer;
pub mod lcd;
pub mod lines;
pub mod poller;
pub mod scan;
pub mod switch;
pub mod traits;
