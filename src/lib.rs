//! Board wiring shared by the sketchbook programs

#![no_std]

pub mod config;
pub mod display;
pub mod hardware;
pub mod relay;
pub mod wifi;
