//! Motor driver core for a motorized dart blaster on no-std embedded platforms.
//!
//! For a host-side simulation, see the `blaster-app/mock-mcu` binary.
#![no_std]

pub mod utils;
