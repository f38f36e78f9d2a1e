#![no_std]

//! Peripheral capability interfaces.
//!
//! Every capability lives in its own module and only exists when the matching
//! cargo feature is enabled, so application code referencing a capability that
//! was not selected for the image fails to compile.

#[cfg(test)]
extern crate std;

#[cfg(feature = "button")]
pub mod button;
pub mod flash;
#[cfg(feature = "littlefs")]
pub mod fs;
#[cfg(feature = "led-strip")]
pub mod led_strip;
#[cfg(feature = "ntc")]
pub mod ntc;
#[cfg(feature = "bootloader-ota")]
pub mod ota;
