#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate log;

#[cfg(feature = "button")]
pub mod button;
#[cfg(feature = "led-strip")]
pub mod lights;
#[cfg(feature = "littlefs")]
pub mod logfs;
pub mod motor;
#[cfg(feature = "bootloader-ota")]
pub mod ota;
#[cfg(feature = "ntc")]
pub mod thermal;
