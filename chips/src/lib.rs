#![no_std]

//! Bindings to the ESP-IDF native runtime and its peripheral components.

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate log;

#[cfg(feature = "esp-idf")]
pub mod esp_idf;
pub mod slots;
