//! Each component module declares the C API it links against and wraps the
//! handles into the matching `hal` trait. Modules exist only with their feature.

#![allow(non_camel_case_types)]

#[cfg(feature = "button")]
pub mod button;
pub mod console;
pub mod ledc;
#[cfg(feature = "led-strip")]
pub mod led_strip;
#[cfg(feature = "littlefs")]
pub mod littlefs;
pub mod newlib;
#[cfg(feature = "ntc")]
pub mod ntc;
#[cfg(feature = "bootloader-ota")]
pub mod ota;
pub mod system;

use core::ffi::{c_char, CStr};
use core::fmt;

pub type esp_err_t = i32;

pub const ESP_OK: esp_err_t = 0;
pub const ESP_FAIL: esp_err_t = -1;
pub const ESP_ERR_NO_MEM: esp_err_t = 0x101;
pub const ESP_ERR_INVALID_ARG: esp_err_t = 0x102;
pub const ESP_ERR_INVALID_STATE: esp_err_t = 0x103;
pub const ESP_ERR_INVALID_SIZE: esp_err_t = 0x104;
pub const ESP_ERR_NOT_FOUND: esp_err_t = 0x105;

extern "C" {
    fn esp_err_to_name(code: esp_err_t) -> *const c_char;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EspError(pub esp_err_t);

impl EspError {
    pub fn check(code: esp_err_t) -> Result<(), Self> {
        match code {
            ESP_OK => Ok(()),
            code => Err(Self(code)),
        }
    }

    pub fn name(&self) -> &'static str {
        let name = unsafe { esp_err_to_name(self.0) };
        if name.is_null() {
            return "UNKNOWN";
        }
        unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for EspError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:#x})", self.name(), self.0)
    }
}

/// Converts an `esp_err_t` expression into `Result<(), EspError>`
#[macro_export]
macro_rules! esp {
    ($call:expr) => {
        $crate::esp_idf::EspError::check(unsafe { $call })
    };
}

/// NUL terminated copy of `s` for passing to C
pub(crate) fn c_string<const N: usize>(s: &str) -> Option<heapless::Vec<u8, N>> {
    if s.as_bytes().contains(&0) {
        return None;
    }
    let mut buffer: heapless::Vec<u8, N> = heapless::Vec::new();
    buffer.extend_from_slice(s.as_bytes()).ok()?;
    buffer.push(0).ok()?;
    Some(buffer)
}
