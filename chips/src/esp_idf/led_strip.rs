//! espressif/led_strip component, RMT and SPI backed.

use core::ffi::c_void;
use core::marker::PhantomData;
use core::ptr;

use hal::led_strip::{Hsv, LedStrip, Rgb, StripConfig};
#[cfg(feature = "led-strip-rmt")]
use hal::led_strip::rmt::RmtConfig;
#[cfg(feature = "led-strip-spi")]
use hal::led_strip::spi::SpiConfig;

use super::{esp_err_t, EspError, ESP_ERR_INVALID_ARG};

pub type led_strip_handle_t = *mut c_void;

#[repr(C)]
struct led_strip_config_t {
    strip_gpio_num: i32,
    max_leds: u32,
    led_model: u32,
    color_component_format: u32,
    flags: u32,
}

#[cfg(feature = "led-strip-rmt")]
#[repr(C)]
struct led_strip_rmt_config_t {
    clk_src: u32,
    resolution_hz: u32,
    mem_block_symbols: usize,
    flags: u32,
}

#[cfg(feature = "led-strip-spi")]
#[repr(C)]
struct led_strip_spi_config_t {
    clk_src: u32,
    spi_bus: u32,
    flags: u32,
}

extern "C" {
    #[cfg(feature = "led-strip-rmt")]
    fn led_strip_new_rmt_device(
        config: *const led_strip_config_t,
        rmt: *const led_strip_rmt_config_t,
        ret: *mut led_strip_handle_t,
    ) -> esp_err_t;
    #[cfg(feature = "led-strip-spi")]
    fn led_strip_new_spi_device(
        config: *const led_strip_config_t,
        spi: *const led_strip_spi_config_t,
        ret: *mut led_strip_handle_t,
    ) -> esp_err_t;
    fn led_strip_set_pixel(strip: led_strip_handle_t, index: u32, r: u32, g: u32, b: u32) -> esp_err_t;
    fn led_strip_set_pixel_rgbw(
        strip: led_strip_handle_t,
        index: u32,
        r: u32,
        g: u32,
        b: u32,
        w: u32,
    ) -> esp_err_t;
    fn led_strip_set_pixel_hsv(strip: led_strip_handle_t, index: u32, h: u16, s: u8, v: u8) -> esp_err_t;
    fn led_strip_refresh(strip: led_strip_handle_t) -> esp_err_t;
    fn led_strip_clear(strip: led_strip_handle_t) -> esp_err_t;
    fn led_strip_del(strip: led_strip_handle_t) -> esp_err_t;
}

fn raw_config(config: &StripConfig) -> led_strip_config_t {
    led_strip_config_t {
        strip_gpio_num: config.gpio,
        max_leds: config.max_leds,
        led_model: config.model as u32,
        color_component_format: config.color_format.bits(),
        flags: config.invert_out as u32,
    }
}

pub struct Rmt;
pub struct Spi;

/// Strip handle, `T` tells which transport created it.
pub struct IdfLedStrip<T> {
    handle: led_strip_handle_t,
    max_leds: usize,
    _transport: PhantomData<T>,
}

#[cfg(feature = "led-strip-rmt")]
pub type RmtLedStrip = IdfLedStrip<Rmt>;
#[cfg(feature = "led-strip-spi")]
pub type SpiLedStrip = IdfLedStrip<Spi>;

#[cfg(feature = "led-strip-rmt")]
impl IdfLedStrip<Rmt> {
    pub fn new(config: &StripConfig, rmt: &RmtConfig) -> Result<Self, EspError> {
        let rmt_config = led_strip_rmt_config_t {
            clk_src: rmt.clk_src,
            resolution_hz: rmt.resolution_hz,
            mem_block_symbols: rmt.mem_block_symbols,
            flags: rmt.with_dma as u32,
        };
        let mut handle: led_strip_handle_t = ptr::null_mut();
        crate::esp!(led_strip_new_rmt_device(&raw_config(config), &rmt_config, &mut handle))?;
        debug!("RMT led strip on gpio {}", config.gpio);
        Ok(Self { handle, max_leds: config.max_leds as usize, _transport: PhantomData })
    }
}

#[cfg(feature = "led-strip-spi")]
impl IdfLedStrip<Spi> {
    pub fn new(config: &StripConfig, spi: &SpiConfig) -> Result<Self, EspError> {
        let spi_config = led_strip_spi_config_t {
            clk_src: spi.clk_src,
            spi_bus: spi.spi_bus as u32,
            flags: spi.with_dma as u32,
        };
        let mut handle: led_strip_handle_t = ptr::null_mut();
        crate::esp!(led_strip_new_spi_device(&raw_config(config), &spi_config, &mut handle))?;
        debug!("SPI led strip on gpio {}", config.gpio);
        Ok(Self { handle, max_leds: config.max_leds as usize, _transport: PhantomData })
    }
}

impl<T> IdfLedStrip<T> {
    fn check_index(&self, index: usize) -> Result<u32, EspError> {
        match index < self.max_leds {
            true => Ok(index as u32),
            false => Err(EspError(ESP_ERR_INVALID_ARG)),
        }
    }
}

unsafe impl<T> Send for IdfLedStrip<T> {}

impl<T> LedStrip for IdfLedStrip<T> {
    type Error = EspError;

    fn max_leds(&self) -> usize {
        self.max_leds
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), EspError> {
        let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
        let index = self.check_index(index)?;
        crate::esp!(led_strip_set_pixel(self.handle, index, r, g, b))
    }

    fn set_pixel_rgbw(&mut self, index: usize, color: Rgb, white: u8) -> Result<(), EspError> {
        let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
        let index = self.check_index(index)?;
        crate::esp!(led_strip_set_pixel_rgbw(self.handle, index, r, g, b, white as u32))
    }

    fn set_pixel_hsv(&mut self, index: usize, color: Hsv) -> Result<(), EspError> {
        let index = self.check_index(index)?;
        let handle = self.handle;
        crate::esp!(led_strip_set_pixel_hsv(handle, index, color.hue, color.saturation, color.value))
    }

    fn clear(&mut self) -> Result<(), EspError> {
        crate::esp!(led_strip_clear(self.handle))
    }

    fn refresh(&mut self) -> Result<(), EspError> {
        crate::esp!(led_strip_refresh(self.handle))
    }
}

impl<T> Drop for IdfLedStrip<T> {
    fn drop(&mut self) {
        if let Err(e) = crate::esp!(led_strip_del(self.handle)) {
            warn!("Led strip delete failed: {}", e);
        }
    }
}
