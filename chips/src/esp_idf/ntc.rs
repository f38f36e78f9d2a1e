//! espressif/ntc_driver component over the oneshot ADC.

use core::ffi::c_void;
use core::ptr;

use hal::ntc::{Thermistor, ThermistorConfig};

use super::{esp_err_t, EspError};

pub type ntc_device_handle_t = *mut c_void;

/// `ADC_ATTEN_DB_12`, full 0..3.1V input range
const ADC_ATTEN_DB_12: u32 = 3;

#[repr(C)]
struct ntc_config_t {
    b_value: u32,
    r25_ohm: u32,
    fixed_ohm: u32,
    vdd_mv: u32,
    circuit_mode: u32,
    atten: u32,
    channel: u32,
    unit: u32,
}

extern "C" {
    fn ntc_dev_create(
        config: *mut ntc_config_t,
        handle: *mut ntc_device_handle_t,
        adc_handle: *mut *mut c_void,
    ) -> esp_err_t;
    fn ntc_dev_get_temperature(handle: ntc_device_handle_t, temperature: *mut f32) -> esp_err_t;
    fn ntc_dev_delete(handle: ntc_device_handle_t) -> esp_err_t;
}

pub struct NtcThermistor {
    handle: ntc_device_handle_t,
}

unsafe impl Send for NtcThermistor {}

impl NtcThermistor {
    pub fn new(config: &ThermistorConfig) -> Result<Self, EspError> {
        let mut raw = ntc_config_t {
            b_value: config.b_value,
            r25_ohm: config.r25_ohm,
            fixed_ohm: config.fixed_ohm,
            vdd_mv: config.vdd_mv,
            circuit_mode: config.circuit_mode as u32,
            atten: ADC_ATTEN_DB_12,
            channel: config.adc_channel as u32,
            unit: config.adc_unit as u32,
        };
        let mut handle: ntc_device_handle_t = ptr::null_mut();
        let mut adc_handle: *mut c_void = ptr::null_mut();
        crate::esp!(ntc_dev_create(&mut raw, &mut handle, &mut adc_handle))?;
        debug!("NTC on ADC{} channel {}", config.adc_unit + 1, config.adc_channel);
        Ok(Self { handle })
    }
}

impl Thermistor for NtcThermistor {
    type Error = EspError;

    fn temperature(&mut self) -> Result<f32, EspError> {
        let mut celsius = 0.0f32;
        crate::esp!(ntc_dev_get_temperature(self.handle, &mut celsius))?;
        Ok(celsius)
    }
}

impl Drop for NtcThermistor {
    fn drop(&mut self) {
        if let Err(e) = crate::esp!(ntc_dev_delete(self.handle)) {
            warn!("NTC delete failed: {}", e);
        }
    }
}
