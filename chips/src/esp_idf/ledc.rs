//! LEDC PWM channel, drives the vibration motor.

use embedded_hal::PwmPin;

use super::{esp_err_t, EspError};

pub const LEDC_LOW_SPEED_MODE: u32 = 0;
pub const LEDC_AUTO_CLK: u32 = 0;
pub const LEDC_INTR_DISABLE: u32 = 0;

#[repr(C)]
struct ledc_timer_config_t {
    speed_mode: u32,
    duty_resolution: u32,
    timer_num: u32,
    freq_hz: u32,
    clk_cfg: u32,
    deconfigure: bool,
}

#[repr(C)]
struct ledc_channel_config_t {
    gpio_num: i32,
    speed_mode: u32,
    channel: u32,
    intr_type: u32,
    timer_sel: u32,
    duty: u32,
    hpoint: i32,
    flags: u32,
}

extern "C" {
    fn ledc_timer_config(config: *const ledc_timer_config_t) -> esp_err_t;
    fn ledc_channel_config(config: *const ledc_channel_config_t) -> esp_err_t;
    fn ledc_set_duty(speed_mode: u32, channel: u32, duty: u32) -> esp_err_t;
    fn ledc_update_duty(speed_mode: u32, channel: u32) -> esp_err_t;
    fn ledc_get_duty(speed_mode: u32, channel: u32) -> u32;
    fn ledc_stop(speed_mode: u32, channel: u32, idle_level: u32) -> esp_err_t;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LedcConfig {
    pub gpio: i32,
    pub timer: u32,
    pub channel: u32,
    pub frequency_hz: u32,
    pub resolution_bits: u32,
}

impl LedcConfig {
    /// 5kHz with 10 bit resolution on timer 0 channel 0
    pub fn new(gpio: i32) -> Self {
        Self { gpio, timer: 0, channel: 0, frequency_hz: 5_000, resolution_bits: 10 }
    }
}

pub struct LedcPwm {
    channel: u32,
    max_duty: u32,
    duty: u32,
}

impl LedcPwm {
    pub fn new(config: LedcConfig) -> Result<Self, EspError> {
        let timer = ledc_timer_config_t {
            speed_mode: LEDC_LOW_SPEED_MODE,
            duty_resolution: config.resolution_bits,
            timer_num: config.timer,
            freq_hz: config.frequency_hz,
            clk_cfg: LEDC_AUTO_CLK,
            deconfigure: false,
        };
        crate::esp!(ledc_timer_config(&timer))?;
        let channel = ledc_channel_config_t {
            gpio_num: config.gpio,
            speed_mode: LEDC_LOW_SPEED_MODE,
            channel: config.channel,
            intr_type: LEDC_INTR_DISABLE,
            timer_sel: config.timer,
            duty: 0,
            hpoint: 0,
            flags: 0,
        };
        crate::esp!(ledc_channel_config(&channel))?;
        let max_duty = 1 << config.resolution_bits;
        Ok(Self { channel: config.channel, max_duty, duty: 0 })
    }

    fn apply(&self) {
        let mode = LEDC_LOW_SPEED_MODE;
        let result = crate::esp!(ledc_set_duty(mode, self.channel, self.duty))
            .and_then(|_| crate::esp!(ledc_update_duty(mode, self.channel)));
        if let Err(e) = result {
            error!("LEDC channel {} duty update failed: {}", self.channel, e);
        }
    }
}

impl PwmPin for LedcPwm {
    type Duty = u32;

    fn disable(&mut self) {
        if let Err(e) = crate::esp!(ledc_stop(LEDC_LOW_SPEED_MODE, self.channel, 0)) {
            error!("LEDC channel {} stop failed: {}", self.channel, e);
        }
    }

    fn enable(&mut self) {
        self.apply()
    }

    fn get_duty(&self) -> u32 {
        unsafe { ledc_get_duty(LEDC_LOW_SPEED_MODE, self.channel) }
    }

    fn get_max_duty(&self) -> u32 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u32) {
        self.duty = duty.min(self.max_duty);
        self.apply()
    }
}
