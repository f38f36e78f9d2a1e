use core::cmp;
use core::ops::Range;

use embedded_hal::PwmPin;

pub const MAX_SPEED: u32 = 20;

/// Linear mapping of `value` from `from` onto `to`, zero always maps to zero.
pub fn map_range(from: Range<i64>, to: Range<i64>, value: i64) -> i64 {
    if value == 0 || from.start == from.end {
        return 0;
    }
    to.start + (value - from.start) * (to.end - to.start) / (from.end - from.start)
}

/// Vibration motor on a PWM channel, driven in `MAX_SPEED` discrete steps.
pub struct Motor<P> {
    pwm: P,
    speed: u32,
    min_power: u8,
    max_power: u8,
}

impl<P: PwmPin<Duty = u32>> Motor<P> {
    /// Powers are percentages of the full duty cycle used for the lowest and highest step.
    pub fn new(mut pwm: P, min_power: u8, max_power: u8) -> Self {
        let max_power = cmp::min(max_power, 100);
        let min_power = cmp::min(min_power, max_power);
        pwm.set_duty(0);
        pwm.enable();
        Self { pwm, speed: 0, min_power, max_power }
    }

    pub fn set(&mut self, speed: u32) -> u32 {
        self.speed = cmp::min(speed, MAX_SPEED);
        let range = self.min_power as i64..self.max_power as i64;
        let percent = map_range(0..MAX_SPEED as i64, range, self.speed as i64) as u64;
        let duty = self.pwm.get_max_duty() as u64 * percent / 100;
        trace!("Motor speed {} duty {}", self.speed, duty);
        self.pwm.set_duty(duty as u32);
        self.speed
    }

    pub fn get(&self) -> u32 {
        self.speed
    }

    pub fn inc(&mut self) -> u32 {
        if self.speed < MAX_SPEED {
            self.set(self.speed + 1)
        } else {
            self.speed
        }
    }

    pub fn dec(&mut self) -> u32 {
        if self.speed > 0 {
            self.set(self.speed - 1)
        } else {
            self.speed
        }
    }

    pub fn stop(&mut self) -> u32 {
        self.set(0)
    }

    pub fn release(mut self) -> P {
        self.pwm.set_duty(0);
        self.pwm.disable();
        self.pwm
    }
}
