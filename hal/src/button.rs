use core::convert::TryFrom;
use core::fmt;

use fugit::MillisDurationU32;

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    PressDown = 0,
    PressUp,
    PressRepeat,
    PressRepeatDone,
    SingleClick,
    DoubleClick,
    MultipleClick,
    LongPressStart,
    LongPressHold,
    LongPressUp,
    PressEnd,
}

impl TryFrom<u32> for ButtonEvent {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, u32> {
        Ok(match value {
            0 => Self::PressDown,
            1 => Self::PressUp,
            2 => Self::PressRepeat,
            3 => Self::PressRepeatDone,
            4 => Self::SingleClick,
            5 => Self::DoubleClick,
            6 => Self::MultipleClick,
            7 => Self::LongPressStart,
            8 => Self::LongPressHold,
            9 => Self::LongPressUp,
            10 => Self::PressEnd,
            _ => return Err(value),
        })
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveLevel {
    Low = 0,
    High = 1,
}

/// Press timings, `None` keeps the driver default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonConfig {
    pub long_press_time: Option<MillisDurationU32>,
    pub short_press_time: Option<MillisDurationU32>,
}

fn saturate(duration: Option<MillisDurationU32>) -> u16 {
    duration.map(|d| d.ticks().min(u16::MAX as u32) as u16).unwrap_or(0)
}

impl ButtonConfig {
    pub fn long_press_ms(&self) -> u16 {
        saturate(self.long_press_time)
    }

    pub fn short_press_ms(&self) -> u16 {
        saturate(self.short_press_time)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpioConfig {
    pub gpio: i32,
    pub active_level: ActiveLevel,
    pub enable_power_save: bool,
    pub disable_pull: bool,
}

impl GpioConfig {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, active_level: ActiveLevel::Low, enable_power_save: false, disable_pull: false }
    }
}

/// One button of a resistor ladder sampled by an ADC channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdcConfig {
    pub unit: u8,
    pub channel: u8,
    pub button_index: u8,
    pub min_mv: u16,
    pub max_mv: u16,
}

/// Keyboard matrix, yields one button per row/column crossing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    pub rows: &'static [i32],
    pub cols: &'static [i32],
}

impl MatrixConfig {
    pub fn buttons(&self) -> usize {
        self.rows.len() * self.cols.len()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wiring {
    Gpio(GpioConfig),
    Adc(AdcConfig),
}

impl Wiring {
    /// Identifier reported alongside events of this button.
    pub fn id(&self) -> u32 {
        match self {
            Self::Gpio(gpio) => gpio.gpio as u32,
            Self::Adc(adc) => 0x100 | (adc.channel as u32) << 4 | adc.button_index as u32,
        }
    }
}

/// Custom key source for buttons not covered by the stock wirings.
pub trait KeyScan: Sync {
    fn key_level(&self) -> u8;
}

pub trait Listener: Sync {
    fn on_event(&self, id: u32, event: ButtonEvent);
}

pub trait Button {
    type Error: fmt::Debug;

    fn id(&self) -> u32;
    fn is_pressed(&self) -> bool;
    fn subscribe(
        &mut self,
        event: ButtonEvent,
        listener: &'static dyn Listener,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod test {
    #[test]
    fn test_event_numbering() {
        use core::convert::TryFrom;

        use super::ButtonEvent;

        assert_eq!(ButtonEvent::try_from(4), Ok(ButtonEvent::SingleClick));
        assert_eq!(ButtonEvent::try_from(10), Ok(ButtonEvent::PressEnd));
        assert_eq!(ButtonEvent::try_from(11), Err(11));
        assert_eq!(ButtonEvent::DoubleClick as u32, 5);
    }

    #[test]
    fn test_press_time_saturates() {
        use fugit::ExtU32;

        use super::ButtonConfig;

        let config = ButtonConfig { long_press_time: Some(100_000.millis()), short_press_time: None };
        assert_eq!(config.long_press_ms(), u16::MAX);
        assert_eq!(config.short_press_ms(), 0);
    }

    #[test]
    fn test_wiring_id() {
        use super::{AdcConfig, GpioConfig, MatrixConfig, Wiring};

        assert_eq!(Wiring::Gpio(GpioConfig::new(7)).id(), 7);
        let adc = AdcConfig { unit: 0, channel: 2, button_index: 1, min_mv: 100, max_mv: 400 };
        assert_eq!(Wiring::Adc(adc).id(), 0x121);
        let matrix = MatrixConfig { rows: &[1, 2], cols: &[3, 4, 5] };
        assert_eq!(matrix.buttons(), 6);
    }
}
