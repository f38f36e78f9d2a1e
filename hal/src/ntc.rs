use core::fmt;

/// Which rail the thermistor is tied to.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CircuitMode {
    NtcVcc = 0,
    NtcGnd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThermistorConfig {
    pub b_value: u32,
    pub r25_ohm: u32,
    pub fixed_ohm: u32,
    pub vdd_mv: u32,
    pub circuit_mode: CircuitMode,
    /// 0 selects ADC1
    pub adc_unit: u8,
    pub adc_channel: u8,
}

impl ThermistorConfig {
    /// 10k NTC with B=3950 against a 10k divider at 3.3V
    pub fn ntc_10k(adc_unit: u8, adc_channel: u8) -> Self {
        Self {
            b_value: 3950,
            r25_ohm: 10_000,
            fixed_ohm: 10_000,
            vdd_mv: 3300,
            circuit_mode: CircuitMode::NtcGnd,
            adc_unit,
            adc_channel,
        }
    }
}

pub trait Thermistor {
    type Error: fmt::Debug;

    /// Degrees celsius
    fn temperature(&mut self) -> Result<f32, Self::Error>;
}
