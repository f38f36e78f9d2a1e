#[cfg(feature = "led-strip-rmt")]
pub mod rmt;
#[cfg(feature = "led-strip-spi")]
pub mod spi;

use core::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Hsv {
    /// 0..360 degrees
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
}

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedModel {
    WS2812 = 0,
    SK6812,
    WS2811,
}

/// Position of each colour component on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorFormat {
    pub r_pos: u8,
    pub g_pos: u8,
    pub b_pos: u8,
    pub w_pos: u8,
    pub num_components: u8,
}

impl ColorFormat {
    pub const GRB: Self = Self { r_pos: 1, g_pos: 0, b_pos: 2, w_pos: 3, num_components: 3 };
    pub const GRBW: Self = Self { r_pos: 1, g_pos: 0, b_pos: 2, w_pos: 3, num_components: 4 };
    pub const RGB: Self = Self { r_pos: 0, g_pos: 1, b_pos: 2, w_pos: 3, num_components: 3 };
    pub const RGBW: Self = Self { r_pos: 0, g_pos: 1, b_pos: 2, w_pos: 3, num_components: 4 };

    /// Packed as `r:2 g:2 b:2 w:2 reserved:21 num_components:3`
    pub const fn bits(&self) -> u32 {
        (self.r_pos as u32 & 0x3)
            | (self.g_pos as u32 & 0x3) << 2
            | (self.b_pos as u32 & 0x3) << 4
            | (self.w_pos as u32 & 0x3) << 6
            | (self.num_components as u32 & 0x7) << 29
    }

    pub fn has_white(&self) -> bool {
        self.num_components == 4
    }
}

impl Default for ColorFormat {
    fn default() -> Self {
        Self::GRB
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StripConfig {
    pub gpio: i32,
    pub max_leds: u32,
    pub model: LedModel,
    pub color_format: ColorFormat,
    pub invert_out: bool,
}

impl StripConfig {
    pub fn new(gpio: i32, max_leds: u32) -> Self {
        Self {
            gpio,
            max_leds,
            model: LedModel::WS2812,
            color_format: ColorFormat::GRB,
            invert_out: false,
        }
    }
}

/// Addressable LED strip. Pixel writes are buffered until `refresh`.
pub trait LedStrip {
    type Error: fmt::Debug;

    fn max_leds(&self) -> usize;
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), Self::Error>;
    fn set_pixel_rgbw(&mut self, index: usize, color: Rgb, white: u8) -> Result<(), Self::Error>;
    fn set_pixel_hsv(&mut self, index: usize, color: Hsv) -> Result<(), Self::Error>;
    /// Turns every LED off immediately
    fn clear(&mut self) -> Result<(), Self::Error>;
    fn refresh(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod test {
    #[test]
    fn test_color_format_bits() {
        use super::ColorFormat;

        assert_eq!(ColorFormat::GRB.bits(), 0x6000_00E1);
        assert_eq!(ColorFormat::RGBW.bits(), 0x8000_00E4);
        assert!(ColorFormat::GRBW.has_white());
        assert!(!ColorFormat::RGB.has_white());
    }
}
