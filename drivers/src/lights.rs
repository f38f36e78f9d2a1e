use hal::led_strip::{LedStrip, Rgb};

pub const PIXELS: usize = 4;

const IDLE: Rgb = Rgb::new(100, 100, 100);
const BOOTING: Rgb = Rgb::new(0, 0, 100);
const BLACK: Rgb = Rgb::BLACK;

fn band(level: u32) -> Rgb {
    match level {
        0..=3 => Rgb::new(0, 17, 199),
        4..=7 => Rgb::new(0, 176, 199),
        8..=11 => Rgb::new(0, 199, 36),
        12..=15 => Rgb::new(199, 116, 0),
        _ => Rgb::new(199, 0, 20),
    }
}

/// Four pixel status bar, the last pixel sits at the bottom.
pub struct Lights<S> {
    strip: S,
}

impl<S: LedStrip> Lights<S> {
    pub fn new(strip: S) -> Self {
        Self { strip }
    }

    pub fn set_all(&mut self, pixels: [Rgb; PIXELS]) -> Result<(), S::Error> {
        for (index, color) in pixels.iter().enumerate() {
            self.strip.set_pixel(index, *color)?;
        }
        self.strip.refresh()
    }

    pub fn show_booting(&mut self) -> Result<(), S::Error> {
        self.set_all([BOOTING, BLACK, BLACK, BLACK])
    }

    pub fn show_idle(&mut self) -> Result<(), S::Error> {
        self.set_all([BLACK, BLACK, BLACK, IDLE])
    }

    /// Colour encodes the band of four levels, the bar length the position inside it.
    pub fn show_speed(&mut self, level: u32) -> Result<(), S::Error> {
        if level == 0 {
            return self.show_idle();
        }
        let lit = band(level);
        let count = if level < 20 { level % 4 } else { 4 };
        let pixels = match count {
            0 => [BLACK, BLACK, BLACK, lit],
            1 => [BLACK, BLACK, lit, lit],
            2 => [BLACK, lit, lit, lit],
            _ => [lit, lit, lit, lit],
        };
        self.set_all(pixels)
    }

    pub fn off(&mut self) -> Result<(), S::Error> {
        self.strip.clear()
    }

    pub fn into_inner(self) -> S {
        self.strip
    }
}

#[cfg(test)]
mod test {
    use std::vec::Vec;

    use hal::led_strip::{Hsv, LedStrip, Rgb};

    #[derive(Default)]
    struct Strip {
        pixels: [Rgb; 4],
        frames: Vec<[Rgb; 4]>,
    }

    impl LedStrip for Strip {
        type Error = ();

        fn max_leds(&self) -> usize {
            4
        }

        fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), ()> {
            *self.pixels.get_mut(index).ok_or(())? = color;
            Ok(())
        }

        fn set_pixel_rgbw(&mut self, index: usize, color: Rgb, _: u8) -> Result<(), ()> {
            self.set_pixel(index, color)
        }

        fn set_pixel_hsv(&mut self, _: usize, _: Hsv) -> Result<(), ()> {
            Err(())
        }

        fn clear(&mut self) -> Result<(), ()> {
            self.pixels = [Rgb::BLACK; 4];
            self.frames.push(self.pixels);
            Ok(())
        }

        fn refresh(&mut self) -> Result<(), ()> {
            self.frames.push(self.pixels);
            Ok(())
        }
    }

    #[test]
    fn test_show_speed() {
        use pretty_assertions::assert_eq;

        use super::{Lights, BLACK, IDLE};

        let mut lights = Lights::new(Strip::default());
        lights.show_speed(0).unwrap();
        lights.show_speed(1).unwrap();
        lights.show_speed(6).unwrap();
        lights.show_speed(12).unwrap();
        lights.show_speed(20).unwrap();
        let blue = Rgb::new(0, 17, 199);
        let cyan = Rgb::new(0, 176, 199);
        let orange = Rgb::new(199, 116, 0);
        let red = Rgb::new(199, 0, 20);
        let expected = [
            [BLACK, BLACK, BLACK, IDLE],
            [BLACK, BLACK, blue, blue],
            [BLACK, cyan, cyan, cyan],
            [BLACK, BLACK, BLACK, orange],
            [red, red, red, red],
        ];
        assert_eq!(lights.into_inner().frames, expected.to_vec());
    }

    #[test]
    fn test_off() {
        use super::Lights;

        let mut lights = Lights::new(Strip::default());
        lights.show_booting().unwrap();
        lights.off().unwrap();
        let strip = lights.into_inner();
        assert_eq!(strip.frames.len(), 2);
        assert_eq!(strip.pixels, [Rgb::BLACK; 4]);
    }
}
