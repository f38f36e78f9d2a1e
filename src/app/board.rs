use core::fmt::Debug;

use embedded_hal::PwmPin;

#[cfg(feature = "button")]
use hal::button::Button;
#[cfg(feature = "littlefs")]
use hal::fs::FileSystem;
#[cfg(feature = "led-strip")]
use hal::led_strip::LedStrip;
#[cfg(feature = "ntc")]
use hal::ntc::Thermistor;
#[cfg(feature = "bootloader-ota")]
use hal::ota::Ota;

pub const MAX_BUTTONS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Idle {
    Continue,
    Halt,
}

/// Peripheral handles of the enabled capabilities, handed out once.
pub struct Peripherals<B: Board> {
    pub motor: B::Motor,
    #[cfg(feature = "led-strip")]
    pub strip: B::Strip,
    /// In order: speed up, slow down, stop
    #[cfg(feature = "button")]
    pub buttons: heapless::Vec<B::Button, MAX_BUTTONS>,
    #[cfg(feature = "ntc")]
    pub thermistor: B::Thermistor,
    #[cfg(feature = "littlefs")]
    pub fs: B::FileSystem,
    #[cfg(feature = "bootloader-ota")]
    pub ota: B::Ota,
}

pub trait Board: Sized {
    type Error: Debug;
    type Motor: PwmPin<Duty = u32>;
    #[cfg(feature = "led-strip")]
    type Strip: LedStrip;
    #[cfg(feature = "button")]
    type Button: Button;
    #[cfg(feature = "ntc")]
    type Thermistor: Thermistor;
    #[cfg(feature = "littlefs")]
    type FileSystem: FileSystem;
    #[cfg(feature = "bootloader-ota")]
    type Ota: Ota;

    fn name(&self) -> &'static str;
    fn take(&mut self) -> Result<Peripherals<Self>, Self::Error>;
    /// Milliseconds since boot
    fn millis(&self) -> u64;
    /// Called whenever the event queue is drained
    fn idle(&mut self) -> Idle;
}
