//! Application run by `rust_primary`.

pub mod board;

use core::fmt::Debug;

use derive_more::Display;
use drivers::motor::Motor;

#[cfg(feature = "button")]
use drivers::button::ButtonManager;
#[cfg(feature = "led-strip")]
use drivers::lights::Lights;
#[cfg(feature = "ntc")]
use drivers::thermal::{Condition, ThermalGuard};
#[cfg(feature = "button")]
use hal::button::ButtonEvent;
#[cfg(feature = "littlefs")]
use hal::fs::{FileSystem, MountConfig};
#[cfg(feature = "bootloader-ota")]
use hal::ota::Ota;

pub use board::{Board, Idle, Peripherals, MAX_BUTTONS};

use crate::capabilities::FeatureFlags;
use crate::config::Config;
use crate::event::{Event, EventQueue};

pub const THERMAL_PERIOD_MS: u64 = 1000;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Error {
    #[display(fmt = "board peripherals unavailable")]
    Board,
    #[display(fmt = "config unavailable")]
    Config,
    #[display(fmt = "filesystem failure")]
    Filesystem,
    #[display(fmt = "led strip failure")]
    Lights,
    #[display(fmt = "button registration failure")]
    Buttons,
}

impl Error {
    /// Status code returned across the entry point, always negative
    pub fn code(self) -> i32 {
        match self {
            Self::Board => -1,
            Self::Config => -2,
            Self::Filesystem => -3,
            Self::Lights => -4,
            Self::Buttons => -5,
        }
    }
}

fn fail<E: Debug>(error: Error) -> impl FnOnce(E) -> Error {
    move |e| {
        error!("{}: {:?}", error, e);
        error
    }
}

pub struct Application<B: Board> {
    board: B,
    events: &'static EventQueue,
}

impl<B: Board> Application<B> {
    pub fn new(board: B, events: &'static EventQueue) -> Self {
        Self { board, events }
    }

    #[cfg(feature = "littlefs")]
    fn load_config(fs: &mut B::FileSystem) -> Result<Config, Error> {
        fs.mount(&MountConfig::default()).map_err(fail(Error::Filesystem))?;
        if let Ok(usage) = fs.usage() {
            debug!("Filesystem {} of {} bytes used", usage.used, usage.total);
        }
        crate::config::load_or_create(fs).map_err(fail(Error::Config))
    }

    #[cfg(feature = "bootloader-ota")]
    fn confirm_image(ota: &mut B::Ota) {
        match ota.running_slot() {
            Ok(slot) => info!("Running from slot {} at {:#x}", slot.index, slot.address),
            Err(e) => warn!("Running slot unknown: {:?}", e),
        }
        if let Err(e) = ota.mark_running_valid() {
            warn!("Unable to mark image valid: {:?}", e);
        }
    }

    /// Runs until `Shutdown` arrives or the board halts while idle.
    pub fn run(&mut self) -> Result<(), Error> {
        let peripherals = self.board.take().map_err(fail(Error::Board))?;
        info!("Booting {} with {}", self.board.name(), FeatureFlags::BUILD);

        #[cfg(feature = "littlefs")]
        let mut fs = peripherals.fs;
        #[cfg(feature = "littlefs")]
        let config = Self::load_config(&mut fs)?;
        #[cfg(not(feature = "littlefs"))]
        let config = Config::default();
        log::set_max_level(config.log.level.into());

        #[cfg(feature = "led-strip")]
        let mut lights = Lights::new(peripherals.strip);
        #[cfg(feature = "led-strip")]
        lights.show_booting().map_err(fail(Error::Lights))?;

        #[cfg(feature = "bootloader-ota")]
        let mut ota = peripherals.ota;
        #[cfg(feature = "bootloader-ota")]
        Self::confirm_image(&mut ota);

        let (min_power, max_power) = (config.motor.min_power, config.motor.max_power);
        let mut motor = Motor::new(peripherals.motor, min_power, max_power);

        #[cfg(feature = "button")]
        let mut buttons: ButtonManager<B::Button, MAX_BUTTONS> = ButtonManager::new(self.events);
        #[cfg(feature = "button")]
        for button in peripherals.buttons {
            buttons.add(button).map_err(fail(Error::Buttons))?;
        }

        #[cfg(feature = "ntc")]
        let (limit, hysteresis) = (config.thermal.max_celsius as f32, config.thermal.hysteresis as f32);
        #[cfg(feature = "ntc")]
        let mut guard = ThermalGuard::new(peripherals.thermistor, limit, hysteresis);
        #[cfg(feature = "ntc")]
        let mut last_poll: Option<u64> = None;

        #[cfg(feature = "led-strip")]
        lights.show_speed(0).map_err(fail(Error::Lights))?;
        info!("Ready");

        loop {
            let event = match self.events.pop() {
                Some(event) => event,
                None => {
                    #[cfg(feature = "ntc")]
                    {
                        let now = self.board.millis();
                        if last_poll.map(|t| now.saturating_sub(t) >= THERMAL_PERIOD_MS).unwrap_or(true) {
                            last_poll = Some(now);
                            match guard.poll() {
                                Ok(Condition::Overheat) if motor.get() > 0 => {
                                    warn!("Overheat, stopping motor");
                                    motor.stop();
                                    #[cfg(feature = "led-strip")]
                                    lights.show_speed(0).map_err(fail(Error::Lights))?;
                                }
                                Ok(_) => (),
                                Err(e) => warn!("Temperature unavailable: {:?}", e),
                            }
                        }
                    }
                    match self.board.idle() {
                        Idle::Continue => continue,
                        Idle::Halt => break,
                    }
                }
            };
            debug!("Event {:?}", event);
            #[cfg(feature = "ntc")]
            let overheated = guard.condition() == Condition::Overheat;
            #[cfg(not(feature = "ntc"))]
            let overheated = false;
            let speed = match event {
                #[cfg(feature = "button")]
                Event::Button(ButtonEvent::SingleClick, id) => match buttons.position(id) {
                    Some(0) if overheated => {
                        warn!("Overheat, ignoring speed up");
                        continue;
                    }
                    Some(0) => motor.inc(),
                    Some(1) => motor.dec(),
                    Some(2) => motor.stop(),
                    _ => continue,
                },
                #[cfg(feature = "button")]
                Event::Button(_, _) => continue,
                Event::SetSpeed(speed) if overheated && speed > 0 => {
                    warn!("Overheat, ignoring speed {}", speed);
                    continue;
                }
                Event::SetSpeed(speed) => motor.set(speed as u32),
                Event::Shutdown => break,
            };
            #[cfg(feature = "led-strip")]
            lights.show_speed(speed).map_err(fail(Error::Lights))?;
            #[cfg(not(feature = "led-strip"))]
            let _ = speed;
        }

        info!("Shutting down");
        motor.release();
        #[cfg(feature = "led-strip")]
        lights.show_idle().map_err(fail(Error::Lights))?;
        #[cfg(feature = "littlefs")]
        fs.unmount().map_err(fail(Error::Filesystem))?;
        Ok(())
    }
}

/// Runs the application on `board`, returning the entry point status code.
pub fn main<B: Board>(board: B, events: &'static EventQueue) -> i32 {
    match Application::new(board, events).run() {
        Ok(()) => 0,
        Err(e) => {
            error!("Application failed: {}", e);
            e.code()
        }
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_error_codes() {
        use super::Error;

        let errors = [Error::Board, Error::Config, Error::Filesystem, Error::Lights, Error::Buttons];
        for (index, error) in errors.iter().enumerate() {
            assert_eq!(error.code(), -(index as i32) - 1);
        }
    }
}
