//! In-memory stand-ins for the board peripherals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use drivers::logfs::{OutOfRange, RamFlash};
use embedded_hal::PwmPin;
use esp_bridge::capabilities::button::{Button, ButtonEvent, Listener};
use esp_bridge::capabilities::led_strip::{Hsv, LedStrip, Rgb};
use esp_bridge::capabilities::ntc::Thermistor;
use esp_bridge::capabilities::ota::{Ota, OtaUpdate, Slot, SlotState};
use hal::flash::Flash;

pub const PIXELS: usize = 4;
pub const MAX_DUTY: u32 = 1000;
pub const SECTOR_WORDS: usize = 1024;
pub const ROOM_CELSIUS: f32 = 25.0;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Clone, Default)]
pub struct SimPwm {
    enabled: Arc<AtomicBool>,
    duties: Arc<Mutex<Vec<u32>>>,
}

impl SimPwm {
    /// Every duty ever set, oldest first
    pub fn duties(&self) -> Vec<u32> {
        lock(&self.duties).clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl PwmPin for SimPwm {
    type Duty = u32;

    fn disable(&mut self) {
        self.enabled.store(false, Ordering::Relaxed)
    }

    fn enable(&mut self) {
        self.enabled.store(true, Ordering::Relaxed)
    }

    fn get_duty(&self) -> u32 {
        lock(&self.duties).last().copied().unwrap_or(0)
    }

    fn get_max_duty(&self) -> u32 {
        MAX_DUTY
    }

    fn set_duty(&mut self, duty: u32) {
        trace!("PWM duty {}", duty);
        lock(&self.duties).push(duty.min(MAX_DUTY))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelOutOfRange(pub usize);

/// Four pixel strip recording each refreshed frame.
#[derive(Clone, Default)]
pub struct SimStrip {
    pixels: [Rgb; PIXELS],
    frames: Arc<Mutex<Vec<[Rgb; PIXELS]>>>,
}

impl SimStrip {
    pub fn frames(&self) -> Vec<[Rgb; PIXELS]> {
        lock(&self.frames).clone()
    }

    fn pixel(&mut self, index: usize) -> Result<&mut Rgb, PixelOutOfRange> {
        self.pixels.get_mut(index).ok_or(PixelOutOfRange(index))
    }
}

fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let hue = (hsv.hue % 360) as u32;
    let max = hsv.value as u32;
    let min = max * (255 - hsv.saturation as u32) / 255;
    let delta = (max - min) * (hue % 60) / 60;
    let (r, g, b) = match hue / 60 {
        0 => (max, min + delta, min),
        1 => (max - delta, max, min),
        2 => (min, max, min + delta),
        3 => (min, max - delta, max),
        4 => (min + delta, min, max),
        _ => (max, min, max - delta),
    };
    Rgb::new(r as u8, g as u8, b as u8)
}

impl LedStrip for SimStrip {
    type Error = PixelOutOfRange;

    fn max_leds(&self) -> usize {
        PIXELS
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), PixelOutOfRange> {
        *self.pixel(index)? = color;
        Ok(())
    }

    fn set_pixel_rgbw(&mut self, index: usize, color: Rgb, _white: u8) -> Result<(), PixelOutOfRange> {
        self.set_pixel(index, color)
    }

    fn set_pixel_hsv(&mut self, index: usize, color: Hsv) -> Result<(), PixelOutOfRange> {
        self.set_pixel(index, hsv_to_rgb(color))
    }

    fn clear(&mut self) -> Result<(), PixelOutOfRange> {
        self.pixels = [Rgb::BLACK; PIXELS];
        self.refresh()
    }

    fn refresh(&mut self) -> Result<(), PixelOutOfRange> {
        lock(&self.frames).push(self.pixels);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SimThermistor {
    celsius: Arc<Mutex<f32>>,
}

impl Default for SimThermistor {
    fn default() -> Self {
        Self::new(ROOM_CELSIUS)
    }
}

impl SimThermistor {
    pub fn new(celsius: f32) -> Self {
        Self { celsius: Arc::new(Mutex::new(celsius)) }
    }

    pub fn set(&self, celsius: f32) {
        *lock(&self.celsius) = celsius
    }
}

impl Thermistor for SimThermistor {
    type Error = ();

    fn temperature(&mut self) -> Result<f32, ()> {
        Ok(*lock(&self.celsius))
    }
}

type Subscriptions = Arc<Mutex<Vec<(ButtonEvent, &'static dyn Listener)>>>;

#[derive(Clone)]
pub struct SimButton {
    id: u32,
    pressed: Arc<AtomicBool>,
    subscriptions: Subscriptions,
}

impl SimButton {
    pub fn new(id: u32) -> Self {
        Self { id, pressed: Arc::new(AtomicBool::new(false)), subscriptions: Subscriptions::default() }
    }

    /// Press and release, notifying subscribers of `event`
    pub fn fire(&self, event: ButtonEvent) {
        self.pressed.store(true, Ordering::Relaxed);
        let subscriptions = lock(&self.subscriptions).clone();
        self.pressed.store(false, Ordering::Relaxed);
        for (_, listener) in subscriptions.iter().filter(|(e, _)| *e == event) {
            listener.on_event(self.id, event);
        }
    }
}

impl Button for SimButton {
    type Error = ();

    fn id(&self) -> u32 {
        self.id
    }

    fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Relaxed)
    }

    fn subscribe(&mut self, event: ButtonEvent, listener: &'static dyn Listener) -> Result<(), ()> {
        lock(&self.subscriptions).push((event, listener));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct OtaState {
    pub running: u8,
    pub boot: u8,
    pub states: [Option<SlotState>; 2],
    pub images: [Vec<u8>; 2],
}

/// Two slot flash layout, `ota_0` running.
#[derive(Clone, Default)]
pub struct SimOta(Arc<Mutex<OtaState>>);

const SLOT_SIZE: u32 = 0x180000;

fn slot(index: u8) -> Slot {
    Slot { index, address: 0x10000 + index as u32 * SLOT_SIZE, size: SLOT_SIZE }
}

impl SimOta {
    pub fn state(&self) -> MutexGuard<OtaState> {
        lock(&self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OtaError {
    Busy,
    UnknownSlot,
    TooLarge,
}

impl Ota for SimOta {
    type Error = OtaError;
    type Update = SimOtaUpdate;

    fn running_slot(&self) -> Result<Slot, OtaError> {
        Ok(slot(self.state().running))
    }

    fn next_slot(&self) -> Result<Slot, OtaError> {
        Ok(slot(self.state().running ^ 1))
    }

    fn slot_state(&self, slot: &Slot) -> Result<SlotState, OtaError> {
        let state = self.state();
        let index = slot.index as usize;
        let states = state.states.get(index).ok_or(OtaError::UnknownSlot)?;
        Ok(states.unwrap_or(SlotState::Undefined))
    }

    fn begin(&mut self, _image_size: Option<usize>) -> Result<SimOtaUpdate, OtaError> {
        let mut state = self.state();
        let target = state.running ^ 1;
        if state.states[target as usize] == Some(SlotState::New) {
            return Err(OtaError::Busy);
        }
        state.states[target as usize] = Some(SlotState::New);
        state.images[target as usize].clear();
        Ok(SimOtaUpdate { ota: self.clone(), target })
    }

    fn mark_running_valid(&mut self) -> Result<(), OtaError> {
        let mut state = self.state();
        let running = state.running as usize;
        state.states[running] = Some(SlotState::Valid);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), OtaError> {
        let mut state = self.state();
        let running = state.running as usize;
        state.states[running] = Some(SlotState::Invalid);
        state.boot = state.running ^ 1;
        Ok(())
    }
}

pub struct SimOtaUpdate {
    ota: SimOta,
    target: u8,
}

impl OtaUpdate for SimOtaUpdate {
    type Error = OtaError;

    fn write(&mut self, chunk: &[u8]) -> Result<(), OtaError> {
        let mut state = self.ota.state();
        let image = &mut state.images[self.target as usize];
        if image.len() + chunk.len() > SLOT_SIZE as usize {
            return Err(OtaError::TooLarge);
        }
        image.extend_from_slice(chunk);
        Ok(())
    }

    fn complete(self) -> Result<(), OtaError> {
        let mut state = self.ota.state();
        state.states[self.target as usize] = Some(SlotState::PendingVerify);
        state.boot = self.target;
        Ok(())
    }

    fn abort(self) -> Result<(), OtaError> {
        let mut state = self.ota.state();
        state.states[self.target as usize] = Some(SlotState::Aborted);
        Ok(())
    }
}

/// RAM flash shared between the board and whoever inspects it afterwards.
#[derive(Clone)]
pub struct SharedFlash(Arc<Mutex<RamFlash<SECTOR_WORDS>>>);

impl Default for SharedFlash {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(RamFlash::new())))
    }
}

impl Flash<u32> for SharedFlash {
    type Error = OutOfRange;

    fn read(&self, address: usize, words: &mut [u32]) -> Result<(), OutOfRange> {
        lock(&self.0).read(address, words)
    }

    fn erase(&mut self, address: usize) -> Result<(), OutOfRange> {
        lock(&self.0).erase(address)
    }

    fn program(&mut self, address: usize, words: &[u32]) -> Result<(), OutOfRange> {
        lock(&self.0).program(address, words)
    }
}
