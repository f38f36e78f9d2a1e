use core::fmt;

use hal::button::{Button, ButtonEvent, Listener};
use heapless::Vec;

/// Events forwarded for every managed button.
pub const EVENTS: [ButtonEvent; 2] = [ButtonEvent::SingleClick, ButtonEvent::DoubleClick];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    Full,
    Driver(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Full => write!(f, "too many buttons"),
            Self::Driver(e) => write!(f, "button driver error {:?}", e),
        }
    }
}

/// Owns the buttons and routes their clicks into one listener.
pub struct ButtonManager<B, const N: usize> {
    listener: &'static dyn Listener,
    buttons: Vec<B, N>,
}

impl<B: Button, const N: usize> ButtonManager<B, N> {
    pub fn new(listener: &'static dyn Listener) -> Self {
        Self { listener, buttons: Vec::new() }
    }

    pub fn add(&mut self, mut button: B) -> Result<(), Error<B::Error>> {
        if self.buttons.is_full() {
            return Err(Error::Full);
        }
        for event in EVENTS.iter() {
            button.subscribe(*event, self.listener).map_err(Error::Driver)?;
        }
        debug!("Button {} registered", button.id());
        self.buttons.push(button).ok();
        Ok(())
    }

    /// Registration order of the button reporting `id`
    pub fn position(&self, id: u32) -> Option<usize> {
        self.buttons.iter().position(|b| b.id() == id)
    }

    pub fn pressed(&self) -> impl Iterator<Item = u32> + '_ {
        self.buttons.iter().filter(|b| b.is_pressed()).map(|b| b.id())
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
