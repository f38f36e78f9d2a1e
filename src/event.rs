use heapless::mpmc::Q64;

#[cfg(feature = "button")]
use hal::button::{ButtonEvent, Listener};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Button event and the id of the reporting button
    #[cfg(feature = "button")]
    Button(ButtonEvent, u32),
    SetSpeed(u8),
    Shutdown,
}

/// Lock-free queue between interrupt context callbacks and the main loop.
pub struct EventQueue {
    queue: Q64<Event>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self { queue: Q64::new() }
    }

    /// Returns false and drops the event if the queue is full
    pub fn push(&self, event: Event) -> bool {
        if self.queue.enqueue(event).is_err() {
            warn!("Event queue full, dropping {:?}", event);
            return false;
        }
        true
    }

    pub fn pop(&self) -> Option<Event> {
        self.queue.dequeue()
    }

    pub fn clear(&self) {
        while self.queue.dequeue().is_some() {}
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "button")]
impl Listener for EventQueue {
    fn on_event(&self, id: u32, event: ButtonEvent) {
        self.push(Event::Button(event, id));
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_queue_order() {
        use super::{Event, EventQueue};

        let queue = EventQueue::new();
        assert!(queue.push(Event::SetSpeed(3)));
        assert!(queue.push(Event::Shutdown));
        assert_eq!(queue.pop(), Some(Event::SetSpeed(3)));
        assert_eq!(queue.pop(), Some(Event::Shutdown));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_full() {
        use super::{Event, EventQueue};

        let queue = EventQueue::new();
        for speed in 0..64 {
            assert!(queue.push(Event::SetSpeed(speed)));
        }
        assert!(!queue.push(Event::Shutdown));
        queue.clear();
        assert_eq!(queue.pop(), None);
    }

    #[cfg(feature = "button")]
    #[test]
    fn test_button_listener() {
        use hal::button::{ButtonEvent, Listener};

        use super::{Event, EventQueue};

        let queue = EventQueue::new();
        queue.on_event(7, ButtonEvent::SingleClick);
        assert_eq!(queue.pop(), Some(Event::Button(ButtonEvent::SingleClick, 7)));
    }
}
