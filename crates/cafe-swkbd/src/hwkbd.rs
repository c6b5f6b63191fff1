//! USB keyboard event pump.
//!
//! The driver reports key transitions from its own thread; they are parked
//! in a small locked buffer and turned into application events on the main
//! loop. While the software keyboard is on screen physical keys are
//! dropped.

use std::sync::{Arc, Mutex, PoisonError};

use cafe_platform::{KeyboardService, SwkbdPlatform};
use cafe_types::error::Result;
use cafe_types::event::{CafeEvent, EventSink};
use cafe_types::input::KeyEvent;

use crate::LOG_TARGET;
use crate::codec;
use crate::session::Session;

/// Events buffered between two pumps. Later events are dropped.
pub const KEY_BUFFER_CAPACITY: usize = 10;

type KeyBuffer = Arc<Mutex<Vec<KeyEvent>>>;

/// Receives USB keyboard events and forwards them once per frame.
#[derive(Debug)]
pub struct KeyboardPump {
    buffer: KeyBuffer,
}

impl KeyboardPump {
    /// Register with the keyboard driver.
    pub fn attach<K: KeyboardService + ?Sized>(driver: &mut K) -> Result<Self> {
        let buffer: KeyBuffer = Arc::new(Mutex::new(Vec::with_capacity(KEY_BUFFER_CAPACITY)));
        let sink = Arc::clone(&buffer);
        driver.kbd_setup(Box::new(move |event| push(&sink, event)))?;
        log::debug!(target: LOG_TARGET, "USB keyboard attached");
        Ok(Self { buffer })
    }

    /// Unregister from the keyboard driver.
    pub fn detach<K: KeyboardService + ?Sized>(self, driver: &mut K) -> Result<()> {
        driver.kbd_teardown()
    }

    /// Events waiting for the next pump.
    pub fn pending(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Post buffered key events, plus text for printable key presses,
    /// unless the software keyboard is visible. The buffer is emptied
    /// either way.
    pub fn pump<P, E>(&self, session: &Session<P>, events: &mut E)
    where
        P: SwkbdPlatform,
        E: EventSink + ?Sized,
    {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if !session.is_visible() {
            for key in buffer.iter() {
                events.post(CafeEvent::Key {
                    pressed: key.pressed,
                    scancode: key.hid_code,
                });
                if key.pressed {
                    if let Some(c) = codec::key_symbol_char(key.symbol) {
                        events.post(CafeEvent::KeyboardText(c.to_string()));
                    }
                }
            }
        }
        buffer.clear();
    }
}

fn push(buffer: &Mutex<Vec<KeyEvent>>, event: KeyEvent) {
    let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
    if buffer.len() < KEY_BUFFER_CAPACITY {
        buffer.push(event);
    }
}

#[cfg(test)]
mod tests {
    use cafe_platform::SimPlatform;
    use cafe_types::event::EventQueue;
    use cafe_types::window::{Window, WindowFlags};

    use super::*;

    fn key(hid_code: u32, symbol: u16, pressed: bool) -> KeyEvent {
        KeyEvent {
            channel: 0,
            pressed,
            hid_code,
            symbol,
        }
    }

    fn attached() -> (Session<SimPlatform>, KeyboardPump) {
        let mut sim = SimPlatform::new();
        sim.work_memory_size = 64;
        let mut session = Session::new(sim);
        let pump = KeyboardPump::attach(session.platform_mut()).unwrap();
        (session, pump)
    }

    #[test]
    fn key_press_posts_key_and_text() {
        let (session, pump) = attached();
        let mut events = EventQueue::new();
        session.platform().press_key(key(4, u16::from(b'a'), true));
        session.platform().press_key(key(4, u16::from(b'a'), false));
        pump.pump(&session, &mut events);
        assert_eq!(
            events.drain(),
            vec![
                CafeEvent::Key {
                    pressed: true,
                    scancode: 4
                },
                CafeEvent::KeyboardText("a".into()),
                CafeEvent::Key {
                    pressed: false,
                    scancode: 4
                },
            ]
        );
        assert_eq!(pump.pending(), 0);
    }

    #[test]
    fn non_printing_keys_post_no_text() {
        let (session, pump) = attached();
        let mut events = EventQueue::new();
        session.platform().press_key(key(0x28, 0xF00D, true));
        session.platform().press_key(key(0xE1, 0xFFFF, true));
        pump.pump(&session, &mut events);
        assert_eq!(events.len(), 2);
        assert!(
            events
                .drain()
                .iter()
                .all(|e| matches!(e, CafeEvent::Key { .. }))
        );
    }

    #[test]
    fn buffer_is_bounded() {
        let (session, pump) = attached();
        for _ in 0..KEY_BUFFER_CAPACITY + 5 {
            session.platform().press_key(key(5, 0xFFFF, false));
        }
        assert_eq!(pump.pending(), KEY_BUFFER_CAPACITY);
    }

    #[test]
    fn keys_dropped_while_keyboard_shown() {
        let (mut session, pump) = attached();
        let mut events = EventQueue::new();
        session.show(&Window::new(1, WindowFlags::empty()));
        session.platform().press_key(key(4, u16::from(b'a'), true));
        pump.pump(&session, &mut events);
        assert!(events.is_empty());
        assert_eq!(pump.pending(), 0);

        session.hide();
        session.platform().press_key(key(5, u16::from(b'b'), true));
        pump.pump(&session, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn detach_unregisters() {
        let (mut session, pump) = attached();
        pump.detach(session.platform_mut()).unwrap();
        assert!(!session.platform().press_key(key(4, 0x61, true)));
    }

    #[test]
    fn events_from_another_thread() {
        let buffer: KeyBuffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        std::thread::spawn(move || push(&sink, key(7, 0x64, true)))
            .join()
            .unwrap();
        assert_eq!(buffer.lock().unwrap().len(), 1);
    }
}
