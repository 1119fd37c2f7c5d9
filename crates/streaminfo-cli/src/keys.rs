//! Keyboard quit monitor.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use streaminfo_core::CancelToken;
use tracing::debug;

/// Spawn a thread that cancels the token when a quit key is pressed.
///
/// Quit keys: Esc, 'q'/'Q', and Ctrl+C as a backup to the signal handler.
pub fn spawn_quit_monitor(cancel: Arc<CancelToken>) -> JoinHandle<()> {
    thread::spawn(move || {
        while !cancel.is_cancelled() {
            // Short poll so the thread also exits when cancelled elsewhere.
            match event::poll(Duration::from_millis(200)) {
                Ok(true) => {
                    if let Ok(Event::Key(key)) = event::read()
                        && is_quit_key(&key)
                    {
                        debug!("Quit key pressed: {:?}", key.code);
                        cancel.cancel();
                        break;
                    }
                }
                Ok(false) => {}
                // No terminal attached; nothing to monitor.
                Err(_) => break,
            }
        }
    })
}

fn is_quit_key(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
