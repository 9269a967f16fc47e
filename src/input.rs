//! Key bindings (arrows plus vim-style) and press-and-hold detection.

use crate::dispatch::UserAction;
use crate::theme::Preset;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Same key seen again within this window counts as held.
pub const HOLD_WINDOW: Duration = Duration::from_millis(75);

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Game(UserAction),
    Theme(Preset),
    Brighter,
    Dimmer,
    None,
}

/// Map a key event to a command. Releases map to `None`.
pub fn key_to_command(key: KeyEvent) -> KeyCommand {
    use UserAction as A;
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;
    if kind == KeyEventKind::Release {
        return KeyCommand::None;
    }
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return KeyCommand::Game(A::Terminate);
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return KeyCommand::None;
    }
    match code {
        KeyCode::Left | KeyCode::Char('h') => KeyCommand::Game(A::Left),
        KeyCode::Right | KeyCode::Char('l') => KeyCommand::Game(A::Right),
        KeyCode::Up => KeyCommand::Game(A::Up),
        KeyCode::Down | KeyCode::Char('j') => KeyCommand::Game(A::Down),
        KeyCode::Char(' ' | 'k') => KeyCommand::Game(A::Action),
        KeyCode::Enter => KeyCommand::Game(A::Start),
        KeyCode::Esc | KeyCode::Char('p' | 'P') => KeyCommand::Game(A::Pause),
        KeyCode::Char('q' | 'Q') => KeyCommand::Game(A::Terminate),
        KeyCode::Char('!') => KeyCommand::Theme(Preset::Default),
        KeyCode::Char('@') => KeyCommand::Theme(Preset::Dark),
        KeyCode::Char('#') => KeyCommand::Theme(Preset::Light),
        KeyCode::Char(']') => KeyCommand::Brighter,
        KeyCode::Char('[') => KeyCommand::Dimmer,
        _ => KeyCommand::None,
    }
}

/// Turns the raw poll stream into `(key, hold)` emissions.
///
/// Every poll is observed, including the ones where no key arrived: an empty
/// poll ends the streak. Within a streak only the first press and the first
/// hold are emitted.
#[derive(Debug, Default)]
pub struct HoldDetector {
    prev_key: Option<KeyCode>,
    last_poll: Option<Instant>,
    last_hold: bool,
}

impl HoldDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one poll result. Returns `Some(hold)` when the key should be dispatched.
    pub fn observe(&mut self, key: Option<KeyCode>, now: Instant) -> Option<bool> {
        let repeated = key.is_some() && key == self.prev_key;
        let hold = repeated
            && self
                .last_poll
                .is_some_and(|t| now.saturating_duration_since(t) <= HOLD_WINDOW);
        self.prev_key = key;
        self.last_poll = Some(now);

        key?;
        let emit = !hold || !self.last_hold;
        self.last_hold = hold;
        emit.then_some(hold)
    }
}
