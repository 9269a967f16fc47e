//! App: terminal init, main loop, key handling and the per-frame tick.

use crate::dispatch::UserAction;
use crate::game::{Phase, Tetris};
use crate::highscores::HighScoreStore;
use crate::input::{HoldDetector, KeyCommand, key_to_command};
use crate::theme::Theme;
use crate::ui::{self, FadeState};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Upper bound on how long one frame waits for a key.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);
/// How long the farewell screen stays up unless a key dismisses it.
const FAREWELL_DURATION: Duration = Duration::from_millis(1500);

/// Host options taken from the command line.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Show the welcome screen before the board.
    pub motd: bool,
    /// Fade the board out on game over.
    pub animation: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            motd: true,
            animation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Playing,
    Farewell,
}

pub struct App<S: HighScoreStore> {
    config: GameConfig,
    theme: Theme,
    game: Tetris<S>,
    screen: Screen,
    hold: HoldDetector,
    fade: FadeState,
    farewell_since: Option<Instant>,
    done: bool,
}

impl<S: HighScoreStore> App<S> {
    pub fn new(config: GameConfig, theme: Theme, game: Tetris<S>) -> Self {
        let screen = if config.motd {
            Screen::Welcome
        } else {
            Screen::Playing
        };
        Self {
            config,
            theme,
            game,
            screen,
            hold: HoldDetector::new(),
            fade: FadeState::default(),
            farewell_since: None,
            done: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game(&self) -> &Tetris<S> {
        &self.game
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        log::info!("terminal ready, entering main loop");

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        log::info!("terminal restored");

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.done {
            let now = Instant::now();
            let info = if self.screen == Screen::Playing {
                self.game.update_current_state(now)
            } else {
                self.game.snapshot()
            };
            let phase = self.game.phase();
            if phase != Phase::GameOver {
                self.fade.reset();
            }

            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &info,
                    phase,
                    &self.theme,
                    &mut self.fade,
                    self.config.animation,
                    now,
                );
            })?;

            let key = if event::poll(POLL_TIMEOUT)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => Some(key),
                    _ => None,
                }
            } else {
                None
            };
            self.handle_poll(key, Instant::now());
        }
        Ok(())
    }

    /// Feed one poll result (at most one key) through hold detection and dispatch it.
    pub fn handle_poll(&mut self, key: Option<KeyEvent>, now: Instant) {
        let hold = self.hold.observe(key.map(|k| k.code), now);
        if let (Some(key), Some(hold)) = (key, hold) {
            self.handle_key(key, hold, now);
        }
        self.after_dispatch(now);
    }

    fn handle_key(&mut self, key: KeyEvent, hold: bool, now: Instant) {
        match self.screen {
            Screen::Welcome => match key_to_command(key) {
                KeyCommand::Game(UserAction::Terminate) => {
                    self.game.submit_action(UserAction::Terminate, hold);
                }
                _ if key.code == KeyCode::Enter => {
                    self.screen = Screen::Playing;
                    self.game.submit_action(UserAction::Start, hold);
                }
                _ => {}
            },
            Screen::Playing => match key_to_command(key) {
                KeyCommand::Game(action) => self.game.submit_action(action, hold),
                KeyCommand::Theme(preset) => {
                    log::debug!("theme preset {preset:?}");
                    self.theme.set_preset(preset);
                }
                KeyCommand::Brighter => {
                    self.theme.brighter();
                }
                KeyCommand::Dimmer => {
                    self.theme.dimmer();
                }
                KeyCommand::None => {}
            },
            Screen::Farewell => {
                if !hold {
                    log::debug!("farewell dismissed after {:?}", self.farewell_age(now));
                    self.done = true;
                }
            }
        }
    }

    fn after_dispatch(&mut self, now: Instant) {
        if self.game.phase() == Phase::Terminated && self.screen != Screen::Farewell {
            log::info!(
                "terminated with score {} (high score {})",
                self.game.score(),
                self.game.high_score()
            );
            self.screen = Screen::Farewell;
            self.farewell_since = Some(now);
        }
        if self.farewell_age(now) >= Some(FAREWELL_DURATION) {
            self.done = true;
        }
    }

    fn farewell_age(&self, now: Instant) -> Option<Duration> {
        self.farewell_since
            .map(|since| now.saturating_duration_since(since))
    }
}
