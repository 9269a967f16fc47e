//! Game engine: phase machine, falling brick, scoring, levels, high score.

use crate::bricks::{BRICK_SIZE, Brick, BrickCatalog, Position};
use crate::dispatch::{self, Command, UserAction};
use crate::field::{FIELD_HEIGHT, FIELD_WIDTH, Field, Row};
use crate::highscores::{HighScoreFile, HighScoreStore};
use crate::rules;
use crate::timer::GameTimer;
use std::time::Instant;

/// Where a freshly spawned brick is anchored.
pub const SPAWN_POSITION: Position = Position {
    x: (FIELD_WIDTH / 2) as i32,
    y: 0,
};

/// Next-brick preview, colour tags or 0.
pub type Preview = [[u8; BRICK_SIZE]; BRICK_SIZE];

/// Game phases.
///
/// `Spawn` only exists for the duration of a spawn; `Attach` lasts until the
/// next tick erases rows and spawns again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Ready,
    Spawn,
    Moving,
    Paused,
    Attach,
    GameOver,
    Terminated,
}

/// Pause flag as exposed to renderers: running, paused, or game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    Running,
    Paused,
    GameOver,
}

impl PauseState {
    /// Legacy encoding: 0 running, 1 paused, -1 game over.
    pub fn as_flag(self) -> i8 {
        match self {
            Self::Running => 0,
            Self::Paused => 1,
            Self::GameOver => -1,
        }
    }
}

/// Read-only snapshot handed to the renderer every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub field: [Row; FIELD_HEIGHT],
    pub next: Preview,
    pub score: u32,
    pub high_score: u32,
    pub level: u8,
    pub speed: u32,
    pub pause: PauseState,
}

impl GameInfo {
    /// Pause tri-state in its legacy integer form (0 / 1 / -1).
    pub fn pause_flag(&self) -> i8 {
        self.pause.as_flag()
    }
}

/// One running game. Owns the field, the falling and queued bricks, the timer
/// and the catalog it draws from.
#[derive(Debug)]
pub struct Tetris<S = HighScoreFile> {
    phase: Phase,
    paused: bool,
    field: Field,
    next_preview: Preview,
    score: u32,
    high_score: u32,
    level: u8,
    speed: u32,
    current: Option<Brick>,
    next: Option<Brick>,
    timer: GameTimer,
    catalog: BrickCatalog,
    store: S,
    high_score_loaded: bool,
}

impl<S: HighScoreStore> Tetris<S> {
    pub fn new(catalog: BrickCatalog, store: S) -> Self {
        Self {
            phase: Phase::Ready,
            paused: false,
            field: Field::new(),
            next_preview: [[0; BRICK_SIZE]; BRICK_SIZE],
            score: 0,
            high_score: 0,
            level: rules::MIN_LEVEL,
            speed: 0,
            current: None,
            next: None,
            timer: GameTimer::default(),
            catalog,
            store,
            high_score_loaded: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Direct field access, for setting up boards.
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn current(&self) -> Option<&Brick> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Brick> {
        self.next.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn catalog(&self) -> &BrickCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the custom brick extension. Only allowed before the first spawn.
    pub fn enable_custom_bricks(&mut self) -> bool {
        if self.phase != Phase::Ready || self.current.is_some() {
            return false;
        }
        let added = self.catalog.populate_custom();
        if added {
            log::info!("custom bricks enabled ({} templates)", self.catalog.len());
        }
        added
    }

    pub fn pause_state(&self) -> PauseState {
        if self.phase == Phase::GameOver {
            PauseState::GameOver
        } else if self.paused {
            PauseState::Paused
        } else {
            PauseState::Running
        }
    }

    pub fn snapshot(&self) -> GameInfo {
        GameInfo {
            field: *self.field.rows(),
            next: self.next_preview,
            score: self.score,
            high_score: self.high_score,
            level: self.level,
            speed: self.speed,
            pause: self.pause_state(),
        }
    }

    /// Route a user action through the phase table and apply it.
    pub fn submit_action(&mut self, action: UserAction, hold: bool) {
        let Some(command) = dispatch::route(self.phase, action, hold) else {
            log::trace!("{action:?} ignored in {:?}", self.phase);
            return;
        };
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Terminate => self.terminate(),
            Command::MoveLeft => self.shift(-1),
            Command::MoveRight => self.shift(1),
            Command::Up => {}
            Command::Drop { hold } => self.drop(hold),
            Command::Rotate => self.rotate(),
        }
    }

    /// One host frame: tick, then return the snapshot.
    pub fn update_current_state(&mut self, now: Instant) -> GameInfo {
        self.advance_tick_at(now);
        self.snapshot()
    }

    pub fn advance_tick(&mut self) -> bool {
        self.advance_tick_at(Instant::now())
    }

    /// Recompute level and speed, then either apply gravity or resolve an attach.
    /// Returns whether the drop timer fired.
    pub fn advance_tick_at(&mut self, now: Instant) -> bool {
        self.level = rules::level_for_score(self.score);
        self.timer.set_timeout(rules::drop_timeout(self.level));
        self.speed = rules::speed_ms(self.level);

        let fired = self.timer.tick_at(now);
        if fired && self.phase == Phase::Moving {
            self.drop(false);
        } else if self.phase == Phase::Attach {
            self.settle();
        }
        fired
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn start(&mut self) {
        if !self.high_score_loaded {
            self.high_score = self.store.load();
            self.high_score_loaded = true;
            log::info!("loaded high score {}", self.high_score);
        }
        if self.phase == Phase::GameOver {
            self.field.clear();
            self.level = rules::MIN_LEVEL;
            self.score = 0;
            self.paused = false;
            log::info!("restarting");
        }
        self.spawn();
    }

    fn toggle_pause(&mut self) {
        if self.paused {
            self.paused = false;
            self.set_phase(Phase::Moving);
        } else {
            self.paused = true;
            self.set_phase(Phase::Paused);
        }
    }

    fn terminate(&mut self) {
        // never loaded means never changed; don't clobber the stored record with 0
        if self.high_score_loaded {
            self.store.save(self.high_score);
        }
        self.set_phase(Phase::Terminated);
    }

    /// Run `step` on the falling brick with its cells lifted out of the field,
    /// undo it with `revert` if it collides, and paint the brick back in.
    /// Returns whether a collision was detected.
    fn try_move(
        &mut self,
        step: impl FnOnce(&mut Brick),
        revert: impl FnOnce(&mut Brick),
    ) -> bool {
        let Some(brick) = self.current.as_mut() else {
            return false;
        };
        self.field.remove(brick);
        step(brick);
        let collided = self.field.collides(brick);
        if collided {
            revert(brick);
        }
        self.field.place(brick);
        collided
    }

    fn shift(&mut self, dx: i32) {
        self.try_move(|b| b.pos.x += dx, |b| b.pos.x -= dx);
    }

    fn rotate(&mut self) {
        self.try_move(Brick::next_state, Brick::prev_state);
    }

    fn drop(&mut self, hold: bool) {
        let Some(brick) = self.current.as_mut() else {
            return;
        };
        let collided = if hold {
            self.field.remove(brick);
            while !self.field.collides(brick) {
                brick.pos.y += 1;
            }
            brick.pos.y -= 1;
            self.field.place(brick);
            true
        } else {
            self.try_move(|b| b.pos.y += 1, |b| b.pos.y -= 1)
        };
        if collided {
            self.current = None;
            self.set_phase(Phase::Attach);
        }
    }

    fn settle(&mut self) {
        let erased = self.field.erase_full_rows();
        self.score += rules::reward(erased);
        if erased > 0 {
            log::debug!("erased {erased} rows, score {}", self.score);
        }
        if self.score > self.high_score {
            self.high_score = self.score;
            self.store.save(self.high_score);
        }
        self.spawn();
    }

    fn spawn(&mut self) {
        self.set_phase(Phase::Spawn);
        if self.next.is_none() {
            self.next = self.catalog.get_random();
        }
        let current = self.next.take();
        self.next = self.catalog.get_random();
        self.next_preview = self
            .next
            .as_ref()
            .map(Brick::preview)
            .unwrap_or([[0; BRICK_SIZE]; BRICK_SIZE]);

        let Some(mut brick) = current else {
            log::warn!("brick catalog is empty, nothing to spawn");
            self.game_over();
            return;
        };
        brick.pos = SPAWN_POSITION;
        if self.field.collides(&brick) {
            log::info!("no room to spawn {}, game over at {}", brick.name(), self.score);
            self.current = None;
            self.game_over();
        } else {
            self.field.place(&brick);
            self.current = Some(brick);
            self.set_phase(Phase::Moving);
        }
    }

    fn game_over(&mut self) {
        self.set_phase(Phase::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bricks::STANDARD_BRICKS;
    use crate::highscores::MemoryHighScore;
    use std::time::Duration;

    fn engine() -> Tetris<MemoryHighScore> {
        Tetris::new(BrickCatalog::standard(Some(11)), MemoryHighScore::default())
    }

    /// Engine whose catalog only knows one template.
    fn engine_with(index: usize) -> Tetris<MemoryHighScore> {
        let mut catalog = BrickCatalog::seeded(1);
        catalog.register(STANDARD_BRICKS[index]);
        Tetris::new(catalog, MemoryHighScore::default())
    }

    fn painted(t: &Tetris<MemoryHighScore>) -> usize {
        t.field().rows().iter().flatten().filter(|c| **c != 0).count()
    }

    #[test]
    fn starts_ready_with_empty_board() {
        let t = engine();
        assert_eq!(t.phase(), Phase::Ready);
        assert!(t.field().is_empty());
        assert_eq!(t.snapshot().pause_flag(), 0);
        assert_eq!(t.level(), 1);
    }

    #[test]
    fn start_spawns_current_and_next() {
        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::Moving);
        assert!(t.current().is_some());
        assert!(t.next().is_some());
        assert_eq!(t.current().unwrap().pos, SPAWN_POSITION);
        assert_eq!(painted(&t), 4);
        assert_eq!(t.snapshot().next, t.next().unwrap().preview());
    }

    #[test]
    fn movement_ignored_before_start() {
        let mut t = engine();
        t.submit_action(UserAction::Left, false);
        t.submit_action(UserAction::Down, true);
        assert_eq!(t.phase(), Phase::Ready);
        assert!(t.field().is_empty());
    }

    #[test]
    fn left_and_right_move_one_column() {
        let mut t = engine_with(1);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Left, false);
        assert_eq!(t.current().unwrap().pos.x, 4);
        t.submit_action(UserAction::Right, false);
        t.submit_action(UserAction::Right, false);
        assert_eq!(t.current().unwrap().pos.x, 6);
        assert_eq!(painted(&t), 4);
    }

    #[test]
    fn blocked_shift_leaves_brick_untouched() {
        let mut t = engine_with(1);
        t.submit_action(UserAction::Start, false);
        for _ in 0..10 {
            t.submit_action(UserAction::Left, false);
        }
        let before = *t.current().unwrap();
        let field_before = t.field().clone();
        t.submit_action(UserAction::Left, false);
        assert_eq!(*t.current().unwrap(), before);
        assert_eq!(*t.field(), field_before);
        // O spans columns x-1..=x
        assert_eq!(before.pos.x, 1);
    }

    #[test]
    fn blocked_rotation_reverts_state() {
        let mut t = engine_with(0);
        t.submit_action(UserAction::Start, false);
        // vertical I at spawn would poke above the top row
        let before = *t.current().unwrap();
        t.submit_action(UserAction::Action, false);
        assert_eq!(*t.current().unwrap(), before);
        t.submit_action(UserAction::Down, false);
        t.submit_action(UserAction::Action, false);
        assert_eq!(t.current().unwrap().state, 1);
        assert_eq!(painted(&t), 4);
    }

    #[test]
    fn up_is_a_noop() {
        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        let before = t.snapshot();
        t.submit_action(UserAction::Up, true);
        assert_eq!(t.snapshot(), before);
    }

    #[test]
    fn soft_drop_moves_one_row() {
        let mut t = engine_with(1);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Down, false);
        assert_eq!(t.current().unwrap().pos.y, 1);
        assert_eq!(t.phase(), Phase::Moving);
    }

    #[test]
    fn soft_drop_on_floor_attaches() {
        let mut t = engine_with(1);
        t.submit_action(UserAction::Start, false);
        for _ in 0..18 {
            t.submit_action(UserAction::Down, false);
        }
        assert_eq!(t.phase(), Phase::Moving);
        t.submit_action(UserAction::Down, false);
        assert_eq!(t.phase(), Phase::Attach);
        assert!(t.current().is_none());
        assert_eq!(t.field().get(4, 19), Some(4));
        assert_eq!(t.field().get(5, 18), Some(4));
    }

    #[test]
    fn hard_drop_rests_on_floor() {
        let mut t = engine_with(1);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Down, true);
        assert_eq!(t.phase(), Phase::Attach);
        assert!(t.current().is_none());
        assert_eq!(t.field().get(4, 19), Some(4));
        assert_eq!(t.field().get(4, 18), Some(4));
        assert_eq!(t.field().get(4, 17), Some(0));
    }

    #[test]
    fn hard_drop_rests_on_obstruction() {
        let mut t = engine_with(1);
        t.field_mut().set(4, 12, 2);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Down, true);
        assert_eq!(t.field().get(4, 11), Some(4));
        assert_eq!(t.field().get(4, 10), Some(4));
        assert_eq!(t.field().get(4, 9), Some(0));
    }

    #[test]
    fn attach_tick_clears_rows_and_scores() {
        let mut t = engine_with(1);
        let mut row = [3u8; FIELD_WIDTH];
        row[4] = 0;
        row[5] = 0;
        t.field_mut().set_row(19, row);
        t.field_mut().set_row(18, row);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Down, true);
        assert_eq!(t.phase(), Phase::Attach);
        t.advance_tick_at(Instant::now());
        assert_eq!(t.score(), 300);
        assert_eq!(t.high_score(), 300);
        assert_eq!(t.store().value, 300);
        assert_eq!(t.phase(), Phase::Moving);
        // only the new brick remains
        assert_eq!(painted(&t), 4);
    }

    #[test]
    fn attach_without_rows_scores_nothing() {
        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Down, true);
        t.advance_tick_at(Instant::now());
        assert_eq!(t.score(), 0);
        assert_eq!(t.store().saves, 0);
        assert_eq!(t.phase(), Phase::Moving);
        assert_eq!(painted(&t), 8);
    }

    #[test]
    fn timer_applies_gravity_only_while_moving() {
        let mut t = engine_with(1);
        let now = Instant::now();
        t.submit_action(UserAction::Start, false);
        t.advance_tick_at(now + Duration::from_secs(1));
        assert_eq!(t.current().unwrap().pos.y, 1);
        t.submit_action(UserAction::Pause, false);
        t.advance_tick_at(now + Duration::from_secs(2));
        assert_eq!(t.current().unwrap().pos.y, 1);
    }

    #[test]
    fn tick_updates_level_and_speed() {
        let mut t = engine();
        t.advance_tick_at(Instant::now());
        let info = t.snapshot();
        assert_eq!(info.level, 1);
        assert_eq!(info.speed, 500);
    }

    #[test]
    fn pause_toggles_and_is_idempotent_in_pairs() {
        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        let field = t.field().clone();
        let brick = *t.current().unwrap();
        t.submit_action(UserAction::Pause, false);
        assert_eq!(t.phase(), Phase::Paused);
        assert_eq!(t.snapshot().pause_flag(), 1);
        t.submit_action(UserAction::Left, false);
        t.submit_action(UserAction::Pause, false);
        assert_eq!(t.phase(), Phase::Moving);
        assert_eq!(t.snapshot().pause_flag(), 0);
        assert_eq!(*t.field(), field);
        assert_eq!(*t.current().unwrap(), brick);
    }

    #[test]
    fn start_resumes_from_pause() {
        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Pause, false);
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::Moving);
        assert!(!t.is_paused());
    }

    #[test]
    fn blocked_spawn_is_game_over() {
        let mut t = engine();
        t.field_mut().set_row(0, [1; FIELD_WIDTH]);
        t.field_mut().set_row(1, [1; FIELD_WIDTH]);
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::GameOver);
        assert!(t.current().is_none());
        assert_eq!(t.snapshot().pause_flag(), -1);
        assert_eq!(t.snapshot().pause, PauseState::GameOver);
    }

    #[test]
    fn restart_after_game_over_resets() {
        let mut t = engine();
        t.field_mut().set_row(0, [1; FIELD_WIDTH]);
        t.field_mut().set_row(1, [1; FIELD_WIDTH]);
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::GameOver);
        t.submit_action(UserAction::Left, false);
        assert_eq!(t.phase(), Phase::GameOver);
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::Moving);
        assert_eq!(t.score(), 0);
        assert_eq!(t.snapshot().pause_flag(), 0);
        assert_eq!(painted(&t), 4);
    }

    #[test]
    fn high_score_loaded_on_first_start() {
        let mut t = Tetris::new(BrickCatalog::standard(Some(2)), MemoryHighScore::new(900));
        assert_eq!(t.high_score(), 0);
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.high_score(), 900);
    }

    #[test]
    fn terminate_persists_and_is_final() {
        let mut t = Tetris::new(BrickCatalog::standard(Some(2)), MemoryHighScore::new(40));
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Terminate, false);
        assert_eq!(t.phase(), Phase::Terminated);
        assert_eq!(t.store().saves, 1);
        assert_eq!(t.store().value, 40);
        t.submit_action(UserAction::Start, false);
        t.submit_action(UserAction::Terminate, false);
        assert_eq!(t.phase(), Phase::Terminated);
        assert_eq!(t.store().saves, 1);
    }

    #[test]
    fn terminate_from_ready() {
        let mut t = Tetris::new(BrickCatalog::standard(Some(2)), MemoryHighScore::new(700));
        t.submit_action(UserAction::Terminate, false);
        assert_eq!(t.phase(), Phase::Terminated);
        assert_eq!(t.store().saves, 0);
        assert_eq!(t.store().value, 700);
    }

    #[test]
    fn custom_bricks_only_before_first_spawn() {
        let mut t = engine();
        assert!(t.enable_custom_bricks());
        assert!(!t.enable_custom_bricks());
        assert_eq!(t.catalog().len(), 9);

        let mut t = engine();
        t.submit_action(UserAction::Start, false);
        assert!(!t.enable_custom_bricks());
        assert_eq!(t.catalog().len(), 7);
    }

    #[test]
    fn empty_catalog_ends_the_game() {
        let mut t = Tetris::new(BrickCatalog::seeded(0), MemoryHighScore::default());
        t.submit_action(UserAction::Start, false);
        assert_eq!(t.phase(), Phase::GameOver);
    }
}
