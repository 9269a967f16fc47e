//! Routing table from `(phase, action)` to the engine operation it triggers.

use crate::game::Phase;

/// Discrete user action, as produced by the keyboard layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    Start,
    Pause,
    Terminate,
    Left,
    Right,
    /// Reserved, has no effect.
    Up,
    Down,
    /// Rotate the falling brick.
    Action,
}

impl UserAction {
    pub const ALL: [Self; 8] = [
        Self::Start,
        Self::Pause,
        Self::Terminate,
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::Action,
    ];
}

/// Engine operation selected by [`route`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    TogglePause,
    Terminate,
    MoveLeft,
    MoveRight,
    Up,
    Drop { hold: bool },
    Rotate,
}

/// Pure routing table. `None` means the action is dropped in this phase.
pub fn route(phase: Phase, action: UserAction, hold: bool) -> Option<Command> {
    use UserAction as A;
    match (phase, action) {
        (Phase::Terminated, _) => None,
        (_, A::Terminate) => Some(Command::Terminate),
        (Phase::Ready | Phase::GameOver, A::Start) => Some(Command::Start),
        (Phase::Spawn | Phase::Moving, A::Pause) => Some(Command::TogglePause),
        (Phase::Paused, A::Start | A::Pause) => Some(Command::TogglePause),
        (Phase::Moving, A::Left) => Some(Command::MoveLeft),
        (Phase::Moving, A::Right) => Some(Command::MoveRight),
        (Phase::Moving, A::Up) => Some(Command::Up),
        (Phase::Moving, A::Down) => Some(Command::Drop { hold }),
        (Phase::Moving, A::Action) => Some(Command::Rotate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_only_starts_or_terminates() {
        assert_eq!(route(Phase::Ready, UserAction::Start, false), Some(Command::Start));
        assert_eq!(
            route(Phase::Ready, UserAction::Terminate, false),
            Some(Command::Terminate)
        );
        for a in [UserAction::Pause, UserAction::Left, UserAction::Down, UserAction::Action] {
            assert_eq!(route(Phase::Ready, a, false), None);
        }
    }

    #[test]
    fn moving_routes_movement() {
        assert_eq!(route(Phase::Moving, UserAction::Start, false), None);
        assert_eq!(route(Phase::Moving, UserAction::Left, false), Some(Command::MoveLeft));
        assert_eq!(route(Phase::Moving, UserAction::Right, true), Some(Command::MoveRight));
        assert_eq!(route(Phase::Moving, UserAction::Up, false), Some(Command::Up));
        assert_eq!(
            route(Phase::Moving, UserAction::Down, true),
            Some(Command::Drop { hold: true })
        );
        assert_eq!(route(Phase::Moving, UserAction::Action, false), Some(Command::Rotate));
        assert_eq!(
            route(Phase::Moving, UserAction::Pause, false),
            Some(Command::TogglePause)
        );
    }

    #[test]
    fn paused_toggles_on_start_and_pause_only() {
        assert_eq!(
            route(Phase::Paused, UserAction::Start, false),
            Some(Command::TogglePause)
        );
        assert_eq!(
            route(Phase::Paused, UserAction::Pause, false),
            Some(Command::TogglePause)
        );
        assert_eq!(route(Phase::Paused, UserAction::Left, false), None);
        assert_eq!(route(Phase::Paused, UserAction::Down, true), None);
    }

    #[test]
    fn game_over_restarts() {
        assert_eq!(route(Phase::GameOver, UserAction::Start, false), Some(Command::Start));
        assert_eq!(route(Phase::GameOver, UserAction::Pause, false), None);
        assert_eq!(route(Phase::GameOver, UserAction::Right, false), None);
    }

    #[test]
    fn spawn_and_attach_ignore_movement() {
        assert_eq!(route(Phase::Spawn, UserAction::Left, false), None);
        assert_eq!(route(Phase::Attach, UserAction::Down, true), None);
        assert_eq!(route(Phase::Attach, UserAction::Pause, false), None);
        assert_eq!(
            route(Phase::Attach, UserAction::Terminate, false),
            Some(Command::Terminate)
        );
    }

    #[test]
    fn terminated_drops_everything() {
        for a in UserAction::ALL {
            assert_eq!(route(Phase::Terminated, a, true), None);
        }
    }
}
