//! Movement and command restrictions during a walk.
//!
//! Pure policy helpers; the engine layers the per-user session and
//! config checks on top. The host calls these from its own movement
//! and command hooks.

use crate::walk::Position;

/// Command prefixes that stay usable while commands are blocked, so a
/// user can always end their own walk.
pub const ALLOWED_COMMAND_PREFIXES: [&str; 2] = ["/tour", "/guide"];

/// Outcome of filtering a movement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveVerdict {
    Allow,
    /// Keep the user in place at the contained position. The position
    /// carries the attempted view direction so the user can still look
    /// around while held.
    Hold(Position),
}

/// Filter a movement attempt from `from` to `to` for a frozen user.
/// View-direction-only changes always pass.
pub fn filter_move(from: &Position, to: &Position) -> MoveVerdict {
    if to.moved_from(from) {
        let mut held = from.clone();
        held.yaw = to.yaw;
        held.pitch = to.pitch;
        MoveVerdict::Hold(held)
    } else {
        MoveVerdict::Allow
    }
}

/// Whether `command` may run while commands are blocked.
pub fn command_allowed(command: &str) -> bool {
    let command = command.to_lowercase();
    ALLOWED_COMMAND_PREFIXES
        .iter()
        .any(|prefix| command.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64) -> Position {
        Position::new("hub", x, 64.0, 0.0)
    }

    #[test]
    fn positional_movement_is_held() {
        let verdict = filter_move(&at(0.0), &at(1.0));
        match verdict {
            MoveVerdict::Hold(held) => assert_eq!(held.x, 0.0),
            MoveVerdict::Allow => panic!("expected Hold"),
        }
    }

    #[test]
    fn held_position_keeps_attempted_view_direction() {
        let from = at(0.0);
        let mut to = at(1.0);
        to.yaw = 135.0;
        to.pitch = -20.0;

        match filter_move(&from, &to) {
            MoveVerdict::Hold(held) => {
                assert_eq!(held.x, from.x);
                assert_eq!(held.yaw, 135.0);
                assert_eq!(held.pitch, -20.0);
            }
            MoveVerdict::Allow => panic!("expected Hold"),
        }
    }

    #[test]
    fn looking_around_is_allowed() {
        let from = at(0.0);
        let mut to = at(0.0);
        to.yaw = 90.0;
        assert_eq!(filter_move(&from, &to), MoveVerdict::Allow);
    }

    #[test]
    fn walk_commands_pass_the_block() {
        assert!(command_allowed("/tour stop"));
        assert!(command_allowed("/GUIDE"));
        assert!(!command_allowed("/home"));
        assert!(!command_allowed("/spawn tour"));
    }
}
