use serde::{Deserialize, Serialize};

use crate::*;

/// Side-effect triggers for the presentation layer (sounds, visual feedback).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A safe cell was revealed, by a click or by a flood-fill.
    CellRevealed(Pos),
    /// The clicked mine, fires once per game.
    MineExploded(Pos),
    /// Fires once per game, after the mines have been revealed.
    GameOver,
    FlagToggled(Pos),
    /// Fires once per game.
    Won,
}

impl Notification {
    /// Whether this notification may only fire once per game.
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::MineExploded(_) | Self::GameOver | Self::Won)
    }
}

/// Anything that accepts notifications as they are produced.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Per-event play-once guards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotGuards {
    pub explosion_fired: bool,
    pub game_over_fired: bool,
    pub win_fired: bool,
}

impl OneShotGuards {
    /// Flips the guard for `notification`, returning `true` only the first time.
    /// Notifications without a guard always pass.
    pub fn claim(&mut self, notification: Notification) -> bool {
        let guard = match notification {
            Notification::MineExploded(_) => &mut self.explosion_fired,
            Notification::GameOver => &mut self.game_over_fired,
            Notification::Won => &mut self.win_fired,
            Notification::CellRevealed(_) | Notification::FlagToggled(_) => return true,
        };
        !core::mem::replace(guard, true)
    }
}
