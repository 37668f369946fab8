use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Terminal state of a game. Lost and won are exclusive by construction and
/// only [`Game::restart`] leaves them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Playing,
    Lost,
    Won,
}

impl Outcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::Won)
    }
}

/// One game from start to finish: the board, its outcome and the notifications
/// produced while playing it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    board: Board,
    outcome: Outcome,
    guards: OneShotGuards,
    pending: Vec<Notification>,
}

impl Game {
    /// Builds a board for `config`, mines it and computes the adjacency counts.
    pub fn start<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self> {
        let mut board = Board::new(config.size);
        board.place_mines(config.mines, rng)?;
        board.compute_adjacency();
        log::debug!(
            "new game {}x{} with {} mines",
            config.size.rows,
            config.size.cols,
            config.mines
        );
        Ok(Self::from_board(board))
    }

    /// Same as [`Game::start`] with a layout fully determined by `seed`.
    pub fn start_seeded(config: GameConfig, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::start(config, &mut rng)
    }

    /// Wraps an already mined board, adjacency must be computed.
    pub fn from_board(board: Board) -> Self {
        Self {
            config: GameConfig::new_unchecked(board.size(), board.mine_count()),
            board,
            outcome: Outcome::Playing,
            guards: OneShotGuards::default(),
            pending: Vec::new(),
        }
    }

    /// Throws the current board away and starts over with the same config.
    pub fn restart(&mut self, seed: u64) -> Result<()> {
        *self = Self::start_seeded(self.config, seed)?;
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome == Outcome::Lost
    }

    pub fn is_won(&self) -> bool {
        self.outcome == Outcome::Won
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn guards(&self) -> OneShotGuards {
        self.guards
    }

    pub fn mines_left(&self) -> i32 {
        self.board.mines_left()
    }

    /// Notifications produced since the last drain, oldest first.
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.pending
    }

    pub fn drain_notifications(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.pending.drain(..)
    }

    /// Reveals `pos`. Ignored after the game ended and on flagged or revealed cells.
    pub fn handle_primary(&mut self, pos: Pos) {
        if self.is_finished() {
            return;
        }
        let Some(cell) = self.board.get_mut(pos) else {
            return;
        };
        if cell.flagged || cell.revealed {
            return;
        }

        cell.revealed = true;
        let (has_mine, nearby_mines) = (cell.has_mine, cell.nearby_mines);

        if has_mine {
            log::debug!("mine hit at {}", pos);
            self.outcome = Outcome::Lost;
            self.fire(Notification::MineExploded(pos));
            self.board.reveal_all_mines();
            self.fire(Notification::GameOver);
        } else {
            log::debug!("revealed {}, nearby mines: {}", pos, nearby_mines);
            self.pending.push(Notification::CellRevealed(pos));
            if nearby_mines == 0 {
                self.board.reveal_flood_fill(pos, &mut self.pending);
            }
        }

        self.evaluate_win();
    }

    /// Toggles the flag on an unrevealed cell.
    pub fn handle_secondary(&mut self, pos: Pos) {
        if self.is_finished() {
            return;
        }
        let Some(cell) = self.board.get_mut(pos) else {
            return;
        };
        if cell.revealed {
            return;
        }

        cell.flagged = !cell.flagged;
        log::debug!("flag at {} set to {}", pos, cell.flagged);
        self.pending.push(Notification::FlagToggled(pos));
    }

    /// Enters the won state once every safe cell is revealed. Never after a loss.
    pub fn evaluate_win(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        if self.board.count_revealed_safe() == self.board.safe_cell_count() {
            if self.outcome == Outcome::Playing {
                log::debug!("all {} safe cells revealed", self.board.safe_cell_count());
                self.outcome = Outcome::Won;
            }
            self.fire(Notification::Won);
        }
        self.is_won()
    }

    /// Runs one frame: at most one reveal and one flag toggle at the pointer, then
    /// the win check. Once finished, only fires terminal notifications still owed.
    pub fn tick(&mut self, input: &FrameInput, mapper: &CellMapper) {
        if self.is_finished() {
            self.reconcile_notifications();
            return;
        }

        let target = input.pointer.and_then(|(x, y)| mapper.cell_at(x, y));
        if let Some(pos) = target {
            if input.pressed.contains(MouseButtons::PRIMARY) {
                self.handle_primary(pos);
            }
            if input.pressed.contains(MouseButtons::SECONDARY) {
                self.handle_secondary(pos);
            }
        }

        self.evaluate_win();
    }

    /// Fires the terminal notification matching the outcome if it never fired.
    pub fn reconcile_notifications(&mut self) {
        match self.outcome {
            Outcome::Lost => self.fire(Notification::GameOver),
            Outcome::Won => self.fire(Notification::Won),
            Outcome::Playing => {}
        }
    }

    fn fire(&mut self, notification: Notification) {
        if self.guards.claim(notification) {
            log::debug!("fired {:?}", notification);
            self.pending.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: BoardSize, mines: &[Pos]) -> Game {
        let mut board = Board::new(size);
        board.place_mines_at(mines).unwrap();
        board.compute_adjacency();
        Game::from_board(board)
    }

    fn classic(seed: u64) -> Game {
        Game::start_seeded(GameConfig::classic(), seed).unwrap()
    }

    fn one_shots(game: &Game) -> Vec<Notification> {
        game.pending_notifications()
            .iter()
            .copied()
            .filter(|n| n.is_one_shot())
            .collect()
    }

    #[test]
    fn start_builds_a_fresh_classic_board() {
        let game = classic(3);
        let board = game.board();

        assert_eq!(board.size(), BoardSize::new(9, 9));
        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.iter().filter(|(_, c)| c.has_mine).count(), 10);
        assert_eq!(board.count_revealed_safe(), 0);
        assert_eq!(game.outcome(), Outcome::Playing);
        assert_eq!(game.guards(), OneShotGuards::default());
        assert!(game.pending_notifications().is_empty());
    }

    #[test]
    fn same_seed_same_layout() {
        assert_eq!(classic(99).board(), classic(99).board());
    }

    #[test]
    fn start_rejects_too_many_mines() {
        let config = GameConfig::new_unchecked(BoardSize::new(2, 2), 4);
        assert_eq!(
            Game::start_seeded(config, 0).unwrap_err(),
            GameError::TooManyMines
        );
    }

    #[test]
    fn primary_on_zero_cell_floods_without_mines() {
        for seed in 0..20 {
            let mut game = classic(seed);
            let (pos, _) = game
                .board()
                .iter()
                .find(|(_, cell)| cell.is_empty())
                .expect("10 mines leave zero cells on 9x9");

            game.handle_primary(pos);

            let board = game.board();
            assert!(board.count_revealed_safe() >= 1);
            assert!(board.iter().all(|(_, c)| !(c.revealed && c.has_mine)));
            let reveals = game
                .pending_notifications()
                .iter()
                .filter(|n| matches!(n, Notification::CellRevealed(_)))
                .count();
            assert_eq!(reveals, board.count_revealed_safe() as usize);
            assert_eq!(game.pending_notifications()[0], Notification::CellRevealed(pos));
        }
    }

    #[test]
    fn primary_on_numbered_cell_reveals_only_it() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);

        game.handle_primary(Pos::new(1, 1));

        assert_eq!(game.board().count_revealed_safe(), 1);
        assert_eq!(
            game.pending_notifications(),
            &[Notification::CellRevealed(Pos::new(1, 1))]
        );
    }

    #[test]
    fn revealing_every_safe_cell_wins_once() {
        let mut game = classic(11);
        let safe: Vec<_> = game
            .board()
            .iter()
            .filter(|(_, cell)| !cell.has_mine)
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(safe.len(), 71);

        for pos in safe {
            game.handle_primary(pos);
        }

        assert!(game.is_won());
        assert!(!game.is_over());
        assert_eq!(game.board().count_revealed_safe(), 71);
        assert_eq!(one_shots(&game), vec![Notification::Won]);

        let mapper = CellMapper::new(60.0, game.board().size());
        let click = FrameInput::new(Some((1.0, 1.0)), MouseButtons::PRIMARY);
        for _ in 0..5 {
            game.tick(&click, &mapper);
            assert!(game.evaluate_win());
        }
        assert_eq!(one_shots(&game), vec![Notification::Won]);
    }

    #[test]
    fn mine_hit_loses_and_reveals_all_mines() {
        let mines = [Pos::new(0, 0), Pos::new(2, 2)];
        let mut game = game(BoardSize::new(3, 3), &mines);

        game.handle_primary(Pos::new(0, 0));

        assert!(game.is_over());
        assert!(!game.is_won());
        assert!(mines.iter().all(|&pos| game.board()[pos].revealed));
        assert_eq!(game.board().count_revealed_safe(), 0);
        assert_eq!(
            game.pending_notifications(),
            &[
                Notification::MineExploded(Pos::new(0, 0)),
                Notification::GameOver
            ]
        );
        assert!(!game.evaluate_win());
    }

    #[test]
    fn terminal_notifications_fire_once_across_frames() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(1, 1)]);
        let mapper = CellMapper::new(60.0, game.board().size());
        let click_mine = FrameInput::new(Some((90.0, 90.0)), MouseButtons::PRIMARY);

        for _ in 0..10 {
            game.tick(&click_mine, &mapper);
            game.reconcile_notifications();
        }

        assert_eq!(
            game.pending_notifications(),
            &[
                Notification::MineExploded(Pos::new(1, 1)),
                Notification::GameOver
            ]
        );
    }

    #[test]
    fn reconcile_fires_owed_terminal_notification() {
        let mut game = game(BoardSize::new(2, 2), &[Pos::new(0, 0)]);
        game.outcome = Outcome::Lost;
        let mapper = CellMapper::new(60.0, game.board().size());

        game.tick(&FrameInput::default(), &mapper);
        game.tick(&FrameInput::default(), &mapper);

        assert_eq!(game.pending_notifications(), &[Notification::GameOver]);
        assert!(game.guards().game_over_fired);
        assert!(!game.guards().explosion_fired);
    }

    #[test]
    fn reconcile_fires_owed_win_once() {
        let mut game = game(BoardSize::new(2, 2), &[Pos::new(0, 0)]);
        game.outcome = Outcome::Won;
        let mapper = CellMapper::new(60.0, game.board().size());

        game.tick(&FrameInput::default(), &mapper);
        game.tick(&FrameInput::default(), &mapper);

        assert_eq!(game.pending_notifications(), &[Notification::Won]);
        assert!(game.guards().win_fired);
        assert!(!game.guards().game_over_fired);
        assert!(!game.guards().explosion_fired);
    }

    #[test]
    fn actions_after_loss_are_ignored() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        game.handle_primary(Pos::new(0, 0));
        let before = game.board().clone();
        game.drain_notifications().for_each(drop);

        game.handle_primary(Pos::new(2, 2));
        game.handle_secondary(Pos::new(2, 2));

        assert_eq!(game.board(), &before);
        assert!(game.pending_notifications().is_empty());
    }

    #[test]
    fn flagged_cell_cannot_be_revealed() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        let pos = Pos::new(2, 2);

        game.handle_secondary(pos);
        game.handle_primary(pos);

        assert_eq!(game.board()[pos].state(), CellState::Flagged);
        assert_eq!(game.pending_notifications(), &[Notification::FlagToggled(pos)]);
    }

    #[test]
    fn double_flag_toggle_restores_cell() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        let before = game.board().clone();

        game.handle_secondary(Pos::new(0, 0));
        assert_eq!(game.mines_left(), 0);
        game.handle_secondary(Pos::new(0, 0));

        assert_eq!(game.board(), &before);
        assert_eq!(game.mines_left(), 1);
        assert_eq!(
            game.pending_notifications(),
            &[
                Notification::FlagToggled(Pos::new(0, 0)),
                Notification::FlagToggled(Pos::new(0, 0))
            ]
        );
    }

    #[test]
    fn secondary_on_revealed_cell_is_noop() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        let pos = Pos::new(1, 1);
        game.handle_primary(pos);
        game.drain_notifications().for_each(drop);

        game.handle_secondary(pos);

        assert!(!game.board()[pos].flagged);
        assert!(game.pending_notifications().is_empty());
    }

    #[test]
    fn out_of_bounds_actions_are_ignored() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        let before = game.clone();

        game.handle_primary(Pos::new(3, 0));
        game.handle_secondary(Pos::new(0, 200));

        assert_eq!(game, before);
    }

    #[test]
    fn tick_applies_both_buttons_at_pointer() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 1)]);
        let mapper = CellMapper::new(10.0, game.board().size());

        let both = FrameInput::new(
            Some((25.0, 15.0)),
            MouseButtons::PRIMARY | MouseButtons::SECONDARY,
        );
        game.tick(&both, &mapper);

        let pos = Pos::new(1, 2);
        assert!(game.board()[pos].revealed);
        assert!(!game.board()[pos].flagged);
        assert_eq!(
            game.pending_notifications(),
            &[Notification::CellRevealed(pos)]
        );
    }

    #[test]
    fn tick_without_target_changes_nothing() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        let mapper = CellMapper::new(10.0, game.board().size());
        let before = game.clone();

        game.tick(&FrameInput::new(None, MouseButtons::all()), &mapper);
        game.tick(&FrameInput::new(Some((5.0, 45.0)), MouseButtons::all()), &mapper);
        game.tick(&FrameInput::new(Some((5.0, 5.0)), MouseButtons::empty()), &mapper);

        assert_eq!(game, before);
    }

    #[test]
    fn tick_wins_when_last_cell_opens() {
        let mut game = game(BoardSize::new(1, 2), &[Pos::new(0, 0)]);
        let mapper = CellMapper::new(10.0, game.board().size());

        game.tick(&FrameInput::new(Some((15.0, 5.0)), MouseButtons::PRIMARY), &mapper);

        assert!(game.is_won());
        assert_eq!(
            game.pending_notifications(),
            &[
                Notification::CellRevealed(Pos::new(0, 1)),
                Notification::Won
            ]
        );
    }

    #[test]
    fn restart_resets_everything() {
        let mut game = game(BoardSize::new(3, 3), &[Pos::new(0, 0)]);
        game.handle_primary(Pos::new(0, 0));
        assert!(game.is_over());

        game.restart(5).unwrap();

        assert_eq!(game.outcome(), Outcome::Playing);
        assert_eq!(game.guards(), OneShotGuards::default());
        assert!(game.pending_notifications().is_empty());
        assert_eq!(game.board().mine_count(), 1);
        assert_eq!(game.board().count_revealed_safe(), 0);
        assert!(game.board().iter().all(|(_, c)| !c.revealed && !c.flagged));
    }
}
