use alloc::string::{String, ToString};
use chrono::{DateTime, Utc};
use core::fmt;
use serde::{Deserialize, Serialize};
use sweepview_protocol::{
    self as protocol, CellAction, CellRequest, GameState, NewGameReply, NewGameRequest,
};

use crate::*;

/// New-game parameters exactly as the player entered them. Nothing here is
/// range checked: zero, negative or oversized values go to the server as-is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParams {
    pub rows: i64,
    pub cols: i64,
    pub mines: i64,
}

impl GameParams {
    pub const fn new(rows: i64, cols: i64, mines: i64) -> Self {
        Self { rows, cols, mines }
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Self::new(8, 8, 10)
    }
}

impl From<GameParams> for NewGameRequest {
    fn from(params: GameParams) -> Self {
        Self {
            rows: params.rows,
            cols: params.cols,
            mines: params.mines,
        }
    }
}

/// Raw text of the new-game inputs, as typed by the player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameForm {
    pub rows: String,
    pub cols: String,
    pub mines: String,
}

/// Reads a form field the way a browser number input is read: an integer,
/// or a decimal truncated toward zero. Blank or non-numeric text is missing.
fn parse_number(raw: &str, name: &'static str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        // `as` truncates toward zero and saturates at the i64 bounds
        Ok(value) if value.is_finite() => Ok(value as i64),
        _ => Err(GameError::MissingInput(name)),
    }
}

impl GameForm {
    pub fn from_params(params: GameParams) -> Self {
        Self {
            rows: params.rows.to_string(),
            cols: params.cols.to_string(),
            mines: params.mines.to_string(),
        }
    }

    /// Only checks that every field holds a number; ranges are the server's
    /// business.
    pub fn parse(&self) -> Result<GameParams> {
        Ok(GameParams {
            rows: parse_number(&self.rows, "rows")?,
            cols: parse_number(&self.cols, "cols")?,
            mines: parse_number(&self.mines, "mines")?,
        })
    }
}

/// Text shown on the status line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    InvalidInput(&'static str),
    Started,
    InitFailed,
    Won,
    Lost,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Status::*;
        match self {
            Idle => Ok(()),
            InvalidInput(field) => write!(f, "Please enter a number for {field}"),
            Started => f.write_str("Game started~"),
            InitFailed => f.write_str("Failed to start a new game"),
            Won => f.write_str("Congratulations, you won!"),
            Lost => f.write_str("Boom! You hit a mine, game over!"),
        }
    }
}

/// A single-cell request the view should send to the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCommand {
    pub action: CellAction,
    pub coords: Coord2,
}

impl CellCommand {
    pub const fn new(action: CellAction, coords: Coord2) -> Self {
        Self { action, coords }
    }

    pub const fn request(&self) -> CellRequest {
        CellRequest {
            row: self.coords.0,
            col: self.coords.1,
        }
    }
}

/// Grid size for an accepted new game: the echoed dimensions, falling back to
/// the requested ones when those fit a board.
fn board_size(params: GameParams, reply: &NewGameReply) -> Option<Coord2> {
    let rows = reply.rows.or_else(|| Coord::try_from(params.rows).ok());
    let cols = reply.cols.or_else(|| Coord::try_from(params.cols).ok());
    match (rows, cols) {
        (Some(rows), Some(cols)) => Some((rows, cols)),
        _ => {
            log::error!(
                "accepted game has no usable size: {}x{}",
                params.rows,
                params.cols
            );
            None
        }
    }
}

/// Keeps the mirrored board, status line and clock in step with server replies
/// and decides which request each gesture turns into.
///
/// The controller performs no I/O: gesture handlers return the request to
/// send, and `finish_*` methods take the reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardController {
    board: Option<BoardMirror>,
    clock: ElapsedClock,
    status: Status,
}

impl BoardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> Option<&BoardMirror> {
        self.board.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        self.clock.elapsed_secs(now)
    }

    /// Validates the form, returning the parameters to send to `/api/new_game`.
    pub fn start_new_game(&mut self, form: &GameForm) -> Result<GameParams> {
        match form.parse() {
            Ok(params) => {
                log::debug!("requesting new game: {:?}", params);
                Ok(params)
            }
            Err(err) => {
                log::warn!("not starting game: {}", err);
                if let GameError::MissingInput(field) = err {
                    self.status = Status::InvalidInput(field);
                }
                Err(err)
            }
        }
    }

    /// Applies the `/api/new_game` reply. `Restart` means the server accepted
    /// the parameters.
    pub fn finish_new_game(
        &mut self,
        params: GameParams,
        reply: protocol::Result<NewGameReply>,
        now: DateTime<Utc>,
    ) -> TimerCommand {
        let size = match reply {
            Ok(reply) => board_size(params, &reply),
            Err(err) => {
                log::error!("failed to start new game: {}", err);
                None
            }
        };

        let Some(size) = size else {
            self.board = None;
            self.clock.stop(now);
            self.status = Status::InitFailed;
            return TimerCommand::Stop;
        };

        log::debug!("new game started: {:?}", size);
        self.board = Some(BoardMirror::new(size));
        self.clock.restart(now);
        self.status = Status::Started;
        TimerCommand::Restart
    }

    /// Left click: reveal a covered cell, or mass-reveal around a number whose
    /// flagged neighbours match it.
    pub fn handle_primary_activate(&self, coords: Coord2) -> Option<CellCommand> {
        let Some(board) = &self.board else {
            return Some(CellCommand::new(CellAction::Reveal, coords));
        };

        match board.cell_at(coords)? {
            CellView::Hidden | CellView::Flagged => {
                Some(CellCommand::new(CellAction::Reveal, coords))
            }
            CellView::Revealed(_) if board.can_mass_reveal_at(coords) => {
                Some(CellCommand::new(CellAction::MassReveal, coords))
            }
            CellView::Revealed(_) => None,
        }
    }

    /// Right click: toggle the flag.
    pub fn handle_secondary_activate(&self, coords: Coord2) -> CellCommand {
        CellCommand::new(CellAction::Flag, coords)
    }

    pub fn finish_action(
        &mut self,
        command: CellCommand,
        reply: protocol::Result<GameState>,
        now: DateTime<Utc>,
    ) -> Option<TimerCommand> {
        let state = match reply {
            Ok(state) => state,
            Err(err) if err.is_rejection() => {
                log::debug!("{:?} ignored by server: {}", command, err);
                return None;
            }
            Err(err) => {
                log::error!("{:?} failed: {}", command, err);
                return None;
            }
        };

        if self.board.is_none() && command.action != CellAction::Reveal {
            log::debug!("{:?} answered without a board, ignoring", command);
            return None;
        }

        self.apply_state(&state, now).unwrap_or_else(|err| {
            log::error!("discarding malformed state: {}", err);
            None
        })
    }

    /// Repaints the whole board from a server state, creating (or resizing)
    /// the grid when needed.
    pub fn apply_state(
        &mut self,
        state: &GameState,
        now: DateTime<Utc>,
    ) -> Result<Option<TimerCommand>> {
        let snapshot = BoardSnapshot::try_from(state)?;

        let board = match &mut self.board {
            Some(board) if board.size() == snapshot.size() => board,
            board => {
                log::debug!("building board for {:?}", snapshot.size());
                board.insert(BoardMirror::new(snapshot.size()))
            }
        };
        board.apply(&snapshot)?;

        Ok(match snapshot.outcome() {
            GameOutcome::InProgress => None,
            outcome => {
                self.clock.stop(now);
                self.status = if outcome == GameOutcome::Won {
                    Status::Won
                } else {
                    Status::Lost
                };
                log::debug!("game over: {:?}", outcome);
                Some(TimerCommand::Stop)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LiveHandle, at, state};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use sweepview_protocol::ApiError;

    fn rejected() -> ApiError {
        ApiError::Rejected {
            status: Some("error".into()),
            message: None,
        }
    }

    fn started(params: GameParams) -> BoardController {
        let mut controller = BoardController::new();
        controller.finish_new_game(params, Ok(NewGameReply::default()), at(0));
        controller
    }

    fn playing(rows: &[&str]) -> BoardController {
        let mut controller = BoardController::new();
        controller
            .apply_state(&state(rows, false, false), at(0))
            .unwrap();
        controller
    }

    #[test]
    fn form_requires_every_number() {
        let form = GameForm {
            rows: "8".into(),
            cols: " 9 ".into(),
            mines: "10".into(),
        };
        assert_eq!(form.parse(), Ok(GameParams::new(8, 9, 10)));

        let form = GameForm {
            mines: "".into(),
            ..form
        };
        assert_eq!(form.parse(), Err(GameError::MissingInput("mines")));
    }

    #[test]
    fn form_does_not_range_check() {
        let form = GameForm::from_params(GameParams::new(0, 1, 500));
        assert_eq!(form.parse(), Ok(GameParams::new(0, 1, 500)));

        let form = GameForm {
            rows: "-1".into(),
            cols: "70000".into(),
            mines: "5000000000".into(),
        };
        assert_eq!(form.parse(), Ok(GameParams::new(-1, 70000, 5_000_000_000)));
    }

    #[test]
    fn form_truncates_decimals() {
        let form = GameForm {
            rows: "2.5".into(),
            cols: "-3.9".into(),
            mines: "1e1".into(),
        };
        assert_eq!(form.parse(), Ok(GameParams::new(2, -3, 10)));
    }

    #[test]
    fn only_blank_or_non_numeric_is_missing() {
        let valid = GameForm::from_params(GameParams::default());
        for raw in ["", "   ", "abc", "2x", "inf", "NaN"] {
            let form = GameForm {
                cols: raw.into(),
                ..valid.clone()
            };
            assert_eq!(form.parse(), Err(GameError::MissingInput("cols")), "{raw:?}");
        }
    }

    #[test]
    fn out_of_range_input_is_sent_and_server_rejection_reported() {
        let mut controller = BoardController::new();
        let form = GameForm {
            rows: "-1".into(),
            ..GameForm::from_params(GameParams::default())
        };

        let params = controller.start_new_game(&form).unwrap();
        assert_eq!(NewGameRequest::from(params).rows, -1);
        assert_eq!(controller.status(), Status::Idle);

        let command = controller.finish_new_game(params, Err(rejected()), at(0));
        assert_eq!(command, TimerCommand::Stop);
        assert_eq!(controller.status(), Status::InitFailed);
    }

    #[test]
    fn accepted_size_that_cannot_be_drawn_fails() {
        let mut controller = started(GameParams::default());

        let command = controller.finish_new_game(
            GameParams::new(70000, 8, 10),
            Ok(NewGameReply::default()),
            at(1),
        );

        assert_eq!(command, TimerCommand::Stop);
        assert_eq!(controller.status(), Status::InitFailed);
        assert!(controller.board().is_none());
    }

    #[test]
    fn missing_input_sets_status_without_request() {
        let mut controller = BoardController::new();
        let form = GameForm {
            rows: "abc".into(),
            ..GameForm::from_params(GameParams::default())
        };

        assert!(controller.start_new_game(&form).is_err());
        assert_eq!(controller.status(), Status::InvalidInput("rows"));
        assert!(controller.board().is_none());
    }

    #[test]
    fn new_game_builds_empty_board_and_starts_clock() {
        let mut controller = BoardController::new();
        let params = controller
            .start_new_game(&GameForm::from_params(GameParams::new(4, 6, 5)))
            .unwrap();

        let command = controller.finish_new_game(params, Ok(NewGameReply::default()), at(3));

        assert_eq!(command, TimerCommand::Restart);
        assert_eq!(controller.status(), Status::Started);
        let board = controller.board().unwrap();
        assert_eq!(board.size(), (4, 6));
        assert_eq!(board.iter_cells().count(), 24);
        assert!(
            board
                .iter_cells()
                .all(|(_, cell)| !cell.is_revealed() && !cell.is_flagged())
        );
        assert_eq!(controller.elapsed_secs(at(5)), 2);
        assert_eq!(controller.elapsed_secs(at(10)), 7);
    }

    #[test]
    fn new_game_prefers_echoed_size() {
        let mut controller = BoardController::new();
        let reply = NewGameReply {
            rows: Some(3),
            cols: Some(2),
            mines: Some(1),
        };
        controller.finish_new_game(GameParams::new(9, 9, 10), Ok(reply), at(0));

        assert_eq!(controller.board().map(BoardMirror::size), Some((3, 2)));
    }

    #[test]
    fn failed_new_game_leaves_no_board() {
        for err in [rejected(), ApiError::Transport("offline".into())] {
            let mut controller = started(GameParams::default());

            let command = controller.finish_new_game(GameParams::default(), Err(err), at(4));

            assert_eq!(command, TimerCommand::Stop);
            assert_eq!(controller.status(), Status::InitFailed);
            assert!(controller.board().is_none());
            assert_eq!(controller.elapsed_secs(at(60)), 4);
        }
    }

    #[test]
    fn second_new_game_resets_time_and_keeps_one_timer() {
        let live = Rc::new(Cell::new(0));
        let mut slot = TimerSlot::empty();
        let mut controller = BoardController::new();

        for now in [at(0), at(30)] {
            let command =
                controller.finish_new_game(GameParams::default(), Ok(NewGameReply::default()), now);
            assert!(slot.apply(command, || LiveHandle::new(&live)));
        }

        assert_eq!(controller.elapsed_secs(at(30)), 0);
        assert_eq!(live.get(), 1);
    }

    #[test]
    fn game_over_and_failed_new_game_leave_no_timer() {
        let live = Rc::new(Cell::new(0));
        let mut slot = TimerSlot::empty();
        let mut controller = BoardController::new();

        let command =
            controller.finish_new_game(GameParams::new(1, 2, 1), Ok(NewGameReply::default()), at(0));
        slot.apply(command, || LiveHandle::new(&live));
        assert_eq!(live.get(), 1);

        let reveal = CellCommand::new(CellAction::Reveal, (0, 0));
        let command = controller
            .finish_action(reveal, Ok(state(&["*."], true, false)), at(3))
            .unwrap();
        assert!(!slot.apply(command, || LiveHandle::new(&live)));
        assert_eq!(live.get(), 0);

        let command =
            controller.finish_new_game(GameParams::default(), Ok(NewGameReply::default()), at(5));
        slot.apply(command, || LiveHandle::new(&live));
        assert_eq!(live.get(), 1);

        let command = controller.finish_new_game(GameParams::default(), Err(rejected()), at(8));
        assert!(!slot.apply(command, || LiveHandle::new(&live)));
        assert_eq!(live.get(), 0);
        assert_eq!(controller.elapsed_secs(at(20)), 3);
    }

    #[test]
    fn first_click_without_board_reveals() {
        let controller = BoardController::new();
        assert_eq!(
            controller.handle_primary_activate((2, 3)),
            Some(CellCommand::new(CellAction::Reveal, (2, 3)))
        );
    }

    #[test]
    fn covered_cells_reveal() {
        let controller = playing(&["F.", "1."]);
        assert_eq!(
            controller.handle_primary_activate((0, 1)),
            Some(CellCommand::new(CellAction::Reveal, (0, 1)))
        );
        assert_eq!(
            controller.handle_primary_activate((0, 0)),
            Some(CellCommand::new(CellAction::Reveal, (0, 0)))
        );
    }

    #[test]
    fn mass_reveal_only_when_flags_match() {
        let one_flag = playing(&["F2.", "...", "..."]);
        assert_eq!(one_flag.handle_primary_activate((0, 1)), None);

        let two_flags = playing(&["F2F", "...", "..."]);
        assert_eq!(
            two_flags.handle_primary_activate((0, 1)),
            Some(CellCommand::new(CellAction::MassReveal, (0, 1)))
        );
    }

    #[test]
    fn revealed_blank_and_out_of_bounds_send_nothing() {
        let controller = playing(&["0.", ".."]);
        assert_eq!(controller.handle_primary_activate((0, 0)), None);
        assert_eq!(controller.handle_primary_activate((7, 7)), None);
    }

    #[test]
    fn secondary_activate_always_flags() {
        let controller = playing(&["1."]);
        let command = controller.handle_secondary_activate((0, 0));
        assert_eq!(command, CellCommand::new(CellAction::Flag, (0, 0)));
        assert_eq!(command.request(), CellRequest { row: 0, col: 0 });
    }

    #[test]
    fn reveal_reply_lazily_builds_board() {
        let mut controller = BoardController::new();
        let command = CellCommand::new(CellAction::Reveal, (0, 0));

        let timer = controller.finish_action(command, Ok(state(&["1.", ".."], false, false)), at(1));

        assert_eq!(timer, None);
        let board = controller.board().unwrap();
        assert_eq!(
            board.cell_at((0, 0)),
            Some(CellView::Revealed(CellValue::Count(1)))
        );
    }

    #[test]
    fn flag_reply_without_board_is_ignored() {
        let mut controller = BoardController::new();
        let command = CellCommand::new(CellAction::Flag, (0, 0));

        controller.finish_action(command, Ok(state(&["F"], false, false)), at(1));

        assert!(controller.board().is_none());
    }

    #[test]
    fn failed_actions_leave_board_and_status_alone() {
        let mut controller = playing(&["..", ".."]);
        let before = controller.clone();
        let command = CellCommand::new(CellAction::Flag, (0, 0));

        assert_eq!(controller.finish_action(command, Err(rejected()), at(1)), None);
        assert_eq!(controller, before);

        let err = ApiError::Transport("connection reset".into());
        assert_eq!(controller.finish_action(command, Err(err), at(1)), None);
        assert_eq!(controller, before);
    }

    #[test]
    fn malformed_state_is_discarded() {
        let mut controller = playing(&["..", ".."]);
        let before = controller.clone();
        let mut wire = state(&["1.", ".."], false, false);
        wire.revealed.pop();

        let command = CellCommand::new(CellAction::Reveal, (0, 0));
        assert_eq!(controller.finish_action(command, Ok(wire), at(1)), None);
        assert_eq!(controller, before);
    }

    #[test]
    fn apply_state_paints_mines_flags_and_numbers() {
        let controller = playing(&["*F", "03"]);
        let board = controller.board().unwrap();

        let mine = board.cell_at((0, 0)).unwrap();
        assert_eq!(mine.class(), "mine");
        assert!(!mine.is_flagged());

        let flag = board.cell_at((0, 1)).unwrap();
        assert_eq!(flag.class(), "flag");
        assert!(!flag.is_revealed());

        assert_eq!(board.cell_at((1, 0)).unwrap().glyph(), "");
        assert_eq!(board.cell_at((1, 1)).unwrap().glyph(), "3");
    }

    #[test]
    fn no_cell_is_both_flagged_and_revealed() {
        let mut wire = state(&["12", "F."], false, false);
        for row in wire.flagged.iter_mut() {
            row.fill(true);
        }
        let mut controller = BoardController::new();
        controller.apply_state(&wire, at(0)).unwrap();

        let cells: Vec<_> = controller.board().unwrap().iter_cells().collect();
        assert!(cells.iter().all(|(_, c)| !(c.is_flagged() && c.is_revealed())));
        assert_eq!(cells.iter().filter(|(_, c)| c.is_flagged()).count(), 2);
    }

    #[test]
    fn apply_state_rebuilds_on_size_change() {
        let mut controller = started(GameParams::new(2, 2, 1));
        controller
            .apply_state(&state(&["1..", "..."], false, false), at(1))
            .unwrap();
        assert_eq!(controller.board().map(BoardMirror::size), Some((2, 3)));
    }

    #[test]
    fn win_stops_clock_with_win_status() {
        let mut controller = started(GameParams::new(1, 2, 1));

        let timer = controller
            .apply_state(&state(&["1F"], true, true), at(7))
            .unwrap();

        assert_eq!(timer, Some(TimerCommand::Stop));
        assert_eq!(controller.status(), Status::Won);
        assert_eq!(controller.elapsed_secs(at(100)), 7);
    }

    #[test]
    fn loss_stops_clock_with_loss_status() {
        let mut controller = started(GameParams::new(1, 2, 1));

        let timer = controller
            .apply_state(&state(&["*."], true, false), at(9))
            .unwrap();

        assert_eq!(timer, Some(TimerCommand::Stop));
        assert_eq!(controller.status(), Status::Lost);
        assert_eq!(controller.elapsed_secs(at(100)), 9);
    }

    #[test]
    fn in_progress_state_keeps_clock_running() {
        let mut controller = started(GameParams::new(1, 2, 1));
        let timer = controller
            .apply_state(&state(&["1."], false, false), at(2))
            .unwrap();
        assert_eq!(timer, None);
        assert_eq!(controller.status(), Status::Started);
        assert_eq!(controller.elapsed_secs(at(5)), 5);
    }

    #[test]
    fn status_messages() {
        assert_eq!(Status::Idle.to_string(), "");
        assert_eq!(Status::Won.to_string(), "Congratulations, you won!");
        assert_eq!(
            Status::InvalidInput("cols").to_string(),
            "Please enter a number for cols"
        );
    }
}
