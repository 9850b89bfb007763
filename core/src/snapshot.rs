use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sweepview_protocol::GameState;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost,
}

impl GameOutcome {
    pub const fn from_flags(game_over: bool, win: bool) -> Self {
        match (game_over, win) {
            (false, _) => Self::InProgress,
            (true, true) => Self::Won,
            (true, false) => Self::Lost,
        }
    }
}

/// A server state reply checked for shape and converted to cell views.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardSnapshot {
    cells: Array2<CellView>,
    outcome: GameOutcome,
}

impl BoardSnapshot {
    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        // dimensions originate from u16 fields on the wire
        (rows as Coord, cols as Coord)
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn cell_at(&self, coords: Coord2) -> CellView {
        self.cells[coords.to_nd_index()]
    }

    pub(crate) fn cells(&self) -> &Array2<CellView> {
        &self.cells
    }
}

fn check_shape<T>(grid: &[Vec<T>], (rows, cols): Coord2) -> Result<()> {
    if grid.len() != usize::from(rows) || grid.iter().any(|row| row.len() != usize::from(cols)) {
        Err(GameError::InvalidBoardShape)
    } else {
        Ok(())
    }
}

impl TryFrom<&GameState> for BoardSnapshot {
    type Error = GameError;

    fn try_from(state: &GameState) -> Result<Self> {
        let size = (state.rows, state.cols);
        check_shape(&state.revealed, size)?;
        check_shape(&state.flagged, size)?;
        check_shape(&state.values, size)?;

        let mut cells = Array2::default(size.to_nd_index());
        for row in 0..state.rows {
            for col in 0..state.cols {
                let (r, c) = (usize::from(row), usize::from(col));
                let cell = if state.revealed[r][c] {
                    let raw = state.values[r][c].ok_or(GameError::MissingCellValue((row, col)))?;
                    CellView::Revealed(CellValue::from_wire(raw)?)
                } else if state.flagged[r][c] {
                    CellView::Flagged
                } else {
                    CellView::Hidden
                };
                cells[[r, c]] = cell;
            }
        }

        Ok(Self {
            cells,
            outcome: GameOutcome::from_flags(state.game_over, state.win),
        })
    }
}
