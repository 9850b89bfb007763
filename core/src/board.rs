use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coordinate-indexed mirror of the last server-reported board.
///
/// Logic such as flag counting reads from here, and rendering is derived from
/// it; nothing is ever read back from the DOM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardMirror {
    cells: Array2<CellView>,
}

impl BoardMirror {
    /// An all-hidden board of the given size.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    /// Cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), &cell)| ((row as Coord, col as Coord), cell))
    }

    /// Number of flagged cells among the in-bounds neighbours of `coords`.
    pub fn count_surrounding_flags(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].is_flagged())
            .count() as u8
    }

    /// Whether a click on this revealed number should trigger a mass-reveal.
    pub fn can_mass_reveal_at(&self, coords: Coord2) -> bool {
        match self.cell_at(coords) {
            Some(CellView::Revealed(CellValue::Count(count))) if count > 0 => {
                self.count_surrounding_flags(coords) == count
            }
            _ => false,
        }
    }

    /// Overwrites every cell with the snapshot. The snapshot must have the
    /// same size as the board.
    pub fn apply(&mut self, snapshot: &BoardSnapshot) -> Result<()> {
        if snapshot.size() != self.size() {
            return Err(GameError::InvalidBoardShape);
        }
        self.cells.assign(snapshot.cells());
        Ok(())
    }
}
