use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Missing value for {0}")]
    MissingInput(&'static str),
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Invalid cell value {0}")]
    InvalidCellValue(i8),
    #[error("Revealed cell {0:?} has no value")]
    MissingCellValue(Coord2),
}

pub type Result<T> = core::result::Result<T, GameError>;
