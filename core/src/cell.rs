use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Wire sentinel the server uses for a mine.
pub const MINE_SENTINEL: i8 = -1;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    Count(u8),
}

impl CellValue {
    pub fn from_wire(raw: i8) -> Result<Self> {
        match raw {
            MINE_SENTINEL => Ok(Self::Mine),
            0..=8 => Ok(Self::Count(raw as u8)),
            _ => Err(GameError::InvalidCellValue(raw)),
        }
    }

    pub const fn to_wire(self) -> i8 {
        match self {
            Self::Mine => MINE_SENTINEL,
            Self::Count(count) => count as i8,
        }
    }
}

/// Client-side mirror of one cell as last reported by the server.
///
/// A flagged cell is by construction never revealed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(CellValue),
}

impl CellView {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn value(self) -> Option<CellValue> {
        match self {
            Self::Revealed(value) => Some(value),
            _ => None,
        }
    }

    /// Text shown inside the cell.
    pub fn glyph(self) -> &'static str {
        use CellValue::*;
        const DIGITS: [&str; 9] = ["", "1", "2", "3", "4", "5", "6", "7", "8"];
        match self {
            Self::Hidden => "",
            Self::Flagged => "🚩",
            Self::Revealed(Mine) => "*",
            Self::Revealed(Count(count)) => DIGITS.get(usize::from(count)).copied().unwrap_or(""),
        }
    }

    /// CSS class carried by the cell.
    pub const fn class(self) -> &'static str {
        use CellValue::*;
        match self {
            Self::Hidden => "",
            Self::Flagged => "flag",
            Self::Revealed(Mine) => "mine",
            Self::Revealed(Count(0)) => "empty",
            Self::Revealed(Count(_)) => "number",
        }
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
