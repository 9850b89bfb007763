use clap::Args;
use sweepview_core::GameParams;
use yew::prelude::*;

use crate::utils::*;

impl StorageKey for GameParams {
    const KEY: &'static str = "sweepview:params";
}

/// Start-up options, read from the page's URL hash.
#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Prefix prepended to every API path
    #[arg(long, default_value = "")]
    pub api_base: String,

    /// Rows of the first game
    #[arg(long, allow_negative_numbers = true)]
    pub rows: Option<i64>,

    /// Columns of the first game
    #[arg(long, allow_negative_numbers = true)]
    pub cols: Option<i64>,

    /// Mines in the first game
    #[arg(long, allow_negative_numbers = true)]
    pub mines: Option<i64>,
}

impl GameProps {
    /// Hash arguments win over whatever was stored from the last game.
    pub(crate) fn initial_params(&self, stored: GameParams) -> GameParams {
        GameParams {
            rows: self.rows.unwrap_or(stored.rows),
            cols: self.cols.unwrap_or(stored.cols),
            mines: self.mines.unwrap_or(stored.mines),
        }
    }
}
