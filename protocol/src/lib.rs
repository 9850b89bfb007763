//! Wire format spoken between the board client and the game server.
//!
//! Every endpoint is a JSON `POST`; every reply carries a `status` field and only
//! `"ok"` counts as success.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use error::*;

mod error;

pub const STATUS_OK: &str = "ok";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    NewGame,
    Reveal,
    MassReveal,
    Flag,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        use Endpoint::*;
        match self {
            NewGame => "/api/new_game",
            Reveal => "/api/reveal",
            MassReveal => "/api/mass_reveal",
            Flag => "/api/flag",
        }
    }
}

/// In-game actions targeting a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellAction {
    Reveal,
    MassReveal,
    Flag,
}

impl CellAction {
    pub const fn endpoint(self) -> Endpoint {
        match self {
            Self::Reveal => Endpoint::Reveal,
            Self::MassReveal => Endpoint::MassReveal,
            Self::Flag => Endpoint::Flag,
        }
    }
}

/// Body of `/api/new_game`. Values are not range checked by the client, so
/// they may be zero or negative; the server decides what it accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameRequest {
    pub rows: i64,
    pub cols: i64,
    pub mines: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRequest {
    pub row: u16,
    pub col: u16,
}

/// Success body of `/api/new_game`. Servers may echo the accepted parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameReply {
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub cols: Option<u16>,
    #[serde(default)]
    pub mines: Option<i64>,
}

/// Full board state returned by reveal, mass-reveal and flag.
///
/// `values[r][c]` is `-1` for a mine, `0..=8` for a count and `null` while the
/// cell is still covered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub rows: u16,
    pub cols: u16,
    pub revealed: Vec<Vec<bool>>,
    pub flagged: Vec<Vec<bool>>,
    pub values: Vec<Vec<Option<i8>>>,
    pub game_over: bool,
    pub win: bool,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decodes a reply body, turning anything without `status:"ok"` into
/// [`ApiError::Rejected`].
pub fn decode_reply<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let envelope = Envelope::deserialize(&value)?;

    match envelope.status.as_deref() {
        Some(STATUS_OK) => Ok(T::deserialize(value)?),
        status => Err(ApiError::Rejected {
            status: status.map(str::to_owned),
            message: envelope.message,
        }),
    }
}
