//! Client-side state for a server-driven Minesweeper board.
//!
//! The server owns the game; this crate mirrors the last state it reported,
//! turns gestures into requests and keeps the elapsed-time clock.

#![no_std]

extern crate alloc;

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use controller::*;
pub use error::*;
pub use snapshot::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod controller;
mod error;
mod snapshot;
mod types;

#[cfg(test)]
mod testing;
