//! Fixtures shared by the unit tests.

use alloc::rc::Rc;
use alloc::vec;
use chrono::{DateTime, Utc};
use core::cell::Cell;
use sweepview_protocol::GameState;

use crate::MINE_SENTINEL;

pub(crate) fn state(rows: &[&str], game_over: bool, win: bool) -> GameState {
    // '.' hidden, 'F' flagged, '*' revealed mine, digit revealed count
    let cols = rows.first().map_or(0, |row| row.len());
    let mut revealed = vec![vec![false; cols]; rows.len()];
    let mut flagged = vec![vec![false; cols]; rows.len()];
    let mut values = vec![vec![None; cols]; rows.len()];
    for (r, row) in rows.iter().enumerate() {
        for (c, ch) in row.chars().enumerate() {
            match ch {
                '.' => {}
                'F' => flagged[r][c] = true,
                '*' => {
                    revealed[r][c] = true;
                    values[r][c] = Some(MINE_SENTINEL);
                }
                digit => {
                    revealed[r][c] = true;
                    values[r][c] = digit.to_digit(10).map(|d| d as i8);
                }
            }
        }
    }
    GameState {
        rows: rows.len() as u16,
        cols: cols as u16,
        revealed,
        flagged,
        values,
        game_over,
        win,
    }
}

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
}

/// Stand-in timer handle that tracks how many instances are alive.
pub(crate) struct LiveHandle(Rc<Cell<u32>>);

impl LiveHandle {
    pub(crate) fn new(live: &Rc<Cell<u32>>) -> Self {
        live.set(live.get() + 1);
        Self(live.clone())
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}
