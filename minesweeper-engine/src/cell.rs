use core::fmt;

use serde::{Deserialize, Serialize};

/// Visibility of a cell as seen by the player.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CellState {
  #[default]
  Hidden,
  Revealed,
  Flagged,
  Questioned,
}

impl CellState {
  /// Next state of the flag rotation `Hidden -> Flagged -> Questioned -> Hidden`.
  /// Revealed cells stay revealed.
  pub fn cycled(self) -> CellState {
    match self {
      CellState::Hidden => CellState::Flagged,
      CellState::Flagged => CellState::Questioned,
      CellState::Questioned => CellState::Hidden,
      CellState::Revealed => CellState::Revealed,
    }
  }

  pub fn is_revealed(self) -> bool {
    self == CellState::Revealed
  }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Cell {
  has_mine: bool,
  adjacent_mines: u8,
  state: CellState,
}

impl Cell {
  pub(crate) fn armed(has_mine: bool, adjacent_mines: u8) -> Self {
    debug_assert!(adjacent_mines <= 8);
    Cell {
      has_mine,
      adjacent_mines,
      state: CellState::Hidden,
    }
  }

  pub fn has_mine(&self) -> bool {
    self.has_mine
  }

  /// Number of mines in the 8-neighbourhood, clipped to the board.
  pub fn adjacent_mines(&self) -> u8 {
    self.adjacent_mines
  }

  pub fn state(&self) -> CellState {
    self.state
  }

  pub(crate) fn set_state(&mut self, state: CellState) {
    self.state = state;
  }

  pub fn is_revealed(&self) -> bool {
    self.state.is_revealed()
  }

  /// A safe cell with no mined neighbours; revealing it opens its surroundings.
  pub fn is_blank(&self) -> bool {
    !self.has_mine && self.adjacent_mines == 0
  }

  pub fn tile(&self) -> Tile {
    match self.state {
      CellState::Hidden => Tile::Hidden,
      CellState::Flagged => Tile::Flagged,
      CellState::Questioned => Tile::Questioned,
      CellState::Revealed if self.has_mine => Tile::Mine,
      CellState::Revealed => Tile::Number(self.adjacent_mines),
    }
  }
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.tile() {
      Tile::Hidden => write!(f, "░"),
      Tile::Flagged => write!(f, "F"),
      Tile::Questioned => write!(f, "?"),
      Tile::Mine => write!(f, "X"),
      Tile::Number(0) => write!(f, " "),
      Tile::Number(mines) => write!(f, "{}", mines),
    }
  }
}

/// What a renderer should draw for a cell. There are exactly twelve of them.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Tile {
  Hidden,
  Flagged,
  Questioned,
  Mine,
  Number(u8),
}

impl Tile {
  pub const COUNT: u8 = 12;

  /// Position of the tile in a sprite strip laid out as
  /// hidden, flagged, questioned, mine, 0, 1, ..., 8.
  pub fn index(self) -> u8 {
    match self {
      Tile::Hidden => 0,
      Tile::Flagged => 1,
      Tile::Questioned => 2,
      Tile::Mine => 3,
      Tile::Number(mines) => 4 + mines,
    }
  }
}
