use core::fmt;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::grid::GridWalker;

pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
mod placement;

pub use cell::{Cell, CellState, Tile};
pub use config::{BoardConfig, Placement};
pub use error::ConfigError;
pub use grid::{Grid, GridPos};

/// Where a game stands. `Won` and `Lost` are terminal.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum GameStatus {
  /// Deferred board waiting for its first reveal; no mines laid yet.
  Uninitialized,
  Active,
  Won,
  Lost,
}

/// A single game of mine clearing: the grid, its mines and everything the player has done to it.
///
/// Callers drive it with [`Board::reveal`] and [`Board::toggle_flag`] and stop sending input
/// once [`Board::has_ended`] reports true.
pub struct Board {
  config: BoardConfig,
  grid: Grid<Cell>,
  mine_count: u32,
  initialized: bool,
  over: bool,
  rng: Box<dyn RngCore>,
}

impl Board {
  /// Builds a board that draws its mines from the thread-local generator.
  pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
    Self::with_rng(config, rand::thread_rng())
  }

  /// Builds a board with a reproducible mine layout.
  pub fn seeded(config: BoardConfig, seed: u64) -> Result<Self, ConfigError> {
    Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
  }

  pub fn with_rng(config: BoardConfig, rng: impl RngCore + 'static) -> Result<Self, ConfigError> {
    config.validate()?;
    info!(
      width = config.width,
      height = config.height,
      mines = config.mine_count(),
      deferred = config.is_deferred(),
      "creating board"
    );

    let mut board = Self {
      grid: Grid::new(config.width, config.height, Cell::default()),
      mine_count: 0,
      initialized: false,
      over: false,
      rng: Box::new(rng),
      config,
    };

    if !board.config.is_deferred() {
      let nothing_forbidden = Grid::new(board.width(), board.height(), false);
      let mines = placement::scatter_mines(&mut board.rng, &nothing_forbidden, board.config.mine_count())?;
      board.arm(&mines);
    }

    Ok(board)
  }

  /// Eager board of `width` x `height` cells carrying exactly `mines` mines.
  pub fn with_mine_count(width: u32, height: u32, mines: u32) -> Result<Self, ConfigError> {
    Self::new(BoardConfig::eager(width, height, mines))
  }

  /// Deferred `size` x `size` board; mines are laid around the first reveal.
  pub fn square(size: u32) -> Result<Self, ConfigError> {
    Self::new(BoardConfig::square(size))
  }

  /// Builds an armed board from an explicit layout, `true` marking a mine.
  pub fn from_layout(mines: &Grid<bool>) -> Result<Self, ConfigError> {
    let count = mines.iter().filter(|&&m| m).count() as u32;
    let config = BoardConfig::eager(mines.width(), mines.height(), count);
    config.validate()?;

    let mut board = Self {
      grid: Grid::new(config.width, config.height, Cell::default()),
      mine_count: 0,
      initialized: false,
      over: false,
      rng: Box::new(rand::thread_rng()),
      config,
    };
    board.arm(mines);
    Ok(board)
  }

  fn arm(&mut self, mines: &Grid<bool>) {
    let counts = placement::adjacent_counts(mines);
    self.grid = Grid::from_fn(mines.width(), mines.height(), |pos| Cell::armed(mines[pos], counts[pos]));
    self.mine_count = mines.iter().filter(|&&m| m).count() as u32;
    self.initialized = true;
  }

  /// Lays the mines of a deferred board around its first reveal and opens the safe zone.
  fn place_mines(&mut self, anchor: GridPos) -> Result<(), ConfigError> {
    let (width, height) = (self.width(), self.height());
    let zone = placement::safe_zone(width, height, anchor, self.config.safe_zone_size)?;
    let forbidden = placement::forbidden_area(width, height, &zone, self.config.forbidden_ring);
    let mines = placement::scatter_mines(&mut self.rng, &forbidden, self.config.mine_count())?;

    // Marks set before the first reveal survive arming.
    let marks: Vec<_> = self.grid.iter().map(|cell| cell.state()).collect();
    self.arm(&mines);
    for ((_, cell), state) in self.grid.enumerate_mut().zip(marks) {
      cell.set_state(state);
    }

    let opened: usize = zone.into_iter().map(|pos| self.flood_reveal(pos)).sum();
    debug!(?anchor, mines = self.mine_count, opened, "armed board on first reveal");
    Ok(())
  }

  fn locate(&self, x: u32, y: u32) -> Option<GridPos> {
    GridPos::from_unsigned(x, y).filter(|&pos| self.grid.contains(pos))
  }

  /// Reveals the cell at `(x, y)`. Returns `Ok(false)` when a mine was hit.
  ///
  /// On a deferred board the first reveal lays the mines, which is the only way this can fail.
  /// Off-board coordinates, flagged and already revealed cells are ignored and report `true`.
  #[instrument(level = "trace", skip(self))]
  pub fn reveal(&mut self, x: u32, y: u32) -> Result<bool, ConfigError> {
    let Some(pos) = self.locate(x, y) else {
      debug!(x, y, "ignoring reveal outside the board");
      return Ok(true);
    };

    if self.has_ended() {
      debug!(?pos, "ignoring reveal on a finished game");
      return Ok(!self.over);
    }

    match self.grid[pos].state() {
      CellState::Revealed | CellState::Flagged => return Ok(true),
      CellState::Hidden | CellState::Questioned => {}
    }

    if !self.initialized {
      self.place_mines(pos)?;
      self.announce_end();
      return Ok(true);
    }

    let cell = &mut self.grid[pos];
    if cell.has_mine() {
      cell.set_state(CellState::Revealed);
      self.over = true;
      info!(?pos, "mine revealed, game lost");
      return Ok(false);
    }

    self.flood_reveal(pos);
    self.announce_end();
    Ok(true)
  }

  /// Opens `start` and, through every blank cell reached, its hidden neighbours.
  /// Flagged and questioned neighbours stop the spread. Returns the number of cells opened.
  fn flood_reveal(&mut self, start: GridPos) -> usize {
    let mut walker = GridWalker::from(&self.grid);
    walker.enqueue(start);

    let mut opened = 0;
    while let Some(pos) = walker.pop() {
      let cell = &mut self.grid[pos];
      let openable = match cell.state() {
        CellState::Hidden => true,
        CellState::Questioned => pos == start,
        CellState::Revealed | CellState::Flagged => false,
      };
      if !openable || cell.has_mine() {
        continue;
      }

      cell.set_state(CellState::Revealed);
      opened += 1;
      if cell.is_blank() {
        let hidden: Vec<_> = self
          .grid
          .neighbours(pos)
          .filter(|&n| self.grid[n].state() == CellState::Hidden)
          .collect();
        walker.enqueue_all(hidden);
      }
    }

    opened
  }

  fn announce_end(&self) {
    if self.check_win() {
      info!(mines = self.mine_count, "all safe cells revealed, game won");
    }
  }

  /// Rotates the mark on a covered cell: hidden, flagged, questioned, hidden.
  #[instrument(level = "trace", skip(self))]
  pub fn toggle_flag(&mut self, x: u32, y: u32) {
    let Some(pos) = self.locate(x, y) else {
      debug!(x, y, "ignoring flag outside the board");
      return;
    };

    if self.has_ended() {
      debug!(?pos, "ignoring flag on a finished game");
      return;
    }

    let cell = &mut self.grid[pos];
    if cell.is_revealed() {
      debug!(?pos, "ignoring flag on a revealed cell");
      return;
    }

    let next = cell.state().cycled();
    debug!(?pos, from = ?cell.state(), to = ?next, "cell mark changed");
    cell.set_state(next);
  }

  /// Flips every mine face up. Only has an effect once the game is lost.
  pub fn reveal_mines(&mut self) {
    if !self.over {
      return;
    }
    for (_, cell) in self.grid.enumerate_mut() {
      if cell.has_mine() {
        cell.set_state(CellState::Revealed);
      }
    }
  }

  /// True once every safe cell is revealed. Mines need not be flagged.
  pub fn check_win(&self) -> bool {
    if !self.initialized {
      return false;
    }
    let revealed = self.grid.iter().filter(|c| !c.has_mine() && c.is_revealed()).count();
    revealed == self.grid.cell_count() - self.mine_count as usize
  }

  /// True once a mine has been revealed.
  pub fn is_over(&self) -> bool {
    self.over
  }

  pub fn has_ended(&self) -> bool {
    self.is_over() || self.check_win()
  }

  pub fn status(&self) -> GameStatus {
    if !self.initialized {
      GameStatus::Uninitialized
    } else if self.over {
      GameStatus::Lost
    } else if self.check_win() {
      GameStatus::Won
    } else {
      GameStatus::Active
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn config(&self) -> &BoardConfig {
    &self.config
  }

  pub fn width(&self) -> u32 {
    self.grid.width()
  }

  pub fn height(&self) -> u32 {
    self.grid.height()
  }

  /// Mines on the board; zero until a deferred board is armed.
  pub fn mine_count(&self) -> u32 {
    self.mine_count
  }

  pub fn grid(&self) -> &Grid<Cell> {
    &self.grid
  }

  pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
    self.locate(x, y).map(|pos| &self.grid[pos])
  }

  pub fn flag_count(&self) -> u32 {
    self.grid.iter().filter(|c| c.state() == CellState::Flagged).count() as u32
  }

  /// Mine counter as shown to the player: mines minus flags, never below zero.
  pub fn mines_remaining(&self) -> u32 {
    self.mine_count.saturating_sub(self.flag_count())
  }
}

impl fmt::Debug for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "Board {}x{}, {} mines, {:?}",
      self.width(),
      self.height(),
      self.mine_count,
      self.status()
    )?;
    for row in self.grid.rows() {
      for cell in row {
        write!(f, "{}", cell)?;
      }
      writeln!(f)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn layout(rows: &[&str]) -> Grid<bool> {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.len()) as u32;
    Grid::from_fn(width, height, |pos| rows[pos.y as usize].as_bytes()[pos.x as usize] == b'*')
  }

  #[test]
  fn revealing_a_mine_loses() {
    let mut board = Board::from_layout(&layout(&["*.", ".."])).unwrap();
    assert_eq!(board.reveal(0, 0), Ok(false));
    assert!(board.is_over());
    assert!(board.has_ended());
    assert_eq!(board.status(), GameStatus::Lost);
    assert_eq!(board.cell(0, 0).unwrap().tile(), Tile::Mine);
  }

  #[test]
  fn finished_game_ignores_input() {
    let mut board = Board::from_layout(&layout(&["*.", ".."])).unwrap();
    board.reveal(0, 0).unwrap();
    assert_eq!(board.reveal(1, 1), Ok(false));
    board.toggle_flag(1, 0);
    assert_eq!(board.cell(1, 1).unwrap().state(), CellState::Hidden);
    assert_eq!(board.cell(1, 0).unwrap().state(), CellState::Hidden);
  }

  #[test]
  fn questioned_cell_can_be_revealed() {
    let mut board = Board::from_layout(&layout(&["*..", "...", "..."])).unwrap();
    board.toggle_flag(2, 2);
    board.toggle_flag(2, 2);
    assert_eq!(board.cell(2, 2).unwrap().state(), CellState::Questioned);
    assert_eq!(board.reveal(2, 2), Ok(true));
    assert!(board.cell(2, 2).unwrap().is_revealed());
    // (2, 2) is blank, so the region opens up to the numbers around the mine.
    assert!(board.check_win());
  }

  #[test]
  fn flood_fill_stops_at_marked_cells() {
    let mut board = Board::from_layout(&layout(&["....*", ".....", "....."])).unwrap();
    board.toggle_flag(1, 1);
    board.toggle_flag(2, 1);
    board.toggle_flag(2, 1);
    board.reveal(0, 0).unwrap();
    assert_eq!(board.cell(1, 1).unwrap().state(), CellState::Flagged);
    assert_eq!(board.cell(2, 1).unwrap().state(), CellState::Questioned);
    assert!(board.cell(2, 2).unwrap().is_revealed());
  }

  #[test]
  fn mines_remaining_counts_flags() {
    let mut board = Board::from_layout(&layout(&["*.", ".*"])).unwrap();
    assert_eq!(board.mines_remaining(), 2);
    board.toggle_flag(0, 0);
    board.toggle_flag(1, 0);
    board.toggle_flag(0, 1);
    assert_eq!(board.flag_count(), 3);
    assert_eq!(board.mines_remaining(), 0);
  }

  #[test]
  fn reveal_mines_only_after_a_loss() {
    let mut board = Board::from_layout(&layout(&["*.", ".*"])).unwrap();
    board.reveal_mines();
    assert!(!board.cell(1, 1).unwrap().is_revealed());
    board.reveal(0, 0).unwrap();
    board.reveal_mines();
    assert!(board.cell(1, 1).unwrap().is_revealed());
    assert!(!board.cell(1, 0).unwrap().is_revealed());
  }

  #[test]
  fn deferred_board_is_uninitialized_until_first_reveal() {
    let mut board = Board::seeded(BoardConfig::square(8), 3).unwrap();
    assert_eq!(board.status(), GameStatus::Uninitialized);
    assert_eq!(board.mine_count(), 0);
    assert!(!board.check_win());
    assert_eq!(board.reveal(4, 4), Ok(true));
    assert!(board.is_initialized());
    assert_eq!(board.mine_count(), 11);
    assert_eq!(board.cell(4, 4).unwrap().adjacent_mines(), 0);
  }

  #[test]
  fn flagged_first_click_does_not_arm() {
    let mut board = Board::seeded(BoardConfig::square(6), 9).unwrap();
    board.toggle_flag(0, 0);
    assert_eq!(board.reveal(0, 0), Ok(true));
    assert!(!board.is_initialized());
  }

  #[test]
  fn debug_prints_the_grid() {
    let mut board = Board::from_layout(&layout(&["*.", ".."])).unwrap();
    board.toggle_flag(0, 0);
    board.reveal(1, 1).unwrap();
    let text = format!("{:?}", board);
    assert!(text.contains("F░\n░1\n"));
  }
}
