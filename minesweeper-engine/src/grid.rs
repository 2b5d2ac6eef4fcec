use core::fmt;
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

/// `(dx, dy)` of the 8-neighbourhood, in reading order.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// A grid coordinate. Origin is the top-left cell, `x` grows to the right and `y` downwards.
///
/// Components are signed so that stepping off the edge yields a position that
/// [`Grid::contains`] rejects instead of wrapping around.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
  pub x: i32,
  pub y: i32,
}

impl GridPos {
  pub const fn new(x: i32, y: i32) -> GridPos {
    GridPos { x, y }
  }

  /// Converts unsigned caller coordinates, failing if they do not fit a grid axis.
  pub fn from_unsigned(x: u32, y: u32) -> Option<GridPos> {
    Some(GridPos::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
  }

  /// All eight surrounding positions, including those outside any grid.
  pub fn neighbours(self) -> impl Iterator<Item = GridPos> {
    NEIGHBOUR_OFFSETS
      .iter()
      .map(move |&(dx, dy)| GridPos::new(self.x + dx, self.y + dy))
  }
}

impl fmt::Debug for GridPos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// Fixed-size, row-major rectangle of `T`. Both sides must fit an `i32`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
  width: u32,
  height: u32,
  cells: Vec<T>,
}

impl<T> Grid<T> {
  pub fn new(width: u32, height: u32, default: T) -> Self
  where
    T: Clone,
  {
    Self::from_fn(width, height, |_| default.clone())
  }

  pub fn from_fn(width: u32, height: u32, f: impl FnMut(GridPos) -> T) -> Self {
    assert!(
      i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
      "grid of {}x{} does not fit signed coordinates",
      width,
      height
    );
    let count = width as usize * height as usize;
    let cells = (0..count).map(|i| pos_at(width, i)).map(f).collect();
    Self { width, height, cells }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  fn slot(&self, pos: GridPos) -> Option<usize> {
    let x = u32::try_from(pos.x).ok().filter(|&x| x < self.width)?;
    let y = u32::try_from(pos.y).ok().filter(|&y| y < self.height)?;
    Some(y as usize * self.width as usize + x as usize)
  }

  pub fn contains(&self, pos: GridPos) -> bool {
    self.slot(pos).is_some()
  }

  pub fn get(&self, pos: GridPos) -> Option<&T> {
    self.slot(pos).map(|i| &self.cells[i])
  }

  pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
    self.slot(pos).map(|i| &mut self.cells[i])
  }

  /// The in-bounds part of the 8-neighbourhood of `pos`.
  pub fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
    pos.neighbours().filter(move |&n| self.contains(n))
  }

  pub fn enumerate(&self) -> impl Iterator<Item = (GridPos, &T)> {
    let width = self.width;
    self.cells.iter().enumerate().map(move |(i, v)| (pos_at(width, i), v))
  }

  pub fn enumerate_mut(&mut self) -> impl Iterator<Item = (GridPos, &mut T)> {
    let width = self.width;
    self.cells.iter_mut().enumerate().map(move |(i, v)| (pos_at(width, i), v))
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.cells.iter()
  }

  /// Rows from top to bottom, each a slice of `width` cells.
  pub fn rows(&self) -> impl Iterator<Item = &[T]> {
    self.cells.chunks(self.width.max(1) as usize)
  }
}

/// Position of the `index`-th cell of a row-major grid `width` cells wide.
fn pos_at(width: u32, index: usize) -> GridPos {
  let width = width as usize;
  GridPos::new((index % width) as i32, (index / width) as i32)
}

impl<T> Index<GridPos> for Grid<T> {
  type Output = T;

  fn index(&self, pos: GridPos) -> &Self::Output {
    match self.slot(pos) {
      Some(i) => &self.cells[i],
      None => panic!("{:?} lies outside the {}x{} grid", pos, self.width, self.height),
    }
  }
}

impl<T> IndexMut<GridPos> for Grid<T> {
  fn index_mut(&mut self, pos: GridPos) -> &mut T {
    match self.slot(pos) {
      Some(i) => &mut self.cells[i],
      None => panic!("{:?} lies outside the {}x{} grid", pos, self.width, self.height),
    }
  }
}

/// Breadth-first work queue over a grid. Every in-bounds position is handed out at most once,
/// which bounds any traversal driven by it to one pass over the grid.
pub struct GridWalker {
  queue: VecDeque<GridPos>,
  queued: Grid<bool>,
}

impl GridWalker {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      queue: VecDeque::new(),
      queued: Grid::new(width, height, false),
    }
  }

  /// Queues `pos` unless it is off the grid or was queued before. Returns whether it was queued.
  pub fn enqueue(&mut self, pos: GridPos) -> bool {
    match self.queued.get_mut(pos) {
      Some(queued) if !*queued => {
        *queued = true;
        self.queue.push_back(pos);
        true
      }
      _ => false,
    }
  }

  pub fn enqueue_all(&mut self, all: impl IntoIterator<Item = GridPos>) {
    for pos in all {
      self.enqueue(pos);
    }
  }

  pub fn pop(&mut self) -> Option<GridPos> {
    self.queue.pop_front()
  }
}

impl<T> From<&Grid<T>> for GridWalker {
  fn from(grid: &Grid<T>) -> Self {
    Self::new(grid.width, grid.height)
  }
}
