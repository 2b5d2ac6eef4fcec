//! Mine layout generation.
//!
//! Layouts are built on scratch grids and only handed to the board once complete, so a
//! placement that fails leaves the board untouched.

use rand::Rng;
use tracing::debug;

use crate::error::ConfigError;
use crate::grid::{Grid, GridPos, GridWalker};

/// Grows a region of `target` cells breadth-first from `anchor` over the 8-neighbourhood.
/// The anchor is always the first element.
pub(crate) fn safe_zone(width: u32, height: u32, anchor: GridPos, target: usize) -> Result<Vec<GridPos>, ConfigError> {
  let unreachable = || ConfigError::SafeZoneUnreachable {
    target,
    cells: width as usize * height as usize,
  };

  let mut walker = GridWalker::new(width, height);
  if target == 0 || !walker.enqueue(anchor) {
    return Err(unreachable());
  }

  let mut zone = vec![anchor];
  while zone.len() < target {
    let pos = walker.pop().ok_or_else(unreachable)?;
    for neighbour in pos.neighbours() {
      if walker.enqueue(neighbour) {
        zone.push(neighbour);
        if zone.len() == target {
          break;
        }
      }
    }
  }

  Ok(zone)
}

/// Marks `zone` plus `rings` further layers of neighbours around it.
pub(crate) fn forbidden_area(width: u32, height: u32, zone: &[GridPos], rings: u32) -> Grid<bool> {
  let mut forbidden = Grid::new(width, height, false);
  let mut frontier = Vec::with_capacity(zone.len());
  for &pos in zone {
    if let Some(cell) = forbidden.get_mut(pos) {
      *cell = true;
      frontier.push(pos);
    }
  }

  for _ in 0..rings {
    let mut next = Vec::new();
    for pos in frontier {
      for neighbour in pos.neighbours() {
        if let Some(cell) = forbidden.get_mut(neighbour) {
          if !*cell {
            *cell = true;
            next.push(neighbour);
          }
        }
      }
    }
    frontier = next;
  }

  forbidden
}

/// Lays `mines` mines by rejection sampling: draw a uniform coordinate, keep it if it is
/// neither forbidden nor already mined, repeat until enough are placed.
///
/// Refuses up front if there are fewer allowed cells than mines, so the loop always ends.
pub(crate) fn scatter_mines<R: Rng + ?Sized>(
  rng: &mut R,
  forbidden: &Grid<bool>,
  mines: u32,
) -> Result<Grid<bool>, ConfigError> {
  let available = forbidden.iter().filter(|&&f| !f).count();
  if mines as usize > available {
    return Err(ConfigError::NoRoomForMines { mines, available });
  }

  let (width, height) = (forbidden.width(), forbidden.height());
  let mut layout = Grid::new(width, height, false);
  let mut placed = 0;
  let mut draws = 0u64;
  while placed < mines {
    draws += 1;
    let pos = GridPos::new(rng.gen_range(0..width) as i32, rng.gen_range(0..height) as i32);
    if forbidden[pos] || layout[pos] {
      continue;
    }
    layout[pos] = true;
    placed += 1;
  }

  debug!(mines, available, draws, "scattered mines");
  Ok(layout)
}

/// For every cell, the number of mined cells among its in-bounds neighbours.
pub(crate) fn adjacent_counts(mines: &Grid<bool>) -> Grid<u8> {
  let mut counts = Grid::new(mines.width(), mines.height(), 0u8);
  for (pos, &is_mine) in mines.enumerate() {
    if is_mine {
      for neighbour in pos.neighbours() {
        if let Some(count) = counts.get_mut(neighbour) {
          *count += 1;
        }
      }
    }
  }
  counts
}
