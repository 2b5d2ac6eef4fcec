use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::GridPos;
use crate::placement;

pub const DEFAULT_GRID_SIZE: u32 = 8;
/// Longest side a board may have.
pub const MAX_GRID_SIZE: u32 = 1024;
pub const DEFAULT_MINE_DENSITY: f64 = 0.175;
pub const DEFAULT_SAFE_ZONE_SIZE: usize = 2;
pub const DEFAULT_FORBIDDEN_RING: u32 = 1;

/// When and how mines are laid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
  /// Exactly `mines` mines, laid uniformly at random when the board is created.
  Eager { mines: u32 },
  /// `round(cells * density)` mines, laid on the first reveal around a mine-free opening.
  Deferred { density: f64 },
}

impl Default for Placement {
  fn default() -> Self {
    Placement::Deferred {
      density: DEFAULT_MINE_DENSITY,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
  pub width: u32,
  pub height: u32,
  pub placement: Placement,
  /// Number of cells guaranteed mine-free and opened by the first reveal.
  pub safe_zone_size: usize,
  /// Rings of neighbours around the safe zone that are also kept free of mines.
  pub forbidden_ring: u32,
}

impl Default for BoardConfig {
  fn default() -> Self {
    Self::square(DEFAULT_GRID_SIZE)
  }
}

impl BoardConfig {
  pub fn eager(width: u32, height: u32, mines: u32) -> Self {
    Self {
      placement: Placement::Eager { mines },
      ..Self::deferred(width, height)
    }
  }

  pub fn deferred(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      placement: Placement::default(),
      safe_zone_size: DEFAULT_SAFE_ZONE_SIZE,
      forbidden_ring: DEFAULT_FORBIDDEN_RING,
    }
  }

  pub fn square(size: u32) -> Self {
    Self::deferred(size, size)
  }

  pub fn with_density(mut self, density: f64) -> Self {
    self.placement = Placement::Deferred { density };
    self
  }

  pub fn with_safe_zone_size(mut self, safe_zone_size: usize) -> Self {
    self.safe_zone_size = safe_zone_size;
    self
  }

  pub fn with_forbidden_ring(mut self, forbidden_ring: u32) -> Self {
    self.forbidden_ring = forbidden_ring;
    self
  }

  pub fn cell_count(&self) -> usize {
    self.width as usize * self.height as usize
  }

  pub fn is_deferred(&self) -> bool {
    matches!(self.placement, Placement::Deferred { .. })
  }

  /// Number of mines the board will carry once armed.
  pub fn mine_count(&self) -> u32 {
    match self.placement {
      Placement::Eager { mines } => mines,
      Placement::Deferred { density } => (self.cell_count() as f64 * density).round() as u32,
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.width == 0 || self.height == 0 {
      return Err(ConfigError::EmptyGrid {
        width: self.width,
        height: self.height,
      });
    }
    if self.width > MAX_GRID_SIZE || self.height > MAX_GRID_SIZE {
      return Err(ConfigError::GridTooLarge {
        width: self.width,
        height: self.height,
        max: MAX_GRID_SIZE,
      });
    }

    let cells = self.cell_count();
    match self.placement {
      Placement::Eager { mines } => {
        if mines as usize >= cells {
          return Err(ConfigError::TooManyMines { mines, cells });
        }
      }
      Placement::Deferred { density } => {
        if !density.is_finite() || !(0.0..1.0).contains(&density) {
          return Err(ConfigError::InvalidDensity(density));
        }
        if self.safe_zone_size == 0 || self.safe_zone_size > cells {
          return Err(ConfigError::SafeZoneUnreachable {
            target: self.safe_zone_size,
            cells,
          });
        }
        let mines = self.mine_count();
        let available = self.most_room_for_mines()?;
        if mines as usize > available {
          return Err(ConfigError::NoRoomForMines { mines, available });
        }
      }
    }

    Ok(())
  }

  /// Free cells left by the smallest opening area, which sits in a corner.
  /// If even that cannot hold the mines, no first reveal can arm the board.
  fn most_room_for_mines(&self) -> Result<usize, ConfigError> {
    let (right, bottom) = (self.width as i32 - 1, self.height as i32 - 1);
    let corners = [
      GridPos::new(0, 0),
      GridPos::new(right, 0),
      GridPos::new(0, bottom),
      GridPos::new(right, bottom),
    ];

    let mut most = 0;
    for anchor in corners {
      let zone = placement::safe_zone(self.width, self.height, anchor, self.safe_zone_size)?;
      let forbidden = placement::forbidden_area(self.width, self.height, &zone, self.forbidden_ring);
      most = most.max(forbidden.iter().filter(|&&f| !f).count());
    }
    Ok(most)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_a_deferred_eight_by_eight() {
    let config = BoardConfig::default();
    assert_eq!((config.width, config.height), (8, 8));
    assert!(config.is_deferred());
    assert_eq!(config.safe_zone_size, 2);
    assert_eq!(config.forbidden_ring, 1);
    assert_eq!(config.mine_count(), 11);
    assert_eq!(config.validate(), Ok(()));
  }

  #[test]
  fn deferred_mine_count_rounds() {
    assert_eq!(BoardConfig::square(6).mine_count(), 6);
    assert_eq!(BoardConfig::square(9).mine_count(), 14);
    assert_eq!(BoardConfig::square(5).mine_count(), 4);
  }

  #[test]
  fn eager_rejects_a_full_board() {
    assert_eq!(
      BoardConfig::eager(3, 3, 9).validate(),
      Err(ConfigError::TooManyMines { mines: 9, cells: 9 })
    );
    assert_eq!(BoardConfig::eager(3, 3, 8).validate(), Ok(()));
  }

  #[test]
  fn empty_grid_is_rejected() {
    assert_eq!(
      BoardConfig::eager(0, 3, 0).validate(),
      Err(ConfigError::EmptyGrid { width: 0, height: 3 })
    );
  }

  #[test]
  fn density_must_be_a_fraction() {
    for density in [-0.1, 1.0, f64::NAN, f64::INFINITY] {
      assert!(matches!(
        BoardConfig::square(8).with_density(density).validate(),
        Err(ConfigError::InvalidDensity(_))
      ));
    }
  }

  #[test]
  fn safe_zone_must_fit() {
    assert_eq!(
      BoardConfig::square(1).validate(),
      Err(ConfigError::SafeZoneUnreachable { target: 2, cells: 1 })
    );
    assert!(matches!(
      BoardConfig::square(4).with_safe_zone_size(0).validate(),
      Err(ConfigError::SafeZoneUnreachable { .. })
    ));
  }

  #[test]
  fn oversized_grid_is_rejected() {
    assert_eq!(
      BoardConfig::eager(MAX_GRID_SIZE + 1, 4, 1).validate(),
      Err(ConfigError::GridTooLarge {
        width: MAX_GRID_SIZE + 1,
        height: 4,
        max: MAX_GRID_SIZE,
      })
    );
    assert!(matches!(
      BoardConfig::square(u32::MAX).validate(),
      Err(ConfigError::GridTooLarge { .. })
    ));
  }

  #[test]
  fn opening_ring_counts_against_room() {
    // Every anchor of a 2x2 board forbids all four cells.
    assert_eq!(
      BoardConfig::square(2).validate(),
      Err(ConfigError::NoRoomForMines { mines: 1, available: 0 })
    );
    // Without the ring a corner opening leaves two cells free.
    assert_eq!(BoardConfig::square(2).with_forbidden_ring(0).validate(), Ok(()));
    assert_eq!(BoardConfig::square(3).validate(), Ok(()));
  }

  #[test]
  fn dense_deferred_board_has_no_room() {
    assert_eq!(
      BoardConfig::deferred(2, 1).with_density(0.9).validate(),
      Err(ConfigError::NoRoomForMines { mines: 2, available: 0 })
    );
  }
}
