/// A board that cannot be built or armed as configured.
///
/// These are start-up misconfigurations: the engine refuses the request before touching any
/// cell, so the board is left exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
  #[error("board must have at least one row and one column, got {width}x{height}")]
  EmptyGrid { width: u32, height: u32 },

  #[error("board sides are limited to {max} cells, got {width}x{height}")]
  GridTooLarge { width: u32, height: u32, max: u32 },

  #[error("{mines} mines do not fit on a board of {cells} cells")]
  TooManyMines { mines: u32, cells: usize },

  #[error("mine density must lie in [0, 1), got {0}")]
  InvalidDensity(f64),

  #[error("a safe zone of {target} cells cannot be reached on a board of {cells} cells")]
  SafeZoneUnreachable { target: usize, cells: usize },

  #[error("{mines} mines do not fit into the {available} cells outside the opening area")]
  NoRoomForMines { mines: u32, available: usize },
}
