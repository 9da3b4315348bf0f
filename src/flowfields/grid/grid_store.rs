//! The [GridStore] owns every [Tile] of the map along with a transient
//! record of how many actors occupy each cell.
//!
//! Occupancy is sampled fresh every simulation tick. Rather than wiping the
//! counters each tick the store keeps an epoch alongside every counter and a
//! single global epoch. A counter only counts when its epoch matches the
//! global one, so advancing the global epoch invalidates every counter at
//! once:
//!
//! ```text
//!  epoch = 7
//!  ____________________________________
//! | count | 2 | 5 | 1 | 3 | 0 | 4 | 1 |
//! | epoch | 7 | 6 | 7 | 2 | 0 | 7 | 5 |
//! | reads | 2 | 0 | 1 | 0 | 0 | 4 | 0 |
//! ```
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Tiles of the map and per-cell occupancy, every array is flattened
/// row-major and indexed by `column + row * width`.
///
/// Only the layout of tiles is serialised, occupancy is transient and a
/// deserialised store starts with none. Deserialising goes through
/// [GridStore::from_tiles] so inconsistent dimensions are rejected
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridLayout", into = "GridLayout"))]
#[derive(Component, Clone, Debug)]
pub struct GridStore {
	/// Number of columns
	width: usize,
	/// Number of rows
	height: usize,
	/// The terrain of each cell
	tiles: Vec<Tile>,
	/// Number of occupants counted in a cell, only meaningful when the
	/// matching entry of `occupant_epochs` equals `epoch`
	occupants: Vec<u32>,
	/// The epoch in which each cell's occupant count was last written
	occupant_epochs: Vec<u64>,
	/// The current sampling epoch
	epoch: u64,
}

/// Serialised form of a [GridStore]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize, serde::Serialize)]
struct GridLayout {
	/// Number of columns
	width: usize,
	/// Number of rows
	height: usize,
	/// Row-major tiles
	tiles: Vec<Tile>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridLayout> for GridStore {
	type Error = FlowFieldError;
	fn try_from(layout: GridLayout) -> Result<Self, Self::Error> {
		GridStore::from_tiles(layout.width, layout.height, layout.tiles)
	}
}

#[cfg(feature = "serde")]
impl From<GridStore> for GridLayout {
	fn from(grid: GridStore) -> Self {
		GridLayout {
			width: grid.width,
			height: grid.height,
			tiles: grid.tiles,
		}
	}
}

impl GridStore {
	/// Create a new instance of [GridStore] where every [Tile] is the default
	/// (movement cost of [DEFAULT_MOVE_COST]).
	///
	/// Panics if either dimension is zero
	pub fn new(width: usize, height: usize) -> Self {
		GridStore::from_fn(width, height, |_| Tile::default())
	}
	/// Create a new instance of [GridStore] from a row-major list of tiles
	pub fn from_tiles(
		width: usize,
		height: usize,
		tiles: Vec<Tile>,
	) -> Result<Self, FlowFieldError> {
		if width == 0 || height == 0 {
			return Err(FlowFieldError::ZeroDimension { width, height });
		}
		if tiles.len() != width * height {
			return Err(FlowFieldError::TileCountMismatch {
				expected: width * height,
				actual: tiles.len(),
			});
		}
		let size = width * height;
		Ok(GridStore {
			width,
			height,
			tiles,
			occupants: vec![0; size],
			occupant_epochs: vec![0; size],
			epoch: 0,
		})
	}
	/// Create a new instance of [GridStore] where each [Tile] is produced by
	/// `f` from its [GridCell]. This is the hook through which a map owner
	/// feeds in terrain from whatever format it stores maps in.
	///
	/// Panics if either dimension is zero
	pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
	where
		F: FnMut(GridCell) -> Tile,
	{
		if width == 0 || height == 0 {
			panic!(
				"Grid dimensions `({}, {})` are invalid, both must be greater than zero",
				width, height
			);
		}
		let size = width * height;
		let mut tiles = Vec::with_capacity(size);
		for row in 0..height {
			for column in 0..width {
				tiles.push(f(GridCell::new(column as i32, row as i32)));
			}
		}
		GridStore {
			width,
			height,
			tiles,
			occupants: vec![0; size],
			occupant_epochs: vec![0; size],
			epoch: 0,
		}
	}
	/// Number of columns
	pub fn get_width(&self) -> usize {
		self.width
	}
	/// Number of rows
	pub fn get_height(&self) -> usize {
		self.height
	}
	/// Total number of cells
	pub fn len(&self) -> usize {
		self.tiles.len()
	}
	/// A grid always has at least one cell
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}
	/// Whether `cell` sits within `[0, width) x [0, height)`
	pub fn in_bounds(&self, cell: GridCell) -> bool {
		cell.get_column() >= 0
			&& cell.get_row() >= 0
			&& (cell.get_column() as usize) < self.width
			&& (cell.get_row() as usize) < self.height
	}
	/// Flattened index of `cell`. Panics if the cell is out of bounds, callers
	/// are expected to check [GridStore::in_bounds] first
	pub fn get_index(&self, cell: GridCell) -> usize {
		if !self.in_bounds(cell) {
			panic!(
				"Cannot index the grid, cell out of bounds. Asked for column {}, row {}, grid width is {}, grid height is {}",
				cell.get_column(),
				cell.get_row(),
				self.width,
				self.height
			)
		}
		cell.get_column() as usize + cell.get_row() as usize * self.width
	}
	/// The [GridCell] stored at a flattened `index`
	pub fn get_cell_from_index(&self, index: usize) -> GridCell {
		GridCell::new((index % self.width) as i32, (index / self.width) as i32)
	}
	/// Iterate over every cell of the grid in row-major order
	pub fn iter_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
		(0..self.len()).map(|i| self.get_cell_from_index(i))
	}
	/// Out of bounds cells are always walls, otherwise a cell is a wall when
	/// its [Tile] has a movement cost of [MAX_COST]
	pub fn is_wall(&self, cell: GridCell) -> bool {
		if !self.in_bounds(cell) {
			return true;
		}
		self.tiles[self.get_index(cell)].is_wall()
	}
	/// A diagonal step from `cell` towards `ordinal` is cutting a corner when
	/// either cell the step squeezes between is a wall:
	///
	/// ```text
	///  X ~ <- blocked diagonal from o
	///  o _
	/// ```
	///
	/// Orthogonal steps never cut corners
	pub fn is_corner_cut(&self, cell: GridCell, ordinal: Ordinal) -> bool {
		match cell.shoulders(ordinal) {
			Some((a, b)) => self.is_wall(a) || self.is_wall(b),
			None => false,
		}
	}
	/// Get a reference to the [Tile] of `cell`, panics if out of bounds
	pub fn get_tile(&self, cell: GridCell) -> &Tile {
		let index = self.get_index(cell);
		&self.tiles[index]
	}
	/// Replace the [Tile] of `cell`, panics if out of bounds
	pub fn set_tile(&mut self, cell: GridCell, tile: Tile) {
		let index = self.get_index(cell);
		self.tiles[index] = tile;
	}
	/// Change only the movement cost of `cell`, panics if out of bounds
	pub fn set_move_cost(&mut self, cell: GridCell, move_cost: u8) {
		let index = self.get_index(cell);
		self.tiles[index].set_move_cost(move_cost);
	}
	/// Get a reference to all tiles, row-major
	pub fn get_tiles(&self) -> &[Tile] {
		&self.tiles
	}
	/// Whether the [Tile] of `cell` spawns resources, panics if out of bounds
	pub fn is_resource_spawner(&self, cell: GridCell) -> bool {
		self.get_tile(cell).is_resource_spawner()
	}
	/// The current sampling epoch
	pub fn get_epoch(&self) -> u64 {
		self.epoch
	}
	/// Whether the occupant count of `cell` was written during the current
	/// epoch. Panics if out of bounds
	pub fn is_current_occupant_epoch(&self, cell: GridCell) -> bool {
		let index = self.get_index(cell);
		self.occupant_epochs[index] == self.epoch
	}
	/// Number of occupants of `cell` counted this epoch, a stale count reads
	/// as zero. Panics if out of bounds
	pub fn get_occupants(&self, cell: GridCell) -> u32 {
		let index = self.get_index(cell);
		if self.occupant_epochs[index] == self.epoch {
			self.occupants[index]
		} else {
			0
		}
	}
	/// Record an occupant of `cell` for the current epoch. The first mark of
	/// an epoch restarts the count at one. Panics if out of bounds
	pub fn mark_occupant(&mut self, cell: GridCell) {
		let index = self.get_index(cell);
		if self.occupant_epochs[index] != self.epoch {
			self.occupant_epochs[index] = self.epoch;
			self.occupants[index] = 1;
		} else {
			self.occupants[index] += 1;
		}
	}
	/// Move to a new sampling epoch, lazily invalidating every occupant count.
	/// Called once per simulation tick before actors register their positions
	pub fn advance_epoch(&mut self) {
		self.epoch += 1;
		trace!("Occupancy epoch advanced to {}", self.epoch);
	}
}
