//! The tile grid that flow fields are generated across.
//!
//! A grid is `width` columns by `height` rows. Cells are addressed by
//! `(column, row)` with `(0, 0)` in the south-west corner, rows growing
//! towards the north. Internally every per-cell array is flattened row-major
//! so a cell lives at index `column + row * width`:
//!
//! ```text
//!        column 0   1   2   3
//!  row 2  |  8 |  9 | 10 | 11 |
//!  row 1  |  4 |  5 |  6 |  7 |
//!  row 0  |  0 |  1 |  2 |  3 |
//! ```
//!

pub mod grid_store;

use crate::prelude::*;
use bevy::prelude::Reflect;

/// ID of a cell within the grid, `(column, row)`.
///
/// Signed so that stepping off the edge of the grid produces a cell that is
/// simply reported as out of bounds (and therefore a wall)
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridCell((i32, i32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: i32, row: i32) -> Self {
		GridCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get(&self) -> (i32, i32) {
		self.0
	}
	/// Get the column, the `x` coordinate
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the row, the `y` coordinate
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// The cell reached by taking one step in the direction of `ordinal`
	pub fn neighbour(&self, ordinal: Ordinal) -> GridCell {
		let (dx, dy) = ordinal.offset();
		GridCell::new(self.get_column() + dx, self.get_row() + dy)
	}
	/// For a diagonal step find the two orthogonal cells the step squeezes
	/// between, i.e moving north-east from `o`:
	///
	/// ```text
	///  B ~
	///  o A
	/// ```
	///
	/// `A` shares the row of `o` and `B` shares its column. Orthogonal steps
	/// have no shoulders and return [None]
	pub fn shoulders(&self, ordinal: Ordinal) -> Option<(GridCell, GridCell)> {
		if !ordinal.is_diagonal() {
			return None;
		}
		let (dx, dy) = ordinal.offset();
		Some((
			GridCell::new(self.get_column() + dx, self.get_row()),
			GridCell::new(self.get_column(), self.get_row() + dy),
		))
	}
}

impl From<(i32, i32)> for GridCell {
	fn from(value: (i32, i32)) -> Self {
		GridCell(value)
	}
}

/// An opaque terrain kind, such as road or forest. What each category means
/// is up to the game, the generator only ever compares them for equality
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct TerrainCategory(u8);

impl TerrainCategory {
	/// Create a new instance of [TerrainCategory]
	pub fn new(id: u8) -> Self {
		TerrainCategory(id)
	}
	/// Get the raw category id
	pub fn get(&self) -> u8 {
		self.0
	}
}

/// A single cell of terrain
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
	/// Cost of moving into this tile, [MAX_COST] marks a wall
	move_cost: u8,
	/// The kind of terrain, compared against the preference of a field
	terrain: TerrainCategory,
	/// Informational for the game, the generator ignores it
	is_resource_spawner: bool,
}

impl Default for Tile {
	fn default() -> Self {
		Tile {
			move_cost: DEFAULT_MOVE_COST,
			terrain: TerrainCategory::default(),
			is_resource_spawner: false,
		}
	}
}

impl Tile {
	/// Create a new instance of [Tile]
	pub fn new(move_cost: u8, terrain: TerrainCategory, is_resource_spawner: bool) -> Self {
		Tile {
			move_cost,
			terrain,
			is_resource_spawner,
		}
	}
	/// An impassable [Tile]
	pub fn wall() -> Self {
		Tile {
			move_cost: MAX_COST,
			..Default::default()
		}
	}
	/// A default category [Tile] with the given movement cost
	pub fn with_cost(move_cost: u8) -> Self {
		Tile {
			move_cost,
			..Default::default()
		}
	}
	pub fn get_move_cost(&self) -> u8 {
		self.move_cost
	}
	pub fn set_move_cost(&mut self, move_cost: u8) {
		self.move_cost = move_cost;
	}
	pub fn get_terrain(&self) -> TerrainCategory {
		self.terrain
	}
	pub fn set_terrain(&mut self, terrain: TerrainCategory) {
		self.terrain = terrain;
	}
	pub fn is_resource_spawner(&self) -> bool {
		self.is_resource_spawner
	}
	/// Whether the tile can never be entered
	pub fn is_wall(&self) -> bool {
		self.move_cost == MAX_COST
	}
}
