//! A [FlowField] is a 2D array of unit vectors. Each vector points from a
//! cell towards whichever of its neighbours has the lowest accumulated cost
//! in the [CostField], so an actor steering along the vector of the cell it
//! stands in descends towards the nearest target.
//!
//! Using the uniform [CostField] from the module docs of
//! [crate::flowfields::fields::cost_field] the vectors become:
//!
//! ```text
//!  _______________________________
//! |     |     |     |     |     |
//! |  ↘  |  ↘  |  ↓  |  ↙  |  ↙  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  ↘  |  ↘  |  ↓  |  ↙  |  ↙  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  →  |  →  |  0  |  ←  |  ←  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Wall cells, targets and any cell without a cheaper neighbour hold the zero
//! vector. Every cell is derived independently of the others so the
//! calculation can be split across threads by row.
//!

use super::field_index;
use crate::prelude::*;
use bevy::prelude::*;
use rayon::prelude::*;

/// Per-cell steering direction towards the nearest target
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
	/// Number of columns
	width: usize,
	/// Number of rows
	height: usize,
	/// Row-major unit vectors, or [Vec2::ZERO]
	vectors: Vec<Vec2>,
}

impl Field<Vec2> for FlowField {
	fn get(&self) -> &[Vec2] {
		&self.vectors
	}
	fn get_width(&self) -> usize {
		self.width
	}
	fn get_height(&self) -> usize {
		self.height
	}
	fn get_field_cell_value(&self, cell: GridCell) -> Vec2 {
		self.vectors[field_index("FlowField", self.width, self.height, cell)]
	}
	fn set_field_cell_value(&mut self, value: Vec2, cell: GridCell) {
		let index = field_index("FlowField", self.width, self.height, cell);
		self.vectors[index] = value;
	}
}

impl FlowField {
	/// Creates a new [FlowField] of zero vectors
	pub fn new(width: usize, height: usize) -> Self {
		FlowField {
			width,
			height,
			vectors: vec![Vec2::ZERO; width * height],
		}
	}
	/// Reset every vector to zero, resizing if the grid dimensions changed
	pub fn reset(&mut self, width: usize, height: usize) {
		self.width = width;
		self.height = height;
		self.vectors.clear();
		self.vectors.resize(width * height, Vec2::ZERO);
	}
	/// The [Ordinal] a cell's vector points towards, [Ordinal::Zero] if it
	/// doesn't point anywhere
	pub fn get_ordinal(&self, cell: GridCell) -> Ordinal {
		Ordinal::from_unit_vector(self.get_field_cell_value(cell))
	}
	/// Derive the vector of every cell from a finished `cost_field`
	pub fn calculate(&mut self, grid: &GridStore, cost_field: &CostField) {
		for (index, vector) in self.vectors.iter_mut().enumerate() {
			*vector = derive_cell(grid, cost_field, grid.get_cell_from_index(index));
		}
	}
	/// Derive vectors the same way as [FlowField::calculate] with each row
	/// handed to the rayon thread pool
	pub fn calculate_parallel(&mut self, grid: &GridStore, cost_field: &CostField) {
		let width = self.width;
		self.vectors
			.par_chunks_mut(width)
			.enumerate()
			.for_each(|(row, vectors)| {
				for (column, vector) in vectors.iter_mut().enumerate() {
					let cell = GridCell::new(column as i32, row as i32);
					*vector = derive_cell(grid, cost_field, cell);
				}
			});
	}
}

/// Steepest descent from `cell`. Among the neighbours that can be stepped
/// towards pick the strictly cheapest one that is also cheaper than `cell`
/// itself, the earliest in [MOVE_ORDER] winning a tie
fn derive_cell(grid: &GridStore, cost_field: &CostField, cell: GridCell) -> Vec2 {
	if grid.is_wall(cell) {
		return Vec2::ZERO;
	}
	let mut best_cost = cost_field.get_field_cell_value(cell);
	let mut best = Ordinal::Zero;
	for ordinal in MOVE_ORDER {
		let neighbour = cell.neighbour(ordinal);
		if !grid.in_bounds(neighbour) || grid.is_corner_cut(cell, ordinal) {
			continue;
		}
		let cost = cost_field.get_field_cell_value(neighbour);
		if cost < best_cost {
			best_cost = cost;
			best = ordinal;
		}
	}
	best.unit_vector()
}
