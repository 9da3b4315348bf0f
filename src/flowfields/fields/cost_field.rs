//! The CostField holds, for every cell of the grid, the cheapest accumulated
//! movement cost of travelling from that cell to the nearest target.
//!
//! When a field needs calculating every cell is reset to `f32::INFINITY` and
//! the target cells are set to `0`. A series of passes are then performed
//! outwards from the targets as an expanding wavefront:
//!
//! 1. For every cell in the frontier look at its 8 neighbours in [MOVE_ORDER]
//! 2. Ignore neighbours that are walls (or off the grid) and diagonal
//!    neighbours that would cut the corner of a wall
//! 3. The cost of stepping into a neighbour is its [Tile] movement cost, plus
//!    a penalty for each actor currently occupying it, discounted if its
//!    terrain matches the preference of the field, scaled by the length of
//!    the step (`1` orthogonally, `√2` diagonally)
//! 4. If that plus the cost of the current cell beats the neighbour's value
//!    then the neighbour is updated and queued for the next pass
//! 5. Repeat until a pass improves nothing
//!
//! For a uniform grid of movement cost `1` and a target at `T` this produces:
//!
//! ```text
//!  _______________________________
//! |     |     |     |     |     |
//! | 2.8 | 2.4 |  2  | 2.4 | 2.8 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! | 2.4 | 1.4 |  1  | 1.4 | 2.4 |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  2  |  1  |  T  |  1  |  2  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Unlike a Dijkstra search ordered by a priority queue a cell may be
//! relaxed many times as cheaper routes reach it in later passes. The result
//! converges to the same shortest costs, the trade-off is extra passes on
//! large open grids in exchange for no heap bookkeeping. Cells no target can
//! reach keep `f32::INFINITY`.
//!

use std::sync::atomic::{AtomicU32, Ordering};

use super::field_index;
use crate::prelude::*;
use bevy::prelude::*;
use rayon::prelude::*;

/// Per-cell cheapest accumulated cost to the nearest target
#[derive(Clone, Debug, PartialEq)]
pub struct CostField {
	/// Number of columns
	width: usize,
	/// Number of rows
	height: usize,
	/// Row-major costs, `f32::INFINITY` where unreachable
	costs: Vec<f32>,
}

impl Field<f32> for CostField {
	fn get(&self) -> &[f32] {
		&self.costs
	}
	fn get_width(&self) -> usize {
		self.width
	}
	fn get_height(&self) -> usize {
		self.height
	}
	fn get_field_cell_value(&self, cell: GridCell) -> f32 {
		self.costs[field_index("CostField", self.width, self.height, cell)]
	}
	fn set_field_cell_value(&mut self, value: f32, cell: GridCell) {
		let index = field_index("CostField", self.width, self.height, cell);
		self.costs[index] = value;
	}
}

/// Bookkeeping from a single propagation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationStats {
	/// Number of wavefront passes performed
	pub passes: usize,
	/// Number of times a cell's cost was lowered
	pub relaxations: usize,
}

impl CostField {
	/// Creates a new [CostField] where every cell is unreachable
	pub fn new(width: usize, height: usize) -> Self {
		CostField {
			width,
			height,
			costs: vec![f32::INFINITY; width * height],
		}
	}
	/// Reset every cell to `f32::INFINITY` apart from the `targets` which are
	/// set to `0`. The field is resized if the grid dimensions have changed
	pub fn reset(&mut self, width: usize, height: usize, targets: &[GridCell]) {
		self.width = width;
		self.height = height;
		self.costs.clear();
		self.costs.resize(width * height, f32::INFINITY);
		for target in targets {
			self.set_field_cell_value(0.0, *target);
		}
	}
	/// Whether any target can be reached from `cell`
	pub fn is_reachable(&self, cell: GridCell) -> bool {
		self.get_field_cell_value(cell).is_finite()
	}
	/// Propagate costs outwards from `targets` across the `grid`, see the
	/// module docs for the rules. Expects the field to have been
	/// [CostField::reset] with the same targets
	pub fn calculate(
		&mut self,
		grid: &GridStore,
		targets: &[GridCell],
		preference: Option<TerrainCategory>,
		weights: &GenerationWeights,
		frontier: &mut Frontier,
	) -> PropagationStats {
		let mut stats = PropagationStats::default();
		frontier.seed(targets);
		while !frontier.is_exhausted() {
			stats.passes += 1;
			let Frontier { current, next } = &mut *frontier;
			for cell in current.iter() {
				let existing_cost = self.costs[grid.get_index(*cell)];
				for ordinal in MOVE_ORDER {
					let Some(neighbour) = steppable_neighbour(grid, *cell, ordinal) else {
						continue;
					};
					let cost = step_cost(grid, neighbour, ordinal, preference, weights)
						+ existing_cost;
					let neighbour_index = grid.get_index(neighbour);
					if cost < self.costs[neighbour_index] {
						self.costs[neighbour_index] = cost;
						next.push(neighbour);
						stats.relaxations += 1;
					}
				}
			}
			trace!("Pass {} queued {} cells", stats.passes, next.len());
			frontier.swap();
		}
		stats
	}
	/// Propagate costs the same way as [CostField::calculate] but relax the
	/// cells of each pass across the rayon thread pool.
	///
	/// Costs are never negative so their `f32` bit patterns order the same
	/// way as the values themselves, which lets each cell live in an
	/// [AtomicU32] lowered with `fetch_min`. A pass only completes once every
	/// thread has finished, the improved cells are then gathered into the
	/// next pass. The converged field is identical to the sequential one
	pub fn calculate_parallel(
		&mut self,
		grid: &GridStore,
		targets: &[GridCell],
		preference: Option<TerrainCategory>,
		weights: &GenerationWeights,
		frontier: &mut Frontier,
	) -> PropagationStats {
		let mut stats = PropagationStats::default();
		let atomic_costs: Vec<AtomicU32> = self
			.costs
			.iter()
			.map(|c| AtomicU32::new(c.to_bits()))
			.collect();
		let shared_costs = &atomic_costs;
		frontier.seed(targets);
		while !frontier.is_exhausted() {
			stats.passes += 1;
			let Frontier { current, next } = &mut *frontier;
			next.par_extend(current.par_iter().flat_map_iter(move |cell| {
				let cell = *cell;
				let existing_cost =
					f32::from_bits(shared_costs[grid.get_index(cell)].load(Ordering::Relaxed));
				MOVE_ORDER.into_iter().filter_map(move |ordinal| {
					let neighbour = steppable_neighbour(grid, cell, ordinal)?;
					let cost =
						step_cost(grid, neighbour, ordinal, preference, weights) + existing_cost;
					let previous = shared_costs[grid.get_index(neighbour)]
						.fetch_min(cost.to_bits(), Ordering::Relaxed);
					(cost.to_bits() < previous).then_some(neighbour)
				})
			}));
			stats.relaxations += next.len();
			trace!("Pass {} queued {} cells", stats.passes, next.len());
			frontier.swap();
		}
		for (cost, atomic) in self.costs.iter_mut().zip(atomic_costs) {
			*cost = f32::from_bits(atomic.into_inner());
		}
		stats
	}
}

/// The neighbour of `cell` towards `ordinal` if it can be stepped into, i.e
/// it's on the grid, it isn't a wall and the step doesn't cut a corner
fn steppable_neighbour(grid: &GridStore, cell: GridCell, ordinal: Ordinal) -> Option<GridCell> {
	let neighbour = cell.neighbour(ordinal);
	if !grid.in_bounds(neighbour) || grid.is_wall(neighbour) || grid.is_corner_cut(cell, ordinal)
	{
		return None;
	}
	Some(neighbour)
}

/// Cost of stepping into `neighbour` via `ordinal`
fn step_cost(
	grid: &GridStore,
	neighbour: GridCell,
	ordinal: Ordinal,
	preference: Option<TerrainCategory>,
	weights: &GenerationWeights,
) -> f32 {
	let tile = grid.get_tile(neighbour);
	let mut move_cost = tile.get_move_cost() as f32;
	let occupants = grid.get_occupants(neighbour);
	if occupants > 0 {
		move_cost += occupants as f32 * weights.get_congestion_penalty();
	}
	if preference == Some(tile.get_terrain()) {
		move_cost *= weights.get_terrain_discount();
	}
	move_cost * ordinal.step_length()
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;

	/// Helper running a sequential propagation
	fn propagate(
		grid: &GridStore,
		targets: &[GridCell],
		preference: Option<TerrainCategory>,
	) -> (CostField, PropagationStats) {
		let mut field = CostField::new(grid.get_width(), grid.get_height());
		field.reset(grid.get_width(), grid.get_height(), targets);
		let mut frontier = Frontier::default();
		let stats = field.calculate(
			grid,
			targets,
			preference,
			&GenerationWeights::default(),
			&mut frontier,
		);
		(field, stats)
	}

	#[test]
	fn reset_marks_targets() {
		let mut field = CostField::new(3, 3);
		field.reset(3, 3, &[GridCell::new(1, 1)]);
		assert_eq!(0.0, field.get_field_cell_value(GridCell::new(1, 1)));
		assert_eq!(f32::INFINITY, field.get_field_cell_value(GridCell::new(0, 0)));
	}
	#[test]
	fn reset_resizes() {
		let mut field = CostField::new(3, 3);
		field.reset(5, 2, &[GridCell::new(4, 1)]);
		assert_eq!(10, field.get().len());
		assert_eq!(0.0, field.get_field_cell_value(GridCell::new(4, 1)));
	}
	#[test]
	fn uniform_field() {
		let grid = GridStore::new(5, 3);
		let (field, _) = propagate(&grid, &[GridCell::new(2, 0)], None);
		let sqrt_2 = std::f32::consts::SQRT_2;
		let actual = [
			2.0, 1.0, 0.0, 1.0, 2.0,
			1.0 + sqrt_2, sqrt_2, 1.0, sqrt_2, 1.0 + sqrt_2,
			2.0 * sqrt_2, 1.0 + sqrt_2, 2.0, 1.0 + sqrt_2, 2.0 * sqrt_2,
		];
		for (i, (a, r)) in actual.iter().zip(field.get()).enumerate() {
			assert!((a - r).abs() < 1e-5, "index {} expected {} got {}", i, a, r);
		}
	}
	#[test]
	fn walls_are_unreachable() {
		//  __________
		// |__|X_|__|
		// |T_|X_|__|
		// |__|X_|__|
		let mut grid = GridStore::new(3, 3);
		for row in 0..3 {
			grid.set_tile(GridCell::new(1, row), Tile::wall());
		}
		let (field, _) = propagate(&grid, &[GridCell::new(0, 1)], None);
		for row in 0..3 {
			assert!(!field.is_reachable(GridCell::new(1, row)));
			assert!(!field.is_reachable(GridCell::new(2, row)));
			assert!(field.is_reachable(GridCell::new(0, row)));
		}
	}
	#[test]
	fn blocked_corner_forces_detour() {
		//  __________
		// |__|__|__|
		// |X_|__|__|
		// |T_|X_|__|
		// both shoulders of the diagonal to (1, 1) are walls and they are the
		// only ways out of (0, 0), so nothing beyond the target is reachable
		let mut grid = GridStore::new(3, 3);
		grid.set_tile(GridCell::new(1, 0), Tile::wall());
		grid.set_tile(GridCell::new(0, 1), Tile::wall());
		let (field, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		assert!(!field.is_reachable(GridCell::new(1, 1)));
		assert!(!field.is_reachable(GridCell::new(2, 2)));
	}
	#[test]
	fn single_wall_shoulder_blocks_diagonal() {
		//  __________
		// |__|__|__|
		// |X_|__|__|
		// |T_|__|__|
		let mut grid = GridStore::new(3, 3);
		grid.set_tile(GridCell::new(0, 1), Tile::wall());
		let (field, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		// must go east then north rather than diagonally
		assert_eq!(2.0, field.get_field_cell_value(GridCell::new(1, 1)));
	}
	#[test]
	fn movement_cost_accumulates() {
		let grid = GridStore::from_fn(4, 1, |cell| Tile::with_cost(cell.get_column() as u8 + 1));
		let (field, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		let actual = [0.0, 2.0, 5.0, 9.0];
		assert_eq!(actual.as_slice(), field.get());
	}
	#[test]
	fn congestion_penalty_per_occupant() {
		let mut grid = GridStore::new(3, 1);
		grid.advance_epoch();
		grid.mark_occupant(GridCell::new(1, 0));
		grid.mark_occupant(GridCell::new(1, 0));
		let (field, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		// 1 + 2 * 0.5 then 1
		assert_eq!([0.0, 2.0, 3.0].as_slice(), field.get());
	}
	#[test]
	fn stale_occupants_cost_nothing() {
		let mut grid = GridStore::new(3, 1);
		grid.advance_epoch();
		grid.mark_occupant(GridCell::new(1, 0));
		grid.advance_epoch();
		let (field, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		assert_eq!([0.0, 1.0, 2.0].as_slice(), field.get());
	}
	#[test]
	fn preferred_terrain_discount() {
		let road = TerrainCategory::new(3);
		let grid = GridStore::from_fn(3, 1, |cell| {
			if cell.get_column() == 1 {
				Tile::new(10, road, false)
			} else {
				Tile::with_cost(10)
			}
		});
		let (preferred, _) = propagate(&grid, &[GridCell::new(0, 0)], Some(road));
		let (unpreferred, _) = propagate(&grid, &[GridCell::new(0, 0)], None);
		let (mismatch, _) =
			propagate(&grid, &[GridCell::new(0, 0)], Some(TerrainCategory::new(4)));
		let discounted = preferred.get_field_cell_value(GridCell::new(1, 0));
		assert!((3.0 - discounted).abs() < 1e-5, "got {}", discounted);
		let beyond = preferred.get_field_cell_value(GridCell::new(2, 0));
		assert!((13.0 - beyond).abs() < 1e-5, "got {}", beyond);
		assert_eq!(10.0, unpreferred.get_field_cell_value(GridCell::new(1, 0)));
		assert_eq!(10.0, mismatch.get_field_cell_value(GridCell::new(1, 0)));
	}
	#[test]
	fn cheaper_route_revisits_cells() {
		//  ______________
		// |__|__|__|__|
		// |T_|9_|9_|__|
		// the row above is cheap so the first expensive estimates get replaced
		let grid = GridStore::from_fn(4, 2, |cell| {
			if cell.get_row() == 0 && (cell.get_column() == 1 || cell.get_column() == 2) {
				Tile::with_cost(9)
			} else {
				Tile::default()
			}
		});
		let (field, stats) = propagate(&grid, &[GridCell::new(0, 0)], None);
		let sqrt_2 = std::f32::consts::SQRT_2;
		// (3, 0) is best reached along the top row and a final diagonal step
		let expected = sqrt_2 + 1.0 + sqrt_2;
		let result = field.get_field_cell_value(GridCell::new(3, 0));
		assert!((expected - result).abs() < 1e-5, "got {}", result);
		assert!(stats.relaxations > grid.len() - 1);
	}
	#[test]
	fn terminates_with_empty_pass() {
		let grid = GridStore::new(1, 1);
		let (field, stats) = propagate(&grid, &[GridCell::new(0, 0)], None);
		assert_eq!([0.0].as_slice(), field.get());
		assert_eq!(PropagationStats { passes: 1, relaxations: 0 }, stats);
	}
	#[test]
	fn parallel_matches_sequential() {
		//  ________________
		// |__|__|__|X_|__|
		// |__|X_|__|X_|__|
		// |__|X_|__|__|__|
		// |T_|X_|5_|X_|T_|
		let mut grid = GridStore::new(5, 4);
		for cell in [(1, 0), (1, 1), (1, 2), (3, 0), (3, 2), (3, 3)] {
			grid.set_tile(GridCell::from(cell), Tile::wall());
		}
		grid.set_move_cost(GridCell::new(2, 0), 5);
		grid.advance_epoch();
		grid.mark_occupant(GridCell::new(2, 1));
		let targets = [GridCell::new(0, 0), GridCell::new(4, 0)];
		let (sequential, _) = propagate(&grid, &targets, None);

		let mut parallel = CostField::new(5, 4);
		parallel.reset(5, 4, &targets);
		let mut frontier = Frontier::default();
		parallel.calculate_parallel(
			&grid,
			&targets,
			None,
			&GenerationWeights::default(),
			&mut frontier,
		);
		assert_eq!(sequential, parallel);
	}
}
