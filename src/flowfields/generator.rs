//! The [FlowFieldGenerator] ties a [CostField] and [FlowField] to a set of
//! targets and an optional terrain preference.
//!
//! A generator is built against a [GridStore] and generates both fields
//! straight away. Whenever the targets move or the grid changes (tiles edited
//! or a new occupancy epoch sampled) it can be regenerated in place, every
//! run resets both fields first so nothing from a previous run leaks through.
//!
//! The generator never holds onto the grid, each run borrows it immutably for
//! its duration so any number of generators can read the same grid at once.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Owns the fields generated for one set of targets
#[derive(Component, Clone, Debug)]
pub struct FlowFieldGenerator {
	/// Accumulated cost from each cell to the nearest target
	cost_field: CostField,
	/// Steering vector of each cell
	flow_field: FlowField,
	/// Cells the field flows towards
	targets: Vec<GridCell>,
	/// Terrain category that is cheaper to travel across
	preference: Option<TerrainCategory>,
	/// Congestion and terrain factors used during propagation
	weights: GenerationWeights,
	/// Propagation work lists kept between runs
	frontier: Frontier,
	/// Whether runs triggered by the generator itself use the rayon thread pool
	parallel: bool,
}

impl FlowFieldGenerator {
	/// Create a new [FlowFieldGenerator] and generate its fields across
	/// `grid`. Duplicate targets are harmless. Errors if `targets` is empty or
	/// any of them lie outside of the grid
	pub fn new(
		grid: &GridStore,
		targets: Vec<GridCell>,
		preference: Option<TerrainCategory>,
	) -> Result<Self, FlowFieldError> {
		FlowFieldGenerator::new_with_weights(
			grid,
			targets,
			preference,
			GenerationWeights::default(),
			false,
		)
	}
	/// Create a new [FlowFieldGenerator] with custom [GenerationWeights],
	/// generating on the rayon thread pool when `parallel` is set
	pub fn new_with_weights(
		grid: &GridStore,
		targets: Vec<GridCell>,
		preference: Option<TerrainCategory>,
		weights: GenerationWeights,
		parallel: bool,
	) -> Result<Self, FlowFieldError> {
		validate_targets(grid, &targets)?;
		let mut generator = FlowFieldGenerator {
			cost_field: CostField::new(grid.get_width(), grid.get_height()),
			flow_field: FlowField::new(grid.get_width(), grid.get_height()),
			targets,
			preference,
			weights,
			frontier: Frontier::default(),
			parallel,
		};
		generator.regenerate(grid);
		Ok(generator)
	}
	/// Create a new [FlowFieldGenerator] flowing towards a single `target`
	pub fn with_single_target(
		grid: &GridStore,
		target: GridCell,
		preference: Option<TerrainCategory>,
	) -> Result<Self, FlowFieldError> {
		FlowFieldGenerator::new(grid, vec![target], preference)
	}
	/// Replace the [GenerationWeights] and regenerate, on the rayon thread
	/// pool if the generator was created for parallel runs
	pub fn with_weights(mut self, grid: &GridStore, weights: GenerationWeights) -> Self {
		self.weights = weights;
		self.regenerate(grid);
		self
	}
	/// Replace the [GenerationWeights], they apply from the next run
	pub fn set_weights(&mut self, weights: GenerationWeights) {
		self.weights = weights;
	}
	pub fn get_weights(&self) -> &GenerationWeights {
		&self.weights
	}
	/// Whether the generator was created for parallel runs
	pub fn is_parallel(&self) -> bool {
		self.parallel
	}
	/// Run [FlowFieldGenerator::generate] or
	/// [FlowFieldGenerator::generate_parallel] as chosen at construction
	fn regenerate(&mut self, grid: &GridStore) {
		if self.parallel {
			self.generate_parallel(grid);
		} else {
			self.generate(grid);
		}
	}
	/// Reset and recalculate both fields on the current thread
	pub fn generate(&mut self, grid: &GridStore) {
		self.reset(grid);
		let stats = self.cost_field.calculate(
			grid,
			&self.targets,
			self.preference,
			&self.weights,
			&mut self.frontier,
		);
		self.flow_field.calculate(grid, &self.cost_field);
		debug!(
			"Generated flow field for {} target(s) in {} passes with {} relaxations",
			self.targets.len(),
			stats.passes,
			stats.relaxations
		);
	}
	/// Reset and recalculate both fields using the rayon thread pool, the
	/// result is identical to [FlowFieldGenerator::generate]
	pub fn generate_parallel(&mut self, grid: &GridStore) {
		self.reset(grid);
		let stats = self.cost_field.calculate_parallel(
			grid,
			&self.targets,
			self.preference,
			&self.weights,
			&mut self.frontier,
		);
		self.flow_field.calculate_parallel(grid, &self.cost_field);
		debug!(
			"Generated flow field in parallel for {} target(s) in {} passes with {} relaxations",
			self.targets.len(),
			stats.passes,
			stats.relaxations
		);
	}
	/// Empty both fields, sized to the current dimensions of `grid`. Panics if
	/// the grid has shrunk so that a target no longer lies on it
	fn reset(&mut self, grid: &GridStore) {
		let (width, height) = (grid.get_width(), grid.get_height());
		if (width, height) != (self.cost_field.get_width(), self.cost_field.get_height()) {
			trace!("Resizing fields to {}x{}", width, height);
		}
		self.cost_field.reset(width, height, &self.targets);
		self.flow_field.reset(width, height);
	}
	/// Point the generator at new targets. The fields are left untouched
	/// until the next run. Errors without changing anything if `targets` is
	/// empty or any lie outside of `grid`
	pub fn set_targets(
		&mut self,
		grid: &GridStore,
		targets: Vec<GridCell>,
	) -> Result<(), FlowFieldError> {
		validate_targets(grid, &targets)?;
		self.targets = targets;
		Ok(())
	}
	/// Change the terrain preference, applies from the next run
	pub fn set_preference(&mut self, preference: Option<TerrainCategory>) {
		self.preference = preference;
	}
	/// The steering vector of `cell`, a unit vector or zero. Panics if `cell`
	/// is out of bounds
	pub fn get(&self, cell: GridCell) -> Vec2 {
		self.flow_field.get_field_cell_value(cell)
	}
	/// Accumulated cost from `cell` to the nearest target, `f32::INFINITY`
	/// when unreachable. Panics if `cell` is out of bounds
	pub fn get_cost(&self, cell: GridCell) -> f32 {
		self.cost_field.get_field_cell_value(cell)
	}
	/// Whether any target can be reached from `cell`
	pub fn is_reachable(&self, cell: GridCell) -> bool {
		self.cost_field.is_reachable(cell)
	}
	pub fn get_cost_field(&self) -> &CostField {
		&self.cost_field
	}
	pub fn get_flow_field(&self) -> &FlowField {
		&self.flow_field
	}
	pub fn get_targets(&self) -> &[GridCell] {
		&self.targets
	}
	pub fn get_preference(&self) -> Option<TerrainCategory> {
		self.preference
	}
}

/// Ensure there is at least one target and all of them are on the grid
fn validate_targets(grid: &GridStore, targets: &[GridCell]) -> Result<(), FlowFieldError> {
	if targets.is_empty() {
		return Err(FlowFieldError::NoTargets);
	}
	if let Some(outside) = targets.iter().find(|t| !grid.in_bounds(**t)) {
		return Err(FlowFieldError::TargetOutOfBounds {
			column: outside.get_column(),
			row: outside.get_row(),
			width: grid.get_width(),
			height: grid.get_height(),
		});
	}
	Ok(())
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn rejects_no_targets() {
		let grid = GridStore::new(3, 3);
		let result = FlowFieldGenerator::new(&grid, vec![], None);
		assert_eq!(Some(FlowFieldError::NoTargets), result.err());
	}
	#[test]
	fn rejects_target_off_grid() {
		let grid = GridStore::new(3, 3);
		let result = FlowFieldGenerator::new(&grid, vec![GridCell::new(1, 1), GridCell::new(3, 0)], None);
		let actual = FlowFieldError::TargetOutOfBounds {
			column: 3,
			row: 0,
			width: 3,
			height: 3,
		};
		assert_eq!(Some(actual), result.err());
	}
	#[test]
	fn generates_on_construction() {
		let grid = GridStore::new(4, 1);
		let generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		assert_eq!(0.0, generator.get_cost(GridCell::new(0, 0)));
		assert_eq!(3.0, generator.get_cost(GridCell::new(3, 0)));
		assert_eq!(Vec2::new(-1.0, 0.0), generator.get(GridCell::new(3, 0)));
		assert_eq!(Vec2::ZERO, generator.get(GridCell::new(0, 0)));
	}
	#[test]
	fn regenerating_leaves_no_stale_values() {
		let mut grid = GridStore::new(5, 1);
		let mut generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		// wall off the far end, which was reachable on the first run
		grid.set_tile(GridCell::new(3, 0), Tile::wall());
		generator.generate(&grid);
		assert!(!generator.is_reachable(GridCell::new(4, 0)));
		assert_eq!(Vec2::ZERO, generator.get(GridCell::new(4, 0)));
		assert_eq!(2.0, generator.get_cost(GridCell::new(2, 0)));
	}
	#[test]
	fn moved_target_takes_effect_on_regeneration() {
		let grid = GridStore::new(5, 1);
		let mut generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		generator
			.set_targets(&grid, vec![GridCell::new(4, 0)])
			.unwrap();
		// untouched until regenerated
		assert_eq!(0.0, generator.get_cost(GridCell::new(0, 0)));
		generator.generate(&grid);
		assert_eq!(4.0, generator.get_cost(GridCell::new(0, 0)));
		assert_eq!(0.0, generator.get_cost(GridCell::new(4, 0)));
		assert_eq!(Vec2::new(1.0, 0.0), generator.get(GridCell::new(0, 0)));
	}
	#[test]
	fn failed_set_targets_keeps_old_targets() {
		let grid = GridStore::new(2, 2);
		let mut generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(1, 1), None).unwrap();
		let result = generator.set_targets(&grid, vec![GridCell::new(-1, 0)]);
		assert!(result.is_err());
		assert_eq!(&[GridCell::new(1, 1)], generator.get_targets());
	}
	#[test]
	fn grid_resized_between_runs() {
		let grid = GridStore::new(2, 2);
		let mut generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		let bigger = GridStore::new(4, 3);
		generator.generate(&bigger);
		assert_eq!(12, generator.get_cost_field().get().len());
		assert_eq!(12, generator.get_flow_field().get().len());
		assert_eq!(3.0, generator.get_cost(GridCell::new(3, 0)));
	}
	#[test]
	fn weights_apply_on_regeneration() {
		let mut grid = GridStore::new(3, 1);
		grid.mark_occupant(GridCell::new(1, 0));
		let generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		assert_eq!(1.5, generator.get_cost(GridCell::new(1, 0)));
		let generator = generator.with_weights(&grid, GenerationWeights::new(2.0, 0.3));
		assert_eq!(3.0, generator.get_cost(GridCell::new(1, 0)));
	}
	#[test]
	fn reweighting_keeps_parallel_mode() {
		//  _____________
		// |_T_|_o_|___|
		let mut grid = GridStore::new(3, 1);
		grid.mark_occupant(GridCell::new(1, 0));
		let generator = FlowFieldGenerator::new_with_weights(
			&grid,
			vec![GridCell::new(0, 0)],
			None,
			GenerationWeights::default(),
			true,
		)
		.unwrap();
		assert!(generator.is_parallel());
		let generator = generator.with_weights(&grid, GenerationWeights::new(2.0, 0.3));
		assert!(generator.is_parallel());
		assert_eq!(3.0, generator.get_cost(GridCell::new(1, 0)));
		assert_eq!(4.0, generator.get_cost(GridCell::new(2, 0)));
		let mut sequential =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		assert!(!sequential.is_parallel());
		sequential.set_weights(GenerationWeights::new(2.0, 0.3));
		sequential.generate(&grid);
		assert_eq!(sequential.get_cost_field(), generator.get_cost_field());
		assert_eq!(sequential.get_flow_field(), generator.get_flow_field());
	}
	#[test]
	fn parallel_generation_matches() {
		let grid = GridStore::from_fn(12, 12, |cell| {
			if cell.get_column() == 6 && cell.get_row() != 2 && cell.get_row() != 9 {
				Tile::wall()
			} else {
				Tile::new(
					1 + (cell.get_row() % 4) as u8,
					TerrainCategory::new((cell.get_column() % 2) as u8),
					false,
				)
			}
		});
		let targets = vec![GridCell::new(0, 0), GridCell::new(11, 11)];
		let preference = Some(TerrainCategory::new(1));
		let sequential = FlowFieldGenerator::new(&grid, targets.clone(), preference).unwrap();
		let mut parallel = FlowFieldGenerator::new(&grid, targets, preference).unwrap();
		parallel.generate_parallel(&grid);
		assert_eq!(sequential.get_cost_field(), parallel.get_cost_field());
		assert_eq!(sequential.get_flow_field(), parallel.get_flow_field());
	}
	#[test]
	#[should_panic]
	fn get_out_of_bounds() {
		let grid = GridStore::new(2, 2);
		let generator =
			FlowFieldGenerator::with_single_target(&grid, GridCell::new(0, 0), None).unwrap();
		generator.get(GridCell::new(2, 2));
	}
}
