//! Logic for keeping the [GridStore] in step with the simulation, sampling
//! where actors stand each tick and applying edits to tiles. Tile edits make
//! every cached field stale so that the flow layer rebuilds them
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Records that an actor occupies a cell during the current tick
#[derive(Event, Clone, Copy, Debug)]
pub struct EventMarkOccupant {
	/// Cell the actor stands in
	cell: GridCell,
}

impl EventMarkOccupant {
	/// Create a new instance of [EventMarkOccupant]
	#[cfg(not(tarpaulin_include))]
	pub fn new(cell: GridCell) -> Self {
		EventMarkOccupant { cell }
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_cell(&self) -> GridCell {
		self.cell
	}
}

/// Replaces the [Tile] of a cell
#[derive(Event, Clone, Copy, Debug)]
pub struct EventUpdateTile {
	/// Cell to update
	cell: GridCell,
	/// The tile the cell should be assigned
	tile: Tile,
}

impl EventUpdateTile {
	/// Create a new instance of [EventUpdateTile]
	#[cfg(not(tarpaulin_include))]
	pub fn new(cell: GridCell, tile: Tile) -> Self {
		EventUpdateTile { cell, tile }
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_cell(&self) -> GridCell {
		self.cell
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_tile(&self) -> Tile {
		self.tile
	}
}

/// Start a new sampling epoch, forgetting every occupant from the last tick
#[cfg(not(tarpaulin_include))]
pub fn advance_occupancy_epoch(mut query: Query<&mut GridStore>) {
	for mut grid in &mut query {
		grid.advance_epoch();
	}
}

/// Read [EventMarkOccupant] and count each actor against its cell
#[cfg(not(tarpaulin_include))]
pub fn process_occupant_marks(
	mut events: EventReader<EventMarkOccupant>,
	mut query: Query<&mut GridStore>,
) {
	for event in events.read() {
		let cell = event.get_cell();
		for mut grid in &mut query {
			if grid.in_bounds(cell) {
				grid.mark_occupant(cell);
			} else {
				error!(
					"Occupant marked at {:?} outside of the {}x{} grid",
					cell.get(),
					grid.get_width(),
					grid.get_height()
				);
			}
		}
	}
}

/// Read [EventUpdateTile], update the [GridStore] and flag the cached fields
/// of any grid that changed as stale
#[cfg(not(tarpaulin_include))]
pub fn process_tile_updates(
	mut events: EventReader<EventUpdateTile>,
	mut query: Query<(&mut GridStore, &mut FlowFieldCache)>,
) {
	for event in events.read() {
		let cell = event.get_cell();
		for (mut grid, mut cache) in &mut query {
			if !grid.in_bounds(cell) {
				error!(
					"Tile update at {:?} outside of the {}x{} grid",
					cell.get(),
					grid.get_width(),
					grid.get_height()
				);
				continue;
			}
			grid.set_tile(cell, event.get_tile());
			cache.mark_all_stale();
			debug!("Tile {:?} updated, cached fields are stale", cell.get());
		}
	}
}
