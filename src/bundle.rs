//! Everything an entity needs to act as a crowd navigation map
//!

use crate::prelude::*;
use bevy::prelude::*;

#[derive(Bundle)]
pub struct CrowdFlowBundle {
	/// Terrain and occupancy of the map
	grid_store: GridStore,
	/// Generated fields shared by actors
	flow_field_cache: FlowFieldCache,
}

impl CrowdFlowBundle {
	/// Create a new instance of [CrowdFlowBundle] where every tile has the
	/// default movement cost
	pub fn new(width: usize, height: usize) -> Self {
		CrowdFlowBundle::from_grid(GridStore::new(width, height))
	}
	/// Create a new instance of [CrowdFlowBundle] around an existing grid
	pub fn from_grid(grid_store: GridStore) -> Self {
		CrowdFlowBundle {
			grid_store,
			flow_field_cache: FlowFieldCache::default(),
		}
	}
}
