//! Defines the Bevy [Plugin] for crowd flow fields
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod flow_layer;
pub mod occupancy_layer;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	Tidy,
	Calculate,
}

/// How cached fields are generated
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct CrowdFlowSettings {
	/// Congestion and terrain factors
	weights: GenerationWeights,
	/// Generate on the rayon thread pool
	parallel: bool,
}

impl CrowdFlowSettings {
	/// Create a new instance of [CrowdFlowSettings]
	pub fn new(weights: GenerationWeights, parallel: bool) -> Self {
		CrowdFlowSettings { weights, parallel }
	}
	pub fn get_weights(&self) -> &GenerationWeights {
		&self.weights
	}
	pub fn is_parallel(&self) -> bool {
		self.parallel
	}
}

/// Insert a [CrowdFlowSettings] resource before adding the plugin to
/// override the defaults
pub struct CrowdFlowPlugin;

impl Plugin for CrowdFlowPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.init_resource::<CrowdFlowSettings>()
			.register_type::<Ordinal>()
			.register_type::<GridCell>()
			.register_type::<TerrainCategory>()
			.register_type::<FlowFieldMetadata>()
			.add_event::<occupancy_layer::EventMarkOccupant>()
			.add_event::<occupancy_layer::EventUpdateTile>()
			.add_event::<flow_layer::EventFlowFieldRequest>()
			.add_event::<flow_layer::EventRegenerateFlowFields>()
			.add_event::<flow_layer::EventDropFlowField>()
			.configure_sets(Update, (OrderingSet::Tidy, OrderingSet::Calculate).chain())
			.add_systems(
				Update,
				(
					(
						occupancy_layer::advance_occupancy_epoch,
						occupancy_layer::process_occupant_marks,
						flow_layer::drop_flow_fields,
					)
						.chain()
						.in_set(OrderingSet::Tidy),
					(
						occupancy_layer::process_tile_updates,
						flow_layer::process_flow_field_requests,
						flow_layer::regenerate_stale_flow_fields,
					)
						.chain()
						.in_set(OrderingSet::Calculate),
				),
			);
	}
}
