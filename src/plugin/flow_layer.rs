//! Logic relating to [FlowFieldGenerator] creation and caching. Actors heading
//! for the same targets share a single cached generator, requests for a set
//! of targets are queued and built in the same tick, while tile edits and
//! explicit regeneration requests rebuild what has already been cached
//!

use std::collections::{BTreeMap, BTreeSet};

use crate::prelude::*;
use bevy::prelude::*;

/// Identifies a cached field by what it flows towards. Targets are sorted
/// and deduplicated so the order they were requested in doesn't matter
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct FlowFieldMetadata {
	/// Cells the field flows towards
	targets: Vec<GridCell>,
	/// Terrain category that is cheaper to travel across
	preference: Option<TerrainCategory>,
}

impl FlowFieldMetadata {
	/// Create a new instance of [FlowFieldMetadata]
	pub fn new(mut targets: Vec<GridCell>, preference: Option<TerrainCategory>) -> Self {
		targets.sort();
		targets.dedup();
		FlowFieldMetadata {
			targets,
			preference,
		}
	}
	pub fn get_targets(&self) -> &[GridCell] {
		&self.targets
	}
	pub fn get_preference(&self) -> Option<TerrainCategory> {
		self.preference
	}
}

/// Each generated [FlowFieldGenerator] is placed into this cache so that
/// multiple actors can read from the same dataset
#[derive(Component, Default)]
pub struct FlowFieldCache {
	/// Requested fields waiting to be built
	queue: BTreeSet<FlowFieldMetadata>,
	/// Built fields that actors can steer by
	flows: BTreeMap<FlowFieldMetadata, FlowFieldGenerator>,
	/// Built fields whose grid has changed since they were generated
	stale: BTreeSet<FlowFieldMetadata>,
}

impl FlowFieldCache {
	/// Get the map of generators
	pub fn get(&self) -> &BTreeMap<FlowFieldMetadata, FlowFieldGenerator> {
		&self.flows
	}
	/// Get the generator for `metadata`. Returns [None] if the cache doesn't
	/// contain a record
	pub fn get_field(&self, metadata: &FlowFieldMetadata) -> Option<&FlowFieldGenerator> {
		self.flows.get(metadata)
	}
	/// Steering vector of `cell` within the field for `metadata`. Returns
	/// [None] if the field hasn't been built or `cell` isn't on it
	pub fn get_vector(&self, metadata: &FlowFieldMetadata, cell: GridCell) -> Option<Vec2> {
		let generator = self.flows.get(metadata)?;
		let flow_field = generator.get_flow_field();
		let on_field = cell.get_column() >= 0
			&& cell.get_row() >= 0
			&& (cell.get_column() as usize) < flow_field.get_width()
			&& (cell.get_row() as usize) < flow_field.get_height();
		on_field.then(|| flow_field.get_field_cell_value(cell))
	}
	pub fn get_queue(&self) -> &BTreeSet<FlowFieldMetadata> {
		&self.queue
	}
	/// Queue `metadata` to be built unless it already exists or is queued.
	/// Returns whether it was newly queued
	pub fn add_to_queue(&mut self, metadata: FlowFieldMetadata) -> bool {
		if self.flows.contains_key(&metadata) {
			return false;
		}
		self.queue.insert(metadata)
	}
	/// Insert a freshly built generator, replacing any older version
	pub fn insert_field(&mut self, metadata: FlowFieldMetadata, generator: FlowFieldGenerator) {
		self.queue.remove(&metadata);
		self.stale.remove(&metadata);
		self.flows.insert(metadata, generator);
	}
	/// Remove a field from the cache, including any pending request for it
	pub fn remove_field(&mut self, metadata: &FlowFieldMetadata) -> Option<FlowFieldGenerator> {
		self.queue.remove(metadata);
		self.stale.remove(metadata);
		self.flows.remove(metadata)
	}
	/// Flag every built field as needing regeneration
	pub fn mark_all_stale(&mut self) {
		self.stale.extend(self.flows.keys().cloned());
	}
	pub fn is_stale(&self, metadata: &FlowFieldMetadata) -> bool {
		self.stale.contains(metadata)
	}
	/// Drain the queue of requested fields
	fn take_queue(&mut self) -> BTreeSet<FlowFieldMetadata> {
		std::mem::take(&mut self.queue)
	}
	/// Drain the set of stale fields
	fn take_stale(&mut self) -> BTreeSet<FlowFieldMetadata> {
		std::mem::take(&mut self.stale)
	}
}

/// A request for a field flowing towards `targets`
#[derive(Event, Clone, Debug)]
pub struct EventFlowFieldRequest {
	/// Which field is wanted
	metadata: FlowFieldMetadata,
}

impl EventFlowFieldRequest {
	/// Create a new instance of [EventFlowFieldRequest]
	pub fn new(targets: Vec<GridCell>, preference: Option<TerrainCategory>) -> Self {
		EventFlowFieldRequest {
			metadata: FlowFieldMetadata::new(targets, preference),
		}
	}
	pub fn get_metadata(&self) -> &FlowFieldMetadata {
		&self.metadata
	}
}

/// Regenerate every cached field, typically sent once occupancy for a tick
/// has been sampled so congestion is reflected
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct EventRegenerateFlowFields;

/// Remove a field from the cache once no actor needs it
#[derive(Event, Clone, Debug)]
pub struct EventDropFlowField {
	/// Which field to remove
	metadata: FlowFieldMetadata,
}

impl EventDropFlowField {
	/// Create a new instance of [EventDropFlowField]
	pub fn new(targets: Vec<GridCell>, preference: Option<TerrainCategory>) -> Self {
		EventDropFlowField {
			metadata: FlowFieldMetadata::new(targets, preference),
		}
	}
	pub fn get_metadata(&self) -> &FlowFieldMetadata {
		&self.metadata
	}
}

/// Build a complete generator for `metadata`, it only reaches the cache once
/// it is finished
fn build_generator(
	grid: &GridStore,
	metadata: &FlowFieldMetadata,
	settings: &CrowdFlowSettings,
) -> Result<FlowFieldGenerator, FlowFieldError> {
	FlowFieldGenerator::new_with_weights(
		grid,
		metadata.get_targets().to_vec(),
		metadata.get_preference(),
		*settings.get_weights(),
		settings.is_parallel(),
	)
}

/// Remove fields named by [EventDropFlowField]
#[cfg(not(tarpaulin_include))]
pub fn drop_flow_fields(
	mut events: EventReader<EventDropFlowField>,
	mut cache_q: Query<&mut FlowFieldCache>,
) {
	for event in events.read() {
		for mut cache in &mut cache_q {
			if cache.remove_field(event.get_metadata()).is_some() {
				debug!("Dropped flow field for {:?}", event.get_metadata());
			}
		}
	}
}

/// Process [EventFlowFieldRequest], queueing anything not yet cached and
/// then building the queue
#[cfg(not(tarpaulin_include))]
pub fn process_flow_field_requests(
	mut events: EventReader<EventFlowFieldRequest>,
	mut cache_q: Query<(&mut FlowFieldCache, &GridStore)>,
	settings: Res<CrowdFlowSettings>,
) {
	// many actors may request the same field at once, the queue is a set so
	// duplicates collapse
	for event in events.read() {
		for (mut cache, _) in &mut cache_q {
			cache.add_to_queue(event.get_metadata().clone());
		}
	}
	for (mut cache, grid) in &mut cache_q {
		for metadata in cache.take_queue() {
			match build_generator(grid, &metadata, &settings) {
				Ok(generator) => {
					debug!("Built flow field for {:?}", metadata);
					cache.insert_field(metadata, generator);
				}
				Err(e) => warn!("Rejected flow field request {:?}: {}", metadata, e),
			}
		}
	}
}

/// Rebuild cached fields that have gone stale, or all of them when an
/// [EventRegenerateFlowFields] has been sent
#[cfg(not(tarpaulin_include))]
pub fn regenerate_stale_flow_fields(
	mut events: EventReader<EventRegenerateFlowFields>,
	mut cache_q: Query<(&mut FlowFieldCache, &GridStore)>,
	settings: Res<CrowdFlowSettings>,
) {
	let regenerate_all = events.read().count() > 0;
	for (mut cache, grid) in &mut cache_q {
		if regenerate_all {
			cache.mark_all_stale();
		}
		for metadata in cache.take_stale() {
			match build_generator(grid, &metadata, &settings) {
				Ok(generator) => {
					trace!("Regenerated flow field for {:?}", metadata);
					cache.insert_field(metadata, generator);
				}
				Err(e) => {
					warn!("Dropping flow field {:?}, it can't be rebuilt: {}", metadata, e);
					cache.remove_field(&metadata);
				}
			}
		}
	}
}
