//! Crowd pathfinding across a 2D tile grid. A [flowfields::grid::grid_store::GridStore]
//! holds the terrain and per-tick occupancy of the map and a
//! [flowfields::generator::FlowFieldGenerator] turns one or more target cells
//! into a field of steering vectors that any number of actors can read.
//!
//! A Bevy [plugin::CrowdFlowPlugin] is provided to keep occupancy up to date
//! and cache generated fields.
//!

pub mod bundle;
pub mod error;
pub mod flowfields;
pub mod plugin;

pub mod prelude;
