//! `use crowd_flowfield::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::flowfields::{
	fields::{cost_field::*, flow_field::*, *},
	generator::*,
	grid::{grid_store::*, *},
	utilities::*,
	weights::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	error::*,
	plugin::{flow_layer::*, occupancy_layer::*, *},
};
