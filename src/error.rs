//! Errors surfaced when building a grid or a flow field from caller input
//!

use thiserror::Error;

/// Failures that can be recovered from by supplying different input.
///
/// Indexing a cell outside of the grid is a programming error rather than an
/// input error and panics instead
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowFieldError {
	/// A flow field was requested without anywhere to flow towards
	#[error("A flow field requires at least one target cell")]
	NoTargets,
	/// A target does not sit within the grid
	#[error("Target cell ({column}, {row}) lies outside of the {width}x{height} grid")]
	TargetOutOfBounds {
		/// Requested column
		column: i32,
		/// Requested row
		row: i32,
		/// Number of columns in the grid
		width: usize,
		/// Number of rows in the grid
		height: usize,
	},
	/// The tiles supplied to initialise a grid don't cover it exactly
	#[error("Grid expects {expected} tiles but {actual} were supplied")]
	TileCountMismatch {
		/// `width * height`
		expected: usize,
		/// Length of the supplied tiles
		actual: usize,
	},
	/// A grid needs at least one row and one column
	#[error("Grid dimensions must be greater than zero, got {width}x{height}")]
	ZeroDimension {
		/// Requested number of columns
		width: usize,
		/// Requested number of rows
		height: usize,
	},
	/// A generation weight would let costs decrease along a route
	#[error("Weight `{name}` must be finite and non-negative, got {value}")]
	InvalidWeight {
		/// Which weight was rejected
		name: &'static str,
		/// The rejected value
		value: f32,
	},
	/// A configuration file could not be read
	#[error("Failed reading configuration: {0}")]
	ConfigRead(String),
	/// A configuration file could not be deserialised
	#[error("Failed deserializing configuration: {0}")]
	ConfigParse(String),
}
