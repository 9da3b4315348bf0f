//! Useful structures and constants used by the grid and the fields
//!

use bevy::prelude::*;

/// A [crate::prelude::Tile] with this `move_cost` is a wall and can never be
/// traversed
pub const MAX_COST: u8 = u8::MAX;
/// Movement cost of a freshly created [crate::prelude::Tile]
pub const DEFAULT_MOVE_COST: u8 = 1;
/// Added to the movement cost of a cell for every occupant sampled in the
/// current epoch
pub const CONGESTION_PENALTY: f32 = 0.5;
/// Multiplier applied to the movement cost of a cell whose terrain matches
/// the terrain preference of a field
pub const TERRAIN_DISCOUNT: f32 = 0.3;

/// Convenience way of accessing the 8 directions of movement between
/// neighbouring cells of a [crate::prelude::GridStore]. Rows grow towards
/// the north, so `North` is `(0, 1)`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Ordinal {
	North,
	NorthEast,
	East,
	SouthEast,
	South,
	SouthWest,
	West,
	NorthWest,
	/// Special case, used to indicate a cell of the [crate::prelude::FlowField] with nowhere to go
	Zero,
}

/// The order in which neighbours are explored, cardinal and diagonal
/// interleaved clockwise from north. Ties during flow derivation are won by
/// whichever neighbour appears first
pub const MOVE_ORDER: [Ordinal; 8] = [
	Ordinal::North,
	Ordinal::NorthEast,
	Ordinal::East,
	Ordinal::SouthEast,
	Ordinal::South,
	Ordinal::SouthWest,
	Ordinal::West,
	Ordinal::NorthWest,
];

impl Ordinal {
	/// The `(column, row)` step taken when moving in this direction
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, 1),
			Ordinal::NorthEast => (1, 1),
			Ordinal::East => (1, 0),
			Ordinal::SouthEast => (1, -1),
			Ordinal::South => (0, -1),
			Ordinal::SouthWest => (-1, -1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthWest => (-1, 1),
			Ordinal::Zero => (0, 0),
		}
	}
	/// Whether the direction moves along both axes at once
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Euclidean length of a single step in this direction
	pub fn step_length(&self) -> f32 {
		match self {
			Ordinal::Zero => 0.0,
			o if o.is_diagonal() => std::f32::consts::SQRT_2,
			_ => 1.0,
		}
	}
	/// Normalised direction of movement, [Vec2::ZERO] for [Ordinal::Zero]
	pub fn unit_vector(&self) -> Vec2 {
		let (x, y) = self.offset();
		Vec2::new(x as f32, y as f32).normalize_or_zero()
	}
	/// From a unit vector held in a [crate::prelude::FlowField] recover the
	/// [Ordinal] it represents
	pub fn from_unit_vector(vector: Vec2) -> Ordinal {
		/// Snap a vector component onto `-1`, `0` or `1`
		fn axis_step(component: f32) -> i32 {
			if component.abs() < f32::EPSILON {
				0
			} else {
				component.signum() as i32
			}
		}
		let step = (axis_step(vector.x), axis_step(vector.y));
		MOVE_ORDER
			.iter()
			.copied()
			.find(|o| o.offset() == step)
			.unwrap_or(Ordinal::Zero)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn move_order_is_clockwise_from_north() {
		let result: Vec<(i32, i32)> = MOVE_ORDER.iter().map(|o| o.offset()).collect();
		let actual = vec![(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
		assert_eq!(actual, result);
	}
	#[test]
	fn diagonal_step_length() {
		assert_eq!(std::f32::consts::SQRT_2, Ordinal::SouthWest.step_length());
		assert_eq!(1.0, Ordinal::West.step_length());
		assert_eq!(0.0, Ordinal::Zero.step_length());
	}
	#[test]
	fn unit_vectors_are_normalised() {
		for o in MOVE_ORDER.iter() {
			let v = o.unit_vector();
			assert!((v.length() - 1.0).abs() < 1e-6, "{:?} gave {:?}", o, v);
		}
		assert_eq!(Vec2::ZERO, Ordinal::Zero.unit_vector());
	}
	#[test]
	fn unit_vector_round_trip() {
		for o in MOVE_ORDER.iter() {
			assert_eq!(*o, Ordinal::from_unit_vector(o.unit_vector()));
		}
		assert_eq!(Ordinal::Zero, Ordinal::from_unit_vector(Vec2::ZERO));
	}
}
