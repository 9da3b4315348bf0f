//! Tunable factors applied when stepping into a cell during cost propagation
//!

use crate::prelude::*;

/// Weights shaping how congestion and terrain preference influence the
/// accumulated cost of a [CostField].
///
/// Both factors are finite and non-negative so costs never decrease along a
/// route. Deserialising goes through [GenerationWeights::try_new] so a bad
/// config is rejected rather than loaded
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWeights"))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationWeights {
	/// Extra cost added per actor occupying a cell this epoch
	congestion_penalty: f32,
	/// Multiplier applied to the cost of a cell whose terrain matches the
	/// preference of the field
	terrain_discount: f32,
}

/// Unvalidated weights as they appear in a config file
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawWeights {
	/// See [GenerationWeights]
	congestion_penalty: f32,
	/// See [GenerationWeights]
	terrain_discount: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWeights> for GenerationWeights {
	type Error = FlowFieldError;
	fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
		GenerationWeights::try_new(raw.congestion_penalty, raw.terrain_discount)
	}
}

impl Default for GenerationWeights {
	fn default() -> Self {
		GenerationWeights {
			congestion_penalty: CONGESTION_PENALTY,
			terrain_discount: TERRAIN_DISCOUNT,
		}
	}
}

/// Reject a weight that is negative, infinite or NaN
fn check_weight(name: &'static str, value: f32) -> Result<(), FlowFieldError> {
	if value.is_finite() && value >= 0.0 {
		Ok(())
	} else {
		Err(FlowFieldError::InvalidWeight { name, value })
	}
}

impl GenerationWeights {
	/// Create a new instance of [GenerationWeights], panics if either factor
	/// is negative, infinite or NaN
	pub fn new(congestion_penalty: f32, terrain_discount: f32) -> Self {
		match GenerationWeights::try_new(congestion_penalty, terrain_discount) {
			Ok(weights) => weights,
			Err(e) => panic!("{}", e),
		}
	}
	/// Create a new instance of [GenerationWeights], erroring if either
	/// factor is negative, infinite or NaN
	pub fn try_new(congestion_penalty: f32, terrain_discount: f32) -> Result<Self, FlowFieldError> {
		check_weight("congestion_penalty", congestion_penalty)?;
		check_weight("terrain_discount", terrain_discount)?;
		Ok(GenerationWeights {
			congestion_penalty,
			terrain_discount,
		})
	}
	pub fn get_congestion_penalty(&self) -> f32 {
		self.congestion_penalty
	}
	pub fn get_terrain_discount(&self) -> f32 {
		self.terrain_discount
	}
	/// Load weights from a `.ron` file. Unreadable files, malformed RON and
	/// invalid weights are all returned as errors
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, FlowFieldError> {
		let contents = std::fs::read_to_string(path)
			.map_err(|e| FlowFieldError::ConfigRead(format!("{}: {}", path, e)))?;
		ron::from_str(&contents).map_err(|e| FlowFieldError::ConfigParse(e.to_string()))
	}
}
