//! The kinds of fields produced by the algorithm
//!

pub mod cost_field;
pub mod flow_field;

use crate::prelude::*;

/// Defines required access to field arrays
pub trait Field<T> {
	/// Get a reference to the flattened row-major field array
	fn get(&self) -> &[T];
	/// Number of columns
	fn get_width(&self) -> usize;
	/// Number of rows
	fn get_height(&self) -> usize;
	/// Retrieve a field cell value
	fn get_field_cell_value(&self, cell: GridCell) -> T;
	/// Set a field cell to a value
	fn set_field_cell_value(&mut self, value: T, cell: GridCell);
}

/// Flattened index of `cell` within a `width x height` field, panicking with
/// the name of the field when `cell` is out of bounds
fn field_index(name: &str, width: usize, height: usize, cell: GridCell) -> usize {
	let column = cell.get_column();
	let row = cell.get_row();
	if column < 0 || row < 0 || column as usize >= width || row as usize >= height {
		panic!(
			"Cannot access a {} value, index out of bounds. Asked for column {}, row {}, field width is {}, field height is {}",
			name, column, row, width, height
		)
	}
	column as usize + row as usize * width
}

/// Reusable work lists for wavefront propagation. `current` holds the cells
/// whose neighbours are being relaxed this pass and `next` collects the
/// cells improved by it, the two are swapped between passes so neither is
/// reallocated
#[derive(Default, Clone, Debug)]
pub struct Frontier {
	/// Cells being expanded in the current pass
	current: Vec<GridCell>,
	/// Cells improved during the current pass
	next: Vec<GridCell>,
}

impl Frontier {
	/// Empty both lists and seed the first pass with `cells`
	pub fn seed(&mut self, cells: &[GridCell]) {
		self.current.clear();
		self.next.clear();
		self.current.extend_from_slice(cells);
	}
	/// Promote the improved cells to be expanded next and clear the old pass
	pub fn swap(&mut self) {
		std::mem::swap(&mut self.current, &mut self.next);
		self.next.clear();
	}
	/// Whether there is anything left to expand
	pub fn is_exhausted(&self) -> bool {
		self.current.is_empty()
	}
	/// Number of cells awaiting expansion
	pub fn len(&self) -> usize {
		self.current.len()
	}
	/// Whether the current pass is empty
	pub fn is_empty(&self) -> bool {
		self.current.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn frontier_swap_promotes_next() {
		let mut frontier = Frontier::default();
		frontier.seed(&[GridCell::new(0, 0)]);
		frontier.next.push(GridCell::new(1, 0));
		frontier.next.push(GridCell::new(0, 1));
		frontier.swap();
		assert_eq!(vec![GridCell::new(1, 0), GridCell::new(0, 1)], frontier.current);
		assert!(frontier.next.is_empty());
		frontier.swap();
		assert!(frontier.is_exhausted());
	}
	#[test]
	fn frontier_keeps_capacity() {
		let mut frontier = Frontier::default();
		let cells: Vec<GridCell> = (0..64).map(|i| GridCell::new(i, 0)).collect();
		frontier.seed(&cells);
		let capacity = frontier.current.capacity();
		frontier.seed(&cells[..2]);
		assert_eq!(capacity, frontier.current.capacity());
		assert_eq!(2, frontier.len());
	}
	#[test]
	#[should_panic]
	fn field_index_out_of_bounds() {
		field_index("CostField", 3, 3, GridCell::new(3, 0));
	}
	#[test]
	fn field_index_row_major() {
		assert_eq!(7, field_index("FlowField", 3, 3, GridCell::new(1, 2)));
	}
}
