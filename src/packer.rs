use std::cmp::Reverse;
use glam::UVec2;
use log::{debug, warn};
use tr_reader::PAGE_SIDE;
use crate::error::{Error, Result};

/// Packed atlases taller than this are truncated.
pub const MAX_OUTPUT_HEIGHT: u32 = 32768;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackResult {
	/// Index-aligned with the input sizes.
	pub positions: Vec<UVec2>,
	/// Rounded up to a whole number of pages.
	pub height: u32,
	pub space_sufficient: bool,
}

fn fits(x: u32, y: u32, size: UVec2, panel_width: u32) -> bool {
	size.x > 0 && size.y > 0 && x + size.x <= panel_width && x % size.x == 0 && y % size.y == 0
}

/// Row packing: tiles sorted tallest then widest, each row filled left to right in that order.
/// A tile only goes where both coordinates are multiples of its own size.
pub fn pack(sizes: &[UVec2], panel_width: u32) -> Result<PackResult> {
	let mut pending = (0..sizes.len()).collect::<Vec<_>>();
	pending.sort_by_key(|&index| Reverse((sizes[index].y, sizes[index].x)));
	let mut positions = vec![UVec2::ZERO; sizes.len()];
	let mut y = 0;
	let mut rows = 0;
	while !pending.is_empty() {
		let mut x = 0;
		let mut row_height = 0;
		pending.retain(|&index| {
			let size = sizes[index];
			if !fits(x, y, size, panel_width) {
				return true;
			}
			positions[index] = UVec2::new(x, y);
			x += size.x;
			row_height = row_height.max(size.y);
			false
		});
		if row_height == 0 {
			return Err(Error::Packing { remaining: pending.len(), panel_width });
		}
		y += row_height;
		rows += 1;
	}
	let page_side = PAGE_SIDE as u32;
	let height = y.div_ceil(page_side) * page_side;
	let space_sufficient = height <= MAX_OUTPUT_HEIGHT;
	if !space_sufficient {
		warn!("packed height {} exceeds {}, atlas will be truncated", height, MAX_OUTPUT_HEIGHT);
	}
	debug!("packed {} tiles in {} rows, {}x{}", sizes.len(), rows, panel_width, height);
	Ok(PackResult { positions, height, space_sufficient })
}
