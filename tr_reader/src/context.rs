use std::collections::BTreeMap;
use log::trace;
use shared::{BufferPool, CancelToken};
use crate::{error::Result, geometry::TileShape};

/// How geometry refers to one object texture slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotUse {
	pub quad: bool,
	pub triangle: bool,
	/// Member of an animated texture range.
	pub animated: bool,
}

impl SlotUse {
	fn add(&mut self, shape: TileShape) {
		match shape {
			TileShape::Quad => self.quad = true,
			TileShape::Triangle => self.triangle = true,
		}
	}
	
	fn merge(&mut self, other: SlotUse) {
		self.quad |= other.quad;
		self.triangle |= other.triangle;
	}
}

/// Running state of one parse, threaded through every section reader.
pub struct ParseContext<'a> {
	pub pool: &'a BufferPool,
	pub cancel: &'a CancelToken,
	/// When false, geometry is skipped by length and no slot uses are recorded.
	pub scan_geometry: bool,
	pub page_count: usize,
	uses: BTreeMap<u16, SlotUse>,
	animated_ranges: Vec<Box<[u16]>>,
	faces: usize,
}

impl<'a> ParseContext<'a> {
	pub fn new(pool: &'a BufferPool, cancel: &'a CancelToken, scan_geometry: bool) -> Self {
		Self {
			pool,
			cancel,
			scan_geometry,
			page_count: 0,
			uses: BTreeMap::new(),
			animated_ranges: Vec::new(),
			faces: 0,
		}
	}
	
	pub fn check_cancel(&self) -> Result<()> {
		Ok(self.cancel.check()?)
	}
	
	/// Counts one polygon, checking for cancellation.
	pub fn polygon(&mut self) -> Result<()> {
		self.check_cancel()?;
		self.faces += 1;
		Ok(())
	}
	
	/// Records one polygon's texture reference.
	pub fn use_slot(&mut self, texture_word: u16, shape: TileShape) -> Result<()> {
		self.polygon()?;
		self.uses.entry(texture_word & 0x7FFF).or_default().add(shape);
		Ok(())
	}
	
	pub fn add_animated_range(&mut self, slots: Box<[u16]>) {
		self.animated_ranges.push(slots);
	}
	
	/// Number of polygons seen so far.
	pub fn faces(&self) -> usize {
		self.faces
	}
	
	/// Spreads use across animated ranges: when any slot of a range is used,
	/// every slot of the range is used and marked animated.
	pub fn resolve_animated(&mut self) {
		for range in &self.animated_ranges {
			let mut combined = SlotUse::default();
			for slot in range.iter() {
				if let Some(slot_use) = self.uses.get(slot) {
					combined.merge(*slot_use);
				}
			}
			if !combined.quad && !combined.triangle {
				continue;
			}
			trace!("animated range {:?} in use", range);
			for &slot in range.iter() {
				let slot_use = self.uses.entry(slot).or_default();
				slot_use.merge(combined);
				slot_use.animated = true;
			}
		}
	}
	
	/// Used slots in ascending order.
	pub fn uses(&self) -> impl Iterator<Item = (u16, SlotUse)> + '_ {
		self.uses.iter().map(|(&slot, &slot_use)| (slot, slot_use))
	}
}
