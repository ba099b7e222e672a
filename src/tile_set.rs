use glam::UVec2;
use itertools::Itertools;
use log::debug;
use tr_reader::{TileCandidate, TileShape, TrVersion};

/// Tiles must be strictly smaller than this on both sides.
pub const MAX_TILE_SIDE: u32 = 512;
pub const TR_MIN_SIDE: u32 = 1;
pub const TEN_MIN_SIDE: u32 = 4;

/// A rectangle inside one source page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureRecord {
	pub page: u32,
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl TextureRecord {
	pub fn size(&self) -> UVec2 {
		UVec2::new(self.width, self.height)
	}
}

//edge-flagged sides overlap by one texel only when one past a power of two;
//other sides are kept so square power-of-two animated quads stay usable
fn shrink_edge(side: u32) -> u32 {
	match side > 2 && (side - 1).is_power_of_two() {
		true => side - 1,
		false => side,
	}
}

/// Turns tile candidates into corrected, deduplicated texture records.
#[derive(Clone, Copy, Debug)]
pub struct TileSetBuilder {
	/// Candidates no larger than this on either side are dropped.
	pub min_side: u32,
	/// Apply the mapping correction shift to edge-used triangles.
	pub triangle_shift: bool,
}

impl TileSetBuilder {
	pub fn for_tr(version: TrVersion) -> Self {
		Self { min_side: TR_MIN_SIDE, triangle_shift: version.has_mapping_correction() }
	}
	
	pub fn for_ten() -> Self {
		Self { min_side: TEN_MIN_SIDE, triangle_shift: false }
	}
	
	/// Corrects one candidate, or `None` if it is degenerate, oversized or an unusable animated quad.
	pub fn record(&self, candidate: &TileCandidate) -> Option<TextureRecord> {
		let mut pos = candidate.bounds.min;
		let size = candidate.bounds.max - candidate.bounds.min;
		let (mut width, mut height) = (size.x, size.y);
		if width <= self.min_side || height <= self.min_side {
			return None;
		}
		if candidate.edge_used {
			match candidate.shape {
				TileShape::Quad => {
					width = shrink_edge(width);
					height = shrink_edge(height);
				},
				TileShape::Triangle if self.triangle_shift => {
					if candidate.mapping_correction & 1 != 0 {
						pos.x = pos.x.saturating_sub(1);
					}
					if candidate.mapping_correction & 2 != 0 {
						pos.y = pos.y.saturating_sub(1);
					}
				},
				TileShape::Triangle => {},
			}
		}
		if candidate.animated && candidate.shape == TileShape::Quad {
			if !width.is_power_of_two() || width != height {
				return None;
			}
		} else {
			width = width.next_power_of_two();
			height = height.next_power_of_two();
		}
		if width >= MAX_TILE_SIDE || height >= MAX_TILE_SIDE {
			return None;
		}
		Some(TextureRecord { page: candidate.page, x: pos.x, y: pos.y, width, height })
	}
	
	/// Records in first-seen order, each distinct record once.
	pub fn build(&self, candidates: &[TileCandidate]) -> Vec<TextureRecord> {
		let mut rejected = 0;
		let records = candidates
			.iter()
			.filter_map(|candidate| {
				let record = self.record(candidate);
				rejected += record.is_none() as usize;
				record
			})
			.unique()
			.collect::<Vec<_>>();
		debug!("{} candidates: {} rejected, {} distinct tiles", candidates.len(), rejected, records.len());
		records
	}
}
