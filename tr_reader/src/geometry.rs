use glam::{U16Vec2, UVec2};
use log::warn;
use shared::{MinMax, VecMinMaxFromIterator};
use crate::{context::ParseContext, error::Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileShape {
	Quad,
	Triangle,
}

impl TileShape {
	pub fn corners(self) -> usize {
		match self {
			TileShape::Quad => 4,
			TileShape::Triangle => 3,
		}
	}
}

/// UFixed16 (8.8) coordinate to whole texels, fraction rounded half to even.
pub fn ufixed16_to_texel(v: u16) -> u32 {
	let whole = (v >> 8) as u32;
	let frac = v & 0xFF;
	match frac > 0x80 || (frac == 0x80 && whole & 1 == 1) {
		true => whole + 1,
		false => whole,
	}
}

/// Object texture slot, common to every TR version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectTexture {
	pub page: u32,
	/// UFixed16 corners; the fourth is unused by triangles.
	pub corners: [U16Vec2; 4],
	/// Known from the record itself from TR4 on; earlier versions take it from the referencing face.
	pub triangle: Option<bool>,
	/// Low nibble of the TR4+ flags word.
	pub mapping_correction: u8,
}

impl ObjectTexture {
	/// Fixup byte of the first corner's x is non-zero.
	pub fn edge_used(&self) -> bool {
		self.corners[0].x & 0xFF != 0
	}
	
	pub fn bounds(&self, shape: TileShape) -> MinMax<UVec2> {
		let texels = self.corners[..shape.corners()]
			.iter()
			.map(|c| UVec2::new(ufixed16_to_texel(c.x), ufixed16_to_texel(c.y)));
		match texels.min_max() {
			Some(bounds) => bounds,
			None => MinMax::new(UVec2::ZERO),
		}
	}
}

/// A used texture region before correction and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCandidate {
	pub page: u32,
	pub bounds: MinMax<UVec2>,
	pub shape: TileShape,
	pub edge_used: bool,
	pub mapping_correction: u8,
	pub animated: bool,
}

/// Maps every used object texture slot to tile candidates, in slot order.
/// References past the texture table or atlas are dropped with a warning.
pub fn tr_candidates(ctx: &ParseContext, textures: &[ObjectTexture]) -> Result<Vec<TileCandidate>> {
	let mut candidates = Vec::new();
	let mut missing = 0;
	for (slot, slot_use) in ctx.uses() {
		ctx.check_cancel()?;
		let Some(texture) = textures.get(slot as usize) else {
			missing += 1;
			continue;
		};
		if texture.page as usize >= ctx.page_count {
			warn!("object texture {} refers to page {} of {}", slot, texture.page, ctx.page_count);
			continue;
		}
		let shapes = match texture.triangle {
			Some(true) => [None, Some(TileShape::Triangle)],
			Some(false) => [Some(TileShape::Quad), None],
			None => [
				slot_use.quad.then_some(TileShape::Quad),
				slot_use.triangle.then_some(TileShape::Triangle),
			],
		};
		for shape in shapes.into_iter().flatten() {
			candidates.push(TileCandidate {
				page: texture.page,
				bounds: texture.bounds(shape),
				shape,
				edge_used: texture.edge_used(),
				mapping_correction: texture.mapping_correction,
				animated: slot_use.animated,
			});
		}
	}
	if missing > 0 {
		warn!("{} face texture references past the {} object textures", missing, textures.len());
	}
	Ok(candidates)
}

/// Normalized UV to texel on a page of `size` texels.
pub fn uv_to_texel(uv: f32, size: u32) -> u32 {
	(uv * size as f32).round().clamp(0.0, size as f32) as u32
}
