//! TombEngine levels: PNG texture pages and per-polygon UVs inside one zlib block.

use std::io::{Cursor, Read};
use byteorder::{ReadBytesExt, LE};
use glam::{IVec3, UVec2};
use log::{debug, info, trace, warn};
use shared::VecMinMaxFromIterator;
use crate::{
	context::ParseContext,
	error::{corrupt, Result},
	geometry::{uv_to_texel, TileCandidate, TileShape},
	pixels::DecodedPage,
	read_vec, skip,
	stream::{read_compressed, read_pooled},
	version::TenVersion,
	Readable,
};

pub const TEXTURE_GROUPS: [&str; 6] = ["room", "object", "static", "animated", "sprite", "sky"];
const VERTEX_SIZE: u64 = 12;
const SHAPE_QUAD: i32 = 0;
const SHAPE_TRIANGLE: i32 = 1;

pub struct TenLevel {
	pub version: TenVersion,
	/// Room texture pages; the other groups are not decoded.
	pub pages: Vec<DecodedPage>,
	pub candidates: Vec<TileCandidate>,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct RoomInfo {
	pub pos: IVec3,
	pub y_bottom: i32,
	pub y_top: i32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct BucketHeader {
	pub texture: i32,
	pub blend_mode: u8,
	pub animated: u8,
}

/// Reads a level whose magic and engine version have already been consumed.
pub fn read_level<R: Read>(reader: &mut R, version: TenVersion, ctx: &mut ParseContext) -> Result<TenLevel> {
	let system_hash = reader.read_u32::<LE>()?;
	debug!("system hash {:#010X}", system_hash);
	let level_data = read_compressed(reader, ctx.pool, ctx.cancel)?;
	let mut reader = Cursor::new(&level_data[..]);
	let mut pages = Vec::new();
	for (index, group) in TEXTURE_GROUPS.into_iter().enumerate() {
		let count = read_texture_group(&mut reader, version, ctx, (index == 0).then_some(&mut pages))?;
		debug!("{} {} textures", count, group);
	}
	ctx.page_count = pages.len();
	let mut candidates = Vec::new();
	if ctx.scan_geometry {
		let num_rooms = reader.read_u32::<LE>()?;
		for _ in 0..num_rooms {
			ctx.check_cancel()?;
			read_room(&mut reader, version, &pages, &mut candidates, ctx)?;
		}
	}
	info!("TEN {:?}: {} room pages, {} polygons, {} tile candidates", version, pages.len(), ctx.faces(), candidates.len());
	Ok(TenLevel { version, pages, candidates })
}

/// Decodes the group's pages into `pages` when given, otherwise skips them. Returns the count.
fn read_texture_group<R: Read>(
	reader: &mut R,
	version: TenVersion,
	ctx: &ParseContext,
	mut pages: Option<&mut Vec<DecodedPage>>,
) -> Result<u32> {
	let count = reader.read_u32::<LE>()?;
	for _ in 0..count {
		ctx.check_cancel()?;
		let width = reader.read_i32::<LE>()?;
		let height = reader.read_i32::<LE>()?;
		let size = reader.read_u32::<LE>()? as usize;
		match pages.as_deref_mut() {
			Some(pages) => {
				let png = read_pooled(reader, size, ctx.pool)?;
				let page = DecodedPage::from_png(&png)?;
				if (page.width as i32, page.height as i32) != (width, height) {
					warn!("texture declared {}x{} decodes to {}x{}", width, height, page.width, page.height);
				}
				pages.push(page);
			},
			None => skip(reader, size as u64)?,
		}
		if version == TenVersion::V2 && reader.read_u8()? != 0 {
			let normal_map_size = reader.read_u32::<LE>()?;
			skip(reader, normal_map_size as u64)?;
		}
	}
	Ok(count)
}

fn read_name<R: Read>(reader: &mut R, version: TenVersion) -> Result<String> {
	let len = match version {
		TenVersion::V1 => reader.read_u8()? as usize,
		TenVersion::V2 => reader.read_u32::<LE>()? as usize,
	};
	let bytes = read_vec::<_, u8>(reader, len)?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_room<R: Read>(
	reader: &mut R,
	version: TenVersion,
	pages: &[DecodedPage],
	candidates: &mut Vec<TileCandidate>,
	ctx: &mut ParseContext,
) -> Result<()> {
	let name = read_name(reader, version)?;
	let info = RoomInfo::read(reader)?;
	trace!("room {:?} at {} ({}..{})", name, info.pos, info.y_top, info.y_bottom);
	let num_vertices = reader.read_u32::<LE>()? as u64;
	skip(reader, num_vertices * VERTEX_SIZE)?;
	let num_buckets = reader.read_u32::<LE>()?;
	for _ in 0..num_buckets {
		let bucket = BucketHeader::read(reader)?;
		let page = usize::try_from(bucket.texture).ok().and_then(|index| pages.get(index));
		if page.is_none() {
			warn!("bucket texture {} of {} room pages", bucket.texture, pages.len());
		}
		let num_polys = reader.read_u32::<LE>()?;
		for _ in 0..num_polys {
			let shape = match reader.read_i32::<LE>()? {
				SHAPE_QUAD => TileShape::Quad,
				SHAPE_TRIANGLE => TileShape::Triangle,
				other => return corrupt(format!("unknown polygon shape {}", other)),
			};
			let corners = shape.corners();
			skip(reader, corners as u64 * 4)?;//vertex indices
			let uvs = read_vec::<_, [f32; 2]>(reader, corners)?;
			ctx.polygon()?;
			let Some(page) = page else {
				continue;
			};
			let texels = uvs.iter().map(|&[u, v]| UVec2::new(uv_to_texel(u, page.width), uv_to_texel(v, page.height)));
			if let Some(bounds) = texels.min_max() {
				candidates.push(TileCandidate {
					page: bucket.texture as u32,
					bounds,
					shape,
					edge_used: false,
					mapping_correction: 0,
					animated: bucket.animated != 0,
				});
			}
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use byteorder::WriteBytesExt;
	use shared::{BufferPool, CancelToken};
	use crate::Error;
	use super::*;
	
	#[test]
	fn names_by_version() {
		let mut v1 = vec![3];
		v1.extend_from_slice(b"abc");
		assert_eq!(read_name(&mut Cursor::new(v1), TenVersion::V1).unwrap(), "abc");
		let mut v2 = Vec::new();
		v2.write_u32::<LE>(4).unwrap();
		v2.extend_from_slice("Hall".as_bytes());
		assert_eq!(read_name(&mut Cursor::new(v2), TenVersion::V2).unwrap(), "Hall");
	}
	
	#[test]
	fn unknown_shape_is_corrupt() {
		let mut room = vec![0];//empty name
		room.extend_from_slice(&[0; 20]);
		room.write_u32::<LE>(0).unwrap();//vertices
		room.write_u32::<LE>(1).unwrap();
		room.write_i32::<LE>(0).unwrap();
		room.extend_from_slice(&[0, 0]);
		room.write_u32::<LE>(1).unwrap();
		room.write_i32::<LE>(7).unwrap();
		let (pool, cancel) = (BufferPool::new(), CancelToken::new());
		let mut ctx = ParseContext::new(&pool, &cancel, true);
		let result = read_room(&mut Cursor::new(room), TenVersion::V1, &[], &mut Vec::new(), &mut ctx);
		assert!(matches!(result, Err(Error::CorruptData(_))));
	}
	
	#[test]
	fn skipped_groups_step_over_normal_maps() {
		let mut group = Vec::new();
		group.write_u32::<LE>(1).unwrap();
		group.write_i32::<LE>(8).unwrap();
		group.write_i32::<LE>(8).unwrap();
		group.write_u32::<LE>(3).unwrap();
		group.extend_from_slice(&[1, 2, 3]);
		group.push(1);
		group.write_u32::<LE>(2).unwrap();
		group.extend_from_slice(&[4, 5]);
		group.push(0xCC);
		let (pool, cancel) = (BufferPool::new(), CancelToken::new());
		let ctx = ParseContext::new(&pool, &cancel, true);
		let mut reader = Cursor::new(group);
		assert_eq!(read_texture_group(&mut reader, TenVersion::V2, &ctx, None).unwrap(), 1);
		assert_eq!(reader.read_u8().unwrap(), 0xCC);
	}
}
