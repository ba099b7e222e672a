use std::io::{Cursor, Read, Seek, SeekFrom};
use byteorder::{ReadBytesExt, LE};
use log::{debug, info, warn};
use crate::{
	context::ParseContext,
	error::{corrupt, Result},
	geometry::ObjectTexture,
	pixels::{decode_argb1555, decode_indexed, Color24Bit, RawAtlas, PALETTE_LEN},
	read_vec, skip, skip_list,
	stream::{read_compressed, read_pooled, skip_compressed, BoundedReader},
	version::*,
	Readable, BYTES_PER_PIXEL, PAGE_PIXELS,
};
use super::{expect_marker, mesh::read_meshes, records::*, room::{read_rooms, read_xela_rooms}};

/// Largest unconsumed tail of the animated texture section tolerated in TR4 levels.
pub const ANIMATED_GAP_TOLERANCE: usize = 16;

const PALETTE_8_SIZE: u64 = 768;
const PALETTE_16_SIZE: u64 = 1024;
const TR5_HEADER_EXTRA_SIZE: u64 = 32;

pub struct TrLevel<'a> {
	pub version: TrVersion,
	pub atlas: RawAtlas<'a>,
	/// Empty when geometry is not scanned.
	pub object_textures: Vec<ObjectTexture>,
	pub ng_header: bool,
}

/// Reads a level whose magic has already been consumed.
/// With `ctx.scan_geometry` off, reading stops as soon as the atlas pixels are known.
pub fn read_level<'a, R: Read + Seek>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext<'a>) -> Result<TrLevel<'a>> {
	let ng_header = version == TrVersion::Tr4 && has_ng_header(reader)?;
	let (atlas, object_textures) = match version {
		TrVersion::Tr1 => read_tr1(reader, ctx)?,
		TrVersion::Tr2 | TrVersion::Tr3 => read_tr23(reader, version, ctx)?,
		TrVersion::Tr4 => read_tr4(reader, ctx)?,
		TrVersion::Tr5 => read_tr5(reader, ctx)?,
	};
	if ctx.scan_geometry {
		ctx.resolve_animated();
	}
	info!(
		"{:?}: {} pages, {} object textures, {} faces{}",
		version, atlas.num_pages(), object_textures.len(), ctx.faces(), if ng_header { ", NG header" } else { "" },
	);
	Ok(TrLevel { version, atlas, object_textures, ng_header })
}

fn has_ng_header<R: Read + Seek>(reader: &mut R) -> Result<bool> {
	let pos = reader.stream_position()?;
	let len = reader.seek(SeekFrom::End(0))?;
	let mut found = false;
	if len >= pos + 8 {
		reader.seek(SeekFrom::End(-8))?;
		let mut marker = [0; 4];
		reader.read_exact(&mut marker)?;
		found = &marker == b"NGLE";
	}
	reader.seek(SeekFrom::Start(pos))?;
	Ok(found)
}

/// Byte size of `num_pages` pages of `bytes_per_texel`, if it fits in memory at all.
fn pages_len(num_pages: usize, bytes_per_texel: usize) -> Result<usize> {
	match num_pages.checked_mul(PAGE_PIXELS * bytes_per_texel) {
		Some(len) => Ok(len),
		None => corrupt(format!("{} pages declared", num_pages)),
	}
}

fn read_tr1<'a, R: Read>(reader: &mut R, ctx: &mut ParseContext<'a>) -> Result<(RawAtlas<'a>, Vec<ObjectTexture>)> {
	let num_pages = reader.read_u32::<LE>()? as usize;
	ctx.page_count = num_pages;
	let indexed = read_pooled(reader, pages_len(num_pages, 1)?, ctx.pool)?;
	skip(reader, 4)?;//unused
	let object_textures = read_classic_body(reader, TrVersion::Tr1, ctx)?;
	skip_list::<_, u32>(reader, TrVersion::Tr1.entity_size())?;
	skip(reader, LIGHT_MAP_SIZE)?;
	let palette = <[Color24Bit; PALETTE_LEN]>::read(reader)?;
	let mut pixels = ctx.pool.rent(pages_len(num_pages, BYTES_PER_PIXEL)?);
	decode_indexed(&indexed, &palette, &mut pixels);
	Ok((RawAtlas::new(pixels, num_pages)?, object_textures))
}

fn read_tr23<'a, R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext<'a>) -> Result<(RawAtlas<'a>, Vec<ObjectTexture>)> {
	skip(reader, PALETTE_8_SIZE + PALETTE_16_SIZE)?;
	let num_pages = reader.read_u32::<LE>()? as usize;
	ctx.page_count = num_pages;
	skip(reader, pages_len(num_pages, 1)? as u64)?;//8-bit pages
	let atlas = {
		let words = read_pooled(reader, pages_len(num_pages, 2)?, ctx.pool)?;
		let mut pixels = ctx.pool.rent(pages_len(num_pages, BYTES_PER_PIXEL)?);
		decode_argb1555(&words, &mut pixels);
		RawAtlas::new(pixels, num_pages)?
	};
	if !ctx.scan_geometry {
		return Ok((atlas, Vec::new()));
	}
	skip(reader, 4)?;//unused
	let object_textures = read_classic_body(reader, version, ctx)?;
	Ok((atlas, object_textures))
}

/// Rooms through animated textures for TR1-3.
fn read_classic_body<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<Vec<ObjectTexture>> {
	read_rooms(reader, version, ctx)?;
	skip_list::<_, u32>(reader, FLOOR_DATA_WORD_SIZE)?;
	read_meshes(reader, version, ctx)?;
	skip_animation_sections(reader, version)?;
	skip_list::<_, u32>(reader, STATIC_MESH_SIZE)?;
	let mut object_textures = Vec::new();
	if version != TrVersion::Tr3 {
		object_textures = read_object_textures::<ObjectTextureTr1, _>(reader, version, ctx)?;
	}
	skip_list::<_, u32>(reader, SPRITE_TEXTURE_SIZE)?;
	skip_list::<_, u32>(reader, SPRITE_SEQUENCE_SIZE)?;
	skip_list::<_, u32>(reader, CAMERA_SIZE)?;
	skip_list::<_, u32>(reader, SOUND_SOURCE_SIZE)?;
	skip_boxes(reader, version)?;
	read_animated_ranges(reader, version, ctx)?;
	if version == TrVersion::Tr3 {
		object_textures = read_object_textures::<ObjectTextureTr1, _>(reader, version, ctx)?;
	}
	Ok(object_textures)
}

fn read_page_counts<R: Read>(reader: &mut R) -> Result<usize> {
	let mut counts = [0; 3];
	reader.read_u16_into::<LE>(&mut counts)?;
	debug!("room/object/bump pages: {:?}", counts);
	Ok(counts.iter().map(|&count| count as usize).sum())
}

fn read_tr4<'a, R: Read>(reader: &mut R, ctx: &mut ParseContext<'a>) -> Result<(RawAtlas<'a>, Vec<ObjectTexture>)> {
	let num_pages = read_page_counts(reader)?;
	ctx.page_count = num_pages;
	let atlas = RawAtlas::new(read_compressed(reader, ctx.pool, ctx.cancel)?, num_pages)?;
	if !ctx.scan_geometry {
		return Ok((atlas, Vec::new()));
	}
	skip_compressed(reader)?;//16-bit pages
	skip_compressed(reader)?;//misc pages
	let level_data = read_compressed(reader, ctx.pool, ctx.cancel)?;
	let object_textures = read_tr45_body(&mut Cursor::new(&level_data[..]), TrVersion::Tr4, ctx)?;
	Ok((atlas, object_textures))
}

fn read_tr5<'a, R: Read>(reader: &mut R, ctx: &mut ParseContext<'a>) -> Result<(RawAtlas<'a>, Vec<ObjectTexture>)> {
	let num_pages = read_page_counts(reader)?;
	ctx.page_count = num_pages;
	let atlas = RawAtlas::new(read_compressed(reader, ctx.pool, ctx.cancel)?, num_pages)?;
	if !ctx.scan_geometry {
		return Ok((atlas, Vec::new()));
	}
	skip_compressed(reader)?;//16-bit pages
	skip_compressed(reader)?;//misc pages
	skip(reader, TR5_HEADER_EXTRA_SIZE)?;//lara type, weather, padding
	reader.read_u32::<LE>()?;//uncompressed level size
	let level_size = reader.read_u32::<LE>()? as u64;
	let object_textures = read_tr45_body(&mut BoundedReader::new(&mut *reader, level_size), TrVersion::Tr5, ctx)?;
	Ok((atlas, object_textures))
}

/// Level data of TR4 (after inflating) and TR5, through object textures.
fn read_tr45_body<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<Vec<ObjectTexture>> {
	skip(reader, 4)?;//unused
	match version {
		TrVersion::Tr5 => read_xela_rooms(reader, ctx)?,
		_ => read_rooms(reader, version, ctx)?,
	}
	skip_list::<_, u32>(reader, FLOOR_DATA_WORD_SIZE)?;
	read_meshes(reader, version, ctx)?;
	skip_animation_sections(reader, version)?;
	skip_list::<_, u32>(reader, STATIC_MESH_SIZE)?;
	let (spr, tex): (&[u8], &[u8]) = match version {
		TrVersion::Tr5 => (b"SPR\0", b"TEX\0"),
		_ => (b"SPR", b"TEX"),
	};
	expect_marker(reader, spr)?;
	skip_list::<_, u32>(reader, SPRITE_TEXTURE_SIZE)?;
	skip_list::<_, u32>(reader, SPRITE_SEQUENCE_SIZE)?;
	skip_list::<_, u32>(reader, CAMERA_SIZE)?;
	skip_list::<_, u32>(reader, FLYBY_CAMERA_SIZE)?;
	skip_list::<_, u32>(reader, SOUND_SOURCE_SIZE)?;
	skip_boxes(reader, version)?;
	read_animated_ranges(reader, version, ctx)?;
	reader.read_u8()?;//animated texture uv count
	expect_marker(reader, tex)?;
	match version {
		TrVersion::Tr5 => read_object_textures::<ObjectTextureTr5, _>(reader, version, ctx),
		_ => read_object_textures::<ObjectTextureTr4, _>(reader, version, ctx),
	}
}

/// Animations, state changes, dispatches, commands, mesh trees, frames and moveables.
fn skip_animation_sections<R: Read>(reader: &mut R, version: TrVersion) -> Result<()> {
	for size in [
		version.animation_size(),
		STATE_CHANGE_SIZE,
		ANIM_DISPATCH_SIZE,
		ANIM_COMMAND_SIZE,
		MESH_TREE_SIZE,
		FRAME_WORD_SIZE,
		version.moveable_size(),
	] {
		skip_list::<_, u32>(reader, size)?;
	}
	Ok(())
}

fn skip_boxes<R: Read>(reader: &mut R, version: TrVersion) -> Result<()> {
	let num_boxes = skip_list::<_, u32>(reader, version.box_size())?;
	skip_list::<_, u32>(reader, OVERLAP_SIZE)?;
	skip(reader, num_boxes * version.zone_words_per_box() * 2)?;
	Ok(())
}

fn read_object_textures<T, R>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<Vec<ObjectTexture>>
where T: Readable + Into<ObjectTexture>, R: Read {
	if !ctx.scan_geometry {
		skip_list::<_, u32>(reader, version.object_texture_size())?;
		return Ok(Vec::new());
	}
	let num = reader.read_u32::<LE>()? as usize;
	let mut textures = Vec::with_capacity(num.min(0x8000));
	for _ in 0..num {
		ctx.check_cancel()?;
		textures.push(T::read(reader)?.into());
	}
	debug!("{} object textures", num);
	Ok(textures)
}

/// Reads the u32-counted animated texture words: a range count, then per range
/// `count - 1` followed by `count` object texture slots.
pub fn read_animated_ranges<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	let num_words = reader.read_u32::<LE>()? as usize;
	if !ctx.scan_geometry {
		skip(reader, num_words as u64 * 2)?;
		return Ok(());
	}
	let words = read_vec::<_, u16>(reader, num_words)?;
	let Some((&num_ranges, mut rest)) = words.split_first() else {
		return Ok(());
	};
	for _ in 0..num_ranges {
		let Some((&last, tail)) = rest.split_first() else {
			return corrupt(format!("animated textures overrun {} declared words", num_words));
		};
		let len = last as usize + 1;
		if tail.len() < len {
			return corrupt(format!("animated textures overrun {} declared words", num_words));
		}
		let (slots, tail) = tail.split_at(len);
		ctx.add_animated_range(slots.into());
		rest = tail;
	}
	match rest.len() {
		0 => {},
		gap if version == TrVersion::Tr4 && gap <= ANIMATED_GAP_TOLERANCE => {
			warn!("animated textures declare {} words more than their ranges use", gap);
		},
		gap => return corrupt(format!("animated textures leave {} of {} declared words unused", gap, num_words)),
	}
	Ok(())
}
