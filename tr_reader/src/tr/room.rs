use std::io::{Cursor, Read};
use byteorder::{ReadBytesExt, LE};
use log::trace;
use crate::{
	context::ParseContext, error::Result, read_vec, skip, skip_list, stream::{read_pooled, BoundedReader},
	version::{TrVersion, PORTAL_SIZE, SECTOR_SIZE},
};
use super::{expect_marker, overrun, records::{EffectsFace, Layer, PlainFace}, scan_face_run, scan_faces};

const SPRITE_SIZE: u64 = 4;
const ROOM_INFO_SIZE: u64 = 16;
const XELA_HEADER_SIZE: u64 = 208;
const XELA_NUM_LAYERS: u64 = 168;
const XELA_LAYER_OFFSET: u64 = 172;
const XELA_POLY_OFFSET: u64 = 180;

/// Reads the u16-counted rooms of TR1-4, recording their face texture references.
pub fn read_rooms<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	let num_rooms = reader.read_u16::<LE>()?;
	for index in 0..num_rooms {
		ctx.check_cancel()?;
		read_room(reader, version, ctx)?;
		trace!("room {} read, {} faces so far", index, ctx.faces());
	}
	Ok(())
}

fn read_room<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	skip(reader, ROOM_INFO_SIZE)?;
	let geom_len = reader.read_u32::<LE>()? as u64 * 2;
	if ctx.scan_geometry {
		let mut geom = BoundedReader::new(&mut *reader, geom_len);
		scan_room_geometry(&mut geom, version, ctx).map_err(overrun("room geometry"))?;
		geom.finish()?;
	} else {
		skip(reader, geom_len)?;
	}
	skip_list::<_, u16>(reader, PORTAL_SIZE)?;
	let num_z = reader.read_u16::<LE>()? as u64;
	let num_x = reader.read_u16::<LE>()? as u64;
	skip(reader, num_z * num_x * SECTOR_SIZE)?;
	skip(reader, version.room_ambient_size())?;
	skip_list::<_, u16>(reader, version.room_light_size())?;
	skip_list::<_, u16>(reader, version.room_static_mesh_size())?;
	skip(reader, version.room_trailer_size())?;
	Ok(())
}

fn scan_room_geometry<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	skip_list::<_, u16>(reader, version.room_vertex_size())?;
	scan_faces::<PlainFace<4>, _>(reader, ctx)?;
	scan_faces::<PlainFace<3>, _>(reader, ctx)?;
	skip_list::<_, u16>(reader, SPRITE_SIZE)?;
	Ok(())
}

/// Reads the u32-counted XELA room blobs of TR5.
pub fn read_xela_rooms<R: Read>(reader: &mut R, ctx: &mut ParseContext) -> Result<()> {
	let num_rooms = reader.read_u32::<LE>()?;
	for index in 0..num_rooms {
		ctx.check_cancel()?;
		expect_marker(reader, b"XELA")?;
		let size = reader.read_u32::<LE>()? as usize;
		if !ctx.scan_geometry {
			skip(reader, size as u64)?;
			continue;
		}
		let blob = read_pooled(reader, size, ctx.pool)?;
		scan_xela(&blob, ctx).map_err(overrun("XELA room"))?;
		trace!("room {} read, {} faces so far", index, ctx.faces());
	}
	Ok(())
}

/// Layer and polygon offsets count from the end of the header.
fn scan_xela(blob: &[u8], ctx: &mut ParseContext) -> Result<()> {
	let mut reader = Cursor::new(blob);
	reader.set_position(XELA_NUM_LAYERS);
	let num_layers = reader.read_u32::<LE>()? as usize;
	reader.set_position(XELA_LAYER_OFFSET);
	let layer_offset = reader.read_u32::<LE>()? as u64;
	reader.set_position(XELA_POLY_OFFSET);
	let poly_offset = reader.read_u32::<LE>()? as u64;
	reader.set_position(XELA_HEADER_SIZE + layer_offset);
	let layers = read_vec::<_, Layer>(&mut reader, num_layers)?;
	reader.set_position(XELA_HEADER_SIZE + poly_offset);
	for layer in &layers {
		scan_face_run::<EffectsFace<4>, _>(&mut reader, layer.num_quads as usize, ctx)?;
		scan_face_run::<EffectsFace<3>, _>(&mut reader, layer.num_tris as usize, ctx)?;
	}
	Ok(())
}
