use std::{collections::BTreeSet, io::{Cursor, Read}};
use byteorder::{ReadBytesExt, LE};
use log::debug;
use crate::{
	context::ParseContext, error::{corrupt, Result}, read_list, skip, skip_list, stream::read_pooled,
	version::TrVersion,
};
use super::{overrun, records::{EffectsFace, PlainFace}, scan_faces};

const MESH_HEADER_SIZE: u64 = 10;
const MESH_VERTEX_SIZE: u64 = 6;
const MESH_NORMAL_SIZE: u64 = 6;
const MESH_LIGHT_SIZE: u64 = 2;
const MESH_POINTER_SIZE: u64 = 4;

/// Reads the mesh word blob and its pointer table, scanning every distinct mesh once.
pub fn read_meshes<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	let data_len = reader.read_u32::<LE>()? as usize * 2;
	if !ctx.scan_geometry {
		skip(reader, data_len as u64)?;
		skip_list::<_, u32>(reader, MESH_POINTER_SIZE)?;
		return Ok(());
	}
	let data = read_pooled(reader, data_len, ctx.pool)?;
	let pointers = read_list::<_, u32, u32>(reader)?;
	let offsets = pointers.iter().copied().collect::<BTreeSet<_>>();
	for &offset in &offsets {
		ctx.check_cancel()?;
		let Some(mesh) = data.get(offset as usize..) else {
			return corrupt(format!("mesh pointer {} past {} bytes of mesh data", offset, data_len));
		};
		scan_mesh(&mut Cursor::new(mesh), version, ctx).map_err(overrun("mesh"))?;
	}
	debug!("{} meshes scanned", offsets.len());
	Ok(())
}

fn scan_mesh<R: Read>(reader: &mut R, version: TrVersion, ctx: &mut ParseContext) -> Result<()> {
	skip(reader, MESH_HEADER_SIZE)?;
	skip_list::<_, u16>(reader, MESH_VERTEX_SIZE)?;
	let num_normals = reader.read_i16::<LE>()?;
	match num_normals > 0 {
		true => skip(reader, num_normals as u64 * MESH_NORMAL_SIZE)?,
		false => skip(reader, num_normals.unsigned_abs() as u64 * MESH_LIGHT_SIZE)?,
	}
	match version {
		TrVersion::Tr1 | TrVersion::Tr2 | TrVersion::Tr3 => {
			scan_faces::<PlainFace<4>, _>(reader, ctx)?;
			scan_faces::<PlainFace<3>, _>(reader, ctx)?;
		},
		TrVersion::Tr4 | TrVersion::Tr5 => {
			scan_faces::<EffectsFace<4>, _>(reader, ctx)?;
			scan_faces::<EffectsFace<3>, _>(reader, ctx)?;
		},
	}
	Ok(())
}
