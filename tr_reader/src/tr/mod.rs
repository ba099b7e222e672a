//! TR1-TR5 level parsing. Only the atlas pixels and the geometry's texture usage are kept.

mod mesh;
mod records;
mod room;
mod sections;

use std::io::{self, Read};
use crate::{context::ParseContext, error::{Error, Result}};

pub use mesh::read_meshes;
pub use records::{EffectsFace, Face, FaceTexture, Layer, ObjectTextureTr1, ObjectTextureTr4, ObjectTextureTr5, PlainFace};
pub use room::{read_rooms, read_xela_rooms};
pub use sections::{read_animated_ranges, read_level, TrLevel, ANIMATED_GAP_TOLERANCE};

/// Reads a u16 face count then that many faces.
pub(crate) fn scan_faces<F: Face, R: Read>(reader: &mut R, ctx: &mut ParseContext) -> Result<()> {
	let mut count = [0; 2];
	reader.read_exact(&mut count)?;
	scan_face_run::<F, _>(reader, u16::from_le_bytes(count) as usize, ctx)
}

pub(crate) fn scan_face_run<F: Face, R: Read>(reader: &mut R, count: usize, ctx: &mut ParseContext) -> Result<()> {
	for _ in 0..count {
		let face = F::read(reader)?;
		ctx.use_slot(face.texture().object_texture(), F::SHAPE)?;
	}
	Ok(())
}

/// Turns running off the end of a sized region into `CorruptData`.
pub(crate) fn overrun(what: &'static str) -> impl Fn(Error) -> Error {
	move |err| match err {
		Error::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
			Error::CorruptData(format!("{} overruns its declared size", what))
		},
		err => err,
	}
}

pub(crate) fn expect_marker<R: Read>(reader: &mut R, marker: &[u8]) -> Result<()> {
	let mut found = [0; 4];
	let found = &mut found[..marker.len()];
	reader.read_exact(found)?;
	match found == marker {
		true => Ok(()),
		false => Err(Error::CorruptData(format!(
			"expected {:?} marker, found {:?}", String::from_utf8_lossy(marker), String::from_utf8_lossy(found),
		))),
	}
}
