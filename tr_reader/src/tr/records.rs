use bitfield::bitfield;
use glam::U16Vec2;
use crate::{geometry::{ObjectTexture, TileShape}, Readable};

bitfield! {
	#[derive(Readable, Clone, Copy)]
	pub struct FaceTexture(u16);
	pub object_texture, _: 14, 0;//id into object textures
	pub double_sided, _: 15;
}

pub trait Face: Readable {
	const SHAPE: TileShape;
	fn texture(&self) -> FaceTexture;
}

/// Room face of TR1-4 and textured mesh face of TR1-3.
#[derive(Readable, Clone, Copy)]
pub struct PlainFace<const N: usize> {
	pub vertices: [u16; N],
	pub texture: FaceTexture,
}

/// Mesh face of TR4-5 and room face of TR5, followed by an effects word.
#[derive(Readable, Clone, Copy)]
#[skip_after(2)]
pub struct EffectsFace<const N: usize> {
	pub vertices: [u16; N],
	pub texture: FaceTexture,
}

macro_rules! impl_face {
	($type:ident) => {
		impl Face for $type<4> {
			const SHAPE: TileShape = TileShape::Quad;
			fn texture(&self) -> FaceTexture { self.texture }
		}
		
		impl Face for $type<3> {
			const SHAPE: TileShape = TileShape::Triangle;
			fn texture(&self) -> FaceTexture { self.texture }
		}
	};
}

impl_face!(PlainFace);
impl_face!(EffectsFace);

bitfield! {
	#[derive(Readable, Clone, Copy)]
	pub struct TileWord(u16);
	pub page, _: 14, 0;//id into atlas pages
	pub triangle, _: 15;
}

bitfield! {
	#[derive(Readable, Clone, Copy)]
	pub struct TextureFlags(u16);
	pub mapping_correction, _: 3, 0;
	pub bump_mapping, _: 10, 9;
	pub room_texture, _: 15;
}

#[derive(Readable, Clone, Copy)]
pub struct ObjectTextureTr1 {
	pub blend_mode: u16,
	pub tile: TileWord,
	pub corners: [U16Vec2; 4],
}

#[derive(Readable, Clone, Copy)]
pub struct ObjectTextureTr4 {
	pub blend_mode: u16,
	pub tile: TileWord,
	pub flags: TextureFlags,
	pub corners: [U16Vec2; 4],
	pub original_pos: [u32; 2],
	pub original_size: [u32; 2],
}

#[derive(Readable, Clone, Copy)]
#[skip_after(2)]
pub struct ObjectTextureTr5 {
	pub texture: ObjectTextureTr4,
}

impl From<ObjectTextureTr1> for ObjectTexture {
	fn from(texture: ObjectTextureTr1) -> Self {
		ObjectTexture {
			page: texture.tile.page() as u32,
			corners: texture.corners,
			triangle: None,
			mapping_correction: 0,
		}
	}
}

impl From<ObjectTextureTr4> for ObjectTexture {
	fn from(texture: ObjectTextureTr4) -> Self {
		ObjectTexture {
			page: texture.tile.page() as u32,
			corners: texture.corners,
			triangle: Some(texture.tile.triangle()),
			mapping_correction: texture.flags.mapping_correction() as u8,
		}
	}
}

impl From<ObjectTextureTr5> for ObjectTexture {
	fn from(texture: ObjectTextureTr5) -> Self {
		texture.texture.into()
	}
}

/// Entry of a TR5 room's layer table.
#[derive(Readable, Clone, Copy)]
#[skip_after(46)]
pub struct Layer {
	pub num_vertices: u32,
	#[skip(2)]
	pub num_quads: u16,
	pub num_tris: u16,
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use super::*;
	
	#[test]
	fn tr4_object_texture_layout() {
		let mut bytes = vec![
			0x02, 0x00,//blend mode
			0x03, 0x80,//page 3, triangle
			0x05, 0x00,//mapping correction 5
		];
		for corner in [0x0100u16, 0x0200, 0x0300, 0x0400, 0x0500, 0x0600, 0, 0] {
			bytes.extend_from_slice(&corner.to_le_bytes());
		}
		bytes.extend_from_slice(&[0; 16]);
		bytes.extend_from_slice(&[0xEE; 2]);
		assert_eq!(bytes.len(), 40);
		let mut reader = Cursor::new(bytes);
		let texture: ObjectTexture = ObjectTextureTr5::read(&mut reader).unwrap().into();
		assert_eq!(reader.position(), 40);
		assert_eq!(texture.page, 3);
		assert_eq!(texture.triangle, Some(true));
		assert_eq!(texture.mapping_correction, 5);
		assert_eq!(texture.corners[2], U16Vec2::new(0x0500, 0x0600));
	}
	
	#[test]
	fn face_texture_masks_flag() {
		let mut reader = Cursor::new([1, 0, 2, 0, 3, 0, 4, 0, 0x07, 0x80, 9, 9]);
		let face = EffectsFace::<4>::read(&mut reader).unwrap();
		assert_eq!(face.texture().object_texture(), 7);
		assert!(face.texture().double_sided());
		assert_eq!(reader.position(), 12);
	}
	
	#[test]
	fn layer_is_56_bytes() {
		let mut bytes = vec![0u8; 56];
		bytes[6] = 3;
		bytes[8] = 2;
		let mut reader = Cursor::new(bytes);
		let layer = Layer::read(&mut reader).unwrap();
		assert_eq!((layer.num_quads, layer.num_tris), (3, 2));
		assert_eq!(reader.position(), 56);
	}
}
