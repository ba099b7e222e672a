#![allow(dead_code)]

use std::io::Cursor;
use byteorder::{WriteBytesExt, BE, LE};
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

pub const PAGE_PIXELS: usize = 256 * 256;

pub fn adler32(data: &[u8]) -> u32 {
	let (mut a, mut b) = (1u32, 0u32);
	for &byte in data {
		a = (a + byte as u32) % 65521;
		b = (b + a) % 65521;
	}
	(b << 16) | a
}

/// zlib stream made of stored deflate blocks.
pub fn zlib_stored(data: &[u8]) -> Vec<u8> {
	let mut out = vec![0x78, 0x01];
	let mut chunks = data.chunks(0xFFFF).peekable();
	if chunks.peek().is_none() {
		out.extend_from_slice(&[1, 0, 0, 0xFF, 0xFF]);
	}
	while let Some(chunk) = chunks.next() {
		out.push(chunks.peek().is_none() as u8);
		out.write_u16::<LE>(chunk.len() as u16).unwrap();
		out.write_u16::<LE>(!(chunk.len() as u16)).unwrap();
		out.extend_from_slice(chunk);
	}
	out.write_u32::<BE>(adler32(data)).unwrap();
	out
}

pub fn write_compressed(out: &mut Vec<u8>, data: &[u8]) {
	let compressed = zlib_stored(data);
	out.write_u32::<LE>(data.len() as u32).unwrap();
	out.write_u32::<LE>(compressed.len() as u32).unwrap();
	out.extend_from_slice(&compressed);
}

pub fn ufixed(texel: u16) -> u16 {
	texel << 8
}

/// Room geometry word blob: one vertex of `vertex_size` bytes, then the faces.
pub fn room_geometry(vertex_size: usize, quads: &[u16], tris: &[u16]) -> Vec<u8> {
	let mut geom = Vec::new();
	geom.write_u16::<LE>(1).unwrap();
	geom.extend(std::iter::repeat(0).take(vertex_size));
	geom.write_u16::<LE>(quads.len() as u16).unwrap();
	for &texture in quads {
		geom.extend_from_slice(&[0; 8]);
		geom.write_u16::<LE>(texture).unwrap();
	}
	geom.write_u16::<LE>(tris.len() as u16).unwrap();
	for &texture in tris {
		geom.extend_from_slice(&[0; 6]);
		geom.write_u16::<LE>(texture).unwrap();
	}
	geom.write_u16::<LE>(0).unwrap();//sprites
	geom
}

pub struct RoomLayout {
	pub vertex: usize,
	pub ambient: usize,
	pub light: usize,
	pub trailer: usize,
}

pub const TR1_ROOM: RoomLayout = RoomLayout { vertex: 8, ambient: 2, light: 18, trailer: 4 };
pub const TR2_ROOM: RoomLayout = RoomLayout { vertex: 12, ambient: 6, light: 24, trailer: 4 };
pub const TR3_ROOM: RoomLayout = RoomLayout { vertex: 12, ambient: 4, light: 24, trailer: 7 };
pub const TR4_ROOM: RoomLayout = RoomLayout { vertex: 12, ambient: 4, light: 46, trailer: 7 };

pub fn room(layout: &RoomLayout, quads: &[u16], tris: &[u16]) -> Vec<u8> {
	let geom = room_geometry(layout.vertex, quads, tris);
	let mut room = vec![0; 16];
	room.write_u32::<LE>(geom.len() as u32 / 2).unwrap();
	room.extend_from_slice(&geom);
	room.write_u16::<LE>(0).unwrap();//portals
	room.write_u16::<LE>(1).unwrap();
	room.write_u16::<LE>(1).unwrap();
	room.extend_from_slice(&[0; 8]);
	room.extend(std::iter::repeat(0).take(layout.ambient));
	room.write_u16::<LE>(1).unwrap();
	room.extend(std::iter::repeat(0).take(layout.light));
	room.write_u16::<LE>(0).unwrap();//static meshes
	room.extend(std::iter::repeat(0).take(layout.trailer));
	room
}

fn empty_lists(out: &mut Vec<u8>, count: usize) {
	for _ in 0..count {
		out.write_u32::<LE>(0).unwrap();
	}
}

/// Corners of an axis-aligned rectangle in texels.
pub fn rect_corners(x: u16, y: u16, w: u16, h: u16) -> [(u16, u16); 4] {
	[(x, y), (x + w, y), (x + w, y + h), (x, y + h)].map(|(x, y)| (ufixed(x), ufixed(y)))
}

pub fn write_corners(out: &mut Vec<u8>, corners: [(u16, u16); 4]) {
	for (x, y) in corners {
		out.write_u16::<LE>(x).unwrap();
		out.write_u16::<LE>(y).unwrap();
	}
}

/// TR1 level with `num_pages` pages of palette index 1, one room with the given faces,
/// and 20 byte object textures with the given corners on page 0.
pub fn tr1_level(num_pages: usize, quads: &[u16], textures: &[[(u16, u16); 4]]) -> Vec<u8> {
	let mut out = Vec::new();
	out.write_u32::<LE>(0x20).unwrap();
	out.write_u32::<LE>(num_pages as u32).unwrap();
	out.extend(std::iter::repeat(1).take(num_pages * PAGE_PIXELS));
	out.write_u32::<LE>(0).unwrap();//unused
	out.write_u16::<LE>(1).unwrap();
	out.extend(room(&TR1_ROOM, quads, &[]));
	empty_lists(&mut out, 1);//floor data
	empty_lists(&mut out, 2);//mesh words, mesh pointers
	empty_lists(&mut out, 7);//animations .. moveables
	empty_lists(&mut out, 1);//static meshes
	write_classic_textures(&mut out, textures);
	empty_lists(&mut out, 4);//sprite textures, sequences, cameras, sound sources
	empty_lists(&mut out, 2);//boxes, overlaps
	empty_lists(&mut out, 1);//animated textures
	empty_lists(&mut out, 1);//entities
	out.extend_from_slice(&[0; 8192]);
	let mut palette = [0u8; 768];
	palette[3..6].copy_from_slice(&[10, 20, 30]);
	out.extend_from_slice(&palette);
	out
}

fn write_classic_textures(out: &mut Vec<u8>, textures: &[[(u16, u16); 4]]) {
	out.write_u32::<LE>(textures.len() as u32).unwrap();
	for &corners in textures {
		out.write_u16::<LE>(0).unwrap();//blend mode
		out.write_u16::<LE>(0).unwrap();//page
		write_corners(out, corners);
	}
}

/// ARGB1555 page where texel (x, y) decodes to `[56, y & !7, x & !7, 255]`.
pub fn argb1555_page() -> Vec<u8> {
	let mut out = Vec::with_capacity(PAGE_PIXELS * 2);
	for i in 0..PAGE_PIXELS {
		let (x, y) = ((i % 256) as u16, (i / 256) as u16);
		out.write_u16::<LE>(0x8000 | (x >> 3) << 10 | (y >> 3) << 5 | 7).unwrap();
	}
	out
}

/// TR2 or TR3 level with one 16-bit page, one room with the given quads
/// and object textures on page 0. Ends after the object textures.
pub fn tr23_level(tr3: bool, quads: &[u16], textures: &[[(u16, u16); 4]]) -> Vec<u8> {
	let mut out = Vec::new();
	out.write_u32::<LE>(if tr3 { 0xFF080038 } else { 0x2D }).unwrap();
	out.extend_from_slice(&[0; 768 + 1024]);//palettes
	out.write_u32::<LE>(1).unwrap();
	out.extend(std::iter::repeat(0).take(PAGE_PIXELS));//8-bit page
	out.extend(argb1555_page());
	out.write_u32::<LE>(0).unwrap();//unused
	out.write_u16::<LE>(1).unwrap();
	out.extend(room(if tr3 { &TR3_ROOM } else { &TR2_ROOM }, quads, &[]));
	empty_lists(&mut out, 1);
	empty_lists(&mut out, 2);
	empty_lists(&mut out, 7);
	empty_lists(&mut out, 1);
	if !tr3 {
		write_classic_textures(&mut out, textures);
	}
	empty_lists(&mut out, 4);
	empty_lists(&mut out, 2);
	empty_lists(&mut out, 1);//animated textures
	if tr3 {
		write_classic_textures(&mut out, textures);
	}
	out
}

pub struct Tr4Texture {
	pub triangle: bool,
	pub mapping_correction: u16,
	pub corners: [(u16, u16); 4],
}

/// TR4 page where texel (x, y) is `[x, y, 7, 255]`.
pub fn tr4_page() -> Vec<u8> {
	(0..PAGE_PIXELS).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255]).collect()
}

pub fn tr4_level(quads: &[u16], tris: &[u16], textures: &[Tr4Texture], animated: &[u16]) -> Vec<u8> {
	let mut out = b"TR4\0".to_vec();
	for count in [1u16, 0, 0] {
		out.write_u16::<LE>(count).unwrap();
	}
	write_compressed(&mut out, &tr4_page());
	write_compressed(&mut out, &[0; 64]);//16-bit pages
	write_compressed(&mut out, &[]);//misc pages
	let mut level = Vec::new();
	level.write_u32::<LE>(0).unwrap();
	level.write_u16::<LE>(1).unwrap();
	level.extend(room(&TR4_ROOM, quads, tris));
	empty_lists(&mut level, 1);
	empty_lists(&mut level, 2);
	empty_lists(&mut level, 7);
	empty_lists(&mut level, 1);
	level.extend_from_slice(b"SPR");
	empty_lists(&mut level, 5);//sprite textures, sequences, cameras, flyby cameras, sound sources
	empty_lists(&mut level, 2);
	level.write_u32::<LE>(animated.len() as u32).unwrap();
	for &word in animated {
		level.write_u16::<LE>(word).unwrap();
	}
	level.push(0);
	level.extend_from_slice(b"TEX");
	write_tr4_textures(&mut level, textures, 0);
	empty_lists(&mut level, 1);//entities
	write_compressed(&mut out, &level);
	out
}

fn write_tr4_textures(out: &mut Vec<u8>, textures: &[Tr4Texture], padding: usize) {
	out.write_u32::<LE>(textures.len() as u32).unwrap();
	for texture in textures {
		out.write_u16::<LE>(0).unwrap();
		out.write_u16::<LE>((texture.triangle as u16) << 15).unwrap();
		out.write_u16::<LE>(texture.mapping_correction).unwrap();
		write_corners(out, texture.corners);
		out.extend_from_slice(&[0; 16]);
		out.extend(std::iter::repeat(0).take(padding));
	}
}

/// TR5 room blob: the XELA header, one layer, then its quads and triangles.
fn xela_room(quads: &[u16], tris: &[u16]) -> Vec<u8> {
	let mut blob = vec![0u8; 208];
	blob[168] = 1;//layers
	blob[180] = 56;//polygons after the layer table
	let mut layer = [0u8; 56];
	layer[6..8].copy_from_slice(&(quads.len() as u16).to_le_bytes());
	layer[8..10].copy_from_slice(&(tris.len() as u16).to_le_bytes());
	blob.extend_from_slice(&layer);
	for &texture in quads {
		blob.extend_from_slice(&[0; 8]);
		blob.write_u16::<LE>(texture).unwrap();
		blob.write_u16::<LE>(0).unwrap();//effects
	}
	for &texture in tris {
		blob.extend_from_slice(&[0; 6]);
		blob.write_u16::<LE>(texture).unwrap();
		blob.write_u16::<LE>(0).unwrap();
	}
	let mut room = b"XELA".to_vec();
	room.write_u32::<LE>(blob.len() as u32).unwrap();
	room.extend(blob);
	room
}

/// TR5 level (read with the `.trc` container) with one `tr4_page` room page
/// and an uncompressed level block ending after the object textures.
pub fn tr5_level(quads: &[u16], tris: &[u16], textures: &[Tr4Texture]) -> Vec<u8> {
	let mut out = b"TR4\0".to_vec();
	for count in [1u16, 0, 0] {
		out.write_u16::<LE>(count).unwrap();
	}
	write_compressed(&mut out, &tr4_page());
	write_compressed(&mut out, &[0; 64]);
	write_compressed(&mut out, &[]);
	out.extend_from_slice(&[0; 32]);//lara type, weather, padding
	let mut level = Vec::new();
	level.write_u32::<LE>(0).unwrap();
	level.write_u32::<LE>(1).unwrap();
	level.extend(xela_room(quads, tris));
	empty_lists(&mut level, 1);
	empty_lists(&mut level, 2);
	empty_lists(&mut level, 7);
	empty_lists(&mut level, 1);
	level.extend_from_slice(b"SPR\0");
	empty_lists(&mut level, 5);
	empty_lists(&mut level, 2);
	empty_lists(&mut level, 1);//animated textures
	level.push(0);
	level.extend_from_slice(b"TEX\0");
	write_tr4_textures(&mut level, textures, 2);
	out.write_u32::<LE>(level.len() as u32).unwrap();
	out.write_u32::<LE>(level.len() as u32).unwrap();
	out.extend(level);
	out.extend_from_slice(&[0xEE; 16]);//trailing sections, not read
	out
}

pub fn png(width: u32, height: u32, marked: (u32, u32)) -> Vec<u8> {
	let mut rgba = RgbaImage::from_pixel(width, height, Rgba([1, 1, 1, 255]));
	rgba.put_pixel(marked.0, marked.1, Rgba([10, 20, 30, 255]));
	let mut out = Cursor::new(Vec::new());
	DynamicImage::ImageRgba8(rgba).write_to(&mut out, ImageOutputFormat::Png).unwrap();
	out.into_inner()
}

pub struct TenPoly {
	pub uvs: Vec<[f32; 2]>,
}

/// TEN level with one room page and one room holding one bucket of polygons.
pub fn ten_level(v2: bool, page: &[u8], animated: bool, polys: &[TenPoly]) -> Vec<u8> {
	let mut out = b"TEN\0".to_vec();
	for v in [1, if v2 { 5 } else { 4 }, 0, 0] {
		out.write_i32::<LE>(v).unwrap();
	}
	out.write_u32::<LE>(0xDEADBEEF).unwrap();//system hash
	let mut level = Vec::new();
	level.write_u32::<LE>(1).unwrap();
	level.write_i32::<LE>(64).unwrap();
	level.write_i32::<LE>(32).unwrap();
	level.write_u32::<LE>(page.len() as u32).unwrap();
	level.extend_from_slice(page);
	if v2 {
		level.push(1);
		level.write_u32::<LE>(3).unwrap();
		level.extend_from_slice(&[9, 9, 9]);//normal map, skipped
	}
	empty_lists(&mut level, 5);
	level.write_u32::<LE>(1).unwrap();
	match v2 {
		true => level.write_u32::<LE>(4).unwrap(),
		false => level.write_u8(4).unwrap(),
	}
	level.extend_from_slice(b"Hall");
	level.extend_from_slice(&[0; 20]);
	level.write_u32::<LE>(1).unwrap();
	level.extend_from_slice(&[0; 12]);
	level.write_u32::<LE>(1).unwrap();
	level.write_i32::<LE>(0).unwrap();//texture
	level.push(0);
	level.push(animated as u8);
	level.write_u32::<LE>(polys.len() as u32).unwrap();
	for poly in polys {
		level.write_i32::<LE>(if poly.uvs.len() == 4 { 0 } else { 1 }).unwrap();
		for index in 0..poly.uvs.len() {
			level.write_i32::<LE>(index as i32).unwrap();
		}
		for [u, v] in &poly.uvs {
			level.write_f32::<LE>(*u).unwrap();
			level.write_f32::<LE>(*v).unwrap();
		}
	}
	write_compressed(&mut out, &level);
	out
}

pub fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> &[u8] {
	let start = (y as usize * width as usize + x as usize) * 4;
	&data[start..start + 4]
}
