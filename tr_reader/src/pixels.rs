use image::ImageFormat;
use shared::PooledBuffer;
use crate::{error::{corrupt, Result}, Readable, BYTES_PER_PIXEL, PAGE_BYTES};

pub const PALETTE_LEN: usize = 256;

#[derive(Readable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color24Bit {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

/// 6-bit palette channels widened by shifting, not rescaling.
pub fn palette_to_bgra(palette: &[Color24Bit; PALETTE_LEN]) -> [[u8; 4]; PALETTE_LEN] {
	let mut bgra = [[0; 4]; PALETTE_LEN];
	for (index, (color, out)) in palette.iter().zip(&mut bgra).enumerate() {
		let alpha = if index == 0 { 0 } else { 255 };
		*out = [color.b << 2, color.g << 2, color.r << 2, alpha];
	}
	bgra
}

/// Expands 8-bit palette-indexed pages into `out`.
pub fn decode_indexed(indices: &[u8], palette: &[Color24Bit; PALETTE_LEN], out: &mut [u8]) {
	let bgra = palette_to_bgra(palette);
	for (&index, pixel) in indices.iter().zip(out.chunks_exact_mut(BYTES_PER_PIXEL)) {
		pixel.copy_from_slice(&bgra[index as usize]);
	}
}

/// Widens one ARGB1555 pixel to BGRA.
pub fn argb1555_to_bgra(color: u16) -> [u8; 4] {
	let channel = |shift: u16| (((color >> shift) & 0x1F) as u8) << 3;
	let alpha = if color & 0x8000 != 0 { 255 } else { 0 };
	[channel(0), channel(5), channel(10), alpha]
}

/// Expands 16-bit ARGB1555 pages (little-endian words) into `out`.
pub fn decode_argb1555(words: &[u8], out: &mut [u8]) {
	for (word, pixel) in words.chunks_exact(2).zip(out.chunks_exact_mut(BYTES_PER_PIXEL)) {
		pixel.copy_from_slice(&argb1555_to_bgra(u16::from_le_bytes([word[0], word[1]])));
	}
}

/// Source pages normalized to BGRA, 256×256 each, stacked vertically.
pub struct RawAtlas<'p> {
	data: PooledBuffer<'p>,
	num_pages: usize,
}

impl<'p> RawAtlas<'p> {
	/// Takes pixels already in canonical layout. Fails if `data` holds fewer than `num_pages` pages.
	pub fn new(mut data: PooledBuffer<'p>, num_pages: usize) -> Result<Self> {
		let len = num_pages * PAGE_BYTES;
		if data.len() < len {
			return corrupt(format!("{} pages need {} bytes, got {}", num_pages, len, data.len()));
		}
		data.truncate(len);
		Ok(Self { data, num_pages })
	}
	
	pub fn num_pages(&self) -> usize {
		self.num_pages
	}
	
	pub fn data(&self) -> &[u8] {
		&self.data
	}
	
	pub fn page(&self, index: usize) -> Option<&[u8]> {
		self.data.get(index * PAGE_BYTES..(index + 1) * PAGE_BYTES)
	}
}

/// One independently sized texture page, BGRA.
#[derive(Clone, Debug)]
pub struct DecodedPage {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
}

impl DecodedPage {
	pub fn from_png(bytes: &[u8]) -> Result<Self> {
		let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
		let (width, height) = rgba.dimensions();
		let mut data = rgba.into_raw();
		for pixel in data.chunks_exact_mut(BYTES_PER_PIXEL) {
			pixel.swap(0, 2);
		}
		Ok(Self { data, width, height })
	}
}
