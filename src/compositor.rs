use glam::UVec2;
use log::warn;
use shared::CancelToken;
use tr_reader::{DecodedPage, RawAtlas, BYTES_PER_PIXEL, PAGE_SIDE};
use crate::{error::Result, tile_set::TextureRecord};

/// Rows of one source page inside some byte buffer.
#[derive(Clone, Copy)]
pub struct PageView<'a> {
	pub data: &'a [u8],
	/// Bytes per row.
	pub stride: usize,
	/// Row of `data` the page starts at.
	pub origin_row: usize,
}

pub trait PageSource {
	fn page(&self, index: u32) -> Option<PageView<'_>>;
}

impl PageSource for RawAtlas<'_> {
	fn page(&self, index: u32) -> Option<PageView<'_>> {
		let index = index as usize;
		(index < self.num_pages()).then(|| PageView {
			data: self.data(),
			stride: PAGE_SIDE * BYTES_PER_PIXEL,
			origin_row: index * PAGE_SIDE,
		})
	}
}

impl PageSource for [DecodedPage] {
	fn page(&self, index: u32) -> Option<PageView<'_>> {
		self.get(index as usize).map(|page| PageView {
			data: &page.data,
			stride: page.width as usize * BYTES_PER_PIXEL,
			origin_row: 0,
		})
	}
}

/// The output atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetAtlas {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
	pub bytes_per_pixel: usize,
}

impl TargetAtlas {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
			width,
			height,
			bytes_per_pixel: BYTES_PER_PIXEL,
		}
	}
	
	pub fn stride(&self) -> usize {
		self.width as usize * self.bytes_per_pixel
	}
}

/// Copies each record's rows to its position in `target`.
/// Rows falling outside the source page or the target are skipped, not reported as errors.
/// Returns the number of skipped rows.
pub fn composite<S: PageSource + ?Sized>(
	source: &S,
	records: &[TextureRecord],
	positions: &[UVec2],
	target: &mut TargetAtlas,
	cancel: &CancelToken,
) -> Result<usize> {
	let bpp = target.bytes_per_pixel;
	let target_stride = target.stride();
	let mut skipped = 0;
	for (record, pos) in records.iter().zip(positions) {
		cancel.check()?;
		let rows = record.height as usize;
		let Some(page) = source.page(record.page) else {
			skipped += rows;
			continue;
		};
		let row_len = record.width as usize * bpp;
		let src_x = record.x as usize * bpp;
		let dst_x = pos.x as usize * bpp;
		let fits_across = src_x + row_len <= page.stride && pos.x + record.width <= target.width;
		for row in 0..rows {
			let src_start = (page.origin_row + record.y as usize + row) * page.stride + src_x;
			let dst_start = (pos.y as usize + row) * target_stride + dst_x;
			let src = page.data.get(src_start..src_start + row_len);
			let dst = target.data.get_mut(dst_start..dst_start + row_len);
			match (fits_across, src, dst) {
				(true, Some(src), Some(dst)) => dst.copy_from_slice(src),
				_ => skipped += 1,
			}
		}
	}
	if skipped > 0 {
		warn!("{} tile rows fell outside their source page or the target atlas", skipped);
	}
	Ok(skipped)
}

#[cfg(test)]
mod tests {
	use glam::uvec2;
	use shared::BufferPool;
	use tr_reader::PAGE_BYTES;
	use super::*;
	
	fn record(page: u32, x: u32, y: u32, width: u32, height: u32) -> TextureRecord {
		TextureRecord { page, x, y, width, height }
	}
	
	fn pixel(target: &TargetAtlas, x: u32, y: u32) -> &[u8] {
		let start = y as usize * target.stride() + x as usize * 4;
		&target.data[start..start + 4]
	}
	
	//page p, texel (x, y) holds [p, x, y, 255]
	fn marked_atlas(pool: &BufferPool, num_pages: usize) -> RawAtlas {
		let mut data = pool.rent(num_pages * PAGE_BYTES);
		for (i, pixel) in data.chunks_exact_mut(4).enumerate() {
			let (page, rest) = (i / (256 * 256), i % (256 * 256));
			pixel.copy_from_slice(&[page as u8, (rest % 256) as u8, (rest / 256) as u8, 255]);
		}
		RawAtlas::new(data, num_pages).unwrap()
	}
	
	#[test]
	fn tiles_land_at_positions() {
		let pool = BufferPool::new();
		let atlas = marked_atlas(&pool, 2);
		let records = [record(1, 16, 32, 8, 4), record(0, 0, 0, 4, 4)];
		let positions = [uvec2(0, 0), uvec2(8, 0)];
		let mut target = TargetAtlas::new(256, 256);
		let skipped = composite(&atlas, &records, &positions, &mut target, &CancelToken::new()).unwrap();
		assert_eq!(skipped, 0);
		assert_eq!(pixel(&target, 0, 0), [1, 16, 32, 255]);
		assert_eq!(pixel(&target, 7, 3), [1, 23, 35, 255]);
		assert_eq!(pixel(&target, 9, 1), [0, 1, 1, 255]);
		assert_eq!(pixel(&target, 12, 0), [0, 0, 0, 0]);
	}
	
	#[test]
	fn out_of_bounds_rows_are_skipped() {
		let pool = BufferPool::new();
		let atlas = marked_atlas(&pool, 1);
		let mut target = TargetAtlas::new(256, 256);
		let before = target.data.len();
		let records = [
			record(0, 0, 250, 8, 8),//runs off the bottom of the only page
			record(0, 0, 0, 8, 8),//lands past the target's last row
			record(3, 0, 0, 8, 8),//missing page
			record(0, 252, 0, 8, 2),//runs off the right edge of the page
		];
		let positions = [uvec2(0, 0), uvec2(0, 252), uvec2(0, 0), uvec2(16, 0)];
		let skipped = composite(&atlas, &records, &positions, &mut target, &CancelToken::new()).unwrap();
		assert_eq!(skipped, 2 + 4 + 8 + 2);
		assert_eq!(target.data.len(), before);
		assert_eq!((target.width, target.height), (256, 256));
		assert_eq!(pixel(&target, 0, 5), [0, 0, 255, 255]);
		assert_eq!(pixel(&target, 0, 6), [0, 0, 0, 0]);
		assert_eq!(pixel(&target, 0, 255), [0, 0, 3, 255]);
		assert_eq!(pixel(&target, 16, 0), [0, 0, 0, 0]);
	}
	
	#[test]
	fn decoded_pages_use_their_own_stride() {
		let page = DecodedPage { data: (0..6 * 2 * 4).map(|b| b as u8).collect(), width: 6, height: 2 };
		let pages = [page];
		let mut target = TargetAtlas::new(4, 2);
		let skipped = composite(&pages[..], &[record(0, 2, 0, 4, 2)], &[UVec2::ZERO], &mut target, &CancelToken::new()).unwrap();
		assert_eq!(skipped, 0);
		assert_eq!(pixel(&target, 0, 1), [32, 33, 34, 35]);
	}
	
	#[test]
	fn cancellation_stops_copying() {
		let pool = BufferPool::new();
		let atlas = marked_atlas(&pool, 1);
		let cancel = CancelToken::new();
		cancel.cancel();
		let mut target = TargetAtlas::new(256, 256);
		let result = composite(&atlas, &[record(0, 0, 0, 8, 8)], &[UVec2::ZERO], &mut target, &cancel);
		assert!(matches!(result, Err(crate::Error::Cancelled)));
	}
}
