use shared::{BufferPool, CancelToken};
use tr_reader::PAGE_SIDE;
use crate::load::Decryptor;

pub const DEFAULT_PANEL_PAGES: u32 = 8;
/// Widest panel, matching the maximum output height.
pub const MAX_PANEL_PAGES: u32 = 128;

/// How a level's atlas is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepackOptions {
	/// Output width in 256 texel pages.
	pub panel_pages: u32,
	/// Pack only the used tiles. When off, TR pages are laid out whole, `panel_pages` per row.
	pub repack: bool,
}

impl Default for RepackOptions {
	fn default() -> Self {
		Self { panel_pages: DEFAULT_PANEL_PAGES, repack: true }
	}
}

impl RepackOptions {
	/// `panel_pages` clamped to `1..=MAX_PANEL_PAGES`.
	pub fn panel_pages(&self) -> u32 {
		self.panel_pages.clamp(1, MAX_PANEL_PAGES)
	}
	
	pub fn panel_width(&self) -> u32 {
		self.panel_pages() * PAGE_SIDE as u32
	}
}

/// Collaborators a load runs with. The pool may be shared by concurrent loads.
#[derive(Clone)]
pub struct LoadEnv<'a> {
	pub pool: &'a BufferPool,
	pub cancel: CancelToken,
	pub decryptor: Option<&'a dyn Decryptor>,
}

impl<'a> LoadEnv<'a> {
	pub fn new(pool: &'a BufferPool) -> Self {
		Self { pool, cancel: CancelToken::new(), decryptor: None }
	}
	
	pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
		self.cancel = cancel;
		self
	}
	
	pub fn with_decryptor(mut self, decryptor: &'a dyn Decryptor) -> Self {
		self.decryptor = Some(decryptor);
		self
	}
}
