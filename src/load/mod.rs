mod decrypt;
mod ten;
mod tr;

use std::{fs::File, io::BufReader, path::Path};
use byteorder::{ReadBytesExt, LE};
use glam::UVec2;
use log::{debug, info};
use shared::CancelToken;
use tr_reader::{version::TEN_MAGIC, RawAtlas, TileCandidate, PAGE_SIDE};
use crate::{
	compositor::{composite, PageSource, TargetAtlas},
	error::Result,
	options::{LoadEnv, RepackOptions, MAX_PANEL_PAGES},
	packer::{pack, MAX_OUTPUT_HEIGHT},
	tile_set::{TextureRecord, TileSetBuilder},
};

pub use decrypt::{DecryptError, Decryptor, TempFile};
pub use ten::TenLevelReader;
pub use tr::TrLevelReader;

/// Progress of a `LevelReader`. Every load starts over from `Unloaded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
	Unloaded,
	HeaderRead,
	Decrypting,
	SectionsDecoded,
	GeometryScanned,
	TileSetBuilt,
	Packed,
	Composited,
	Ready,
	/// Ready, but the atlas was truncated to the maximum height.
	SpaceInsufficient,
	Failed,
}

impl LoadState {
	pub fn is_ready(self) -> bool {
		matches!(self, LoadState::Ready | LoadState::SpaceInsufficient)
	}
}

#[derive(Debug)]
pub(crate) struct StateMachine {
	state: LoadState,
}

impl StateMachine {
	pub(crate) fn new() -> Self {
		Self { state: LoadState::Unloaded }
	}
	
	pub(crate) fn state(&self) -> LoadState {
		self.state
	}
	
	pub(crate) fn reset(&mut self) {
		self.state = LoadState::Unloaded;
	}
	
	pub(crate) fn advance(&mut self, to: LoadState) {
		debug!("{:?} -> {:?}", self.state, to);
		self.state = to;
	}
	
	/// Marks the load failed if `result` is an error.
	pub(crate) fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
		if let Err(err) = &result {
			debug!("load failed after {:?}: {}", self.state, err);
			self.state = LoadState::Failed;
		}
		result
	}
}

/// Where one source rectangle went in the output atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
	pub record: TextureRecord,
	pub position: UVec2,
}

#[derive(Clone, Debug)]
pub struct RepackedAtlas {
	pub data: Vec<u8>,
	pub width: u32,
	/// Rows actually allocated, at most `MAX_OUTPUT_HEIGHT`.
	pub height: u32,
	pub bytes_per_pixel: usize,
	/// Height the packing asked for.
	pub packed_height: u32,
	pub space_sufficient: bool,
	pub placements: Vec<Placement>,
}

pub trait LevelReader {
	fn state(&self) -> LoadState;
	fn load(&mut self, path: &Path, env: &LoadEnv) -> Result<RepackedAtlas>;
}

/// Picks the reader for a level file by its magic.
pub fn level_reader(path: &Path, options: RepackOptions) -> Result<Box<dyn LevelReader>> {
	let magic = BufReader::new(File::open(path)?).read_u32::<LE>()?;
	Ok(match magic {
		TEN_MAGIC => Box::new(TenLevelReader::new(options)),
		_ => Box::new(TrLevelReader::new(options)),
	})
}

pub fn load_level(path: &Path, options: &RepackOptions, env: &LoadEnv) -> Result<RepackedAtlas> {
	let atlas = level_reader(path, *options)?.load(path, env)?;
	info!(
		"{}: {}x{} atlas, {} tiles{}",
		path.display(), atlas.width, atlas.height, atlas.placements.len(),
		if atlas.space_sufficient { "" } else { ", truncated" },
	);
	Ok(atlas)
}

/// Builds the tile set from `candidates`, packs it and composites the result.
pub(crate) fn repack<S: PageSource + ?Sized>(
	source: &S,
	candidates: &[TileCandidate],
	builder: TileSetBuilder,
	panel_width: u32,
	machine: &mut StateMachine,
	cancel: &CancelToken,
) -> Result<RepackedAtlas> {
	let records = builder.build(candidates);
	machine.advance(LoadState::TileSetBuilt);
	let sizes = records.iter().map(TextureRecord::size).collect::<Vec<_>>();
	let packed = pack(&sizes, panel_width)?;
	machine.advance(LoadState::Packed);
	let placements = records
		.into_iter()
		.zip(packed.positions)
		.map(|(record, position)| Placement { record, position })
		.collect();
	finish(source, placements, panel_width, packed.height, machine, cancel)
}

/// Lays whole pages out left to right, `panel_pages` per row.
pub(crate) fn rearrange(
	atlas: &RawAtlas,
	panel_pages: u32,
	machine: &mut StateMachine,
	cancel: &CancelToken,
) -> Result<RepackedAtlas> {
	let panel_pages = panel_pages.clamp(1, MAX_PANEL_PAGES);
	let side = PAGE_SIDE as u32;
	let num_pages = atlas.num_pages() as u32;
	let placements = (0..num_pages)
		.map(|page| Placement {
			record: TextureRecord { page, x: 0, y: 0, width: side, height: side },
			position: UVec2::new(page % panel_pages, page / panel_pages) * side,
		})
		.collect();
	let height = num_pages.div_ceil(panel_pages) * side;
	finish(atlas, placements, panel_pages * side, height, machine, cancel)
}

fn finish<S: PageSource + ?Sized>(
	source: &S,
	placements: Vec<Placement>,
	width: u32,
	packed_height: u32,
	machine: &mut StateMachine,
	cancel: &CancelToken,
) -> Result<RepackedAtlas> {
	let space_sufficient = packed_height <= MAX_OUTPUT_HEIGHT;
	let mut target = TargetAtlas::new(width, packed_height.min(MAX_OUTPUT_HEIGHT));
	let (records, positions): (Vec<_>, Vec<_>) = placements.iter().map(|p| (p.record, p.position)).unzip();
	composite(source, &records, &positions, &mut target, cancel)?;
	machine.advance(LoadState::Composited);
	machine.advance(match space_sufficient {
		true => LoadState::Ready,
		false => LoadState::SpaceInsufficient,
	});
	let TargetAtlas { data, width, height, bytes_per_pixel } = target;
	Ok(RepackedAtlas { data, width, height, bytes_per_pixel, packed_height, space_sufficient, placements })
}
