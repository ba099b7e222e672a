use std::{fs::File, io::{BufReader, Read}, path::Path};
use log::debug;
use tr_reader::{ten::read_level, Container, ParseContext, VersionInfo};
use crate::{
	error::Result,
	options::{LoadEnv, RepackOptions},
	tile_set::TileSetBuilder,
};
use super::{repack, LevelReader, LoadState, RepackedAtlas, StateMachine};

/// Loads TombEngine levels. These are always repacked.
pub struct TenLevelReader {
	options: RepackOptions,
	machine: StateMachine,
}

impl TenLevelReader {
	pub fn new(options: RepackOptions) -> Self {
		if !options.repack {
			debug!("TombEngine levels are always repacked");
		}
		Self { options, machine: StateMachine::new() }
	}
	
	pub fn read_from<R: Read>(&mut self, reader: &mut R, env: &LoadEnv) -> Result<RepackedAtlas> {
		self.machine.reset();
		let result = self.read_stream(reader, env);
		self.machine.settle(result)
	}
	
	fn read_stream<R: Read>(&mut self, reader: &mut R, env: &LoadEnv) -> Result<RepackedAtlas> {
		let version = match VersionInfo::detect(reader, Container::Plain)? {
			VersionInfo::Ten { version, .. } => version,
			VersionInfo::Tr { .. } => {
				return Err(tr_reader::Error::Format("TR level given to the TombEngine reader".into()).into());
			},
		};
		self.machine.advance(LoadState::HeaderRead);
		let mut ctx = ParseContext::new(env.pool, &env.cancel, true);
		let level = read_level(reader, version, &mut ctx)?;
		self.machine.advance(LoadState::SectionsDecoded);
		self.machine.advance(LoadState::GeometryScanned);
		repack(
			&level.pages[..],
			&level.candidates,
			TileSetBuilder::for_ten(),
			self.options.panel_width(),
			&mut self.machine,
			&env.cancel,
		)
	}
}

impl LevelReader for TenLevelReader {
	fn state(&self) -> LoadState {
		self.machine.state()
	}
	
	fn load(&mut self, path: &Path, env: &LoadEnv) -> Result<RepackedAtlas> {
		self.machine.reset();
		let result = File::open(path)
			.map_err(Into::into)
			.and_then(|file| self.read_stream(&mut BufReader::new(file), env));
		self.machine.settle(result)
	}
}
