use std::{fs::File, io::{BufReader, Read, Seek}, path::Path};
use tr_reader::{geometry::tr_candidates, tr::read_level, Container, ParseContext, TrVersion, VersionInfo};
use crate::{
	error::{Error, Result},
	options::{LoadEnv, RepackOptions},
	tile_set::TileSetBuilder,
};
use super::{rearrange, repack, LevelReader, LoadState, RepackedAtlas, StateMachine, TempFile};

/// Loads TR1-TR5 levels.
pub struct TrLevelReader {
	options: RepackOptions,
	machine: StateMachine,
}

impl TrLevelReader {
	pub fn new(options: RepackOptions) -> Self {
		Self { options, machine: StateMachine::new() }
	}
	
	/// Loads from an open stream. Encrypted levels need a path and fail here.
	pub fn read_from<R: Read + Seek>(&mut self, reader: &mut R, container: Container, env: &LoadEnv) -> Result<RepackedAtlas> {
		self.machine.reset();
		let result = self.read_stream(reader, container, env);
		self.machine.settle(result)
	}
	
	fn read_stream<R: Read + Seek>(&mut self, reader: &mut R, container: Container, env: &LoadEnv) -> Result<RepackedAtlas> {
		let version = detect_plain(reader, container)?;
		self.machine.advance(LoadState::HeaderRead);
		self.read_body(reader, version, env)
	}
	
	fn load_path(&mut self, path: &Path, env: &LoadEnv) -> Result<RepackedAtlas> {
		let container = Container::from_path(path);
		let mut reader = BufReader::new(File::open(path)?);
		match VersionInfo::detect(&mut reader, container)? {
			VersionInfo::Tr { version, encrypted: false } => {
				self.machine.advance(LoadState::HeaderRead);
				self.read_body(&mut reader, version, env)
			},
			VersionInfo::Tr { encrypted: true, .. } => {
				self.machine.advance(LoadState::HeaderRead);
				self.machine.advance(LoadState::Decrypting);
				let decryptor = env.decryptor.ok_or_else(|| Error::Decryption("no decryptor configured".into()))?;
				let decrypted = TempFile::new(decryptor.decrypt(path).map_err(|err| Error::Decryption(err.to_string()))?);
				let mut reader = BufReader::new(File::open(decrypted.path())?);
				let version = match VersionInfo::detect(&mut reader, container) {
					Ok(VersionInfo::Tr { version, encrypted: false }) => version,
					Ok(_) => return Err(Error::Decryption("decrypted copy is still not a plain TR level".into())),
					Err(err) => return Err(Error::Decryption(format!("decrypted copy unreadable: {}", err))),
				};
				self.read_body(&mut reader, version, env)
			},
			VersionInfo::Ten { .. } => Err(wrong_family()),
		}
	}
	
	fn read_body<R: Read + Seek>(&mut self, reader: &mut R, version: TrVersion, env: &LoadEnv) -> Result<RepackedAtlas> {
		let repacking = self.options.repack;
		let mut ctx = ParseContext::new(env.pool, &env.cancel, repacking);
		let level = read_level(reader, version, &mut ctx)?;
		self.machine.advance(LoadState::SectionsDecoded);
		if !repacking {
			return rearrange(&level.atlas, self.options.panel_pages(), &mut self.machine, &env.cancel);
		}
		let candidates = tr_candidates(&ctx, &level.object_textures)?;
		self.machine.advance(LoadState::GeometryScanned);
		repack(
			&level.atlas,
			&candidates,
			TileSetBuilder::for_tr(version),
			self.options.panel_width(),
			&mut self.machine,
			&env.cancel,
		)
	}
}

impl LevelReader for TrLevelReader {
	fn state(&self) -> LoadState {
		self.machine.state()
	}
	
	fn load(&mut self, path: &Path, env: &LoadEnv) -> Result<RepackedAtlas> {
		self.machine.reset();
		let result = self.load_path(path, env);
		self.machine.settle(result)
	}
}

fn wrong_family() -> Error {
	tr_reader::Error::Format("TombEngine level given to the TR reader".into()).into()
}

fn detect_plain<R: Read>(reader: &mut R, container: Container) -> Result<TrVersion> {
	match VersionInfo::detect(reader, container)? {
		VersionInfo::Tr { version, encrypted: false } => Ok(version),
		VersionInfo::Tr { encrypted: true, .. } => Err(Error::Decryption("encrypted level given as a stream".into())),
		VersionInfo::Ten { .. } => Err(wrong_family()),
	}
}
