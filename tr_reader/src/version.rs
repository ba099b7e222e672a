use std::{io::Read, path::Path};
use byteorder::{ReadBytesExt, LE};
use crate::error::{Error, Result};

pub const TR1_MAGIC: u32 = 0x00000020;
pub const TR2_MAGIC: u32 = 0x0000002D;
pub const TR3_MAGICS: [u32; 3] = [0xFF080038, 0xFF180038, 0xFF180034];
pub const TR4_MAGIC: u32 = 0x00345254;
pub const TR4_ENCRYPTED_MAGIC: u32 = 0x63345254;
pub const TEN_MAGIC: u32 = 0x004E4554;

/// What kind of file a stream came from, where the magic alone is ambiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
	Plain,
	/// `.trc` file; shares its magic with TR4.
	Trc,
}

impl Container {
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("trc") => Container::Trc,
			_ => Container::Plain,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrVersion {
	Tr1,
	Tr2,
	Tr3,
	Tr4,
	Tr5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TenVersion {
	V1,
	V2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionInfo {
	Tr {
		version: TrVersion,
		/// Must go through a decryptor before the rest of the file can be read.
		encrypted: bool,
	},
	Ten {
		version: TenVersion,
		/// major, minor, build, revision
		engine: [i32; 4],
	},
}

impl VersionInfo {
	/// Reads the magic (and for TEN the engine version) from the start of a level.
	pub fn detect<R: Read>(reader: &mut R, container: Container) -> Result<Self> {
		let magic = reader.read_u32::<LE>()?;
		let tr = |version| Ok(VersionInfo::Tr { version, encrypted: false });
		match magic {
			TR1_MAGIC => tr(TrVersion::Tr1),
			TR2_MAGIC => tr(TrVersion::Tr2),
			_ if TR3_MAGICS.contains(&magic) => tr(TrVersion::Tr3),
			TR4_MAGIC => match container {
				Container::Trc => tr(TrVersion::Tr5),
				Container::Plain => tr(TrVersion::Tr4),
			},
			TR4_ENCRYPTED_MAGIC => Ok(VersionInfo::Tr { version: TrVersion::Tr4, encrypted: true }),
			TEN_MAGIC => {
				let mut engine = [0; 4];
				reader.read_i32_into::<LE>(&mut engine)?;
				let version = match engine {
					[1, minor, ..] if minor < 5 => TenVersion::V1,
					[1, ..] => TenVersion::V2,
					[major, minor, build, revision] => return Err(Error::Format(format!(
						"unsupported TEN engine version {}.{}.{}.{}", major, minor, build, revision,
					))),
				};
				Ok(VersionInfo::Ten { version, engine })
			},
			_ => Err(Error::Format(format!("unknown magic {:#010X}", magic))),
		}
	}
}

/// Byte widths of fixed-size records, per version.
impl TrVersion {
	pub fn room_vertex_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 8,
			_ => 12,
		}
	}
	
	pub fn room_light_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 18,
			TrVersion::Tr2 | TrVersion::Tr3 => 24,
			TrVersion::Tr4 | TrVersion::Tr5 => 46,
		}
	}
	
	pub fn room_static_mesh_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 18,
			_ => 20,
		}
	}
	
	pub fn room_ambient_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 2,
			TrVersion::Tr2 => 6,
			_ => 4,
		}
	}
	
	/// Alternate room and flags, plus water scheme, reverb and flip group from TR3 on.
	pub fn room_trailer_size(self) -> u64 {
		match self {
			TrVersion::Tr1 | TrVersion::Tr2 => 4,
			_ => 7,
		}
	}
	
	pub fn animation_size(self) -> u64 {
		match self {
			TrVersion::Tr1 | TrVersion::Tr2 | TrVersion::Tr3 => 32,
			TrVersion::Tr4 | TrVersion::Tr5 => 40,
		}
	}
	
	pub fn moveable_size(self) -> u64 {
		match self {
			TrVersion::Tr5 => 20,
			_ => 18,
		}
	}
	
	pub fn box_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 20,
			_ => 8,
		}
	}
	
	pub fn zone_words_per_box(self) -> u64 {
		match self {
			TrVersion::Tr1 => 6,
			_ => 10,
		}
	}
	
	pub fn object_texture_size(self) -> u64 {
		match self {
			TrVersion::Tr1 | TrVersion::Tr2 | TrVersion::Tr3 => 20,
			TrVersion::Tr4 => 38,
			TrVersion::Tr5 => 40,
		}
	}
	
	pub fn entity_size(self) -> u64 {
		match self {
			TrVersion::Tr1 => 22,
			_ => 24,
		}
	}
	
	/// Object textures carry a triangle bit and mapping correction from TR4 on.
	pub fn has_mapping_correction(self) -> bool {
		self >= TrVersion::Tr4
	}
}

pub const STATIC_MESH_SIZE: u64 = 32;
pub const PORTAL_SIZE: u64 = 32;
pub const SECTOR_SIZE: u64 = 8;
pub const SPRITE_TEXTURE_SIZE: u64 = 16;
pub const SPRITE_SEQUENCE_SIZE: u64 = 8;
pub const CAMERA_SIZE: u64 = 16;
pub const FLYBY_CAMERA_SIZE: u64 = 40;
pub const SOUND_SOURCE_SIZE: u64 = 16;
pub const STATE_CHANGE_SIZE: u64 = 6;
pub const ANIM_DISPATCH_SIZE: u64 = 8;
pub const ANIM_COMMAND_SIZE: u64 = 2;
pub const MESH_TREE_SIZE: u64 = 4;
pub const FRAME_WORD_SIZE: u64 = 2;
pub const FLOOR_DATA_WORD_SIZE: u64 = 2;
pub const OVERLAP_SIZE: u64 = 2;
pub const LIGHT_MAP_SIZE: u64 = 32 * 256;
