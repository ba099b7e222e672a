pub mod compositor;
pub mod error;
pub mod load;
pub mod options;
pub mod packer;
pub mod tile_set;

pub use error::{Error, Result};
pub use load::{
	level_reader, load_level, DecryptError, Decryptor, LevelReader, LoadState, Placement, RepackedAtlas, TenLevelReader,
	TrLevelReader,
};
pub use options::{LoadEnv, RepackOptions};
