use std::{error::Error, fs, path::{Path, PathBuf}};
use log::{debug, warn};

pub type DecryptError = Box<dyn Error + Send + Sync>;

/// Produces a plain copy of an encrypted level.
pub trait Decryptor: Send + Sync {
	/// Returns the path of a temporary decrypted copy of `source`. The caller removes it.
	fn decrypt(&self, source: &Path) -> Result<PathBuf, DecryptError>;
}

impl<F> Decryptor for F where F: Fn(&Path) -> Result<PathBuf, DecryptError> + Send + Sync {
	fn decrypt(&self, source: &Path) -> Result<PathBuf, DecryptError> {
		self(source)
	}
}

/// Removes the file at its path when dropped.
#[derive(Debug)]
pub struct TempFile(PathBuf);

impl TempFile {
	pub fn new(path: PathBuf) -> Self {
		Self(path)
	}
	
	pub fn path(&self) -> &Path {
		&self.0
	}
}

impl Drop for TempFile {
	fn drop(&mut self) {
		match fs::remove_file(&self.0) {
			Ok(()) => debug!("removed {}", self.0.display()),
			Err(err) => warn!("could not remove {}: {}", self.0.display(), err),
		}
	}
}
