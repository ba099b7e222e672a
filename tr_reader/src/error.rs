use std::io;
use shared::Cancelled;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	
	#[error("unrecognized level format: {0}")]
	Format(String),
	
	#[error("corrupt level data: {0}")]
	CorruptData(String),
	
	#[error("operation cancelled")]
	Cancelled,
	
	#[error("texture image error: {0}")]
	Image(#[from] image::ImageError),
}

impl From<Cancelled> for Error {
	fn from(_: Cancelled) -> Self {
		Error::Cancelled
	}
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn corrupt<T>(msg: impl Into<String>) -> Result<T> {
	Err(Error::CorruptData(msg.into()))
}
