use std::io;
use shared::Cancelled;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Read(tr_reader::Error),
	
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
	
	#[error("decryption failed: {0}")]
	Decryption(String),
	
	#[error("{remaining} tiles fit in no row of a {panel_width} texel wide panel")]
	Packing { remaining: usize, panel_width: u32 },
	
	#[error("operation cancelled")]
	Cancelled,
}

impl From<tr_reader::Error> for Error {
	fn from(err: tr_reader::Error) -> Self {
		match err {
			tr_reader::Error::Cancelled => Error::Cancelled,
			err => Error::Read(err),
		}
	}
}

impl From<Cancelled> for Error {
	fn from(_: Cancelled) -> Self {
		Error::Cancelled
	}
}

pub type Result<T> = std::result::Result<T, Error>;
