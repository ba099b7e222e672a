extern crate self as tr_reader;

pub(crate) mod impls;
pub mod context;
pub mod error;
pub mod geometry;
pub mod pixels;
pub mod stream;
pub mod ten;
pub mod tr;
pub mod version;

use std::io::{self, Read, Result};
use num_traits::AsPrimitive;
pub(crate) use tr_derive::Readable;

pub use context::{ParseContext, SlotUse};
pub use error::Error;
pub use geometry::{ObjectTexture, TileCandidate, TileShape};
pub use pixels::{DecodedPage, RawAtlas};
pub use version::{Container, TenVersion, TrVersion, VersionInfo};

pub const PAGE_SIDE: usize = 256;
pub const PAGE_PIXELS: usize = PAGE_SIDE * PAGE_SIDE;
/// Canonical pixel layout is BGRA, one byte per channel.
pub const BYTES_PER_PIXEL: usize = 4;
pub const PAGE_BYTES: usize = PAGE_PIXELS * BYTES_PER_PIXEL;

pub trait Readable: Sized {
	fn read<R: Read>(reader: &mut R) -> Result<Self>;
}

pub fn read_vec<R: Read, T: Readable>(reader: &mut R, len: usize) -> Result<Vec<T>> {
	let mut vec = Vec::with_capacity(len.min(0x10000));
	for _ in 0..len {
		vec.push(T::read(reader)?);
	}
	Ok(vec)
}

pub fn read_list<R: Read, T: Readable, L: Readable + AsPrimitive<usize>>(reader: &mut R) -> Result<Box<[T]>> {
	let len = L::read(reader)?.as_();
	Ok(read_vec(reader, len)?.into_boxed_slice())
}

pub fn skip<R: Read>(reader: &mut R, num: u64) -> Result<()> {
	let skipped = io::copy(&mut reader.by_ref().take(num), &mut io::sink())?;
	match skipped == num {
		true => Ok(()),
		false => Err(io::ErrorKind::UnexpectedEof.into()),
	}
}

/// Reads a count of type `L` then skips that many records of `width` bytes.
/// Returns the count.
pub fn skip_list<R: Read, L: Readable + AsPrimitive<u64>>(reader: &mut R, width: u64) -> Result<u64> {
	let len = L::read(reader)?.as_();
	skip(reader, len * width)?;
	Ok(len)
}
