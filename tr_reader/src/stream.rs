use std::io::{self, Read};
use byteorder::{ReadBytesExt, LE};
use compress::zlib::Decoder;
use log::{trace, warn};
use shared::{BufferPool, CancelToken, PooledBuffer};
use crate::error::{corrupt, Result};

/// Decompressed bytes are produced in chunks of this size between cancel checks.
pub const INFLATE_CHUNK: usize = 0x10000;
/// Upper bound on what a declared size may reserve before any data backs it.
pub const MAX_RESERVE: usize = 0x400_0000;

/// Restricts reads from `inner` to a declared number of bytes.
pub struct BoundedReader<R> {
	inner: R,
	remaining: u64,
}

impl<R: Read> BoundedReader<R> {
	pub fn new(inner: R, len: u64) -> Self {
		Self { inner, remaining: len }
	}
	
	pub fn remaining(&self) -> u64 {
		self.remaining
	}
	
	/// Discards whatever is left of the declared range and returns the inner reader.
	pub fn finish(mut self) -> io::Result<R> {
		let left = self.remaining;
		let skipped = io::copy(&mut self, &mut io::sink())?;
		if skipped != left {
			return Err(io::ErrorKind::UnexpectedEof.into());
		}
		Ok(self.inner)
	}
}

impl<R: Read> Read for BoundedReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.remaining == 0 {
			return Ok(0);
		}
		let max = buf.len().min(self.remaining.try_into().unwrap_or(usize::MAX));
		let num = self.inner.read(&mut buf[..max])?;
		self.remaining -= num as u64;
		Ok(num)
	}
}

/// Inflates `compressed_len` bytes of zlib data from `reader` into a pooled buffer.
/// `expected_len` sizes the first buffer, up to `MAX_RESERVE`; output past it grows the buffer by doubling.
pub fn inflate<'p, R: Read>(
	reader: &mut R,
	compressed_len: u64,
	expected_len: usize,
	pool: &'p BufferPool,
	cancel: &CancelToken,
) -> Result<PooledBuffer<'p>> {
	let mut bounded = BoundedReader::new(reader, compressed_len);
	let mut buf = pool.rent(expected_len.clamp(1, MAX_RESERVE));
	let mut filled = 0;
	{
		let mut decoder = Decoder::new(&mut bounded);
		loop {
			cancel.check()?;
			if filled == buf.len() {
				//only grow once the decoder has more to give
				let mut next = [0u8];
				if decoder.read(&mut next)? == 0 {
					break;
				}
				let mut bigger = pool.rent(buf.len() * 2);
				bigger[..filled].copy_from_slice(&buf[..filled]);
				bigger[filled] = next[0];
				filled += 1;
				buf = bigger;
				continue;
			}
			let end = buf.len().min(filled + INFLATE_CHUNK);
			let num = decoder.read(&mut buf[filled..end])?;
			if num == 0 {
				break;
			}
			filled += num;
		}
	}
	bounded.finish()?;
	if filled != expected_len {
		warn!("inflated {} bytes, header declared {}", filled, expected_len);
	}
	trace!("inflated {} -> {} bytes", compressed_len, filled);
	buf.truncate(filled);
	Ok(buf)
}

/// Reads an `(uncompressed_len: u32, compressed_len: u32)` pair and inflates the block after it.
pub fn read_compressed<'p, R: Read>(reader: &mut R, pool: &'p BufferPool, cancel: &CancelToken) -> Result<PooledBuffer<'p>> {
	let uncompressed_len = reader.read_u32::<LE>()? as usize;
	let compressed_len = reader.read_u32::<LE>()? as u64;
	inflate(reader, compressed_len, uncompressed_len, pool, cancel)
}

/// Skips an `(uncompressed_len, compressed_len)` block without inflating it.
pub fn skip_compressed<R: Read>(reader: &mut R) -> io::Result<()> {
	reader.read_u32::<LE>()?;//uncompressed_len
	let compressed_len = reader.read_u32::<LE>()?;
	crate::skip(reader, compressed_len as u64)
}

/// Reads exactly `len` raw bytes into a pooled buffer.
/// The buffer grows as bytes arrive, so a `len` larger than the stream is `CorruptData`, not a huge allocation.
pub fn read_pooled<'p, R: Read>(reader: &mut R, len: usize, pool: &'p BufferPool) -> Result<PooledBuffer<'p>> {
	let mut buf = pool.rent_empty(len.min(MAX_RESERVE));
	let num = reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
	if num != len {
		return corrupt(format!("declared {} bytes, only {} present", len, num));
	}
	Ok(buf)
}
