use std::{mem, ops::{Deref, DerefMut}, sync::atomic::{AtomicUsize, Ordering}};
use parking_lot::Mutex;

const DEFAULT_MAX_RETAINED: usize = 16;

/// Byte buffers kept for reuse between loads.
/// Checkout and return may happen from independent threads.
pub struct BufferPool {
	free: Mutex<Vec<Vec<u8>>>,
	max_retained: usize,
	outstanding: AtomicUsize,
}

impl Default for BufferPool {
	fn default() -> Self {
		Self::with_max_retained(DEFAULT_MAX_RETAINED)
	}
}

impl BufferPool {
	pub fn new() -> Self {
		Self::default()
	}
	
	pub fn with_max_retained(max_retained: usize) -> Self {
		Self {
			free: Mutex::new(Vec::new()),
			max_retained,
			outstanding: AtomicUsize::new(0),
		}
	}
	
	/// Checks out a zero-filled buffer of exactly `len` bytes.
	/// The buffer goes back to the pool when the guard drops.
	pub fn rent(&self, len: usize) -> PooledBuffer<'_> {
		let mut buf = self.rent_empty(len);
		buf.resize(len, 0);
		buf
	}
	
	/// Checks out an empty buffer able to hold `capacity` bytes without reallocating.
	pub fn rent_empty(&self, capacity: usize) -> PooledBuffer<'_> {
		let reused = {
			let mut free = self.free.lock();
			let index = free
				.iter()
				.enumerate()
				.filter(|(_, buf)| buf.capacity() >= capacity)
				.min_by_key(|(_, buf)| buf.capacity())
				.map(|(index, _)| index);
			index.map(|index| free.swap_remove(index))
		};
		let mut buf = reused.unwrap_or_else(|| Vec::with_capacity(capacity));
		buf.clear();
		self.outstanding.fetch_add(1, Ordering::Relaxed);
		PooledBuffer { pool: self, buf }
	}
	
	fn give_back(&self, mut buf: Vec<u8>) {
		self.outstanding.fetch_sub(1, Ordering::Relaxed);
		if buf.capacity() == 0 {
			return;
		}
		buf.clear();
		let mut free = self.free.lock();
		if free.len() < self.max_retained {
			free.push(buf);
		}
	}
	
	/// Number of buffers currently checked out.
	pub fn outstanding(&self) -> usize {
		self.outstanding.load(Ordering::Relaxed)
	}
	
	/// Number of idle buffers held for reuse.
	pub fn idle(&self) -> usize {
		self.free.lock().len()
	}
}

/// A buffer checked out of a `BufferPool`.
pub struct PooledBuffer<'p> {
	pool: &'p BufferPool,
	buf: Vec<u8>,
}

impl PooledBuffer<'_> {
	/// Detaches the bytes from the pool; they will not be reused.
	pub fn into_vec(mut self) -> Vec<u8> {
		mem::take(&mut self.buf)
	}
}

impl Deref for PooledBuffer<'_> {
	type Target = Vec<u8>;
	
	fn deref(&self) -> &Self::Target {
		&self.buf
	}
}

impl DerefMut for PooledBuffer<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.buf
	}
}

impl Drop for PooledBuffer<'_> {
	fn drop(&mut self) {
		self.pool.give_back(mem::take(&mut self.buf));
	}
}
