use std::sync::{atomic::{AtomicBool, Ordering}, Arc};
use thiserror::Error;

/// Observed when a load checks its `CancelToken` after `cancel` was called.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cooperative cancellation flag. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}
	
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}
	
	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
	
	pub fn check(&self) -> Result<(), Cancelled> {
		match self.is_cancelled() {
			true => Err(Cancelled),
			false => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	
	#[test]
	fn clones_share_the_flag() {
		let token = CancelToken::new();
		let other = token.clone();
		assert_eq!(token.check(), Ok(()));
		other.cancel();
		assert_eq!(token.check(), Err(Cancelled));
	}
}
