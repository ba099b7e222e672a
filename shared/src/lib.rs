pub mod cancel;
pub mod min_max;
pub mod pool;

pub use cancel::{CancelToken, Cancelled};
pub use min_max::{MinMax, VecMinMax, VecMinMaxFromIterator};
pub use pool::{BufferPool, PooledBuffer};
