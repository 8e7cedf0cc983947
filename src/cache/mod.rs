pub mod entry;
pub mod pool;

pub use entry::{Entry, Value};
pub use pool::{OpResult, Pool, PoolStatus};
