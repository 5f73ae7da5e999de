//! Repositories: statement execution outside the active-record flow.
//!
//! - [`RawRepository`] runs SQL text and manages transactions.
//! - [`Repository`] builds statements from a model's metadata.
//! - [`CacheRepository`] puts a [`CacheStorage`] in front of reads.

mod cache;
mod model;
mod raw;
mod storage;

pub use cache::CacheRepository;
pub use model::Repository;
pub use raw::RawRepository;
pub use storage::{CacheStorage, MemoryCacheStorage, cache_error};
