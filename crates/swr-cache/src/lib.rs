//! Cache partition storage for swr (in-memory and filesystem backed).

pub mod filesystem;
pub mod keys;
pub mod memory;
pub mod types;

pub use filesystem::FilesystemCacheStorage;
pub use keys::{entry_key, sanitize_partition_name};
pub use memory::MemoryCacheStorage;
pub use types::StoredEntry;
