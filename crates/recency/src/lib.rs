//! # recency
//!
//! Fixed-capacity LRU cache.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to list node (O(1))
//! - **OrderedNodeList**: arena-backed doubly-linked list for recency (O(1))
//! - **Eviction**: the tail node is recycled in place for the incoming key
//!
//! ```
//! use recency::LruCache;
//!
//! let mut cache = LruCache::new(2)?;
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a")?;
//! cache.set("c", 3); // evicts "b"
//!
//! assert_eq!(cache.keys().copied().collect::<Vec<_>>(), ["c", "a"]);
//! # Ok::<(), recency::Error>(())
//! ```
//!
//! The cache is single-threaded; callers sharing one across threads must
//! wrap it in their own lock.

#![warn(missing_docs)]

mod cache;
mod error;
pub mod list;

pub use cache::{Iter, Keys, LruCache};
pub use error::{Error, Result};
pub use list::{NodeHandle, OrderedNodeList};
