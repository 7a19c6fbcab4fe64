//! # chancache
//!
//! Bounded in-memory tiers over the [`chanstoredb`] disk store.
//!
//! ## Architecture
//! - **LRU**: intrusive doubly-linked recency list over a slab, AHash map
//!   for O(1) lookup and eviction
//! - **Tiers**: boards (by code, 30 entries) and threads (by number,
//!   100 entries), each behind its own lock
//! - **Coordinator**: [`ChanCache`] reads memory → disk → placeholder and
//!   writes disk → memory, suppressing out-of-order thread writes

#![warn(missing_docs)]

mod cache;
mod config;
pub mod global;
mod lru;
mod stats;

pub use cache::ChanCache;
pub use config::{CacheConfig, DEFAULT_BOARD_CAPACITY, DEFAULT_THREAD_CAPACITY};
pub use global::{global, init_global};
pub use lru::LruCache;
pub use stats::{CacheStats, StatsSnapshot};

pub use chanstoredb::{Board, Error, Loaded, Post, Result, Thread, UserPreferences, WriteOutcome};
