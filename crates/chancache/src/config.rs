//! Cache configuration

use std::path::{Path, PathBuf};

use chanstoredb::{Error, Result};

/// Default number of boards kept in memory
pub const DEFAULT_BOARD_CAPACITY: usize = 30;

/// Default number of threads kept in memory
pub const DEFAULT_THREAD_CAPACITY: usize = 100;

/// Settings for a [`crate::ChanCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Application-owned cache root
    pub root: PathBuf,
    /// Board tier capacity
    pub board_capacity: usize,
    /// Thread tier capacity
    pub thread_capacity: usize,
}

impl CacheConfig {
    /// Default capacities rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            board_capacity: DEFAULT_BOARD_CAPACITY,
            thread_capacity: DEFAULT_THREAD_CAPACITY,
        }
    }

    /// Override the board tier capacity
    pub fn with_board_capacity(mut self, capacity: usize) -> Self {
        self.board_capacity = capacity;
        self
    }

    /// Override the thread tier capacity
    pub fn with_thread_capacity(mut self, capacity: usize) -> Self {
        self.thread_capacity = capacity;
        self
    }

    /// Check that both tiers can hold at least one entry
    pub fn validate(&self) -> Result<()> {
        if self.board_capacity == 0 {
            return Err(Error::InvalidConfig(
                "board capacity must be greater than 0".to_string(),
            ));
        }
        if self.thread_capacity == 0 {
            return Err(Error::InvalidConfig(
                "thread capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
