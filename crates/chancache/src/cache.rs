//! ChanCache: bounded memory tiers in front of ChanStore

use std::io::BufRead;
use std::path::{Path, PathBuf};

use chanstoredb::{Board, ChanStore, Loaded, PurgeReport, Result, Thread, WriteOutcome};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::CacheConfig;
use crate::lru::LruCache;
use crate::stats::CacheStats;

/// Two-tier board/thread cache
///
/// Reads check memory first and fall back to disk (or a placeholder);
/// writes go to disk, then into memory. Board and thread tiers have
/// independent capacities and independent locks.
pub struct ChanCache {
    /// Durable tier
    store: ChanStore,

    /// Hot boards keyed by code
    boards: Mutex<LruCache<String, Board>>,

    /// Hot threads keyed by thread number
    threads: Mutex<LruCache<i64, Thread>>,

    board_stats: CacheStats,
    thread_stats: CacheStats,

    config: CacheConfig,
}

impl ChanCache {
    /// Create a cache from a configuration
    ///
    /// # Arguments
    /// * `config` - Root directory and tier capacities
    ///
    /// # Returns
    /// * `Result<ChanCache>` - Cache handle with empty memory tiers
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = ChanStore::open(&config.root)?;

        Ok(Self {
            store,
            boards: Mutex::new(LruCache::new(config.board_capacity)),
            threads: Mutex::new(LruCache::new(config.thread_capacity)),
            board_stats: CacheStats::new(),
            thread_stats: CacheStats::new(),
            config,
        })
    }

    /// Create a cache with default capacities
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::new(CacheConfig::new(root))
    }

    /// Read a board: memory, then disk, then placeholder
    ///
    /// Real records loaded from disk are cached; placeholders are not.
    pub fn read_board(&self, code: &str) -> Result<Loaded<Board>> {
        let mut boards = self.boards.lock();
        if let Some(board) = boards.get(code) {
            self.board_stats.record_hit();
            return Ok(Loaded::Real(board.clone()));
        }

        // Held across the disk read so a concurrent write cannot land
        // (and be evicted) between the read and the insert.
        self.board_stats.record_miss();
        let loaded = self.store.read_board(code)?;
        if let Loaded::Real(board) = &loaded {
            self.insert_board(&mut boards, board.clone());
        }
        Ok(loaded)
    }

    /// Store a board on disk and in memory
    ///
    /// Placeholders are skipped. On an I/O error the memory tier is left
    /// untouched.
    pub fn write_board(&self, board: Board) -> Result<WriteOutcome> {
        if board.is_placeholder {
            return Ok(WriteOutcome::SkippedPlaceholder);
        }

        let mut boards = self.boards.lock();
        let outcome = self.store.write_board(&board)?;
        self.insert_board(&mut boards, board);

        Ok(outcome)
    }

    /// Read a thread: memory, then disk, then placeholder
    pub fn read_thread(&self, code: &str, no: i64) -> Result<Loaded<Thread>> {
        let mut threads = self.threads.lock();
        if let Some(thread) = threads.get(&no) {
            if thread.board == code {
                self.thread_stats.record_hit();
                return Ok(Loaded::Real(thread.clone()));
            }
        }

        self.thread_stats.record_miss();
        let loaded = self.store.read_thread(code, no)?;
        if let Loaded::Real(thread) = &loaded {
            self.insert_thread(&mut threads, thread.clone());
        }
        Ok(loaded)
    }

    /// Store a thread on disk and in memory unless a fresher copy is cached
    ///
    /// The freshness check, the disk write and the memory update happen
    /// under the thread tier lock, so an older fetch can never overwrite a
    /// newer one. Equal `last_fetched` values are not stale. A cached thread
    /// with the same number on another board is replaced, never compared.
    pub fn write_thread(&self, thread: Thread) -> Result<WriteOutcome> {
        if thread.is_placeholder {
            return Ok(WriteOutcome::SkippedPlaceholder);
        }

        let mut threads = self.threads.lock();
        if let Some(current) = threads.peek(&thread.no) {
            if current.board == thread.board && current.last_fetched > thread.last_fetched {
                debug!(
                    board = %thread.board,
                    thread = thread.no,
                    cached = current.last_fetched,
                    incoming = thread.last_fetched,
                    "skipping stale thread write"
                );
                self.thread_stats.record_stale_write();
                return Ok(WriteOutcome::Stale);
            }
        }

        let outcome = self.store.write_thread(&thread)?;
        self.insert_thread(&mut threads, thread);

        Ok(outcome)
    }

    /// Zero the cached board's `last_fetched`; disk is untouched
    ///
    /// # Returns
    /// * `bool` - Whether the board was in memory
    pub fn reset_board_freshness(&self, code: &str) -> bool {
        match self.boards.lock().get_mut(code) {
            Some(board) => {
                board.last_fetched = 0;
                true
            }
            None => false,
        }
    }

    /// Zero the cached thread's `last_fetched`; disk is untouched
    ///
    /// # Returns
    /// * `bool` - Whether the thread was in memory
    pub fn reset_thread_freshness(&self, no: i64) -> bool {
        match self.threads.lock().get_mut(&no) {
            Some(thread) => {
                thread.last_fetched = 0;
                true
            }
            None => false,
        }
    }

    /// True iff the board record is on disk
    pub fn board_exists(&self, code: &str) -> bool {
        self.store.board_exists(code)
    }

    /// True iff the thread record is on disk
    pub fn thread_exists(&self, code: &str, no: i64) -> bool {
        self.store.thread_exists(code, no)
    }

    /// Raw staged page file
    pub fn page_file(&self, code: &str, page: u32) -> Result<PathBuf> {
        self.store.page_file(code, page)
    }

    /// Raw staged thread payload file
    pub fn thread_raw_file(&self, code: &str, no: i64) -> Result<PathBuf> {
        self.store.thread_raw_file(code, no)
    }

    /// Stage a raw page payload; returns bytes written
    pub fn store_page<R: BufRead>(&self, code: &str, page: u32, reader: R) -> Result<u64> {
        self.store.store_page(code, page, reader)
    }

    /// Stage a raw thread payload; returns bytes written
    pub fn store_thread_raw<R: BufRead>(&self, code: &str, no: i64, reader: R) -> Result<u64> {
        self.store.store_thread_raw(code, no, reader)
    }

    /// Whether a board is currently held in memory (recency untouched)
    pub fn is_board_cached(&self, code: &str) -> bool {
        self.boards.lock().contains(code)
    }

    /// Whether a thread is currently held in memory (recency untouched)
    pub fn is_thread_cached(&self, no: i64) -> bool {
        self.threads.lock().contains(&no)
    }

    /// Number of boards in memory
    pub fn board_cache_len(&self) -> usize {
        self.boards.lock().len()
    }

    /// Number of threads in memory
    pub fn thread_cache_len(&self) -> usize {
        self.threads.lock().len()
    }

    /// Board tier statistics
    pub fn board_stats(&self) -> &CacheStats {
        &self.board_stats
    }

    /// Thread tier statistics
    pub fn thread_stats(&self) -> &CacheStats {
        &self.thread_stats
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Durable tier
    pub fn store(&self) -> &ChanStore {
        &self.store
    }

    /// Drop both memory tiers (disk unchanged)
    pub fn clear_memory(&self) {
        self.boards.lock().clear();
        self.threads.lock().clear();
    }

    /// Delete the whole cache root and drop both memory tiers
    ///
    /// Must not race with in-flight fetches.
    pub fn purge(&self) -> PurgeReport {
        self.clear_memory();
        self.store.delete_cache_directory()
    }

    fn insert_board(&self, boards: &mut LruCache<String, Board>, board: Board) {
        if let Some((evicted, _)) = boards.put(board.code.clone(), board) {
            debug!(board = %evicted, "evicted board from memory");
            self.board_stats.record_eviction();
        }
        self.board_stats.record_insert();
    }

    fn insert_thread(&self, threads: &mut LruCache<i64, Thread>, thread: Thread) {
        if let Some((evicted, _)) = threads.put(thread.no, thread) {
            debug!(thread = evicted, "evicted thread from memory");
            self.thread_stats.record_eviction();
        }
        self.thread_stats.record_insert();
    }
}
