//! Durable per-key record store
//!
//! Every board and thread lives in its own file (see [`crate::paths`]).
//! Writes go to a temp file in the target directory and are renamed over
//! the record, so readers never observe a truncated file. Reads never fail
//! for a valid key: a missing, unreadable or corrupt file yields a
//! placeholder, and corrupt files are deleted on the way.

use std::fs;
use std::io::{self, BufRead, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::codec::{self, Record};
use crate::error::{Error, Result};
use crate::models::{Board, Loaded, Post, Thread, UserPreferences};
use crate::paths::CachePaths;

/// What a write call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was persisted
    Written,
    /// Placeholder records are never persisted
    SkippedPlaceholder,
    /// A fresher copy was already cached; nothing was written
    Stale,
}

/// Outcome of a bulk cache-directory deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Whether the directory is gone
    pub success: bool,
    /// Diagnostic text describing what happened
    pub output: String,
}

/// ChanStore is the durable tier: one file per board/thread record
#[derive(Debug, Clone)]
pub struct ChanStore {
    paths: CachePaths,
}

impl ChanStore {
    /// Open (or create) a store rooted at the given directory
    ///
    /// # Arguments
    /// * `root` - Application-owned cache root
    ///
    /// # Returns
    /// * `Result<ChanStore>` - Store handle
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;

        Ok(Self {
            paths: CachePaths::new(root),
        })
    }

    /// Path resolver for this store
    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// True iff the board's record file is present
    pub fn board_exists(&self, code: &str) -> bool {
        self.paths
            .board_file_location(code)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// True iff the thread's record file is present
    pub fn thread_exists(&self, code: &str, no: i64) -> bool {
        self.paths
            .thread_file_location(code, no)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Persist a board record, replacing any previous one
    pub fn write_board(&self, board: &Board) -> Result<WriteOutcome> {
        if board.is_placeholder {
            debug!(board = %board.code, "not storing placeholder board");
            return Ok(WriteOutcome::SkippedPlaceholder);
        }

        let path = self.paths.board_file(&board.code)?;
        write_record(&path, board)?;
        debug!(board = %board.code, threads = board.threads.len(), "stored board");

        Ok(WriteOutcome::Written)
    }

    /// Load a board record from disk, or a placeholder
    ///
    /// # Errors
    /// Only [`Error::InvalidKey`] for an empty code.
    pub fn read_board(&self, code: &str) -> Result<Loaded<Board>> {
        let path = self.paths.board_file_location(code)?;

        let loaded = self
            .load_record::<Board>(&path)
            .and_then(|board| match board {
                Some(board) if board.code != code || board.is_placeholder => Err(
                    Error::malformed(format!("file holds board '{}'", board.code)),
                ),
                other => Ok(other),
            });

        match loaded {
            Ok(Some(board)) => {
                debug!(board = code, threads = board.threads.len(), "loaded board");
                Ok(Loaded::Real(board))
            }
            Ok(None) => {
                debug!(board = code, "no stored board");
                Ok(Loaded::Placeholder(Board::placeholder(code)))
            }
            Err(e) => {
                self.discard(&path, &e);
                Ok(Loaded::Placeholder(Board::placeholder(code)))
            }
        }
    }

    /// Persist a thread record, replacing any previous one
    pub fn write_thread(&self, thread: &Thread) -> Result<WriteOutcome> {
        if thread.is_placeholder {
            debug!(board = %thread.board, thread = thread.no, "not storing placeholder thread");
            return Ok(WriteOutcome::SkippedPlaceholder);
        }

        let path = self.paths.thread_file(&thread.board, thread.no)?;
        write_record(&path, thread)?;
        debug!(
            board = %thread.board,
            thread = thread.no,
            posts = thread.posts.len(),
            "stored thread"
        );

        Ok(WriteOutcome::Written)
    }

    /// Load a thread record from disk, or a placeholder
    ///
    /// # Errors
    /// Only [`Error::InvalidKey`] for an empty code or non-positive number.
    pub fn read_thread(&self, code: &str, no: i64) -> Result<Loaded<Thread>> {
        let path = self.paths.thread_file_location(code, no)?;

        let loaded = self
            .load_record::<Thread>(&path)
            .and_then(|thread| match thread {
                Some(t) if t.board != code || t.no != no || t.is_placeholder => Err(
                    Error::malformed(format!("file holds thread '{}/{}'", t.board, t.no)),
                ),
                other => Ok(other),
            });

        match loaded {
            Ok(Some(thread)) => {
                debug!(board = code, thread = no, posts = thread.posts.len(), "loaded thread");
                Ok(Loaded::Real(thread))
            }
            Ok(None) => {
                debug!(board = code, thread = no, "no stored thread");
                Ok(Loaded::Placeholder(Thread::placeholder(code, no)))
            }
            Err(e) => {
                self.discard(&path, &e);
                Ok(Loaded::Placeholder(Thread::placeholder(code, no)))
            }
        }
    }

    /// Raw staged page file for a board
    pub fn page_file(&self, code: &str, page: u32) -> Result<PathBuf> {
        self.paths.page_file(code, page)
    }

    /// Raw staged payload file for a thread
    pub fn thread_raw_file(&self, code: &str, no: i64) -> Result<PathBuf> {
        self.paths.thread_raw_file(code, no)
    }

    /// Stage a raw page payload, replacing the previous one
    ///
    /// Lines are written back to back without their terminators.
    ///
    /// # Returns
    /// * `Result<u64>` - Bytes written
    pub fn store_page<R: BufRead>(&self, code: &str, page: u32, reader: R) -> Result<u64> {
        let path = self.paths.page_file(code, page)?;
        let written = replace_file(&path, |out| copy_lines(reader, out))?;
        debug!(board = code, page, bytes = written, "staged page");
        Ok(written)
    }

    /// Stage a raw thread payload, replacing the previous one
    ///
    /// # Returns
    /// * `Result<u64>` - Bytes written
    pub fn store_thread_raw<R: BufRead>(&self, code: &str, no: i64, reader: R) -> Result<u64> {
        let path = self.paths.thread_raw_file(code, no)?;
        let written = replace_file(&path, |out| copy_lines(reader, out))?;
        debug!(board = code, thread = no, bytes = written, "staged thread payload");
        Ok(written)
    }

    /// True iff a preferences file is present
    pub fn user_preferences_exist(&self) -> bool {
        self.paths.user_preferences_location().is_file()
    }

    /// Load user preferences, falling back to defaults
    pub fn load_user_preferences(&self) -> UserPreferences {
        let path = self.paths.user_preferences_location();
        match self.load_record::<UserPreferences>(&path) {
            Ok(Some(prefs)) => {
                debug!(last_update = ?prefs.last_update, last_stored = ?prefs.last_stored, "loaded user preferences");
                prefs
            }
            Ok(None) => {
                debug!("no stored user preferences");
                UserPreferences::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load user preferences");
                UserPreferences::default()
            }
        }
    }

    /// Persist user preferences, stamping `last_stored`
    pub fn store_user_preferences(&self, prefs: &mut UserPreferences) -> Result<()> {
        let path = self.paths.user_preferences_file()?;
        prefs.last_stored = Some(Utc::now());
        write_record(&path, &*prefs)?;
        debug!(last_update = ?prefs.last_update, "stored user preferences");
        Ok(())
    }

    /// Widget bitmap file for a board slot
    pub fn widget_bitmap_path(&self, code: &str, index: u32) -> Result<PathBuf> {
        self.paths.widget_bitmap_file(code, index)
    }

    /// Store raw widget image bytes, replacing the previous image
    ///
    /// # Returns
    /// * `Result<u64>` - Bytes copied
    pub fn store_widget_bitmap<R: Read>(&self, code: &str, index: u32, mut reader: R) -> Result<u64> {
        let path = self.paths.widget_bitmap_file(code, index)?;
        let written = replace_file(&path, |out| io::copy(&mut reader, out))?;
        debug!(board = code, index, bytes = written, "stored widget bitmap");
        Ok(written)
    }

    /// Raw widget image bytes, if any were stored
    pub fn load_widget_bitmap(&self, code: &str, index: u32) -> Result<Option<Vec<u8>>> {
        let path = self.paths.widget_bitmap_file(code, index)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Gallery filename for a post's image: `<board>_<image name>`
    pub fn local_gallery_image_filename(post: &Post) -> Option<String> {
        post.image_name()
            .map(|name| format!("{}_{}", post.board, name))
    }

    /// `file://` URL of a post's image inside the board directory
    pub fn local_image_url(&self, post: &Post) -> Result<Option<String>> {
        let dir = self.paths.board_dir_location(&post.board)?;
        Ok(post
            .image_name()
            .map(|name| format!("file://{}/{}", dir.display(), name)))
    }

    /// Remove the whole cache root
    ///
    /// Never fails; the report carries success and diagnostic text. Callers
    /// must make sure no fetch is writing into the root concurrently.
    pub fn delete_cache_directory(&self) -> PurgeReport {
        let root = self.paths.root();
        match fs::remove_dir_all(root) {
            Ok(()) => {
                info!(path = %root.display(), "deleted cache directory");
                PurgeReport {
                    success: true,
                    output: format!("removed {}", root.display()),
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => PurgeReport {
                success: true,
                output: format!("{} does not exist", root.display()),
            },
            Err(e) => {
                error!(path = %root.display(), error = %e, "error deleting cache directory");
                PurgeReport {
                    success: false,
                    output: format!("cannot remove {}: {}", root.display(), e),
                }
            }
        }
    }

    fn load_record<T: Record>(&self, path: &Path) -> Result<Option<T>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };
        codec::decode(&bytes).map(Some)
    }

    /// Drop a record file that could not be used
    fn discard(&self, path: &Path, cause: &Error) {
        if !cause.is_malformed() {
            warn!(path = %path.display(), error = %cause, "cannot read record, using placeholder");
            return;
        }

        warn!(path = %path.display(), error = %cause, "corrupt record, deleting");
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "cannot delete corrupt record");
        }
    }
}

fn write_record<T: Record>(path: &Path, record: &T) -> Result<()> {
    let bytes = codec::encode(record)?;
    replace_file(path, |out| {
        out.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    })?;
    Ok(())
}

/// Fill a temp file next to `path`, then rename it over `path`
fn replace_file<F>(path: &Path, fill: F) -> Result<u64>
where
    F: FnOnce(&mut dyn Write) -> io::Result<u64>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;

    let written = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let written = fill(&mut writer).map_err(|e| Error::io(path, e))?;
        writer.flush().map_err(|e| Error::io(path, e))?;
        written
    };
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    Ok(written)
}

fn copy_lines<R: BufRead>(reader: R, out: &mut dyn Write) -> io::Result<u64> {
    let mut total = 0u64;
    for line in reader.lines() {
        let line = line?;
        out.write_all(line.as_bytes())?;
        total += line.len() as u64;
    }
    Ok(total)
}
