//! Key → file location mapping under a cache root
//!
//! ```text
//! <root>/<code>/<code>.txt                       board record
//! <root>/<code>/<code>_page<N>.txt               raw staged page N
//! <root>/<code>/t_<no>.txt                       thread record
//! <root>/<code>/t_<no>f.txt                      raw staged thread payload
//! <root>/<code>/<code>_widgetbitmap_<i>.jpg      widget image bytes
//! <root>/userprefs.txt                           user preferences
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::{Error, Result};

const CACHE_EXT: &str = ".txt";
const BITMAP_EXT: &str = ".jpg";
const USER_PREFS_FILENAME: &str = "userprefs.txt";

/// Resolves record locations under one cache root
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    /// Create a resolver for the given root (nothing is created yet)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Board directory, created if absent
    pub fn board_dir(&self, code: &str) -> Result<PathBuf> {
        let dir = self.board_dir_location(code)?;
        fs::create_dir_all(&dir).map_err(|e| {
            error!(board = code, path = %dir.display(), error = %e, "cannot create board cache folder");
            Error::io(&dir, e)
        })?;
        Ok(dir)
    }

    /// Board directory path, without touching the filesystem
    pub fn board_dir_location(&self, code: &str) -> Result<PathBuf> {
        validate_board(code)?;
        Ok(self.root.join(code))
    }

    /// Board record file (directory created on demand)
    pub fn board_file(&self, code: &str) -> Result<PathBuf> {
        Ok(self.board_dir(code)?.join(board_file_name(code)))
    }

    /// Board record file path, without touching the filesystem
    pub fn board_file_location(&self, code: &str) -> Result<PathBuf> {
        Ok(self.board_dir_location(code)?.join(board_file_name(code)))
    }

    /// Thread record file (directory created on demand)
    pub fn thread_file(&self, code: &str, no: i64) -> Result<PathBuf> {
        validate_thread(no)?;
        Ok(self.board_dir(code)?.join(format!("t_{}{}", no, CACHE_EXT)))
    }

    /// Thread record file path, without touching the filesystem
    pub fn thread_file_location(&self, code: &str, no: i64) -> Result<PathBuf> {
        validate_thread(no)?;
        Ok(self
            .board_dir_location(code)?
            .join(format!("t_{}{}", no, CACHE_EXT)))
    }

    /// Raw staged page file
    pub fn page_file(&self, code: &str, page: u32) -> Result<PathBuf> {
        Ok(self
            .board_dir(code)?
            .join(format!("{}_page{}{}", code, page, CACHE_EXT)))
    }

    /// Raw staged thread payload file
    pub fn thread_raw_file(&self, code: &str, no: i64) -> Result<PathBuf> {
        validate_thread(no)?;
        Ok(self.board_dir(code)?.join(format!("t_{}f{}", no, CACHE_EXT)))
    }

    /// Widget bitmap file
    pub fn widget_bitmap_file(&self, code: &str, index: u32) -> Result<PathBuf> {
        Ok(self
            .board_dir(code)?
            .join(format!("{}_widgetbitmap_{}{}", code, index, BITMAP_EXT)))
    }

    /// User preferences file (root created on demand)
    pub fn user_preferences_file(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        Ok(self.user_preferences_location())
    }

    /// User preferences file path, without touching the filesystem
    pub fn user_preferences_location(&self) -> PathBuf {
        self.root.join(USER_PREFS_FILENAME)
    }
}

fn board_file_name(code: &str) -> String {
    format!("{}{}", code, CACHE_EXT)
}

/// Reject keys that can only come from a programming error
pub(crate) fn validate_board(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(Error::InvalidKey("empty board code".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_thread(no: i64) -> Result<()> {
    if no <= 0 {
        return Err(Error::InvalidKey(format!("thread number {} is not positive", no)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path());

        assert_eq!(paths.board_file("g").unwrap(), dir.path().join("g/g.txt"));
        assert_eq!(paths.thread_file("g", 5).unwrap(), dir.path().join("g/t_5.txt"));
        assert_eq!(paths.page_file("g", 2).unwrap(), dir.path().join("g/g_page2.txt"));
        assert_eq!(paths.thread_raw_file("g", 5).unwrap(), dir.path().join("g/t_5f.txt"));
        assert_eq!(
            paths.widget_bitmap_file("g", 3).unwrap(),
            dir.path().join("g/g_widgetbitmap_3.jpg")
        );
        assert_eq!(
            paths.user_preferences_file().unwrap(),
            dir.path().join("userprefs.txt")
        );
    }

    #[test]
    fn test_board_dir_created_idempotently() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path());

        let first = paths.board_dir("a").unwrap();
        let second = paths.board_dir("a").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn test_location_does_not_create() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path());

        let file = paths.thread_file_location("v", 9).unwrap();
        assert_eq!(file, dir.path().join("v/t_9.txt"));
        assert!(!dir.path().join("v").exists());
    }

    #[test]
    fn test_invalid_keys() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path());

        assert!(matches!(paths.board_dir(""), Err(Error::InvalidKey(_))));
        assert!(matches!(paths.thread_file("g", 0), Err(Error::InvalidKey(_))));
        assert!(matches!(paths.thread_raw_file("g", -3), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_unusual_board_code_is_accepted() {
        let dir = TempDir::new().unwrap();
        let paths = CachePaths::new(dir.path());

        assert!(paths.board_dir("3DS-homebrew_x").unwrap().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_creation_failure_is_io() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("root");
        fs::write(&blocker, b"not a directory").unwrap();
        let paths = CachePaths::new(&blocker);

        assert!(matches!(paths.board_dir("g"), Err(Error::Io { .. })));
    }
}
