//! Record types: boards, threads, posts and user preferences
//!
//! Threads and posts refer back to their board by code (and posts to their
//! thread by number) rather than by owning pointer, so every record can be
//! serialized on its own.

use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread number used for the single thread of a placeholder board
pub const PLACEHOLDER_BOARD_THREAD_NO: i64 = -100;

/// Thumbnail edge (px) advertised by the placeholder board thread
const PLACEHOLDER_THUMB_SIZE: u32 = 240;

/// A single post inside a thread
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Board code the post belongs to
    pub board: String,
    /// Post number
    pub no: i64,
    /// Number of the thread the post replies to (equal to `no` for the opening post)
    pub resto: i64,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Subject line
    #[serde(default)]
    pub subject: Option<String>,
    /// Comment body (markup as served)
    #[serde(default)]
    pub comment: Option<String>,
    /// Poster name
    #[serde(default)]
    pub author: Option<String>,
    /// Image timestamp id, present when the post carries an image
    #[serde(default)]
    pub tim: Option<i64>,
    /// Image extension including the dot, e.g. `.jpg`
    #[serde(default)]
    pub ext: Option<String>,
    /// Original upload filename (without extension)
    #[serde(default)]
    pub filename: Option<String>,
    /// Image width (px)
    #[serde(default)]
    pub w: u32,
    /// Image height (px)
    #[serde(default)]
    pub h: u32,
    /// Thumbnail width (px)
    #[serde(default)]
    pub tn_w: u32,
    /// Thumbnail height (px)
    #[serde(default)]
    pub tn_h: u32,
    /// Image size in bytes
    #[serde(default)]
    pub fsize: u64,
    /// Synthesized stand-in, never persisted
    #[serde(default)]
    pub is_placeholder: bool,
}

impl Post {
    /// Stored image name (`<tim><ext>`), if the post has an image
    pub fn image_name(&self) -> Option<String> {
        match (self.tim, self.ext.as_deref()) {
            (Some(tim), Some(ext)) => Some(format!("{}{}", tim, ext)),
            _ => None,
        }
    }

    /// Placeholder opening post for a thread that has no data yet
    pub fn placeholder(board: &str, thread_no: i64) -> Self {
        let created = Utc::now();
        Self {
            board: board.to_string(),
            no: thread_no,
            resto: thread_no,
            created,
            tim: Some(created.timestamp_millis() * 1000),
            is_placeholder: true,
            ..Default::default()
        }
    }
}

/// A thread with its posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Board code the thread belongs to
    pub board: String,
    /// Thread number (the opening post number)
    pub no: i64,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Subject line
    #[serde(default)]
    pub subject: Option<String>,
    /// Image timestamp id of the opening post
    #[serde(default)]
    pub tim: Option<i64>,
    /// Number of image replies
    #[serde(default)]
    pub images: u32,
    /// Number of replies
    #[serde(default)]
    pub replies: u32,
    /// Thumbnail width (px)
    #[serde(default)]
    pub tn_w: u32,
    /// Thumbnail height (px)
    #[serde(default)]
    pub tn_h: u32,
    /// Thread is closed to new replies
    #[serde(default)]
    pub closed: bool,
    /// Posts in display order
    #[serde(default)]
    pub posts: Vec<Post>,
    /// Epoch millis of the fetch that produced this record, `0` when stale
    #[serde(default)]
    pub last_fetched: i64,
    /// Synthesized stand-in, never persisted
    #[serde(default)]
    pub is_placeholder: bool,
}

impl Thread {
    /// Placeholder thread: one placeholder post numbered like the thread,
    /// zero counts and `last_fetched == 0`.
    pub fn placeholder(board: &str, no: i64) -> Self {
        let created = Utc::now();
        Self {
            board: board.to_string(),
            no,
            created,
            tim: Some(created.timestamp_millis() * 1000),
            posts: vec![Post::placeholder(board, no)],
            last_fetched: 0,
            is_placeholder: true,
            ..Default::default()
        }
    }
}

/// A board with its thread index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Unique board code, e.g. `g`
    pub code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Threads in catalog order
    #[serde(default)]
    pub threads: Vec<Thread>,
    /// Epoch millis of the fetch that produced this record, `0` when stale
    #[serde(default)]
    pub last_fetched: i64,
    /// Synthesized stand-in, never persisted
    #[serde(default)]
    pub is_placeholder: bool,
}

impl Board {
    /// Placeholder board: a single placeholder thread and `last_fetched == 0`
    pub fn placeholder(code: &str) -> Self {
        let created = Utc::now();
        let thread = Thread {
            board: code.to_string(),
            no: PLACEHOLDER_BOARD_THREAD_NO,
            created,
            tim: Some(created.timestamp_millis() * 1000),
            images: 1,
            tn_w: PLACEHOLDER_THUMB_SIZE,
            tn_h: PLACEHOLDER_THUMB_SIZE,
            is_placeholder: true,
            ..Default::default()
        };

        Self {
            code: code.to_string(),
            name: code.to_string(),
            threads: vec![thread],
            last_fetched: 0,
            is_placeholder: true,
        }
    }
}

/// Per-installation user preferences (singleton, never evicted)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// When the preferences were last changed by the user
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// When the preferences were last written to disk
    #[serde(default)]
    pub last_stored: Option<DateTime<Utc>>,
    /// Free-form preference values
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

/// Result of a read: either real data or a synthesized placeholder.
///
/// Reads never come back empty for a valid key; callers branch on the tag
/// instead of on absence.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// Data that was stored by a previous write
    Real(T),
    /// Default data synthesized because nothing usable was stored
    Placeholder(T),
}

impl<T> Loaded<T> {
    /// True when the value was synthesized
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Loaded::Placeholder(_))
    }

    /// Borrow the record regardless of its tag
    pub fn get(&self) -> &T {
        match self {
            Loaded::Real(value) | Loaded::Placeholder(value) => value,
        }
    }

    /// Take the record regardless of its tag
    pub fn into_inner(self) -> T {
        match self {
            Loaded::Real(value) | Loaded::Placeholder(value) => value,
        }
    }

    /// The record, only if it is real
    pub fn real(self) -> Option<T> {
        match self {
            Loaded::Real(value) => Some(value),
            Loaded::Placeholder(_) => None,
        }
    }
}

impl<T> Deref for Loaded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_placeholder_shape() {
        let board = Board::placeholder("g");

        assert!(board.is_placeholder);
        assert_eq!(board.last_fetched, 0);
        assert_eq!(board.threads.len(), 1);
        assert!(board.threads[0].is_placeholder);
        assert_eq!(board.threads[0].no, PLACEHOLDER_BOARD_THREAD_NO);
        assert_eq!(board.threads[0].images, 1);
    }

    #[test]
    fn test_thread_placeholder_post_matches_thread() {
        let thread = Thread::placeholder("g", 42);

        assert!(thread.is_placeholder);
        assert_eq!(thread.last_fetched, 0);
        assert_eq!(thread.posts.len(), 1);
        assert_eq!(thread.posts[0].no, 42);
        assert!(thread.posts[0].is_placeholder);
        assert_eq!(thread.replies, 0);
    }

    #[test]
    fn test_image_name() {
        let mut post = Post {
            board: "g".into(),
            no: 1,
            ..Default::default()
        };
        assert_eq!(post.image_name(), None);

        post.tim = Some(1_700_000_000_123);
        post.ext = Some(".png".into());
        assert_eq!(post.image_name().as_deref(), Some("1700000000123.png"));
    }

    #[test]
    fn test_loaded_tags() {
        let real = Loaded::Real(5);
        let fake = Loaded::Placeholder(6);

        assert!(!real.is_placeholder());
        assert!(fake.is_placeholder());
        assert_eq!(*real, 5);
        assert_eq!(fake.clone().into_inner(), 6);
        assert_eq!(fake.real(), None);
    }
}
