//! # chanstoredb
//!
//! Durable tier of the offline board cache: one file per board and per
//! thread, written atomically, with placeholder records standing in for
//! anything missing or corrupt.
//!
//! ## Layout
//! - `<root>/<code>/<code>.txt`: board record
//! - `<root>/<code>/t_<no>.txt`: thread record
//! - raw staged payloads, widget bitmaps and `userprefs.txt` alongside
//!
//! Reads never fail for a valid key; see [`Loaded`].

#![warn(missing_docs)]

pub mod codec;
mod error;
pub mod models;
pub mod paths;
mod storage;

pub use codec::{Record, RecordKind};
pub use error::{Error, Result};
pub use models::{Board, Loaded, Post, Thread, UserPreferences};
pub use paths::CachePaths;
pub use storage::{ChanStore, PurgeReport, WriteOutcome};
