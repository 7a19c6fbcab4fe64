//! Record file codec
//!
//! File format:
//! ```text
//! CHANREC1 <kind>\n
//! <JSON body>
//! ```
//!
//! The header names the record kind so that a thread file can never be
//! mistaken for a board (or preferences) record. Everything after the
//! header line is the serde_json encoding of the record.

use nom::{
    bytes::complete::tag,
    character::complete::{alpha1, char},
    sequence::{preceded, terminated, tuple},
    IResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Board, Thread, UserPreferences};

/// Magic prefix of every record file
pub const RECORD_MAGIC: &[u8] = b"CHANREC1";

/// Kind tag written into the record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// [`Board`] record
    Board,
    /// [`Thread`] record
    Thread,
    /// [`UserPreferences`] record
    Preferences,
}

impl RecordKind {
    /// Tag as written in the header
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Board => "board",
            RecordKind::Thread => "thread",
            RecordKind::Preferences => "prefs",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"board" => Some(RecordKind::Board),
            b"thread" => Some(RecordKind::Thread),
            b"prefs" => Some(RecordKind::Preferences),
            _ => None,
        }
    }
}

/// A type that can be stored as a record file
pub trait Record: Serialize + DeserializeOwned {
    /// Kind written into (and expected from) the header
    const KIND: RecordKind;
}

impl Record for Board {
    const KIND: RecordKind = RecordKind::Board;
}

impl Record for Thread {
    const KIND: RecordKind = RecordKind::Thread;
}

impl Record for UserPreferences {
    const KIND: RecordKind = RecordKind::Preferences;
}

/// Parse the header line, returning the body and the raw kind tag
fn parse_header(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        preceded(tuple((tag(RECORD_MAGIC), char(' '))), alpha1),
        char('\n'),
    )(input)
}

/// Create the header line for a record kind
pub fn create_header(kind: RecordKind) -> Vec<u8> {
    let mut header = Vec::with_capacity(RECORD_MAGIC.len() + kind.as_str().len() + 2);
    header.extend_from_slice(RECORD_MAGIC);
    header.push(b' ');
    header.extend_from_slice(kind.as_str().as_bytes());
    header.push(b'\n');
    header
}

/// Encode a record into file bytes
pub fn encode<T: Record>(record: &T) -> Result<Vec<u8>> {
    let mut bytes = create_header(T::KIND);
    serde_json::to_writer(&mut bytes, record)?;
    Ok(bytes)
}

/// Decode file bytes into a record of kind `T`
///
/// Fails with [`Error::MalformedRecord`] on a missing or foreign header,
/// a kind mismatch, or a truncated/schema-mismatched body.
pub fn decode<T: Record>(bytes: &[u8]) -> Result<T> {
    let (body, kind_tag) = parse_header(bytes)?;

    let kind = RecordKind::from_tag(kind_tag).ok_or_else(|| {
        Error::malformed(format!(
            "unknown record kind '{}'",
            String::from_utf8_lossy(kind_tag)
        ))
    })?;
    if kind != T::KIND {
        return Err(Error::malformed(format!(
            "expected {} record, found {}",
            T::KIND.as_str(),
            kind.as_str()
        )));
    }

    serde_json::from_slice(body)
        .map_err(|e| Error::malformed(format!("{} body: {}", kind.as_str(), e)))
}
