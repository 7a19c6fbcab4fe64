//! Command dispatch for chanctl

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chancache::ChanCache;
use chanstoredb::{Board, Loaded, Thread, WriteOutcome};
use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a cached board
    Board {
        /// Board code, e.g. "g"
        code: String,
    },
    /// Show a cached thread
    Thread {
        /// Board code
        code: String,
        /// Thread number
        no: i64,
    },
    /// Check whether a board (or one of its threads) is on disk
    Exists {
        /// Board code
        code: String,
        /// Thread number
        no: Option<i64>,
    },
    /// Copy a raw catalog page into the cache
    StagePage {
        /// Board code
        code: String,
        /// Page number
        page: u32,
        /// Source file
        file: PathBuf,
    },
    /// Copy a raw thread body into the cache
    StageThread {
        /// Board code
        code: String,
        /// Thread number
        no: i64,
        /// Source file
        file: PathBuf,
    },
    /// Write a board from a JSON file
    ImportBoard {
        /// JSON board record
        file: PathBuf,
    },
    /// Write a thread from a JSON file
    ImportThread {
        /// JSON thread record
        file: PathBuf,
    },
    /// Show stored user preferences
    Prefs,
    /// Delete the whole cache root
    Purge,
}

pub struct CommandHandler {
    cache: Arc<ChanCache>,
}

impl CommandHandler {
    pub fn new(cache: Arc<ChanCache>) -> Self {
        Self { cache }
    }

    pub fn handle(&self, cmd: Command) -> Result<Value> {
        match cmd {
            Command::Board { code } => self.handle_board(&code),
            Command::Thread { code, no } => self.handle_thread(&code, no),
            Command::Exists { code, no } => Ok(self.handle_exists(&code, no)),
            Command::StagePage { code, page, file } => {
                let reader = open_source(&file)?;
                let bytes = self.cache.store_page(&code, page, reader)?;
                let path = self.cache.page_file(&code, page)?;
                Ok(json!({ "path": path, "bytes": bytes }))
            }
            Command::StageThread { code, no, file } => {
                let reader = open_source(&file)?;
                let bytes = self.cache.store_thread_raw(&code, no, reader)?;
                let path = self.cache.thread_raw_file(&code, no)?;
                Ok(json!({ "path": path, "bytes": bytes }))
            }
            Command::ImportBoard { file } => {
                let board: Board = read_json(&file)?;
                let code = board.code.clone();
                let outcome = self.cache.write_board(board)?;
                info!(board = %code, outcome = outcome_name(outcome), "imported board");
                Ok(json!({ "board": code, "outcome": outcome_name(outcome) }))
            }
            Command::ImportThread { file } => {
                let thread: Thread = read_json(&file)?;
                let (code, no) = (thread.board.clone(), thread.no);
                let outcome = self.cache.write_thread(thread)?;
                info!(board = %code, thread = no, outcome = outcome_name(outcome), "imported thread");
                Ok(json!({ "board": code, "thread": no, "outcome": outcome_name(outcome) }))
            }
            Command::Prefs => {
                let prefs = self.cache.store().load_user_preferences();
                Ok(json!({
                    "exists": self.cache.store().user_preferences_exist(),
                    "preferences": prefs,
                }))
            }
            Command::Purge => {
                let report = self.cache.purge();
                Ok(json!({ "success": report.success, "output": report.output }))
            }
        }
    }

    fn handle_board(&self, code: &str) -> Result<Value> {
        let board = self.cache.read_board(code)?;
        Ok(loaded_json(board))
    }

    fn handle_thread(&self, code: &str, no: i64) -> Result<Value> {
        let thread = self.cache.read_thread(code, no)?;
        Ok(loaded_json(thread))
    }

    fn handle_exists(&self, code: &str, no: Option<i64>) -> Value {
        match no {
            Some(no) => json!({
                "board": code,
                "thread": no,
                "exists": self.cache.thread_exists(code, no),
            }),
            None => json!({ "board": code, "exists": self.cache.board_exists(code) }),
        }
    }
}

fn loaded_json<T: Serialize>(loaded: Loaded<T>) -> Value {
    let placeholder = loaded.is_placeholder();
    json!({ "placeholder": placeholder, "record": loaded.into_inner() })
}

fn outcome_name(outcome: WriteOutcome) -> &'static str {
    match outcome {
        WriteOutcome::Written => "written",
        WriteOutcome::SkippedPlaceholder => "skipped_placeholder",
        WriteOutcome::Stale => "stale",
    }
}

fn open_source(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = open_source(path)?;
    serde_json::from_reader(reader).with_context(|| format!("parsing {}", path.display()))
}
