//! SQLite-backed persistence: key-value state and the answer log.
//!
//! The kv table carries the persisted scheduler snapshot and the last
//! fetched batch; the answers table is the engagement log the stats are
//! computed from.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::StorageError;

/// One answered quiz, as recorded for engagement stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub item_id: String,
    pub title: String,
    pub selected: usize,
    pub correct: bool,
    /// Streak value after this answer was applied.
    pub wrong_streak: u32,
    pub session_id: String,
    pub answered_at: DateTime<Utc>,
}

/// Aggregate engagement counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stats {
    pub answered: u64,
    pub correct: u64,
}

impl Stats {
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.correct as f64 / self.answered as f64
        }
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (and initialize) the database in the data directory.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|err| StorageError::QueryFailed(err.to_string()))?;
        Self::open_at(dir.join("hangtube.sqlite"))
    }

    /// Open at an explicit path (used by tests).
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS answers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id TEXT NOT NULL,
                title TEXT NOT NULL,
                selected INTEGER NOT NULL,
                correct INTEGER NOT NULL,
                wrong_streak INTEGER NOT NULL,
                session_id TEXT NOT NULL,
                answered_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn record_answer(&self, record: &AnswerRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO answers
                (item_id, title, selected, correct, wrong_streak, session_id, answered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.item_id,
                record.title,
                record.selected as i64,
                record.correct,
                record.wrong_streak as i64,
                record.session_id,
                record.answered_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn stats(&self) -> Result<Stats, StorageError> {
        let (answered, correct) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(correct), 0) FROM answers",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(Stats {
            answered: answered as u64,
            correct: correct as u64,
        })
    }

    /// Most recent answers, newest first.
    pub fn recent_answers(&self, limit: usize) -> Result<Vec<AnswerRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, title, selected, correct, wrong_streak, session_id, answered_at
             FROM answers ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (item_id, title, selected, correct, wrong_streak, session_id, answered_at) = row?;
            let answered_at = DateTime::parse_from_rfc3339(&answered_at)
                .map_err(|err| StorageError::QueryFailed(err.to_string()))?
                .with_timezone(&Utc);
            records.push(AnswerRecord {
                item_id,
                title,
                selected: selected as usize,
                correct,
                wrong_streak: wrong_streak as u32,
                session_id,
                answered_at,
            });
        }
        Ok(records)
    }
}
