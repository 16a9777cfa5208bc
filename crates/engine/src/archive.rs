//! Named saves persisted as a single JSON document.
//!
//! The archive file holds a JSON array of saves. Each save carries its name, a UTC
//! timestamp and the flat board record (`pieces` plus `carPosition`).
//!
//! # Error Handling
//!
//! Opening falls back to an empty archive when the file is missing or unreadable, with a
//! warning. An unreadable file is copied to a `.bak` sibling before the archive first
//! writes over it. Entries that fail to parse are skipped with a warning but written back
//! untouched. Every other failure is returned as an [`ArchiveError`]; a failed load never
//! produces a partially restored board, and a failed write leaves the in-memory list as
//! it was.

use crate::board::Board;
use crate::error::GameError;
use crate::record::BoardRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Archive filename used when none is given.
pub const DEFAULT_ARCHIVE: &str = "car_puzzle_saves.json";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("a save needs a non-empty name")]
    MissingName,

    #[error("no save named '{0}'")]
    NotFound(String),

    #[error("malformed archive data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("archive i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("saved board is invalid: {0}")]
    InvalidBoard(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub board: BoardRecord,
}

impl SaveGame {
    pub fn new(name: &str, board: &Board) -> Result<Self, ArchiveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ArchiveError::MissingName);
        }
        Ok(SaveGame {
            name: name.to_string(),
            timestamp: Utc::now(),
            board: BoardRecord::capture(board),
        })
    }

    pub fn restore(&self) -> Result<Board, ArchiveError> {
        Ok(self.board.restore()?)
    }
}

#[derive(Debug, Default)]
pub struct Archive {
    path: Option<PathBuf>,
    saves: Vec<SaveGame>,
    /// Entries from disk that did not parse; kept so a rewrite does not drop them.
    skipped: Vec<Value>,
    /// The file on disk could not be read at open and has not been backed up yet.
    needs_backup: bool,
}

impl Archive {
    /// An archive that is never written to disk.
    pub fn in_memory() -> Self {
        Archive::default()
    }

    /// Opens the archive at `path`, starting empty if it cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Archive::try_open(&path) {
            Ok(archive) => archive,
            Err(e) => {
                warn!("[ARCHIVE] Failed to read {:?}: {}. Starting empty.", path, e);
                Archive {
                    needs_backup: path.exists(),
                    path: Some(path),
                    ..Archive::default()
                }
            }
        }
    }

    /// Opens the archive at `path`. Fails only when the file as a whole cannot be read;
    /// single entries that do not parse are skipped with a warning.
    pub fn try_open(path: &Path) -> Result<Self, ArchiveError> {
        if !path.exists() {
            info!("[ARCHIVE] No archive at {:?}. Starting empty.", path);
            return Ok(Archive {
                path: Some(path.to_path_buf()),
                ..Archive::default()
            });
        }
        let contents = fs::read_to_string(path)?;
        let entries: Vec<Value> = serde_json::from_str(&contents)?;
        let mut saves = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            match SaveGame::deserialize(&entry) {
                Ok(save) => saves.push(save),
                Err(e) => {
                    warn!("[ARCHIVE] Skipping malformed save #{} in {:?}: {}", i, path, e);
                    skipped.push(entry);
                }
            }
        }
        info!("[ARCHIVE] Loaded {} save(s) from {:?}", saves.len(), path);
        Ok(Archive {
            path: Some(path.to_path_buf()),
            saves,
            skipped,
            needs_backup: false,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of entries on disk that could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Saves `board` under `name`, replacing an existing save of that name.
    pub fn save(&mut self, name: &str, board: &Board) -> Result<&SaveGame, ArchiveError> {
        let save = SaveGame::new(name, board)?;
        let mut saves = self.saves.clone();
        let index = match saves.iter().position(|s| s.name == save.name) {
            Some(i) => {
                info!("[ARCHIVE] Overwriting save '{}'", save.name);
                saves[i] = save;
                i
            }
            None => {
                saves.push(save);
                saves.len() - 1
            }
        };
        self.persist(&saves)?;
        self.saves = saves;
        Ok(&self.saves[index])
    }

    pub fn list(&self) -> &[SaveGame] {
        &self.saves
    }

    pub fn get(&self, name: &str) -> Result<&SaveGame, ArchiveError> {
        self.saves
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))
    }

    pub fn load(&self, name: &str) -> Result<Board, ArchiveError> {
        self.get(name)?.restore()
    }

    pub fn delete(&mut self, name: &str) -> Result<SaveGame, ArchiveError> {
        let index = self
            .saves
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        let mut saves = self.saves.clone();
        let removed = saves.remove(index);
        self.persist(&saves)?;
        self.saves = saves;
        Ok(removed)
    }

    /// The save as a standalone pretty-printed JSON document.
    pub fn export(&self, name: &str) -> Result<String, ArchiveError> {
        Ok(serde_json::to_string_pretty(self.get(name)?)?)
    }

    /// Parses a document produced by [`Archive::export`].
    pub fn import(json: &str) -> Result<SaveGame, ArchiveError> {
        let save: SaveGame = serde_json::from_str(json)?;
        save.board.restore()?;
        Ok(save)
    }

    /// Writes `saves` followed by the skipped entries.
    fn persist(&mut self, saves: &[SaveGame]) -> Result<(), ArchiveError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if self.needs_backup {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            warn!("[ARCHIVE] Copied unreadable {:?} to {:?} before rewriting", path, backup);
        }
        let mut entries = saves
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        entries.extend(self.skipped.iter().cloned());
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(path, json)?;
        self.needs_backup = false;
        info!("[ARCHIVE] Saved {} save(s) to {:?}", saves.len(), path);
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PieceKind;
    use crate::position::Position;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("car_puzzle_{}_{}.json", tag, std::process::id()))
    }

    #[test]
    fn save_list_load_delete() {
        let mut archive = Archive::in_memory();
        let mut board = Board::start();
        board.add_piece(PieceKind::Cannon, Position::new(2, 2).unwrap()).unwrap();
        archive.save("first", &board).unwrap();
        archive.save("second", &Board::start()).unwrap();
        assert_eq!(archive.list().len(), 2);

        let loaded = archive.load("first").unwrap();
        assert_eq!(loaded.to_layout(), board.to_layout());

        archive.save("first", &Board::start()).unwrap();
        assert_eq!(archive.list().len(), 2);
        assert_eq!(archive.load("first").unwrap().to_layout(), Board::start().to_layout());

        archive.delete("second").unwrap();
        assert!(matches!(archive.load("second"), Err(ArchiveError::NotFound(_))));
        assert!(matches!(archive.delete("second"), Err(ArchiveError::NotFound(_))));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut archive = Archive::in_memory();
        assert!(matches!(archive.save("  ", &Board::start()), Err(ArchiveError::MissingName)));
    }

    #[test]
    fn export_round_trips_through_import() {
        let mut archive = Archive::in_memory();
        archive.save("puzzle", &Board::start()).unwrap();
        let json = archive.export("puzzle").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "puzzle");
        assert_eq!(value["carPosition"]["y"], 7);
        let save = Archive::import(&json).unwrap();
        assert_eq!(&save, archive.get("puzzle").unwrap());
    }

    #[test]
    fn malformed_file_falls_back_to_empty() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Archive::try_open(&path), Err(ArchiveError::Malformed(_))));
        let archive = Archive::open(&path);
        assert!(archive.list().is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn saves_survive_reopening() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);
        {
            let mut archive = Archive::open(&path);
            archive.save("kept", &Board::start()).unwrap();
        }
        let archive = Archive::open(&path);
        assert_eq!(archive.list().len(), 1);
        assert_eq!(archive.load("kept").unwrap(), Board::start());
        let _ = fs::remove_file(&path);
    }
    #[test]
    fn malformed_entry_is_skipped_but_kept_on_disk() {
        let path = temp_path("one_bad_entry");
        let _ = fs::remove_file(&path);
        {
            let mut archive = Archive::open(&path);
            archive.save("good_one", &Board::start()).unwrap();
            archive.save("good_two", &Board::start()).unwrap();
        }
        let mut doc: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        doc[1]["carPosition"]["y"] = Value::from(42);
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let mut archive = Archive::open(&path);
        assert_eq!(archive.list().len(), 1);
        assert_eq!(archive.skipped(), 1);
        archive.save("new", &Board::start()).unwrap();

        let doc: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let names: Vec<&str> = doc.iter().filter_map(|v| v["name"].as_str()).collect();
        assert_eq!(names, ["good_one", "new", "good_two"]);
        assert_eq!(doc[2]["carPosition"]["y"], 42);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unreadable_file_is_backed_up_before_rewrite() {
        let path = temp_path("backup");
        let backup = backup_path(&path);
        let _ = fs::remove_file(&backup);
        fs::write(&path, "{ not json").unwrap();
        let mut archive = Archive::open(&path);
        archive.save("fresh", &Board::start()).unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ not json");
        assert_eq!(Archive::open(&path).list().len(), 1);
        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(&backup);
    }

    #[test]
    fn failed_write_leaves_the_list_unchanged() {
        // A directory where the file should be makes every write fail.
        let path = temp_path("write_fails");
        let _ = fs::remove_file(&path);
        fs::create_dir_all(&path).unwrap();
        let mut archive = Archive {
            path: Some(path.clone()),
            ..Archive::default()
        };
        assert!(matches!(archive.save("lost", &Board::start()), Err(ArchiveError::Io(_))));
        assert!(archive.list().is_empty());

        archive.path = None;
        archive.save("kept", &Board::start()).unwrap();
        archive.path = Some(path.clone());
        assert!(archive.delete("kept").is_err());
        assert_eq!(archive.list().len(), 1);
        let _ = fs::remove_dir_all(&path);
    }
}
