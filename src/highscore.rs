use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::constants::UNKNOWN_PLAYER_NAME;
use crate::error::{GameError, GameResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Where highscores live between runs.
pub trait HighscoreStore {
    fn load(&mut self) -> GameResult<Vec<HighscoreEntry>>;
    fn save(&mut self, entries: &[HighscoreEntry]) -> GameResult<()>;
    fn clear(&mut self) -> GameResult<()>;
}

/// Pretty-printed JSON array on disk. A missing file reads as no entries.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighscoreStore for JsonFileStore {
    fn load(&mut self) -> GameResult<Vec<HighscoreEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(GameError::io(&self.path, e)),
        }
    }

    fn save(&mut self, entries: &[HighscoreEntry]) -> GameResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| GameError::io(dir, e))?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text).map_err(|e| GameError::io(&self.path, e))
    }

    fn clear(&mut self) -> GameResult<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(GameError::io(&self.path, e)),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<HighscoreEntry>,
}

impl HighscoreStore for MemoryStore {
    fn load(&mut self) -> GameResult<Vec<HighscoreEntry>> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, entries: &[HighscoreEntry]) -> GameResult<()> {
        self.entries = entries.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> GameResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Best scores, highest first, never longer than `capacity`.
///
/// Storage failures never reach the caller: a board that cannot load starts
/// empty, and a failed save keeps the in-memory list.
pub struct HighscoreBoard {
    entries: Vec<HighscoreEntry>,
    capacity: usize,
    store: Box<dyn HighscoreStore>,
}

impl HighscoreBoard {
    pub fn load(mut store: Box<dyn HighscoreStore>, capacity: usize) -> Self {
        let mut entries = store.load().unwrap_or_else(|e| {
            tracing::warn!("could not load highscores: {e}");
            Vec::new()
        });
        sort_and_cap(&mut entries, capacity);
        Self {
            entries,
            capacity,
            store,
        }
    }

    pub fn in_memory(capacity: usize) -> Self {
        Self::load(Box::<MemoryStore>::default(), capacity)
    }

    pub fn entries(&self) -> &[HighscoreEntry] {
        &self.entries
    }

    pub fn qualifies(&self, score: u32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        self.entries.len() < self.capacity || self.entries.last().map_or(true, |lowest| score > lowest.score)
    }

    /// Records a result dated today. Returns its rank (0 = best) if it made
    /// the board.
    pub fn submit(&mut self, name: &str, score: u32, level: u32) -> Option<usize> {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        self.submit_dated(name, score, level, date)
    }

    pub fn submit_dated(&mut self, name: &str, score: u32, level: u32, date: String) -> Option<usize> {
        let name = name.trim();
        let name = if name.is_empty() { UNKNOWN_PLAYER_NAME } else { name };
        self.entries.push(HighscoreEntry {
            name: name.to_string(),
            score,
            level,
            date,
        });
        let index = self.entries.len() - 1;
        // Stable sort keeps earlier equal scores ahead of the new one.
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].score.cmp(&self.entries[a].score));
        let rank = order.iter().position(|&i| i == index);
        sort_and_cap(&mut self.entries, self.capacity);
        self.persist();
        rank.filter(|&r| r < self.capacity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.clear() {
            tracing::warn!("could not clear highscores: {e}");
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.entries) {
            tracing::warn!("could not save highscores: {e}");
        }
    }
}

fn sort_and_cap(entries: &mut Vec<HighscoreEntry>, capacity: usize) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(capacity);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl HighscoreStore for BrokenStore {
        fn load(&mut self) -> GameResult<Vec<HighscoreEntry>> {
            Err(GameError::InvalidConfig("storage unavailable".into()))
        }
        fn save(&mut self, _entries: &[HighscoreEntry]) -> GameResult<()> {
            Err(GameError::InvalidConfig("storage unavailable".into()))
        }
        fn clear(&mut self) -> GameResult<()> {
            Err(GameError::InvalidConfig("storage unavailable".into()))
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ljus-morker-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn board_is_sorted_and_capped() {
        let mut board = HighscoreBoard::in_memory(3);
        for (i, score) in [50, 10, 70, 30].into_iter().enumerate() {
            board.submit_dated(&format!("p{i}"), score, 1, "2024-01-01".into());
        }
        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![70, 50, 30]);
    }

    #[test]
    fn qualification_rules() {
        let mut board = HighscoreBoard::in_memory(2);
        assert!(board.qualifies(0));
        board.submit_dated("a", 100, 1, "2024-01-01".into());
        board.submit_dated("b", 40, 1, "2024-01-01".into());
        assert!(!board.qualifies(40));
        assert!(board.qualifies(41));
        assert_eq!(board.submit_dated("c", 10, 1, "2024-01-01".into()), None);
        assert_eq!(board.submit_dated("d", 500, 2, "2024-01-01".into()), Some(0));
    }

    #[test]
    fn blank_name_becomes_unknown_player() {
        let mut board = HighscoreBoard::in_memory(5);
        board.submit("   ", 10, 1);
        assert_eq!(board.entries()[0].name, UNKNOWN_PLAYER_NAME);
        assert_eq!(board.entries()[0].date.len(), 10);
    }

    #[test]
    fn broken_store_degrades_to_memory() {
        let mut board = HighscoreBoard::load(Box::new(BrokenStore), 5);
        assert!(board.entries().is_empty());
        board.submit_dated("x", 10, 1, "2024-01-01".into());
        assert_eq!(board.entries().len(), 1);
        board.clear();
        assert!(board.entries().is_empty());
    }

    #[test]
    fn json_store_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);
        {
            let mut board = HighscoreBoard::load(Box::new(JsonFileStore::new(&path)), 10);
            assert!(board.entries().is_empty());
            board.submit_dated("Astrid", 320, 4, "2024-05-17".into());
        }
        let board = HighscoreBoard::load(Box::new(JsonFileStore::new(&path)), 10);
        assert_eq!(board.entries()[0].name, "Astrid");
        assert_eq!(board.entries()[0].level, 4);

        let mut store = JsonFileStore::new(&path);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty_board() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::new(&path).load(), Err(GameError::Serde(_))));
        let board = HighscoreBoard::load(Box::new(JsonFileStore::new(&path)), 10);
        assert!(board.entries().is_empty());
        let _ = fs::remove_file(&path);
    }
}
