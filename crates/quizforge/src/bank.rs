//! Question bank persistence boundary.
//!
//! Accepted items are kept in a [`QuestionBank`] and saved/loaded
//! through the [`QuestionStore`] trait. The shipped implementation is a
//! pretty-printed JSON file; richer backends live behind the same
//! trait in the embedding application.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::item::QuizItem;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    #[serde(default)]
    pub items: Vec<QuizItem>,
}

impl QuestionBank {
    /// Appends a completed job's items to the bank.
    pub fn accept(&mut self, items: Vec<QuizItem>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub trait QuestionStore: Send + Sync {
    fn load_questions(&self) -> Result<QuestionBank, StoreError>;
    fn save_questions(&self, bank: &QuestionBank) -> Result<(), StoreError>;
}

/// JSON-file question store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestionStore for JsonFileStore {
    fn load_questions(&self) -> Result<QuestionBank, StoreError> {
        if !self.path.exists() {
            return Ok(QuestionBank::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| StoreError::ReadFile {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    fn save_questions(&self, bank: &QuestionBank) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(bank)?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        info!("Saved {} questions to {}", bank.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::GenerationMode;
    use tempfile::TempDir;

    fn item(id: &str) -> QuizItem {
        QuizItem {
            id: id.to_string(),
            mode: GenerationMode::OpenEnded,
            stem: "What is a cell?".to_string(),
            options: vec![],
            answer: "The basic unit of life.".to_string(),
            explanation: None,
            subject: "Biology".to_string(),
            unit: "Cells".to_string(),
            source_signature: None,
        }
    }

    #[test]
    fn test_missing_file_loads_empty_bank() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("bank.json"));
        let bank = store.load_questions().unwrap();
        assert!(bank.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("nested/dir/bank.json"));

        let mut bank = QuestionBank::default();
        bank.accept(vec![item("a"), item("b")]);
        store.save_questions(&bank).unwrap();

        let loaded = store.load_questions().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.items[0].id, "a");
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bank.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load_questions().unwrap_err(),
            StoreError::Parse(_)
        ));
    }

    #[test]
    fn test_accept_appends() {
        let mut bank = QuestionBank::default();
        bank.accept(vec![item("a")]);
        bank.accept(vec![item("b"), item("c")]);
        assert_eq!(bank.len(), 3);
    }
}
