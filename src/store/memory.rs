use super::{join_path, normalize_path, DocumentStore, StoreEntry};
use crate::errors::{AppError, AppResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, String>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, P, T>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: Into<String>,
    {
        let store = Self::new();
        {
            let mut writer = store.documents.write().expect("memory store write lock");
            for (path, text) in documents {
                if let Ok(path) = normalize_path(path.as_ref()) {
                    writer.insert(path, text.into());
                }
            }
        }
        store
    }

    pub fn write_count(&self) -> usize {
        *self.writes.read().expect("memory store counter lock")
    }

    fn is_folder(documents: &BTreeMap<String, String>, folder: &str) -> bool {
        if folder.is_empty() {
            return true;
        }
        let prefix = format!("{}/", folder);
        documents.keys().any(|key| key.starts_with(&prefix))
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &str) -> AppResult<Option<String>> {
        let path = normalize_path(path)?;
        let documents = self.documents.read().expect("memory store read lock");
        Ok(documents.get(&path).cloned())
    }

    fn write(&self, path: &str, text: &str) -> AppResult<()> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Err(AppError::StoreIo("Cannot write to the store root".to_string()));
        }
        self.documents
            .write()
            .expect("memory store write lock")
            .insert(path, text.to_string());
        *self.writes.write().expect("memory store counter lock") += 1;
        Ok(())
    }

    fn list(&self, folder: &str) -> AppResult<Vec<StoreEntry>> {
        let folder = normalize_path(folder)?;
        let documents = self.documents.read().expect("memory store read lock");
        if !Self::is_folder(&documents, &folder) {
            return Err(AppError::DocumentNotFound(format!("Folder not found: {}", folder)));
        }

        let prefix = if folder.is_empty() { String::new() } else { format!("{}/", folder) };
        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();
        for key in documents.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => {
                    files.insert(rest.to_string());
                }
            }
        }

        let mut entries: Vec<StoreEntry> = dirs
            .into_iter()
            .map(|name| (name, true))
            .chain(files.into_iter().map(|name| (name, false)))
            .map(|(name, is_dir)| StoreEntry {
                path: join_path(&folder, &name),
                name,
                is_dir,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn exists(&self, path: &str) -> AppResult<bool> {
        let path = normalize_path(path)?;
        let documents = self.documents.read().expect("memory store read lock");
        Ok(documents.contains_key(&path) || Self::is_folder(&documents, &path))
    }

    fn move_document(&self, from: &str, to: &str) -> AppResult<()> {
        let from = normalize_path(from)?;
        let to = normalize_path(to)?;
        let mut documents = self.documents.write().expect("memory store write lock");
        let Some(text) = documents.remove(&from) else {
            return Err(AppError::DocumentNotFound(format!("No document at {}", from)));
        };
        documents.insert(to, text);
        Ok(())
    }
}
