use super::{normalize_path, DocumentStore, StoreEntry};
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = normalize_path(path)?;
        if relative.is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentStore for VaultStore {
    fn read(&self, path: &str) -> AppResult<Option<String>> {
        let target = self.resolve(path)?;
        match fs::read_to_string(&target) {
            Ok(content) => Ok(Some(content)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::StoreIo(format!(
                "Failed to read {}: {}",
                target.to_string_lossy(),
                error
            ))),
        }
    }

    fn write(&self, path: &str, text: &str) -> AppResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|error| AppError::StoreIo(error.to_string()))?;
        }
        fs::write(&target, text).map_err(|error| {
            AppError::StoreIo(format!("Failed to write {}: {}", target.to_string_lossy(), error))
        })?;
        tracing::debug!(path = %target.to_string_lossy(), bytes = text.len(), "vault document written");
        Ok(())
    }

    fn list(&self, folder: &str) -> AppResult<Vec<StoreEntry>> {
        let relative = normalize_path(folder)?;
        let target = self.resolve(&relative)?;
        let reader = match fs::read_dir(&target) {
            Ok(reader) => reader,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(AppError::DocumentNotFound(format!(
                    "Folder not found: {}",
                    target.to_string_lossy()
                )))
            }
            Err(error) => return Err(AppError::StoreIo(error.to_string())),
        };

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|error| AppError::StoreIo(error.to_string()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry
                .file_type()
                .map(|kind| kind.is_dir())
                .map_err(|error| AppError::StoreIo(error.to_string()))?;
            entries.push(StoreEntry {
                path: super::join_path(&relative, &name),
                name,
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path)?.exists())
    }

    fn move_document(&self, from: &str, to: &str) -> AppResult<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        if !source.exists() {
            return Err(AppError::DocumentNotFound(format!(
                "No document at {}",
                source.to_string_lossy()
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|error| AppError::StoreIo(error.to_string()))?;
        }
        fs::rename(&source, &target).map_err(|error| {
            AppError::StoreIo(format!(
                "Failed to move {} to {}: {}",
                source.to_string_lossy(),
                target.to_string_lossy(),
                error
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_writes_and_lists_documents() {
        let root = tempfile::tempdir().expect("temp vault");
        let store = VaultStore::new(root.path());

        assert_eq!(store.read("Notes/missing.md").expect("read"), None);
        store.write("Notes/a.md", "alpha\n").expect("write a");
        store.write("Notes/Sub/b.md", "beta\n").expect("write b");
        assert_eq!(store.read("Notes/a.md").expect("read").as_deref(), Some("alpha\n"));
        assert!(store.exists("Notes/Sub").expect("exists"));

        let entries = store.list("Notes").expect("list");
        let names: Vec<_> = entries.iter().map(|entry| (entry.name.as_str(), entry.is_dir)).collect();
        assert_eq!(names, vec![("Sub", true), ("a.md", false)]);
        assert_eq!(entries[1].path, "Notes/a.md");
    }

    #[test]
    fn missing_folder_and_document_are_not_found() {
        let root = tempfile::tempdir().expect("temp vault");
        let store = VaultStore::new(root.path());
        let error = store.list("Nope").expect_err("missing folder");
        assert!(error.to_string().starts_with("DOCUMENT_NOT_FOUND"));
        let error = store.read_required("Nope/x.md").expect_err("missing doc");
        assert!(error.to_string().starts_with("DOCUMENT_NOT_FOUND"));
    }

    #[test]
    fn moves_documents_and_rejects_escaping_paths() {
        let root = tempfile::tempdir().expect("temp vault");
        let store = VaultStore::new(root.path());
        store.write("a.md", "x").expect("write");
        store.move_document("a.md", "archive/a.md").expect("move");
        assert!(!store.exists("a.md").expect("exists"));
        assert_eq!(store.read("archive/a.md").expect("read").as_deref(), Some("x"));
        assert!(store.read("../outside.md").is_err());
    }
}
