pub mod memory;
pub mod vault;

use crate::errors::{AppError, AppResult};

pub use memory::MemoryStore;
pub use vault::VaultStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

pub trait DocumentStore {
    fn read(&self, path: &str) -> AppResult<Option<String>>;
    fn write(&self, path: &str, text: &str) -> AppResult<()>;
    fn list(&self, folder: &str) -> AppResult<Vec<StoreEntry>>;
    fn exists(&self, path: &str) -> AppResult<bool>;
    fn move_document(&self, from: &str, to: &str) -> AppResult<()>;

    fn read_required(&self, path: &str) -> AppResult<String> {
        self.read(path)?
            .ok_or_else(|| AppError::DocumentNotFound(format!("No document at {}", path)))
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn read(&self, path: &str) -> AppResult<Option<String>> {
        (**self).read(path)
    }

    fn write(&self, path: &str, text: &str) -> AppResult<()> {
        (**self).write(path, text)
    }

    fn list(&self, folder: &str) -> AppResult<Vec<StoreEntry>> {
        (**self).list(folder)
    }

    fn exists(&self, path: &str) -> AppResult<bool> {
        (**self).exists(path)
    }

    fn move_document(&self, from: &str, to: &str) -> AppResult<()> {
        (**self).move_document(from, to)
    }
}

pub fn join_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    let name = name.trim_start_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

pub(crate) fn normalize_path(path: &str) -> AppResult<String> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                return Err(AppError::StoreIo(format!(
                    "Path escapes the store root: {}",
                    path
                )))
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_and_normalizes_paths() {
        assert_eq!(join_path("", "a.md"), "a.md");
        assert_eq!(join_path("/vault/_Daily/", "DA 2026-01-07.md"), "vault/_Daily/DA 2026-01-07.md");
        assert_eq!(normalize_path("./a//b/c.md").expect("normalized"), "a/b/c.md");
        assert!(normalize_path("a/../../etc").is_err());
    }
}
