use crate::error::StoreError;
use crate::result::StoreResult;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// Project file store
///
/// Paths are relative, `/`-separated and scoped to a project id. The editor
/// only uses the store to build prompt context and to persist the rendered
/// bundle after a mutation has already succeeded in memory.
pub trait ProjectStore: Send + Sync {
    /// All file paths of a project, sorted
    fn list_files(&self, project: &str) -> StoreResult<Vec<String>>;

    fn read_text(&self, project: &str, path: &str) -> StoreResult<String>;

    fn save_text(&self, project: &str, path: &str, content: &str) -> StoreResult<()>;

    fn save_binary(&self, project: &str, path: &str, content: &[u8]) -> StoreResult<()>;

    fn delete_file(&self, project: &str, path: &str) -> StoreResult<()>;

    fn rename(&self, project: &str, from: &str, to: &str) -> StoreResult<()>;
}

/// Reject absolute paths and parent-directory escapes
fn checked_relative(path: &str) -> StoreResult<PathBuf> {
    let relative = Path::new(path);
    if path.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(StoreError::InvalidPath(path.to_string())),
        }
    }
    Ok(relative.to_path_buf())
}

/// Store backed by a directory: `<root>/<project>/<path>`
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_dir(&self, project: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(checked_relative(project)?))
    }

    fn file_path(&self, project: &str, path: &str) -> StoreResult<PathBuf> {
        Ok(self.project_dir(project)?.join(checked_relative(path)?))
    }

    fn collect(dir: &Path, base: &Path, files: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect(&path, base, files)?;
            } else if let Ok(relative) = path.strip_prefix(base) {
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                files.push(parts.join("/"));
            }
        }
        Ok(())
    }

    fn write(&self, project: &str, path: &str, content: &[u8]) -> StoreResult<()> {
        let target = self.file_path(project, path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
        tracing::debug!(project, path, bytes = content.len(), "saved file");
        Ok(())
    }

    fn not_found(project: &str, path: &str) -> StoreError {
        StoreError::NotFound {
            project: project.to_string(),
            path: path.to_string(),
        }
    }
}

impl ProjectStore for DirectoryStore {
    fn list_files(&self, project: &str) -> StoreResult<Vec<String>> {
        let dir = self.project_dir(project)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        Self::collect(&dir, &dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn read_text(&self, project: &str, path: &str) -> StoreResult<String> {
        let target = self.file_path(project, path)?;
        if !target.is_file() {
            return Err(Self::not_found(project, path));
        }
        let bytes = std::fs::read(&target)?;
        String::from_utf8(bytes).map_err(|_| StoreError::NotText(path.to_string()))
    }

    fn save_text(&self, project: &str, path: &str, content: &str) -> StoreResult<()> {
        self.write(project, path, content.as_bytes())
    }

    fn save_binary(&self, project: &str, path: &str, content: &[u8]) -> StoreResult<()> {
        self.write(project, path, content)
    }

    fn delete_file(&self, project: &str, path: &str) -> StoreResult<()> {
        let target = self.file_path(project, path)?;
        if !target.is_file() {
            return Err(Self::not_found(project, path));
        }
        std::fs::remove_file(target)?;
        Ok(())
    }

    fn rename(&self, project: &str, from: &str, to: &str) -> StoreResult<()> {
        let source = self.file_path(project, from)?;
        if !source.is_file() {
            return Err(Self::not_found(project, from));
        }
        let target = self.file_path(project, to)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(source, target)?;
        Ok(())
    }
}

/// In-memory store for tests and scratch projects
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_files<T>(&self, f: impl FnOnce(&mut BTreeMap<(String, String), Vec<u8>>) -> T) -> T {
        let mut files = self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut files)
    }

    fn key(project: &str, path: &str) -> StoreResult<(String, String)> {
        checked_relative(path)?;
        Ok((project.to_string(), path.to_string()))
    }
}

impl ProjectStore for MemoryStore {
    fn list_files(&self, project: &str) -> StoreResult<Vec<String>> {
        Ok(self.with_files(|files| {
            files
                .keys()
                .filter(|(p, _)| p == project)
                .map(|(_, path)| path.clone())
                .collect()
        }))
    }

    fn read_text(&self, project: &str, path: &str) -> StoreResult<String> {
        let key = Self::key(project, path)?;
        let bytes = self
            .with_files(|files| files.get(&key).cloned())
            .ok_or_else(|| DirectoryStore::not_found(project, path))?;
        String::from_utf8(bytes).map_err(|_| StoreError::NotText(path.to_string()))
    }

    fn save_text(&self, project: &str, path: &str, content: &str) -> StoreResult<()> {
        self.save_binary(project, path, content.as_bytes())
    }

    fn save_binary(&self, project: &str, path: &str, content: &[u8]) -> StoreResult<()> {
        let key = Self::key(project, path)?;
        self.with_files(|files| files.insert(key, content.to_vec()));
        Ok(())
    }

    fn delete_file(&self, project: &str, path: &str) -> StoreResult<()> {
        let key = Self::key(project, path)?;
        self.with_files(|files| files.remove(&key))
            .map(|_| ())
            .ok_or_else(|| DirectoryStore::not_found(project, path))
    }

    fn rename(&self, project: &str, from: &str, to: &str) -> StoreResult<()> {
        let from_key = Self::key(project, from)?;
        let to_key = Self::key(project, to)?;
        self.with_files(|files| {
            let content = files.remove(&from_key)?;
            files.insert(to_key, content);
            Some(())
        })
        .ok_or_else(|| DirectoryStore::not_found(project, from))
    }
}

/// Concatenate a project's text files into a prompt context block
///
/// Files in `exclude` and files that are not UTF-8 are skipped. Output stops
/// growing once `max_bytes` is reached.
pub fn build_file_context(
    store: &dyn ProjectStore,
    project: &str,
    exclude: &[&str],
    max_bytes: usize,
) -> StoreResult<String> {
    let mut context = String::new();

    for path in store.list_files(project)? {
        if exclude.contains(&path.as_str()) {
            continue;
        }
        let content = match store.read_text(project, &path) {
            Ok(content) => content,
            Err(StoreError::NotText(_)) => continue,
            Err(e) => return Err(e),
        };
        let block = format!("--- {} ---\n{}\n\n", path, content.trim_end());
        if context.len() + block.len() > max_bytes {
            tracing::debug!(project, path = %path, "file context limit reached");
            break;
        }
        context.push_str(&block);
    }

    Ok(context)
}
