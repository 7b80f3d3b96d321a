//! File-based storage for native platforms: one JSON file per board.

use super::{BoardSnapshot, BoxFuture, Storage, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// File storage in the platform data directory.
    ///
    /// On Linux: `~/.local/share/brainboard/boards/`
    /// On Windows: `%LOCALAPPDATA%\brainboard\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("brainboard").join("boards"))
    }

    /// Board ids are sanitized into safe file names.
    fn board_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, snapshot: &BoardSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.board_path(id);
        let json = snapshot.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {e}", path.display()))
            })?;
            log::info!("Saved board to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<BoardSnapshot>> {
        let path = self.board_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {e}", path.display()))
            })?;
            BoardSnapshot::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.board_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;
            Ok(entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.board_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::elements::{Connector, Endpoint, Shape};
    use crate::storage::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    fn board() -> BoardSnapshot {
        BoardSnapshot {
            elements: vec![
                Shape::rectangle(Point::new(0.0, 0.0), 10.0, 10.0).into(),
                Connector::new(
                    Endpoint::Free {
                        point: Point::new(0.0, 0.0),
                    },
                    Endpoint::Free {
                        point: Point::new(50.0, 50.0),
                    },
                )
                .into(),
            ],
            viewport: Viewport {
                scale: 1.5,
                position: Point::new(-20.0, 10.0),
            },
        }
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let snapshot = board();

        block_on(storage.save("test-board", &snapshot)).unwrap();
        let loaded = block_on(storage.load("test-board")).unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        block_on(storage.save("board1", &board())).unwrap();
        block_on(storage.save("board2", &board())).unwrap();
        let mut list = block_on(storage.list()).unwrap();
        list.sort();
        assert_eq!(list, vec!["board1".to_string(), "board2".to_string()]);

        block_on(storage.delete("board1")).unwrap();
        assert!(!block_on(storage.exists("board1")).unwrap());
        assert!(block_on(storage.exists("board2")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("team/board:with*special", &board())).unwrap();
        assert!(dir.path().join("team_board_with_special.json").exists());
        let loaded = block_on(storage.load("team/board:with*special")).unwrap();
        assert_eq!(loaded.elements.len(), 2);
    }
}
