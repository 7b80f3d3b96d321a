//! Boards kept in process memory, encoded the same way `FileStorage` writes them.

use super::{BoardSnapshot, BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Board JSON keyed by board id. Nothing outlives the process.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Other("memory storage lock poisoned".to_string())
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, snapshot: &BoardSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let encoded = snapshot.to_json();
        Box::pin(async move {
            let json = encoded.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.boards.write().map_err(poisoned)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<BoardSnapshot>> {
        let id = id.to_string();
        Box::pin(async move {
            let boards = self.boards.read().map_err(poisoned)?;
            let json = boards.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            BoardSnapshot::from_json(json)
                .map_err(|e| StorageError::Serialization(format!("board {id}: {e}")))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.boards.write().map_err(poisoned)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let mut ids: Vec<String> = self.boards.read().map_err(poisoned)?.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.boards.read().map_err(poisoned)?.contains_key(&id)) })
    }
}
