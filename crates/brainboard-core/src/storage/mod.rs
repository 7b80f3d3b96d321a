//! Storage abstraction for persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::camera::Viewport;
use crate::elements::Element;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A board as persisted: every element record plus the viewport.
///
/// Layered elements come first in z order, then strokes in ink order. Each record
/// carries a `type` tag that loading partitions on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl BoardSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for board storage backends.
///
/// `save` fully replaces whatever was stored under the id. Backends report
/// failures to the caller and never retry.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a board, replacing any previous state.
    fn save(&self, id: &str, snapshot: &BoardSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a board.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<BoardSnapshot>>;

    /// Delete a board.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all board IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a board exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for board storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, id: &str, snapshot: &BoardSnapshot) -> BoxFuture<'_, StorageResult<()>>;
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<BoardSnapshot>>;
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Drive a storage future to completion on the current thread.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    let mut f = std::pin::pin!(f);
    loop {
        if let Poll::Ready(output) = f.as_mut().poll(&mut cx) {
            return output;
        }
    }
}
