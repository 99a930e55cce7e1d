//! Document persistence.
//!
//! The editor only talks to storage through [`DocumentStore`]. Two
//! implementations ship with the engine: [`MemoryStore`] for tests and
//! embedding, and [`FileStore`] which keeps one markdown file plus a small
//! TOML metadata file per document.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{Document, DocumentId, DocumentUpdate, UserId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt document metadata for {id}: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub trait DocumentStore {
    /// Persist a new document and return its id
    fn create(
        &mut self,
        user_id: &UserId,
        title: &str,
        content: &str,
    ) -> Result<DocumentId, StoreError>;

    fn update(&mut self, id: DocumentId, update: DocumentUpdate) -> Result<(), StoreError>;

    fn delete(&mut self, id: DocumentId) -> Result<(), StoreError>;

    fn get(&self, id: DocumentId) -> Result<Document, StoreError>;

    /// All documents owned by `user_id`, most recently updated first
    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Document>, StoreError>;
}

pub(crate) fn sort_newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
}
