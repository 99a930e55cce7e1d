use std::collections::BTreeMap;

use crate::models::{Document, DocumentId, DocumentUpdate, UserId};
use crate::store::{DocumentStore, StoreError, sort_newest_first};

/// In-memory store keyed by document id
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: BTreeMap<DocumentId, Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn create(
        &mut self,
        user_id: &UserId,
        title: &str,
        content: &str,
    ) -> Result<DocumentId, StoreError> {
        let document = Document::new(user_id.clone(), title, content);
        let id = document.id;
        self.documents.insert(id, document);
        Ok(id)
    }

    fn update(&mut self, id: DocumentId, update: DocumentUpdate) -> Result<(), StoreError> {
        let document = self
            .documents
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        document.apply_update(update);
        Ok(())
    }

    fn delete(&mut self, id: DocumentId) -> Result<(), StoreError> {
        self.documents
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn get(&self, id: DocumentId) -> Result<Document, StoreError> {
        self.documents
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Document>, StoreError> {
        let mut documents: Vec<Document> = self
            .documents
            .values()
            .filter(|doc| &doc.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut documents);
        Ok(documents)
    }
}
