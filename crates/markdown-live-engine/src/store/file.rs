use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use relative_path::{Component, RelativePathBuf};
use serde::{Deserialize, Serialize};

use crate::io::{self, IoError};
use crate::models::{Document, DocumentId, DocumentUpdate, UserId};
use crate::store::{DocumentStore, StoreError, sort_newest_first};

/// Stores each document as `<root>/<user>/<id>.md` with its title and
/// timestamps alongside in `<root>/<user>/<id>.toml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentMeta {
    id: DocumentId,
    user_id: UserId,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        io::validate_storage_dir(&root).map_err(into_store_error)?;
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(user_id: &UserId) -> Result<RelativePathBuf, StoreError> {
        let dir = RelativePathBuf::from(user_id.as_str());
        let mut components = dir.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(dir),
            _ => Err(StoreError::Unavailable(format!(
                "user id {user_id:?} cannot be used as a directory name"
            ))),
        }
    }

    fn content_path(user_id: &UserId, id: DocumentId) -> Result<RelativePathBuf, StoreError> {
        Ok(Self::user_dir(user_id)?.join(format!("{id}.md")))
    }

    fn meta_path(user_id: &UserId, id: DocumentId) -> Result<RelativePathBuf, StoreError> {
        Ok(Self::user_dir(user_id)?.join(format!("{id}.toml")))
    }

    fn write(&self, meta: &DocumentMeta, content: Option<&str>) -> Result<(), StoreError> {
        let encoded = toml::to_string_pretty(meta).map_err(|e| StoreError::Corrupt {
            id: meta.id.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(content) = content {
            io::write_file(
                &Self::content_path(&meta.user_id, meta.id)?,
                &self.root,
                content,
            )
            .map_err(into_store_error)?;
        }
        io::write_file(&Self::meta_path(&meta.user_id, meta.id)?, &self.root, &encoded)
            .map_err(into_store_error)
    }

    fn read_meta_file(&self, path: &Path) -> Result<DocumentMeta, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| StoreError::Corrupt {
            id: path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
            reason: e.to_string(),
        })
    }

    /// Find a document's metadata without knowing its owner
    fn find_meta(&self, id: DocumentId) -> Result<DocumentMeta, StoreError> {
        let file_name = format!("{id}.toml");
        for entry in std::fs::read_dir(&self.root)? {
            let user_dir = entry?.path();
            let candidate = user_dir.join(&file_name);
            if user_dir.is_dir() && candidate.exists() {
                return self.read_meta_file(&candidate);
            }
        }
        Err(StoreError::NotFound(id))
    }

    fn load(&self, meta: DocumentMeta) -> Result<Document, StoreError> {
        let content = io::read_file(&Self::content_path(&meta.user_id, meta.id)?, &self.root)
            .map_err(|e| match e {
                IoError::NotFound(_) => StoreError::NotFound(meta.id),
                other => into_store_error(other),
            })?;
        Ok(Document {
            id: meta.id,
            user_id: meta.user_id,
            title: meta.title,
            content,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }
}

impl DocumentStore for FileStore {
    fn create(
        &mut self,
        user_id: &UserId,
        title: &str,
        content: &str,
    ) -> Result<DocumentId, StoreError> {
        let document = Document::new(user_id.clone(), title, content);
        let meta = DocumentMeta {
            id: document.id,
            user_id: document.user_id,
            title: document.title,
            created_at: document.created_at,
            updated_at: document.updated_at,
        };
        self.write(&meta, Some(content))?;
        log::debug!("Created document {} for {}", meta.id, meta.user_id);
        Ok(meta.id)
    }

    fn update(&mut self, id: DocumentId, update: DocumentUpdate) -> Result<(), StoreError> {
        let mut meta = self.find_meta(id)?;
        if let Some(title) = update.title {
            meta.title = title;
        }
        meta.updated_at = Utc::now();
        self.write(&meta, update.content.as_deref())
    }

    fn delete(&mut self, id: DocumentId) -> Result<(), StoreError> {
        let meta = self.find_meta(id)?;
        let content = Self::content_path(&meta.user_id, id)?.to_path(&self.root);
        let metadata = Self::meta_path(&meta.user_id, id)?.to_path(&self.root);
        if content.exists() {
            std::fs::remove_file(content)?;
        }
        std::fs::remove_file(metadata)?;
        Ok(())
    }

    fn get(&self, id: DocumentId) -> Result<Document, StoreError> {
        let meta = self.find_meta(id)?;
        self.load(meta)
    }

    fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Document>, StoreError> {
        let dir = Self::user_dir(user_id)?.to_path(&self.root);
        let mut documents = Vec::new();
        for path in io::scan_files_with_extension(&dir, "toml").map_err(into_store_error)? {
            match self.read_meta_file(&path).and_then(|meta| self.load(meta)) {
                Ok(document) => documents.push(document),
                Err(e) => log::warn!("Skipping unreadable document {}: {e}", path.display()),
            }
        }
        sort_newest_first(&mut documents);
        Ok(documents)
    }
}

fn into_store_error(error: IoError) -> StoreError {
    match error {
        IoError::Io(e) => StoreError::Io(e),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_storage_dir;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_writes_content_and_metadata() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();
        let alice = UserId::new("alice");

        let id = store.create(&alice, "Untitled Document", "# Draft").unwrap();

        let user_dir = storage.path().join("alice");
        assert_eq!(
            std::fs::read_to_string(user_dir.join(format!("{id}.md"))).unwrap(),
            "# Draft"
        );
        assert!(user_dir.join(format!("{id}.toml")).exists());
    }

    #[test]
    fn test_update_and_get() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();
        let alice = UserId::new("alice");
        let id = store.create(&alice, "Notes", "v1").unwrap();

        store.update(id, DocumentUpdate::content("v2")).unwrap();
        store.update(id, DocumentUpdate::title("Renamed")).unwrap();

        let doc = store.get(id).unwrap();
        assert_eq!(doc.content, "v2");
        assert_eq!(doc.title, "Renamed");
        assert!(doc.updated_at >= doc.created_at);
    }

    #[test]
    fn test_list_by_user_only_returns_owner_documents() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();
        let alice = UserId::new("alice");
        store.create(&alice, "one", "1").unwrap();
        store.create(&alice, "two", "2").unwrap();
        store.create(&UserId::new("bob"), "three", "3").unwrap();

        let docs = store.list_by_user(&alice).unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|doc| doc.user_id == alice));
    }

    #[test]
    fn test_list_for_unknown_user_is_empty() {
        let storage = create_test_storage_dir();
        let store = FileStore::open(storage.path()).unwrap();

        assert!(store.list_by_user(&UserId::new("nobody")).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_both_files() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();
        let id = store.create(&UserId::new("alice"), "t", "c").unwrap();

        store.delete(id).unwrap();

        assert!(matches!(store.get(id), Err(StoreError::NotFound(_))));
        assert!(
            std::fs::read_dir(storage.path().join("alice"))
                .unwrap()
                .next()
                .is_none()
        );
    }

    #[test]
    fn test_update_unknown_document_fails() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();

        let result = store.update(DocumentId::new(), DocumentUpdate::content("x"));

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_path_like_user_id_is_rejected() {
        let storage = create_test_storage_dir();
        let mut store = FileStore::open(storage.path()).unwrap();

        let result = store.create(&UserId::new("../escape"), "t", "c");

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_open_rejects_file_root() {
        let storage = create_test_storage_dir();
        let file = storage.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        assert!(FileStore::open(&file).is_err());
    }
}
