pub mod auth;
pub mod autosave;
pub mod editing;
pub mod io;
pub mod models;
pub mod preview;
pub mod session;
pub mod store;
pub mod templates;
pub mod upload;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use auth::{AuthError, AuthProvider, Credentials, LocalAuth};
pub use autosave::{AutosaveCoordinator, AutosaveOptions, SaveRequest, SaveStatus, SaveTarget};
pub use editing::*;
pub use io::IoError;
pub use models::*;
pub use session::{
    EditorSession, Notification, NotificationLevel, SessionError, SessionOptions, ViewMode,
    ViewState,
};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};
pub use upload::{ImageUploader, LocalAssetUploader, UploadError};
