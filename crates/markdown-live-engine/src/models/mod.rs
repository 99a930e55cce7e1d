pub mod document;

pub use document::{Document, DocumentId, DocumentUpdate, UserId};
