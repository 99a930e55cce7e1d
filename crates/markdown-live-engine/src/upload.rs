//! Image hosting.

use std::path::{Path, PathBuf};

use relative_path::{Component, RelativePath, RelativePathBuf};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ImageUploader {
    /// Store `bytes` and return the URL the markdown should reference
    fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// Copies images into `<root>/assets/` and hands back `assets/<name>`
#[derive(Debug, Clone)]
pub struct LocalAssetUploader {
    root: PathBuf,
}

impl LocalAssetUploader {
    pub const ASSETS_DIR: &'static str = "assets";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(Self::ASSETS_DIR)
    }

    fn stored_name(file_name: &str) -> Result<String, UploadError> {
        let mut components = RelativePath::new(file_name).components();
        let name = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name,
            _ => return Err(UploadError::InvalidFileName(file_name.to_string())),
        };

        let extension = Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType(file_name.to_string()));
        }

        // Same name uploaded twice must not clobber the first image
        let unique = Uuid::new_v4().simple().to_string();
        Ok(format!("{}-{name}", &unique[..8]))
    }
}

/// Markdown image reference for an uploaded file
///
/// Brackets in the alt text are escaped, and destinations holding spaces,
/// parentheses or angle brackets are wrapped in `<...>`.
pub fn image_markdown(alt: &str, url: &str) -> String {
    let mut escaped_alt = String::with_capacity(alt.len());
    for c in alt.chars() {
        if matches!(c, '\\' | '[' | ']') {
            escaped_alt.push('\\');
        }
        escaped_alt.push(c);
    }

    let needs_brackets = url
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));
    if needs_brackets {
        let inner = url.replace('<', "\\<").replace('>', "\\>");
        format!("![{escaped_alt}](<{inner}>)")
    } else {
        format!("![{escaped_alt}]({url})")
    }
}

impl ImageUploader for LocalAssetUploader {
    fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let stored = Self::stored_name(file_name)?;
        let relative = RelativePathBuf::from(Self::ASSETS_DIR).join(&stored);
        let target = relative.to_path(&self.root);
        std::fs::create_dir_all(self.assets_dir())?;
        std::fs::write(&target, bytes)?;
        log::debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(relative.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_storage_dir;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_upload_writes_into_assets() {
        let storage = create_test_storage_dir();
        let mut uploader = LocalAssetUploader::new(storage.path());

        let url = uploader.upload("cat.png", b"\x89PNG").unwrap();

        assert!(url.starts_with("assets/"));
        assert!(url.ends_with("-cat.png"));
        assert_eq!(
            std::fs::read(storage.path().join(&url)).unwrap(),
            b"\x89PNG".to_vec()
        );
    }

    #[test]
    fn test_same_name_twice_keeps_both() {
        let storage = create_test_storage_dir();
        let mut uploader = LocalAssetUploader::new(storage.path());

        let first = uploader.upload("cat.png", b"1").unwrap();
        let second = uploader.upload("cat.png", b"2").unwrap();

        assert_ne!(first, second);
    }

    #[rstest]
    #[case("../escape.png")]
    #[case("nested/dir.png")]
    #[case("")]
    fn test_path_like_names_are_rejected(#[case] name: &str) {
        let storage = create_test_storage_dir();
        let mut uploader = LocalAssetUploader::new(storage.path());

        assert!(matches!(
            uploader.upload(name, b"x"),
            Err(UploadError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_non_image_is_rejected() {
        let storage = create_test_storage_dir();
        let mut uploader = LocalAssetUploader::new(storage.path());

        assert!(matches!(
            uploader.upload("notes.txt", b"x"),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(!uploader.assets_dir().exists());
    }

    #[rstest]
    #[case("cat.png", "assets/cat.png", "![cat.png](assets/cat.png)")]
    #[case("my cat.png", "assets/ab-my cat.png", "![my cat.png](<assets/ab-my cat.png>)")]
    #[case("a]b.png", "assets/a]b.png", "![a\\]b.png](assets/a]b.png)")]
    #[case("(x).png", "assets/(x).png", "![(x).png](<assets/(x).png>)")]
    fn test_image_markdown(#[case] alt: &str, #[case] url: &str, #[case] expected: &str) {
        assert_eq!(image_markdown(alt, url), expected);
    }
}
