use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a markdown file: {0}")]
    NotMarkdown(PathBuf),
    #[error("Invalid storage directory: {0}")]
    InvalidStorageDir(String),
}

/// Read a file below `root` and return its content
pub fn read_file(relative_path: &RelativePath, root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a file below `root`, creating parent directories
pub fn write_file(relative_path: &RelativePath, root: &Path, content: &str) -> Result<(), IoError> {
    write_absolute(&relative_path.to_path(root), content)
}

/// Load a markdown file from anywhere on disk into the editor
pub fn import_markdown(path: &Path) -> Result<String, IoError> {
    if !is_markdown(path) {
        return Err(IoError::NotMarkdown(path.to_path_buf()));
    }
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Save editor content as a markdown file
pub fn export_markdown(path: &Path, content: &str) -> Result<(), IoError> {
    write_absolute(path, content)
}

/// List files directly inside `dir` with the given extension, sorted
pub fn scan_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, IoError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == extension
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn validate_storage_dir(path: &Path) -> Result<(), IoError> {
    if path.exists() && !path.is_dir() {
        return Err(IoError::InvalidStorageDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}

fn write_absolute(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "md" || ext == "markdown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_storage_dir};
    use relative_path::RelativePath;

    #[test]
    fn test_read_file_success() {
        let storage = create_test_storage_dir();
        create_test_file(&storage, "test.md", "# Test Content\n\nParagraph");

        let content = read_file(RelativePath::new("test.md"), storage.path()).unwrap();
        assert_eq!(content, "# Test Content\n\nParagraph");
    }

    #[test]
    fn test_read_file_not_found() {
        let storage = create_test_storage_dir();

        let result = read_file(RelativePath::new("nonexistent.md"), storage.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_file_creates_parent_directories() {
        let storage = create_test_storage_dir();
        let relative_path = RelativePath::new("folder/subfolder/new_file.md");

        write_file(relative_path, storage.path(), "# Nested").unwrap();

        let written = read_file(relative_path, storage.path()).unwrap();
        assert_eq!(written, "# Nested");
        assert!(storage.path().join("folder").join("subfolder").is_dir());
    }

    #[test]
    fn test_write_file_overwrites_existing() {
        let storage = create_test_storage_dir();
        create_test_file(&storage, "existing.md", "# Original Content");
        let relative_path = RelativePath::new("existing.md");

        write_file(relative_path, storage.path(), "# Updated").unwrap();

        assert_eq!(
            read_file(relative_path, storage.path()).unwrap(),
            "# Updated"
        );
    }

    #[test]
    fn test_import_markdown() {
        let storage = create_test_storage_dir();
        let path = create_test_file(&storage, "notes.md", "- item");

        assert_eq!(import_markdown(&path).unwrap(), "- item");
    }

    #[test]
    fn test_import_rejects_non_markdown() {
        let storage = create_test_storage_dir();
        let path = create_test_file(&storage, "image.png", "fake image data");

        assert!(matches!(
            import_markdown(&path),
            Err(IoError::NotMarkdown(_))
        ));
    }

    #[test]
    fn test_export_then_import() {
        let storage = create_test_storage_dir();
        let path = storage.path().join("out").join("doc.md");

        export_markdown(&path, "# Exported").unwrap();

        assert_eq!(import_markdown(&path).unwrap(), "# Exported");
    }

    #[test]
    fn test_scan_files_with_extension() {
        let storage = create_test_storage_dir();
        create_test_file(&storage, "b.toml", "");
        create_test_file(&storage, "a.toml", "");
        create_test_file(&storage, "a.md", "");

        let files = scan_files_with_extension(storage.path(), "toml").unwrap();

        let names: Vec<_> = files
            .iter()
            .filter_map(|f| f.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.toml", "b.toml"]);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let files = scan_files_with_extension(Path::new("/this/path/does/not/exist"), "md");
        assert!(files.unwrap().is_empty());
    }

    #[test]
    fn test_validate_storage_dir_rejects_file() {
        let storage = create_test_storage_dir();
        let path = create_test_file(&storage, "plain.txt", "x");

        assert!(matches!(
            validate_storage_dir(&path),
            Err(IoError::InvalidStorageDir(_))
        ));
        assert!(validate_storage_dir(storage.path()).is_ok());
    }
}
