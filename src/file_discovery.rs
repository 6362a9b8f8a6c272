//! Input file enumeration.
//!
//! Expands the file-or-directory arguments of one invocation into the list
//! of documents to validate. Directories are walked recursively; an
//! optional extension filter narrows what counts as a document.

use std::path::{Path, PathBuf};

use crate::error::{Result, ValidationError};

/// File discovery over input paths
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    /// File extensions to include; empty means every file
    extensions: Vec<String>,
    /// Follow symbolic links
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict discovery to the given file extensions
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();
        self
    }

    /// Set whether to follow symbolic links
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Discover files under the given path (file or directory)
    pub fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = std::fs::metadata(path)?;

        if metadata.is_file() {
            if self.should_process(path) {
                return Ok(vec![path.to_path_buf()]);
            }
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = ignore::WalkBuilder::new(path)
            .standard_filters(false)
            .follow_links(self.follow_symlinks)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    eprintln!("Warning: error traversing {}: {}", path.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_file()) && self.should_process(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Discover files across several input paths, preserving argument order
    pub fn discover_all(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            match self.discover_files(path) {
                Ok(mut found) => files.append(&mut found),
                Err(ValidationError::Io(e)) => {
                    return Err(ValidationError::FileSystemTraversal {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(files)
    }

    /// Check whether a file passes the extension filter
    pub fn should_process(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(extension) => self.extensions.contains(&extension.to_lowercase()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("subdir1")).unwrap();
        fs::create_dir_all(root.join("subdir2/nested")).unwrap();

        fs::write(root.join("map1.xodr"), "<OpenDRIVE/>").unwrap();
        fs::write(root.join("map2.xodr"), "<OpenDRIVE/>").unwrap();
        fs::write(root.join("notes.txt"), "text file").unwrap();
        fs::write(root.join("subdir1/nested.xodr"), "<OpenDRIVE/>").unwrap();
        fs::write(root.join("subdir2/nested/deep.xosc"), "<OpenSCENARIO/>").unwrap();

        temp_dir
    }

    fn file_names(files: &[PathBuf]) -> HashSet<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_discover_all_files_without_filter() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new();

        let files = discovery.discover_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_discover_with_extension_filter() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new().with_extensions(vec!["xodr".to_string()]);

        let files = discovery.discover_files(temp_dir.path()).unwrap();
        let names = file_names(&files);

        assert_eq!(files.len(), 3);
        assert!(names.contains("map1.xodr"));
        assert!(names.contains("map2.xodr"));
        assert!(names.contains("nested.xodr"));
        assert!(!names.contains("deep.xosc"));
    }

    #[test]
    fn test_single_file_argument_passes_through() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new();

        let file = temp_dir.path().join("map1.xodr");
        let files = discovery.discover_files(&file).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_single_file_argument_respects_filter() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new().with_extensions(vec!["xodr".to_string()]);

        let files = discovery
            .discover_files(&temp_dir.path().join("notes.txt"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_all_preserves_argument_order() {
        let temp_dir = create_test_directory();
        let discovery = FileDiscovery::new();

        let inputs = vec![
            temp_dir.path().join("map2.xodr"),
            temp_dir.path().join("map1.xodr"),
        ];
        let files = discovery.discover_all(&inputs).unwrap();
        assert_eq!(files, inputs);
    }

    #[test]
    fn test_should_process() {
        let discovery = FileDiscovery::new().with_extensions(vec!["xodr".to_string()]);

        assert!(discovery.should_process(Path::new("map.xodr")));
        assert!(discovery.should_process(Path::new("map.XODR")));
        assert!(!discovery.should_process(Path::new("map.xosc")));
        assert!(!discovery.should_process(Path::new("map")));
    }

    #[test]
    fn test_nonexistent_path_is_an_error() {
        let discovery = FileDiscovery::new();
        let result = discovery.discover_all(&[PathBuf::from("/nonexistent/path")]);

        assert!(matches!(
            result,
            Err(ValidationError::FileSystemTraversal { .. })
        ));
    }
}
