use crate::error::ExtractError;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directory scanner for extraction roots.
///
/// Walks the tree under a root and lists every directory that should become
/// an extraction unit, the root itself included. Hidden directories and the
/// configured ignore list are skipped along with everything below them.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::scanner::DirectoryScanner;
/// use std::path::PathBuf;
///
/// let scanner = DirectoryScanner::new(PathBuf::from("./my-project"), vec!["target".into()]);
/// let result = scanner.scan().unwrap();
/// println!("Found {} directories", result.directories.len());
/// ```
pub struct DirectoryScanner {
    root_path: PathBuf,
    ignored: Vec<String>,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Every directory to extract from, root first
    pub directories: Vec<PathBuf>,
    /// Warning messages for subtrees that could not be read
    pub warnings: Vec<String>,
}

impl DirectoryScanner {
    /// Creates a scanner for `root_path` that skips directories named in
    /// `ignored`.
    pub fn new(root_path: PathBuf, ignored: Vec<String>) -> Self {
        Self { root_path, ignored }
    }

    /// Scans the directory tree.
    ///
    /// Unreadable subdirectories are logged and recorded as warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be read.
    pub fn scan(&self) -> Result<ScanResult, ExtractError> {
        let mut directories = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.depth() == 0 {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_ignored = self.ignored.iter().any(|name| *name == file_name);

                !is_hidden && !is_ignored
            })
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        directories.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    return Err(ExtractError::Walk {
                        path: self.root_path.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            directories,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ignored() -> Vec<String> {
        vec!["target".to_string(), "node_modules".to_string()]
    }

    #[test]
    fn test_scan_includes_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let scanner = DirectoryScanner::new(root.to_path_buf(), ignored());
        let result = scanner.scan().unwrap();

        assert_eq!(result.directories, vec![root.to_path_buf()]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::create_dir(root.join("handlers")).unwrap();
        fs::write(root.join("src/models/user.rs"), "struct User {}").unwrap();

        let scanner = DirectoryScanner::new(root.to_path_buf(), ignored());
        let result = scanner.scan().unwrap();

        assert_eq!(result.directories.len(), 4);
        assert!(result.directories.contains(&root.join("src/models")));
        assert!(result.directories.contains(&root.join("handlers")));
    }

    #[test]
    fn test_scan_skips_ignored_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        fs::create_dir(root.join("api")).unwrap();

        let scanner = DirectoryScanner::new(root.to_path_buf(), ignored());
        let result = scanner.scan().unwrap();

        assert_eq!(
            result.directories,
            vec![root.to_path_buf(), root.join("api")]
        );
    }

    #[test]
    fn test_scan_custom_ignore_list() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("generated")).unwrap();
        fs::create_dir(root.join("target")).unwrap();

        let scanner = DirectoryScanner::new(root.to_path_buf(), vec!["generated".to_string()]);
        let result = scanner.scan().unwrap();

        assert_eq!(
            result.directories,
            vec![root.to_path_buf(), root.join("target")]
        );
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let scanner = DirectoryScanner::new(missing, ignored());
        assert!(matches!(scanner.scan(), Err(ExtractError::Walk { .. })));
    }
}
