use anyhow::{Result, anyhow};
use ignore::{DirEntry, WalkBuilder};
use log::{debug, trace, warn};
use path_clean::clean;
use std::path::{Path, PathBuf};

use crate::constants::{SKIPPED_DIRS, SOURCE_EXTENSIONS};

/// A source file found under a scan path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (base-joined) path used for reading
    pub path: PathBuf,
    /// Scan path joined with the file's path below it, used in reports
    pub display: String,
}

/// Joins `scan_path` onto `base` and normalizes `.`/`..` components.
pub fn scan_root(base: &Path, scan_path: &str) -> PathBuf {
    PathBuf::from(clean(base.join(scan_path).to_string_lossy().to_string()))
}

pub fn collect_source_files(base: &Path, scan_path: &str) -> Result<Vec<SourceFile>> {
    let root = scan_root(base, scan_path);
    debug!("Walking directory tree from root: {}", root.display());
    if !root.is_dir() {
        return Err(anyhow!("Scan path {} is not a directory", root.display()));
    }

    let walker = WalkBuilder::new(&root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|dent| {
            let skipped = dent.file_type().is_some_and(|ft| ft.is_dir())
                && dent.file_name().to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n));
            !skipped
        })
        .build();

    let prefix = scan_path.trim_start_matches("./").trim_end_matches('/');
    let mut files: Vec<SourceFile> = Vec::new();
    for res in walker {
        let Some(dent) = usable_entry(res, &root) else {
            continue;
        };
        let p = dent.path();
        if !p.is_file() {
            continue;
        }
        let Some(ext) = p.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !SOURCE_EXTENSIONS.contains(&ext) {
            trace!("Skipping non-source file: {}", p.display());
            continue;
        }

        let rel = p.strip_prefix(&root).unwrap_or(p).to_string_lossy().replace('\\', "/");
        let display =
            if prefix.is_empty() || prefix == "." { rel } else { format!("{prefix}/{rel}") };
        trace!("Found source file: {}", display);
        files.push(SourceFile { path: p.to_path_buf(), display });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Collected {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// An unreadable entry is logged and skipped so the rest of the tree is still walked.
fn usable_entry(res: Result<DirEntry, ignore::Error>, root: &Path) -> Option<DirEntry> {
    match res {
        Ok(dent) => Some(dent),
        Err(e) => {
            warn!("Skipping unreadable entry under {}: {}", root.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn displays(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.display.as_str()).collect()
    }

    #[test]
    fn test_collects_ts_and_tsx_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "app/src/a.ts", "");
        create_test_file(root, "app/src/b.tsx", "");
        create_test_file(root, "app/src/c.js", "");
        create_test_file(root, "app/src/readme.md", "");

        let files = collect_source_files(root, "app/src").unwrap();
        assert_eq!(displays(&files), vec!["app/src/a.ts", "app/src/b.tsx"]);
    }

    #[test]
    fn test_declaration_files_are_included() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/types/global.d.ts", "");

        let files = collect_source_files(root, "src").unwrap();
        assert_eq!(displays(&files), vec!["src/types/global.d.ts"]);
    }

    #[test]
    fn test_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/index.ts", "");
        create_test_file(root, "src/node_modules/dep/index.ts", "");

        let files = collect_source_files(root, "src").unwrap();
        assert_eq!(displays(&files), vec!["src/index.ts"]);
    }

    #[test]
    fn test_results_are_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/z.ts", "");
        create_test_file(root, "src/a/m.ts", "");
        create_test_file(root, "src/b.ts", "");

        let files = collect_source_files(root, "./src/").unwrap();
        assert_eq!(displays(&files), vec!["src/a/m.ts", "src/b.ts", "src/z.ts"]);
    }

    #[test]
    fn test_walk_errors_are_skipped() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(usable_entry(Err(ignore::Error::Io(denied)), Path::new("/project")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_abort() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "");
        create_test_file(root, "src/locked/b.ts", "");
        let locked = root.join("src/locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = collect_source_files(root, "src");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // running as root may still read the locked directory
        let files = result.unwrap();
        assert!(displays(&files).contains(&"src/a.ts"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_source_files(temp_dir.path(), "does/not/exist").is_err());
    }

    #[test]
    fn test_scan_root_cleans_components() {
        let root = scan_root(Path::new("/project"), "./apps/../src");
        assert_eq!(root, PathBuf::from("/project/src"));
    }
}
