//! Filesystem discovery: qualifying images, directories to visit, PDFs to merge

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use crate::config::WalkStrategy;
use crate::error::{Error, Result};

/// Extensions (lowercase) accepted as photographs
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// True if `path` has a `.jpg`/`.jpeg` extension in any case
pub fn is_qualifying_image(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Qualifying images directly inside `folder`, sorted by file name
pub fn list_images(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_qualifying_image(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Immediate subdirectories of `folder`, sorted by name
pub fn list_subdirectories(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn require_dir(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(Error::FileNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Number of directories below `root`, not counting `root` itself
pub fn count_directories(root: &Path) -> Result<usize> {
    require_dir(root)?;
    let mut count = 0;
    for entry in WalkDir::new(root).min_depth(1) {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => count += 1,
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    Ok(count)
}

/// Directories the walker visits, in visit order.
///
/// `Nested` visits each child of `root` after its own children, and goes no
/// deeper. `Recursive` visits every directory below `root`, parents first,
/// siblings in name order.
pub fn folders_to_visit(root: &Path, strategy: WalkStrategy) -> Result<Vec<PathBuf>> {
    require_dir(root)?;
    let mut folders = Vec::new();

    match strategy {
        WalkStrategy::Nested => {
            for child in list_subdirectories(root)? {
                folders.extend(list_subdirectories(&child)?);
                folders.push(child);
            }
        }
        WalkStrategy::Recursive => {
            for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => folders.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry: {}", e),
                }
            }
        }
    }

    Ok(folders)
}

/// True if the file name starts with the master-PDF prefix
pub fn is_master_file(path: &Path, master_prefix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(master_prefix))
        .unwrap_or(false)
}

/// Every `.pdf` below `root` that is not a master file, sorted by full path
pub fn collect_pdfs(root: &Path, master_prefix: &str) -> Result<Vec<PathBuf>> {
    require_dir(root)?;
    let mut pdfs = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file()
            && has_extension(path, &["pdf"])
            && !is_master_file(path, master_prefix)
        {
            pdfs.push(entry.into_path());
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_qualifying_extensions() {
        assert!(is_qualifying_image(Path::new("a.jpg")));
        assert!(is_qualifying_image(Path::new("a.JPEG")));
        assert!(is_qualifying_image(Path::new("dir/b.JpG")));
        assert!(!is_qualifying_image(Path::new("a.png")));
        assert!(!is_qualifying_image(Path::new("jpg")));
        assert!(!is_qualifying_image(Path::new("a.jpg.txt")));
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.jpg", "a.jpeg", "c.JPG", "notes.txt", "d.png"] {
            touch(&dir.path().join(name));
        }
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.jpeg", "b.jpg", "c.JPG"]);
    }

    #[test]
    fn test_count_directories_excludes_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(dir.path().join("d")).unwrap();
        touch(&dir.path().join("a/file.jpg"));

        assert_eq!(count_directories(dir.path()).unwrap(), 4);
    }

    #[test]
    fn test_nested_visits_two_levels_children_first() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("B/y")).unwrap();
        fs::create_dir_all(root.join("A/x/deep")).unwrap();
        fs::create_dir_all(root.join("A/w")).unwrap();

        let visited = folders_to_visit(root, WalkStrategy::Nested).unwrap();
        let expected: Vec<PathBuf> = ["A/w", "A/x", "A", "B/y", "B"]
            .iter()
            .map(|p| root.join(p))
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_recursive_visits_everything_in_name_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("B/y")).unwrap();
        fs::create_dir_all(root.join("A/x/deep")).unwrap();

        let visited = folders_to_visit(root, WalkStrategy::Recursive).unwrap();
        let expected: Vec<PathBuf> = ["A", "A/x", "A/x/deep", "B", "B/y"]
            .iter()
            .map(|p| root.join(p))
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_collect_pdfs_skips_master_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("b/b.pdf"));
        touch(&root.join("a/a.PDF"));
        touch(&root.join("TNCG Photos Master PDF.pdf"));
        touch(&root.join("a/TNCG old.pdf"));
        touch(&root.join("a/photo.jpg"));

        let pdfs = collect_pdfs(root, "TNCG").unwrap();
        assert_eq!(pdfs, vec![root.join("a/a.PDF"), root.join("b/b.pdf")]);
    }

    #[test]
    fn test_missing_root() {
        let result = folders_to_visit(Path::new("no/such/root"), WalkStrategy::Recursive);
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
