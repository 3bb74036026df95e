use anyhow::Context;
use log::{debug, info};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Decodes UTF-8, dropping any byte sequence that is not valid.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        decoded.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            debug!("Dropping {} undecodable bytes", chunk.invalid().len());
        }
    }
    decoded
}

pub fn read_file_lossy(path: &Path) -> anyhow::Result<String> {
    debug!("Reading file contents: {}", path.display());
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!("Read {} bytes from file", bytes.len());
    Ok(decode_lossy(&bytes))
}

/// Reads `<root>/.gitignore` into an ordered pattern list. Order matters:
/// a later `!pattern` re-includes what an earlier one excluded.
pub fn load_gitignore(root: &Path) -> anyhow::Result<Vec<String>> {
    let gitignore_path = root.join(".gitignore");
    let mut patterns = Vec::new();

    if !gitignore_path.is_file() {
        debug!("No .gitignore file found at: {}", gitignore_path.display());
        return Ok(patterns);
    }

    debug!("Parsing .gitignore file at: {}", gitignore_path.display());
    let file = fs::File::open(&gitignore_path)?;
    let reader = std::io::BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            patterns.push(trimmed.to_string());
        }
    }

    info!("Loaded {} patterns from .gitignore", patterns.len());
    Ok(patterns)
}

/// Absolute, symlink-free form of `path`, which need not exist yet. The
/// nearest existing ancestor is canonicalized and the missing tail is
/// appended as given.
pub fn resolve_path(path: &Path) -> anyhow::Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = fs::canonicalize(existing)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    resolved.extend(tail.iter().rev());
    Ok(resolved)
}

/// Removes `dir` with everything in it, then recreates it empty.
pub fn reset_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear {}", dir.display()))?;
        info!("Cleared contents of {}", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    info!("Created directory {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_lossy() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "Test content").unwrap();
        }

        assert_eq!(read_file_lossy(&file_path).unwrap(), "Test content\n");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nonexistent.txt");

        let err = read_file_lossy(&file_path).unwrap_err();
        assert!(format!("{:#}", err).contains("nonexistent.txt"));
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let bytes = b"fn main() {\xff\xfe}\n\xe2\x82";
        assert_eq!(decode_lossy(bytes), "fn main() {}\n");
        assert_eq!(decode_lossy("héllo ├──".as_bytes()), "héllo ├──");
    }

    #[test]
    fn test_read_file_lossy_tolerates_bad_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("latin1.py");
        fs::write(&file_path, b"print('caf\xe9')").unwrap();

        assert_eq!(read_file_lossy(&file_path).unwrap(), "print('caf')");
    }

    #[test]
    fn test_load_gitignore_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let gitignore_path = temp_dir.path().join(".gitignore");

        {
            let mut file = File::create(&gitignore_path).unwrap();
            writeln!(file, "# Comment line").unwrap();
            writeln!(file, "*.log").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "  build/  ").unwrap();
            writeln!(file, "!important.log").unwrap();
        }

        let patterns = load_gitignore(temp_dir.path()).unwrap();
        assert_eq!(patterns, vec!["*.log", "build/", "!important.log"]);
    }

    #[test]
    fn test_load_gitignore_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_gitignore(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_reset_dir_empties_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("staging");
        fs::create_dir_all(staging.join("nested")).unwrap();
        fs::write(staging.join("old.py"), "stale").unwrap();

        reset_dir(&staging).unwrap();

        assert!(staging.is_dir());
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_path_keeps_missing_tail() {
        let temp_dir = TempDir::new().unwrap();
        let base = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir(base.join("ws")).unwrap();

        let existing = resolve_path(&temp_dir.path().join("ws/./")).unwrap();
        assert_eq!(existing, base.join("ws"));

        let missing = resolve_path(&temp_dir.path().join("ws/out/staging")).unwrap();
        assert_eq!(missing, base.join("ws/out/staging"));
    }
}
