use crate::domain::models::FileEntry;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cpp", "cs", "css", "default", "go", "h", "html", "java", "js", "jsx", "md", "php", "py",
    "rs", "toml", "ts", "tsx", "yml",
];

const DEFAULT_BASENAMES: &[&str] = &["Dockerfile"];

/// The set of file extensions and exact basenames treated as code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRegistry {
    extensions: HashSet<String>,
    basenames: HashSet<String>,
}

impl ExtensionRegistry {
    /// Extensions may be given with or without the leading dot.
    pub fn new<E, B>(extensions: E, basenames: B) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            basenames: basenames
                .into_iter()
                .map(|b| b.as_ref().to_string())
                .collect(),
        }
    }

    pub fn is_code_file(&self, path: &Path) -> bool {
        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.basenames.contains(n));

        by_name
            || path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.extensions.contains(e))
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_BASENAMES)
    }
}

/// Ordered gitignore-style patterns. Later patterns win, so `!keep.py`
/// after `*.py` re-includes `keep.py`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSpec {
    patterns: Vec<String>,
}

impl IgnoreSpec {
    pub fn new<I>(patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    fn matcher(&self, root: &Path) -> Gitignore {
        let mut builder = GitignoreBuilder::new(root);
        for line in &self.patterns {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Err(e) = builder.add_line(None, line) {
                warn!("Skipping invalid ignore pattern '{}': {}", line, e);
            }
        }
        builder.build().unwrap_or_else(|e| {
            warn!("Failed to build ignore matcher: {}", e);
            Gitignore::empty()
        })
    }
}

pub struct PathFilter {
    registry: ExtensionRegistry,
    ignore: IgnoreSpec,
    max_depth: Option<usize>,
}

impl PathFilter {
    pub fn new(registry: ExtensionRegistry, ignore: IgnoreSpec) -> Self {
        Self {
            registry,
            ignore,
            max_depth: None,
        }
    }

    /// Limits the walk to files at most `depth` levels below the root;
    /// `Some(1)` lists only the root's own files.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Every eligible file under `root`, in walk order.
    pub fn collect(&self, root: &Path) -> Vec<FileEntry> {
        info!("Listing code files in: {}", root.display());
        debug!("Ignore patterns: {:?}", self.ignore.patterns());

        let matcher = self.ignore.matcher(root);
        let mut walker = walkdir::WalkDir::new(root);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut result = Vec::new();
        let mut scanned = 0usize;

        // Ignored directories are pruned whole, so nothing below them can
        // be re-included by a later pattern.
        let walk = walker.into_iter().filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            let ignored = matcher.matched(relative, true).is_ignore();
            if ignored {
                debug!("Pruned ignored directory: {}", relative.display());
            }
            !ignored
        });

        for entry in walk.filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        }) {
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            // Symlinks count only when they resolve to a regular file.
            if entry.file_type().is_symlink() && !path.is_file() {
                continue;
            }
            scanned += 1;

            if !self.registry.is_code_file(path) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if matcher.matched_path_or_any_parents(relative, false).is_ignore() {
                debug!("Ignored by pattern: {}", relative.display());
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            debug!("Found matching file: {}", path.display());
            result.push(FileEntry::new(path.to_path_buf(), root, size, false));
        }

        info!("Found {} code files ({} scanned)", result.len(), scanned);
        result
    }
}
