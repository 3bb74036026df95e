use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "codellama:7b-instruct-q4_K_M";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_CHUNK_THRESHOLD: usize = 4000;
pub const DEFAULT_CHUNK_SIZE: usize = 3000;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(500);

/// A filesystem entry discovered under a declared root.
///
/// Content is never cached here; callers read it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub size: u64,
    pub is_dir: bool,
}

impl FileEntry {
    pub fn new(path: PathBuf, root: &Path, size: u64, is_dir: bool) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        Self {
            path,
            relative,
            size,
            is_dir,
        }
    }

    /// Key used for this file in a [`SummaryReport`].
    pub fn identity(&self) -> String {
        if self.relative.as_os_str().is_empty() {
            self.path.to_string_lossy().to_string()
        } else {
            self.relative.to_string_lossy().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(name: String, size: u64) -> Self {
        Self {
            name,
            kind: NodeKind::File,
            size,
            children: Vec::new(),
        }
    }

    // Directories never carry a size of their own.
    pub fn directory(name: String, children: Vec<TreeNode>) -> Self {
        Self {
            name,
            kind: NodeKind::Directory,
            size: 0,
            children,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// A contiguous slice of some content. `offset` is the byte position of
/// `text` inside the original string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub offset: usize,
    pub text: &'a str,
}

/// Tunables for the direct-vs-chunked decision and backend pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub threshold_chars: usize,
    pub chunk_chars: usize,
    pub delay: Duration,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            threshold_chars: DEFAULT_CHUNK_THRESHOLD,
            chunk_chars: DEFAULT_CHUNK_SIZE,
            delay: DEFAULT_CHUNK_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Success(String),
    Failure(String),
}

impl SummaryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SummaryOutcome::Failure(_))
    }

    pub fn text(&self) -> String {
        match self {
            SummaryOutcome::Success(summary) => summary.clone(),
            SummaryOutcome::Failure(error) => format!("Error: {}", error),
        }
    }
}

/// Per-file results of a batch, one entry per attempted file, kept in the
/// order the files were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    entries: Vec<(String, SummaryOutcome)>,
}

impl SummaryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: String, outcome: SummaryOutcome) {
        match self.entries.iter_mut().find(|(key, _)| *key == identity) {
            Some((_, existing)) => *existing = outcome,
            None => self.entries.push((identity, outcome)),
        }
    }

    pub fn get(&self, identity: &str) -> Option<&SummaryOutcome> {
        self.entries
            .iter()
            .find(|(key, _)| key == identity)
            .map(|(_, outcome)| outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryOutcome)> {
        self.entries
            .iter()
            .map(|(key, outcome)| (key.as_str(), outcome))
    }
}

#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    pub root_path: String,
    pub model: String,
    pub host: String,
    pub output_path: Option<String>,
    pub recursive: bool,
    pub ignore_patterns: Vec<String>,
    pub use_gitignore: bool,
    pub warm_up: bool,
    pub num_gpu: Option<u32>,
    pub num_thread: Option<u32>,
    pub policy: ChunkPolicy,
}

#[derive(Debug, Clone)]
pub struct StageConfig {
    pub root_path: String,
    pub output_dir: String,
    pub ignore_patterns: Vec<String>,
    pub use_gitignore: bool,
    pub with_tree: bool,
    pub relative_layout: bool,
}
