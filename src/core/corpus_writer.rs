use crate::core::path_filter::PathFilter;
use crate::core::tree_renderer;
use crate::infra::file_system::{read_file_lossy, reset_dir, resolve_path};
use anyhow::{Context, bail};
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How staged files are named inside the staging directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagingLayout {
    /// Base filename only. Same-named files from different directories
    /// overwrite each other; the last one walked wins.
    #[default]
    Flat,
    /// Mirrors each file's path relative to the root.
    Relative,
}

pub struct CorpusWriter {
    filter: PathFilter,
    layout: StagingLayout,
}

impl CorpusWriter {
    pub fn new(filter: PathFilter, layout: StagingLayout) -> Self {
        Self { filter, layout }
    }

    /// Resets `staging`, then copies every eligible file under `root` into
    /// it. With `with_tree`, each copy is prefixed by its path and the tree
    /// of `root` as it looks after the reset. Returns the staged paths in
    /// write order.
    pub fn write(
        &self,
        root: &Path,
        staging: &Path,
        with_tree: bool,
    ) -> anyhow::Result<Vec<PathBuf>> {
        self.write_with(root, staging, with_tree, read_file_lossy)
    }

    /// [`CorpusWriter::write`] with a custom reader. A file the reader
    /// fails on is logged and staged empty.
    pub fn write_with<F>(
        &self,
        root: &Path,
        staging: &Path,
        with_tree: bool,
        read: F,
    ) -> anyhow::Result<Vec<PathBuf>>
    where
        F: Fn(&Path) -> anyhow::Result<String>,
    {
        let root = fs::canonicalize(root)
            .with_context(|| format!("Path {} does not exist", root.display()))?;
        let resolved = resolve_path(staging)?;
        // Resetting the root or one of its ancestors would delete the sources.
        if root.starts_with(&resolved) {
            bail!(
                "Staging directory {} contains the source root {}",
                staging.display(),
                root.display()
            );
        }
        reset_dir(staging)?;

        let tree = with_tree.then(|| tree_renderer::render(&root, false, None));
        let files = self.filter.collect(&root);
        let mut written = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();

        for file in &files {
            let target = match self.layout {
                StagingLayout::Flat => match file.path.file_name() {
                    Some(name) => staging.join(name),
                    None => continue,
                },
                StagingLayout::Relative => staging.join(&file.relative),
            };

            if !seen.insert(target.clone()) {
                warn!(
                    "{} overwrites an earlier file staged as {}",
                    file.path.display(),
                    target.display()
                );
            }

            let content = read(&file.path).unwrap_or_else(|e| {
                error!("Error reading {}: {:#}", file.path.display(), e);
                String::new()
            });
            let staged = match &tree {
                Some(tree) => with_tree_context(&file.path, tree, &content),
                None => content,
            };

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, staged)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!("Wrote file {}", target.display());
            written.push(target);
        }

        info!("Staged {} files into {}", files.len(), staging.display());
        Ok(written)
    }
}

/// Prefixes `content` with the file's path and the tree text, then a blank
/// line.
pub fn with_tree_context(path: &Path, tree: &str, content: &str) -> String {
    format!("{}\n{}\n\n{}", path.display(), tree, content)
}
