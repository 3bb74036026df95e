use crate::domain::models::TreeNode;
use log::{debug, warn};
use std::fs;
use std::path::Path;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.1} {}", size, SIZE_UNITS[unit])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub total_items: usize,
    pub directories: usize,
    pub files: usize,
}

impl TreeStats {
    pub fn from_nodes(nodes: &[TreeNode]) -> Self {
        let mut stats = TreeStats::default();
        for node in nodes {
            stats.total_items += 1;
            if node.is_dir() {
                stats.directories += 1;
                let nested = TreeStats::from_nodes(&node.children);
                stats.total_items += nested.total_items;
                stats.directories += nested.directories;
                stats.files += nested.files;
            } else {
                stats.files += 1;
            }
        }
        stats
    }
}

/// Scans `root` into sorted nodes. Root children sit at depth 0 and nothing
/// at depth >= `max_depth` is read. Unreadable directories come back empty.
pub fn scan_tree(root: &Path, show_hidden: bool, max_depth: Option<usize>) -> Vec<TreeNode> {
    scan_dir(root, show_hidden, max_depth, 0)
}

fn scan_dir(
    path: &Path,
    show_hidden: bool,
    max_depth: Option<usize>,
    depth: usize,
) -> Vec<TreeNode> {
    if max_depth.is_some_and(|max| depth >= max) {
        return Vec::new();
    }

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Pruning unreadable directory {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut nodes = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && name.starts_with('.') {
            continue;
        }

        let item = entry.path();
        let metadata = match fs::metadata(&item) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {}: {}", item.display(), e);
                continue;
            }
        };

        if metadata.is_dir() {
            let children = scan_dir(&item, show_hidden, max_depth, depth + 1);
            nodes.push(TreeNode::directory(name, children));
        } else {
            nodes.push(TreeNode::file(name, metadata.len()));
        }
    }

    nodes.sort_by_key(|node| (!node.is_dir(), node.name.to_lowercase()));
    nodes
}

fn render_nodes(nodes: &[TreeNode], ancestors_last: &mut Vec<bool>, lines: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;

        let mut line: String = ancestors_last
            .iter()
            .map(|&last| if last { "    " } else { "│   " })
            .collect();
        line.push_str(if is_last { "└── " } else { "├── " });

        if node.is_dir() {
            line.push_str(&format!("{}/", node.name));
            lines.push(line);
            ancestors_last.push(is_last);
            render_nodes(&node.children, ancestors_last, lines);
            ancestors_last.pop();
        } else {
            line.push_str(&format!("{} [{}]", node.name, format_size(node.size)));
            lines.push(line);
        }
    }
}

/// Renders `root` as a box-drawing tree with a count header. Problems with
/// the root itself come back as a one-line `Error: ...` string.
pub fn render(root: &Path, show_hidden: bool, max_depth: Option<usize>) -> String {
    if !root.exists() {
        return format!("Error: Path '{}' does not exist.", root.display());
    }
    if !root.is_dir() {
        return format!("Error: Path '{}' is not a directory.", root.display());
    }

    let resolved = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let root_name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| resolved.display().to_string());

    let nodes = scan_tree(&resolved, show_hidden, max_depth);
    if nodes.is_empty() {
        return format!("{}/\n└── (empty directory)", root_name);
    }

    let stats = TreeStats::from_nodes(&nodes);
    debug!(
        "Rendering tree for {}: {} items ({} dirs, {} files)",
        resolved.display(),
        stats.total_items,
        stats.directories,
        stats.files
    );

    let mut lines = vec![
        format!("{}/", root_name),
        format!("├── Total items: {}", stats.total_items),
        format!("├── Directories: {}", stats.directories),
        format!("└── Files: {}", stats.files),
        String::new(),
    ];
    render_nodes(&nodes, &mut Vec::new(), &mut lines);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NodeKind;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/util")).unwrap();
        fs::write(root.join("src/main.rs"), "0123456789").unwrap();
        fs::write(root.join("src/util/a.rs"), "").unwrap();
        fs::write(root.join("README.md"), vec![b'x'; 1536]).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        fs::write(root.join(".env"), "KEY=1").unwrap();
        temp_dir
    }

    fn tree_lines(rendered: &str) -> Vec<&str> {
        rendered.lines().skip(5).collect()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024u64.pow(3)), "3.0 GB");
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048.0 TB");
    }

    #[test]
    fn test_render_example_project() {
        let temp_dir = TempDir::new().unwrap();
        let proj = temp_dir.path().join("proj");
        fs::create_dir_all(proj.join("docs")).unwrap();
        fs::write(proj.join("x.txt"), vec![b'a'; 2048]).unwrap();

        let rendered = render(&proj, false, None);

        assert_eq!(
            rendered,
            "proj/\n\
             ├── Total items: 2\n\
             ├── Directories: 1\n\
             └── Files: 1\n\
             \n\
             ├── docs/\n\
             └── x.txt [2.0 KB]"
        );
    }

    #[test]
    fn test_render_nested_connectors() {
        let temp_dir = project();
        let rendered = render(temp_dir.path(), false, None);

        assert_eq!(
            tree_lines(&rendered),
            vec![
                "├── src/",
                "│   ├── util/",
                "│   │   └── a.rs [0 B]",
                "│   └── main.rs [10 B]",
                "└── README.md [1.5 KB]",
            ]
        );
        assert!(rendered.contains("├── Total items: 5"));
        assert!(rendered.contains("├── Directories: 2"));
        assert!(rendered.contains("└── Files: 3"));
    }

    #[test]
    fn test_hidden_entries_shown_on_request() {
        let temp_dir = project();
        let rendered = render(temp_dir.path(), true, None);
        let lines = tree_lines(&rendered);

        assert_eq!(lines[0], "├── .git/");
        assert_eq!(lines[1], "│   └── HEAD [3 B]");
        assert!(lines.contains(&"├── .env [5 B]"));
        assert!(rendered.contains("├── Total items: 8"));
    }

    #[test]
    fn test_depth_cutoff_hides_and_uncounts_deeper_entries() {
        let temp_dir = project();

        let rendered = render(temp_dir.path(), false, Some(1));
        assert_eq!(tree_lines(&rendered), vec!["├── src/", "└── README.md [1.5 KB]"]);
        assert!(rendered.contains("├── Total items: 2"));
        assert!(rendered.contains("├── Directories: 1"));
        assert!(rendered.contains("└── Files: 1"));

        let nodes = scan_tree(temp_dir.path(), false, Some(2));
        let src = &nodes[0];
        assert_eq!(src.children.len(), 2);
        assert!(src.children[0].is_dir());
        assert!(src.children[0].children.is_empty());
    }

    #[test]
    fn test_zero_depth_renders_empty_marker() {
        let temp_dir = project();
        let rendered = render(temp_dir.path(), false, Some(0));
        assert!(rendered.ends_with("/\n└── (empty directory)"));
    }

    #[test]
    fn test_stats_match_listed_lines() {
        let temp_dir = project();
        let nodes = scan_tree(temp_dir.path(), true, None);
        let stats = TreeStats::from_nodes(&nodes);

        fn walk(nodes: &[TreeNode], dirs: &mut usize, files: &mut usize) {
            for node in nodes {
                match node.kind {
                    NodeKind::Directory => {
                        assert_eq!(node.size, 0);
                        *dirs += 1;
                        walk(&node.children, dirs, files);
                    }
                    NodeKind::File => *files += 1,
                }
            }
        }
        let (mut dirs, mut files) = (0, 0);
        walk(&nodes, &mut dirs, &mut files);

        assert_eq!(stats.directories, dirs);
        assert_eq!(stats.files, files);
        assert_eq!(stats.total_items, dirs + files);

        let rendered = render(temp_dir.path(), true, None);
        assert_eq!(tree_lines(&rendered).len(), stats.total_items);
    }

    #[test]
    fn test_sort_directories_first_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.rs"), "b").unwrap();
        fs::write(root.join("A.rs"), "a").unwrap();
        fs::create_dir(root.join("zeta")).unwrap();
        fs::create_dir(root.join("Alpha")).unwrap();

        let names: Vec<String> = scan_tree(root, false, None)
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "zeta", "A.rs", "b.rs"]);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let empty = temp_dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        fs::write(empty.join(".hidden"), "x").unwrap();

        assert_eq!(render(&empty, false, None), "empty/\n└── (empty directory)");
    }

    #[test]
    fn test_unreadable_directory_scans_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.rs");
        fs::write(&file, "x").unwrap();
        let removed = temp_dir.path().join("removed");
        fs::create_dir(&removed).unwrap();
        fs::remove_dir(&removed).unwrap();

        assert!(scan_tree(&file, true, None).is_empty());
        assert!(scan_tree(&removed, true, None).is_empty());
    }

    #[test]
    fn test_bad_roots_return_error_lines() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let file = temp_dir.path().join("file.rs");
        fs::write(&file, "x").unwrap();

        assert_eq!(
            render(&missing, false, None),
            format!("Error: Path '{}' does not exist.", missing.display())
        );
        assert_eq!(
            render(&file, false, None),
            format!("Error: Path '{}' is not a directory.", file.display())
        );
    }
}
