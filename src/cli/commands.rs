use crate::core::batch_driver::{BatchDriver, format_report};
use crate::core::corpus_writer::{CorpusWriter, StagingLayout};
use crate::core::path_filter::{ExtensionRegistry, IgnoreSpec, PathFilter};
use crate::core::summary_engine::FileSummarizer;
use crate::core::tree_renderer;
use crate::domain::models::{
    ChunkPolicy, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_THRESHOLD, DEFAULT_MODEL, DEFAULT_OLLAMA_HOST,
    StageConfig, SummarizeConfig,
};
use crate::infra::file_system::{load_gitignore, read_file_lossy};
use crate::infra::logger::{print_welcome_message, setup_logger};
use crate::infra::output::{print_status, write_output};
use crate::infra::summarizer::OllamaSummarizer;
use clap::{Parser, Subcommand};
use crossterm::style::Color;
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "code-summarizer")]
#[command(about = "Summarize source files with a local LLM", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a single file or every code file in a directory
    Summarize {
        path: String,

        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long)]
        recursive: bool,

        #[arg(long, default_value = DEFAULT_OLLAMA_HOST)]
        host: String,

        #[arg(long, default_value_t = DEFAULT_CHUNK_THRESHOLD)]
        threshold: usize,

        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[arg(long, default_value_t = 500)]
        delay_ms: u64,

        #[arg(long, default_value = ".git")]
        ignore: String,

        #[arg(long)]
        gitignore: bool,

        #[arg(long)]
        no_warm_up: bool,

        #[arg(long)]
        num_gpu: Option<u32>,

        #[arg(long)]
        num_thread: Option<u32>,
    },
    /// Print the directory tree with sizes
    Tree {
        path: String,

        #[arg(short, long)]
        all: bool,

        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },
    /// Copy code files into a staging directory
    Stage {
        path: String,

        #[arg(long)]
        out: String,

        #[arg(long, default_value = ".git")]
        ignore: String,

        #[arg(long)]
        gitignore: bool,

        #[arg(long)]
        with_tree: bool,

        #[arg(long)]
        relative: bool,
    },
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    match cli.command {
        Commands::Summarize {
            path,
            model,
            output,
            recursive,
            host,
            threshold,
            chunk_size,
            delay_ms,
            ignore,
            gitignore,
            no_warm_up,
            num_gpu,
            num_thread,
        } => {
            info!("Starting summarize command");
            debug!(
                "Command parameters: path={}, model={}, output={:?}, recursive={}, host={}",
                path, model, output, recursive, host
            );

            let config = SummarizeConfig {
                root_path: path,
                model,
                host,
                output_path: output,
                recursive,
                ignore_patterns: split_patterns(&ignore),
                use_gitignore: gitignore,
                warm_up: !no_warm_up,
                num_gpu,
                num_thread,
                policy: ChunkPolicy {
                    threshold_chars: threshold,
                    chunk_chars: chunk_size,
                    delay: Duration::from_millis(delay_ms),
                },
            };
            summarize(&config)
        }
        Commands::Tree {
            path,
            all,
            max_depth,
        } => {
            println!("{}", tree_renderer::render(Path::new(&path), all, max_depth));
            Ok(())
        }
        Commands::Stage {
            path,
            out,
            ignore,
            gitignore,
            with_tree,
            relative,
        } => {
            let config = StageConfig {
                root_path: path,
                output_dir: out,
                ignore_patterns: split_patterns(&ignore),
                use_gitignore: gitignore,
                with_tree,
                relative_layout: relative,
            };
            stage(&config)
        }
    }
}

fn ignore_spec(
    root: &Path,
    patterns: &[String],
    use_gitignore: bool,
) -> anyhow::Result<IgnoreSpec> {
    let mut all = patterns.to_vec();
    if use_gitignore {
        all.extend(load_gitignore(root)?);
    }
    Ok(IgnoreSpec::new(all))
}

fn summarize(config: &SummarizeConfig) -> anyhow::Result<()> {
    let root = Path::new(&config.root_path);
    if !root.exists() {
        print_status(Color::Red, &format!("❌ Path {} does not exist", root.display()))?;
        return Ok(());
    }

    print_welcome_message(&config.model)?;
    let backend = OllamaSummarizer::new(&config.host)?;
    if config.warm_up {
        backend.warm_up(&config.model)?;
    }
    let engine = FileSummarizer::new(backend, config.model.clone(), config.policy)
        .with_hardware(config.num_gpu, config.num_thread);

    if root.is_file() {
        info!("Processing file: {}", root.display());
        let content = read_file_lossy(root)?;
        let summary = engine.summarize(&content, &config.root_path)?;

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| config.root_path.clone());
        let body = match config.output_path {
            Some(_) => format!("# Summary of {}\n\n{}", config.root_path, summary),
            None => summary,
        };
        return write_output(&body, config.output_path.clone(), &format!("SUMMARY: {}", name));
    }

    let ignore = ignore_spec(root, &config.ignore_patterns, config.use_gitignore)?;
    let depth = if config.recursive { None } else { Some(1) };
    let files = PathFilter::new(ExtensionRegistry::default(), ignore)
        .with_max_depth(depth)
        .collect(root);

    if files.is_empty() {
        print_status(Color::Red, "❌ No code files found")?;
        return Ok(());
    }
    print_status(Color::Cyan, &format!("🔍 Found {} code files", files.len()))?;

    let driver = BatchDriver::new(engine);
    let report = driver.run(&files, read_file_lossy);

    info!("Writing output");
    write_output(
        &format_report(&report),
        config.output_path.clone(),
        "PROJECT SUMMARY",
    )
}

fn stage(config: &StageConfig) -> anyhow::Result<()> {
    let root = Path::new(&config.root_path);
    if !root.is_dir() {
        print_status(Color::Red, &format!("❌ Path {} is not a directory", root.display()))?;
        return Ok(());
    }

    let ignore = ignore_spec(root, &config.ignore_patterns, config.use_gitignore)?;
    let layout = if config.relative_layout {
        StagingLayout::Relative
    } else {
        StagingLayout::Flat
    };
    let writer = CorpusWriter::new(PathFilter::new(ExtensionRegistry::default(), ignore), layout);
    let written = writer.write(root, Path::new(&config.output_dir), config.with_tree)?;

    print_status(
        Color::Green,
        &format!("✓ Staged {} files into {}", written.len(), config.output_dir),
    )?;
    Ok(())
}
