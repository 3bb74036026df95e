use crate::core::summary_engine::FileSummarizer;
use crate::domain::models::{FileEntry, SummaryOutcome, SummaryReport};
use crate::infra::summarizer::Summarizer;
use log::{debug, error, info};
use std::path::Path;

pub const REPORT_RULE: &str = "---";

pub struct BatchDriver<S> {
    engine: FileSummarizer<S>,
}

impl<S: Summarizer> BatchDriver<S> {
    pub fn new(engine: FileSummarizer<S>) -> Self {
        Self { engine }
    }

    /// Summarizes `files` one at a time. A read or backend failure is
    /// recorded against that file and the batch moves on; files with only
    /// whitespace get no entry at all.
    pub fn run<F>(&self, files: &[FileEntry], read: F) -> SummaryReport
    where
        F: Fn(&Path) -> anyhow::Result<String>,
    {
        let mut report = SummaryReport::new();

        for (i, file) in files.iter().enumerate() {
            let identity = file.identity();
            info!("Processing {}/{}: {}", i + 1, files.len(), identity);

            let content = match read(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    error!("Error processing {}: {:#}", identity, e);
                    report.insert(identity, SummaryOutcome::Failure(format!("{:#}", e)));
                    continue;
                }
            };

            if content.trim().is_empty() {
                debug!("Skipping {}: no content", identity);
                continue;
            }

            let outcome = match self.engine.summarize(&content, &identity) {
                Ok(summary) => SummaryOutcome::Success(summary),
                Err(e) => {
                    error!("Error processing {}: {}", identity, e);
                    SummaryOutcome::Failure(e.to_string())
                }
            };
            report.insert(identity, outcome);
        }

        info!(
            "Summarized {} files ({} failed)",
            report.len(),
            report.failure_count()
        );
        report
    }
}

/// Plain-text report: one `# <file>` section per entry, separated by a
/// `---` line.
pub fn format_report(report: &SummaryReport) -> String {
    let sections: Vec<String> = report
        .iter()
        .map(|(identity, outcome)| format!("# {}\n\n{}\n", identity, outcome.text()))
        .collect();
    sections.join(&format!("\n{}\n\n", REPORT_RULE))
}
