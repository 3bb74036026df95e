//! Fixed-width splitting of oversized content and the prompts that frame
//! each piece for the backend.
//!
//! Splitting is by character count only. It does not look for line, token
//! or syntax boundaries, so a chunk may end mid-identifier.

use crate::domain::models::Chunk;

pub fn needs_chunking(content: &str, threshold_chars: usize) -> bool {
    content.chars().count() > threshold_chars
}

/// Slices `content` into pieces of `width_chars` characters (the last one
/// may be shorter). A width of 0 is treated as 1.
pub fn chunk(content: &str, width_chars: usize) -> Vec<Chunk<'_>> {
    let width = width_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in content.char_indices() {
        if count == width {
            chunks.push(Chunk {
                index: chunks.len(),
                offset: start,
                text: &content[start..offset],
            });
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < content.len() {
        chunks.push(Chunk {
            index: chunks.len(),
            offset: start,
            text: &content[start..],
        });
    }

    chunks
}

pub fn direct_request(content: &str, label: &str) -> String {
    format!(
        "Analyze this code and provide a comprehensive summary:\n\
         \n\
         File: {label}\n\
         Code:\n\
         {content}\n\
         \n\
         Provide:\n\
         1. **Purpose**: Main functionality\n\
         2. **Key Components**: Important classes/functions\n\
         3. **Technologies**: Languages and frameworks used\n\
         4. **Architecture**: Design patterns\n\
         5. **Dependencies**: Required libraries\n\
         \n\
         Keep it concise but thorough."
    )
}

pub fn chunk_request(chunk: &Chunk<'_>, total: usize, label: &str) -> String {
    format!(
        "Summarize this code section ({} of {}) from {}:\n\n{}",
        chunk.index + 1,
        total,
        label,
        chunk.text
    )
}

/// Builds the final request that folds every chunk summary into one.
pub fn merge_request<S: AsRef<str>>(summaries: &[S], label: &str) -> String {
    let sections: Vec<String> = summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("Section {}: {}", i + 1, summary.as_ref()))
        .collect();

    format!(
        "Create a comprehensive summary from these sections of {}:\n\n{}",
        label,
        sections.join("\n\n")
    )
}
