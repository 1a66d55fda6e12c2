use crate::page_range::plan_ranges;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Split a PDF on disk into `output_dir`, returning the written paths
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    start_pages: &str,
    output_dir: Q,
    prefix: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let doc = PdfDocument::open(input)?;
    let ranges = plan_ranges(start_pages, doc.page_count());

    let prefix = prefix
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "file".to_string());

    let mut written = Vec::with_capacity(ranges.len());
    for range in ranges {
        let output_path = output_dir.join(range.file_name(&prefix));

        let mut new_doc = doc.extract_range(range)?;
        PdfDocument::save(&mut new_doc, &output_path)?;
        info!("Wrote {} ({} pages)", output_path.display(), range.len());

        written.push(output_path);
    }

    Ok(written)
}
