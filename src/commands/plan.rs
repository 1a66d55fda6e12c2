use crate::page_range::plan_ranges;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run(start_pages: &str, total: Option<u32>, path: Option<&Path>, json: bool) -> Result<()> {
    let total_pages = match (total, path) {
        (Some(total), _) => total,
        (None, Some(path)) => PdfDocument::open(path)?.page_count(),
        (None, None) => anyhow::bail!("Either --total or --path is required"),
    };

    let ranges = plan_ranges(start_pages, total_pages);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
        return Ok(());
    }

    for range in &ranges {
        println!("{}\t({} page(s))", range, range.len());
    }
    println!("\n{} part(s) from {} page(s).", ranges.len(), total_pages);

    Ok(())
}
