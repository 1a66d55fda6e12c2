use crate::config::SplitConfig;
use crate::drive::DocumentStore;
use crate::page_range::{plan_ranges, PageRange};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// One part of the source document and where it ended up
#[derive(Debug, Clone, Serialize)]
pub struct UploadedPart {
    pub range: PageRange,
    pub name: String,
    /// Drive ID of the new file; `None` on a dry run
    pub id: Option<String>,
}

pub async fn run<S: DocumentStore>(store: &S, config: &SplitConfig) -> Result<Vec<UploadedPart>> {
    let source = store
        .file(&config.file_id)
        .await
        .with_context(|| format!("Failed to look up file {}", config.file_id))?;
    info!("Downloading {} ({})", source.name, source.id);

    let bytes = store
        .download(&config.file_id)
        .await
        .with_context(|| format!("Failed to download {}", source.name))?;
    let doc = PdfDocument::from_bytes(&bytes, &source.name)?;
    let total_pages = doc.page_count();

    let ranges = plan_ranges(&config.start_pages, total_pages);
    let prefix = config
        .name_prefix
        .clone()
        .unwrap_or_else(|| name_prefix(&source.name));
    info!(
        "{} has {} pages, splitting into {} part(s)",
        source.name,
        total_pages,
        ranges.len()
    );

    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let name = range.file_name(&prefix);

        if config.dry_run {
            info!("Would upload {} ({} pages)", name, range.len());
            parts.push(UploadedPart {
                range,
                name,
                id: None,
            });
            continue;
        }

        let mut part = doc.extract_range(range)?;
        let part_bytes = PdfDocument::to_bytes(&mut part)?;
        let uploaded = store
            .upload(&name, &config.output_folder_id, part_bytes)
            .await
            .with_context(|| format!("Failed to upload {}", name))?;
        info!("Uploaded: {} ({})", name, uploaded.id);

        parts.push(UploadedPart {
            range,
            name,
            id: Some(uploaded.id),
        });
    }

    Ok(parts)
}

/// Drive file name without its ".pdf" extension
pub fn name_prefix(file_name: &str) -> String {
    let name = file_name.trim();
    let stem = match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".pdf") => {
            &name[..cut]
        }
        _ => name,
    };

    if stem.is_empty() {
        "file".to_string()
    } else {
        stem.to_string()
    }
}
