use crate::page_range::PageRange;
use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub source: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", source))?;
        Ok(PdfDocument { doc, source })
    }

    /// Load a document that is already in memory, e.g. a download
    pub fn from_bytes(bytes: &[u8], source: &str) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .with_context(|| format!("Failed to parse PDF: {}", source))?;
        Ok(PdfDocument {
            doc,
            source: source.to_string(),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Copy the pages of `range` into a new document
    pub fn extract_range(&self, range: PageRange) -> Result<Document> {
        let total = self.page_count();
        if range.start == 0 || range.start > range.end || range.end > total {
            anyhow::bail!(
                "Page range {} is out of range (1-{}) in {}",
                range,
                total,
                self.source
            );
        }

        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .into_iter()
            .map(|(num, _)| num)
            .filter(|num| !range.pages().contains(num))
            .collect();

        let mut new_doc = self.doc.clone();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
            new_doc.prune_objects();
            let root = new_doc
                .catalog()
                .and_then(|catalog| catalog.get(b"Pages"))
                .and_then(Object::as_reference);
            if let Ok(root) = root {
                recount_pages(&mut new_doc, root);
            }
        }

        Ok(new_doc)
    }

    /// Serialize to an in-memory buffer
    pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("Failed to serialize PDF")?;
        Ok(buffer)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

/// Rewrite /Count on every node of the page tree after pages were removed
fn recount_pages(doc: &mut Document, node: ObjectId) -> u32 {
    let kids: Vec<ObjectId> = match doc
        .get_dictionary(node)
        .and_then(|dict| dict.get(b"Kids"))
        .and_then(Object::as_array)
    {
        Ok(kids) => kids.iter().filter_map(|kid| kid.as_reference().ok()).collect(),
        // Leaf page
        Err(_) => return 1,
    };

    let count: u32 = kids.into_iter().map(|kid| recount_pages(doc, kid)).sum();
    if let Ok(dict) = doc.get_dictionary_mut(node) {
        dict.set("Count", Object::Integer(count as i64));
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_pdf;

    #[test]
    fn test_page_count() {
        let doc = PdfDocument::from_bytes(&test_pdf(7), "test.pdf").unwrap();
        assert_eq!(doc.page_count(), 7);
        assert_eq!(doc.page_ids().len(), 7);
    }

    #[test]
    fn test_extract_middle_range() {
        let doc = PdfDocument::from_bytes(&test_pdf(10), "test.pdf").unwrap();
        let mut part = doc.extract_range(PageRange::new(3, 6)).unwrap();
        let bytes = PdfDocument::to_bytes(&mut part).unwrap();

        let reloaded = PdfDocument::from_bytes(&bytes, "part.pdf").unwrap();
        assert_eq!(reloaded.page_count(), 4);

        let root = reloaded
            .doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .unwrap();
        let count = reloaded
            .doc
            .get_dictionary(root)
            .and_then(|pages| pages.get(b"Count"))
            .and_then(Object::as_i64)
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_extract_whole_document() {
        let doc = PdfDocument::from_bytes(&test_pdf(3), "test.pdf").unwrap();
        let part = doc.extract_range(PageRange::new(1, 3)).unwrap();
        assert_eq!(part.get_pages().len(), 3);
    }

    #[test]
    fn test_extract_out_of_range() {
        let doc = PdfDocument::from_bytes(&test_pdf(3), "test.pdf").unwrap();
        assert!(doc.extract_range(PageRange::new(2, 4)).is_err());
        assert!(doc.extract_range(PageRange::new(0, 1)).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(PdfDocument::from_bytes(b"not a pdf", "junk.pdf").is_err());
    }
}
