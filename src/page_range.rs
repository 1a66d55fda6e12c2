use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use tracing::debug;

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|\s]+").expect("valid delimiter pattern"));
static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]+").expect("valid non-digit pattern"));

/// An inclusive, 1-indexed span of pages that becomes one output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        PageRange { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Ranges built by `build_ranges` always hold at least one page
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Name of the uploaded sub-document, e.g. "report_5-9.pdf"
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}_{}.pdf", prefix, self)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Parse a loose start-page list like "1, 5 10|15" or "[1,5,10]".
///
/// Anything that is not a plain positive integer is dropped. The result is
/// sorted and free of duplicates.
pub fn parse_start_pages(raw: &str) -> Vec<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let tokens: Vec<String> = if raw.starts_with('[') {
        match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
            Ok(values) => values.iter().map(json_token).collect(),
            Err(e) => {
                debug!("start pages are not a JSON array ({}), splitting on non-digits", e);
                NON_DIGITS.split(raw).map(str::to_string).collect()
            }
        }
    } else {
        DELIMITERS.split(raw).map(str::to_string).collect()
    };

    let mut pages = BTreeSet::new();
    for token in tokens.iter().filter(|t| !t.is_empty()) {
        match parse_page_number(token) {
            Some(page) => {
                pages.insert(page);
            }
            None => debug!("ignoring start page token {:?}", token),
        }
    }

    pages.into_iter().collect()
}

fn json_token(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn parse_page_number(token: &str) -> Option<u32> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok().filter(|&page| page > 0)
}

/// Turn start pages into contiguous ranges that cover `1..=total_pages`.
///
/// Page 1 always starts the first range; start pages beyond the document are
/// ignored.
pub fn build_ranges(start_pages: &[u32], total_pages: u32) -> Vec<PageRange> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut boundaries = BTreeSet::new();
    boundaries.insert(1);
    for &page in start_pages {
        if (1..=total_pages).contains(&page) {
            boundaries.insert(page);
        } else {
            debug!("ignoring start page {} (document has {} pages)", page, total_pages);
        }
    }

    let boundaries: Vec<u32> = boundaries.into_iter().collect();
    boundaries
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = boundaries
                .get(i + 1)
                .map_or(total_pages, |&next| next - 1);
            PageRange::new(start, end)
        })
        .filter(|range| !range.is_empty())
        .collect()
}

/// Parse `raw` and build the ranges for a document of `total_pages` pages
pub fn plan_ranges(raw: &str, total_pages: u32) -> Vec<PageRange> {
    build_ranges(&parse_start_pages(raw), total_pages)
}
