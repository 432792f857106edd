//! Document parsing boundary.
//!
//! The parsing engine itself is an external collaborator: the pipeline only
//! needs an ordered sequence of typed [`ContentElement`]s per document.
//! [`DocumentParser`] is the seam where a PDF engine plugs in;
//! [`PlainTextParser`] is the bundled implementation for paginated plain
//! text, and doubles as the reference implementation in tests.

use std::path::Path;

use tracing::debug;

use crate::document::{ContentElement, ElementKind};
use crate::error::{RagError, Result};

/// A parser that turns a document file into ordered content elements.
///
/// # Errors
///
/// Implementations return [`RagError::Input`] when the path does not exist
/// or cannot be read, and [`RagError::Parse`] on malformed input. The
/// pipeline treats a parse failure as "zero elements" for that document
/// rather than aborting a batch.
pub trait DocumentParser: Send + Sync {
    /// Parse the file at `path` into content elements, in document order.
    fn parse(&self, path: &Path) -> Result<Vec<ContentElement>>;
}

/// Parses UTF-8 plain text with form-feed page breaks.
///
/// Pages are separated by `\u{0C}`; blocks within a page are separated by
/// blank lines. A block that is a single short line without a sentence
/// terminator is classified as a [`Title`](ElementKind::Title), everything
/// else as a [`Paragraph`](ElementKind::Paragraph).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

/// Single lines up to this length without terminal punctuation read as headings.
const TITLE_MAX_CHARS: usize = 80;

impl PlainTextParser {
    /// Create a new plain text parser.
    pub fn new() -> Self {
        Self
    }

    fn classify(block: &str) -> ElementKind {
        let is_single_line = !block.contains('\n');
        let looks_like_heading = block.chars().count() <= TITLE_MAX_CHARS
            && !block.trim_end().ends_with(['.', '!', '?', ':', ';', ',']);
        if is_single_line && looks_like_heading { ElementKind::Title } else { ElementKind::Paragraph }
    }
}

impl DocumentParser for PlainTextParser {
    fn parse(&self, path: &Path) -> Result<Vec<ContentElement>> {
        let source_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let raw = std::fs::read(path).map_err(|e| RagError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8(raw).map_err(|e| RagError::Parse {
            source_name: source_name.unwrap_or_else(|| path.display().to_string()),
            message: format!("not valid UTF-8: {e}"),
        })?;

        let mut elements = Vec::new();
        for (page_idx, page) in text.split('\u{0C}').enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let page_number = Some(page_idx as u32 + 1);
            for block in page.split("\n\n") {
                let block = block.trim();
                if block.is_empty() {
                    continue;
                }
                elements.push(ContentElement {
                    text: block.to_string(),
                    kind: Self::classify(block),
                    page: page_number,
                });
            }
        }

        debug!(path = %path.display(), elements = elements.len(), "parsed plain text document");
        Ok(elements)
    }
}
