//! Composes the extraction stages: source read → normalize → detect → group
//! → classify. One synchronous pass per receipt upload.

use std::sync::Arc;

use tracing::{debug, info};

use super::line_filter::classify_line;
use super::source::ImageSource;
use super::types::{ExtractedLine, TextDetector};
use super::{grouping, preprocess, ExtractionError};

/// Receipt line-item extractor.
///
/// Holds the text-detection seam; everything else is pure. Shareable across
/// concurrent uploads — there is no mutable state.
pub struct ReceiptExtractor {
    detector: Arc<dyn TextDetector>,
}

impl ReceiptExtractor {
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self { detector }
    }

    /// Extract candidate line items from a receipt image.
    ///
    /// Noise lines and lines without a parsable amount are silently skipped.
    /// A blank or unreadable receipt yields an empty vec. The only hard
    /// failures are source I/O and a reported recognition-service error.
    pub fn extract_lines(
        &self,
        mut source: ImageSource<'_>,
    ) -> Result<Vec<ExtractedLine>, ExtractionError> {
        let raw = source.read()?;
        let normalized = preprocess::normalize(&raw);
        let tokens = self.detector.detect(&normalized)?;
        debug!(tokens = tokens.len(), "Text detection returned tokens");

        let groups = grouping::group_tokens(tokens);
        let lines: Vec<ExtractedLine> = groups.iter().filter_map(classify_line).collect();

        info!(
            groups = groups.len(),
            lines = lines.len(),
            "Receipt line extraction complete"
        );
        Ok(lines)
    }
}
