use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// A single recognized word with its vertical position on the receipt.
///
/// Produced by a `TextDetector`, consumed by the line grouper. The y value is
/// the minimum y of the word's bounding polygon — tokens on the same printed
/// line share (roughly) the same top edge even when glyph heights differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub y: f32,
}

/// Recognized tokens clustered into one printed receipt line.
///
/// `text` is the tokens concatenated with single spaces, in top-to-bottom
/// order. Transient: consumed immediately by the line classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub text: String,
    pub y_min: f32,
    pub y_max: f32,
}

/// One candidate line item extracted from a receipt.
///
/// `raw_text` keeps the pre-cleaning line text for audit; `item` is the
/// cleaned label with the amount substring removed. `amount` is in minor
/// currency units (yen — no fractional part).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLine {
    pub raw_text: String,
    pub item: String,
    pub amount: u32,
    pub confidence: f32,
    pub y_min: f32,
    pub y_max: f32,
}

/// Remote document-text-detection seam.
///
/// Implemented by `GoogleVisionDetector` in production; tests substitute a
/// canned-token mock. Returns an empty vec when no text is detected — a blank
/// or unreadable receipt is a valid outcome, not an error.
pub trait TextDetector: Send + Sync {
    fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Token>, ExtractionError>;
}
