//! Receipt OCR core for a household ledger.
//!
//! Takes a photographed receipt (bytes, seekable upload handle, or path),
//! extracts candidate line items via remote document text detection, filters
//! OCR noise, and resolves a spending category per item through a layered
//! cascade: explicit user choice → stored keyword rules → built-in dictionary
//! → optional remote classifier.
//!
//! Persistence, HTTP handling, and rendering live in the calling application;
//! this crate exchanges byte buffers for structured line items and borrows
//! read access to the externally owned rule/category store.

pub mod pipeline;

pub use pipeline::category::{
    Category, CategoryResolver, CategoryRule, CategoryStore, LabelScore, MemoryCategoryStore,
    RemoteClassifier, RemoteClassifierConfig,
};
pub use pipeline::extraction::{
    ExtractedLine, ExtractionError, ImageSource, ReceiptExtractor, TextDetector, Token,
};
pub use pipeline::extraction::vision::GoogleVisionDetector;
pub use pipeline::{ClassificationResult, ReceiptPipeline};
