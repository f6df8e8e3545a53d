//! Receipt processing pipeline: image bytes in, categorized line items out.
//!
//! `extraction` turns a photographed receipt into candidate line items;
//! `category` maps each item onto a spending category. `ReceiptPipeline`
//! chains the two and applies the coarse noise filter that guards what the
//! caller goes on to persist.

pub mod category;
pub mod extraction;

use serde::{Deserialize, Serialize};

use category::{Category, CategoryResolver};
use extraction::line_filter;
use extraction::{ExtractionError, ImageSource, ReceiptExtractor};

/// Final per-line output: a cleaned item, its amount, and the resolved
/// category — `None` when no tier matched; uncategorized is a legitimate
/// state, never substituted with a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub item: String,
    pub amount: u32,
    pub category: Option<Category>,
    pub raw_text: String,
}

/// Extraction and category resolution chained for one receipt upload.
pub struct ReceiptPipeline {
    extractor: ReceiptExtractor,
    resolver: CategoryResolver,
}

impl ReceiptPipeline {
    pub fn new(extractor: ReceiptExtractor, resolver: CategoryResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    /// Extract line items, drop coarse-filtered rows, and resolve a category
    /// for each surviving item.
    pub fn parse_receipt(
        &self,
        source: ImageSource<'_>,
    ) -> Result<Vec<ClassificationResult>, ExtractionError> {
        let lines = self.extractor.extract_lines(source)?;
        Ok(lines
            .into_iter()
            .filter(|line| !line_filter::is_noise(&line.item, line.amount))
            .map(|line| ClassificationResult {
                category: self.resolver.resolve(&line.item, "", None),
                item: line.item,
                amount: line.amount,
                raw_text: line.raw_text,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use super::category::MemoryCategoryStore;
    use super::extraction::types::{TextDetector, Token};

    struct FixedDetector(Vec<Token>);

    impl TextDetector for FixedDetector {
        fn detect(&self, _image_bytes: &[u8]) -> Result<Vec<Token>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn token(text: &str, y: f32) -> Token {
        Token {
            text: text.into(),
            y,
        }
    }

    #[test]
    fn receipt_flows_through_to_categorized_rows() {
        let detector = FixedDetector(vec![
            token("ローソン", 40.0),
            token("おにぎり", 100.0),
            token("250円", 103.0),
            token("処方薬", 140.0),
            token("580", 142.0),
            token("小計", 180.0),
            token("830", 181.0),
            // Phone digits that would misparse as a huge amount
            token("整理", 220.0),
            token("0312345678", 222.0),
        ]);

        let mut store = MemoryCategoryStore::new();
        store.add_category(Category::named("医療"));
        store.add_rule("おにぎり", Category::named("食費"));

        let pipeline = ReceiptPipeline::new(
            ReceiptExtractor::new(Arc::new(detector)),
            CategoryResolver::new(Arc::new(store)),
        );

        let rows = pipeline
            .parse_receipt(ImageSource::from_bytes(b"fake image"))
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item, "おにぎり");
        assert_eq!(rows[0].amount, 250);
        assert_eq!(rows[0].category, Some(Category::named("食費")));
        assert_eq!(rows[1].item, "処方薬");
        assert_eq!(rows[1].category, Some(Category::named("医療")));
    }

    #[test]
    fn unresolvable_items_stay_uncategorized() {
        let detector = FixedDetector(vec![token("謎の商品", 10.0), token("480", 12.0)]);
        let pipeline = ReceiptPipeline::new(
            ReceiptExtractor::new(Arc::new(detector)),
            CategoryResolver::new(Arc::new(MemoryCategoryStore::new())),
        );

        let rows = pipeline
            .parse_receipt(ImageSource::from_bytes(b"fake image"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, None);
    }

    #[test]
    fn coarse_filter_drops_oversized_amounts() {
        let detector = FixedDetector(vec![token("たまご", 10.0), token("500000", 12.0)]);
        let pipeline = ReceiptPipeline::new(
            ReceiptExtractor::new(Arc::new(detector)),
            CategoryResolver::new(Arc::new(MemoryCategoryStore::new())),
        );

        let rows = pipeline
            .parse_receipt(ImageSource::from_bytes(b"fake image"))
            .unwrap();
        assert!(rows.is_empty());
    }
}
