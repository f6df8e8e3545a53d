//! Optional remote-classifier tier: contract and configuration surface.
//!
//! Off by default. When enabled, normalized item text goes out to an external
//! classification service which answers with a label and a confidence score;
//! the label is mapped through a configured table onto a category name. No
//! concrete provider is wired in — callers supply an implementation of
//! `RemoteClassifier`.

use std::collections::HashMap;

use serde::Deserialize;

/// Default acceptance threshold for remote classification scores.
const DEFAULT_THRESHOLD: f32 = 0.65;

/// Label + confidence returned by a remote classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// External text-classification seam.
pub trait RemoteClassifier: Send + Sync {
    /// Classify the text, or return `None` when the service has no answer.
    fn classify(&self, text: &str) -> Option<LabelScore>;
}

/// Externally supplied configuration for the remote tier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteClassifierConfig {
    /// Feature flag — the tier is skipped entirely when false.
    pub enabled: bool,
    /// Minimum score to accept a classification.
    pub threshold: f32,
    /// Service label → category name. Labels without an entry are used as-is.
    pub label_map: HashMap<String, String>,
}

impl Default for RemoteClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_THRESHOLD,
            label_map: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_disabled() {
        let config = RemoteClassifierConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.threshold, 0.65);
        assert!(config.label_map.is_empty());
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: RemoteClassifierConfig =
            serde_json::from_str(r#"{"enabled": true, "label_map": {"groceries": "食費"}}"#)
                .unwrap();
        assert!(config.enabled);
        assert_eq!(config.threshold, 0.65, "Threshold falls back to default");
        assert_eq!(config.label_map["groceries"], "食費");
    }
}
