//! Four-tier category resolution cascade.
//!
//! Tier order, first match wins:
//! 1. explicit user choice (short-circuits, no tiers consulted)
//! 2. stored keyword rules, longest keyword first
//! 3. built-in fallback dictionary
//! 4. remote classifier (feature-flagged, off by default)
//!
//! Receipt OCR output mixes full-width/half-width and case freely, so every
//! comparison runs over NFKC-folded, lowercased text — keywords included.
//!
//! Pure function of its inputs plus the read-only store snapshot: identical
//! inputs against an unchanged store resolve identically.

use std::sync::Arc;

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use super::dictionary::FALLBACK_KEYWORDS;
use super::remote::{RemoteClassifier, RemoteClassifierConfig};
use super::types::{Category, CategoryStore};

/// NFKC compatibility fold + lowercase — the comparison key for all keyword
/// matching. Folds `ＡＭＡＺＯＮ` and `amazon` to the same key.
pub fn normalize_text(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// One classification strategy. Tiers see the normalized haystack and the
/// read-only store, and answer with a category or pass.
pub trait ResolverTier: Send + Sync {
    fn attempt(&self, normalized: &str, store: &dyn CategoryStore) -> Option<Category>;
}

/// Tier 2: stored keyword rules with longest-match semantics.
///
/// Rules are re-sorted here — keyword char-length descending, then keyword
/// ascending — so the outcome is deterministic whatever order the store
/// returns them in.
pub struct KeywordRuleTier;

impl ResolverTier for KeywordRuleTier {
    fn attempt(&self, normalized: &str, store: &dyn CategoryStore) -> Option<Category> {
        let mut rules = store.keyword_rules();
        rules.sort_by(|a, b| {
            let len_a = a.keyword.chars().count();
            let len_b = b.keyword.chars().count();
            len_b.cmp(&len_a).then_with(|| a.keyword.cmp(&b.keyword))
        });

        rules
            .into_iter()
            .find(|rule| normalized.contains(&normalize_text(&rule.keyword)))
            .map(|rule| {
                debug!(keyword = %rule.keyword, category = %rule.category.name, "Keyword rule matched");
                rule.category
            })
    }
}

/// Tier 3: built-in dictionary scan in declared order.
///
/// A trigger-word hit whose category name is missing from the store is
/// skipped — the scan continues rather than fabricating a category.
pub struct BuiltinDictionaryTier;

impl ResolverTier for BuiltinDictionaryTier {
    fn attempt(&self, normalized: &str, store: &dyn CategoryStore) -> Option<Category> {
        for (category_name, words) in FALLBACK_KEYWORDS {
            for word in *words {
                if normalized.contains(&normalize_text(word)) {
                    if let Some(category) = store.category_by_name(category_name) {
                        debug!(word = %word, category = %category.name, "Dictionary word matched");
                        return Some(category);
                    }
                }
            }
        }
        None
    }
}

/// Tier 4: remote classifier behind its enable flag.
pub struct RemoteTier {
    classifier: Arc<dyn RemoteClassifier>,
    config: RemoteClassifierConfig,
}

impl RemoteTier {
    pub fn new(classifier: Arc<dyn RemoteClassifier>, config: RemoteClassifierConfig) -> Self {
        Self { classifier, config }
    }
}

impl ResolverTier for RemoteTier {
    fn attempt(&self, normalized: &str, store: &dyn CategoryStore) -> Option<Category> {
        if !self.config.enabled {
            return None;
        }

        let answer = self.classifier.classify(normalized)?;
        if answer.score < self.config.threshold {
            debug!(
                label = %answer.label,
                score = answer.score,
                threshold = self.config.threshold,
                "Remote classification below threshold"
            );
            return None;
        }

        let mapped = self
            .config
            .label_map
            .get(&answer.label)
            .cloned()
            .unwrap_or(answer.label);
        store.category_by_name(&mapped)
    }
}

/// The cascade itself: an ordered list of tiers over a shared store.
pub struct CategoryResolver {
    store: Arc<dyn CategoryStore>,
    tiers: Vec<Box<dyn ResolverTier>>,
}

impl CategoryResolver {
    /// Standard cascade: keyword rules, then the built-in dictionary.
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self {
            store,
            tiers: vec![Box::new(KeywordRuleTier), Box::new(BuiltinDictionaryTier)],
        }
    }

    /// Append the remote-classifier tier.
    pub fn with_remote(
        mut self,
        classifier: Arc<dyn RemoteClassifier>,
        config: RemoteClassifierConfig,
    ) -> Self {
        self.tiers.push(Box::new(RemoteTier::new(classifier, config)));
        self
    }

    /// Resolve a category for an item/memo pair.
    ///
    /// An explicit user choice is honored immediately. `None` means no tier
    /// matched — the record stays uncategorized; there is no fallback
    /// category.
    pub fn resolve(
        &self,
        item: &str,
        memo: &str,
        user_choice: Option<Category>,
    ) -> Option<Category> {
        if let Some(choice) = user_choice {
            return Some(choice);
        }

        let normalized = normalize_text(&format!("{item} {memo}"));
        self.tiers
            .iter()
            .find_map(|tier| tier.attempt(&normalized, self.store.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::category::remote::LabelScore;
    use crate::pipeline::category::types::MemoryCategoryStore;

    fn store_with(names: &[&str]) -> MemoryCategoryStore {
        let mut store = MemoryCategoryStore::new();
        for name in names {
            store.add_category(Category::named(*name));
        }
        store
    }

    struct FixedClassifier(Option<LabelScore>);

    impl RemoteClassifier for FixedClassifier {
        fn classify(&self, _text: &str) -> Option<LabelScore> {
            self.0.clone()
        }
    }

    #[test]
    fn explicit_choice_short_circuits() {
        let resolver = CategoryResolver::new(Arc::new(store_with(&["食費"])));
        let choice = Category::named("交際費");
        assert_eq!(
            resolver.resolve("ランダムな文字列", "", Some(choice.clone())),
            Some(choice)
        );
    }

    #[test]
    fn longest_keyword_wins_regardless_of_storage_order() {
        for reversed in [false, true] {
            let mut store = store_with(&[]);
            let mut rules = vec![
                ("セブン", Category::named("食費")),
                ("セブンイレブン", Category::named("コンビニ")),
            ];
            if reversed {
                rules.reverse();
            }
            for (keyword, category) in rules {
                store.add_rule(keyword, category);
            }

            let resolver = CategoryResolver::new(Arc::new(store));
            let resolved = resolver.resolve("セブンイレブン 渋谷店", "", None);
            assert_eq!(resolved, Some(Category::named("コンビニ")));
        }
    }

    #[test]
    fn equal_length_keywords_break_ties_lexically() {
        let mut store = store_with(&[]);
        store.add_rule("ガス", Category::named("水道光熱"));
        store.add_rule("アイス", Category::named("食費"));
        store.add_rule("アスパ", Category::named("野菜"));

        let resolver = CategoryResolver::new(Arc::new(store));
        // Both 3-char keywords match; アイス sorts before アスパ.
        let resolved = resolver.resolve("アイスとアスパ", "", None);
        assert_eq!(resolved, Some(Category::named("食費")));
    }

    #[test]
    fn width_and_case_fold_before_matching() {
        assert_eq!(normalize_text("ＡＭＡＺＯＮ"), normalize_text("amazon"));

        let mut store = store_with(&[]);
        store.add_rule("amazon", Category::named("日用品"));
        let resolver = CategoryResolver::new(Arc::new(store));
        assert_eq!(
            resolver.resolve("ＡＭＡＺＯＮ マーケットプレイス", "", None),
            Some(Category::named("日用品"))
        );
    }

    #[test]
    fn memo_participates_in_matching() {
        let mut store = store_with(&[]);
        store.add_rule("飲み会", Category::named("交際費"));
        let resolver = CategoryResolver::new(Arc::new(store));
        assert_eq!(
            resolver.resolve("現金払い", "部署の飲み会", None),
            Some(Category::named("交際費"))
        );
    }

    #[test]
    fn dictionary_resolves_when_category_exists() {
        let resolver = CategoryResolver::new(Arc::new(store_with(&["交通"])));
        assert_eq!(
            resolver.resolve("タクシー 新宿", "", None),
            Some(Category::named("交通"))
        );
    }

    #[test]
    fn dictionary_hit_with_absent_category_keeps_scanning() {
        // "タクシー" triggers 交通 which is absent; "病院" later resolves 医療.
        let resolver = CategoryResolver::new(Arc::new(store_with(&["医療"])));
        assert_eq!(
            resolver.resolve("タクシーで病院の薬を受け取り", "", None),
            Some(Category::named("医療"))
        );
    }

    #[test]
    fn no_tier_matching_yields_none() {
        let resolver = CategoryResolver::new(Arc::new(store_with(&["食費"])));
        assert_eq!(resolver.resolve("zzz 未知の何か", "", None), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut store = store_with(&[]);
        store.add_rule("ローソン", Category::named("食費"));
        let resolver = CategoryResolver::new(Arc::new(store));
        let first = resolver.resolve("ローソン 100円パン", "", None);
        for _ in 0..3 {
            assert_eq!(resolver.resolve("ローソン 100円パン", "", None), first);
        }
    }

    // ── Remote tier ──

    fn remote_config(enabled: bool, threshold: f32) -> RemoteClassifierConfig {
        RemoteClassifierConfig {
            enabled,
            threshold,
            label_map: [("groceries".to_string(), "食費".to_string())].into(),
        }
    }

    #[test]
    fn remote_tier_skipped_when_disabled() {
        let classifier = Arc::new(FixedClassifier(Some(LabelScore {
            label: "groceries".into(),
            score: 0.99,
        })));
        let resolver = CategoryResolver::new(Arc::new(store_with(&["食費"])))
            .with_remote(classifier, remote_config(false, 0.65));
        assert_eq!(resolver.resolve("謎の店", "", None), None);
    }

    #[test]
    fn remote_label_mapped_and_accepted_above_threshold() {
        let classifier = Arc::new(FixedClassifier(Some(LabelScore {
            label: "groceries".into(),
            score: 0.8,
        })));
        let resolver = CategoryResolver::new(Arc::new(store_with(&["食費"])))
            .with_remote(classifier, remote_config(true, 0.65));
        assert_eq!(
            resolver.resolve("謎の店", "", None),
            Some(Category::named("食費"))
        );
    }

    #[test]
    fn remote_score_below_threshold_rejected() {
        let classifier = Arc::new(FixedClassifier(Some(LabelScore {
            label: "groceries".into(),
            score: 0.5,
        })));
        let resolver = CategoryResolver::new(Arc::new(store_with(&["食費"])))
            .with_remote(classifier, remote_config(true, 0.65));
        assert_eq!(resolver.resolve("謎の店", "", None), None);
    }

    #[test]
    fn unmapped_remote_label_used_as_is() {
        let classifier = Arc::new(FixedClassifier(Some(LabelScore {
            label: "医療".into(),
            score: 0.9,
        })));
        let resolver = CategoryResolver::new(Arc::new(store_with(&["医療"])))
            .with_remote(classifier, remote_config(true, 0.65));
        assert_eq!(
            resolver.resolve("謎の店", "", None),
            Some(Category::named("医療"))
        );
    }
}
