use serde::{Deserialize, Serialize};

/// A spending category. Owned by the external store; the resolver only ever
/// references existing categories, it never creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Optional household scope for multi-household ledgers.
    #[serde(default)]
    pub household: Option<String>,
}

impl Category {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            household: None,
        }
    }
}

/// Administrator-defined keyword → category mapping.
///
/// Keywords are unique in the store; specificity (keyword length) decides
/// precedence when several keywords match the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: Category,
}

/// Read-only view over the externally persisted rules and categories.
///
/// No ordering is assumed on `keyword_rules` — the resolver sorts for
/// longest-match-first itself so results are deterministic regardless of
/// storage order.
pub trait CategoryStore: Send + Sync {
    fn keyword_rules(&self) -> Vec<CategoryRule>;

    fn category_by_name(&self, name: &str) -> Option<Category>;
}

/// In-memory store — tests and single-process deployments.
#[derive(Debug, Default, Clone)]
pub struct MemoryCategoryStore {
    categories: Vec<Category>,
    rules: Vec<CategoryRule>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn add_rule(&mut self, keyword: impl Into<String>, category: Category) {
        self.rules.push(CategoryRule {
            keyword: keyword.into(),
            category,
        });
    }
}

impl CategoryStore for MemoryCategoryStore {
    fn keyword_rules(&self) -> Vec<CategoryRule> {
        self.rules.clone()
    }

    fn category_by_name(&self, name: &str) -> Option<Category> {
        self.categories.iter().find(|c| c.name == name).cloned()
    }
}
