//! Keyword categorizer
//!
//! Matches a lowercased description against an ordered keyword table. The
//! first category with a substring hit wins; with no hit the amount decides.

use serde::{Deserialize, Serialize};

use crate::models::{Transaction, OTHER_CATEGORY};

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .any(|k| text.contains(&k.to_lowercase()))
    }
}

/// Assigns a category to a transaction description
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::with_rules(Self::default_rules())
    }
}

impl Categorizer {
    pub fn with_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Built-in keyword table, in match order
    pub fn default_rules() -> Vec<CategoryRule> {
        vec![
            CategoryRule::new(
                "food",
                &[
                    "restaurant", "cafe", "coffee", "lunch", "dinner", "breakfast", "pizza",
                    "burger", "subway", "starbucks", "mcdonalds",
                ],
            ),
            CategoryRule::new(
                "transportation",
                &[
                    "uber", "lyft", "taxi", "gas", "fuel", "parking", "metro", "bus", "train",
                    "airline", "flight",
                ],
            ),
            CategoryRule::new(
                "shopping",
                &[
                    "amazon", "walmart", "target", "mall", "clothing", "shoes", "electronics",
                    "online",
                ],
            ),
            CategoryRule::new(
                "entertainment",
                &[
                    "netflix", "spotify", "movie", "theater", "concert", "game", "hobby", "gym",
                    "fitness",
                ],
            ),
            CategoryRule::new(
                "utilities",
                &["electricity", "water", "gas", "internet", "phone", "cable", "wifi"],
            ),
            CategoryRule::new(
                "healthcare",
                &["pharmacy", "doctor", "hospital", "medical", "dental", "vision", "insurance"],
            ),
            CategoryRule::new(
                "education",
                &["books", "course", "tuition", "school", "university", "training"],
            ),
            CategoryRule::new(
                "housing",
                &["rent", "mortgage", "home", "apartment", "maintenance", "repair"],
            ),
        ]
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category for a description and amount. Never fails.
    pub fn categorize(&self, description: &str, amount: f64) -> String {
        let text = description.to_lowercase();

        if !text.trim().is_empty() {
            if let Some(rule) = self.rules.iter().find(|r| r.matches(&text)) {
                return rule.name.clone();
            }
        }

        fallback_by_amount(amount).to_string()
    }

    /// The transaction's own category, else one derived from its description
    pub fn resolve(&self, tx: &Transaction) -> String {
        if let Some(category) = tx.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                return category.to_string();
            }
        }

        match tx.description_text() {
            Some(description) => self.categorize(description, tx.amount),
            None => OTHER_CATEGORY.to_string(),
        }
    }
}

fn fallback_by_amount(amount: f64) -> &'static str {
    if amount < 10.0 {
        "food"
    } else if amount < 50.0 {
        "shopping"
    } else if amount < 200.0 {
        "entertainment"
    } else {
        OTHER_CATEGORY
    }
}
