//! Transaction category classification
//!
//! Each record falls into exactly one category. Rules are evaluated in
//! order and the first match wins, so a `swap_and_transfer` call counts as
//! a transfer.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::profile::record::TransactionRecord;

/// Transaction categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Category {
    Transfer,
    Swap,
    DeFi,
    #[serde(rename = "NFT")]
    Nft,
    Other,
}

impl Category {
    /// Display name used in profile output
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transfer => "Transfer",
            Category::Swap => "Swap",
            Category::DeFi => "DeFi",
            Category::Nft => "NFT",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classification rule
pub struct CategoryRule {
    pub category: Category,
    pub matches: fn(&str) -> bool,
}

fn is_transfer(function: &str) -> bool {
    function.contains("transfer")
}

fn is_swap(function: &str) -> bool {
    function.contains("swap")
}

fn is_defi(function: &str) -> bool {
    ["pool", "lend", "borrow"].iter().any(|k| function.contains(*k))
}

fn is_nft(function: &str) -> bool {
    function.to_lowercase().contains("nft")
}

/// Ordered category rules; anything unmatched is [`Category::Other`]
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Transfer,
        matches: is_transfer,
    },
    CategoryRule {
        category: Category::Swap,
        matches: is_swap,
    },
    CategoryRule {
        category: Category::DeFi,
        matches: is_defi,
    },
    CategoryRule {
        category: Category::Nft,
        matches: is_nft,
    },
];

/// Classify a function name
pub fn classify(function: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(function))
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}

/// Occurrence count per category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: Vec<(Category, usize)>,
}

impl CategoryCounts {
    /// Count categories over every record in the sequence
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        Self::from_functions(records.iter().map(|r| r.function.as_str()))
    }

    /// Count categories over a sequence of function names
    pub fn from_functions<'a, I>(functions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        functions
            .into_iter()
            .map(classify)
            .fold(Self::default(), |acc, category| acc.with(category))
    }

    fn with(mut self, category: Category) -> Self {
        match self.counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((category, 1)),
        }
        self
    }

    /// Count for a category (zero when never seen)
    pub fn get(&self, category: Category) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Category with the highest count; ties go to the first one seen
    pub fn primary(&self) -> Option<Category> {
        self.counts
            .iter()
            .fold(None, |best: Option<(Category, usize)>, &(category, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((category, count)),
            })
            .map(|(category, _)| category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

// Serialized as a JSON object keeping first-seen order
impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in &self.counts {
            map.serialize_entry(category.as_str(), count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(classify("coin::transfer"), Category::Transfer);
        assert_eq!(classify("router::swap_and_transfer"), Category::Transfer);
        assert_eq!(classify("router::swap_exact_input"), Category::Swap);
        assert_eq!(classify("pool::add_liquidity"), Category::DeFi);
        assert_eq!(classify("lending::lend"), Category::DeFi);
        assert_eq!(classify("market::borrow"), Category::DeFi);
        assert_eq!(classify("token::mint_NFT"), Category::Nft);
        assert_eq!(classify("aptos_governance::vote"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_only_nft_rule_ignores_case() {
        assert_eq!(classify("coin::Transfer"), Category::Other);
        assert_eq!(classify("amm::SWAP"), Category::Other);
        assert_eq!(classify("marketplace::list_Nft"), Category::Nft);
    }

    #[test]
    fn test_exactly_one_category_per_function() {
        let samples = [
            "", "x", "transfer", "swap", "pool", "lend", "borrow", "nft", "NFT",
            "nft_pool_swap_transfer", "staking::stake", "::", "Module::Function",
        ];
        for sample in samples {
            let matching: Vec<_> = CATEGORY_RULES
                .iter()
                .filter(|rule| (rule.matches)(sample))
                .map(|rule| rule.category)
                .collect();
            let category = classify(sample);
            match matching.first() {
                Some(first) => assert_eq!(category, *first),
                None => assert_eq!(category, Category::Other),
            }
        }
    }

    #[test]
    fn test_counts_and_primary() {
        let counts = CategoryCounts::from_functions(vec![
            "router::swap",
            "coin::transfer",
            "coin::transfer",
            "router::swap",
            "",
        ]);
        assert_eq!(counts.get(Category::Swap), 2);
        assert_eq!(counts.get(Category::Transfer), 2);
        assert_eq!(counts.get(Category::Other), 1);
        assert_eq!(counts.get(Category::Nft), 0);
        assert_eq!(counts.total(), 5);
        // Tie between Swap and Transfer: Swap was seen first
        assert_eq!(counts.primary(), Some(Category::Swap));
    }

    #[test]
    fn test_empty_counts() {
        let counts = CategoryCounts::from_functions(Vec::<&str>::new());
        assert!(counts.is_empty());
        assert_eq!(counts.primary(), None);
    }

    #[test]
    fn test_serializes_in_first_seen_order() {
        let counts = CategoryCounts::from_functions(vec!["a::nft_mint", "coin::transfer", "a::nft_burn"]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"NFT":2,"Transfer":1}"#);
    }
}
