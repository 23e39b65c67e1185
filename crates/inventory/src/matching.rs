//! File-name to inventory matching.
//!
//! Names are compared by a normalized key: lowercase, with every character
//! that is not a letter or digit removed. `"Hawan-Samagri_2.jpg"` and
//! `"hawan samagri 2.png"` both become `hawansamagri2`.
//!
//! Matching is tiered. A key is first compared against every item's
//! normalized ISBN; if any item matches there, that set is final even when a
//! title would also match. Only when no ISBN matches are titles consulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shelfkeeper_core::ItemId;

use crate::item::InventoryItem;

/// Normalize a name or ISBN into its match key.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Drop any directory prefix and the last extension from an uploaded file name.
pub fn file_stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match base.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => base,
    }
}

/// Match key for an uploaded file.
pub fn file_key(file_name: &str) -> String {
    normalize_key(file_stem(file_name))
}

/// Which comparison produced a match set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Isbn,
    Title,
}

/// Outcome of resolving one key against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one item matched.
    Unique { item_id: ItemId, tier: MatchTier },
    /// Several items matched in the winning tier; nothing may be changed.
    Ambiguous { tier: MatchTier, item_ids: Vec<ItemId> },
    /// No item matched in either tier.
    NoMatch,
}

/// Transient result of matching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub file_name: String,
    pub normalized_key: String,
    pub resolution: Resolution,
}

impl MatchCandidate {
    pub fn item_id(&self) -> Option<ItemId> {
        match &self.resolution {
            Resolution::Unique { item_id, .. } => Some(*item_id),
            _ => None,
        }
    }

    pub fn conflict_count(&self) -> usize {
        match &self.resolution {
            Resolution::Ambiguous { item_ids, .. } => item_ids.len(),
            _ => 0,
        }
    }
}

/// Lookup tables built once from an inventory snapshot.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    by_isbn: BTreeMap<String, Vec<ItemId>>,
    by_title: BTreeMap<String, Vec<ItemId>>,
}

impl MatchIndex {
    pub fn build<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        let mut index = Self::default();

        for item in items {
            if let Some(isbn) = item.isbn() {
                let key = normalize_key(isbn);
                if !key.is_empty() {
                    index.by_isbn.entry(key).or_default().push(item.id());
                }
            }

            let key = normalize_key(item.title());
            if !key.is_empty() {
                index.by_title.entry(key).or_default().push(item.id());
            }
        }

        // Deterministic candidate order regardless of snapshot order.
        for ids in index.by_isbn.values_mut().chain(index.by_title.values_mut()) {
            ids.sort();
            ids.dedup();
        }

        index
    }

    pub fn resolve(&self, key: &str) -> Resolution {
        if key.is_empty() {
            return Resolution::NoMatch;
        }

        if let Some(ids) = self.by_isbn.get(key) {
            return Self::classify(MatchTier::Isbn, ids);
        }
        if let Some(ids) = self.by_title.get(key) {
            return Self::classify(MatchTier::Title, ids);
        }
        Resolution::NoMatch
    }

    pub fn candidate(&self, file_name: &str) -> MatchCandidate {
        let normalized_key = file_key(file_name);
        let resolution = self.resolve(&normalized_key);
        MatchCandidate {
            file_name: file_name.to_string(),
            normalized_key,
            resolution,
        }
    }

    fn classify(tier: MatchTier, ids: &[ItemId]) -> Resolution {
        match ids {
            [] => Resolution::NoMatch,
            [only] => Resolution::Unique { item_id: *only, tier },
            many => Resolution::Ambiguous {
                tier,
                item_ids: many.to_vec(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use chrono::Utc;
    use proptest::prelude::*;

    fn item(title: &str, isbn: Option<&str>) -> InventoryItem {
        InventoryItem::create(
            ItemId::new(),
            NewItem {
                title: title.to_string(),
                isbn: isbn.map(str::to_string),
                low_stock_threshold_override: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn equivalent_spellings_share_a_key() {
        assert_eq!(normalize_key("My Book!"), "mybook");
        assert_eq!(normalize_key("my-book"), "mybook");
        assert_eq!(normalize_key("MY_BOOK"), "mybook");
    }

    #[test]
    fn file_key_strips_extension_and_separators() {
        assert_eq!(file_key("Hawan-Samagri_2.jpg"), "hawansamagri2");
        assert_eq!(file_key("uploads/covers/Gita.final.png"), "gitafinal");
        assert_eq!(file_key("no_extension"), "noextension");
        assert_eq!(file_key(".hidden"), "hidden");
    }

    #[test]
    fn isbn_match_wins_over_title() {
        let by_isbn = item("Some Other Title", Some("978-81-7276-001-3"));
        let by_title = item("9788172760013", None);
        let index = MatchIndex::build([&by_isbn, &by_title]);

        let c = index.candidate("978-81-7276-001-3.jpg");
        assert_eq!(
            c.resolution,
            Resolution::Unique {
                item_id: by_isbn.id(),
                tier: MatchTier::Isbn
            }
        );
    }

    #[test]
    fn falls_back_to_title() {
        let gita = item("Bhagavad Gita", Some("978-0-14-044918-1"));
        let index = MatchIndex::build([&gita]);
        let c = index.candidate("bhagavad_gita.webp");
        assert_eq!(c.item_id(), Some(gita.id()));
    }

    #[test]
    fn duplicate_titles_are_ambiguous() {
        let a = item("Gita", None);
        let b = item("GITA", None);
        let index = MatchIndex::build([&a, &b]);
        let c = index.candidate("gita.jpg");
        assert_eq!(c.conflict_count(), 2);
        assert_eq!(c.item_id(), None);
    }

    #[test]
    fn empty_key_never_matches() {
        let untitled = item("Gita", None);
        let index = MatchIndex::build([&untitled]);
        assert_eq!(index.candidate("!!!.jpg").resolution, Resolution::NoMatch);
    }

    proptest! {
        /// Property: normalization is idempotent and ignores separators.
        #[test]
        fn normalization_is_idempotent(raw in "[A-Za-z0-9 _\\-!.]{0,40}") {
            let once = normalize_key(&raw);
            prop_assert_eq!(normalize_key(&once), once.clone());
            let spaced = raw.replace('-', " ").replace('_', "  ");
            prop_assert_eq!(normalize_key(&spaced), once);
        }
    }
}
