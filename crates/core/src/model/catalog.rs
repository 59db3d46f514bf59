use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::TopicId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("topic id cannot be empty")]
    EmptyId,

    #[error("topic label cannot be empty: {id}")]
    EmptyLabel { id: String },

    #[error("duplicate topic id: {id}")]
    DuplicateId { id: String },
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One topic in the catalog: its id and human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: TopicId,
    pub label: String,
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable, ordered mapping from topic id to display label.
///
/// The catalog is the universe of topics that count toward global statistics,
/// and the source of the display-name snapshot taken when a session is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCatalog {
    entries: Vec<CatalogEntry>,
}

impl TopicCatalog {
    /// Build a catalog from entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for empty ids, empty labels, or duplicate ids.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if entry.label.trim().is_empty() {
                return Err(CatalogError::EmptyLabel {
                    id: entry.id.to_string(),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: entry.id.to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Built-in French grammar catalog.
    #[must_use]
    pub fn french_grammar() -> Self {
        const TOPICS: [(&str, &str); 18] = [
            ("pronoms-sujets", "Les pronoms personnels sujets"),
            ("negation", "La négation"),
            ("etre-avoir", "Être / Avoir / Verbes -ER"),
            ("verbes-re", "Les verbes en -RE"),
            ("verbes-ir", "Les verbes en -IR"),
            ("questions", "La question"),
            ("adj-possessif", "L'adjectif possessif"),
            ("adj-qualificatif", "L'adjectif qualificatif"),
            ("verbes-pronominaux", "Les verbes pronominaux"),
            ("adj-demonstratif", "L'adjectif démonstratif"),
            ("article-partitif", "L'article partitif"),
            ("imparfait", "L'imparfait"),
            ("futur-simple", "Le futur simple"),
            ("conditionnel", "Le conditionnel"),
            ("cod-coi", "Les pronoms COD / COI"),
            ("passe-compose", "Le passé composé"),
            ("imperatif", "L'impératif"),
            ("futur-proche", "Le futur proche"),
        ];

        Self {
            entries: TOPICS
                .iter()
                .map(|(id, label)| CatalogEntry {
                    id: TopicId::new(*id),
                    label: (*label).to_string(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn label(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id.as_str() == id)
            .map(|entry| entry.label.as_str())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.label(id).is_some()
    }

    /// Label to snapshot onto a new session: the catalog label, or the raw id
    /// when the topic is unknown.
    #[must_use]
    pub fn display_name(&self, id: &str) -> String {
        self.label(id).unwrap_or(id).to_string()
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn topic_ids(&self) -> impl Iterator<Item = &TopicId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self::french_grammar()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, label: &str) -> CatalogEntry {
        CatalogEntry {
            id: TopicId::new(id),
            label: label.to_string(),
        }
    }

    #[test]
    fn builtin_catalog_keeps_order() {
        let catalog = TopicCatalog::french_grammar();
        assert_eq!(catalog.len(), 18);
        let first = catalog.iter().next().unwrap();
        assert_eq!(first.id.as_str(), "pronoms-sujets");
        assert_eq!(catalog.label("imparfait"), Some("L'imparfait"));
    }

    #[test]
    fn display_name_falls_back_to_raw_id() {
        let catalog = TopicCatalog::french_grammar();
        assert_eq!(catalog.display_name("negation"), "La négation");
        assert_eq!(catalog.display_name("subjonctif"), "subjonctif");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = TopicCatalog::new(vec![entry("a", "A"), entry("a", "Again")]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId { id: "a".into() });
    }

    #[test]
    fn rejects_blank_id_and_label() {
        assert_eq!(
            TopicCatalog::new(vec![entry(" ", "A")]).unwrap_err(),
            CatalogError::EmptyId
        );
        assert!(matches!(
            TopicCatalog::new(vec![entry("a", "")]).unwrap_err(),
            CatalogError::EmptyLabel { .. }
        ));
    }
}
