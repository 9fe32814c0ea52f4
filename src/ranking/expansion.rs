use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::ranking::is_trivial_query;

/// Built-in canonical terms and their synonyms
const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    ("cheap", &["affordable", "budget", "inexpensive"]),
    ("expensive", &["premium", "upscale", "luxury"]),
    ("quick", &["fast", "express", "speedy"]),
    ("romantic", &["date night", "intimate", "candlelit"]),
    ("family", &["kids", "group", "sharing"]),
    ("spicy", &["hot", "peppery", "fiery"]),
    ("healthy", &["light", "nutritious", "fresh"]),
];

/// Immutable mapping from canonical search terms to synonyms.
///
/// Terms keep their insertion order so expansions are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl SynonymTable {
    /// Build a table from `(term, synonyms)` pairs. Everything is lowercased;
    /// a repeated term keeps its first entry.
    pub fn new<T, S, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, Vec<S>)>,
        T: AsRef<str>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .map(|(term, synonyms)| {
                (
                    term.as_ref().trim().to_lowercase(),
                    synonyms
                        .iter()
                        .map(|s| s.as_ref().trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|(term, _)| !term.is_empty() && seen.insert(term.clone()))
            .collect();

        Self { entries }
    }

    /// Parse a YAML mapping of `term: [synonym, ...]`
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let map: BTreeMap<String, Vec<String>> = serde_yaml::from_str(yaml)?;
        Ok(Self::new(map))
    }

    pub fn synonyms(&self, term: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, synonyms)| synonyms.as_slice())
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(t, s)| (t.as_str(), s.as_slice()))
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYNONYMS
                .iter()
                .map(|(term, synonyms)| (*term, synonyms.to_vec())),
        )
    }
}

/// Widens a free-text query with synonym variants
#[derive(Debug, Clone, Default)]
pub struct QueryExpander {
    table: SynonymTable,
}

impl QueryExpander {
    pub fn new(table: SynonymTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// Lowercased, trimmed query followed by its deduplicated synonym variants.
    ///
    /// Replacement is plain substring replacement, so a term found inside a
    /// longer word is replaced there too. Queries under two characters are
    /// returned alone.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let base = query.trim().to_lowercase();
        if is_trivial_query(&base) {
            return vec![base];
        }

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(base.clone());
        let mut variants = vec![base.clone()];

        for (term, synonyms) in self.table.iter() {
            if !base.contains(term) {
                continue;
            }
            for synonym in synonyms {
                let variant = base.replace(term, synonym);
                if seen.insert(variant.clone()) {
                    variants.push(variant);
                }
            }
        }

        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_queries_skip_expansion() {
        let expander = QueryExpander::default();
        assert_eq!(expander.expand(""), vec![String::new()]);
        assert_eq!(expander.expand("  A "), vec!["a".to_string()]);
    }

    #[test]
    fn test_original_query_always_included() {
        let expander = QueryExpander::default();
        let variants = expander.expand("  Jollof Rice ");
        assert_eq!(variants, vec!["jollof rice".to_string()]);
    }

    #[test]
    fn test_cheap_expands_to_synonyms() {
        let expander = QueryExpander::default();
        let variants = expander.expand("Cheap lunch");
        assert_eq!(variants[0], "cheap lunch");
        assert!(variants.contains(&"affordable lunch".to_string()));
        assert!(variants.contains(&"budget lunch".to_string()));
        assert!(variants.contains(&"inexpensive lunch".to_string()));
        assert_eq!(variants.len(), 4);
    }

    #[test]
    fn test_multiple_terms_expand_independently() {
        let expander = QueryExpander::default();
        let variants = expander.expand("quick family dinner");
        assert!(variants.contains(&"fast family dinner".to_string()));
        assert!(variants.contains(&"quick kids dinner".to_string()));
        assert_eq!(variants.len(), 7);
    }

    #[test]
    fn test_replacement_is_not_word_bounded() {
        let expander = QueryExpander::default();
        let variants = expander.expand("cheapest");
        assert!(variants.contains(&"affordableest".to_string()));
    }

    #[test]
    fn test_variants_are_deduplicated() {
        let table = SynonymTable::new(vec![("soup", vec!["stew", "Stew", "stew "])]);
        let variants = QueryExpander::new(table).expand("soup");
        assert_eq!(variants, vec!["soup".to_string(), "stew".to_string()]);
    }

    #[test]
    fn test_table_from_yaml() {
        let table = SynonymTable::from_yaml("Local:\n  - ghanaian\n  - traditional\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.synonyms("local"),
            Some(&["ghanaian".to_string(), "traditional".to_string()][..])
        );
    }

    #[test]
    fn test_default_table_terms() {
        let table = SynonymTable::default();
        let terms: Vec<&str> = table.terms().collect();
        assert_eq!(terms[0], "cheap");
        assert!(terms.contains(&"romantic"));
        assert!(!table.is_empty());
    }
}
