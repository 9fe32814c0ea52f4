use std::collections::HashSet;

use crate::core::{Advert, ScoredAdvert};
use crate::error::Result;
use crate::ranking::{is_trivial_query, sort_by_score_desc, QueryExpander, Ranker};

/// Query found verbatim in name/description
pub const EXACT_PHRASE_BONUS: f64 = 10.0;
/// Per query variant (original included) found in name/description
pub const VARIANT_MATCH_BONUS: f64 = 5.0;
/// Per distinct word shared by query and name/description
pub const SHARED_TOKEN_BONUS: f64 = 2.0;

/// Substring and token-overlap ranker over advert names and descriptions
#[derive(Debug, Clone, Default)]
pub struct KeywordRanker {
    expander: QueryExpander,
}

impl KeywordRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expander(expander: QueryExpander) -> Self {
        Self { expander }
    }

    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// Score one advert against a lowercased query and its variants.
    ///
    /// `variants` contains `query` itself, so an exact match earns both the
    /// phrase bonus and a variant bonus.
    pub fn score(&self, query: &str, variants: &[String], advert: &Advert) -> f64 {
        let text = advert.search_text();
        let mut score = 0.0;

        if text.contains(query) {
            score += EXACT_PHRASE_BONUS;
        }

        let variant_hits = variants.iter().filter(|v| text.contains(v.as_str())).count();
        score += variant_hits as f64 * VARIANT_MATCH_BONUS;

        let query_tokens: HashSet<&str> = query.split_whitespace().collect();
        let text_tokens: HashSet<&str> = text.split_whitespace().collect();
        let shared = query_tokens.intersection(&text_tokens).count();
        score += shared as f64 * SHARED_TOKEN_BONUS;

        score
    }

    /// Scored adverts with a positive score, best first, ties in input order.
    /// Trivial queries return every advert unscored and in input order.
    pub fn score_all(&self, query: &str, adverts: &[Advert]) -> Vec<ScoredAdvert> {
        if is_trivial_query(query) {
            return adverts
                .iter()
                .map(|ad| ScoredAdvert::new(ad.clone(), 0.0))
                .collect();
        }

        let query = query.trim().to_lowercase();
        let variants = self.expander.expand(&query);

        let mut scored: Vec<ScoredAdvert> = adverts
            .iter()
            .filter_map(|ad| {
                let score = self.score(&query, &variants, ad);
                (score > 0.0).then(|| ScoredAdvert::new(ad.clone(), score))
            })
            .collect();

        sort_by_score_desc(&mut scored);
        scored
    }

    /// Matching adverts, best first
    pub fn rank_adverts(&self, query: &str, adverts: &[Advert]) -> Vec<Advert> {
        self.score_all(query, adverts)
            .into_iter()
            .map(|scored| scored.advert)
            .collect()
    }
}

impl Ranker for KeywordRanker {
    fn rank(&self, query: &str, candidates: &[Advert]) -> Result<Vec<ScoredAdvert>> {
        Ok(self.score_all(query, candidates))
    }

    fn expanded_terms(&self, query: &str) -> Vec<String> {
        if is_trivial_query(query) {
            return Vec::new();
        }
        self.expander.expand(query)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Rank `records` against `query` with the default synonym table.
///
/// Queries shorter than two characters return `records` unchanged.
pub fn rank(query: &str, records: &[Advert]) -> Vec<Advert> {
    KeywordRanker::new().rank_adverts(query, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advert(id: &str, name: &str, description: &str) -> Advert {
        let mut ad = Advert::new(id, name);
        ad.description = description.to_string();
        ad
    }

    fn names(adverts: &[Advert]) -> Vec<&str> {
        adverts.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_trivial_query_is_identity() {
        let records = vec![
            advert("1", "Waakye", "rice and beans"),
            advert("2", "Jollof", "spicy"),
        ];
        assert_eq!(rank("", &records), records);
        assert_eq!(rank("a", &records), records);
        assert_eq!(rank("  b  ", &records), records);
    }

    #[test]
    fn test_zero_scores_are_excluded() {
        let mut jollof = advert("1", "Jollof", "spicy");
        jollof.price = 10.0;
        let mut waakye = advert("2", "Waakye", "mild");
        waakye.price = 12.0;

        let ranked = rank("spicy", &[jollof, waakye]);
        assert_eq!(names(&ranked), vec!["Jollof"]);
    }

    #[test]
    fn test_synonym_match_is_included() {
        let records = vec![
            advert("1", "Banku Combo", "affordable meals for students"),
            advert("2", "Lobster Platter", "premium seafood"),
        ];
        let ranked = rank("cheap", &records);
        assert_eq!(names(&ranked), vec!["Banku Combo"]);
    }

    #[test]
    fn test_exact_match_outranks_token_overlap() {
        let records = vec![
            advert("1", "Rice Bowl", "fried rice with chicken"),
            advert("2", "Chicken Fried Rice", "wok tossed"),
        ];
        let ranker = KeywordRanker::new();
        let scored = ranker.score_all("chicken fried rice", &records);

        assert_eq!(scored[0].advert.name, "Chicken Fried Rice");
        // 10 exact + 5 variant + 3 shared tokens * 2
        assert_eq!(scored[0].score, 21.0);
        // "chicken", "fried", "rice" tokens only
        assert_eq!(scored[1].score, 6.0);
    }

    #[test]
    fn test_repeated_words_count_once() {
        let ranker = KeywordRanker::new();
        let ad = advert("1", "Soup", "soup soup soup");
        let variants = ranker.expander().expand("soup soup");
        assert_eq!(ranker.score("soup soup", &variants, &ad), 10.0 + 5.0 + 2.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            advert("1", "Kenkey", "with fish"),
            advert("2", "Banku", "with fish"),
            advert("3", "Fufu", "with fish"),
        ];
        let ranked = rank("fish", &records);
        assert_eq!(names(&ranked), vec!["Kenkey", "Banku", "Fufu"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let records = vec![advert("1", "JOLLOF RICE", "")];
        assert_eq!(rank("Jollof", &records).len(), 1);
    }

    #[test]
    fn test_ranker_trait() {
        let ranker = KeywordRanker::new();
        let ranked = ranker.rank("waakye", &[advert("1", "Waakye Special", "")]).unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score > 0.0);
        assert_eq!(ranker.name(), "keyword");
        assert_eq!(ranker.expanded_terms(" Quick "), vec!["quick", "fast", "express", "speedy"]);
        assert!(ranker.expanded_terms("q").is_empty());
    }
}
