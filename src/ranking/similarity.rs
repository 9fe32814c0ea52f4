use crate::core::{Advert, ScoredAdvert};
use crate::ranking::sort_by_score_desc;

pub const CATEGORY_WEIGHT: f64 = 0.4;
pub const PRICE_WEIGHT: f64 = 0.3;
pub const DIETARY_WEIGHT: f64 = 0.2;
pub const SPICINESS_WEIGHT: f64 = 0.1;

/// Recommendations shown on an advert detail page
pub const DEFAULT_RECOMMENDATIONS: usize = 4;

/// Recommendations shown in compact "related" panels
pub const COMPACT_RECOMMENDATIONS: usize = 3;

/// Per-term contributions to the similarity of two adverts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimilarityBreakdown {
    pub category: f64,
    pub price: f64,
    pub dietary: f64,
    pub spiciness: f64,
}

impl SimilarityBreakdown {
    pub fn between(a: &Advert, b: &Advert) -> Self {
        Self {
            category: category_term(a, b),
            price: price_term(a.price, b.price),
            dietary: dietary_term(&a.dietary_information, &b.dietary_information),
            spiciness: spiciness_term(a, b),
        }
    }

    pub fn total(&self) -> f64 {
        self.category + self.price + self.dietary + self.spiciness
    }
}

/// Weighted similarity between two adverts, roughly in `[0, 1]`.
///
/// Missing fields contribute nothing to their term.
pub fn similarity(a: &Advert, b: &Advert) -> f64 {
    SimilarityBreakdown::between(a, b).total()
}

fn category_term(a: &Advert, b: &Advert) -> f64 {
    if !a.category.is_empty() && a.category == b.category {
        CATEGORY_WEIGHT
    } else {
        0.0
    }
}

fn price_term(price_a: f64, price_b: f64) -> f64 {
    if price_a > 0.0 && price_b > 0.0 {
        let ratio = price_a.min(price_b) / price_a.max(price_b);
        ratio * PRICE_WEIGHT
    } else {
        0.0
    }
}

/// Any whitespace token of `a` contained anywhere in `b`. Not symmetric:
/// "gluten-free," in `a` only matches if `b` carries that exact fragment.
fn dietary_term(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.split_whitespace().any(|word| b.contains(word)) {
        DIETARY_WEIGHT
    } else {
        0.0
    }
}

fn spiciness_term(a: &Advert, b: &Advert) -> f64 {
    match (a.spiciness_level, b.spiciness_level) {
        (Some(x), Some(y)) if x == y => SPICINESS_WEIGHT,
        _ => 0.0,
    }
}

/// Picks the adverts most similar to a target from a candidate pool
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    limit: usize,
}

impl Recommender {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Score every available advert in `pool` other than `target` itself,
    /// keep positive scores and return the best `limit`, highest first.
    pub fn recommend(&self, target: &Advert, pool: &[Advert]) -> Vec<ScoredAdvert> {
        let mut scored: Vec<ScoredAdvert> = pool
            .iter()
            .filter(|ad| ad.id != target.id && ad.is_available)
            .filter_map(|ad| {
                let score = similarity(target, ad);
                (score > 0.0).then(|| ScoredAdvert::new(ad.clone(), score))
            })
            .collect();

        sort_by_score_desc(&mut scored);
        scored.truncate(self.limit);

        tracing::debug!(
            "Recommended {} adverts for '{}' from a pool of {}",
            scored.len(),
            target.name,
            pool.len()
        );

        scored
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(DEFAULT_RECOMMENDATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SpicinessLevel;

    fn dish(id: &str, category: &str, price: f64, dietary: &str, spice: Option<SpicinessLevel>) -> Advert {
        let mut ad = Advert::new(id, format!("Dish {}", id));
        ad.category = category.to_string();
        ad.price = price;
        ad.dietary_information = dietary.to_string();
        ad.spiciness_level = spice;
        ad.is_available = true;
        ad
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let a = dish("1", "Main Course", 40.0, "Vegetarian, Halal", Some(SpicinessLevel::Hot));
        assert!(approx(similarity(&a, &a), 1.0));

        let others = vec![
            dish("2", "Main Course", 20.0, "Halal", Some(SpicinessLevel::Hot)),
            dish("3", "Desserts", 40.0, "Vegan", None),
            dish("4", "Main Course", 40.0, "Vegetarian", Some(SpicinessLevel::Mild)),
        ];
        for other in &others {
            assert!(similarity(&a, &a) >= similarity(&a, other));
        }
    }

    #[test]
    fn test_different_categories_and_empty_fields_score_zero() {
        let a = dish("1", "Main Course", 0.0, "", None);
        let b = dish("2", "Desserts", 0.0, "", None);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_categories_do_not_match() {
        let a = dish("1", "", 0.0, "", None);
        let b = dish("2", "", 0.0, "", None);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_price_term_is_symmetric() {
        let a = dish("1", "", 12.0, "", None);
        let b = dish("2", "", 48.0, "", None);
        let ab = SimilarityBreakdown::between(&a, &b);
        let ba = SimilarityBreakdown::between(&b, &a);
        assert!(approx(ab.price, ba.price));
        assert!(approx(ab.price, 0.25 * PRICE_WEIGHT));
    }

    #[test]
    fn test_zero_price_is_omitted() {
        let a = dish("1", "Snacks", 0.0, "", None);
        let b = dish("2", "Snacks", 25.0, "", None);
        let breakdown = SimilarityBreakdown::between(&a, &b);
        assert_eq!(breakdown.price, 0.0);
        assert!(approx(breakdown.total(), CATEGORY_WEIGHT));
    }

    #[test]
    fn test_dietary_overlap_is_substring_based_and_asymmetric() {
        let a = dish("1", "", 0.0, "vegan", None);
        let b = dish("2", "", 0.0, "Vegan, Gluten-Free", None);
        assert!(approx(similarity(&a, &b), DIETARY_WEIGHT));

        // neither "vegan," nor "gluten-free" occurs inside "vegan"
        let reverse = SimilarityBreakdown::between(&b, &a);
        assert_eq!(reverse.dietary, 0.0);

        // token "veg" matches inside "vegetarian"
        let c = dish("3", "", 0.0, "veg", None);
        let d = dish("4", "", 0.0, "Vegetarian", None);
        assert!(approx(similarity(&c, &d), DIETARY_WEIGHT));
    }

    #[test]
    fn test_spiciness_match() {
        let a = dish("1", "", 0.0, "", Some(SpicinessLevel::Medium));
        let b = dish("2", "", 0.0, "", Some(SpicinessLevel::Medium));
        let c = dish("3", "", 0.0, "", None);
        assert!(approx(similarity(&a, &b), SPICINESS_WEIGHT));
        assert_eq!(similarity(&a, &c), 0.0);
    }

    #[test]
    fn test_recommender_excludes_self_and_unavailable() {
        let target = dish("t", "Main Course", 30.0, "", None);
        let mut hidden = dish("h", "Main Course", 30.0, "", None);
        hidden.is_available = false;
        let pool = vec![
            target.clone(),
            hidden,
            dish("x", "Desserts", 0.0, "", None),
            dish("m", "Main Course", 60.0, "", None),
        ];

        let recs = Recommender::default().recommend(&target, &pool);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].advert.id, "m");
        assert!(approx(recs[0].score, CATEGORY_WEIGHT + 0.5 * PRICE_WEIGHT));
    }

    #[test]
    fn test_recommender_orders_and_limits() {
        let target = dish("t", "Main Course", 30.0, "Halal", Some(SpicinessLevel::Hot));
        let pool = vec![
            dish("a", "Main Course", 30.0, "", None),
            dish("b", "Main Course", 30.0, "Halal", Some(SpicinessLevel::Hot)),
            dish("c", "Main Course", 30.0, "", None),
            dish("d", "Desserts", 30.0, "", None),
            dish("e", "Main Course", 30.0, "Halal", None),
        ];

        let recs = Recommender::new(COMPACT_RECOMMENDATIONS).recommend(&target, &pool);
        let ids: Vec<&str> = recs.iter().map(|r| r.advert.id.as_str()).collect();
        // equal scores for "a" and "c" keep pool order
        assert_eq!(ids, vec!["b", "e", "a"]);
    }

    #[test]
    fn test_spiciness_labels_compare_exactly() {
        let lower = Advert::from_json(r#"{"id": "1", "spicinessLevel": "hot"}"#).unwrap();
        let title = Advert::from_json(r#"{"id": "2", "spicinessLevel": "Hot"}"#).unwrap();
        assert_eq!(similarity(&lower, &title), 0.0);
        assert_eq!(similarity(&title, &title), SPICINESS_WEIGHT);
    }
}
