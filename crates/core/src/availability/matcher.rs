//! Best-match selection over noisy upstream search results.
//!
//! Scores each candidate by title equality and release-year proximity:
//!
//! | component | value |
//! |-----------|-------|
//! | title equal (normalized) | 1.0, otherwise 0.5 |
//! | year exact | 1.0 |
//! | year off by one | 0.7 |
//! | year off by two or three | 0.3 |
//! | otherwise / unknown | 0.0 |
//!
//! The top candidate is accepted at a total of 1.0, or at 0.5 when it is the
//! only candidate left after type filtering.

use std::collections::HashSet;

use super::{AvailabilityOffer, SearchCandidate};
use crate::normalize::normalize;

/// Object type accepted from upstream results.
pub const EXPECTED_OBJECT_TYPE: &str = "MOVIE";

const ACCEPT_SCORE: f64 = 1.0;
const SOLE_CANDIDATE_SCORE: f64 = 0.5;

/// A candidate with its score and position in the upstream ordering.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a SearchCandidate,
    pub score: f64,
    pub index: usize,
}

/// Outcome of matching one catalog title against search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub services: Vec<AvailabilityOffer>,
    pub external_id: Option<String>,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        self.external_id.is_some() || !self.services.is_empty()
    }
}

fn title_score(candidate_title: &str, target_key: &str) -> f64 {
    if normalize(candidate_title) == target_key {
        1.0
    } else {
        0.5
    }
}

fn year_score(candidate_year: Option<i32>, target_year: Option<i32>) -> f64 {
    match (candidate_year, target_year) {
        (Some(c), Some(t)) => match (c - t).abs() {
            0 => 1.0,
            1 => 0.7,
            2 | 3 => 0.3,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

/// Parse a catalog year; empty, zero or non-numeric years are unknown.
fn parse_year(year: &str) -> Option<i32> {
    year.trim().parse::<i32>().ok().filter(|y| *y != 0)
}

/// Score every type-compatible candidate, best first.
///
/// Ties keep upstream order.
pub fn rank_candidates<'a>(
    candidates: &'a [SearchCandidate],
    title: &str,
    year: &str,
) -> Vec<ScoredCandidate<'a>> {
    let target_key = normalize(title);
    let target_year = parse_year(year);

    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.object_type
                .as_deref()
                .map_or(true, |t| t.is_empty() || t == EXPECTED_OBJECT_TYPE)
        })
        .map(|(index, candidate)| ScoredCandidate {
            candidate,
            score: title_score(&candidate.title, &target_key)
                + year_score(candidate.release_year, target_year),
            index,
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    scored
}

/// Pick the best candidate for `(title, year)`, if any is good enough.
pub fn select_best_match<'a>(
    candidates: &'a [SearchCandidate],
    title: &str,
    year: &str,
) -> Option<&'a SearchCandidate> {
    let scored = rank_candidates(candidates, title, year);
    let best = scored.first()?;

    if best.score >= ACCEPT_SCORE || (scored.len() == 1 && best.score >= SOLE_CANDIDATE_SCORE) {
        Some(best.candidate)
    } else {
        None
    }
}

/// Offers of a matched candidate, deduplicated by (technical name, monetization).
pub fn extract_offers(candidate: &SearchCandidate) -> Vec<AvailabilityOffer> {
    let mut seen = HashSet::new();
    candidate
        .offers
        .iter()
        .filter(|offer| {
            seen.insert((
                offer.technical_name.clone(),
                offer.monetization_type.clone(),
            ))
        })
        .cloned()
        .collect()
}

/// Select the best candidate and extract its offers.
///
/// No acceptable candidate is a valid outcome: empty services, no id.
pub fn match_title(candidates: &[SearchCandidate], title: &str, year: &str) -> MatchOutcome {
    match select_best_match(candidates, title, year) {
        Some(best) => MatchOutcome {
            services: extract_offers(best),
            external_id: best.entry_id.clone().filter(|id| !id.is_empty()),
        },
        None => MatchOutcome::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::MonetizationType;

    fn candidate(title: &str, year: Option<i32>) -> SearchCandidate {
        SearchCandidate {
            object_type: Some("MOVIE".to_string()),
            title: title.to_string(),
            release_year: year,
            entry_id: Some(format!("tm-{}-{}", title, year.unwrap_or(0))),
            offers: vec![],
        }
    }

    #[test]
    fn test_exact_year_wins() {
        let candidates = vec![
            candidate("Aftersun", Some(2021)),
            candidate("Aftersun", Some(2022)),
        ];
        let best = select_best_match(&candidates, "Aftersun", "2022").unwrap();
        assert_eq!(best.release_year, Some(2022));

        let ranked = rank_candidates(&candidates, "Aftersun", "2022");
        assert!((ranked[0].score - 2.0).abs() < 1e-9);
        assert!((ranked[1].score - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_off_by_one_year_matches() {
        let candidates = vec![candidate("Obscure Film", Some(1976))];
        let best = select_best_match(&candidates, "Obscure Film", "1975");
        assert!(best.is_some());
    }

    #[test]
    fn test_sole_candidate_floor() {
        // Different title, year far off: 0.5 + 0.0
        let candidates = vec![candidate("Something Else", Some(1950))];
        assert!(select_best_match(&candidates, "Obscure Film", "1975").is_some());
    }

    #[test]
    fn test_two_weak_candidates_rejected() {
        let candidates = vec![
            candidate("Something Else", Some(1950)),
            candidate("Another Thing", None),
        ];
        assert!(select_best_match(&candidates, "Obscure Film", "1975").is_none());
    }

    #[test]
    fn test_ties_keep_upstream_order() {
        let mut first = candidate("Ran", Some(1985));
        first.entry_id = Some("first".to_string());
        let mut second = candidate("Ran", Some(1985));
        second.entry_id = Some("second".to_string());

        let candidates = vec![first, second];
        let best = select_best_match(&candidates, "Ran", "1985").unwrap();
        assert_eq!(best.entry_id.as_deref(), Some("first"));
    }

    #[test]
    fn test_non_movie_candidates_dropped() {
        let mut show = candidate("Twin Peaks", Some(1990));
        show.object_type = Some("SHOW".to_string());
        let mut untyped = candidate("Twin Peaks Fire Walk with Me", Some(1992));
        untyped.object_type = None;

        let candidates = vec![show, untyped];
        let ranked = rank_candidates(&candidates, "Twin Peaks", "1990");
        assert_eq!(ranked.len(), 1);
        // Only the untyped candidate remains: 0.5 + 0.3 as the sole candidate.
        let best = select_best_match(&candidates, "Twin Peaks", "1990").unwrap();
        assert_eq!(best.release_year, Some(1992));
    }

    #[test]
    fn test_unknown_year_scores_title_only() {
        let candidates = vec![candidate("Stalker", Some(1979)), candidate("Stalker", None)];
        let ranked = rank_candidates(&candidates, "Stalker", "");
        assert!(ranked.iter().all(|s| (s.score - 1.0).abs() < 1e-9));
        assert_eq!(ranked[0].index, 0);
    }

    #[test]
    fn test_title_comparison_is_normalized() {
        let candidates = vec![candidate("Dr. Strangelove", Some(1964)), candidate("Dr Strangelove", Some(1950))];
        let ranked = rank_candidates(&candidates, "dr strangelove", "1964");
        assert!((ranked[0].score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_offers_dedup() {
        let mut c = candidate("Stalker", Some(1979));
        c.offers = vec![
            AvailabilityOffer::new("Max", "max", MonetizationType::Flatrate),
            AvailabilityOffer::new("Max", "max", MonetizationType::Flatrate),
            AvailabilityOffer::new("Max", "max", MonetizationType::Ads),
            AvailabilityOffer::new("Apple TV", "itu", MonetizationType::Rent),
        ];
        let offers = extract_offers(&c);
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[2].technical_name, "itu");
    }

    #[test]
    fn test_match_title_no_match_is_empty() {
        let outcome = match_title(&[], "Stalker", "1979");
        assert!(!outcome.is_match());
        assert!(outcome.services.is_empty());
        assert!(outcome.external_id.is_none());
    }
}
