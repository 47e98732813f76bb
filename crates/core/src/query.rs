//! Read-only queries over the merged catalog: filters, free-text search,
//! random picks and aggregate statistics.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::availability::MonetizationType;
use crate::catalog::CatalogItem;

/// `streaming_service` value selecting the user's own services.
pub const MY_SERVICES: &str = "__my__";

/// Number of entries kept in top-N distributions.
const TOP_N: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("No search query provided")]
    MissingQuery,

    #[error("No items match the selected filters")]
    NoMatch,
}

/// Filters accepted by the list, search and random endpoints.
///
/// All fields are raw query-string values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    /// `"true"` (any case) hides watched items.
    #[serde(default)]
    pub hide_watched: Option<String>,
    /// Comma-separated service identifiers, or `__my__`.
    #[serde(default)]
    pub streaming_service: Option<String>,
    /// Decade label such as `"1970s"`.
    #[serde(default)]
    pub decade: Option<String>,
    /// Case-insensitive exact country.
    #[serde(default)]
    pub country: Option<String>,
    /// Case-insensitive director substring.
    #[serde(default)]
    pub director: Option<String>,
}

impl CatalogFilter {
    pub fn hides_watched(&self) -> bool {
        self.hide_watched
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Decade label for a year string, e.g. `"1979"` -> `"1970s"`.
pub fn decade_of(year: &str) -> Option<String> {
    let year: i64 = year.trim().parse().ok()?;
    Some(format!("{}s", year.div_euclid(10) * 10))
}

fn has_any_service(item: &CatalogItem, services: &HashSet<String>) -> bool {
    item.streaming_services.iter().any(|s| services.contains(s))
}

/// Apply every set filter, in order, keeping catalog order.
///
/// `my_services` is consulted only for `streaming_service=__my__`; when it is
/// empty, that filter keeps items with any service.
pub fn apply_filters(
    mut items: Vec<Arc<CatalogItem>>,
    filter: &CatalogFilter,
    my_services: &HashSet<String>,
) -> Vec<Arc<CatalogItem>> {
    if filter.hides_watched() {
        items.retain(|item| !item.watched);
    }

    if let Some(streaming) = non_empty(&filter.streaming_service) {
        if streaming == MY_SERVICES {
            if my_services.is_empty() {
                items.retain(|item| !item.streaming_services.is_empty());
            } else {
                items.retain(|item| has_any_service(item, my_services));
            }
        } else {
            let requested: HashSet<String> = streaming
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect();
            items.retain(|item| has_any_service(item, &requested));
        }
    }

    if let Some(decade) = non_empty(&filter.decade) {
        items.retain(|item| decade_of(&item.year).as_deref() == Some(decade));
    }

    if let Some(country) = non_empty(&filter.country) {
        let country = country.to_lowercase();
        items.retain(|item| item.country.to_lowercase() == country);
    }

    if let Some(director) = non_empty(&filter.director) {
        let director = director.to_lowercase();
        items.retain(|item| item.director.to_lowercase().contains(&director));
    }

    items
}

/// Whether the lowercase `query` occurs in title, director, country or year.
pub fn matches_text(item: &CatalogItem, query: &str) -> bool {
    [&item.title, &item.director, &item.country, &item.year]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

/// Items whose text fields contain `query` (case-insensitive).
pub fn text_search(
    items: Vec<Arc<CatalogItem>>,
    query: &str,
) -> Result<Vec<Arc<CatalogItem>>, QueryError> {
    if query.is_empty() {
        return Err(QueryError::MissingQuery);
    }
    Ok(prefilter_text(items, Some(query)))
}

/// Narrow by free text when a non-empty query is given.
pub fn prefilter_text(
    mut items: Vec<Arc<CatalogItem>>,
    query: Option<&str>,
) -> Vec<Arc<CatalogItem>> {
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        let query = query.to_lowercase();
        items.retain(|item| matches_text(item, &query));
    }
    items
}

/// Pick one item uniformly at random.
pub fn pick_random<R: Rng + ?Sized>(
    items: &[Arc<CatalogItem>],
    rng: &mut R,
) -> Result<Arc<CatalogItem>, QueryError> {
    items.choose(rng).cloned().ok_or(QueryError::NoMatch)
}

/// Counter preserving first-seen order among equal counts.
#[derive(Default)]
struct Tally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    /// Most common first; ties keep first-seen order.
    fn most_common(self, limit: Option<usize>) -> Vec<(String, usize)> {
        let Tally { order, mut counts } = self;
        let mut entries: Vec<(String, usize)> = order
            .into_iter()
            .map(|key| {
                let count = counts.remove(&key).unwrap_or_default();
                (key, count)
            })
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }
}

/// A name with its number of catalog items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

fn name_counts(entries: Vec<(String, usize)>) -> Vec<NameCount> {
    entries
        .into_iter()
        .map(|(name, count)| NameCount { name, count })
        .collect()
}

/// Directors with item counts, most common first.
pub fn director_counts(items: &[Arc<CatalogItem>]) -> Vec<NameCount> {
    let mut tally = Tally::default();
    for item in items {
        let director = item.director.trim();
        if !director.is_empty() {
            tally.add(director);
        }
    }
    name_counts(tally.most_common(None))
}

/// Countries with item counts, most common first.
pub fn country_counts(items: &[Arc<CatalogItem>]) -> Vec<NameCount> {
    let mut tally = Tally::default();
    for item in items {
        let country = item.country.trim();
        if !country.is_empty() {
            tally.add(country);
        }
    }
    name_counts(tally.most_common(None))
}

/// Aggregate statistics over the catalog.
///
/// Distributions serialize as `[name, count]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_movies: usize,
    pub watched_count: usize,
    pub unwatched_count: usize,
    pub watched_percentage: f64,
    pub decade_distribution: Vec<(String, usize)>,
    pub country_distribution: Vec<(String, usize)>,
    pub director_distribution: Vec<(String, usize)>,
    pub avg_year: Option<i64>,
    pub median_year: Option<i64>,
    pub oldest_year: Option<i64>,
    pub newest_year: Option<i64>,
    pub watched_by_decade: Vec<(String, usize)>,
    pub watched_by_country: Vec<(String, usize)>,
    pub watched_by_director: Vec<(String, usize)>,
}

pub fn compute_stats(items: &[Arc<CatalogItem>]) -> CatalogStats {
    let total = items.len();
    let watched_count = items.iter().filter(|i| i.watched).count();

    let mut decades: BTreeMap<String, usize> = BTreeMap::new();
    let mut watched_decades: BTreeMap<String, usize> = BTreeMap::new();
    let mut countries = Tally::default();
    let mut watched_countries = Tally::default();
    let mut directors = Tally::default();
    let mut watched_directors = Tally::default();
    let mut years: Vec<i64> = Vec::new();

    for item in items {
        if let Some(decade) = decade_of(&item.year) {
            if item.watched {
                *watched_decades.entry(decade.clone()).or_default() += 1;
            }
            *decades.entry(decade).or_default() += 1;
        }

        let country = item.country.trim();
        if !country.is_empty() {
            countries.add(country);
            if item.watched {
                watched_countries.add(country);
            }
        }

        let director = item.director.trim();
        if !director.is_empty() {
            directors.add(director);
            if item.watched {
                watched_directors.add(director);
            }
        }

        if !item.year.is_empty() && item.year.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = item.year.parse() {
                years.push(year);
            }
        }
    }

    years.sort_unstable();
    let avg_year = (!years.is_empty()).then(|| {
        let mean = years.iter().sum::<i64>() as f64 / years.len() as f64;
        mean.round_ties_even() as i64
    });

    CatalogStats {
        total_movies: total,
        watched_count,
        unwatched_count: total - watched_count,
        watched_percentage: if total > 0 {
            (watched_count as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        },
        decade_distribution: decades.into_iter().collect(),
        country_distribution: countries.most_common(Some(TOP_N)),
        director_distribution: directors.most_common(Some(TOP_N)),
        avg_year,
        median_year: years.get(years.len() / 2).copied(),
        oldest_year: years.first().copied(),
        newest_year: years.last().copied(),
        watched_by_decade: watched_decades.into_iter().collect(),
        watched_by_country: watched_countries.most_common(Some(TOP_N)),
        watched_by_director: watched_directors.most_common(Some(TOP_N)),
    }
}

/// A streaming service with how many items it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub name: String,
    pub technical_name: String,
    pub monetization_type: MonetizationType,
    pub count: usize,
}

/// Values available for each filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub decades: Vec<String>,
    pub countries: Vec<NameCount>,
    pub directors: Vec<NameCount>,
    pub streaming_services: Vec<ServiceCount>,
}

pub fn filter_options(items: &[Arc<CatalogItem>]) -> FilterOptions {
    let mut decades = BTreeSet::new();
    let mut services = Tally::default();
    // Display name -> (technical name, monetization), last seen wins.
    let mut service_meta: HashMap<String, (String, MonetizationType)> = HashMap::new();

    for item in items {
        if let Some(decade) = decade_of(&item.year) {
            decades.insert(decade);
        }
        for offer in &item.streaming_services_full {
            services.add(&offer.name);
            service_meta.insert(
                offer.name.clone(),
                (offer.technical_name.clone(), offer.monetization_type.clone()),
            );
        }
    }

    let streaming_services = services
        .most_common(None)
        .into_iter()
        .filter_map(|(name, count)| {
            let (technical_name, monetization_type) = service_meta.remove(&name)?;
            Some(ServiceCount {
                name,
                technical_name,
                monetization_type,
                count,
            })
        })
        .collect();

    FilterOptions {
        decades: decades.into_iter().collect(),
        countries: country_counts(items),
        directors: director_counts(items),
        streaming_services,
    }
}
