//! Title normalization and alternate-title aliasing.
//!
//! Normalized keys are what the seen-list, the availability matcher and the
//! alias table compare on. Raw display titles are never compared directly
//! outside of snapshot diffing.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Alias groups: canonical normalized title -> alternate normalized titles.
const ALTERNATE_TITLES: &[(&str, &[&str])] = &[(
    "dr strangelove",
    &["dr strangelove or how i learned to stop worrying and love the bomb"],
)];

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Every member of an alias group mapped to the index of its group.
static ALIAS_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (group, (canonical, alternates)) in ALTERNATE_TITLES.iter().enumerate() {
        index.insert(*canonical, group);
        for alt in alternates.iter() {
            index.insert(*alt, group);
        }
    }
    index
});

/// Canonicalize a display title into a comparable key.
///
/// Lowercases, strips everything that is not an ASCII letter, digit or
/// whitespace, collapses whitespace runs and trims. Unicode whitespace counts
/// as whitespace.
pub fn normalize(title: &str) -> String {
    let lowered: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Expand a normalized key to its whole alias group.
///
/// Always contains `key` itself. Looking up any member of a group yields the
/// same set.
pub fn alias_closure(key: &str) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    variants.insert(key.to_string());

    if let Some(&group) = ALIAS_INDEX.get(key) {
        let (canonical, alternates) = ALTERNATE_TITLES[group];
        variants.insert(canonical.to_string());
        variants.extend(alternates.iter().map(|a| a.to_string()));
    }

    variants
}
