//! Merge-time offer reconciliation.
//!
//! Raw offers are stored as returned by the upstream source; which of them
//! count as "streaming" is decided here, every time the cache merges, so the
//! tables can change without re-crawling.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::{AvailabilityOffer, MonetizationType};

/// Technical-name prefixes of reseller storefronts and channel add-ons.
const RESELLER_PREFIXES: &[&str] = &["amazon", "rokuchannel", "appletv"];

/// First-party services that share a reseller prefix.
static FIRST_PARTY: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["amazon", "amazonprime", "rokuchannel", "appletvplus"].into_iter().collect());

/// Ad-supported tiers that duplicate a subscription offer.
static EXCLUDED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["amazonprimevideowithads", "netflixbasicwithads"].into_iter().collect());

/// Alternate technical names mapped to (canonical technical name, display name).
static SERVICE_ALIASES: Lazy<HashMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| {
        HashMap::from([
            ("plexplayer", ("plex", "Plex")),
            ("justwatchplexchannel", ("plex", "Plex")),
        ])
    });

/// Whether an offer's monetization counts as streaming.
pub fn is_streaming_monetization(monetization: &MonetizationType) -> bool {
    matches!(monetization, MonetizationType::Flatrate | MonetizationType::Free)
}

fn is_reseller(technical_name: &str) -> bool {
    RESELLER_PREFIXES
        .iter()
        .any(|prefix| technical_name.starts_with(prefix))
        && !FIRST_PARTY.contains(technical_name)
}

/// Rename an offer to its canonical service, if it is an alias.
pub fn canonicalize(offer: &AvailabilityOffer) -> AvailabilityOffer {
    match SERVICE_ALIASES.get(offer.technical_name.as_str()) {
        Some((technical_name, name)) => {
            AvailabilityOffer::new(*name, *technical_name, offer.monetization_type.clone())
        }
        None => offer.clone(),
    }
}

/// Reduce raw offers to the streaming offers shown to the user.
///
/// Keeps upstream order and the first offer per canonical service.
/// Applying it to its own output returns the same list.
pub fn reconcile_offers(offers: &[AvailabilityOffer]) -> Vec<AvailabilityOffer> {
    let mut seen = HashSet::new();
    offers
        .iter()
        .filter(|o| is_streaming_monetization(&o.monetization_type))
        .filter(|o| !is_reseller(&o.technical_name))
        .filter(|o| !EXCLUDED.contains(o.technical_name.as_str()))
        .map(canonicalize)
        .filter(|o| seen.insert(o.technical_name.clone()))
        .collect()
}

/// Canonical technical names of reconciled offers.
pub fn service_identifiers(offers: &[AvailabilityOffer]) -> Vec<String> {
    offers.iter().map(|o| o.technical_name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(technical_name: &str, monetization: MonetizationType) -> AvailabilityOffer {
        AvailabilityOffer::new(technical_name.to_uppercase(), technical_name, monetization)
    }

    fn raw_offers() -> Vec<AvailabilityOffer> {
        vec![
            offer("mubi", MonetizationType::Flatrate),
            offer("itunes", MonetizationType::Rent),
            offer("amazonprime", MonetizationType::Flatrate),
            offer("amazonmubi", MonetizationType::Flatrate),
            offer("appletvplus", MonetizationType::Flatrate),
            offer("appletvcriterion", MonetizationType::Flatrate),
            offer("amazonprimevideowithads", MonetizationType::Ads),
            offer("netflixbasicwithads", MonetizationType::Flatrate),
            offer("kanopy", MonetizationType::Free),
            offer("plexplayer", MonetizationType::Free),
            offer("justwatchplexchannel", MonetizationType::Free),
            offer("mubi", MonetizationType::Free),
        ]
    }

    #[test]
    fn test_reconcile_filters_and_orders() {
        let reconciled = reconcile_offers(&raw_offers());
        assert_eq!(
            service_identifiers(&reconciled),
            vec!["mubi", "amazonprime", "appletvplus", "kanopy", "plex"]
        );

        let plex = reconciled.iter().find(|o| o.technical_name == "plex").unwrap();
        assert_eq!(plex.name, "Plex");
        assert_eq!(plex.monetization_type, MonetizationType::Free);
    }

    #[test]
    fn test_reconcile_idempotent() {
        let once = reconcile_offers(&raw_offers());
        let twice = reconcile_offers(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_monetization_dropped() {
        let offers = vec![offer("cinema", MonetizationType::Other("CINEMA".to_string()))];
        assert!(reconcile_offers(&offers).is_empty());
    }

    #[test]
    fn test_first_party_on_reseller_prefix_kept() {
        let offers = vec![
            offer("rokuchannel", MonetizationType::Free),
            offer("amazon", MonetizationType::Flatrate),
            offer("rokuchannelshudder", MonetizationType::Flatrate),
        ];
        assert_eq!(
            service_identifiers(&reconcile_offers(&offers)),
            vec!["rokuchannel", "amazon"]
        );
    }
}
