//! Generation Builder
//!
//! Normalizes a parsed `endpoints` mapping into a [`DatasetGeneration`]:
//! wildcard stripping, lowercasing, CIDR parsing, per-area dedup and the
//! synthetic `any` union. The build is atomic: any invalid prefix or
//! duplicate id fails the whole generation, never part of one.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;

use crate::model::{DatasetGeneration, EndpointRecord, ServiceAreaAggregate, ANY_AREA};
use crate::publication::EndpointSet;
use crate::{EndpointsError, Result};

/// Strip a host pattern through its first `*`, lowercase the rest
///
/// `*.outlook.com` becomes `.outlook.com`; patterns without a wildcard
/// are kept whole. Returns `None` when nothing remains.
fn strip_wildcard(url: &str) -> Option<String> {
    let tail = match url.find('*') {
        Some(pos) => &url[pos + 1..],
        None => url,
    };
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_ascii_lowercase())
    }
}

/// Build one generation from a parsed endpoint-set mapping
///
/// Mapping keys are opaque and discarded; sets are processed in id order
/// so record layout and display-name selection are deterministic.
pub fn build_generation(
    version: &str,
    fetched_at: DateTime<Utc>,
    sets: HashMap<String, EndpointSet>,
) -> Result<DatasetGeneration> {
    let mut ordered: Vec<EndpointSet> = sets.into_values().collect();
    ordered.sort_by_key(|s| s.id);

    let mut seen_ids: HashSet<u32> = HashSet::new();
    let mut records: Vec<EndpointRecord> = Vec::with_capacity(ordered.len());
    let mut areas: HashMap<String, ServiceAreaAggregate> = HashMap::new();
    // First explicit display name per area, first original spelling as fallback
    let mut explicit_names: HashMap<String, String> = HashMap::new();
    let mut fallback_names: HashMap<String, String> = HashMap::new();

    for set in ordered {
        if !seen_ids.insert(set.id) {
            return Err(EndpointsError::DuplicateId(set.id));
        }

        let area_key = set.service_area.to_ascii_lowercase();
        fallback_names
            .entry(area_key.clone())
            .or_insert_with(|| set.service_area.clone());
        if let Some(name) = set.service_area_display_name.as_deref() {
            if !name.is_empty() {
                explicit_names
                    .entry(area_key.clone())
                    .or_insert_with(|| name.to_string());
            }
        }

        let host_patterns: Vec<String> =
            set.urls.iter().filter_map(|u| strip_wildcard(u)).collect();

        let mut networks: Vec<IpNetwork> = Vec::with_capacity(set.ips.len());
        for prefix in &set.ips {
            let net = IpNetwork::from_str(prefix).map_err(|_| EndpointsError::InvalidPrefix {
                id: set.id,
                prefix: prefix.clone(),
            })?;
            networks.push(net);
        }

        let aggregate = areas
            .entry(area_key.clone())
            .or_insert_with(|| ServiceAreaAggregate::new(area_key.clone(), ""));
        aggregate.host_patterns.extend(host_patterns.iter().cloned());
        aggregate.ip_networks.extend(networks.iter().copied());

        records.push(EndpointRecord {
            id: set.id,
            service_area: area_key,
            display_name: set
                .service_area_display_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| set.service_area.clone()),
            host_patterns,
            ip_prefixes: set.ips,
            tcp_ports: set.tcp_ports,
            udp_ports: set.udp_ports,
            category: set.category,
            required: set.required,
            express_route: set.express_route,
            notes: set.notes,
        });
    }

    let mut any = ServiceAreaAggregate::new(ANY_AREA, ANY_AREA);
    for (key, aggregate) in areas.iter_mut() {
        aggregate.display_name = explicit_names
            .get(key)
            .or_else(|| fallback_names.get(key))
            .cloned()
            .unwrap_or_else(|| key.clone());
        any.host_patterns.extend(aggregate.host_patterns.iter().cloned());
        any.ip_networks.extend(aggregate.ip_networks.iter().copied());
    }
    areas.insert(ANY_AREA.to_string(), any);

    Ok(DatasetGeneration {
        version: version.to_string(),
        fetched_at,
        records,
        areas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: u32, area: &str) -> EndpointSet {
        EndpointSet {
            id,
            service_area: area.to_string(),
            service_area_display_name: None,
            urls: Vec::new(),
            ips: Vec::new(),
            tcp_ports: None,
            udp_ports: None,
            category: None,
            required: false,
            notes: None,
            express_route: false,
        }
    }

    fn mapping(sets: Vec<EndpointSet>) -> HashMap<String, EndpointSet> {
        sets.into_iter()
            .map(|s| (format!("key-{}", s.id), s))
            .collect()
    }

    #[test]
    fn test_wildcard_stripping() {
        assert_eq!(strip_wildcard("*.outlook.com").as_deref(), Some(".outlook.com"));
        assert_eq!(strip_wildcard("outlook.office.com").as_deref(), Some("outlook.office.com"));
        assert_eq!(strip_wildcard("a*b*.example.com").as_deref(), Some("b*.example.com"));
        assert_eq!(strip_wildcard("*"), None);
        assert_eq!(strip_wildcard("foo*"), None);
        assert_eq!(strip_wildcard(""), None);
    }

    #[test]
    fn test_patterns_and_areas_lowercased() {
        let mut s = set(1, "Exchange");
        s.urls = vec!["*.Outlook.COM".to_string(), "Outlook.Office.com".to_string()];

        let gen = build_generation("v1", Utc::now(), mapping(vec![s])).unwrap();
        let exchange = gen.area("exchange").unwrap();
        assert!(exchange.host_patterns.contains(".outlook.com"));
        assert!(exchange.host_patterns.contains("outlook.office.com"));
        assert_eq!(gen.records[0].service_area, "exchange");
    }

    #[test]
    fn test_aggregates_union_and_dedup() {
        let mut a = set(1, "Exchange");
        a.urls = vec!["*.outlook.com".to_string()];
        a.ips = vec!["13.107.6.152/31".to_string()];
        let mut b = set(2, "Exchange");
        b.urls = vec!["*.outlook.com".to_string(), "smtp.office365.com".to_string()];
        b.ips = vec!["13.107.6.152/31".to_string(), "13.107.18.10/31".to_string()];
        let mut c = set(3, "Teams");
        c.urls = vec!["teams.microsoft.com".to_string()];

        let gen = build_generation("v1", Utc::now(), mapping(vec![a, b, c])).unwrap();

        let exchange = gen.area("exchange").unwrap();
        assert_eq!(exchange.host_patterns.len(), 2);
        assert_eq!(exchange.ip_networks.len(), 2);

        let any = gen.area(ANY_AREA).unwrap();
        assert_eq!(any.host_patterns.len(), 3);
        assert_eq!(any.ip_networks.len(), 2);
    }

    #[test]
    fn test_invalid_prefix_fails_whole_build() {
        let mut good = set(1, "Exchange");
        good.ips = vec!["13.107.6.152/31".to_string()];
        let mut bad = set(2, "Teams");
        bad.ips = vec!["not-a-prefix".to_string()];

        let err = build_generation("v1", Utc::now(), mapping(vec![good, bad])).unwrap_err();
        match err {
            EndpointsError::InvalidPrefix { id, prefix } => {
                assert_eq!(id, 2);
                assert_eq!(prefix, "not-a-prefix");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bare_ip_prefix_accepted() {
        let mut s = set(1, "Exchange");
        s.ips = vec!["13.107.6.152".to_string()];

        let gen = build_generation("v1", Utc::now(), mapping(vec![s])).unwrap();
        let exchange = gen.area("exchange").unwrap();
        assert!(exchange.matches_ip("13.107.6.152".parse().unwrap()));
        assert!(!exchange.matches_ip("13.107.6.153".parse().unwrap()));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let sets: HashMap<String, EndpointSet> = vec![
            ("a".to_string(), set(7, "Exchange")),
            ("b".to_string(), set(7, "Teams")),
        ]
        .into_iter()
        .collect();

        let err = build_generation("v1", Utc::now(), sets).unwrap_err();
        assert!(matches!(err, EndpointsError::DuplicateId(7)));
    }

    #[test]
    fn test_empty_mapping_builds_empty_generation() {
        let gen = build_generation("v1", Utc::now(), HashMap::new()).unwrap();
        assert!(gen.records.is_empty());
        assert_eq!(gen.version, "v1");

        let any = gen.area(ANY_AREA).unwrap();
        assert!(any.host_patterns.is_empty());
        assert!(any.ip_networks.is_empty());
    }

    #[test]
    fn test_records_sorted_by_id() {
        let gen = build_generation(
            "v1",
            Utc::now(),
            mapping(vec![set(9, "Teams"), set(2, "Exchange"), set(5, "Sway")]),
        )
        .unwrap();
        let ids: Vec<u32> = gen.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_display_name_first_explicit_wins() {
        let mut a = set(1, "Exchange");
        a.service_area_display_name = None;
        let mut b = set(2, "Exchange");
        b.service_area_display_name = Some("Exchange Online".to_string());
        let mut c = set(3, "Exchange");
        c.service_area_display_name = Some("Exchange Legacy".to_string());

        let gen = build_generation("v1", Utc::now(), mapping(vec![a, b, c])).unwrap();
        assert_eq!(gen.area("exchange").unwrap().display_name, "Exchange Online");
    }

    #[test]
    fn test_display_name_falls_back_to_original_spelling() {
        let gen = build_generation("v1", Utc::now(), mapping(vec![set(1, "Exchange")])).unwrap();
        assert_eq!(gen.area("exchange").unwrap().display_name, "Exchange");
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let make = || {
            let mut a = set(1, "Exchange");
            a.urls = vec!["*.outlook.com".to_string(), "outlook.office.com".to_string()];
            a.ips = vec!["13.107.6.152/31".to_string()];
            let mut b = set(2, "Teams");
            b.urls = vec!["teams.microsoft.com".to_string()];
            b.ips = vec!["52.112.0.0/14".to_string()];
            mapping(vec![a, b])
        };

        let first = build_generation("v1", Utc::now(), make()).unwrap();
        let second = build_generation("v1", Utc::now(), make()).unwrap();

        for (key, agg) in &first.areas {
            let other = second.areas.get(key).unwrap();
            assert_eq!(agg.host_patterns, other.host_patterns);
            assert_eq!(agg.ip_networks, other.ip_networks);
        }
        let first_ids: Vec<u32> = first.records.iter().map(|r| r.id).collect();
        let second_ids: Vec<u32> = second.records.iter().map(|r| r.id).collect();
        assert_eq!(first_ids, second_ids);
    }
}
