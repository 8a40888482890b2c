use std::collections::HashMap;

use tracing::debug;

use crate::config::ResolverConfig;
use crate::models::EntityGroup;
use crate::normalize::NormalizedName;
use crate::similarity::similarity_percent;

/// Implementations must yield indices in creation order and must not omit a
/// group that any matching rule could select.
pub trait CandidateIndex {
    fn register(&mut self, group: usize, name: &NormalizedName);
    fn candidates(&self, name: &NormalizedName) -> Vec<usize>;
}

/// Every group is a candidate. O(n) per name, O(n^2) per batch.
#[derive(Debug, Default, Clone)]
pub struct LinearScan {
    len: usize,
}

impl CandidateIndex for LinearScan {
    fn register(&mut self, group: usize, _name: &NormalizedName) {
        self.len = self.len.max(group + 1);
    }

    fn candidates(&self, _name: &NormalizedName) -> Vec<usize> {
        (0..self.len).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    Substring,
    Similarity,
    Acronym,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { group: usize, rule: MatchRule },
    Created { group: usize },
    /// Nothing identifying survived normalisation; the raw name stands alone.
    Singleton { group: usize },
}

impl Resolution {
    pub fn group(&self) -> usize {
        match self {
            Resolution::Matched { group, .. }
            | Resolution::Created { group }
            | Resolution::Singleton { group } => *group,
        }
    }
}

/// Canonical names are first-seen, so callers must present names in a stable order.
#[derive(Debug)]
pub struct EntityResolver<I = LinearScan> {
    config: ResolverConfig,
    groups: Vec<EntityGroup>,
    // Normalised canonical names, `None` for singleton groups.
    keys: Vec<Option<NormalizedName>>,
    index: I,
}

impl EntityResolver<LinearScan> {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_index(config, LinearScan::default())
    }
}

impl Default for EntityResolver<LinearScan> {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl<I: CandidateIndex> EntityResolver<I> {
    pub fn with_index(config: ResolverConfig, index: I) -> Self {
        Self {
            config,
            groups: Vec::new(),
            keys: Vec::new(),
            index,
        }
    }

    pub fn resolve(&mut self, raw: &str) -> &str {
        let group = self.resolve_detailed(raw).group();
        &self.groups[group].canonical_name
    }

    pub fn resolve_detailed(&mut self, raw: &str) -> Resolution {
        let Some(name) = NormalizedName::from_raw(raw) else {
            let group = self.push_group(raw, None);
            return Resolution::Singleton { group };
        };

        if let Some((group, rule)) = self.find_match(&name) {
            self.groups[group].absorb(raw);
            return Resolution::Matched { group, rule };
        }

        let group = self.push_group(raw, Some(name));
        Resolution::Created { group }
    }

    fn push_group(&mut self, raw: &str, name: Option<NormalizedName>) -> usize {
        let group = self.groups.len();
        self.groups.push(EntityGroup::new(raw));
        if let Some(name) = &name {
            self.index.register(group, name);
        }
        self.keys.push(name);
        group
    }

    fn find_match(&self, name: &NormalizedName) -> Option<(usize, MatchRule)> {
        let candidates: Vec<(usize, &NormalizedName)> = self
            .index
            .candidates(name)
            .into_iter()
            .filter_map(|group| {
                self.keys
                    .get(group)
                    .and_then(Option::as_ref)
                    .map(|key| (group, key))
            })
            .collect();

        if let Some((group, _)) = candidates.iter().find(|(_, key)| key.key == name.key) {
            return Some((*group, MatchRule::Exact));
        }

        if let Some((group, _)) = candidates
            .iter()
            .find(|(_, key)| key.key.contains(&name.key) || name.key.contains(&key.key))
        {
            return Some((*group, MatchRule::Substring));
        }

        let mut best: Option<(usize, f64)> = None;
        for (group, key) in &candidates {
            let score = similarity_percent(&name.key, &key.key);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((*group, score));
            }
        }
        if let Some((group, score)) = best {
            if score > self.config.similarity_threshold {
                return Some((group, MatchRule::Similarity));
            }
        }

        candidates
            .iter()
            .find(|(_, key)| self.acronyms_match(name, key))
            .map(|(group, _)| (*group, MatchRule::Acronym))
    }

    fn acronyms_match(&self, a: &NormalizedName, b: &NormalizedName) -> bool {
        let min = self.config.min_acronym_len.max(1);
        let long_enough = |value: &str| value.chars().count() >= min;

        if long_enough(&a.acronym) && a.acronym == b.acronym {
            return true;
        }
        // "TCS" against "Tata Consultancy Services", in either order.
        (a.is_single_token() && long_enough(&a.key) && a.key == b.expanded_acronym)
            || (b.is_single_token() && long_enough(&b.key) && b.key == a.expanded_acronym)
    }

    pub fn groups(&self) -> &[EntityGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<EntityGroup> {
        debug!(groups = self.groups.len(), "entity resolution finished");
        self.groups
    }
}

pub fn resolve_batch<'a, T>(names: T, config: &ResolverConfig) -> Vec<EntityGroup>
where
    T: IntoIterator<Item = &'a str>,
{
    let mut resolver = EntityResolver::new(config.clone());
    for name in names {
        resolver.resolve(name);
    }
    resolver.into_groups()
}

/// `(canonical_name, count)` sorted by count descending, ties in first-seen
/// order. Singleton groups sharing a raw name are counted as one entry.
pub fn ranking(groups: &[EntityGroup]) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for group in groups {
        match positions.get(group.canonical_name.as_str()) {
            Some(position) => ranked[*position].1 += group.count,
            None => {
                positions.insert(&group.canonical_name, ranked.len());
                ranked.push((group.canonical_name.clone(), group.count));
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn top_n(groups: &[EntityGroup], n: usize) -> Vec<(String, usize)> {
    let mut ranked = ranking(groups);
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acronym_joins_full_name() {
        let mut resolver = EntityResolver::new(ResolverConfig::default());
        assert_eq!(
            resolver.resolve_detailed("Tata Consultancy Services"),
            Resolution::Created { group: 0 }
        );
        assert_eq!(
            resolver.resolve_detailed("TCS"),
            Resolution::Matched {
                group: 0,
                rule: MatchRule::Acronym
            }
        );
        assert_eq!(
            resolver.resolve_detailed("Tata Consultancy Services Pvt Ltd"),
            Resolution::Matched {
                group: 0,
                rule: MatchRule::Exact
            }
        );
        let groups = resolver.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_name, "Tata Consultancy Services");
        assert_eq!(groups[0].count, 3);
    }

    #[test]
    fn acronym_first_still_clusters() {
        let groups = resolve_batch(["TCS", "Tata Consultancy Services"], &ResolverConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical_name, "TCS");
    }

    #[test]
    fn substring_matches_either_direction() {
        let mut resolver = EntityResolver::new(ResolverConfig::default());
        resolver.resolve("Zoho");
        assert_eq!(
            resolver.resolve_detailed("Zoho Health"),
            Resolution::Matched {
                group: 0,
                rule: MatchRule::Substring
            }
        );
    }

    #[test]
    fn similarity_catches_typos() {
        let mut resolver = EntityResolver::new(ResolverConfig::default());
        resolver.resolve("Cognizant");
        assert_eq!(
            resolver.resolve_detailed("Cognizent Technology Solutions"),
            Resolution::Matched {
                group: 0,
                rule: MatchRule::Similarity
            }
        );
    }

    #[test]
    fn similarity_threshold_is_configurable() {
        let strict = ResolverConfig::default()
            .with_similarity_threshold(95.0)
            .expect("valid threshold");
        let groups = resolve_batch(["Cognizant", "Cognizent"], &strict);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn unnormalizable_names_are_singletons() {
        let mut resolver = EntityResolver::new(ResolverConfig::default());
        assert_eq!(
            resolver.resolve_detailed("Software Solutions"),
            Resolution::Singleton { group: 0 }
        );
        assert_eq!(
            resolver.resolve_detailed("Software Solutions"),
            Resolution::Singleton { group: 1 }
        );
        assert_eq!(resolver.resolve("Accenture"), "Accenture");
        assert_eq!(resolver.groups().len(), 3);
    }

    #[test]
    fn distinct_companies_stay_apart() {
        let groups = resolve_batch(
            ["Wipro", "Accenture", "Zoho", "Freshworks"],
            &ResolverConfig::default(),
        );
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn ranking_orders_by_count_then_first_seen() {
        let groups = resolve_batch(
            ["Wipro", "Zoho", "Zoho Corp", "Wipro Ltd", "Accenture"],
            &ResolverConfig::default(),
        );
        assert_eq!(
            ranking(&groups),
            vec![
                ("Wipro".to_string(), 2),
                ("Zoho".to_string(), 2),
                ("Accenture".to_string(), 1),
            ]
        );
        assert_eq!(top_n(&groups, 1), vec![("Wipro".to_string(), 2)]);
    }

    #[test]
    fn shared_initials_do_not_merge_different_employers() {
        let groups = resolve_batch(["Tata Motors", "Tech Mahindra"], &ResolverConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].canonical_name, "Tata Motors");
        assert_eq!(groups[1].canonical_name, "Tech Mahindra");

        let groups = resolve_batch(
            ["Tata Consultancy Services", "Tata Motors", "TCS", "Tech Mahindra"],
            &ResolverConfig::default(),
        );
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].count, 2);
        assert!(groups[0].member_raw_names.contains("TCS"));
    }

    #[test]
    fn equal_normalized_acronyms_still_match() {
        let mut resolver = EntityResolver::new(ResolverConfig::default());
        resolver.resolve("Hindustan Computers Limited");
        assert_eq!(
            resolver.resolve_detailed("Hind. Comp."),
            Resolution::Matched {
                group: 0,
                rule: MatchRule::Acronym
            }
        );
    }

    #[test]
    fn ranking_merges_repeated_singletons() {
        let groups = resolve_batch(
            ["Software Solutions", "Wipro", "Software Solutions", "Wipro Ltd", "Zoho"],
            &ResolverConfig::default(),
        );
        assert_eq!(groups.len(), 4);
        assert_eq!(
            ranking(&groups),
            vec![
                ("Software Solutions".to_string(), 2),
                ("Wipro".to_string(), 2),
                ("Zoho".to_string(), 1),
            ]
        );
    }

    /// Hands out only the groups it was told about, from its own list.
    #[derive(Default)]
    struct RegisteredGroups {
        groups: Vec<usize>,
        lookups: std::cell::Cell<usize>,
    }

    impl CandidateIndex for RegisteredGroups {
        fn register(&mut self, group: usize, _name: &NormalizedName) {
            self.groups.push(group);
        }

        fn candidates(&self, _name: &NormalizedName) -> Vec<usize> {
            self.lookups.set(self.lookups.get() + 1);
            self.groups.clone()
        }
    }

    #[test]
    fn custom_index_gives_same_clusters() {
        let names = [
            "Tata Consultancy Services",
            "Software Solutions",
            "TCS",
            "Infosys",
            "Cognizent",
            "infosys ltd",
            "Cognizant",
            "Tech Mahindra",
            "Tata Motors",
        ];

        let mut resolver =
            EntityResolver::with_index(ResolverConfig::default(), RegisteredGroups::default());
        for name in names {
            resolver.resolve(name);
        }
        assert_eq!(resolver.index.lookups.get(), names.len() - 1);
        assert_eq!(resolver.index.groups, vec![0, 2, 3, 4, 5]);

        let expected = resolve_batch(names, &ResolverConfig::default());
        assert_eq!(resolver.into_groups(), expected);
    }

    #[test]
    fn pasted_paragraphs_resolve_quickly() {
        let first = "acme widgets ".repeat(400);
        let second = "zenith gadgets ".repeat(400);
        let started = std::time::Instant::now();
        let groups = resolve_batch([first.as_str(), second.as_str()], &ResolverConfig::default());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(groups.len(), 2);
    }
}
