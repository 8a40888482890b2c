use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::ResolverConfig;
use crate::models::{CompanyPackage, EmploymentStatus, EntityGroup, RawResponse, StatusBreakdown};
use crate::ratings::round_to;
use crate::resolver::{self, EntityResolver};

pub fn status_breakdown(responses: &[RawResponse]) -> StatusBreakdown {
    let mut counts: BTreeMap<EmploymentStatus, usize> = EmploymentStatus::ordered()
        .into_iter()
        .map(|status| (status, 0))
        .collect();

    for response in responses {
        *counts.entry(response.status).or_insert(0) += 1;
    }

    StatusBreakdown {
        counts,
        total: responses.len(),
    }
}

fn present(name: Option<&String>) -> Option<&str> {
    name.map(|value| value.trim()).filter(|value| !value.is_empty())
}

pub fn employer_groups(responses: &[RawResponse], config: &ResolverConfig) -> Vec<EntityGroup> {
    resolver::resolve_batch(
        responses
            .iter()
            .filter(|response| response.status == EmploymentStatus::Employed)
            .filter_map(|response| present(response.employer_name.as_ref())),
        config,
    )
}

pub fn institution_groups(responses: &[RawResponse], config: &ResolverConfig) -> Vec<EntityGroup> {
    resolver::resolve_batch(
        responses
            .iter()
            .filter(|response| response.status == EmploymentStatus::HigherStudies)
            .filter_map(|response| present(response.institution_name.as_ref())),
        config,
    )
}

pub fn top_recruiters(
    responses: &[RawResponse],
    config: &ResolverConfig,
    limit: usize,
) -> Vec<(String, usize)> {
    resolver::top_n(&employer_groups(responses, config), limit)
}

pub fn top_institutions(
    responses: &[RawResponse],
    config: &ResolverConfig,
    limit: usize,
) -> Vec<(String, usize)> {
    resolver::top_n(&institution_groups(responses, config), limit)
}

/// Mean package per resolved employer, highest first. Respondents without a
/// positive salary still count towards `respondents`.
pub fn average_package_by_company(
    responses: &[RawResponse],
    config: &ResolverConfig,
) -> Vec<CompanyPackage> {
    let mut resolver = EntityResolver::new(config.clone());
    // group index -> (salary sum, salaried count)
    let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();

    for response in responses {
        if response.status != EmploymentStatus::Employed {
            continue;
        }
        let Some(employer) = present(response.employer_name.as_ref()) else {
            continue;
        };

        let group = resolver.resolve_detailed(employer).group();
        let entry = sums.entry(group).or_insert((0.0, 0));
        if let Some(salary) = response.salary.filter(|value| value.is_finite() && *value > 0.0) {
            entry.0 += salary;
            entry.1 += 1;
        }
    }

    // Repeated unnormalizable names are separate groups but one company.
    let mut merged: Vec<(String, usize, f64, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (index, group) in resolver.into_groups().into_iter().enumerate() {
        let (sum, salaried) = sums.get(&index).copied().unwrap_or((0.0, 0));
        match positions.get(&group.canonical_name) {
            Some(position) => {
                let entry = &mut merged[*position];
                entry.1 += group.count;
                entry.2 += sum;
                entry.3 += salaried;
            }
            None => {
                positions.insert(group.canonical_name.clone(), merged.len());
                merged.push((group.canonical_name, group.count, sum, salaried));
            }
        }
    }

    let mut packages: Vec<CompanyPackage> = merged
        .into_iter()
        .map(|(company, respondents, sum, salaried)| CompanyPackage {
            company,
            respondents,
            average_salary: if salaried == 0 {
                0.0
            } else {
                round_to(sum / salaried as f64, 2)
            },
        })
        .collect();

    packages.sort_by(|a, b| {
        b.average_salary
            .partial_cmp(&a.average_salary)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(companies = packages.len(), "average package by company");
    packages
}
