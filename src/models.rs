use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::attainment::Attainment;
use crate::salary::SalaryBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    HigherStudies,
    Entrepreneur,
    NotEmployed,
}

impl EmploymentStatus {
    pub fn ordered() -> [EmploymentStatus; 4] {
        [
            EmploymentStatus::Employed,
            EmploymentStatus::HigherStudies,
            EmploymentStatus::Entrepreneur,
            EmploymentStatus::NotEmployed,
        ]
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "employed" | "placed" => Some(Self::Employed),
            "higher_studies" | "higher_study" | "studies" => Some(Self::HigherStudies),
            "entrepreneur" | "self_employed" => Some(Self::Entrepreneur),
            "not_employed" | "unemployed" => Some(Self::NotEmployed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::HigherStudies => "higher_studies",
            EmploymentStatus::Entrepreneur => "entrepreneur",
            EmploymentStatus::NotEmployed => "not_employed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "Employed",
            EmploymentStatus::HigherStudies => "Higher studies",
            EmploymentStatus::Entrepreneur => "Entrepreneur",
            EmploymentStatus::NotEmployed => "Not employed",
        }
    }
}

/// `ratings` maps a field name (`po`, `peo`, ...) to its raw JSON text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub id: Uuid,
    pub submitted_at: NaiveDate,
    pub employer_name: Option<String>,
    pub institution_name: Option<String>,
    pub status: EmploymentStatus,
    pub salary: Option<f64>,
    pub ratings: BTreeMap<String, String>,
}

impl RawResponse {
    pub fn new(status: EmploymentStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: NaiveDate::default(),
            employer_name: None,
            institution_name: None,
            status,
            salary: None,
            ratings: BTreeMap::new(),
        }
    }

    pub fn with_employer(mut self, name: &str) -> Self {
        self.employer_name = Some(name.to_string());
        self
    }

    pub fn with_institution(mut self, name: &str) -> Self {
        self.institution_name = Some(name.to_string());
        self
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_ratings(mut self, field: &str, payload: &str) -> Self {
        self.ratings.insert(field.to_string(), payload.to_string());
        self
    }

    pub fn rating_payload(&self, field: &str) -> Option<&str> {
        self.ratings.get(field).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityGroup {
    pub canonical_name: String,
    pub member_raw_names: BTreeSet<String>,
    pub count: usize,
}

impl EntityGroup {
    pub fn new(raw: &str) -> Self {
        let mut member_raw_names = BTreeSet::new();
        member_raw_names.insert(raw.to_string());
        Self {
            canonical_name: raw.to_string(),
            member_raw_names,
            count: 1,
        }
    }

    pub(crate) fn absorb(&mut self, raw: &str) {
        self.count += 1;
        self.member_raw_names.insert(raw.to_string());
    }
}

/// Numeric keys sort before named ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ItemKey {
    Number(u32),
    Name(String),
}

impl ItemKey {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u32>() {
            Ok(number) => ItemKey::Number(number),
            Err(_) => ItemKey::Name(trimmed.to_string()),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Number(number) => write!(f, "{number}"),
            ItemKey::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingDistribution {
    pub counts: BTreeMap<u8, usize>,
    pub total: usize,
    pub percentages: BTreeMap<u8, f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemTally {
    pub sum: u64,
    pub total: usize,
    pub counts: BTreeMap<u8, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item: ItemKey,
    pub average: f64,
    pub level: Attainment,
    pub percentages: BTreeMap<u8, f64>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryStats {
    pub buckets: BTreeMap<SalaryBucket, usize>,
    pub mean: f64,
    pub employed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub counts: BTreeMap<EmploymentStatus, usize>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPackage {
    pub company: String,
    pub respondents: usize,
    pub average_salary: f64,
}
