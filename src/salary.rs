use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{EmploymentStatus, RawResponse, SalaryStats};
use crate::ratings::round_to;

/// Lakhs per annum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SalaryBucket {
    UpToThree,
    ThreeToSix,
    SixToTen,
    AboveTen,
}

impl SalaryBucket {
    pub fn ordered() -> [SalaryBucket; 4] {
        [
            SalaryBucket::UpToThree,
            SalaryBucket::ThreeToSix,
            SalaryBucket::SixToTen,
            SalaryBucket::AboveTen,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalaryBucket::UpToThree => "0-3 LPA",
            SalaryBucket::ThreeToSix => "3-6 LPA",
            SalaryBucket::SixToTen => "6-10 LPA",
            SalaryBucket::AboveTen => "10+ LPA",
        }
    }
}

/// `[0,3]`, `(3,6]`, `(6,10]`, `(10,inf)`. Negative values fall in the
/// lowest bucket.
pub fn bucket(salary: f64) -> SalaryBucket {
    if salary <= 3.0 {
        SalaryBucket::UpToThree
    } else if salary <= 6.0 {
        SalaryBucket::ThreeToSix
    } else if salary <= 10.0 {
        SalaryBucket::SixToTen
    } else {
        SalaryBucket::AboveTen
    }
}

#[derive(Debug, Clone, Default)]
pub struct SalaryAccumulator {
    buckets: BTreeMap<SalaryBucket, usize>,
    sum: f64,
    employed_count: usize,
}

impl SalaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite or negative values are ignored. Zero is bucketed but does
    /// not count towards the mean.
    pub fn accumulate(&mut self, salary: f64) {
        if !salary.is_finite() || salary < 0.0 {
            return;
        }

        *self.buckets.entry(bucket(salary)).or_insert(0) += 1;
        if salary > 0.0 {
            self.sum += salary;
            self.employed_count += 1;
        }
    }

    pub fn finish(self) -> SalaryStats {
        let mut buckets = self.buckets;
        for bucket in SalaryBucket::ordered() {
            buckets.entry(bucket).or_insert(0);
        }

        let mean = if self.employed_count == 0 {
            0.0
        } else {
            round_to(self.sum / self.employed_count as f64, 2)
        };

        SalaryStats {
            buckets,
            mean,
            employed_count: self.employed_count,
        }
    }
}

pub fn salary_stats(responses: &[RawResponse]) -> SalaryStats {
    let mut accumulator = SalaryAccumulator::new();
    for response in responses {
        if response.status != EmploymentStatus::Employed {
            continue;
        }
        if let Some(salary) = response.salary {
            accumulator.accumulate(salary);
        }
    }
    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges_are_inclusive_on_the_right() {
        assert_eq!(bucket(0.0), SalaryBucket::UpToThree);
        assert_eq!(bucket(3.0), SalaryBucket::UpToThree);
        assert_eq!(bucket(3.01), SalaryBucket::ThreeToSix);
        assert_eq!(bucket(6.0), SalaryBucket::ThreeToSix);
        assert_eq!(bucket(10.0), SalaryBucket::SixToTen);
        assert_eq!(bucket(10.5), SalaryBucket::AboveTen);
    }

    #[test]
    fn mean_ignores_zero_packages() {
        let mut accumulator = SalaryAccumulator::new();
        accumulator.accumulate(4.0);
        accumulator.accumulate(0.0);
        accumulator.accumulate(7.0);
        let stats = accumulator.finish();
        assert_eq!(stats.employed_count, 2);
        assert!((stats.mean - 5.5).abs() < 1e-9);
        assert_eq!(stats.buckets[&SalaryBucket::UpToThree], 1);
        assert_eq!(stats.buckets[&SalaryBucket::ThreeToSix], 1);
        assert_eq!(stats.buckets[&SalaryBucket::SixToTen], 1);
        assert_eq!(stats.buckets[&SalaryBucket::AboveTen], 0);
    }

    #[test]
    fn empty_input_has_zero_mean() {
        let stats = salary_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.employed_count, 0);
        assert_eq!(stats.buckets.values().sum::<usize>(), 0);
        assert_eq!(stats.buckets.len(), 4);
    }

    #[test]
    fn only_employed_respondents_count() {
        let responses = vec![
            RawResponse::new(EmploymentStatus::Employed).with_salary(3.333),
            RawResponse::new(EmploymentStatus::Employed).with_salary(f64::NAN),
            RawResponse::new(EmploymentStatus::HigherStudies).with_salary(12.0),
            RawResponse::new(EmploymentStatus::Employed),
        ];
        let stats = salary_stats(&responses);
        assert_eq!(stats.employed_count, 1);
        assert_eq!(stats.mean, 3.33);
    }
}
