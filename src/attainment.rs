use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    #[default]
    FivePoint,
    TenPoint,
}

impl RatingScale {
    pub fn min(&self) -> u8 {
        match self {
            RatingScale::FivePoint => 1,
            RatingScale::TenPoint => 0,
        }
    }

    pub fn max(&self) -> u8 {
        match self {
            RatingScale::FivePoint => 5,
            RatingScale::TenPoint => 10,
        }
    }

    pub fn values(&self) -> std::ops::RangeInclusive<u8> {
        self.min()..=self.max()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttainmentLevel {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl AttainmentLevel {
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            AttainmentLevel::Excellent
        } else if average >= 4.0 {
            AttainmentLevel::VeryGood
        } else if average >= 3.5 {
            AttainmentLevel::Good
        } else if average >= 3.0 {
            AttainmentLevel::Satisfactory
        } else {
            AttainmentLevel::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttainmentLevel::Excellent => "Excellent",
            AttainmentLevel::VeryGood => "Very Good",
            AttainmentLevel::Good => "Good",
            AttainmentLevel::Satisfactory => "Satisfactory",
            AttainmentLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Ten-point class-committee bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitteeBand {
    High,
    Medium,
    Low,
}

impl CommitteeBand {
    pub fn from_average(average: f64) -> Self {
        if average >= 8.0 {
            CommitteeBand::High
        } else if average >= 6.0 {
            CommitteeBand::Medium
        } else {
            CommitteeBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CommitteeBand::High => "Excellent",
            CommitteeBand::Medium => "Good",
            CommitteeBand::Low => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Attainment {
    FivePoint(AttainmentLevel),
    TenPoint(CommitteeBand),
}

impl Attainment {
    pub fn label(&self) -> &'static str {
        match self {
            Attainment::FivePoint(level) => level.label(),
            Attainment::TenPoint(band) => band.label(),
        }
    }
}

impl fmt::Display for Attainment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(average: f64, scale: RatingScale) -> Attainment {
    match scale {
        RatingScale::FivePoint => Attainment::FivePoint(AttainmentLevel::from_average(average)),
        RatingScale::TenPoint => Attainment::TenPoint(CommitteeBand::from_average(average)),
    }
}
