//! Maturity buckets for public (0..100) and project (0..5) scores.

use serde::Serialize;
use std::fmt;

/// Maturity bucket of a public percentage. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MaturityLevel {
    Initial,
    Developing,
    Defined,
    Managed,
    Optimized,
}

impl MaturityLevel {
    pub fn from_percentage(score: f64) -> Self {
        if score >= 80.0 {
            MaturityLevel::Optimized
        } else if score >= 60.0 {
            MaturityLevel::Managed
        } else if score >= 40.0 {
            MaturityLevel::Defined
        } else if score >= 20.0 {
            MaturityLevel::Developing
        } else {
            MaturityLevel::Initial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Initial => "Initial",
            MaturityLevel::Developing => "Developing",
            MaturityLevel::Defined => "Defined",
            MaturityLevel::Managed => "Managed",
            MaturityLevel::Optimized => "Optimized",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maturity bucket of a project score on the 0..5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProjectMaturity {
    Nonexistent,
    Initial,
    Basic,
    Intermediate,
    Advanced,
    Optimized,
}

impl ProjectMaturity {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.5 {
            ProjectMaturity::Optimized
        } else if score >= 3.5 {
            ProjectMaturity::Advanced
        } else if score >= 2.5 {
            ProjectMaturity::Intermediate
        } else if score >= 1.5 {
            ProjectMaturity::Basic
        } else if score >= 0.5 {
            ProjectMaturity::Initial
        } else {
            ProjectMaturity::Nonexistent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectMaturity::Nonexistent => "Nonexistent",
            ProjectMaturity::Initial => "Initial",
            ProjectMaturity::Basic => "Basic",
            ProjectMaturity::Intermediate => "Intermediate",
            ProjectMaturity::Advanced => "Advanced",
            ProjectMaturity::Optimized => "Optimized",
        }
    }
}

impl fmt::Display for ProjectMaturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_boundaries_are_inclusive() {
        assert_eq!(MaturityLevel::from_percentage(20.0), MaturityLevel::Developing);
        assert_eq!(MaturityLevel::from_percentage(40.0), MaturityLevel::Defined);
        assert_eq!(MaturityLevel::from_percentage(60.0), MaturityLevel::Managed);
        assert_eq!(MaturityLevel::from_percentage(80.0), MaturityLevel::Optimized);
        assert_eq!(MaturityLevel::from_percentage(19.999), MaturityLevel::Initial);
        assert_eq!(MaturityLevel::from_percentage(0.0), MaturityLevel::Initial);
        assert_eq!(MaturityLevel::from_percentage(100.0), MaturityLevel::Optimized);
    }

    #[test]
    fn project_boundaries_are_inclusive() {
        assert_eq!(ProjectMaturity::from_score(0.49), ProjectMaturity::Nonexistent);
        assert_eq!(ProjectMaturity::from_score(0.5), ProjectMaturity::Initial);
        assert_eq!(ProjectMaturity::from_score(1.5), ProjectMaturity::Basic);
        assert_eq!(ProjectMaturity::from_score(2.5), ProjectMaturity::Intermediate);
        assert_eq!(ProjectMaturity::from_score(3.5), ProjectMaturity::Advanced);
        assert_eq!(ProjectMaturity::from_score(4.5), ProjectMaturity::Optimized);
    }
}
