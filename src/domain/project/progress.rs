//! Progress accounting for project bindings.

use serde::Serialize;

use crate::domain::foundation::round_to;

/// Answered versus total active questions of one binding.
///
/// A question counts as answered when any project member's answer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(answered: usize, total: usize) -> Self {
        Self {
            answered: answered.min(total),
            total,
        }
    }

    /// Share answered, 0..=100. A version without questions reports 0.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f64 * 100.0 / self.total as f64
        }
    }

    /// Percentage rounded for display.
    pub fn display_percentage(&self) -> f64 {
        round_to(self.percentage(), 1)
    }

    /// True when every question is answered and there is at least one.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered == self.total
    }
}

/// Unweighted mean of binding percentages; 0 for a project without bindings.
pub fn overall_progress(bindings: &[Progress]) -> f64 {
    if bindings.is_empty() {
        return 0.0;
    }
    bindings.iter().map(Progress::percentage).sum::<f64>() / bindings.len() as f64
}
