//! Aggregate statistics over sets of completed public assessments.

use serde::Serialize;

use super::PublicScores;
use crate::domain::foundation::{round_to, Timestamp};

/// One completed public assessment as seen by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSample {
    pub scores: PublicScores,
    pub completed_at: Timestamp,
}

/// Per-domain aggregate across the included assessments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainAggregate {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Number of responses that fed this domain across all assessments.
    pub count: usize,
}

/// Aggregate over a `(type, group_tag)` selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub total_count: usize,
    pub mean_overall: f64,
    pub min_overall: f64,
    pub max_overall: f64,
    pub first_completed_at: Option<Timestamp>,
    pub last_completed_at: Option<Timestamp>,
    pub domains: Vec<DomainAggregate>,
}

struct DomainAccumulator {
    name: String,
    scores: Vec<f64>,
    count: usize,
}

/// Computes the aggregate. Domains are keyed by name so that assessments
/// taken against different versions of a type line up; a domain takes part
/// for an assessment only if it received at least one response there.
/// Domains are sorted by mean descending, ties kept in first-seen order.
pub fn aggregate(samples: &[GroupSample]) -> GroupStatistics {
    if samples.is_empty() {
        return GroupStatistics {
            total_count: 0,
            mean_overall: 0.0,
            min_overall: 0.0,
            max_overall: 0.0,
            first_completed_at: None,
            last_completed_at: None,
            domains: vec![],
        };
    }

    let overalls: Vec<f64> = samples.iter().map(|s| s.scores.overall).collect();
    let mut accumulators: Vec<DomainAccumulator> = Vec::new();
    for sample in samples {
        for domain in sample.scores.domains.iter().filter(|d| d.responses > 0) {
            let index = match accumulators.iter().position(|a| a.name == domain.name) {
                Some(index) => index,
                None => {
                    accumulators.push(DomainAccumulator {
                        name: domain.name.clone(),
                        scores: Vec::new(),
                        count: 0,
                    });
                    accumulators.len() - 1
                }
            };
            accumulators[index].scores.push(domain.score);
            accumulators[index].count += domain.responses;
        }
    }

    let mut domains: Vec<DomainAggregate> = accumulators
        .into_iter()
        .map(|acc| DomainAggregate {
            mean: round_to(mean(&acc.scores), 1),
            min: min(&acc.scores),
            max: max(&acc.scores),
            count: acc.count,
            name: acc.name,
        })
        .collect();
    domains.sort_by(|a, b| b.mean.total_cmp(&a.mean));

    GroupStatistics {
        total_count: samples.len(),
        mean_overall: round_to(mean(&overalls), 1),
        min_overall: min(&overalls),
        max_overall: max(&overalls),
        first_completed_at: samples.iter().map(|s| s.completed_at).min(),
        last_completed_at: samples.iter().map(|s| s.completed_at).max(),
        domains,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
