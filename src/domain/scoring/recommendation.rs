//! Deterministic recommendation text used when no generator is available.

/// Fallback recommendation for a domain scored `score` percent.
pub fn fallback_recommendation(domain_name: &str, score: f64) -> String {
    format!(
        "Based on a score of {:.0}%, review and strengthen the practices associated with {}, \
         prioritizing formalization of processes and continuous improvement of existing controls.",
        score, domain_name
    )
}
