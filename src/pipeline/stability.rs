//! Population Stability Index over time cohorts.
//!
//! PSI compares the bin distribution of a comparison safra against the
//! frozen training-window distribution. A small epsilon is added inside
//! the logarithm only, so identical distributions score exactly zero and
//! empty bins never produce infinities.

use anyhow::Result;
use serde::Serialize;
use std::fmt;

use super::binning::BinAssignment;
use super::error::PipelineError;

/// Epsilon applied inside the PSI logarithm to guard empty bins
pub const PSI_EPSILON: f64 = 1e-6;

/// Shift severity bands for a PSI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftSeverity {
    Stable,
    Moderate,
    Significant,
}

impl ShiftSeverity {
    pub fn classify(psi: f64) -> Self {
        if psi < 0.10 {
            ShiftSeverity::Stable
        } else if psi <= 0.25 {
            ShiftSeverity::Moderate
        } else {
            ShiftSeverity::Significant
        }
    }
}

impl fmt::Display for ShiftSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShiftSeverity::Stable => "stable",
            ShiftSeverity::Moderate => "moderate",
            ShiftSeverity::Significant => "significant",
        };
        write!(f, "{}", label)
    }
}

/// Bin occupancy proportions for a set of assignments.
///
/// Returns `bin_count + 1` slots: one per ordinal bin plus a trailing
/// slot for missing values. Unseen categories land in the missing slot
/// as well, since they are equally absent from the frozen reference.
pub fn bin_proportions(assignments: &[BinAssignment], bin_count: usize) -> Vec<f64> {
    let mut counts = vec![0.0f64; bin_count + 1];
    for assignment in assignments {
        match assignment {
            BinAssignment::Bin(idx) if *idx < bin_count => counts[*idx] += 1.0,
            _ => counts[bin_count] += 1.0,
        }
    }
    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        for c in counts.iter_mut() {
            *c /= total;
        }
    }
    counts
}

/// PSI between a frozen reference distribution and a comparison one.
///
/// Both slices must have the same length and each sum to 1 (or 0 for an
/// empty cohort). The epsilon keeps the log finite without perturbing
/// the `(cmp - ref)` factor, so PSI(x, x) == 0 and PSI >= 0 hold exactly.
pub fn psi(reference: &[f64], comparison: &[f64]) -> Result<f64> {
    if reference.len() != comparison.len() {
        return Err(PipelineError::UndefinedStatistic {
            context: "PSI computation".to_string(),
            detail: format!(
                "reference has {} bins but comparison has {}",
                reference.len(),
                comparison.len()
            ),
        }
        .into());
    }

    let value = reference
        .iter()
        .zip(comparison.iter())
        .map(|(r, c)| (c - r) * ((c + PSI_EPSILON) / (r + PSI_EPSILON)).ln())
        .sum();

    Ok(value)
}

/// PSI of one comparison safra against the reference
#[derive(Debug, Clone, Serialize)]
pub struct PsiEntry {
    pub safra: String,
    pub psi: f64,
    pub severity: ShiftSeverity,
}

/// Per-safra stability track for one variable (or for the score)
#[derive(Debug, Clone, Serialize)]
pub struct StabilityReport {
    pub variable: String,
    pub entries: Vec<PsiEntry>,
}

impl StabilityReport {
    /// Worst severity observed across all safras.
    pub fn worst(&self) -> ShiftSeverity {
        self.entries
            .iter()
            .map(|e| e.severity)
            .max_by_key(|s| match s {
                ShiftSeverity::Stable => 0,
                ShiftSeverity::Moderate => 1,
                ShiftSeverity::Significant => 2,
            })
            .unwrap_or(ShiftSeverity::Stable)
    }
}

/// Build the stability track for one variable: the frozen training
/// distribution against each comparison safra in chronological order.
pub fn stability_report(
    variable: &str,
    reference: &[f64],
    comparisons: &[(String, Vec<f64>)],
) -> Result<StabilityReport> {
    let mut entries = Vec::with_capacity(comparisons.len());
    for (safra, distribution) in comparisons {
        let value = psi(reference, distribution)?;
        entries.push(PsiEntry {
            safra: safra.clone(),
            psi: value,
            severity: ShiftSeverity::classify(value),
        });
    }
    Ok(StabilityReport {
        variable: variable.to_string(),
        entries,
    })
}

/// Decile edges of the training score distribution, used as frozen bins
/// for score-level PSI.
pub fn score_deciles(reference_scores: &[f64], bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = reference_scores
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut edges = Vec::with_capacity(bins.saturating_sub(1));
    if sorted.is_empty() || bins < 2 {
        return edges;
    }
    for q in 1..bins {
        let pos = (q as f64 / bins as f64 * (sorted.len() - 1) as f64).round() as usize;
        let edge = sorted[pos.min(sorted.len() - 1)];
        // Heavy ties can collapse adjacent deciles
        if edges.last().map_or(true, |last| edge > *last) {
            edges.push(edge);
        }
    }
    edges
}

/// Proportion of scores falling into each frozen decile interval.
///
/// Interval i is `[edges[i-1], edges[i])` with open outer ends, so the
/// result has `edges.len() + 1` slots.
pub fn score_proportions(scores: &[f64], edges: &[f64]) -> Vec<f64> {
    let mut counts = vec![0.0f64; edges.len() + 1];
    for score in scores {
        let idx = edges.partition_point(|e| *e <= *score);
        counts[idx] += 1.0;
    }
    let total: f64 = counts.iter().sum();
    if total > 0.0 {
        for c in counts.iter_mut() {
            *c /= total;
        }
    }
    counts
}
