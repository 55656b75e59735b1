//! Discrimination metrics: AUC, KS and Gini, overall and per safra.
//!
//! AUC uses the rank formulation of the Mann-Whitney U statistic with
//! tie-averaged ranks, so it depends only on the ordering of the scores.
//! KS is the maximum gap between the score CDFs of the two classes.

use anyhow::Result;
use serde::Serialize;

use super::error::PipelineError;

/// Discrimination metrics for one population
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Metrics {
    pub auc: f64,
    pub ks: f64,
    pub gini: f64,
}

/// Metrics for one safra cohort
#[derive(Debug, Clone, Serialize)]
pub struct CohortMetrics {
    pub safra: String,
    pub rows: usize,
    pub metrics: Metrics,
}

/// Compute AUC, KS and Gini for a scored population.
///
/// Scores are probabilities of the bad outcome (target 1), so a
/// well-performing model has AUC above 0.5. A single-class population
/// has no defined discrimination and errors out.
pub fn evaluate(labels: &[i32], scores: &[f64]) -> Result<Metrics> {
    debug_assert_eq!(labels.len(), scores.len());

    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(PipelineError::UndefinedStatistic {
            context: "model evaluation".to_string(),
            detail: format!(
                "population has {} bads and {} goods; both classes are required",
                positives, negatives
            ),
        }
        .into());
    }

    let auc = rank_auc(labels, scores, positives, negatives);
    let ks = ks_statistic(labels, scores, positives, negatives);

    Ok(Metrics {
        auc,
        ks,
        gini: 2.0 * auc - 1.0,
    })
}

/// AUC via tie-averaged ranks: (sum of positive ranks - n1(n1+1)/2) / (n1*n0).
fn rank_auc(labels: &[i32], scores: &[f64], positives: usize, negatives: usize) -> f64 {
    let n = scores.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Tied scores share the average of their rank positions
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(ranks.iter())
        .filter(|(&y, _)| y == 1)
        .map(|(_, &r)| r)
        .sum();

    let n1 = positives as f64;
    let n0 = negatives as f64;
    (positive_rank_sum - n1 * (n1 + 1.0) / 2.0) / (n1 * n0)
}

/// KS: maximum absolute gap between the per-class score CDFs.
fn ks_statistic(labels: &[i32], scores: &[f64], positives: usize, negatives: usize) -> f64 {
    let n = scores.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n1 = positives as f64;
    let n0 = negatives as f64;
    let mut cum_pos = 0.0f64;
    let mut cum_neg = 0.0f64;
    let mut ks = 0.0f64;

    let mut i = 0;
    while i < n {
        let mut j = i;
        // Advance past ties so the CDFs only move at distinct score values
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        for &idx in &order[i..=j] {
            if labels[idx] == 1 {
                cum_pos += 1.0;
            } else {
                cum_neg += 1.0;
            }
        }
        let gap = (cum_pos / n1 - cum_neg / n0).abs();
        if gap > ks {
            ks = gap;
        }
        i = j + 1;
    }

    ks
}

/// Evaluate each safra separately, in chronological order.
///
/// Cohorts with a single class are skipped with their row count
/// preserved as zero-metric entries would be misleading.
pub fn evaluate_by_safra(
    labels: &[i32],
    scores: &[f64],
    safras: &[String],
    ordered_safras: &[String],
) -> Result<Vec<CohortMetrics>> {
    let mut results = Vec::with_capacity(ordered_safras.len());

    for safra in ordered_safras {
        let mut cohort_labels = Vec::new();
        let mut cohort_scores = Vec::new();
        for ((label, score), row_safra) in labels.iter().zip(scores.iter()).zip(safras.iter()) {
            if row_safra == safra {
                cohort_labels.push(*label);
                cohort_scores.push(*score);
            }
        }
        if cohort_labels.is_empty() {
            continue;
        }
        match evaluate(&cohort_labels, &cohort_scores) {
            Ok(metrics) => results.push(CohortMetrics {
                safra: safra.clone(),
                rows: cohort_labels.len(),
                metrics,
            }),
            Err(_) => continue,
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let labels = vec![0, 0, 0, 1, 1, 1];
        let scores = vec![0.1, 0.2, 0.3, 0.7, 0.8, 0.9];
        let metrics = evaluate(&labels, &scores).unwrap();
        assert!((metrics.auc - 1.0).abs() < 1e-12);
        assert!((metrics.ks - 1.0).abs() < 1e-12);
        assert!((metrics.gini - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_separation_with_ties() {
        let labels = vec![0, 1, 0, 1];
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        let metrics = evaluate(&labels, &scores).unwrap();
        assert!((metrics.auc - 0.5).abs() < 1e-12);
        assert!(metrics.ks.abs() < 1e-12);
    }

    #[test]
    fn test_single_class_errors() {
        assert!(evaluate(&[1, 1, 1], &[0.1, 0.2, 0.3]).is_err());
        assert!(evaluate(&[0, 0], &[0.1, 0.2]).is_err());
    }

    #[test]
    fn test_monotone_transform_invariance() {
        let labels = vec![0, 1, 0, 1, 0, 1, 1, 0];
        let scores = vec![0.1, 0.6, 0.3, 0.8, 0.2, 0.4, 0.9, 0.5];
        let transformed: Vec<f64> = scores.iter().map(|s: &f64| (s * 7.0).exp()).collect();

        let a = evaluate(&labels, &scores).unwrap();
        let b = evaluate(&labels, &transformed).unwrap();
        assert!((a.auc - b.auc).abs() < 1e-12);
        assert!((a.ks - b.ks).abs() < 1e-12);
    }

    #[test]
    fn test_ks_within_range() {
        let labels = vec![0, 1, 1, 0, 1, 0, 0, 1, 1, 0];
        let scores = vec![0.2, 0.7, 0.6, 0.3, 0.9, 0.1, 0.4, 0.5, 0.8, 0.35];
        let metrics = evaluate(&labels, &scores).unwrap();
        assert!(metrics.ks >= 0.0 && metrics.ks <= 1.0);
        assert!(metrics.auc >= 0.0 && metrics.auc <= 1.0);
    }

    #[test]
    fn test_per_safra_chronological() {
        let labels = vec![0, 1, 0, 1, 0, 1];
        let scores = vec![0.1, 0.9, 0.2, 0.8, 0.3, 0.7];
        let safras: Vec<String> = ["201901", "201901", "201902", "201902", "201903", "201903"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ordered = vec![
            "201901".to_string(),
            "201902".to_string(),
            "201903".to_string(),
        ];

        let results = evaluate_by_safra(&labels, &scores, &safras, &ordered).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].safra, "201901");
        assert_eq!(results[2].safra, "201903");
        assert!(results.iter().all(|c| c.rows == 2));
        assert!(results.iter().all(|c| (c.metrics.auc - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_single_class_cohort_skipped() {
        let labels = vec![0, 0, 0, 1];
        let scores = vec![0.1, 0.2, 0.3, 0.9];
        let safras: Vec<String> = ["201901", "201901", "201902", "201902"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ordered = vec!["201901".to_string(), "201902".to_string()];

        let results = evaluate_by_safra(&labels, &scores, &safras, &ordered).unwrap();
        // 201901 is all goods, so only 201902 is evaluable
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].safra, "201902");
    }
}
