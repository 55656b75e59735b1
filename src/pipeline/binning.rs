//! Variable binning: fit frozen bin definitions on the training window,
//! apply them unchanged to every later cohort.
//!
//! Numeric variables get equal-frequency pre-bins that are merged down to
//! the requested bin count (greedy minimum-IV-loss merging, or the MIP
//! solver when a monotonic WoE constraint is requested). Categorical
//! variables get one group per level, with rare levels pooled into an
//! `OTHER` group. Every definition carries an implicit missing-value bin.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::PipelineError;
use super::solver;
use super::woe::woe_iv;

/// Default number of equal-frequency pre-bins before merging
pub const DEFAULT_PRE_BIN_COUNT: usize = 20;

/// Monotonic WoE constraint for numeric binning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monotonicity {
    /// No constraint - WoE can vary freely across bins
    #[default]
    None,
    /// WoE must increase with the variable value
    Ascending,
    /// WoE must decrease with the variable value
    Descending,
    /// Try both directions, keep the higher-IV solution
    Auto,
}

impl std::fmt::Display for Monotonicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Monotonicity::None => write!(f, "none"),
            Monotonicity::Ascending => write!(f, "ascending"),
            Monotonicity::Descending => write!(f, "descending"),
            Monotonicity::Auto => write!(f, "auto"),
        }
    }
}

impl std::str::FromStr for Monotonicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Monotonicity::None),
            "ascending" | "asc" => Ok(Monotonicity::Ascending),
            "descending" | "desc" => Ok(Monotonicity::Descending),
            "auto" => Ok(Monotonicity::Auto),
            _ => Err(format!(
                "Unknown monotonicity: '{}'. Use 'none', 'ascending', 'descending', or 'auto'.",
                s
            )),
        }
    }
}

/// Options controlling the `fit` step
#[derive(Debug, Clone)]
pub struct BinningOptions {
    /// Target number of bins after merging
    pub bins: usize,
    /// Minimum bin population as a fraction of the training rows
    pub min_population: f64,
    /// Number of equal-frequency pre-bins before merging
    pub prebins: usize,
    /// Monotonic WoE constraint
    pub monotonicity: Monotonicity,
    /// Additive smoothing constant used in WoE during merge decisions
    pub smoothing: f64,
}

impl Default for BinningOptions {
    fn default() -> Self {
        Self {
            bins: 10,
            min_population: 0.05,
            prebins: DEFAULT_PRE_BIN_COUNT,
            monotonicity: Monotonicity::None,
            smoothing: 0.5,
        }
    }
}

/// Where a record landed when a frozen definition was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinAssignment {
    /// Ordinal bin rank
    Bin(usize),
    /// Null value - the explicit missing bin
    Missing,
    /// Categorical level never seen at fit time (no OTHER group fitted)
    Unseen,
}

/// Frozen numeric bins: internal cut points, open-ended at both sides.
///
/// Bin `i` covers `[edges[i-1], edges[i])`; the first bin extends to
/// negative infinity and the last to positive infinity, so out-of-range
/// values from later cohorts clip into the boundary bins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericBins {
    pub variable: String,
    pub edges: Vec<f64>,
}

/// Frozen categorical groups, ordered by training event rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalBins {
    pub variable: String,
    /// Levels belonging to each ordinal group
    pub groups: Vec<Vec<String>>,
    /// Index of the pooled rare-level group, when one was fitted.
    /// Unseen levels at apply time fall into this group.
    pub other: Option<usize>,
}

/// A frozen bin definition for one variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BinDefinition {
    Numeric(NumericBins),
    Categorical(CategoricalBins),
}

impl BinDefinition {
    pub fn variable(&self) -> &str {
        match self {
            BinDefinition::Numeric(b) => &b.variable,
            BinDefinition::Categorical(b) => &b.variable,
        }
    }

    /// Number of ordinal bins, not counting the missing bin.
    pub fn bin_count(&self) -> usize {
        match self {
            BinDefinition::Numeric(b) => b.edges.len() + 1,
            BinDefinition::Categorical(b) => b.groups.len(),
        }
    }

    /// Human-readable label for an ordinal bin.
    pub fn bin_label(&self, idx: usize) -> String {
        match self {
            BinDefinition::Numeric(b) => {
                let lower = if idx == 0 {
                    "-inf".to_string()
                } else {
                    format!("{:.6}", b.edges[idx - 1])
                };
                let upper = if idx >= b.edges.len() {
                    "+inf".to_string()
                } else {
                    format!("{:.6}", b.edges[idx])
                };
                format!("[{}, {})", lower, upper)
            }
            BinDefinition::Categorical(b) => b
                .groups
                .get(idx)
                .map(|levels| levels.join("|"))
                .unwrap_or_default(),
        }
    }
}

/// Good/bad counts for a candidate bin during fitting
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BinStats {
    pub goods: f64,
    pub bads: f64,
}

impl BinStats {
    pub fn count(&self) -> f64 {
        self.goods + self.bads
    }

    fn absorb(&mut self, other: &BinStats) {
        self.goods += other.goods;
        self.bads += other.bads;
    }
}

/// Pre-bin carrying its value range alongside the counts
#[derive(Debug, Clone)]
pub(crate) struct PreBin {
    pub lower: f64,
    pub upper: f64,
    pub stats: BinStats,
}

/// Fit a numeric bin definition on training values.
///
/// Boundaries are determined here and only here; `apply_bins` never
/// recomputes them.
pub fn fit_numeric_bins(
    variable: &str,
    values: &[Option<f64>],
    targets: &[i32],
    options: &BinningOptions,
) -> Result<BinDefinition> {
    let mut pairs: Vec<(f64, i32)> = values
        .iter()
        .zip(targets.iter())
        .filter_map(|(v, t)| v.map(|val| (val, *t)))
        .collect();

    let min_rows = min_rows_per_bin(pairs.len(), options.min_population);
    let max_bins = if min_rows > 0 { pairs.len() / min_rows } else { 0 };
    if max_bins < 2 {
        return Err(PipelineError::InsufficientData {
            variable: variable.to_string(),
            rows: pairs.len(),
            min_bins: 2,
            min_rows,
        }
        .into());
    }
    let target_bins = options.bins.min(max_bins).max(2);

    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_goods = pairs.iter().filter(|(_, t)| *t == 0).count() as f64;
    let total_bads = pairs.iter().filter(|(_, t)| *t == 1).count() as f64;

    let mut prebins = quantile_prebins(&pairs, options.prebins.max(target_bins));

    // Min-population pass: pool undersized pre-bins into a neighbor before
    // the IV-driven merge, so the constraint holds in the final bins.
    merge_undersized(&mut prebins, min_rows as f64);

    let merged = match options.monotonicity {
        Monotonicity::None => greedy_merge(
            prebins,
            target_bins,
            total_goods,
            total_bads,
            options.smoothing,
        )?,
        direction => solver::solve_monotone_merge(
            &prebins,
            target_bins,
            direction,
            min_rows as f64,
            options.smoothing,
            total_goods,
            total_bads,
        )?,
    };

    // Internal cut points between consecutive bins
    let edges: Vec<f64> = merged
        .iter()
        .take(merged.len().saturating_sub(1))
        .map(|b| b.upper)
        .collect();

    Ok(BinDefinition::Numeric(NumericBins {
        variable: variable.to_string(),
        edges,
    }))
}

/// Fit a categorical bin definition: one group per level, rare levels
/// pooled into `OTHER`, groups ordered by training event rate and merged
/// down to the target count by minimum IV loss.
pub fn fit_categorical_bins(
    variable: &str,
    values: &[Option<&str>],
    targets: &[i32],
    options: &BinningOptions,
) -> Result<BinDefinition> {
    let mut level_stats: HashMap<String, BinStats> = HashMap::new();
    let mut observed = 0usize;

    for (value, target) in values.iter().zip(targets.iter()) {
        if let Some(level) = value {
            let entry = level_stats.entry(level.to_string()).or_default();
            if *target == 1 {
                entry.bads += 1.0;
            } else {
                entry.goods += 1.0;
            }
            observed += 1;
        }
    }

    let min_rows = min_rows_per_bin(observed, options.min_population);
    if level_stats.is_empty() || observed < 2 * min_rows.max(1) {
        return Err(PipelineError::InsufficientData {
            variable: variable.to_string(),
            rows: observed,
            min_bins: 2,
            min_rows,
        }
        .into());
    }

    let total_goods: f64 = level_stats.values().map(|s| s.goods).sum();
    let total_bads: f64 = level_stats.values().map(|s| s.bads).sum();

    // Pool rare levels
    let mut other_levels: Vec<String> = Vec::new();
    let mut other_stats = BinStats::default();
    let mut groups: Vec<(Vec<String>, BinStats)> = Vec::new();

    for (level, stats) in level_stats {
        if stats.count() < min_rows as f64 {
            other_levels.push(level);
            other_stats.absorb(&stats);
        } else {
            groups.push((vec![level], stats));
        }
    }
    if !other_levels.is_empty() {
        other_levels.sort();
        groups.push((other_levels.clone(), other_stats));
    }

    // Order by event rate so adjacency is meaningful for merging
    groups.sort_by(|a, b| {
        let ra = a.1.bads / a.1.count().max(1.0);
        let rb = b.1.bads / b.1.count().max(1.0);
        ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal)
    });

    // Merge adjacent groups down to the target count
    while groups.len() > options.bins && groups.len() > 1 {
        let mut best_loss = f64::MAX;
        let mut best_idx = 0;
        for i in 0..groups.len() - 1 {
            let (_, iv_a) = woe_iv(
                groups[i].1.goods,
                groups[i].1.bads,
                total_goods,
                total_bads,
                options.smoothing,
            )?;
            let (_, iv_b) = woe_iv(
                groups[i + 1].1.goods,
                groups[i + 1].1.bads,
                total_goods,
                total_bads,
                options.smoothing,
            )?;
            let mut merged = groups[i].1;
            merged.absorb(&groups[i + 1].1);
            let (_, iv_merged) = woe_iv(
                merged.goods,
                merged.bads,
                total_goods,
                total_bads,
                options.smoothing,
            )?;
            let loss = iv_a + iv_b - iv_merged;
            if loss < best_loss {
                best_loss = loss;
                best_idx = i;
            }
        }
        let (levels, stats) = groups.remove(best_idx + 1);
        groups[best_idx].0.extend(levels);
        groups[best_idx].0.sort();
        groups[best_idx].1.absorb(&stats);
    }

    let other = if other_levels.is_empty() {
        None
    } else {
        groups
            .iter()
            .position(|(levels, _)| other_levels.iter().all(|l| levels.contains(l)))
    };

    Ok(BinDefinition::Categorical(CategoricalBins {
        variable: variable.to_string(),
        groups: groups.into_iter().map(|(levels, _)| levels).collect(),
        other,
    }))
}

/// Assign numeric values to frozen bins. Nulls land in the missing bin;
/// values outside the fitted range clip into the boundary bins.
pub fn apply_numeric_bins(values: &[Option<f64>], bins: &NumericBins) -> Vec<BinAssignment> {
    values
        .iter()
        .map(|v| match v {
            None => BinAssignment::Missing,
            Some(value) => {
                let idx = bins.edges.partition_point(|edge| *edge <= *value);
                BinAssignment::Bin(idx)
            }
        })
        .collect()
}

/// Assign categorical values to frozen groups. Unseen levels fall into
/// the OTHER group when one was fitted, otherwise they are reported as
/// unseen and pick up the configured default WoE downstream.
pub fn apply_categorical_bins(
    values: &[Option<&str>],
    bins: &CategoricalBins,
) -> Vec<BinAssignment> {
    let lookup: HashMap<&str, usize> = bins
        .groups
        .iter()
        .enumerate()
        .flat_map(|(idx, levels)| levels.iter().map(move |l| (l.as_str(), idx)))
        .collect();

    values
        .iter()
        .map(|v| match v {
            None => BinAssignment::Missing,
            Some(level) => match lookup.get(level) {
                Some(idx) => BinAssignment::Bin(*idx),
                None => match bins.other {
                    Some(idx) => BinAssignment::Bin(idx),
                    None => BinAssignment::Unseen,
                },
            },
        })
        .collect()
}

/// Fit a definition for one DataFrame column, dispatching on dtype.
pub fn fit_column(
    df: &DataFrame,
    variable: &str,
    targets: &[i32],
    options: &BinningOptions,
) -> Result<BinDefinition> {
    let col = df.column(variable)?;
    if col.dtype().is_primitive_numeric() {
        let values = numeric_column_values(df, variable)?;
        fit_numeric_bins(variable, &values, targets, options)
    } else {
        let values = string_column_values(df, variable)?;
        let refs: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
        fit_categorical_bins(variable, &refs, targets, options)
    }
}

/// Apply a frozen definition to one DataFrame column.
pub fn apply_column(df: &DataFrame, definition: &BinDefinition) -> Result<Vec<BinAssignment>> {
    match definition {
        BinDefinition::Numeric(bins) => {
            let values = numeric_column_values(df, &bins.variable)?;
            Ok(apply_numeric_bins(&values, bins))
        }
        BinDefinition::Categorical(bins) => {
            let values = string_column_values(df, &bins.variable)?;
            let refs: Vec<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();
            Ok(apply_categorical_bins(&refs, bins))
        }
    }
}

/// Extract a column as Option<f64> values
pub fn numeric_column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let float_col = col.cast(&DataType::Float64)?;
    Ok(float_col.f64()?.into_iter().collect())
}

/// Extract a column as Option<String> values
pub fn string_column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let string_col = col.cast(&DataType::String)?;
    Ok(string_col
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn min_rows_per_bin(rows: usize, min_population: f64) -> usize {
    ((rows as f64 * min_population).ceil() as usize).max(1)
}

/// Equal-frequency pre-bins over sorted (value, target) pairs.
///
/// A boundary is never placed inside a run of identical values, so edges
/// are strictly increasing.
fn quantile_prebins(sorted_pairs: &[(f64, i32)], num_prebins: usize) -> Vec<PreBin> {
    let n = sorted_pairs.len();
    let bin_size = n.div_ceil(num_prebins);

    let mut prebins: Vec<PreBin> = Vec::new();
    let mut start = 0;

    while start < n {
        let mut end = (start + bin_size).min(n);
        // Extend past ties so the next bin starts on a new value
        while end < n && (sorted_pairs[end].0 - sorted_pairs[end - 1].0).abs() < 1e-12 {
            end += 1;
        }

        let mut stats = BinStats::default();
        for &(_, target) in &sorted_pairs[start..end] {
            if target == 1 {
                stats.bads += 1.0;
            } else {
                stats.goods += 1.0;
            }
        }

        prebins.push(PreBin {
            lower: sorted_pairs[start].0,
            upper: if end < n {
                sorted_pairs[end].0
            } else {
                f64::INFINITY
            },
            stats,
        });

        start = end;
    }

    prebins
}

/// Pool pre-bins below the minimum population into a neighbor.
fn merge_undersized(prebins: &mut Vec<PreBin>, min_count: f64) {
    while prebins.len() > 1 {
        let Some(idx) = prebins.iter().position(|b| b.stats.count() < min_count) else {
            break;
        };
        // Merge into the smaller neighbor
        let merge_with = if idx == 0 {
            1
        } else if idx == prebins.len() - 1 {
            idx - 1
        } else if prebins[idx - 1].stats.count() <= prebins[idx + 1].stats.count() {
            idx - 1
        } else {
            idx + 1
        };
        let (keep, remove) = if merge_with < idx {
            (merge_with, idx)
        } else {
            (idx, merge_with)
        };
        let removed = prebins.remove(remove);
        prebins[keep].stats.absorb(&removed.stats);
        prebins[keep].upper = removed.upper.max(prebins[keep].upper);
        prebins[keep].lower = removed.lower.min(prebins[keep].lower);
    }
}

/// Greedy merge of adjacent pre-bins, minimizing IV loss at each step.
fn greedy_merge(
    mut bins: Vec<PreBin>,
    target_bins: usize,
    total_goods: f64,
    total_bads: f64,
    smoothing: f64,
) -> Result<Vec<PreBin>> {
    while bins.len() > target_bins && bins.len() > 1 {
        let mut min_loss = f64::MAX;
        let mut merge_idx = 0;

        for i in 0..bins.len() - 1 {
            let (_, iv_a) = woe_iv(
                bins[i].stats.goods,
                bins[i].stats.bads,
                total_goods,
                total_bads,
                smoothing,
            )?;
            let (_, iv_b) = woe_iv(
                bins[i + 1].stats.goods,
                bins[i + 1].stats.bads,
                total_goods,
                total_bads,
                smoothing,
            )?;
            let mut merged = bins[i].stats;
            merged.absorb(&bins[i + 1].stats);
            let (_, iv_merged) = woe_iv(merged.goods, merged.bads, total_goods, total_bads, smoothing)?;

            let loss = iv_a + iv_b - iv_merged;
            if loss < min_loss {
                min_loss = loss;
                merge_idx = i;
            }
        }

        let removed = bins.remove(merge_idx + 1);
        bins[merge_idx].stats.absorb(&removed.stats);
        bins[merge_idx].upper = removed.upper;
    }

    Ok(bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_data(n: usize) -> (Vec<Option<f64>>, Vec<i32>) {
        // Event rate rises with the value
        let values: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
        let targets: Vec<i32> = (0..n).map(|i| if i >= n / 2 { 1 } else { 0 }).collect();
        (values, targets)
    }

    #[test]
    fn test_fit_produces_requested_bins() {
        let (values, targets) = ramp_data(200);
        let options = BinningOptions {
            bins: 5,
            ..Default::default()
        };
        let def = fit_numeric_bins("var_1", &values, &targets, &options).unwrap();
        assert_eq!(def.bin_count(), 5);
    }

    #[test]
    fn test_bins_partition_full_domain() {
        let (values, targets) = ramp_data(100);
        let def = fit_numeric_bins("var_1", &values, &targets, &BinningOptions::default()).unwrap();
        let BinDefinition::Numeric(bins) = &def else {
            panic!("expected numeric bins");
        };

        // Every value, including nulls and out-of-range probes, gets a bin
        let probes = vec![
            Some(f64::MIN),
            Some(-1.0e9),
            Some(0.0),
            Some(50.0),
            Some(99.0),
            Some(1.0e9),
            None,
        ];
        let assignments = apply_numeric_bins(&probes, bins);
        for assignment in &assignments {
            match assignment {
                BinAssignment::Bin(idx) => assert!(*idx < def.bin_count()),
                BinAssignment::Missing => {}
                BinAssignment::Unseen => panic!("numeric values are never unseen"),
            }
        }
        assert_eq!(assignments[6], BinAssignment::Missing);
    }

    #[test]
    fn test_apply_never_refits_boundaries() {
        let (values, targets) = ramp_data(100);
        let def = fit_numeric_bins("var_1", &values, &targets, &BinningOptions::default()).unwrap();
        let BinDefinition::Numeric(bins) = def else {
            panic!("expected numeric bins");
        };
        let edges_before = bins.edges.clone();

        // A later cohort with a much wider range: values clip, edges stay put
        let later: Vec<Option<f64>> = vec![Some(-5000.0), Some(5000.0)];
        let assignments = apply_numeric_bins(&later, &bins);
        assert_eq!(assignments[0], BinAssignment::Bin(0));
        assert_eq!(assignments[1], BinAssignment::Bin(bins.edges.len()));
        assert_eq!(bins.edges, edges_before);
    }

    #[test]
    fn test_insufficient_data_error() {
        let values: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0)];
        let targets = vec![0, 1, 0];
        let options = BinningOptions {
            bins: 10,
            min_population: 0.5,
            ..Default::default()
        };
        let result = fit_numeric_bins("tiny", &values, &targets, &options);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insufficient data for 'tiny'"));
    }

    #[test]
    fn test_min_population_respected() {
        let (values, targets) = ramp_data(100);
        let options = BinningOptions {
            bins: 10,
            min_population: 0.10,
            ..Default::default()
        };
        let def = fit_numeric_bins("var_1", &values, &targets, &options).unwrap();
        let BinDefinition::Numeric(bins) = &def else {
            panic!()
        };
        let assignments = apply_numeric_bins(&values, bins);

        let mut counts = vec![0usize; def.bin_count()];
        for a in assignments {
            if let BinAssignment::Bin(i) = a {
                counts[i] += 1;
            }
        }
        for count in counts {
            assert!(count >= 10, "bin below minimum population: {}", count);
        }
    }

    #[test]
    fn test_categorical_rare_levels_pool_into_other() {
        let values: Vec<Option<&str>> = (0..100)
            .map(|i| {
                Some(match i % 25 {
                    0 => "RARE",
                    n if n < 13 => "A",
                    _ => "B",
                })
            })
            .collect();
        let targets: Vec<i32> = (0..100).map(|i| (i % 3 == 0) as i32).collect();
        let options = BinningOptions {
            min_population: 0.05,
            ..Default::default()
        };

        let def = fit_categorical_bins("cat_1", &values, &targets, &options).unwrap();
        let BinDefinition::Categorical(bins) = &def else {
            panic!("expected categorical bins");
        };
        assert!(bins.other.is_some(), "expected an OTHER group for rare levels");

        // Unseen level maps into OTHER
        let assignments = apply_categorical_bins(&[Some("NEVER_SEEN")], bins);
        assert_eq!(assignments[0], BinAssignment::Bin(bins.other.unwrap()));
    }

    #[test]
    fn test_categorical_unseen_without_other() {
        let values: Vec<Option<&str>> = (0..40)
            .map(|i| Some(if i % 2 == 0 { "A" } else { "B" }))
            .collect();
        let targets: Vec<i32> = (0..40).map(|i| (i % 4 == 0) as i32).collect();
        let def =
            fit_categorical_bins("cat_1", &values, &targets, &BinningOptions::default()).unwrap();
        let BinDefinition::Categorical(bins) = &def else {
            panic!()
        };
        assert!(bins.other.is_none());
        let assignments = apply_categorical_bins(&[Some("C"), None], bins);
        assert_eq!(assignments[0], BinAssignment::Unseen);
        assert_eq!(assignments[1], BinAssignment::Missing);
    }

    #[test]
    fn test_bin_labels() {
        let bins = NumericBins {
            variable: "var_1".to_string(),
            edges: vec![10.0, 20.0],
        };
        let def = BinDefinition::Numeric(bins);
        assert!(def.bin_label(0).starts_with("[-inf"));
        assert!(def.bin_label(2).ends_with("+inf)"));
    }

    #[test]
    fn test_monotonicity_parse_and_display() {
        assert_eq!("asc".parse::<Monotonicity>().unwrap(), Monotonicity::Ascending);
        assert_eq!("DESC".parse::<Monotonicity>().unwrap(), Monotonicity::Descending);
        assert_eq!("auto".parse::<Monotonicity>().unwrap(), Monotonicity::Auto);
        assert!("sideways".parse::<Monotonicity>().is_err());
        assert_eq!(Monotonicity::Ascending.to_string(), "ascending");
    }

    #[test]
    fn test_quantile_prebins_never_split_ties() {
        let pairs: Vec<(f64, i32)> = vec![
            (1.0, 0),
            (1.0, 0),
            (1.0, 1),
            (1.0, 0),
            (2.0, 1),
            (3.0, 1),
        ];
        let prebins = quantile_prebins(&pairs, 3);
        for window in prebins.windows(2) {
            assert!(window[0].upper <= window[1].lower + 1e-12);
            assert!(window[0].upper > window[0].lower);
        }
    }
}
