//! Solver-backed monotonic binning using Mixed Integer Programming.
//!
//! When a monotonic WoE constraint is requested, greedy merging is not
//! enough: the merge has to be chosen globally so the final WoE sequence
//! is monotone in the requested direction. This module formulates the
//! merge as a MIP over interval variables (HiGHS via good_lp): pick the
//! set of contiguous pre-bin intervals that maximizes total IV subject to
//! full coverage, the target bin count and the ordering constraint.

use anyhow::{Context, Result};
use good_lp::{constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use super::binning::{BinStats, Monotonicity, PreBin};
use super::woe::woe_iv;

/// WoE/IV/count for a candidate interval of merged pre-bins
#[derive(Debug, Clone, Copy)]
struct Interval {
    woe: f64,
    iv: f64,
    count: f64,
}

/// Merge pre-bins into `target_bins` final bins with monotone WoE.
///
/// `Auto` tries both directions and keeps the higher-IV solution.
pub(crate) fn solve_monotone_merge(
    prebins: &[PreBin],
    target_bins: usize,
    direction: Monotonicity,
    min_count: f64,
    smoothing: f64,
    total_goods: f64,
    total_bads: f64,
) -> Result<Vec<PreBin>> {
    // Nothing to merge - a single bin is trivially monotone
    if prebins.len() <= target_bins && is_monotone(prebins, direction, smoothing, total_goods, total_bads)? {
        return Ok(prebins.to_vec());
    }

    let matrix = interval_matrix(prebins, smoothing, total_goods, total_bads)?;

    let boundaries = match direction {
        Monotonicity::Auto => {
            let asc = solve_direction(
                prebins,
                target_bins,
                Monotonicity::Ascending,
                min_count,
                &matrix,
            );
            let desc = solve_direction(
                prebins,
                target_bins,
                Monotonicity::Descending,
                min_count,
                &matrix,
            );
            match (asc, desc) {
                (Ok(a), Ok(d)) => {
                    if total_iv(&a, &matrix) >= total_iv(&d, &matrix) {
                        a
                    } else {
                        d
                    }
                }
                (Ok(a), Err(_)) => a,
                (Err(_), Ok(d)) => d,
                (Err(e), Err(_)) => {
                    return Err(e).context("no monotone binning found in either direction")
                }
            }
        }
        dir => solve_direction(prebins, target_bins, dir, min_count, &matrix)?,
    };

    Ok(reconstruct(prebins, &boundaries))
}

/// Solve the interval MIP for one monotone direction.
fn solve_direction(
    prebins: &[PreBin],
    target_bins: usize,
    direction: Monotonicity,
    min_count: f64,
    matrix: &[Vec<Interval>],
) -> Result<Vec<(usize, usize)>> {
    let n = prebins.len();
    let k = target_bins.min(n);

    let mut vars = ProblemVariables::new();

    // z[i][j-i] = 1 if pre-bins i..=j form one final bin
    let mut z: Vec<Vec<Option<Variable>>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(n - i);
        for j in i..n {
            if matrix[i][j - i].count >= min_count {
                row.push(Some(vars.add(variable().binary())));
            } else {
                row.push(None);
            }
        }
        z.push(row);
    }

    // Objective: maximize total IV of the selected intervals
    let mut objective_terms: Vec<Expression> = Vec::new();
    for i in 0..n {
        for j in i..n {
            if let Some(var) = z[i][j - i] {
                objective_terms.push(matrix[i][j - i].iv * var);
            }
        }
    }
    let objective: Expression = objective_terms.into_iter().sum();

    let mut problem = vars.maximise(objective).using(default_solver);

    // Exactly K final bins
    let bin_count: Expression = z
        .iter()
        .flat_map(|row| row.iter().filter_map(|v| *v))
        .sum();
    problem = problem.with(constraint!(bin_count == k as f64));

    // Each pre-bin covered by exactly one interval
    for p in 0..n {
        let mut covering: Vec<Variable> = Vec::new();
        for i in 0..=p {
            for j in p..n {
                if let Some(var) = z[i][j - i] {
                    covering.push(var);
                }
            }
        }
        if !covering.is_empty() {
            let coverage: Expression = covering.into_iter().sum();
            problem = problem.with(constraint!(coverage == 1.0));
        }
    }

    // Ordering: adjacent intervals whose WoE would violate the requested
    // direction cannot both be selected
    for i1 in 0..n {
        for j1 in i1..n {
            let i2 = j1 + 1;
            if i2 >= n {
                continue;
            }
            for j2 in i2..n {
                let (Some(v1), Some(v2)) = (z[i1][j1 - i1], z[i2][j2 - i2]) else {
                    continue;
                };
                let woe1 = matrix[i1][j1 - i1].woe;
                let woe2 = matrix[i2][j2 - i2].woe;
                let violates = match direction {
                    Monotonicity::Ascending => woe1 > woe2,
                    Monotonicity::Descending => woe1 < woe2,
                    _ => false,
                };
                if violates {
                    let sum: Expression = v1 + v2;
                    problem = problem.with(constraint!(sum <= 1.0));
                }
            }
        }
    }

    let solution = problem
        .solve()
        .context("monotone binning MIP is infeasible")?;

    let mut boundaries: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in i..n {
            if let Some(var) = z[i][j - i] {
                if solution.value(var) > 0.5 {
                    boundaries.push((i, j));
                }
            }
        }
    }
    boundaries.sort_by_key(|(start, _)| *start);

    Ok(boundaries)
}

/// Precompute WoE/IV/count for every contiguous interval of pre-bins
fn interval_matrix(
    prebins: &[PreBin],
    smoothing: f64,
    total_goods: f64,
    total_bads: f64,
) -> Result<Vec<Vec<Interval>>> {
    let n = prebins.len();
    let mut matrix: Vec<Vec<Interval>> = Vec::with_capacity(n);

    for i in 0..n {
        let mut row = Vec::with_capacity(n - i);
        let mut stats = BinStats::default();
        for prebin in prebins.iter().skip(i) {
            stats.goods += prebin.stats.goods;
            stats.bads += prebin.stats.bads;
            let (woe, iv) = woe_iv(stats.goods, stats.bads, total_goods, total_bads, smoothing)?;
            row.push(Interval {
                woe,
                iv,
                count: stats.count(),
            });
        }
        matrix.push(row);
    }

    Ok(matrix)
}

fn total_iv(boundaries: &[(usize, usize)], matrix: &[Vec<Interval>]) -> f64 {
    boundaries
        .iter()
        .map(|(start, end)| matrix[*start][*end - *start].iv)
        .sum()
}

fn is_monotone(
    prebins: &[PreBin],
    direction: Monotonicity,
    smoothing: f64,
    total_goods: f64,
    total_bads: f64,
) -> Result<bool> {
    let mut woes = Vec::with_capacity(prebins.len());
    for prebin in prebins {
        let (woe, _) = woe_iv(
            prebin.stats.goods,
            prebin.stats.bads,
            total_goods,
            total_bads,
            smoothing,
        )?;
        woes.push(woe);
    }
    let ok = match direction {
        Monotonicity::Ascending => woes.windows(2).all(|w| w[0] <= w[1]),
        Monotonicity::Descending => woes.windows(2).all(|w| w[0] >= w[1]),
        Monotonicity::Auto => {
            woes.windows(2).all(|w| w[0] <= w[1]) || woes.windows(2).all(|w| w[0] >= w[1])
        }
        Monotonicity::None => true,
    };
    Ok(ok)
}

/// Rebuild merged pre-bins from the interval boundaries
fn reconstruct(prebins: &[PreBin], boundaries: &[(usize, usize)]) -> Vec<PreBin> {
    boundaries
        .iter()
        .map(|(start, end)| {
            let mut stats = BinStats::default();
            for prebin in &prebins[*start..=*end] {
                stats.goods += prebin.stats.goods;
                stats.bads += prebin.stats.bads;
            }
            PreBin {
                lower: prebins[*start].lower,
                upper: prebins[*end].upper,
                stats,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prebin(lower: f64, upper: f64, goods: f64, bads: f64) -> PreBin {
        PreBin {
            lower,
            upper,
            stats: BinStats { goods, bads },
        }
    }

    #[test]
    fn test_already_monotone_passthrough() {
        // Bad rate (and hence WoE under the good/bad convention) already ordered
        let prebins = vec![
            prebin(0.0, 10.0, 18.0, 2.0),
            prebin(10.0, 20.0, 10.0, 10.0),
            prebin(20.0, f64::INFINITY, 2.0, 18.0),
        ];
        let merged =
            solve_monotone_merge(&prebins, 3, Monotonicity::Descending, 1.0, 0.5, 30.0, 30.0)
                .unwrap();
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_resolves_violation() {
        // Middle pre-bin breaks the trend; the solver has to merge it away
        let prebins = vec![
            prebin(0.0, 10.0, 18.0, 2.0),
            prebin(10.0, 20.0, 3.0, 17.0),
            prebin(20.0, 30.0, 12.0, 8.0),
            prebin(30.0, f64::INFINITY, 2.0, 18.0),
        ];
        let merged =
            solve_monotone_merge(&prebins, 2, Monotonicity::Descending, 1.0, 0.5, 35.0, 45.0)
                .unwrap();
        assert!(merged.len() <= 2);

        // The merged sequence really is monotone
        let mut woes = Vec::new();
        for bin in &merged {
            let (woe, _) = woe_iv(bin.stats.goods, bin.stats.bads, 35.0, 45.0, 0.5).unwrap();
            woes.push(woe);
        }
        assert!(woes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_auto_picks_a_direction() {
        let prebins = vec![
            prebin(0.0, 10.0, 2.0, 18.0),
            prebin(10.0, 20.0, 10.0, 10.0),
            prebin(20.0, f64::INFINITY, 18.0, 2.0),
        ];
        let merged =
            solve_monotone_merge(&prebins, 3, Monotonicity::Auto, 1.0, 0.5, 30.0, 30.0).unwrap();
        assert!(!merged.is_empty());
    }

    #[test]
    fn test_coverage_is_total() {
        let prebins = vec![
            prebin(0.0, 5.0, 10.0, 5.0),
            prebin(5.0, 10.0, 8.0, 7.0),
            prebin(10.0, 15.0, 6.0, 9.0),
            prebin(15.0, f64::INFINITY, 4.0, 11.0),
        ];
        let merged =
            solve_monotone_merge(&prebins, 2, Monotonicity::Descending, 1.0, 0.5, 28.0, 32.0)
                .unwrap();
        let total: f64 = merged.iter().map(|b| b.stats.count()).sum();
        assert!((total - 60.0).abs() < 1e-9);
        assert_eq!(merged.first().unwrap().lower, 0.0);
        assert!(merged.last().unwrap().upper.is_infinite());
    }
}
