//! Weight-of-Evidence encoding and Information Value.
//!
//! Uses the ln(%good / %bad) convention: a positive WoE marks a bin with
//! proportionally more good outcomes than bad ones. The bin-level IV
//! contribution is (%good - %bad) * WoE, which is sign-independent, and
//! the variable's total IV is the sum over its bins (missing bin
//! included).

use anyhow::Result;
use serde::Serialize;

use super::binning::{BinAssignment, BinDefinition};
use super::error::PipelineError;

/// Label used for the explicit missing-value bin in reports
pub const MISSING_LABEL: &str = "MISSING";

/// WoE and IV contribution for one bin.
///
/// When a count is zero, the additive `smoothing` constant is applied to
/// both counts so the logarithm stays defined. With smoothing disabled
/// (0.0) a zero count surfaces as `UndefinedStatistic` instead of a
/// silent NaN.
pub fn woe_iv(
    goods: f64,
    bads: f64,
    total_goods: f64,
    total_bads: f64,
    smoothing: f64,
) -> Result<(f64, f64)> {
    if smoothing <= 0.0 && (goods <= 0.0 || bads <= 0.0) {
        return Err(PipelineError::UndefinedStatistic {
            context: "WoE computation".to_string(),
            detail: format!("bin has {} goods and {} bads", goods, bads),
        }
        .into());
    }
    if total_goods <= 0.0 || total_bads <= 0.0 {
        return Err(PipelineError::UndefinedStatistic {
            context: "WoE computation".to_string(),
            detail: "target has no variation (all goods or all bads)".to_string(),
        }
        .into());
    }

    let dist_goods = (goods + smoothing) / (total_goods + smoothing);
    let dist_bads = (bads + smoothing) / (total_bads + smoothing);

    let woe = (dist_goods / dist_bads).ln();
    let iv = (dist_goods - dist_bads) * woe;

    Ok((woe, iv))
}

/// A single bin row in a fitted WoE table
#[derive(Debug, Clone, Serialize)]
pub struct WoeBinRow {
    pub label: String,
    pub goods: f64,
    pub bads: f64,
    pub count: f64,
    pub population_pct: f64,
    pub bad_rate: f64,
    pub woe: f64,
    pub iv_contribution: f64,
}

/// Frozen WoE mapping for one variable: ordinal bins plus the missing bin
#[derive(Debug, Clone, Serialize)]
pub struct WoeTable {
    pub variable: String,
    pub rows: Vec<WoeBinRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<WoeBinRow>,
    pub total_iv: f64,
}

/// Fit a WoE table from frozen bin assignments and training targets.
pub fn fit_woe(
    definition: &BinDefinition,
    assignments: &[BinAssignment],
    targets: &[i32],
    smoothing: f64,
) -> Result<WoeTable> {
    let bin_count = definition.bin_count();
    let mut goods = vec![0.0f64; bin_count];
    let mut bads = vec![0.0f64; bin_count];
    let mut missing_goods = 0.0f64;
    let mut missing_bads = 0.0f64;

    for (assignment, target) in assignments.iter().zip(targets.iter()) {
        match assignment {
            BinAssignment::Bin(idx) if *idx < bin_count => {
                if *target == 1 {
                    bads[*idx] += 1.0;
                } else {
                    goods[*idx] += 1.0;
                }
            }
            // Unseen cannot occur when fitting on the data the definition
            // was fit on; counted with missing to keep totals consistent.
            _ => {
                if *target == 1 {
                    missing_bads += 1.0;
                } else {
                    missing_goods += 1.0;
                }
            }
        }
    }

    let total_goods: f64 = goods.iter().sum::<f64>() + missing_goods;
    let total_bads: f64 = bads.iter().sum::<f64>() + missing_bads;
    let total_count = total_goods + total_bads;

    let mut rows = Vec::with_capacity(bin_count);
    for idx in 0..bin_count {
        let count = goods[idx] + bads[idx];
        let (woe, iv) = woe_iv(goods[idx], bads[idx], total_goods, total_bads, smoothing)?;
        rows.push(WoeBinRow {
            label: definition.bin_label(idx),
            goods: goods[idx],
            bads: bads[idx],
            count,
            population_pct: if total_count > 0.0 {
                count / total_count * 100.0
            } else {
                0.0
            },
            bad_rate: if count > 0.0 { bads[idx] / count } else { 0.0 },
            woe,
            iv_contribution: iv,
        });
    }

    let missing_count = missing_goods + missing_bads;
    let missing = if missing_count > 0.0 {
        let (woe, iv) = woe_iv(missing_goods, missing_bads, total_goods, total_bads, smoothing)?;
        Some(WoeBinRow {
            label: MISSING_LABEL.to_string(),
            goods: missing_goods,
            bads: missing_bads,
            count: missing_count,
            population_pct: missing_count / total_count * 100.0,
            bad_rate: missing_bads / missing_count,
            woe,
            iv_contribution: iv,
        })
    } else {
        None
    };

    let total_iv = rows.iter().map(|r| r.iv_contribution).sum::<f64>()
        + missing.as_ref().map(|m| m.iv_contribution).unwrap_or(0.0);

    Ok(WoeTable {
        variable: definition.variable().to_string(),
        rows,
        missing,
        total_iv,
    })
}

/// Replace bin assignments with their frozen WoE values.
///
/// Bins unseen at fit time (and missing values when the training window
/// had none) map to `default_woe`.
pub fn transform(
    assignments: &[BinAssignment],
    table: &WoeTable,
    default_woe: f64,
) -> Vec<f64> {
    assignments
        .iter()
        .map(|assignment| match assignment {
            BinAssignment::Bin(idx) => table
                .rows
                .get(*idx)
                .map(|row| row.woe)
                .unwrap_or(default_woe),
            BinAssignment::Missing => table
                .missing
                .as_ref()
                .map(|row| row.woe)
                .unwrap_or(default_woe),
            BinAssignment::Unseen => default_woe,
        })
        .collect()
}
