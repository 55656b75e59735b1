//! Frozen missing-value imputation for numeric predictors.
//!
//! References are computed on the training window only and applied
//! unchanged to every later cohort. Imputation is optional: when it is
//! off, missing values flow into the explicit missing bin instead.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How to summarize the training distribution of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeStrategy {
    Median,
    Mean,
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeStrategy::Median => write!(f, "median"),
            ImputeStrategy::Mean => write!(f, "mean"),
        }
    }
}

impl FromStr for ImputeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median" => Ok(ImputeStrategy::Median),
            "mean" => Ok(ImputeStrategy::Mean),
            other => Err(format!(
                "unknown imputation strategy '{}' (expected 'median' or 'mean')",
                other
            )),
        }
    }
}

/// Frozen per-column fill values, fitted on the training window
#[derive(Debug, Clone, Serialize)]
pub struct ImputationReference {
    pub strategy: ImputeStrategy,
    pub values: BTreeMap<String, f64>,
}

/// Compute fill values for the given numeric columns from training rows.
///
/// Columns that are entirely null get no reference entry and keep their
/// nulls, which the binner then routes to the missing bin.
pub fn fit_imputation(
    train: &DataFrame,
    columns: &[String],
    strategy: ImputeStrategy,
) -> Result<ImputationReference> {
    let mut values = BTreeMap::new();

    for name in columns {
        let col = train.column(name)?;
        let float_col = col.cast(&DataType::Float64)?;
        let chunked = float_col.f64()?;
        let value = match strategy {
            ImputeStrategy::Median => chunked.median(),
            ImputeStrategy::Mean => chunked.mean(),
        };
        if let Some(v) = value {
            values.insert(name.clone(), v);
        }
    }

    Ok(ImputationReference { strategy, values })
}

/// Fill nulls with the frozen reference values.
pub fn apply_imputation(df: &DataFrame, reference: &ImputationReference) -> Result<DataFrame> {
    let mut result = df.clone();

    for (name, value) in &reference.values {
        if result.column(name).is_err() {
            continue;
        }
        let filled = result
            .column(name)?
            .cast(&DataType::Float64)?
            .f64()?
            .apply(|v| v.or(Some(*value)))
            .into_series()
            .with_name(name.as_str().into());
        result.with_column(filled)?;
    }

    Ok(result)
}
