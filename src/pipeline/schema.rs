//! Dataset schema validation and cohort (safra) handling.
//!
//! The observation table must carry a unique `id` column, a `safra`
//! cohort label, a binary `y` target and an arbitrary set of predictor
//! columns. Everything downstream assumes this shape, so it is
//! validated once here, right after loading.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::error::PipelineError;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Names of the structural columns; everything else is a predictor.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaConfig {
    pub id_column: String,
    pub safra_column: String,
    pub target_column: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            safra_column: "safra".to_string(),
            target_column: "y".to_string(),
        }
    }
}

impl SchemaConfig {
    /// True for columns that are excluded from modeling.
    pub fn is_structural(&self, name: &str) -> bool {
        name == self.id_column || name == self.safra_column || name == self.target_column
    }
}

/// Validate the structural columns: presence, id uniqueness and a binary
/// target. Fails fast with a descriptive error rather than proceeding
/// with partial data.
pub fn validate_dataset(df: &DataFrame, schema: &SchemaConfig) -> Result<()> {
    for required in [&schema.id_column, &schema.safra_column, &schema.target_column] {
        if df.column(required).is_err() {
            return Err(PipelineError::MissingColumn(required.clone()).into());
        }
    }

    let id_col = df.column(&schema.id_column)?;
    let unique_ids = id_col.n_unique()?;
    if unique_ids < df.height() {
        return Err(PipelineError::DuplicateIds {
            column: schema.id_column.clone(),
            duplicates: df.height() - unique_ids,
        }
        .into());
    }

    validate_binary_target(df, &schema.target_column)?;

    Ok(())
}

/// Validate that the target column is binary (contains only 0 and 1).
///
/// Handles columns stored as integers or as floats (0.0/1.0 with
/// tolerance). Nulls are rejected: the target must be present for every
/// training and evaluation row.
pub fn validate_binary_target(df: &DataFrame, target: &str) -> Result<()> {
    let target_col = df
        .column(target)
        .map_err(|_| PipelineError::MissingColumn(target.to_string()))?;

    if target_col.len() == 0 {
        return Err(PipelineError::NonBinaryTarget {
            column: target.to_string(),
            detail: "column is empty".to_string(),
        }
        .into());
    }

    if target_col.null_count() > 0 {
        return Err(PipelineError::NonBinaryTarget {
            column: target.to_string(),
            detail: format!("{} null values present", target_col.null_count()),
        }
        .into());
    }

    let float_col = target_col.cast(&DataType::Float64)?;
    let unique = float_col.unique()?;
    let unique_values: Vec<f64> = unique.f64()?.into_iter().flatten().collect();

    let valid = unique_values.len() <= 2
        && unique_values
            .iter()
            .all(|&v| (v - 0.0).abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);

    if !valid {
        return Err(PipelineError::NonBinaryTarget {
            column: target.to_string(),
            detail: format!(
                "found {} unique values: {:?}",
                unique_values.len(),
                unique_values
            ),
        }
        .into());
    }

    Ok(())
}

/// Extract the target column as 0/1 integers.
pub fn target_vector(df: &DataFrame, schema: &SchemaConfig) -> Result<Vec<i32>> {
    validate_binary_target(df, &schema.target_column)?;
    let col = df.column(&schema.target_column)?;
    let values: Vec<i32> = col
        .cast(&DataType::Int32)?
        .i32()?
        .into_iter()
        .flatten()
        .collect();
    Ok(values)
}

/// Extract the safra column as strings, one per row.
pub fn safra_vector(df: &DataFrame, schema: &SchemaConfig) -> Result<Vec<String>> {
    let col = df
        .column(&schema.safra_column)
        .map_err(|_| PipelineError::MissingColumn(schema.safra_column.clone()))?;
    let cast = col.cast(&DataType::String)?;
    let values: Vec<String> = cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()).unwrap_or_default())
        .collect();
    Ok(values)
}

/// Distinct safras in chronological (lexicographic) order.
///
/// Safra labels like `201901` sort correctly as strings, which is the
/// convention this pipeline assumes.
pub fn safra_order(df: &DataFrame, schema: &SchemaConfig) -> Result<Vec<String>> {
    let mut safras = safra_vector(df, schema)?;
    safras.sort();
    safras.dedup();
    Ok(safras)
}

/// Predictor columns split by type, excluding structural columns.
pub fn feature_columns(df: &DataFrame, schema: &SchemaConfig) -> (Vec<String>, Vec<String>) {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for col in df.get_columns() {
        let name = col.name().to_string();
        if schema.is_structural(&name) {
            continue;
        }
        if col.dtype().is_primitive_numeric() {
            numeric.push(name);
        } else if matches!(col.dtype(), DataType::String | DataType::Categorical(_, _)) {
            categorical.push(name);
        }
    }

    (numeric, categorical)
}

/// Time-ordered train/validation/test split by safra boundaries.
///
/// The training window is every safra up to and including `train_until`;
/// validation runs up to `validate_until`; anything later is test.
#[derive(Debug, Clone, Serialize)]
pub struct CohortSplit {
    pub train: Vec<String>,
    pub validation: Vec<String>,
    pub test: Vec<String>,
}

impl CohortSplit {
    /// Build a split from the ordered safra list and the window boundaries.
    pub fn from_boundaries(
        ordered_safras: &[String],
        train_until: &str,
        validate_until: Option<&str>,
    ) -> Result<Self> {
        if !ordered_safras.iter().any(|s| s == train_until) {
            anyhow::bail!("training boundary safra '{}' not present in dataset", train_until);
        }

        let mut train = Vec::new();
        let mut validation = Vec::new();
        let mut test = Vec::new();

        for safra in ordered_safras {
            if safra.as_str() <= train_until {
                train.push(safra.clone());
            } else if validate_until.is_some_and(|v| safra.as_str() <= v) {
                validation.push(safra.clone());
            } else {
                test.push(safra.clone());
            }
        }

        if train.is_empty() {
            anyhow::bail!("training window is empty");
        }

        Ok(Self {
            train,
            validation,
            test,
        })
    }

    /// Last safra of the training window.
    pub fn train_end(&self) -> &str {
        self.train.last().map(String::as_str).unwrap_or("")
    }
}

/// Filter the table down to the rows belonging to the given safras.
pub fn filter_by_safras(
    df: &DataFrame,
    schema: &SchemaConfig,
    safras: &[String],
) -> Result<DataFrame> {
    let row_safras = safra_vector(df, schema)?;
    let mask: Vec<bool> = row_safras
        .iter()
        .map(|s| safras.iter().any(|w| w == s))
        .collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    df.filter(&mask)
        .with_context(|| "failed to filter rows by safra")
}

/// Anti-leakage guard: every safra in `df` must belong to the training
/// window. Called before each fitting step so a mis-wired split fails
/// loudly instead of silently training on the future.
pub fn guard_training_window(
    df: &DataFrame,
    schema: &SchemaConfig,
    window: &[String],
    stage: &str,
) -> Result<()> {
    let window_end = window.last().cloned().unwrap_or_default();
    for safra in safra_vector(df, schema)? {
        if !window.iter().any(|w| *w == safra) {
            return Err(PipelineError::LeakageViolation {
                stage: stage.to_string(),
                window_end,
                offending: safra,
            }
            .into());
        }
    }
    Ok(())
}
