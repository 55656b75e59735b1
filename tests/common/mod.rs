//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a multi-safra scorecard dataset with known characteristics.
///
/// Per safra, `rows_per_safra` rows with:
/// - `id`: unique across the whole table
/// - `safra`: the cohort label
/// - `y`: binary target driven by `var_risk` with ~10% label noise
/// - `var_risk`: strongly predictive numeric variable
/// - `var_noise`: numeric variable unrelated to the target
/// - `uf`: categorical variable unrelated to the target
pub fn scorecard_frame(safras: &[&str], rows_per_safra: usize) -> DataFrame {
    scorecard_frame_with_shift(safras, rows_per_safra, None)
}

/// Same fixture, but `var_risk` in the named safra is shifted by +50 so
/// its population visibly drifts away from the training distribution.
pub fn scorecard_frame_with_shift(
    safras: &[&str],
    rows_per_safra: usize,
    shifted_safra: Option<&str>,
) -> DataFrame {
    let mut ids: Vec<i64> = Vec::new();
    let mut safra_col: Vec<String> = Vec::new();
    let mut targets: Vec<i32> = Vec::new();
    let mut var_risk: Vec<f64> = Vec::new();
    let mut var_noise: Vec<f64> = Vec::new();
    let mut uf: Vec<String> = Vec::new();

    for (s_idx, safra) in safras.iter().enumerate() {
        let shift = if Some(*safra) == shifted_safra { 50.0 } else { 0.0 };
        for i in 0..rows_per_safra {
            ids.push((s_idx * 100_000 + i) as i64);
            safra_col.push(safra.to_string());

            let risk = (i % 60) as f64;
            // Bad outcomes concentrate in the top of the risk range,
            // with every 10th label flipped as noise
            let mut y = if risk >= 36.0 { 1 } else { 0 };
            if i % 10 == 0 {
                y = 1 - y;
            }
            targets.push(y);
            var_risk.push(risk + shift);
            var_noise.push(((i * 37) % 100) as f64);
            uf.push(["SP", "RJ", "MG"][i % 3].to_string());
        }
    }

    df! {
        "id" => ids,
        "safra" => safra_col,
        "y" => targets,
        "var_risk" => var_risk,
        "var_noise" => var_noise,
        "uf" => uf,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
#[allow(dead_code)]
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
