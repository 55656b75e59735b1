//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Display initial statistics about the dataset
pub fn display_dataset_stats(df: &DataFrame) {
    let (rows, cols) = df.shape();

    println!("\n📊 Dataset Statistics:");
    println!("   Rows: {}", rows);
    println!("   Columns: {}", cols);

    let memory_bytes: usize = df.estimated_size();
    let memory_mb = memory_bytes as f64 / (1024.0 * 1024.0);
    println!("   Estimated memory: {:.2} MB", memory_mb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,safra,y,var_1").unwrap();
        writeln!(file, "1,201901,0,1.5").unwrap();
        writeln!(file, "2,201901,1,2.5").unwrap();

        let df = load_dataset(&path).unwrap().collect().unwrap();
        assert_eq!(df.shape(), (2, 4));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_dataset(Path::new("data.xlsx"));
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("Unsupported"));
    }
}
