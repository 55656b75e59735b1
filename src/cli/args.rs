//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Safra - Fit and monitor credit scorecards over time cohorts
#[derive(Parser, Debug)]
#[command(name = "safra")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target column name (binary 0/1, where 1 is the bad outcome)
    #[arg(short, long, default_value = "y")]
    pub target: String,

    /// Cohort column name. Values like 201901 must sort chronologically
    /// as strings.
    #[arg(long, default_value = "safra")]
    pub safra_column: String,

    /// Unique row identifier column
    #[arg(long, default_value = "id")]
    pub id_column: String,

    /// Last safra of the training window (inclusive). Everything fitted
    /// by the pipeline sees only rows up to this cohort.
    #[arg(long)]
    pub train_until: String,

    /// Last safra of the validation window (inclusive). Later safras
    /// form the test window. When omitted, everything after the training
    /// window is test.
    #[arg(long)]
    pub validate_until: Option<String>,

    /// Target number of bins per variable
    #[arg(long, default_value = "10")]
    pub bins: usize,

    /// Minimum bin size as percentage of training rows (0-100)
    #[arg(long, default_value = "5.0", value_parser = validate_min_bin_pct)]
    pub min_bin_pct: f64,

    /// Number of quantile pre-bins before merging.
    /// Lower values = faster but less granular. Higher values = more precise but slower solver.
    #[arg(long, default_value = "20")]
    pub prebins: usize,

    /// Additive smoothing constant for WoE and IV counts.
    /// Zero disables smoothing; zero-count bins then fail loudly.
    #[arg(long, default_value = "0.5")]
    pub smoothing: f64,

    /// IV threshold - variables below this are not selected
    #[arg(long, default_value = "0.02")]
    pub iv_threshold: f64,

    /// Monotonic WoE constraint for numeric binning.
    /// Options: "none" (default), "ascending", "descending", "auto"
    #[arg(long, default_value = "none")]
    pub monotonicity: String,

    /// Imputation strategy for missing numeric values ("median" or "mean").
    /// When omitted, missing values get their own explicit bin instead.
    #[arg(long)]
    pub impute: Option<String>,

    /// WoE assigned to categories unseen in the training window
    #[arg(long, default_value = "0.0")]
    pub default_woe: f64,

    /// Number of score deciles for score-level PSI
    #[arg(long, default_value = "10")]
    pub score_bins: usize,

    /// Scorecard output path (JSON). Defaults to the input directory
    /// with a '_scorecard.json' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bundle the scorecard and performance CSV into a zip archive
    #[arg(long, default_value = "false")]
    pub bundle: bool,
}

impl Cli {
    /// Get the scorecard output path, deriving from input if not provided.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let parent = self
                .input
                .parent()
                .unwrap_or_else(|| std::path::Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_scorecard.json", stem))
        })
    }

    /// Path of the per-safra metrics CSV, next to the scorecard.
    pub fn metrics_csv_path(&self) -> PathBuf {
        self.output_path().with_extension("csv")
    }

    /// Path of the zip bundle, next to the scorecard.
    pub fn bundle_path(&self) -> PathBuf {
        self.output_path().with_extension("zip")
    }
}

/// Validator for min_bin_pct parameter
fn validate_min_bin_pct(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=100.0).contains(&value) {
        Err(format!(
            "min_bin_pct must be between 0.0 and 100.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}
