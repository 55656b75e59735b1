//! Scorecard artifact export
//!
//! Everything an apply-time consumer needs is serialized into a single
//! JSON document: the frozen bin edges, WoE tables, imputation
//! references, model coefficients and the monitoring tracks computed at
//! fit time. The bundle option zips the JSON together with a CSV of the
//! per-safra metrics.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::binning::BinDefinition;
use crate::pipeline::evaluation::CohortMetrics;
use crate::pipeline::imputation::ImputationReference;
use crate::pipeline::model::LogisticModel;
use crate::pipeline::schema::CohortSplit;
use crate::pipeline::selection::SelectedFeature;
use crate::pipeline::stability::StabilityReport;
use crate::pipeline::woe::WoeTable;

/// Metadata about the fitting run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub safra_version: String,
    pub input_file: String,
    pub target_column: String,
    pub train_until: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_until: Option<String>,
    pub bins: usize,
    pub min_bin_pct: f64,
    pub smoothing: f64,
    pub iv_threshold: f64,
    pub monotonicity: String,
}

/// One variable's frozen artifacts: bin definition plus WoE table
#[derive(Serialize)]
pub struct VariableArtifact {
    pub definition: BinDefinition,
    pub woe: WoeTable,
}

/// Complete scorecard export
#[derive(Serialize)]
pub struct ScorecardExport {
    pub metadata: RunMetadata,
    pub split: CohortSplit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imputation: Option<ImputationReference>,
    pub features: Vec<SelectedFeature>,
    pub variables: Vec<VariableArtifact>,
    pub model: LogisticModel,
    pub performance: Vec<CohortMetrics>,
    pub variable_stability: Vec<StabilityReport>,
    pub score_stability: StabilityReport,
}

impl RunMetadata {
    pub fn now(
        input_file: &str,
        target_column: &str,
        train_until: &str,
        validate_until: Option<&str>,
        bins: usize,
        min_bin_pct: f64,
        smoothing: f64,
        iv_threshold: f64,
        monotonicity: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            safra_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            target_column: target_column.to_string(),
            train_until: train_until.to_string(),
            validate_until: validate_until.map(|s| s.to_string()),
            bins,
            min_bin_pct,
            smoothing,
            iv_threshold,
            monotonicity: monotonicity.to_string(),
        }
    }
}

/// Export the scorecard to a JSON file
pub fn export_scorecard(export: &ScorecardExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize scorecard to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write scorecard to {}", output_path.display()))?;

    Ok(())
}

/// Export a CSV of the per-safra performance metrics
pub fn export_metrics_csv(cohorts: &[CohortMetrics], output_path: &Path) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create CSV file: {}", output_path.display()))?;

    writeln!(file, "safra,rows,auc,ks,gini")?;
    for cohort in cohorts {
        writeln!(
            file,
            "{},{},{:.6},{:.6},{:.6}",
            cohort.safra, cohort.rows, cohort.metrics.auc, cohort.metrics.ks, cohort.metrics.gini
        )?;
    }

    Ok(())
}

/// Package scorecard artifacts into a zip archive
///
/// Creates a zip file containing:
/// - scorecard.json - Frozen artifacts plus monitoring tracks
/// - performance.csv - Per-safra AUC/KS/Gini
pub fn package_artifacts(
    scorecard_path: &Path,
    metrics_csv_path: &Path,
    zip_path: &Path,
) -> Result<()> {
    use std::io::{Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut add_file_to_zip = |path: &Path, default_name: &str| -> Result<()> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(default_name);
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;
        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
        Ok(())
    };

    add_file_to_zip(scorecard_path, "scorecard.json")?;
    add_file_to_zip(metrics_csv_path, "performance.csv")?;

    zip.finish().context("Failed to finalize zip file")?;

    // Remove the individual files after packaging
    std::fs::remove_file(scorecard_path).ok();
    std::fs::remove_file(metrics_csv_path).ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::evaluation::Metrics;

    fn cohorts() -> Vec<CohortMetrics> {
        vec![CohortMetrics {
            safra: "201901".to_string(),
            rows: 100,
            metrics: Metrics {
                auc: 0.75,
                ks: 0.40,
                gini: 0.50,
            },
        }]
    }

    #[test]
    fn test_metrics_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("performance.csv");
        export_metrics_csv(&cohorts(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("safra,rows,auc,ks,gini"));
        assert!(content.contains("201901,100,0.750000"));
    }

    #[test]
    fn test_package_artifacts_removes_sources() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("scorecard.json");
        let csv_path = dir.path().join("performance.csv");
        std::fs::write(&json_path, "{}").unwrap();
        export_metrics_csv(&cohorts(), &csv_path).unwrap();

        let zip_path = dir.path().join("artifacts.zip");
        package_artifacts(&json_path, &csv_path, &zip_path).unwrap();

        assert!(zip_path.exists());
        assert!(!json_path.exists());
        assert!(!csv_path.exists());
    }
}
