//! Safra: Time-Cohort Scorecard CLI Tool
//!
//! Fits a WoE scorecard on a training window of safras and monitors its
//! discrimination and population stability on every later cohort.

mod cli;
mod pipeline;
mod report;
mod utils;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::DataFrame;
use rayon::prelude::*;

use cli::Cli;
use pipeline::binning::{apply_column, fit_column, BinAssignment, BinDefinition, BinningOptions};
use pipeline::evaluation::evaluate_by_safra;
use pipeline::imputation::{apply_imputation, fit_imputation, ImputationReference, ImputeStrategy};
use pipeline::model::{fit_logistic, FitOptions};
use pipeline::schema::{
    feature_columns, filter_by_safras, guard_training_window, safra_order, safra_vector,
    target_vector, validate_dataset, CohortSplit, SchemaConfig,
};
use pipeline::selection::{select_features, selected_names};
use pipeline::stability::{
    bin_proportions, score_deciles, score_proportions, stability_report, StabilityReport,
};
use pipeline::woe::{fit_woe, transform, WoeTable};
use pipeline::{load_dataset, Monotonicity, PipelineError};
use report::{
    display_cohort_metrics, display_iv_ranking, display_stability, export_metrics_csv,
    export_scorecard, package_artifacts, RunMetadata, ScorecardExport, VariableArtifact,
};
use utils::{
    create_progress_bar, create_spinner, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success, print_warning,
};

/// Frozen artifacts for one variable, with assignments over the full table
struct FittedVariable {
    definition: BinDefinition,
    woe: WoeTable,
    assignments: Vec<BinAssignment>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let schema = SchemaConfig {
        id_column: cli.id_column.clone(),
        safra_column: cli.safra_column.clone(),
        target_column: cli.target.clone(),
    };
    let monotonicity: Monotonicity = cli
        .monotonicity
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let impute_strategy: Option<ImputeStrategy> = cli
        .impute
        .as_deref()
        .map(|s| s.parse().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        &cli.target,
        &cli.train_until,
        cli.validate_until.as_deref(),
        cli.bins,
        cli.iv_threshold,
    );

    // Step 1: Load and validate
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let mut df = load_dataset(&cli.input)?
        .collect()
        .with_context(|| format!("Failed to collect dataset: {}", cli.input.display()))?;
    finish_with_success(&spinner, "Dataset loaded");
    pipeline::display_dataset_stats(&df);
    validate_dataset(&df, &schema)?;
    print_success("Schema validated");
    print_step_time(step_start.elapsed());

    // Step 2: Cohort split
    print_step_header(2, "Cohort Split");
    let step_start = Instant::now();
    let ordered_safras = safra_order(&df, &schema)?;
    let split = CohortSplit::from_boundaries(
        &ordered_safras,
        &cli.train_until,
        cli.validate_until.as_deref(),
    )?;
    print_info(&format!(
        "train: {} safras, validation: {}, test: {}",
        split.train.len(),
        split.validation.len(),
        split.test.len()
    ));
    if split.test.is_empty() && split.validation.is_empty() {
        print_warning("no safras after the training window; monitoring tracks will be empty");
    }
    print_step_time(step_start.elapsed());

    // Step 3: Imputation (optional, frozen on the training window)
    let imputation: Option<ImputationReference> = if let Some(strategy) = impute_strategy {
        print_step_header(3, "Missing Value Imputation");
        let step_start = Instant::now();
        let train = filter_by_safras(&df, &schema, &split.train)?;
        guard_training_window(&train, &schema, &split.train, "imputation fit")?;
        let (numeric, _) = feature_columns(&train, &schema);
        let reference = fit_imputation(&train, &numeric, strategy)?;
        df = apply_imputation(&df, &reference)?;
        print_success(&format!(
            "{} reference values fitted ({})",
            reference.values.len(),
            strategy
        ));
        print_step_time(step_start.elapsed());
        Some(reference)
    } else {
        None
    };

    let train_df = filter_by_safras(&df, &schema, &split.train)?;
    guard_training_window(&train_df, &schema, &split.train, "binning fit")?;

    let targets = target_vector(&df, &schema)?;
    let safras = safra_vector(&df, &schema)?;
    let train_targets = target_vector(&train_df, &schema)?;

    // Step 4: Binning and WoE fitting, one variable at a time
    print_step_header(4, "Binning and WoE Fitting");
    let step_start = Instant::now();
    let (numeric, categorical) = feature_columns(&df, &schema);
    let variables: Vec<String> = numeric.into_iter().chain(categorical).collect();
    if variables.is_empty() {
        anyhow::bail!("dataset has no predictor columns");
    }

    let options = BinningOptions {
        bins: cli.bins,
        min_population: cli.min_bin_pct / 100.0,
        prebins: cli.prebins,
        monotonicity,
        smoothing: cli.smoothing,
    };

    let pb = create_progress_bar(variables.len() as u64, "    Fitting variables");
    let results: Vec<(String, Result<FittedVariable>)> = variables
        .par_iter()
        .map(|variable| {
            let fitted = fit_variable(
                variable,
                &train_df,
                &df,
                &train_targets,
                &options,
                cli.smoothing,
            );
            pb.inc(1);
            (variable.clone(), fitted)
        })
        .collect();
    finish_with_success(&pb, "Variable fitting complete");

    let mut fitted: Vec<FittedVariable> = Vec::new();
    for (variable, result) in results {
        match result {
            Ok(f) => fitted.push(f),
            Err(err) if err.is::<PipelineError>() => {
                print_warning(&format!("skipping '{}': {}", variable, err));
            }
            Err(err) => return Err(err),
        }
    }
    if fitted.is_empty() {
        anyhow::bail!("no variable could be binned; check the training window size");
    }
    print_step_time(step_start.elapsed());

    // Step 5: Feature selection by IV
    print_step_header(5, "Feature Selection");
    let step_start = Instant::now();
    let tables: Vec<WoeTable> = fitted.iter().map(|f| f.woe.clone()).collect();
    let features = select_features(&tables, cli.iv_threshold);
    display_iv_ranking(&features);
    for feature in features.iter().filter(|f| f.flagged) {
        print_warning(&format!(
            "'{}' has suspiciously high IV ({:.4}); check for leakage",
            feature.name, feature.iv
        ));
    }
    let kept = selected_names(&features);
    if kept.is_empty() {
        anyhow::bail!(
            "no variable passed the IV threshold of {}; nothing to model",
            cli.iv_threshold
        );
    }
    print_info(&format!("{} of {} variables selected", kept.len(), fitted.len()));
    print_step_time(step_start.elapsed());

    // Step 6: Model fitting on the training window
    print_step_header(6, "Model Fitting");
    let step_start = Instant::now();
    let selected: Vec<&FittedVariable> = kept
        .iter()
        .filter_map(|name| fitted.iter().find(|f| f.woe.variable == *name))
        .collect();

    let train_mask: Vec<bool> = safras.iter().map(|s| split.train.contains(s)).collect();
    let encoded: Vec<Vec<f64>> = selected
        .iter()
        .map(|f| transform(&f.assignments, &f.woe, cli.default_woe))
        .collect();
    let train_encoded: Vec<Vec<f64>> = encoded
        .iter()
        .map(|col| mask_rows(col, &train_mask))
        .collect();
    let train_y: Vec<i32> = targets
        .iter()
        .zip(train_mask.iter())
        .filter(|(_, m)| **m)
        .map(|(y, _)| *y)
        .collect();

    let model = fit_logistic(&kept, &train_encoded, &train_y, &FitOptions::default())?;
    if model.converged {
        print_success(&format!("converged in {} iterations", model.iterations));
    } else {
        print_warning(&format!(
            "did not converge within {} iterations",
            model.iterations
        ));
    }
    print_step_time(step_start.elapsed());

    // Step 7: Per-safra evaluation
    print_step_header(7, "Evaluation");
    let step_start = Instant::now();
    let scores = model.predict_proba(&encoded);
    let performance = evaluate_by_safra(&targets, &scores, &safras, &ordered_safras)?;
    display_cohort_metrics("PERFORMANCE BY SAFRA", &performance);
    print_step_time(step_start.elapsed());

    // Step 8: Stability monitoring
    print_step_header(8, "Stability Monitoring");
    let step_start = Instant::now();
    let monitor_safras: Vec<String> = ordered_safras
        .iter()
        .filter(|s| !split.train.contains(*s))
        .cloned()
        .collect();

    let mut variable_stability: Vec<StabilityReport> = Vec::new();
    for f in &selected {
        let bin_count = f.definition.bin_count();
        let train_assignments = mask_rows(&f.assignments, &train_mask);
        let reference = bin_proportions(&train_assignments, bin_count);
        let comparisons: Vec<(String, Vec<f64>)> = monitor_safras
            .iter()
            .map(|safra| {
                let cohort = rows_for_safra(&f.assignments, &safras, safra);
                (safra.clone(), bin_proportions(&cohort, bin_count))
            })
            .collect();
        variable_stability.push(stability_report(&f.woe.variable, &reference, &comparisons)?);
    }

    let train_scores = mask_rows(&scores, &train_mask);
    let deciles = score_deciles(&train_scores, cli.score_bins);
    let score_reference = score_proportions(&train_scores, &deciles);
    let score_comparisons: Vec<(String, Vec<f64>)> = monitor_safras
        .iter()
        .map(|safra| {
            let cohort = rows_for_safra(&scores, &safras, safra);
            (safra.clone(), score_proportions(&cohort, &deciles))
        })
        .collect();
    let score_stability = stability_report("score", &score_reference, &score_comparisons)?;

    let mut all_stability = variable_stability.clone();
    all_stability.push(score_stability.clone());
    display_stability(&all_stability);
    print_step_time(step_start.elapsed());

    // Step 9: Export frozen artifacts
    print_step_header(9, "Export Artifacts");
    let step_start = Instant::now();
    let metadata = RunMetadata::now(
        &cli.input.display().to_string(),
        &cli.target,
        &cli.train_until,
        cli.validate_until.as_deref(),
        cli.bins,
        cli.min_bin_pct,
        cli.smoothing,
        cli.iv_threshold,
        &monotonicity.to_string(),
    );
    let variables: Vec<VariableArtifact> = fitted
        .into_iter()
        .map(|f| VariableArtifact {
            definition: f.definition,
            woe: f.woe,
        })
        .collect();
    let export = ScorecardExport {
        metadata,
        split,
        imputation,
        features,
        variables,
        model,
        performance,
        variable_stability,
        score_stability,
    };

    let output_path = cli.output_path();
    export_scorecard(&export, &output_path)?;
    print_success(&format!("scorecard written to {}", output_path.display()));

    if cli.bundle {
        let csv_path = cli.metrics_csv_path();
        export_metrics_csv(&export.performance, &csv_path)?;
        let zip_path = cli.bundle_path();
        package_artifacts(&output_path, &csv_path, &zip_path)?;
        print_success(&format!("bundle written to {}", zip_path.display()));
    }
    print_step_time(step_start.elapsed());

    print_completion();

    Ok(())
}

/// Fit bins on the training window, freeze them, apply to the full table
/// and fit the WoE table from the training assignments.
fn fit_variable(
    variable: &str,
    train_df: &DataFrame,
    full_df: &DataFrame,
    train_targets: &[i32],
    options: &BinningOptions,
    smoothing: f64,
) -> Result<FittedVariable> {
    let definition = fit_column(train_df, variable, train_targets, options)?;
    let train_assignments = apply_column(train_df, &definition)?;
    let woe = fit_woe(&definition, &train_assignments, train_targets, smoothing)?;
    let assignments = apply_column(full_df, &definition)?;
    Ok(FittedVariable {
        definition,
        woe,
        assignments,
    })
}

fn mask_rows<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask.iter())
        .filter(|(_, m)| **m)
        .map(|(v, _)| *v)
        .collect()
}

fn rows_for_safra<T: Copy>(values: &[T], safras: &[String], safra: &str) -> Vec<T> {
    values
        .iter()
        .zip(safras.iter())
        .filter(|(_, s)| s.as_str() == safra)
        .map(|(v, _)| *v)
        .collect()
}
