//! Console tables for the fitted scorecard and its monitoring tracks

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::evaluation::CohortMetrics;
use crate::pipeline::selection::{IvBand, SelectedFeature};
use crate::pipeline::stability::{ShiftSeverity, StabilityReport};

fn print_section(icon: &str, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_table(table: &Table) {
    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn band_color(band: IvBand) -> Color {
    match band {
        IvBand::Useless => Color::DarkGrey,
        IvBand::Weak => Color::White,
        IvBand::Medium => Color::Cyan,
        IvBand::Strong => Color::Green,
        IvBand::Suspicious => Color::Red,
    }
}

fn severity_color(severity: ShiftSeverity) -> Color {
    match severity {
        ShiftSeverity::Stable => Color::Green,
        ShiftSeverity::Moderate => Color::Yellow,
        ShiftSeverity::Significant => Color::Red,
    }
}

/// IV ranking table with band classification and selection verdicts
pub fn display_iv_ranking(features: &[SelectedFeature]) {
    print_section("📋", "INFORMATION VALUE RANKING");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("IV").add_attribute(Attribute::Bold),
        Cell::new("Band").add_attribute(Attribute::Bold),
        Cell::new("Selected").add_attribute(Attribute::Bold),
    ]);

    for feature in features {
        let selected = if feature.selected { "yes" } else { "no" };
        let band_cell = if feature.flagged {
            Cell::new(format!("{} ⚠", feature.band)).fg(Color::Red)
        } else {
            Cell::new(feature.band.to_string()).fg(band_color(feature.band))
        };
        table.add_row(vec![
            Cell::new(&feature.name),
            Cell::new(format!("{:.4}", feature.iv)),
            band_cell,
            Cell::new(selected).fg(if feature.selected {
                Color::Green
            } else {
                Color::DarkGrey
            }),
        ]);
    }

    print_table(&table);
}

/// Per-safra discrimination table
pub fn display_cohort_metrics(title: &str, cohorts: &[CohortMetrics]) {
    print_section("📈", title);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Safra").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("AUC").add_attribute(Attribute::Bold),
        Cell::new("KS").add_attribute(Attribute::Bold),
        Cell::new("Gini").add_attribute(Attribute::Bold),
    ]);

    for cohort in cohorts {
        table.add_row(vec![
            Cell::new(&cohort.safra),
            Cell::new(cohort.rows),
            Cell::new(format!("{:.4}", cohort.metrics.auc)),
            Cell::new(format!("{:.4}", cohort.metrics.ks)),
            Cell::new(format!("{:.4}", cohort.metrics.gini)),
        ]);
    }

    print_table(&table);
}

/// Stability table: worst PSI per variable across the comparison safras
pub fn display_stability(reports: &[StabilityReport]) {
    print_section("🧭", "POPULATION STABILITY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Variable").add_attribute(Attribute::Bold),
        Cell::new("Worst PSI").add_attribute(Attribute::Bold),
        Cell::new("At Safra").add_attribute(Attribute::Bold),
        Cell::new("Severity").add_attribute(Attribute::Bold),
    ]);

    for report in reports {
        let worst_entry = report
            .entries
            .iter()
            .max_by(|a, b| a.psi.partial_cmp(&b.psi).unwrap_or(std::cmp::Ordering::Equal));
        let (psi, safra, severity) = match worst_entry {
            Some(entry) => (entry.psi, entry.safra.as_str(), entry.severity),
            None => (0.0, "-", ShiftSeverity::Stable),
        };
        table.add_row(vec![
            Cell::new(&report.variable),
            Cell::new(format!("{:.4}", psi)),
            Cell::new(safra),
            Cell::new(severity.to_string()).fg(severity_color(severity)),
        ]);
    }

    print_table(&table);
}
