//! IV-based feature selection.
//!
//! Variables are ranked by total Information Value and classified into
//! the conventional predictive-power bands. Suspiciously high IV is
//! flagged rather than dropped: it usually means leakage or a proxy for
//! the target, and that call belongs to the analyst.

use serde::Serialize;
use std::fmt;

use super::woe::WoeTable;

/// Default IV threshold below which a variable is not selected
pub const DEFAULT_IV_THRESHOLD: f64 = 0.02;

/// Predictive-power band for a total IV value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IvBand {
    Useless,
    Weak,
    Medium,
    Strong,
    Suspicious,
}

impl IvBand {
    /// Classify a total IV into its band.
    pub fn classify(iv: f64) -> Self {
        if iv < 0.02 {
            IvBand::Useless
        } else if iv < 0.10 {
            IvBand::Weak
        } else if iv < 0.30 {
            IvBand::Medium
        } else if iv <= 0.50 {
            IvBand::Strong
        } else {
            IvBand::Suspicious
        }
    }
}

impl fmt::Display for IvBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IvBand::Useless => "useless",
            IvBand::Weak => "weak",
            IvBand::Medium => "medium",
            IvBand::Strong => "strong",
            IvBand::Suspicious => "suspicious",
        };
        write!(f, "{}", label)
    }
}

/// Selection verdict for one variable
#[derive(Debug, Clone, Serialize)]
pub struct SelectedFeature {
    pub name: String,
    pub iv: f64,
    pub band: IvBand,
    pub selected: bool,
    pub flagged: bool,
}

/// Rank variables by total IV (descending, name as tiebreaker) and mark
/// which pass the threshold. Suspicious variables stay selected but
/// carry the flag.
pub fn select_features(tables: &[WoeTable], threshold: f64) -> Vec<SelectedFeature> {
    let mut features: Vec<SelectedFeature> = tables
        .iter()
        .map(|table| {
            let band = IvBand::classify(table.total_iv);
            SelectedFeature {
                name: table.variable.clone(),
                iv: table.total_iv,
                band,
                selected: table.total_iv >= threshold,
                flagged: band == IvBand::Suspicious,
            }
        })
        .collect();

    features.sort_by(|a, b| {
        b.iv.partial_cmp(&a.iv)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    features
}

/// Names of the selected variables, in ranked order.
pub fn selected_names(features: &[SelectedFeature]) -> Vec<String> {
    features
        .iter()
        .filter(|f| f.selected)
        .map(|f| f.name.clone())
        .collect()
}
