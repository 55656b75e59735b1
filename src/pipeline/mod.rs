//! Pipeline module - the scorecard fitting and monitoring steps

pub mod binning;
pub mod error;
pub mod evaluation;
pub mod imputation;
pub mod loader;
pub mod model;
pub mod schema;
pub mod selection;
mod solver;
pub mod stability;
pub mod woe;

pub use binning::{BinAssignment, BinDefinition, BinningOptions, Monotonicity};
pub use error::PipelineError;
pub use evaluation::{evaluate, evaluate_by_safra, CohortMetrics, Metrics};
pub use imputation::{apply_imputation, fit_imputation, ImputationReference, ImputeStrategy};
pub use loader::*;
pub use model::{fit_logistic, FitOptions, LogisticModel};
pub use schema::{CohortSplit, SchemaConfig};
pub use selection::{select_features, IvBand, SelectedFeature};
pub use stability::{psi, ShiftSeverity, StabilityReport};
pub use woe::{fit_woe, transform, WoeTable};
