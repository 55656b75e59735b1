//! Safra: Time-Cohort Scorecard Library
//!
//! A library for fitting credit scorecards over time cohorts: frozen
//! WoE binning, IV-based feature selection, logistic scoring and
//! PSI/AUC/KS monitoring, with every artifact fitted strictly on the
//! training window.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
