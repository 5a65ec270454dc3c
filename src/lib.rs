//! # survey-stats
//!
//! Statistics pipeline for survey and usability-study CSV data.
//!
//! survey-stats reads per-condition measurement tables and a user-profile
//! questionnaire, and writes one CSV per result set:
//!
//! - **Describe**: mean, median, standard deviation and coefficient of
//!   variation per column, the Pearson correlation matrix, and optionally
//!   Shapiro-Wilk normality tests
//! - **Compare**: two-sided Mann-Whitney U tests between two datasets
//! - **Categorize**: classify respondents as advanced or beginner users
//!
//! ## Modules
//!
//! - [`dataframe`]: Column-major tabular data model (DataFrame, Column, ValidityBitmap)
//! - [`csv_parser`]: CSV parsing with numeric type inference and null markers
//! - [`dataset`]: Numeric datasets with the identifier column removed
//! - [`profiling`]: Descriptive statistics per column
//! - [`analysis`]: Pearson correlation matrix
//! - [`distribution`]: Shapiro-Wilk normality test
//! - [`testing`]: Mann-Whitney U rank-sum test
//! - [`categorize`]: Questionnaire-based user categorization
//! - [`output`]: Result tables and CSV writing
//! - [`config`]: TOML pipeline configuration
//! - [`pipeline`]: End-to-end stages and the full run
//! - [`error`]: Error types
//!
//! ## Quick Start
//!
//! ```
//! use survey_stats::analysis::correlation_matrix;
//! use survey_stats::dataset::Dataset;
//! use survey_stats::profiling::describe;
//!
//! let csv = "Nome,tempo,erros\nAna,12.0,1\nBia,10.0,0\nCaio,14.0,3\nDani,NA,2\n";
//! let ds = Dataset::parse(csv, "Nome").unwrap();
//!
//! let stats = describe(&ds);
//! assert_eq!(stats[0].mean, 12.0);
//! assert_eq!(stats[1].median, 1.5);
//!
//! let corr = correlation_matrix(&ds);
//! assert_eq!(corr.get(0, 0), 1.0);
//! assert!(corr.get(0, 1) > 0.9);
//! ```

pub mod analysis;
pub mod categorize;
pub mod config;
pub mod csv_parser;
pub mod dataframe;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod profiling;
pub mod testing;

pub use config::PipelineConfig;
pub use error::{Result, SurveyError};
pub use pipeline::{run, RunSummary};
