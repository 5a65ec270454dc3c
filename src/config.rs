//! Pipeline configuration.
//!
//! Loaded from a TOML file. A file runs exactly the stages it lists; an
//! empty file is valid and runs nothing. [`PipelineConfig::default`] is the
//! standard run used when no file is given: the `after` and `runway`
//! datasets plus the user questionnaire, no group comparison.
//!
//! ```
//! use survey_stats::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_toml_str(r#"
//!     output_dir = "out"
//!
//!     [[datasets]]
//!     path = "data/pre.csv"
//!     prefix = "pre"
//!     normality = true
//! "#).unwrap();
//!
//! assert_eq!(config.datasets.len(), 1);
//! assert_eq!(config.identifier_column, "Nome");
//! assert!(config.questionnaire.is_none());
//! ```

use crate::categorize::CategoryRule;
use crate::csv_parser::CsvParser;
use crate::error::{Result, SurveyError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory every result file is written to. Must already exist.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Column holding the respondent identifier, dropped before analysis.
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
    /// Field delimiter of every input file.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Cell values read as missing. Replaces the built-in list when set.
    #[serde(default)]
    pub null_markers: Option<Vec<String>>,
    /// Datasets to describe.
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    /// Questionnaire to categorize.
    pub questionnaire: Option<QuestionnaireConfig>,
    /// Two-dataset rank-sum comparison.
    pub comparison: Option<ComparisonConfig>,
}

/// One dataset to describe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Input CSV file.
    pub path: PathBuf,
    /// Prefix of the result file names, e.g. `after` → `after_estatisticas.csv`.
    pub prefix: String,
    /// Also run the Shapiro-Wilk test on every column.
    #[serde(default)]
    pub normality: bool,
}

impl DatasetConfig {
    /// A dataset without the normality test.
    pub fn new(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
            normality: false,
        }
    }
}

/// The user-profile questionnaire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionnaireConfig {
    /// Questionnaire CSV file.
    pub path: PathBuf,
    /// Output file name, relative to `output_dir`.
    #[serde(default = "default_questionnaire_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub rule: CategoryRule,
}

/// Mann-Whitney comparison of two datasets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Dataset whose U is reported.
    pub first: PathBuf,
    /// Dataset it is compared against.
    pub second: PathBuf,
    /// Columns to compare, in output order.
    pub columns: Vec<String>,
    /// Output file name, relative to `output_dir`.
    #[serde(default = "default_comparison_output")]
    pub output: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_identifier_column() -> String {
    "Nome".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_questionnaire_output() -> PathBuf {
    PathBuf::from("categoria_usuario.csv")
}

fn default_comparison_output() -> PathBuf {
    PathBuf::from("mann_whitney.csv")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            identifier_column: default_identifier_column(),
            delimiter: default_delimiter(),
            null_markers: None,
            datasets: vec![
                DatasetConfig::new("data/dados_after.csv", "after"),
                DatasetConfig::new("data/dados_runway.csv", "runway"),
            ],
            questionnaire: Some(QuestionnaireConfig {
                path: PathBuf::from("data/questionario_de_delineamento_do_perfil_do_usuario.csv"),
                output: default_questionnaire_output(),
                rule: CategoryRule::default(),
            }),
            comparison: None,
        }
    }
}

impl PipelineConfig {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| SurveyError::io(path, e))?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            SurveyError::Config(msg) => SurveyError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        debug!(path = %path.display(), datasets = config.datasets.len(), "loaded config");
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| SurveyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that deserialization cannot.
    pub fn validate(&self) -> Result<()> {
        if self.identifier_column.is_empty() {
            return Err(SurveyError::Config(
                "identifier_column must not be empty".to_string(),
            ));
        }
        self.csv_parser()?;
        for (i, dataset) in self.datasets.iter().enumerate() {
            if dataset.prefix.trim().is_empty() {
                return Err(SurveyError::Config(format!(
                    "datasets[{i}] ({}): prefix must not be empty",
                    dataset.path.display()
                )));
            }
        }
        if let Some(dup) = self
            .datasets
            .iter()
            .enumerate()
            .find(|(i, d)| self.datasets[..*i].iter().any(|o| o.prefix == d.prefix))
        {
            return Err(SurveyError::Config(format!(
                "duplicate dataset prefix '{}'",
                dup.1.prefix
            )));
        }
        if let Some(q) = &self.questionnaire {
            let rule = &q.rule;
            if rule.tool_use_field.is_empty() || rule.weekly_time_field.is_empty() {
                return Err(SurveyError::Config(
                    "questionnaire.rule: question headers must not be empty".to_string(),
                ));
            }
            if rule.category_column.is_empty() {
                return Err(SurveyError::Config(
                    "questionnaire.rule: category_column must not be empty".to_string(),
                ));
            }
        }
        if let Some(c) = &self.comparison {
            if c.columns.is_empty() {
                return Err(SurveyError::Config(
                    "comparison.columns must list at least one column".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The CSV reader every input file is loaded with.
    ///
    /// # Errors
    ///
    /// [`SurveyError::Config`] if `delimiter` cannot separate fields.
    pub fn csv_parser(&self) -> Result<CsvParser> {
        let parser = CsvParser::new().delimiter_char(self.delimiter)?;
        Ok(match &self.null_markers {
            Some(markers) => parser.null_markers(markers.clone()),
            None => parser,
        })
    }

    /// Resolves a result file name against `output_dir`.
    pub fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
