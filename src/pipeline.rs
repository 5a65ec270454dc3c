//! End-to-end pipeline.
//!
//! Each stage reads its input files, computes its results and writes them to
//! the configured output directory, returning the paths written. [`run`]
//! drives every stage a [`PipelineConfig`] enables and stops at the first
//! error.
//!
//! | Stage | Output |
//! |-------|--------|
//! | [`process_dataset`] | `<prefix>_estatisticas.csv`, `<prefix>_matriz_correlacao.csv`, `<prefix>_shapiro.csv` |
//! | [`categorize_users`] | `categoria_usuario.csv` |
//! | [`compare_datasets`] | `mann_whitney.csv` |

use crate::analysis::correlation_matrix;
use crate::categorize::categorize_table;
use crate::config::{ComparisonConfig, DatasetConfig, PipelineConfig, QuestionnaireConfig};
use crate::csv_parser::CsvParser;
use crate::dataset::load_dataset;
use crate::distribution::normality_tests;
use crate::error::Result;
use crate::output::{write_csv, write_result};
use crate::profiling::describe;
use crate::testing::compare_groups;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

const STATISTICS_SUFFIX: &str = "estatisticas";
const CORRELATION_SUFFIX: &str = "matriz_correlacao";
const NORMALITY_SUFFIX: &str = "shapiro";

/// Files written by a pipeline run, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    /// Number of files written.
    pub fn file_count(&self) -> usize {
        self.written.len()
    }
}

/// File name of one per-dataset result, e.g. `after_estatisticas.csv`.
pub fn result_file_name(prefix: &str, suffix: &str) -> String {
    format!("{prefix}_{suffix}.csv")
}

/// Describes one dataset: statistics, correlation matrix and, when enabled,
/// Shapiro-Wilk results.
pub fn process_dataset(
    dataset: &DatasetConfig,
    parser: &CsvParser,
    identifier: &str,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let _span = info_span!("dataset", prefix = %dataset.prefix).entered();
    let data = load_dataset(parser, &dataset.path, identifier)?;
    info!(
        path = %dataset.path.display(),
        rows = data.row_count(),
        columns = data.column_count(),
        "processing dataset"
    );

    let mut written = Vec::new();

    let path = output_dir.join(result_file_name(&dataset.prefix, STATISTICS_SUFFIX));
    write_result(describe(&data).as_slice(), &path)?;
    written.push(path);

    let path = output_dir.join(result_file_name(&dataset.prefix, CORRELATION_SUFFIX));
    write_result(&correlation_matrix(&data), &path)?;
    written.push(path);

    if dataset.normality {
        let path = output_dir.join(result_file_name(&dataset.prefix, NORMALITY_SUFFIX));
        write_result(normality_tests(&data).as_slice(), &path)?;
        written.push(path);
    }

    Ok(written)
}

/// Categorizes every questionnaire respondent and writes the annotated table.
pub fn categorize_users(
    questionnaire: &QuestionnaireConfig,
    parser: &CsvParser,
    output_dir: &Path,
) -> Result<PathBuf> {
    let _span = info_span!("questionnaire").entered();
    let raw = parser.read_records(&questionnaire.path)?;
    info!(
        path = %questionnaire.path.display(),
        respondents = raw.row_count(),
        "categorizing respondents"
    );

    let table = categorize_table(&raw, &questionnaire.rule)?;
    let path = output_dir.join(&questionnaire.output);
    write_csv(&table, &path)?;
    Ok(path)
}

/// Runs the Mann-Whitney comparison of two datasets.
pub fn compare_datasets(
    comparison: &ComparisonConfig,
    parser: &CsvParser,
    identifier: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let _span = info_span!("comparison").entered();
    let first = load_dataset(parser, &comparison.first, identifier)?;
    let second = load_dataset(parser, &comparison.second, identifier)?;
    info!(
        first = %comparison.first.display(),
        second = %comparison.second.display(),
        columns = comparison.columns.len(),
        "comparing datasets"
    );

    let results = compare_groups(&first, &second, &comparison.columns)?;
    let path = output_dir.join(&comparison.output);
    write_result(results.as_slice(), &path)?;
    Ok(path)
}

/// Runs every stage `config` enables, in order: datasets, questionnaire,
/// comparison.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;
    let parser = config.csv_parser()?;
    let mut summary = RunSummary::default();

    for dataset in &config.datasets {
        let written = process_dataset(
            dataset,
            &parser,
            &config.identifier_column,
            &config.output_dir,
        )?;
        summary.written.extend(written);
    }

    if let Some(questionnaire) = &config.questionnaire {
        summary
            .written
            .push(categorize_users(questionnaire, &parser, &config.output_dir)?);
    }

    if let Some(comparison) = &config.comparison {
        summary.written.push(compare_datasets(
            comparison,
            &parser,
            &config.identifier_column,
            &config.output_dir,
        )?);
    }

    info!(
        files = summary.file_count(),
        output_dir = %config.output_dir.display(),
        "pipeline finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use crate::output::read_csv;
    use std::fs;

    #[test]
    fn file_names() {
        assert_eq!(result_file_name("after", STATISTICS_SUFFIX), "after_estatisticas.csv");
        assert_eq!(
            result_file_name("runway", CORRELATION_SUFFIX),
            "runway_matriz_correlacao.csv"
        );
    }

    #[test]
    fn dataset_without_normality_writes_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pre.csv");
        fs::write(&input, "Nome,a,b\nAna,1,2\nBia,2,4\nCaio,3,5\n").unwrap();

        let written = process_dataset(
            &DatasetConfig::new(&input, "pre"),
            &CsvParser::new(),
            "Nome",
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("pre_estatisticas.csv"),
                dir.path().join("pre_matriz_correlacao.csv"),
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn configured_delimiter_reaches_every_loader() {
        let dir = tempfile::tempdir().unwrap();
        let data = "Nome;t\nAna;1\nBia;-\nCaio;3\n";
        fs::write(dir.path().join("a.csv"), data).unwrap();
        let questionnaire = "Nome;uses;hours\nAna;Yes;More than 36h\n";
        fs::write(dir.path().join("q.csv"), questionnaire).unwrap();
        let toml = format!(
            "output_dir = {out:?}\ndelimiter = \";\"\nnull_markers = [\"-\"]\n\
             [[datasets]]\npath = {a:?}\nprefix = \"a\"\n\
             [questionnaire]\npath = {q:?}\n\
             [questionnaire.rule]\ntool_use_field = \"uses\"\nweekly_time_field = \"hours\"\n\
             [comparison]\nfirst = {a:?}\nsecond = {a:?}\ncolumns = [\"t\"]\n",
            out = dir.path().display().to_string(),
            a = dir.path().join("a.csv").display().to_string(),
            q = dir.path().join("q.csv").display().to_string(),
        );
        let config = PipelineConfig::from_toml_str(&toml).unwrap();
        let summary = run(&config).unwrap();
        assert_eq!(summary.file_count(), 4);

        let stats = read_csv(&dir.path().join("a_estatisticas.csv")).unwrap();
        assert_eq!(stats.float_at(0, "mean"), Some(2.0));
        let categories = read_csv(&dir.path().join("categoria_usuario.csv")).unwrap();
        assert_eq!(categories.rows()[0][3], "Advanced");
    }

    #[test]
    fn empty_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            datasets: Vec::new(),
            questionnaire: None,
            ..PipelineConfig::default()
        };
        assert_eq!(run(&config).unwrap(), RunSummary::default());
    }

    #[test]
    fn first_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            datasets: vec![DatasetConfig::new(dir.path().join("missing.csv"), "x")],
            ..PipelineConfig::default()
        };
        assert!(matches!(run(&config), Err(SurveyError::Io(_))));
    }
}
