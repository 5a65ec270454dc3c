//! End-to-end runs over files in a temporary directory.

use std::fs;
use std::path::Path;
use survey_stats::categorize::CategoryRule;
use survey_stats::config::{ComparisonConfig, DatasetConfig, PipelineConfig, QuestionnaireConfig};
use survey_stats::output::read_csv;
use survey_stats::{run, SurveyError};

const AFTER: &str = "\
Nome,tempo,erros,cliques
Ana,12.5,1,40
Bia,10.0,0,35
Caio,14.2,3,52
Dani,11.1,NA,38
Edu,13.0,2,47
";

const RUNWAY: &str = "\
Nome,tempo,erros,cliques
Ana,18.0,4,61
Bia,16.5,2,58
Caio,21.3,5,70
Dani,17.2,3,
Edu,19.9,6,66
";

const QUESTIONNAIRE: &str = "\
Nome,Idade,Uses tool?,Hours per week
Ana,31,Yes,More than 36h
Bia,24,No,More than 36h
Caio,45,Yes,Less than 8h
Dani,29,Yes,Between 16h and 24h
Edu,38,,
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn full_config(dir: &Path) -> PipelineConfig {
    write(dir, "after.csv", AFTER);
    write(dir, "runway.csv", RUNWAY);
    write(dir, "questionnaire.csv", QUESTIONNAIRE);
    let out = dir.join("out");
    fs::create_dir(&out).unwrap();

    PipelineConfig {
        output_dir: out,
        identifier_column: "Nome".into(),
        delimiter: ',',
        null_markers: None,
        datasets: vec![
            DatasetConfig {
                normality: true,
                ..DatasetConfig::new(dir.join("after.csv"), "after")
            },
            DatasetConfig::new(dir.join("runway.csv"), "runway"),
        ],
        questionnaire: Some(QuestionnaireConfig {
            path: dir.join("questionnaire.csv"),
            output: "categoria_usuario.csv".into(),
            rule: CategoryRule {
                tool_use_field: "Uses tool?".into(),
                weekly_time_field: "Hours per week".into(),
                ..CategoryRule::default()
            },
        }),
        comparison: Some(ComparisonConfig {
            first: dir.join("after.csv"),
            second: dir.join("runway.csv"),
            columns: vec!["tempo".into(), "cliques".into()],
            output: "mann_whitney.csv".into(),
        }),
    }
}

#[test]
fn full_run_writes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    let summary = run(&config).unwrap();

    let names: Vec<String> = summary
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "after_estatisticas.csv",
            "after_matriz_correlacao.csv",
            "after_shapiro.csv",
            "runway_estatisticas.csv",
            "runway_matriz_correlacao.csv",
            "categoria_usuario.csv",
            "mann_whitney.csv",
        ]
    );
    assert!(summary.written.iter().all(|p| p.exists()));
}

#[test]
fn statistics_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    run(&config).unwrap();

    let table = read_csv(&config.output_dir.join("after_estatisticas.csv")).unwrap();
    assert_eq!(table.columns(), &["mean", "median", "std", "var_coeff"]);
    assert_eq!(table.row_count(), 3);

    // erros: 1, 0, 3, 2 (one missing)
    let mean = table.float_at(1, "mean").unwrap();
    assert!((mean - 1.5).abs() < 1e-12);
    assert_eq!(table.float_at(1, "median"), Some(1.5));
    let std = table.float_at(1, "std").unwrap();
    let cv = table.float_at(1, "var_coeff").unwrap();
    assert!((cv - std * 100.0 / mean).abs() < 1e-9);
}

#[test]
fn correlation_file_is_symmetric() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    run(&config).unwrap();

    let table = read_csv(&config.output_dir.join("runway_matriz_correlacao.csv")).unwrap();
    let names = table.columns().to_vec();
    assert_eq!(names, vec!["tempo", "erros", "cliques"]);
    for (i, a) in names.iter().enumerate() {
        assert_eq!(table.float_at(i, a), Some(1.0));
        for (j, b) in names.iter().enumerate() {
            assert_eq!(table.float_at(i, b), table.float_at(j, a));
        }
    }
}

#[test]
fn shapiro_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    run(&config).unwrap();

    let table = read_csv(&config.output_dir.join("after_shapiro.csv")).unwrap();
    assert_eq!(table.columns(), &["Column", "Statistic", "p-value"]);
    let columns: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
    assert_eq!(columns, vec!["tempo", "erros", "cliques"]);
    for row in 0..table.row_count() {
        let w = table.float_at(row, "Statistic").unwrap();
        let p = table.float_at(row, "p-value").unwrap();
        assert!(w > 0.0 && w <= 1.0);
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn categories_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    run(&config).unwrap();

    let table = read_csv(&config.output_dir.join("categoria_usuario.csv")).unwrap();
    assert_eq!(
        table.columns(),
        &["Nome", "Idade", "Uses tool?", "Hours per week", "Category"]
    );
    let categories: Vec<&str> = table.rows().iter().map(|r| r[4].as_str()).collect();
    assert_eq!(
        categories,
        vec!["Advanced", "Beginner", "Beginner", "Advanced", "Beginner"]
    );
    assert_eq!(table.rows()[4][2], "");
}

#[test]
fn mann_whitney_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = full_config(dir.path());
    run(&config).unwrap();

    let table = read_csv(&config.output_dir.join("mann_whitney.csv")).unwrap();
    assert_eq!(table.columns(), &["Column", "U-Statistic", "p-value"]);
    assert_eq!(table.rows()[0][0], "tempo");
    assert_eq!(table.rows()[1][0], "cliques");

    // Every after time is below every runway time: U = 0, exact p = 2 / C(10, 5).
    assert_eq!(table.float_at(0, "U-Statistic"), Some(0.0));
    let p = table.float_at(0, "p-value").unwrap();
    assert!((p - 2.0 / 252.0).abs() < 1e-12);
}

#[test]
fn identical_datasets_compare_equal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "after.csv", AFTER);
    let config = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        datasets: Vec::new(),
        questionnaire: None,
        comparison: Some(ComparisonConfig {
            first: dir.path().join("after.csv"),
            second: dir.path().join("after.csv"),
            columns: vec!["tempo".into()],
            output: "mann_whitney.csv".into(),
        }),
        ..PipelineConfig::default()
    };
    run(&config).unwrap();

    let table = read_csv(&dir.path().join("mann_whitney.csv")).unwrap();
    assert_eq!(table.float_at(0, "U-Statistic"), Some(12.5));
    assert_eq!(table.float_at(0, "p-value"), Some(1.0));
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "after.csv", AFTER);
    let toml = format!(
        "output_dir = {:?}\n\n[[datasets]]\npath = {:?}\nprefix = \"pre\"\n",
        dir.path().display().to_string(),
        dir.path().join("after.csv").display().to_string(),
    );
    write(dir.path(), "pipeline.toml", &toml);

    let config = PipelineConfig::load(&dir.path().join("pipeline.toml")).unwrap();
    let summary = run(&config).unwrap();
    assert_eq!(summary.file_count(), 2);
    assert!(dir.path().join("pre_estatisticas.csv").exists());
}

#[test]
fn semicolon_files_with_custom_markers() {
    let dir = tempfile::tempdir().unwrap();
    let after = AFTER.replace(',', ";").replace("NA", "-");
    write(dir.path(), "after.csv", &after);
    let config = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        delimiter: ';',
        null_markers: Some(vec![String::new(), "-".into()]),
        datasets: vec![DatasetConfig::new(dir.path().join("after.csv"), "after")],
        questionnaire: None,
        ..PipelineConfig::default()
    };
    run(&config).unwrap();

    let table = read_csv(&dir.path().join("after_estatisticas.csv")).unwrap();
    assert_eq!(table.row_count(), 3);
    let mean = table.float_at(1, "mean").unwrap();
    assert!((mean - 1.5).abs() < 1e-12);
}

#[test]
fn missing_output_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = full_config(dir.path());
    config.output_dir = dir.path().join("nowhere");
    assert!(matches!(run(&config), Err(SurveyError::Io(_))));
}

#[test]
fn unknown_comparison_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = full_config(dir.path());
    if let Some(c) = config.comparison.as_mut() {
        c.columns = vec!["duracao".into()];
    }
    let err = run(&config).unwrap_err();
    assert_eq!(
        err,
        SurveyError::ColumnNotFound {
            name: "duracao".into()
        }
    );
}

#[test]
fn text_column_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.csv", "Nome,tempo,turma\nAna,1,A\n");
    let config = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        datasets: vec![DatasetConfig::new(dir.path().join("bad.csv"), "bad")],
        questionnaire: None,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        run(&config),
        Err(SurveyError::NonNumericColumn { column }) if column == "turma"
    ));
}
