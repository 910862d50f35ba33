//! CSV and Parquet exports written from full runs

mod common;

use common::Experiment;
use orgaplex::export::{export_metrics, export_relationships, ExportFormat};
use orgaplex::pipeline::{run_metrics, run_relationships};
use orgaplex::report::CollectingReporter;
use orgaplex::AnalysisConfig;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use std::fs::{self, File};

fn relationship_fixture() -> Experiment {
    let exp = Experiment::flat();
    exp.distances("c1", "ER", "LD", &["2.0", "3.0"]);
    exp.distances("c1", "Mito", "ER", &["0.5"]);
    exp.distances("c2", "ER", "LD", &["-1.5"]);
    exp
}

#[test]
fn test_relationship_csv_tables() {
    let exp = relationship_fixture();
    let out = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::default();
    let report = run_relationships(exp.root(), &config, &CollectingReporter::new()).unwrap();

    let written = export_relationships(&report, out.path(), ExportFormat::Csv).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "one_way_interactions_mean_distance.csv",
            "one_way_interactions_count.csv",
            "one_way_interactions_completeness.csv",
            "one_way_interactions_metadata.csv",
        ]
    );

    let means = fs::read_to_string(out.path().join("one_way_interactions_mean_distance.csv")).unwrap();
    assert_eq!(means, "Relationship,c1,c2\nER-to-LD,2.5,-1.5\nMito-to-ER,0.5,\n");

    let counts = fs::read_to_string(out.path().join("one_way_interactions_count.csv")).unwrap();
    assert_eq!(counts, "Relationship,c1,c2\nER-to-LD,2,1\nMito-to-ER,1,0\n");

    let completeness = fs::read_to_string(out.path().join("one_way_interactions_completeness.csv")).unwrap();
    assert_eq!(
        completeness,
        "Relationship,c1,c2\nER-to-LD,Present,Present\nMito-to-ER,Present,Missing\n"
    );

    let metadata = fs::read_to_string(out.path().join("one_way_interactions_metadata.csv")).unwrap();
    let mut lines = metadata.lines();
    assert_eq!(lines.next(), Some("Parameter,Value"));
    assert_eq!(lines.next(), Some("Software,Orgaplex-Analyzer"));
    assert!(metadata.contains("Analysis_Type,One-Way Interactions"));
}

#[test]
fn test_relationship_parquet_roundtrip_shape() {
    let exp = relationship_fixture();
    let out = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::default();
    let report = run_relationships(exp.root(), &config, &CollectingReporter::new()).unwrap();

    export_relationships(&report, out.path(), ExportFormat::Parquet).unwrap();

    let file = File::open(out.path().join("one_way_interactions_mean_distance.parquet")).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
    let batches: Vec<_> = reader.map(Result::unwrap).collect();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 2);
    assert_eq!(batches[0].schema().field(0).name(), "Relationship");
    assert_eq!(batches[0].num_columns(), 3);
}

#[test]
fn test_metric_csv_tables() {
    let exp = Experiment::flat();
    exp.volumes("c1", "ER", &["1.0", "3.0"]);
    exp.sphericity("c1", "ER", &["0.5"]);
    exp.volumes("c1", "LD", &["2.0"]);

    let out = tempfile::tempdir().unwrap();
    let config = AnalysisConfig::default();
    let report = run_metrics(exp.root(), &config, &CollectingReporter::new()).unwrap();
    let written = export_metrics(&report, out.path().join("metrics"), ExportFormat::Csv).unwrap();
    assert_eq!(written.len(), 3);

    let er = fs::read_to_string(out.path().join("metrics/vol_spher_metrics_ER.csv")).unwrap();
    assert_eq!(
        er,
        "Metric,c1\nMean_Sphericity,0.5\nCount_Sphericity,1.0\nMean_Volume,2.0\nCount_Volume,2.0\nTotal_Volume,4.0\nMax_Volume,3.0\n"
    );

    let ld = fs::read_to_string(out.path().join("metrics/vol_spher_metrics_LD.csv")).unwrap();
    assert!(ld.contains("Mean_Sphericity,\n"));
    assert!(ld.contains("Count_Sphericity,0.0\n"));

    let metadata = fs::read_to_string(out.path().join("metrics/vol_spher_metrics_metadata.csv")).unwrap();
    assert!(metadata.contains("Analysis_Type,Vol/Spher Metrics"));
    assert!(metadata.contains("Categories_Analyzed,\"ER, LD\""));
}

#[test]
fn test_export_into_file_path_fails() {
    let exp = relationship_fixture();
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("taken");
    fs::write(&blocker, "not a directory").unwrap();

    let config = AnalysisConfig::default();
    let report = run_relationships(exp.root(), &config, &CollectingReporter::new()).unwrap();
    assert!(export_relationships(&report, &blocker, ExportFormat::Csv).is_err());
}
