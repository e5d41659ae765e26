use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn corpus_workspace() -> TempDir {
    let workspace = tempfile::tempdir().expect("create tempdir");
    let texts_dir = workspace.path().join("texts");
    fs::create_dir(&texts_dir).expect("create texts dir");
    fs::write(texts_dir.join("0.txt"), "The cat sat on the mat.").expect("write 0.txt");
    fs::write(texts_dir.join("1.txt"), "The dog sat on the log.").expect("write 1.txt");
    workspace
}

#[test]
fn count_reports_histogram_statistics_as_json() {
    let workspace = corpus_workspace();

    let output = Command::cargo_bin("nhist")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "count",
            "texts",
            "--ngram",
            "2",
            "--strategy",
            "chunk-tls",
            "--threads",
            "2",
            "--top",
            "3",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("report is valid JSON");
    assert_eq!(report["strategy"], "chunk-tls");
    assert_eq!(report["threads"], 2);
    // 12 tokens across two documents, boundaries elided: 11 bigram windows.
    assert_eq!(report["total_occurrences"], 11);
    let top = report["top"].as_array().expect("top array");
    assert_eq!(top.len(), 3);
    assert!(top.iter().all(|entry| entry["count"].as_u64().is_some()));
}

#[test]
fn document_strategy_counts_per_document() {
    let workspace = corpus_workspace();

    let output = Command::cargo_bin("nhist")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "count",
            "texts",
            "--strategy",
            "document-tls",
            "--threads",
            "2",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("report is valid JSON");
    // 5 bigram windows per 6-token document; the boundary window is not counted.
    assert_eq!(report["total_occurrences"], 10);
}

#[test]
fn thread_scaling_writes_csv_and_summary() {
    let workspace = corpus_workspace();

    Command::cargo_bin("nhist")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "thread-scaling",
            "texts",
            "--max-threads",
            "2",
            "--strategies",
            "chunk-tls",
            "--strategies",
            "sharded-lock",
            "--out",
            "results",
        ])
        .assert()
        .success();

    let csv_path = workspace
        .path()
        .join("results")
        .join("thread_scaling_2gram_t2.csv");
    let csv = fs::read_to_string(&csv_path).expect("csv was written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Strategy,Threads,Time_seconds,Speedup,Efficiency_percent"
    );
    // Two strategies, two thread counts each.
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("chunk-tls,1,"));
    assert!(lines[3].starts_with("sharded-lock,1,"));

    let summary_path = workspace
        .path()
        .join("results")
        .join("thread_scaling_2gram_t2_summary.txt");
    let summary = fs::read_to_string(&summary_path).expect("summary was written");
    assert!(summary.contains("SUMMARY REPORT - 2-grams"));
    assert!(summary.contains("--- chunk-tls ---"));
}

#[test]
fn workload_scaling_writes_multiplier_rows() {
    let workspace = corpus_workspace();

    Command::cargo_bin("nhist")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args([
            "--quiet",
            "workload-scaling",
            "texts",
            "--threads",
            "2",
            "--max-multiplier",
            "3",
            "--strategies",
            "sharded-lock",
            "--out",
            "results",
        ])
        .assert()
        .success();

    let csv_path = workspace
        .path()
        .join("results")
        .join("workload_2gram_t2.csv");
    let csv = fs::read_to_string(&csv_path).expect("csv was written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Strategy,Multiplier,Threads,Time_seconds,Speedup,Efficiency_percent"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("sharded-lock,1,2,"));
    assert!(lines[3].starts_with("sharded-lock,3,2,"));
}

#[test]
fn misconfigured_invocation_fails_fast() {
    let workspace = corpus_workspace();

    Command::cargo_bin("nhist")
        .expect("binary exists")
        .current_dir(workspace.path())
        .args(["--quiet", "count", "texts", "--ngram", "0"])
        .assert()
        .failure();
}
