//! Command line tests for `pilgrimfb`. All the runs are offline: the comments are not translated
//! and the sentiment comes from the built-in lexicon.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value as Json;
use std::process::Command;

const HEADER: &str = "Original,Translated,Department,Primary Sentiment,Confidence";

fn pilgrimfb() -> Command {
    let mut cmd = Command::cargo_bin("pilgrimfb").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn classify(input: &std::path::Path) -> Command {
    let mut cmd = pilgrimfb();
    cmd.arg("classify")
        .arg("--input")
        .arg(input)
        .arg("--translator")
        .arg("none")
        .arg("--sentiment")
        .arg("lexicon");
    cmd
}

#[test]
fn classify_csv_to_stdout() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("feedback.csv");
    input
        .write_str("Date,Comments\n2024-06-14,The bus was late\n2024-06-15,\n2024-06-15,The food was delicious\n")
        .unwrap();

    classify(input.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(HEADER))
        .stdout(predicate::str::contains(
            "The bus was late,The bus was late,Transport & Travel,NEGATIVE,1.00",
        ))
        .stdout(predicate::str::contains(
            "The food was delicious,The food was delicious,Food Quality & Dining,POSITIVE,1.00",
        ));
}

#[test]
fn classify_text_file_to_output_file() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("notes.txt");
    input.write_str("The staff were rude\n\n  \nNothing to add\n").unwrap();
    let out = td.child("results.csv");

    classify(input.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    let table = fs::read_to_string(out.path()).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines,
        vec![
            HEADER,
            "The staff were rude,The staff were rude,Staff Attitude & Support,NEGATIVE,1.00",
            "Nothing to add,Nothing to add,General Services,POSITIVE,0.50",
        ]
    );
}

#[test]
fn classify_manual_text() {
    pilgrimfb()
        .args(["classify", "--text", "great driver\n\nthe room was dirty"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "great driver,great driver,Transport & Travel,POSITIVE,1.00",
        ));
}

#[test]
fn classify_requires_an_input() {
    pilgrimfb()
        .arg("classify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No comments to process"));
}

#[test]
fn unsupported_format_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("notes.docx");
    input.write_str("whatever").unwrap();

    classify(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format: notes.docx"));
}

#[test]
fn missing_comments_column_writes_no_table() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("feedback.csv");
    input.write_str("Feedback\nThe bus was late\n").unwrap();

    classify(input.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No usable comments left"));
}

#[test]
fn blank_comments_write_no_table() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("notes.txt");
    input.write_str("\n   \n\t\n").unwrap();
    let out = td.child("results.csv");

    classify(input.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No usable comments left"));
    out.assert(predicate::path::missing());

    pilgrimfb()
        .args(["classify", "--text", "   "])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No usable comments left"));
}

#[test]
fn reference_mismatch_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("feedback.csv");
    input.write_str("Comments\nThe bus was late\n").unwrap();
    let good = td.child("good.csv");
    good.write_str(&format!(
        "{}\nThe bus was late,The bus was late,Transport & Travel,NEGATIVE,1.00\n",
        HEADER
    ))
    .unwrap();
    let bad = td.child("bad.csv");
    bad.write_str(&format!(
        "{}\nThe bus was late,The bus was late,General Services,NEGATIVE,1.00\n",
        HEADER
    ))
    .unwrap();

    classify(input.path())
        .arg("--reference")
        .arg(good.path())
        .assert()
        .success();
    classify(input.path())
        .arg("--reference")
        .arg(bad.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("differ from the reference"));
}

#[test]
fn summary_and_config() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("feedback.json");
    input
        .write_str(r#"[{"Comments": "rice was cold"}, {"Comments": "rice was cold"}, {"Other": 1}]"#)
        .unwrap();
    let config = td.child("config.json");
    config
        .write_str(
            r#"{
                "inputSettings": {"chunkSize": 2},
                "departments": [{"name": "Kitchen", "keywords": ["rice"]}],
                "catchAll": "Other"
            }"#,
        )
        .unwrap();
    let summary = td.child("summary.json");

    classify(input.path())
        .arg("--config")
        .arg(config.path())
        .arg("--summary")
        .arg(summary.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "rice was cold,rice was cold,Kitchen,NEGATIVE,1.00",
        ));

    let js: Json = serde_json::from_str(&fs::read_to_string(summary.path()).unwrap()).unwrap();
    assert_eq!(js["rowsProcessed"], 2);
    assert_eq!(js["skippedChunks"], 1);
    assert_eq!(js["cachedTranslations"], 1);
    assert_eq!(js["cacheHits"], 1);
    assert_eq!(js["departments"][0]["department"], "Kitchen");
    assert_eq!(js["departments"][0]["negative"], 2);
}

#[test]
fn demographics_summary() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("people.csv");
    input
        .write_str(
            "Date,العمر Age,الجنسية Nationality,الجنس Gender\n\
             2024-06-10,30,Egypt,ذكر\n\
             2024-06-11,40,Egypt,أنثى\n\
             2024-06-12,50,Jordan,ذكر\n\
             2024-07-01,99,Jordan,ذكر\n",
        )
        .unwrap();
    let out = td.child("demo.json");

    pilgrimfb()
        .arg("demographics")
        .arg("--input")
        .arg(input.path())
        .arg("--to")
        .arg("2024-06-30")
        .arg("--out")
        .arg(out.path())
        .assert()
        .success();

    let js: Json = serde_json::from_str(&fs::read_to_string(out.path()).unwrap()).unwrap();
    assert_eq!(js["filteredRecords"], 3);
    assert_eq!(js["ageStats"]["count"], 3);
    assert_eq!(js["ageStats"]["mean"], 40.0);
    assert_eq!(js["ageStats"]["median"], 40.0);
    assert_eq!(js["groups"][0]["nationality"], "Egypt");
    assert_eq!(js["groups"].as_array().unwrap().len(), 3);
}

#[test]
fn demographics_missing_columns_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("people.csv");
    input.write_str("Age,Nationality\n30,Egypt\n").unwrap();

    pilgrimfb()
        .args(["demographics", "--input"])
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Required columns not found"));
}

#[test]
fn demographics_empty_after_filters_is_a_warning() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("people.csv");
    input
        .write_str("العمر Age,الجنسية Nationality,الجنس Gender\n30,Egypt,ذكر\n")
        .unwrap();

    pilgrimfb()
        .args(["demographics", "--nationality", "Iceland", "--input"])
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No data after applying filters"));
}

const PEOPLE: &str = "العمر Age,الجنسية Nationality,الجنس Gender\n30,Egypt,ذكر\n50,Egypt,أنثى\n";

fn check_people(stdout: &[u8]) {
    let js: Json = serde_json::from_slice(stdout).unwrap();
    assert_eq!(js["filteredRecords"], 2);
    assert_eq!(js["ageStats"]["mean"], 40.0);
    assert_eq!(js["groups"].as_array().unwrap().len(), 2);
}

#[test]
fn demographics_from_a_text_file() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("people.txt");
    input.write_str(PEOPLE).unwrap();

    let assert = pilgrimfb()
        .args(["demographics", "--input"])
        .arg(input.path())
        .assert()
        .success();
    check_people(&assert.get_output().stdout);
}

#[test]
fn demographics_from_stdin() {
    let assert = assert_cmd::Command::from_std(pilgrimfb())
        .args(["demographics", "--input", "-"])
        .write_stdin(PEOPLE)
        .assert()
        .success();
    check_people(&assert.get_output().stdout);
}

/// Answers a single HTTP request with the given CSV body.
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf);
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes());
        }
    });
    format!("http://{}/people.csv", addr)
}

#[test]
fn demographics_from_a_url() {
    let url = serve_once(PEOPLE);
    let assert = pilgrimfb()
        .args(["demographics", "--url"])
        .arg(&url)
        .assert()
        .success();
    check_people(&assert.get_output().stdout);
}

#[test]
fn demographics_requires_a_table() {
    pilgrimfb()
        .arg("demographics")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No table to read"));
}
